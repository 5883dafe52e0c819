//! Инфраструктурный слой вокруг покерного движка:
//! - генерация ID;
//! - RNG и seed-ы для симулированных клиентов;
//! - клиентские ключи протокола раскрытия;
//! - счета в памяти;
//! - стол с симулированными клиентами;
//! - настройка логов.

pub mod ids;
pub mod keyring;
pub mod ledger;
pub mod logging;
pub mod rng;
pub mod rng_seed;
pub mod sim;

pub use ids::IdGenerator;
pub use keyring::{seal_key, unseal_key, PlayerKeyring};
pub use ledger::InMemoryLedger;
pub use logging::init_tracing;
pub use rng::{DeterministicRng, RandomSource};
pub use rng_seed::RngSeed;
pub use sim::{passive_decision, Decision, TableSim};
