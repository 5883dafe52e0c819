//! Глобальные параметры игры: разрешённые блайнды и размеры столов,
//! рейк, бай-ин и таймауты.

pub mod params;

pub use params::{ConfigError, GameParams, TimeoutRules};
