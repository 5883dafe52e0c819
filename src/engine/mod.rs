//! Покерный движок: ставки, раскрытие карт, сайд-поты, шоудаун, таймауты.
//!
//! Высокоуровневая точка входа: `apply_command`.
//! Основные операции:
//!   - `seat_player` – посадить игрока (бай-ин)
//!   - `apply_command` – применить событие игрока атомарно
//!   - `exit_player` – вывести игрока из-за стола
//!   - `submit_escrow_keys` – ключи от хранителя в режиме эскроу
//!
//! Движок чистый: балансы не меняет, а возвращает `TableEffect`-ы.

pub mod actions;
pub mod betting;
pub mod effects;
pub mod errors;
pub mod exit;
pub mod game_loop;
pub mod hand_history;
pub mod positions;
pub mod reveal;
pub mod settlement;
pub mod showdown;
pub mod side_pots;
pub mod table_manager;
pub mod timeout;
pub mod validation;

pub use actions::{AckKind, CommandOutcome, Disposition, Envelope, IgnoreReason, TableCommand};
pub use effects::{CreditReason, DebitReason, IncomeSource, TableEffect};
pub use errors::EngineError;
pub use exit::exit_player;
pub use game_loop::{apply_command, seat_player, SeatRequest};
pub use hand_history::{HandEvent, HandEventKind, HandHistory};
pub use table_manager::{ManagerError, TableManager};
pub use timeout::submit_escrow_keys;

use crate::config::GameParams;
use crate::domain::chips::Chips;
use crate::domain::PlayerId;

/// Внешний учёт счетов (только чтение).
/// Изменения балансов движок описывает эффектами.
pub trait Ledger {
    fn balance(&self, player_id: PlayerId) -> Chips;
    /// Сидит ли игрок уже за каким-нибудь столом.
    fn has_active_table(&self, player_id: PlayerId) -> bool;
}

/// Всё, что нужно одному переходу стола: параметры, счета, текущее время
/// и накопитель эффектов.
pub struct EngineContext<'a> {
    pub params: &'a GameParams,
    pub ledger: &'a dyn Ledger,
    /// Текущее время в секундах.
    pub now: u64,
    effects: Vec<TableEffect>,
}

impl<'a> EngineContext<'a> {
    pub fn new(params: &'a GameParams, ledger: &'a dyn Ledger, now: u64) -> Self {
        Self {
            params,
            ledger,
            now,
            effects: Vec::new(),
        }
    }

    pub fn emit(&mut self, effect: TableEffect) {
        self.effects.push(effect);
    }

    pub fn effects(&self) -> &[TableEffect] {
        &self.effects
    }

    pub fn take_effects(&mut self) -> Vec<TableEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Откатить эффекты неудавшегося перехода.
    pub(crate) fn truncate_effects(&mut self, len: usize) {
        self.effects.truncate(len);
    }
}
