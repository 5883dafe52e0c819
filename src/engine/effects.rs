// src/engine/effects.rs

use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::result::StatisticsRecord;
use crate::domain::{PlayerId, TableId};

/// Почему игроку возвращаются фишки на счёт.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CreditReason {
    /// Игрок сам ушёл из-за стола.
    Leave,
    /// Стек меньше большого блайнда, докупиться нельзя.
    StackBelowBigBlind,
    /// Снят со стола после таймаута.
    Timeout,
    /// Стол признан мёртвым.
    DeadTable,
    /// Доля штрафа с игроков, сорвавших раздачу.
    TimeoutFine,
}

/// Почему со счёта игрока списываются фишки.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DebitReason {
    BuyIn,
    Rebuy,
}

/// Откуда у заведения доход.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IncomeSource {
    Rake,
    TimeoutFine,
}

/// Запрос к внешним хранилищам, порождённый переходом стола.
///
/// Движок балансы не меняет: он только перечисляет, что должно
/// произойти со счетами, а применяет это вызывающий код.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum TableEffect {
    Credit {
        player_id: PlayerId,
        amount: Chips,
        reason: CreditReason,
    },
    Debit {
        player_id: PlayerId,
        amount: Chips,
        reason: DebitReason,
    },
    /// Штрафная отметка игроку, не ответившему вовремя.
    Penalty {
        player_id: PlayerId,
        amount: Chips,
    },
    HouseIncome {
        amount: Chips,
        source: IncomeSource,
    },
    /// Рейк, снятый с конкретного игрока (для реферальных расчётов).
    PlayerRake {
        player_id: PlayerId,
        amount: Chips,
    },
    SeatTaken {
        player_id: PlayerId,
        table_id: TableId,
    },
    SeatReleased {
        player_id: PlayerId,
        table_id: TableId,
    },
    Statistics(StatisticsRecord),
}
