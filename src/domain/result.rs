// src/domain/result.rs

use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::{GameId, PlayerId, SeatIndex, TableId};
use crate::engine::hand_history::HandHistory;
use crate::eval::Combination;

/// Чем закончилась раздача.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HandOutcome {
    /// Раздача ещё идёт.
    InGame,
    /// Банк разыгран по правилам.
    Normal,
    /// Раздача сброшена из-за таймаута, стеки восстановлены.
    TimeoutReset,
    /// Стол мёртв: никто не отвечает, все расселены.
    DeadTableReset,
}

/// Доля игрока в одном сайд-поте.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SidePot {
    /// Размер сайд-пота после рейка.
    pub bank: Chips,
    /// Сколько из него досталось игроку.
    pub win: Chips,
}

/// Итог раздачи для одного игрока.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerHistoryInfo {
    pub player_id: PlayerId,
    pub seat: SeatIndex,
    /// Показывать ли карты остальным.
    pub show: bool,
    pub winnings: Chips,
    pub side_pots: Vec<SidePot>,
    /// Карманные карты (пусто, если их не вскрывали).
    pub hand: Vec<Card>,
    pub combination: Combination,
}

impl PlayerHistoryInfo {
    pub fn new(player_id: PlayerId, seat: SeatIndex) -> Self {
        Self {
            player_id,
            seat,
            show: false,
            winnings: Chips::ZERO,
            side_pots: Vec::new(),
            hand: Vec::new(),
            combination: Combination::none(),
        }
    }
}

/// Полный расчёт раздачи.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GameResult {
    pub table_id: TableId,
    pub game_id: GameId,
    pub outcome: HandOutcome,
    /// Банк до рейка.
    pub start_bank: Chips,
    /// Банк к распределению (после рейка).
    pub bank: Chips,
    pub rake_percent: f64,
    /// Рейк стола с учётом нераспределённого остатка.
    pub bank_rake: Chips,
    /// Остаток от деления банка, ушедший заведению.
    pub bank_unconsumed: Chips,
    pub board: Vec<Card>,
    pub players: Vec<PlayerHistoryInfo>,
    pub log: HandHistory,
}

impl GameResult {
    pub fn new(table_id: TableId, game_id: GameId) -> Self {
        Self {
            table_id,
            game_id,
            outcome: HandOutcome::InGame,
            start_bank: Chips::ZERO,
            bank: Chips::ZERO,
            rake_percent: 0.0,
            bank_rake: Chips::ZERO,
            bank_unconsumed: Chips::ZERO,
            board: Vec::new(),
            players: Vec::new(),
            log: HandHistory::new(),
        }
    }

    /// Сумма выигрышей всех игроков.
    pub fn total_winnings(&self) -> Chips {
        self.players.iter().map(|p| p.winnings).sum()
    }

    pub fn winnings_of(&self, player_id: PlayerId) -> Chips {
        self.players
            .iter()
            .filter(|p| p.player_id == player_id)
            .map(|p| p.winnings)
            .sum()
    }
}

/// Итог раздачи одного места для статистики.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatStatistics {
    pub player_id: PlayerId,
    pub seat: SeatIndex,
    pub start_stack: Chips,
    pub end_stack: Chips,
    pub sum_of_bets: Chips,
    pub rake: Chips,
    pub winnings: Chips,
}

/// Запись статистики раздачи для внешнего хранилища.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StatisticsRecord {
    pub table_id: TableId,
    pub game_id: GameId,
    pub started_at: u64,
    pub finished_at: u64,
    pub outcome: HandOutcome,
    pub bank: Chips,
    pub rake: Chips,
    pub board: Vec<Card>,
    pub seats: Vec<SeatStatistics>,
}
