use serde::{Deserialize, Serialize};

use crate::domain::act::PossibleMove;
use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::key::CardKey;
use crate::domain::player::PlayerStatus;
use crate::domain::result::GameResult;
use crate::domain::table::TableStatus;
use crate::domain::{CardIndex, GameId, PlayerId, SeatIndex, TableId};
use crate::engine::actions::Disposition;
use crate::engine::effects::TableEffect;

/// DTO игрока за столом.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlayerView {
    pub player_id: PlayerId,
    pub seat: SeatIndex,
    pub status: PlayerStatus,
    pub stack: Chips,
    pub cur_round_bets: Chips,
    pub sum_of_bets: Chips,
    pub all_in: bool,
    /// Индексы карманных карт в колоде.
    pub card_indexes: Vec<CardIndex>,
    /// Прислал ли игрок событие текущей фазы.
    pub has_event: bool,
}

/// DTO стола. Колода и ключи нужны клиентам, чтобы открыть свои карты.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TableView {
    pub table_id: TableId,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub max_players: usize,
    pub escrow_keys: bool,
    pub status: TableStatus,
    /// Номер раздачи, если она идёт.
    pub game_id: Option<GameId>,
    pub timestamp: u64,
    pub round: u8,
    pub dealer: SeatIndex,
    pub small_blind_seat: SeatIndex,
    pub big_blind_seat: SeatIndex,
    pub next_player: SeatIndex,
    pub current_bet: Chips,
    pub bank: Chips,
    pub current_bank: Chips,
    pub board: Vec<Card>,
    pub waiting_keys: Vec<CardIndex>,
    pub possible_moves: Vec<PossibleMove>,
    pub raise_variants: Vec<Chips>,
    pub deck: Vec<Card>,
    pub all_keys: Vec<CardKey>,
    pub players: Vec<PlayerView>,
    pub last_result: Option<GameResult>,
}

/// Что сделала команда.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum CommandResult {
    TableCreated { table_id: TableId },
    Seated { table_id: TableId, seat: SeatIndex },
    Event { disposition: Disposition },
    Exited { disposition: Disposition },
    EscrowAccepted,
}

/// Ответ на команду: результат и эффекты для счетов.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CommandResponse {
    pub result: CommandResult,
    pub effects: Vec<TableEffect>,
}
