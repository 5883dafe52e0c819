use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::act::{ActKind, PlayerAct, PossibleMove};
use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::deck::Deck;
use crate::domain::key::{CardKey, SealedKey};
use crate::domain::player::{PlayerAtTable, PlayerStatus};
use crate::domain::result::GameResult;
use crate::domain::{CardIndex, GameId, PlayerId, SeatIndex, TableId};
use crate::engine::errors::EngineError;
use crate::engine::hand_history::HandHistory;

/// Game id стола, на котором раздача не идёт.
pub const NO_GAME: GameId = u64::MAX;

/// Состояние стола. Числовые коды совпадают с кодами на проводе.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableStatus {
    WaitPlayer = 0,
    WaitStartGame = 2,
    WaitShuffle = 3,
    WaitCrypt = 4,
    WaitKeysForPlayers = 6,
    WaitPlayersAct = 7,
    WaitKeysForShowdown = 8,
    WaitAllKeys = 10,
    WaitAllInKeys = 11,
    EndGame = 12,
    WaitEndGame = 13,
    EndAllInGame = 14,
    Delete = 15,
    WaitRsaKeys = 16,
}

impl TableStatus {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Фазы, в которых стол ждёт ключи от игроков.
    pub fn is_waiting_keys(self) -> bool {
        matches!(
            self,
            TableStatus::WaitKeysForPlayers
                | TableStatus::WaitKeysForShowdown
                | TableStatus::WaitAllKeys
                | TableStatus::WaitAllInKeys
        )
    }
}

/// Конфиг стола.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableConfig {
    pub small_blind: Chips,
    pub max_players: usize,
    /// Режим эскроу: игроки сдают ключи хранителю, и таймаут не ломает раздачу.
    pub escrow_keys: bool,
}

impl TableConfig {
    pub fn new(small_blind: Chips, max_players: usize) -> Self {
        Self {
            small_blind,
            max_players,
            escrow_keys: false,
        }
    }

    pub fn big_blind(&self) -> Chips {
        self.small_blind * 2
    }
}

/// Основное состояние стола: всё, что меняется внутри раздачи.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Table {
    pub id: TableId,
    pub config: TableConfig,
    pub status: TableStatus,
    /// Фаза, прерванная ожиданием ключей от хранителя.
    pub saved_status: Option<TableStatus>,

    pub game_id: GameId,
    pub next_game_id: GameId,
    /// Логическое время последнего изменения состояния.
    pub timestamp: u64,
    pub hand_started_at: u64,

    /// Сколько игроков сдано в текущую раздачу.
    pub game_players_count: usize,
    /// Сколько игроков уже прислали событие текущей фазы.
    pub received_count: usize,
    pub round: u8,
    pub allin_count: usize,
    pub folds_count: usize,

    pub dealer_index: SeatIndex,
    pub sb_index: SeatIndex,
    pub bb_index: SeatIndex,
    pub next_player_index: SeatIndex,

    pub current_bet: Chips,
    /// Банк закрытых раундов.
    pub bank: Chips,
    /// Банк вместе с текущим раундом.
    pub current_bank: Chips,
    /// Вклады текущего раунда.
    pub round_bets: Chips,
    /// Блайнды, которые никто не оспорил.
    pub not_returned_bets: Chips,
    /// Сколько раз каждое место ставило в текущем раунде.
    pub round_bet_acts: Vec<u32>,
    /// Снимок: сколько мест ставило в каждом закрытом раунде.
    pub players_with_bets: Vec<u32>,

    pub possible_moves: Vec<PossibleMove>,
    pub raise_variants: Vec<Chips>,

    pub deck: Deck,
    pub table_card_indexes: Vec<CardIndex>,
    pub table_cards: Vec<Card>,
    pub players: Vec<PlayerAtTable>,
    pub acts: Vec<PlayerAct>,

    /// Индексы карт, для которых стол ждёт ключи.
    pub waiting_keys: Vec<CardIndex>,
    /// Ключи карманных карт, накопленные до вскрытия.
    pub all_keys: Vec<CardKey>,
    pub escrowed_keys: BTreeMap<PlayerId, Vec<SealedKey>>,

    pub last_result: Option<GameResult>,
    pub history: HandHistory,
}

impl Table {
    pub fn new(id: TableId, config: TableConfig, now: u64) -> Self {
        Self {
            id,
            config,
            status: TableStatus::WaitPlayer,
            saved_status: None,
            game_id: NO_GAME,
            next_game_id: 0,
            timestamp: now,
            hand_started_at: now,
            game_players_count: 0,
            received_count: 0,
            round: 0,
            allin_count: 0,
            folds_count: 0,
            dealer_index: 0,
            sb_index: 0,
            bb_index: 0,
            next_player_index: 0,
            current_bet: Chips::ZERO,
            bank: Chips::ZERO,
            current_bank: Chips::ZERO,
            round_bets: Chips::ZERO,
            not_returned_bets: Chips::ZERO,
            round_bet_acts: Vec::new(),
            players_with_bets: Vec::new(),
            possible_moves: Vec::new(),
            raise_variants: Vec::new(),
            deck: Deck::canonical(),
            table_card_indexes: Vec::new(),
            table_cards: Vec::new(),
            players: Vec::new(),
            acts: Vec::new(),
            waiting_keys: Vec::new(),
            all_keys: Vec::new(),
            escrowed_keys: BTreeMap::new(),
            last_result: None,
            history: HandHistory::new(),
        }
    }

    pub fn small_blind(&self) -> Chips {
        self.config.small_blind
    }

    pub fn big_blind(&self) -> Chips {
        self.config.big_blind()
    }

    pub fn player(&self, seat: SeatIndex) -> Result<&PlayerAtTable, EngineError> {
        self.players.get(seat).ok_or(EngineError::InvalidSeat(seat))
    }

    pub fn player_mut(&mut self, seat: SeatIndex) -> Result<&mut PlayerAtTable, EngineError> {
        self.players.get_mut(seat).ok_or(EngineError::InvalidSeat(seat))
    }

    /// Место игрока за столом (пустые места не считаются).
    pub fn seat_of(&self, player_id: PlayerId) -> Option<SeatIndex> {
        self.players
            .iter()
            .position(|p| !p.is_empty_seat() && p.player_id == player_id)
    }

    /// Сколько мест занято.
    pub fn seated_count(&self) -> usize {
        self.players.iter().filter(|p| !p.is_empty_seat()).count()
    }

    pub fn count_with_status(&self, status: PlayerStatus) -> usize {
        self.players.iter().filter(|p| p.status == status).count()
    }

    /// Число карманных карт раздачи (2N).
    pub fn hole_cards_count(&self) -> usize {
        self.game_players_count * 2
    }

    /// Первый индекс борда в колоде.
    pub fn board_start_index(&self) -> usize {
        self.hole_cards_count()
    }

    /// Сдвинуть индекс по кругу на `offset` мест текущей раздачи
    /// (в игре, сфолдившие, ушедшие, таймаут).
    pub fn next_dealt_in_index(&self, from: SeatIndex, offset: usize) -> SeatIndex {
        let len = self.players.len();
        let mut index = from;
        let mut offset = offset;
        if len == 0 || offset == 0 {
            return index;
        }
        for _ in 0..len {
            index = (index + 1) % len;
            if self.players[index].status.is_dealt_in() {
                offset -= 1;
            }
            if offset == 0 {
                break;
            }
        }
        index
    }

    /// Сдвиг позиции большого блайнда.
    ///
    /// Считаются игроки в раздаче; ожидающий новичок считается на
    /// последнем шаге всегда, а на предпоследнем только если не ждёт BB.
    pub fn next_big_blind_index(&self, from: SeatIndex, offset: usize) -> SeatIndex {
        let len = self.players.len();
        let mut index = from;
        let mut offset = offset;
        if len == 0 || offset == 0 {
            return index;
        }
        for _ in 0..len {
            index = (index + 1) % len;
            let p = &self.players[index];
            if p.status == PlayerStatus::InGame {
                offset -= 1;
            } else if p.status == PlayerStatus::Waiting
                && (offset == 1 || (offset == 2 && !p.wait_for_bb))
            {
                offset -= 1;
            }
            if offset == 0 {
                break;
            }
        }
        index
    }

    /// Остался один претендент на банк.
    pub fn is_end_game(&self) -> bool {
        self.folds_count + 1 >= self.game_players_count
    }

    /// Раунд закрыт, а торговаться больше некому: все, кроме максимум одного, в олл-ине.
    pub fn is_end_all_in_game(&self) -> bool {
        let last_is_new_round = self
            .acts
            .last()
            .map(|a| a.act.kind == ActKind::NewRound)
            .unwrap_or(false);
        last_is_new_round && self.folds_count + self.allin_count + 1 >= self.game_players_count
    }

    /// Обойти места раздачи начиная с `start`: ровно `game_players_count` шагов.
    pub fn dealt_in_order(&self, start: SeatIndex) -> Vec<SeatIndex> {
        let mut order = Vec::with_capacity(self.game_players_count);
        let mut index = start;
        for _ in 0..self.game_players_count {
            order.push(index);
            index = self.next_dealt_in_index(index, 1);
        }
        order
    }

    pub fn set_last_time(&mut self, now: u64) {
        self.timestamp = now;
    }
}
