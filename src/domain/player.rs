use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::act::{Act, ActKind};
use crate::domain::chips::Chips;
use crate::domain::{CardIndex, PlayerId};

/// Статус игрока в контексте стола и текущей раздачи.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PlayerStatus {
    /// Сел за стол и ждёт следующей раздачи.
    Waiting,
    /// Участвует в текущей раздаче (в том числе в олл-ине).
    InGame,
    /// Сфолдил в текущей раздаче.
    Fold,
    /// Не ответил вовремя, снят с раздачи.
    Timeout,
    /// Ушёл из-за стола посреди раздачи.
    Out,
    /// Свободное место.
    NoSeat,
}

impl PlayerStatus {
    /// Статусы, которые обходит круговой поиск мест текущей раздачи.
    pub fn is_dealt_in(self) -> bool {
        matches!(
            self,
            PlayerStatus::InGame | PlayerStatus::Fold | PlayerStatus::Out | PlayerStatus::Timeout
        )
    }

    /// Выбыл из розыгрыша банка (карты не вскрываются).
    pub fn is_out_of_hand(self) -> bool {
        matches!(self, PlayerStatus::Fold | PlayerStatus::Out | PlayerStatus::Timeout)
    }
}

/// Как докупаться, когда стек упал ниже большого блайнда.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RebuyPolicy {
    pub autorebuy: bool,
    /// До скольких малых блайндов докупать стек.
    pub buyin_sb: u32,
}

/// Состояние игрока за конкретным столом.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerAtTable {
    pub player_id: PlayerId,
    pub status: PlayerStatus,

    /// Новичок, обязанный один раз поставить BB вне очереди.
    pub extra_bb: bool,
    /// Новичок ждёт, пока BB дойдёт до него естественным образом.
    pub wait_for_bb: bool,
    /// Игрок уже прислал своё событие в текущей фазе ожидания.
    pub has_event: bool,
    pub rebuy: RebuyPolicy,

    /// Стек на начало раздачи (для сброса по таймауту).
    pub start_stack: Chips,
    pub stack: Chips,
    /// Сколько всего вложено в текущую раздачу.
    pub sum_of_bets: Chips,
    pub rake: Chips,
    /// Вклад в текущем раунде торговли.
    pub cur_round_bets: Chips,

    pub all_in: bool,
    /// Размер банка стола в момент олл-ина.
    pub all_in_bank: Chips,
    pub all_in_round: u8,

    pub count_of_acts: u32,
    pub card_indexes: Vec<CardIndex>,
    pub acts: Vec<Act>,

    /// Индексы транзакций, применённых в этой раздаче.
    pub applied_trxs: BTreeSet<u64>,
    /// Опоздавшие транзакции, ждущие повторной отправки.
    pub late_trxs: BTreeSet<u64>,
    pub applied_late_trxs: BTreeSet<u64>,

    /// Ждём ключей этого игрока от хранителя (режим эскроу).
    pub wait_escrow: bool,
}

impl PlayerAtTable {
    pub fn new(player_id: PlayerId, stack: Chips, wait_for_bb: bool, rebuy: RebuyPolicy) -> Self {
        Self {
            player_id,
            status: PlayerStatus::Waiting,
            extra_bb: false,
            wait_for_bb,
            has_event: false,
            rebuy,
            start_stack: stack,
            stack,
            sum_of_bets: Chips::ZERO,
            rake: Chips::ZERO,
            cur_round_bets: Chips::ZERO,
            all_in: false,
            all_in_bank: Chips::ZERO,
            all_in_round: 0,
            count_of_acts: 0,
            card_indexes: Vec::new(),
            acts: Vec::new(),
            applied_trxs: BTreeSet::new(),
            late_trxs: BTreeSet::new(),
            applied_late_trxs: BTreeSet::new(),
            wait_escrow: false,
        }
    }

    /// Пустое место (игрок ушёл, индекс сохраняется).
    pub fn empty_seat() -> Self {
        let mut seat = Self::new(0, Chips::ZERO, false, RebuyPolicy { autorebuy: false, buyin_sb: 0 });
        seat.status = PlayerStatus::NoSeat;
        seat
    }

    pub fn is_empty_seat(&self) -> bool {
        self.status == PlayerStatus::NoSeat
    }

    /// Сбросить всё, что относится к одной раздаче.
    pub fn clear_game_info(&mut self) {
        self.card_indexes.clear();
        self.acts.clear();
        self.cur_round_bets = Chips::ZERO;
        self.all_in_bank = Chips::ZERO;
        self.all_in_round = 0;
        self.all_in = false;
        self.count_of_acts = 0;
        self.sum_of_bets = Chips::ZERO;
        self.rake = Chips::ZERO;
        self.has_event = false;
        self.wait_escrow = false;
        self.applied_trxs.clear();
        self.late_trxs.clear();
        self.applied_late_trxs.clear();
    }

    /// Учесть действие в личном журнале и стеке.
    /// Для ставок и блайндов списывается только недостающая до `bet` часть.
    pub fn record_act(&mut self, act: Act) {
        self.acts.push(act);

        if act.moves_chips() {
            let odds = act.bet.saturating_sub(self.cur_round_bets);
            self.stack -= odds;
            self.cur_round_bets += odds;
            if self.stack.is_zero() {
                self.all_in = true;
            }
            self.sum_of_bets += odds;
        }
        self.count_of_acts += 1;
    }

    /// Последняя ставка игрока (ноль, если действий не было).
    pub fn last_bet(&self) -> Chips {
        self.acts.last().map(|a| a.bet).unwrap_or(Chips::ZERO)
    }

    pub fn last_act_kind(&self) -> Option<ActKind> {
        self.acts.last().map(|a| a.kind)
    }

    pub fn hole_indexes(&self) -> Option<(CardIndex, CardIndex)> {
        match self.card_indexes.as_slice() {
            [a, b] => Some((*a, *b)),
            _ => None,
        }
    }
}
