use serde::{Deserialize, Serialize};

use crate::domain::act::Act;
use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::result::HandOutcome;
use crate::domain::{CardIndex, GameId, PlayerId, SeatIndex, TableId};

/// Тип события в раздаче.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum HandEventKind {
    /// Новая раздача началась.
    HandStarted {
        table_id: TableId,
        game_id: GameId,
        dealer: SeatIndex,
        small_blind: SeatIndex,
        big_blind: SeatIndex,
        players: usize,
    },

    /// Игрок прислал перемешанную колоду.
    DeckShuffled { seat: SeatIndex },

    /// Игрок наложил свой слой шифрования.
    DeckEncrypted { seat: SeatIndex },

    /// Блайнд.
    BlindPosted {
        seat: SeatIndex,
        player_id: PlayerId,
        amount: Chips,
    },

    /// Действие игрока (после проверки, с описанием).
    PlayerActed {
        seat: SeatIndex,
        player_id: PlayerId,
        act: Act,
        stack_after: Chips,
        bank_after: Chips,
    },

    /// Раунд торговли закрыт.
    RoundClosed { round: u8, bank: Chips },

    /// На борд легли открытые карты.
    BoardRevealed { cards: Vec<Card> },

    /// Игрок сдал ключи текущей фазы.
    KeysSubmitted {
        seat: SeatIndex,
        indexes: Vec<CardIndex>,
    },

    PlayerTimedOut { seat: SeatIndex, player_id: PlayerId },

    PlayerLeft { seat: SeatIndex, player_id: PlayerId },

    /// Раздача рассчитана.
    HandSettled {
        outcome: HandOutcome,
        bank: Chips,
        rake: Chips,
    },
}

/// Событие в раздаче с порядковым номером.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HandEvent {
    pub index: u32,
    pub kind: HandEventKind,
}

/// Полная история раздачи.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct HandHistory {
    pub events: Vec<HandEvent>,
}

impl HandHistory {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, kind: HandEventKind) {
        let idx = self.events.len() as u32;
        self.events.push(HandEvent { index: idx, kind });
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
