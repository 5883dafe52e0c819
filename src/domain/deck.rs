use serde::{Deserialize, Serialize};

use crate::domain::card::{Card, ACE_VALUE, MIN_CARD_VALUE};
use crate::domain::CardIndex;
use crate::engine::errors::EngineError;

pub const DECK_SIZE: usize = 52;

/// Колода стола: 52 карты с адресацией по индексу.
///
/// Индексы `0..2N` заняты карманными картами (по две на игрока в порядке рассадки),
/// дальше идут карты борда, остальное в раздаче не используется.
/// Перемешивание и шифрование делают клиенты, стол только хранит присланное.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Каноническая колода: масть 0 значения 2..A, затем масти 1, 2, 3.
    pub fn canonical() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in 0..4u8 {
            for value in MIN_CARD_VALUE..=ACE_VALUE {
                cards.push(Card::new(suit, value));
            }
        }
        Deck { cards }
    }

    /// Колода, присланная игроком. Проверяется только размер:
    /// содержимое зашифровано и стол его не понимает.
    pub fn from_cards(cards: Vec<Card>) -> Result<Self, EngineError> {
        if cards.len() != DECK_SIZE {
            return Err(EngineError::WrongDeckSize(cards.len()));
        }
        Ok(Deck { cards })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, index: CardIndex) -> Result<Card, EngineError> {
        self.cards
            .get(index as usize)
            .copied()
            .ok_or(EngineError::Internal("card index out of deck"))
    }

    pub fn card_mut(&mut self, index: CardIndex) -> Result<&mut Card, EngineError> {
        self.cards
            .get_mut(index as usize)
            .ok_or(EngineError::Internal("card index out of deck"))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::canonical()
    }
}
