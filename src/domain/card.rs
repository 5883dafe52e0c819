use core::cmp::Reverse;
use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Масти в порядке кодирования на проводе: 0 = пики, 1 = червы, 2 = бубны, 3 = трефы.
pub const SUIT_SPADES: u8 = 0;
pub const SUIT_HEARTS: u8 = 1;
pub const SUIT_DIAMONDS: u8 = 2;
pub const SUIT_CLUBS: u8 = 3;

pub const MIN_CARD_VALUE: u8 = 2;
pub const ACE_VALUE: u8 = 14;

/// Карта колоды. Хранится сырыми байтами (масть, значение):
/// пока карта зашифрована, оба байта — произвольный шифротекст,
/// после снятия всех слоёв — настоящая масть `0..=3` и значение `2..=14`.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Card {
    pub suit: u8,
    pub value: u8,
}

impl Card {
    pub const fn new(suit: u8, value: u8) -> Self {
        Self { suit, value }
    }

    /// Похожа ли карта на открытую (валидные масть и значение).
    pub fn is_plain(&self) -> bool {
        self.suit <= SUIT_CLUBS && (MIN_CARD_VALUE..=ACE_VALUE).contains(&self.value)
    }

    /// 8-байтовый блок шифра: [масть, значение, 0, 0, 0, 0, 0, 0].
    pub fn to_block(self) -> [u8; 8] {
        let mut block = [0u8; 8];
        block[0] = self.suit;
        block[1] = self.value;
        block
    }

    /// Обратное к `to_block`: значимы только первые два байта.
    pub fn from_block(block: [u8; 8]) -> Self {
        Self {
            suit: block[0],
            value: block[1],
        }
    }
}

/// Отсортировать карты по убыванию значения.
/// Сортировка стабильная: карты с одинаковым значением сохраняют исходный порядок.
pub fn sort_desc(cards: &mut [Card]) {
    cards.sort_by_key(|c| Reverse(c.value));
}

fn value_char(value: u8) -> Option<char> {
    let ch = match value {
        2..=9 => char::from(b'0' + value),
        10 => 'T',
        11 => 'J',
        12 => 'Q',
        13 => 'K',
        14 => 'A',
        _ => return None,
    };
    Some(ch)
}

fn suit_char(suit: u8) -> Option<char> {
    match suit {
        SUIT_SPADES => Some('s'),
        SUIT_HEARTS => Some('h'),
        SUIT_DIAMONDS => Some('d'),
        SUIT_CLUBS => Some('c'),
        _ => None,
    }
}

impl fmt::Display for Card {
    /// Формат вида `As`, `Td`, `7c`; зашифрованная карта печатается как `??`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (value_char(self.value), suit_char(self.suit)) {
            (Some(v), Some(s)) => write!(f, "{v}{s}"),
            _ => write!(f, "??"),
        }
    }
}

/// Парсинг строки вида "As", "Td", "7c".
impl FromStr for Card {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(v_ch), Some(s_ch), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err("Card string must have length 2".into());
        };

        let value = match v_ch {
            '2'..='9' => v_ch as u8 - b'0',
            'T' | 't' => 10,
            'J' | 'j' => 11,
            'Q' | 'q' => 12,
            'K' | 'k' => 13,
            'A' | 'a' => ACE_VALUE,
            _ => return Err(format!("Invalid rank: {v_ch}")),
        };

        let suit = match s_ch {
            's' | 'S' => SUIT_SPADES,
            'h' | 'H' => SUIT_HEARTS,
            'd' | 'D' => SUIT_DIAMONDS,
            'c' | 'C' => SUIT_CLUBS,
            _ => return Err(format!("Invalid suit: {s_ch}")),
        };

        Ok(Card { suit, value })
    }
}
