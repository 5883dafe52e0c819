use core::cmp::Ordering;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::card::Card;

/// Размер комбинации.
pub const COMBO_SIZE: usize = 5;

/// Тип комбинации по силе, от слабой к сильной.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CombinationKind {
    /// Комбинации нет (в пуле меньше 5 карт).
    #[default]
    NoCombination = 0,
    HighCard = 1,
    Pair = 2,
    TwoPairs = 3,
    ThreeOfAKind = 4,
    Straight = 5,
    Flush = 6,
    FullHouse = 7,
    FourOfAKind = 8,
    StraightFlush = 9,
    RoyalFlush = 10,
}

impl CombinationKind {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Человекочитаемое название (для логов и CLI).
    pub fn describe(self) -> &'static str {
        match self {
            CombinationKind::NoCombination => "No combination",
            CombinationKind::HighCard => "High card",
            CombinationKind::Pair => "One pair",
            CombinationKind::TwoPairs => "Two pair",
            CombinationKind::ThreeOfAKind => "Three of a kind",
            CombinationKind::Straight => "Straight",
            CombinationKind::Flush => "Flush",
            CombinationKind::FullHouse => "Full house",
            CombinationKind::FourOfAKind => "Four of a kind",
            CombinationKind::StraightFlush => "Straight flush",
            CombinationKind::RoyalFlush => "Royal flush",
        }
    }
}

/// Лучшая 5-карточная рука.
///
/// Порядок карт фиксирован вычислителем: сначала карты, образующие комбинацию,
/// затем кикеры по убыванию. Для стрита-колеса туз стоит последним.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Combination {
    pub kind: CombinationKind,
    pub cards: [Card; COMBO_SIZE],
}

impl Combination {
    pub const fn new(kind: CombinationKind, cards: [Card; COMBO_SIZE]) -> Self {
        Self { kind, cards }
    }

    /// Пустая комбинация (`NoCombination`).
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.kind == CombinationKind::NoCombination
    }

    /// Сравнение силы двух рук.
    ///
    /// Разные типы сравниваются по типу. Одинаковые: покарточно по значению,
    /// стриты только по старшей карте, роял-флеши и пустые комбинации всегда равны.
    /// Масти не учитываются.
    pub fn rank_cmp(&self, other: &Combination) -> Ordering {
        match self.kind.cmp(&other.kind) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match self.kind {
            CombinationKind::Straight | CombinationKind::StraightFlush => {
                self.cards[0].value.cmp(&other.cards[0].value)
            }
            CombinationKind::RoyalFlush | CombinationKind::NoCombination => Ordering::Equal,
            _ => self
                .cards
                .iter()
                .zip(other.cards.iter())
                .map(|(a, b)| a.value.cmp(&b.value))
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal),
        }
    }

    /// Строго сильнее.
    pub fn beats(&self, other: &Combination) -> bool {
        self.rank_cmp(other) == Ordering::Greater
    }

    /// Не сильнее и не слабее (делёж банка).
    pub fn ties(&self, other: &Combination) -> bool {
        self.rank_cmp(other) == Ordering::Equal
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.describe())?;
        if !self.is_none() {
            write!(f, " [")?;
            for (i, card) in self.cards.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{card}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}
