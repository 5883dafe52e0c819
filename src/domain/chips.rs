use core::iter::Sum;
use core::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Количество фишек. Обёртка над u64, чтобы не путать с индексами мест и карт.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Chips(pub u64);

impl Chips {
    pub const ZERO: Chips = Chips(0);

    pub const fn new(amount: u64) -> Self {
        Chips(amount)
    }

    pub const fn amount(self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Безопасное вычитание, не даёт уйти в минус.
    pub fn saturating_sub(self, other: Chips) -> Chips {
        Chips(self.0.saturating_sub(other.0))
    }

    /// Честное вычитание: `None`, если фишек не хватает.
    /// Используется там, где нехватка означает сломанный инвариант банка.
    pub fn checked_sub(self, other: Chips) -> Option<Chips> {
        self.0.checked_sub(other.0).map(Chips)
    }

    /// Кратно ли значение `unit` (проверка размера ставки относительно SB).
    pub fn is_multiple_of(self, unit: Chips) -> bool {
        unit.0 != 0 && self.0 % unit.0 == 0
    }

    /// Процент с округлением к ближайшему (рейк со всего банка).
    pub fn percent_rounded(self, percent: f64) -> Chips {
        Chips((self.0 as f64 * percent / 100.0).round() as u64)
    }

    /// Процент с округлением вверх (рейк с одного игрока).
    pub fn percent_ceil(self, percent: f64) -> Chips {
        Chips((self.0 as f64 * percent / 100.0).ceil() as u64)
    }

    /// Процент с отбрасыванием дробной части (рейк сайд-пота).
    pub fn percent_trunc(self, percent: f64) -> Chips {
        Chips((self.0 as f64 * percent / 100.0) as u64)
    }
}

impl core::fmt::Display for Chips {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Chips {
    type Output = Chips;

    fn add(self, rhs: Chips) -> Self::Output {
        Chips(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Chips {
    fn add_assign(&mut self, rhs: Chips) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Chips {
    type Output = Chips;

    fn sub(self, rhs: Chips) -> Self::Output {
        Chips(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Chips {
    fn sub_assign(&mut self, rhs: Chips) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Mul<u64> for Chips {
    type Output = Chips;

    fn mul(self, rhs: u64) -> Self::Output {
        Chips(self.0.saturating_mul(rhs))
    }
}

/// Целочисленное деление банка (делёж между победителями).
impl Div<u64> for Chips {
    type Output = Chips;

    fn div(self, rhs: u64) -> Self::Output {
        if rhs == 0 {
            return Chips::ZERO;
        }
        Chips(self.0 / rhs)
    }
}

impl Sum for Chips {
    fn sum<I: Iterator<Item = Chips>>(iter: I) -> Self {
        iter.fold(Chips::ZERO, |acc, c| acc + c)
    }
}

impl<'a> Sum<&'a Chips> for Chips {
    fn sum<I: Iterator<Item = &'a Chips>>(iter: I) -> Self {
        iter.fold(Chips::ZERO, |acc, c| acc + *c)
    }
}
