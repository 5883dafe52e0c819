// src/domain/act.rs

use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::{PlayerId, SeatIndex};

/// Вид записанного действия.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ActKind {
    SmallBlind,
    BigBlind,
    Bet,
    Fold,
    Check,
    /// Служебная отметка стола: закрыт раунд торговли.
    NewRound,
}

/// Что на самом деле означала ставка после проверки.
///
/// Открывающая ставка остаётся `Bet`, уравнивание становится `Call`,
/// повышение `Raise`, ставка всего стека `AllIn`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ActDescription {
    None,
    Bet,
    Check,
    Call,
    Raise,
    AllIn,
}

/// Одно действие. `bet` означает целевую сумму вклада игрока в текущем раунде,
/// а не прирост к уже поставленному.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Act {
    pub kind: ActKind,
    pub bet: Chips,
    pub description: ActDescription,
}

impl Act {
    pub const fn new(kind: ActKind, bet: Chips) -> Self {
        Self {
            kind,
            bet,
            description: ActDescription::None,
        }
    }

    pub const fn bet(amount: Chips) -> Self {
        Self {
            kind: ActKind::Bet,
            bet: amount,
            description: ActDescription::Bet,
        }
    }

    pub const fn check() -> Self {
        Self {
            kind: ActKind::Check,
            bet: Chips::ZERO,
            description: ActDescription::Check,
        }
    }

    pub const fn fold() -> Self {
        Self::new(ActKind::Fold, Chips::ZERO)
    }

    /// Двигает ли действие фишки (ставка или блайнд).
    pub fn moves_chips(&self) -> bool {
        matches!(self.kind, ActKind::Bet | ActKind::SmallBlind | ActKind::BigBlind)
    }
}

/// Запись в общем хронологическом журнале стола.
/// У `NewRound` нет места и игрока.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerAct {
    pub seat: Option<SeatIndex>,
    pub player_id: Option<PlayerId>,
    pub act: Act,
}

impl PlayerAct {
    pub fn by_seat(seat: SeatIndex, player_id: PlayerId, act: Act) -> Self {
        Self {
            seat: Some(seat),
            player_id: Some(player_id),
            act,
        }
    }

    pub fn new_round() -> Self {
        Self {
            seat: None,
            player_id: None,
            act: Act::new(ActKind::NewRound, Chips::ZERO),
        }
    }
}

/// Что игроку разрешено сделать сейчас (подсказка клиенту).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PossibleMove {
    Fold,
    Bet,
    Call,
    Check,
}
