use crate::domain::chips::Chips;
use crate::domain::table::TableStatus;
use crate::domain::{CardIndex, PlayerId, SeatIndex};

use thiserror::Error;

/// Ошибки движка покера.
///
/// Любая ошибка отменяет событие целиком: состояние стола не меняется.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Место {0} не существует за столом")]
    InvalidSeat(SeatIndex),

    #[error("Игрок {0} не найден за столом")]
    PlayerNotAtTable(PlayerId),

    #[error("Игрок {0} уже сидит за этим столом")]
    AlreadySeated(PlayerId),

    #[error("Игрок {0} уже играет за другим столом")]
    PlayerAtAnotherTable(PlayerId),

    #[error("Стол заполнен")]
    TableFull,

    #[error("Событие недопустимо в состоянии стола {0:?}")]
    WrongTableStatus(TableStatus),

    #[error("Сейчас не ход игрока с id={0}")]
    NotPlayersTurn(PlayerId),

    #[error("Игрок {0} не участвует в раздаче")]
    PlayerNotInGame(PlayerId),

    #[error("Колода должна содержать 52 карты, получено {0}")]
    WrongDeckSize(usize),

    #[error("Ставка должна быть положительной")]
    ZeroBet,

    #[error("Недостаточно фишек для этой ставки")]
    NotEnoughChips,

    #[error("Первая ставка должна быть кратна малому блайнду и не меньше двух блайндов")]
    InvalidOpeningBet,

    #[error("Размер рейза слишком мал")]
    RaiseTooSmall,

    #[error("Невозможно выполнить check – нужно хотя бы уравнять ставку")]
    CannotCheck,

    #[error("Check не может содержать ставку")]
    CheckWithBet,

    #[error("Этим событием можно только ставить или чекать")]
    UnsupportedAct,

    #[error("Неверное количество ключей: ожидалось {expected}, получено {actual}")]
    WrongKeyCount { expected: usize, actual: usize },

    #[error("Неожиданный ключ для карты {actual}, ожидался {expected}")]
    WrongKeyIndex { expected: CardIndex, actual: CardIndex },

    #[error("Набор ключей неверен на карте {0}")]
    KeySetMismatch(CardIndex),

    #[error("Для карты {0} не хватает ключей")]
    MissingCardKeys(CardIndex),

    #[error("Ключи от хранителя прислали не для тех игроков")]
    WrongEscrowPlayers,

    #[error("Малый блайнд {0} не разрешён параметрами")]
    SmallBlindNotAllowed(Chips),

    #[error("Размер стола {0} не разрешён параметрами")]
    TableSizeNotAllowed(usize),

    #[error("Бай-ин {0} вне допустимого диапазона")]
    BuyInOutOfRange(Chips),

    #[error("Недостаточно средств: нужно {needed}, на счёте {available}")]
    InsufficientBalance { needed: Chips, available: Chips },

    #[error("Таймаут ещё не наступил, осталось {remaining} с")]
    TimeoutNotElapsed { remaining: u64 },

    #[error("Внутренняя ошибка: {0}")]
    Internal(&'static str),
}
