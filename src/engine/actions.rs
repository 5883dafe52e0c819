use serde::{Deserialize, Serialize};

use crate::domain::act::Act;
use crate::domain::card::Card;
use crate::domain::key::{CardKey, SealedKey};
use crate::domain::table::TableStatus;
use crate::domain::{GameId, PlayerId};
use crate::engine::effects::TableEffect;

/// Какое подтверждение присылает игрок.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AckKind {
    /// Готов начать раздачу.
    StartOfHand,
    /// Увидел итоги раздачи.
    EndOfHand,
}

/// Событие игрока для стола.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum TableCommand {
    /// Перемешанная колода (52 карты).
    SubmitShuffledDeck { cards: Vec<Card> },
    /// Колода с наложенным слоем шифрования игрока.
    /// `escrow_keys` передаются только в режиме эскроу.
    SubmitEncryptionLayer {
        cards: Vec<Card>,
        escrow_keys: Vec<SealedKey>,
    },
    /// Ставка или check.
    SubmitAction { act: Act },
    /// Фолд с ключами от всех ещё не сданных карт.
    SubmitFold { keys: Vec<CardKey> },
    /// Ключи текущей фазы раскрытия.
    SubmitCardKeys { keys: Vec<CardKey> },
    /// Кто-то не ответил вовремя. `expected_status` защищает от гонки:
    /// если стол уже ушёл в другое состояние, событие игнорируется.
    ForceTimeout { expected_status: TableStatus },
    RequestAck(AckKind),
}

impl TableCommand {
    pub fn name(&self) -> &'static str {
        match self {
            TableCommand::SubmitShuffledDeck { .. } => "submit_shuffled_deck",
            TableCommand::SubmitEncryptionLayer { .. } => "submit_encryption_layer",
            TableCommand::SubmitAction { .. } => "submit_action",
            TableCommand::SubmitFold { .. } => "submit_fold",
            TableCommand::SubmitCardKeys { .. } => "submit_card_keys",
            TableCommand::ForceTimeout { .. } => "force_timeout",
            TableCommand::RequestAck(_) => "request_ack",
        }
    }
}

/// Событие вместе с адресом отправителя и метками порядка.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub player_id: PlayerId,
    pub game_id: GameId,
    /// Логическое время, на которое опирался клиент.
    pub timestamp: u64,
    /// Номер транзакции игрока (для идемпотентности).
    pub trx_index: u64,
    pub command: TableCommand,
}

/// Почему событие принято без изменений.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    /// Событие относится к другой раздаче.
    StaleGame,
    /// Опоздавшее событие уже было применено.
    LateDuplicate,
    /// Транзакция с этим номером уже применена.
    AlreadyApplied,
    /// Игрок уже отправил событие этой фазы.
    AlreadyAcknowledged,
    /// Стол уже в другом состоянии.
    StatusMismatch,
    /// Стол ждёт игроков, ждать некого.
    NothingToWait,
    /// Игрок уже снят по таймауту.
    TimedOut,
}

/// Как стол обошёлся с событием.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Disposition {
    Applied,
    /// Опоздало: запомнено и ждёт повторной отправки.
    Deferred,
    Ignored(IgnoreReason),
}

/// Результат обработки события.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CommandOutcome {
    pub disposition: Disposition,
    pub effects: Vec<TableEffect>,
}

impl CommandOutcome {
    pub fn applied(effects: Vec<TableEffect>) -> Self {
        Self {
            disposition: Disposition::Applied,
            effects,
        }
    }

    pub fn ignored(reason: IgnoreReason) -> Self {
        Self {
            disposition: Disposition::Ignored(reason),
            effects: Vec::new(),
        }
    }

    pub fn is_applied(&self) -> bool {
        self.disposition == Disposition::Applied
    }
}
