use serde::{Deserialize, Serialize};

use crate::domain::CardIndex;

/// Ключ одного слоя шифрования одной карты.
///
/// Игрок публикует его, когда протокол раскрытия разрешает показать карту.
/// После применения ключ хранится на столе только для карманных карт.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CardKey {
    pub card_index: CardIndex,
    /// 256 бит: восемь 32-битных подключей в little-endian.
    pub key: [u8; 32],
    /// 64-битная синхропосылка в little-endian.
    pub synchro: [u8; 8],
}

impl CardKey {
    pub const fn new(card_index: CardIndex, key: [u8; 32], synchro: [u8; 8]) -> Self {
        Self {
            card_index,
            key,
            synchro,
        }
    }
}

/// Ключ, сданный на хранение доверенному хранителю в режиме эскроу.
/// Содержимое запечатано для хранителя, стол его не читает.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SealedKey {
    pub card_index: CardIndex,
    pub sealed: Vec<u8>,
}

/// Отсортировать ключи по индексу карты (по возрастанию).
pub fn sort_by_index(keys: &mut [CardKey]) {
    keys.sort_by_key(|k| k.card_index);
}
