//! Шифрование карт.
//!
//! Карта кодируется блоком `[масть, значение, 0 x 6]`, на который
//! накладывается гамма ключа игрока. Снятие слоя и наложение совпадают.

pub mod gost;

use crate::domain::card::Card;
use crate::domain::key::CardKey;

pub use gost::{advance_synchro, apply_gamma, gamma, main_step, GostKey};

/// Снять с карты слой шифрования одного игрока.
///
/// Мусорные байты 2..8 блока отбрасываются: значимы только масть и значение.
pub fn decrypt_card(card: Card, key: &CardKey) -> Card {
    Card::from_block(apply_gamma(card.to_block(), &key.key, &key.synchro))
}

/// Наложить слой шифрования на карту. Гамма симметрична, поэтому это
/// та же операция, что и `decrypt_card`.
pub fn encrypt_card(card: Card, key: &CardKey) -> Card {
    decrypt_card(card, key)
}
