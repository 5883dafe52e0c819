//! Клиентская сторона протокола раскрытия: ключи одного игрока на одну раздачу.
//!
//! Используется тестами и dev CLI, чтобы играть за симулированных игроков.
//! Ключи выводятся из seed игрока через SHA-256, так что раздача
//! воспроизводима.

use sha2::{Digest, Sha256};

use crate::cipher::{decrypt_card, encrypt_card};
use crate::domain::card::Card;
use crate::domain::deck::DECK_SIZE;
use crate::domain::key::{CardKey, SealedKey};
use crate::domain::table::{Table, TableStatus};
use crate::domain::{CardIndex, PlayerId, TableId};
use crate::engine::validation::fold_keys_start;
use crate::infra::rng::RandomSource;
use crate::infra::rng_seed::RngSeed;

/// Слот ключа перемешивания (за пределами индексов карт).
const SHUFFLE_SLOT: u64 = 0xFFFF;

fn derive_key(seed: &RngSeed, slot: u64, card_index: CardIndex) -> CardKey {
    let mut hasher = Sha256::new();
    hasher.update(b"REVEAL_POKER_CARD_KEY");
    hasher.update(seed.bytes);
    hasher.update(slot.to_le_bytes());
    let key: [u8; 32] = hasher.finalize().into();

    let mut hasher = Sha256::new();
    hasher.update(b"REVEAL_POKER_SYNCHRO");
    hasher.update(key);
    let digest = hasher.finalize();
    let mut synchro = [0u8; 8];
    synchro.copy_from_slice(&digest[..8]);

    CardKey::new(card_index, key, synchro)
}

/// Запечатать ключ для хранителя. Формат: 32 байта ключа, 8 байт синхропосылки.
pub fn seal_key(key: &CardKey) -> SealedKey {
    let mut sealed = Vec::with_capacity(40);
    sealed.extend_from_slice(&key.key);
    sealed.extend_from_slice(&key.synchro);
    SealedKey {
        card_index: key.card_index,
        sealed,
    }
}

/// Распечатать ключ на стороне хранителя.
pub fn unseal_key(sealed: &SealedKey) -> Option<CardKey> {
    if sealed.sealed.len() != 40 {
        return None;
    }
    let mut key = [0u8; 32];
    let mut synchro = [0u8; 8];
    key.copy_from_slice(&sealed.sealed[..32]);
    synchro.copy_from_slice(&sealed.sealed[32..]);
    Some(CardKey::new(sealed.card_index, key, synchro))
}

/// Ключи игрока на раздачу: общий ключ перемешивания и по ключу на каждую позицию колоды.
#[derive(Clone, Debug)]
pub struct PlayerKeyring {
    player_id: PlayerId,
    shuffle_key: CardKey,
    card_keys: Vec<CardKey>,
}

impl PlayerKeyring {
    pub fn for_hand(seed: &RngSeed, player_id: PlayerId, table_id: TableId, game_id: u64) -> Self {
        let hand_seed = seed.derive(table_id, game_id, player_id);
        let card_keys = (0..DECK_SIZE)
            .map(|i| derive_key(&hand_seed, i as u64, i as CardIndex))
            .collect();

        Self {
            player_id,
            shuffle_key: derive_key(&hand_seed, SHUFFLE_SLOT, 0),
            card_keys,
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn card_key(&self, index: CardIndex) -> Option<&CardKey> {
        self.card_keys.get(index as usize)
    }

    /// Перемешать: наложить ключ перемешивания на все карты и переставить их.
    pub fn shuffle_deck(&self, cards: &[Card], rng: &mut impl RandomSource) -> Vec<Card> {
        let mut deck: Vec<Card> = cards.iter().map(|&c| encrypt_card(c, &self.shuffle_key)).collect();
        rng.shuffle(&mut deck);
        deck
    }

    /// Зашифровать: снять свой ключ перемешивания и наложить ключ позиции.
    pub fn encrypt_deck(&self, cards: &[Card]) -> Vec<Card> {
        cards
            .iter()
            .zip(self.card_keys.iter())
            .map(|(&card, key)| encrypt_card(decrypt_card(card, &self.shuffle_key), key))
            .collect()
    }

    fn keys_for(&self, indexes: impl IntoIterator<Item = CardIndex>) -> Vec<CardKey> {
        indexes
            .into_iter()
            .filter_map(|i| self.card_key(i).cloned())
            .collect()
    }

    /// Собственные карманные индексы игрока за этим столом.
    pub fn own_indexes(&self, table: &Table) -> Option<(CardIndex, CardIndex)> {
        let seat = table.seat_of(self.player_id)?;
        table.players[seat].hole_indexes()
    }

    /// Ключи текущей фазы раскрытия. Вне фаз ключей пусто.
    pub fn phase_keys(&self, table: &Table) -> Vec<CardKey> {
        let Some((own1, own2)) = self.own_indexes(table) else {
            return Vec::new();
        };
        let waiting = table.waiting_keys.iter().copied();

        match table.status {
            TableStatus::WaitKeysForPlayers => self.keys_for(waiting.filter(|&i| i != own1 && i != own2)),
            TableStatus::WaitKeysForShowdown => self.keys_for(waiting),
            TableStatus::WaitAllKeys | TableStatus::WaitAllInKeys => {
                self.keys_for([own1, own2].into_iter().chain(waiting))
            }
            _ => Vec::new(),
        }
    }

    /// Ключи фолда: все карты после уже назначенных на борд.
    pub fn fold_keys(&self, table: &Table) -> Vec<CardKey> {
        let start = fold_keys_start(table);
        self.keys_for((start..DECK_SIZE).map(|i| i as CardIndex))
    }

    fn all_but_own(&self, table: &Table) -> Vec<CardKey> {
        let own = self.own_indexes(table);
        self.keys_for(
            (0..DECK_SIZE as CardIndex).filter(|&i| own.map(|(a, b)| i != a && i != b).unwrap_or(true)),
        )
    }

    /// Ключи при уходе из-за стола посреди раздачи.
    pub fn exit_keys(&self, table: &Table) -> Vec<CardKey> {
        self.all_but_own(table)
    }

    /// Запечатанные ключи для хранителя (режим эскроу).
    pub fn sealed_escrow_keys(&self, table: &Table) -> Vec<SealedKey> {
        self.all_but_own(table).iter().map(seal_key).collect()
    }

    /// Открыть свои карманные карты: чужие слои по ключам со стола, свой слой своим ключом.
    pub fn reveal_hole_cards(&self, table: &Table) -> Option<[Card; 2]> {
        let (own1, own2) = self.own_indexes(table)?;
        let reveal = |index: CardIndex| -> Option<Card> {
            let mut card = table.deck.card(index).ok()?;
            for key in table.all_keys.iter().filter(|k| k.card_index == index) {
                card = decrypt_card(card, key);
            }
            Some(decrypt_card(card, self.card_key(index)?))
        };
        Some([reveal(own1)?, reveal(own2)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deck::Deck;
    use crate::infra::rng::DeterministicRng;

    #[test]
    fn shuffle_then_encrypt_then_decrypt_restores_cards() {
        let keyring = PlayerKeyring::for_hand(&RngSeed::from_u64(42), 1, 1, 0);
        let mut rng = DeterministicRng::from_u64(1);
        let shuffled = keyring.shuffle_deck(Deck::canonical().cards(), &mut rng);
        let encrypted = keyring.encrypt_deck(&shuffled);

        for (i, card) in encrypted.iter().enumerate() {
            let plain = decrypt_card(*card, keyring.card_key(i as CardIndex).unwrap());
            assert!(plain.is_plain());
        }
    }

    #[test]
    fn sealed_key_roundtrip() {
        let keyring = PlayerKeyring::for_hand(&RngSeed::from_u64(3), 9, 1, 5);
        let key = keyring.card_key(17).unwrap().clone();
        assert_eq!(unseal_key(&seal_key(&key)), Some(key));
    }
}
