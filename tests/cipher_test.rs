//! Шифр карт: эталонные значения гаммы и свойства слоёв.

use reveal_poker_engine::cipher::{apply_gamma, decrypt_card, encrypt_card, gamma, GostKey};
use reveal_poker_engine::domain::card::Card;
use reveal_poker_engine::domain::deck::Deck;
use reveal_poker_engine::domain::key::CardKey;

fn seq_key() -> ([u8; 32], [u8; 8]) {
    let mut key = [0u8; 32];
    for (i, b) in key.iter_mut().enumerate() {
        *b = i as u8;
    }
    let mut synchro = [0u8; 8];
    for (i, b) in synchro.iter_mut().enumerate() {
        *b = i as u8;
    }
    (key, synchro)
}

#[test]
fn gamma_of_zero_key_and_zero_synchro() {
    let key = GostKey::from_bytes(&[0u8; 32]);
    assert_eq!(gamma(&key, 0), 0x9467_9546_ad1f_e8f9);
}

#[test]
fn gamma_of_sequential_key() {
    let (key, synchro) = seq_key();
    let g = gamma(&GostKey::from_bytes(&key), u64::from_le_bytes(synchro));
    assert_eq!(g, 0x5f66_f955_5447_ca23);
}

#[test]
fn gamma_of_all_ones_key() {
    let key = GostKey::from_bytes(&[0xFF; 32]);
    assert_eq!(gamma(&key, u64::MAX), 0xafef_a826_7e68_8a66);
}

#[test]
fn zero_block_under_gamma_is_the_gamma_itself() {
    let (key, synchro) = seq_key();
    let out = apply_gamma([0u8; 8], &key, &synchro);
    assert_eq!(u64::from_le_bytes(out), 0x5f66_f955_5447_ca23);
}

#[test]
fn ace_of_spades_under_sequential_key() {
    let (key, synchro) = seq_key();
    let card_key = CardKey::new(0, key, synchro);

    let encrypted = encrypt_card(Card::new(0, 14), &card_key);
    assert_eq!(encrypted, Card::new(35, 196));
    assert!(!encrypted.is_plain());

    assert_eq!(decrypt_card(encrypted, &card_key), Card::new(0, 14));
    // Гамма симметрична: наложение и снятие слоя совпадают.
    assert_eq!(decrypt_card(Card::new(0, 14), &card_key), encrypted);
}

#[test]
fn layers_of_different_players_commute() {
    let (key, synchro) = seq_key();
    let first = CardKey::new(7, key, synchro);
    let second = CardKey::new(7, [0x5A; 32], [9, 8, 7, 6, 5, 4, 3, 2]);

    for &card in Deck::canonical().cards() {
        let locked = encrypt_card(encrypt_card(card, &first), &second);
        // Снимаем в том же порядке, в каком накладывали.
        let opened = decrypt_card(decrypt_card(locked, &first), &second);
        assert_eq!(opened, card);
    }
}

#[test]
fn card_block_keeps_only_suit_and_value() {
    let card = Card::new(3, 12);
    let block = card.to_block();
    assert_eq!(block, [3, 12, 0, 0, 0, 0, 0, 0]);
    assert_eq!(Card::from_block([3, 12, 0xAA, 1, 2, 3, 4, 5]), card);
}
