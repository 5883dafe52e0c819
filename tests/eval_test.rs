//! Оценка рук: типы комбинаций, порядок карт, сравнение.

mod common;

use std::cmp::Ordering;

use proptest::prelude::*;

use common::cards;
use reveal_poker_engine::domain::card::Card;
use reveal_poker_engine::eval::{evaluate, evaluate_best_hand, CombinationKind};

fn values(s: &str) -> Vec<u8> {
    evaluate(&cards(s)).cards.iter().map(|c| c.value).collect()
}

#[test]
fn royal_flush_beats_king_high_straight_flush() {
    let royal = evaluate_best_hand(&cards("As Ks"), &cards("Qs Js Ts 2d 3c"));
    let straight_flush = evaluate_best_hand(&cards("9s 8s"), &cards("Ks Qs Js Ts 2d"));

    assert_eq!(royal.kind, CombinationKind::RoyalFlush);
    assert_eq!(straight_flush.kind, CombinationKind::StraightFlush);
    assert_eq!(straight_flush.cards[0].value, 13);
    assert!(royal.beats(&straight_flush));
    assert!(!straight_flush.beats(&royal));
}

#[test]
fn wheel_puts_ace_last_and_loses_to_six_high_straight() {
    let wheel = evaluate(&cards("Ah 2d 3c 4s 5h 9d Jc"));
    let six_high = evaluate(&cards("2d 3c 4s 5h 6d 9c Jc"));

    assert_eq!(wheel.kind, CombinationKind::Straight);
    assert_eq!(values("Ah 2d 3c 4s 5h 9d Jc"), vec![5, 4, 3, 2, 14]);
    assert_eq!(six_high.kind, CombinationKind::Straight);
    assert_eq!(six_high.cards[0].value, 6);
    assert!(six_high.beats(&wheel));
}

#[test]
fn steel_wheel_is_straight_flush() {
    let combo = evaluate(&cards("Ad 2d 3d 4d 5d Kc Qh"));
    assert_eq!(combo.kind, CombinationKind::StraightFlush);
    assert_eq!(combo.cards[0].value, 5);
    assert_eq!(combo.cards[4].value, 14);
}

#[test]
fn four_of_a_kind_takes_highest_kicker() {
    let combo = evaluate(&cards("9h 9d 9c 9s Ah 2c 3s"));
    assert_eq!(combo.kind, CombinationKind::FourOfAKind);
    assert_eq!(values("9h 9d 9c 9s Ah 2c 3s"), vec![9, 9, 9, 9, 14]);
}

#[test]
fn full_house_lists_trips_then_pair() {
    let combo = evaluate(&cards("Kh Kd 2c Ah Ad Ac 3s"));
    assert_eq!(combo.kind, CombinationKind::FullHouse);
    assert_eq!(values("Kh Kd 2c Ah Ad Ac 3s"), vec![14, 14, 14, 13, 13]);
}

#[test]
fn flush_outranks_straight_on_the_same_board() {
    let flush = evaluate_best_hand(&cards("Ah 2h"), &cards("9h 8h 7d 6h 5c"));
    let straight = evaluate_best_hand(&cards("Tc 4d"), &cards("9h 8h 7d 6h 5c"));

    assert_eq!(flush.kind, CombinationKind::Flush);
    assert_eq!(straight.kind, CombinationKind::Straight);
    assert!(flush.beats(&straight));
}

#[test]
fn two_pairs_compare_by_kicker() {
    let queen_kicker = evaluate(&cards("Ah Ad Kh Kd Qc 2s 3s"));
    let jack_kicker = evaluate(&cards("As Ac Ks Kc Jc 2h 3h"));

    assert_eq!(queen_kicker.kind, CombinationKind::TwoPairs);
    assert!(queen_kicker.beats(&jack_kicker));
}

#[test]
fn same_values_in_other_suits_tie() {
    let a = evaluate(&cards("Ah Kd Qc Jd 9s 2c 3d"));
    let b = evaluate(&cards("As Kc Qh Js 9d 2h 3c"));

    assert_eq!(a.kind, CombinationKind::HighCard);
    assert!(a.ties(&b));
    assert!(!a.beats(&b));
}

#[test]
fn fewer_than_five_cards_have_no_combination() {
    let combo = evaluate(&cards("Ah Ad Ac Kh"));
    assert!(combo.is_none());
    assert_eq!(combo.kind, CombinationKind::NoCombination);
}

fn card_of(i: u8) -> Card {
    Card::new(i / 13, i % 13 + 2)
}

fn seven_cards() -> impl Strategy<Value = Vec<Card>> {
    prop::sample::subsequence((0u8..52).collect::<Vec<u8>>(), 7)
        .prop_shuffle()
        .prop_map(|idx| idx.into_iter().map(card_of).collect())
}

proptest! {
    #[test]
    fn comparison_is_a_strict_weak_order(a in seven_cards(), b in seven_cards(), c in seven_cards()) {
        let (a, b, c) = (evaluate(&a), evaluate(&b), evaluate(&c));

        prop_assert_eq!(a.rank_cmp(&a), Ordering::Equal);
        prop_assert_eq!(a.rank_cmp(&b), b.rank_cmp(&a).reverse());
        if a.rank_cmp(&b) != Ordering::Greater && b.rank_cmp(&c) != Ordering::Greater {
            prop_assert_ne!(a.rank_cmp(&c), Ordering::Greater);
        }
    }

    #[test]
    fn card_order_in_pool_does_not_matter(pool in seven_cards()) {
        let mut reversed = pool.clone();
        reversed.reverse();
        prop_assert!(evaluate(&pool).ties(&evaluate(&reversed)));
        prop_assert_eq!(evaluate(&pool).kind, evaluate(&reversed).kind);
    }
}
