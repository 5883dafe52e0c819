use core::cmp::Ordering;

use crate::domain::card::{sort_desc, Card, ACE_VALUE, SUIT_CLUBS};

use super::combination::{Combination, CombinationKind, COMBO_SIZE};

/// Лучшая рука из карманных карт и борда.
pub fn evaluate_best_hand(hole: &[Card], board: &[Card]) -> Combination {
    let mut pool = Vec::with_capacity(hole.len() + board.len());
    pool.extend_from_slice(hole);
    pool.extend_from_slice(board);
    evaluate(&pool)
}

/// Лучшая 5-карточная комбинация из пула (обычно 7 карт).
///
/// Пул копируется и стабильно сортируется по убыванию значения,
/// дубликаты значений сохраняются. Меньше 5 карт: `NoCombination`.
/// Проверки идут строго по старшинству, первая найденная выигрывает;
/// флеш откладывается до проверки каре и фулл-хауса.
pub fn evaluate(pool: &[Card]) -> Combination {
    if pool.len() < COMBO_SIZE {
        return Combination::none();
    }

    let mut cards = pool.to_vec();
    sort_desc(&mut cards);

    let flush = best_flush(&cards);
    if let Some(combo) = flush {
        if matches!(
            combo.kind,
            CombinationKind::RoyalFlush | CombinationKind::StraightFlush
        ) {
            return combo;
        }
    }

    if let Some(combo) = four_of_a_kind(&cards) {
        return combo;
    }
    if let Some(combo) = full_house(&cards) {
        return combo;
    }
    if let Some(combo) = flush {
        return combo;
    }
    if let Some(combo) = straight(&cards) {
        return combo;
    }
    if let Some(combo) = three_of_a_kind(&cards) {
        return combo;
    }
    if let Some(combo) = two_pairs(&cards) {
        return combo;
    }
    if let Some(combo) = pair(&cards) {
        return combo;
    }
    high_card(&cards)
}

// ====== ФЛЕШИ ======

/// Лучший флеш по всем мастям (с учётом стрит- и роял-флеша).
fn best_flush(cards: &[Card]) -> Option<Combination> {
    let mut best: Option<Combination> = None;

    for suit in 0..=SUIT_CLUBS {
        // в одной масти значение встречается один раз
        let mut suited: Vec<Card> = Vec::new();
        for card in cards.iter().filter(|c| c.suit == suit) {
            if !suited.iter().any(|s| s.value == card.value) {
                suited.push(*card);
            }
        }

        let Some(combo) = flush_in_suit(&suited) else {
            continue;
        };
        if combo.kind == CombinationKind::RoyalFlush {
            return Some(combo);
        }

        let better = match &best {
            None => true,
            Some(current) => combo.rank_cmp(current) != Ordering::Less,
        };
        if better {
            best = Some(combo);
        }
    }

    best
}

/// Флеш в одной масти; `suited` отсортированы по убыванию без повторов.
fn flush_in_suit(suited: &[Card]) -> Option<Combination> {
    if suited.len() < COMBO_SIZE {
        return None;
    }

    let mut combo = [Card::default(); COMBO_SIZE];
    let mut index = 0usize;

    for (i, card) in suited.iter().enumerate() {
        combo[index] = *card;
        let Some(next) = suited.get(i + 1) else {
            break;
        };

        if card.value == next.value + 1 {
            index += 1;
            if index == COMBO_SIZE - 1 {
                combo[index] = *next;
                let kind = if combo[0].value == ACE_VALUE {
                    CombinationKind::RoyalFlush
                } else {
                    CombinationKind::StraightFlush
                };
                return Some(Combination::new(kind, combo));
            }
        } else {
            index = 0;
        }
    }

    // колесо: 5 4 3 2 + A
    if combo[0].value == 5 && index == 3 && suited[0].value == ACE_VALUE {
        combo[COMBO_SIZE - 1] = suited[0];
        return Some(Combination::new(CombinationKind::StraightFlush, combo));
    }

    Some(Combination::new(CombinationKind::Flush, top_five(suited)?))
}

// ====== КОМБИНАЦИИ ПО ЗНАЧЕНИЯМ ======

fn four_of_a_kind(cards: &[Card]) -> Option<Combination> {
    let mut combo = [Card::default(); COMBO_SIZE];
    let mut index = 0usize;

    for (i, card) in cards.iter().enumerate() {
        combo[index] = *card;
        let Some(next) = cards.get(i + 1) else {
            break;
        };

        if card.value == next.value {
            index += 1;
            if index == 3 {
                combo[index] = *next;
                // кикер: старшая карта вне каре
                combo[COMBO_SIZE - 1] = if cards[0].value != card.value {
                    cards[0]
                } else {
                    *cards.get(i + 2)?
                };
                return Some(Combination::new(CombinationKind::FourOfAKind, combo));
            }
        } else {
            index = 0;
        }
    }
    None
}

/// Первая тройка одинаковых значений (самая старшая).
fn trips_only(cards: &[Card]) -> Option<[Card; 3]> {
    let mut in_line = 1usize;
    for i in 1..cards.len() {
        if cards[i - 1].value == cards[i].value {
            in_line += 1;
        } else {
            in_line = 1;
        }
        if in_line == 3 {
            return Some([cards[i - 2], cards[i - 1], cards[i]]);
        }
    }
    None
}

/// Первая пара соседних равных значений (самая старшая).
fn pair_only(cards: &[Card]) -> Option<[Card; 2]> {
    cards
        .windows(2)
        .find(|w| w[0].value == w[1].value)
        .map(|w| [w[0], w[1]])
}

/// Копия пула без взятых карт: для каждой взятой убирается первая карта того же значения.
fn without(cards: &[Card], taken: &[Card]) -> Vec<Card> {
    let mut rest = cards.to_vec();
    for t in taken {
        if let Some(pos) = rest.iter().position(|c| c.value == t.value) {
            rest.remove(pos);
        }
    }
    rest
}

fn full_house(cards: &[Card]) -> Option<Combination> {
    let trips = trips_only(cards)?;
    let rest = without(cards, &trips);
    let pair = pair_only(&rest)?;
    Some(Combination::new(
        CombinationKind::FullHouse,
        [trips[0], trips[1], trips[2], pair[0], pair[1]],
    ))
}

fn straight(cards: &[Card]) -> Option<Combination> {
    let mut combo = [Card::default(); COMBO_SIZE];
    let mut in_line = 1usize;

    for (i, card) in cards.iter().enumerate() {
        combo[in_line - 1] = *card;
        let Some(next) = cards.get(i + 1) else {
            break;
        };

        if card.value == next.value {
            continue;
        }
        if card.value == next.value + 1 {
            in_line += 1;
        } else {
            in_line = 1;
        }

        if in_line == COMBO_SIZE {
            combo[COMBO_SIZE - 1] = *next;
            return Some(Combination::new(CombinationKind::Straight, combo));
        }
    }

    // колесо: 5 4 3 2 + A
    if combo[0].value == 5 && in_line == 4 && cards[0].value == ACE_VALUE {
        combo[COMBO_SIZE - 1] = cards[0];
        return Some(Combination::new(CombinationKind::Straight, combo));
    }
    None
}

fn three_of_a_kind(cards: &[Card]) -> Option<Combination> {
    let trips = trips_only(cards)?;
    let rest = without(cards, &trips);
    let (k1, k2) = (*rest.first()?, *rest.get(1)?);
    Some(Combination::new(
        CombinationKind::ThreeOfAKind,
        [trips[0], trips[1], trips[2], k1, k2],
    ))
}

fn two_pairs(cards: &[Card]) -> Option<Combination> {
    let first = pair_only(cards)?;
    let rest = without(cards, &first);
    let second = pair_only(&rest)?;
    let rest = without(&rest, &second);
    let kicker = *rest.first()?;
    Some(Combination::new(
        CombinationKind::TwoPairs,
        [first[0], first[1], second[0], second[1], kicker],
    ))
}

fn pair(cards: &[Card]) -> Option<Combination> {
    let pair = pair_only(cards)?;
    let rest = without(cards, &pair);
    Some(Combination::new(
        CombinationKind::Pair,
        [pair[0], pair[1], *rest.first()?, *rest.get(1)?, *rest.get(2)?],
    ))
}

fn high_card(cards: &[Card]) -> Combination {
    match top_five(cards) {
        Some(top) => Combination::new(CombinationKind::HighCard, top),
        None => Combination::none(),
    }
}

fn top_five(cards: &[Card]) -> Option<[Card; COMBO_SIZE]> {
    let slice = cards.get(..COMBO_SIZE)?;
    let mut top = [Card::default(); COMBO_SIZE];
    top.copy_from_slice(slice);
    Some(top)
}
