//! Оценка силы покерных рук (Texas Hold'em).
//!
//! Основная функция:
//!   `evaluate(pool) -> Combination`
//! Сравнение рук: `Combination::rank_cmp` / `beats`.

pub mod combination;
pub mod evaluator;

pub use combination::{Combination, CombinationKind, COMBO_SIZE};
pub use evaluator::{evaluate, evaluate_best_hand};
