//! Расчёт раздачи: рейк, статистика и сохранение фишек на длинной дистанции.

mod common;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use common::{chips_in_play, heads_up, run_to_action, seated, stack_of, table};
use reveal_poker_engine::config::GameParams;
use reveal_poker_engine::domain::act::{Act, PossibleMove};
use reveal_poker_engine::domain::chips::Chips;
use reveal_poker_engine::domain::result::HandOutcome;
use reveal_poker_engine::domain::table::{Table, TableConfig};
use reveal_poker_engine::domain::SeatIndex;
use reveal_poker_engine::engine::{IncomeSource, TableEffect};
use reveal_poker_engine::infra::{passive_decision, Decision, TableSim};

#[test]
fn rake_is_taken_once_the_flop_is_dealt() {
    let mut sim = seated(GameParams::standard(), 100, &[10_000, 10_000], 31);
    run_to_action(&mut sim);
    sim.act(1, Act::bet(Chips(200))).unwrap();
    sim.act(2, Act::check()).unwrap();

    let res = sim.play_hand(passive_decision).unwrap().unwrap();
    assert_eq!(res.start_bank, Chips(400));
    assert_eq!(res.bank, Chips(388));
    assert_eq!(res.bank_rake, Chips(12));
    assert_eq!(res.bank_unconsumed, Chips::ZERO);
    assert_eq!(res.total_winnings(), Chips(388));

    let ledger = sim.ledger();
    assert_eq!(ledger.house(), Chips(12));
    assert_eq!(ledger.rake_of(1), Chips(6));
    assert_eq!(ledger.rake_of(2), Chips(6));
    assert!(sim.effects().contains(&TableEffect::HouseIncome {
        amount: Chips(12),
        source: IncomeSource::Rake,
    }));

    let stats = ledger.statistics();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].outcome, HandOutcome::Normal);
    assert_eq!(stats[0].bank, Chips(400));
    assert_eq!(stats[0].seats.len(), 2);
    assert_eq!(chips_in_play(&sim), Chips(20_000));
}

#[test]
fn no_rake_without_a_flop() {
    let mut sim = seated(GameParams::standard(), 100, &[10_000, 10_000], 32);
    run_to_action(&mut sim);
    sim.fold(1).unwrap();

    let res = table(&sim).last_result.clone().unwrap();
    assert_eq!(res.start_bank, Chips(300));
    assert_eq!(res.bank_rake, Chips::ZERO);
    assert_eq!(res.winnings_of(2), Chips(300));
    assert!(res.board.is_empty());
    assert!(res.players.iter().all(|p| !p.show));

    assert_eq!(stack_of(&sim, 0), Chips(9_900));
    assert_eq!(stack_of(&sim, 1), Chips(10_100));
    assert_eq!(sim.ledger().house(), Chips::ZERO);
}

#[test]
fn uncalled_raise_is_returned() {
    let mut sim = heads_up(10, 1_000, 33);
    run_to_action(&mut sim);
    sim.act(1, Act::bet(Chips(20))).unwrap();
    sim.act(2, Act::bet(Chips(100))).unwrap();
    sim.fold(1).unwrap();

    let res = table(&sim).last_result.clone().unwrap();
    // Уравнено только 20 из 100: неуравненные 80 вернулись.
    assert_eq!(res.start_bank, Chips(40));
    assert_eq!(res.winnings_of(2), Chips(40));
    assert_eq!(stack_of(&sim, 0), Chips(980));
    assert_eq!(stack_of(&sim, 1), Chips(1_020));
}

fn random_decision(rng: &mut StdRng, table: &Table, seat: SeatIndex) -> Decision {
    let roll: u32 = rng.gen_range(0..100);
    let can_check = table.possible_moves.contains(&PossibleMove::Check);
    if roll < 15 && !can_check {
        return Decision::Fold;
    }
    if roll >= 75 && !table.raise_variants.is_empty() {
        let i = rng.gen_range(0..table.raise_variants.len());
        return Decision::Act(Act::bet(table.raise_variants[i]));
    }
    passive_decision(table, seat)
}

#[test]
fn chips_are_conserved_over_many_hands() {
    for seed in [1u64, 7, 42] {
        let config = TableConfig::new(Chips(100), 6);
        let mut sim = TableSim::new(GameParams::standard(), config, seed, common::NOW).unwrap();
        for player_id in 1..=4 {
            sim.fund_and_seat(player_id, 60).unwrap();
        }
        let start = chips_in_play(&sim);
        assert_eq!(start, Chips(24_000));

        let mut rng = StdRng::seed_from_u64(seed);
        for hand in 0..25 {
            let Some(t) = sim.table() else { break };
            if t.seated_count() < 2 {
                break;
            }
            sim.advance_clock(3);
            sim.play_hand(|t, seat| random_decision(&mut rng, t, seat)).unwrap();
            assert_eq!(chips_in_play(&sim), start, "seed {seed}, раздача {hand}");
        }
        assert!(!sim.ledger().statistics().is_empty());
    }
}
