//! Олл-ины и сайд-поты на столе из трёх игроков.
//!
//! Кнопка на месте 0, малый блайнд на месте 1, большой на месте 2,
//! префлоп открывает место 0.

mod common;

use proptest::prelude::*;

use common::{chips_in_play, run_to_action, run_to_end, seated, stack_of, table, test_params};
use reveal_poker_engine::config::GameParams;
use reveal_poker_engine::domain::act::Act;
use reveal_poker_engine::domain::chips::Chips;
use reveal_poker_engine::domain::player::PlayerStatus;
use reveal_poker_engine::domain::result::SidePot;
use reveal_poker_engine::domain::table::TableStatus;

#[test]
fn three_all_ins_build_two_side_pots_and_refund_the_excess() {
    let mut sim = seated(test_params(), 5, &[50, 150, 300], 11);
    run_to_action(&mut sim);
    {
        let t = table(&sim);
        assert_eq!((t.dealer_index, t.sb_index, t.bb_index), (0, 1, 2));
        assert_eq!(sim.player_to_act(), Some((0, 1)));
    }

    sim.act(1, Act::bet(Chips(50))).unwrap();
    sim.act(2, Act::bet(Chips(150))).unwrap();
    sim.act(3, Act::bet(Chips(300))).unwrap();

    // Торговаться некому, но флоп открывается обычным порядком.
    assert_eq!(sim.status(), Some(TableStatus::WaitKeysForShowdown));
    assert_eq!(table(&sim).allin_count, 3);

    sim.step().unwrap();
    sim.step().unwrap();
    sim.step().unwrap();
    assert_eq!(sim.status(), Some(TableStatus::WaitAllInKeys));
    assert_eq!(table(&sim).table_cards.len(), 3);

    run_to_end(&mut sim);
    let res = table(&sim).last_result.clone().unwrap();

    // Лишние 150 старшего олл-ина никто не уравнял.
    assert_eq!(res.start_bank, Chips(350));
    assert_eq!(res.bank_rake, res.bank_unconsumed);
    assert_eq!(res.total_winnings() + res.bank_unconsumed, Chips(350));

    let a = res.players.iter().find(|p| p.player_id == 1).unwrap();
    let b = res.players.iter().find(|p| p.player_id == 2).unwrap();
    let c = res.players.iter().find(|p| p.player_id == 3).unwrap();

    let banks = |pots: &[SidePot]| pots.iter().map(|p| p.bank).collect::<Vec<_>>();
    assert_eq!(banks(&a.side_pots), vec![Chips(150)]);
    assert_eq!(banks(&b.side_pots), vec![Chips(150), Chips(200)]);
    assert_eq!(banks(&c.side_pots), vec![Chips(150), Chips(200)]);

    for p in [a, b, c] {
        let won: Chips = p.side_pots.iter().map(|s| s.win).sum();
        assert_eq!(p.winnings, won);
        assert_eq!(p.hand.len(), 2);
    }
    // Первый сайд-пот разыгрывают все трое, второй только B и C.
    let first: Chips = [a, b, c].iter().map(|p| p.side_pots[0].win).sum();
    let second: Chips = [b, c].iter().map(|p| p.side_pots[1].win).sum();
    assert_eq!(first, Chips(150));
    assert_eq!(second, Chips(200));

    assert_eq!(stack_of(&sim, 2), c.winnings + Chips(150));
    let stacks: Chips = table(&sim).players.iter().map(|p| p.stack).sum();
    assert_eq!(stacks + res.bank_unconsumed, Chips(500));
}

#[test]
fn fold_after_an_all_in_feeds_the_all_in_snapshot() {
    let mut sim = seated(test_params(), 5, &[1_000, 100, 1_000], 12);
    run_to_action(&mut sim);

    sim.act(1, Act::bet(Chips(50))).unwrap();
    sim.act(2, Act::bet(Chips(100))).unwrap();
    sim.fold(3).unwrap();
    {
        let t = table(&sim);
        assert_eq!(t.players[2].status, PlayerStatus::Fold);
        // Большой блайнд сфолдившего ушёл в банк и в снимок олл-ина.
        assert_eq!(t.players[1].all_in_bank, Chips(10));
        assert_eq!(t.bank, Chips(10));
        assert_eq!(sim.player_to_act(), Some((0, 1)));
    }

    sim.act(1, Act::bet(Chips(100))).unwrap();
    assert_eq!(table(&sim).bank, Chips(210));

    run_to_end(&mut sim);
    let res = table(&sim).last_result.clone().unwrap();
    assert_eq!(res.start_bank, Chips(210));
    assert_eq!(res.winnings_of(3), Chips::ZERO);
    assert_eq!(res.winnings_of(1) + res.winnings_of(2) + res.bank_unconsumed, Chips(210));

    let folded = res.players.iter().find(|p| p.player_id == 3).unwrap();
    assert!(folded.hand.is_empty());
    assert!(folded.combination.is_none());

    assert_eq!(stack_of(&sim, 2), Chips(990));
    assert_eq!(stack_of(&sim, 0) + stack_of(&sim, 1), Chips(1_110) - res.bank_unconsumed);
}

#[test]
fn short_stack_cannot_win_more_than_it_covered() {
    for seed in 20..26 {
        let mut sim = seated(test_params(), 5, &[50, 150, 300], seed);
        run_to_action(&mut sim);
        sim.act(1, Act::bet(Chips(50))).unwrap();
        sim.act(2, Act::bet(Chips(150))).unwrap();
        sim.act(3, Act::bet(Chips(300))).unwrap();
        run_to_end(&mut sim);

        let res = table(&sim).last_result.clone().unwrap();
        assert!(res.winnings_of(1) <= Chips(150), "seed {seed}");
        assert!(res.winnings_of(2) <= Chips(350), "seed {seed}");
        assert_eq!(res.total_winnings() + res.bank_unconsumed, Chips(350), "seed {seed}");
    }
}

#[test]
fn rake_comes_out_of_the_side_pots_and_nothing_is_lost() {
    for rake_percent in [1.0, 2.5, 5.0, 7.3, 10.0] {
        for seed in 30..34 {
            let params = GameParams {
                rake_percent,
                ..test_params()
            };
            let mut sim = seated(params, 5, &[50, 150, 300], seed);
            let before = chips_in_play(&sim);

            run_to_action(&mut sim);
            sim.act(1, Act::bet(Chips(50))).unwrap();
            sim.act(2, Act::bet(Chips(150))).unwrap();
            sim.act(3, Act::bet(Chips(300))).unwrap();
            run_to_end(&mut sim);

            let res = table(&sim).last_result.clone().unwrap();
            let ctx = format!("rake {rake_percent}, seed {seed}");
            assert_eq!(res.start_bank, Chips(350), "{ctx}");
            assert!(!res.bank_rake.is_zero(), "{ctx}");
            assert_eq!(res.total_winnings() + res.bank_rake, res.start_bank, "{ctx}");
            // Сайд-поты и остаток деления покрывают банк за вычетом рейка.
            assert_eq!(res.total_winnings() + res.bank_unconsumed, res.bank, "{ctx}");

            let player_rake: Chips = table(&sim).players.iter().map(|p| p.rake).sum();
            assert!(player_rake <= res.bank_rake, "{ctx}");
            assert_eq!(sim.ledger().house(), res.bank_rake, "{ctx}");
            assert_eq!(chips_in_play(&sim), before, "{ctx}");
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn cascading_all_ins_conserve_chips(
        a in 4u64..20,
        b in 21u64..40,
        c in 41u64..80,
        seed in any::<u64>(),
    ) {
        let stacks = [a * 5, b * 5, c * 5];
        let mut sim = seated(test_params(), 5, &stacks, seed);
        run_to_action(&mut sim);
        for (i, &stack) in stacks.iter().enumerate() {
            sim.act(i as u64 + 1, Act::bet(Chips(stack))).unwrap();
        }
        run_to_end(&mut sim);

        let res = table(&sim).last_result.clone().unwrap();
        let matched = stacks[0] + stacks[1] * 2;
        prop_assert_eq!(res.start_bank, Chips(matched));
        prop_assert_eq!(res.total_winnings() + res.bank_unconsumed, Chips(matched));
        prop_assert!(res.winnings_of(1) <= Chips(stacks[0] * 3));

        let on_table: Chips = table(&sim).players.iter().map(|p| p.stack).sum();
        prop_assert_eq!(on_table + res.bank_unconsumed, Chips(stacks.iter().sum()));
    }
}
