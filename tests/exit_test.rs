//! Уход из-за стола в разных фазах раздачи.

mod common;

use common::{chips_in_play, heads_up, run_to_action, seated, stack_of, table, test_params};
use reveal_poker_engine::domain::chips::Chips;
use reveal_poker_engine::domain::player::PlayerStatus;
use reveal_poker_engine::domain::table::{TableConfig, TableStatus};
use reveal_poker_engine::engine::{CreditReason, Disposition, EngineError, Ledger, ManagerError, TableEffect};
use reveal_poker_engine::infra::TableSim;

fn leave(player_id: u64, amount: u64) -> TableEffect {
    TableEffect::Credit {
        player_id,
        amount: Chips(amount),
        reason: CreditReason::Leave,
    }
}

#[test]
fn player_to_act_leaves_with_keys_and_loses_the_blind() {
    let mut sim = heads_up(10, 1_000, 60);
    run_to_action(&mut sim);

    assert_eq!(sim.exit(1).unwrap(), Disposition::Applied);
    assert!(sim.effects().contains(&leave(1, 990)));

    let t = table(&sim);
    assert_eq!(t.status, TableStatus::WaitEndGame);
    assert_eq!(t.players[0].status, PlayerStatus::Out);
    assert_eq!(stack_of(&sim, 1), Chips(1_010));
    assert_eq!(t.last_result.as_ref().map(|r| r.winnings_of(2)), Some(Chips(30)));

    sim.finish_hand().unwrap();
    let t = table(&sim);
    assert_eq!(t.status, TableStatus::WaitPlayer);
    assert_eq!(t.players.len(), 1);
    assert_eq!(t.players[0].player_id, 2);

    assert_eq!(sim.ledger().balance(1), Chips(990));
    assert_eq!(sim.ledger().active_table(1), None);
    assert_eq!(chips_in_play(&sim), Chips(2_000));
}

#[test]
fn leaving_mid_hand_requires_keys() {
    let mut sim = heads_up(10, 1_000, 61);
    run_to_action(&mut sim);
    let before = table(&sim).clone();

    assert_eq!(
        sim.exit_with_keys(1, Vec::new()),
        Err(ManagerError::Engine(EngineError::WrongKeyCount { expected: 50, actual: 0 }))
    );
    assert_eq!(*table(&sim), before);
    assert!(sim.ledger().active_table(1).is_some());
}

#[test]
fn waiting_player_leaves_without_keys() {
    let mut sim = TableSim::new(test_params(), TableConfig::new(Chips(10), 6), 62, common::NOW).unwrap();
    sim.fund_and_seat(1, 100).unwrap();
    sim.fund_and_seat(2, 100).unwrap();
    assert_eq!(sim.fund_and_seat(3, 100).unwrap(), 2);
    assert_eq!(table(&sim).players[2].status, PlayerStatus::Waiting);

    assert_eq!(sim.exit_with_keys(3, Vec::new()).unwrap(), Disposition::Applied);
    assert!(sim.effects().contains(&leave(3, 1_000)));

    let t = table(&sim);
    assert!(t.players[2].is_empty_seat());
    assert_eq!(t.status, TableStatus::WaitStartGame);
    assert_eq!(sim.ledger().balance(3), Chips(1_000));
    assert_eq!(sim.ledger().active_table(3), None);
}

#[test]
fn folded_player_leaves_and_the_hand_goes_on() {
    let mut sim = seated(test_params(), 5, &[1_000, 1_000, 1_000], 63);
    run_to_action(&mut sim);
    sim.fold(1).unwrap();
    assert_eq!(sim.player_to_act(), Some((1, 2)));

    assert_eq!(sim.exit_with_keys(1, Vec::new()).unwrap(), Disposition::Applied);
    assert!(sim.effects().contains(&leave(1, 1_000)));

    let t = table(&sim);
    assert_eq!(t.players[0].status, PlayerStatus::Out);
    assert_eq!(t.status, TableStatus::WaitPlayersAct);
    assert_eq!(sim.player_to_act(), Some((1, 2)));
}

#[test]
fn leaving_after_settlement_counts_as_acknowledgement() {
    let mut sim = heads_up(10, 1_000, 64);
    run_to_action(&mut sim);
    sim.fold(1).unwrap();
    assert_eq!(sim.status(), Some(TableStatus::WaitEndGame));

    assert_eq!(sim.exit(2).unwrap(), Disposition::Applied);
    assert!(sim.effects().contains(&leave(2, 1_010)));
    assert_eq!(sim.status(), Some(TableStatus::WaitEndGame));
    assert!(table(&sim).players[1].has_event);

    sim.finish_hand().unwrap();
    let t = table(&sim);
    assert_eq!(t.status, TableStatus::WaitPlayer);
    assert_eq!(t.players[0].player_id, 1);
    assert_eq!(chips_in_play(&sim), Chips(2_000));
}
