//! Посадка за стол: бай-ин, старт раздачи, ожидающие новички.

mod common;

use common::{run_to_action, table, test_params, NOW};
use reveal_poker_engine::domain::chips::Chips;
use reveal_poker_engine::domain::player::PlayerStatus;
use reveal_poker_engine::domain::table::{TableConfig, TableStatus};
use reveal_poker_engine::engine::{DebitReason, EngineError, Ledger, ManagerError, SeatRequest, TableEffect};
use reveal_poker_engine::infra::TableSim;

fn new_sim(max_players: usize) -> TableSim {
    TableSim::new(test_params(), TableConfig::new(Chips(10), max_players), 70, NOW).unwrap()
}

fn request(player_id: u64, buyin_sb: u32) -> SeatRequest {
    SeatRequest {
        player_id,
        buyin_sb,
        wait_for_bb: false,
        autorebuy: false,
    }
}

fn engine_err<T>(err: EngineError) -> Result<T, ManagerError> {
    Err(ManagerError::Engine(err))
}

#[test]
fn second_player_starts_the_hand_and_third_waits() {
    let mut sim = new_sim(6);

    assert_eq!(sim.fund_and_seat(1, 100).unwrap(), 0);
    assert_eq!(sim.status(), Some(TableStatus::WaitPlayer));
    assert!(sim.effects().contains(&TableEffect::Debit {
        player_id: 1,
        amount: Chips(1_000),
        reason: DebitReason::BuyIn,
    }));
    assert_eq!(sim.ledger().balance(1), Chips::ZERO);
    assert_eq!(sim.ledger().active_table(1), Some(sim.table_id()));

    assert_eq!(sim.fund_and_seat(2, 50).unwrap(), 1);
    let t = table(&sim);
    assert_eq!(t.status, TableStatus::WaitStartGame);
    assert_eq!(t.game_players_count, 2);
    assert_eq!(t.players[1].stack, Chips(500));

    assert_eq!(sim.fund_and_seat(3, 100).unwrap(), 2);
    let t = table(&sim);
    assert_eq!(t.players[2].status, PlayerStatus::Waiting);
    assert_eq!(t.game_players_count, 2);
    assert!(t.players[2].card_indexes.is_empty());
}

#[test]
fn newcomer_joins_the_next_hand_with_an_extra_big_blind() {
    let mut sim = new_sim(6);
    sim.fund_and_seat(1, 100).unwrap();
    sim.fund_and_seat(2, 100).unwrap();
    sim.fund_and_seat(3, 100).unwrap();

    run_to_action(&mut sim);
    sim.fold(1).unwrap();
    sim.finish_hand().unwrap();

    let t = table(&sim);
    assert_eq!(t.status, TableStatus::WaitStartGame);
    assert_eq!(t.game_players_count, 3);
    assert_eq!(t.players[2].status, PlayerStatus::InGame);
    assert!(t.players[2].extra_bb);
    assert_eq!(t.players[2].card_indexes.len(), 2);
}

#[test]
fn seat_requests_are_validated() {
    let mut sim = new_sim(6);
    sim.fund_and_seat(1, 100).unwrap();

    sim.fund(4, Chips(10_000));
    assert_eq!(sim.seat(request(4, 1)), engine_err(EngineError::BuyInOutOfRange(Chips(10))));
    assert_eq!(
        sim.seat(request(4, 201)),
        engine_err(EngineError::BuyInOutOfRange(Chips(2_010)))
    );

    assert_eq!(
        sim.seat(request(5, 100)),
        engine_err(EngineError::InsufficientBalance {
            needed: Chips(1_000),
            available: Chips::ZERO,
        })
    );

    sim.fund(1, Chips(1_000));
    assert_eq!(sim.seat(request(1, 100)), engine_err(EngineError::AlreadySeated(1)));

    // Отказ ничего не списывает.
    assert_eq!(sim.ledger().balance(4), Chips(10_000));
    assert_eq!(sim.ledger().balance(1), Chips(1_000));
    assert_eq!(table(&sim).seated_count(), 1);
}

#[test]
fn full_table_rejects_the_next_player() {
    let mut sim = new_sim(2);
    sim.fund_and_seat(1, 100).unwrap();
    sim.fund_and_seat(2, 100).unwrap();

    assert_eq!(sim.fund_and_seat(3, 100), engine_err(EngineError::TableFull));
    assert_eq!(sim.ledger().balance(3), Chips(1_000));
}

#[test]
fn table_must_use_allowed_blind_and_size() {
    let params = test_params();

    let bad_blind = TableSim::new(params.clone(), TableConfig::new(Chips(7), 6), 1, NOW).err();
    assert_eq!(
        bad_blind,
        Some(ManagerError::Engine(EngineError::SmallBlindNotAllowed(Chips(7))))
    );

    let bad_size = TableSim::new(params, TableConfig::new(Chips(10), 4), 1, NOW).err();
    assert_eq!(
        bad_size,
        Some(ManagerError::Engine(EngineError::TableSizeNotAllowed(4)))
    );
}
