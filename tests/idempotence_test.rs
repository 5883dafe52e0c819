//! Повторы, опоздания и события чужой раздачи.

mod common;

use common::{heads_up, run_to_action, table};
use reveal_poker_engine::domain::act::Act;
use reveal_poker_engine::domain::chips::Chips;
use reveal_poker_engine::domain::table::TableStatus;
use reveal_poker_engine::engine::{
    AckKind, Disposition, EngineError, Envelope, IgnoreReason, ManagerError, TableCommand,
};

#[test]
fn same_transaction_is_applied_once() {
    let mut sim = heads_up(10, 1_000, 40);
    run_to_action(&mut sim);

    let call = sim
        .envelope(1, TableCommand::SubmitAction { act: Act::bet(Chips(20)) })
        .unwrap();
    assert_eq!(sim.send_envelope(&call).unwrap(), Disposition::Applied);
    let after_first = table(&sim).clone();

    assert_eq!(
        sim.send_envelope(&call).unwrap(),
        Disposition::Ignored(IgnoreReason::AlreadyApplied)
    );
    assert_eq!(*table(&sim), after_first);
}

#[test]
fn late_event_is_deferred_then_applied_once() {
    let mut sim = heads_up(10, 1_000, 41);
    run_to_action(&mut sim);

    // Клиент большого блайнда собрал событие по старому времени стола.
    let late = sim.envelope(2, TableCommand::SubmitAction { act: Act::check() }).unwrap();

    sim.advance_clock(5);
    sim.act(1, Act::bet(Chips(20))).unwrap();
    assert_eq!(table(&sim).timestamp, common::NOW + 5);

    assert_eq!(sim.send_envelope(&late).unwrap(), Disposition::Deferred);
    assert!(table(&sim).players[1].late_trxs.contains(&late.trx_index));
    assert_eq!(sim.player_to_act(), Some((1, 2)));

    let resent = Envelope {
        timestamp: table(&sim).timestamp,
        ..late.clone()
    };
    assert_eq!(sim.send_envelope(&resent).unwrap(), Disposition::Applied);
    assert_eq!(sim.status(), Some(TableStatus::WaitKeysForShowdown));
    assert!(table(&sim).players[1].late_trxs.is_empty());

    // Старая копия дошла позже: второй раз не применяется.
    let before = table(&sim).clone();
    assert_eq!(
        sim.send_envelope(&late).unwrap(),
        Disposition::Ignored(IgnoreReason::LateDuplicate)
    );
    assert_eq!(*table(&sim), before);
}

#[test]
fn event_for_another_hand_is_ignored() {
    let mut sim = heads_up(10, 1_000, 42);
    run_to_action(&mut sim);
    let before = table(&sim).clone();

    let mut stale = sim.envelope(1, TableCommand::SubmitAction { act: Act::bet(Chips(20)) }).unwrap();
    stale.game_id += 1;
    assert_eq!(
        sim.send_envelope(&stale).unwrap(),
        Disposition::Ignored(IgnoreReason::StaleGame)
    );
    assert_eq!(*table(&sim), before);
}

#[test]
fn acknowledgement_is_counted_once_per_phase() {
    let mut sim = heads_up(10, 1_000, 43);
    assert_eq!(sim.status(), Some(TableStatus::WaitStartGame));

    let ack = TableCommand::RequestAck(AckKind::StartOfHand);
    assert_eq!(sim.send(1, ack.clone()).unwrap(), Disposition::Applied);
    assert_eq!(
        sim.send(1, ack.clone()).unwrap(),
        Disposition::Ignored(IgnoreReason::AlreadyAcknowledged)
    );
    assert_eq!(table(&sim).received_count, 1);

    assert_eq!(
        sim.send(2, TableCommand::RequestAck(AckKind::EndOfHand)),
        Err(ManagerError::Engine(EngineError::WrongTableStatus(
            TableStatus::WaitStartGame
        )))
    );

    assert_eq!(sim.send(2, ack).unwrap(), Disposition::Applied);
    assert_eq!(sim.status(), Some(TableStatus::WaitShuffle));
}

#[test]
fn stranger_cannot_send_events() {
    let mut sim = heads_up(10, 1_000, 44);
    assert_eq!(
        sim.send(99, TableCommand::RequestAck(AckKind::StartOfHand)),
        Err(ManagerError::Engine(EngineError::PlayerNotAtTable(99)))
    );
}
