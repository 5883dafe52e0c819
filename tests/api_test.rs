use reveal_poker_engine::api::{
    execute, run_query, ApiCommand, ApiError, CommandResponse, CommandResult, CreateTableCommand,
    ExitTableCommand, JoinTableCommand, Query, QueryResponse, SeatOptions, SeatPlayerCommand, TableView,
};
use reveal_poker_engine::config::GameParams;
use reveal_poker_engine::domain::chips::Chips;
use reveal_poker_engine::domain::table::TableStatus;
use reveal_poker_engine::domain::{PlayerId, TableId};
use reveal_poker_engine::engine::{
    AckKind, CreditReason, Disposition, EngineContext, EngineError, Envelope, TableCommand, TableEffect,
    TableManager,
};
use reveal_poker_engine::infra::InMemoryLedger;

/// Менеджер, счета и часы: то, что держит хост движка.
struct Host {
    params: GameParams,
    ledger: InMemoryLedger,
    manager: TableManager,
    now: u64,
}

impl Host {
    fn new() -> Self {
        Self {
            params: GameParams::standard(),
            ledger: InMemoryLedger::new(),
            manager: TableManager::new(),
            now: 1_000,
        }
    }

    fn run(&mut self, command: ApiCommand) -> Result<CommandResponse, ApiError> {
        let response = {
            let mut ctx = EngineContext::new(&self.params, &self.ledger, self.now);
            execute(&mut self.manager, &mut ctx, command)?
        };
        self.ledger.apply(&response.effects);
        Ok(response)
    }

    fn view(&self, table_id: TableId) -> Result<TableView, ApiError> {
        match run_query(&self.manager, &Query::Table { table_id })? {
            QueryResponse::Table(view) => Ok(*view),
            other => panic!("неожиданный ответ {other:?}"),
        }
    }

    fn tables(&self) -> Vec<TableView> {
        match run_query(&self.manager, &Query::Tables) {
            Ok(QueryResponse::Tables(views)) => views,
            other => panic!("неожиданный ответ {other:?}"),
        }
    }
}

fn create(small_blind: u64) -> ApiCommand {
    ApiCommand::CreateTable(CreateTableCommand {
        small_blind: Chips(small_blind),
        max_players: 6,
        escrow_keys: false,
    })
}

fn seat_options(player_id: PlayerId) -> SeatOptions {
    SeatOptions {
        player_id,
        buyin_sb: 100,
        wait_for_bb: false,
        autorebuy: false,
    }
}

fn seat(table_id: TableId, player_id: PlayerId) -> ApiCommand {
    ApiCommand::SeatPlayer(SeatPlayerCommand {
        table_id,
        seat: seat_options(player_id),
    })
}

fn join(small_blind: u64, player_id: PlayerId) -> ApiCommand {
    ApiCommand::JoinTable(JoinTableCommand {
        table: CreateTableCommand {
            small_blind: Chips(small_blind),
            max_players: 6,
            escrow_keys: false,
        },
        seat: seat_options(player_id),
    })
}

#[test]
fn create_seat_and_query_a_table() {
    let mut host = Host::new();
    let created = host.run(create(100)).unwrap();
    assert_eq!(created.result, CommandResult::TableCreated { table_id: 1 });
    assert!(created.effects.is_empty());

    host.ledger.add_balance(1, Chips(10_000));
    host.ledger.add_balance(2, Chips(10_000));
    let first = host.run(seat(1, 1)).unwrap();
    assert_eq!(first.result, CommandResult::Seated { table_id: 1, seat: 0 });
    assert!(first
        .effects
        .iter()
        .any(|e| matches!(e, TableEffect::Debit { player_id: 1, amount, .. } if *amount == Chips(10_000))));
    host.run(seat(1, 2)).unwrap();

    let view = host.view(1).unwrap();
    assert_eq!(view.status, TableStatus::WaitStartGame);
    assert_eq!(view.players.len(), 2);
    assert_eq!(view.big_blind, Chips(200));
    assert!(view.game_id.is_some());
    assert_eq!(host.tables().len(), 1);
}

#[test]
fn table_events_go_through_the_api() {
    let mut host = Host::new();
    host.run(create(100)).unwrap();
    for player_id in [1, 2] {
        host.ledger.add_balance(player_id, Chips(10_000));
        host.run(seat(1, player_id)).unwrap();
    }
    let view = host.view(1).unwrap();
    let envelope = |player_id| Envelope {
        player_id,
        game_id: view.game_id.unwrap_or_default(),
        timestamp: view.timestamp,
        trx_index: 1,
        command: TableCommand::RequestAck(AckKind::StartOfHand),
    };

    let response = host
        .run(ApiCommand::TableEvent { table_id: 1, envelope: envelope(1) })
        .unwrap();
    assert_eq!(response.result, CommandResult::Event { disposition: Disposition::Applied });

    assert_eq!(
        host.run(ApiCommand::TableEvent { table_id: 1, envelope: envelope(7) }),
        Err(ApiError::PlayerNotAtTable(7))
    );

    host.run(ApiCommand::TableEvent { table_id: 1, envelope: envelope(2) }).unwrap();
    assert_eq!(host.view(1).unwrap().status, TableStatus::WaitShuffle);
}

#[test]
fn join_reuses_matching_tables() {
    let mut host = Host::new();
    for player_id in 1..=3 {
        host.ledger.add_balance(player_id, Chips(1_000_000));
    }

    let a = host.run(join(100, 1)).unwrap();
    let b = host.run(join(100, 2)).unwrap();
    let c = host.run(join(200, 3)).unwrap();

    assert_eq!(a.result, CommandResult::Seated { table_id: 1, seat: 0 });
    assert_eq!(b.result, CommandResult::Seated { table_id: 1, seat: 1 });
    assert_eq!(c.result, CommandResult::Seated { table_id: 2, seat: 0 });
    assert_eq!(host.tables().len(), 2);
}

#[test]
fn player_sits_at_one_table_only() {
    let mut host = Host::new();
    host.ledger.add_balance(1, Chips(1_000_000));
    host.run(create(100)).unwrap();
    host.run(create(200)).unwrap();

    host.run(seat(1, 1)).unwrap();
    assert_eq!(
        host.run(seat(2, 1)),
        Err(ApiError::EngineError(EngineError::PlayerAtAnotherTable(1).to_string()))
    );
}

#[test]
fn failed_join_does_not_leave_an_empty_table() {
    let mut host = Host::new();
    assert!(matches!(host.run(join(100, 1)), Err(ApiError::EngineError(_))));
    assert!(host.tables().is_empty());
}

#[test]
fn unknown_tables_and_bad_requests() {
    let mut host = Host::new();
    assert_eq!(host.run(seat(99, 1)), Err(ApiError::TableNotFound(99)));
    assert_eq!(host.view(99), Err(ApiError::TableNotFound(99)));
    assert_eq!(
        host.run(create(7)),
        Err(ApiError::EngineError(EngineError::SmallBlindNotAllowed(Chips(7)).to_string()))
    );

    assert!(matches!(ApiCommand::from_json("{\"Nope\":{}}"), Err(ApiError::BadRequest(_))));

    let json = create(100).to_json().unwrap();
    assert_eq!(ApiCommand::from_json(&json).unwrap(), create(100));
}

#[test]
fn last_player_leaving_removes_the_table() {
    let mut host = Host::new();
    host.run(create(100)).unwrap();
    host.ledger.add_balance(1, Chips(10_000));
    host.run(seat(1, 1)).unwrap();

    let response = host
        .run(ApiCommand::ExitTable(ExitTableCommand {
            table_id: 1,
            player_id: 1,
            keys: Vec::new(),
        }))
        .unwrap();
    assert_eq!(response.result, CommandResult::Exited { disposition: Disposition::Applied });
    assert!(response.effects.contains(&TableEffect::Credit {
        player_id: 1,
        amount: Chips(10_000),
        reason: CreditReason::Leave,
    }));

    assert!(host.tables().is_empty());
    assert_eq!(host.ledger.active_table(1), None);
}
