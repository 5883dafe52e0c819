// src/bin/poker_dev_cli.rs
//
// Dev CLI: один стол с симулированными клиентами, несколько раздач подряд.
// Запуск: poker_dev_cli [seed] [игроков] [раздач]
// Уровень логов задаётся через RUST_LOG (по умолчанию info).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use reveal_poker_engine::api::build_table_view;
use reveal_poker_engine::config::GameParams;
use reveal_poker_engine::domain::act::{Act, PossibleMove};
use reveal_poker_engine::domain::chips::Chips;
use reveal_poker_engine::domain::result::GameResult;
use reveal_poker_engine::domain::table::{Table, TableConfig};
use reveal_poker_engine::domain::{PlayerId, SeatIndex};
use reveal_poker_engine::engine::ManagerError;
use reveal_poker_engine::infra::{init_tracing, passive_decision, Decision, IdGenerator, TableSim};

fn arg_or(index: usize, default: u64) -> u64 {
    std::env::args()
        .nth(index)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Случайный, но не безумный игрок: в основном check/call,
/// иногда рейз из предложенных вариантов, иногда фолд.
fn random_decision(rng: &mut StdRng, table: &Table, seat: SeatIndex) -> Decision {
    let roll: u32 = rng.gen_range(0..100);
    let can_check = table.possible_moves.contains(&PossibleMove::Check);

    if roll < 12 && !can_check {
        return Decision::Fold;
    }
    if roll >= 80 && !table.raise_variants.is_empty() {
        let i = rng.gen_range(0..table.raise_variants.len().min(4));
        return Decision::Act(Act::bet(table.raise_variants[i]));
    }
    passive_decision(table, seat)
}

fn print_result(res: &GameResult) {
    let board: Vec<String> = res.board.iter().map(|c| c.to_string()).collect();
    println!(
        "  итог: {:?}, банк {} (рейк {}), борд [{}]",
        res.outcome,
        res.start_bank,
        res.bank_rake,
        board.join(" ")
    );
    for p in &res.players {
        let hand: Vec<String> = p.hand.iter().map(|c| c.to_string()).collect();
        let combo = if p.combination.is_none() {
            String::new()
        } else {
            p.combination.kind.describe().to_string()
        };
        println!(
            "    игрок {:>3} (место {}): выигрыш {:>7} {} {}",
            p.player_id,
            p.seat,
            p.winnings,
            hand.join(" "),
            combo
        );
    }
}

fn print_stacks(sim: &TableSim) {
    let Some(table) = sim.table() else {
        println!("  стол удалён");
        return;
    };
    let view = build_table_view(table);
    let stacks: Vec<String> = view
        .players
        .iter()
        .map(|p| format!("{}:{}", p.player_id, p.stack))
        .collect();
    println!("  стеки: {}", stacks.join(", "));
}

fn chips_on_table(sim: &TableSim) -> Chips {
    sim.table()
        .map(|t| t.players.iter().map(|p| p.stack).sum())
        .unwrap_or_default()
}

fn main() -> Result<(), ManagerError> {
    init_tracing();

    let seed = arg_or(1, 7);
    let players = arg_or(2, 4).clamp(2, 6) as usize;
    let hands = arg_or(3, 10);

    println!("poker_dev_cli: seed={seed}, игроков={players}, раздач={hands}");

    let params = GameParams::standard();
    let config = TableConfig::new(Chips(100), 6);
    let mut sim = TableSim::new(params, config, seed, 1_000)?;
    let mut rng = StdRng::seed_from_u64(seed);

    let mut ids = IdGenerator::new();
    let player_ids: Vec<PlayerId> = (0..players).map(|_| ids.next_player_id()).collect();
    for &player_id in &player_ids {
        let seat = sim.fund_and_seat(player_id, 100)?;
        println!("[CLI] игрок {player_id} сел на место {seat}");
    }
    let start_total = sim.ledger().total() + chips_on_table(&sim);

    for hand in 1..=hands {
        let Some(table) = sim.table() else {
            println!("[CLI] стол удалён, играть некому");
            break;
        };
        if table.seated_count() < 2 {
            println!("[CLI] за столом меньше двух игроков");
            break;
        }

        println!("=== раздача {hand} (game_id={}) ===", table.game_id);
        sim.advance_clock(5);
        match sim.play_hand(|table, seat| random_decision(&mut rng, table, seat))? {
            Some(res) => print_result(&res),
            None => println!("  раздача не дошла до расчёта, статус {:?}", sim.status()),
        }
        print_stacks(&sim);
    }

    let on_table = chips_on_table(&sim);
    let ledger = sim.ledger();
    println!();
    println!(
        "Счета + заведение: {}, на столе: {}, всего {} (было {})",
        ledger.total(),
        on_table,
        ledger.total() + on_table,
        start_total
    );
    println!("Доход заведения: {}", ledger.house());
    Ok(())
}
