//! Общие утилиты интеграционных тестов.

#![allow(dead_code)]

use reveal_poker_engine::config::{GameParams, TimeoutRules};
use reveal_poker_engine::domain::card::Card;
use reveal_poker_engine::domain::chips::Chips;
use reveal_poker_engine::domain::table::{Table, TableConfig, TableStatus};
use reveal_poker_engine::domain::{PlayerId, SeatIndex};
use reveal_poker_engine::infra::TableSim;

pub const NOW: u64 = 1_000;

/// Параметры без рейка и с мелкими блайндами: суммы в тестах считаются в уме.
pub fn test_params() -> GameParams {
    GameParams {
        allowed_small_blinds: vec![Chips(5), Chips(10), Chips(100)],
        allowed_table_sizes: vec![2, 3, 6],
        rake_percent: 0.0,
        max_rake: Chips(1_000),
        player_pay_percent: 70,
        min_buyin_sb: 2,
        max_buyin_sb: 200,
        timeouts: TimeoutRules::standard(),
    }
}

/// Стол, где `stacks[i]` сидит на месте `i` с id `i + 1`, раздача уже началась.
pub fn seated(params: GameParams, small_blind: u64, stacks: &[u64], seed: u64) -> TableSim {
    seated_with(params, TableConfig::new(Chips(small_blind), 6), stacks, seed)
}

pub fn seated_with(params: GameParams, config: TableConfig, stacks: &[u64], seed: u64) -> TableSim {
    let seats: Vec<(PlayerId, Chips)> = stacks
        .iter()
        .enumerate()
        .map(|(i, &stack)| (i as PlayerId + 1, Chips(stack)))
        .collect();
    TableSim::with_seated(params, config, seed, NOW, &seats).expect("стол собирается")
}

/// Хедз-ап: место 0 на кнопке и малом блайнде, место 1 на большом.
pub fn heads_up(small_blind: u64, stack: u64, seed: u64) -> TableSim {
    seated(test_params(), small_blind, &[stack, stack], seed)
}

pub fn cards(s: &str) -> Vec<Card> {
    s.split_whitespace()
        .map(|c| c.parse::<Card>().expect("карта"))
        .collect()
}

pub fn table(sim: &TableSim) -> &Table {
    sim.table().expect("стол существует")
}

pub fn stack_of(sim: &TableSim, seat: SeatIndex) -> Chips {
    table(sim).players[seat].stack
}

/// Все фишки системы: счета, заведение и стеки за столом.
pub fn chips_in_play(sim: &TableSim) -> Chips {
    let on_table: Chips = sim
        .table()
        .map(|t| t.players.iter().map(|p| p.stack).sum())
        .unwrap_or_default();
    sim.ledger().total() + on_table
}

/// Провести протокол до хода игрока и проверить, что ход действительно ждут.
pub fn run_to_action(sim: &mut TableSim) {
    let status = sim.run_until_action().expect("протокол идёт");
    assert_eq!(status, Some(TableStatus::WaitPlayersAct));
}

pub fn run_to_end(sim: &mut TableSim) {
    let status = sim.run_until_action().expect("протокол идёт");
    assert_eq!(status, Some(TableStatus::WaitEndGame));
}
