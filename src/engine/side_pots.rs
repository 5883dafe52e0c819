//! Делёж банка с олл-инами: сайд-поты от младшего уровня к старшему.

use crate::domain::chips::Chips;
use crate::domain::player::PlayerStatus;
use crate::domain::result::{GameResult, PlayerHistoryInfo, SidePot};
use crate::domain::table::Table;
use crate::domain::SeatIndex;
use crate::engine::errors::EngineError;
use crate::engine::reveal::decrypt_players_cards;
use crate::eval::evaluate_best_hand;

/// Сколько претендентов делят банк: первый и все следующие за ним,
/// кто ему не уступает. Претенденты отсортированы по силе руки.
pub fn count_of_winners(bidders: &[PlayerHistoryInfo]) -> usize {
    let mut count = 1;
    for pair in bidders.windows(2) {
        if pair[0].combination.beats(&pair[1].combination) {
            break;
        }
        count += 1;
    }
    count
}

/// Разделить `bank` поровну между победителями. Остаток от деления
/// остаётся невостребованным и уходит заведению при расчёте раздачи.
///
/// `side_pot == true`: каждому претенденту пишется его доля в этом поте.
pub fn calculate_winners(bank: Chips, bidders: &mut [PlayerHistoryInfo], side_pot: bool) {
    if bidders.is_empty() {
        return;
    }

    let winners = count_of_winners(bidders);
    let prize = bank / winners as u64;

    for (i, bidder) in bidders.iter_mut().enumerate() {
        let win = if i < winners { prize } else { Chips::ZERO };
        bidder.winnings += win;
        if side_pot {
            bidder.side_pots.push(SidePot { bank, win });
        }
    }
}

/// Сначала олл-ины по возрастанию (банк на момент олл-ина, последняя ставка),
/// затем остальные игроки в игре по порядку мест.
pub fn all_in_sorted_seats(table: &Table) -> Vec<SeatIndex> {
    let mut all_in: Vec<SeatIndex> = table
        .players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.all_in && p.status != PlayerStatus::Out)
        .map(|(seat, _)| seat)
        .collect();

    all_in.sort_by(|&a, &b| {
        let (pa, pb) = (&table.players[a], &table.players[b]);
        pa.all_in_bank
            .cmp(&pb.all_in_bank)
            .then_with(|| pa.last_bet().cmp(&pb.last_bet()))
    });

    let others = table
        .players
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.all_in && p.status == PlayerStatus::InGame)
        .map(|(seat, _)| seat);
    all_in.extend(others);
    all_in
}

/// Руки претендентов по убыванию силы. Заодно кладёт на стол все пять карт борда.
///
/// Карты выбывших не вскрываются: у них пустая комбинация.
pub fn combo_sorted_players(table: &mut Table, seats: &[SeatIndex]) -> Result<Vec<PlayerHistoryInfo>, EngineError> {
    let start = table.board_start_index();
    let mut board = Vec::with_capacity(5);
    for index in start..start + 5 {
        board.push(table.deck.card(index as u8)?);
    }
    table.table_cards = board.clone();

    let mut sorted = Vec::with_capacity(seats.len());
    for &seat in seats {
        let player = table.player(seat)?;
        let mut info = PlayerHistoryInfo::new(player.player_id, seat);

        if !player.status.is_out_of_hand() {
            let (i1, i2) = player
                .hole_indexes()
                .ok_or(EngineError::PlayerNotInGame(player.player_id))?;
            info.hand = vec![table.deck.card(i1)?, table.deck.card(i2)?];
            info.combination = evaluate_best_hand(&info.hand, &board);
            info.show = player.all_in && player.status == PlayerStatus::InGame;
        }
        sorted.push(info);
    }

    // Стабильная сортировка: при равных руках сохраняется порядок олл-инов.
    sorted.sort_by(|a, b| b.combination.rank_cmp(&a.combination));
    Ok(sorted)
}

/// Разыграть банк с олл-инами.
///
/// Для каждого уровня олл-ина считается его сайд-пот: снимок банка
/// на момент олл-ина плюс ставка уровня с каждого, кто ставил в том раунде,
/// за вычетом уже разыгранного. С пота снимается рейк (с отбрасыванием дробной части),
/// выигравшие делят остаток, игроки уровня уходят из розыгрыша.
/// Остаток банка делят оставшиеся претенденты.
pub fn save_all_in_history(table: &mut Table, res: &mut GameResult) -> Result<(), EngineError> {
    decrypt_players_cards(table)?;

    let mut queue = all_in_sorted_seats(table);
    let mut contenders = combo_sorted_players(table, &queue)?;

    let mut total_bank = res.bank;
    let mut prev_rounds_bank = Chips::ZERO;
    let mut used_bank = Chips::ZERO;
    let mut prev_bet = Chips::ZERO;
    let mut prev_round: Option<u8> = None;
    let mut prev_players: u64 = 0;
    let mut side_pot = false;
    let mut remaining = table.allin_count;

    while remaining > 0 {
        let Some(&first) = queue.first() else {
            break;
        };
        let player = table.player(first)?;
        if !player.all_in {
            return Err(EngineError::Internal("all-in counter out of sync"));
        }
        side_pot = true;

        let round = player.all_in_round;
        let all_in_bank = player.all_in_bank;
        let mut all_in_bet = player.last_bet();
        let mut round_bets_count = table
            .players_with_bets
            .get(round as usize)
            .map(|&n| u64::from(n))
            .ok_or(EngineError::Internal("no bets snapshot for all-in round"))?;

        let same_round = prev_round == Some(round);
        if same_round {
            all_in_bet -= prev_bet;
            round_bets_count = round_bets_count.saturating_sub(prev_players);
        } else {
            prev_bet = Chips::ZERO;
            used_bank = Chips::ZERO;
            prev_players = 0;
        }

        let mut bank_size = all_in_bank + all_in_bet * round_bets_count;
        bank_size -= used_bank;
        if !same_round {
            bank_size -= prev_rounds_bank;
        }

        let pot_rake = bank_size.percent_trunc(res.rake_percent);
        bank_size -= pot_rake;
        if bank_size > total_bank {
            bank_size = total_bank;
        }

        calculate_winners(bank_size, &mut contenders, true);

        if !same_round && round != 0 {
            used_bank += all_in_bank;
        }
        total_bank -= bank_size;
        prev_round = Some(round);
        prev_bet += all_in_bet;
        prev_rounds_bank += bank_size + pot_rake;

        // Олл-ины одного уровня уходят вместе.
        let mut moved = 0;
        loop {
            let seat = queue[moved];
            if let Some(pos) = contenders.iter().position(|c| c.seat == seat) {
                res.players.push(contenders.remove(pos));
            }
            remaining = remaining.saturating_sub(1);
            prev_players += 1;
            moved += 1;

            let Some(&next) = queue.get(moved) else {
                break;
            };
            let (cur, nxt) = (table.player(seat)?, table.player(next)?);
            let same_level =
                nxt.all_in && cur.all_in_bank == nxt.all_in_bank && cur.last_bet() == nxt.last_bet();
            if !same_level {
                break;
            }
        }
        queue.drain(..moved);
    }

    if !contenders.is_empty() {
        if !total_bank.is_zero() {
            calculate_winners(total_bank, &mut contenders, side_pot);
        }
        res.players.append(&mut contenders);
    }

    // Выбывшие попадают в итог с нулевым выигрышем.
    for seat in table.dealt_in_order(table.next_player_index) {
        let player = table.player(seat)?;
        if !player.status.is_out_of_hand() {
            continue;
        }
        if player.status == PlayerStatus::Timeout && res.players.iter().any(|p| p.seat == seat) {
            continue;
        }
        res.players.push(PlayerHistoryInfo::new(player.player_id, seat));
    }

    sort_by_winnings(&mut res.players);
    Ok(())
}

/// Итог одного претендента: он забирает весь банк.
pub fn save_one_winner_history(table: &Table, res: &mut GameResult) -> Result<(), EngineError> {
    for seat in table.dealt_in_order(table.next_player_index) {
        let player = table.player(seat)?;
        let mut info = PlayerHistoryInfo::new(player.player_id, seat);
        if player.status == PlayerStatus::InGame {
            info.winnings = res.bank;
        }
        res.players.push(info);
    }
    sort_by_winnings(&mut res.players);
    Ok(())
}

fn sort_by_winnings(players: &mut [PlayerHistoryInfo]) {
    players.sort_by(|a, b| b.winnings.cmp(&a.winnings));
}
