//! Расчёт раздачи: возврат неуравненной ставки, рейк, выигрыши, статистика.

use tracing::info;

use crate::domain::act::ActKind;
use crate::domain::chips::Chips;
use crate::domain::player::PlayerStatus;
use crate::domain::result::{GameResult, HandOutcome, PlayerHistoryInfo, SeatStatistics, StatisticsRecord};
use crate::domain::table::{Table, TableStatus};
use crate::domain::SeatIndex;
use crate::engine::effects::{IncomeSource, TableEffect};
use crate::engine::errors::EngineError;
use crate::engine::hand_history::HandEventKind;
use crate::engine::reveal::set_events_from_out_players;
use crate::engine::showdown::set_showdown;
use crate::engine::side_pots::{save_all_in_history, save_one_winner_history};
use crate::engine::EngineContext;

/// Вернуть игроку часть его последней ставки.
fn refund(table: &mut Table, seat: SeatIndex, odd: Chips) -> Result<(), EngineError> {
    let player = table.player_mut(seat)?;
    player.stack += odd;
    if let Some(last) = player.acts.last_mut() {
        last.bet -= odd;
    }
    player.sum_of_bets -= odd;
    table.bank -= odd;
    table.current_bank -= odd;
    Ok(())
}

/// Вернуть неуравненную часть самой большой ставки последнего раунда со ставками.
///
/// В режиме эскроу игрокам с таймаутом сначала возвращается всё, что выше
/// максимальной ставки оставшихся в игре.
pub fn return_bets_odds(table: &mut Table, escrow: bool) -> Result<(), EngineError> {
    let last_bet_round = table
        .players_with_bets
        .iter()
        .rposition(|&n| n != 0)
        .ok_or(EngineError::Internal("no betting round with bets"))?;

    let mut max_in_game = Chips::ZERO;
    let mut bets: Vec<(SeatIndex, Chips)> = Vec::new();
    let mut cur_round = 0usize;

    for pa in table.acts.iter() {
        if pa.act.moves_chips() && cur_round == last_bet_round {
            if let Some(seat) = pa.seat {
                if table.player(seat)?.status == PlayerStatus::InGame && pa.act.bet > max_in_game {
                    max_in_game = pa.act.bet;
                }
                bets.push((seat, pa.act.bet));
            }
        }
        if pa.act.kind == ActKind::NewRound {
            if cur_round == last_bet_round {
                break;
            }
            cur_round += 1;
        }
    }

    if escrow {
        let mut checked: Vec<SeatIndex> = Vec::new();
        for i in 0..bets.len() {
            let seat = bets[i].0;
            if table.player(seat)?.status != PlayerStatus::Timeout || checked.contains(&seat) {
                continue;
            }
            checked.push(seat);

            let mut max_idx = i;
            for (j, &(s, bet)) in bets.iter().enumerate() {
                if s == seat && bet >= bets[max_idx].1 {
                    max_idx = j;
                }
            }

            let timeout_bet = bets[max_idx].1;
            if timeout_bet > max_in_game {
                let odd = timeout_bet - max_in_game;
                refund(table, seat, odd)?;
                bets[max_idx].1 -= odd;
            }
        }
    }

    bets.sort_by_key(|&(_, bet)| bet);
    let Some(&(max_seat, max_bet)) = bets.last() else {
        return Err(EngineError::Internal("no bets in the last betting round"));
    };

    if bets.len() == 1 {
        if !table.player(max_seat)?.all_in {
            refund(table, max_seat, max_bet)?;
        }
        return Ok(());
    }

    let (prev_seat, prev_bet) = bets[bets.len() - 2];
    if prev_bet != max_bet && prev_seat != max_seat {
        refund(table, max_seat, max_bet - prev_bet)?;
    }
    Ok(())
}

/// Рейк стола и рейк каждого игрока.
///
/// Стол: процент от банка с округлением, не больше максимума (тогда процент
/// пересчитывается). Игрок: процент от его вклада с округлением вверх.
/// Берётся большее из двух.
fn take_rake(table: &mut Table, ctx: &EngineContext<'_>) -> Result<(Chips, f64), EngineError> {
    let current_bank = table.current_bank;
    let mut rake_percent = ctx.params.rake_percent;
    let mut bank_rake = current_bank.percent_rounded(rake_percent);

    if bank_rake > ctx.params.max_rake {
        bank_rake = ctx.params.max_rake;
        rake_percent = bank_rake.amount() as f64 * 100.0 / current_bank.amount() as f64;
    }

    let mut check_rake = Chips::ZERO;
    for p in table.players.iter_mut() {
        if matches!(p.status, PlayerStatus::Waiting | PlayerStatus::NoSeat) {
            continue;
        }
        p.rake = p.sum_of_bets.percent_ceil(rake_percent);
        check_rake += p.rake;
    }

    if check_rake < bank_rake {
        return Err(EngineError::Internal("sum of players rake below table rake"));
    }
    Ok((bank_rake.max(check_rake), rake_percent))
}

/// Запись статистики по раздаче.
pub fn statistics_record(table: &Table, res: &GameResult, now: u64) -> StatisticsRecord {
    let seats = table
        .players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.status.is_dealt_in())
        .map(|(seat, p)| SeatStatistics {
            player_id: p.player_id,
            seat,
            start_stack: p.start_stack,
            end_stack: p.stack,
            sum_of_bets: p.sum_of_bets,
            rake: p.rake,
            winnings: res.winnings_of(p.player_id),
        })
        .collect();

    StatisticsRecord {
        table_id: table.id,
        game_id: table.game_id,
        started_at: table.hand_started_at,
        finished_at: now,
        outcome: res.outcome,
        bank: res.start_bank,
        rake: res.bank_rake,
        board: res.board.clone(),
        seats,
    }
}

/// Закрыть раздачу: записать историю, статистику и ждать подтверждений.
fn finish_hand(table: &mut Table, ctx: &mut EngineContext<'_>, mut res: GameResult) {
    table.history.push(HandEventKind::HandSettled {
        outcome: res.outcome,
        bank: res.start_bank,
        rake: res.bank_rake,
    });
    res.log = table.history.clone();

    ctx.emit(TableEffect::Statistics(statistics_record(table, &res, ctx.now)));
    info!(
        table_id = table.id,
        game_id = table.game_id,
        outcome = ?res.outcome,
        bank = %res.start_bank,
        rake = %res.bank_rake,
        "раздача завершена"
    );

    table.last_result = Some(res);
    table.set_last_time(ctx.now);
    table.status = TableStatus::WaitEndGame;
}

/// Расчёт раздачи.
///
/// Один претендент забирает банк без вскрытия. Иначе банк делится по
/// сайд-потам и определяется порядок вскрытия. Остаток от деления уходит
/// в рейк заведения.
pub fn end_game(table: &mut Table, ctx: &mut EngineContext<'_>) -> Result<(), EngineError> {
    set_events_from_out_players(table);

    let have_rake = !table.table_cards.is_empty();
    let only_blinds = table.round == 0 && table.current_bank == table.not_returned_bets;
    if !only_blinds {
        return_bets_odds(table, table.config.escrow_keys)?;
    }

    let (bank_rake, rake_percent) = if have_rake {
        take_rake(table, ctx)?
    } else {
        (Chips::ZERO, 0.0)
    };

    let current_bank = table.current_bank;
    let mut res = GameResult::new(table.id, table.game_id);
    res.outcome = HandOutcome::Normal;
    res.start_bank = current_bank;
    res.bank = current_bank - bank_rake;
    res.rake_percent = rake_percent;
    res.bank_rake = bank_rake;

    if table.is_end_game() {
        save_one_winner_history(table, &mut res)?;
    } else {
        save_all_in_history(table, &mut res)?;
        set_showdown(table, &mut res)?;
    }
    res.board = table.table_cards.clone();

    let mut sum_of_wins = Chips::ZERO;
    for info in res.players.iter() {
        table.player_mut(info.seat)?.stack += info.winnings;
        sum_of_wins += info.winnings;
    }

    if sum_of_wins + bank_rake > current_bank {
        return Err(EngineError::Internal("winnings and rake exceed the bank"));
    }
    res.bank_unconsumed = current_bank - sum_of_wins - bank_rake;
    res.bank_rake += res.bank_unconsumed;

    for p in table.players.iter() {
        if p.status.is_dealt_in() && !p.rake.is_zero() {
            ctx.emit(TableEffect::PlayerRake {
                player_id: p.player_id,
                amount: p.rake,
            });
        }
    }
    if !res.bank_rake.is_zero() {
        ctx.emit(TableEffect::HouseIncome {
            amount: res.bank_rake,
            source: IncomeSource::Rake,
        });
    }

    finish_hand(table, ctx, res);
    Ok(())
}

/// Раздача сброшена по таймауту: оставшимся в игре начисляется доля штрафа.
pub fn end_reset_game(
    table: &mut Table,
    ctx: &mut EngineContext<'_>,
    fine_part: Chips,
    survivors: &[SeatIndex],
    fine_bank: Chips,
) -> Result<(), EngineError> {
    let mut res = GameResult::new(table.id, table.game_id);
    res.outcome = HandOutcome::TimeoutReset;
    res.start_bank = fine_bank;
    res.bank = fine_part * survivors.len() as u64;
    res.bank_rake = fine_bank - res.bank;
    res.board = table.table_cards.clone();

    for &seat in survivors {
        let player = table.player(seat)?;
        let mut info = PlayerHistoryInfo::new(player.player_id, seat);
        info.winnings = fine_part;
        res.players.push(info);
    }

    set_events_from_out_players(table);
    finish_hand(table, ctx, res);
    Ok(())
}
