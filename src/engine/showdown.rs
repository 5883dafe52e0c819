use crate::domain::act::{ActDescription, ActKind};
use crate::domain::chips::Chips;
use crate::domain::result::{GameResult, PlayerHistoryInfo};
use crate::domain::table::Table;
use crate::engine::errors::EngineError;

/// Порядок и объём вскрытия на шоудауне.
///
/// Первым вскрывается последний агрессор раунда (без него: первый после дилера),
/// дальше по кругу. Игрок показывает карты, если выиграл или его рука не хуже
/// лучшей уже показанной. Если кроме олл-инов в игре остался один претендент,
/// вскрываются все.
pub fn set_showdown(table: &Table, res: &mut GameResult) -> Result<(), EngineError> {
    for info in res.players.iter_mut() {
        if !info.winnings.is_zero() {
            info.show = true;
        }
    }

    let mut start = table.next_dealt_in_index(table.dealer_index, 1);
    let mut max_bet = Chips::ZERO;

    // Последняя запись: отметка закрытия раунда.
    for pa in table.acts.iter().rev().skip(1) {
        if pa.act.kind == ActKind::NewRound {
            break;
        }
        let Some(seat) = pa.seat else {
            continue;
        };

        if pa.act.kind == ActKind::Bet && pa.act.bet > max_bet {
            max_bet = pa.act.bet;
        }

        match pa.act.description {
            ActDescription::Raise | ActDescription::Bet if pa.act.bet == max_bet => {
                start = seat;
                break;
            }
            // Олл-ин мог быть агрессией, ищем дальше.
            ActDescription::AllIn if pa.act.bet == max_bet => start = seat,
            _ => {}
        }
    }

    let mut ordered: Vec<PlayerHistoryInfo> = Vec::with_capacity(res.players.len());
    let mut all_in_count = 0usize;
    for seat in table.dealt_in_order(start) {
        if let Some(pos) = res.players.iter().position(|p| p.seat == seat) {
            if table.player(seat)?.all_in {
                all_in_count += 1;
            }
            ordered.push(res.players.remove(pos));
        }
    }
    if !res.players.is_empty() {
        return Err(EngineError::Internal("showdown entry for a seat outside the hand"));
    }

    let Some(first) = ordered.first_mut() else {
        return Ok(());
    };

    let mut combos_count = 0usize;
    if !first.combination.is_none() {
        first.show = true;
        combos_count += 1;
    }
    let mut best = first.combination;

    for info in ordered.iter_mut().skip(1) {
        let combo = info.combination;
        if combo.is_none() {
            continue;
        }
        combos_count += 1;

        if !info.winnings.is_zero() || combo.beats(&best) || !best.beats(&combo) {
            info.show = true;
            best = combo;
        }
    }

    if combos_count == all_in_count + 1 {
        for info in ordered.iter_mut().skip(1) {
            if !info.combination.is_none() {
                info.show = true;
            }
        }
    }

    res.players = ordered;
    Ok(())
}
