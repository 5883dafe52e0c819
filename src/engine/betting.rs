use serde::{Deserialize, Serialize};

use crate::domain::act::{Act, ActDescription, ActKind, PlayerAct, PossibleMove};
use crate::domain::chips::Chips;
use crate::domain::player::PlayerStatus;
use crate::domain::table::{Table, TableStatus};
use crate::domain::SeatIndex;
use crate::engine::errors::EngineError;
use crate::engine::hand_history::HandEventKind;
use crate::engine::validation::describe_act;

/// Что делать после очередного хода.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Advance {
    /// В раздаче остался один претендент.
    EndGame,
    /// Торговаться больше некому: открываем всё.
    EndAllIn,
    /// Найден следующий ходящий.
    PlayerToAct,
    /// Раунд торговли закрыт.
    NewRound,
}

/// Проверить действие и учесть его на стороне стола.
///
/// Личный журнал и стек игрока обновляет `PlayerAtTable::record_act`,
/// вызывающий делает это сразу после.
pub fn add_new_act(table: &mut Table, seat: SeatIndex, act: &mut Act) -> Result<(), EngineError> {
    let description = describe_act(table, seat, act)?;
    if act.kind == ActKind::Bet {
        act.description = description;
    }

    match act.kind {
        ActKind::Bet if description == ActDescription::AllIn => {
            let bank = table.bank;
            let round = table.round;
            let player = table.player_mut(seat)?;
            player.all_in = true;
            player.all_in_bank = bank;
            player.all_in_round = round;
            table.allin_count += 1;
        }
        ActKind::Fold => {
            if !table.player(seat)?.cur_round_bets.is_zero() {
                return_round_bets_of_out(table, seat)?;
            }
            table.player_mut(seat)?.status = PlayerStatus::Fold;
            table.folds_count += 1;
        }
        _ => {}
    }

    let player_id = table.player(seat)?.player_id;
    if act.kind == ActKind::Bet {
        if act.bet > table.current_bet {
            table.current_bet = act.bet;
        }
        let odds = act.bet.saturating_sub(table.player(seat)?.cur_round_bets);
        table.round_bets += odds;
        table.current_bank += odds;
        *round_bet_acts_mut(table, seat)? += 1;
    }
    table.acts.push(PlayerAct::by_seat(seat, player_id, *act));
    Ok(())
}

fn round_bet_acts_mut(table: &mut Table, seat: SeatIndex) -> Result<&mut u32, EngineError> {
    table
        .round_bet_acts
        .get_mut(seat)
        .ok_or(EngineError::InvalidSeat(seat))
}

/// Игрок выбыл посреди раунда: его вклад раунда уходит в банк.
///
/// Олл-ины этого раунда получают в свой снимок банка ту часть вклада,
/// которую они успели бы уравнять.
pub fn return_round_bets_of_out(table: &mut Table, seat: SeatIndex) -> Result<(), EngineError> {
    let out_bet = table.player(seat)?.cur_round_bets;
    let round = table.round;

    for (idx, p) in table.players.iter_mut().enumerate() {
        if idx == seat || matches!(p.status, PlayerStatus::NoSeat | PlayerStatus::Waiting) {
            continue;
        }
        if p.all_in && p.all_in_round == round {
            let covered = out_bet.min(p.last_bet());
            p.all_in_bank += covered;
        }
    }

    table.bank += out_bet;
    table.round_bets -= out_bet;
    *round_bet_acts_mut(table, seat)? = 0;
    Ok(())
}

/// Снимок раунда: сколько мест ставило. Счётчики раунда обнуляются.
pub fn update_players_with_bets(table: &mut Table) {
    let with_bets = table.round_bet_acts.iter().filter(|&&n| n != 0).count() as u32;
    table.round_bet_acts = vec![0; table.players.len()];
    table.players_with_bets.push(with_bets);
}

/// Закрыть раунд торговли.
pub fn close_round(table: &mut Table) {
    table.acts.push(PlayerAct::new_round());
    table.bank += table.round_bets;
    table.current_bank = table.bank;
    table.round_bets = Chips::ZERO;
    table.current_bet = Chips::ZERO;

    for p in table.players.iter_mut() {
        if matches!(p.status, PlayerStatus::Waiting | PlayerStatus::NoSeat) {
            continue;
        }
        p.count_of_acts = 0;
        p.cur_round_bets = Chips::ZERO;
    }
    update_players_with_bets(table);

    let (round, bank) = (table.round, table.bank);
    table.history.push(HandEventKind::RoundClosed { round, bank });
}

/// Подсказка клиенту: какие ходы сейчас допустимы.
pub fn set_possible_moves(table: &mut Table) -> Result<(), EngineError> {
    let seat = table.next_player_index;
    let player = table.player(seat)?;
    let current_bet = table.current_bet;
    let big_blind = table.big_blind();

    let mut moves = vec![PossibleMove::Fold, PossibleMove::Bet];

    if player.cur_round_bets < current_bet && player.stack > current_bet - player.cur_round_bets {
        moves.push(PossibleMove::Call);
    }
    if current_bet.is_zero() {
        moves.push(PossibleMove::Check);
    }

    if table.round == 0 {
        if seat == table.bb_index {
            // Только блайнд, никто не повысил.
            if player.count_of_acts == 1 && current_bet == big_blind {
                moves.push(PossibleMove::Check);
            }
        } else if player.extra_bb && current_bet == big_blind && player.cur_round_bets == current_bet {
            moves.push(PossibleMove::Check);
        }
    }

    table.possible_moves = moves;
    Ok(())
}

/// Варианты ставки: от 2 SB (или двойной текущей ставки) с шагом SB до олл-ина.
pub fn set_raise_variants(table: &mut Table) -> Result<(), EngineError> {
    let player = table.player(table.next_player_index)?;
    let max = player.stack + player.cur_round_bets;
    let step = table.small_blind();

    let mut variant = if table.current_bet.is_zero() {
        table.big_blind()
    } else {
        table.current_bet * 2
    };

    let mut variants = Vec::new();
    loop {
        if variant >= max || step.is_zero() {
            variants.push(max);
            break;
        }
        variants.push(variant);
        variant += step;
    }

    table.raise_variants = variants;
    Ok(())
}

/// Найти следующего ходящего или решить, чем закончился раунд.
///
/// Обход идёт от последнего ходившего по местам раздачи, не дальше
/// одного круга. Пропускаются сфолдившие, ушедшие, таймаут и олл-ин.
pub fn next_player(table: &mut Table) -> Result<Advance, EngineError> {
    if table.is_end_game() {
        table.bank += table.round_bets;
        table.round_bets = Chips::ZERO;
        table.current_bank = table.bank;
        update_players_with_bets(table);
        table.status = TableStatus::EndGame;
        return Ok(Advance::EndGame);
    }

    if table.is_end_all_in_game() {
        return Ok(Advance::EndAllIn);
    }

    let big_blind = table.big_blind();
    let mut remaining = table.game_players_count;
    let mut found = false;

    while remaining > 1 {
        remaining -= 1;
        let idx = table.next_dealt_in_index(table.next_player_index, 1);
        table.next_player_index = idx;

        let p = table.player(idx)?;
        let skip = (p.all_in && p.status == PlayerStatus::InGame)
            || matches!(p.status, PlayerStatus::Fold | PlayerStatus::Out | PlayerStatus::Timeout);
        if skip {
            continue;
        }

        let preflop = table.round == 0;
        let only_blind = p.count_of_acts == 1;

        let must_act = p.count_of_acts == 0
            // Новичок доплатил BB вне позиций блайндов.
            || (preflop && only_blind && p.extra_bb && idx != table.sb_index && idx != table.bb_index)
            // Ставку перебили.
            || p.cur_round_bets < table.current_bet
            // Никто не повысил: большой блайнд ещё может походить.
            || (preflop && idx == table.bb_index && only_blind && table.current_bet == big_blind)
            || (preflop && idx == table.sb_index && p.extra_bb && only_blind);

        if must_act {
            found = true;
            break;
        }
    }

    if found {
        set_raise_variants(table)?;
        set_possible_moves(table)?;
        return Ok(Advance::PlayerToAct);
    }

    close_round(table);
    Ok(Advance::NewRound)
}
