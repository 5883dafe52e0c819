//! Принудительный таймаут и возврат ключей от хранителя.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::cipher::decrypt_card;
use crate::domain::chips::Chips;
use crate::domain::key::{sort_by_index, CardKey};
use crate::domain::player::{PlayerAtTable, PlayerStatus};
use crate::domain::result::{GameResult, HandOutcome};
use crate::domain::table::{Table, TableStatus};
use crate::domain::{PlayerId, SeatIndex};
use crate::engine::actions::{Disposition, IgnoreReason};
use crate::engine::betting::{return_round_bets_of_out, update_players_with_bets};
use crate::engine::effects::{CreditReason, IncomeSource, TableEffect};
use crate::engine::errors::EngineError;
use crate::engine::game_loop::{advance_turn, atomically};
use crate::engine::hand_history::HandEventKind;
use crate::engine::positions::init_new_game;
use crate::engine::reveal::{deal_next_street, set_events_from_out_and_fold, BOARD_SIZE};
use crate::engine::settlement::{end_game, end_reset_game, statistics_record};
use crate::engine::validation::ensure_status;
use crate::engine::EngineContext;

/// Кого снимать по таймауту.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimeoutKind {
    /// Всех, кто не прислал событие фазы.
    Many,
    /// Только того, чей ход.
    Single,
}

fn timeout_kind(status: TableStatus) -> Result<TimeoutKind, EngineError> {
    match status {
        TableStatus::WaitEndGame | TableStatus::WaitStartGame => Ok(TimeoutKind::Many),
        s if s.is_waiting_keys() => Ok(TimeoutKind::Many),
        TableStatus::WaitShuffle
        | TableStatus::WaitCrypt
        | TableStatus::WaitPlayersAct
        | TableStatus::WaitRsaKeys => Ok(TimeoutKind::Single),
        other => Err(EngineError::WrongTableStatus(other)),
    }
}

/// Штрафовать ли сорвавших раздачу: только пока борд не открыт целиком
/// и ключи не лежат у хранителя.
fn penalty_applies(table: &Table) -> bool {
    table.status != TableStatus::WaitEndGame
        && !table.config.escrow_keys
        && table.table_cards.len() != BOARD_SIZE
}

/// Снять с раздачи молчащих. Возвращает новых таймаутных и оставшихся в игре.
fn set_players_timeouts(
    table: &mut Table,
    ctx: &mut EngineContext<'_>,
    kind: TimeoutKind,
    penalty: bool,
) -> Result<(Vec<SeatIndex>, Vec<SeatIndex>), EngineError> {
    let escrow = table.config.escrow_keys;
    let mut timed_out = Vec::new();
    let mut in_game = Vec::new();

    for seat in table.dealt_in_order(table.next_player_index) {
        let next = table.next_player_index;
        let p = table.player(seat)?;
        if matches!(p.status, PlayerStatus::Out | PlayerStatus::Timeout) {
            continue;
        }

        let silent = match kind {
            TimeoutKind::Many => !p.has_event,
            TimeoutKind::Single => seat == next,
        };
        if !silent {
            in_game.push(seat);
            continue;
        }

        let p = table.player_mut(seat)?;
        p.status = PlayerStatus::Timeout;
        if escrow {
            p.wait_escrow = true;
        }
        let (player_id, sum_of_bets) = (p.player_id, p.sum_of_bets);
        table.folds_count += 1;

        if penalty {
            ctx.emit(TableEffect::Penalty {
                player_id,
                amount: sum_of_bets,
            });
        }
        table.history.push(HandEventKind::PlayerTimedOut { seat, player_id });
        warn!(table_id = table.id, game_id = table.game_id, seat, player_id, "игрок снят по таймауту");
        timed_out.push(seat);
    }

    Ok((timed_out, in_game))
}

/// Вернуть в банк ставки текущего раунда у только что снятых.
fn return_round_bets(table: &mut Table, seats: &[SeatIndex]) -> Result<(), EngineError> {
    for &seat in seats {
        if !table.player(seat)?.cur_round_bets.is_zero() {
            return_round_bets_of_out(table, seat)?;
        }
    }
    Ok(())
}

/// Стол мёртв: все, кроме запросившего, получают стартовый стек и встают.
fn reset_dead_table(table: &mut Table, ctx: &mut EngineContext<'_>, caller: SeatIndex) -> Result<(), EngineError> {
    warn!(table_id = table.id, game_id = table.game_id, "стол признан мёртвым");

    // После расчёта стеки уже итоговые, иначе раздача отменяется.
    let settled = table.status == TableStatus::WaitEndGame;
    let mut lost = Chips::ZERO;
    for seat in 0..table.players.len() {
        let p = &table.players[seat];
        if seat == caller || matches!(p.status, PlayerStatus::NoSeat | PlayerStatus::Waiting) {
            continue;
        }
        if p.status == PlayerStatus::Out {
            if !settled {
                lost += p.sum_of_bets;
            }
            continue;
        }

        let player_id = p.player_id;
        let amount = if settled { p.stack } else { p.start_stack };
        ctx.emit(TableEffect::Credit {
            player_id,
            amount,
            reason: CreditReason::DeadTable,
        });
        ctx.emit(TableEffect::SeatReleased {
            player_id,
            table_id: table.id,
        });
        table.players[seat] = PlayerAtTable::empty_seat();
    }

    let me = table.player_mut(caller)?;
    if !settled && me.status.is_dealt_in() {
        me.stack = me.start_stack;
    }

    // Вклад ушедших раньше уже не вернуть: он остаётся заведению.
    if !lost.is_zero() {
        ctx.emit(TableEffect::HouseIncome {
            amount: lost,
            source: IncomeSource::TimeoutFine,
        });
    }

    let mut res = GameResult::new(table.id, table.game_id);
    res.outcome = HandOutcome::DeadTableReset;
    res.start_bank = table.current_bank;
    res.bank_rake = lost;
    res.board = table.table_cards.clone();
    ctx.emit(TableEffect::Statistics(statistics_record(table, &res, ctx.now)));
    table.last_result = Some(res);

    init_new_game(table, ctx, true)
}

/// Сорванная раздача: оставшимся вернуть стартовые стеки, вклады снятых
/// делятся между оставшимися и заведением.
fn reset_hand(table: &mut Table, ctx: &mut EngineContext<'_>, in_game: &[SeatIndex]) -> Result<(), EngineError> {
    for &seat in in_game {
        let p = table.player_mut(seat)?;
        p.stack = p.start_stack;
        let returned = p.sum_of_bets;
        table.current_bank -= returned;
    }

    let fine_bank = table.current_bank;
    let mut part = Chips::ZERO;
    if !fine_bank.is_zero() {
        let mut house = fine_bank;
        if !in_game.is_empty() {
            let fine = fine_bank * ctx.params.player_pay_percent / 100;
            part = fine / in_game.len() as u64;
            house = fine_bank - part * in_game.len() as u64;

            if !part.is_zero() {
                for &seat in in_game {
                    let player_id = table.player(seat)?.player_id;
                    ctx.emit(TableEffect::Credit {
                        player_id,
                        amount: part,
                        reason: CreditReason::TimeoutFine,
                    });
                }
            }
        }
        if !house.is_zero() {
            ctx.emit(TableEffect::HouseIncome {
                amount: house,
                source: IncomeSource::TimeoutFine,
            });
        }
    }

    info!(table_id = table.id, game_id = table.game_id, fine = %fine_bank, %part, "раздача сброшена по таймауту");
    end_reset_game(table, ctx, part, in_game, fine_bank)
}

/// Событие `ForceTimeout`. Статус стола уже сверен с ожидаемым.
pub fn force_timeout(
    table: &mut Table,
    ctx: &mut EngineContext<'_>,
    caller: SeatIndex,
) -> Result<Disposition, EngineError> {
    let status = table.status;
    let timeouts = ctx.params.timeouts;
    let timeout = timeouts.timeout_for(status);
    let elapsed = ctx.now.saturating_sub(table.timestamp);

    if elapsed < timeout {
        return Err(EngineError::TimeoutNotElapsed {
            remaining: timeout - elapsed,
        });
    }
    if status == TableStatus::WaitPlayer {
        return Ok(Disposition::Ignored(IgnoreReason::NothingToWait));
    }

    if elapsed >= timeout + timeouts.dead_table_secs {
        reset_dead_table(table, ctx, caller)?;
        return Ok(Disposition::Applied);
    }

    let kind = timeout_kind(status)?;
    let penalty = penalty_applies(table);
    if status.is_waiting_keys() {
        set_events_from_out_and_fold(table);
    }
    let (timed_out, in_game) = set_players_timeouts(table, ctx, kind, penalty)?;

    if status == TableStatus::WaitEndGame {
        init_new_game(table, ctx, true)?;
        return Ok(Disposition::Applied);
    }

    let escrow_phase = table.config.escrow_keys
        && status.code() >= TableStatus::WaitPlayersAct.code()
        && status != TableStatus::WaitRsaKeys;

    if escrow_phase && !in_game.is_empty() {
        if in_game.len() == 1 {
            update_players_with_bets(table);
            end_game(table, ctx)?;
        } else {
            return_round_bets(table, &timed_out)?;
            table.saved_status = Some(status);
            table.status = TableStatus::WaitRsaKeys;
            table.set_last_time(ctx.now);
            for p in table.players.iter_mut() {
                p.late_trxs.clear();
                p.applied_late_trxs.clear();
            }
            info!(table_id = table.id, game_id = table.game_id, "ждём ключи от хранителя");
        }
        return Ok(Disposition::Applied);
    }

    if table.table_cards.len() == BOARD_SIZE && in_game.len() > 1 {
        return_round_bets(table, &timed_out)?;
        if matches!(status, TableStatus::WaitAllKeys | TableStatus::WaitAllInKeys) {
            update_players_with_bets(table);
            end_game(table, ctx)?;
        } else {
            advance_turn(table, ctx)?;
        }
        return Ok(Disposition::Applied);
    }

    reset_hand(table, ctx, &in_game)?;
    Ok(Disposition::Applied)
}

/// Ключи снятых по таймауту игроков, полученные от хранителя.
///
/// Ключи чужих карманных карт сохраняются до вскрытия, со ещё не
/// открытых карт борда слой снимается сразу. После этого стол
/// продолжает прерванную фазу.
pub fn submit_escrow_keys(
    table: &mut Table,
    ctx: &mut EngineContext<'_>,
    keys: BTreeMap<PlayerId, Vec<CardKey>>,
) -> Result<(), EngineError> {
    atomically(table, ctx, |table, ctx| resume_with_escrow_keys(table, ctx, keys))
}

fn resume_with_escrow_keys(
    table: &mut Table,
    ctx: &mut EngineContext<'_>,
    keys: BTreeMap<PlayerId, Vec<CardKey>>,
) -> Result<(), EngineError> {
    ensure_status(table, TableStatus::WaitRsaKeys)?;

    let waiting = table.players.iter().filter(|p| p.wait_escrow).count();
    if keys.len() != waiting {
        return Err(EngineError::WrongEscrowPlayers);
    }

    let hole_cards = table.hole_cards_count();
    let decrypt_from = table.board_start_index() + table.table_cards.len();
    let decrypt_to = table.board_start_index() + BOARD_SIZE;

    for (player_id, mut player_keys) in keys {
        let seat = table
            .players
            .iter()
            .position(|p| p.wait_escrow && p.player_id == player_id)
            .ok_or(EngineError::WrongEscrowPlayers)?;

        sort_by_index(&mut player_keys);
        for key in &player_keys {
            let index = key.card_index as usize;
            if index < hole_cards {
                if !table.all_keys.contains(key) {
                    table.all_keys.push(key.clone());
                }
            } else if (decrypt_from..decrypt_to).contains(&index) {
                let card = table.deck.card_mut(key.card_index)?;
                *card = decrypt_card(*card, key);
            }
        }

        let p = table.player_mut(seat)?;
        p.has_event = true;
        p.wait_escrow = false;
    }

    table.waiting_keys.clear();
    table.received_count = 0;
    for p in table.players.iter_mut() {
        p.late_trxs.clear();
        p.applied_late_trxs.clear();
        p.has_event = false;
    }

    let resumed = table
        .saved_status
        .take()
        .ok_or(EngineError::Internal("no phase saved before escrow wait"))?;
    table.status = resumed;
    info!(table_id = table.id, game_id = table.game_id, status = ?resumed, "ключи хранителя приняты");

    match resumed {
        TableStatus::WaitKeysForPlayers => {
            table.set_last_time(ctx.now);
            table.next_player_index = table.next_dealt_in_index(table.bb_index, 1);
            table.status = TableStatus::WaitPlayersAct;
            Ok(())
        }
        TableStatus::WaitKeysForShowdown => deal_next_street(table, ctx),
        TableStatus::WaitPlayersAct => advance_turn(table, ctx),
        _ => end_game(table, ctx),
    }
}
