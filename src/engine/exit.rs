//! Уход игрока из-за стола.

use tracing::warn;

use crate::domain::chips::Chips;
use crate::domain::key::CardKey;
use crate::domain::player::{PlayerAtTable, PlayerStatus};
use crate::domain::table::{Table, TableStatus};
use crate::domain::{PlayerId, SeatIndex};
use crate::engine::actions::{Disposition, IgnoreReason};
use crate::engine::betting::{return_round_bets_of_out, update_players_with_bets};
use crate::engine::effects::{CreditReason, TableEffect};
use crate::engine::errors::EngineError;
use crate::engine::game_loop::{advance_turn, atomically};
use crate::engine::hand_history::HandEventKind;
use crate::engine::positions::{init_new_game, move_dealer_after_hand};
use crate::engine::reveal::{apply_exit_keys, finish_key_phase};
use crate::engine::settlement::end_game;
use crate::engine::validation::{can_exit_without_keys, check_exit_keys};
use crate::engine::EngineContext;

/// Что стол делает после ухода игрока.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AfterExit {
    Nothing,
    /// Раздача начинается заново.
    NewGame { move_dealer: bool },
    /// Ключи фазы собраны.
    KeysCollected,
    /// Ушёл тот, чей был ход.
    NextTurn,
    /// Раздача уже рассчитана.
    Settled,
}

/// Вернуть стек на счёт и освободить игрока для других столов.
fn pay_out(table: &mut Table, ctx: &mut EngineContext<'_>, seat: SeatIndex) -> Result<(), EngineError> {
    let table_id = table.id;
    let p = table.player_mut(seat)?;
    let (player_id, stack) = (p.player_id, p.stack);
    p.stack = Chips::ZERO;

    if !stack.is_zero() {
        ctx.emit(TableEffect::Credit {
            player_id,
            amount: stack,
            reason: CreditReason::Leave,
        });
    }
    ctx.emit(TableEffect::SeatReleased { player_id, table_id });
    Ok(())
}

fn out_player(
    table: &mut Table,
    ctx: &mut EngineContext<'_>,
    seat: SeatIndex,
    keys: &[CardKey],
) -> Result<(), EngineError> {
    let player_id = table.player(seat)?.player_id;

    if table.player(seat)?.status == PlayerStatus::Waiting {
        pay_out(table, ctx, seat)?;
        table.players[seat] = PlayerAtTable::empty_seat();
        if table.seated_count() == 0 {
            table.status = TableStatus::Delete;
        }
        warn!(table_id = table.id, player_id, "ожидающий игрок ушёл");
        return Ok(());
    }

    let p = table.player_mut(seat)?;
    let was_fold = p.status == PlayerStatus::Fold;
    p.status = PlayerStatus::Out;
    table.history.push(HandEventKind::PlayerLeft { seat, player_id });

    let status = table.status;
    let mut after = AfterExit::Nothing;
    match status {
        TableStatus::WaitEndGame => {
            let p = table.player_mut(seat)?;
            if !p.has_event {
                p.has_event = true;
                table.received_count += 1;
                if table.received_count == table.game_players_count {
                    after = AfterExit::NewGame {
                        move_dealer: move_dealer_after_hand(table),
                    };
                }
            }
        }
        TableStatus::WaitStartGame | TableStatus::WaitShuffle | TableStatus::WaitCrypt => {
            after = AfterExit::NewGame { move_dealer: false };
        }
        _ if !was_fold => {
            let p = table.player(seat)?;
            let (cur_round_bets, all_in) = (p.cur_round_bets, p.all_in);
            if !cur_round_bets.is_zero() {
                return_round_bets_of_out(table, seat)?;
            }
            table.folds_count += 1;
            if all_in {
                table.allin_count = table.allin_count.saturating_sub(1);
            }

            apply_exit_keys(table, seat, keys)?;

            if status.is_waiting_keys() {
                let p = table.player_mut(seat)?;
                if !p.has_event {
                    p.has_event = true;
                    table.received_count += 1;
                    if table.received_count == table.game_players_count {
                        after = AfterExit::KeysCollected;
                    }
                }
            } else if status == TableStatus::WaitPlayersAct {
                if table.next_player_index == seat {
                    table.set_last_time(ctx.now);
                    after = AfterExit::NextTurn;
                }
                table.player_mut(seat)?.has_event = true;
                table.received_count += 1;
            }

            let keys_or_act = status.is_waiting_keys() || status == TableStatus::WaitPlayersAct;
            if keys_or_act && table.is_end_game() {
                update_players_with_bets(table);
                end_game(table, ctx)?;
                after = AfterExit::Settled;
            }
        }
        _ => {}
    }

    pay_out(table, ctx, seat)?;
    warn!(table_id = table.id, game_id = table.game_id, seat, player_id, "игрок ушёл из-за стола");

    match after {
        AfterExit::NewGame { move_dealer } => init_new_game(table, ctx, move_dealer),
        AfterExit::KeysCollected => finish_key_phase(table, ctx),
        AfterExit::NextTurn => advance_turn(table, ctx),
        AfterExit::Nothing | AfterExit::Settled => Ok(()),
    }
}

/// Вывести игрока из-за стола.
///
/// Посреди раздачи игрок отдаёт ключи от всех карт, кроме своих двух:
/// без них оставшиеся не смогут открыть борд. Снятый по таймауту игрок
/// уже не за столом, событие игнорируется.
pub fn exit_player(
    table: &mut Table,
    ctx: &mut EngineContext<'_>,
    player_id: PlayerId,
    keys: Vec<CardKey>,
) -> Result<Disposition, EngineError> {
    atomically(table, ctx, |table, ctx| {
        let seat = table
            .seat_of(player_id)
            .ok_or(EngineError::PlayerNotAtTable(player_id))?;
        let player = table.player(seat)?;

        if !can_exit_without_keys(player.status, table.status) {
            check_exit_keys(player, &keys)?;
        }
        if player.status == PlayerStatus::Timeout {
            warn!(table_id = table.id, player_id, "снятый по таймауту пытается уйти");
            return Ok(Disposition::Ignored(IgnoreReason::TimedOut));
        }

        out_player(table, ctx, seat, &keys)?;
        Ok(Disposition::Applied)
    })
}
