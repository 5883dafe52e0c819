//! Рассадка, кнопка и блайнды, подготовка новой раздачи.

use tracing::{debug, info};

use crate::domain::chips::Chips;
use crate::domain::deck::Deck;
use crate::domain::player::{PlayerAtTable, PlayerStatus};
use crate::domain::result::HandOutcome;
use crate::domain::table::{Table, TableStatus, NO_GAME};
use crate::domain::SeatIndex;
use crate::engine::effects::{CreditReason, DebitReason, TableEffect};
use crate::engine::errors::EngineError;
use crate::engine::hand_history::HandEventKind;
use crate::engine::EngineContext;

/// Посадить игрока на свободное место (или в конец).
pub fn add_new_player(table: &mut Table, player: PlayerAtTable) -> Result<SeatIndex, EngineError> {
    if table.seated_count() + 1 > table.config.max_players {
        return Err(EngineError::TableFull);
    }

    if let Some(seat) = table.players.iter().position(|p| p.is_empty_seat()) {
        table.players[seat] = player;
        return Ok(seat);
    }

    table.players.push(player);
    Ok(table.players.len() - 1)
}

/// Сбросить всё, что относится к раздаче.
pub fn clear_game_info(table: &mut Table) {
    table.received_count = 0;
    table.round = 0;
    table.allin_count = 0;
    table.folds_count = 0;
    table.round_bet_acts.clear();
    table.players_with_bets.clear();

    table.current_bet = Chips::ZERO;
    table.bank = Chips::ZERO;
    table.round_bets = Chips::ZERO;
    table.not_returned_bets = Chips::ZERO;
    table.current_bank = Chips::ZERO;

    table.possible_moves.clear();
    table.raise_variants.clear();

    table.table_card_indexes.clear();
    table.table_cards.clear();
    table.acts.clear();
    table.waiting_keys.clear();
    table.all_keys.clear();
    table.escrowed_keys.clear();
    table.saved_status = None;

    table.deck = Deck::canonical();

    for p in table.players.iter_mut() {
        p.clear_game_info();
    }
    table.history.clear();
}

fn release_seat(table: &mut Table, seat: SeatIndex, ctx: &mut EngineContext<'_>) {
    let player_id = table.players[seat].player_id;
    ctx.emit(TableEffect::SeatReleased {
        player_id,
        table_id: table.id,
    });
    table.players[seat] = PlayerAtTable::empty_seat();
}

/// Убрать ушедших и таймаут, докупить или снять игроков с коротким стеком.
fn remove_gone_and_refill(table: &mut Table, ctx: &mut EngineContext<'_>) {
    let big_blind = table.big_blind();
    let small_blind = table.small_blind();
    let after_reset = matches!(
        table.last_result.as_ref().map(|r| r.outcome),
        Some(HandOutcome::TimeoutReset)
    );
    let has_result = table.last_result.is_some();

    for seat in 0..table.players.len() {
        let status = table.players[seat].status;
        if matches!(status, PlayerStatus::NoSeat | PlayerStatus::Waiting) {
            continue;
        }

        let player_id = table.players[seat].player_id;

        if status == PlayerStatus::Timeout {
            let stack = table.players[seat].stack;
            ctx.emit(TableEffect::Credit {
                player_id,
                amount: stack,
                reason: CreditReason::Timeout,
            });
            release_seat(table, seat, ctx);
            continue;
        }
        if status == PlayerStatus::Out {
            // Стек уже возвращён при уходе.
            table.players[seat] = PlayerAtTable::empty_seat();
            continue;
        }

        if table.players[seat].stack < big_blind {
            let p = &table.players[seat];
            let topup = (small_blind * u64::from(p.rebuy.buyin_sb)).saturating_sub(p.stack);
            let balance = ctx.ledger.balance(player_id);

            if p.rebuy.autorebuy && balance >= topup {
                if !topup.is_zero() {
                    ctx.emit(TableEffect::Debit {
                        player_id,
                        amount: topup,
                        reason: DebitReason::Rebuy,
                    });
                    table.players[seat].stack += topup;
                    debug!(table_id = table.id, player_id, %topup, "автодокупка");
                }
            } else {
                let stack = p.stack;
                ctx.emit(TableEffect::Credit {
                    player_id,
                    amount: stack,
                    reason: CreditReason::StackBelowBigBlind,
                });
                release_seat(table, seat, ctx);
                continue;
            }
        }

        let p = &mut table.players[seat];
        if p.status == PlayerStatus::Fold {
            p.extra_bb = false;
        }
        p.status = PlayerStatus::InGame;

        if has_result {
            // Новичок уже заплатил BB в сброшенной раздаче: второй раз не платит.
            if after_reset && p.extra_bb {
                p.status = PlayerStatus::Waiting;
            } else {
                p.extra_bb = false;
            }
        }
        p.start_stack = p.stack;
    }
}

/// Новички без ожидания BB входят в раздачу, доплачивая большой блайнд.
fn set_extra_bb_players(table: &mut Table) {
    for p in table.players.iter_mut() {
        if p.status == PlayerStatus::Waiting && !p.wait_for_bb {
            p.extra_bb = true;
            p.status = PlayerStatus::InGame;
            p.start_stack = p.stack;
        }
    }
}

fn only_one_player(table: &mut Table) {
    let the_one = table
        .players
        .iter()
        .find(|p| matches!(p.status, PlayerStatus::InGame | PlayerStatus::Waiting))
        .cloned();

    if let Some(mut the_one) = the_one {
        the_one.status = PlayerStatus::Waiting;
        table.players = vec![the_one];
    }

    table.dealer_index = 0;
    table.sb_index = 0;
    table.bb_index = 0;
    table.next_player_index = 0;
    table.status = TableStatus::WaitPlayer;
    table.game_players_count = 0;
    table.game_id = NO_GAME;
}

fn move_dealer_index(table: &mut Table) {
    let len = table.players.len();
    for _ in 0..len {
        table.dealer_index = (table.dealer_index + 1) % len;
        if table.players[table.dealer_index].status == PlayerStatus::InGame {
            break;
        }
    }
}

fn set_dealer_index(table: &mut Table, move_dealer: bool) {
    if table.game_players_count == 0 {
        table.dealer_index = table
            .players
            .iter()
            .position(|p| p.status == PlayerStatus::Waiting)
            .unwrap_or(0);
    }

    let dealer_gone = table
        .players
        .get(table.dealer_index)
        .map(|p| p.is_empty_seat())
        .unwrap_or(true);

    if dealer_gone || move_dealer {
        move_dealer_index(table);
    }
}

/// Убрать пустые места в конце рассадки.
fn cut_no_players(table: &mut Table) {
    let last = table.players.iter().rposition(|p| !p.is_empty_seat()).unwrap_or(0);
    table.players.truncate(last + 1);
}

/// Раздать индексы карманных карт: по две на место, начиная с дилера.
fn set_card_indexes_to_players(table: &mut Table) -> Result<(), EngineError> {
    let mut card_index = 0u8;
    for seat in table.dealt_in_order(table.next_player_index) {
        let indexes = [card_index, card_index + 1];
        table.waiting_keys.extend_from_slice(&indexes);
        table.player_mut(seat)?.card_indexes.extend_from_slice(&indexes);
        card_index += 2;
    }
    Ok(())
}

fn start_playing(table: &mut Table, seat: SeatIndex) -> Result<(), EngineError> {
    let p = table.player_mut(seat)?;
    p.status = PlayerStatus::InGame;
    p.start_stack = p.stack;
    Ok(())
}

/// После сброса по таймауту кнопка остаётся на месте.
pub fn move_dealer_after_hand(table: &Table) -> bool {
    !matches!(
        table.last_result.as_ref().map(|r| r.outcome),
        Some(HandOutcome::TimeoutReset)
    )
}

/// Подготовить новую раздачу: уборка, докупка, кнопка, блайнды, индексы карт.
///
/// `move_dealer == false` после сорванной раздачи: кнопка остаётся на месте.
pub fn init_new_game(table: &mut Table, ctx: &mut EngineContext<'_>, move_dealer: bool) -> Result<(), EngineError> {
    table.set_last_time(ctx.now);
    clear_game_info(table);
    remove_gone_and_refill(table, ctx);

    let players_count = table.seated_count();
    if players_count == 0 {
        info!(table_id = table.id, "за столом никого, стол удаляется");
        table.status = TableStatus::Delete;
        return Ok(());
    }
    if players_count == 1 {
        info!(table_id = table.id, "остался один игрок, ждём соперников");
        only_one_player(table);
        return Ok(());
    }

    set_extra_bb_players(table);
    table.game_players_count = table.count_with_status(PlayerStatus::InGame);
    set_dealer_index(table, move_dealer);

    let prev_bb = table.bb_index;
    let dealer = table.dealer_index;
    table.sb_index = dealer;
    table.bb_index = table.next_big_blind_index(dealer, 2);

    let dealer_waiting = table.player(dealer)?.status == PlayerStatus::Waiting;

    if dealer_waiting || table.game_players_count == 1 {
        // Хедз-ап с новичком: дилер на малом блайнде.
        start_playing(table, dealer)?;
        table.bb_index = table.next_big_blind_index(dealer, 1);
        start_playing(table, table.bb_index)?;
        table.game_players_count = 2;
    } else if table.game_players_count == 2 && table.player(table.bb_index)?.status == PlayerStatus::InGame {
        // Хедз-ап тех же игроков.
        table.bb_index = table.next_dealt_in_index(dealer, 1);
        if prev_bb == table.bb_index && move_dealer {
            table.bb_index = table.sb_index;
            table.sb_index = prev_bb;
            table.dealer_index = prev_bb;
        }
    } else {
        table.sb_index = table.next_dealt_in_index(dealer, 1);

        if prev_bb == table.bb_index && move_dealer {
            // BB не сдвинулся: двигаем кнопку ещё раз.
            move_dealer_index(table);
            let dealer = table.dealer_index;
            table.sb_index = table.next_dealt_in_index(dealer, 1);
            table.bb_index = table.next_big_blind_index(dealer, 2);
        }

        if table.player(table.bb_index)?.status == PlayerStatus::Waiting {
            start_playing(table, table.bb_index)?;
            table.game_players_count += 1;
        }
    }
    table.next_player_index = table.dealer_index;

    cut_no_players(table);
    table.round_bet_acts = vec![0; table.players.len()];

    table.game_id = table.next_game_id;
    table.next_game_id += 1;
    table.hand_started_at = ctx.now;

    set_card_indexes_to_players(table)?;
    table.status = TableStatus::WaitStartGame;

    table.history.push(HandEventKind::HandStarted {
        table_id: table.id,
        game_id: table.game_id,
        dealer: table.dealer_index,
        small_blind: table.sb_index,
        big_blind: table.bb_index,
        players: table.game_players_count,
    });
    info!(
        table_id = table.id,
        game_id = table.game_id,
        dealer = table.dealer_index,
        sb = table.sb_index,
        bb = table.bb_index,
        players = table.game_players_count,
        "новая раздача"
    );
    Ok(())
}
