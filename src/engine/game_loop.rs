//! Главный цикл стола: одно событие игрока = один атомарный переход.

use tracing::{debug, info, warn};

use crate::domain::act::{Act, ActKind, PlayerAct};
use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::deck::Deck;
use crate::domain::key::{sort_by_index, CardKey, SealedKey};
use crate::domain::player::{PlayerAtTable, PlayerStatus, RebuyPolicy};
use crate::domain::table::{Table, TableStatus};
use crate::domain::{PlayerId, SeatIndex};
use crate::engine::actions::{AckKind, CommandOutcome, Disposition, Envelope, IgnoreReason, TableCommand};
use crate::engine::betting::{add_new_act, next_player, Advance};
use crate::engine::effects::{DebitReason, TableEffect};
use crate::engine::errors::EngineError;
use crate::engine::hand_history::HandEventKind;
use crate::engine::positions::{add_new_player, init_new_game, move_dealer_after_hand};
use crate::engine::reveal::{apply_fold_keys, deal_next_street, start_all_in_keys, submit_card_keys};
use crate::engine::settlement::end_game;
use crate::engine::timeout::force_timeout;
use crate::engine::validation::{
    check_escrow_keys, check_fold_keys, ensure_status, ensure_turn, primary_checks, PrimaryCheck,
};
use crate::engine::EngineContext;

/// Заявка на место за столом.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeatRequest {
    pub player_id: PlayerId,
    /// Бай-ин в малых блайндах.
    pub buyin_sb: u32,
    /// Ждать большого блайнда вместо доплаты BB вне очереди.
    pub wait_for_bb: bool,
    pub autorebuy: bool,
}

/// Выполнить переход на копии стола. Копия заменяет стол только при `Ok`,
/// иначе откатываются и эффекты.
pub(crate) fn atomically<T>(
    table: &mut Table,
    ctx: &mut EngineContext<'_>,
    f: impl FnOnce(&mut Table, &mut EngineContext<'_>) -> Result<T, EngineError>,
) -> Result<T, EngineError> {
    let mut draft = table.clone();
    let mark = ctx.effects().len();

    match f(&mut draft, ctx) {
        Ok(value) => {
            *table = draft;
            Ok(value)
        }
        Err(err) => {
            ctx.truncate_effects(mark);
            Err(err)
        }
    }
}

/// Посадить игрока за стол с бай-ином.
///
/// Второй игрок за пустым столом сразу запускает раздачу.
pub fn seat_player(table: &mut Table, ctx: &mut EngineContext<'_>, req: SeatRequest) -> Result<SeatIndex, EngineError> {
    atomically(table, ctx, |table, ctx| {
        let small_blind = table.small_blind();
        if !ctx.params.is_small_blind_allowed(small_blind) {
            return Err(EngineError::SmallBlindNotAllowed(small_blind));
        }
        if !ctx.params.is_table_size_allowed(table.config.max_players) {
            return Err(EngineError::TableSizeNotAllowed(table.config.max_players));
        }

        let buyin = small_blind * u64::from(req.buyin_sb);
        if !ctx.params.is_buyin_sb_allowed(req.buyin_sb) {
            return Err(EngineError::BuyInOutOfRange(buyin));
        }
        if table.seat_of(req.player_id).is_some() {
            return Err(EngineError::AlreadySeated(req.player_id));
        }
        if ctx.ledger.has_active_table(req.player_id) {
            return Err(EngineError::PlayerAtAnotherTable(req.player_id));
        }

        let available = ctx.ledger.balance(req.player_id);
        if available < buyin {
            return Err(EngineError::InsufficientBalance {
                needed: buyin,
                available,
            });
        }

        let rebuy = RebuyPolicy {
            autorebuy: req.autorebuy,
            buyin_sb: req.buyin_sb,
        };
        let seat = add_new_player(table, PlayerAtTable::new(req.player_id, buyin, req.wait_for_bb, rebuy))?;

        ctx.emit(TableEffect::Debit {
            player_id: req.player_id,
            amount: buyin,
            reason: DebitReason::BuyIn,
        });
        ctx.emit(TableEffect::SeatTaken {
            player_id: req.player_id,
            table_id: table.id,
        });
        info!(table_id = table.id, player_id = req.player_id, seat, %buyin, "игрок сел за стол");

        if table.status == TableStatus::WaitPlayer && table.seated_count() >= 2 {
            init_new_game(table, ctx, false)?;
        }
        Ok(seat)
    })
}

/// Применить событие игрока.
///
/// Переход атомарен: при ошибке стол и эффекты остаются как были.
/// Эффекты перехода забираются из контекста в результат.
pub fn apply_command(
    table: &mut Table,
    ctx: &mut EngineContext<'_>,
    envelope: &Envelope,
) -> Result<CommandOutcome, EngineError> {
    let disposition = atomically(table, ctx, |table, ctx| dispatch(table, ctx, envelope))?;
    Ok(CommandOutcome {
        disposition,
        effects: ctx.take_effects(),
    })
}

fn dispatch(table: &mut Table, ctx: &mut EngineContext<'_>, envelope: &Envelope) -> Result<Disposition, EngineError> {
    let player_id = envelope.player_id;
    let seat = table
        .seat_of(player_id)
        .ok_or(EngineError::PlayerNotAtTable(player_id))?;

    if let TableCommand::ForceTimeout { expected_status } = envelope.command {
        if table.status != expected_status {
            debug!(table_id = table.id, player_id, status = ?table.status, "таймаут для другой фазы");
            return Ok(Disposition::Ignored(IgnoreReason::StatusMismatch));
        }
    }

    match primary_checks(table, seat, envelope)? {
        PrimaryCheck::Proceed => {}
        PrimaryCheck::Deferred => {
            warn!(table_id = table.id, player_id, trx = envelope.trx_index, "событие опоздало");
            return Ok(Disposition::Deferred);
        }
        PrimaryCheck::Ignored(reason) => {
            debug!(table_id = table.id, player_id, ?reason, "событие проигнорировано");
            return Ok(Disposition::Ignored(reason));
        }
    }

    debug!(
        table_id = table.id,
        game_id = table.game_id,
        player_id,
        command = envelope.command.name(),
        "событие"
    );

    let disposition = match &envelope.command {
        TableCommand::SubmitShuffledDeck { cards } => on_shuffled_deck(table, ctx, seat, cards)?,
        TableCommand::SubmitEncryptionLayer { cards, escrow_keys } => {
            on_encryption_layer(table, ctx, seat, cards, escrow_keys)?
        }
        TableCommand::SubmitAction { act } => on_action(table, ctx, seat, *act)?,
        TableCommand::SubmitFold { keys } => on_fold(table, ctx, seat, keys.clone())?,
        TableCommand::SubmitCardKeys { keys } => submit_card_keys(table, ctx, seat, keys.clone())?,
        TableCommand::ForceTimeout { .. } => force_timeout(table, ctx, seat)?,
        TableCommand::RequestAck(kind) => on_ack(table, ctx, seat, *kind)?,
    };

    // Номер транзакции запоминается только в той раздаче, к которой она относилась.
    if disposition == Disposition::Applied && table.game_id == envelope.game_id {
        if let Some(seat) = table.seat_of(player_id) {
            table.players[seat].applied_trxs.insert(envelope.trx_index);
        }
    }
    Ok(disposition)
}

/// Ход сделан: ищем следующего или двигаем раздачу дальше.
pub(crate) fn advance_turn(table: &mut Table, ctx: &mut EngineContext<'_>) -> Result<(), EngineError> {
    table.set_last_time(ctx.now);
    match next_player(table)? {
        Advance::EndGame => end_game(table, ctx),
        Advance::EndAllIn => {
            start_all_in_keys(table);
            Ok(())
        }
        Advance::PlayerToAct => Ok(()),
        Advance::NewRound => deal_next_street(table, ctx),
    }
}

/// Принять колоду от места, чья очередь, и передать очередь дальше.
/// Возвращает `true`, когда колоду прислали все.
fn take_deck_in_turn(table: &mut Table, seat: SeatIndex, cards: &[Card]) -> Result<bool, EngineError> {
    ensure_turn(table, seat)?;
    table.deck = Deck::from_cards(cards.to_vec())?;
    table.next_player_index = table.next_dealt_in_index(seat, 1);
    table.received_count += 1;
    Ok(table.received_count == table.game_players_count)
}

fn on_shuffled_deck(
    table: &mut Table,
    ctx: &mut EngineContext<'_>,
    seat: SeatIndex,
    cards: &[Card],
) -> Result<Disposition, EngineError> {
    ensure_status(table, TableStatus::WaitShuffle)?;
    let all_sent = take_deck_in_turn(table, seat, cards)?;
    table.history.push(HandEventKind::DeckShuffled { seat });

    if all_sent {
        table.received_count = 0;
        table.status = TableStatus::WaitCrypt;
    }
    table.set_last_time(ctx.now);
    Ok(Disposition::Applied)
}

fn on_encryption_layer(
    table: &mut Table,
    ctx: &mut EngineContext<'_>,
    seat: SeatIndex,
    cards: &[Card],
    escrow_keys: &[SealedKey],
) -> Result<Disposition, EngineError> {
    ensure_status(table, TableStatus::WaitCrypt)?;

    if table.config.escrow_keys {
        let player = table.player(seat)?;
        check_escrow_keys(player, escrow_keys)?;
        let player_id = player.player_id;

        // Хранителю нужны только чужие карманные карты и борд.
        let needed = table.hole_cards_count() - 2 + 5;
        let mut sealed = escrow_keys.to_vec();
        sealed.sort_by_key(|k| k.card_index);
        sealed.truncate(needed);
        table.escrowed_keys.insert(player_id, sealed);
    }

    let all_sent = take_deck_in_turn(table, seat, cards)?;
    table.history.push(HandEventKind::DeckEncrypted { seat });
    table.set_last_time(ctx.now);

    if all_sent {
        table.received_count = 0;
        post_blinds(table, ctx)?;
    }
    Ok(Disposition::Applied)
}

/// Поставить блайнд за место: стек, журнал, банк.
fn post_blind(table: &mut Table, seat: SeatIndex, kind: ActKind, amount: Chips) -> Result<(), EngineError> {
    let (bank, round) = (table.bank, table.round);
    let player = table.player_mut(seat)?;
    let amount = amount.min(player.stack);
    let act = Act::new(kind, amount);

    player.record_act(act);
    let all_in = player.all_in;
    if all_in {
        player.all_in_bank = bank;
        player.all_in_round = round;
    }
    let player_id = player.player_id;

    if all_in {
        table.allin_count += 1;
    }
    table.acts.push(PlayerAct::by_seat(seat, player_id, act));
    *table
        .round_bet_acts
        .get_mut(seat)
        .ok_or(EngineError::InvalidSeat(seat))? += 1;
    table.round_bets += amount;
    table.current_bank += amount;
    table.not_returned_bets += amount;

    table.history.push(HandEventKind::BlindPosted {
        seat,
        player_id,
        amount,
    });
    Ok(())
}

/// Блайнды после того, как колода зашифрована всеми.
///
/// Новичок с доплатой BB на месте малого блайнда ставит большой
/// (кроме хедз-апа). Все новички с доплатой ставят BB вместе с большим блайндом.
fn post_blinds(table: &mut Table, ctx: &mut EngineContext<'_>) -> Result<(), EngineError> {
    let small_blind = table.small_blind();
    let big_blind = table.big_blind();
    let heads_up = table.game_players_count == 2;
    let sb_seat = table.sb_index;

    table.next_player_index = sb_seat;
    if !(table.player(sb_seat)?.extra_bb && !heads_up) {
        post_blind(table, sb_seat, ActKind::SmallBlind, small_blind)?;
        table.current_bet = small_blind;
    }

    table.next_player_index = table.bb_index;
    for seat in table.dealt_in_order(table.bb_index) {
        let player = table.player(seat)?;
        let pays_big = seat == table.bb_index || player.extra_bb;
        if pays_big && !(heads_up && seat == sb_seat) {
            post_blind(table, seat, ActKind::BigBlind, big_blind)?;
        }
    }
    table.current_bet = big_blind;

    // Подсказки ходов для первого ходящего; порядок ходов задаст фаза ключей.
    next_player(table)?;
    table.set_last_time(ctx.now);
    table.status = TableStatus::WaitKeysForPlayers;
    debug!(table_id = table.id, game_id = table.game_id, bank = %table.current_bank, "блайнды поставлены");
    Ok(())
}

fn on_action(table: &mut Table, ctx: &mut EngineContext<'_>, seat: SeatIndex, act: Act) -> Result<Disposition, EngineError> {
    ensure_status(table, TableStatus::WaitPlayersAct)?;
    ensure_turn(table, seat)?;

    match act.kind {
        ActKind::Bet => {}
        ActKind::Check if !act.bet.is_zero() => return Err(EngineError::CheckWithBet),
        ActKind::Check => {}
        _ => return Err(EngineError::UnsupportedAct),
    }

    let mut act = act;
    add_new_act(table, seat, &mut act)?;
    record_and_log(table, seat, act)?;
    advance_turn(table, ctx)?;
    Ok(Disposition::Applied)
}

fn on_fold(
    table: &mut Table,
    ctx: &mut EngineContext<'_>,
    seat: SeatIndex,
    mut keys: Vec<CardKey>,
) -> Result<Disposition, EngineError> {
    ensure_status(table, TableStatus::WaitPlayersAct)?;
    ensure_turn(table, seat)?;
    sort_by_index(&mut keys);
    check_fold_keys(table, &keys)?;

    apply_fold_keys(table, &keys)?;
    let mut act = Act::fold();
    add_new_act(table, seat, &mut act)?;
    record_and_log(table, seat, act)?;
    advance_turn(table, ctx)?;
    Ok(Disposition::Applied)
}

fn record_and_log(table: &mut Table, seat: SeatIndex, act: Act) -> Result<(), EngineError> {
    let bank_after = table.current_bank;
    let player = table.player_mut(seat)?;
    player.record_act(act);
    let (player_id, stack_after) = (player.player_id, player.stack);

    table.history.push(HandEventKind::PlayerActed {
        seat,
        player_id,
        act,
        stack_after,
        bank_after,
    });
    debug!(table_id = table.id, seat, player_id, kind = ?act.kind, bet = %act.bet, "ход принят");
    Ok(())
}

fn on_ack(table: &mut Table, ctx: &mut EngineContext<'_>, seat: SeatIndex, kind: AckKind) -> Result<Disposition, EngineError> {
    let (expected, allowed): (TableStatus, &[PlayerStatus]) = match kind {
        AckKind::StartOfHand => (TableStatus::WaitStartGame, &[PlayerStatus::InGame]),
        AckKind::EndOfHand => (TableStatus::WaitEndGame, &[PlayerStatus::InGame, PlayerStatus::Fold]),
    };
    ensure_status(table, expected)?;

    let player = table.player_mut(seat)?;
    if !allowed.contains(&player.status) {
        return Err(EngineError::PlayerNotInGame(player.player_id));
    }
    if player.has_event {
        return Ok(Disposition::Ignored(IgnoreReason::AlreadyAcknowledged));
    }
    player.has_event = true;
    table.received_count += 1;

    if table.received_count < table.game_players_count {
        return Ok(Disposition::Applied);
    }

    match kind {
        AckKind::StartOfHand => {
            table.received_count = 0;
            for p in table.players.iter_mut() {
                p.has_event = false;
            }
            table.status = TableStatus::WaitShuffle;
            table.set_last_time(ctx.now);
        }
        AckKind::EndOfHand => {
            let move_dealer = move_dealer_after_hand(table);
            init_new_game(table, ctx, move_dealer)?;
        }
    }
    Ok(Disposition::Applied)
}
