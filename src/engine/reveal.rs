//! Протокол раскрытия: какие ключи ждёт стол, как их применять и что
//! делать, когда все ключи фазы собраны.

use tracing::debug;

use crate::cipher::decrypt_card;
use crate::domain::card::Card;
use crate::domain::deck::DECK_SIZE;
use crate::domain::key::{sort_by_index, CardKey};
use crate::domain::player::PlayerStatus;
use crate::domain::table::{Table, TableStatus};
use crate::domain::{CardIndex, SeatIndex};
use crate::engine::actions::{Disposition, IgnoreReason};
use crate::engine::betting::{next_player, Advance};
use crate::engine::errors::EngineError;
use crate::engine::hand_history::HandEventKind;
use crate::engine::settlement::end_game;
use crate::engine::validation::check_card_keys;
use crate::engine::EngineContext;

/// Полный борд.
pub const BOARD_SIZE: usize = 5;

/// Снять с карты слой одного ключа прямо в колоде.
fn decrypt_in_deck(table: &mut Table, key: &CardKey) -> Result<(), EngineError> {
    let card = table.deck.card_mut(key.card_index)?;
    *card = decrypt_card(*card, key);
    Ok(())
}

/// Снять с карты все слои: по одному ключу от каждого игрока раздачи.
pub fn decrypt_card_by_all_keys(table: &mut Table, index: CardIndex) -> Result<(), EngineError> {
    let needed = table.game_players_count;
    let keys: Vec<CardKey> = table
        .all_keys
        .iter()
        .filter(|k| k.card_index == index)
        .take(needed)
        .cloned()
        .collect();

    if keys.len() != needed {
        return Err(EngineError::MissingCardKeys(index));
    }

    for key in &keys {
        decrypt_in_deck(table, key)?;
    }
    Ok(())
}

/// Вскрыть карманные карты всех, кто дошёл до вскрытия.
pub fn decrypt_players_cards(table: &mut Table) -> Result<(), EngineError> {
    let mut indexes = Vec::new();
    for p in table.players.iter() {
        if p.status == PlayerStatus::InGame {
            indexes.extend_from_slice(&p.card_indexes);
        }
    }
    for index in indexes {
        decrypt_card_by_all_keys(table, index)?;
    }
    Ok(())
}

/// Сохранить ключи карманных карт до вскрытия.
fn save_hole_keys<'a>(table: &mut Table, keys: impl IntoIterator<Item = &'a CardKey>) {
    let max_index = table.hole_cards_count();
    for key in keys {
        if (key.card_index as usize) < max_index && !table.all_keys.contains(key) {
            table.all_keys.push(key.clone());
        }
    }
}

/// Торговаться больше некому: ждём от всех ключи до конца колоды.
pub fn start_all_in_keys(table: &mut Table) {
    let start = table.board_start_index() + table.table_cards.len();
    table.waiting_keys = (start..DECK_SIZE).map(|i| i as CardIndex).collect();
    table.status = TableStatus::WaitAllInKeys;
}

/// Следующая улица: либо запросить ключи её карт, либо (ключи собраны)
/// выложить карты и открыть новый раунд торговли. После ривера ждём все ключи.
pub fn deal_next_street(table: &mut Table, ctx: &mut EngineContext<'_>) -> Result<(), EngineError> {
    match table.round {
        0..=2 => {
            if table.table_card_indexes.len() == table.table_cards.len() {
                let start = table.board_start_index() + table.table_card_indexes.len();
                let count = if table.round == 0 { 3 } else { 1 };

                table.waiting_keys.clear();
                for index in start..start + count {
                    table.table_card_indexes.push(index as CardIndex);
                    table.waiting_keys.push(index as CardIndex);
                }
                table.status = TableStatus::WaitKeysForShowdown;
            } else {
                let mut revealed: Vec<Card> = Vec::new();
                for i in table.table_cards.len()..table.table_card_indexes.len() {
                    revealed.push(table.deck.card(table.table_card_indexes[i])?);
                }
                table.table_cards.extend_from_slice(&revealed);
                table.history.push(HandEventKind::BoardRevealed { cards: revealed });

                table.status = TableStatus::WaitPlayersAct;
                table.next_player_index = table.dealer_index;
                match next_player(table)? {
                    Advance::EndGame => return end_game(table, ctx),
                    Advance::EndAllIn => start_all_in_keys(table),
                    Advance::PlayerToAct => table.round += 1,
                    Advance::NewRound => {
                        // Торговаться некому, сразу к следующей улице.
                        table.round += 1;
                        return deal_next_street(table, ctx);
                    }
                }
            }
        }
        _ => {
            let start = table.board_start_index() + table.table_cards.len();
            table.waiting_keys = (start..DECK_SIZE).map(|i| i as CardIndex).collect();
            table.status = TableStatus::WaitAllKeys;
        }
    }
    table.set_last_time(ctx.now);
    Ok(())
}

/// Выбывшие (и сфолдившие) ключей не шлют: считаем, что они уже ответили.
pub fn set_events_from_out_and_fold(table: &mut Table) {
    for seat in table.dealt_in_order(table.next_player_index) {
        let p = &mut table.players[seat];
        if p.status.is_out_of_hand() && !p.has_event {
            p.has_event = true;
            table.received_count += 1;
        }
    }
}

/// Перед ожиданием подтверждений: ушедшие и таймаут считаются ответившими.
pub fn set_events_from_out_players(table: &mut Table) {
    table.received_count = 0;
    for p in table.players.iter_mut() {
        p.late_trxs.clear();
        if matches!(p.status, PlayerStatus::Out | PlayerStatus::Timeout) {
            p.has_event = true;
            table.received_count += 1;
        } else {
            p.has_event = false;
        }
    }
}

/// Событие `SubmitCardKeys`.
pub fn submit_card_keys(
    table: &mut Table,
    ctx: &mut EngineContext<'_>,
    seat: SeatIndex,
    mut keys: Vec<CardKey>,
) -> Result<Disposition, EngineError> {
    if !table.status.is_waiting_keys() {
        return Err(EngineError::WrongTableStatus(table.status));
    }
    sort_by_index(&mut keys);

    set_events_from_out_and_fold(table);
    if table.player(seat)?.has_event {
        return Ok(Disposition::Ignored(IgnoreReason::AlreadyAcknowledged));
    }

    add_new_keys(table, ctx, seat, &keys)?;
    Ok(Disposition::Applied)
}

/// Проверить и применить ключи фазы. Ключи отсортированы по индексу.
///
/// Раздача карманных: ключи только сохраняются.
/// Карты борда: слой снимается сразу.
/// Олл-ин при неполном борде: снимаются слои с недостающих карт борда.
pub fn add_new_keys(
    table: &mut Table,
    ctx: &mut EngineContext<'_>,
    seat: SeatIndex,
    keys: &[CardKey],
) -> Result<(), EngineError> {
    let offset = check_card_keys(table, seat, keys)?;

    match table.status {
        TableStatus::WaitKeysForShowdown => {
            for key in keys {
                decrypt_in_deck(table, key)?;
            }
        }
        TableStatus::WaitAllInKeys if table.table_cards.len() < BOARD_SIZE => {
            let missing = BOARD_SIZE - table.table_cards.len();
            for key in keys.iter().skip(offset).take(missing) {
                decrypt_in_deck(table, key)?;
            }
        }
        _ => {}
    }

    save_hole_keys(table, keys);
    table.player_mut(seat)?.has_event = true;
    table.history.push(HandEventKind::KeysSubmitted {
        seat,
        indexes: keys.iter().map(|k| k.card_index).collect(),
    });
    debug!(table_id = table.id, seat, status = ?table.status, "ключи приняты");

    table.received_count += 1;
    if table.received_count == table.game_players_count {
        finish_key_phase(table, ctx)?;
    }
    Ok(())
}

/// Все ключи фазы собраны: двигаем стол дальше.
pub fn finish_key_phase(table: &mut Table, ctx: &mut EngineContext<'_>) -> Result<(), EngineError> {
    table.waiting_keys.clear();
    table.received_count = 0;
    for p in table.players.iter_mut() {
        p.has_event = false;
    }

    match table.status {
        TableStatus::WaitKeysForPlayers => {
            table.set_last_time(ctx.now);
            table.next_player_index = table.next_dealt_in_index(table.bb_index, 1);
            table.status = TableStatus::WaitPlayersAct;
            Ok(())
        }
        TableStatus::WaitKeysForShowdown => deal_next_street(table, ctx),
        _ => end_game(table, ctx),
    }
}

/// Ключи фолдящего: первые ключи снимают его слой с недоразданных карт борда.
pub fn apply_fold_keys(table: &mut Table, keys: &[CardKey]) -> Result<(), EngineError> {
    if table.table_cards.len() < BOARD_SIZE {
        let missing = BOARD_SIZE - table.table_cards.len();
        for key in keys.iter().take(missing) {
            decrypt_in_deck(table, key)?;
        }
    }
    save_hole_keys(table, keys);
    Ok(())
}

/// Ключи уходящего игрока.
///
/// Берутся только ключи с индексов, которые он ещё не отдавал: с начала
/// ожидаемых в фазе (если он не ответил) или сразу после них.
/// Его слой снимается с ещё не открытых карт борда.
pub fn apply_exit_keys(table: &mut Table, seat: SeatIndex, keys: &[CardKey]) -> Result<(), EngineError> {
    let has_event = table.player(seat)?.has_event;
    let start = match (table.waiting_keys.first(), table.waiting_keys.last()) {
        (Some(&first), _) if !has_event => first as usize,
        (_, Some(&last)) => last as usize + 1,
        _ => table.board_start_index() + table.table_cards.len(),
    };

    let board_start = table.board_start_index();
    let board_end = board_start + BOARD_SIZE;
    let decrypt_from = start.max(board_start);

    let mut sorted: Vec<CardKey> = keys.to_vec();
    sorted.sort_by(|a, b| b.card_index.cmp(&a.card_index));

    for key in sorted.iter().filter(|k| k.card_index as usize >= start) {
        let index = key.card_index as usize;
        if table.table_cards.len() < BOARD_SIZE && (decrypt_from..board_end).contains(&index) {
            decrypt_in_deck(table, key)?;
        }
    }
    save_hole_keys(table, sorted.iter().filter(|k| k.card_index as usize >= start));
    Ok(())
}
