use std::collections::BTreeSet;

use crate::domain::act::{Act, ActDescription, ActKind};
use crate::domain::deck::DECK_SIZE;
use crate::domain::key::{CardKey, SealedKey};
use crate::domain::player::{PlayerAtTable, PlayerStatus};
use crate::domain::table::{Table, TableStatus};
use crate::domain::{CardIndex, SeatIndex};
use crate::engine::actions::{Envelope, IgnoreReason};
use crate::engine::errors::EngineError;

/// Итог предварительных проверок события.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimaryCheck {
    Proceed,
    /// Опоздало: запомнено в списке ожидающих.
    Deferred,
    Ignored(IgnoreReason),
}

/// Проверки до разбора события: раздача, время, повторы.
///
/// Опоздавшее событие меняет только список ожидающих транзакций игрока.
pub fn primary_checks(
    table: &mut Table,
    seat: SeatIndex,
    envelope: &Envelope,
) -> Result<PrimaryCheck, EngineError> {
    if envelope.game_id != table.game_id {
        return Ok(PrimaryCheck::Ignored(IgnoreReason::StaleGame));
    }

    let table_timestamp = table.timestamp;
    let player = table.player_mut(seat)?;
    let trx = envelope.trx_index;

    if envelope.timestamp < table_timestamp {
        if player.applied_late_trxs.contains(&trx) {
            return Ok(PrimaryCheck::Ignored(IgnoreReason::LateDuplicate));
        }
        player.late_trxs.insert(trx);
        return Ok(PrimaryCheck::Deferred);
    }

    if player.late_trxs.remove(&trx) {
        player.applied_late_trxs.insert(trx);
    }

    if player.applied_trxs.contains(&trx) {
        return Ok(PrimaryCheck::Ignored(IgnoreReason::AlreadyApplied));
    }

    Ok(PrimaryCheck::Proceed)
}

pub fn ensure_status(table: &Table, expected: TableStatus) -> Result<(), EngineError> {
    if table.status != expected {
        return Err(EngineError::WrongTableStatus(table.status));
    }
    Ok(())
}

/// Событие должно прийти от места, чей сейчас ход.
pub fn ensure_turn(table: &Table, seat: SeatIndex) -> Result<(), EngineError> {
    if table.next_player_index != seat {
        let player = table.player(seat)?;
        return Err(EngineError::NotPlayersTurn(player.player_id));
    }
    Ok(())
}

/// Проверить ставку или check и вернуть описание действия.
///
/// `bet` у ставки означает целевой вклад игрока в раунде. Ставка всего стека
/// всегда допустима (олл-ин) и не подчиняется правилам минимального рейза.
pub fn describe_act(table: &Table, seat: SeatIndex, act: &Act) -> Result<ActDescription, EngineError> {
    let player = table.player(seat)?;
    let small_blind = table.small_blind();
    let big_blind = table.big_blind();

    match act.kind {
        ActKind::Bet => {
            if act.bet.is_zero() {
                return Err(EngineError::ZeroBet);
            }

            let available = player.stack + player.cur_round_bets;
            if act.bet == available {
                return Ok(ActDescription::AllIn);
            }
            if act.bet > available {
                return Err(EngineError::NotEnoughChips);
            }

            if table.current_bet.is_zero() {
                if !act.bet.is_multiple_of(small_blind) || act.bet < big_blind {
                    return Err(EngineError::InvalidOpeningBet);
                }
                return Ok(ActDescription::Bet);
            }

            if act.bet == table.current_bet {
                return Ok(ActDescription::Call);
            }

            if act.bet < table.current_bet * 2 {
                return Err(EngineError::RaiseTooSmall);
            }
            Ok(ActDescription::Raise)
        }

        ActKind::Check => {
            if table.round == 0 {
                let may_check = seat == table.bb_index || player.extra_bb;
                if !may_check || table.current_bet != big_blind {
                    return Err(EngineError::CannotCheck);
                }
            } else if !table.current_bet.is_zero() {
                return Err(EngineError::CannotCheck);
            }
            Ok(ActDescription::Check)
        }

        ActKind::Fold => Ok(ActDescription::None),

        ActKind::SmallBlind | ActKind::BigBlind | ActKind::NewRound => Err(EngineError::UnsupportedAct),
    }
}

/// Сколько ключей ждём от игрока в текущей фазе раскрытия.
///
/// Раздача карманных: ключи чужих карманных карт (без двух своих).
/// Борд: ровно ожидаемые индексы. Финал и олл-ин: ещё и два своих ключа.
pub fn expected_card_key_count(table: &Table) -> Result<usize, EngineError> {
    let waiting = table.waiting_keys.len();
    match table.status {
        TableStatus::WaitKeysForPlayers => waiting
            .checked_sub(2)
            .ok_or(EngineError::Internal("waiting keys shorter than own cards")),
        TableStatus::WaitKeysForShowdown => Ok(waiting),
        TableStatus::WaitAllKeys | TableStatus::WaitAllInKeys => Ok(waiting + 2),
        other => Err(EngineError::WrongTableStatus(other)),
    }
}

/// Проверить набор ключей фазы раскрытия. Ключи уже отсортированы по индексу.
/// Возвращает, сколько первых ключей относятся к карманным картам самого игрока.
pub fn check_card_keys(table: &Table, seat: SeatIndex, keys: &[CardKey]) -> Result<usize, EngineError> {
    let expected = expected_card_key_count(table)?;
    if keys.len() != expected {
        return Err(EngineError::WrongKeyCount {
            expected,
            actual: keys.len(),
        });
    }

    let player = table.player(seat)?;
    let (own1, own2) = player
        .hole_indexes()
        .ok_or(EngineError::PlayerNotInGame(player.player_id))?;

    let mut local: Vec<CardIndex> = table.waiting_keys.clone();
    let mut offset = 0;

    match table.status {
        TableStatus::WaitKeysForPlayers => local.retain(|&i| i != own1 && i != own2),
        TableStatus::WaitAllKeys | TableStatus::WaitAllInKeys => {
            expect_index(&keys[0], own1)?;
            expect_index(&keys[1], own2)?;
            offset = 2;
        }
        _ => {}
    }

    for (i, &index) in local.iter().enumerate() {
        let key = keys
            .get(i + offset)
            .ok_or(EngineError::Internal("keys shorter than expected"))?;
        expect_index(key, index)?;
    }

    Ok(offset)
}

fn expect_index(key: &CardKey, expected: CardIndex) -> Result<(), EngineError> {
    if key.card_index != expected {
        return Err(EngineError::WrongKeyIndex {
            expected,
            actual: key.card_index,
        });
    }
    Ok(())
}

/// Первый индекс, ключи с которого отдаёт фолдящий игрок.
pub fn fold_keys_start(table: &Table) -> usize {
    table
        .table_card_indexes
        .last()
        .map(|&i| i as usize + 1)
        .unwrap_or_else(|| table.board_start_index())
}

/// Фолд: ключи ровно от всех карт после уже назначенных на борд.
pub fn check_fold_keys(table: &Table, keys: &[CardKey]) -> Result<(), EngineError> {
    let start = fold_keys_start(table);
    let expected = DECK_SIZE.saturating_sub(start);
    if keys.len() != expected {
        return Err(EngineError::WrongKeyCount {
            expected,
            actual: keys.len(),
        });
    }

    for (key, index) in keys.iter().zip(start..DECK_SIZE) {
        expect_index(key, index as CardIndex)?;
    }
    Ok(())
}

/// Можно ли уйти из-за стола, не отдавая ключей.
pub fn can_exit_without_keys(player_status: PlayerStatus, table_status: TableStatus) -> bool {
    matches!(player_status, PlayerStatus::Waiting | PlayerStatus::Fold)
        || matches!(
            table_status,
            TableStatus::WaitEndGame
                | TableStatus::WaitStartGame
                | TableStatus::WaitCrypt
                | TableStatus::WaitShuffle
        )
}

/// Ключи уходящего игрока: по одному на каждую карту колоды, кроме двух своих.
pub fn check_exit_keys(player: &PlayerAtTable, keys: &[CardKey]) -> Result<(), EngineError> {
    check_all_but_own(player, keys.iter().map(|k| k.card_index), keys.len())
}

/// Запечатанные ключи для хранителя: тот же набор индексов, что и при уходе.
pub fn check_escrow_keys(player: &PlayerAtTable, keys: &[SealedKey]) -> Result<(), EngineError> {
    check_all_but_own(player, keys.iter().map(|k| k.card_index), keys.len())
}

fn check_all_but_own(
    player: &PlayerAtTable,
    indexes: impl Iterator<Item = CardIndex>,
    len: usize,
) -> Result<(), EngineError> {
    let expected = DECK_SIZE - 2;
    if len != expected {
        return Err(EngineError::WrongKeyCount { expected, actual: len });
    }

    let received: BTreeSet<CardIndex> = indexes.collect();
    if received.len() != len {
        return Err(EngineError::WrongKeyCount {
            expected,
            actual: received.len(),
        });
    }

    for index in 0..DECK_SIZE as CardIndex {
        let own = player.card_indexes.contains(&index);
        let present = received.contains(&index);
        if own == present {
            // Либо прислан собственный ключ, либо пропущен чужой.
            return Err(EngineError::KeySetMismatch(index));
        }
    }
    Ok(())
}
