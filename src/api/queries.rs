use serde::{Deserialize, Serialize};

use crate::domain::table::{Table, NO_GAME};
use crate::domain::TableId;
use crate::engine::TableManager;

use super::dto::{PlayerView, TableView};
use super::errors::ApiError;

/// Запросы "только чтение".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Query {
    /// Получить состояние стола.
    Table { table_id: TableId },

    /// Получить список столов (для лобби).
    Tables,
}

/// Результат запроса "только чтение".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum QueryResponse {
    Table(Box<TableView>),
    Tables(Vec<TableView>),
}

pub fn run_query(manager: &TableManager, query: &Query) -> Result<QueryResponse, ApiError> {
    match query {
        Query::Table { table_id } => {
            let table = manager
                .table(*table_id)
                .ok_or(ApiError::TableNotFound(*table_id))?;
            Ok(QueryResponse::Table(Box::new(build_table_view(table))))
        }
        Query::Tables => Ok(QueryResponse::Tables(
            manager.tables().into_iter().map(build_table_view).collect(),
        )),
    }
}

/// Собрать DTO стола. Пустые места пропускаются.
pub fn build_table_view(table: &Table) -> TableView {
    let players = table
        .players
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.is_empty_seat())
        .map(|(seat, p)| PlayerView {
            player_id: p.player_id,
            seat,
            status: p.status,
            stack: p.stack,
            cur_round_bets: p.cur_round_bets,
            sum_of_bets: p.sum_of_bets,
            all_in: p.all_in,
            card_indexes: p.card_indexes.clone(),
            has_event: p.has_event,
        })
        .collect();

    TableView {
        table_id: table.id,
        small_blind: table.small_blind(),
        big_blind: table.big_blind(),
        max_players: table.config.max_players,
        escrow_keys: table.config.escrow_keys,
        status: table.status,
        game_id: (table.game_id != NO_GAME).then_some(table.game_id),
        timestamp: table.timestamp,
        round: table.round,
        dealer: table.dealer_index,
        small_blind_seat: table.sb_index,
        big_blind_seat: table.bb_index,
        next_player: table.next_player_index,
        current_bet: table.current_bet,
        bank: table.bank,
        current_bank: table.current_bank,
        board: table.table_cards.clone(),
        waiting_keys: table.waiting_keys.clone(),
        possible_moves: table.possible_moves.clone(),
        raise_variants: table.raise_variants.clone(),
        deck: table.deck.cards().to_vec(),
        all_keys: table.all_keys.clone(),
        players,
        last_result: table.last_result.clone(),
    }
}
