use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::key::CardKey;
use crate::domain::table::TableConfig;
use crate::domain::{PlayerId, TableId};
use crate::engine::actions::Envelope;
use crate::engine::{EngineContext, SeatRequest, TableManager};

use super::dto::{CommandResponse, CommandResult};
use super::errors::ApiError;

/// Команда верхнего уровня.
///
/// Приходит снаружи в JSON и маршрутизируется в `TableManager`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum ApiCommand {
    /// Создать новый стол.
    CreateTable(CreateTableCommand),

    /// Сесть за любой подходящий стол (или создать новый).
    JoinTable(JoinTableCommand),

    /// Сесть за конкретный стол.
    SeatPlayer(SeatPlayerCommand),

    /// Событие игрока для стола.
    TableEvent { table_id: TableId, envelope: Envelope },

    /// Встать из-за стола.
    ExitTable(ExitTableCommand),

    /// Ключи снятых по таймауту игроков от хранителя.
    EscrowKeys(EscrowKeysCommand),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTableCommand {
    pub small_blind: Chips,
    pub max_players: usize,
    #[serde(default)]
    pub escrow_keys: bool,
}

impl CreateTableCommand {
    fn table_config(&self) -> TableConfig {
        TableConfig {
            small_blind: self.small_blind,
            max_players: self.max_players,
            escrow_keys: self.escrow_keys,
        }
    }
}

/// Параметры посадки игрока.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatOptions {
    pub player_id: PlayerId,
    /// Бай-ин в малых блайндах.
    pub buyin_sb: u32,
    #[serde(default)]
    pub wait_for_bb: bool,
    #[serde(default)]
    pub autorebuy: bool,
}

impl From<SeatOptions> for SeatRequest {
    fn from(o: SeatOptions) -> Self {
        SeatRequest {
            player_id: o.player_id,
            buyin_sb: o.buyin_sb,
            wait_for_bb: o.wait_for_bb,
            autorebuy: o.autorebuy,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct JoinTableCommand {
    pub table: CreateTableCommand,
    pub seat: SeatOptions,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatPlayerCommand {
    pub table_id: TableId,
    pub seat: SeatOptions,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExitTableCommand {
    pub table_id: TableId,
    pub player_id: PlayerId,
    /// Ключи от всех карт, кроме своих двух (пусто, если уход без ключей).
    #[serde(default)]
    pub keys: Vec<CardKey>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EscrowKeysCommand {
    pub table_id: TableId,
    pub keys: BTreeMap<PlayerId, Vec<CardKey>>,
}

impl ApiCommand {
    pub fn from_json(s: &str) -> Result<Self, ApiError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> Result<String, ApiError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Выполнить команду. Эффекты для счетов возвращаются вызывающему.
pub fn execute(
    manager: &mut TableManager,
    ctx: &mut EngineContext<'_>,
    command: ApiCommand,
) -> Result<CommandResponse, ApiError> {
    let result = match command {
        ApiCommand::CreateTable(cmd) => {
            let table_id = manager.create_table(ctx.params, cmd.table_config(), ctx.now)?;
            CommandResult::TableCreated { table_id }
        }
        ApiCommand::JoinTable(cmd) => {
            let (table_id, seat) = manager.join_any(ctx, cmd.table.table_config(), cmd.seat.into())?;
            CommandResult::Seated { table_id, seat }
        }
        ApiCommand::SeatPlayer(cmd) => {
            let seat = manager.seat_player(cmd.table_id, ctx, cmd.seat.into())?;
            CommandResult::Seated {
                table_id: cmd.table_id,
                seat,
            }
        }
        ApiCommand::TableEvent { table_id, envelope } => {
            let outcome = manager.apply(table_id, ctx, &envelope)?;
            return Ok(CommandResponse {
                result: CommandResult::Event {
                    disposition: outcome.disposition,
                },
                effects: outcome.effects,
            });
        }
        ApiCommand::ExitTable(cmd) => {
            let outcome = manager.exit(cmd.table_id, ctx, cmd.player_id, cmd.keys)?;
            return Ok(CommandResponse {
                result: CommandResult::Exited {
                    disposition: outcome.disposition,
                },
                effects: outcome.effects,
            });
        }
        ApiCommand::EscrowKeys(cmd) => {
            let outcome = manager.submit_escrow_keys(cmd.table_id, ctx, cmd.keys)?;
            return Ok(CommandResponse {
                result: CommandResult::EscrowAccepted,
                effects: outcome.effects,
            });
        }
    };

    Ok(CommandResponse {
        result,
        effects: ctx.take_effects(),
    })
}
