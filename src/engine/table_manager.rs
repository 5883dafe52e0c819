// src/engine/table_manager.rs

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;
use tracing::info;

use crate::config::GameParams;
use crate::domain::chips::Chips;
use crate::domain::key::CardKey;
use crate::domain::player::PlayerStatus;
use crate::domain::table::{Table, TableConfig, TableStatus};
use crate::domain::{PlayerId, SeatIndex, TableId};
use crate::engine::actions::{CommandOutcome, Envelope};
use crate::engine::effects::{CreditReason, IncomeSource, TableEffect};
use crate::engine::errors::EngineError;
use crate::engine::exit::exit_player;
use crate::engine::game_loop::{apply_command, seat_player, SeatRequest};
use crate::engine::timeout::submit_escrow_keys;
use crate::engine::EngineContext;
use crate::infra::ids::IdGenerator;

/// Ошибки уровня менеджера столов.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    #[error("Стол {0} не найден")]
    TableNotFound(TableId),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Менеджер столов:
/// - хранит независимые столы по TableId;
/// - рассаживает игроков и маршрутизирует события;
/// - удаляет столы, за которыми никого не осталось.
pub struct TableManager {
    tables: HashMap<TableId, Table>,
    ids: IdGenerator,
}

impl Default for TableManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TableManager {
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
            ids: IdGenerator::new(),
        }
    }

    /// Создать пустой стол. Блайнд и размер должны быть разрешены параметрами.
    pub fn create_table(
        &mut self,
        params: &GameParams,
        config: TableConfig,
        now: u64,
    ) -> Result<TableId, ManagerError> {
        if !params.is_small_blind_allowed(config.small_blind) {
            return Err(EngineError::SmallBlindNotAllowed(config.small_blind).into());
        }
        if !params.is_table_size_allowed(config.max_players) {
            return Err(EngineError::TableSizeNotAllowed(config.max_players).into());
        }

        let id = self.ids.next_table_id();
        info!(table_id = id, small_blind = %config.small_blind, max_players = config.max_players, "стол создан");
        self.tables.insert(id, Table::new(id, config, now));
        Ok(id)
    }

    /// Зарезервировать id для стола, собранного снаружи.
    pub fn reserve_table_id(&mut self) -> TableId {
        self.ids.next_table_id()
    }

    /// Добавить готовый стол (id берётся из `reserve_table_id`).
    pub fn add_table(&mut self, table: Table) -> TableId {
        let id = table.id;
        info!(table_id = id, status = ?table.status, "стол добавлен");
        self.tables.insert(id, table);
        id
    }

    pub fn table(&self, table_id: TableId) -> Option<&Table> {
        self.tables.get(&table_id)
    }

    /// Все столы в порядке id.
    pub fn tables(&self) -> Vec<&Table> {
        let mut tables: Vec<&Table> = self.tables.values().collect();
        tables.sort_by_key(|t| t.id);
        tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    fn table_mut(&mut self, table_id: TableId) -> Result<&mut Table, ManagerError> {
        self.tables
            .get_mut(&table_id)
            .ok_or(ManagerError::TableNotFound(table_id))
    }

    /// Сесть за конкретный стол.
    pub fn seat_player(
        &mut self,
        table_id: TableId,
        ctx: &mut EngineContext<'_>,
        req: SeatRequest,
    ) -> Result<SeatIndex, ManagerError> {
        let table = self.table_mut(table_id)?;
        Ok(seat_player(table, ctx, req)?)
    }

    /// Сесть за первый подходящий стол (тот же блайнд, размер и режим),
    /// где есть место. Подходящего нет: создаётся новый.
    pub fn join_any(
        &mut self,
        ctx: &mut EngineContext<'_>,
        config: TableConfig,
        req: SeatRequest,
    ) -> Result<(TableId, SeatIndex), ManagerError> {
        let found = self
            .tables()
            .into_iter()
            .find(|t| {
                t.config == config
                    && t.status != TableStatus::Delete
                    && t.seated_count() < t.config.max_players
                    && t.seat_of(req.player_id).is_none()
            })
            .map(|t| t.id);

        let table_id = match found {
            Some(id) => id,
            None => self.create_table(ctx.params, config, ctx.now)?,
        };

        match self.seat_player(table_id, ctx, req) {
            Ok(seat) => Ok((table_id, seat)),
            Err(err) => {
                if found.is_none() {
                    self.tables.remove(&table_id);
                }
                Err(err)
            }
        }
    }

    /// Применить событие игрока к столу.
    ///
    /// Здесь, в `exit` и в `submit_escrow_keys` все эффекты, включая
    /// эффекты удаления стола, возвращаются в `CommandOutcome`.
    pub fn apply(
        &mut self,
        table_id: TableId,
        ctx: &mut EngineContext<'_>,
        envelope: &Envelope,
    ) -> Result<CommandOutcome, ManagerError> {
        let table = self.table_mut(table_id)?;
        let mut outcome = apply_command(table, ctx, envelope)?;
        self.drop_if_abandoned(table_id, ctx);
        outcome.effects.extend(ctx.take_effects());
        Ok(outcome)
    }

    /// Игрок встаёт из-за стола.
    pub fn exit(
        &mut self,
        table_id: TableId,
        ctx: &mut EngineContext<'_>,
        player_id: PlayerId,
        keys: Vec<CardKey>,
    ) -> Result<CommandOutcome, ManagerError> {
        let table = self.table_mut(table_id)?;
        let disposition = exit_player(table, ctx, player_id, keys)?;
        self.drop_if_abandoned(table_id, ctx);
        Ok(CommandOutcome {
            disposition,
            effects: ctx.take_effects(),
        })
    }

    /// Ключи от хранителя для стола в режиме эскроу.
    pub fn submit_escrow_keys(
        &mut self,
        table_id: TableId,
        ctx: &mut EngineContext<'_>,
        keys: BTreeMap<PlayerId, Vec<CardKey>>,
    ) -> Result<CommandOutcome, ManagerError> {
        let table = self.table_mut(table_id)?;
        submit_escrow_keys(table, ctx, keys)?;
        self.drop_if_abandoned(table_id, ctx);
        Ok(CommandOutcome::applied(ctx.take_effects()))
    }

    /// Удалить стол в `DELETE` или стол, за которым остались только ушедшие
    /// и снятые по таймауту. Стеки снятых возвращаются на счета.
    fn drop_if_abandoned(&mut self, table_id: TableId, ctx: &mut EngineContext<'_>) {
        let Some(table) = self.tables.get(&table_id) else {
            return;
        };

        let abandoned = table.players.iter().all(|p| {
            matches!(
                p.status,
                PlayerStatus::Out | PlayerStatus::Timeout | PlayerStatus::NoSeat
            )
        });
        if table.status != TableStatus::Delete && !abandoned {
            return;
        }

        for p in table.players.iter() {
            if p.status != PlayerStatus::Timeout {
                continue;
            }
            if p.stack > Chips::ZERO {
                ctx.emit(TableEffect::Credit {
                    player_id: p.player_id,
                    amount: p.stack,
                    reason: CreditReason::Timeout,
                });
            }
            ctx.emit(TableEffect::SeatReleased {
                player_id: p.player_id,
                table_id,
            });
        }

        // Вклады ушедших в недоигранной раздаче остаются заведению.
        let hand_in_progress = !matches!(
            table.status,
            TableStatus::Delete | TableStatus::WaitPlayer | TableStatus::WaitStartGame | TableStatus::WaitEndGame
        );
        if hand_in_progress && !table.current_bank.is_zero() {
            ctx.emit(TableEffect::HouseIncome {
                amount: table.current_bank,
                source: IncomeSource::TimeoutFine,
            });
        }

        info!(table_id, status = ?table.status, "стол удалён");
        self.tables.remove(&table_id);
    }
}
