//! Стол с честными симулированными клиентами.
//!
//! Клиенты сами подтверждают начало и конец раздачи, перемешивают и
//! шифруют колоду, отдают ключи фаз. Решения по ставкам принимает
//! вызывающий код. Используется dev CLI и интеграционными тестами.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::config::GameParams;
use crate::domain::act::{Act, PossibleMove};
use crate::domain::chips::Chips;
use crate::domain::key::CardKey;
use crate::domain::player::{PlayerAtTable, PlayerStatus, RebuyPolicy};
use crate::domain::result::GameResult;
use crate::domain::table::{Table, TableConfig, TableStatus};
use crate::domain::{PlayerId, SeatIndex, TableId};
use crate::engine::actions::{AckKind, Disposition, Envelope, TableCommand};
use crate::engine::effects::TableEffect;
use crate::engine::positions::{add_new_player, init_new_game};
use crate::engine::validation::can_exit_without_keys;
use crate::engine::{EngineContext, ManagerError, SeatRequest, TableManager};
use crate::infra::keyring::{unseal_key, PlayerKeyring};
use crate::infra::ledger::InMemoryLedger;
use crate::infra::rng::DeterministicRng;
use crate::infra::rng_seed::RngSeed;

/// Решение игрока, чей ход.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Act(Act),
    Fold,
}

/// Check, если можно, иначе колл (или олл-ин на весь стек).
pub fn passive_decision(table: &Table, seat: SeatIndex) -> Decision {
    if table.possible_moves.contains(&PossibleMove::Check) {
        return Decision::Act(Act::check());
    }
    let Some(player) = table.players.get(seat) else {
        return Decision::Fold;
    };
    let available = player.stack + player.cur_round_bets;
    Decision::Act(Act::bet(table.current_bet.min(available)))
}

pub struct TableSim {
    params: GameParams,
    ledger: InMemoryLedger,
    manager: TableManager,
    table_id: TableId,
    seed: RngSeed,
    rng: DeterministicRng,
    now: u64,
    next_trx: HashMap<PlayerId, u64>,
    effects: Vec<TableEffect>,
}

impl TableSim {
    pub fn new(params: GameParams, config: TableConfig, seed: u64, now: u64) -> Result<Self, ManagerError> {
        let mut manager = TableManager::new();
        let table_id = manager.create_table(&params, config, now)?;
        let seed = RngSeed::from_u64(seed);

        Ok(Self {
            params,
            ledger: InMemoryLedger::new(),
            manager,
            table_id,
            rng: seed.to_rng(),
            seed,
            now,
            next_trx: HashMap::new(),
            effects: Vec::new(),
        })
    }

    /// Стол, за которым игроки уже сидят (как после предыдущей раздачи):
    /// раздача начинается сразу, без доплат новичков.
    pub fn with_seated(
        params: GameParams,
        config: TableConfig,
        seed: u64,
        now: u64,
        seats: &[(PlayerId, Chips)],
    ) -> Result<Self, ManagerError> {
        let mut manager = TableManager::new();
        let table_id = manager.reserve_table_id();
        let mut table = Table::new(table_id, config, now);
        let mut ledger = InMemoryLedger::new();

        let small_blind = table.small_blind();
        let mut effects = Vec::new();
        for &(player_id, stack) in seats {
            let rebuy = RebuyPolicy {
                autorebuy: false,
                buyin_sb: (stack / small_blind.amount()).amount() as u32,
            };
            let mut player = PlayerAtTable::new(player_id, stack, false, rebuy);
            player.status = PlayerStatus::InGame;
            add_new_player(&mut table, player)?;
            effects.push(TableEffect::SeatTaken { player_id, table_id });
        }
        ledger.apply(&effects);

        {
            let mut ctx = EngineContext::new(&params, &ledger, now);
            init_new_game(&mut table, &mut ctx, false)?;
            effects.extend(ctx.take_effects());
        }
        manager.add_table(table);

        let seed = RngSeed::from_u64(seed);
        Ok(Self {
            params,
            ledger,
            manager,
            table_id,
            rng: seed.to_rng(),
            seed,
            now,
            next_trx: HashMap::new(),
            effects,
        })
    }

    pub fn params(&self) -> &GameParams {
        &self.params
    }

    pub fn ledger(&self) -> &InMemoryLedger {
        &self.ledger
    }

    pub fn manager(&self) -> &TableManager {
        &self.manager
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Стол (`None`, если менеджер его уже удалил).
    pub fn table(&self) -> Option<&Table> {
        self.manager.table(self.table_id)
    }

    pub fn status(&self) -> Option<TableStatus> {
        self.table().map(|t| t.status)
    }

    /// Все эффекты с момента создания стола.
    pub fn effects(&self) -> &[TableEffect] {
        &self.effects
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn advance_clock(&mut self, secs: u64) {
        self.now += secs;
    }

    pub fn fund(&mut self, player_id: PlayerId, amount: Chips) {
        self.ledger.add_balance(player_id, amount);
    }

    fn record(&mut self, effects: Vec<TableEffect>) {
        self.ledger.apply(&effects);
        self.effects.extend(effects);
    }

    fn table_or_err(&self) -> Result<&Table, ManagerError> {
        self.table().ok_or(ManagerError::TableNotFound(self.table_id))
    }

    pub fn seat(&mut self, req: SeatRequest) -> Result<SeatIndex, ManagerError> {
        let mut ctx = EngineContext::new(&self.params, &self.ledger, self.now);
        let seat = self.manager.seat_player(self.table_id, &mut ctx, req);
        let effects = ctx.take_effects();
        self.record(effects);
        seat
    }

    /// Пополнить счёт и посадить с бай-ином в `buyin_sb` малых блайндов.
    pub fn fund_and_seat(&mut self, player_id: PlayerId, buyin_sb: u32) -> Result<SeatIndex, ManagerError> {
        let small_blind = self.table_or_err()?.small_blind();
        self.fund(player_id, small_blind * u64::from(buyin_sb));
        self.seat(SeatRequest {
            player_id,
            buyin_sb,
            wait_for_bb: false,
            autorebuy: false,
        })
    }

    /// Ключи игрока на текущую раздачу.
    pub fn keyring(&self, player_id: PlayerId) -> Option<PlayerKeyring> {
        let table = self.table()?;
        Some(PlayerKeyring::for_hand(&self.seed, player_id, table.id, table.game_id))
    }

    fn take_trx(&mut self, player_id: PlayerId) -> u64 {
        let trx = self.next_trx.entry(player_id).or_insert(0);
        *trx += 1;
        *trx
    }

    /// Конверт для события с текущей раздачей и временем стола.
    pub fn envelope(&mut self, player_id: PlayerId, command: TableCommand) -> Result<Envelope, ManagerError> {
        let (game_id, timestamp) = {
            let table = self.table_or_err()?;
            (table.game_id, table.timestamp)
        };
        Ok(Envelope {
            player_id,
            game_id,
            timestamp,
            trx_index: self.take_trx(player_id),
            command,
        })
    }

    pub fn send_envelope(&mut self, envelope: &Envelope) -> Result<Disposition, ManagerError> {
        let mut ctx = EngineContext::new(&self.params, &self.ledger, self.now);
        let outcome = self.manager.apply(self.table_id, &mut ctx, envelope)?;
        self.record(outcome.effects);
        Ok(outcome.disposition)
    }

    pub fn send(&mut self, player_id: PlayerId, command: TableCommand) -> Result<Disposition, ManagerError> {
        let envelope = self.envelope(player_id, command)?;
        self.send_envelope(&envelope)
    }

    pub fn act(&mut self, player_id: PlayerId, act: Act) -> Result<Disposition, ManagerError> {
        self.send(player_id, TableCommand::SubmitAction { act })
    }

    pub fn fold(&mut self, player_id: PlayerId) -> Result<Disposition, ManagerError> {
        let keys = {
            let table = self.table_or_err()?;
            self.keyring(player_id)
                .map(|k| k.fold_keys(table))
                .unwrap_or_default()
        };
        self.send(player_id, TableCommand::SubmitFold { keys })
    }

    pub fn force_timeout(&mut self, caller: PlayerId) -> Result<Disposition, ManagerError> {
        let expected_status = self.table_or_err()?.status;
        self.send(caller, TableCommand::ForceTimeout { expected_status })
    }

    /// Уйти из-за стола, отдав ключи, если они нужны.
    pub fn exit(&mut self, player_id: PlayerId) -> Result<Disposition, ManagerError> {
        let keys = {
            let table = self.table_or_err()?;
            let needs_keys = table
                .seat_of(player_id)
                .map(|seat| !can_exit_without_keys(table.players[seat].status, table.status))
                .unwrap_or(false);
            match self.keyring(player_id) {
                Some(keyring) if needs_keys => keyring.exit_keys(table),
                _ => Vec::new(),
            }
        };
        self.exit_with_keys(player_id, keys)
    }

    pub fn exit_with_keys(&mut self, player_id: PlayerId, keys: Vec<CardKey>) -> Result<Disposition, ManagerError> {
        let mut ctx = EngineContext::new(&self.params, &self.ledger, self.now);
        let outcome = self.manager.exit(self.table_id, &mut ctx, player_id, keys)?;
        self.record(outcome.effects);
        Ok(outcome.disposition)
    }

    /// Хранитель возвращает ключи всех снятых по таймауту.
    pub fn release_escrow_keys(&mut self) -> Result<(), ManagerError> {
        let keys: BTreeMap<PlayerId, Vec<CardKey>> = {
            let table = self.table_or_err()?;
            table
                .players
                .iter()
                .filter(|p| p.wait_escrow)
                .map(|p| {
                    let keys = table
                        .escrowed_keys
                        .get(&p.player_id)
                        .map(|sealed| sealed.iter().filter_map(unseal_key).collect())
                        .unwrap_or_default();
                    (p.player_id, keys)
                })
                .collect()
        };

        let mut ctx = EngineContext::new(&self.params, &self.ledger, self.now);
        let outcome = self.manager.submit_escrow_keys(self.table_id, &mut ctx, keys)?;
        self.record(outcome.effects);
        Ok(())
    }

    /// Кто из участников раздачи ещё не прислал событие фазы.
    pub fn pending_players(&self, allowed: &[PlayerStatus]) -> Vec<PlayerId> {
        self.table()
            .map(|t| {
                t.dealt_in_order(t.next_player_index)
                    .into_iter()
                    .map(|seat| &t.players[seat])
                    .filter(|p| allowed.contains(&p.status) && !p.has_event)
                    .map(|p| p.player_id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Игрок, чей сейчас ход.
    pub fn player_to_act(&self) -> Option<(SeatIndex, PlayerId)> {
        let table = self.table()?;
        if table.status != TableStatus::WaitPlayersAct {
            return None;
        }
        let seat = table.next_player_index;
        table.players.get(seat).map(|p| (seat, p.player_id))
    }

    /// Один шаг протокола за одного клиента (торговля не входит).
    /// `false`, если сейчас клиентам присылать нечего.
    pub fn step(&mut self) -> Result<bool, ManagerError> {
        let Some(table) = self.table() else {
            return Ok(false);
        };
        let status = table.status;
        let turn = table.players.get(table.next_player_index).map(|p| p.player_id);
        let escrow = table.config.escrow_keys;

        let (player_id, command) = match status {
            TableStatus::WaitStartGame => {
                let Some(&id) = self.pending_players(&[PlayerStatus::InGame]).first() else {
                    return Ok(false);
                };
                (id, TableCommand::RequestAck(AckKind::StartOfHand))
            }
            TableStatus::WaitEndGame => {
                let Some(&id) = self
                    .pending_players(&[PlayerStatus::InGame, PlayerStatus::Fold])
                    .first()
                else {
                    return Ok(false);
                };
                (id, TableCommand::RequestAck(AckKind::EndOfHand))
            }
            TableStatus::WaitShuffle => {
                let Some(id) = turn else { return Ok(false) };
                let cards = table.deck.cards().to_vec();
                let Some(keyring) = self.keyring(id) else {
                    return Ok(false);
                };
                let cards = keyring.shuffle_deck(&cards, &mut self.rng);
                (id, TableCommand::SubmitShuffledDeck { cards })
            }
            TableStatus::WaitCrypt => {
                let Some(id) = turn else { return Ok(false) };
                let Some(keyring) = self.keyring(id) else {
                    return Ok(false);
                };
                let cards = keyring.encrypt_deck(table.deck.cards());
                let escrow_keys = if escrow {
                    keyring.sealed_escrow_keys(table)
                } else {
                    Vec::new()
                };
                (id, TableCommand::SubmitEncryptionLayer { cards, escrow_keys })
            }
            s if s.is_waiting_keys() => {
                let Some(&id) = self.pending_players(&[PlayerStatus::InGame]).first() else {
                    return Ok(false);
                };
                let Some(keyring) = self.keyring(id) else {
                    return Ok(false);
                };
                (id, TableCommand::SubmitCardKeys { keys: keyring.phase_keys(table) })
            }
            _ => return Ok(false),
        };

        debug!(player_id, command = command.name(), "симулированный клиент");
        self.send(player_id, command)?;
        Ok(true)
    }

    /// Вести протокол, пока не понадобится ход игрока или раздача не закончится.
    pub fn run_until_action(&mut self) -> Result<Option<TableStatus>, ManagerError> {
        loop {
            match self.status() {
                None => return Ok(None),
                Some(TableStatus::WaitPlayersAct) | Some(TableStatus::WaitEndGame) => return Ok(self.status()),
                Some(_) => {
                    if !self.step()? {
                        return Ok(self.status());
                    }
                }
            }
        }
    }

    /// Подтвердить конец раздачи за всех.
    pub fn finish_hand(&mut self) -> Result<(), ManagerError> {
        while self.status() == Some(TableStatus::WaitEndGame) {
            if !self.step()? {
                break;
            }
        }
        Ok(())
    }

    /// Сыграть раздачу до конца. Возвращает её итог, если она дошла до расчёта.
    pub fn play_hand(
        &mut self,
        mut decide: impl FnMut(&Table, SeatIndex) -> Decision,
    ) -> Result<Option<GameResult>, ManagerError> {
        loop {
            match self.run_until_action()? {
                Some(TableStatus::WaitPlayersAct) => {
                    let Some((seat, player_id)) = self.player_to_act() else {
                        return Ok(None);
                    };
                    let decision = match self.table() {
                        Some(table) => decide(table, seat),
                        None => return Ok(None),
                    };
                    match decision {
                        Decision::Act(act) => self.act(player_id, act)?,
                        Decision::Fold => self.fold(player_id)?,
                    };
                }
                Some(TableStatus::WaitEndGame) => {
                    let result = self.table().and_then(|t| t.last_result.clone());
                    self.finish_hand()?;
                    return Ok(result);
                }
                _ => return Ok(None),
            }
        }
    }
}
