use std::collections::HashMap;

use tracing::debug;

use crate::domain::chips::Chips;
use crate::domain::result::StatisticsRecord;
use crate::domain::{PlayerId, TableId};
use crate::engine::effects::TableEffect;
use crate::engine::Ledger;

/// Счета игроков в памяти: для тестов и dev CLI.
///
/// Применяет эффекты стола и ведёт учёт дохода заведения,
/// штрафных отметок и статистики.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLedger {
    balances: HashMap<PlayerId, Chips>,
    active_tables: HashMap<PlayerId, TableId>,
    penalties: HashMap<PlayerId, Chips>,
    player_rake: HashMap<PlayerId, Chips>,
    house: Chips,
    statistics: Vec<StatisticsRecord>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_balance(&mut self, player_id: PlayerId, amount: Chips) {
        *self.balances.entry(player_id).or_default() += amount;
    }

    pub fn house(&self) -> Chips {
        self.house
    }

    pub fn penalty_of(&self, player_id: PlayerId) -> Chips {
        self.penalties.get(&player_id).copied().unwrap_or_default()
    }

    pub fn rake_of(&self, player_id: PlayerId) -> Chips {
        self.player_rake.get(&player_id).copied().unwrap_or_default()
    }

    pub fn active_table(&self, player_id: PlayerId) -> Option<TableId> {
        self.active_tables.get(&player_id).copied()
    }

    pub fn statistics(&self) -> &[StatisticsRecord] {
        &self.statistics
    }

    /// Все фишки на счетах плюс доход заведения.
    pub fn total(&self) -> Chips {
        self.balances.values().copied().sum::<Chips>() + self.house
    }

    pub fn apply(&mut self, effects: &[TableEffect]) {
        for effect in effects {
            self.apply_one(effect);
        }
    }

    fn apply_one(&mut self, effect: &TableEffect) {
        debug!(?effect, "эффект стола");
        match effect {
            TableEffect::Credit { player_id, amount, .. } => self.add_balance(*player_id, *amount),
            TableEffect::Debit { player_id, amount, .. } => {
                let balance = self.balances.entry(*player_id).or_default();
                *balance -= *amount;
            }
            TableEffect::Penalty { player_id, amount } => {
                *self.penalties.entry(*player_id).or_default() += *amount;
            }
            TableEffect::HouseIncome { amount, .. } => self.house += *amount,
            TableEffect::PlayerRake { player_id, amount } => {
                *self.player_rake.entry(*player_id).or_default() += *amount;
            }
            TableEffect::SeatTaken { player_id, table_id } => {
                self.active_tables.insert(*player_id, *table_id);
            }
            TableEffect::SeatReleased { player_id, table_id } => {
                if self.active_tables.get(player_id) == Some(table_id) {
                    self.active_tables.remove(player_id);
                }
            }
            TableEffect::Statistics(record) => self.statistics.push(record.clone()),
        }
    }
}

impl Ledger for InMemoryLedger {
    fn balance(&self, player_id: PlayerId) -> Chips {
        self.balances.get(&player_id).copied().unwrap_or_default()
    }

    fn has_active_table(&self, player_id: PlayerId) -> bool {
        self.active_tables.contains_key(&player_id)
    }
}
