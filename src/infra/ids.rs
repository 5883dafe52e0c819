use serde::{Deserialize, Serialize};

use crate::domain::{PlayerId, TableId};

/// Счётчики id для менеджера столов и dev CLI. Нумерация с 1.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdGenerator {
    next_table: TableId,
    next_player: PlayerId,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            next_table: 1,
            next_player: 1,
        }
    }

    pub fn next_table_id(&mut self) -> TableId {
        let id = self.next_table;
        self.next_table += 1;
        id
    }

    pub fn next_player_id(&mut self) -> PlayerId {
        let id = self.next_player;
        self.next_player += 1;
        id
    }

    /// Какой id получит следующий стол (для логов и проверок в тестах).
    pub fn peek_table_id(&self) -> TableId {
        self.next_table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one_and_grow() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.peek_table_id(), 1);
        assert_eq!(ids.next_table_id(), 1);
        assert_eq!(ids.next_table_id(), 2);
        assert_eq!(ids.next_player_id(), 1);
        assert_eq!(ids.peek_table_id(), 3);
    }
}
