// src/config/params.rs

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::chips::Chips;
use crate::domain::table::TableStatus;

/// Ошибки загрузки и проверки параметров.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Не удалось разобрать параметры: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Некорректные параметры: {0}")]
    Invalid(&'static str),
}

/// Таймауты ожидания (в секундах).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeoutRules {
    /// Предупреждение игроку, который думает над ходом.
    pub warning_secs: u64,
    /// Последний срок ответа.
    pub last_secs: u64,
    /// Сколько ещё ждать после срока, прежде чем признать стол мёртвым.
    pub dead_table_secs: u64,
}

impl TimeoutRules {
    pub const fn new(warning_secs: u64, last_secs: u64, dead_table_secs: u64) -> Self {
        Self {
            warning_secs,
            last_secs,
            dead_table_secs,
        }
    }

    /// 25 сек предупреждение, 15 сек последний срок, 10 сек до мёртвого стола.
    pub const fn standard() -> Self {
        Self::new(25, 15, 10)
    }

    /// Сколько можно молчать в данном состоянии стола.
    /// На ход игрока времени больше: предупреждение плюс последний срок с запасом.
    pub fn timeout_for(&self, status: TableStatus) -> u64 {
        if status == TableStatus::WaitPlayersAct {
            self.warning_secs + self.last_secs + 5
        } else {
            self.last_secs
        }
    }
}

impl Default for TimeoutRules {
    fn default() -> Self {
        Self::standard()
    }
}

/// Параметры, общие для всех столов.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GameParams {
    pub allowed_small_blinds: Vec<Chips>,
    pub allowed_table_sizes: Vec<usize>,
    /// Рейк в процентах от банка.
    pub rake_percent: f64,
    pub max_rake: Chips,
    /// Какая часть штрафа за сорванную раздачу уходит оставшимся игрокам (%).
    pub player_pay_percent: u64,
    /// Бай-ин в малых блайндах.
    pub min_buyin_sb: u32,
    pub max_buyin_sb: u32,
    pub timeouts: TimeoutRules,
}

impl GameParams {
    /// Стандартный набор параметров.
    pub fn standard() -> Self {
        Self {
            allowed_small_blinds: vec![
                Chips(100),
                Chips(200),
                Chips(500),
                Chips(1_000),
                Chips(10_000),
            ],
            allowed_table_sizes: vec![6],
            rake_percent: 3.0,
            max_rake: Chips(50_000),
            player_pay_percent: 70,
            min_buyin_sb: 40,
            max_buyin_sb: 200,
            timeouts: TimeoutRules::standard(),
        }
    }

    /// Загрузить из JSON и сразу проверить.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let params: GameParams = serde_json::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_small_blinds.is_empty() || self.allowed_small_blinds.iter().any(|sb| sb.is_zero()) {
            return Err(ConfigError::Invalid("allowed_small_blinds"));
        }
        if self.allowed_table_sizes.iter().any(|&n| !(2..=10).contains(&n)) || self.allowed_table_sizes.is_empty() {
            return Err(ConfigError::Invalid("allowed_table_sizes"));
        }
        if !(0.0..=100.0).contains(&self.rake_percent) {
            return Err(ConfigError::Invalid("rake_percent"));
        }
        if self.player_pay_percent > 100 {
            return Err(ConfigError::Invalid("player_pay_percent"));
        }
        // Стек меньше большого блайнда играть не может.
        if self.min_buyin_sb < 2 || self.min_buyin_sb > self.max_buyin_sb {
            return Err(ConfigError::Invalid("buyin range"));
        }
        if self.timeouts.last_secs == 0 {
            return Err(ConfigError::Invalid("timeouts.last_secs"));
        }
        Ok(())
    }

    pub fn is_small_blind_allowed(&self, small_blind: Chips) -> bool {
        self.allowed_small_blinds.contains(&small_blind)
    }

    pub fn is_table_size_allowed(&self, max_players: usize) -> bool {
        self.allowed_table_sizes.contains(&max_players)
    }

    /// Границы бай-ина для стола с данным малым блайндом.
    pub fn buyin_range(&self, small_blind: Chips) -> (Chips, Chips) {
        (
            small_blind * u64::from(self.min_buyin_sb),
            small_blind * u64::from(self.max_buyin_sb),
        )
    }

    pub fn is_buyin_sb_allowed(&self, buyin_sb: u32) -> bool {
        (self.min_buyin_sb..=self.max_buyin_sb).contains(&buyin_sb)
    }
}

impl Default for GameParams {
    fn default() -> Self {
        Self::standard()
    }
}
