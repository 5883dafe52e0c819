use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{PlayerId, TableId};
use crate::engine::{EngineError, ManagerError};

/// Ошибки внешнего API (то, что отдаём клиенту).
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApiError {
    #[error("Некорректный запрос: {0}")]
    BadRequest(String),

    #[error("Стол {0} не найден")]
    TableNotFound(TableId),

    #[error("Игрок {0} не найден за столом")]
    PlayerNotAtTable(PlayerId),

    /// Ставки, ключи, состояние стола.
    #[error("Ошибка движка: {0}")]
    EngineError(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::PlayerNotAtTable(player_id) => ApiError::PlayerNotAtTable(player_id),
            EngineError::Internal(_) => ApiError::Internal(err.to_string()),
            other => ApiError::EngineError(other.to_string()),
        }
    }
}

impl From<ManagerError> for ApiError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::TableNotFound(table_id) => ApiError::TableNotFound(table_id),
            ManagerError::Engine(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
