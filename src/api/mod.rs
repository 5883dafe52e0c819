//! JSON-фасад над `TableManager` для хоста.
//!
//! Команды меняют столы и возвращают эффекты для счетов, запросы только читают
//! и отдают `TableView`. Ошибки движка сворачиваются в `ApiError`.

pub mod commands;
pub mod dto;
pub mod errors;
pub mod queries;

pub use commands::*;
pub use dto::*;
pub use errors::*;
pub use queries::*;
