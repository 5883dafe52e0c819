//! Доменная модель: карты, колода, ключи, игроки, действия, стол, итоги раздачи.

pub mod act;
pub mod card;
pub mod chips;
pub mod deck;
pub mod key;
pub mod player;
pub mod result;
pub mod table;

// Базовые идентификаторы
pub type PlayerId = u64;
pub type TableId = u64;
pub type GameId = u64;
/// Индекс места за столом.
pub type SeatIndex = usize;
/// Индекс карты в колоде `0..52`.
pub type CardIndex = u8;

// Удобные реэкспорты, чтобы в других модулях писать crate::domain::Card и т.п.
pub use act::*;
pub use card::*;
pub use chips::*;
pub use deck::*;
pub use key::*;
pub use player::*;
pub use result::*;
pub use table::*;
