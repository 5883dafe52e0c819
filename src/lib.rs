//! Покерный движок (Texas Hold'em) с протоколом раскрытия карт.
//!
//! Колоду перемешивают и шифруют сами игроки, каждый своим слоем.
//! Карта открывается, только когда на стол легли ключи всех участников.
//! Движок ведёт стол от посадки до расчёта банка и возвращает
//! эффекты для внешних счетов.

pub mod api;
pub mod cipher;
pub mod config;
pub mod domain;
pub mod engine;
pub mod eval;
pub mod infra;
