use tracing_subscriber::{fmt, EnvFilter};

/// Логи в консоль для бинарников. Уровень из `RUST_LOG`, по умолчанию `info`.
/// Повторный вызов ничего не делает.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
