// src/logging.rs
use chrono::Local;
use log::LevelFilter;
use std::io::Write;

/// Installs a timestamped `env_logger` backend.
///
/// An explicit `level` wins over `RUST_LOG`; the default is `info`.
/// Calling this more than once leaves the first logger in place.
pub fn init_logging(level: Option<&str>) {
    let log_level = level
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .or_else(|| std::env::var("RUST_LOG").ok().and_then(|v| v.parse().ok()))
        .unwrap_or(LevelFilter::Info);

    let installed = env_logger::Builder::new()
        .filter_level(log_level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {:5} {}] {}",
                Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()
        .is_ok();

    if installed {
        log::info!("Logger initialized (level: {})", log_level);
    }
}
