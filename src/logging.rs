use std::io::Write;

use chrono::Local;
use log::{LevelFilter, SetLoggerError};

/// Parses a level name, falling back to `Info` for anything unrecognised.
pub fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Info)
}

/// Initialises env_logger at the given level. `RUST_LOG` still overrides it.
///
/// The logger itself accepts everything so `set_level` can raise or lower
/// the level once the configuration has been read.
pub fn setup_logging(level: LevelFilter) -> Result<(), SetLoggerError> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                Local::now().to_rfc3339(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()?;
    set_level(level);
    log::info!("Logging initialized");
    Ok(())
}

/// Changes the active level unless `RUST_LOG` is set
pub fn set_level(level: LevelFilter) {
    if std::env::var_os(env_logger::DEFAULT_FILTER_ENV).is_none() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_level_names() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level(" WARN "), LevelFilter::Warn);
        assert_eq!(parse_level("off"), LevelFilter::Off);
        assert_eq!(parse_level("chatty"), LevelFilter::Info);
    }

    #[test]
    fn level_can_change_after_setup() {
        if std::env::var_os(env_logger::DEFAULT_FILTER_ENV).is_some() {
            return;
        }
        // Another test binary may already own the logger
        let _ = setup_logging(LevelFilter::Info);

        set_level(LevelFilter::Debug);
        assert_eq!(log::max_level(), LevelFilter::Debug);
        set_level(LevelFilter::Warn);
        assert_eq!(log::max_level(), LevelFilter::Warn);
    }
}
