//! Command line arguments for the scanner binary

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::config::AppConfig;
use crate::logging::parse_level;

#[derive(Debug, Parser)]
#[command(name = "wtble-scanner", version, about = "Scan for WitMotion BLE sensors")]
pub struct Cli {
    /// Directory holding scanner_config.json
    #[arg(default_value = ".")]
    pub config_dir: PathBuf,

    /// Log level (error, warn, info, debug, trace). Overrides the config file.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Level requested on the command line, if any
    pub fn requested_level(&self) -> Option<LevelFilter> {
        self.log_level.as_deref().map(parse_level)
    }

    /// The command line wins over the configured level
    pub fn effective_level(&self, config: &AppConfig) -> LevelFilter {
        self.requested_level()
            .unwrap_or_else(|| parse_level(&config.log_level))
    }
}
