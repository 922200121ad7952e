use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::bluetooth::{DEFAULT_NAME_FILTERS, DEFAULT_SCAN_DURATION_SECS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Name fragments a device must advertise to be listed. Empty lists everything.
    pub name_filters: Vec<String>,

    /// Minimum signal strength in dBm. Weaker advertisements are ignored.
    pub min_rssi: Option<i16>,

    /// How long a scan runs, in seconds. 0 scans until stopped.
    pub scan_duration_secs: u64,

    /// Report devices already connected to the adapter before scanning.
    pub include_connected: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            name_filters: DEFAULT_NAME_FILTERS.iter().map(|f| f.to_string()).collect(),
            min_rssi: None,
            scan_duration_secs: DEFAULT_SCAN_DURATION_SECS,
            include_connected: true,
        }
    }
}

impl ScannerConfig {
    pub fn scan_duration(&self) -> Option<Duration> {
        match self.scan_duration_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_scans_until_stopped() {
        let config = ScannerConfig {
            scan_duration_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.scan_duration(), None);
        assert_eq!(
            ScannerConfig::default().scan_duration(),
            Some(Duration::from_secs(DEFAULT_SCAN_DURATION_SECS))
        );
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: ScannerConfig = serde_json::from_str(r#"{ "min_rssi": -85 }"#).unwrap();
        assert_eq!(config.min_rssi, Some(-85));
        assert_eq!(config.name_filters, ScannerConfig::default().name_filters);
        assert!(config.include_connected);
    }
}
