//! Decides which observations are kept as scan results

use crate::config::scanner_config::ScannerConfig;

/// Name and signal strength filter applied to every advertisement
#[derive(Debug, Clone, Default)]
pub struct DeviceFilter {
    /// Name fragments, matched case-insensitively. Empty accepts everything.
    name_filters: Vec<String>,
    /// Minimum accepted signal strength in dBm
    min_rssi: Option<i16>,
}

impl DeviceFilter {
    pub fn new(name_filters: Vec<String>, min_rssi: Option<i16>) -> Self {
        Self {
            name_filters: name_filters.into_iter().map(|f| f.to_uppercase()).collect(),
            min_rssi,
        }
    }

    pub fn from_config(config: &ScannerConfig) -> Self {
        Self::new(config.name_filters.clone(), config.min_rssi)
    }

    /// Returns true if the name contains any of the configured fragments
    pub fn matches_name(&self, name: Option<&str>) -> bool {
        if self.name_filters.is_empty() {
            return true;
        }
        match name {
            Some(name) if !name.trim().is_empty() => {
                let normalized = name.to_uppercase();
                self.name_filters.iter().any(|f| normalized.contains(f.as_str()))
            }
            _ => false,
        }
    }

    /// Returns the reading if it passes the threshold. A missing reading never passes.
    pub fn accepts_rssi(&self, rssi: Option<i16>) -> Option<i16> {
        let rssi = rssi?;
        match self.min_rssi {
            Some(min) if rssi < min => None,
            _ => Some(rssi),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wit_filter() -> DeviceFilter {
        DeviceFilter::from_config(&ScannerConfig::default())
    }

    #[test]
    fn matches_witmotion_names_case_insensitively() {
        let filter = wit_filter();
        assert!(filter.matches_name(Some("WT901BLE68")));
        assert!(filter.matches_name(Some("bwt901blecl")));
        assert!(filter.matches_name(Some("My Wit sensor")));
        assert!(!filter.matches_name(Some("Gear VR Controller")));
    }

    #[test]
    fn blank_or_missing_names_never_match() {
        let filter = wit_filter();
        assert!(!filter.matches_name(None));
        assert!(!filter.matches_name(Some("   ")));
    }

    #[test]
    fn empty_filter_accepts_everything() {
        let filter = DeviceFilter::new(Vec::new(), None);
        assert!(filter.matches_name(None));
        assert!(filter.matches_name(Some("anything")));
    }

    #[test]
    fn rssi_threshold() {
        let filter = DeviceFilter::new(Vec::new(), Some(-80));
        assert_eq!(filter.accepts_rssi(Some(-80)), Some(-80));
        assert_eq!(filter.accepts_rssi(Some(-81)), None);
        assert_eq!(filter.accepts_rssi(None), None);

        let unbounded = DeviceFilter::new(Vec::new(), None);
        assert_eq!(unbounded.accepts_rssi(Some(5)), Some(5));
        assert_eq!(unbounded.accepts_rssi(None), None);
    }
}
