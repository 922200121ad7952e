//! Serialisable summary of a discovered peripheral

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use uuid::Uuid;

use crate::core::bluetooth::constants::UNKNOWN_ADDRESS;
use crate::core::bluetooth::peripheral::{PeripheralHandle, PeripheralRecord};

static MAC_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9A-Fa-f]{2}[:-]){5}([0-9A-Fa-f]{2})").expect("MAC address pattern is valid")
});

/// Represents a discovered Bluetooth device
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DiscoveredDevice {
    /// Platform-specific unique identifier for the device (especially important on macOS)
    pub id: String,
    /// The name of the device, if available
    pub name: Option<String>,
    /// The address of the device (MAC address on most platforms, N/A on macOS)
    pub address: String,
    /// The signal strength (RSSI) of the device
    pub rssi: i16,
    /// Advertised transmit power, if any
    pub tx_power_level: Option<i16>,
    pub is_connectable: bool,
    /// Advertised service UUIDs
    pub services: Vec<Uuid>,
    /// When the advertisement was observed (RFC 3339)
    pub last_seen: String,
}

impl DiscoveredDevice {
    pub fn from_record<H: PeripheralHandle>(record: &PeripheralRecord<H>, seen_at: DateTime<Utc>) -> Self {
        let id = record.id();
        let address = extract_mac_address(&id).unwrap_or_else(|| UNKNOWN_ADDRESS.to_string());
        let advertisement = record.advertisement();
        Self {
            name: record.name(),
            address,
            rssi: record.rssi(),
            tx_power_level: advertisement.tx_power_level,
            is_connectable: advertisement.is_connectable,
            services: advertisement.service_uuids.clone(),
            last_seen: seen_at.to_rfc3339(),
            id,
        }
    }
}

/// Pulls the last MAC-looking token out of a platform device id
pub fn extract_mac_address(device_id: &str) -> Option<String> {
    MAC_ADDRESS
        .find_iter(device_id)
        .last()
        .map(|m| m.as_str().to_uppercase())
}
