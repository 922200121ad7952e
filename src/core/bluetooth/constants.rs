//! Constants used throughout the scanner
//! This module contains the default name filters, advertisement keys
//! and timing values used when discovering sensors.

/// Name fragments advertised by WitMotion BLE sensors (WT901BLECL, BWT901BLE, ...)
pub const DEFAULT_NAME_FILTERS: [&str; 5] = ["WT", "BWT", "WT901", "WIT", "BLECL"];

/// Well-known advertisement keys recognised by `AdvertisementData::from_entries`
pub const KEY_LOCAL_NAME: &str = "local_name";
pub const KEY_SERVICE_UUIDS: &str = "service_uuids";
pub const KEY_MANUFACTURER_DATA: &str = "manufacturer_data";
pub const KEY_TX_POWER_LEVEL: &str = "tx_power_level";
pub const KEY_IS_CONNECTABLE: &str = "is_connectable";

/// Scan duration in seconds
pub const DEFAULT_SCAN_DURATION_SECS: u64 = 5;

/// Capacity of the scan event channel used by the CLI
pub const SCAN_EVENT_CHANNEL_SIZE: usize = 32;

/// Placeholder shown when no MAC address can be derived from the device id
pub const UNKNOWN_ADDRESS: &str = "N/A";

/// Reading used for connected devices when the stack cannot report one
pub const CONNECTED_FALLBACK_RSSI: i16 = 0;
