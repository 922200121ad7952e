//! Bluetooth functionality for the WitMotion sensor scanner
//! This module handles discovering sensors and keeping one immutable
//! record per advertisement observed.

mod adapter;
mod constants;
mod device;
mod events;
mod filter;
mod manager;
mod peripheral;
mod registry;
mod scanner;
mod types;

// Re-export types that should be publicly accessible
pub use adapter::ScanAdapter;
pub use constants::*; // Re-export all constants
pub use device::{extract_mac_address, DiscoveredDevice};
pub use events::{ScanEvent, ScanEventSink};
pub use filter::DeviceFilter;
pub use manager::BluetoothManager;
pub use peripheral::{PeripheralHandle, PeripheralRecord, RecordError};
pub use registry::{Observed, ScanResults};
pub use scanner::{process_observations, BluetoothScanner, Observation};
pub use types::{AdvertisementData, AdvertisementValue, ManufacturerData};
