//! Core functionality for the WitMotion sensor scanner
//! This module contains the Bluetooth discovery layer

pub mod bluetooth;

// Re-export commonly used types
pub use bluetooth::{BluetoothManager, PeripheralRecord};
