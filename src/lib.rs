//! WitMotion BLE sensor scanner library
//! Discovers WT901BLE family motion sensors and keeps an immutable record
//! of the peripheral handle, advertisement payload and signal strength
//! seen at each scan event.

pub mod cli;
pub mod config;
pub mod core;
pub mod logging;
pub mod utils;
