//! Bluetooth manager for the WitMotion sensor scanner
//! This module provides the main interface for bluetooth operations

use std::sync::Arc;

use anyhow::{anyhow, Result};
use bluest::{Adapter, Device};
use log::info;
use tokio::sync::Mutex;

use crate::config::scanner_config::ScannerConfig;
use crate::core::bluetooth::device::DiscoveredDevice;
use crate::core::bluetooth::events::ScanEventSink;
use crate::core::bluetooth::filter::DeviceFilter;
use crate::core::bluetooth::peripheral::PeripheralRecord;
use crate::core::bluetooth::registry::ScanResults;
use crate::core::bluetooth::scanner::BluetoothScanner;

/// Manages Bluetooth operations
pub struct BluetoothManager {
    /// Latest record per discovered peripheral
    results: Arc<Mutex<ScanResults<Device>>>,
    /// Bluetooth scanner
    scanner: BluetoothScanner,
}

impl BluetoothManager {
    /// Creates a new BluetoothManager on the default adapter
    pub async fn new(config: ScannerConfig) -> Result<Self> {
        let adapter = Adapter::default()
            .await
            .ok_or_else(|| anyhow!("No Bluetooth adapter found"))?;
        adapter.wait_available().await?;
        info!("Bluetooth adapter is available.");

        let results = Arc::new(Mutex::new(ScanResults::new()));
        let scanner = BluetoothScanner::new(
            adapter,
            results.clone(),
            DeviceFilter::from_config(&config),
            config.scan_duration(),
            config.include_connected,
        );

        Ok(Self { results, scanner })
    }

    /// Scans for sensors, reporting progress to the sink
    pub async fn start_scan<E>(&mut self, sink: E) -> Result<()>
    where
        E: ScanEventSink + Clone + 'static,
    {
        self.scanner.start_scan(sink).await
    }

    pub async fn stop_scan<E: ScanEventSink>(&mut self, sink: &E) -> Result<()> {
        self.scanner.stop_scan(sink).await
    }

    pub fn is_scanning(&self) -> bool {
        self.scanner.is_scanning()
    }

    /// Summaries of every sensor found by the current scan, strongest first
    pub async fn discovered_devices(&self) -> Vec<DiscoveredDevice> {
        self.results.lock().await.devices()
    }

    /// The latest record for a device; its handle can be used to connect
    pub async fn peripheral(&self, device_id: &str) -> Result<PeripheralRecord<Device>> {
        self.results
            .lock()
            .await
            .get(device_id)
            .ok_or_else(|| anyhow!("Device not found with ID: {}", device_id))
    }
}
