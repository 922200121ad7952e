//! Scan lifecycle events and the sinks that receive them

use anyhow::{anyhow, Result};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::core::bluetooth::device::DiscoveredDevice;

/// Events emitted while scanning
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "device", rename_all = "kebab-case")]
pub enum ScanEvent {
    #[serde(rename = "scan-start")]
    ScanStarted,
    DeviceFound(DiscoveredDevice),
    #[serde(rename = "update-device")]
    DeviceUpdated(DiscoveredDevice),
    ScanComplete,
    #[serde(rename = "stop-scan-complete")]
    ScanStopped,
}

/// Receives scan events
#[async_trait::async_trait]
pub trait ScanEventSink: Send + Sync {
    /// Deliver an event to the consumer
    async fn emit(&self, event: ScanEvent) -> Result<()>;
}

#[async_trait::async_trait]
impl ScanEventSink for mpsc::Sender<ScanEvent> {
    async fn emit(&self, event: ScanEvent) -> Result<()> {
        self.send(event)
            .await
            .map_err(|e| anyhow!("Scan event receiver dropped: {}", e))
    }
}
