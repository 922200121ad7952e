//! Source of advertisements for the scanner
//! The scanner only talks to the Bluetooth stack through `ScanAdapter`.

use std::sync::Arc;

use anyhow::Result;
use bluest::{Adapter, Device};
use futures_util::stream::BoxStream;
use futures_util::StreamExt;

use crate::core::bluetooth::peripheral::PeripheralHandle;
use crate::core::bluetooth::scanner::Observation;
use crate::core::bluetooth::types::AdvertisementData;

/// Adapter operations needed by `BluetoothScanner`
#[async_trait::async_trait]
pub trait ScanAdapter: Clone + Send + Sync + 'static {
    type Handle: PeripheralHandle;

    /// Devices already connected to the adapter
    async fn connected_observations(&self) -> Result<Vec<Observation<Self::Handle>>>;

    /// Advertisements received from now on
    async fn scan_observations<'a>(&'a self) -> Result<BoxStream<'a, Observation<Self::Handle>>>;
}

#[async_trait::async_trait]
impl ScanAdapter for Adapter {
    type Handle = Device;

    async fn connected_observations(&self) -> Result<Vec<Observation<Device>>> {
        let mut connected = Vec::new();
        for device in Adapter::connected_devices(self).await? {
            // Not supported on every platform
            let rssi = device.rssi().await.ok();
            let advertisement = AdvertisementData {
                local_name: device.name().ok(),
                ..Default::default()
            };
            connected.push(Observation::connected(Arc::new(device), advertisement, rssi));
        }
        Ok(connected)
    }

    async fn scan_observations<'a>(&'a self) -> Result<BoxStream<'a, Observation<Device>>> {
        let scan_stream = Adapter::scan(self, &[]).await?;
        Ok(scan_stream
            .map(|discovered| {
                Observation::new(
                    Arc::new(discovered.device),
                    AdvertisementData::from(discovered.adv_data),
                    discovered.rssi,
                )
            })
            .boxed())
    }
}
