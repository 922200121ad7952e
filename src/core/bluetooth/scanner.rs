use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use bluest::Adapter;
use futures_util::{stream, Stream, StreamExt};
use log::{debug, error, info};
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::core::bluetooth::adapter::ScanAdapter;
use crate::core::bluetooth::constants::CONNECTED_FALLBACK_RSSI;
use crate::core::bluetooth::events::{ScanEvent, ScanEventSink};
use crate::core::bluetooth::filter::DeviceFilter;
use crate::core::bluetooth::peripheral::{PeripheralHandle, PeripheralRecord};
use crate::core::bluetooth::registry::{Observed, ScanResults};
use crate::core::bluetooth::types::AdvertisementData;

/// Raw values delivered by the Bluetooth stack for one advertisement
pub struct Observation<H> {
    pub handle: Arc<H>,
    pub advertisement: AdvertisementData,
    pub rssi: Option<i16>,
    /// Reported as already connected rather than advertising
    pub connected: bool,
}

impl<H> Observation<H> {
    pub fn new(handle: Arc<H>, advertisement: AdvertisementData, rssi: Option<i16>) -> Self {
        Self {
            handle,
            advertisement,
            rssi,
            connected: false,
        }
    }

    /// A device the adapter is already connected to. These skip the signal
    /// threshold and fall back to `CONNECTED_FALLBACK_RSSI` without a reading.
    pub fn connected(handle: Arc<H>, advertisement: AdvertisementData, rssi: Option<i16>) -> Self {
        Self {
            connected: true,
            ..Self::new(handle, advertisement, rssi)
        }
    }
}

pub struct BluetoothScanner<A: ScanAdapter = Adapter> {
    adapter: A,
    results: Arc<Mutex<ScanResults<A::Handle>>>,
    filter: DeviceFilter,
    scan_duration: Option<Duration>,
    include_connected: bool,
    cancel_token: CancellationToken,
    scan_task_handle: Option<JoinHandle<Result<()>>>,
}

impl<A: ScanAdapter> BluetoothScanner<A> {
    pub fn new(
        adapter: A,
        results: Arc<Mutex<ScanResults<A::Handle>>>,
        filter: DeviceFilter,
        scan_duration: Option<Duration>,
        include_connected: bool,
    ) -> Self {
        Self {
            adapter,
            results,
            filter,
            scan_duration,
            include_connected,
            cancel_token: CancellationToken::new(),
            scan_task_handle: None,
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.scan_task_handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub async fn start_scan<E>(&mut self, sink: E) -> Result<()>
    where
        E: ScanEventSink + Clone + 'static,
    {
        match self.scan_task_handle.take() {
            Some(handle) if handle.is_finished() => Self::log_task_outcome(handle.await),
            Some(handle) => {
                self.scan_task_handle = Some(handle);
                self.stop_scan(&sink).await?;
            }
            None => {}
        }
        // Each scan session starts from an empty list
        self.results.lock().await.clear();

        self.cancel_token = CancellationToken::new();
        let cancel_token_for_task = self.cancel_token.clone();

        let adapter_for_task = self.adapter.clone();
        let results_for_task = self.results.clone();
        let filter_for_task = self.filter.clone();
        let sink_for_task = sink.clone();
        let scan_duration = self.scan_duration;
        let include_connected = self.include_connected;

        // Must reach the sink before anything the task emits
        if let Err(e) = sink.emit(ScanEvent::ScanStarted).await {
            error!("Failed to emit scan-start event: {}", e);
        }

        let handle = tokio::spawn(async move {
            let result = Self::internal_scan_task(
                adapter_for_task,
                results_for_task,
                filter_for_task,
                &sink_for_task,
                cancel_token_for_task,
                scan_duration,
                include_connected,
            )
            .await;
            if let Err(e) = sink_for_task.emit(ScanEvent::ScanComplete).await {
                error!("Failed to emit scan-complete event: {}", e);
            }
            result
        });

        self.scan_task_handle = Some(handle);
        info!("Device scan task started.");
        Ok(())
    }

    /// Reports connected devices, then scans for advertising ones
    async fn internal_scan_task<E: ScanEventSink>(
        adapter: A,
        results: Arc<Mutex<ScanResults<A::Handle>>>,
        filter: DeviceFilter,
        sink: &E,
        cancel_token: CancellationToken,
        scan_duration: Option<Duration>,
        include_connected: bool,
    ) -> Result<()> {
        let connected = if include_connected {
            info!("Checking for connected devices");
            let connected = adapter.connected_observations().await?;
            info!("{} connected device(s) reported by the adapter", connected.len());
            connected
        } else {
            Vec::new()
        };

        info!("Starting bluetooth scan");
        let scan_stream = adapter.scan_observations().await?;

        let stored = process_observations(
            stream::iter(connected).chain(scan_stream),
            &results,
            &filter,
            sink,
            &cancel_token,
            scan_duration,
        )
        .await?;
        info!("Bluetooth scan finished with {} record(s) stored", stored);
        Ok(())
    }

    pub async fn stop_scan<E: ScanEventSink>(&mut self, sink: &E) -> Result<()> {
        info!("Stopping Bluetooth scan.");
        self.cancel_token.cancel();

        if let Some(handle) = self.scan_task_handle.take() {
            info!("Waiting for scan task to finish...");
            Self::log_task_outcome(handle.await);
        } else {
            info!("No active scan task handle found to wait for.");
        }

        if let Err(e) = sink.emit(ScanEvent::ScanStopped).await {
            error!("Failed to emit stop-scan-complete event: {}", e);
        }
        Ok(())
    }

    fn log_task_outcome(outcome: std::result::Result<Result<()>, JoinError>) {
        match outcome {
            Ok(Ok(_)) => info!("Scan task finished successfully."),
            Ok(Err(e)) => error!("Scan task finished with an error: {:?}", e),
            Err(e) if e.is_cancelled() => info!("Scan task was cancelled successfully."),
            Err(e) => error!("Scan task finished with an unexpected join error: {:?}", e),
        }
    }
}

/// Turns observations into records until the stream ends, the scan
/// duration elapses or the token is cancelled. Returns how many
/// observations were stored.
pub async fn process_observations<H, S, E>(
    mut observations: S,
    results: &Mutex<ScanResults<H>>,
    filter: &DeviceFilter,
    sink: &E,
    cancel_token: &CancellationToken,
    scan_duration: Option<Duration>,
) -> Result<usize>
where
    H: PeripheralHandle,
    S: Stream<Item = Observation<H>> + Unpin,
    E: ScanEventSink,
{
    let deadline = async {
        match scan_duration {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    let mut stored = 0;
    loop {
        tokio::select! {
            next = observations.next() => {
                let Some(observation) = next else {
                    info!("Bluetooth scan stream has ended.");
                    break;
                };
                if let Some(event) = accept(observation, results, filter).await {
                    stored += 1;
                    if let Err(e) = sink.emit(event).await {
                        error!("Failed to emit device event: {}", e);
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                info!("Bluetooth scan cancelled.");
                break;
            }
            _ = &mut deadline => {
                info!("Bluetooth scan duration elapsed.");
                break;
            }
        }
    }
    Ok(stored)
}

/// Builds and stores a record if the observation passes the filter
async fn accept<H: PeripheralHandle>(
    observation: Observation<H>,
    results: &Mutex<ScanResults<H>>,
    filter: &DeviceFilter,
) -> Option<ScanEvent> {
    let Observation {
        handle,
        advertisement,
        rssi,
        connected,
    } = observation;

    let id = handle.identifier();
    let name = advertisement.local_name.clone().or_else(|| handle.name());
    debug!("Found device - ID: {}, Name: {:?}, RSSI: {:?}, Connected: {}", id, name, rssi, connected);

    if !filter.matches_name(name.as_deref()) {
        debug!("Skip device {:?} - name does not match filter", name);
        return None;
    }
    let accepted_rssi = if connected {
        Some(rssi.unwrap_or(CONNECTED_FALLBACK_RSSI))
    } else {
        filter.accepts_rssi(rssi)
    };
    let Some(rssi) = accepted_rssi else {
        debug!("Skip device {:?} - signal {:?} below threshold or missing", name, rssi);
        return None;
    };

    let record = PeripheralRecord::new(handle, advertisement, rssi);
    let mut results = results.lock().await;
    let observed = results.observe(record);
    let device = results.device(&id)?;
    drop(results);

    match observed {
        Observed::New => {
            info!("Found sensor: Address: {}, ID: {}, Name: {:?}, RSSI: {}",
                device.address, device.id, device.name, device.rssi);
            Some(ScanEvent::DeviceFound(device))
        }
        Observed::Replaced => {
            debug!("Updated sensor {} with RSSI {}", device.id, device.rssi);
            Some(ScanEvent::DeviceUpdated(device))
        }
    }
}
