use anyhow::Result;
use clap::Parser;
use log::{error, info, LevelFilter};
use tokio::sync::mpsc;

use wtble_scanner::cli::Cli;
use wtble_scanner::config::AppConfig;
use wtble_scanner::core::bluetooth::{ScanEvent, SCAN_EVENT_CHANNEL_SIZE};
use wtble_scanner::core::BluetoothManager;
use wtble_scanner::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Up before the config is read so its warnings are not lost
    if let Err(e) = logging::setup_logging(cli.requested_level().unwrap_or(LevelFilter::Info)) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    let config = AppConfig::load_config(&cli.config_dir).await?;
    logging::set_level(cli.effective_level(&config));

    info!("Starting BluetoothManager initialization.");
    let mut manager = BluetoothManager::new(config.scanner.clone()).await?;

    let (tx, mut rx) = mpsc::channel::<ScanEvent>(SCAN_EVENT_CHANNEL_SIZE);
    manager.start_scan(tx.clone()).await?;

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => error!("Failed to serialize scan event: {}", e),
                }
                if event == ScanEvent::ScanComplete {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping scan.");
                break;
            }
        }
    }

    // stop_scan waits for the task, which may still be emitting into the channel
    let drain = tokio::spawn(async move { while rx.recv().await.is_some() {} });
    manager.stop_scan(&tx).await?;
    drop(tx);
    let _ = drain.await;

    let devices = manager.discovered_devices().await;
    info!("Scan finished, {} sensor(s) found", devices.len());
    for device in devices {
        info!(
            "  {} ({}) RSSI: {} dBm, Address: {}",
            device.name.as_deref().unwrap_or("Unknown"),
            device.id,
            device.rssi,
            device.address
        );
    }
    Ok(())
}
