//! IZConnect controller: simulated session entry point
//!
//! Runs one full session against the in-process [`SimBus`]:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                      │
//! │                                                               │
//! │  SimBus            DeviceList          LogEventSink           │
//! │  (BusTransport)    (DeviceView)        (EventSink)            │
//! │                                                               │
//! │  ──────────────── Port Trait Boundary ───────────────────     │
//! │                                                               │
//! │  ┌─────────────────────────────────────────────────────────┐  │
//! │  │  Dispatcher worker ─▶ BusService (pure routing logic)   │  │
//! │  │  registry · subscribers · chunked transfer · fan-out    │  │
//! │  └─────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `izconnect [--config <file.json>] [--send <file>]`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use izconnect::adapters::device_list::DeviceList;
use izconnect::adapters::log_sink::LogEventSink;
use izconnect::adapters::sim_bus::{SimBus, SimPeer};
use izconnect::app::ports::DeviceView;
use izconnect::{Command, ControllerConfig, DeviceType, Dispatcher};

/// Simulated IZConnect controller session
#[derive(Parser, Debug)]
#[command(name = "izconnect")]
#[command(version)]
#[command(about = "Drive a simulated IZConnect bus session")]
struct Args {
    /// JSON controller configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// File to push to the selected PC during the session
    #[arg(long)]
    send: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  IZConnect controller v{}         ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ControllerConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ControllerConfig::default(),
    };
    info!(
        "Config: name={:?} os={:?} chunk={}B",
        config.device_name, config.device_os, config.chunk_size
    );

    // ── Adapters ──────────────────────────────────────────────
    let bus = SimBus::new(":1.0");
    let list = Arc::new(DeviceList::new());
    let dispatcher = Dispatcher::spawn(config, bus.clone(), Arc::new(LogEventSink::new()))?;
    let handle = dispatcher.handle();

    // ── Session ───────────────────────────────────────────────
    handle.attach_view(list.clone())?;
    handle.start_session()?;

    let desk = Arc::new(SimPeer::new(":1.7", "Desk PC", "Windows"));
    let board = Arc::new(SimPeer::new(":1.9", "Kitchen board", "RIOT"));
    bus.appear(DeviceType::Pc, desk.clone());
    bus.appear(DeviceType::Board, board.clone());
    handle.barrier()?;
    info!("Devices: {} in list", list.len());

    // Peers opt in to notifications through the exposed local service.
    if let Some(local) = bus.local_service() {
        local.subscribe(":1.7");
    }

    // ── Drive the PC ──────────────────────────────────────────
    list.highlight(":1.7");
    if !handle.select_from_view(list.as_ref()) {
        warn!("Select: {:?} not in registry", list.selected_item());
    }
    handle.enqueue(Command::SetVolume(40))?;
    handle.enqueue(Command::MediaPlayPause)?;
    handle.enqueue(Command::MouseMove { dx: 12, dy: -4 })?;
    if let Some(path) = &args.send {
        handle.send_file(path)?;
    }
    handle.notify_subscribers("IZConnect: session running")?;

    // ── Drive the board ───────────────────────────────────────
    handle.select(":1.9");
    handle.enqueue(Command::SetLight(true))?;
    handle.enqueue(Command::SetVolume(10))?; // not a board member; dropped

    handle.shutdown()?;
    dispatcher.join()?;

    info!("Desk PC saw {} call(s): {:?}", desk.calls().len(), desk.calls());
    info!("Board saw {} call(s): {:?}", board.calls().len(), board.calls());
    for f in desk.files() {
        info!("Desk PC received {} ({} bytes)", f.name, f.bytes.len());
    }
    Ok(())
}
