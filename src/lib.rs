//! IZConnect bus controller library.
//!
//! Keeps a registry of discovered peer devices, serializes every outgoing
//! action through a single-consumer command queue, streams files to peers
//! in fixed-size chunks, and fans notifications out to subscribers.
//!
//! ```text
//!   DispatcherHandle ──▶ queue ──▶ worker ──▶ BusService ──▶ BusTransport / peers
//!          │                                     │
//!          └──────────── DeviceRegistry ◀────────┘
//! ```

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod device;
pub mod error;
pub mod local;
pub mod notify;
pub mod queue;
pub mod registry;
pub mod rpc;

pub use app::commands::{Command, CommandKind};
pub use app::dispatcher::{Dispatcher, DispatcherHandle};
pub use config::ControllerConfig;
pub use device::{DeviceRecord, DeviceType, RemoteHandle};
pub use error::{Error, Result};
