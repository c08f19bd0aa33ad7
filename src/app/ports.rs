//! Port traits: the hexagonal boundary between the dispatcher and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BusService (domain)
//! ```
//!
//! Driven adapters (bus transport, device list view, event sinks) implement
//! these traits.  The [`BusService`](super::service::BusService) holds them
//! as trait objects, so the domain core never touches the real bus.
//!
//! ## Threading notes
//!
//! - Every port is `Send + Sync`: the worker calls them from its own thread
//!   while UI code may hold the same adapter.
//! - Ports take `&self`.  Implementations use interior locking.
//! - Remote faults are typed as [`RemoteError`] and never panic.

use std::collections::HashMap;
use std::sync::Arc;

use crate::device::{DeviceRecord, DeviceType, RemoteHandle};
use crate::local::LocalService;
use crate::queue::CommandSender;

/// Property map returned by a peer's `getAllProperties` call.
pub type Properties = HashMap<String, String>;

/// Property key carrying a peer's human-readable name.
pub const PROP_DEVICE_NAME: &str = "DeviceName";
/// Property key carrying a peer's OS string.
pub const PROP_DEVICE_OS: &str = "DeviceOS";

// ───────────────────────────────────────────────────────────────
// Bus transport port (driven adapter: domain ↔ message bus)
// ───────────────────────────────────────────────────────────────

/// Session lifecycle and discovery plumbing of the underlying bus.
///
/// Each lifecycle command forwards to exactly one method here.  Whether a
/// failure is fatal is the transport's business; the dispatcher only logs it.
pub trait BusTransport: Send + Sync {
    fn connect(&self) -> Result<(), RemoteError>;

    fn disconnect(&self) -> Result<(), RemoteError>;

    /// Expose the local service object on the bus.
    fn register_interface(&self, service: Arc<LocalService>) -> Result<(), RemoteError>;

    fn unregister_interface(&self) -> Result<(), RemoteError>;

    /// Broadcast the local presence announcement.
    fn announce(&self) -> Result<(), RemoteError>;

    /// Start delivering discovery callbacks.
    ///
    /// The transport converts every "peer found" / "peer lost" callback
    /// into a `DeviceDiscovered` / `DeviceLost` command on `listener`.
    fn register_listeners(&self, listener: CommandSender) -> Result<(), RemoteError>;

    /// Stop delivering discovery callbacks and drop the listener.
    fn unregister_listeners(&self) -> Result<(), RemoteError>;

    /// This process's own bus name (used to ignore self-discovery).
    fn self_identity(&self) -> String;

    /// Fetch all properties of `device_type`'s interface on the peer.
    fn properties(
        &self,
        handle: &RemoteHandle,
        device_type: DeviceType,
    ) -> Result<Properties, RemoteError>;
}

// ───────────────────────────────────────────────────────────────
// Device view port (driven adapter: domain → UI list)
// ───────────────────────────────────────────────────────────────

/// Optional UI-side list of devices.  While attached, every registry
/// insertion and removal is mirrored into it.
pub trait DeviceView: Send + Sync {
    fn add(&self, record: &DeviceRecord);

    fn remove(&self, record: &DeviceRecord);

    /// Bulk-seed from the current registry snapshot.
    fn add_all(&self, records: &[DeviceRecord]);

    fn find_by_identity(&self, identity: &str) -> Option<DeviceRecord>;

    /// The row the user has highlighted, if any.
    fn selected_item(&self) -> Option<DeviceRecord>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → UI / logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (log, UI broadcast,
/// test recorder).
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// A bus-level failure on a remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{member}: {reason}")]
pub struct RemoteError {
    /// Bus member that failed (`setVolume`, `fileData`, `Connect`, ...).
    pub member: String,
    pub reason: String,
}

impl RemoteError {
    pub fn new(member: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            member: member.into(),
            reason: reason.into(),
        }
    }
}
