//! Discovered peer devices and the opaque handles that reach them.
//!
//! A [`DeviceRecord`] is created once per discovery event and never mutated;
//! loss followed by rediscovery produces a fresh record.  The record is keyed
//! by its bus `identity` (the unique bus name of the peer).
//!
//! A [`RemoteHandle`] wraps the transport's proxy object for one peer.  Two
//! handles are "the same" only when they wrap the same proxy allocation.
//! Value equality of whatever the proxy points at is never consulted.

use core::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::rpc::capability::ProxyObject;

// ───────────────────────────────────────────────────────────────
// DeviceType
// ───────────────────────────────────────────────────────────────

/// Closed set of peer kinds announced on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    /// Microcontroller board (light + auto mode + scripts).
    Board,
    /// Phone or tablet agent.
    Mobile,
    /// Desktop agent (media, pointer, keyboard, slideshow, files).
    Pc,
}

impl DeviceType {
    /// Map the numeric id carried in a bus announcement.
    ///
    /// `0 = Board`, `1 = Mobile`, `2 = PC`.  Anything else is unknown.
    pub const fn from_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(Self::Board),
            1 => Some(Self::Mobile),
            2 => Some(Self::Pc),
            _ => None,
        }
    }

    /// Inverse of [`from_id`](Self::from_id).
    pub const fn id(self) -> i32 {
        match self {
            Self::Board => 0,
            Self::Mobile => 1,
            Self::Pc => 2,
        }
    }

    /// Bus interface name of this device type's capability contract.
    pub const fn interface_name(self) -> &'static str {
        match self {
            Self::Board => "org.taom.izconnect.network.interfaces.BoardInterface",
            Self::Mobile => "org.taom.izconnect.network.interfaces.MobileInterface",
            Self::Pc => "org.taom.izconnect.network.interfaces.PCInterface",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Board => write!(f, "Board"),
            Self::Mobile => write!(f, "Mobile"),
            Self::Pc => write!(f, "PC"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// DeviceRecord
// ───────────────────────────────────────────────────────────────

/// One discovered peer as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Unique bus name; the natural key.
    pub identity: String,
    pub device_type: DeviceType,
    pub device_name: String,
    pub device_os: String,
}

impl DeviceRecord {
    pub fn new(
        identity: impl Into<String>,
        device_type: DeviceType,
        device_name: impl Into<String>,
        device_os: impl Into<String>,
    ) -> Self {
        Self {
            identity: identity.into(),
            device_type,
            device_name: device_name.into(),
            device_os: device_os.into(),
        }
    }
}

impl fmt::Display for DeviceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{} {} / {}]",
            self.identity, self.device_type, self.device_name, self.device_os
        )
    }
}

// ───────────────────────────────────────────────────────────────
// RemoteHandle
// ───────────────────────────────────────────────────────────────

/// Shared, opaque reference to a peer's remote-callable proxy.
#[derive(Clone)]
pub struct RemoteHandle(Arc<dyn ProxyObject>);

impl RemoteHandle {
    pub fn new(proxy: Arc<dyn ProxyObject>) -> Self {
        Self(proxy)
    }

    /// Bus name of the peer behind this proxy.
    pub fn bus_name(&self) -> &str {
        self.0.bus_name()
    }

    pub fn proxy(&self) -> &dyn ProxyObject {
        self.0.as_ref()
    }

    /// Identity comparison: `true` only if both wrap the same proxy object.
    pub fn same_as(&self, other: &Self) -> bool {
        core::ptr::eq(
            Arc::as_ptr(&self.0).cast::<()>(),
            Arc::as_ptr(&other.0).cast::<()>(),
        )
    }
}

impl fmt::Debug for RemoteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteHandle")
            .field("bus_name", &self.bus_name())
            .field("proxy", &Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}
