//! Outbound application events.
//!
//! The [`BusService`](super::service::BusService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log them, refresh a UI, or record
//! them in a test.

use crate::device::DeviceRecord;

/// Structured events emitted by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A file or script push ended, successfully or not.  Emitted exactly
    /// once per `FileSend` / `ScriptAdd` that reached a selected device.
    TransferFinished { name: String },

    /// A peer was inserted into the registry.
    DeviceAdded(DeviceRecord),

    /// A peer was removed from the registry.
    DeviceRemoved(DeviceRecord),

    /// The worker exited, after `Disconnect` or once every sender dropped.
    Stopped,
}
