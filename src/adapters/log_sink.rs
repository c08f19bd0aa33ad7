//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured dispatcher events to
//! the `log` facade (stderr via `env_logger` in the binary).
//! A UI adapter would implement the same trait.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: &AppEvent) {
        match event {
            AppEvent::TransferFinished { name } => {
                info!("XFER  | finished {}", name);
            }
            AppEvent::DeviceAdded(r) => {
                info!(
                    "DEVICE | + {} type={} name={:?} os={:?}",
                    r.identity, r.device_type, r.device_name, r.device_os
                );
            }
            AppEvent::DeviceRemoved(r) => {
                info!("DEVICE | - {} type={}", r.identity, r.device_type);
            }
            AppEvent::Stopped => {
                info!("STOP  | dispatcher stopped");
            }
        }
    }
}
