//! Serialized command dispatcher: one worker thread, one FIFO queue.
//!
//! ```text
//!  UI thread ─┐                                    ┌──▶ BusTransport
//!  discovery ─┼─▶ CommandSender ──▶ [ queue ] ──▶ worker ──▶ BusService ──▶ peers
//!  local svc ─┘        (any thread)            (one thread)  └──▶ EventSink
//! ```
//!
//! Commands run strictly one at a time in submission order.  The worker
//! exits after handling `Disconnect`; anything still queued at that point
//! is drained and logged, and later submissions get `QueueClosed`.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{info, warn};
use tokio::sync::oneshot;

use crate::config::ControllerConfig;
use crate::device::DeviceRecord;
use crate::error::{Error, Result};
use crate::notify::SubscriberSet;
use crate::queue::{self, CommandQueue, CommandSender};
use crate::registry::DeviceRegistry;

use super::commands::Command;
use super::ports::{BusTransport, DeviceView, EventSink};
use super::service::{BusService, Flow};

/// Session start-up, in order.
fn start_sequence() -> [Command; 4] {
    [
        Command::Connect,
        Command::RegisterInterface,
        Command::Announce,
        Command::RegisterListeners,
    ]
}

/// Session tear-down, in order.  `Disconnect` stops the worker.
fn shutdown_sequence() -> [Command; 3] {
    [
        Command::UnregisterListeners,
        Command::UnregisterInterface,
        Command::Disconnect,
    ]
}

// ───────────────────────────────────────────────────────────────
// Dispatcher (owns the worker)
// ───────────────────────────────────────────────────────────────

pub struct Dispatcher {
    handle: DispatcherHandle,
    worker: JoinHandle<()>,
}

impl Dispatcher {
    /// Validate `config`, build the service, and start the worker thread.
    pub fn spawn(
        config: ControllerConfig,
        transport: Arc<dyn BusTransport>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        config.validate()?;

        let registry = Arc::new(DeviceRegistry::new());
        let subscribers = Arc::new(SubscriberSet::new());
        let (sender, queue) = queue::channel();

        let service = BusService::new(
            config.clone(),
            transport,
            sink,
            Arc::clone(&registry),
            Arc::clone(&subscribers),
            sender.downgrade(),
        );

        let worker = thread::Builder::new()
            .name(config.worker_name.clone())
            .spawn(move || run(service, queue))
            .map_err(Error::Spawn)?;

        info!("Dispatch: worker '{}' started", config.worker_name);

        Ok(Self {
            handle: DispatcherHandle {
                sender,
                registry,
                subscribers,
            },
            worker,
        })
    }

    /// A cloneable submission handle.
    pub fn handle(&self) -> DispatcherHandle {
        self.handle.clone()
    }

    /// Wait for the worker to exit (after `Disconnect`, or once every
    /// handle has been dropped).
    pub fn join(self) -> Result<()> {
        let Self { handle, worker } = self;
        drop(handle);
        worker.join().map_err(|_| Error::WorkerPanicked)
    }
}

/// Worker body.
fn run(mut service: BusService, mut queue: CommandQueue) {
    while let Some(cmd) = queue.next_blocking() {
        if service.handle_command(cmd) == Flow::Stop {
            break;
        }
    }
    for cmd in queue.close_and_drain() {
        warn!("Dispatch: dropping {:?} queued after disconnect", cmd);
    }
    service.stopped();
}

// ───────────────────────────────────────────────────────────────
// DispatcherHandle (what UI and callbacks hold)
// ───────────────────────────────────────────────────────────────

/// Submission side of the dispatcher plus read access to shared state.
#[derive(Clone)]
pub struct DispatcherHandle {
    sender: CommandSender,
    registry: Arc<DeviceRegistry>,
    subscribers: Arc<SubscriberSet>,
}

impl DispatcherHandle {
    /// Append `command` to the queue.  Never blocks.
    pub fn enqueue(&self, command: Command) -> Result<()> {
        self.sender.enqueue(command)
    }

    /// Connect, RegisterInterface, Announce, RegisterListeners.
    pub fn start_session(&self) -> Result<()> {
        start_sequence()
            .into_iter()
            .try_for_each(|cmd| self.enqueue(cmd))
    }

    /// UnregisterListeners, UnregisterInterface, Disconnect.
    pub fn shutdown(&self) -> Result<()> {
        shutdown_sequence()
            .into_iter()
            .try_for_each(|cmd| self.enqueue(cmd))
    }

    pub fn notify_subscribers(&self, message: impl Into<String>) -> Result<()> {
        self.enqueue(Command::NotifySubscribers(message.into()))
    }

    pub fn send_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.enqueue(Command::FileSend(path.into()))
    }

    pub fn add_script(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.enqueue(Command::ScriptAdd(path.into()))
    }

    /// Mirror the registry into `view` from now on.
    pub fn attach_view(&self, view: Arc<dyn DeviceView>) -> Result<()> {
        self.enqueue(Command::AttachView(view))
    }

    pub fn detach_view(&self) -> Result<()> {
        self.enqueue(Command::DetachView)
    }

    /// Block until every command enqueued before this call was handled.
    pub fn barrier(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.enqueue(Command::Barrier(tx))?;
        rx.blocking_recv().map_err(|_| Error::QueueClosed)
    }

    /// The sender the transport should feed discovery callbacks into.
    pub fn sender(&self) -> &CommandSender {
        &self.sender
    }

    // ── Selection ─────────────────────────────────────────────

    /// Select the registry entry with `identity`.  `false` if absent.
    pub fn select(&self, identity: &str) -> bool {
        self.registry
            .find_by_identity(identity)
            .is_some_and(|record| self.registry.set_selected(&record))
    }

    /// Select whatever row `view` has highlighted.
    pub fn select_from_view(&self, view: &dyn DeviceView) -> bool {
        view.selected_item()
            .is_some_and(|record| self.registry.set_selected(&record))
    }

    pub fn clear_selection(&self) {
        self.registry.clear_selection();
    }

    pub fn selected(&self) -> Option<DeviceRecord> {
        self.registry.selected().map(|(record, _)| record)
    }

    // ── Shared state ──────────────────────────────────────────

    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    pub fn subscribers(&self) -> &Arc<SubscriberSet> {
        &self.subscribers
    }
}
