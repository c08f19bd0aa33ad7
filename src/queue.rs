//! Unbounded FIFO command queue feeding the dispatcher worker.
//!
//! Any thread may enqueue through a [`CommandSender`]; exactly one worker
//! drains the [`CommandQueue`].  The queue is a `tokio` unbounded MPSC
//! channel, consumed with `blocking_recv` on a plain OS thread (no async
//! runtime is involved).
//!
//! Once the worker closes the queue (after `Disconnect`), every further
//! enqueue fails with [`Error::QueueClosed`].

use log::warn;
use tokio::sync::mpsc;

use crate::app::commands::Command;
use crate::device::{DeviceType, RemoteHandle};
use crate::error::{Error, Result};

/// Create a connected sender / queue pair.
pub fn channel() -> (CommandSender, CommandQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CommandSender { tx }, CommandQueue { rx })
}

// ───────────────────────────────────────────────────────────────
// Producer side
// ───────────────────────────────────────────────────────────────

/// Cloneable producer handle.  Enqueueing never blocks.
#[derive(Clone, Debug)]
pub struct CommandSender {
    tx: mpsc::UnboundedSender<Command>,
}

impl CommandSender {
    pub fn enqueue(&self, command: Command) -> Result<()> {
        self.tx.send(command).map_err(|rejected| {
            warn!(
                "Queue: closed, rejecting {:?}",
                rejected.0.kind()
            );
            Error::QueueClosed
        })
    }

    /// Discovery callback edge: the bus reports a peer announcing
    /// device type `type_id`.  Unknown ids are dropped here.
    pub fn device_discovered(&self, type_id: i32, handle: RemoteHandle) -> Result<()> {
        match DeviceType::from_id(type_id) {
            Some(device_type) => self.enqueue(Command::DeviceDiscovered {
                device_type,
                handle,
            }),
            None => {
                warn!(
                    "Queue: ignoring {} with unknown device type id {}",
                    handle.bus_name(),
                    type_id
                );
                Ok(())
            }
        }
    }

    /// Discovery callback edge: the bus reports a peer gone.
    pub fn device_lost(&self, handle: RemoteHandle) -> Result<()> {
        self.enqueue(Command::DeviceLost { handle })
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// A sender that does not keep the queue alive.
    pub fn downgrade(&self) -> WeakCommandSender {
        WeakCommandSender {
            tx: self.tx.downgrade(),
        }
    }
}

/// Non-owning producer handle held by the worker itself, so the queue
/// shuts down once every external sender is gone.
#[derive(Clone, Debug)]
pub struct WeakCommandSender {
    tx: mpsc::WeakUnboundedSender<Command>,
}

impl WeakCommandSender {
    pub fn upgrade(&self) -> Option<CommandSender> {
        self.tx.upgrade().map(|tx| CommandSender { tx })
    }
}

// ───────────────────────────────────────────────────────────────
// Consumer side
// ───────────────────────────────────────────────────────────────

/// The single-consumer end.
#[derive(Debug)]
pub struct CommandQueue {
    rx: mpsc::UnboundedReceiver<Command>,
}

impl CommandQueue {
    /// Block the calling thread until a command arrives.
    ///
    /// Returns `None` once every sender is dropped (or after
    /// [`close_and_drain`](Self::close_and_drain)).  Must not be called
    /// from inside an async runtime.
    pub fn next_blocking(&mut self) -> Option<Command> {
        self.rx.blocking_recv()
    }

    /// Refuse further sends and return whatever was already queued.
    pub fn close_and_drain(&mut self) -> Vec<Command> {
        self.rx.close();
        let mut leftover = Vec::new();
        while let Ok(cmd) = self.rx.try_recv() {
            leftover.push(cmd);
        }
        leftover
    }
}
