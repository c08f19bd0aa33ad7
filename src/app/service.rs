//! Bus service: the hexagonal core that interprets one command at a time.
//!
//! [`BusService`] owns no thread.  The dispatcher worker feeds it commands
//! in FIFO order and stops when it answers [`Flow::Stop`].  All I/O goes
//! through the port traits it was built with, so the whole service is
//! testable with mock adapters.
//!
//! ```text
//!  CommandQueue ──▶ ┌──────────────────────────┐ ──▶ BusTransport
//!                   │        BusService         │ ──▶ DeviceView (optional)
//!   DeviceRegistry ◀│ lifecycle · discovery ·   │ ──▶ EventSink
//!   SubscriberSet  ◀│ routing · transfer · fan-out│──▶ selected peer proxy
//!                   └──────────────────────────┘
//! ```
//!
//! No failure inside a command ever stops the worker: remote errors are
//! logged and the next command runs.

use std::path::Path;
use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::config::ControllerConfig;
use crate::device::{DeviceRecord, DeviceType, RemoteHandle};
use crate::error::Error;
use crate::local::LocalService;
use crate::notify::{self, SubscriberSet};
use crate::queue::WeakCommandSender;
use crate::registry::DeviceRegistry;
use crate::rpc::capability::Capability;
use crate::rpc::transfer::{self, TransferOutcome};

use super::commands::Command;
use super::events::AppEvent;
use super::ports::{
    BusTransport, DeviceView, EventSink, PROP_DEVICE_NAME, PROP_DEVICE_OS, RemoteError,
};

/// Whether the worker should keep pulling commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

// ───────────────────────────────────────────────────────────────
// BusService
// ───────────────────────────────────────────────────────────────

/// Command interpreter running on the dispatcher worker.
pub struct BusService {
    config: ControllerConfig,
    transport: Arc<dyn BusTransport>,
    sink: Arc<dyn EventSink>,
    registry: Arc<DeviceRegistry>,
    subscribers: Arc<SubscriberSet>,
    local: Arc<LocalService>,
    /// Handed (upgraded) to the transport on `RegisterListeners`.
    listener: WeakCommandSender,
    view: Option<Arc<dyn DeviceView>>,
    handled: u64,
}

impl BusService {
    pub fn new(
        config: ControllerConfig,
        transport: Arc<dyn BusTransport>,
        sink: Arc<dyn EventSink>,
        registry: Arc<DeviceRegistry>,
        subscribers: Arc<SubscriberSet>,
        listener: WeakCommandSender,
    ) -> Self {
        let local = Arc::new(LocalService::new(&config, Arc::clone(&subscribers)));
        Self {
            config,
            transport,
            sink,
            registry,
            subscribers,
            local,
            listener,
            view: None,
            handled: 0,
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Interpret one command.  Returns [`Flow::Stop`] after `Disconnect`.
    pub fn handle_command(&mut self, cmd: Command) -> Flow {
        self.handled += 1;
        debug!("Dispatch: #{} {:?}", self.handled, cmd);

        match cmd {
            Command::Connect => self.lifecycle("Connect", |t| t.connect()),
            Command::Disconnect => {
                self.lifecycle("Disconnect", |t| t.disconnect());
                return Flow::Stop;
            }
            Command::RegisterInterface => {
                let local = Arc::clone(&self.local);
                self.lifecycle("RegisterInterface", move |t| t.register_interface(local));
            }
            Command::UnregisterInterface => {
                self.lifecycle("UnregisterInterface", |t| t.unregister_interface());
            }
            Command::Announce => self.lifecycle("Announce", |t| t.announce()),
            Command::RegisterListeners => match self.listener.upgrade() {
                Some(tx) => self.lifecycle("RegisterListeners", move |t| t.register_listeners(tx)),
                None => warn!("Bus: RegisterListeners skipped, queue has no producers left"),
            },
            Command::UnregisterListeners => {
                self.lifecycle("UnregisterListeners", |t| t.unregister_listeners());
            }
            Command::DeviceDiscovered {
                device_type,
                handle,
            } => self.on_device_discovered(device_type, handle),
            Command::DeviceLost { handle } => self.on_device_lost(&handle),
            Command::NotifySubscribers(message) => self.notify_subscribers(&message),
            Command::AttachView(view) => self.attach_view(view),
            Command::DetachView => {
                if self.view.take().is_some() {
                    debug!("View: detached");
                }
            }
            Command::Barrier(done) => {
                // The waiter may have given up; nothing to do then.
                let _ = done.send(());
            }
            device_cmd => self.dispatch_to_selected(device_cmd),
        }
        Flow::Continue
    }

    /// Emit the shutdown event.  Called by the worker after it stops.
    pub fn stopped(&self) {
        info!("Dispatch: stopped after {} command(s)", self.handled);
        self.sink.emit(&AppEvent::Stopped);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Total commands interpreted so far.
    pub fn handled(&self) -> u64 {
        self.handled
    }

    pub fn local_service(&self) -> &Arc<LocalService> {
        &self.local
    }

    pub fn has_view(&self) -> bool {
        self.view.is_some()
    }

    // ── Lifecycle ─────────────────────────────────────────────

    fn lifecycle(
        &self,
        name: &str,
        call: impl FnOnce(&dyn BusTransport) -> Result<(), RemoteError>,
    ) {
        match call(self.transport.as_ref()) {
            Ok(()) => info!("Bus: {} ok", name),
            Err(e) => error!("Bus: {} failed: {}", name, e),
        }
    }

    // ── Discovery ─────────────────────────────────────────────

    fn on_device_discovered(&mut self, device_type: DeviceType, handle: RemoteHandle) {
        let identity = handle.bus_name().to_owned();
        if identity == self.transport.self_identity() {
            debug!("Discovery: ignoring own announcement ({})", identity);
            return;
        }

        let placeholder = &self.config.unknown_placeholder;
        let (name, os) = match self.transport.properties(&handle, device_type) {
            Ok(props) => (
                props
                    .get(PROP_DEVICE_NAME)
                    .cloned()
                    .unwrap_or_else(|| placeholder.clone()),
                props
                    .get(PROP_DEVICE_OS)
                    .cloned()
                    .unwrap_or_else(|| placeholder.clone()),
            ),
            Err(e) => {
                warn!("Discovery: {}: {}", identity, Error::PropertyQuery(e));
                (placeholder.clone(), placeholder.clone())
            }
        };

        let record = DeviceRecord::new(identity, device_type, name, os);
        let replaced = self.registry.insert(record.clone(), handle);
        if let Some(view) = &self.view {
            if let Some(old) = &replaced {
                view.remove(old);
            }
            view.add(&record);
        }
        info!("Discovery: added {}", record);
        self.sink.emit(&AppEvent::DeviceAdded(record));
    }

    fn on_device_lost(&mut self, handle: &RemoteHandle) {
        let Some(record) = self.registry.remove_by_handle(handle) else {
            debug!("Discovery: lost unknown proxy {}", handle.bus_name());
            return;
        };
        if let Some(view) = &self.view {
            view.remove(&record);
        }
        info!("Discovery: removed {}", record);
        self.sink.emit(&AppEvent::DeviceRemoved(record));
    }

    fn attach_view(&mut self, view: Arc<dyn DeviceView>) {
        if self.view.as_ref().is_some_and(|v| Arc::ptr_eq(v, &view)) {
            debug!("View: already attached");
            return;
        }
        let records = self.registry.records();
        view.add_all(&records);
        debug!("View: attached, seeded with {} record(s)", records.len());
        self.view = Some(view);
    }

    // ── Notifications ─────────────────────────────────────────

    fn notify_subscribers(&self, message: &str) {
        if let Err(e) = notify::fan_out(
            &self.subscribers,
            &self.registry,
            &self.config.device_name,
            message,
        ) {
            warn!("Notify: {}", e);
        }
    }

    // ── Device routing ────────────────────────────────────────

    fn dispatch_to_selected(&self, cmd: Command) {
        let kind = cmd.kind();
        let Some((record, handle)) = self.registry.selected() else {
            debug!("Dispatch: no device selected, dropping {:?}", kind);
            return;
        };
        let target = Capability::resolve(record.device_type, handle.proxy());

        let result = match (target, cmd) {
            (Capability::Pc(pc), Command::SetVolume(v)) => pc.set_volume(v),
            (Capability::Pc(pc), Command::MediaPlayPause) => pc.media_play_pause(),
            (Capability::Pc(pc), Command::MediaStop) => pc.media_stop(),
            (Capability::Pc(pc), Command::MediaNext) => pc.media_next(),
            (Capability::Pc(pc), Command::MediaPrevious) => pc.media_previous(),
            (Capability::Pc(pc), Command::MouseMove { dx, dy }) => pc.mouse_move(dx, dy),
            (Capability::Pc(pc), Command::MouseLeftClick) => pc.mouse_left_click(),
            (Capability::Pc(pc), Command::MouseRightClick) => pc.mouse_right_click(),
            (Capability::Pc(pc), Command::KeyPressed(code)) => pc.key_pressed(code),
            (Capability::Pc(pc), Command::SlideshowStart) => pc.slideshow_start(),
            (Capability::Pc(pc), Command::SlideshowStop) => pc.slideshow_stop(),
            (Capability::Pc(pc), Command::NextSlide) => pc.next_slide(),
            (Capability::Pc(pc), Command::PreviousSlide) => pc.previous_slide(),
            (Capability::Board(board), Command::SetLight(on)) => board.set_light(on),
            (Capability::Board(board), Command::SetAutoMode(on)) => board.set_auto_mode(on),
            (_, Command::ScriptRun(path)) => target.run_script(&path),
            (_, Command::ScriptAdd(path)) => {
                self.push_file(target, &path, true);
                return;
            }
            (Capability::Pc(_) | Capability::Mobile(_), Command::FileSend(path)) => {
                self.push_file(target, &path, false);
                return;
            }
            (_, other) => {
                debug!(
                    "Dispatch: {} does not handle {:?}, dropping",
                    record.device_type,
                    other.kind()
                );
                return;
            }
        };

        if let Err(e) = result {
            warn!("Dispatch: {:?} to {} failed: {}", kind, record.identity, e);
        }
    }

    fn push_file(&self, target: Capability<'_>, path: &Path, is_script: bool) {
        match transfer::send_file(
            target,
            path,
            is_script,
            self.config.chunk_size,
            self.sink.as_ref(),
        ) {
            Ok(TransferOutcome::Sent { .. } | TransferOutcome::Missing) => {}
            Err(e) => warn!("Transfer: {} aborted: {}", path.display(), e),
        }
    }
}
