//! In-process bus simulation.
//!
//! [`SimBus`] implements [`BusTransport`] without any network: peers are
//! [`SimPeer`] objects that "appear" and "vanish" under test or demo
//! control, and every remote call lands in the peer's call log.
//!
//! Used by the binary's demo session and by unit tests that need a real
//! (if trivial) transport.

use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::app::ports::{BusTransport, PROP_DEVICE_NAME, PROP_DEVICE_OS, Properties, RemoteError};
use crate::device::{DeviceType, RemoteHandle};
use crate::local::LocalService;
use crate::queue::CommandSender;
use crate::rpc::capability::{BoardInterface, MobileInterface, PcInterface, ProxyObject};
use crate::rpc::chunked::FileAssembler;

// ───────────────────────────────────────────────────────────────
// SimBus
// ───────────────────────────────────────────────────────────────

struct Present {
    device_type: DeviceType,
    peer: Arc<SimPeer>,
    handle: RemoteHandle,
}

#[derive(Default)]
struct SimState {
    connected: bool,
    announced: bool,
    interface: Option<Arc<LocalService>>,
    listener: Option<CommandSender>,
    peers: Vec<Present>,
}

/// Simulated message bus.
pub struct SimBus {
    identity: String,
    state: Mutex<SimState>,
}

impl SimBus {
    pub fn new(identity: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            identity: identity.into(),
            state: Mutex::new(SimState::default()),
        })
    }

    /// Bring `peer` onto the bus announcing `device_type`.
    ///
    /// Listeners registered now (or later) receive a discovery callback.
    pub fn appear(&self, device_type: DeviceType, peer: Arc<SimPeer>) -> RemoteHandle {
        let handle = RemoteHandle::new(Arc::clone(&peer) as Arc<dyn ProxyObject>);
        let mut state = self.state.lock();
        if let Some(listener) = &state.listener {
            if let Err(e) = listener.device_discovered(device_type.id(), handle.clone()) {
                warn!("SimBus: discovery of {} not delivered: {}", handle.bus_name(), e);
            }
        }
        state.peers.push(Present {
            device_type,
            peer,
            handle: handle.clone(),
        });
        debug!("SimBus: {} appeared as {}", handle.bus_name(), device_type);
        handle
    }

    /// Take the peer behind `handle` off the bus.
    pub fn vanish(&self, handle: &RemoteHandle) {
        let mut state = self.state.lock();
        let before = state.peers.len();
        state.peers.retain(|p| !p.handle.same_as(handle));
        if state.peers.len() == before {
            return;
        }
        if let Some(listener) = &state.listener {
            if let Err(e) = listener.device_lost(handle.clone()) {
                warn!("SimBus: loss of {} not delivered: {}", handle.bus_name(), e);
            }
        }
        debug!("SimBus: {} vanished", handle.bus_name());
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    pub fn is_announced(&self) -> bool {
        self.state.lock().announced
    }

    pub fn is_listening(&self) -> bool {
        self.state.lock().listener.is_some()
    }

    /// The local service currently exposed, if any.
    pub fn local_service(&self) -> Option<Arc<LocalService>> {
        self.state.lock().interface.clone()
    }
}

impl BusTransport for SimBus {
    fn connect(&self) -> Result<(), RemoteError> {
        self.state.lock().connected = true;
        info!("SimBus: connected as {}", self.identity);
        Ok(())
    }

    fn disconnect(&self) -> Result<(), RemoteError> {
        let mut state = self.state.lock();
        state.connected = false;
        state.announced = false;
        info!("SimBus: disconnected");
        Ok(())
    }

    fn register_interface(&self, service: Arc<LocalService>) -> Result<(), RemoteError> {
        let mut state = self.state.lock();
        if !state.connected {
            return Err(RemoteError::new("RegisterInterface", "not connected"));
        }
        state.interface = Some(service);
        Ok(())
    }

    fn unregister_interface(&self) -> Result<(), RemoteError> {
        self.state.lock().interface = None;
        Ok(())
    }

    fn announce(&self) -> Result<(), RemoteError> {
        let mut state = self.state.lock();
        if state.interface.is_none() {
            return Err(RemoteError::new("Announce", "no interface registered"));
        }
        state.announced = true;
        Ok(())
    }

    fn register_listeners(&self, listener: CommandSender) -> Result<(), RemoteError> {
        let mut state = self.state.lock();
        for p in &state.peers {
            if let Err(e) = listener.device_discovered(p.device_type.id(), p.handle.clone()) {
                warn!("SimBus: discovery of {} not delivered: {}", p.handle.bus_name(), e);
            }
        }
        state.listener = Some(listener);
        Ok(())
    }

    fn unregister_listeners(&self) -> Result<(), RemoteError> {
        self.state.lock().listener = None;
        Ok(())
    }

    fn self_identity(&self) -> String {
        self.identity.clone()
    }

    fn properties(
        &self,
        handle: &RemoteHandle,
        _device_type: DeviceType,
    ) -> Result<Properties, RemoteError> {
        let state = self.state.lock();
        let present = state
            .peers
            .iter()
            .find(|p| p.handle.same_as(handle))
            .ok_or_else(|| RemoteError::new("GetAllProperties", "no such object"))?;
        present.peer.properties()
    }
}

// ───────────────────────────────────────────────────────────────
// SimPeer
// ───────────────────────────────────────────────────────────────

/// A file fully received through `fileData`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub is_script: bool,
}

/// Simulated remote device.  Implements every capability contract and
/// records each call as `member(args)` text.
pub struct SimPeer {
    bus_name: String,
    device_name: String,
    device_os: String,
    calls: Mutex<Vec<String>>,
    assembler: Mutex<FileAssembler>,
    files: Mutex<Vec<ReceivedFile>>,
}

impl SimPeer {
    pub fn new(
        bus_name: impl Into<String>,
        device_name: impl Into<String>,
        device_os: impl Into<String>,
    ) -> Self {
        Self {
            bus_name: bus_name.into(),
            device_name: device_name.into(),
            device_os: device_os.into(),
            calls: Mutex::new(Vec::new()),
            assembler: Mutex::new(FileAssembler::new()),
            files: Mutex::new(Vec::new()),
        }
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Files whose terminal chunk has arrived.
    pub fn files(&self) -> Vec<ReceivedFile> {
        self.files.lock().clone()
    }

    fn properties(&self) -> Result<Properties, RemoteError> {
        Ok(Properties::from([
            (PROP_DEVICE_NAME.to_owned(), self.device_name.clone()),
            (PROP_DEVICE_OS.to_owned(), self.device_os.clone()),
        ]))
    }

    fn record(&self, call: String) -> Result<(), RemoteError> {
        debug!("SimPeer {}: {}", self.bus_name, call);
        self.calls.lock().push(call);
        Ok(())
    }

    fn receive(&self, name: &str, bytes: &[u8], is_script: bool) -> Result<(), RemoteError> {
        if let Some(complete) = self.assembler.lock().feed(name, bytes) {
            self.files.lock().push(ReceivedFile {
                name: name.to_owned(),
                bytes: complete,
                is_script,
            });
        }
        self.record(format!("fileData({name}, {}, {is_script})", bytes.len()))
    }
}

impl ProxyObject for SimPeer {
    fn bus_name(&self) -> &str {
        &self.bus_name
    }

    fn pc(&self) -> &dyn PcInterface {
        self
    }

    fn mobile(&self) -> &dyn MobileInterface {
        self
    }

    fn board(&self) -> &dyn BoardInterface {
        self
    }
}

impl PcInterface for SimPeer {
    fn set_volume(&self, volume: i32) -> Result<(), RemoteError> {
        self.record(format!("setVolume({volume})"))
    }
    fn media_play_pause(&self) -> Result<(), RemoteError> {
        self.record("mediaPlayPause".into())
    }
    fn media_stop(&self) -> Result<(), RemoteError> {
        self.record("mediaStop".into())
    }
    fn media_next(&self) -> Result<(), RemoteError> {
        self.record("mediaNext".into())
    }
    fn media_previous(&self) -> Result<(), RemoteError> {
        self.record("mediaPrevious".into())
    }
    fn mouse_move(&self, dx: i32, dy: i32) -> Result<(), RemoteError> {
        self.record(format!("mouseMove({dx}, {dy})"))
    }
    fn mouse_left_click(&self) -> Result<(), RemoteError> {
        self.record("mouseLeftClick".into())
    }
    fn mouse_right_click(&self) -> Result<(), RemoteError> {
        self.record("mouseRightClick".into())
    }
    fn key_pressed(&self, code: i32) -> Result<(), RemoteError> {
        self.record(format!("keyPressed({code})"))
    }
    fn slideshow_start(&self) -> Result<(), RemoteError> {
        self.record("slideshowStart".into())
    }
    fn slideshow_stop(&self) -> Result<(), RemoteError> {
        self.record("slideshowStop".into())
    }
    fn next_slide(&self) -> Result<(), RemoteError> {
        self.record("nextSlide".into())
    }
    fn previous_slide(&self) -> Result<(), RemoteError> {
        self.record("previousSlide".into())
    }
    fn file_data(&self, name: &str, bytes: &[u8], is_script: bool) -> Result<(), RemoteError> {
        self.receive(name, bytes, is_script)
    }
    fn run_script(&self, path: &str) -> Result<(), RemoteError> {
        self.record(format!("runScript({path})"))
    }
    fn notify(&self, from: &str, title: &str, body: &str) -> Result<(), RemoteError> {
        self.record(format!("notify({from}, {title}, {body})"))
    }
}

impl MobileInterface for SimPeer {
    fn file_data(&self, name: &str, bytes: &[u8], is_script: bool) -> Result<(), RemoteError> {
        self.receive(name, bytes, is_script)
    }
    fn run_script(&self, path: &str) -> Result<(), RemoteError> {
        self.record(format!("runScript({path})"))
    }
    fn notify(&self, from: &str, title: &str, body: &str) -> Result<(), RemoteError> {
        self.record(format!("notify({from}, {title}, {body})"))
    }
}

impl BoardInterface for SimPeer {
    fn set_light(&self, on: bool) -> Result<(), RemoteError> {
        self.record(format!("setLight({on})"))
    }
    fn set_auto_mode(&self, on: bool) -> Result<(), RemoteError> {
        self.record(format!("setAutoMode({on})"))
    }
    fn file_data(&self, name: &str, bytes: &[u8], is_script: bool) -> Result<(), RemoteError> {
        self.receive(name, bytes, is_script)
    }
    fn run_script(&self, path: &str) -> Result<(), RemoteError> {
        self.record(format!("runScript({path})"))
    }
}
