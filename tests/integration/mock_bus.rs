//! Mock bus adapters for integration tests.
//!
//! [`MockBus`] and every [`MockPeer`] write into one shared [`CallLog`], so
//! tests can assert on the exact interleaving of transport and remote
//! calls without a real bus.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use izconnect::app::events::AppEvent;
use izconnect::app::ports::{
    BusTransport, DeviceView, EventSink, PROP_DEVICE_NAME, PROP_DEVICE_OS, Properties,
    RemoteError,
};
use izconnect::local::LocalService;
use izconnect::queue::CommandSender;
use izconnect::rpc::capability::{BoardInterface, MobileInterface, PcInterface, ProxyObject};
use izconnect::{
    Command, ControllerConfig, DeviceRecord, DeviceType, Dispatcher, DispatcherHandle,
    RemoteHandle,
};

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect,
    Disconnect,
    RegisterInterface,
    UnregisterInterface,
    Announce,
    RegisterListeners,
    UnregisterListeners,
    Properties(String),
    /// `peer` received a non-file remote call rendered as `member(args)`.
    Remote { peer: String, call: String },
    FileData {
        peer: String,
        name: String,
        len: usize,
        is_script: bool,
    },
}

#[derive(Default)]
pub struct CallLog {
    calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl CallLog {
    pub fn push(&self, call: Call) {
        self.calls.lock().push(call);
    }

    pub fn all(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Remote calls received by `peer`, as `member(args)` text.
    pub fn remote_calls(&self, peer: &str) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Remote { peer: p, call } if p == peer => Some(call.clone()),
                _ => None,
            })
            .collect()
    }

    /// `fileData` calls received by `peer`, as `(name, len, is_script)`.
    pub fn file_data(&self, peer: &str) -> Vec<(String, usize, bool)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::FileData {
                    peer: p,
                    name,
                    len,
                    is_script,
                } if p == peer => Some((name.clone(), *len, *is_script)),
                _ => None,
            })
            .collect()
    }

    /// Transport-level calls only, in order.
    pub fn lifecycle(&self) -> Vec<Call> {
        self.calls
            .lock()
            .iter()
            .filter(|c| {
                !matches!(
                    c,
                    Call::Remote { .. } | Call::FileData { .. } | Call::Properties(_)
                )
            })
            .cloned()
            .collect()
    }
}

// ── MockBus ───────────────────────────────────────────────────

pub struct MockBus {
    identity: String,
    log: Arc<CallLog>,
    listener: Mutex<Option<CommandSender>>,
    local: Mutex<Option<Arc<LocalService>>>,
    failing: Mutex<HashSet<&'static str>>,
    props: Mutex<HashMap<String, Result<Properties, RemoteError>>>,
}

#[allow(dead_code)]
impl MockBus {
    pub fn new(identity: &str, log: Arc<CallLog>) -> Arc<Self> {
        Arc::new(Self {
            identity: identity.to_owned(),
            log,
            listener: Mutex::new(None),
            local: Mutex::new(None),
            failing: Mutex::new(HashSet::new()),
            props: Mutex::new(HashMap::new()),
        })
    }

    /// Make the named lifecycle member fail from now on.
    pub fn fail_on(&self, member: &'static str) {
        self.failing.lock().insert(member);
    }

    pub fn set_properties(&self, bus_name: &str, name: &str, os: &str) {
        self.props.lock().insert(
            bus_name.to_owned(),
            Ok(Properties::from([
                (PROP_DEVICE_NAME.to_owned(), name.to_owned()),
                (PROP_DEVICE_OS.to_owned(), os.to_owned()),
            ])),
        );
    }

    pub fn fail_properties(&self, bus_name: &str) {
        self.props.lock().insert(
            bus_name.to_owned(),
            Err(RemoteError::new("GetAllProperties", "peer unreachable")),
        );
    }

    pub fn listener(&self) -> Option<CommandSender> {
        self.listener.lock().clone()
    }

    pub fn local(&self) -> Option<Arc<LocalService>> {
        self.local.lock().clone()
    }

    fn call(&self, member: &'static str, call: Call) -> Result<(), RemoteError> {
        self.log.push(call);
        if self.failing.lock().contains(member) {
            return Err(RemoteError::new(member, "injected failure"));
        }
        Ok(())
    }
}

impl BusTransport for MockBus {
    fn connect(&self) -> Result<(), RemoteError> {
        self.call("Connect", Call::Connect)
    }

    fn disconnect(&self) -> Result<(), RemoteError> {
        self.call("Disconnect", Call::Disconnect)
    }

    fn register_interface(&self, service: Arc<LocalService>) -> Result<(), RemoteError> {
        *self.local.lock() = Some(service);
        self.call("RegisterInterface", Call::RegisterInterface)
    }

    fn unregister_interface(&self) -> Result<(), RemoteError> {
        *self.local.lock() = None;
        self.call("UnregisterInterface", Call::UnregisterInterface)
    }

    fn announce(&self) -> Result<(), RemoteError> {
        self.call("Announce", Call::Announce)
    }

    fn register_listeners(&self, listener: CommandSender) -> Result<(), RemoteError> {
        *self.listener.lock() = Some(listener);
        self.call("RegisterListeners", Call::RegisterListeners)
    }

    fn unregister_listeners(&self) -> Result<(), RemoteError> {
        *self.listener.lock() = None;
        self.call("UnregisterListeners", Call::UnregisterListeners)
    }

    fn self_identity(&self) -> String {
        self.identity.clone()
    }

    fn properties(
        &self,
        handle: &RemoteHandle,
        _device_type: DeviceType,
    ) -> Result<Properties, RemoteError> {
        let bus_name = handle.bus_name().to_owned();
        self.log.push(Call::Properties(bus_name.clone()));
        self.props.lock().get(&bus_name).cloned().unwrap_or_else(|| {
            Ok(Properties::from([
                (PROP_DEVICE_NAME.to_owned(), format!("name-of-{bus_name}")),
                (PROP_DEVICE_OS.to_owned(), "TestOS".to_owned()),
            ]))
        })
    }
}

// ── MockPeer ──────────────────────────────────────────────────

pub struct MockPeer {
    bus_name: String,
    log: Arc<CallLog>,
    failing: Mutex<HashSet<String>>,
}

#[allow(dead_code)]
impl MockPeer {
    pub fn new(bus_name: &str, log: Arc<CallLog>) -> Arc<Self> {
        Arc::new(Self {
            bus_name: bus_name.to_owned(),
            log,
            failing: Mutex::new(HashSet::new()),
        })
    }

    /// Make `member` (e.g. `"setVolume"`, `"fileData"`) fail from now on.
    pub fn fail_on(&self, member: &str) {
        self.failing.lock().insert(member.to_owned());
    }

    fn check(&self, member: &str) -> Result<(), RemoteError> {
        if self.failing.lock().contains(member) {
            Err(RemoteError::new(member, "injected failure"))
        } else {
            Ok(())
        }
    }

    fn remote(&self, member: &str, call: String) -> Result<(), RemoteError> {
        self.log.push(Call::Remote {
            peer: self.bus_name.clone(),
            call,
        });
        self.check(member)
    }

    fn file(&self, name: &str, bytes: &[u8], is_script: bool) -> Result<(), RemoteError> {
        self.log.push(Call::FileData {
            peer: self.bus_name.clone(),
            name: name.to_owned(),
            len: bytes.len(),
            is_script,
        });
        self.check("fileData")
    }
}

impl ProxyObject for MockPeer {
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

impl PcInterface for MockPeer {
    fn set_volume(&self, volume: i32) -> Result<(), RemoteError> {
        self.remote("setVolume", format!("setVolume({volume})"))
    }
    fn media_play_pause(&self) -> Result<(), RemoteError> {
        self.remote("mediaPlayPause", "mediaPlayPause".into())
    }
    fn media_stop(&self) -> Result<(), RemoteError> {
        self.remote("mediaStop", "mediaStop".into())
    }
    fn media_next(&self) -> Result<(), RemoteError> {
        self.remote("mediaNext", "mediaNext".into())
    }
    fn media_previous(&self) -> Result<(), RemoteError> {
        self.remote("mediaPrevious", "mediaPrevious".into())
    }
    fn mouse_move(&self, dx: i32, dy: i32) -> Result<(), RemoteError> {
        self.remote("mouseMove", format!("mouseMove({dx}, {dy})"))
    }
    fn mouse_left_click(&self) -> Result<(), RemoteError> {
        self.remote("mouseLeftClick", "mouseLeftClick".into())
    }
    fn mouse_right_click(&self) -> Result<(), RemoteError> {
        self.remote("mouseRightClick", "mouseRightClick".into())
    }
    fn key_pressed(&self, code: i32) -> Result<(), RemoteError> {
        self.remote("keyPressed", format!("keyPressed({code})"))
    }
    fn slideshow_start(&self) -> Result<(), RemoteError> {
        self.remote("slideshowStart", "slideshowStart".into())
    }
    fn slideshow_stop(&self) -> Result<(), RemoteError> {
        self.remote("slideshowStop", "slideshowStop".into())
    }
    fn next_slide(&self) -> Result<(), RemoteError> {
        self.remote("nextSlide", "nextSlide".into())
    }
    fn previous_slide(&self) -> Result<(), RemoteError> {
        self.remote("previousSlide", "previousSlide".into())
    }
    fn file_data(&self, name: &str, bytes: &[u8], is_script: bool) -> Result<(), RemoteError> {
        self.file(name, bytes, is_script)
    }
    fn run_script(&self, path: &str) -> Result<(), RemoteError> {
        self.remote("runScript", format!("runScript({path})"))
    }
    fn notify(&self, from: &str, title: &str, body: &str) -> Result<(), RemoteError> {
        self.remote("notify", format!("notify({from}, {title}, {body})"))
    }
}

impl MobileInterface for MockPeer {
    fn file_data(&self, name: &str, bytes: &[u8], is_script: bool) -> Result<(), RemoteError> {
        self.file(name, bytes, is_script)
    }
    fn run_script(&self, path: &str) -> Result<(), RemoteError> {
        self.remote("runScript", format!("runScript({path})"))
    }
    fn notify(&self, from: &str, title: &str, body: &str) -> Result<(), RemoteError> {
        self.remote("notify", format!("notify({from}, {title}, {body})"))
    }
}

impl BoardInterface for MockPeer {
    fn set_light(&self, on: bool) -> Result<(), RemoteError> {
        self.remote("setLight", format!("setLight({on})"))
    }
    fn set_auto_mode(&self, on: bool) -> Result<(), RemoteError> {
        self.remote("setAutoMode", format!("setAutoMode({on})"))
    }
    fn file_data(&self, name: &str, bytes: &[u8], is_script: bool) -> Result<(), RemoteError> {
        self.file(name, bytes, is_script)
    }
    fn run_script(&self, path: &str) -> Result<(), RemoteError> {
        self.remote("runScript", format!("runScript({path})"))
    }
}

// ── Recording sink ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AppEvent>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().clone()
    }

    pub fn transfers_finished(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                AppEvent::TransferFinished { name } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &AppEvent) {
        self.events.lock().push(event.clone());
    }
}

// ── Recording view ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOp {
    Add(String),
    Remove(String),
    AddAll(Vec<String>),
}

#[derive(Default)]
pub struct RecordingView {
    ops: Mutex<Vec<ViewOp>>,
    rows: Mutex<Vec<DeviceRecord>>,
    highlighted: Mutex<Option<DeviceRecord>>,
}

#[allow(dead_code)]
impl RecordingView {
    pub fn ops(&self) -> Vec<ViewOp> {
        self.ops.lock().clone()
    }

    pub fn rows(&self) -> Vec<DeviceRecord> {
        self.rows.lock().clone()
    }

    pub fn highlight(&self, record: Option<DeviceRecord>) {
        *self.highlighted.lock() = record;
    }
}

impl DeviceView for RecordingView {
    fn add(&self, record: &DeviceRecord) {
        self.ops.lock().push(ViewOp::Add(record.identity.clone()));
        self.rows.lock().push(record.clone());
    }

    fn remove(&self, record: &DeviceRecord) {
        self.ops.lock().push(ViewOp::Remove(record.identity.clone()));
        self.rows.lock().retain(|r| r != record);
    }

    fn add_all(&self, records: &[DeviceRecord]) {
        self.ops.lock().push(ViewOp::AddAll(
            records.iter().map(|r| r.identity.clone()).collect(),
        ));
        self.rows.lock().extend_from_slice(records);
    }

    fn find_by_identity(&self, identity: &str) -> Option<DeviceRecord> {
        self.rows
            .lock()
            .iter()
            .find(|r| r.identity == identity)
            .cloned()
    }

    fn selected_item(&self) -> Option<DeviceRecord> {
        self.highlighted.lock().clone()
    }
}

// ── Harness ───────────────────────────────────────────────────

/// Identity the mock bus reports for this process.
pub const SELF_ID: &str = ":1.0";

pub struct Harness {
    pub dispatcher: Dispatcher,
    pub handle: DispatcherHandle,
    pub bus: Arc<MockBus>,
    pub sink: Arc<RecordingSink>,
    pub log: Arc<CallLog>,
}

#[allow(dead_code)]
impl Harness {
    pub fn new() -> Self {
        Self::with_config(ControllerConfig {
            device_name: "Controller".into(),
            ..ControllerConfig::default()
        })
    }

    pub fn with_config(config: ControllerConfig) -> Self {
        let log = Arc::new(CallLog::default());
        let bus = MockBus::new(SELF_ID, Arc::clone(&log));
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = Dispatcher::spawn(config, bus.clone(), sink.clone()).unwrap();
        let handle = dispatcher.handle();
        Self {
            dispatcher,
            handle,
            bus,
            sink,
            log,
        }
    }

    pub fn peer(&self, bus_name: &str) -> Arc<MockPeer> {
        MockPeer::new(bus_name, Arc::clone(&self.log))
    }

    /// Enqueue a discovery for `peer` and wait until it is handled.
    pub fn discover(&self, device_type: DeviceType, peer: &Arc<MockPeer>) -> RemoteHandle {
        let handle = RemoteHandle::new(peer.clone());
        self.handle
            .enqueue(Command::DeviceDiscovered {
                device_type,
                handle: handle.clone(),
            })
            .unwrap();
        self.handle.barrier().unwrap();
        handle
    }

    /// Discover and select `bus_name` as `device_type`.
    pub fn select_new(&self, device_type: DeviceType, bus_name: &str) -> Arc<MockPeer> {
        let peer = self.peer(bus_name);
        self.discover(device_type, &peer);
        assert!(self.handle.select(bus_name), "{bus_name} should be selectable");
        peer
    }

    pub fn sync(&self) {
        self.handle.barrier().unwrap();
    }

    /// Disconnect and wait for the worker to exit.
    pub fn finish(self) -> (Arc<CallLog>, Arc<RecordingSink>) {
        self.handle.enqueue(Command::Disconnect).unwrap();
        let Self {
            dispatcher,
            handle,
            log,
            sink,
            ..
        } = self;
        drop(handle);
        dispatcher.join().unwrap();
        (log, sink)
    }
}
