//! Capability contracts exposed by each peer device type.
//!
//! A discovered peer's proxy hands out one typed view per contract.  Which
//! view a command uses is decided by the peer's [`DeviceType`] through
//! [`Capability::resolve`], a lookup keyed by variant.  The proxy is never
//! probed at runtime.
//!
//! ```text
//!                       ┌──────────────┐
//!   DeviceType::Pc ───▶ │ PcInterface  │  media · pointer · keys · slides · files · notify
//!   DeviceType::Mobile ▶│ MobileIface  │  files · scripts · notify
//!   DeviceType::Board ─▶│ BoardIface   │  light · auto mode · files · scripts
//!                       └──────────────┘
//! ```
//!
//! Every call can fail with [`RemoteError`] on a transport fault.

use crate::app::ports::RemoteError;
use crate::device::DeviceType;

// ───────────────────────────────────────────────────────────────
// Per-type contracts
// ───────────────────────────────────────────────────────────────

/// Desktop agent contract.
pub trait PcInterface: Send + Sync {
    fn set_volume(&self, volume: i32) -> Result<(), RemoteError>;
    fn media_play_pause(&self) -> Result<(), RemoteError>;
    fn media_stop(&self) -> Result<(), RemoteError>;
    fn media_next(&self) -> Result<(), RemoteError>;
    fn media_previous(&self) -> Result<(), RemoteError>;
    fn mouse_move(&self, dx: i32, dy: i32) -> Result<(), RemoteError>;
    fn mouse_left_click(&self) -> Result<(), RemoteError>;
    fn mouse_right_click(&self) -> Result<(), RemoteError>;
    fn key_pressed(&self, code: i32) -> Result<(), RemoteError>;
    fn slideshow_start(&self) -> Result<(), RemoteError>;
    fn slideshow_stop(&self) -> Result<(), RemoteError>;
    fn next_slide(&self) -> Result<(), RemoteError>;
    fn previous_slide(&self) -> Result<(), RemoteError>;
    /// One frame of a file push.  Empty `bytes` ends the transfer.
    fn file_data(&self, name: &str, bytes: &[u8], is_script: bool) -> Result<(), RemoteError>;
    fn run_script(&self, path: &str) -> Result<(), RemoteError>;
    fn notify(&self, from: &str, title: &str, body: &str) -> Result<(), RemoteError>;
}

/// Phone / tablet agent contract.
pub trait MobileInterface: Send + Sync {
    fn file_data(&self, name: &str, bytes: &[u8], is_script: bool) -> Result<(), RemoteError>;
    fn run_script(&self, path: &str) -> Result<(), RemoteError>;
    fn notify(&self, from: &str, title: &str, body: &str) -> Result<(), RemoteError>;
}

/// Board contract.  Boards have no notification surface.
pub trait BoardInterface: Send + Sync {
    fn set_light(&self, on: bool) -> Result<(), RemoteError>;
    fn set_auto_mode(&self, on: bool) -> Result<(), RemoteError>;
    fn file_data(&self, name: &str, bytes: &[u8], is_script: bool) -> Result<(), RemoteError>;
    fn run_script(&self, path: &str) -> Result<(), RemoteError>;
}

// ───────────────────────────────────────────────────────────────
// Proxy object (what a RemoteHandle wraps)
// ───────────────────────────────────────────────────────────────

/// Transport-side proxy for one peer.
///
/// Handing out a view never fails; whether the peer actually implements the
/// contract only shows up as a [`RemoteError`] when a member is invoked.
pub trait ProxyObject: Send + Sync {
    /// Unique bus name of the peer.
    fn bus_name(&self) -> &str;
    fn pc(&self) -> &dyn PcInterface;
    fn mobile(&self) -> &dyn MobileInterface;
    fn board(&self) -> &dyn BoardInterface;
}

// ───────────────────────────────────────────────────────────────
// Capability lookup
// ───────────────────────────────────────────────────────────────

/// The contract view matching a peer's device type.
#[derive(Clone, Copy)]
pub enum Capability<'a> {
    Pc(&'a dyn PcInterface),
    Mobile(&'a dyn MobileInterface),
    Board(&'a dyn BoardInterface),
}

impl<'a> Capability<'a> {
    /// Pick the contract view for `device_type` off `proxy`.
    pub fn resolve(device_type: DeviceType, proxy: &'a dyn ProxyObject) -> Self {
        match device_type {
            DeviceType::Pc => Self::Pc(proxy.pc()),
            DeviceType::Mobile => Self::Mobile(proxy.mobile()),
            DeviceType::Board => Self::Board(proxy.board()),
        }
    }

    pub fn device_type(&self) -> DeviceType {
        match self {
            Self::Pc(_) => DeviceType::Pc,
            Self::Mobile(_) => DeviceType::Mobile,
            Self::Board(_) => DeviceType::Board,
        }
    }

    /// `fileData` is common to every contract.
    pub fn file_data(&self, name: &str, bytes: &[u8], is_script: bool) -> Result<(), RemoteError> {
        match self {
            Self::Pc(pc) => pc.file_data(name, bytes, is_script),
            Self::Mobile(m) => m.file_data(name, bytes, is_script),
            Self::Board(b) => b.file_data(name, bytes, is_script),
        }
    }

    /// `runScript` is common to every contract.
    pub fn run_script(&self, path: &str) -> Result<(), RemoteError> {
        match self {
            Self::Pc(pc) => pc.run_script(path),
            Self::Mobile(m) => m.run_script(path),
            Self::Board(b) => b.run_script(path),
        }
    }

    /// `notify` where the contract has one; `None` for boards.
    pub fn notify(&self, from: &str, title: &str, body: &str) -> Option<Result<(), RemoteError>> {
        match self {
            Self::Pc(pc) => Some(pc.notify(from, title, body)),
            Self::Mobile(m) => Some(m.notify(from, title, body)),
            Self::Board(_) => None,
        }
    }
}
