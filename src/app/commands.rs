//! Inbound commands to the dispatcher.
//!
//! These represent actions requested by the outside world (UI, discovery
//! callbacks, the local service) that the
//! [`BusService`](super::service::BusService) interprets on the worker
//! thread, strictly in submission order.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::device::{DeviceType, RemoteHandle};

use super::ports::DeviceView;

/// Commands that external adapters can send into the dispatcher.
pub enum Command {
    // ── Session lifecycle ─────────────────────────────────────
    Connect,
    /// Stops the worker after forwarding to the transport.
    Disconnect,
    RegisterInterface,
    UnregisterInterface,
    Announce,
    RegisterListeners,
    UnregisterListeners,

    // ── Discovery ─────────────────────────────────────────────
    DeviceDiscovered {
        device_type: DeviceType,
        handle: RemoteHandle,
    },
    DeviceLost {
        handle: RemoteHandle,
    },

    // ── Notifications ─────────────────────────────────────────
    /// `title:body` text fanned out to subscribers.
    NotifySubscribers(String),

    // ── PC media / pointer / keyboard / slideshow ─────────────
    SetVolume(i32),
    MediaPlayPause,
    MediaStop,
    MediaNext,
    MediaPrevious,
    MouseMove { dx: i32, dy: i32 },
    MouseLeftClick,
    MouseRightClick,
    KeyPressed(i32),
    SlideshowStart,
    SlideshowStop,
    NextSlide,
    PreviousSlide,

    // ── Board ─────────────────────────────────────────────────
    SetLight(bool),
    SetAutoMode(bool),

    // ── Files and scripts ─────────────────────────────────────
    /// Push a file flagged as a script.
    ScriptAdd(PathBuf),
    /// Push a plain file.
    FileSend(PathBuf),
    /// Run a script already on the device.
    ScriptRun(String),

    // ── Local control ─────────────────────────────────────────
    /// Attach a UI list and seed it from the registry.
    AttachView(Arc<dyn DeviceView>),
    DetachView,
    /// Completes `.0` once every earlier command has been handled.
    Barrier(oneshot::Sender<()>),
}

/// Field-less discriminant of [`Command`], for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Connect,
    Disconnect,
    RegisterInterface,
    UnregisterInterface,
    Announce,
    RegisterListeners,
    UnregisterListeners,
    DeviceDiscovered,
    DeviceLost,
    NotifySubscribers,
    SetVolume,
    MediaPlayPause,
    MediaStop,
    MediaNext,
    MediaPrevious,
    MouseMove,
    MouseLeftClick,
    MouseRightClick,
    KeyPressed,
    SlideshowStart,
    SlideshowStop,
    NextSlide,
    PreviousSlide,
    SetLight,
    SetAutoMode,
    ScriptAdd,
    FileSend,
    ScriptRun,
    AttachView,
    DetachView,
    Barrier,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Connect => CommandKind::Connect,
            Self::Disconnect => CommandKind::Disconnect,
            Self::RegisterInterface => CommandKind::RegisterInterface,
            Self::UnregisterInterface => CommandKind::UnregisterInterface,
            Self::Announce => CommandKind::Announce,
            Self::RegisterListeners => CommandKind::RegisterListeners,
            Self::UnregisterListeners => CommandKind::UnregisterListeners,
            Self::DeviceDiscovered { .. } => CommandKind::DeviceDiscovered,
            Self::DeviceLost { .. } => CommandKind::DeviceLost,
            Self::NotifySubscribers(_) => CommandKind::NotifySubscribers,
            Self::SetVolume(_) => CommandKind::SetVolume,
            Self::MediaPlayPause => CommandKind::MediaPlayPause,
            Self::MediaStop => CommandKind::MediaStop,
            Self::MediaNext => CommandKind::MediaNext,
            Self::MediaPrevious => CommandKind::MediaPrevious,
            Self::MouseMove { .. } => CommandKind::MouseMove,
            Self::MouseLeftClick => CommandKind::MouseLeftClick,
            Self::MouseRightClick => CommandKind::MouseRightClick,
            Self::KeyPressed(_) => CommandKind::KeyPressed,
            Self::SlideshowStart => CommandKind::SlideshowStart,
            Self::SlideshowStop => CommandKind::SlideshowStop,
            Self::NextSlide => CommandKind::NextSlide,
            Self::PreviousSlide => CommandKind::PreviousSlide,
            Self::SetLight(_) => CommandKind::SetLight,
            Self::SetAutoMode(_) => CommandKind::SetAutoMode,
            Self::ScriptAdd(_) => CommandKind::ScriptAdd,
            Self::FileSend(_) => CommandKind::FileSend,
            Self::ScriptRun(_) => CommandKind::ScriptRun,
            Self::AttachView(_) => CommandKind::AttachView,
            Self::DetachView => CommandKind::DetachView,
            Self::Barrier(_) => CommandKind::Barrier,
        }
    }
}

impl CommandKind {
    /// Commands that act on the selected device.
    pub fn targets_selection(self) -> bool {
        matches!(
            self,
            Self::SetVolume
                | Self::MediaPlayPause
                | Self::MediaStop
                | Self::MediaNext
                | Self::MediaPrevious
                | Self::MouseMove
                | Self::MouseLeftClick
                | Self::MouseRightClick
                | Self::KeyPressed
                | Self::SlideshowStart
                | Self::SlideshowStop
                | Self::NextSlide
                | Self::PreviousSlide
                | Self::SetLight
                | Self::SetAutoMode
                | Self::ScriptAdd
                | Self::FileSend
                | Self::ScriptRun
        )
    }
}

impl core::fmt::Debug for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DeviceDiscovered {
                device_type,
                handle,
            } => write!(f, "DeviceDiscovered({device_type}, {})", handle.bus_name()),
            Self::DeviceLost { handle } => write!(f, "DeviceLost({})", handle.bus_name()),
            Self::NotifySubscribers(m) => write!(f, "NotifySubscribers({m:?})"),
            Self::SetVolume(v) => write!(f, "SetVolume({v})"),
            Self::MouseMove { dx, dy } => write!(f, "MouseMove({dx}, {dy})"),
            Self::KeyPressed(k) => write!(f, "KeyPressed({k})"),
            Self::SetLight(on) => write!(f, "SetLight({on})"),
            Self::SetAutoMode(on) => write!(f, "SetAutoMode({on})"),
            Self::ScriptAdd(p) => write!(f, "ScriptAdd({})", p.display()),
            Self::FileSend(p) => write!(f, "FileSend({})", p.display()),
            Self::ScriptRun(p) => write!(f, "ScriptRun({p:?})"),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}
