//! Application core: command interpretation with no direct I/O.
//!
//! This module contains the controller's rules: session lifecycle,
//! discovery bookkeeping, per-device command routing, and notification
//! fan-out.  All interaction with the bus happens through **port traits**
//! defined in [`ports`], keeping this layer testable without a real bus.

pub mod commands;
pub mod dispatcher;
pub mod events;
pub mod ports;
pub mod service;
