//! The local service object this process exposes on the bus.
//!
//! Peers read its `DeviceName` / `DeviceOS` properties and call
//! `subscribe` / `unsubscribe` to opt in to notifications.

use std::sync::Arc;

use log::info;

use crate::app::ports::{PROP_DEVICE_NAME, PROP_DEVICE_OS, Properties};
use crate::config::ControllerConfig;
use crate::notify::SubscriberSet;

pub struct LocalService {
    device_name: String,
    device_os: String,
    subscribers: Arc<SubscriberSet>,
}

impl LocalService {
    pub fn new(config: &ControllerConfig, subscribers: Arc<SubscriberSet>) -> Self {
        Self {
            device_name: config.device_name.clone(),
            device_os: config.device_os.clone(),
            subscribers,
        }
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn device_os(&self) -> &str {
        &self.device_os
    }

    /// Answer a peer's `getAllProperties`.
    pub fn properties(&self) -> Properties {
        Properties::from([
            (PROP_DEVICE_NAME.to_owned(), self.device_name.clone()),
            (PROP_DEVICE_OS.to_owned(), self.device_os.clone()),
        ])
    }

    /// Remote `subscribe(identity)`.
    pub fn subscribe(&self, identity: &str) {
        if self.subscribers.subscribe(identity) {
            info!("Local: {} subscribed to notifications", identity);
        }
    }

    /// Remote `unsubscribe(identity)`.
    pub fn unsubscribe(&self, identity: &str) {
        if self.subscribers.unsubscribe(identity) {
            info!("Local: {} unsubscribed from notifications", identity);
        }
    }
}
