//! Control-channel service contracts and in-memory adapters.
//!
//! The channel is a plain text-frame pipe to the device. Request/response correlation does not
//! exist at this layer: responses come back as independent inbound messages and are routed by the
//! `cmd.callbackFn` field they echo.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use serde::Serialize;
use serde_json::Value;

/// Host service for the bidirectional JSON control channel.
pub trait ControlChannel {
    /// Returns `true` while the underlying connection accepts frames.
    fn is_open(&self) -> bool;

    /// Sends one text frame.
    ///
    /// # Errors
    ///
    /// Returns an error when the connection is not open or the transport rejects the frame.
    fn send_text(&self, payload: &str) -> Result<(), String>;
}

/// Serializes `value` to JSON and sends it through a [`ControlChannel`].
///
/// # Errors
///
/// Returns an error when serialization fails or the channel rejects the frame.
pub fn send_json_with<C: ControlChannel + ?Sized, T: Serialize>(
    channel: &C,
    value: &T,
) -> Result<(), String> {
    let raw = serde_json::to_string(value).map_err(|e| e.to_string())?;
    channel.send_text(&raw)
}

#[derive(Debug, Clone, Copy, Default)]
/// Channel adapter that is never open. Used on hosts without a device connection.
pub struct NoopControlChannel;

impl ControlChannel for NoopControlChannel {
    fn is_open(&self) -> bool {
        false
    }

    fn send_text(&self, _payload: &str) -> Result<(), String> {
        Err("control channel unavailable".to_string())
    }
}

#[derive(Debug, Clone)]
/// Recording channel adapter. Frames are kept in send order and never answered.
pub struct MemoryControlChannel {
    open: Rc<Cell<bool>>,
    sent: Rc<RefCell<Vec<String>>>,
}

impl Default for MemoryControlChannel {
    fn default() -> Self {
        Self {
            open: Rc::new(Cell::new(true)),
            sent: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl MemoryControlChannel {
    /// Opens or closes the simulated connection.
    pub fn set_open(&self, open: bool) {
        self.open.set(open);
    }

    /// Returns every frame sent so far, parsed as JSON.
    pub fn sent_json(&self) -> Vec<Value> {
        self.sent
            .borrow()
            .iter()
            .filter_map(|raw| serde_json::from_str(raw).ok())
            .collect()
    }

    /// Returns the `cmd.subaction` of every frame sent so far.
    pub fn sent_subactions(&self) -> Vec<String> {
        self.sent_json()
            .iter()
            .filter_map(|frame| frame.pointer("/cmd/subaction"))
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    }

    /// Drops the recorded frames.
    pub fn clear(&self) {
        self.sent.borrow_mut().clear();
    }
}

impl ControlChannel for MemoryControlChannel {
    fn is_open(&self) -> bool {
        self.open.get()
    }

    fn send_text(&self, payload: &str) -> Result<(), String> {
        if !self.open.get() {
            return Err("control channel closed".to_string());
        }
        self.sent.borrow_mut().push(payload.to_string());
        Ok(())
    }
}
