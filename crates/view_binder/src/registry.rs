//! Typed response-handler registry keyed by [`ResponseKind`].

use std::{collections::HashMap, rc::Rc};

use leptos::logging::warn;

use crate::envelope::{Envelope, ResponseKind};

/// Receiver of envelopes whose `cmd.callbackFn` names a registered kind.
pub trait ResponseHandler {
    /// Handles the full envelope after the generic sections were applied.
    fn handle_response(&self, envelope: &Envelope);
}

impl<F: Fn(&Envelope)> ResponseHandler for F {
    fn handle_response(&self, envelope: &Envelope) {
        self(envelope)
    }
}

#[derive(Clone, Default)]
/// Startup-built table of response handlers.
pub struct CallbackRegistry {
    handlers: HashMap<ResponseKind, Rc<dyn ResponseHandler>>,
}

impl CallbackRegistry {
    /// Registers `handler` for `kind`, replacing any previous one.
    pub fn register(&mut self, kind: ResponseKind, handler: Rc<dyn ResponseHandler>) {
        self.handlers.insert(kind, handler);
    }

    /// Whether a handler is installed for `kind`.
    pub fn contains(&self, kind: ResponseKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Routes `envelope` by its callback name. Returns `true` when a handler ran.
    pub fn dispatch(&self, envelope: &Envelope) -> bool {
        let Some(name) = envelope.callback_name() else {
            return false;
        };
        let Some(kind) = ResponseKind::from_callback_name(name) else {
            warn!("ignoring unknown response handler `{name}`");
            return false;
        };
        let Some(handler) = self.handlers.get(&kind).cloned() else {
            warn!("no handler registered for `{name}`");
            return false;
        };
        handler.handle_response(envelope);
        true
    }
}
