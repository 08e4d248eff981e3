//! View runtime: routes inbound envelopes and sends outbound commands.

use std::rc::Rc;

use admin_host::{send_json_with, AdminServices, SessionConfig, UploadPart};
use leptos::logging::{error, log, warn};
use regex::Regex;

use crate::{
    binder::Binder,
    envelope::{Command, Envelope, ResponseKind},
    error::AdminError,
    form::serialize_form,
    notice::{Highlighter, StatusNotice},
    registry::{CallbackRegistry, ResponseHandler},
    tree::ViewTree,
};

/// Notice shown when a command cannot be sent.
pub const CHANNEL_CLOSED_TEXT: &str = "WebSocket not open, could not send data";

/// Sends `command` as `{cmd}` over the services' channel.
///
/// A closed channel shows [`CHANNEL_CLOSED_TEXT`] as an error notice.
///
/// # Errors
///
/// Returns [`AdminError::ChannelClosed`] when the channel is not open and
/// [`AdminError::Transport`] when the frame is rejected.
pub fn dispatch_command<T: ViewTree + Clone + 'static>(
    services: &AdminServices,
    notice: &StatusNotice<T>,
    command: Command,
) -> Result<(), AdminError> {
    if !services.channel.is_open() {
        notice.show(false, CHANNEL_CLOSED_TEXT);
        return Err(AdminError::ChannelClosed);
    }
    send_json_with(services.channel.as_ref(), &command.into_message()).map_err(|err| {
        error!("control channel send failed: {err}");
        AdminError::Transport(err)
    })
}

/// Owns the view tree, host services, notice line, session store and handler registry.
pub struct ViewRuntime<T: ViewTree> {
    tree: T,
    services: AdminServices,
    notice: StatusNotice<T>,
    binder: Binder<T>,
    session: SessionConfig,
    registry: CallbackRegistry,
}

impl<T: ViewTree + Clone + 'static> ViewRuntime<T> {
    /// Builds a runtime; notice and highlight lifetimes come from the service configuration.
    pub fn new(tree: T, services: AdminServices) -> Self {
        let config = services.config.clone();
        let notice = StatusNotice::new(
            tree.clone(),
            services.scheduler.clone(),
            config.notice_lifetime(true),
            config.notice_lifetime(false),
        );
        let highlighter = Highlighter::new(
            tree.clone(),
            services.scheduler.clone(),
            config.highlight_lifetime(),
        );
        Self {
            binder: Binder::new(tree.clone(), highlighter),
            tree,
            services,
            notice,
            session: SessionConfig::default(),
            registry: CallbackRegistry::default(),
        }
    }

    /// Registers the handler for one response kind.
    pub fn register(&mut self, kind: ResponseKind, handler: Rc<dyn ResponseHandler>) {
        self.registry.register(kind, handler);
    }

    /// View tree handle.
    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Host services.
    pub fn services(&self) -> &AdminServices {
        &self.services
    }

    /// Status notice writer, shared with page modules.
    pub fn notice(&self) -> &StatusNotice<T> {
        &self.notice
    }

    /// Session values installed from `js` sections.
    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    /// Applies every section of `envelope` in order: `data`, `js`, `response`, `data-id`,
    /// then the registered handler.
    pub fn apply_envelope(&self, envelope: &Envelope) {
        let highlight = envelope.highlight();
        if let Some(data) = &envelope.data {
            self.binder.apply_data(data, highlight);
        }
        if let Some(values) = &envelope.js {
            for (key, value) in values {
                self.session.set(key.clone(), value.clone());
            }
        }
        if let Some(response) = &envelope.response {
            match response.outcome() {
                Some(ok) => self.set_response(ok, &response.text),
                None => warn!("ignoring response with status {}", response.status),
            }
        }
        if let Some(values) = &envelope.data_id {
            self.binder.apply_data_ids(values, highlight);
        }
        self.registry.dispatch(envelope);
    }

    /// Parses and applies one inbound text frame, returning the applied envelope.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Parse`] for malformed frames after logging them and showing an
    /// error notice.
    pub fn handle_message(&self, raw: &str) -> Result<Envelope, AdminError> {
        match Envelope::parse(raw) {
            Ok(envelope) => {
                self.apply_envelope(&envelope);
                Ok(envelope)
            }
            Err(err) => {
                warn!("discarding malformed control message: {err}");
                self.set_response(false, &format!("invalid message: {err}"));
                Err(AdminError::from(err))
            }
        }
    }

    /// Sends `command` to the device.
    ///
    /// # Errors
    ///
    /// See [`dispatch_command`].
    pub fn request(&self, command: Command) -> Result<(), AdminError> {
        dispatch_command(&self.services, &self.notice, command)
    }

    /// Shows a transient status message.
    pub fn set_response(&self, ok: bool, text: &str) {
        self.notice.show(ok, text);
    }

    /// Serializes `form_id`, uploads it as `<config_dir>/<page>.json` and asks the device to
    /// reload that page's configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] for an empty page name, [`AdminError::Transport`] when
    /// the upload fails and the [`ViewRuntime::request`] error when the reload cannot be sent.
    pub async fn save_form(
        &self,
        form_id: &str,
        page: &str,
        separator: Option<&Regex>,
    ) -> Result<(), AdminError> {
        if page.is_empty() {
            return Err(AdminError::validation("page name missing"));
        }
        let config = self.services.config.clone();
        let json = serialize_form(&self.tree, form_id, separator, &config.numeric_id_prefixes);
        let body = serde_json::to_string(&json)?;
        self.set_response(true, "save ...");

        let file_name = format!("{page}.json");
        let destination = format!("{}/{file_name}", config.config_dir.trim_end_matches('/'));
        let parts = [UploadPart::text(file_name, destination.clone(), &body)];
        let receipt = match self.services.blobs.upload(&parts).await {
            Ok(receipt) => receipt,
            Err(err) => {
                error!("saving {destination} failed: {err}");
                self.set_response(false, &err);
                return Err(AdminError::Transport(err));
            }
        };
        log!("saved {destination}");
        self.set_response(receipt.status != Some(0), &receipt.text);
        self.request(Command::new("ReloadConfig", page))
    }
}
