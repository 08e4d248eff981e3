//! Browser service bundle assembly.

use std::{cell::RefCell, rc::Rc, time::Duration};

use admin_host::{AdminConfig, AdminServices, Scheduler};
use leptos::logging::{log, warn};

use crate::{
    MessageCallback, StatusCallback, WebBlobStore, WebDownloadSink, WebScheduler, WebSocketChannel,
};

#[derive(Clone, Default)]
/// Late-bound inbound frame handler.
///
/// The channel is created before the view runtime that consumes its frames; frames arriving
/// before [`InboundSlot::install`] are dropped with a warning.
pub struct InboundSlot {
    handler: Rc<RefCell<Option<MessageCallback>>>,
}

impl InboundSlot {
    /// Installs the consumer of inbound frames, replacing any previous one.
    pub fn install(&self, handler: MessageCallback) {
        *self.handler.borrow_mut() = Some(handler);
    }

    /// Routes one frame to the installed handler.
    pub fn deliver(&self, frame: String) {
        let handler = self.handler.borrow().clone();
        match handler {
            Some(handler) => handler(frame),
            None => warn!("dropping control frame received before the view runtime was ready"),
        }
    }
}

/// Services wired to the browser plus the slot receiving control-channel frames.
pub struct WebHost {
    /// Service bundle handed to the view runtime.
    pub services: AdminServices,
    /// Inbound frame slot; install the runtime's message handler here.
    pub inbound: InboundSlot,
}

fn page_origin() -> Option<String> {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window().and_then(|window| window.location().origin().ok())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}

/// Builds browser adapters for `config` and opens the control channel.
///
/// Without a browser window the offline bundle is returned and no channel is opened.
/// `on_status` observes every control-channel state change.
pub fn build_admin_services(config: AdminConfig, on_status: StatusCallback) -> WebHost {
    let scheduler: Rc<dyn Scheduler> = Rc::new(WebScheduler::default());
    let inbound = InboundSlot::default();
    let Some(origin) = page_origin() else {
        warn!("no browser window; admin host runs offline");
        return WebHost {
            services: AdminServices::offline(config, scheduler),
            inbound,
        };
    };
    let url = config.resolve_socket_url(&origin);
    log!("admin host connecting to {url}");

    let slot = inbound.clone();
    let channel = WebSocketChannel::connect(
        url,
        Duration::from_millis(config.reconnect_interval_ms),
        scheduler.clone(),
        Rc::new(move |frame: String| slot.deliver(frame)),
        on_status,
    );

    let services = AdminServices {
        channel: Rc::new(channel),
        blobs: Rc::new(WebBlobStore::new(config.upload_endpoint.clone())),
        downloads: Rc::new(WebDownloadSink),
        scheduler,
        config: Rc::new(config),
    };
    WebHost { services, inbound }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::ChannelStatus;

    #[test]
    fn inbound_slot_delivers_after_install() {
        let slot = InboundSlot::default();
        let seen = Rc::new(Cell::new(0));
        slot.deliver("early".to_string());

        let counter = seen.clone();
        slot.install(Rc::new(move |frame: String| {
            assert_eq!(frame, "{}");
            counter.set(counter.get() + 1);
        }));
        slot.deliver("{}".to_string());
        slot.clone().deliver("{}".to_string());

        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn native_host_falls_back_to_offline_services() {
        let statuses = Rc::new(Cell::new(0));
        let counter = statuses.clone();
        let host = build_admin_services(
            AdminConfig::default(),
            Rc::new(move |_: ChannelStatus| counter.set(counter.get() + 1)),
        );

        assert!(!host.services.channel.is_open());
        assert!(host.services.downloads.save("a.txt", "text/plain", b"a").is_err());
        assert_eq!(*host.services.config, AdminConfig::default());
        assert_eq!(statuses.get(), 0);
    }
}
