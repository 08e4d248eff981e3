//! WebSocket control channel with fixed-interval reconnect.
//!
//! The socket reconnects `reconnect_interval` after every close, with no backoff and no retry
//! cap. While the page is hidden the socket is closed and reconnection is suspended; becoming
//! visible reconnects immediately.

use std::{rc::Rc, time::Duration};

use admin_host::{ControlChannel, Scheduler};

/// Callback receiving every inbound text frame.
pub type MessageCallback = Rc<dyn Fn(String)>;
/// Callback receiving connection state changes.
pub type StatusCallback = Rc<dyn Fn(ChannelStatus)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Connection state reported to the status callback.
pub enum ChannelStatus {
    /// Socket open.
    Open,
    /// Socket closed; a reconnect is pending unless the page is hidden.
    Closed,
    /// Socket reported an error and is being closed.
    Failed,
}

impl ChannelStatus {
    /// Indicator colour used by the host page.
    pub fn indicator_color(self) -> &'static str {
        match self {
            Self::Open => "green",
            Self::Closed => "yellow",
            Self::Failed => "red",
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod imp {
    use std::cell::{Cell, RefCell};

    use admin_host::TimerHandle;
    use leptos::logging::{log, warn};
    use wasm_bindgen::{closure::Closure, JsCast, JsValue};
    use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

    use super::*;
    use crate::bridge::js_error_to_string;

    struct SocketHandlers {
        _on_open: Closure<dyn FnMut(Event)>,
        _on_message: Closure<dyn FnMut(MessageEvent)>,
        _on_close: Closure<dyn FnMut(CloseEvent)>,
        _on_error: Closure<dyn FnMut(Event)>,
    }

    fn page_hidden() -> bool {
        web_sys::window()
            .and_then(|window| window.document())
            .is_some_and(|document| document.hidden())
    }

    pub(super) struct ChannelInner {
        url: String,
        reconnect_interval: Duration,
        scheduler: Rc<dyn Scheduler>,
        on_message: MessageCallback,
        on_status: StatusCallback,
        socket: RefCell<Option<WebSocket>>,
        handlers: RefCell<Option<SocketHandlers>>,
        reconnect: Cell<Option<TimerHandle>>,
        suspended: Cell<bool>,
        visibility: RefCell<Option<Closure<dyn FnMut(Event)>>>,
    }

    impl ChannelInner {
        pub(super) fn new(
            url: String,
            reconnect_interval: Duration,
            scheduler: Rc<dyn Scheduler>,
            on_message: MessageCallback,
            on_status: StatusCallback,
        ) -> Rc<Self> {
            Rc::new(Self {
                url,
                reconnect_interval,
                scheduler,
                on_message,
                on_status,
                socket: RefCell::new(None),
                handlers: RefCell::new(None),
                reconnect: Cell::new(None),
                suspended: Cell::new(false),
                visibility: RefCell::new(None),
            })
        }

        pub(super) fn connect(self: &Rc<Self>) {
            if let Some(handle) = self.reconnect.take() {
                self.scheduler.cancel(handle);
            }
            if page_hidden() {
                self.suspended.set(true);
            }
            if self.is_open() || self.suspended.get() {
                return;
            }
            let socket = match WebSocket::new(&self.url) {
                Ok(socket) => socket,
                Err(err) => {
                    warn!("control channel connect to {} failed: {}", self.url, js_error_to_string(err));
                    self.schedule_reconnect();
                    return;
                }
            };

            let weak = Rc::downgrade(self);
            let on_open = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                if let Some(inner) = weak.upgrade() {
                    log!("control channel open: {}", inner.url);
                    (inner.on_status)(ChannelStatus::Open);
                }
            });
            let weak = Rc::downgrade(self);
            let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                match event.data().as_string() {
                    Some(text) => (inner.on_message)(text),
                    None => warn!("ignoring non-text control frame"),
                }
            });
            let weak = Rc::downgrade(self);
            let on_close = Closure::<dyn FnMut(CloseEvent)>::new(move |event: CloseEvent| {
                if let Some(inner) = weak.upgrade() {
                    log!("control channel closed ({})", event.code());
                    (inner.on_status)(ChannelStatus::Closed);
                    inner.schedule_reconnect();
                }
            });
            let weak = Rc::downgrade(self);
            let on_error = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                warn!("control channel error");
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                (inner.on_status)(ChannelStatus::Failed);
                if let Some(socket) = inner.socket.borrow().as_ref() {
                    let _ = socket.close();
                }
            });

            socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
            socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
            socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));
            socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));

            *self.handlers.borrow_mut() = Some(SocketHandlers {
                _on_open: on_open,
                _on_message: on_message,
                _on_close: on_close,
                _on_error: on_error,
            });
            *self.socket.borrow_mut() = Some(socket);
        }

        fn schedule_reconnect(self: &Rc<Self>) {
            if self.suspended.get() {
                return;
            }
            if let Some(handle) = self.reconnect.take() {
                self.scheduler.cancel(handle);
            }
            let weak = Rc::downgrade(self);
            let handle = self.scheduler.schedule(
                self.reconnect_interval,
                Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.reconnect.set(None);
                        inner.connect();
                    }
                }),
            );
            self.reconnect.set(Some(handle));
        }

        fn suspend(&self) {
            self.suspended.set(true);
            if let Some(handle) = self.reconnect.take() {
                self.scheduler.cancel(handle);
            }
            if let Some(socket) = self.socket.borrow_mut().take() {
                if let Err(err) = socket.close() {
                    warn!("control channel close failed: {}", js_error_to_string(err));
                }
            }
        }

        pub(super) fn watch_visibility(self: &Rc<Self>) {
            let Some(document) = web_sys::window().and_then(|window| window.document()) else {
                return;
            };
            let weak = Rc::downgrade(self);
            let listener = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if page_hidden() {
                    inner.suspend();
                } else {
                    inner.suspended.set(false);
                    inner.connect();
                }
            });
            if let Err(err) = document
                .add_event_listener_with_callback("visibilitychange", listener.as_ref().unchecked_ref())
            {
                warn!("visibility listener failed: {}", js_error_to_string(err));
                return;
            }
            *self.visibility.borrow_mut() = Some(listener);
        }

        pub(super) fn is_open(&self) -> bool {
            self.socket
                .borrow()
                .as_ref()
                .is_some_and(|socket| socket.ready_state() == WebSocket::OPEN)
        }

        pub(super) fn send_text(&self, payload: &str) -> Result<(), String> {
            let socket = self.socket.borrow();
            match socket.as_ref() {
                Some(socket) if socket.ready_state() == WebSocket::OPEN => socket
                    .send_with_str(payload)
                    .map_err(|err: JsValue| js_error_to_string(err)),
                _ => Err("control channel closed".to_string()),
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use super::*;

    pub(super) struct ChannelInner {
        url: String,
    }

    impl ChannelInner {
        pub(super) fn new(
            url: String,
            _reconnect_interval: Duration,
            _scheduler: Rc<dyn Scheduler>,
            _on_message: MessageCallback,
            _on_status: StatusCallback,
        ) -> Rc<Self> {
            Rc::new(Self { url })
        }

        pub(super) fn connect(self: &Rc<Self>) {
            let _ = &self.url;
        }

        pub(super) fn watch_visibility(self: &Rc<Self>) {}

        pub(super) fn is_open(&self) -> bool {
            false
        }

        pub(super) fn send_text(&self, _payload: &str) -> Result<(), String> {
            Err(format!(
                "control channel to {} is only available when compiled for wasm32",
                self.url
            ))
        }
    }
}

#[derive(Clone)]
/// Browser WebSocket [`ControlChannel`].
pub struct WebSocketChannel {
    inner: Rc<imp::ChannelInner>,
}

impl WebSocketChannel {
    /// Opens the socket and starts watching page visibility.
    pub fn connect(
        url: impl Into<String>,
        reconnect_interval: Duration,
        scheduler: Rc<dyn Scheduler>,
        on_message: MessageCallback,
        on_status: StatusCallback,
    ) -> Self {
        let inner = imp::ChannelInner::new(
            url.into(),
            reconnect_interval,
            scheduler,
            on_message,
            on_status,
        );
        inner.watch_visibility();
        inner.connect();
        Self { inner }
    }
}

impl ControlChannel for WebSocketChannel {
    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn send_text(&self, payload: &str) -> Result<(), String> {
        self.inner.send_text(payload)
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use admin_host::ManualScheduler;

    use super::*;

    #[test]
    fn native_channel_is_never_open() {
        let channel = WebSocketChannel::connect(
            "ws://device/ajaxws",
            Duration::from_secs(5),
            Rc::new(ManualScheduler::default()),
            Rc::new(|_: String| {}),
            Rc::new(|_: ChannelStatus| {}),
        );
        assert!(!channel.is_open());
        assert!(channel.send_text("{}").is_err());
    }

    #[test]
    fn status_colors_match_indicator() {
        assert_eq!(ChannelStatus::Open.indicator_color(), "green");
        assert_eq!(ChannelStatus::Closed.indicator_color(), "yellow");
        assert_eq!(ChannelStatus::Failed.indicator_color(), "red");
    }
}
