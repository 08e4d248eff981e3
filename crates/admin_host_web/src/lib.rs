//! Browser adapters for the admin host traits.
//!
//! [`build_admin_services`] assembles a WebSocket [`WebSocketChannel`], a `fetch`-backed
//! [`WebBlobStore`], an object-URL [`WebDownloadSink`] and a `setTimeout` [`WebScheduler`].
//! [`WebViewTree`] exposes the live document to the view runtime.
//!
//! Only the wasm32 build reaches the browser; native builds compile stubs that report errors.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod adapters;
pub mod blob;
pub mod bridge;
pub mod channel;
pub mod scheduler;
pub mod tree;

pub use adapters::{build_admin_services, InboundSlot, WebHost};
pub use blob::{WebBlobStore, WebDownloadSink};
pub use channel::{ChannelStatus, MessageCallback, StatusCallback, WebSocketChannel};
pub use scheduler::WebScheduler;
pub use tree::WebViewTree;
