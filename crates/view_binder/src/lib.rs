//! Template binder for the device admin UI.
//!
//! Inbound control-channel envelopes are applied to a [`ViewTree`]: `data` sections stamp
//! `<template>` rows and overwrite leaf values, `data-id` sections patch attribute-addressed
//! nodes, `js` sections land in the [`admin_host::SessionConfig`] store, `response` sections
//! become a transient status line, and `cmd.callbackFn` routes the envelope to a typed
//! [`ResponseHandler`]. Form serialization and visibility toggles for configuration pages live
//! here as well.
//!
//! [`MemoryDocument`] implements the tree in memory so everything runs natively in tests.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod binder;
pub mod envelope;
pub mod error;
pub mod form;
pub mod memory;
pub mod notice;
pub mod registry;
pub mod runtime;
pub mod toggle;
pub mod tree;

pub use binder::Binder;
pub use envelope::{Command, Envelope, JsonMap, OutboundMessage, ResponseKind, ResponseNotice};
pub use error::AdminError;
pub use form::{form_fingerprint, is_visible, page_name, serialize_form, DirtyTracker};
pub use memory::{ElementSpec, MemoryDocument, NodeRef};
pub use notice::{Highlighter, StatusNotice};
pub use registry::{CallbackRegistry, ResponseHandler};
pub use runtime::{dispatch_command, ViewRuntime, CHANNEL_CLOSED_TEXT};
pub use toggle::{apply_initial_toggles, apply_toggle_for, VisibilityToggle};
pub use tree::ViewTree;
