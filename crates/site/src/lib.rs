//! Browser entrypoint for the device admin UI.
//!
//! The host page is served by the device; this crate binds to it rather than rendering it.
//! Configuration comes from `admin.config.toml`, validated and embedded at build time.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod actions;
#[cfg(all(feature = "csr", target_arch = "wasm32"))]
mod app;
pub mod config;

pub use actions::{action_for, row_index_for, PageAction};
pub use config::{load_config, ADMIN_CONFIG_JSON};

#[cfg(all(feature = "csr", target_arch = "wasm32"))]
/// Connects to the device and binds the admin runtime to the current document.
pub fn mount() {
    app::mount();
}
