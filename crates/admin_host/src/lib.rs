//! Typed host-domain contracts and shared models for the device admin UI.
//!
//! This crate is the API-first boundary between the admin page modules and whatever is actually
//! talking to the device. It exposes the control-channel, blob-transfer, download and timer
//! service traits, the directory snapshot models, path helpers, the session configuration store
//! and the build-time configuration model. Concrete browser adapters live in `admin_host_web`;
//! the in-memory adapters here back native tests.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod blob;
pub mod channel;
pub mod config;
pub mod download;
pub mod fs;
pub mod host;
pub mod scheduler;
pub mod session;

pub use blob::{
    fetch_text_with, BlobFuture, BlobStore, MemoryBlobStore, NoopBlobStore, UploadPart,
    UploadReceipt,
};
pub use channel::{send_json_with, ControlChannel, MemoryControlChannel, NoopControlChannel};
pub use config::AdminConfig;
pub use download::{DownloadSink, MemoryDownloadSink, NoopDownloadSink, SavedDownload};
pub use fs::path::{basename, join_path, parent_path, strip_leading_slash};
pub use fs::types::{DirEntry, DirectoryRecord, ROOT_PATH};
pub use host::{AdminServices, MemoryHost};
pub use scheduler::{ManualScheduler, ScheduledTask, Scheduler, TimerHandle};
pub use session::SessionConfig;
