//! File manager page for the device admin UI.
//!
//! Lists the device filesystem through the control channel, renders it through the page's
//! `NewRow` template and loads, saves, downloads, deletes and creates files and folders. Zip
//! backup and restore cover the configuration directory.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod archive;
pub mod browser;
pub mod render;
pub mod snapshot;

pub use archive::{pack, unpack, ArchiveEntry};
pub use browser::{
    BackupReport, BrowserState, RemoteDirectoryBrowser, RestoreOutcome, CONTENT_ID, FILENAME_ID,
    FULLPATH_ID, LOADER_ID,
};
pub use render::{render_listing, RowAction, FILES_ID, PATH_ID, ROW_ATTRIBUTE, ROW_TEMPLATE_ID};
pub use snapshot::DirectorySnapshot;
