//! Client-side download contracts ("save as" of generated content).

use std::{cell::RefCell, rc::Rc};

/// Host service that hands generated bytes to the user as a file download.
pub trait DownloadSink {
    /// Offers `bytes` to the user as `file_name`.
    ///
    /// # Errors
    ///
    /// Returns an error when the host cannot start the download.
    fn save(&self, file_name: &str, mime: &str, bytes: &[u8]) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Download adapter for hosts without a download surface.
pub struct NoopDownloadSink;

impl DownloadSink for NoopDownloadSink {
    fn save(&self, file_name: &str, _mime: &str, _bytes: &[u8]) -> Result<(), String> {
        Err(format!("downloads unavailable: {file_name}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Download captured by [`MemoryDownloadSink`].
pub struct SavedDownload {
    /// Suggested file name.
    pub file_name: String,
    /// MIME type.
    pub mime: String,
    /// File body.
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
/// Download adapter that keeps every saved file in memory.
pub struct MemoryDownloadSink {
    saved: Rc<RefCell<Vec<SavedDownload>>>,
}

impl MemoryDownloadSink {
    /// Returns all downloads in the order they were saved.
    pub fn saved(&self) -> Vec<SavedDownload> {
        self.saved.borrow().clone()
    }

    /// Returns the most recent download.
    pub fn last(&self) -> Option<SavedDownload> {
        self.saved.borrow().last().cloned()
    }
}

impl DownloadSink for MemoryDownloadSink {
    fn save(&self, file_name: &str, mime: &str, bytes: &[u8]) -> Result<(), String> {
        self.saved.borrow_mut().push(SavedDownload {
            file_name: file_name.to_string(),
            mime: mime.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}
