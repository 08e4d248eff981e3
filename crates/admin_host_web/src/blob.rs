//! Blob-transfer and download adapters backed by the browser bridge.

use admin_host::{BlobFuture, BlobStore, DownloadSink, UploadPart, UploadReceipt};

use crate::bridge;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Device file server reached through `fetch` and the multipart upload endpoint.
pub struct WebBlobStore {
    upload_endpoint: String,
}

impl WebBlobStore {
    /// Creates a store posting uploads to `upload_endpoint`.
    pub fn new(upload_endpoint: impl Into<String>) -> Self {
        Self {
            upload_endpoint: upload_endpoint.into(),
        }
    }

    /// Upload endpoint in use.
    pub fn upload_endpoint(&self) -> &str {
        &self.upload_endpoint
    }
}

impl BlobStore for WebBlobStore {
    fn fetch<'a>(&'a self, path: &'a str) -> BlobFuture<'a, Result<Vec<u8>, String>> {
        Box::pin(bridge::fetch_bytes(path))
    }

    fn upload<'a>(
        &'a self,
        parts: &'a [UploadPart],
    ) -> BlobFuture<'a, Result<UploadReceipt, String>> {
        Box::pin(bridge::upload_parts(&self.upload_endpoint, parts))
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Download adapter that clicks a hidden object-URL link.
pub struct WebDownloadSink;

impl DownloadSink for WebDownloadSink {
    fn save(&self, file_name: &str, mime: &str, bytes: &[u8]) -> Result<(), String> {
        bridge::save_download(file_name, mime, bytes)
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn native_build_reports_unavailable_transfers() {
        let store = WebBlobStore::new("/doUpload");
        assert_eq!(store.upload_endpoint(), "/doUpload");
        assert!(block_on(store.fetch("/config/a.json")).is_err());
        let parts = [UploadPart::text("a.txt", "/a.txt", "a")];
        assert!(block_on(store.upload(&parts)).is_err());
        assert!(WebDownloadSink.save("a.txt", "text/plain", b"a").is_err());
    }
}
