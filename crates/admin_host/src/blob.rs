//! Blob-transfer service contracts: raw file fetch and multipart upload against the device.

use std::{cell::RefCell, collections::BTreeMap, future::Future, pin::Pin, rc::Rc};

use serde::{Deserialize, Serialize};

/// Object-safe boxed future used by [`BlobStore`] async methods.
pub type BlobFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One part of a multipart upload request.
pub struct UploadPart {
    /// Form field name of the part.
    pub field_name: String,
    /// Destination path on the device, sent as the part's filename parameter.
    pub destination: String,
    /// MIME type attached to the part.
    pub mime: String,
    /// Raw part body.
    pub bytes: Vec<u8>,
}

impl UploadPart {
    /// Builds a `text/plain` part from UTF-8 text.
    pub fn text(
        field_name: impl Into<String>,
        destination: impl Into<String>,
        text: &str,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            destination: destination.into(),
            mime: "text/plain".to_string(),
            bytes: text.as_bytes().to_vec(),
        }
    }

    /// Builds an `application/octet-stream` part from raw bytes.
    pub fn binary(
        field_name: impl Into<String>,
        destination: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            destination: destination.into(),
            mime: "application/octet-stream".to_string(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// JSON body returned by the upload endpoint.
pub struct UploadReceipt {
    /// Optional `0|1` status flag. Older firmware omits it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u8>,
    /// User-facing status text, shown verbatim.
    pub text: String,
}

/// Host service for blob transfer against the device's HTTP file server.
pub trait BlobStore {
    /// Fetches the raw body served at `path`.
    fn fetch<'a>(&'a self, path: &'a str) -> BlobFuture<'a, Result<Vec<u8>, String>>;

    /// Posts `parts` to the upload endpoint as one multipart request.
    fn upload<'a>(&'a self, parts: &'a [UploadPart])
        -> BlobFuture<'a, Result<UploadReceipt, String>>;
}

/// Fetches `path` through a [`BlobStore`] and decodes the body as UTF-8 (lossy).
///
/// # Errors
///
/// Returns the store's transport error unchanged.
pub async fn fetch_text_with<S: BlobStore + ?Sized>(store: &S, path: &str) -> Result<String, String> {
    let bytes = store.fetch(path).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[derive(Debug, Clone, Copy, Default)]
/// Blob store adapter for hosts without a device file server.
pub struct NoopBlobStore;

impl BlobStore for NoopBlobStore {
    fn fetch<'a>(&'a self, path: &'a str) -> BlobFuture<'a, Result<Vec<u8>, String>> {
        Box::pin(async move { Err(format!("blob store unavailable: fetch {path}")) })
    }

    fn upload<'a>(
        &'a self,
        _parts: &'a [UploadPart],
    ) -> BlobFuture<'a, Result<UploadReceipt, String>> {
        Box::pin(async { Err("blob store unavailable: upload".to_string()) })
    }
}

#[derive(Debug, Default)]
struct MemoryBlobState {
    files: BTreeMap<String, Vec<u8>>,
    failing: Vec<String>,
    fetches: Vec<String>,
    uploads: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
/// In-memory device file server keyed by absolute path.
///
/// Uploads store each part under its destination and answer like the firmware does
/// (`{"status":1,"text":"OK"}`). Paths registered with [`MemoryBlobStore::fail_path`] fail both
/// fetch and upload.
pub struct MemoryBlobStore {
    inner: Rc<RefCell<MemoryBlobState>>,
}

impl MemoryBlobStore {
    /// Stores `bytes` under `path`, replacing any previous body.
    pub fn insert(&self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.inner
            .borrow_mut()
            .files
            .insert(path.into(), bytes.into());
    }

    /// Returns the stored body for `path`.
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.inner.borrow().files.get(path).cloned()
    }

    /// Returns the stored body for `path` decoded as UTF-8.
    pub fn get_text(&self, path: &str) -> Option<String> {
        self.get(path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Makes every transfer touching `path` fail.
    pub fn fail_path(&self, path: impl Into<String>) {
        self.inner.borrow_mut().failing.push(path.into());
    }

    /// Paths fetched so far, in request order.
    pub fn fetched_paths(&self) -> Vec<String> {
        self.inner.borrow().fetches.clone()
    }

    /// Number of upload requests issued so far.
    pub fn upload_count(&self) -> usize {
        self.inner.borrow().uploads.len()
    }

    /// Destinations of every uploaded part, flattened in request order.
    pub fn uploaded_paths(&self) -> Vec<String> {
        self.inner.borrow().uploads.iter().flatten().cloned().collect()
    }

    fn is_failing(&self, path: &str) -> bool {
        self.inner.borrow().failing.iter().any(|p| p == path)
    }
}

impl BlobStore for MemoryBlobStore {
    fn fetch<'a>(&'a self, path: &'a str) -> BlobFuture<'a, Result<Vec<u8>, String>> {
        Box::pin(async move {
            self.inner.borrow_mut().fetches.push(path.to_string());
            if self.is_failing(path) {
                return Err(format!("404 Not Found: {path}"));
            }
            self.get(path).ok_or_else(|| format!("404 Not Found: {path}"))
        })
    }

    fn upload<'a>(
        &'a self,
        parts: &'a [UploadPart],
    ) -> BlobFuture<'a, Result<UploadReceipt, String>> {
        Box::pin(async move {
            let destinations = parts
                .iter()
                .map(|part| part.destination.clone())
                .collect::<Vec<_>>();
            self.inner.borrow_mut().uploads.push(destinations);

            if let Some(part) = parts.iter().find(|part| self.is_failing(&part.destination)) {
                return Err(format!("500 Internal Server Error: {}", part.destination));
            }
            for part in parts {
                self.insert(part.destination.clone(), part.bytes.clone());
            }
            Ok(UploadReceipt {
                status: Some(1),
                text: "OK".to_string(),
            })
        })
    }
}
