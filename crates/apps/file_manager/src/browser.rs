//! Remote directory browser: listing, navigation and file operations against the device.

use std::{cell::RefCell, rc::Rc};

use admin_host::{
    basename, fetch_text_with, join_path, parent_path, strip_leading_slash, AdminServices,
    UploadPart, ROOT_PATH,
};
use leptos::logging::{error, log, warn};
use view_binder::{
    dispatch_command, AdminError, Command, Envelope, ResponseHandler, ResponseKind,
    StatusNotice, ViewTree,
};

use crate::{
    archive::{pack, unpack, ArchiveEntry},
    render::{render_listing, RowAction, PATH_ID},
    snapshot::DirectorySnapshot,
};

/// Id of the element showing the loaded file's full path.
pub const FULLPATH_ID: &str = "fullpath";
/// Id of the file name input.
pub const FILENAME_ID: &str = "filename";
/// Id of the editor textarea.
pub const CONTENT_ID: &str = "content";
/// Id of the loading overlay.
pub const LOADER_ID: &str = "loader";

const FILES_ACTION: &str = "handlefiles";
const EMPTY_FILENAME: &str = "Filename is empty, Please define it.";
const EMPTY_FOLDER_NAME: &str = "Folder name is empty, Please define it.";
const ROOT_DELETE: &str = "You cannot delete the root folder.";
const INVALID_JSON: &str = "Json invalid";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Lifecycle of the browser.
pub enum BrowserState {
    /// Nothing requested yet.
    Idle,
    /// Listing of the path was requested.
    ListingRequested(String),
    /// Listing of the path is rendered.
    Listed(String),
    /// A row navigation to the path is in progress.
    Navigating(String),
    /// The file at the path is being loaded.
    FetchingFile(String),
    /// A delete, add-folder, upload or backup is in progress.
    Mutating,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Outcome of a zip backup.
pub struct BackupReport {
    /// Device paths stored in the archive.
    pub archived: Vec<String>,
    /// Device paths that could not be fetched.
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of restoring one archive entry.
pub struct RestoreOutcome {
    /// Device path the entry was uploaded to.
    pub path: String,
    /// Upload result; the error carries the transport message.
    pub result: Result<(), String>,
}

struct BrowserInner {
    state: BrowserState,
    snapshot: DirectorySnapshot,
    rows: Vec<RowAction>,
}

/// File manager bound to the page's listing table and editor.
///
/// Clones share state. Responses are matched to requests only by their callback name, so the
/// last listing to arrive is the one shown.
pub struct RemoteDirectoryBrowser<T: ViewTree> {
    tree: T,
    services: AdminServices,
    notice: StatusNotice<T>,
    inner: Rc<RefCell<BrowserInner>>,
}

impl<T: ViewTree + Clone> Clone for RemoteDirectoryBrowser<T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            services: self.services.clone(),
            notice: self.notice.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl<T: ViewTree + Clone + 'static> RemoteDirectoryBrowser<T> {
    /// Creates an idle browser.
    pub fn new(tree: T, services: AdminServices, notice: StatusNotice<T>) -> Self {
        Self {
            tree,
            services,
            notice,
            inner: Rc::new(RefCell::new(BrowserInner {
                state: BrowserState::Idle,
                snapshot: DirectorySnapshot::default(),
                rows: Vec::new(),
            })),
        }
    }

    /// Handler to register for [`ResponseKind::Files`].
    pub fn response_handler(&self) -> Rc<dyn ResponseHandler> {
        let browser = self.clone();
        Rc::new(move |envelope: &Envelope| browser.handle_listing(envelope))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BrowserState {
        self.inner.borrow().state.clone()
    }

    /// Copy of the cached listings.
    pub fn snapshot(&self) -> DirectorySnapshot {
        self.inner.borrow().snapshot.clone()
    }

    /// Actions of the rendered rows, indexed by `data-row`.
    pub fn row_actions(&self) -> Vec<RowAction> {
        self.inner.borrow().rows.clone()
    }

    /// Directory shown in the path header.
    pub fn current_path(&self) -> String {
        self.tree
            .element_by_id(PATH_ID)
            .map(|node| self.tree.content(&node))
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| ROOT_PATH.to_string())
    }

    fn set_state(&self, state: BrowserState) {
        self.inner.borrow_mut().state = state;
    }

    fn set_value(&self, id: &str, value: &str) {
        if let Some(node) = self.tree.element_by_id(id) {
            self.tree.set_value(&node, value);
        }
    }

    fn value(&self, id: &str) -> String {
        self.tree
            .element_by_id(id)
            .map(|node| self.tree.value(&node))
            .unwrap_or_default()
    }

    fn set_content(&self, id: &str, content: &str) {
        if let Some(node) = self.tree.element_by_id(id) {
            self.tree.set_content(&node, content);
        }
    }

    fn reject(&self, message: &str) -> AdminError {
        self.notice.show(false, message);
        AdminError::validation(message)
    }

    fn transport_failure(&self, context: &str, err: String) -> AdminError {
        error!("{context}: {err}");
        self.notice.show(false, &format!("{context}: {err}"));
        AdminError::Transport(err)
    }

    fn send(&self, command: Command) -> Result<(), AdminError> {
        dispatch_command(&self.services, &self.notice, command)
    }

    /// Requests the listing of `path` and clears the editor right away.
    ///
    /// # Errors
    ///
    /// Returns the send error when the control channel is unavailable.
    pub fn request_listing(&self, path: &str) -> Result<(), AdminError> {
        self.set_content(FULLPATH_ID, "");
        self.set_value(FILENAME_ID, "");
        self.set_value(CONTENT_ID, "");
        if let Some(loader) = self.tree.element_by_id(LOADER_ID) {
            self.tree.set_style(&loader, "visibility", "hidden");
        }
        let root = self.tree.root();
        if let Some(body) = self
            .tree
            .descendants(&root)
            .into_iter()
            .find(|node| self.tree.tag_name(node) == "body")
        {
            self.tree.set_style(&body, "visibility", "visible");
        }

        self.set_state(BrowserState::ListingRequested(path.to_string()));
        self.send(
            Command::new(FILES_ACTION, "listDir")
                .with_startpath(path)
                .with_callback(ResponseKind::Files),
        )
    }

    /// Replaces the snapshot with `JS.listdir` and renders `cmd.startpath`.
    pub fn handle_listing(&self, envelope: &Envelope) {
        let Some(listing) = envelope.payload_entry("listdir") else {
            warn!("listing response without JS.listdir");
            return;
        };
        let snapshot = match DirectorySnapshot::from_listing(listing) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("discarding directory listing: {err}");
                self.notice.show(false, &err.to_string());
                return;
            }
        };
        let path = envelope
            .cmd
            .as_ref()
            .and_then(|cmd| cmd.startpath.clone())
            .unwrap_or_else(|| ROOT_PATH.to_string());
        self.inner.borrow_mut().snapshot = snapshot;
        self.render(&path);
    }

    /// Renders the cached listing of `path`.
    pub fn render(&self, path: &str) {
        let snapshot = self.snapshot();
        let rows = render_listing(&self.tree, &snapshot, path);
        let mut inner = self.inner.borrow_mut();
        inner.rows = rows;
        inner.state = BrowserState::Listed(path.to_string());
    }

    /// Runs the action of the row with `data-row` index `index`.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] for an unknown index, otherwise the error of the
    /// navigation or fetch.
    pub async fn activate_row(&self, index: usize) -> Result<(), AdminError> {
        let action = self.inner.borrow().rows.get(index).cloned();
        match action {
            Some(RowAction::Navigate(path)) => {
                self.set_state(BrowserState::Navigating(path.clone()));
                self.request_listing(&path)
            }
            Some(RowAction::FetchFile(path)) => self.fetch_file(&path).await,
            None => Err(AdminError::validation(format!("no row {index}"))),
        }
    }

    /// Loads `path` into the editor. JSON files are pretty-printed.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Transport`] when the file cannot be fetched.
    pub async fn fetch_file(&self, path: &str) -> Result<(), AdminError> {
        let previous = self.state();
        self.set_state(BrowserState::FetchingFile(path.to_string()));
        self.set_value(CONTENT_ID, &format!("loading {path}..."));

        let fetched = fetch_text_with(self.services.blobs.as_ref(), path).await;
        self.set_state(previous);
        let text = fetched.map_err(|err| self.transport_failure(&format!("Failed to fetch file: {path}"), err))?;

        self.set_content(FULLPATH_ID, path);
        self.set_value(FILENAME_ID, basename(path));
        let shown = if path.ends_with("json") {
            serde_json::from_str::<serde_json::Value>(&text)
                .and_then(|json| serde_json::to_string_pretty(&json))
                .unwrap_or(text)
        } else {
            text
        };
        self.set_value(CONTENT_ID, &shown);
        Ok(())
    }

    /// Uploads the editor content as `<current path>/<filename>`.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] for an empty filename or invalid JSON in a `.json`
    /// file (no request is made), [`AdminError::Transport`] when the upload fails.
    pub async fn upload_file(&self) -> Result<(), AdminError> {
        let filename = self.value(FILENAME_ID);
        let content = self.value(CONTENT_ID);
        if filename.is_empty() {
            return Err(self.reject(EMPTY_FILENAME));
        }
        if filename.to_lowercase().ends_with(".json")
            && serde_json::from_str::<serde_json::Value>(&content).is_err()
        {
            return Err(self.reject(INVALID_JSON));
        }

        self.notice.show(true, "Please wait for saving ...");
        let destination = join_path(&self.current_path(), &filename);
        let parts = [UploadPart::text(filename, destination.clone(), &content)];
        let receipt = self
            .services
            .blobs
            .upload(&parts)
            .await
            .map_err(|err| self.transport_failure(&format!("Failed to upload {destination}"), err))?;
        log!("uploaded {destination}");
        self.notice.show(receipt.status != Some(0), &receipt.text);
        Ok(())
    }

    /// Offers the editor content as a client-side download named after the filename field.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] for an empty filename and [`AdminError::Transport`]
    /// when the host cannot start the download.
    pub fn download_file(&self) -> Result<(), AdminError> {
        let filename = self.value(FILENAME_ID);
        if filename.is_empty() {
            return Err(self.reject(EMPTY_FILENAME));
        }
        let content = self.value(CONTENT_ID);
        self.services
            .downloads
            .save(&filename, "text/plain", content.as_bytes())
            .map_err(|err| self.transport_failure("Download failed", err))
    }

    /// Deletes `<current path>/<filename>` and re-lists the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] for an empty filename, otherwise the send error.
    pub fn delete_file(&self) -> Result<(), AdminError> {
        let filename = self.value(FILENAME_ID);
        if filename.is_empty() {
            return Err(self.reject(EMPTY_FILENAME));
        }
        let path = self.current_path();
        self.mutate(
            Command::new(FILES_ACTION, "deleteFile").with_filename(join_path(&path, &filename)),
            "Please wait for deleting ...",
            &path,
        )
    }

    /// Deletes the current directory and re-lists its parent.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] at the root, otherwise the send error.
    pub fn delete_folder(&self) -> Result<(), AdminError> {
        let path = self.current_path();
        if path == ROOT_PATH {
            return Err(self.reject(ROOT_DELETE));
        }
        self.mutate(
            Command::new(FILES_ACTION, "deleteFolder").with_foldername(path.clone()),
            "Please wait for deleting ...",
            &parent_path(&path),
        )
    }

    /// Creates `<current path>/<name>` and re-lists the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] for an empty name, otherwise the send error.
    pub fn add_folder(&self, name: &str) -> Result<(), AdminError> {
        if name.is_empty() {
            return Err(self.reject(EMPTY_FOLDER_NAME));
        }
        let path = self.current_path();
        self.mutate(
            Command::new(FILES_ACTION, "addFolder").with_foldername(join_path(&path, name)),
            "Please wait for adding ...",
            &path,
        )
    }

    fn mutate(&self, command: Command, notice: &str, relist: &str) -> Result<(), AdminError> {
        self.set_state(BrowserState::Mutating);
        self.notice.show(true, notice);
        self.send(command)?;
        self.request_listing(relist)
    }

    /// Archives every cached file under the backup prefix and offers the zip as a download.
    ///
    /// Files that cannot be fetched are reported and left out.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Archive`] when packing fails and [`AdminError::Transport`] when
    /// the download cannot start.
    pub async fn backup_zip(&self) -> Result<BackupReport, AdminError> {
        let config = self.services.config.clone();
        let paths = self.snapshot().files_under(&config.backup_prefix);
        let previous = self.state();
        self.set_state(BrowserState::Mutating);

        let mut report = BackupReport::default();
        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            match self.services.blobs.fetch(&path).await {
                Ok(bytes) => {
                    entries.push(ArchiveEntry::new(strip_leading_slash(&path), bytes));
                    report.archived.push(path);
                }
                Err(err) => {
                    error!("Failed to fetch {path}: {err}");
                    self.notice
                        .show(false, &format!("Failed to fetch file: {path}"));
                    report.failed.push(path);
                }
            }
        }
        self.set_state(previous);

        let archive = pack(&entries)?;
        self.services
            .downloads
            .save(&config.backup_archive_name, "application/zip", &archive)
            .map_err(|err| self.transport_failure("Download failed", err))?;
        log!(
            "backup archived {} file(s), {} failed",
            report.archived.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Uploads every file of `archive` to `/<entry name>`, one request per file.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Archive`] when the archive cannot be read. Per-file failures are
    /// reported in the outcomes and do not stop the batch.
    pub async fn restore_zip(&self, archive: &[u8]) -> Result<Vec<RestoreOutcome>, AdminError> {
        let entries = unpack(archive).map_err(|err| {
            self.notice.show(false, &err.to_string());
            err
        })?;
        let previous = self.state();
        self.set_state(BrowserState::Mutating);

        let mut outcomes = Vec::with_capacity(entries.len());
        for entry in entries {
            let path = format!("/{}", strip_leading_slash(&entry.name));
            let parts = [UploadPart::binary("file", path.clone(), entry.bytes)];
            let result = match self.services.blobs.upload(&parts).await {
                Ok(_) => {
                    log!("Uploaded {path} successfully.");
                    self.notice
                        .show(true, &format!("Uploaded {} successfully.", entry.name));
                    Ok(())
                }
                Err(err) => {
                    error!("Failed to upload {path}: {err}");
                    self.notice
                        .show(false, &format!("Failed to upload {}: {err}", entry.name));
                    Err(err)
                }
            };
            outcomes.push(RestoreOutcome { path, result });
        }
        self.set_state(previous);
        Ok(outcomes)
    }
}
