//! Declarative page actions read from host-page markup.
//!
//! Buttons and inputs carry `data-action="<name>"`; optional `data-source`, `data-form` and
//! `data-separator` attributes parameterize the action. Clicks are delegated from the document,
//! so these helpers walk from the event target up to the nearest annotated ancestor.

use admin_app_file_manager::ROW_ATTRIBUTE;
use view_binder::ViewTree;

/// Attribute naming the action of an element.
pub const ACTION_ATTRIBUTE: &str = "data-action";
/// Attribute naming the input that supplies an action argument.
pub const SOURCE_ATTRIBUTE: &str = "data-source";
/// Attribute naming the form saved by [`PageAction::SaveForm`].
pub const FORM_ATTRIBUTE: &str = "data-form";
/// Attribute holding the row separator pattern of [`PageAction::SaveForm`].
pub const SEPARATOR_ATTRIBUTE: &str = "data-separator";

const DEFAULT_FOLDER_SOURCE: &str = "foldername";
const DEFAULT_FORM: &str = "DataForm";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Action bound to an element of the host page.
pub enum PageAction {
    /// Re-lists the current directory.
    RefreshListing,
    /// Uploads the editor content.
    UploadFile,
    /// Saves the editor content client-side.
    DownloadFile,
    /// Deletes the file named in the editor.
    DeleteFile,
    /// Deletes the current directory.
    DeleteFolder,
    /// Creates a folder named by the value of input `source_id`.
    AddFolder {
        /// Input holding the folder name.
        source_id: String,
    },
    /// Downloads a zip backup.
    Backup,
    /// Restores the zip chosen in a file input.
    Restore,
    /// Serializes and saves a form.
    SaveForm {
        /// Form element id.
        form_id: String,
        /// Row separator pattern, when the form holds repeated rows.
        separator: Option<String>,
    },
}

impl PageAction {
    /// Reads the action declared on `node`, if any.
    pub fn from_node<T: ViewTree>(tree: &T, node: &T::Node) -> Option<Self> {
        let name = tree.attribute(node, ACTION_ATTRIBUTE)?;
        let action = match name.as_str() {
            "refresh" => Self::RefreshListing,
            "upload" => Self::UploadFile,
            "download" => Self::DownloadFile,
            "delete-file" => Self::DeleteFile,
            "delete-folder" => Self::DeleteFolder,
            "add-folder" => Self::AddFolder {
                source_id: tree
                    .attribute(node, SOURCE_ATTRIBUTE)
                    .unwrap_or_else(|| DEFAULT_FOLDER_SOURCE.to_string()),
            },
            "backup" => Self::Backup,
            "restore" => Self::Restore,
            "save-form" => Self::SaveForm {
                form_id: tree
                    .attribute(node, FORM_ATTRIBUTE)
                    .unwrap_or_else(|| DEFAULT_FORM.to_string()),
                separator: tree
                    .attribute(node, SEPARATOR_ATTRIBUTE)
                    .filter(|pattern| !pattern.is_empty()),
            },
            _ => return None,
        };
        Some(action)
    }

    /// Whether the action fires on `change` (file inputs) rather than `click`.
    pub fn fires_on_change(&self) -> bool {
        matches!(self, Self::Restore)
    }
}

fn closest<T: ViewTree, R>(
    tree: &T,
    start: &T::Node,
    mut probe: impl FnMut(&T::Node) -> Option<R>,
) -> Option<R> {
    let mut current = Some(start.clone());
    while let Some(node) = current {
        if let Some(found) = probe(&node) {
            return Some(found);
        }
        current = tree.parent(&node);
    }
    None
}

/// Nearest action declared on `target` or one of its ancestors.
pub fn action_for<T: ViewTree>(tree: &T, target: &T::Node) -> Option<PageAction> {
    closest(tree, target, |node| PageAction::from_node(tree, node))
}

/// Row index of the listing cell containing `target`.
pub fn row_index_for<T: ViewTree>(tree: &T, target: &T::Node) -> Option<usize> {
    closest(tree, target, |node| {
        tree.attribute(node, ROW_ATTRIBUTE)
            .and_then(|index| index.parse().ok())
    })
}
