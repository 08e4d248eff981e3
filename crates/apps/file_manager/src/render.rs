//! Table rendering of one snapshot directory through the `NewRow` template.

use admin_host::{join_path, parent_path, ROOT_PATH};
use leptos::logging::warn;
use view_binder::ViewTree;

use crate::snapshot::DirectorySnapshot;

/// Id of the listing table body.
pub const FILES_ID: &str = "files";
/// Id of the element showing the current directory.
pub const PATH_ID: &str = "path";
/// Id of the row template.
pub const ROW_TEMPLATE_ID: &str = "NewRow";
/// Attribute carrying the row index on every rendered cell.
pub const ROW_ATTRIBUTE: &str = "data-row";

const FILE_TOKEN: &str = "{file}";
const FULLPATH_TOKEN: &str = "{fullpath}";

#[derive(Debug, Clone, PartialEq, Eq)]
/// What activating a rendered row does.
pub enum RowAction {
    /// Load the file at this path into the editor.
    FetchFile(String),
    /// List this directory.
    Navigate(String),
}

struct RowSpec {
    label: String,
    target: String,
    action: RowAction,
}

fn row_specs(snapshot: &DirectorySnapshot, path: &str) -> Vec<RowSpec> {
    let mut rows = Vec::new();
    if path != ROOT_PATH {
        let parent = parent_path(path);
        rows.push(RowSpec {
            label: "..".to_string(),
            target: parent.clone(),
            action: RowAction::Navigate(parent),
        });
    }
    let Some(record) = snapshot.record(path) else {
        warn!("no listing cached for {path}");
        return rows;
    };
    for entry in &record.content {
        let target = join_path(&record.path, &entry.name);
        rows.push(if entry.is_dir {
            RowSpec {
                label: format!("{}/", entry.name),
                target: target.clone(),
                action: RowAction::Navigate(target),
            }
        } else {
            RowSpec {
                label: entry.name.clone(),
                target: target.clone(),
                action: RowAction::FetchFile(target),
            }
        });
    }
    rows
}

fn substitute(text: &str, row: &RowSpec) -> String {
    text.replace(FILE_TOKEN, &row.label)
        .replace(FULLPATH_TOKEN, &row.target)
}

/// Clears the table, writes the path header and stamps one row per entry.
///
/// Returns the row actions in the order their `data-row` indexes were assigned.
pub fn render_listing<T: ViewTree>(
    tree: &T,
    snapshot: &DirectorySnapshot,
    path: &str,
) -> Vec<RowAction> {
    if let Some(header) = tree.element_by_id(PATH_ID) {
        tree.set_content(&header, path);
    }
    let Some(table) = tree.element_by_id(FILES_ID) else {
        warn!("listing table #{FILES_ID} missing");
        return Vec::new();
    };
    tree.clear_children(&table);
    let Some(template) = tree.element_by_id(ROW_TEMPLATE_ID) else {
        warn!("row template #{ROW_TEMPLATE_ID} missing");
        return Vec::new();
    };

    let mut actions = Vec::new();
    for (index, row) in row_specs(snapshot, path).into_iter().enumerate() {
        let Some(fragment) = tree.instantiate_template(&template) else {
            continue;
        };
        for cell in tree.descendants(&fragment) {
            if tree.tag_name(&cell) != "td" {
                continue;
            }
            let content = tree.content(&cell);
            tree.set_content(&cell, &substitute(&content, &row));
            for name in tree.attribute_names(&cell) {
                if let Some(value) = tree.attribute(&cell, &name) {
                    tree.set_attribute(&cell, &name, &substitute(&value, &row));
                }
            }
            tree.set_attribute(&cell, ROW_ATTRIBUTE, &index.to_string());
        }
        tree.append_child(&table, &fragment);
        actions.push(row.action);
    }
    actions
}

#[cfg(test)]
mod tests {
    use admin_host::{DirEntry, DirectoryRecord};
    use pretty_assertions::assert_eq;
    use view_binder::{ElementSpec, MemoryDocument};

    use super::*;

    fn page() -> MemoryDocument {
        MemoryDocument::with_body([
            ElementSpec::new("div").id(PATH_ID),
            ElementSpec::new("table").children([
                ElementSpec::new("tbody").id(FILES_ID),
                ElementSpec::template(
                    ROW_TEMPLATE_ID,
                    vec![ElementSpec::new("tr").child(
                        ElementSpec::new("td")
                            .attr("title", "{fullpath}")
                            .text("{file}"),
                    )],
                ),
            ]),
        ])
    }

    fn snapshot() -> DirectorySnapshot {
        DirectorySnapshot::new(vec![
            DirectoryRecord::new(
                "/",
                vec![DirEntry::file("file1.txt"), DirEntry::dir("config")],
            ),
            DirectoryRecord::new("/config", vec![DirEntry::file("file3.txt")]),
        ])
    }

    fn cells(doc: &MemoryDocument) -> Vec<(String, Option<String>, Option<String>)> {
        let table = doc.get(FILES_ID).expect("table");
        doc.descendants(&table)
            .into_iter()
            .filter(|node| doc.tag_name(node) == "td")
            .map(|td| {
                (
                    doc.content(&td),
                    doc.attribute(&td, "title"),
                    doc.attribute(&td, ROW_ATTRIBUTE),
                )
            })
            .collect()
    }

    fn cell(content: &str, title: &str, row: &str) -> (String, Option<String>, Option<String>) {
        (
            content.to_string(),
            Some(title.to_string()),
            Some(row.to_string()),
        )
    }

    #[test]
    fn root_listing_has_no_parent_row() {
        let doc = page();
        let actions = render_listing(&doc, &snapshot(), "/");

        assert_eq!(
            actions,
            vec![
                RowAction::FetchFile("/file1.txt".to_string()),
                RowAction::Navigate("/config".to_string()),
            ]
        );
        assert_eq!(
            cells(&doc),
            vec![
                cell("file1.txt", "/file1.txt", "0"),
                cell("config/", "/config", "1"),
            ]
        );
        assert_eq!(doc.content(&doc.get(PATH_ID).expect("path")), "/");
    }

    #[test]
    fn subdirectory_listing_starts_with_parent_row_and_replaces_previous_rows() {
        let doc = page();
        render_listing(&doc, &snapshot(), "/");
        let actions = render_listing(&doc, &snapshot(), "/config");

        assert_eq!(
            actions,
            vec![
                RowAction::Navigate("/".to_string()),
                RowAction::FetchFile("/config/file3.txt".to_string()),
            ]
        );
        assert_eq!(cells(&doc).len(), 2);
        assert_eq!(cells(&doc)[0].0, "..");
    }

    #[test]
    fn unknown_path_renders_only_navigation() {
        let doc = page();
        let actions = render_listing(&doc, &snapshot(), "/missing");
        assert_eq!(actions, vec![RowAction::Navigate("/".to_string())]);
    }
}
