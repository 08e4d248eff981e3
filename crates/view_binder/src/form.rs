//! Form serialization, fingerprinting and the "need to save" indicator.

use regex::Regex;
use serde_json::{Map, Value};

use crate::tree::ViewTree;

/// Id of the unsaved-changes indicator.
pub const NEED_TO_SAVE_ID: &str = "needToSave";
/// Class hiding the indicator.
pub const HIDE_CLASS: &str = "hide";

const FORM_ELEMENT_TAGS: [&str; 4] = ["input", "select", "textarea", "button"];
const ACTION_INPUT_TYPES: [&str; 3] = ["button", "submit", "reset"];

/// Returns `false` when `node` or any ancestor below the root is styled `display: none`.
pub fn is_visible<T: ViewTree>(tree: &T, node: &T::Node) -> bool {
    let root = tree.root();
    let mut current = Some(node.clone());
    while let Some(node) = current {
        if node == root {
            break;
        }
        if tree.style(&node, "display").as_deref() == Some("none") {
            return false;
        }
        current = tree.parent(&node);
    }
    true
}

/// Every listed element of the form in document order, buttons included.
fn form_elements<T: ViewTree>(tree: &T, form_id: &str) -> Vec<T::Node> {
    let Some(form) = tree.element_by_id(form_id) else {
        return Vec::new();
    };
    tree.descendants(&form)
        .into_iter()
        .filter(|node| FORM_ELEMENT_TAGS.contains(&tree.tag_name(node).as_str()))
        .collect()
}

/// Form elements without buttons: the controls a plain submission carries.
fn form_controls<T: ViewTree>(tree: &T, form_id: &str) -> Vec<T::Node> {
    form_elements(tree, form_id)
        .into_iter()
        .filter(|node| tree.tag_name(node) != "button")
        .filter(|node| {
            !tree
                .input_type(node)
                .is_some_and(|kind| ACTION_INPUT_TYPES.contains(&kind.as_str()))
        })
        .collect()
}

/// Integer conversion with `parseInt` semantics: leading whitespace, optional sign, then
/// digits up to the first non-digit. `None` when no digit was read.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn control_value<T: ViewTree>(
    tree: &T,
    node: &T::Node,
    numeric_prefixes: &[String],
) -> Option<Value> {
    let kind = tree.input_type(node).unwrap_or_default();
    let id = tree.id(node).unwrap_or_default();
    let value = tree.value(node);
    if kind == "checkbox" {
        Some(Value::from(u8::from(tree.is_checked(node))))
    } else if kind == "number" || numeric_prefixes.iter().any(|p| id.starts_with(p.as_str())) {
        Some(parse_leading_int(&value).map_or(Value::Null, Value::from))
    } else if kind == "radio" {
        tree.is_checked(node).then(|| Value::String(value))
    } else {
        Some(Value::String(value))
    }
}

/// Serializes the named, valued, visible elements of a form. Named buttons with a value are
/// included like any other element.
///
/// Without `separator` the result is `{"data": {name: value}}`. With a separator, a new row
/// object starts at every control whose id matches it and the result is `{"data": [row, ..]}`.
pub fn serialize_form<T: ViewTree>(
    tree: &T,
    form_id: &str,
    separator: Option<&Regex>,
    numeric_prefixes: &[String],
) -> Value {
    let mut flat = Map::new();
    let mut rows = Vec::new();
    let mut row = Map::new();

    for node in form_elements(tree, form_id) {
        let name = tree.attribute(&node, "name").unwrap_or_default();
        if name.is_empty() || tree.value(&node).is_empty() || !is_visible(tree, &node) {
            continue;
        }
        if let Some(separator) = separator {
            let id = tree.id(&node).unwrap_or_default();
            if separator.is_match(&id) && !row.is_empty() {
                rows.push(Value::Object(std::mem::take(&mut row)));
            }
        }
        let Some(value) = control_value(tree, &node, numeric_prefixes) else {
            continue;
        };
        if separator.is_some() {
            row.insert(name, value);
        } else {
            flat.insert(name, value);
        }
    }

    let data = match separator {
        Some(_) => {
            if !row.is_empty() {
                rows.push(Value::Object(row));
            }
            Value::Array(rows)
        }
        None => Value::Object(flat),
    };
    serde_json::json!({ "data": data })
}

/// `name=value|name=value` over the controls a browser would submit.
pub fn form_fingerprint<T: ViewTree>(tree: &T, form_id: &str) -> String {
    form_controls(tree, form_id)
        .into_iter()
        .filter(|node| tree.attribute(node, "disabled").is_none())
        .filter_map(|node| {
            let name = tree.attribute(&node, "name").filter(|n| !n.is_empty())?;
            let kind = tree.input_type(&node).unwrap_or_default();
            if matches!(kind.as_str(), "checkbox" | "radio") && !tree.is_checked(&node) {
                return None;
            }
            Some(format!("{name}={}", tree.value(&node)))
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Page name derived from a URL path: the last segment without its extension.
pub fn page_name(pathname: &str) -> String {
    let file = pathname.rsplit(['/', '\\']).next().unwrap_or(pathname);
    match file.rfind('.') {
        Some(dot) if dot > 0 => file[..dot].to_string(),
        _ => file.to_string(),
    }
}

#[derive(Debug, Clone, Default)]
/// Tracks whether a form differs from its last saved state.
pub struct DirtyTracker {
    form_id: String,
    baseline: String,
}

impl DirtyTracker {
    /// Creates a tracker for `form_id` with an empty baseline.
    pub fn new(form_id: impl Into<String>) -> Self {
        Self {
            form_id: form_id.into(),
            baseline: String::new(),
        }
    }

    /// Records the current fingerprint as saved and hides the indicator.
    pub fn init<T: ViewTree>(&mut self, tree: &T) {
        self.baseline = form_fingerprint(tree, &self.form_id);
        if let Some(node) = tree.element_by_id(NEED_TO_SAVE_ID) {
            tree.add_class(&node, HIDE_CLASS);
        }
    }

    /// Shows the indicator when the form changed since [`DirtyTracker::init`].
    /// Returns whether the form is dirty.
    pub fn refresh<T: ViewTree>(&self, tree: &T) -> bool {
        let dirty = form_fingerprint(tree, &self.form_id) != self.baseline;
        if let Some(node) = tree.element_by_id(NEED_TO_SAVE_ID) {
            if dirty {
                tree.remove_class(&node, HIDE_CLASS);
            } else {
                tree.add_class(&node, HIDE_CLASS);
            }
        }
        dirty
    }
}
