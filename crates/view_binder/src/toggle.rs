//! Typed show/hide toggles bound to radios and checkboxes through `data-toggle`.

use leptos::logging::warn;
use serde::{Deserialize, Serialize};

use crate::tree::ViewTree;

/// Attribute holding a JSON-encoded [`VisibilityToggle`].
pub const TOGGLE_ATTRIBUTE: &str = "data-toggle";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Rows shown and hidden together when a control is selected.
pub struct VisibilityToggle {
    /// Ids displayed as table rows.
    #[serde(default)]
    pub show: Vec<String>,
    /// Ids hidden.
    #[serde(default)]
    pub hide: Vec<String>,
}

impl VisibilityToggle {
    /// Creates a toggle from id lists.
    pub fn new<S: Into<String>>(
        show: impl IntoIterator<Item = S>,
        hide: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            show: show.into_iter().map(Into::into).collect(),
            hide: hide.into_iter().map(Into::into).collect(),
        }
    }

    /// Reads the toggle bound to `node`. Malformed bindings are logged and ignored.
    pub fn from_node<T: ViewTree>(tree: &T, node: &T::Node) -> Option<Self> {
        let raw = tree.attribute(node, TOGGLE_ATTRIBUTE)?;
        match serde_json::from_str(&raw) {
            Ok(toggle) => Some(toggle),
            Err(err) => {
                warn!("invalid {TOGGLE_ATTRIBUTE} binding `{raw}`: {err}");
                None
            }
        }
    }

    /// The toggle with `show` and `hide` swapped.
    pub fn inverted(&self) -> Self {
        Self {
            show: self.hide.clone(),
            hide: self.show.clone(),
        }
    }

    /// Shows the `show` ids and hides the `hide` ids. Missing ids are skipped.
    pub fn apply<T: ViewTree>(&self, tree: &T) {
        for (ids, display) in [(&self.show, "table-row"), (&self.hide, "none")] {
            for id in ids {
                if let Some(node) = tree.element_by_id(id) {
                    tree.set_style(&node, "display", display);
                }
            }
        }
    }

    /// Applies the toggle when `checked`, its inverse otherwise.
    pub fn apply_for_checkbox<T: ViewTree>(&self, tree: &T, checked: bool) {
        if checked {
            self.apply(tree);
        } else {
            self.inverted().apply(tree);
        }
    }
}

/// Reacts to a change of `node`: checkboxes apply their toggle by state, radios only when
/// checked, other controls unconditionally.
pub fn apply_toggle_for<T: ViewTree>(tree: &T, node: &T::Node) {
    let Some(toggle) = VisibilityToggle::from_node(tree, node) else {
        return;
    };
    match tree.input_type(node).as_deref() {
        Some("checkbox") => toggle.apply_for_checkbox(tree, tree.is_checked(node)),
        Some("radio") => {
            if tree.is_checked(node) {
                toggle.apply(tree);
            }
        }
        _ => toggle.apply(tree),
    }
}

/// Page-load pass: applies the toggles of checked radios and of every checkbox.
pub fn apply_initial_toggles<T: ViewTree>(tree: &T) {
    for node in tree.nodes_with_attribute(TOGGLE_ATTRIBUTE) {
        if matches!(tree.input_type(&node).as_deref(), Some("checkbox" | "radio")) {
            apply_toggle_for(tree, &node);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::memory::{ElementSpec, MemoryDocument};

    fn rows() -> Vec<ElementSpec> {
        ["mqtt_row", "serial_row"]
            .into_iter()
            .map(|id| ElementSpec::new("tr").id(id))
            .collect()
    }

    fn display(doc: &MemoryDocument, id: &str) -> Option<String> {
        doc.style(&doc.get(id).expect(id), "display")
    }

    #[test]
    fn initial_pass_applies_checked_radio_and_checkbox_state() {
        let to_mqtt = r#"{"show":["mqtt_row"],"hide":["serial_row"]}"#;
        let to_serial = r#"{"show":["serial_row"],"hide":["mqtt_row"]}"#;
        let mut body = rows();
        body.push(ElementSpec::input("radio").id("r_mqtt").attr(TOGGLE_ATTRIBUTE, to_mqtt));
        body.push(
            ElementSpec::input("radio")
                .id("r_serial")
                .attr(TOGGLE_ATTRIBUTE, to_serial)
                .checked(),
        );
        let doc = MemoryDocument::with_body(body);

        apply_initial_toggles(&doc);
        assert_eq!(display(&doc, "serial_row").as_deref(), Some("table-row"));
        assert_eq!(display(&doc, "mqtt_row").as_deref(), Some("none"));
    }

    #[test]
    fn unchecked_checkbox_applies_inverse() {
        let mut body = rows();
        body.push(
            ElementSpec::input("checkbox")
                .id("use_mqtt")
                .attr(TOGGLE_ATTRIBUTE, r#"{"show":["mqtt_row"]}"#),
        );
        let doc = MemoryDocument::with_body(body);
        let checkbox = doc.get("use_mqtt").expect("checkbox");

        apply_toggle_for(&doc, &checkbox);
        assert_eq!(display(&doc, "mqtt_row").as_deref(), Some("none"));

        doc.set_checked(&checkbox, true);
        apply_toggle_for(&doc, &checkbox);
        assert_eq!(display(&doc, "mqtt_row").as_deref(), Some("table-row"));
        assert_eq!(display(&doc, "serial_row"), None);
    }

    #[test]
    fn malformed_binding_is_ignored() {
        let doc = MemoryDocument::with_body([ElementSpec::input("checkbox")
            .id("bad")
            .attr(TOGGLE_ATTRIBUTE, "radioselection(['a'])")]);
        assert_eq!(VisibilityToggle::from_node(&doc, &doc.get("bad").expect("bad")), None);
    }
}
