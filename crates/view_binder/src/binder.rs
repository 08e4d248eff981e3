//! Recursive application of JSON payloads onto a [`ViewTree`].
//!
//! Nested mappings address properties of an object node, arrays stamp `<template>` rows and
//! scalars land on the node whose composed identifier matches. Rows are appended only once: a
//! second application with the same data updates the existing live nodes instead.

use serde_json::Value;

use crate::{
    envelope::JsonMap,
    notice::Highlighter,
    tree::{is_loosely_true, scalar_text, ViewTree, CONTENT_TAGS},
};

/// Applies `data` and `data-id` sections to a view tree.
pub struct Binder<T: ViewTree> {
    tree: T,
    highlighter: Highlighter<T>,
}

impl<T: ViewTree + Clone> Clone for Binder<T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            highlighter: self.highlighter.clone(),
        }
    }
}

fn compose(hierarchy: &str, id: &str) -> String {
    if hierarchy.is_empty() {
        id.to_string()
    } else {
        format!("{hierarchy}.{id}")
    }
}

impl<T: ViewTree + Clone + 'static> Binder<T> {
    /// Creates a binder writing into `tree`.
    pub fn new(tree: T, highlighter: Highlighter<T>) -> Self {
        Self { tree, highlighter }
    }

    /// Applies a `data` section to the live document.
    pub fn apply_data(&self, data: &JsonMap, highlight: bool) {
        let root = self.tree.root();
        self.apply_keys(data, &root, None, None, "", highlight);
    }

    /// Overwrites the content of every node whose `data-id` matches a key.
    pub fn apply_data_ids(&self, values: &JsonMap, highlight: bool) {
        for (key, value) in values {
            for node in self.tree.find_by_attribute("data-id", key) {
                self.tree.set_content(&node, &scalar_text(value));
                if highlight {
                    self.highlighter.flash_if_reactive(&node);
                }
            }
        }
    }

    fn apply_keys(
        &self,
        json: &JsonMap,
        scope: &T::Node,
        object_id: Option<&str>,
        index: Option<usize>,
        hierarchy: &str,
        highlight: bool,
    ) {
        for (key, value) in json {
            match value {
                Value::Array(items) => self.apply_template(items, key, scope, hierarchy, highlight),
                Value::Object(nested) => {
                    self.apply_keys(nested, scope, Some(key.as_str()), index, hierarchy, highlight)
                }
                Value::Null => {}
                leaf => {
                    let target = self.target_id(scope, object_id, key, index, hierarchy);
                    if let Some(node) = self.resolve(scope, &target, index) {
                        self.apply_key(&node, key, leaf, hierarchy, highlight);
                    }
                }
            }
        }
    }

    fn target_id(
        &self,
        scope: &T::Node,
        object_id: Option<&str>,
        key: &str,
        index: Option<usize>,
        hierarchy: &str,
    ) -> String {
        match object_id.filter(|id| !id.is_empty()) {
            Some(object_id) => {
                let first_id = self
                    .tree
                    .first_element_child(scope)
                    .and_then(|first| self.tree.id(&first));
                match (index, first_id) {
                    (Some(i), Some(first_id)) if format!("{object_id}_{i}") == first_id => {
                        first_id
                    }
                    _ => compose(hierarchy, object_id),
                }
            }
            None => compose(hierarchy, key),
        }
    }

    fn resolve(&self, scope: &T::Node, id: &str, index: Option<usize>) -> Option<T::Node> {
        self.tree
            .element_by_id(id)
            .or_else(|| index.and_then(|i| self.tree.find_by_id(scope, &format!("{id}_{i}"))))
            .or_else(|| self.tree.find_by_id(scope, id))
    }

    fn apply_template(
        &self,
        items: &[Value],
        template_id: &str,
        scope: &T::Node,
        hierarchy: &str,
        highlight: bool,
    ) {
        for (i, item) in items.iter().enumerate() {
            let Some(template) = self.tree.find_by_id(scope, template_id) else {
                continue;
            };
            let Some(row) = self.instantiate_row(&template, template_id, hierarchy, i) else {
                continue;
            };
            let (fragment, row_id) = row;

            if let Value::Object(fields) = item {
                self.apply_keys(fields, &fragment, None, Some(i), &row_id, highlight);
            }

            if self.tree.element_by_id(&row_id).is_none() {
                if let Some(parent) = self.tree.parent(&template) {
                    self.tree.append_child(&parent, &fragment);
                }
            }
        }
    }

    /// Clones a template and rewrites the identifiers of the clone. Returns the fragment and the
    /// composed id of its first element.
    fn instantiate_row(
        &self,
        template: &T::Node,
        template_id: &str,
        hierarchy: &str,
        index: usize,
    ) -> Option<(T::Node, String)> {
        let fragment = self.tree.instantiate_template(template)?;
        let first = self.tree.first_element_child(&fragment)?;
        let base = self
            .tree
            .id(&first)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| template_id.to_string());
        let row_id = format!("{}_{index}", compose(hierarchy, &base));
        self.tree.set_id(&first, &row_id);

        for node in self.tree.descendants(&fragment) {
            if node == first || self.tree.tag_name(&node) == "template" {
                continue;
            }
            if let Some(id) = self.tree.id(&node).filter(|id| !id.is_empty()) {
                self.tree.set_id(&node, &format!("{row_id}.{id}"));
            }
        }
        Some((fragment, row_id))
    }

    fn apply_key(&self, node: &T::Node, key: &str, value: &Value, hierarchy: &str, highlight: bool) {
        let node_id = self.tree.id(node).unwrap_or_default();
        if node_id == key || node_id == format!("{hierarchy}.{key}") {
            let tag = self.tree.tag_name(node);
            let input_type = self.tree.input_type(node);
            if CONTENT_TAGS.contains(&tag.as_str()) {
                if highlight {
                    self.highlighter.flash_if_reactive(node);
                }
                self.tree.set_content(node, &scalar_text(value));
            } else if matches!(input_type.as_deref(), Some("checkbox" | "radio")) {
                if is_loosely_true(value) {
                    self.tree.set_checked(node, true);
                }
            } else if tag == "option" {
                if is_loosely_true(value) {
                    self.tree.set_selected(node, true);
                }
            } else {
                self.tree.set_value(node, &scalar_text(value));
            }
        } else if self.tree.has_property(node, key) {
            if highlight {
                self.highlighter.flash_if_reactive(node);
            }
            self.tree.set_property(node, key, value);
        } else {
            self.tree.set_attribute(node, key, &scalar_text(value));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{rc::Rc, time::Duration};

    use admin_host::ManualScheduler;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{
        memory::{ElementSpec, MemoryDocument},
        notice::HIGHLIGHT_CLASS,
    };

    fn binder(doc: &MemoryDocument) -> (Binder<MemoryDocument>, ManualScheduler) {
        let scheduler = ManualScheduler::default();
        let highlighter =
            Highlighter::new(doc.clone(), Rc::new(scheduler.clone()), Duration::from_secs(1));
        (Binder::new(doc.clone(), highlighter), scheduler)
    }

    fn map(value: Value) -> JsonMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn leaf_values_follow_element_kind() {
        let doc = MemoryDocument::with_body([
            ElementSpec::new("span").id("title"),
            ElementSpec::input("checkbox").id("enabled"),
            ElementSpec::input("number").id("interval"),
            ElementSpec::new("select").children([
                ElementSpec::new("option").id("mode_a"),
                ElementSpec::new("option").id("mode_b"),
            ]),
        ]);
        let (binder, _) = binder(&doc);

        binder.apply_data(
            &map(json!({
                "title": "Pump",
                "enabled": 1,
                "interval": 30,
                "mode_b": "1",
                "missing": "ignored",
                "skipped": null
            })),
            false,
        );

        let get = |id: &str| doc.get(id).expect(id);
        assert_eq!(doc.content(&get("title")), "Pump");
        assert!(doc.is_checked(&get("enabled")));
        assert_eq!(doc.value(&get("interval")), "30");
        assert_eq!(doc.attribute(&get("title"), "missing"), None);
    }

    #[test]
    fn nested_object_sets_properties_and_attributes() {
        let doc = MemoryDocument::with_body([ElementSpec::input("text").id("sensor")]);
        let (binder, _) = binder(&doc);

        binder.apply_data(
            &map(json!({"sensor": {"value": "21.5", "data-unit": "C", "className": "warn"}})),
            false,
        );

        let sensor = doc.get("sensor").expect("sensor");
        assert_eq!(doc.value(&sensor), "21.5");
        assert_eq!(doc.attribute(&sensor, "data-unit").as_deref(), Some("C"));
        assert!(doc.has_class(&sensor, "warn"));
    }

    #[test]
    fn checkbox_stays_checked_on_falsy_value() {
        let doc = MemoryDocument::with_body([ElementSpec::input("checkbox").id("on").checked()]);
        let (binder, _) = binder(&doc);
        binder.apply_data(&map(json!({"on": 0})), false);
        assert!(doc.is_checked(&doc.get("on").expect("on")));
    }

    #[test]
    fn data_ids_overwrite_all_matches_and_flash_reactive_ones() {
        let doc = MemoryDocument::with_body([
            ElementSpec::new("span")
                .id("sn_a")
                .class("ajaxchange")
                .attr("data-id", "InverterSN.value"),
            ElementSpec::new("td").attr("data-id", "InverterSN.value"),
        ]);
        let (binder, scheduler) = binder(&doc);

        binder.apply_data_ids(&map(json!({"InverterSN.value": "12345"})), true);

        let nodes = doc.find_by_attribute("data-id", "InverterSN.value");
        assert_eq!(nodes.len(), 2);
        for node in &nodes {
            assert_eq!(doc.content(node), "12345");
        }
        let flagged = doc.get("sn_a").expect("sn_a");
        assert!(doc.has_class(&flagged, HIGHLIGHT_CLASS));
        scheduler.advance(Duration::from_secs(1));
        assert!(!doc.has_class(&flagged, HIGHLIGHT_CLASS));
    }

    #[test]
    fn template_without_element_is_skipped() {
        let doc = MemoryDocument::with_body([ElementSpec::new("div")
            .id("holder")
            .child(ElementSpec::template("empty", vec![]))]);
        let (binder, _) = binder(&doc);
        binder.apply_data(&map(json!({"empty": [{"a": 1}]})), false);
        assert_eq!(doc.children(&doc.get("holder").expect("holder")).len(), 1);
    }
}
