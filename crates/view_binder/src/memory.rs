//! Arena-backed [`ViewTree`] used by native tests and non-browser hosts.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use serde_json::Value;

use crate::tree::{scalar_text, ViewTree};

/// Handle of a node inside a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Document,
    Fragment,
    Element,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: Vec<(String, String)>,
    text: String,
    value: String,
    checked: bool,
    selected: bool,
    children: Vec<NodeRef>,
    parent: Option<NodeRef>,
    template_content: Option<NodeRef>,
}

impl NodeData {
    fn new(kind: NodeKind, tag: &str) -> Self {
        Self {
            kind,
            tag: tag.to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            styles: Vec::new(),
            text: String::new(),
            value: String::new(),
            checked: false,
            selected: false,
            children: Vec::new(),
            parent: None,
            template_content: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Declarative element description used to build [`MemoryDocument`] trees.
pub struct ElementSpec {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    text: String,
    value: Option<String>,
    checked: bool,
    children: Vec<ElementSpec>,
    template_content: Option<Vec<ElementSpec>>,
}

impl ElementSpec {
    /// Starts an element with `tag`.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// `<template id=..>` whose content is `content`.
    pub fn template(id: &str, content: Vec<ElementSpec>) -> Self {
        Self {
            tag: "template".to_string(),
            id: Some(id.to_string()),
            template_content: Some(content),
            ..Self::default()
        }
    }

    /// `<input type=..>`. Checkboxes and radios default to the value `on`.
    pub fn input(input_type: &str) -> Self {
        let spec = Self::new("input").attr("type", input_type);
        if matches!(input_type, "checkbox" | "radio") {
            spec.value("on")
        } else {
            spec
        }
    }

    /// Sets the id.
    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Adds a class.
    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Sets an attribute.
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    /// Sets text content.
    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Sets the form value.
    pub fn value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    /// Marks a checkbox or radio as checked.
    pub fn checked(mut self) -> Self {
        self.checked = true;
        self
    }

    /// Appends a child element.
    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several child elements.
    pub fn children(mut self, children: impl IntoIterator<Item = ElementSpec>) -> Self {
        self.children.extend(children);
        self
    }
}

/// Known DOM properties per tag, used to emulate `key in element`.
fn element_has_property(tag: &str, key: &str) -> bool {
    const COMMON: [&str; 8] = [
        "id",
        "className",
        "title",
        "hidden",
        "innerHTML",
        "textContent",
        "lang",
        "dir",
    ];
    if COMMON.contains(&key) {
        return true;
    }
    let specific: &[&str] = match tag {
        "input" => &[
            "value",
            "checked",
            "disabled",
            "type",
            "name",
            "placeholder",
            "min",
            "max",
            "step",
            "readOnly",
        ],
        "select" | "textarea" | "button" => &["value", "disabled", "name"],
        "option" => &["value", "selected", "disabled", "label"],
        "a" => &["href", "target"],
        "img" => &["src", "alt"],
        _ => &[],
    };
    specific.contains(&key)
}

#[derive(Debug, Clone)]
/// In-memory document. Clones share the same arena.
pub struct MemoryDocument {
    nodes: Rc<RefCell<Vec<NodeData>>>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Creates an empty document whose root has no children.
    pub fn new() -> Self {
        Self {
            nodes: Rc::new(RefCell::new(vec![NodeData::new(NodeKind::Document, "")])),
        }
    }

    /// Creates a document whose root holds the elements in `body`.
    pub fn with_body(body: impl IntoIterator<Item = ElementSpec>) -> Self {
        let doc = Self::new();
        let root = doc.root();
        for spec in body {
            doc.build(&root, spec);
        }
        doc
    }

    /// Builds `spec` and appends it under `parent`.
    pub fn build(&self, parent: &NodeRef, spec: ElementSpec) -> NodeRef {
        let node = self.build_detached(spec);
        self.attach(*parent, node);
        node
    }

    /// Live element with `id`; shorthand for tests.
    pub fn get(&self, id: &str) -> Option<NodeRef> {
        self.element_by_id(id)
    }

    /// Number of live elements whose id starts with `prefix`.
    pub fn count_ids_with_prefix(&self, prefix: &str) -> usize {
        self.descendants(&self.root())
            .iter()
            .filter_map(|node| self.id(node))
            .filter(|id| id.starts_with(prefix))
            .count()
    }

    fn push(&self, data: NodeData) -> NodeRef {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(data);
        NodeRef(nodes.len() - 1)
    }

    fn build_detached(&self, spec: ElementSpec) -> NodeRef {
        let mut data = NodeData::new(NodeKind::Element, &spec.tag);
        data.id = spec.id;
        data.classes = spec.classes;
        data.text = spec.text;
        data.value = spec.value.unwrap_or_default();
        data.checked = spec.checked;
        for (name, value) in spec.attributes {
            data.attributes.insert(name, value);
        }
        let node = self.push(data);

        if let Some(content) = spec.template_content {
            let fragment = self.push(NodeData::new(NodeKind::Fragment, ""));
            for child in content {
                let child = self.build_detached(child);
                self.attach(fragment, child);
            }
            self.nodes.borrow_mut()[node.0].template_content = Some(fragment);
        }
        for child in spec.children {
            let child = self.build_detached(child);
            self.attach(node, child);
        }
        node
    }

    fn attach(&self, parent: NodeRef, child: NodeRef) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(old_parent) = nodes[child.0].parent.take() {
            nodes[old_parent.0].children.retain(|c| *c != child);
        }
        nodes[child.0].parent = Some(parent);
        nodes[parent.0].children.push(child);
    }

    fn deep_clone(&self, node: NodeRef) -> NodeRef {
        let (mut data, children, template_content) = {
            let nodes = self.nodes.borrow();
            let source = &nodes[node.0];
            (
                source.clone(),
                source.children.clone(),
                source.template_content,
            )
        };
        data.children = Vec::new();
        data.parent = None;
        data.template_content = None;
        let copy = self.push(data);
        if let Some(content) = template_content {
            let content_copy = self.deep_clone(content);
            self.nodes.borrow_mut()[copy.0].template_content = Some(content_copy);
        }
        for child in children {
            let child_copy = self.deep_clone(child);
            self.attach(copy, child_copy);
        }
        copy
    }

    fn with_node<R>(&self, node: &NodeRef, f: impl FnOnce(&NodeData) -> R) -> R {
        f(&self.nodes.borrow()[node.0])
    }

    fn with_node_mut<R>(&self, node: &NodeRef, f: impl FnOnce(&mut NodeData) -> R) -> R {
        f(&mut self.nodes.borrow_mut()[node.0])
    }

    fn collect_descendants(&self, node: NodeRef, out: &mut Vec<NodeRef>) {
        let children = self.with_node(&node, |data| data.children.clone());
        for child in children {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }
}

impl ViewTree for MemoryDocument {
    type Node = NodeRef;

    fn root(&self) -> NodeRef {
        NodeRef(0)
    }

    fn find_by_id(&self, scope: &NodeRef, id: &str) -> Option<NodeRef> {
        self.descendants(scope)
            .into_iter()
            .find(|node| self.id(node).as_deref() == Some(id))
    }

    fn nodes_with_attribute(&self, name: &str) -> Vec<NodeRef> {
        self.descendants(&self.root())
            .into_iter()
            .filter(|node| self.attribute(node, name).is_some())
            .collect()
    }

    fn instantiate_template(&self, template: &NodeRef) -> Option<NodeRef> {
        let content = self.with_node(template, |data| data.template_content)?;
        Some(self.deep_clone(content))
    }

    fn first_element_child(&self, node: &NodeRef) -> Option<NodeRef> {
        self.with_node(node, |data| data.children.first().copied())
    }

    fn children(&self, node: &NodeRef) -> Vec<NodeRef> {
        self.with_node(node, |data| data.children.clone())
    }

    fn descendants(&self, node: &NodeRef) -> Vec<NodeRef> {
        let mut out = Vec::new();
        self.collect_descendants(*node, &mut out);
        out
    }

    fn parent(&self, node: &NodeRef) -> Option<NodeRef> {
        self.with_node(node, |data| data.parent)
    }

    fn append_child(&self, parent: &NodeRef, child: &NodeRef) {
        let kind = self.with_node(child, |data| data.kind);
        if kind == NodeKind::Fragment {
            for grandchild in self.children(child) {
                self.attach(*parent, grandchild);
            }
        } else {
            self.attach(*parent, *child);
        }
    }

    fn clear_children(&self, node: &NodeRef) {
        let children = self.with_node_mut(node, |data| std::mem::take(&mut data.children));
        for child in children {
            self.with_node_mut(&child, |data| data.parent = None);
        }
    }

    fn tag_name(&self, node: &NodeRef) -> String {
        self.with_node(node, |data| data.tag.clone())
    }

    fn id(&self, node: &NodeRef) -> Option<String> {
        self.with_node(node, |data| data.id.clone())
    }

    fn set_id(&self, node: &NodeRef, id: &str) {
        self.with_node_mut(node, |data| data.id = Some(id.to_string()));
    }

    fn content(&self, node: &NodeRef) -> String {
        self.with_node(node, |data| data.text.clone())
    }

    fn set_content(&self, node: &NodeRef, content: &str) {
        self.clear_children(node);
        self.with_node_mut(node, |data| data.text = content.to_string());
    }

    fn input_type(&self, node: &NodeRef) -> Option<String> {
        self.with_node(node, |data| {
            (data.tag == "input").then(|| {
                data.attributes
                    .get("type")
                    .map(|t| t.to_ascii_lowercase())
                    .unwrap_or_else(|| "text".to_string())
            })
        })
    }

    fn value(&self, node: &NodeRef) -> String {
        self.with_node(node, |data| data.value.clone())
    }

    fn set_value(&self, node: &NodeRef, value: &str) {
        self.with_node_mut(node, |data| data.value = value.to_string());
    }

    fn is_checked(&self, node: &NodeRef) -> bool {
        self.with_node(node, |data| data.checked)
    }

    fn set_checked(&self, node: &NodeRef, checked: bool) {
        self.with_node_mut(node, |data| data.checked = checked);
    }

    fn set_selected(&self, node: &NodeRef, selected: bool) {
        self.with_node_mut(node, |data| data.selected = selected);
    }

    fn has_property(&self, node: &NodeRef, key: &str) -> bool {
        self.with_node(node, |data| {
            data.kind == NodeKind::Element && element_has_property(&data.tag, key)
        })
    }

    fn set_property(&self, node: &NodeRef, key: &str, value: &Value) {
        let text = scalar_text(value);
        match key {
            "value" => self.set_value(node, &text),
            "checked" => self.set_checked(node, crate::tree::is_loosely_true(value)),
            "selected" => self.set_selected(node, crate::tree::is_loosely_true(value)),
            "innerHTML" | "textContent" => self.set_content(node, &text),
            "className" => self.set_class_name(node, &text),
            "id" => self.set_id(node, &text),
            "hidden" | "disabled" | "readOnly" => {
                let attr = key.to_ascii_lowercase();
                self.with_node_mut(node, |data| {
                    if crate::tree::is_loosely_true(value) || value.as_bool() == Some(true) {
                        data.attributes.insert(attr, String::new());
                    } else {
                        data.attributes.remove(&attr);
                    }
                });
            }
            _ => self.set_attribute(node, key, &text),
        }
    }

    fn attribute(&self, node: &NodeRef, name: &str) -> Option<String> {
        self.with_node(node, |data| match name {
            "id" => data.id.clone(),
            "class" => (!data.classes.is_empty()).then(|| data.classes.join(" ")),
            "value" if data.tag == "input" => Some(data.value.clone()),
            _ => data.attributes.get(name).cloned(),
        })
    }

    fn set_attribute(&self, node: &NodeRef, name: &str, value: &str) {
        match name {
            "id" => self.set_id(node, value),
            "class" => self.set_class_name(node, value),
            _ => self.with_node_mut(node, |data| {
                data.attributes.insert(name.to_string(), value.to_string());
            }),
        }
    }

    fn attribute_names(&self, node: &NodeRef) -> Vec<String> {
        self.with_node(node, |data| data.attributes.keys().cloned().collect())
    }

    fn has_class(&self, node: &NodeRef, class: &str) -> bool {
        self.with_node(node, |data| data.classes.iter().any(|c| c == class))
    }

    fn add_class(&self, node: &NodeRef, class: &str) {
        self.with_node_mut(node, |data| {
            if !data.classes.iter().any(|c| c == class) {
                data.classes.push(class.to_string());
            }
        });
    }

    fn remove_class(&self, node: &NodeRef, class: &str) {
        self.with_node_mut(node, |data| data.classes.retain(|c| c != class));
    }

    fn set_class_name(&self, node: &NodeRef, class_name: &str) {
        self.with_node_mut(node, |data| {
            data.classes = class_name.split_whitespace().map(str::to_string).collect();
        });
    }

    fn style(&self, node: &NodeRef, property: &str) -> Option<String> {
        self.with_node(node, |data| {
            data.styles
                .iter()
                .find(|(name, _)| name == property)
                .map(|(_, value)| value.clone())
        })
    }

    fn set_style(&self, node: &NodeRef, property: &str, value: &str) {
        self.with_node_mut(node, |data| {
            match data.styles.iter_mut().find(|(name, _)| name == property) {
                Some(entry) => entry.1 = value.to_string(),
                None => data.styles.push((property.to_string(), value.to_string())),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn template_instances_are_detached_deep_copies() {
        let doc = MemoryDocument::with_body([ElementSpec::new("table").child(
            ElementSpec::template(
                "rows",
                vec![ElementSpec::new("tr").child(ElementSpec::new("td").id("name"))],
            ),
        )]);
        let template = doc.get("rows").expect("template");

        let fragment = doc.instantiate_template(&template).expect("fragment");
        let td = doc.find_by_id(&fragment, "name").expect("td in fragment");
        assert_eq!(doc.get("name"), None, "template content is not live");
        doc.set_id(&td, "changed");

        let second = doc.instantiate_template(&template).expect("fragment");
        assert!(doc.find_by_id(&second, "name").is_some(), "source stays intact");

        let table = doc.parent(&template).expect("parent");
        doc.append_child(&table, &fragment);
        assert!(doc.get("changed").is_some());
        assert!(doc.children(&fragment).is_empty());
        assert_eq!(doc.children(&table).len(), 2);
    }

    #[test]
    fn properties_follow_element_kind() {
        let doc = MemoryDocument::with_body([
            ElementSpec::new("span").id("s"),
            ElementSpec::input("text").id("i"),
        ]);
        let span = doc.get("s").expect("span");
        let input = doc.get("i").expect("input");

        assert!(!doc.has_property(&span, "value"));
        assert!(doc.has_property(&input, "value"));
        assert!(doc.has_property(&span, "className"));

        doc.set_property(&input, "value", &json!(42));
        assert_eq!(doc.value(&input), "42");
        doc.set_property(&span, "className", &json!("on big"));
        assert!(doc.has_class(&span, "big"));
        doc.set_property(&input, "disabled", &json!(true));
        assert_eq!(doc.attribute(&input, "disabled").as_deref(), Some(""));
        assert_eq!(doc.input_type(&input).as_deref(), Some("text"));
        assert_eq!(doc.input_type(&span), None);
    }

    #[test]
    fn attribute_lookup_sees_only_live_nodes() {
        let doc = MemoryDocument::with_body([
            ElementSpec::new("span").attr("data-id", "InverterSN.value"),
            ElementSpec::template(
                "tpl",
                vec![ElementSpec::new("span").attr("data-id", "InverterSN.value")],
            ),
        ]);
        assert_eq!(doc.find_by_attribute("data-id", "InverterSN.value").len(), 1);
        assert!(doc.find_by_attribute("data-id", "other").is_empty());
    }
}
