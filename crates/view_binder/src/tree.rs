//! DOM-like tree abstraction the binder mutates.
//!
//! A *scope* is any node whose descendants are searched: the document root for live lookups or a
//! detached fragment produced by [`ViewTree::instantiate_template`]. Fragments are not part of the
//! live tree until appended.

use std::fmt;

use serde_json::Value;

/// Tag names whose content is replaced by leaf values.
pub const CONTENT_TAGS: [&str; 4] = ["span", "div", "td", "dfn"];

/// Mutable view tree with element-level operations.
///
/// All methods take `&self`: implementations are handles onto shared state (the browser
/// document, or an `Rc`-backed arena) so timers and handlers can hold clones.
pub trait ViewTree {
    /// Node handle. Cheap to clone, compared by identity.
    type Node: Clone + PartialEq + fmt::Debug + 'static;

    /// Document root of the live tree.
    fn root(&self) -> Self::Node;

    /// Finds the first descendant of `scope` whose id equals `id`.
    fn find_by_id(&self, scope: &Self::Node, id: &str) -> Option<Self::Node>;

    /// Live nodes carrying attribute `name`, in document order.
    fn nodes_with_attribute(&self, name: &str) -> Vec<Self::Node>;

    /// Live nodes whose attribute `name` equals `value`, in document order.
    fn find_by_attribute(&self, name: &str, value: &str) -> Vec<Self::Node> {
        self.nodes_with_attribute(name)
            .into_iter()
            .filter(|node| self.attribute(node, name).as_deref() == Some(value))
            .collect()
    }

    /// Deep-clones the content of a `<template>` node into a detached fragment.
    fn instantiate_template(&self, template: &Self::Node) -> Option<Self::Node>;

    /// First element child of `node`.
    fn first_element_child(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Element children of `node`, in order.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Element descendants of `node` in document order. Template content is not entered.
    fn descendants(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Parent node, if attached.
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Appends `child` to `parent`. Appending a fragment moves its children.
    fn append_child(&self, parent: &Self::Node, child: &Self::Node);

    /// Removes every child of `node`.
    fn clear_children(&self, node: &Self::Node);

    /// Lower-case tag name (`""` for documents and fragments).
    fn tag_name(&self, node: &Self::Node) -> String;

    /// Element id, if set.
    fn id(&self, node: &Self::Node) -> Option<String>;

    /// Replaces the element id.
    fn set_id(&self, node: &Self::Node, id: &str);

    /// Markup content of the element.
    fn content(&self, node: &Self::Node) -> String;

    /// Replaces the element content.
    fn set_content(&self, node: &Self::Node, content: &str);

    /// `type` of an `<input>`, lower-cased.
    fn input_type(&self, node: &Self::Node) -> Option<String>;

    /// Current form value.
    fn value(&self, node: &Self::Node) -> String;

    /// Replaces the form value.
    fn set_value(&self, node: &Self::Node, value: &str);

    /// Checked state of a checkbox or radio.
    fn is_checked(&self, node: &Self::Node) -> bool;

    /// Sets the checked state of a checkbox or radio.
    fn set_checked(&self, node: &Self::Node, checked: bool);

    /// Sets the selected state of an `<option>`.
    fn set_selected(&self, node: &Self::Node, selected: bool);

    /// Whether the element exposes a property called `key`.
    fn has_property(&self, node: &Self::Node, key: &str) -> bool;

    /// Assigns a property from a JSON scalar.
    fn set_property(&self, node: &Self::Node, key: &str, value: &Value);

    /// Attribute value.
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Sets an attribute.
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);

    /// Names of all attributes set on the element.
    fn attribute_names(&self, node: &Self::Node) -> Vec<String>;

    /// Whether the class list contains `class`.
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Adds `class` to the class list.
    fn add_class(&self, node: &Self::Node, class: &str);

    /// Removes `class` from the class list.
    fn remove_class(&self, node: &Self::Node, class: &str);

    /// Replaces the whole class attribute.
    fn set_class_name(&self, node: &Self::Node, class_name: &str);

    /// Inline style property value.
    fn style(&self, node: &Self::Node, property: &str) -> Option<String>;

    /// Sets an inline style property.
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);

    /// Looks up `id` in the live document.
    fn element_by_id(&self, id: &str) -> Option<Self::Node> {
        self.find_by_id(&self.root(), id)
    }
}

/// Renders a JSON scalar the way the browser stringifies it into markup.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Loose equality with `true`: `true`, `1` and `"1"` qualify.
pub fn is_loosely_true(value: &Value) -> bool {
    loosely_equals(value, 1.0)
}

/// Loose equality with a number. Booleans count as `0|1`, strings are trimmed and parsed, and a
/// blank string equals `0`.
pub fn loosely_equals(value: &Value, number: f64) -> bool {
    match value {
        Value::Bool(flag) => f64::from(u8::from(*flag)) == number,
        Value::Number(n) => n.as_f64() == Some(number),
        Value::String(text) => match text.trim() {
            "" => number == 0.0,
            trimmed => trimmed.parse::<f64>().ok() == Some(number),
        },
        _ => false,
    }
}

/// Truthiness of a JSON value: `false`, `0`, `""` and `null` are falsy, everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
