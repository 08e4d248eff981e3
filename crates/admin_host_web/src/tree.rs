//! [`ViewTree`] over the live browser document.

use js_sys::{Array, Reflect};
use leptos::logging::warn;
use serde_json::Value;
use view_binder::{tree::is_loosely_true, ViewTree};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, DocumentFragment, Element, HtmlCollection, HtmlElement, HtmlInputElement,
    HtmlOptionElement, HtmlSelectElement, HtmlTemplateElement, HtmlTextAreaElement, Node,
    NodeList,
};

#[derive(Debug, Clone)]
/// Binds the view runtime to a `web_sys::Document`.
pub struct WebViewTree {
    document: Document,
}

impl WebViewTree {
    /// Wraps an explicit document.
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Wraps the window's current document.
    pub fn from_window() -> Option<Self> {
        web_sys::window()
            .and_then(|window| window.document())
            .map(Self::new)
    }

    /// Underlying document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn element_children(node: &Node) -> Option<HtmlCollection> {
    if let Some(element) = node.dyn_ref::<Element>() {
        Some(element.children())
    } else if let Some(fragment) = node.dyn_ref::<DocumentFragment>() {
        Some(fragment.children())
    } else {
        node.dyn_ref::<Document>().map(Document::children)
    }
}

fn select_all(node: &Node, selector: &str) -> Option<NodeList> {
    let result = if let Some(element) = node.dyn_ref::<Element>() {
        element.query_selector_all(selector)
    } else if let Some(fragment) = node.dyn_ref::<DocumentFragment>() {
        fragment.query_selector_all(selector)
    } else if let Some(document) = node.dyn_ref::<Document>() {
        document.query_selector_all(selector)
    } else {
        return None;
    };
    match result {
        Ok(list) => Some(list),
        Err(err) => {
            warn!("selector `{selector}` failed: {err:?}");
            None
        }
    }
}

fn collect_list(list: Option<NodeList>) -> Vec<Node> {
    let Some(list) = list else {
        return Vec::new();
    };
    (0..list.length()).filter_map(|index| list.item(index)).collect()
}

fn collect_collection(collection: Option<HtmlCollection>) -> Vec<Node> {
    let Some(collection) = collection else {
        return Vec::new();
    };
    (0..collection.length())
        .filter_map(|index| collection.item(index))
        .map(Node::from)
        .collect()
}

fn scalar_js(value: &Value) -> JsValue {
    match value {
        Value::Bool(flag) => JsValue::from_bool(*flag),
        Value::Number(number) => number
            .as_f64()
            .map(JsValue::from_f64)
            .unwrap_or(JsValue::NULL),
        Value::String(text) => JsValue::from_str(text),
        Value::Null => JsValue::NULL,
        other => JsValue::from_str(&other.to_string()),
    }
}

impl ViewTree for WebViewTree {
    type Node = Node;

    fn root(&self) -> Node {
        self.document.clone().into()
    }

    fn find_by_id(&self, scope: &Node, id: &str) -> Option<Node> {
        if let Some(document) = scope.dyn_ref::<Document>() {
            return document.get_element_by_id(id).map(Node::from);
        }
        if let Some(fragment) = scope.dyn_ref::<DocumentFragment>() {
            return fragment.get_element_by_id(id).map(Node::from);
        }
        self.descendants(scope)
            .into_iter()
            .find(|node| self.id(node).as_deref() == Some(id))
    }

    fn nodes_with_attribute(&self, name: &str) -> Vec<Node> {
        collect_list(select_all(&self.root(), &format!("[{name}]")))
    }

    fn instantiate_template(&self, template: &Node) -> Option<Node> {
        let template = template.dyn_ref::<HtmlTemplateElement>()?;
        match self.document.import_node_with_deep(&template.content(), true) {
            Ok(fragment) => Some(fragment),
            Err(err) => {
                warn!("template import failed: {err:?}");
                None
            }
        }
    }

    fn first_element_child(&self, node: &Node) -> Option<Node> {
        element_children(node)?.item(0).map(Node::from)
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        collect_collection(element_children(node))
    }

    fn descendants(&self, node: &Node) -> Vec<Node> {
        collect_list(select_all(node, "*"))
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn append_child(&self, parent: &Node, child: &Node) {
        if let Err(err) = parent.append_child(child) {
            warn!("append failed: {err:?}");
        }
    }

    fn clear_children(&self, node: &Node) {
        node.set_text_content(None);
    }

    fn tag_name(&self, node: &Node) -> String {
        node.dyn_ref::<Element>()
            .map(|element| element.tag_name().to_ascii_lowercase())
            .unwrap_or_default()
    }

    fn id(&self, node: &Node) -> Option<String> {
        node.dyn_ref::<Element>()
            .and_then(|element| element.get_attribute("id"))
    }

    fn set_id(&self, node: &Node, id: &str) {
        if let Some(element) = node.dyn_ref::<Element>() {
            element.set_id(id);
        }
    }

    fn content(&self, node: &Node) -> String {
        node.dyn_ref::<Element>()
            .map(Element::inner_html)
            .unwrap_or_default()
    }

    fn set_content(&self, node: &Node, content: &str) {
        if let Some(element) = node.dyn_ref::<Element>() {
            element.set_inner_html(content);
        }
    }

    fn input_type(&self, node: &Node) -> Option<String> {
        node.dyn_ref::<HtmlInputElement>()
            .map(|input| input.type_().to_ascii_lowercase())
    }

    fn value(&self, node: &Node) -> String {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else if let Some(option) = node.dyn_ref::<HtmlOptionElement>() {
            option.value()
        } else {
            self.attribute(node, "value").unwrap_or_default()
        }
    }

    fn set_value(&self, node: &Node, value: &str) {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        } else if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        } else if let Some(option) = node.dyn_ref::<HtmlOptionElement>() {
            option.set_value(value);
        } else {
            self.set_attribute(node, "value", value);
        }
    }

    fn is_checked(&self, node: &Node) -> bool {
        node.dyn_ref::<HtmlInputElement>()
            .is_some_and(HtmlInputElement::checked)
    }

    fn set_checked(&self, node: &Node, checked: bool) {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_checked(checked);
        }
    }

    fn set_selected(&self, node: &Node, selected: bool) {
        if let Some(option) = node.dyn_ref::<HtmlOptionElement>() {
            option.set_selected(selected);
        }
    }

    fn has_property(&self, node: &Node, key: &str) -> bool {
        let target: &JsValue = node.as_ref();
        node.is_instance_of::<Element>()
            && Reflect::has(target, &JsValue::from_str(key)).unwrap_or(false)
    }

    fn set_property(&self, node: &Node, key: &str, value: &Value) {
        match key {
            "checked" => self.set_checked(node, is_loosely_true(value)),
            "selected" => self.set_selected(node, is_loosely_true(value)),
            _ => {
                let target: &JsValue = node.as_ref();
                if let Err(err) = Reflect::set(target, &JsValue::from_str(key), &scalar_js(value)) {
                    warn!("setting property `{key}` failed: {err:?}");
                }
            }
        }
    }

    fn attribute(&self, node: &Node, name: &str) -> Option<String> {
        if name == "value" {
            if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
                return Some(input.value());
            }
        }
        node.dyn_ref::<Element>()
            .and_then(|element| element.get_attribute(name))
    }

    fn set_attribute(&self, node: &Node, name: &str, value: &str) {
        let Some(element) = node.dyn_ref::<Element>() else {
            return;
        };
        if let Err(err) = element.set_attribute(name, value) {
            warn!("setting attribute `{name}` failed: {err:?}");
        }
    }

    fn attribute_names(&self, node: &Node) -> Vec<String> {
        node.dyn_ref::<Element>()
            .map(|element| {
                Array::from(&element.get_attribute_names())
                    .iter()
                    .filter_map(|name| name.as_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn has_class(&self, node: &Node, class: &str) -> bool {
        node.dyn_ref::<Element>()
            .is_some_and(|element| element.class_list().contains(class))
    }

    fn add_class(&self, node: &Node, class: &str) {
        if let Some(element) = node.dyn_ref::<Element>() {
            if let Err(err) = element.class_list().add_1(class) {
                warn!("adding class `{class}` failed: {err:?}");
            }
        }
    }

    fn remove_class(&self, node: &Node, class: &str) {
        if let Some(element) = node.dyn_ref::<Element>() {
            if let Err(err) = element.class_list().remove_1(class) {
                warn!("removing class `{class}` failed: {err:?}");
            }
        }
    }

    fn set_class_name(&self, node: &Node, class_name: &str) {
        if let Some(element) = node.dyn_ref::<Element>() {
            element.set_class_name(class_name);
        }
    }

    fn style(&self, node: &Node, property: &str) -> Option<String> {
        node.dyn_ref::<HtmlElement>()
            .and_then(|element| element.style().get_property_value(property).ok())
            .filter(|value| !value.is_empty())
    }

    fn set_style(&self, node: &Node, property: &str, value: &str) {
        if let Some(element) = node.dyn_ref::<HtmlElement>() {
            if let Err(err) = element.style().set_property(property, value) {
                warn!("setting style `{property}` failed: {err:?}");
            }
        }
    }
}
