//! Document snapshot types.
//!
//! A [`Document`] is an immutable tree of [`Element`]s with interleaved text,
//! as produced by whatever engine rendered the page. The locator core only
//! reads it: tag names, attributes, visibility and registered interaction
//! listeners are all it needs.
//!
//! Snapshots are plain JSON. An element is an object, a text node is a
//! string:
//!
//! ```json
//! { "tag": "p", "children": ["Username ", { "tag": "input", "attributes": { "id": "user" } }] }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a snapshot.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot is not valid JSON for a document tree.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A rendered document: its root element (usually `html`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Parses a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// A child of an element: either text or another element.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(String),
    Element(Element),
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

/// Interaction listeners an element can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseAction {
    Click,
    DoubleClick,
    RightClick,
    MouseOver,
}

impl MouseAction {
    /// The inline handler attribute equivalent to this listener.
    pub fn handler_attribute(&self) -> &'static str {
        match self {
            MouseAction::Click => "onclick",
            MouseAction::DoubleClick => "ondblclick",
            MouseAction::RightClick => "oncontextmenu",
            MouseAction::MouseOver => "onmouseover",
        }
    }
}

/// One element of a document tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Element {
    /// The tag name, compared case-insensitively.
    pub tag: String,

    /// Attribute values by name (`id`, `name`, `type`, `value`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    /// Child nodes in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,

    /// True if the element is not displayed (its subtree is not either).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,

    /// Script listeners registered on the element.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub listeners: Vec<MouseAction>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    /// Builder: sets an attribute.
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Builder: appends a child element or text.
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    /// Builder: appends a text node.
    pub fn text(self, text: &str) -> Self {
        self.child(text)
    }

    /// Builder: registers a listener.
    pub fn listener(mut self, action: MouseAction) -> Self {
        self.listeners.push(action);
        self
    }

    /// Builder: marks the element as not displayed.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Classifies the element by tag and, for inputs, by `type`.
    pub fn kind(&self) -> ElementKind {
        ElementKind::classify(&self.tag, self.attribute("type"))
    }

    pub fn has_listener(&self, action: MouseAction) -> bool {
        self.listeners.contains(&action) || self.attributes.contains_key(action.handler_attribute())
    }
}

/// The element kinds the matchers and identifiers distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    TextInput,
    PasswordInput,
    HiddenInput,
    FileInput,
    CheckBox,
    RadioButton,
    SubmitInput,
    ResetInput,
    ButtonInput,
    ImageInput,
    TextArea,
    Button,
    Select,
    Option,
    OptionGroup,
    Anchor,
    Image,
    Label,
    Form,
    Body,
    Table,
    TableRow,
    TableCell,
    OrderedList,
    ListItem,
    Legend,
    Break,
    /// Elements that never contribute text and are never displayed.
    NonRendered,
    /// Block-level containers that separate their content with blanks.
    Block,
    Other,
}

impl ElementKind {
    fn classify(tag: &str, input_type: Option<&str>) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "input" => match input_type.map(str::to_ascii_lowercase).as_deref() {
                Some("password") => ElementKind::PasswordInput,
                Some("hidden") => ElementKind::HiddenInput,
                Some("file") => ElementKind::FileInput,
                Some("checkbox") => ElementKind::CheckBox,
                Some("radio") => ElementKind::RadioButton,
                Some("submit") => ElementKind::SubmitInput,
                Some("reset") => ElementKind::ResetInput,
                Some("button") => ElementKind::ButtonInput,
                Some("image") => ElementKind::ImageInput,
                _ => ElementKind::TextInput,
            },
            "textarea" => ElementKind::TextArea,
            "button" => ElementKind::Button,
            "select" => ElementKind::Select,
            "option" => ElementKind::Option,
            "optgroup" => ElementKind::OptionGroup,
            "a" => ElementKind::Anchor,
            "img" => ElementKind::Image,
            "label" => ElementKind::Label,
            "form" => ElementKind::Form,
            "body" => ElementKind::Body,
            "table" => ElementKind::Table,
            "tr" => ElementKind::TableRow,
            "td" | "th" => ElementKind::TableCell,
            "ol" => ElementKind::OrderedList,
            "li" => ElementKind::ListItem,
            "legend" => ElementKind::Legend,
            "br" => ElementKind::Break,
            "head" | "title" | "script" | "style" | "meta" | "link" | "template" | "noscript" | "applet" => {
                ElementKind::NonRendered
            }
            "div" | "p" | "ul" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => ElementKind::Block,
            _ => ElementKind::Other,
        }
    }

    /// Controls that take part in form submission and bound labeling text.
    pub fn is_form_control(&self) -> bool {
        matches!(
            self,
            ElementKind::TextInput
                | ElementKind::PasswordInput
                | ElementKind::FileInput
                | ElementKind::CheckBox
                | ElementKind::RadioButton
                | ElementKind::SubmitInput
                | ElementKind::ResetInput
                | ElementKind::ButtonInput
                | ElementKind::ImageInput
                | ElementKind::TextArea
                | ElementKind::Button
                | ElementKind::Select
        )
    }

    /// Kinds a `label` element can point at.
    pub fn is_labelable(&self) -> bool {
        self.is_form_control()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_mixed_children() {
        let json = r#"{
            "tag": "p",
            "attributes": { "id": "para" },
            "children": ["Username ", { "tag": "input", "attributes": { "id": "user" } }]
        }"#;
        let element: Element = serde_json::from_str(json).unwrap();
        assert_eq!(element.id(), Some("para"));
        assert_eq!(element.children.len(), 2);
        assert!(matches!(&element.children[0], Node::Text(t) if t == "Username "));
        match &element.children[1] {
            Node::Element(input) => {
                assert_eq!(input.kind(), ElementKind::TextInput);
                assert!(!input.hidden);
                assert!(input.listeners.is_empty());
            }
            Node::Text(_) => panic!("expected an element"),
        }
    }

    #[test]
    fn test_document_from_json() {
        let document = Document::from_json(r#"{ "tag": "html", "children": [{ "tag": "body" }] }"#).unwrap();
        assert_eq!(document.root.tag, "html");
        assert!(Document::from_json("not json").is_err());
    }

    #[test]
    fn test_document_roundtrip() {
        let document = Document::new(
            Element::new("body").child(Element::new("a").attr("href", "x").text("Go").listener(MouseAction::Click)),
        );
        let json = serde_json::to_string(&document).unwrap();
        let loaded = Document::from_json(&json).unwrap();
        match &loaded.root.children[0] {
            Node::Element(anchor) => {
                assert!(anchor.has_listener(MouseAction::Click));
                assert!(!anchor.has_listener(MouseAction::MouseOver));
            }
            Node::Text(_) => panic!("expected an element"),
        }
    }

    #[test]
    fn test_classify_inputs() {
        let kind = |t: &str| Element::new("input").attr("type", t).kind();
        assert_eq!(Element::new("input").kind(), ElementKind::TextInput);
        assert_eq!(kind("email"), ElementKind::TextInput);
        assert_eq!(kind("PASSWORD"), ElementKind::PasswordInput);
        assert_eq!(kind("hidden"), ElementKind::HiddenInput);
        assert_eq!(kind("checkbox"), ElementKind::CheckBox);
        assert_eq!(kind("submit"), ElementKind::SubmitInput);
        assert_eq!(Element::new("TD").kind(), ElementKind::TableCell);
        assert_eq!(Element::new("script").kind(), ElementKind::NonRendered);
    }

    #[test]
    fn test_inline_handler_counts_as_listener() {
        let div = Element::new("div").attr("onmouseover", "highlight()");
        assert!(div.has_listener(MouseAction::MouseOver));
        assert!(!div.has_listener(MouseAction::Click));
    }

    #[test]
    fn test_form_controls() {
        assert!(ElementKind::Select.is_form_control());
        assert!(ElementKind::Button.is_form_control());
        assert!(!ElementKind::HiddenInput.is_form_control());
        assert!(!ElementKind::Label.is_form_control());
    }
}
