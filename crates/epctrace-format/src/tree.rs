//! Wire element tree and the shared extension container.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::errors::FormatError;

/// Name of the lazily-created schema-extension container.
const EXTENSION_NAME: &str = "extension";

/// Node in a wire tree: a nested element or a text run.
#[derive(Debug, Clone, PartialEq)]
pub enum WireNode {
    /// Nested element.
    Element(WireElement),
    /// Text content.
    Text(String),
}

/// Named element in the wire tree.
///
/// Structural equality (`PartialEq`) is the determinism contract of the
/// formatter; XML rendering is a convenience for response assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct WireElement {
    /// Element name.
    pub name: String,
    /// Element namespace, rendered as an `xmlns` attribute; `None` for
    /// elements of the base schema.
    pub namespace: Option<String>,
    /// Attributes in insertion order.
    pub attributes: Vec<(String, String)>,
    /// Child nodes in insertion order.
    pub children: Vec<WireNode>,
}

impl WireElement {
    /// Creates an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates an element with a single text child.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.push_text(text);
        element
    }

    /// Adds an attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.push((name.into(), value.into()));
    }

    /// Appends a child element.
    pub fn push_child(&mut self, child: WireElement) {
        self.children.push(WireNode::Element(child));
    }

    /// Appends a text run.
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(WireNode::Text(text.into()));
    }

    /// Returns true if the element has any children.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Returns the first child element with the given name.
    pub fn child(&self, name: &str) -> Option<&WireElement> {
        self.children.iter().find_map(|node| match node {
            WireNode::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    /// Iterates over all child elements with the given name.
    pub fn children_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a WireElement> + 'a {
        self.children.iter().filter_map(move |node| match node {
            WireNode::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    /// Concatenated text content of the element's direct text runs.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let WireNode::Text(text) = node {
                out.push_str(text);
            }
        }
        out
    }

    /// Returns the extension container of this element, creating and
    /// appending it on first use.
    ///
    /// Every schema-extension mechanism shares the one container: repeated
    /// calls return the same child, so an element never carries more than
    /// one `extension`.
    pub fn extension_mut(&mut self) -> &mut WireElement {
        let exists = self
            .children
            .iter()
            .any(|node| matches!(node, WireNode::Element(element) if element.name == EXTENSION_NAME));
        if !exists {
            self.push_child(WireElement::new(EXTENSION_NAME));
        }
        self.children
            .iter_mut()
            .find_map(|node| match node {
                WireNode::Element(element) if element.name == EXTENSION_NAME => Some(element),
                _ => None,
            })
            .expect("extension child present")
    }

    /// Renders the tree as XML text.
    pub fn to_xml(&self) -> Result<String, FormatError> {
        let mut writer = Writer::new(Vec::new());
        self.write_into(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|err| FormatError::Render(err.to_string()))
    }

    fn write_into(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), FormatError> {
        let render = |err: quick_xml::Error| FormatError::Render(err.to_string());

        let mut start = BytesStart::new(self.name.as_str());
        if let Some(namespace) = &self.namespace {
            start.push_attribute(("xmlns", namespace.as_str()));
        }
        for (name, value) in &self.attributes {
            start.push_attribute((name.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start)).map_err(render)?;
            return Ok(());
        }

        writer.write_event(Event::Start(start)).map_err(render)?;
        for node in &self.children {
            match node {
                WireNode::Element(element) => element.write_into(writer)?,
                WireNode::Text(text) => writer
                    .write_event(Event::Text(BytesText::new(text)))
                    .map_err(render)?,
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(render)?;
        Ok(())
    }
}
