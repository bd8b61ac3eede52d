//! `xmltree` helpers for in-place document mutation
//!
//! Documents are plain [`xmltree::Element`] trees. Each element keeps its
//! namespace prefix and the `xmlns` bindings in scope, so the writer
//! reproduces whatever alias the document used (`xacro:macro` stays
//! `xacro:macro`). Whitespace-only text between elements is dropped on
//! parse and the writer re-indents.

use thiserror::Error;
use xmltree::{Element, EmitterConfig, XMLNode};

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("XML parse error: {0}")]
    Parse(String),

    #[error("XML write error: {0}")]
    Write(String),
}

/// Parse a whole document, returning its root element
pub fn parse(xml: &str) -> Result<Element, XmlError> {
    Element::parse(xml.as_bytes()).map_err(|e| XmlError::Parse(e.to_string()))
}

/// Serialize with an XML declaration and two-space indentation
pub fn to_xml_string(root: &Element) -> Result<String, XmlError> {
    let config = EmitterConfig::new()
        .perform_indent(true)
        .indent_string("  ")
        .pad_self_closing(false);

    let mut bytes = Vec::new();
    root.write_with_config(&mut bytes, config)
        .map_err(|e| XmlError::Write(e.to_string()))?;
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(|e| XmlError::Write(e.to_string()))
}

/// Convenience accessors missing from [`xmltree::Element`]
pub trait ElementExt {
    fn attribute(&self, key: &str) -> Option<&str>;

    /// Set an attribute, keeping its position when it already exists
    fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>);

    fn push_child(&mut self, child: Element);

    /// Tag name as written, e.g. `xacro:macro`
    fn qualified_name(&self) -> String;

    /// All direct element children with the given local name
    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a;

    fn children_named_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut Element> + 'a;

    /// First direct child with the given name, appending an empty one when
    /// none exists
    fn get_or_insert_child(&mut self, name: &str) -> &mut Element;

    /// Remove every direct child with the given name; returns how many went
    fn remove_children(&mut self, name: &str) -> usize;

    /// Follow a path of tag names, e.g. `["geometry", "mesh"]`
    fn descendant(&self, path: &[&str]) -> Option<&Element>;

    fn descendant_mut(&mut self, path: &[&str]) -> Option<&mut Element>;
}

impl ElementExt for Element {
    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    fn push_child(&mut self, child: Element) {
        self.children.push(XMLNode::Element(child));
    }

    fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.name),
            None => self.name.clone(),
        }
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children
            .iter()
            .filter_map(XMLNode::as_element)
            .filter(move |e| e.name == name)
    }

    fn children_named_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut Element> + 'a {
        self.children
            .iter_mut()
            .filter_map(XMLNode::as_mut_element)
            .filter(move |e| e.name == name)
    }

    fn get_or_insert_child(&mut self, name: &str) -> &mut Element {
        let index = match self
            .children
            .iter()
            .position(|n| matches!(n, XMLNode::Element(e) if e.name == name))
        {
            Some(index) => index,
            None => {
                self.push_child(Element::new(name));
                self.children.len() - 1
            }
        };

        match &mut self.children[index] {
            XMLNode::Element(element) => element,
            _ => unreachable!("position only matches element nodes"),
        }
    }

    fn remove_children(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|n| !matches!(n, XMLNode::Element(e) if e.name == name));
        before - self.children.len()
    }

    fn descendant(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |element, name| element.get_child(*name))
    }

    fn descendant_mut(&mut self, path: &[&str]) -> Option<&mut Element> {
        let mut current = self;
        for name in path {
            current = current.get_mut_child(*name)?;
        }
        Some(current)
    }
}
