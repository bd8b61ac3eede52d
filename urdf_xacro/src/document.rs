//! URDF document loading, macro-scope detection and serialization
//!
//! A [`UrdfDocument`] owns the parsed tree plus an explicit [`Scope`]. Every
//! structural update addresses the children of the scope element: the
//! `<robot>` root for flat documents, or the `<xacro:macro>` named after the
//! robot for wrapped ones.

use crate::error::{Result, XacroError};
use crate::xacro::PrefixToken;
use crate::xml::{self, ElementExt};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use xmltree::{Element, XMLNode};

/// Name used for documents that did not come from a file
const INLINE_SOURCE: &str = "<inline>";

/// Where a macro wrapper came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroOrigin {
    /// The document was already a macro when it was loaded
    Loaded,
    /// The document was wrapped by [`UrdfDocument::wrap_in_macro`]
    Wrapped,
}

/// Operative scope of the structural updaters.
///
/// `Flat -> Macro` is the only transition; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Flat,
    Macro {
        /// Index of the macro element in the root's children
        index: usize,
        origin: MacroOrigin,
    },
}

impl Scope {
    pub fn is_macro(&self) -> bool {
        matches!(self, Scope::Macro { .. })
    }
}

/// In-memory robot description
#[derive(Debug, Clone)]
pub struct UrdfDocument {
    source: String,
    pub(crate) root: Element,
    robot_name: String,
    pub(crate) scope: Scope,
    pub(crate) prefix: PrefixToken,
}

impl UrdfDocument {
    /// Load and parse a URDF/xacro file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let xml = fs::read_to_string(path).map_err(|source| XacroError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_with_source(&xml, path.display().to_string())
    }

    /// Parse a document held in memory
    pub fn parse_str(xml: &str) -> Result<Self> {
        Self::parse_with_source(xml, INLINE_SOURCE.to_string())
    }

    fn parse_with_source(xml: &str, source: String) -> Result<Self> {
        let root = xml::parse(xml).map_err(|e| XacroError::MalformedDocument {
            source_name: source.clone(),
            reason: e.to_string(),
        })?;

        if root.name != "robot" {
            warn!(
                "Root element of {} is <{}>, expected <robot>",
                source,
                root.qualified_name()
            );
        }

        let robot_name = root
            .attribute("name")
            .map(str::to_owned)
            .ok_or_else(|| XacroError::MissingRobotName {
                source_name: source.clone(),
            })?;

        let (scope, prefix) = match find_macro(&root, &robot_name) {
            Some((index, element)) => {
                let prefix = element
                    .attribute("params")
                    .and_then(first_param)
                    .map(PrefixToken::new)
                    .unwrap_or_default();
                let scope = Scope::Macro {
                    index,
                    origin: MacroOrigin::Loaded,
                };
                (scope, prefix)
            }
            None => (Scope::Flat, PrefixToken::default()),
        };

        info!("Robot name: {}", robot_name);
        debug!("Loaded {} with scope {:?}", source, scope);

        Ok(Self {
            source,
            root,
            robot_name,
            scope,
            prefix,
        })
    }

    pub fn robot_name(&self) -> &str {
        &self.robot_name
    }

    /// File path or `<inline>` for parsed strings
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_macro(&self) -> bool {
        self.scope.is_macro()
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Macro parameter whose substitution token prefixes names inside a
    /// macro-wrapped document
    pub fn prefix_param(&self) -> &str {
        self.prefix.param()
    }

    pub fn set_prefix_param(&mut self, param: impl Into<String>) {
        self.prefix = PrefixToken::new(param);
    }

    /// Element whose children the updaters operate on
    pub fn scope_element(&self) -> &Element {
        match self.scope {
            Scope::Flat => &self.root,
            Scope::Macro { index, .. } => match &self.root.children[index] {
                XMLNode::Element(element) => element,
                _ => unreachable!("macro scope always indexes an element"),
            },
        }
    }

    pub(crate) fn scope_element_mut(&mut self) -> &mut Element {
        match self.scope {
            Scope::Flat => &mut self.root,
            Scope::Macro { index, .. } => match &mut self.root.children[index] {
                XMLNode::Element(element) => element,
                _ => unreachable!("macro scope always indexes an element"),
            },
        }
    }

    /// `<joint>` elements directly inside the scope
    pub fn joints(&self) -> impl Iterator<Item = &Element> {
        self.scope_element().children_named("joint")
    }

    /// `<link>` elements directly inside the scope
    pub fn links(&self) -> impl Iterator<Item = &Element> {
        self.scope_element().children_named("link")
    }

    /// Map a caller-supplied bare name to the name used in the document.
    ///
    /// Inside a macro every joint and link name carries the prefix token,
    /// so `link1` becomes `${prefix}link1`. Flat documents use names as-is.
    pub fn scoped_name(&self, name: &str) -> String {
        if self.scope.is_macro() {
            self.prefix.apply(name)
        } else {
            name.to_string()
        }
    }

    /// Serialize the whole document, XML declaration included
    pub fn to_xml_string(&self) -> Result<String> {
        xml::to_xml_string(&self.root).map_err(|e| XacroError::Serialize(e.to_string()))
    }

    /// Write the document to `path` in a single write
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let xml = self.to_xml_string()?;
        fs::write(path, xml).map_err(|source| XacroError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Output file saved to {}", path.display());
        Ok(path.to_path_buf())
    }
}

/// Root child that wraps the robot as a macro, with its index
fn find_macro<'a>(root: &'a Element, robot_name: &str) -> Option<(usize, &'a Element)> {
    root.children.iter().enumerate().find_map(|(index, node)| match node {
        XMLNode::Element(e) if e.name == "macro" && e.attribute("name") == Some(robot_name) => {
            Some((index, e))
        }
        _ => None,
    })
}

/// Name of the first non-block parameter in a macro `params` declaration,
/// ignoring defaults (`prefix:=''`)
fn first_param(params: &str) -> Option<&str> {
    params
        .split_whitespace()
        .filter(|param| !param.starts_with('*'))
        .filter_map(|param| param.split(['=', ':']).next())
        .find(|name| !name.is_empty())
}

/// Attribute text for a numeric override
pub(crate) fn format_number(value: f64) -> String {
    value.to_string()
}
