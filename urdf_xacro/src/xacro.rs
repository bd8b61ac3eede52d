//! Macro wrapping and name prefixing
//!
//! Turns a flat URDF into a reusable xacro macro:
//!
//! ```xml
//! <robot name="arm" xmlns:xacro="http://www.ros.org/wiki/xacro">
//!   <xacro:macro name="arm" params="prefix">
//!     <link name="${prefix}base_link"/>
//!     ...
//!   </xacro:macro>
//! </robot>
//! ```
//!
//! Prefixing rewrites the very names the joint/link updaters match on, so it
//! must run after them. [`crate::plan::TransformPlan`] enforces that order.

use crate::document::{MacroOrigin, Scope, UrdfDocument};
use crate::xml::ElementExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use xmltree::{Element, Namespace};

/// Namespace URI declared on newly wrapped documents
pub const XACRO_NAMESPACE: &str = "http://www.ros.org/wiki/xacro";

/// URIs that xacro accepts for its namespace
const XACRO_NAMESPACE_URIS: [&str; 3] = [
    XACRO_NAMESPACE,
    "http://wiki.ros.org/xacro",
    "http://ros.org/wiki/xacro",
];

/// Alias used when the document does not bind the xacro namespace yet
const DEFAULT_ALIAS: &str = "xacro";

/// Default macro parameter carrying the name prefix
pub const DEFAULT_PREFIX_PARAM: &str = "prefix";

/// The `${param}` substitution token prepended to names inside a macro
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixToken {
    param: String,
    token: String,
}

impl PrefixToken {
    pub fn new(param: impl Into<String>) -> Self {
        let param = param.into();
        let token = format!("${{{}}}", param);
        Self { param, token }
    }

    pub fn param(&self) -> &str {
        &self.param
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Prepend the token unless the name already starts with it
    pub fn apply(&self, name: &str) -> String {
        if name.starts_with(&self.token) {
            name.to_string()
        } else {
            format!("{}{}", self.token, name)
        }
    }
}

impl Default for PrefixToken {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX_PARAM)
    }
}

/// Parameters declared on the generated `<xacro:macro>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroParams {
    /// Parameter bound to the name prefix
    pub prefix: String,
    /// Additional parameters declared after the prefix
    #[serde(default)]
    pub extra: Vec<String>,
}

impl MacroParams {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            extra: Vec::new(),
        }
    }

    pub fn with_extra(mut self, params: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra.extend(params.into_iter().map(Into::into));
        self
    }

    /// Value of the macro's `params` attribute
    pub fn declaration(&self) -> String {
        let mut declared: Vec<&str> = vec![self.prefix.as_str()];
        for param in &self.extra {
            if !declared.contains(&param.as_str()) {
                declared.push(param);
            }
        }
        declared.join(" ")
    }
}

impl Default for MacroParams {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX_PARAM)
    }
}

/// Result of [`UrdfDocument::wrap_in_macro`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WrapOutcome {
    Wrapped {
        prefixed_joints: usize,
        prefixed_links: usize,
    },
    /// The document was already a macro; nothing changed
    AlreadyMacro,
}

impl UrdfDocument {
    /// Wrap every root child in a `<xacro:macro>` named after the robot and
    /// prefix all joint and link names.
    ///
    /// Runs at most once per document. A document that is already a macro is
    /// left untouched and [`WrapOutcome::AlreadyMacro`] is returned.
    pub fn wrap_in_macro(&mut self, params: &MacroParams) -> WrapOutcome {
        if self.scope.is_macro() {
            info!("'{}' is already a xacro macro, skipping wrap", self.robot_name());
            return WrapOutcome::AlreadyMacro;
        }

        let (alias, uri) = self.declare_xacro_namespace();
        let robot_name = self.robot_name().to_string();

        let mut macro_element = Element::new("macro");
        macro_element.prefix = Some(alias.clone());
        macro_element.namespace = Some(uri);
        macro_element.namespaces = self.root.namespaces.clone();
        macro_element.set_attribute("name", robot_name.as_str());
        macro_element.set_attribute("params", params.declaration());
        macro_element.children = std::mem::take(&mut self.root.children);
        self.root.push_child(macro_element);

        self.scope = Scope::Macro {
            index: self.root.children.len() - 1,
            origin: MacroOrigin::Wrapped,
        };
        self.set_prefix_param(params.prefix.as_str());

        let (prefixed_joints, prefixed_links) = self.add_prefix();
        info!(
            "Wrapped '{}' in {}:macro ({} joints, {} links prefixed with {})",
            robot_name,
            alias,
            prefixed_joints,
            prefixed_links,
            self.prefix.token()
        );

        WrapOutcome::Wrapped {
            prefixed_joints,
            prefixed_links,
        }
    }

    /// Bind the xacro namespace on the root, reusing an existing alias.
    /// Returns the alias and its URI.
    fn declare_xacro_namespace(&mut self) -> (String, String) {
        let namespaces = self.root.namespaces.get_or_insert_with(Namespace::empty);
        let existing = namespaces
            .0
            .iter()
            .find(|(alias, uri)| !alias.is_empty() && XACRO_NAMESPACE_URIS.contains(&uri.as_str()))
            .map(|(alias, uri)| (alias.clone(), uri.clone()));

        match existing {
            Some(binding) => binding,
            None => {
                namespaces.put(DEFAULT_ALIAS, XACRO_NAMESPACE);
                (DEFAULT_ALIAS.to_string(), XACRO_NAMESPACE.to_string())
            }
        }
    }

    /// Prefix joint names, joint parent/child/mimic references and link
    /// names in the current scope
    fn add_prefix(&mut self) -> (usize, usize) {
        let prefix = self.prefix.clone();
        let scope = self.scope_element_mut();

        let mut joints = 0;
        for joint in scope.children_named_mut("joint") {
            for (tag, attr) in [("parent", "link"), ("child", "link"), ("mimic", "joint")] {
                if let Some(reference) = joint.get_mut_child(tag) {
                    if let Some(value) = reference.attribute(attr).map(|v| prefix.apply(v)) {
                        reference.set_attribute(attr, value);
                    }
                }
            }
            if let Some(name) = joint.attribute("name").map(|v| prefix.apply(v)) {
                debug!("Prefixed joint {}", name);
                joint.set_attribute("name", name);
                joints += 1;
            }
        }

        let mut links = 0;
        for link in scope.children_named_mut("link") {
            if let Some(name) = link.attribute("name").map(|v| prefix.apply(v)) {
                debug!("Prefixed link {}", name);
                link.set_attribute("name", name);
                links += 1;
            }
        }

        (joints, links)
    }
}
