//! Link inertial overrides
//!
//! Override shape, as found in config files and the `links_inertial.json`
//! sidecar:
//!
//! ```json
//! {
//!   "link1": { "inertia": { "ixx": 0.02, "iyy": 0.01 }, "mass": 1.5 },
//!   "virtual_link": null
//! }
//! ```

use crate::document::{format_number, UrdfDocument};
use crate::xml::ElementExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};
use xmltree::Element;

/// Inertia tensor attributes in URDF order
const INERTIA_ATTRIBUTES: [&str; 6] = ["ixx", "ixy", "ixz", "iyy", "iyz", "izz"];

/// Value for one named sub-element of `<inertial>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InertialValue {
    /// Written to the sub-element's `value` attribute, e.g. `<mass value=".."/>`
    Scalar(f64),
    /// Attribute name to value, e.g. `<inertia ixx=".." .../>`
    Attributes(BTreeMap<String, f64>),
}

/// Sub-element name (`mass`, `inertia`, ...) to its new values
pub type InertialOverride = BTreeMap<String, InertialValue>;

/// Link name to override; `None` marks a virtual link that is skipped
pub type LinkInertials = BTreeMap<String, Option<InertialOverride>>;

/// What [`UrdfDocument::apply_link_inertials`] changed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InertialReport {
    pub updated: Vec<String>,
    /// Links configured as `null`
    pub virtual_links: Vec<String>,
    /// Links in scope with no entry in the override map
    pub not_configured: Vec<String>,
    /// Override keys that matched no link in scope
    pub unmatched: Vec<String>,
}

impl UrdfDocument {
    /// Overwrite `<inertial>` data from a name-keyed override map.
    ///
    /// Keys are bare link names; inside a macro they are matched against the
    /// prefixed names. Missing `<inertial>` and group sub-elements are
    /// created. Attributes not named in the override are left as they are.
    pub fn apply_link_inertials(&mut self, inertials: &LinkInertials) -> InertialReport {
        let keyed: BTreeMap<String, Option<&InertialOverride>> = inertials
            .iter()
            .map(|(name, value)| (self.scoped_name(name), value.as_ref()))
            .collect();

        let mut report = InertialReport::default();
        let mut matched = BTreeSet::new();

        for link in self.scope_element_mut().children_named_mut("link") {
            let Some(name) = link.attribute("name").map(str::to_owned) else {
                continue;
            };

            let groups = match keyed.get(&name) {
                None => {
                    warn!("Link {} not found in link inertial config", name);
                    report.not_configured.push(name);
                    continue;
                }
                Some(None) => {
                    debug!("Link {} is virtual, skipping", name);
                    matched.insert(name.clone());
                    report.virtual_links.push(name);
                    continue;
                }
                Some(Some(groups)) => groups,
            };
            matched.insert(name.clone());

            if link.get_child("inertial").is_none() {
                warn!(
                    "Link {} has no <inertial>, creating one with zero mass and inertia",
                    name
                );
                link.push_child(zeroed_inertial());
            }
            let inertial = link.get_or_insert_child("inertial");
            for (group, value) in groups.iter() {
                let element = inertial.get_or_insert_child(group);
                match value {
                    InertialValue::Scalar(v) => element.set_attribute("value", format_number(*v)),
                    InertialValue::Attributes(attrs) => {
                        for (key, v) in attrs {
                            element.set_attribute(key.as_str(), format_number(*v));
                        }
                    }
                }
            }
            debug!("Link {} inertial updated", name);
            report.updated.push(name);
        }

        report.unmatched = keyed
            .into_keys()
            .filter(|name| !matched.contains(name))
            .collect();
        for name in &report.unmatched {
            warn!("Link {} from the inertial config was not found in the document", name);
        }

        report
    }
}

/// A complete `<inertial>` whose values the override then replaces, so a
/// partial override still yields valid URDF
fn zeroed_inertial() -> Element {
    let mut origin = Element::new("origin");
    origin.set_attribute("xyz", "0 0 0");
    origin.set_attribute("rpy", "0 0 0");

    let mut mass = Element::new("mass");
    mass.set_attribute("value", format_number(0.0));

    let mut inertia = Element::new("inertia");
    for attr in INERTIA_ATTRIBUTES {
        inertia.set_attribute(attr, format_number(0.0));
    }

    let mut inertial = Element::new("inertial");
    inertial.push_child(origin);
    inertial.push_child(mass);
    inertial.push_child(inertia);
    inertial
}
