//! Joint limit overrides

use crate::document::{format_number, UrdfDocument};
use crate::xml::ElementExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Limit override for one joint. Absent and `null` fields are equivalent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointLimit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
}

impl JointLimit {
    /// Override with both bounds; effort and velocity left untouched
    pub fn bounded(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
            ..Default::default()
        }
    }

    pub fn with_effort(mut self, effort: f64) -> Self {
        self.effort = Some(effort);
        self
    }

    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// No bounds at all means the joint spins freely
    pub fn is_continuous(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }

    /// Present fields as `<limit>` attribute pairs
    fn fields(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("lower", self.lower),
            ("upper", self.upper),
            ("effort", self.effort),
            ("velocity", self.velocity),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
    }
}

/// What [`UrdfDocument::apply_joint_limits`] changed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JointLimitReport {
    /// Joints that received (part of) a limit override
    pub updated: Vec<String>,
    /// Joints turned into continuous joints
    pub continuous: Vec<String>,
    /// Override keys that matched no joint in scope
    pub unmatched: Vec<String>,
}

impl UrdfDocument {
    /// Overwrite joint limits from a name-keyed override map.
    ///
    /// A joint whose override has neither `lower` nor `upper` becomes
    /// `continuous` and loses its `<limit>`. Any other override makes the
    /// joint `revolute`, creates `<limit>` if needed and writes only the
    /// fields that are present.
    pub fn apply_joint_limits(&mut self, limits: &BTreeMap<String, JointLimit>) -> JointLimitReport {
        let keyed: BTreeMap<String, &JointLimit> = limits
            .iter()
            .map(|(name, limit)| (self.scoped_name(name), limit))
            .collect();

        let mut report = JointLimitReport::default();
        let mut matched = BTreeSet::new();

        for joint in self.scope_element_mut().children_named_mut("joint") {
            let Some(name) = joint.attribute("name").map(str::to_owned) else {
                continue;
            };
            let Some(limit) = keyed.get(&name) else {
                continue;
            };
            matched.insert(name.clone());

            if limit.is_continuous() {
                joint.set_attribute("type", "continuous");
                joint.remove_children("limit");
                debug!("Joint {} set to continuous", name);
                report.continuous.push(name);
                continue;
            }

            joint.set_attribute("type", "revolute");
            let element = joint.get_or_insert_child("limit");
            for (key, value) in limit.fields() {
                element.set_attribute(key, format_number(value));
            }
            debug!("Joint {} limits updated", name);
            report.updated.push(name);
        }

        report.unmatched = keyed
            .into_keys()
            .filter(|name| !matched.contains(name))
            .collect();
        for name in &report.unmatched {
            warn!("Joint {} from the limit config was not found in the document", name);
        }

        report
    }
}
