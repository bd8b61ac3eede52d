//! Ordered execution of the updaters
//!
//! Updaters run in a fixed order: joint limits, link inertials, mesh paths,
//! then the macro wrapper. Name-keyed updaters therefore always see the
//! names as they were before wrapping, unless the document was loaded as a
//! macro already.

use crate::document::UrdfDocument;
use crate::inertial::{InertialReport, LinkInertials};
use crate::joints::{JointLimit, JointLimitReport};
use crate::meshes::{MeshPathSplit, MeshSplitReport};
use crate::xacro::{MacroParams, WrapOutcome};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct TransformPlan {
    pub joint_limits: Option<BTreeMap<String, JointLimit>>,
    pub link_inertials: Option<LinkInertials>,
    pub mesh_split: Option<MeshPathSplit>,
    pub wrap: Option<MacroParams>,
}

impl TransformPlan {
    /// A plan that changes nothing
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_joint_limits(mut self, limits: BTreeMap<String, JointLimit>) -> Self {
        self.joint_limits = Some(limits);
        self
    }

    pub fn with_link_inertials(mut self, inertials: LinkInertials) -> Self {
        self.link_inertials = Some(inertials);
        self
    }

    pub fn with_mesh_split(mut self, split: MeshPathSplit) -> Self {
        self.mesh_split = Some(split);
        self
    }

    pub fn with_wrap(mut self, params: MacroParams) -> Self {
        self.wrap = Some(params);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.joint_limits.is_none()
            && self.link_inertials.is_none()
            && self.mesh_split.is_none()
            && self.wrap.is_none()
    }

    /// Run every configured step against `doc`
    pub fn apply(&self, doc: &mut UrdfDocument) -> TransformReport {
        // a loaded macro keeps the prefix parameter it declares
        if let Some(params) = &self.wrap {
            if doc.is_macro() && doc.prefix_param() != params.prefix {
                warn!(
                    "{} already declares '{}' as its prefix parameter, ignoring '{}'",
                    doc.robot_name(),
                    doc.prefix_param(),
                    params.prefix
                );
            }
        }

        let mut report = TransformReport::default();

        if let Some(limits) = &self.joint_limits {
            info!("Updating joint limits");
            report.joints = Some(doc.apply_joint_limits(limits));
        }
        if let Some(inertials) = &self.link_inertials {
            info!("Updating link inertials");
            report.inertials = Some(doc.apply_link_inertials(inertials));
        }
        if let Some(split) = &self.mesh_split {
            info!("Splitting visual and collision mesh paths");
            report.meshes = Some(doc.split_mesh_paths(split));
        }
        if let Some(params) = &self.wrap {
            report.wrap = Some(doc.wrap_in_macro(params));
        }

        report
    }
}

/// Per-step results of [`TransformPlan::apply`]; `None` for skipped steps
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joints: Option<JointLimitReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inertials: Option<InertialReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meshes: Option<MeshSplitReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap: Option<WrapOutcome>,
}

impl TransformReport {
    /// Number of override keys, across all steps, that matched nothing
    pub fn unmatched_count(&self) -> usize {
        self.joints.as_ref().map_or(0, |r| r.unmatched.len())
            + self.inertials.as_ref().map_or(0, |r| r.unmatched.len())
    }
}
