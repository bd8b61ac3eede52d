//! Document summaries for the `inspect` command

use crate::document::{MacroOrigin, Scope, UrdfDocument};
use crate::error::{Result, XacroError};
use crate::xml::ElementExt;
use clap::ValueEnum;
use serde::Serialize;
use xmltree::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobotSummary {
    pub robot_name: String,
    pub source: String,
    /// `flat`, `macro (loaded)` or `macro (wrapped)`
    pub scope: String,
    pub joints: Vec<JointSummary>,
    pub links: Vec<LinkSummary>,
    pub mesh_references: Vec<MeshReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JointSummary {
    pub name: String,
    pub joint_type: String,
    pub parent: Option<String>,
    pub child: Option<String>,
    pub has_limit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkSummary {
    pub name: String,
    pub visuals: usize,
    pub collisions: usize,
    pub has_inertial: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshReference {
    pub link: String,
    /// `visual` or `collision`
    pub kind: String,
    pub filename: String,
}

impl UrdfDocument {
    /// Joints, links and mesh references in the operative scope
    pub fn summary(&self) -> RobotSummary {
        let scope = match self.scope() {
            Scope::Flat => "flat",
            Scope::Macro {
                origin: MacroOrigin::Loaded,
                ..
            } => "macro (loaded)",
            Scope::Macro {
                origin: MacroOrigin::Wrapped,
                ..
            } => "macro (wrapped)",
        };

        let joints = self
            .joints()
            .map(|joint| JointSummary {
                name: name_of(joint),
                joint_type: joint.attribute("type").unwrap_or("unknown").to_string(),
                parent: link_ref(joint, "parent"),
                child: link_ref(joint, "child"),
                has_limit: joint.get_child("limit").is_some(),
            })
            .collect();

        let mut links = Vec::new();
        let mut mesh_references = Vec::new();
        for link in self.links() {
            let name = name_of(link);
            for kind in ["visual", "collision"] {
                for element in link.children_named(kind) {
                    if let Some(filename) = element
                        .descendant(&["geometry", "mesh"])
                        .and_then(|mesh| mesh.attribute("filename"))
                    {
                        mesh_references.push(MeshReference {
                            link: name.clone(),
                            kind: kind.to_string(),
                            filename: filename.to_string(),
                        });
                    }
                }
            }
            links.push(LinkSummary {
                visuals: link.children_named("visual").count(),
                collisions: link.children_named("collision").count(),
                has_inertial: link.get_child("inertial").is_some(),
                name,
            });
        }

        RobotSummary {
            robot_name: self.robot_name().to_string(),
            source: self.source().to_string(),
            scope: scope.to_string(),
            joints,
            links,
            mesh_references,
        }
    }
}

fn name_of(element: &Element) -> String {
    element.attribute("name").unwrap_or_default().to_string()
}

fn link_ref(joint: &Element, tag: &str) -> Option<String> {
    joint
        .get_child(tag)
        .and_then(|e| e.attribute("link"))
        .map(str::to_owned)
}

pub fn format_text(summary: &RobotSummary, verbose: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} ({}, {})\n",
        summary.robot_name, summary.source, summary.scope
    ));
    output.push_str(&format!(
        "  {} joints, {} links, {} mesh references\n",
        summary.joints.len(),
        summary.links.len(),
        summary.mesh_references.len()
    ));

    if !summary.joints.is_empty() {
        output.push_str("\nJoints:\n");
        for joint in &summary.joints {
            let limit = if joint.has_limit { " [limit]" } else { "" };
            output.push_str(&format!(
                "  {} ({}): {} -> {}{}\n",
                joint.name,
                joint.joint_type,
                joint.parent.as_deref().unwrap_or("?"),
                joint.child.as_deref().unwrap_or("?"),
                limit
            ));
        }
    }

    if !summary.links.is_empty() {
        output.push_str("\nLinks:\n");
        for link in &summary.links {
            let inertial = if link.has_inertial { "" } else { ", no inertial" };
            output.push_str(&format!(
                "  {} ({} visual, {} collision{})\n",
                link.name, link.visuals, link.collisions, inertial
            ));
        }
    }

    if verbose && !summary.mesh_references.is_empty() {
        output.push_str("\nMesh References:\n");
        for mesh in &summary.mesh_references {
            output.push_str(&format!("  {} {}: {}\n", mesh.link, mesh.kind, mesh.filename));
        }
    }

    output
}

pub fn format_json(summary: &RobotSummary) -> Result<String> {
    serde_json::to_string_pretty(summary)
        .map_err(|e| XacroError::Serialize(format!("Failed to serialize to JSON: {}", e)))
}
