//! Splitting visual and collision mesh paths
//!
//! Packages often ship one set of meshes referenced from both `<visual>` and
//! `<collision>`. The splitter rewrites the two independently, e.g.
//! `package://arm/meshes/` to `package://arm/meshes/visual/` for visuals and
//! `package://arm/meshes/collision/` for collisions, and can create missing
//! collision elements from the visuals first.

use crate::xml::ElementExt;
use crate::UrdfDocument;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use xmltree::Element;

const MESH_PATH: [&str; 2] = ["geometry", "mesh"];

/// Old/new path fragments for visuals and collisions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshPathSplit {
    pub old_visual: String,
    pub new_visual: String,
    pub old_collision: String,
    pub new_collision: String,
    /// Clone visuals into links that have no collision element
    #[serde(default)]
    pub create_collision: bool,
}

impl MeshPathSplit {
    /// Same fragments for visuals and collisions
    pub fn new(old_visual: impl Into<String>, new_visual: impl Into<String>) -> Self {
        let old_visual = old_visual.into();
        let new_visual = new_visual.into();
        Self {
            old_collision: old_visual.clone(),
            new_collision: new_visual.clone(),
            old_visual,
            new_visual,
            create_collision: false,
        }
    }

    pub fn with_collision(
        mut self,
        old_collision: impl Into<String>,
        new_collision: impl Into<String>,
    ) -> Self {
        self.old_collision = old_collision.into();
        self.new_collision = new_collision.into();
        self
    }

    pub fn create_collision(mut self, create: bool) -> Self {
        self.create_collision = create;
        self
    }
}

/// What [`UrdfDocument::split_mesh_paths`] changed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeshSplitReport {
    pub visuals_rewritten: usize,
    pub collisions_rewritten: usize,
    pub collisions_created: usize,
    /// Links with neither visual nor collision elements
    pub links_without_geometry: Vec<String>,
}

impl UrdfDocument {
    /// Rewrite mesh filenames of every link in scope.
    ///
    /// Collisions created with `create_collision` are cloned from the visuals
    /// before any rewrite, so they only ever see the collision fragments.
    pub fn split_mesh_paths(&mut self, split: &MeshPathSplit) -> MeshSplitReport {
        let mut report = MeshSplitReport::default();

        for link in self.scope_element_mut().children_named_mut("link") {
            let name = link.attribute("name").unwrap_or_default().to_string();
            let visuals = link.children_named("visual").count();
            let collisions = link.children_named("collision").count();

            if visuals == 0 && collisions == 0 {
                warn!("Link {} has no visual or collision elements", name);
                report.links_without_geometry.push(name);
                continue;
            }

            if collisions == 0 && split.create_collision {
                let created: Vec<Element> = link
                    .children_named("visual")
                    .map(collision_from_visual)
                    .collect();
                debug!("Link {}: created {} collision elements", name, created.len());
                report.collisions_created += created.len();
                for collision in created {
                    link.push_child(collision);
                }
            }

            for visual in link.children_named_mut("visual") {
                if replace_mesh_path(visual, &split.old_visual, &split.new_visual) {
                    report.visuals_rewritten += 1;
                }
            }
            for collision in link.children_named_mut("collision") {
                if replace_mesh_path(collision, &split.old_collision, &split.new_collision) {
                    report.collisions_rewritten += 1;
                }
            }
        }

        report
    }
}

/// New `<collision>` carrying a copy of the visual's origin and geometry
fn collision_from_visual(visual: &Element) -> Element {
    let mut collision = Element::new("collision");
    for tag in ["origin", "geometry"] {
        if let Some(child) = visual.get_child(tag) {
            collision.push_child(child.clone());
        }
    }
    collision
}

/// Substring-replace within `geometry/mesh@filename`. Returns whether the
/// filename changed.
fn replace_mesh_path(element: &mut Element, old: &str, new: &str) -> bool {
    if old.is_empty() {
        return false;
    }
    let Some(mesh) = element.descendant_mut(&MESH_PATH) else {
        return false;
    };
    let Some(filename) = mesh.attribute("filename") else {
        return false;
    };
    if !filename.contains(old) {
        return false;
    }

    let rewritten = filename.replace(old, new);
    debug!("{} -> {}", filename, rewritten);
    mesh.set_attribute("filename", rewritten);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARM: &str = r#"<robot name="arm">
  <link name="base_link">
    <visual>
      <origin xyz="0 0 0.05" rpy="0 0 0"/>
      <geometry><mesh filename="package://arm_description/meshes/base_link.STL"/></geometry>
    </visual>
    <collision>
      <geometry><mesh filename="package://arm_description/meshes/base_link.STL"/></geometry>
    </collision>
  </link>
  <link name="link1">
    <visual>
      <origin xyz="0 0 0.1" rpy="0 0 1.57"/>
      <geometry><mesh filename="package://arm_description/meshes/link1.STL"/></geometry>
      <material name="grey"/>
    </visual>
  </link>
  <link name="tool0"/>
</robot>"#;

    fn split() -> MeshPathSplit {
        MeshPathSplit::new(
            "package://arm_description/meshes",
            "package://arm_description/meshes/visual",
        )
        .with_collision(
            "package://arm_description/meshes",
            "package://arm_description/meshes/collision",
        )
    }

    fn mesh_files(doc: &UrdfDocument, link: &str, tag: &str) -> Vec<String> {
        doc.links()
            .find(|l| l.attribute("name") == Some(link))
            .map(|l| {
                l.children_named(tag)
                    .filter_map(|e| e.descendant(&MESH_PATH))
                    .filter_map(|m| m.attribute("filename"))
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_visual_and_collision_rewritten_independently() {
        let mut doc = UrdfDocument::parse_str(ARM).unwrap();
        let report = doc.split_mesh_paths(&split());

        assert_eq!(report.visuals_rewritten, 2);
        assert_eq!(report.collisions_rewritten, 1);
        assert_eq!(
            mesh_files(&doc, "base_link", "visual"),
            vec!["package://arm_description/meshes/visual/base_link.STL"]
        );
        assert_eq!(
            mesh_files(&doc, "base_link", "collision"),
            vec!["package://arm_description/meshes/collision/base_link.STL"]
        );
        assert!(mesh_files(&doc, "link1", "collision").is_empty());
        assert_eq!(report.links_without_geometry, vec!["tool0"]);
    }

    #[test]
    fn test_create_collision_clones_visual() {
        let mut doc = UrdfDocument::parse_str(ARM).unwrap();
        let report = doc.split_mesh_paths(&split().create_collision(true));

        assert_eq!(report.collisions_created, 1);
        assert_eq!(
            mesh_files(&doc, "link1", "collision"),
            vec!["package://arm_description/meshes/collision/link1.STL"]
        );
        assert_eq!(
            mesh_files(&doc, "link1", "visual"),
            vec!["package://arm_description/meshes/visual/link1.STL"]
        );

        let link1 = doc.links().find(|l| l.attribute("name") == Some("link1")).unwrap();
        let collision = link1.get_child("collision").unwrap();
        assert_eq!(
            collision.get_child("origin").unwrap().attribute("rpy"),
            Some("0 0 1.57")
        );
        // materials are visual-only
        assert!(collision.get_child("material").is_none());
        // base_link already had a collision
        assert_eq!(mesh_files(&doc, "base_link", "collision").len(), 1);
    }

    #[test]
    fn test_second_pass_is_noop() {
        let split = MeshPathSplit::new(
            "package://arm_description/meshes",
            "package://arm_visuals/meshes",
        )
        .with_collision(
            "package://arm_description/meshes",
            "package://arm_collisions/meshes",
        )
        .create_collision(true);

        let mut doc = UrdfDocument::parse_str(ARM).unwrap();
        doc.split_mesh_paths(&split);
        let once = doc.to_xml_string().unwrap();

        let report = doc.split_mesh_paths(&split);
        assert_eq!(report.visuals_rewritten, 0);
        assert_eq!(report.collisions_rewritten, 0);
        assert_eq!(report.collisions_created, 0);
        assert_eq!(doc.to_xml_string().unwrap(), once);
    }

    #[test]
    fn test_empty_fragment_changes_nothing() {
        let mut doc = UrdfDocument::parse_str(ARM).unwrap();
        let before = doc.to_xml_string().unwrap();
        let report = doc.split_mesh_paths(&MeshPathSplit::new("", "x"));

        assert_eq!(report.visuals_rewritten, 0);
        assert_eq!(doc.to_xml_string().unwrap(), before);
    }
}
