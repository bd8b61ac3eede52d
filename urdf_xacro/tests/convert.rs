//! End-to-end runs of the convert and split-meshes commands

use approx::assert_relative_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use urdf_xacro::commands::{run_convert, run_split_meshes, ConvertOptions, SplitMeshesOptions};
use urdf_xacro::{ElementExt, MacroOrigin, MeshPathSplit, Scope, UrdfDocument, Updater};

const ARM_URDF: &str = r#"<?xml version="1.0"?>
<robot name="arm">
  <!-- generated by an exporter -->
  <material name="grey"><color rgba="0.5 0.5 0.5 1"/></material>
  <link name="base_link">
    <inertial>
      <origin xyz="0 0 0.05" rpy="0 0 0"/>
      <mass value="2.0"/>
      <inertia ixx="0.01" ixy="0" ixz="0" iyy="0.01" iyz="0" izz="0.01"/>
    </inertial>
    <visual>
      <geometry><mesh filename="package://arm_description/meshes/base_link.STL"/></geometry>
    </visual>
    <collision>
      <geometry><mesh filename="package://arm_description/meshes/base_link.STL"/></geometry>
    </collision>
  </link>
  <link name="link1">
    <inertial>
      <mass value="1.0"/>
      <inertia ixx="0.01" ixy="0" ixz="0" iyy="0.03" iyz="0" izz="0.04"/>
    </inertial>
    <visual>
      <origin xyz="0 0 0.1" rpy="0 0 0"/>
      <geometry><mesh filename="package://arm_description/meshes/link1.STL"/></geometry>
    </visual>
  </link>
  <link name="link2">
    <visual>
      <geometry><mesh filename="package://arm_description/meshes/link2.STL"/></geometry>
    </visual>
  </link>
  <joint name="joint1" type="revolute">
    <parent link="base_link"/>
    <child link="link1"/>
    <axis xyz="0 0 1"/>
    <limit lower="-1" upper="1" effort="10" velocity="1"/>
  </joint>
  <joint name="joint2" type="revolute">
    <parent link="link1"/>
    <child link="link2"/>
    <axis xyz="0 0 1"/>
    <limit lower="-3" upper="3" effort="5" velocity="2"/>
  </joint>
</robot>
"#;

const CONFIG_YAML: &str = r#"
joints_limit:
  joint1: { lower: -2 }
  joint2: { lower: null, upper: null }
links_inertial:
  base_link: null
  link1:
    inertia: { ixx: 0.02 }
"#;

fn write_arm(dir: &Path) -> PathBuf {
    let input = dir.join("arm.urdf");
    fs::write(&input, ARM_URDF).unwrap();
    input
}

fn joint<'a>(robot: &'a urdf_rs::Robot, name: &str) -> &'a urdf_rs::Joint {
    robot.joints.iter().find(|j| j.name == name).unwrap()
}

fn link<'a>(robot: &'a urdf_rs::Robot, name: &str) -> &'a urdf_rs::Link {
    robot.links.iter().find(|l| l.name == name).unwrap()
}

fn mesh_filename(geometry: &urdf_rs::Geometry) -> &str {
    match geometry {
        urdf_rs::Geometry::Mesh { filename, .. } => filename,
        other => panic!("expected a mesh, got {:?}", other),
    }
}

#[test]
fn test_convert_wraps_and_defaults_output_path() {
    let dir = TempDir::new().unwrap();
    let input = write_arm(dir.path());

    let written = run_convert(&ConvertOptions::new(&input)).unwrap();
    assert_eq!(written, dir.path().join("arm.xacro"));

    let content = fs::read_to_string(&written).unwrap();
    assert!(content.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(content.contains("xmlns:xacro=\"http://www.ros.org/wiki/xacro\""));
    assert!(content.contains("<xacro:macro name=\"arm\" params=\"prefix\">"));
    assert!(content.contains("<joint name=\"${prefix}joint1\""));
    assert!(content.contains("<parent link=\"${prefix}base_link\"/>"));
    assert!(content.contains("generated by an exporter"));

    let doc = UrdfDocument::load(&written).unwrap();
    assert!(matches!(
        doc.scope(),
        Scope::Macro {
            origin: MacroOrigin::Loaded,
            ..
        }
    ));
    assert_eq!(doc.links().count(), 3);
    assert_eq!(doc.joints().count(), 2);
}

#[test]
fn test_convert_twice_is_stable() {
    let dir = TempDir::new().unwrap();
    let input = write_arm(dir.path());

    let first = run_convert(&ConvertOptions::new(&input)).unwrap();
    let once = fs::read_to_string(&first).unwrap();

    let mut again = ConvertOptions::new(&first);
    again.output = Some(dir.path().join("again.xacro"));
    let second = run_convert(&again).unwrap();

    assert_eq!(fs::read_to_string(second).unwrap(), once);
}

#[test]
fn test_overrides_produce_valid_urdf() {
    let dir = TempDir::new().unwrap();
    let input = write_arm(dir.path());
    let config = dir.path().join("urdf_config.yaml");
    fs::write(&config, CONFIG_YAML).unwrap();

    // no wrap step, so urdf-rs can read the result
    let mut doc = UrdfDocument::load(&input).unwrap();
    let loaded = urdf_xacro::TransformConfig::load(&config).unwrap();
    loaded.plan(&[Updater::All]).apply(&mut doc);
    let robot = urdf_rs::read_from_string(&doc.to_xml_string().unwrap()).unwrap();

    let joint1 = joint(&robot, "joint1");
    assert_relative_eq!(joint1.limit.lower, -2.0);
    assert_relative_eq!(joint1.limit.upper, 1.0);
    assert_relative_eq!(joint1.limit.effort, 10.0);

    let joint2 = joint(&robot, "joint2");
    assert!(matches!(joint2.joint_type, urdf_rs::JointType::Continuous));

    let link1 = link(&robot, "link1");
    assert_relative_eq!(link1.inertial.inertia.ixx, 0.02);
    assert_relative_eq!(link1.inertial.inertia.iyy, 0.03);
    assert_relative_eq!(link1.inertial.inertia.izz, 0.04);
    assert_relative_eq!(link(&robot, "base_link").inertial.mass.value, 2.0);
}

#[test]
fn test_convert_with_config_and_mesh_split() {
    let dir = TempDir::new().unwrap();
    let input = write_arm(dir.path());
    let config = dir.path().join("urdf_config.yaml");
    fs::write(&config, CONFIG_YAML).unwrap();

    let mut options = ConvertOptions::new(&input);
    options.config = Some(config);
    options.updaters = vec![Updater::All];
    options.mesh_split = Some(
        MeshPathSplit::new(
            "package://arm_description/meshes",
            "package://arm_description/meshes/visual",
        )
        .with_collision(
            "package://arm_description/meshes",
            "package://arm_description/meshes/collision",
        )
        .create_collision(true),
    );
    let written = run_convert(&options).unwrap();

    let doc = UrdfDocument::load(&written).unwrap();
    let joint1 = doc
        .joints()
        .find(|j| j.attribute("name") == Some("${prefix}joint1"))
        .unwrap();
    assert_eq!(joint1.get_child("limit").unwrap().attribute("lower"), Some("-2"));
    assert_eq!(joint1.get_child("limit").unwrap().attribute("upper"), Some("1"));

    let joint2 = doc
        .joints()
        .find(|j| j.attribute("name") == Some("${prefix}joint2"))
        .unwrap();
    assert_eq!(joint2.attribute("type"), Some("continuous"));
    assert!(joint2.get_child("limit").is_none());

    let summary = doc.summary();
    let link2_meshes: Vec<_> = summary
        .mesh_references
        .iter()
        .filter(|m| m.link == "${prefix}link2")
        .map(|m| (m.kind.as_str(), m.filename.as_str()))
        .collect();
    assert_eq!(
        link2_meshes,
        vec![
            ("visual", "package://arm_description/meshes/visual/link2.STL"),
            ("collision", "package://arm_description/meshes/collision/link2.STL"),
        ]
    );
}

#[test]
fn test_inertial_sidecar_next_to_config() {
    let dir = TempDir::new().unwrap();
    let input = write_arm(dir.path());
    let config = dir.path().join("urdf_config.json");
    fs::write(&config, r#"{"joints_limit": {}}"#).unwrap();
    fs::write(
        dir.path().join("links_inertial.json"),
        r#"{"link2": {"inertia": {"ixx": 0.1, "ixy": 0, "ixz": 0, "iyy": 0.2, "iyz": 0, "izz": 0.3}}}"#,
    )
    .unwrap();

    let mut doc = UrdfDocument::load(&input).unwrap();
    urdf_xacro::TransformConfig::load(&config)
        .unwrap()
        .plan(&[Updater::LinksInertial])
        .apply(&mut doc);
    let robot = urdf_rs::read_from_string(&doc.to_xml_string().unwrap()).unwrap();

    let link2 = link(&robot, "link2");
    assert_relative_eq!(link2.inertial.inertia.ixx, 0.1);
    assert_relative_eq!(link2.inertial.inertia.izz, 0.3);
    // link2 had no <inertial>; the created one carries a zero mass
    assert_relative_eq!(link2.inertial.mass.value, 0.0);
}

#[test]
fn test_split_meshes_on_flat_document() {
    let dir = TempDir::new().unwrap();
    let input = write_arm(dir.path());
    let output = dir.path().join("arm_split.urdf");

    let options = SplitMeshesOptions {
        input: input.clone(),
        output: Some(output.clone()),
        split: MeshPathSplit::new("meshes/", "meshes/visual/")
            .with_collision("meshes/", "meshes/collision/")
            .create_collision(true),
        formatter: None,
    };
    run_split_meshes(&options).unwrap();

    // input untouched when an output is given
    assert_eq!(fs::read_to_string(&input).unwrap(), ARM_URDF);

    let robot = urdf_rs::read_file(&output).unwrap();
    let link1 = link(&robot, "link1");
    assert_eq!(link1.collision.len(), 1);
    assert_eq!(
        mesh_filename(&link1.collision[0].geometry),
        "package://arm_description/meshes/collision/link1.STL"
    );
    assert_eq!(
        mesh_filename(&link1.visual[0].geometry),
        "package://arm_description/meshes/visual/link1.STL"
    );
}

#[cfg(unix)]
#[test]
fn test_formatter_failure_keeps_written_file() {
    let dir = TempDir::new().unwrap();
    let input = write_arm(dir.path());

    let mut options = ConvertOptions::new(&input);
    options.formatter = Some(urdf_xacro::ExternalFormatter::new("false", Vec::<String>::new()));

    let err = run_convert(&options).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<urdf_xacro::XacroError>(),
        Some(urdf_xacro::XacroError::FormatterFailed { .. })
    ));
    assert!(dir.path().join("arm.xacro").exists());
}
