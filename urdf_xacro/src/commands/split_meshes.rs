//! `urdf-xacro split-meshes`: point visuals and collisions at separate meshes

use super::format_output;
use crate::document::UrdfDocument;
use crate::format::ExternalFormatter;
use crate::meshes::MeshPathSplit;
use anyhow::{Context, Result};
use colored::*;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct SplitMeshesOptions {
    pub input: PathBuf,
    /// Defaults to overwriting the input
    pub output: Option<PathBuf>,
    pub split: MeshPathSplit,
    pub formatter: Option<ExternalFormatter>,
}

pub fn run_split_meshes(options: &SplitMeshesOptions) -> Result<PathBuf> {
    println!(
        "{} {}",
        "Splitting mesh paths in".cyan().bold(),
        options.input.display()
    );
    let mut doc = UrdfDocument::load(&options.input)
        .with_context(|| format!("Failed to load {}", options.input.display()))?;

    let report = doc.split_mesh_paths(&options.split);
    println!(
        "  {} visual and {} collision mesh paths rewritten, {} collisions created",
        report.visuals_rewritten, report.collisions_rewritten, report.collisions_created
    );
    if !report.links_without_geometry.is_empty() {
        println!(
            "  {} links without geometry: {}",
            "⚠".yellow(),
            report.links_without_geometry.join(", ")
        );
    }

    let output = options.output.clone().unwrap_or_else(|| options.input.clone());
    doc.save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "{} Output file saved to {}",
        "✓".green(),
        output.display().to_string().green()
    );

    if let Some(formatter) = &options.formatter {
        format_output(formatter, &output)?;
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_overwrites_input_by_default() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("arm.urdf");
        fs::write(
            &input,
            r#"<robot name="arm"><link name="base_link"><visual><geometry><mesh filename="package://arm/meshes/base.STL"/></geometry></visual></link></robot>"#,
        )
        .unwrap();

        let options = SplitMeshesOptions {
            input: input.clone(),
            output: None,
            split: MeshPathSplit::new("arm/meshes", "arm/meshes/visual")
                .with_collision("arm/meshes", "arm/meshes/collision")
                .create_collision(true),
            formatter: None,
        };
        let written = run_split_meshes(&options).unwrap();
        assert_eq!(written, input);

        let content = fs::read_to_string(&input).unwrap();
        assert!(content.contains("package://arm/meshes/visual/base.STL"));
        assert!(content.contains("package://arm/meshes/collision/base.STL"));
    }
}
