//! `urdf-xacro convert`: apply overrides and wrap a URDF as a xacro macro

use super::format_output;
use crate::config::{ConvertSettings, Updater};
use crate::document::UrdfDocument;
use crate::format::ExternalFormatter;
use crate::meshes::MeshPathSplit;
use crate::plan::TransformReport;
use crate::xacro::{MacroParams, WrapOutcome};
use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub input: PathBuf,
    /// Defaults to the input with a `.xacro` extension
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub updaters: Vec<Updater>,
    pub macro_params: MacroParams,
    pub mesh_split: Option<MeshPathSplit>,
    /// Run this formatter over the written file
    pub formatter: Option<ExternalFormatter>,
    /// Also write the per-step report as JSON
    pub report: Option<PathBuf>,
}

impl ConvertOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            config: None,
            updaters: Vec::new(),
            macro_params: MacroParams::default(),
            mesh_split: None,
            formatter: None,
            report: None,
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output(&self.input))
    }
}

/// `robot.urdf` becomes `robot.xacro` next to it
pub fn default_output(input: &Path) -> PathBuf {
    input.with_extension("xacro")
}

/// Run the convert command. Returns the path written.
pub fn run_convert(options: &ConvertOptions) -> Result<PathBuf> {
    let settings = ConvertSettings {
        config: options.config.clone(),
        updaters: options.updaters.clone(),
        mesh_split: options.mesh_split.clone(),
        macro_params: options.macro_params.clone(),
    };
    let plan = settings
        .resolve()
        .context("Failed to prepare the conversion")?;

    println!(
        "{} {}",
        "Converting".cyan().bold(),
        options.input.display()
    );
    let mut doc = UrdfDocument::load(&options.input)
        .with_context(|| format!("Failed to load {}", options.input.display()))?;

    let report = plan.apply(&mut doc);
    print_report(&report);

    let output = options.output_path();
    doc.save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "{} Output file saved to {}",
        "✓".green(),
        output.display().to_string().green()
    );

    if let Some(path) = &options.report {
        write_report(&report, path)?;
    }

    if let Some(formatter) = &options.formatter {
        format_output(formatter, &output)?;
    }

    Ok(output)
}

fn write_report(report: &TransformReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize the report")?;
    fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    println!("{} Report saved to {}", "✓".green(), path.display());
    Ok(())
}

fn print_report(report: &TransformReport) {
    if let Some(joints) = &report.joints {
        println!(
            "  {} joints updated ({} continuous)",
            joints.updated.len(),
            joints.continuous.len()
        );
    }
    if let Some(inertials) = &report.inertials {
        println!(
            "  {} link inertials updated, {} virtual links skipped",
            inertials.updated.len(),
            inertials.virtual_links.len()
        );
    }
    if let Some(meshes) = &report.meshes {
        println!(
            "  {} visual and {} collision mesh paths rewritten, {} collisions created",
            meshes.visuals_rewritten, meshes.collisions_rewritten, meshes.collisions_created
        );
    }
    match &report.wrap {
        Some(WrapOutcome::Wrapped {
            prefixed_joints,
            prefixed_links,
        }) => println!(
            "  wrapped in macro, prefixed {} joints and {} links",
            prefixed_joints, prefixed_links
        ),
        Some(WrapOutcome::AlreadyMacro) => {
            println!("  {}", "already a xacro macro, not wrapped again".yellow())
        }
        None => {}
    }

    let unmatched = report.unmatched_count();
    if unmatched > 0 {
        println!(
            "  {} {} override keys matched nothing in the document",
            "⚠".yellow(),
            unmatched
        );
    }
}
