//! `urdf-xacro inspect`: print a summary of a robot description

use crate::document::UrdfDocument;
use crate::inspect::{format_json, format_text, OutputFormat};
use anyhow::{Context, Result};
use std::path::Path;

pub fn run_inspect(input: &Path, format: OutputFormat, verbose: bool) -> Result<()> {
    let doc = UrdfDocument::load(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let summary = doc.summary();

    let rendered = match format {
        OutputFormat::Text => format_text(&summary, verbose),
        OutputFormat::Json => format_json(&summary)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}
