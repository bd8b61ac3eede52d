//! CLI command implementations

pub mod convert;
pub mod inspect;
pub mod split_meshes;

pub use convert::{run_convert, ConvertOptions};
pub use inspect::run_inspect;
pub use split_meshes::{run_split_meshes, SplitMeshesOptions};

use crate::format::ExternalFormatter;
use colored::*;
use std::path::Path;

/// Run the formatter over a file that has already been written
fn format_output(formatter: &ExternalFormatter, path: &Path) -> anyhow::Result<()> {
    formatter.run(path)?;
    println!(
        "{} Formatted with {}",
        "✓".green(),
        formatter.program().cyan()
    );
    Ok(())
}
