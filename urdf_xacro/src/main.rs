use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use urdf_xacro::commands::{self, ConvertOptions, SplitMeshesOptions};
use urdf_xacro::format::FILE_PLACEHOLDER;
use urdf_xacro::inspect::OutputFormat;
use urdf_xacro::{ExternalFormatter, MacroParams, MeshPathSplit, Updater, XacroError};

#[derive(Parser)]
#[command(name = "urdf-xacro")]
#[command(about = "Turn URDF robot descriptions into prefixed xacro macros")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply overrides and wrap a URDF in a xacro macro
    Convert {
        /// Input URDF file
        #[arg(short = 'i', long = "input")]
        input: PathBuf,
        /// Output file (defaults to the input with a .xacro extension)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
        /// Override configuration (.yaml, .yml, .json or .toml)
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
        /// Macro parameter used as the name prefix
        #[arg(short = 'p', long = "prefix", default_value = urdf_xacro::xacro::DEFAULT_PREFIX_PARAM)]
        prefix: String,
        /// Additional macro parameters to declare
        #[arg(long = "params", num_args = 1..)]
        params: Vec<String>,
        /// Updaters to run from the configuration
        #[arg(short = 'm', long = "modify", value_enum, num_args = 1..)]
        updaters: Vec<Updater>,
        /// Write a JSON report of what each step changed
        #[arg(long = "report")]
        report: Option<PathBuf>,
        #[command(flatten)]
        meshes: MeshArgs,
        #[command(flatten)]
        format: FormatArgs,
    },

    /// Rewrite visual and collision mesh paths independently
    SplitMeshes {
        /// Input URDF or xacro file
        #[arg(short = 'i', long = "input")]
        input: PathBuf,
        /// Output file (defaults to overwriting the input)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
        #[command(flatten)]
        meshes: MeshArgs,
        #[command(flatten)]
        format: FormatArgs,
    },

    /// Print robot name, scope, joints, links and mesh references
    Inspect {
        /// Input URDF or xacro file
        #[arg(short = 'i', long = "input")]
        input: PathBuf,
        #[arg(long = "output-format", value_enum, default_value_t = OutputFormat::Text)]
        output_format: OutputFormat,
    },
}

#[derive(Args)]
struct MeshArgs {
    /// Path fragment to replace in visual mesh filenames
    #[arg(long = "old-visual")]
    old_visual: Option<String>,
    /// Replacement for --old-visual
    #[arg(long = "new-visual", requires = "old_visual")]
    new_visual: Option<String>,
    /// Path fragment to replace in collision mesh filenames (defaults to --old-visual)
    #[arg(long = "old-collision")]
    old_collision: Option<String>,
    /// Replacement for --old-collision (defaults to --new-visual)
    #[arg(long = "new-collision")]
    new_collision: Option<String>,
    /// Clone visuals into links that have no collision element
    #[arg(long = "create-collision")]
    create_collision: bool,
}

impl MeshArgs {
    fn split(&self) -> Option<MeshPathSplit> {
        let old_visual = self.old_visual.clone()?;
        let new_visual = self.new_visual.clone()?;
        let old_collision = self.old_collision.clone().unwrap_or_else(|| old_visual.clone());
        let new_collision = self.new_collision.clone().unwrap_or_else(|| new_visual.clone());
        Some(
            MeshPathSplit::new(old_visual, new_visual)
                .with_collision(old_collision, new_collision)
                .create_collision(self.create_collision),
        )
    }
}

#[derive(Args)]
struct FormatArgs {
    /// Pretty-print the output with an external formatter (xmllint by default)
    #[arg(long = "format")]
    format: bool,
    /// Formatter program; implies --format
    #[arg(long = "formatter")]
    formatter: Option<String>,
    /// Formatter argument, repeatable; {file} expands to the output path
    #[arg(long = "formatter-arg", requires = "formatter", allow_hyphen_values = true)]
    formatter_args: Vec<String>,
}

impl FormatArgs {
    fn formatter(&self) -> Option<ExternalFormatter> {
        match &self.formatter {
            Some(program) if self.formatter_args.is_empty() => {
                Some(ExternalFormatter::new(program.as_str(), [FILE_PLACEHOLDER]))
            }
            Some(program) => Some(ExternalFormatter::new(
                program.as_str(),
                self.formatter_args.iter().map(String::as_str),
            )),
            None if self.format => Some(ExternalFormatter::default()),
            None => None,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run_command(cli.command, cli.verbose) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        if let Some(err) = e.downcast_ref::<XacroError>() {
            if let Some(hint) = err.hint() {
                eprintln!("{} {}", "Hint:".yellow().bold(), hint);
            }
            if err.is_pre_mutation() {
                eprintln!("{}", "No files were written".dimmed());
            }
        }
        std::process::exit(1);
    }
}

fn run_command(command: Commands, verbose: bool) -> anyhow::Result<()> {
    match command {
        Commands::Convert {
            input,
            output,
            config,
            prefix,
            params,
            updaters,
            report,
            meshes,
            format,
        } => {
            let options = ConvertOptions {
                output,
                config,
                updaters,
                macro_params: MacroParams::new(prefix).with_extra(params),
                mesh_split: meshes.split(),
                formatter: format.formatter(),
                report,
                ..ConvertOptions::new(input)
            };
            commands::run_convert(&options)?;
            Ok(())
        }
        Commands::SplitMeshes {
            input,
            output,
            meshes,
            format,
        } => {
            let split = meshes.split().ok_or_else(|| {
                anyhow::anyhow!("split-meshes needs both --old-visual and --new-visual")
            })?;
            let options = SplitMeshesOptions {
                input,
                output,
                split,
                formatter: format.formatter(),
            };
            commands::run_split_meshes(&options)?;
            Ok(())
        }
        Commands::Inspect {
            input,
            output_format,
        } => commands::run_inspect(&input, output_format, verbose),
    }
}
