//! Override configuration
//!
//! A config file supplies the `joints_limit` and `links_inertial` maps:
//!
//! ```yaml
//! joints_limit:
//!   joint1: { lower: -2.7475, upper: 2.7475, effort: 12, velocity: 0.5 }
//!   joint6: { effort: 3, velocity: 1.0 }   # no bounds: continuous
//! links_inertial:
//!   world: null
//!   link1: { inertia: { ixx: 0.02, iyy: 0.01, izz: 0.01 } }
//! ```
//!
//! When `links_inertial` is missing, a `links_inertial.json` sidecar next to
//! the config file is used instead.

use crate::error::{Result, XacroError};
use crate::inertial::LinkInertials;
use crate::joints::JointLimit;
use crate::meshes::MeshPathSplit;
use crate::plan::TransformPlan;
use crate::xacro::MacroParams;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File name of the inertial sidecar produced by the inertia extractor
pub const INERTIAL_SIDECAR: &str = "links_inertial.json";

/// Updaters that take their input from the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Updater {
    #[value(name = "joints_limit")]
    JointsLimit,
    #[value(name = "links_inertial")]
    LinksInertial,
    /// Every updater above
    #[value(name = "all")]
    All,
}

impl Updater {
    /// Replace `All` with the concrete updaters and drop duplicates
    pub fn expand(requested: &[Updater]) -> Vec<Updater> {
        let mut expanded: Vec<Updater> = requested
            .iter()
            .flat_map(|u| match u {
                Updater::All => vec![Updater::JointsLimit, Updater::LinksInertial],
                other => vec![*other],
            })
            .collect();
        expanded.sort();
        expanded.dedup();
        expanded
    }

    pub fn key(&self) -> &'static str {
        match self {
            Updater::JointsLimit => "joints_limit",
            Updater::LinksInertial => "links_inertial",
            Updater::All => "all",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            Some("toml") => Ok(ConfigFormat::Toml),
            _ => Err(XacroError::UnsupportedConfigFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Override maps for the name-keyed updaters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(default)]
    pub joints_limit: Option<BTreeMap<String, JointLimit>>,
    #[serde(default)]
    pub links_inertial: Option<LinkInertials>,
}

impl TransformConfig {
    /// Load a config file, picking the parser from the extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(XacroError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        info!("Importing configuration file from {}", path.display());
        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path).map_err(|source| XacroError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed: std::result::Result<TransformConfig, String> = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str(&content).map_err(|e| e.to_string()),
        };
        let mut config = parsed.map_err(|reason| XacroError::ConfigParse {
            path: path.to_path_buf(),
            reason,
        })?;

        if config.links_inertial.is_none() {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            config.links_inertial = load_inertial_sidecar(&dir.join(INERTIAL_SIDECAR))?;
        }

        Ok(config)
    }

    /// Build a plan running the requested updaters.
    ///
    /// A requested updater whose section is missing is skipped with a
    /// warning.
    pub fn plan(&self, updaters: &[Updater]) -> TransformPlan {
        let mut plan = TransformPlan::new();
        for updater in Updater::expand(updaters) {
            match updater {
                Updater::JointsLimit => match &self.joints_limit {
                    Some(limits) => plan = plan.with_joint_limits(limits.clone()),
                    None => warn!("No joints_limit section in the configuration, skipping"),
                },
                Updater::LinksInertial => match &self.links_inertial {
                    Some(inertials) => plan = plan.with_link_inertials(inertials.clone()),
                    None => warn!("No links_inertial data found, skipping"),
                },
                Updater::All => {}
            }
        }
        plan
    }
}

/// Read the inertial sidecar; a missing file is not an error
pub fn load_inertial_sidecar(path: &Path) -> Result<Option<LinkInertials>> {
    if !path.exists() {
        warn!("No {} file found", path.display());
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|source| XacroError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let inertials = serde_json::from_str(&content).map_err(|e| XacroError::ConfigParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    info!("Loaded inertial data from {}", path.display());
    Ok(Some(inertials))
}

/// Everything `convert` needs besides the input document
#[derive(Debug, Clone, Default)]
pub struct ConvertSettings {
    pub config: Option<PathBuf>,
    pub updaters: Vec<Updater>,
    pub mesh_split: Option<MeshPathSplit>,
    pub macro_params: MacroParams,
}

impl ConvertSettings {
    /// Resolve the config file (if any) into a complete plan.
    ///
    /// Configuration errors surface here, before the document is loaded.
    pub fn resolve(&self) -> Result<TransformPlan> {
        let updaters = Updater::expand(&self.updaters);

        let plan = match (&self.config, updaters.is_empty()) {
            (Some(path), _) => TransformConfig::load(path)?.plan(&updaters),
            (None, true) => TransformPlan::new(),
            (None, false) => {
                return Err(XacroError::MissingConfig {
                    updaters: updaters.iter().map(|u| u.key().to_string()).collect(),
                })
            }
        };

        let plan = match &self.mesh_split {
            Some(split) => plan.with_mesh_split(split.clone()),
            None => plan,
        };
        Ok(plan.with_wrap(self.macro_params.clone()))
    }
}
