//! Convert URDF robot descriptions into reusable xacro macros.
//!
//! A run loads one document, applies name-keyed joint-limit and inertial
//! overrides, optionally splits visual and collision mesh paths, wraps the
//! robot in a `<xacro:macro>` whose joint and link names carry a prefix
//! parameter, and writes the result back out.
//!
//! ```no_run
//! use urdf_xacro::{MacroParams, TransformPlan, UrdfDocument};
//!
//! let mut doc = UrdfDocument::load("arm.urdf")?;
//! TransformPlan::new()
//!     .with_wrap(MacroParams::default())
//!     .apply(&mut doc);
//! doc.save("arm.xacro")?;
//! # Ok::<(), urdf_xacro::XacroError>(())
//! ```

pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod inertial;
pub mod inspect;
pub mod joints;
pub mod meshes;
pub mod plan;
pub mod xacro;
pub mod xml;

pub use config::{TransformConfig, Updater};
pub use document::{MacroOrigin, Scope, UrdfDocument};
pub use error::{Result, XacroError};
pub use format::ExternalFormatter;
pub use inertial::{InertialReport, InertialValue, LinkInertials};
pub use joints::{JointLimit, JointLimitReport};
pub use meshes::{MeshPathSplit, MeshSplitReport};
pub use plan::{TransformPlan, TransformReport};
pub use xacro::{MacroParams, PrefixToken, WrapOutcome};
pub use xml::ElementExt;
