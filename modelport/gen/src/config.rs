//! Generator configuration (`modelport.toml`).
//!
//! ```toml
//! api_base = "https://example.com/api"
//! ember_app = "frontend"
//! output_dir = "../front"
//! pagination_container = "results"
//! target_app = "shared"
//!
//! [stacks.angular2]
//! endpoint_suffix = "-list"
//! trailing_slash = true
//!
//! [stacks.ember]
//! relationship_imports = false
//! type_mapping = { money = "number" }
//! ```
//!
//! Every key is optional. Values resolve as built-in defaults, then the
//! config file, then command line flags.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::GeneratorError;
use crate::naming::{self, EndpointStyle};
use crate::registry::{StackId, TargetStackDescriptor};
use crate::render::TypeMapper;

/// Default file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "modelport.toml";

/// Settings shared by every stack of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// API root used to build resource URLs.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Module namespace of the ember application.
    #[serde(default = "default_ember_app")]
    pub ember_app: String,

    /// Root of the frontend project that receives the artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory with `<stack>/<template>.hbs` overrides.
    #[serde(default)]
    pub template_dir: Option<PathBuf>,

    /// Fallback for schemas that declare no pagination container.
    #[serde(default)]
    pub pagination_container: Option<String>,

    /// Points every relationship at this application instead of the one
    /// declared in the schema.
    #[serde(default)]
    pub target_app: Option<String>,

    /// Per-stack settings keyed by stack id.
    #[serde(default)]
    pub stacks: BTreeMap<String, StackConfig>,
}

fn default_api_base() -> String {
    "/api".to_string()
}

fn default_ember_app() -> String {
    "djember".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("../front")
}

fn default_true() -> bool {
    true
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            ember_app: default_ember_app(),
            output_dir: default_output_dir(),
            template_dir: None,
            pagination_container: None,
            target_app: None,
            stacks: BTreeMap::new(),
        }
    }
}

/// Settings for one stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StackConfig {
    /// Emit relationship dependencies in generated tests and imports.
    #[serde(default = "default_true")]
    pub relationship_imports: bool,

    /// Appended to every endpoint URL (e.g. `-list`).
    #[serde(default)]
    pub endpoint_suffix: Option<String>,

    /// Overrides the stack's trailing slash convention.
    #[serde(default)]
    pub trailing_slash: Option<bool>,

    /// Field type tag to target type name; an empty name leaves the field untyped.
    #[serde(default)]
    pub type_mapping: BTreeMap<String, String>,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            relationship_imports: true,
            endpoint_suffix: None,
            trailing_slash: None,
            type_mapping: BTreeMap::new(),
        }
    }
}

impl GeneratorConfig {
    /// Loads and validates a config file.
    ///
    /// ## Errors
    ///
    /// Returns `ReadError` when the file cannot be read and `ConfigError`
    /// when it is not valid TOML or fails validation.
    pub fn load_from(path: &Path) -> Result<Self, GeneratorError> {
        let content = fs::read_to_string(path).map_err(|e| GeneratorError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            GeneratorError::ConfigError(msg) => {
                GeneratorError::ConfigError(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Loads `modelport.toml` from `dir`, falling back to defaults when absent.
    pub fn discover(dir: &Path) -> Result<Self, GeneratorError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, GeneratorError> {
        let config: Self =
            toml::from_str(content).map_err(|e| GeneratorError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks stack keys and identifiers.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        naming::validate_identifier(&self.ember_app)
            .map_err(|e| GeneratorError::ConfigError(format!("ember_app: {e}")))?;

        if let Some(container) = &self.pagination_container {
            naming::validate_identifier(container)
                .map_err(|e| GeneratorError::ConfigError(format!("pagination_container: {e}")))?;
        }

        if let Some(app) = &self.target_app {
            naming::validate_identifier(app)
                .map_err(|e| GeneratorError::ConfigError(format!("target_app: {e}")))?;
        }

        for key in self.stacks.keys() {
            key.parse::<StackId>().map_err(|_| {
                GeneratorError::ConfigError(format!("[stacks.{key}] names an unknown stack"))
            })?;
        }
        Ok(())
    }

    /// Settings for `stack`, or the defaults when none are configured.
    pub fn stack(&self, stack: StackId) -> StackConfig {
        self.stacks
            .get(&stack.to_string())
            .cloned()
            .unwrap_or_default()
    }

    /// The descriptor's endpoint style with configured overrides applied.
    pub fn endpoint_style(&self, descriptor: &TargetStackDescriptor) -> EndpointStyle {
        let settings = self.stack(descriptor.id);
        let mut style = descriptor.endpoint_style.clone();
        if settings.endpoint_suffix.is_some() {
            style.suffix = settings.endpoint_suffix;
        }
        if let Some(trailing_slash) = settings.trailing_slash {
            style.trailing_slash = trailing_slash;
        }
        style
    }

    /// Type mapper of the descriptor's style plus configured overrides.
    pub fn type_mapper(&self, descriptor: &TargetStackDescriptor) -> TypeMapper {
        TypeMapper::new(descriptor.type_style)
            .with_overrides(&self.stack(descriptor.id).type_mapping)
    }
}
