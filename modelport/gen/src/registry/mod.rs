//! Template registry: which template renders which artifact of which stack.
//!
//! A [`TemplateRegistry`] is built once at startup from a set of
//! [`TargetStackDescriptor`]s and the template bodies they reference. Every
//! body is parsed while the registry is built, so malformed templates fail
//! fast. After construction the registry is read-only and can be shared
//! across threads.
//!
//! ## Lookup
//!
//! ```
//! use modelport_gen::registry::{ArtifactKind, StackId, TemplateRegistry};
//!
//! let registry = TemplateRegistry::builtin().unwrap();
//! let model = registry.lookup(StackId::Ember, ArtifactKind::ModelBase).unwrap();
//! assert_eq!(model.template.name(), "ember/model_base.js");
//!
//! // The resource-service stack has no store artifact.
//! assert!(registry.lookup(StackId::AngularResource, ArtifactKind::Store).is_err());
//! ```

mod stacks;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::{debug, info};

use crate::errors::GeneratorError;
use crate::naming::{self, EndpointStyle, extract_placeholders, substitute_placeholders};
use crate::render::{Renderer, TypeStyle};

pub use stacks::{builtin_stacks, builtin_templates};

/// Supported frontend stacks.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
pub enum StackId {
    /// ember-data models with editable stubs, unit tests and an index
    #[strum(to_string = "ember")]
    #[serde(rename = "ember")]
    Ember,
    /// ember-data AMD module served on the fly
    #[strum(to_string = "ember-dynamic")]
    #[serde(rename = "ember-dynamic")]
    EmberDynamic,
    /// MobX observable models backed by axios stores
    #[strum(to_string = "mobx-axios")]
    #[serde(rename = "mobx-axios")]
    MobxAxios,
    /// Vuex ORM models with the axios plugin
    #[strum(to_string = "vuexorm-axios")]
    #[serde(rename = "vuexorm-axios")]
    VuexOrmAxios,
    /// Angular 2+ typed models and HTTP services
    #[strum(to_string = "angular2")]
    #[serde(rename = "angular2")]
    Angular2,
    /// AngularJS `$resource` services
    #[strum(to_string = "angular")]
    #[serde(rename = "angular")]
    AngularResource,
}

/// Categories of generated files.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ArtifactKind {
    /// Model class regenerated on every run
    ModelBase,
    /// Editable model class extending the base
    Model,
    /// Data-access service
    Service,
    /// Observable store
    Store,
    /// Unit test skeleton
    Test,
    /// Registration index aggregating several models
    Index,
    /// Shared model superclass
    BaseModel,
    /// Shared store superclass
    BaseStore,
    /// HTTP client configuration
    Http,
}

/// How often an artifact is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ArtifactScope {
    /// Once per model schema.
    Model,
    /// Once per application; `items` holds the application's models.
    Application,
    /// Once per run; `items` holds every model.
    Run,
}

impl ArtifactScope {
    fn placeholders(self) -> &'static [&'static str] {
        match self {
            ArtifactScope::Model => &[
                "app",
                "model",
                "app_title",
                "model_title",
                "app_dash",
                "model_dash",
            ],
            ArtifactScope::Application => &["app", "app_title", "app_dash"],
            ArtifactScope::Run => &[],
        }
    }
}

/// What the writer does when the destination already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WritePolicy {
    /// Always rewritten.
    Regenerate,
    /// Written only when missing, so hand edits survive.
    Scaffold,
    /// Written only together with a newly created scaffold of the same model.
    Companion,
}

/// Name of a registered template body (e.g. `ember/model_base.js`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateRef(String);

impl TemplateRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Values substituted into a [`PathRule`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathVars {
    values: Vec<(&'static str, String)>,
}

impl PathVars {
    /// Variables for a single model.
    pub fn for_model(application_name: &str, model_name: &str) -> Result<Self, GeneratorError> {
        let mut vars = Self::for_application(application_name)?;
        vars.values.extend([
            ("model", model_name.to_string()),
            ("model_title", naming::title_case(model_name)?),
            ("model_dash", naming::dasherize(model_name)?),
        ]);
        Ok(vars)
    }

    /// Variables for an application aggregate.
    pub fn for_application(application_name: &str) -> Result<Self, GeneratorError> {
        naming::validate_identifier(application_name)?;
        Ok(Self {
            values: vec![
                ("app", application_name.to_string()),
                ("app_title", naming::title_case(application_name)?),
                ("app_dash", naming::dasherize(application_name)?),
            ],
        })
    }

    /// No variables (per-run artifacts).
    pub fn empty() -> Self {
        Self::default()
    }

    fn as_pairs(&self) -> Vec<(&str, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }
}

/// Relative output path pattern such as `app/models/{app_dash}/{model_dash}.js`.
///
/// Placeholders are checked against the artifact scope when the rule is
/// created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRule {
    pattern: String,
}

impl PathRule {
    /// Creates a rule, rejecting placeholders unavailable in `scope`.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::InvalidPathRule` for an empty pattern, an
    /// absolute pattern, or an unknown placeholder.
    pub fn new(pattern: impl Into<String>, scope: ArtifactScope) -> Result<Self, GeneratorError> {
        let pattern = pattern.into();
        if pattern.trim().is_empty() {
            return Err(GeneratorError::InvalidPathRule {
                rule: pattern,
                reason: "pattern is empty".to_string(),
            });
        }
        if pattern.starts_with('/') {
            return Err(GeneratorError::InvalidPathRule {
                rule: pattern,
                reason: "output paths must be relative".to_string(),
            });
        }
        let allowed = scope.placeholders();
        if let Some(unknown) = extract_placeholders(&pattern)
            .into_iter()
            .find(|name| !allowed.contains(name))
        {
            let reason = format!("placeholder '{{{unknown}}}' is not available for {scope} scope");
            return Err(GeneratorError::InvalidPathRule {
                rule: pattern,
                reason,
            });
        }
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Substitutes the variables into the pattern.
    pub fn resolve(&self, vars: &PathVars) -> String {
        substitute_placeholders(&self.pattern, &vars.as_pairs())
    }
}

/// One `(stack, artifact kind)` registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub kind: ArtifactKind,
    pub scope: ArtifactScope,
    pub policy: WritePolicy,
    pub template: TemplateRef,
    pub path: PathRule,
    /// Import path of each aggregated model, relative to the aggregate.
    pub item_import: Option<PathRule>,
}

impl Registration {
    /// Per-model artifact.
    pub fn per_model(
        kind: ArtifactKind,
        template: &str,
        path: &str,
        policy: WritePolicy,
    ) -> Result<Self, GeneratorError> {
        Ok(Self {
            kind,
            scope: ArtifactScope::Model,
            policy,
            template: TemplateRef::new(template),
            path: PathRule::new(path, ArtifactScope::Model)?,
            item_import: None,
        })
    }

    /// Aggregate over all models of `scope`; `item_import` is resolved per model.
    pub fn aggregate(
        kind: ArtifactKind,
        scope: ArtifactScope,
        template: &str,
        path: &str,
        item_import: &str,
    ) -> Result<Self, GeneratorError> {
        Ok(Self {
            kind,
            scope,
            policy: WritePolicy::Regenerate,
            template: TemplateRef::new(template),
            path: PathRule::new(path, scope)?,
            item_import: Some(PathRule::new(item_import, ArtifactScope::Model)?),
        })
    }

    /// Runtime support file rendered once per run.
    pub fn support(kind: ArtifactKind, template: &str, path: &str) -> Result<Self, GeneratorError> {
        Ok(Self {
            kind,
            scope: ArtifactScope::Run,
            policy: WritePolicy::Regenerate,
            template: TemplateRef::new(template),
            path: PathRule::new(path, ArtifactScope::Run)?,
            item_import: None,
        })
    }
}

/// Static description of one target stack.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetStackDescriptor {
    pub id: StackId,
    pub description: &'static str,
    /// How semantic field types are spelled in this stack.
    pub type_style: TypeStyle,
    /// Default URL conventions; configuration may override them.
    pub endpoint_style: EndpointStyle,
    /// Registrations in generation order.
    pub artifacts: Vec<Registration>,
}

impl TargetStackDescriptor {
    pub fn supports(&self, kind: ArtifactKind) -> bool {
        self.artifacts.iter().any(|a| a.kind == kind)
    }
}

/// Read-only map from `(stack, artifact kind)` to template and path rule.
#[derive(Debug)]
pub struct TemplateRegistry {
    stacks: BTreeMap<StackId, TargetStackDescriptor>,
    index: HashMap<(StackId, ArtifactKind), usize>,
    renderer: Renderer,
}

impl TemplateRegistry {
    /// Registry with the built-in stacks and templates.
    pub fn builtin() -> Result<Self, GeneratorError> {
        Self::builder().builtin()?.build()
    }

    /// Built-in registry whose template bodies may be replaced by files in
    /// `dir` (`<dir>/<template name>.hbs`, e.g. `ember/model_base.js.hbs`).
    pub fn with_template_dir(dir: &Path) -> Result<Self, GeneratorError> {
        Self::builder().builtin()?.template_dir(dir)?.build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Resolves the registration for `(stack, kind)`.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::UnknownTarget` when the pair is not registered.
    pub fn lookup(
        &self,
        stack: StackId,
        kind: ArtifactKind,
    ) -> Result<&Registration, GeneratorError> {
        self.index
            .get(&(stack, kind))
            .and_then(|idx| {
                self.stacks
                    .get(&stack)
                    .and_then(|descriptor| descriptor.artifacts.get(*idx))
            })
            .ok_or_else(|| GeneratorError::unknown_target(stack, kind))
    }

    pub fn descriptor(&self, stack: StackId) -> Option<&TargetStackDescriptor> {
        self.stacks.get(&stack)
    }

    /// Registered stacks in identifier order.
    pub fn stacks(&self) -> impl Iterator<Item = &TargetStackDescriptor> {
        self.stacks.values()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }
}

/// Collects descriptors and template bodies before validation.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    stacks: Vec<TargetStackDescriptor>,
    templates: BTreeMap<String, String>,
}

impl RegistryBuilder {
    /// Adds every built-in stack and template.
    pub fn builtin(mut self) -> Result<Self, GeneratorError> {
        self.stacks.extend(builtin_stacks()?);
        for (name, body) in builtin_templates() {
            self.templates.insert(name.to_string(), body.to_string());
        }
        Ok(self)
    }

    pub fn stack(mut self, descriptor: TargetStackDescriptor) -> Self {
        self.stacks.push(descriptor);
        self
    }

    /// Adds or replaces a template body.
    pub fn template(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.templates.insert(name.into(), body.into());
        self
    }

    /// Replaces known template bodies with `<dir>/<name>.hbs` where present.
    pub fn template_dir(mut self, dir: &Path) -> Result<Self, GeneratorError> {
        if !dir.is_dir() {
            return Err(GeneratorError::ConfigError(format!(
                "template directory '{}' does not exist",
                dir.display()
            )));
        }

        let names: Vec<String> = self.templates.keys().cloned().collect();
        for name in names {
            let candidate = dir.join(format!("{name}.hbs"));
            if candidate.is_file() {
                let body = fs::read_to_string(&candidate).map_err(|e| GeneratorError::ReadError {
                    path: candidate.display().to_string(),
                    source: e,
                })?;
                debug!(template = %name, path = %candidate.display(), "using template override");
                self.templates.insert(name, body);
            }
        }
        Ok(self)
    }

    /// Validates registrations and parses every referenced template.
    ///
    /// ## Errors
    ///
    /// - `DuplicateRegistration` when a stack is registered twice or lists
    ///   an artifact kind twice
    /// - `TemplateSyntaxError` when a referenced template has no body or
    ///   fails to parse
    pub fn build(self) -> Result<TemplateRegistry, GeneratorError> {
        let mut stacks = BTreeMap::new();
        let mut index = HashMap::new();
        let mut renderer = Renderer::new();

        for descriptor in self.stacks {
            for (idx, registration) in descriptor.artifacts.iter().enumerate() {
                if index.insert((descriptor.id, registration.kind), idx).is_some() {
                    return Err(GeneratorError::DuplicateRegistration {
                        stack: descriptor.id.to_string(),
                        artifact: registration.kind.to_string(),
                    });
                }

                let name = registration.template.name();
                if renderer.has_template(name) {
                    continue;
                }
                let body = self.templates.get(name).ok_or_else(|| {
                    GeneratorError::TemplateSyntaxError {
                        template: name.to_string(),
                        message: "no template body is defined".to_string(),
                    }
                })?;
                renderer.register(name, body)?;
            }

            let id = descriptor.id;
            if stacks.insert(id, descriptor).is_some() {
                return Err(GeneratorError::DuplicateRegistration {
                    stack: id.to_string(),
                    artifact: "*".to_string(),
                });
            }
        }

        info!(
            stacks = stacks.len(),
            registrations = index.len(),
            "template registry ready"
        );
        Ok(TemplateRegistry {
            stacks,
            index,
            renderer,
        })
    }
}
