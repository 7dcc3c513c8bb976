//! Generation runs.
//!
//! A [`Generator`] walks the requested stacks in caller order. For each
//! stack it renders:
//!
//! 1. per-model artifacts, schema by schema, in the stack's artifact order
//! 2. per-application aggregates, in first-appearance order of applications
//! 3. per-run artifacts
//!
//! Given the same schemas, stacks and configuration the produced sequence is
//! byte-identical between runs.

use std::collections::HashSet;

use modelport_define::{ModelSchema, SchemaSet};
use serde_json::Value;
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument, warn};

use crate::config::GeneratorConfig;
use crate::errors::{GeneratorError, TargetFailure};
use crate::registry::{
    ArtifactKind, ArtifactScope, PathVars, Registration, StackId, TargetStackDescriptor,
    TemplateRegistry, WritePolicy,
};
use crate::render::{RenderContext, item_binding};

/// What happens after a `(stack, schema, artifact)` failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the run with the first failure.
    #[default]
    FailFast,
    /// Record the failure and keep going.
    BestEffort,
}

/// One rendered file, ready for the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub stack: StackId,
    pub artifact: ArtifactKind,
    pub application: Option<String>,
    pub model: Option<String>,
    /// Path relative to the frontend project root.
    pub path: String,
    pub content: String,
    pub policy: WritePolicy,
}

/// Outcome of a run.
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub outputs: Vec<RenderedArtifact>,
    /// Always empty under [`FailurePolicy::FailFast`].
    pub failures: Vec<TargetFailure>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// `(relative path, content)` pairs in generation order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outputs
            .iter()
            .map(|o| (o.path.as_str(), o.content.as_str()))
    }
}

/// Renders schema sets against a template registry.
#[derive(Debug)]
pub struct Generator {
    registry: TemplateRegistry,
    config: GeneratorConfig,
    policy: FailurePolicy,
}

impl Generator {
    pub fn new(registry: TemplateRegistry, config: GeneratorConfig) -> Self {
        Self {
            registry,
            config,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Renders every artifact of `stacks` for `schemas`.
    ///
    /// ## Errors
    ///
    /// Under [`FailurePolicy::FailFast`] the first failure is returned.
    /// Under [`FailurePolicy::BestEffort`] this never fails; failures are
    /// listed in the report next to the successful outputs.
    #[instrument(
        skip_all,
        fields(schemas = schemas.len(), stacks = stacks.len(), policy = ?self.policy)
    )]
    pub fn generate(
        &self,
        schemas: &SchemaSet,
        stacks: &[StackId],
    ) -> Result<GenerationReport, TargetFailure> {
        let mut run = Run {
            policy: self.policy,
            report: GenerationReport::default(),
            paths: HashSet::new(),
        };

        for &stack in stacks {
            let Some(descriptor) = self.registry.descriptor(stack) else {
                for kind in ArtifactKind::iter() {
                    run.record(Err(TargetFailure {
                        stack,
                        artifact: kind,
                        application: None,
                        model: None,
                        error: GeneratorError::unknown_target(stack, kind),
                    }))?;
                }
                continue;
            };
            self.generate_stack(&mut run, descriptor, schemas)?;
        }

        let report = run.report;
        info!(
            outputs = report.outputs.len(),
            failures = report.failures.len(),
            "generation finished"
        );
        Ok(report)
    }

    fn generate_stack(
        &self,
        run: &mut Run,
        descriptor: &TargetStackDescriptor,
        schemas: &SchemaSet,
    ) -> Result<(), TargetFailure> {
        let stack = descriptor.id;
        let context = self.base_context(descriptor);
        let kinds_in = |scope: ArtifactScope| {
            descriptor
                .artifacts
                .iter()
                .filter(move |a| a.scope == scope)
                .map(|a| a.kind)
        };

        for schema in schemas {
            for kind in kinds_in(ArtifactScope::Model) {
                let outcome = self
                    .registry
                    .lookup(stack, kind)
                    .and_then(|registration| {
                        self.render_model(stack, registration, schema, &context)
                    })
                    .map_err(|error| TargetFailure {
                        stack,
                        artifact: kind,
                        application: Some(schema.application_name().to_string()),
                        model: Some(schema.model_name().to_string()),
                        error,
                    });
                run.record(outcome)?;
            }
        }

        for group in schemas.applications() {
            for kind in kinds_in(ArtifactScope::Application) {
                let outcome = self
                    .registry
                    .lookup(stack, kind)
                    .and_then(|registration| {
                        let vars = PathVars::for_application(group.name)?;
                        let context = context.clone().with("application_name", group.name);
                        self.render_aggregate(stack, registration, &group.models, &vars, context)
                            .map(|mut artifact| {
                                artifact.application = Some(group.name.to_string());
                                artifact
                            })
                    })
                    .map_err(|error| TargetFailure {
                        stack,
                        artifact: kind,
                        application: Some(group.name.to_string()),
                        model: None,
                        error,
                    });
                run.record(outcome)?;
            }
        }

        let all: Vec<&ModelSchema> = schemas.iter().collect();
        for kind in kinds_in(ArtifactScope::Run) {
            let outcome = self
                .registry
                .lookup(stack, kind)
                .and_then(|registration| {
                    self.render_aggregate(
                        stack,
                        registration,
                        &all,
                        &PathVars::empty(),
                        context.clone(),
                    )
                })
                .map_err(|error| TargetFailure {
                    stack,
                    artifact: kind,
                    application: None,
                    model: None,
                    error,
                });
            run.record(outcome)?;
        }

        Ok(())
    }

    /// Context entries shared by every render of one stack.
    fn base_context(&self, descriptor: &TargetStackDescriptor) -> RenderContext {
        let settings = self.config.stack(descriptor.id);
        RenderContext::new(
            self.config.type_mapper(descriptor),
            self.config.endpoint_style(descriptor),
        )
        .with("api_base", self.config.api_base.trim_end_matches('/'))
        .with("ember_app", self.config.ember_app.as_str())
        .with("relationship_imports", settings.relationship_imports)
        .with(
            "pagination_container",
            self.config.pagination_container.clone(),
        )
        .with("target_app", self.config.target_app.clone())
    }

    fn render_model(
        &self,
        stack: StackId,
        registration: &Registration,
        schema: &ModelSchema,
        context: &RenderContext,
    ) -> Result<RenderedArtifact, GeneratorError> {
        let vars = PathVars::for_model(schema.application_name(), schema.model_name())?;
        let path = registration.path.resolve(&vars);
        let content = self
            .registry
            .renderer()
            .render(&registration.template, schema, context)?;

        debug!(%stack, artifact = %registration.kind, model = %schema.key(), %path, "rendered");
        Ok(RenderedArtifact {
            stack,
            artifact: registration.kind,
            application: Some(schema.application_name().to_string()),
            model: Some(schema.model_name().to_string()),
            path,
            content,
            policy: registration.policy,
        })
    }

    fn render_aggregate(
        &self,
        stack: StackId,
        registration: &Registration,
        models: &[&ModelSchema],
        vars: &PathVars,
        mut context: RenderContext,
    ) -> Result<RenderedArtifact, GeneratorError> {
        let items = models
            .iter()
            .map(|schema| {
                let import_path = match &registration.item_import {
                    Some(rule) => rule.resolve(&PathVars::for_model(
                        schema.application_name(),
                        schema.model_name(),
                    )?),
                    None => String::new(),
                };
                item_binding(schema, &import_path)
            })
            .collect::<Result<Vec<Value>, _>>()?;
        context.insert("items", items);

        let path = registration.path.resolve(vars);
        let content = self
            .registry
            .renderer()
            .render_aggregate(&registration.template, &context)?;

        debug!(%stack, artifact = %registration.kind, items = models.len(), %path, "rendered");
        Ok(RenderedArtifact {
            stack,
            artifact: registration.kind,
            application: None,
            model: None,
            path,
            content,
            policy: registration.policy,
        })
    }
}

/// Mutable state of one `generate` call.
struct Run {
    policy: FailurePolicy,
    report: GenerationReport,
    /// Output paths claimed so far.
    paths: HashSet<String>,
}

impl Run {
    fn record(
        &mut self,
        outcome: Result<RenderedArtifact, TargetFailure>,
    ) -> Result<(), TargetFailure> {
        let failure = match outcome {
            Ok(artifact) if self.paths.contains(&artifact.path) => TargetFailure {
                stack: artifact.stack,
                artifact: artifact.artifact,
                application: artifact.application,
                model: artifact.model,
                error: GeneratorError::PathCollision {
                    path: artifact.path,
                },
            },
            Ok(artifact) => {
                self.paths.insert(artifact.path.clone());
                self.report.outputs.push(artifact);
                return Ok(());
            }
            Err(failure) => failure,
        };

        match self.policy {
            FailurePolicy::FailFast => Err(failure),
            FailurePolicy::BestEffort => {
                warn!(%failure, "skipping artifact");
                self.report.failures.push(failure);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::EndpointStyle;
    use crate::render::TypeStyle;
    use crate::test_utils::{blog_set, broken_registry};

    fn generator() -> Generator {
        Generator::new(
            TemplateRegistry::builtin().unwrap(),
            GeneratorConfig::default(),
        )
    }

    #[test]
    fn per_model_artifacts_come_before_aggregates() {
        let report = generator().generate(&blog_set(), &[StackId::Ember]).unwrap();
        let kinds: Vec<_> = report
            .outputs
            .iter()
            .map(|o| (o.artifact, o.model.clone()))
            .collect();

        assert_eq!(
            kinds,
            vec![
                (ArtifactKind::ModelBase, Some("post".to_string())),
                (ArtifactKind::Model, Some("post".to_string())),
                (ArtifactKind::Test, Some("post".to_string())),
                (ArtifactKind::ModelBase, Some("user".to_string())),
                (ArtifactKind::Model, Some("user".to_string())),
                (ArtifactKind::Test, Some("user".to_string())),
                (ArtifactKind::ModelBase, Some("item".to_string())),
                (ArtifactKind::Model, Some("item".to_string())),
                (ArtifactKind::Test, Some("item".to_string())),
                (ArtifactKind::Index, None),
                (ArtifactKind::Index, None),
            ]
        );
    }

    #[test]
    fn application_aggregates_list_their_own_models() {
        let report = generator().generate(&blog_set(), &[StackId::Ember]).unwrap();
        let indexes: Vec<_> = report
            .outputs
            .iter()
            .filter(|o| o.artifact == ArtifactKind::Index)
            .collect();

        assert_eq!(indexes[0].path, "app/models/blog/index.js");
        assert_eq!(indexes[0].application.as_deref(), Some("blog"));
        assert!(indexes[0].content.contains("import BlogPost from './post';"));
        assert!(indexes[0].content.contains("import BlogUser from './user';"));
        assert!(!indexes[0].content.contains("ShopItem"));

        assert_eq!(indexes[1].path, "app/models/shop/index.js");
        assert!(indexes[1].content.contains("import ShopItem from './item';"));
    }

    #[test]
    fn run_aggregate_lists_every_model() {
        let report = generator()
            .generate(&blog_set(), &[StackId::VuexOrmAxios])
            .unwrap();
        let database = report
            .outputs
            .iter()
            .find(|o| o.path == "src/store/database.js")
            .expect("database module");

        assert_eq!(database.application, None);
        let registers: Vec<_> = database
            .content
            .lines()
            .filter(|l| l.starts_with("database.register"))
            .collect();
        assert_eq!(
            registers,
            vec![
                "database.register(BlogPost);",
                "database.register(BlogUser);",
                "database.register(ShopItem);",
            ]
        );
    }

    #[test]
    fn stacks_render_in_caller_order() {
        let report = generator()
            .generate(&blog_set(), &[StackId::AngularResource, StackId::EmberDynamic])
            .unwrap();
        let stacks: Vec<_> = report.outputs.iter().map(|o| o.stack).collect();
        assert_eq!(
            stacks,
            vec![
                StackId::AngularResource,
                StackId::AngularResource,
                StackId::AngularResource,
                StackId::EmberDynamic,
                StackId::EmberDynamic,
                StackId::EmberDynamic,
            ]
        );
    }

    #[test]
    fn fail_fast_stops_at_first_failure() {
        let generator = Generator::new(broken_registry(), GeneratorConfig::default());
        let failure = generator
            .generate(&blog_set(), &[StackId::Ember])
            .unwrap_err();

        assert_eq!(failure.stack, StackId::Ember);
        assert_eq!(failure.artifact, ArtifactKind::ModelBase);
        assert_eq!(failure.model.as_deref(), Some("post"));
        assert!(matches!(
            failure.error,
            GeneratorError::MissingContextKey { .. }
        ));
    }

    #[test]
    fn best_effort_collects_failures_and_keeps_outputs() {
        let generator = Generator::new(broken_registry(), GeneratorConfig::default())
            .with_policy(FailurePolicy::BestEffort);
        let report = generator
            .generate(&blog_set(), &[StackId::Ember, StackId::AngularResource])
            .unwrap();

        assert_eq!(report.failures.len(), 3);
        assert!(
            report
                .failures
                .iter()
                .all(|f| f.artifact == ArtifactKind::ModelBase)
        );
        assert!(report.outputs.iter().any(|o| o.stack == StackId::AngularResource));
        assert!(!report.is_success());
    }

    #[test]
    fn duplicate_output_paths_are_collisions() {
        let clash = TargetStackDescriptor {
            id: StackId::Ember,
            description: "clash",
            type_style: TypeStyle::EmberData,
            endpoint_style: EndpointStyle::default(),
            artifacts: vec![
                Registration::per_model(
                    ArtifactKind::ModelBase,
                    "t/a.js",
                    "{app}.js",
                    WritePolicy::Regenerate,
                )
                .unwrap(),
            ],
        };
        let registry = TemplateRegistry::builder()
            .stack(clash)
            .template("t/a.js", "{{model_name}}")
            .build()
            .unwrap();
        let generator = Generator::new(registry, GeneratorConfig::default())
            .with_policy(FailurePolicy::BestEffort);

        let report = generator.generate(&blog_set(), &[StackId::Ember]).unwrap();

        assert_eq!(report.outputs.len(), 2);
        assert_eq!(report.failures.len(), 1);
        match &report.failures[0].error {
            GeneratorError::PathCollision { path } => assert_eq!(path, "blog.js"),
            other => panic!("expected PathCollision, got {other:?}"),
        }
    }

    #[test]
    fn unregistered_stack_reports_unknown_targets() {
        let registry = TemplateRegistry::builder().build().unwrap();
        let generator = Generator::new(registry, GeneratorConfig::default());

        let failure = generator
            .generate(&blog_set(), &[StackId::Angular2])
            .unwrap_err();
        assert!(matches!(
            failure.error,
            GeneratorError::UnknownTarget { .. }
        ));
    }

    #[test]
    fn pairs_follow_output_order() {
        let report = generator()
            .generate(&blog_set(), &[StackId::EmberDynamic])
            .unwrap();
        let paths: Vec<_> = report.pairs().map(|(path, _)| path).collect();
        assert_eq!(paths, vec!["blog/post.js", "blog/user.js", "shop/item.js"]);
    }
}
