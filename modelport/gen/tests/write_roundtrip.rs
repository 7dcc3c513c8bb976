//! Loading, generating and writing into a project directory.

use std::fs;

use tempfile::TempDir;

use modelport_gen::config::GeneratorConfig;
use modelport_gen::errors::GeneratorError;
use modelport_gen::input::load_schemas;
use modelport_gen::orchestrator::{FailurePolicy, Generator};
use modelport_gen::output::write_artifacts;
use modelport_gen::registry::{StackId, TemplateRegistry};
use strum::IntoEnumIterator;

const SCHEMAS: &str = r#"
- application_name: blog
  model_name: post
  pagination_container: results
  fields:
    - { name: id, type: number }
    - { name: title, type: string }
    - { name: draft, type: boolean, has_default: true, default: false }
  relationships:
    - { name: author, kind: belongsTo, app: blog, related_model: user, inverse: posts }
- application_name: blog
  model_name: user
  fields:
    - { name: username, type: string }
  relationships:
    - { name: posts, kind: hasMany, app: blog, related_model: post, inverse: author }
"#;

fn schema_file(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("models.yaml");
    fs::write(&path, SCHEMAS).expect("write schema file");
    path
}

fn generator() -> Generator {
    Generator::new(TemplateRegistry::builtin().unwrap(), GeneratorConfig::default())
}

// =============================================================================
// Idempotent regeneration
// =============================================================================

#[test]
fn second_run_changes_nothing() {
    let input = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let schemas = load_schemas(&schema_file(&input)).unwrap();
    let stacks: Vec<_> = StackId::iter().collect();

    let first = generator().generate(&schemas, &stacks).unwrap();
    let written = write_artifacts(project.path(), &first.outputs, false).unwrap();
    assert_eq!(written.written.len(), first.outputs.len());

    let snapshot: Vec<_> = first
        .outputs
        .iter()
        .map(|o| fs::read_to_string(project.path().join(&o.path)).unwrap())
        .collect();

    let second = generator().generate(&schemas, &stacks).unwrap();
    let rewritten = write_artifacts(project.path(), &second.outputs, false).unwrap();

    assert!(rewritten.written.is_empty());
    assert_eq!(rewritten.total(), second.outputs.len());
    for (artifact, before) in second.outputs.iter().zip(snapshot) {
        let after = fs::read_to_string(project.path().join(&artifact.path)).unwrap();
        assert_eq!(after, before, "{} changed", artifact.path);
    }
}

#[test]
fn hand_edited_stub_survives_regeneration() {
    let input = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let schemas = load_schemas(&schema_file(&input)).unwrap();

    let report = generator().generate(&schemas, &[StackId::Ember]).unwrap();
    write_artifacts(project.path(), &report.outputs, false).unwrap();

    let stub = project.path().join("app/models/blog/post.js");
    let base = project.path().join("app/models/base/blog/post.js");
    fs::write(&stub, "// custom computed properties").unwrap();
    fs::write(&base, "// stale").unwrap();

    let summary = write_artifacts(project.path(), &report.outputs, false).unwrap();

    assert!(summary.skipped.contains(&stub));
    assert!(summary.written.contains(&base));
    assert_eq!(fs::read_to_string(&stub).unwrap(), "// custom computed properties");
    assert!(
        fs::read_to_string(&base)
            .unwrap()
            .contains("draft: attr('boolean', { defaultValue: false }),")
    );
}

#[test]
fn deleted_unit_test_stays_deleted() {
    let input = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let schemas = load_schemas(&schema_file(&input)).unwrap();
    let report = generator().generate(&schemas, &[StackId::Ember]).unwrap();

    write_artifacts(project.path(), &report.outputs, false).unwrap();
    let test = project.path().join("tests/unit/models/blog/post-test.js");
    assert!(test.exists());

    fs::remove_file(&test).unwrap();
    let summary = write_artifacts(project.path(), &report.outputs, false).unwrap();
    assert!(summary.written.is_empty());
    assert!(summary.skipped.contains(&test));
    assert!(!test.exists());

    // Removing the stub as well brings both back.
    fs::remove_file(project.path().join("app/models/blog/post.js")).unwrap();
    let summary = write_artifacts(project.path(), &report.outputs, false).unwrap();
    assert_eq!(summary.written.len(), 2);
    assert!(test.exists());
}

#[test]
fn loaded_schemas_render_derived_endpoints() {
    let input = TempDir::new().unwrap();
    let schemas = load_schemas(&schema_file(&input)).unwrap();

    let report = generator().generate(&schemas, &[StackId::MobxAxios]).unwrap();
    let store = report
        .pairs()
        .find(|(p, _)| *p == "src/stores/bloguser.js")
        .map(|(_, c)| c)
        .unwrap();

    assert!(store.contains("endpoint = 'blog/users';"));
    assert!(!store.contains("result ="));

    // `id` fields are dropped at load; the template declares the key itself.
    let base = report
        .pairs()
        .find(|(p, _)| *p == "src/models/base/blogpost.js")
        .map(|(_, c)| c)
        .unwrap();
    assert_eq!(base.matches("@observable id;").count(), 1);
}

// =============================================================================
// Template overrides
// =============================================================================

#[test]
fn template_dir_overrides_builtin_bodies() {
    let templates = TempDir::new().unwrap();
    fs::create_dir_all(templates.path().join("angular")).unwrap();
    fs::write(
        templates.path().join("angular/service.js.hbs"),
        "// {{class_name}} at {{endpoint_url}}\n",
    )
    .unwrap();

    let input = TempDir::new().unwrap();
    let schemas = load_schemas(&schema_file(&input)).unwrap();
    let registry = TemplateRegistry::with_template_dir(templates.path()).unwrap();
    let report = Generator::new(registry, GeneratorConfig::default())
        .generate(&schemas, &[StackId::AngularResource])
        .unwrap();

    let contents: Vec<_> = report.pairs().map(|(_, c)| c).collect();
    assert_eq!(
        contents,
        vec!["// BlogPost at /api/blog/posts\n", "// BlogUser at /api/blog/users\n"]
    );
}

#[test]
fn malformed_override_fails_at_startup() {
    let templates = TempDir::new().unwrap();
    fs::create_dir_all(templates.path().join("ember")).unwrap();
    fs::write(
        templates.path().join("ember/model.js.hbs"),
        "{{#each fields}}{{name}}",
    )
    .unwrap();

    match TemplateRegistry::with_template_dir(templates.path()) {
        Err(GeneratorError::TemplateSyntaxError { template, .. }) => {
            assert_eq!(template, "ember/model.js");
        }
        other => panic!("expected TemplateSyntaxError, got {other:?}"),
    }
}

#[test]
fn missing_template_dir_is_config_error() {
    let templates = TempDir::new().unwrap();
    let missing = templates.path().join("nope");

    assert!(matches!(
        TemplateRegistry::with_template_dir(&missing),
        Err(GeneratorError::ConfigError(_))
    ));
}

// =============================================================================
// Best-effort runs
// =============================================================================

#[test]
fn best_effort_writes_healthy_stacks() {
    let templates = TempDir::new().unwrap();
    fs::create_dir_all(templates.path().join("mobx-axios")).unwrap();
    fs::write(
        templates.path().join("mobx-axios/store.js.hbs"),
        "{{store_namespace}}",
    )
    .unwrap();

    let input = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let schemas = load_schemas(&schema_file(&input)).unwrap();
    let registry = TemplateRegistry::with_template_dir(templates.path()).unwrap();
    let generator = Generator::new(registry, GeneratorConfig::default())
        .with_policy(FailurePolicy::BestEffort);

    let report = generator
        .generate(&schemas, &[StackId::MobxAxios, StackId::Angular2])
        .unwrap();
    assert_eq!(report.failures.len(), 2);
    for failure in &report.failures {
        assert!(matches!(
            failure.error,
            GeneratorError::MissingContextKey { .. }
        ));
        assert!(failure.to_string().starts_with("mobx-axios:store [blog/"));
    }

    write_artifacts(project.path(), &report.outputs, false).unwrap();
    assert!(project.path().join("src/app/blog/post.service.ts").exists());
    assert!(project.path().join("src/models/base/blogpost.js").exists());
    assert!(!project.path().join("src/stores/blogpost.js").exists());
}
