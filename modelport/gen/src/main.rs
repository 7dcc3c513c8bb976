//! Modelport code generator
//!
//! Generates frontend models, services and indexes from exported model schemas.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use colored::Colorize;
use modelport_gen::config::{CONFIG_FILE_NAME, GeneratorConfig};
use modelport_gen::errors::GeneratorError;
use modelport_gen::input::load_schemas;
use modelport_gen::orchestrator::{FailurePolicy, Generator};
use modelport_gen::output::write_artifacts;
use modelport_gen::registry::{StackId, TemplateRegistry};
use strum::IntoEnumIterator;
use tracing::debug;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Modelport - generates frontend model code for several JavaScript stacks
#[derive(Parser, Debug)]
#[command(name = "modelport")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Schema document (.json, .yaml or .yml) exported by the backend
    #[arg(short, long, required_unless_present = "list_targets")]
    schemas: Option<PathBuf>,

    /// Target stack (repeatable), e.g. "ember" or "vuexorm-axios"
    #[arg(long = "stack", value_name = "ID")]
    stacks: Vec<StackId>,

    /// Generate for every known stack
    #[arg(long, conflicts_with = "stacks")]
    all_stacks: bool,

    /// Config file (defaults to ./modelport.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frontend project root (overrides `output_dir`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// API root URL (overrides `api_base`)
    #[arg(long)]
    api_base: Option<String>,

    /// Ember application namespace (overrides `ember_app`)
    #[arg(long)]
    ember_app: Option<String>,

    /// Point every relationship at this application (overrides `target_app`)
    #[arg(long)]
    target_app: Option<String>,

    /// Report what would be written without touching the filesystem
    #[arg(long)]
    dry_run: bool,

    /// Keep generating after a failed artifact and report every failure
    #[arg(long)]
    best_effort: bool,

    /// List stacks and their artifacts, then exit
    #[arg(long)]
    list_targets: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), GeneratorError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json);

    let config = resolve_config(&cli)?;
    let registry = match &config.template_dir {
        Some(dir) => TemplateRegistry::with_template_dir(dir)?,
        None => TemplateRegistry::builtin()?,
    };

    if cli.list_targets {
        print_targets(&registry);
        return Ok(());
    }

    let Some(schemas_path) = cli.schemas.as_deref() else {
        return Err(GeneratorError::ConfigError(
            "--schemas is required".to_string(),
        ));
    };
    let stacks: Vec<StackId> = if cli.all_stacks {
        StackId::iter().collect()
    } else if cli.stacks.is_empty() {
        return Err(GeneratorError::ConfigError(format!(
            "no target stack selected; use --stack <ID> or --all-stacks (known: {})",
            StackId::iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    } else {
        cli.stacks.clone()
    };

    let schemas = load_schemas(schemas_path)?;
    let policy = if cli.best_effort {
        FailurePolicy::BestEffort
    } else {
        FailurePolicy::FailFast
    };
    let output_dir = config.output_dir.clone();
    let generator = Generator::new(registry, config).with_policy(policy);

    let report = match generator.generate(&schemas, &stacks) {
        Ok(report) => report,
        Err(failure) => {
            eprintln!("{} {}", "error:".red().bold(), failure);
            return Err(failure.error);
        }
    };

    let summary = write_artifacts(&output_dir, &report.outputs, cli.dry_run)?;

    let verb = if cli.dry_run { "would write" } else { "wrote" };
    for path in &summary.written {
        println!("  {} {}", verb.green(), relative(path, &output_dir));
    }
    if cli.verbose > 0 {
        for path in &summary.unchanged {
            println!("  {} {}", "unchanged".dimmed(), relative(path, &output_dir));
        }
        for path in &summary.skipped {
            println!("  {} {}", "kept".yellow(), relative(path, &output_dir));
        }
    }
    println!(
        "{} {} written, {} unchanged, {} kept ({} models, {} stacks)",
        "modelport:".bold(),
        summary.written.len(),
        summary.unchanged.len(),
        summary.skipped.len(),
        schemas.len(),
        stacks.len()
    );

    if !report.is_success() {
        for failure in &report.failures {
            eprintln!("{} {}", "failed:".red().bold(), failure);
        }
        eprintln!(
            "{}",
            format!("{} artifact(s) failed", report.failures.len()).red()
        );
        process::exit(1);
    }

    Ok(())
}

/// Built-in defaults, then the config file, then command line flags.
fn resolve_config(cli: &Cli) -> Result<GeneratorConfig, GeneratorError> {
    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::load_from(path)?,
        None => GeneratorConfig::discover(Path::new("."))?,
    };
    debug!(explicit = cli.config.is_some(), file = CONFIG_FILE_NAME, "configuration loaded");

    if let Some(output) = &cli.output {
        config.output_dir = output.clone();
    }
    if let Some(api_base) = &cli.api_base {
        config.api_base = api_base.clone();
    }
    if let Some(ember_app) = &cli.ember_app {
        config.ember_app = ember_app.clone();
    }
    if let Some(target_app) = &cli.target_app {
        config.target_app = Some(target_app.clone());
    }
    config.validate()?;
    Ok(config)
}

fn print_targets(registry: &TemplateRegistry) {
    for descriptor in registry.stacks() {
        println!("{} - {}", descriptor.id.to_string().bold(), descriptor.description);
        for artifact in &descriptor.artifacts {
            println!(
                "  {:<11} {:<12} {:<10} {}",
                artifact.kind.to_string(),
                artifact.scope.to_string(),
                artifact.policy.to_string(),
                artifact.path.pattern().dimmed()
            );
        }
    }
}

fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn init_tracing(verbose: u8, json: bool) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,modelport_gen=info".to_string(),
            2 => "info,modelport_gen=debug".to_string(),
            _ => "debug,modelport_gen=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(verbose >= 2)
                    .with_file(verbose >= 3)
                    .with_line_number(verbose >= 3)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}
