//! Loading schema documents produced by the hosting framework.
//!
//! A document is a JSON or YAML list of
//! [`ModelSchemaDef`](modelport_define::ModelSchemaDef). While loading:
//!
//! - fields named `id` are dropped, since every template declares the
//!   primary key itself
//! - a missing `endpoint` becomes `{application_name}/{pluralize(model_name)}`
//! - application, model, field and relationship names are checked with
//!   [`validate_identifier`]

use std::fs;
use std::path::Path;

use modelport_define::{ModelSchema, ModelSchemaDef, SchemaSet};
use tracing::{debug, info};

use crate::errors::GeneratorError;
use crate::naming::{pluralize, validate_identifier};

/// Serialization of a schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Json,
    Yaml,
}

impl SchemaFormat {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, GeneratorError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(SchemaFormat::Json),
            Some("yaml" | "yml") => Ok(SchemaFormat::Yaml),
            _ => Err(GeneratorError::ParseError(format!(
                "cannot tell the format of '{}' (expected .json, .yaml or .yml)",
                path.display()
            ))),
        }
    }
}

/// Reads and validates a schema document.
///
/// ## Errors
///
/// - `ReadError` when the file cannot be read
/// - `ParseError` for an unknown extension or malformed content
/// - `InvalidIdentifier` / `Schema` when a definition is invalid
pub fn load_schemas(path: &Path) -> Result<SchemaSet, GeneratorError> {
    let format = SchemaFormat::from_path(path)?;
    let content = fs::read_to_string(path).map_err(|e| GeneratorError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    let schemas = parse_schemas(&content, format)?;
    info!(path = %path.display(), models = schemas.len(), "loaded schemas");
    Ok(schemas)
}

/// Parses a schema document.
pub fn parse_schemas(content: &str, format: SchemaFormat) -> Result<SchemaSet, GeneratorError> {
    let defs: Vec<ModelSchemaDef> = match format {
        SchemaFormat::Json => {
            serde_json::from_str(content).map_err(|e| GeneratorError::ParseError(e.to_string()))?
        }
        SchemaFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|e| GeneratorError::ParseError(e.to_string()))?
        }
    };

    let schemas = defs
        .into_iter()
        .map(prepare)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SchemaSet::new(schemas)?)
}

fn prepare(mut def: ModelSchemaDef) -> Result<ModelSchema, GeneratorError> {
    validate_identifier(&def.application_name)?;
    validate_identifier(&def.model_name)?;

    def.fields.retain(|field| field.name != "id");
    for field in &def.fields {
        validate_identifier(&field.name)?;
    }
    for relationship in &def.relationships {
        validate_identifier(&relationship.name)?;
        validate_identifier(&relationship.app)?;
        validate_identifier(&relationship.related_model)?;
    }

    if def.endpoint.is_none() {
        let endpoint = format!("{}/{}", def.application_name, pluralize(&def.model_name));
        debug!(model = %def.key(), %endpoint, "derived endpoint");
        def.endpoint = Some(endpoint);
    }

    Ok(ModelSchema::try_from(def)?)
}
