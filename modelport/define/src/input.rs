//! Serialized form of model schemas.
//!
//! The hosting framework's introspection layer dumps its models as a JSON or
//! YAML list of [`ModelSchemaDef`]. The definitions are converted into
//! validated [`ModelSchema`] values with `TryFrom`.
//!
//! ```yaml
//! - application_name: blog
//!   model_name: post
//!   endpoint: blog/posts
//!   pagination_container: results
//!   fields:
//!     - { name: title, type: string }
//!     - { name: draft, type: boolean, has_default: true, default: false }
//!   relationships:
//!     - { name: author, kind: belongsTo, app: blog, related_model: user, inverse: posts }
//! ```

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::SchemaError;
use crate::schema::ModelSchema;
use crate::types::{Field, FieldType, Relationship};

/// Serialized [`Field`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: Option<FieldType>,
    /// Explicit flag; inferred from `default` when omitted.
    #[serde(default)]
    pub has_default: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub default: Option<Value>,
}

/// Serialized [`Relationship`].
///
/// `kind` stays a plain string here so an unsupported cardinality surfaces
/// as `InvalidSchema` rather than as a parse error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RelationshipDef {
    pub name: String,
    pub kind: String,
    pub app: String,
    pub related_model: String,
    #[serde(default)]
    pub inverse: Option<String>,
}

/// Serialized [`ModelSchema`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelSchemaDef {
    pub application_name: String,
    pub model_name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub relationships: Vec<RelationshipDef>,
    /// Optional so loaders can derive a default route.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub pagination_container: Option<String>,
}

impl ModelSchemaDef {
    pub fn key(&self) -> String {
        format!("{}/{}", self.application_name, self.model_name)
    }
}

// A present `default: null` must stay distinguishable from a missing key.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn convert_field(model: &str, def: FieldDef) -> Result<Field, SchemaError> {
    let default = match (def.has_default, def.default) {
        (Some(true), None) => {
            return Err(SchemaError::invalid(
                model,
                format!("field '{}' sets has_default without a default", def.name),
            ));
        }
        (Some(false), Some(_)) => {
            return Err(SchemaError::invalid(
                model,
                format!("field '{}' has a default but has_default is false", def.name),
            ));
        }
        (_, default) => default,
    };

    Ok(Field {
        name: def.name,
        field_type: def.field_type,
        default,
    })
}

fn convert_relationship(model: &str, def: RelationshipDef) -> Result<Relationship, SchemaError> {
    let kind = def.kind.parse().map_err(|_| {
        SchemaError::invalid(
            model,
            format!(
                "relationship '{}' has kind '{}', expected belongsTo or hasMany",
                def.name, def.kind
            ),
        )
    })?;

    // A trailing '+' marks a reverse accessor that was explicitly disabled.
    let inverse = def
        .inverse
        .filter(|inverse| !inverse.is_empty() && !inverse.ends_with('+'));

    Ok(Relationship {
        name: def.name,
        kind,
        app: def.app,
        related_model: def.related_model,
        inverse,
    })
}

impl TryFrom<ModelSchemaDef> for ModelSchema {
    type Error = SchemaError;

    fn try_from(def: ModelSchemaDef) -> Result<Self, Self::Error> {
        let key = def.key();

        let fields = def
            .fields
            .into_iter()
            .map(|f| convert_field(&key, f))
            .collect::<Result<Vec<_>, _>>()?;
        let relationships = def
            .relationships
            .into_iter()
            .map(|r| convert_relationship(&key, r))
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = ModelSchema::builder(def.application_name, def.model_name)
            .fields(fields)
            .relationships(relationships);
        if let Some(endpoint) = def.endpoint {
            builder = builder.endpoint(endpoint);
        }
        if let Some(container) = def.pagination_container {
            builder = builder.pagination_container(container);
        }
        builder.build()
    }
}
