//! Field and relationship types.
//!
//! This module provides the building blocks of a [`ModelSchema`](crate::ModelSchema):
//!
//! - [`Field`] - A plain attribute with an optional semantic type and default
//! - [`FieldType`] - Semantic type tag for an attribute
//! - [`Relationship`] - A reference to another model
//! - [`RelationKind`] - Cardinality of a relationship

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString};

/// Semantic type tag of a [`Field`].
///
/// The four built-in tags are understood by every target stack. Any other
/// tag is kept verbatim as [`FieldType::Custom`] so that a target can map it
/// to its own vocabulary (an ember-data transform name, a TypeScript type, ...).
///
/// ## Examples
///
/// ```
/// use std::str::FromStr;
/// use modelport_define::FieldType;
///
/// assert_eq!(FieldType::from_str("number").unwrap(), FieldType::Number);
/// assert_eq!(
///     FieldType::from_str("money").unwrap(),
///     FieldType::Custom("money".to_string())
/// );
/// assert_eq!(FieldType::Custom("money".to_string()).tag(), "money");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    #[strum(default)]
    Custom(String),
}

impl FieldType {
    /// Returns the tag this type was declared with.
    pub fn tag(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Custom(name) => name,
        }
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        match tag.parse() {
            Ok(field_type) => field_type,
            Err(_) => FieldType::Custom(tag),
        }
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.tag().to_string()
    }
}

/// A plain (non relational) attribute of a model.
///
/// The default value is a JSON literal. A field has a default exactly when
/// `default` is `Some`, so `Some(Value::Null)` is a legitimate `null` default
/// and differs from having no default at all.
///
/// ## Examples
///
/// ```
/// use modelport_define::{Field, FieldType};
/// use serde_json::json;
///
/// let title = Field::new("title").with_type(FieldType::String);
/// assert!(!title.has_default());
///
/// let draft = Field::new("draft")
///     .with_type(FieldType::Boolean)
///     .with_default(json!(true));
/// assert!(draft.has_default());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Attribute name, unique within its model.
    pub name: String,
    /// Semantic type; `None` means untyped.
    pub field_type: Option<FieldType>,
    /// Default literal, present only when the field declares a default.
    pub default: Option<Value>,
}

impl Field {
    /// Creates an untyped field without a default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: None,
            default: None,
        }
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Cardinality of a [`Relationship`].
///
/// ## Examples
///
/// ```
/// use std::str::FromStr;
/// use modelport_define::RelationKind;
///
/// assert_eq!(RelationKind::from_str("hasMany").unwrap(), RelationKind::HasMany);
/// assert_eq!(RelationKind::BelongsTo.to_string(), "belongsTo");
/// assert!(RelationKind::from_str("manyToMany").is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum RelationKind {
    /// Single reference to one related record
    BelongsTo,
    /// Collection of references to related records
    HasMany,
}

impl RelationKind {
    /// Returns `true` when the rendered reference must be a collection.
    pub fn is_collection(self) -> bool {
        matches!(self, RelationKind::HasMany)
    }
}

/// A reference from one model to another.
///
/// ## Examples
///
/// ```
/// use modelport_define::{RelationKind, Relationship};
///
/// let author = Relationship::belongs_to("author", "blog", "user").with_inverse("posts");
/// assert_eq!(author.kind, RelationKind::BelongsTo);
/// assert_eq!(author.target(), "blog/user");
/// assert_eq!(author.inverse.as_deref(), Some("posts"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Attribute name, unique within its model.
    pub name: String,
    pub kind: RelationKind,
    /// Application of the related model.
    pub app: String,
    /// Name of the related model.
    pub related_model: String,
    /// Reciprocal relationship on the related model, if one is declared.
    pub inverse: Option<String>,
}

impl Relationship {
    pub fn new(
        name: impl Into<String>,
        kind: RelationKind,
        app: impl Into<String>,
        related_model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            app: app.into(),
            related_model: related_model.into(),
            inverse: None,
        }
    }

    pub fn belongs_to(
        name: impl Into<String>,
        app: impl Into<String>,
        related_model: impl Into<String>,
    ) -> Self {
        Self::new(name, RelationKind::BelongsTo, app, related_model)
    }

    pub fn has_many(
        name: impl Into<String>,
        app: impl Into<String>,
        related_model: impl Into<String>,
    ) -> Self {
        Self::new(name, RelationKind::HasMany, app, related_model)
    }

    pub fn with_inverse(mut self, inverse: impl Into<String>) -> Self {
        self.inverse = Some(inverse.into());
        self
    }

    /// Returns the `app/model` key of the related schema.
    pub fn target(&self) -> String {
        format!("{}/{}", self.app, self.related_model)
    }
}
