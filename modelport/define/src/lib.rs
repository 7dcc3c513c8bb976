//! Modelport Definition Library
//!
//! This crate provides the in-memory description of the backend data model
//! that `modelport-gen` turns into frontend source files (model classes,
//! services/stores and registration indexes).
//!
//! ## Core Types
//!
//! - [`ModelSchema`] - One model: fields, relationships, endpoint, pagination key
//! - [`Field`] / [`FieldType`] - Plain attributes and their semantic type tag
//! - [`Relationship`] / [`RelationKind`] - References to other models and their cardinality
//! - [`SchemaSet`] - All schemas of a run, unique by `app/model`, grouped by application
//! - [`ModelSchemaDef`] - Serialized form produced by the hosting framework
//!
//! ## Examples
//!
//! ```
//! use modelport_define::{Field, FieldType, ModelSchema, Relationship, SchemaSet};
//! use serde_json::json;
//!
//! let post = ModelSchema::builder("blog", "post")
//!     .endpoint("blog/posts")
//!     .pagination_container("results")
//!     .field(Field::new("title").with_type(FieldType::String))
//!     .field(Field::new("draft").with_type(FieldType::Boolean).with_default(json!(true)))
//!     .relationship(Relationship::belongs_to("author", "blog", "user").with_inverse("posts"))
//!     .build()
//!     .unwrap();
//!
//! let set = SchemaSet::new(vec![post]).unwrap();
//! assert_eq!(set.applications()[0].name, "blog");
//! ```

pub mod error;
pub mod input;
pub mod schema;
pub mod types;

pub use error::SchemaError;
pub use input::{FieldDef, ModelSchemaDef, RelationshipDef};
pub use schema::{ApplicationGroup, ModelSchema, ModelSchemaBuilder, SchemaSet};
pub use types::{Field, FieldType, RelationKind, Relationship};
