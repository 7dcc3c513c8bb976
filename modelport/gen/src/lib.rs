//! Modelport generator library.
//!
//! This crate turns model schemas built with `modelport-define` into frontend
//! source files for several JavaScript/TypeScript stacks. One schema set
//! yields, per stack:
//!
//! - Model classes (a regenerated base class plus an editable stub)
//! - Data-access services or stores
//! - Registration indexes that aggregate every model of an application or run
//! - Per-stack runtime support files (HTTP client, shared base classes)
//!
//! ## Modules
//!
//! - [`naming`] - Identifier, pluralization, URL and path-pattern helpers
//! - [`registry`] - Stack descriptors and the `(stack, artifact)` template map
//! - [`render`] - Handlebars rendering of schemas and aggregates
//! - [`orchestrator`] - Deterministic generation runs with fail-fast or best-effort policy
//! - [`config`] - `modelport.toml` settings
//! - [`input`] - Schema document loading
//! - [`output`] - Writing artifacts into a frontend project
//! - [`errors`] - Error types for the generator
//!
//! ## Example Usage
//!
//! ```
//! use modelport_define::{Field, FieldType, ModelSchema, Relationship, SchemaSet};
//! use modelport_gen::config::GeneratorConfig;
//! use modelport_gen::orchestrator::Generator;
//! use modelport_gen::registry::{StackId, TemplateRegistry};
//!
//! let post = ModelSchema::builder("blog", "post")
//!     .endpoint("posts")
//!     .field(Field::new("title").with_type(FieldType::String))
//!     .relationship(Relationship::belongs_to("author", "blog", "user").with_inverse("posts"))
//!     .build()
//!     .unwrap();
//! let schemas = SchemaSet::new(vec![post]).unwrap();
//!
//! let registry = TemplateRegistry::builtin().unwrap();
//! let generator = Generator::new(registry, GeneratorConfig::default());
//! let report = generator.generate(&schemas, &[StackId::Ember]).unwrap();
//!
//! let (path, content) = report.pairs().next().unwrap();
//! assert_eq!(path, "app/models/base/blog/post.js");
//! assert!(content.contains("author: belongsTo('blog/user', { async: true, inverse: 'posts' })"));
//! ```

pub mod config;
pub mod errors;
pub mod input;
pub mod naming;
pub mod orchestrator;
pub mod output;
pub mod registry;
pub mod render;

#[cfg(test)]
mod test_utils;
