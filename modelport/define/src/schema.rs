//! Model schemas and schema sets.
//!
//! A [`ModelSchema`] describes one model of the hosting application: its
//! attributes, its relationships and the REST endpoint serving it. Schemas
//! are validated once when they are built and are immutable afterwards.
//!
//! A [`SchemaSet`] is the ordered collection of schemas for one generation
//! run. It guarantees that `application_name` + `model_name` is unique and
//! groups models by application for aggregate artifacts.

use std::collections::HashSet;

use crate::error::SchemaError;
use crate::types::{Field, Relationship};

/// Description of a single model.
///
/// ## Examples
///
/// ```
/// use modelport_define::{Field, FieldType, ModelSchema, Relationship};
///
/// let post = ModelSchema::builder("blog", "post")
///     .endpoint("blog/posts")
///     .field(Field::new("title").with_type(FieldType::String))
///     .relationship(Relationship::belongs_to("author", "blog", "user").with_inverse("posts"))
///     .build()
///     .unwrap();
///
/// assert_eq!(post.key(), "blog/post");
/// assert_eq!(post.fields().len(), 1);
/// assert_eq!(post.relationships()[0].target(), "blog/user");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    application_name: String,
    model_name: String,
    fields: Vec<Field>,
    relationships: Vec<Relationship>,
    endpoint: String,
    pagination_container: Option<String>,
}

impl ModelSchema {
    /// Starts building a schema for `application_name` / `model_name`.
    pub fn builder(
        application_name: impl Into<String>,
        model_name: impl Into<String>,
    ) -> ModelSchemaBuilder {
        ModelSchemaBuilder {
            application_name: application_name.into(),
            model_name: model_name.into(),
            fields: Vec::new(),
            relationships: Vec::new(),
            endpoint: None,
            pagination_container: None,
        }
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Attributes in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Relationships in declaration order.
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// REST path segment of the collection resource (e.g. `blog/posts`).
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Key under which paginated list responses nest their results.
    pub fn pagination_container(&self) -> Option<&str> {
        self.pagination_container.as_deref()
    }

    /// Globally unique `app/model` key.
    pub fn key(&self) -> String {
        format!("{}/{}", self.application_name, self.model_name)
    }
}

/// Builder for [`ModelSchema`]; validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ModelSchemaBuilder {
    application_name: String,
    model_name: String,
    fields: Vec<Field>,
    relationships: Vec<Relationship>,
    endpoint: Option<String>,
    pagination_container: Option<String>,
}

impl ModelSchemaBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn pagination_container(mut self, container: impl Into<String>) -> Self {
        self.pagination_container = Some(container.into());
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    pub fn relationships(mut self, relationships: impl IntoIterator<Item = Relationship>) -> Self {
        self.relationships.extend(relationships);
        self
    }

    /// Validates the collected parts and returns the schema.
    ///
    /// ## Errors
    ///
    /// Returns `SchemaError::InvalidSchema` when a name is empty, when the
    /// endpoint is missing, when a relationship has no target, or when two
    /// attributes share a name.
    pub fn build(self) -> Result<ModelSchema, SchemaError> {
        let key = format!("{}/{}", self.application_name, self.model_name);

        if self.application_name.is_empty() {
            return Err(SchemaError::invalid(key, "application_name is empty"));
        }
        if self.model_name.is_empty() {
            return Err(SchemaError::invalid(key, "model_name is empty"));
        }

        let endpoint = match self.endpoint {
            Some(endpoint) if !endpoint.trim_matches('/').is_empty() => endpoint,
            _ => return Err(SchemaError::invalid(key, "endpoint is missing")),
        };

        let mut seen = HashSet::new();
        let names = self
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .chain(self.relationships.iter().map(|r| r.name.as_str()));
        for name in names {
            if name.is_empty() {
                return Err(SchemaError::invalid(key, "attribute with an empty name"));
            }
            if !seen.insert(name) {
                return Err(SchemaError::invalid(
                    key,
                    format!("attribute '{name}' is declared more than once"),
                ));
            }
        }

        for rel in &self.relationships {
            if rel.app.is_empty() || rel.related_model.is_empty() {
                return Err(SchemaError::invalid(
                    key,
                    format!("relationship '{}' has no related model", rel.name),
                ));
            }
        }

        Ok(ModelSchema {
            application_name: self.application_name,
            model_name: self.model_name,
            fields: self.fields,
            relationships: self.relationships,
            endpoint,
            pagination_container: self.pagination_container,
        })
    }
}

/// All models belonging to one application, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationGroup<'a> {
    pub name: &'a str,
    pub models: Vec<&'a ModelSchema>,
}

/// Ordered, key-unique collection of schemas for one generation run.
///
/// ## Examples
///
/// ```
/// use modelport_define::{ModelSchema, SchemaSet};
///
/// let schema = |app: &str, model: &str| {
///     ModelSchema::builder(app, model)
///         .endpoint(format!("{app}/{model}s"))
///         .build()
///         .unwrap()
/// };
///
/// let set = SchemaSet::new(vec![
///     schema("shop", "product"),
///     schema("blog", "post"),
///     schema("shop", "category"),
/// ])
/// .unwrap();
///
/// let groups = set.applications();
/// assert_eq!(groups[0].name, "shop");
/// assert_eq!(groups[0].models.len(), 2);
/// assert_eq!(groups[1].name, "blog");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaSet {
    schemas: Vec<ModelSchema>,
}

impl SchemaSet {
    /// Builds a set, rejecting duplicate `app/model` keys.
    pub fn new(schemas: Vec<ModelSchema>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for schema in &schemas {
            let key = schema.key();
            if !seen.insert(key.clone()) {
                return Err(SchemaError::invalid(key, "model is declared more than once"));
            }
        }
        Ok(Self { schemas })
    }

    /// Schemas in the order they were supplied.
    pub fn schemas(&self) -> &[ModelSchema] {
        &self.schemas
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModelSchema> {
        self.schemas.iter()
    }

    /// Looks a schema up by application and model name.
    pub fn get(&self, application_name: &str, model_name: &str) -> Option<&ModelSchema> {
        self.schemas
            .iter()
            .find(|s| s.application_name == application_name && s.model_name == model_name)
    }

    /// Groups schemas by application.
    ///
    /// Applications appear in the order of their first model; models keep
    /// their relative order within each group.
    pub fn applications(&self) -> Vec<ApplicationGroup<'_>> {
        let mut groups: Vec<ApplicationGroup<'_>> = Vec::new();
        for schema in &self.schemas {
            match groups.iter_mut().find(|g| g.name == schema.application_name) {
                Some(group) => group.models.push(schema),
                None => groups.push(ApplicationGroup {
                    name: &schema.application_name,
                    models: vec![schema],
                }),
            }
        }
        groups
    }
}

impl<'a> IntoIterator for &'a SchemaSet {
    type Item = &'a ModelSchema;
    type IntoIter = std::slice::Iter<'a, ModelSchema>;

    fn into_iter(self) -> Self::IntoIter {
        self.schemas.iter()
    }
}
