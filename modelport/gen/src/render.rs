//! Binding of model schemas into templates.
//!
//! Templates are handlebars bodies rendered in strict mode with HTML escaping
//! disabled. A placeholder naming a binding that is absent from the assembled
//! data fails with [`GeneratorError::MissingContextKey`]; bindings that exist
//! but have no value are present as `null`, so `{{#if}}` guards work without
//! tripping strict mode.
//!
//! ## Schema bindings
//!
//! | key | value |
//! |-----|-------|
//! | `application_name`, `model_name`, `endpoint` | as declared |
//! | `class_name` | `{App}{Model}` |
//! | `endpoint_url` | `api_base` joined with the endpoint (only when `api_base` is set) |
//! | `pagination_container` | schema value, else the context fallback, else `null` |
//! | `has_relationships` | `true` when at least one relationship is declared |
//! | `relationship_kinds` | distinct kinds in declaration order |
//! | `fields[]` | `name`, `type`, `has_default`, `default` (JSON literal text) |
//! | `relationships[]` | `name`, `kind`, `app`, `related_model`, `related_class`, `inverse`, `many` |
//!
//! A `target_app` context entry replaces the `app` of every relationship.
//!
//! Schema bindings take precedence over context entries with the same key.

use std::collections::BTreeMap;
use std::fmt;

use handlebars::{Handlebars, RenderError, RenderErrorReason, handlebars_helper};
use heck::{ToKebabCase, ToUpperCamelCase};
use modelport_define::{Field, FieldType, ModelSchema, Relationship};
use serde_json::{Map, Value, json};

use crate::errors::GeneratorError;
use crate::naming::{self, EndpointStyle};
use crate::registry::TemplateRef;

handlebars_helper!(title: |s: str| s.to_upper_camel_case());
handlebars_helper!(dasherize: |s: str| s.to_kebab_case());
handlebars_helper!(plural: |s: str| naming::pluralize(s));

/// How a stack spells the semantic field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeStyle {
    /// ember-data transforms; custom tags are used as transform names.
    EmberData,
    /// TypeScript annotations; custom tags are left untyped.
    TypeScript,
    /// Vuex ORM attribute builders (`this.string()`, ...); dates are plain attributes.
    VuexOrm,
    /// No type information is emitted.
    #[default]
    Untyped,
}

impl TypeStyle {
    fn builtin(self, field_type: &FieldType) -> Option<&str> {
        match (self, field_type) {
            (TypeStyle::Untyped, _) => None,
            (TypeStyle::EmberData, FieldType::Custom(name)) => Some(name),
            (TypeStyle::EmberData, other) => Some(other.tag()),
            (TypeStyle::TypeScript, FieldType::Date) => Some("Date"),
            (TypeStyle::TypeScript, FieldType::Custom(_)) => None,
            (TypeStyle::TypeScript, other) => Some(other.tag()),
            (TypeStyle::VuexOrm, FieldType::Date | FieldType::Custom(_)) => None,
            (TypeStyle::VuexOrm, other) => Some(other.tag()),
        }
    }
}

/// Maps semantic field types to a stack's type names.
///
/// Overrides are keyed by type tag and win over the style; an empty override
/// leaves the field untyped.
///
/// ```
/// use modelport_define::FieldType;
/// use modelport_gen::render::{TypeMapper, TypeStyle};
///
/// let mapper = TypeMapper::new(TypeStyle::TypeScript)
///     .with_override("money", "number");
/// assert_eq!(mapper.map(Some(&FieldType::Date)).as_deref(), Some("Date"));
/// assert_eq!(mapper.map(Some(&FieldType::from("money".to_string()))).as_deref(), Some("number"));
/// assert_eq!(mapper.map(None), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMapper {
    style: TypeStyle,
    overrides: BTreeMap<String, String>,
}

impl TypeMapper {
    pub fn new(style: TypeStyle) -> Self {
        Self {
            style,
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, tag: impl Into<String>, target: impl Into<String>) -> Self {
        self.overrides.insert(tag.into(), target.into());
        self
    }

    pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> Self {
        self.overrides
            .extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn map(&self, field_type: Option<&FieldType>) -> Option<String> {
        let field_type = field_type?;
        match self.overrides.get(field_type.tag()) {
            Some(target) if target.is_empty() => None,
            Some(target) => Some(target.clone()),
            None => self.style.builtin(field_type).map(str::to_string),
        }
    }
}

/// Auxiliary bindings for one render call.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    types: TypeMapper,
    endpoint_style: EndpointStyle,
    values: Map<String, Value>,
}

impl RenderContext {
    pub fn new(types: TypeMapper, endpoint_style: EndpointStyle) -> Self {
        Self {
            types,
            endpoint_style,
            values: Map::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn types(&self) -> &TypeMapper {
        &self.types
    }
}

/// Entry of an aggregate's `items` list.
///
/// ```
/// use modelport_define::ModelSchema;
/// use modelport_gen::render::item_binding;
///
/// let schema = ModelSchema::builder("blog", "post").endpoint("blog/posts").build().unwrap();
/// let item = item_binding(&schema, "./post").unwrap();
/// assert_eq!(item["class_name"], "BlogPost");
/// assert_eq!(item["import_path"], "./post");
/// ```
pub fn item_binding(schema: &ModelSchema, import_path: &str) -> Result<Value, GeneratorError> {
    Ok(json!({
        "application_name": schema.application_name(),
        "model_name": schema.model_name(),
        "class_name": naming::class_name(schema.application_name(), schema.model_name())?,
        "endpoint": schema.endpoint(),
        "import_path": import_path,
    }))
}

/// Handlebars engine holding every registered template.
pub struct Renderer {
    engine: Handlebars<'static>,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.engine.get_templates().keys().collect();
        names.sort();
        f.debug_struct("Renderer").field("templates", &names).finish()
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        let mut engine = Handlebars::new();
        engine.set_strict_mode(true);
        engine.register_escape_fn(handlebars::no_escape);
        engine.register_helper("title", Box::new(title));
        engine.register_helper("dasherize", Box::new(dasherize));
        engine.register_helper("plural", Box::new(plural));
        Self { engine }
    }

    /// Parses and registers a template body.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::TemplateSyntaxError` when the body is malformed.
    pub fn register(&mut self, name: &str, body: &str) -> Result<(), GeneratorError> {
        self.engine
            .register_template_string(name, body)
            .map_err(|e| GeneratorError::TemplateSyntaxError {
                template: name.to_string(),
                message: e.to_string(),
            })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.engine.has_template(name)
    }

    /// Renders a per-model template.
    ///
    /// ## Errors
    ///
    /// - `MissingContextKey` when the template names an absent binding
    /// - `Render` when the template is not registered or a helper fails
    /// - `InvalidIdentifier` when the schema names cannot form identifiers
    pub fn render(
        &self,
        template: &TemplateRef,
        schema: &ModelSchema,
        context: &RenderContext,
    ) -> Result<String, GeneratorError> {
        let mut data = context.values.clone();
        data.entry("pagination_container").or_insert(Value::Null);
        for (key, value) in schema_bindings(schema, context)? {
            data.insert(key, value);
        }
        self.render_data(template, &Value::Object(data))
    }

    /// Renders an aggregate or support template from the context alone.
    pub fn render_aggregate(
        &self,
        template: &TemplateRef,
        context: &RenderContext,
    ) -> Result<String, GeneratorError> {
        let mut data = context.values.clone();
        data.entry("pagination_container").or_insert(Value::Null);
        self.render_data(template, &Value::Object(data))
    }

    fn render_data(&self, template: &TemplateRef, data: &Value) -> Result<String, GeneratorError> {
        self.engine
            .render(template.name(), data)
            .map_err(|e| render_error(template, e))
    }
}

fn render_error(template: &TemplateRef, error: RenderError) -> GeneratorError {
    match error.reason() {
        RenderErrorReason::MissingVariable(path) => GeneratorError::MissingContextKey {
            template: template.name().to_string(),
            key: path.clone().unwrap_or_else(|| "<unknown>".to_string()),
        },
        _ => GeneratorError::Render {
            template: template.name().to_string(),
            message: error.to_string(),
        },
    }
}

fn schema_bindings(
    schema: &ModelSchema,
    context: &RenderContext,
) -> Result<Map<String, Value>, GeneratorError> {
    let mut data = Map::new();
    data.insert("application_name".into(), schema.application_name().into());
    data.insert("model_name".into(), schema.model_name().into());
    data.insert(
        "class_name".into(),
        naming::class_name(schema.application_name(), schema.model_name())?.into(),
    );
    data.insert("endpoint".into(), schema.endpoint().into());

    if let Some(base) = context.get("api_base").and_then(Value::as_str) {
        let url = naming::endpoint_path(base, schema.endpoint(), &context.endpoint_style)?;
        data.insert("endpoint_url".into(), url.into());
    }
    if let Some(container) = schema.pagination_container() {
        data.insert("pagination_container".into(), container.into());
    }

    let mut kinds: Vec<String> = Vec::new();
    for relationship in schema.relationships() {
        let kind = relationship.kind.to_string();
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    data.insert(
        "has_relationships".into(),
        (!schema.relationships().is_empty()).into(),
    );
    data.insert("relationship_kinds".into(), kinds.into());

    let fields = schema
        .fields()
        .iter()
        .map(|field| field_binding(field, context.types()))
        .collect::<Result<Vec<_>, _>>()?;
    data.insert("fields".into(), Value::Array(fields));

    let target_app = context.get("target_app").and_then(Value::as_str);
    let relationships = schema
        .relationships()
        .iter()
        .map(|relationship| relationship_binding(relationship, target_app))
        .collect::<Result<Vec<_>, _>>()?;
    data.insert("relationships".into(), Value::Array(relationships));

    Ok(data)
}

fn field_binding(field: &Field, types: &TypeMapper) -> Result<Value, GeneratorError> {
    let default = field
        .default
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| GeneratorError::Render {
            template: field.name.clone(),
            message: format!("default is not a JSON literal: {e}"),
        })?;

    Ok(json!({
        "name": field.name,
        "type": types.map(field.field_type.as_ref()),
        "has_default": field.has_default(),
        "default": default,
    }))
}

fn relationship_binding(
    relationship: &Relationship,
    target_app: Option<&str>,
) -> Result<Value, GeneratorError> {
    let app = target_app.unwrap_or(relationship.app.as_str());
    Ok(json!({
        "name": relationship.name,
        "kind": relationship.kind.to_string(),
        "app": app,
        "related_model": relationship.related_model,
        "related_class": naming::class_name(app, &relationship.related_model)?,
        "inverse": relationship.inverse,
        "many": relationship.kind.is_collection(),
    }))
}
