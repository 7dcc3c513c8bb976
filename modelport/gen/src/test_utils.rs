//! Shared test fixtures for modelport-gen unit tests.

use modelport_define::{Field, FieldType, ModelSchema, Relationship, SchemaSet};
use serde_json::json;

use crate::registry::TemplateRegistry;
use crate::render::Renderer;

/// `blog/post` with typed fields, two defaults and one relationship of each kind.
pub fn blog_post() -> ModelSchema {
    ModelSchema::builder("blog", "post")
        .endpoint("blog/posts")
        .pagination_container("results")
        .field(Field::new("title").with_type(FieldType::String))
        .field(Field::new("body").with_default(json!("")))
        .field(
            Field::new("draft")
                .with_type(FieldType::Boolean)
                .with_default(json!(true)),
        )
        .relationship(Relationship::belongs_to("author", "blog", "user").with_inverse("posts"))
        .relationship(Relationship::has_many("comments", "blog", "comment"))
        .build()
        .expect("valid fixture")
}

/// `blog/user` without relationships.
pub fn blog_user() -> ModelSchema {
    ModelSchema::builder("blog", "user")
        .endpoint("blog/users")
        .field(Field::new("name").with_type(FieldType::String))
        .build()
        .expect("valid fixture")
}

/// `shop/item`, a model of a second application.
pub fn shop_item() -> ModelSchema {
    ModelSchema::builder("shop", "item")
        .endpoint("shop/items")
        .field(Field::new("price").with_type(FieldType::Number).with_default(json!(0)))
        .build()
        .expect("valid fixture")
}

/// `blog/post`, `blog/user` and `shop/item` in that order.
pub fn blog_set() -> SchemaSet {
    SchemaSet::new(vec![blog_post(), blog_user(), shop_item()]).expect("valid fixture")
}

/// Renderer with a single template registered under `name`.
pub fn registered(name: &str, body: &str) -> Renderer {
    let mut renderer = Renderer::new();
    renderer.register(name, body).expect("valid template");
    renderer
}

/// Built-in registry whose ember base model references an unsupplied binding.
pub fn broken_registry() -> TemplateRegistry {
    TemplateRegistry::builder()
        .builtin()
        .expect("builtin stacks")
        .template("ember/model_base.js", "{{ember_namespace}}")
        .build()
        .expect("valid registry")
}
