//! Built-in target stacks.

use crate::errors::GeneratorError;
use crate::naming::EndpointStyle;
use crate::render::TypeStyle;

use super::{
    ArtifactKind, ArtifactScope, Registration, StackId, TargetStackDescriptor, WritePolicy,
};

macro_rules! builtin {
    ($($name:literal => $file:literal),* $(,)?) => {
        &[$(($name, include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/", $file)))),*]
    };
}

const TEMPLATES: &[(&str, &str)] = builtin![
    "ember/model_base.js" => "ember/model_base.js.hbs",
    "ember/model.js" => "ember/model.js.hbs",
    "ember/test.js" => "ember/test.js.hbs",
    "ember/index.js" => "ember/index.js.hbs",
    "ember-dynamic/model.js" => "ember-dynamic/model.js.hbs",
    "mobx-axios/model_base.js" => "mobx-axios/model_base.js.hbs",
    "mobx-axios/model.js" => "mobx-axios/model.js.hbs",
    "mobx-axios/store.js" => "mobx-axios/store.js.hbs",
    "mobx-axios/base_model.js" => "mobx-axios/base_model.js.hbs",
    "mobx-axios/base_store.js" => "mobx-axios/base_store.js.hbs",
    "mobx-axios/http.js" => "mobx-axios/http.js.hbs",
    "vuexorm-axios/model_base.js" => "vuexorm-axios/model_base.js.hbs",
    "vuexorm-axios/model.js" => "vuexorm-axios/model.js.hbs",
    "vuexorm-axios/base_model.js" => "vuexorm-axios/base_model.js.hbs",
    "vuexorm-axios/http.js" => "vuexorm-axios/http.js.hbs",
    "vuexorm-axios/database.js" => "vuexorm-axios/database.js.hbs",
    "angular2/model_base.ts" => "angular2/model_base.ts.hbs",
    "angular2/model.ts" => "angular2/model.ts.hbs",
    "angular2/service.ts" => "angular2/service.ts.hbs",
    "angular/service.js" => "angular/service.js.hbs",
];

/// Template bodies shipped with the crate, keyed by template name.
pub fn builtin_templates() -> &'static [(&'static str, &'static str)] {
    TEMPLATES
}

/// Descriptors of every built-in stack, in [`StackId`] order.
pub fn builtin_stacks() -> Result<Vec<TargetStackDescriptor>, GeneratorError> {
    Ok(vec![
        ember()?,
        ember_dynamic()?,
        mobx_axios()?,
        vuexorm_axios()?,
        angular2()?,
        angular_resource()?,
    ])
}

fn ember() -> Result<TargetStackDescriptor, GeneratorError> {
    use ArtifactKind::*;

    Ok(TargetStackDescriptor {
        id: StackId::Ember,
        description: "ember-data models, editable stubs, unit tests and per-application indexes",
        type_style: TypeStyle::EmberData,
        endpoint_style: EndpointStyle::default(),
        artifacts: vec![
            Registration::per_model(
                ModelBase,
                "ember/model_base.js",
                "app/models/base/{app_dash}/{model_dash}.js",
                WritePolicy::Regenerate,
            )?,
            Registration::per_model(
                Model,
                "ember/model.js",
                "app/models/{app_dash}/{model_dash}.js",
                WritePolicy::Scaffold,
            )?,
            Registration::per_model(
                Test,
                "ember/test.js",
                "tests/unit/models/{app_dash}/{model_dash}-test.js",
                WritePolicy::Companion,
            )?,
            Registration::aggregate(
                Index,
                ArtifactScope::Application,
                "ember/index.js",
                "app/models/{app_dash}/index.js",
                "./{model_dash}",
            )?,
        ],
    })
}

fn ember_dynamic() -> Result<TargetStackDescriptor, GeneratorError> {
    Ok(TargetStackDescriptor {
        id: StackId::EmberDynamic,
        description: "ember-data AMD modules for runtime loading",
        type_style: TypeStyle::EmberData,
        endpoint_style: EndpointStyle::default(),
        artifacts: vec![Registration::per_model(
            ArtifactKind::Model,
            "ember-dynamic/model.js",
            "{app}/{model}.js",
            WritePolicy::Regenerate,
        )?],
    })
}

fn mobx_axios() -> Result<TargetStackDescriptor, GeneratorError> {
    use ArtifactKind::*;

    Ok(TargetStackDescriptor {
        id: StackId::MobxAxios,
        description: "MobX observable models with axios-backed stores",
        type_style: TypeStyle::Untyped,
        endpoint_style: EndpointStyle::default(),
        artifacts: vec![
            Registration::per_model(
                ModelBase,
                "mobx-axios/model_base.js",
                "src/models/base/{app}{model}.js",
                WritePolicy::Regenerate,
            )?,
            Registration::per_model(
                Model,
                "mobx-axios/model.js",
                "src/models/{app}{model}.js",
                WritePolicy::Scaffold,
            )?,
            Registration::per_model(
                Store,
                "mobx-axios/store.js",
                "src/stores/{app}{model}.js",
                WritePolicy::Regenerate,
            )?,
            Registration::support(
                BaseModel,
                "mobx-axios/base_model.js",
                "src/models/base/_base.js",
            )?,
            Registration::support(BaseStore, "mobx-axios/base_store.js", "src/stores/_base.js")?,
            Registration::support(Http, "mobx-axios/http.js", "src/config/axios-config.js")?,
        ],
    })
}

fn vuexorm_axios() -> Result<TargetStackDescriptor, GeneratorError> {
    use ArtifactKind::*;

    Ok(TargetStackDescriptor {
        id: StackId::VuexOrmAxios,
        description: "Vuex ORM models registered in a single database module",
        type_style: TypeStyle::VuexOrm,
        endpoint_style: EndpointStyle::default(),
        artifacts: vec![
            Registration::per_model(
                ModelBase,
                "vuexorm-axios/model_base.js",
                "src/models/base/{app}/{model}.js",
                WritePolicy::Regenerate,
            )?,
            Registration::per_model(
                Model,
                "vuexorm-axios/model.js",
                "src/models/{app}/{model}.js",
                WritePolicy::Scaffold,
            )?,
            Registration::support(BaseModel, "vuexorm-axios/base_model.js", "src/models/Base.js")?,
            Registration::support(Http, "vuexorm-axios/http.js", "src/store/http.js")?,
            Registration::aggregate(
                Index,
                ArtifactScope::Run,
                "vuexorm-axios/database.js",
                "src/store/database.js",
                "@/models/{app}/{model}",
            )?,
        ],
    })
}

fn angular2() -> Result<TargetStackDescriptor, GeneratorError> {
    use ArtifactKind::*;

    Ok(TargetStackDescriptor {
        id: StackId::Angular2,
        description: "Angular typed models and HTTP services",
        type_style: TypeStyle::TypeScript,
        endpoint_style: EndpointStyle {
            suffix: None,
            trailing_slash: true,
        },
        artifacts: vec![
            Registration::per_model(
                ModelBase,
                "angular2/model_base.ts",
                "src/app/{app}/{model}.base.ts",
                WritePolicy::Regenerate,
            )?,
            Registration::per_model(
                Model,
                "angular2/model.ts",
                "src/app/{app}/{model}.ts",
                WritePolicy::Scaffold,
            )?,
            Registration::per_model(
                Service,
                "angular2/service.ts",
                "src/app/{app}/{model}.service.ts",
                WritePolicy::Regenerate,
            )?,
        ],
    })
}

fn angular_resource() -> Result<TargetStackDescriptor, GeneratorError> {
    Ok(TargetStackDescriptor {
        id: StackId::AngularResource,
        description: "AngularJS $resource services",
        type_style: TypeStyle::Untyped,
        endpoint_style: EndpointStyle::default(),
        artifacts: vec![Registration::per_model(
            ArtifactKind::Service,
            "angular/service.js",
            "src/resources/{app}-{model}.js",
            WritePolicy::Regenerate,
        )?],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn stacks_are_listed_in_identifier_order() {
        let ids: Vec<_> = builtin_stacks().unwrap().iter().map(|s| s.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn every_referenced_template_ships_a_body() {
        let names: HashSet<_> = builtin_templates().iter().map(|(name, _)| *name).collect();
        for stack in builtin_stacks().unwrap() {
            for artifact in &stack.artifacts {
                assert!(
                    names.contains(artifact.template.name()),
                    "{} has no body",
                    artifact.template
                );
            }
        }
    }

    #[test]
    fn editable_stubs_are_scaffolded() {
        for stack in builtin_stacks().unwrap() {
            for artifact in &stack.artifacts {
                let expected = match artifact.kind {
                    ArtifactKind::Model if stack.id != StackId::EmberDynamic => {
                        WritePolicy::Scaffold
                    }
                    ArtifactKind::Test => WritePolicy::Companion,
                    _ => WritePolicy::Regenerate,
                };
                assert_eq!(artifact.policy, expected, "{}:{}", stack.id, artifact.kind);
            }
        }
    }
}
