//! Rewrites `oneOf` entities as unions of their members.
//!
//! The backbone emits an empty placeholder interface for every `oneOf`
//! entity. This plugin replaces it with `type Shape = Circle | Square;` and,
//! when the schema declares a discriminator, narrows the discriminator
//! property of every member interface to its string literal.

use super::{Plugin, SharedStorage};
use crate::codegen::ast::{Property, SourceFile, Statement, TsType, TypeAliasDeclaration};
use crate::codegen::utils::simple_name;
use crate::dependency::{entity_file, DependencyManager};
use crate::document::{ComposedMode, NodeKind, ReferenceResolver, SchemaNode};
use crate::error::Result;
use crate::processors::{Nullability, TypeEnv, TypeSchemaProcessor};
use openapiv3::{Discriminator, ReferenceOr, Schema};

pub const PATH: &str = "subtypes";

pub struct SubTypesPlugin;

impl Plugin for SubTypesPlugin {
    fn name(&self) -> &str {
        "SubTypesPlugin"
    }

    fn path(&self) -> &str {
        PATH
    }

    fn execute(&self, storage: &mut SharedStorage<'_>) -> Result<()> {
        let components: Vec<_> = storage.resolver.components().collect();

        for (name, component) in components {
            let node = SchemaNode::new(component);
            let NodeKind::Composed {
                mode: ComposedMode::OneOf,
                members,
            } = node.kind()
            else {
                continue;
            };
            let Some(id) = storage.sources.find(&entity_file(name)) else {
                tracing::debug!(entity = name, "no entity file to rewrite");
                continue;
            };

            let union = union_file(storage, name, component);
            storage.sources.replace(id, union);

            if let Some(discriminator) = node
                .schema()
                .and_then(|schema| schema.schema_data.discriminator.as_ref())
            {
                for member in members {
                    narrow_member(storage, discriminator, member);
                }
            }
        }

        Ok(())
    }
}

fn union_file(storage: &SharedStorage<'_>, name: &str, component: &ReferenceOr<Schema>) -> SourceFile {
    let file_name = entity_file(name);
    let mut dependencies = DependencyManager::new(storage.options.paths());
    let local = dependencies.mint(simple_name(name));

    let ty = TypeSchemaProcessor::new(&storage.resolver, &mut dependencies, &file_name)
        .with_own_entity(name, &local)
        .process(component, &TypeEnv::root(), Nullability::NonNull);

    let declaration = Statement::TypeAlias(TypeAliasDeclaration {
        name: local.clone(),
        type_params: Vec::new(),
        ty,
    });
    dependencies.exports.set_default(local);
    dependencies.assemble(file_name, vec![declaration])
}

/// Tag value of one member: the mapping key pointing at it, else the
/// member's simple name.
fn discriminator_value<'d>(discriminator: &'d Discriminator, reference: &str, entity: &'d str) -> &'d str {
    discriminator
        .mapping
        .iter()
        .find(|(_, target)| *target == reference || *target == entity)
        .map(|(key, _)| key.as_str())
        .unwrap_or_else(|| simple_name(entity))
}

fn narrow_member(storage: &mut SharedStorage<'_>, discriminator: &Discriminator, member: &ReferenceOr<Schema>) {
    let ReferenceOr::Reference { reference } = member else {
        tracing::warn!("inline union members cannot carry a discriminator");
        return;
    };
    let Some(entity) = ReferenceResolver::entity_name(reference) else {
        return;
    };
    let Some(id) = storage.sources.find(&entity_file(entity)) else {
        return;
    };
    let Some(file) = storage.sources.get(id) else {
        return;
    };

    let value = discriminator_value(discriminator, reference, entity);
    let property = &discriminator.property_name;
    let mut patched = file.clone();
    let mut found = false;

    for statement in &mut patched.statements {
        let Statement::Interface(interface) = statement else {
            continue;
        };
        found = true;
        let tag = Property {
            name: property.clone(),
            ty: TsType::string_literal(value),
            optional: false,
        };
        match interface.properties.iter_mut().find(|p| p.name == *property) {
            Some(existing) => *existing = tag,
            None => interface.properties.insert(0, tag),
        }
    }

    if found {
        storage.sources.replace(id, patched);
    } else {
        tracing::warn!(entity, "union member is not an interface, discriminator left as is");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::print;
    use crate::document::bundle;
    use crate::plugins::{BackbonePlugin, GenerationOptions};

    const DOCUMENT: &str = r##"{
      "openapi": "3.0.1",
      "info": { "title": "Shapes", "version": "1" },
      "paths": {},
      "components": {
        "schemas": {
          "com.example.Shape": {
            "oneOf": [
              { "$ref": "#/components/schemas/com.example.Circle" },
              { "$ref": "#/components/schemas/com.example.Square" }
            ],
            "discriminator": {
              "propertyName": "@type",
              "mapping": { "circle": "#/components/schemas/com.example.Circle" }
            }
          },
          "com.example.Circle": {
            "type": "object",
            "properties": { "@type": { "type": "string" }, "radius": { "type": "number" } },
            "required": ["radius"]
          },
          "com.example.Square": {
            "type": "object",
            "properties": { "side": { "type": "number" } },
            "required": ["side"]
          }
        }
      }
    }"##;

    fn run(api: &openapiv3::OpenAPI) -> SharedStorage<'_> {
        let mut storage = SharedStorage::new(api, GenerationOptions::default());
        BackbonePlugin.execute(&mut storage).unwrap();
        SubTypesPlugin.execute(&mut storage).unwrap();
        storage
    }

    fn text(storage: &SharedStorage<'_>, name: &str) -> String {
        let id = storage.sources.find(name).unwrap();
        print(storage.sources.get(id).unwrap())
    }

    #[test]
    fn test_union_alias() {
        let bundle = bundle(DOCUMENT).unwrap();
        let storage = run(&bundle.api);
        assert_eq!(
            text(&storage, "com/example/Shape.ts"),
            "import type Circle from \"./Circle.js\";\nimport type Square from \"./Square.js\";\n\ntype Shape = Circle | Square;\n\nexport default Shape;\n"
        );
    }

    #[test]
    fn test_discriminator_narrowing() {
        let bundle = bundle(DOCUMENT).unwrap();
        let storage = run(&bundle.api);
        assert_eq!(
            text(&storage, "com/example/Circle.ts"),
            "interface Circle {\n    \"@type\": \"circle\";\n    radius: number;\n}\n\nexport default Circle;\n"
        );
        assert_eq!(
            text(&storage, "com/example/Square.ts"),
            "interface Square {\n    \"@type\": \"Square\";\n    side: number;\n}\n\nexport default Square;\n"
        );
    }

    #[test]
    fn test_without_backbone_is_noop() {
        let bundle = bundle(DOCUMENT).unwrap();
        let mut storage = SharedStorage::new(&bundle.api, GenerationOptions::default());
        SubTypesPlugin.execute(&mut storage).unwrap();
        assert!(storage.sources.is_empty());
    }
}
