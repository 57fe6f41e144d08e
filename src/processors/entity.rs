//! Entity declarations: one file per component schema.

use super::type_schema::{Nullability, TypeEnv, TypeSchemaProcessor};
use crate::codegen::ast::{
    EnumDeclaration, InterfaceDeclaration, Property, SourceFile, Statement, TsType,
    TypeAliasDeclaration, TypeParam,
};
use crate::codegen::utils::simple_name;
use crate::dependency::{entity_file, DependencyManager};
use crate::document::{ComposedMode, NodeKind, SchemaNode};
use crate::plugins::SharedStorage;
use indexmap::IndexMap;
use openapiv3::{ReferenceOr, Schema};

pub struct EntityProcessor<'s, 'a> {
    storage: &'s SharedStorage<'a>,
    name: &'a str,
    component: &'a ReferenceOr<Schema>,
}

impl<'s, 'a> EntityProcessor<'s, 'a> {
    pub fn new(storage: &'s SharedStorage<'a>, name: &'a str, component: &'a ReferenceOr<Schema>) -> Self {
        Self {
            storage,
            name,
            component,
        }
    }

    pub fn process(&self) -> SourceFile {
        let file_name = entity_file(self.name);
        let local = simple_name(self.name).to_string();
        let mut dependencies = DependencyManager::new(self.storage.options.paths());
        let local = dependencies.mint(&local);

        let node = SchemaNode::new(self.component);
        let type_params: Vec<TypeParam> = node
            .type_parameter_names()
            .into_iter()
            .map(TypeParam::named)
            .collect();
        for param in &type_params {
            dependencies.reserve(&param.name);
        }

        let root = TypeEnv::root();
        let env = root.extend(
            type_params
                .iter()
                .map(|param| (param.name.clone(), TsType::reference(param.name.clone()))),
        );

        let mut processor = TypeSchemaProcessor::new(&self.storage.resolver, &mut dependencies, &file_name)
            .with_own_entity(self.name, &local);

        let declaration = match node.kind() {
            NodeKind::Enum(values) => Statement::Enum(EnumDeclaration {
                name: local.clone(),
                members: values.into_iter().map(|value| (value.clone(), value)).collect(),
            }),
            NodeKind::Object {
                properties,
                required,
            } => Statement::Interface(InterfaceDeclaration {
                name: local.clone(),
                type_params,
                extends: Vec::new(),
                properties: lower_properties(&mut processor, properties, required, &env),
            }),
            NodeKind::Composed {
                mode: ComposedMode::AllOf,
                members,
            } => match inherit(&mut processor, members, &env) {
                Some((extends, properties)) => Statement::Interface(InterfaceDeclaration {
                    name: local.clone(),
                    type_params,
                    extends,
                    properties,
                }),
                None => alias(&mut processor, node, &local, type_params, &env),
            },
            // Replaced by a union alias when the subtypes plugin runs.
            NodeKind::Composed {
                mode: ComposedMode::OneOf,
                ..
            } => Statement::Interface(InterfaceDeclaration {
                name: local.clone(),
                type_params,
                extends: Vec::new(),
                properties: Vec::new(),
            }),
            _ => alias(&mut processor, node, &local, type_params, &env),
        };

        dependencies.exports.set_default(local);
        dependencies.assemble(file_name, vec![declaration])
    }
}

pub(crate) fn lower_properties(
    processor: &mut TypeSchemaProcessor<'_, '_>,
    properties: &IndexMap<String, ReferenceOr<Box<Schema>>>,
    required: &[String],
    env: &TypeEnv<'_>,
) -> Vec<Property> {
    properties
        .iter()
        .map(|(name, schema)| {
            let policy = if required.contains(name) {
                Nullability::NonNull
            } else {
                Nullability::FromSchema
            };
            let ty = processor.process(schema, env, policy);
            Property {
                name: name.clone(),
                optional: ty.is_nullable(),
                ty,
            }
        })
        .collect()
}

/// Splits an `allOf` into referenced parents and inline properties. Returns
/// `None` when a member is neither.
fn inherit(
    processor: &mut TypeSchemaProcessor<'_, '_>,
    members: &[ReferenceOr<Schema>],
    env: &TypeEnv<'_>,
) -> Option<(Vec<TsType>, Vec<Property>)> {
    let mut extends = Vec::new();
    let mut properties = Vec::new();

    for member in members {
        let node = SchemaNode::new(member);
        match node.kind() {
            NodeKind::Reference(_) => {
                extends.push(processor.process(member, env, Nullability::NonNull));
            }
            NodeKind::Object {
                properties: own,
                required,
            } => properties.extend(lower_properties(processor, own, required, env)),
            _ => return None,
        }
    }

    Some((extends, properties))
}

fn alias(
    processor: &mut TypeSchemaProcessor<'_, '_>,
    node: SchemaNode<'_>,
    local: &str,
    type_params: Vec<TypeParam>,
    env: &TypeEnv<'_>,
) -> Statement {
    Statement::TypeAlias(TypeAliasDeclaration {
        name: local.to_string(),
        type_params,
        ty: processor.process(node.raw(), env, Nullability::NonNull),
    })
}
