//! Schema-to-type lowering.
//!
//! [`TypeSchemaProcessor::process`] turns one schema node into a TypeScript
//! type expression. Component references become type-only default imports of
//! the entity file, registered on the file's [`DependencyManager`] as a side
//! effect.

use crate::codegen::ast::{Keyword, Property, TsType};
use crate::codegen::utils::simple_name;
use crate::dependency::{entity_file, DependencyManager};
use crate::document::{ComposedMode, NodeKind, PrimitiveKind, ReferenceResolver, SchemaNode, SchemaRef};
use openapiv3::{ReferenceOr, Schema};

/// Whether the outermost type may be unioned with `undefined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
    /// Follow `nullable` and `x-annotations` on the schema.
    FromSchema,
    NonNull,
}

/// Bindings of generic parameter names to type expressions.
///
/// Environments are immutable; [`TypeEnv::extend`] links a child scope to
/// its parent.
#[derive(Debug, Default)]
pub struct TypeEnv<'p> {
    parent: Option<&'p TypeEnv<'p>>,
    bindings: Vec<(String, TsType)>,
}

impl<'p> TypeEnv<'p> {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn extend(&'p self, bindings: impl IntoIterator<Item = (String, TsType)>) -> TypeEnv<'p> {
        TypeEnv {
            parent: Some(self),
            bindings: bindings.into_iter().collect(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&TsType> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, ty)| ty)
            .or_else(|| self.parent.and_then(|parent| parent.lookup(name)))
    }
}

/// Lowers schemas for one generated file.
pub struct TypeSchemaProcessor<'s, 'a> {
    resolver: &'s ReferenceResolver<'a>,
    dependencies: &'s mut DependencyManager,
    file: &'s str,
    /// Fully-qualified entity declared by the file and its local name.
    own_entity: Option<(&'s str, &'s str)>,
}

impl<'s, 'a> TypeSchemaProcessor<'s, 'a> {
    pub fn new(
        resolver: &'s ReferenceResolver<'a>,
        dependencies: &'s mut DependencyManager,
        file: &'s str,
    ) -> Self {
        Self {
            resolver,
            dependencies,
            file,
            own_entity: None,
        }
    }

    /// Declares that the file defines `entity` under `local_name`; references
    /// to it are emitted without an import.
    pub fn with_own_entity(mut self, entity: &'s str, local_name: &'s str) -> Self {
        self.own_entity = Some((entity, local_name));
        self
    }

    pub fn process<'n>(
        &mut self,
        node: impl Into<SchemaRef<'n>>,
        env: &TypeEnv<'_>,
        nullability: Nullability,
    ) -> TsType {
        let node = SchemaNode::new(node);
        let (ty, nullable) = self.lower(node, env, &[]);
        if nullable && nullability == Nullability::FromSchema && !node.is_non_null_annotated() {
            ty.nullable()
        } else {
            ty
        }
    }

    /// Returns the bare type and whether the schema asks for nullability.
    ///
    /// `outer_args` are use-site type arguments carried by a wrapper around
    /// a reference.
    fn lower<'n>(
        &mut self,
        node: SchemaNode<'n>,
        env: &TypeEnv<'_>,
        outer_args: &[TsType],
    ) -> (TsType, bool) {
        let nullable = node.is_nullable();

        let ty = match node.kind() {
            NodeKind::Reference(reference) => {
                let args = if outer_args.is_empty() {
                    self.type_arguments(node, env)
                } else {
                    outer_args.to_vec()
                };
                self.reference(reference, args)
            }
            NodeKind::Primitive(kind) => primitive(kind),
            NodeKind::Enum(_) => TsType::keyword(Keyword::String),
            NodeKind::Array(items) => {
                let item = match items {
                    Some(items) => self.process(items, env, Nullability::FromSchema),
                    None => TsType::keyword(Keyword::Unknown),
                };
                TsType::Array(Box::new(item))
            }
            NodeKind::Map(values) => {
                let value = match values {
                    Some(values) => self.process(values, env, Nullability::FromSchema),
                    None => TsType::keyword(Keyword::Unknown),
                };
                TsType::Record(Box::new(value))
            }
            NodeKind::Object {
                properties,
                required,
            } => {
                if properties.is_empty() {
                    TsType::Record(Box::new(TsType::keyword(Keyword::Unknown)))
                } else {
                    TsType::TypeLiteral(
                        properties
                            .iter()
                            .map(|(name, schema)| {
                                let policy = if required.contains(name) {
                                    Nullability::NonNull
                                } else {
                                    Nullability::FromSchema
                                };
                                let ty = self.process(schema, env, policy);
                                Property {
                                    name: name.clone(),
                                    optional: ty.is_nullable(),
                                    ty,
                                }
                            })
                            .collect(),
                    )
                }
            }
            NodeKind::Composed { mode, members } => {
                return self.composed(node, mode, members, env, nullable);
            }
            NodeKind::TypeArgument(name) => match env.lookup(name) {
                Some(bound) => bound.clone(),
                None => {
                    tracing::warn!(file = self.file, parameter = name, "unbound type argument");
                    TsType::keyword(Keyword::Unknown)
                }
            },
            NodeKind::Null => TsType::UNDEFINED,
        };

        (ty, nullable)
    }

    fn composed<'n>(
        &mut self,
        node: SchemaNode<'n>,
        mode: ComposedMode,
        members: &'n [ReferenceOr<Schema>],
        env: &TypeEnv<'_>,
        nullable: bool,
    ) -> (TsType, bool) {
        let non_null: Vec<&ReferenceOr<Schema>> = members
            .iter()
            .filter(|member| !SchemaNode::new(*member).is_null_marker())
            .collect();
        let has_null_member = non_null.len() < members.len();

        match (mode, non_null.as_slice()) {
            (_, []) => (TsType::keyword(Keyword::Unknown), true),
            // Nullable wrapper: the single member, forced nullable.
            (ComposedMode::AnyOf, [member]) => {
                let args = self.type_arguments(node, env);
                let (ty, _) = self.lower(SchemaNode::new(*member), env, &args);
                (ty, true)
            }
            (ComposedMode::AllOf, [member]) => {
                let args = self.type_arguments(node, env);
                let (ty, member_nullable) = self.lower(SchemaNode::new(*member), env, &args);
                (ty, nullable || member_nullable)
            }
            (ComposedMode::OneOf, [member]) => {
                let (ty, member_nullable) = self.lower(SchemaNode::new(*member), env, &[]);
                (ty, nullable || member_nullable || has_null_member)
            }
            (ComposedMode::AllOf, many) => {
                let parts = many
                    .iter()
                    .map(|member| self.process(*member, env, Nullability::NonNull))
                    .collect();
                (TsType::Intersection(parts), nullable)
            }
            (ComposedMode::OneOf | ComposedMode::AnyOf, many) => {
                let parts: Vec<TsType> = many
                    .iter()
                    .map(|member| self.process(*member, env, Nullability::FromSchema))
                    .collect();
                (TsType::union(parts), nullable || has_null_member)
            }
        }
    }

    fn type_arguments(&mut self, node: SchemaNode<'_>, env: &TypeEnv<'_>) -> Vec<TsType> {
        node.type_parameters()
            .iter()
            .map(|argument| self.process(argument, env, Nullability::FromSchema))
            .collect()
    }

    fn reference(&mut self, reference: &str, args: Vec<TsType>) -> TsType {
        let Some(entity) = ReferenceResolver::entity_name(reference) else {
            tracing::warn!(file = self.file, reference, "reference outside component schemas");
            return TsType::keyword(Keyword::Unknown);
        };
        if let Err(e) = self.resolver.component(reference) {
            tracing::warn!(file = self.file, error = %e, "unresolvable reference");
            return TsType::keyword(Keyword::Unknown);
        }

        if let Some((own, local)) = self.own_entity {
            if own == entity {
                return TsType::generic(local, args);
            }
        }

        let module = self
            .dependencies
            .paths
            .module_path(&entity_file(entity), self.file);
        let id = self
            .dependencies
            .imports
            .add_default(&module, simple_name(entity), true);
        TsType::generic(id, args)
    }
}

fn primitive(kind: PrimitiveKind) -> TsType {
    TsType::keyword(match kind {
        PrimitiveKind::String => Keyword::String,
        PrimitiveKind::Number | PrimitiveKind::Integer => Keyword::Number,
        PrimitiveKind::Boolean => Keyword::Boolean,
        PrimitiveKind::Unknown => Keyword::Unknown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::Emit;
    use crate::document::bundle;
    use serde_json::{json, Value};

    const DOCUMENT: &str = r##"{
      "openapi": "3.0.1",
      "info": { "title": "Test", "version": "1" },
      "paths": {},
      "components": {
        "schemas": {
          "com.example.Foo": { "type": "object", "properties": {} },
          "com.example.Pair": {
            "type": "object",
            "x-type-parameters": [{ "x-type-argument": "K" }, { "x-type-argument": "V" }],
            "properties": { "key": { "x-type-argument": "K" } }
          },
          "com.other.Foo": { "type": "string", "enum": ["A"] },
          "com.example.Record": { "type": "object", "properties": { "id": { "type": "string" } } }
        }
      }
    }"##;

    fn lower(schema: Value, nullability: Nullability) -> (String, DependencyManager) {
        let bundle = bundle(DOCUMENT).unwrap();
        let resolver = ReferenceResolver::new(&bundle.api);
        let mut dependencies = DependencyManager::default();
        let schema: ReferenceOr<Schema> = serde_json::from_value(schema).unwrap();
        let ty = TypeSchemaProcessor::new(&resolver, &mut dependencies, "com/example/BarEndpoint.ts")
            .process(&schema, &TypeEnv::root(), nullability);
        (ty.emit(), dependencies)
    }

    fn emit(schema: Value) -> String {
        lower(schema, Nullability::FromSchema).0
    }

    #[test]
    fn test_primitives() {
        assert_eq!(emit(json!({ "type": "string" })), "string");
        assert_eq!(emit(json!({ "type": "integer", "format": "int64" })), "number");
        assert_eq!(emit(json!({ "type": "boolean", "nullable": true })), "boolean | undefined");
        assert_eq!(
            emit(json!({ "type": "string", "x-java-type": "java.time.LocalDate" })),
            "string"
        );
        assert_eq!(emit(json!({})), "unknown");
        assert_eq!(emit(json!({ "type": "string", "enum": ["A", "B"] })), "string");
    }

    #[test]
    fn test_collections() {
        assert_eq!(
            emit(json!({ "type": "array", "nullable": true, "items": { "type": "string", "nullable": true } })),
            "Array<string | undefined> | undefined"
        );
        assert_eq!(
            emit(json!({ "type": "object", "additionalProperties": { "type": "number" } })),
            "Record<string, number>"
        );
    }

    #[test]
    fn test_reference_imports_entity() {
        let (ty, dependencies) = lower(
            json!({ "nullable": true, "anyOf": [{ "$ref": "#/components/schemas/com.example.Foo" }] }),
            Nullability::FromSchema,
        );
        assert_eq!(ty, "Foo | undefined");
        assert_eq!(
            dependencies.imports.bindings().map(|b| b.module.as_str()).collect::<Vec<_>>(),
            ["./Foo.js"]
        );
    }

    #[test]
    fn test_colliding_entity_names_get_distinct_identifiers() {
        let (ty, _) = lower(
            json!({
                "oneOf": [
                    { "$ref": "#/components/schemas/com.example.Foo" },
                    { "$ref": "#/components/schemas/com.other.Foo" }
                ]
            }),
            Nullability::FromSchema,
        );
        assert_eq!(ty, "Foo | Foo_1");
    }

    #[test]
    fn test_entity_named_like_a_global_is_renamed() {
        let (ty, dependencies) = lower(
            json!({
                "oneOf": [
                    { "$ref": "#/components/schemas/com.example.Record" },
                    { "type": "object", "additionalProperties": { "type": "number" } }
                ]
            }),
            Nullability::FromSchema,
        );
        assert_eq!(ty, "Record_1 | Record<string, number>");
        assert_eq!(
            dependencies.imports.bindings().map(|b| b.id.as_str()).collect::<Vec<_>>(),
            ["Record_1"]
        );
    }

    #[test]
    fn test_nullability_policy() {
        let nullable = json!({ "type": "string", "nullable": true });
        assert_eq!(lower(nullable.clone(), Nullability::NonNull).0, "string");

        let annotated = json!({
            "type": "string",
            "nullable": true,
            "x-annotations": [{ "name": "org.jspecify.annotations.NonNull" }]
        });
        assert_eq!(emit(annotated), "string");

        let doubled = json!({ "nullable": true, "anyOf": [{ "type": "string", "nullable": true }] });
        assert_eq!(emit(doubled), "string | undefined");
    }

    #[test]
    fn test_use_site_type_arguments() {
        let ty = emit(json!({
            "anyOf": [{ "$ref": "#/components/schemas/com.example.Pair" }],
            "nullable": true,
            "x-type-parameters": [{ "type": "string" }, { "type": "integer" }]
        }));
        assert_eq!(ty, "Pair<string, number> | undefined");
    }

    #[test]
    fn test_type_argument_markers() {
        let bundle = bundle(DOCUMENT).unwrap();
        let resolver = ReferenceResolver::new(&bundle.api);
        let mut dependencies = DependencyManager::default();
        let marker: ReferenceOr<Schema> =
            serde_json::from_value(json!({ "x-type-argument": "K" })).unwrap();

        let root = TypeEnv::root();
        let scope = root.extend([("K".to_string(), TsType::reference("K"))]);
        let mut processor = TypeSchemaProcessor::new(&resolver, &mut dependencies, "Pair.ts");
        assert_eq!(
            processor.process(&marker, &scope, Nullability::FromSchema).emit(),
            "K"
        );
        assert_eq!(
            processor.process(&marker, &root, Nullability::FromSchema).emit(),
            "unknown"
        );
    }

    #[test]
    fn test_self_reference_needs_no_import() {
        let bundle = bundle(DOCUMENT).unwrap();
        let resolver = ReferenceResolver::new(&bundle.api);
        let mut dependencies = DependencyManager::default();
        let reference: ReferenceOr<Schema> =
            serde_json::from_value(json!({ "$ref": "#/components/schemas/com.example.Foo" })).unwrap();

        let ty = TypeSchemaProcessor::new(&resolver, &mut dependencies, "com/example/Foo.ts")
            .with_own_entity("com.example.Foo", "Foo")
            .process(&reference, &TypeEnv::root(), Nullability::FromSchema);
        assert_eq!(ty.emit(), "Foo");
        assert!(dependencies.imports.is_empty());
    }

    #[test]
    fn test_compositions() {
        assert_eq!(
            emit(json!({ "anyOf": [{ "type": "string" }, { "type": "number" }] })),
            "string | number"
        );
        assert_eq!(
            emit(json!({ "oneOf": [{ "type": "string" }, { "type": "null" }] })),
            "string | undefined"
        );
        assert_eq!(
            emit(json!({ "allOf": [
                { "$ref": "#/components/schemas/com.example.Foo" },
                { "type": "object", "properties": { "extra": { "type": "string" } }, "required": ["extra"] }
            ] })),
            "Foo & { extra: string }"
        );
    }
}
