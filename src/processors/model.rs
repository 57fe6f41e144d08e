//! Form models: one `{Entity}Model` class per object entity.
//!
//! Each property becomes a getter that lazily creates the property model
//! through `_getPropertyModel`, keyed by the property name.

use super::FORM_PACKAGE;
use crate::codegen::ast::{
    ClassDeclaration, ClassMember, Expr, Keyword, Param, SourceFile, Statement, Stmt, TsType,
    TypeParam,
};
use crate::codegen::utils::simple_name;
use crate::dependency::{entity_file, entity_path, DependencyManager};
use crate::document::{ComposedMode, NodeKind, PrimitiveKind, ReferenceResolver, SchemaNode, SchemaRef};
use crate::plugins::SharedStorage;
use indexmap::IndexMap;
use openapiv3::{ReferenceOr, Schema};

pub const MODEL_SUFFIX: &str = "Model";

/// `com.example.Foo` -> `com/example/FooModel.ts`
pub fn model_file(entity: &str) -> String {
    format!("{}{}.ts", entity_path(entity), MODEL_SUFFIX)
}

type Properties<'a> = (&'a IndexMap<String, ReferenceOr<Box<Schema>>>, &'a [String]);

pub struct ModelProcessor<'s, 'a> {
    storage: &'s SharedStorage<'a>,
    name: &'a str,
    component: &'a ReferenceOr<Schema>,
}

/// Per-file state while building one model class.
struct ModelFile<'f> {
    dependencies: DependencyManager,
    file_name: &'f str,
    entity: &'f str,
    class_name: String,
}

impl<'s, 'a> ModelProcessor<'s, 'a> {
    pub fn new(storage: &'s SharedStorage<'a>, name: &'a str, component: &'a ReferenceOr<Schema>) -> Self {
        Self {
            storage,
            name,
            component,
        }
    }

    /// Returns `None` for entities without a form model: enums, unions and
    /// aliases.
    pub fn process(&self) -> Option<SourceFile> {
        let node = SchemaNode::new(self.component);
        let (parent, groups) = split(node)?;

        let file_name = model_file(self.name);
        let mut dependencies = DependencyManager::new(self.storage.options.paths());
        let class_name = dependencies.mint(&format!("{}{}", simple_name(self.name), MODEL_SUFFIX));
        dependencies.reserve("T");

        let mut file = ModelFile {
            dependencies,
            file_name: &file_name,
            entity: self.name,
            class_name,
        };

        let entity_module = file
            .dependencies
            .paths
            .module_path(&entity_file(self.name), &file_name);
        let entity_id = file
            .dependencies
            .imports
            .add_default(&entity_module, simple_name(self.name), true);
        let arity = node.type_parameter_names().len();
        let entity_ty = TsType::generic(entity_id, vec![TsType::keyword(Keyword::Unknown); arity]);

        let base = match parent.and_then(ReferenceResolver::entity_name) {
            Some(parent) => self.model_reference(&mut file, parent),
            None => file.dependencies.imports.add_named(FORM_PACKAGE, "ObjectModel", false),
        };
        let get_property = file
            .dependencies
            .imports
            .add_named(FORM_PACKAGE, "_getPropertyModel", false);
        let empty_value = file
            .dependencies
            .imports
            .add_named(FORM_PACKAGE, "makeObjectEmptyValueCreator", false);

        let mut members = vec![ClassMember::StaticProperty {
            name: "createEmptyValue".to_string(),
            is_override: true,
            value: Expr::call(
                Expr::ident(empty_value),
                vec![Expr::ident(file.class_name.clone())],
            ),
        }];

        for (properties, required) in groups {
            for (name, schema) in properties {
                let node = SchemaNode::new(schema);
                let optional = !required.contains(name)
                    && !node.is_non_null_annotated()
                    && is_nullable(node);
                let (ty, factory) = self.property_model(&mut file, node.raw(), optional);
                members.push(ClassMember::Getter {
                    name: name.clone(),
                    return_type: ty,
                    body: vec![Stmt::Return(Expr::call(
                        Expr::index(Expr::This, Expr::ident(get_property.clone())),
                        vec![
                            Expr::Str(name.clone()),
                            Expr::arrow(vec![Param::untyped("parent"), Param::untyped("key")], factory),
                        ],
                    ))],
                });
            }
        }

        let class = ClassDeclaration {
            name: file.class_name.clone(),
            type_params: vec![TypeParam {
                name: "T".to_string(),
                constraint: Some(entity_ty.clone()),
                default: Some(entity_ty),
            }],
            extends: Some(TsType::generic(base, vec![TsType::reference("T")])),
            members,
        };

        file.dependencies.exports.set_default(file.class_name.clone());
        Some(
            file.dependencies
                .assemble(file_name.clone(), vec![Statement::Class(class)]),
        )
    }

    /// Identifier of the model class for `entity`, importing it when it lives
    /// in another file.
    fn model_reference(&self, file: &mut ModelFile<'_>, entity: &str) -> String {
        if entity == file.entity {
            return file.class_name.clone();
        }
        let module = file
            .dependencies
            .paths
            .module_path(&model_file(entity), file.file_name);
        file.dependencies.imports.add_default(
            &module,
            &format!("{}{}", simple_name(entity), MODEL_SUFFIX),
            false,
        )
    }

    /// Model type and constructor call for one property. The call refers to
    /// the `parent` and `key` arrow parameters.
    fn property_model(&self, file: &mut ModelFile<'_>, schema: SchemaRef<'a>, optional: bool) -> (TsType, Expr) {
        let node = SchemaNode::new(schema);
        let class = match node.kind() {
            NodeKind::Reference(reference) => self.reference_model(file, reference),
            NodeKind::Primitive(PrimitiveKind::String) | NodeKind::Enum(_) => {
                self.form_class(file, "StringModel")
            }
            NodeKind::Primitive(PrimitiveKind::Number | PrimitiveKind::Integer) => {
                self.form_class(file, "NumberModel")
            }
            NodeKind::Primitive(PrimitiveKind::Boolean) => self.form_class(file, "BooleanModel"),
            NodeKind::Array(items) => {
                let array = self.form_class(file, "ArrayModel");
                let (item_ty, item_factory) = match items {
                    Some(items) => {
                        let item = SchemaNode::new(items);
                        let item_optional = !item.is_non_null_annotated() && is_nullable(item);
                        self.property_model(file, items, item_optional)
                    }
                    None => {
                        let object = self.form_class(file, "ObjectModel");
                        (TsType::reference(object.clone()), construct(&object, false, None))
                    }
                };
                return (
                    TsType::generic(array.clone(), vec![item_ty]),
                    construct(&array, optional, Some(item_factory)),
                );
            }
            NodeKind::Composed {
                mode: ComposedMode::AnyOf | ComposedMode::AllOf,
                members,
            } => match single_member(members) {
                Some(member) => return self.property_model(file, SchemaRef::from(member), optional),
                None => self.form_class(file, "ObjectModel"),
            },
            _ => self.form_class(file, "ObjectModel"),
        };

        (TsType::reference(class.clone()), construct(&class, optional, None))
    }

    fn reference_model(&self, file: &mut ModelFile<'_>, reference: &'a str) -> String {
        let Some(entity) = ReferenceResolver::entity_name(reference) else {
            return self.form_class(file, "ObjectModel");
        };
        match self.storage.resolver.resolve_reference(reference) {
            Ok(target) if split(SchemaNode::new(target)).is_some() => self.model_reference(file, entity),
            Ok(target) => match SchemaNode::new(target).kind() {
                NodeKind::Enum(_) | NodeKind::Primitive(PrimitiveKind::String) => {
                    self.form_class(file, "StringModel")
                }
                NodeKind::Primitive(PrimitiveKind::Number | PrimitiveKind::Integer) => {
                    self.form_class(file, "NumberModel")
                }
                NodeKind::Primitive(PrimitiveKind::Boolean) => self.form_class(file, "BooleanModel"),
                _ => self.form_class(file, "ObjectModel"),
            },
            Err(e) => {
                tracing::warn!(file = file.file_name, error = %e, "unresolvable model reference");
                self.form_class(file, "ObjectModel")
            }
        }
    }

    fn form_class(&self, file: &mut ModelFile<'_>, name: &str) -> String {
        file.dependencies.imports.add_named(FORM_PACKAGE, name, false)
    }
}

/// Parent reference and property groups of an entity that has a model.
fn split(node: SchemaNode<'_>) -> Option<(Option<&str>, Vec<Properties<'_>>)> {
    match node.kind() {
        NodeKind::Object {
            properties,
            required,
        } => Some((None, vec![(properties, required)])),
        NodeKind::Composed {
            mode: ComposedMode::AllOf,
            members,
        } => {
            let mut parent = None;
            let mut groups = Vec::new();
            for member in members {
                match SchemaNode::new(member).kind() {
                    NodeKind::Reference(reference) if parent.is_none() => parent = Some(reference),
                    NodeKind::Object {
                        properties,
                        required,
                    } => groups.push((properties, required)),
                    _ => return None,
                }
            }
            Some((parent, groups))
        }
        _ => None,
    }
}

/// The only non-null member of a wrapper composition.
fn single_member(members: &[ReferenceOr<Schema>]) -> Option<&ReferenceOr<Schema>> {
    let mut non_null = members
        .iter()
        .filter(|member| !SchemaNode::new(*member).is_null_marker());
    match (non_null.next(), non_null.next()) {
        (Some(member), None) => Some(member),
        _ => None,
    }
}

fn is_nullable(node: SchemaNode<'_>) -> bool {
    if node.is_nullable() {
        return true;
    }
    match node.kind() {
        NodeKind::Composed { members, .. } => members
            .iter()
            .any(|member| SchemaNode::new(member).is_null_marker()),
        _ => false,
    }
}

/// `new Class(parent, key, optional[, itemFactory])`
fn construct(class: &str, optional: bool, item_factory: Option<Expr>) -> Expr {
    let mut args = vec![Expr::ident("parent"), Expr::ident("key"), Expr::Bool(optional)];
    if let Some(factory) = item_factory {
        args.push(Expr::arrow(
            vec![Param::untyped("parent"), Param::untyped("key")],
            factory,
        ));
    }
    Expr::new_instance(Expr::ident(class), args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::print;
    use crate::document::bundle;
    use crate::plugins::GenerationOptions;

    const DOCUMENT: &str = r##"{
      "openapi": "3.0.1",
      "info": { "title": "Test", "version": "1" },
      "paths": {},
      "components": {
        "schemas": {
          "com.example.Address": {
            "type": "object",
            "properties": { "street": { "type": "string" } },
            "required": ["street"]
          },
          "com.example.Person": {
            "type": "object",
            "properties": {
              "name": { "type": "string", "nullable": true },
              "tags": { "type": "array", "items": { "type": "string" } },
              "address": { "nullable": true, "anyOf": [{ "$ref": "#/components/schemas/com.example.Address" }] },
              "status": { "$ref": "#/components/schemas/com.example.Status" }
            }
          },
          "com.example.Status": { "type": "string", "enum": ["ACTIVE"] }
        }
      }
    }"##;

    fn generate(name: &str) -> Option<SourceFile> {
        let bundle = bundle(DOCUMENT).unwrap();
        let storage = SharedStorage::new(&bundle.api, GenerationOptions::default());
        let (name, component) = storage
            .resolver
            .components()
            .find(|(candidate, _)| *candidate == name)
            .unwrap();
        ModelProcessor::new(&storage, name, component).process()
    }

    #[test]
    fn test_enum_has_no_model() {
        assert!(generate("com.example.Status").is_none());
    }

    #[test]
    fn test_object_model() {
        let file = generate("com.example.Address").unwrap();
        assert_eq!(file.name, "com/example/AddressModel.ts");
        assert_eq!(
            print(&file),
            r#"import { _getPropertyModel, makeObjectEmptyValueCreator, ObjectModel, StringModel } from "@vaadin/hilla-lit-form";
import type Address from "./Address.js";

class AddressModel<T extends Address = Address> extends ObjectModel<T> {
    static override createEmptyValue = makeObjectEmptyValueCreator(AddressModel);

    get street(): StringModel {
        return this[_getPropertyModel]("street", (parent, key) => new StringModel(parent, key, false));
    }
}

export default AddressModel;
"#
        );
    }

    #[test]
    fn test_property_models() {
        let text = print(&generate("com.example.Person").unwrap());
        assert!(text.contains("import AddressModel from \"./AddressModel.js\";\n"));
        assert!(text.contains(
            "return this[_getPropertyModel](\"name\", (parent, key) => new StringModel(parent, key, true));"
        ));
        assert!(text.contains(
            "get tags(): ArrayModel<StringModel> {\n        return this[_getPropertyModel](\"tags\", (parent, key) => new ArrayModel(parent, key, false, (parent, key) => new StringModel(parent, key, false)));"
        ));
        assert!(text.contains(
            "(parent, key) => new AddressModel(parent, key, true)"
        ));
        assert!(text.contains("get status(): StringModel {"));
    }
}
