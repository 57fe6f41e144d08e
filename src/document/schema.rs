//! Typed view over raw schema nodes.
//!
//! `openapiv3` keeps references and inline schemas apart and boxes nested
//! schemas in some positions but not others. [`SchemaRef`] erases those
//! differences and [`SchemaNode::kind`] classifies a node into the shapes the
//! type lowering understands.

use indexmap::IndexMap;
use openapiv3::{AdditionalProperties, ReferenceOr, Schema, SchemaKind, Type};
use serde_json::Value;

pub const TYPE_PARAMETERS_EXTENSION: &str = "x-type-parameters";
pub const TYPE_ARGUMENT_EXTENSION: &str = "x-type-argument";
pub const ANNOTATIONS_EXTENSION: &str = "x-annotations";
pub const CLASS_NAME_EXTENSION: &str = "x-class-name";

/// Borrowed handle to either a `$ref` or an inline schema.
#[derive(Debug, Clone, Copy)]
pub enum SchemaRef<'a> {
    Reference(&'a str),
    Item(&'a Schema),
}

impl<'a> From<&'a ReferenceOr<Schema>> for SchemaRef<'a> {
    fn from(value: &'a ReferenceOr<Schema>) -> Self {
        match value {
            ReferenceOr::Reference { reference } => SchemaRef::Reference(reference),
            ReferenceOr::Item(schema) => SchemaRef::Item(schema),
        }
    }
}

impl<'a> From<&'a ReferenceOr<Box<Schema>>> for SchemaRef<'a> {
    fn from(value: &'a ReferenceOr<Box<Schema>>) -> Self {
        match value {
            ReferenceOr::Reference { reference } => SchemaRef::Reference(reference),
            ReferenceOr::Item(schema) => SchemaRef::Item(schema),
        }
    }
}

impl<'a> From<&'a Schema> for SchemaRef<'a> {
    fn from(value: &'a Schema) -> Self {
        SchemaRef::Item(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Number,
    Integer,
    Boolean,
    /// Anything the lowering cannot interpret.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposedMode {
    OneOf,
    AnyOf,
    AllOf,
}

/// The shape of a schema node.
#[derive(Debug, Clone)]
pub enum NodeKind<'a> {
    Reference(&'a str),
    Primitive(PrimitiveKind),
    Array(Option<SchemaRef<'a>>),
    /// String-keyed dictionary; `None` means the values are untyped.
    Map(Option<SchemaRef<'a>>),
    Enum(Vec<String>),
    Object {
        properties: &'a IndexMap<String, ReferenceOr<Box<Schema>>>,
        required: &'a [String],
    },
    Composed {
        mode: ComposedMode,
        members: &'a [ReferenceOr<Schema>],
    },
    TypeArgument(&'a str),
    Null,
}

#[derive(Debug, Clone, Copy)]
pub struct SchemaNode<'a> {
    raw: SchemaRef<'a>,
}

impl<'a> SchemaNode<'a> {
    pub fn new(raw: impl Into<SchemaRef<'a>>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn raw(&self) -> SchemaRef<'a> {
        self.raw
    }

    pub fn schema(&self) -> Option<&'a Schema> {
        match self.raw {
            SchemaRef::Item(schema) => Some(schema),
            SchemaRef::Reference(_) => None,
        }
    }

    pub fn kind(&self) -> NodeKind<'a> {
        let schema = match self.raw {
            SchemaRef::Reference(reference) => return NodeKind::Reference(reference),
            SchemaRef::Item(schema) => schema,
        };

        if let Some(name) = self.type_argument() {
            return NodeKind::TypeArgument(name);
        }

        match &schema.schema_kind {
            SchemaKind::Type(Type::String(string)) => {
                let values: Vec<String> = string.enumeration.iter().flatten().cloned().collect();
                if values.is_empty() {
                    NodeKind::Primitive(PrimitiveKind::String)
                } else {
                    NodeKind::Enum(values)
                }
            }
            SchemaKind::Type(Type::Number(_)) => NodeKind::Primitive(PrimitiveKind::Number),
            SchemaKind::Type(Type::Integer(_)) => NodeKind::Primitive(PrimitiveKind::Integer),
            SchemaKind::Type(Type::Boolean(_)) => NodeKind::Primitive(PrimitiveKind::Boolean),
            SchemaKind::Type(Type::Array(array)) => {
                NodeKind::Array(array.items.as_ref().map(SchemaRef::from))
            }
            SchemaKind::Type(Type::Object(object)) => {
                if object.properties.is_empty() {
                    match &object.additional_properties {
                        Some(AdditionalProperties::Schema(value)) => {
                            return NodeKind::Map(Some(SchemaRef::from(value.as_ref())));
                        }
                        Some(AdditionalProperties::Any(true)) => return NodeKind::Map(None),
                        _ => {}
                    }
                }
                NodeKind::Object {
                    properties: &object.properties,
                    required: &object.required,
                }
            }
            SchemaKind::OneOf { one_of } => NodeKind::Composed {
                mode: ComposedMode::OneOf,
                members: one_of,
            },
            SchemaKind::AnyOf { any_of } => NodeKind::Composed {
                mode: ComposedMode::AnyOf,
                members: any_of,
            },
            SchemaKind::AllOf { all_of } => NodeKind::Composed {
                mode: ComposedMode::AllOf,
                members: all_of,
            },
            SchemaKind::Any(any) if any.typ.as_deref() == Some("null") => NodeKind::Null,
            SchemaKind::Not { .. } | SchemaKind::Any(_) => {
                NodeKind::Primitive(PrimitiveKind::Unknown)
            }
        }
    }

    /// Whether the node stands for "no value" inside a composition.
    pub fn is_null_marker(&self) -> bool {
        match self.kind() {
            NodeKind::Null => true,
            NodeKind::Primitive(PrimitiveKind::Unknown) => {
                self.schema().is_some_and(|schema| schema.schema_data.nullable)
            }
            _ => false,
        }
    }

    fn extension(&self, name: &str) -> Option<&'a Value> {
        self.schema()
            .and_then(|schema| schema.schema_data.extensions.get(name))
    }

    pub fn is_nullable(&self) -> bool {
        self.schema()
            .is_some_and(|schema| schema.schema_data.nullable)
    }

    /// Annotation names from `x-annotations`, given either as plain strings
    /// or as objects with a `name` field.
    pub fn annotations(&self) -> Vec<&'a str> {
        let Some(Value::Array(items)) = self.extension(ANNOTATIONS_EXTENSION) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name.as_str()),
                Value::Object(map) => map.get("name").and_then(Value::as_str),
                _ => None,
            })
            .collect()
    }

    pub fn is_non_null_annotated(&self) -> bool {
        self.annotations().iter().any(|name| {
            let simple = name.rsplit('.').next().unwrap_or(name);
            simple.eq_ignore_ascii_case("nonnull")
        })
    }

    pub fn type_argument(&self) -> Option<&'a str> {
        self.extension(TYPE_ARGUMENT_EXTENSION)
            .and_then(Value::as_str)
    }

    /// Schemas listed under `x-type-parameters`.
    ///
    /// On an entity definition every entry is a type-argument marker naming
    /// one parameter; at a use site the entries are the concrete arguments.
    /// Entries that are not schemas are skipped.
    pub fn type_parameters(&self) -> Vec<ReferenceOr<Schema>> {
        let Some(Value::Array(items)) = self.extension(TYPE_PARAMETERS_EXTENSION) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| match serde_json::from_value(item.clone()) {
                Ok(schema) => Some(schema),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring malformed type parameter");
                    None
                }
            })
            .collect()
    }

    /// Names declared by an entity's `x-type-parameters` markers.
    pub fn type_parameter_names(&self) -> Vec<String> {
        self.type_parameters()
            .iter()
            .filter_map(|parameter| match parameter {
                ReferenceOr::Item(schema) => schema
                    .schema_data
                    .extensions
                    .get(TYPE_ARGUMENT_EXTENSION)
                    .and_then(Value::as_str)
                    .map(str::to_string),
                ReferenceOr::Reference { .. } => None,
            })
            .collect()
    }

    pub fn class_name(&self) -> Option<&'a str> {
        self.extension(CLASS_NAME_EXTENSION).and_then(Value::as_str)
    }
}
