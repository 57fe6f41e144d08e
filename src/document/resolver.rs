use super::schema::SchemaRef;
use super::SCHEMA_REFERENCE_PREFIX;
use crate::error::{GeneratorError, Result};
use indexmap::IndexMap;
use openapiv3::{OpenAPI, ReferenceOr, Schema};
use std::cell::RefCell;
use std::collections::HashMap;

/// Dereferences `$ref` pointers against the bundled document.
///
/// Chains of references (a component that is itself a reference) are
/// followed to the first inline schema and memoized per reference string.
#[derive(Debug)]
pub struct ReferenceResolver<'a> {
    schemas: Option<&'a IndexMap<String, ReferenceOr<Schema>>>,
    cache: RefCell<HashMap<&'a str, &'a Schema>>,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(api: &'a OpenAPI) -> Self {
        Self {
            schemas: api.components.as_ref().map(|components| &components.schemas),
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Component name of a schema reference, e.g. `com.example.Foo` for
    /// `#/components/schemas/com.example.Foo`.
    pub fn entity_name(reference: &str) -> Option<&str> {
        reference.strip_prefix(SCHEMA_REFERENCE_PREFIX)
    }

    /// Returns the concrete schema behind `node`; inline schemas are returned
    /// unchanged.
    pub fn resolve(&self, node: impl Into<SchemaRef<'a>>) -> Result<&'a Schema> {
        match node.into() {
            SchemaRef::Item(schema) => Ok(schema),
            SchemaRef::Reference(reference) => self.resolve_reference(reference),
        }
    }

    pub fn resolve_reference(&self, reference: &'a str) -> Result<&'a Schema> {
        if let Some(schema) = self.cache.borrow().get(reference) {
            return Ok(*schema);
        }

        let mut current = reference;
        let mut visited = vec![reference];
        let schema = loop {
            match self.component(current)? {
                ReferenceOr::Item(schema) => break schema,
                ReferenceOr::Reference { reference: next } => {
                    let next = next.as_str();
                    if visited.contains(&next) {
                        return Err(GeneratorError::Document(format!(
                            "reference cycle through {}",
                            visited.join(" -> ")
                        )));
                    }
                    visited.push(next);
                    current = next;
                }
            }
        };

        self.cache.borrow_mut().insert(reference, schema);
        Ok(schema)
    }

    /// Looks up the component a single reference points at, without
    /// following further references.
    pub fn component(&self, reference: &str) -> Result<&'a ReferenceOr<Schema>> {
        Self::entity_name(reference)
            .and_then(|name| self.schemas?.get(name))
            .ok_or_else(|| GeneratorError::DanglingReference {
                reference: reference.to_string(),
                location: "schema resolution".to_string(),
            })
    }

    /// All component schemas in document order.
    pub fn components(&self) -> impl Iterator<Item = (&'a str, &'a ReferenceOr<Schema>)> {
        self.schemas
            .into_iter()
            .flat_map(|schemas| schemas.iter())
            .map(|(name, schema)| (name.as_str(), schema))
    }
}
