//! Input bundling: raw document text to a validated [`OpenAPI`] value.
//!
//! The generator only accepts self-contained documents. Every local `$ref`
//! must point at an existing node, and references into other documents are
//! rejected because nothing downstream can follow them.

pub mod resolver;
pub mod schema;

use crate::error::{GeneratorError, Result};
use indexmap::IndexMap;
use openapiv3::OpenAPI;
use serde_json::Value;

pub use resolver::ReferenceResolver;
pub use schema::{ComposedMode, NodeKind, PrimitiveKind, SchemaNode, SchemaRef};

pub const SCHEMA_REFERENCE_PREFIX: &str = "#/components/schemas/";

/// Every `$ref` found in a document, keyed by the reference string.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    references: IndexMap<String, Vec<String>>,
}

impl ReferenceIndex {
    fn record(&mut self, reference: &str, location: String) {
        self.references
            .entry(reference.to_string())
            .or_default()
            .push(location);
    }

    /// JSON pointers of every place the reference occurs.
    pub fn locations(&self, reference: &str) -> &[String] {
        self.references
            .get(reference)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.references.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

/// A parsed document together with its reference index.
#[derive(Debug)]
pub struct Bundle {
    pub api: OpenAPI,
    pub index: ReferenceIndex,
}

/// Parses JSON or YAML document text and validates its references.
pub fn bundle(text: &str) -> Result<Bundle> {
    let raw: Value = if text.trim_start().starts_with('{') {
        serde_json::from_str(text)
            .map_err(|e| GeneratorError::Document(format!("malformed JSON: {e}")))?
    } else {
        // Round-trip through the YAML value so integer keys such as response
        // codes become strings.
        let yaml: serde_yaml::Value = serde_yaml::from_str(text)
            .map_err(|e| GeneratorError::Document(format!("malformed YAML: {e}")))?;
        serde_json::to_value(yaml)
            .map_err(|e| GeneratorError::Document(format!("unsupported YAML content: {e}")))?
    };

    let version = raw
        .get("openapi")
        .and_then(Value::as_str)
        .ok_or_else(|| GeneratorError::Document("missing 'openapi' version field".to_string()))?;
    if !version.starts_with("3.") {
        return Err(GeneratorError::Document(format!(
            "unsupported OpenAPI version {version}, expected 3.x"
        )));
    }

    let mut index = ReferenceIndex::default();
    collect_references(&raw, &mut String::new(), &mut index);

    for reference in index.references() {
        let location = index
            .locations(reference)
            .first()
            .cloned()
            .unwrap_or_default();

        let Some(pointer) = reference.strip_prefix('#') else {
            return Err(GeneratorError::Document(format!(
                "external reference {reference} at {location} must be bundled before generation"
            )));
        };

        if raw.pointer(pointer).is_none() {
            return Err(GeneratorError::DanglingReference {
                reference: reference.to_string(),
                location,
            });
        }
    }

    let api: OpenAPI = serde_json::from_value(raw)
        .map_err(|e| GeneratorError::Document(format!("not an OpenAPI document: {e}")))?;

    tracing::debug!(references = index.len(), "bundled document");

    Ok(Bundle { api, index })
}

fn collect_references(value: &Value, pointer: &mut String, index: &mut ReferenceIndex) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                index.record(reference, pointer.clone());
            }
            for (key, child) in map {
                let len = pointer.len();
                pointer.push('/');
                pointer.push_str(&key.replace('~', "~0").replace('/', "~1"));
                collect_references(child, pointer, index);
                pointer.truncate(len);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                let len = pointer.len();
                pointer.push('/');
                pointer.push_str(&i.to_string());
                collect_references(child, pointer, index);
                pointer.truncate(len);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r##"{
      "openapi": "3.0.1",
      "info": { "title": "Shop", "version": "1.0.0" },
      "paths": {
        "/OrderEndpoint/find": {
          "post": {
            "responses": {
              "200": {
                "description": "",
                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/com.shop.Order" } } }
              }
            }
          }
        }
      },
      "components": {
        "schemas": {
          "com.shop.Order": {
            "type": "object",
            "properties": { "id": { "type": "string" } }
          }
        }
      }
    }"##;

    #[test]
    fn test_bundle_indexes_references() {
        let bundle = bundle(DOCUMENT).unwrap();
        assert_eq!(bundle.index.len(), 1);
        let locations = bundle.index.locations("#/components/schemas/com.shop.Order");
        assert_eq!(
            locations,
            ["/paths/~1OrderEndpoint~1find/post/responses/200/content/application~1json/schema"]
        );
    }

    #[test]
    fn test_bundle_accepts_yaml() {
        let yaml = r#"
openapi: 3.0.1
info:
  title: Shop
  version: 1.0.0
paths: {}
components:
  schemas:
    Item:
      type: string
"#;
        let bundle = bundle(yaml).unwrap();
        let components = bundle.api.components.unwrap();
        assert!(components.schemas.contains_key("Item"));
    }

    #[test]
    fn test_bundle_rejects_dangling_reference() {
        let text = DOCUMENT.replace("\"com.shop.Order\": {", "\"com.shop.Other\": {");
        let err = bundle(&text).unwrap_err();
        assert!(err.is_document_error());
        assert!(err.to_string().contains("#/components/schemas/com.shop.Order"));
    }

    #[test]
    fn test_bundle_rejects_external_reference() {
        let text = DOCUMENT.replace(
            "#/components/schemas/com.shop.Order\" } } }",
            "other.json#/Order\" } } }",
        );
        let err = bundle(&text).unwrap_err();
        assert!(matches!(err, GeneratorError::Document(_)));
    }

    #[test]
    fn test_bundle_rejects_malformed_input() {
        assert!(bundle("{ not json").unwrap_err().is_document_error());
        assert!(bundle("openapi: \"2.0\"\ninfo: {}\n")
            .unwrap_err()
            .to_string()
            .contains("unsupported OpenAPI version"));
    }
}
