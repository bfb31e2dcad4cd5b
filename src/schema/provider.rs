//! Name resolution for node types and relationship-property types.

use crate::schema::model::{RelationshipProperties, SchemaNode};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Provides the read-only schema models referenced by relation fields.
pub trait SchemaProvider: Send + Sync {
    /// Resolves a node type by name.
    fn node(&self, name: &str) -> Option<&SchemaNode>;
    /// Resolves a relationship-properties type by name.
    fn relationship_properties(&self, name: &str) -> Option<&RelationshipProperties>;
}

/// Errors raised while loading a schema document.
#[derive(Debug, Error)]
pub enum SchemaLoadError {
    /// The schema file could not be read.
    #[error("failed to read schema {path}: {source}")]
    Read {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The schema document is not valid JSON for the model.
    #[error("failed to parse schema: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Simple in-memory schema, used by the CLI and tests.
#[derive(Debug, Default)]
pub struct InMemorySchema {
    nodes: FxHashMap<String, SchemaNode>,
    relationships: FxHashMap<String, RelationshipProperties>,
}

#[derive(Deserialize)]
struct RawSchema {
    #[serde(default)]
    nodes: Vec<SchemaNode>,
    #[serde(default)]
    relationships: Vec<RelationshipProperties>,
}

impl InMemorySchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node type.
    pub fn with_node(mut self, node: SchemaNode) -> Self {
        self.nodes.insert(node.name.clone(), node);
        self
    }

    /// Registers a relationship-properties type.
    pub fn with_relationship_properties(mut self, props: RelationshipProperties) -> Self {
        self.relationships.insert(props.name.clone(), props);
        self
    }

    /// Parses a `{"nodes": [...], "relationships": [...]}` document.
    pub fn from_json_str(json: &str) -> Result<Self, SchemaLoadError> {
        let raw: RawSchema = serde_json::from_str(json)?;
        let schema = raw
            .nodes
            .into_iter()
            .fold(Self::new(), |schema, node| schema.with_node(node));
        Ok(raw
            .relationships
            .into_iter()
            .fold(schema, |schema, props| schema.with_relationship_properties(props)))
    }

    /// Reads and parses a schema document from disk.
    pub fn load(path: &Path) -> Result<Self, SchemaLoadError> {
        let contents = fs::read_to_string(path).map_err(|source| SchemaLoadError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }
}

impl SchemaProvider for InMemorySchema {
    fn node(&self, name: &str) -> Option<&SchemaNode> {
        self.nodes.get(name)
    }

    fn relationship_properties(&self, name: &str) -> Option<&RelationshipProperties> {
        self.relationships.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::model::FieldModel;

    #[test]
    fn parses_schema_document() {
        let schema = InMemorySchema::from_json_str(
            r#"{
                "nodes": [
                    {"name": "Movie", "primitive_fields": [
                        {"field_name": "title", "type_meta": {"name": "String"}}
                    ], "relation_fields": [
                        {"field_name": "actors", "rel_type": "ACTED_IN", "direction": "IN",
                         "target": "Actor", "properties": "ActedIn"}
                    ]},
                    {"name": "Actor"}
                ],
                "relationships": [
                    {"name": "ActedIn", "primitive_fields": [
                        {"field_name": "screenTime", "type_meta": {"name": "Int"}}
                    ]}
                ]
            }"#,
        )
        .unwrap();
        let movie = schema.node("Movie").unwrap();
        assert_eq!(movie.relation("actors").unwrap().target, "Actor");
        assert!(schema.node("Actor").is_some());
        let acted_in = schema.relationship_properties("ActedIn").unwrap();
        assert!(acted_in.field("screenTime").is_some());
    }

    #[test]
    fn rejects_malformed_documents() {
        let err = InMemorySchema::from_json_str(r#"{"nodes": [{"labels": []}]}"#).unwrap_err();
        assert!(matches!(err, SchemaLoadError::Parse(_)));
    }
}
