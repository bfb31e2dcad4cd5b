//! Node and relationship-property models with a memoized field index.
//!
//! Models are built once when the schema is loaded and then shared
//! read-only. The first lookup builds a name index so classification does
//! not rescan every descriptor list per filter key.

use crate::schema::fields::{ConnectionField, RelationField, ScalarField, ScalarFields, ScalarKind};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Scalar descriptor list a field was found in.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ScalarCategory {
    /// Primitive scalars (Int, Float, String, ...).
    Primitive,
    /// Primitive whose declared type is `Duration`.
    Duration,
    /// Date/time scalars.
    Temporal,
    /// Enum-typed fields.
    Enum,
    /// Spatial fields.
    Point,
}

/// Result of a field-name lookup.
#[derive(Clone, Copy, Debug)]
pub enum FieldRef<'a> {
    /// Relation to another node type.
    Relation(&'a RelationField),
    /// Connection over a relation.
    Connection(&'a ConnectionField),
    /// Scalar property.
    Scalar(ScalarCategory, &'a ScalarField),
}

#[derive(Clone, Copy, Debug)]
enum Slot {
    Relation(usize),
    Connection(usize),
    Scalar(ScalarCategory, usize),
}

#[derive(Debug, Default)]
struct FieldIndex {
    slots: FxHashMap<String, Slot>,
}

impl FieldIndex {
    fn build(
        scalars: &ScalarFields,
        relations: &[RelationField],
        connections: &[ConnectionField],
    ) -> Self {
        let mut slots = FxHashMap::default();
        // Insertion order is the lookup priority: first entry for a name wins.
        for (idx, field) in relations.iter().enumerate() {
            slots
                .entry(field.field_name.clone())
                .or_insert(Slot::Relation(idx));
        }
        for (idx, field) in connections.iter().enumerate() {
            slots
                .entry(field.field_name.clone())
                .or_insert(Slot::Connection(idx));
        }
        for (idx, field) in scalars.primitive_fields.iter().enumerate() {
            let category = if field.kind() == ScalarKind::Duration {
                ScalarCategory::Duration
            } else {
                ScalarCategory::Primitive
            };
            slots
                .entry(field.field_name.clone())
                .or_insert(Slot::Scalar(category, idx));
        }
        let rest = [
            (ScalarCategory::Temporal, &scalars.temporal_fields),
            (ScalarCategory::Enum, &scalars.enum_fields),
            (ScalarCategory::Point, &scalars.point_fields),
        ];
        for (category, fields) in rest {
            for (idx, field) in fields.iter().enumerate() {
                slots
                    .entry(field.field_name.clone())
                    .or_insert(Slot::Scalar(category, idx));
            }
        }
        Self { slots }
    }

    fn resolve<'a>(
        &self,
        name: &str,
        scalars: &'a ScalarFields,
        relations: &'a [RelationField],
        connections: &'a [ConnectionField],
    ) -> Option<FieldRef<'a>> {
        let slot = *self.slots.get(name)?;
        Some(match slot {
            Slot::Relation(idx) => FieldRef::Relation(&relations[idx]),
            Slot::Connection(idx) => FieldRef::Connection(&connections[idx]),
            Slot::Scalar(category, idx) => {
                let list = match category {
                    ScalarCategory::Primitive | ScalarCategory::Duration => &scalars.primitive_fields,
                    ScalarCategory::Temporal => &scalars.temporal_fields,
                    ScalarCategory::Enum => &scalars.enum_fields,
                    ScalarCategory::Point => &scalars.point_fields,
                };
                FieldRef::Scalar(category, &list[idx])
            }
        })
    }
}

/// Anything a filter can be compiled against.
pub trait FieldModel {
    /// Type name used in diagnostics.
    fn type_name(&self) -> &str;

    /// Looks a field up by its API-facing name.
    fn field(&self, name: &str) -> Option<FieldRef<'_>>;

    /// Whether `id` filters are global identifiers on this model.
    fn is_global_node(&self) -> bool {
        false
    }

    /// Field whose value is encoded into global identifiers.
    fn global_id_field(&self) -> Option<&str> {
        None
    }
}

/// Node type as seen by the filter compiler.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Type name.
    pub name: String,
    /// Database labels; the type name when empty.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Scalar descriptors.
    #[serde(flatten)]
    pub fields: ScalarFields,
    /// Relations to other node types.
    #[serde(default)]
    pub relation_fields: Vec<RelationField>,
    /// Connections over relations.
    #[serde(default)]
    pub connection_fields: Vec<ConnectionField>,
    /// Whether the type implements the global `Node` interface.
    #[serde(default)]
    pub is_global_node: bool,
    /// Field holding the id encoded into global identifiers.
    #[serde(default)]
    pub global_id_field: Option<String>,
    #[serde(skip)]
    index: OnceLock<FieldIndex>,
}

impl Clone for SchemaNode {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            labels: self.labels.clone(),
            fields: self.fields.clone(),
            relation_fields: self.relation_fields.clone(),
            connection_fields: self.connection_fields.clone(),
            is_global_node: self.is_global_node,
            global_id_field: self.global_id_field.clone(),
            index: OnceLock::new(),
        }
    }
}

impl SchemaNode {
    /// Empty node type labelled with its name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            labels: vec![name.clone()],
            name,
            ..Self::default()
        }
    }

    /// Replaces the database labels.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self.index = OnceLock::new();
        self
    }

    /// Adds a primitive scalar (durations included).
    pub fn with_primitive(mut self, field: ScalarField) -> Self {
        self.fields.primitive_fields.push(field);
        self.index = OnceLock::new();
        self
    }

    /// Adds a temporal scalar.
    pub fn with_temporal(mut self, field: ScalarField) -> Self {
        self.fields.temporal_fields.push(field);
        self.index = OnceLock::new();
        self
    }

    /// Adds an enum field.
    pub fn with_enum(mut self, field: ScalarField) -> Self {
        self.fields.enum_fields.push(field);
        self.index = OnceLock::new();
        self
    }

    /// Adds a point field.
    pub fn with_point(mut self, field: ScalarField) -> Self {
        self.fields.point_fields.push(field);
        self.index = OnceLock::new();
        self
    }

    /// Adds a relation field.
    pub fn with_relation(mut self, field: RelationField) -> Self {
        self.relation_fields.push(field);
        self.index = OnceLock::new();
        self
    }

    /// Adds a connection field.
    pub fn with_connection(mut self, field: ConnectionField) -> Self {
        self.connection_fields.push(field);
        self.index = OnceLock::new();
        self
    }

    /// Marks the type as a global node whose ids live in `id_field`.
    pub fn global_node(mut self, id_field: impl Into<String>) -> Self {
        self.is_global_node = true;
        self.global_id_field = Some(id_field.into());
        self
    }

    /// Primary database label.
    pub fn primary_label(&self) -> &str {
        self.labels.first().map(String::as_str).unwrap_or(&self.name)
    }

    /// All database labels.
    pub fn labels(&self) -> Vec<String> {
        if self.labels.is_empty() {
            vec![self.name.clone()]
        } else {
            self.labels.clone()
        }
    }

    /// Relation descriptor by field name.
    pub fn relation(&self, name: &str) -> Option<&RelationField> {
        match self.field(name)? {
            FieldRef::Relation(rel) => Some(rel),
            _ => None,
        }
    }

    /// Scalar descriptor by field name.
    pub fn scalar(&self, name: &str) -> Option<(ScalarCategory, &ScalarField)> {
        match self.field(name)? {
            FieldRef::Scalar(category, field) => Some((category, field)),
            _ => None,
        }
    }

    fn index(&self) -> &FieldIndex {
        self.index.get_or_init(|| {
            FieldIndex::build(&self.fields, &self.relation_fields, &self.connection_fields)
        })
    }
}

impl FieldModel for SchemaNode {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        self.index().resolve(
            name,
            &self.fields,
            &self.relation_fields,
            &self.connection_fields,
        )
    }

    fn is_global_node(&self) -> bool {
        self.is_global_node
    }

    fn global_id_field(&self) -> Option<&str> {
        self.global_id_field.as_deref()
    }
}

/// Properties stored on relationships of a given type.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RelationshipProperties {
    /// Type name referenced by [`RelationField::properties`].
    pub name: String,
    /// Scalar descriptors.
    #[serde(flatten)]
    pub fields: ScalarFields,
    #[serde(skip)]
    index: OnceLock<FieldIndex>,
}

impl Clone for RelationshipProperties {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            fields: self.fields.clone(),
            index: OnceLock::new(),
        }
    }
}

impl RelationshipProperties {
    /// Empty property set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a primitive scalar.
    pub fn with_primitive(mut self, field: ScalarField) -> Self {
        self.fields.primitive_fields.push(field);
        self.index = OnceLock::new();
        self
    }

    /// Adds a temporal scalar.
    pub fn with_temporal(mut self, field: ScalarField) -> Self {
        self.fields.temporal_fields.push(field);
        self.index = OnceLock::new();
        self
    }

    fn index(&self) -> &FieldIndex {
        self.index
            .get_or_init(|| FieldIndex::build(&self.fields, &[], &[]))
    }
}

impl FieldModel for RelationshipProperties {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        self.index().resolve(name, &self.fields, &[], &[])
    }
}
