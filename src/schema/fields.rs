//! Field descriptors attached to node and relationship-property models.

use crate::cypher::{Direction, Value};
use serde::{Deserialize, Serialize};

/// Declared GraphQL type of a field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMeta {
    /// Named type, e.g. `Int`, `BigInt`, `Duration`, `Point`.
    pub name: String,
    /// Whether the field holds a list of `name`.
    #[serde(default)]
    pub list: bool,
    /// Whether the field is non-nullable.
    #[serde(default)]
    pub required: bool,
}

impl TypeMeta {
    /// Nullable scalar of the given type.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            list: false,
            required: false,
        }
    }

    /// List of the given type.
    pub fn list_of(name: impl Into<String>) -> Self {
        Self {
            list: true,
            ..Self::named(name)
        }
    }

    /// Scalar kind derived from the type name.
    pub fn kind(&self) -> ScalarKind {
        ScalarKind::from_type_name(&self.name)
    }
}

/// Scalar kinds with distinct comparison semantics.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[allow(missing_docs)]
pub enum ScalarKind {
    Int,
    Float,
    /// 64-bit integer transported as a decimal string.
    BigInt,
    String,
    Id,
    Boolean,
    Duration,
    DateTime,
    Date,
    Time,
    LocalTime,
    LocalDateTime,
    Point,
    CartesianPoint,
    /// Enums and custom scalars.
    Other,
}

impl ScalarKind {
    /// Maps a GraphQL type name onto its kind.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "Int" => ScalarKind::Int,
            "Float" => ScalarKind::Float,
            "BigInt" => ScalarKind::BigInt,
            "String" => ScalarKind::String,
            "ID" => ScalarKind::Id,
            "Boolean" => ScalarKind::Boolean,
            "Duration" => ScalarKind::Duration,
            "DateTime" => ScalarKind::DateTime,
            "Date" => ScalarKind::Date,
            "Time" => ScalarKind::Time,
            "LocalTime" => ScalarKind::LocalTime,
            "LocalDateTime" => ScalarKind::LocalDateTime,
            "Point" => ScalarKind::Point,
            "CartesianPoint" => ScalarKind::CartesianPoint,
            _ => ScalarKind::Other,
        }
    }

    /// Int, Float and BigInt.
    pub fn is_numeric(self) -> bool {
        matches!(self, ScalarKind::Int | ScalarKind::Float | ScalarKind::BigInt)
    }

    /// String and ID.
    pub fn is_textual(self) -> bool {
        matches!(self, ScalarKind::String | ScalarKind::Id)
    }

    /// Date and time kinds, excluding durations.
    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            ScalarKind::DateTime
                | ScalarKind::Date
                | ScalarKind::Time
                | ScalarKind::LocalTime
                | ScalarKind::LocalDateTime
        )
    }

    /// Point and CartesianPoint.
    pub fn is_spatial(self) -> bool {
        matches!(self, ScalarKind::Point | ScalarKind::CartesianPoint)
    }
}

/// Scalar property descriptor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScalarField {
    /// API-facing field name.
    pub field_name: String,
    /// Database property name when it differs from `field_name`.
    #[serde(default)]
    pub db_property: Option<String>,
    /// Declared type.
    pub type_meta: TypeMeta,
    /// Value substituted through `coalesce` when the property is absent.
    #[serde(default)]
    pub coalesce_value: Option<Value>,
}

impl ScalarField {
    /// Nullable scalar field.
    pub fn new(field_name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            db_property: None,
            type_meta: TypeMeta::named(type_name),
            coalesce_value: None,
        }
    }

    /// List-valued scalar field.
    pub fn list(field_name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            type_meta: TypeMeta::list_of(type_name),
            ..Self::new(field_name, "")
        }
    }

    /// Maps the field onto a differently named database property.
    pub fn with_db_property(mut self, property: impl Into<String>) -> Self {
        self.db_property = Some(property.into());
        self
    }

    /// Sets the coalesce default.
    pub fn with_coalesce(mut self, value: impl Into<Value>) -> Self {
        self.coalesce_value = Some(value.into());
        self
    }

    /// Property name used in the database.
    pub fn db_property_name(&self) -> &str {
        self.db_property.as_deref().unwrap_or(&self.field_name)
    }

    /// Kind of the declared type.
    pub fn kind(&self) -> ScalarKind {
        self.type_meta.kind()
    }
}

/// Direction of a relation, relative to the owning node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RelationDirection {
    /// `(owner)<-[]-(target)`
    In,
    /// `(owner)-[]->(target)`
    Out,
}

impl From<RelationDirection> for Direction {
    fn from(value: RelationDirection) -> Self {
        match value {
            RelationDirection::In => Direction::In,
            RelationDirection::Out => Direction::Out,
        }
    }
}

/// Relation to another node type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationField {
    /// API-facing field name.
    pub field_name: String,
    /// Relationship type in the database.
    pub rel_type: String,
    /// Traversal direction from the owning node.
    pub direction: RelationDirection,
    /// Name of the target node type.
    pub target: String,
    /// `true` for to-many relations.
    #[serde(default = "default_true")]
    pub list: bool,
    /// Name of the relationship-properties type carried by the edge.
    #[serde(default)]
    pub properties: Option<String>,
}

fn default_true() -> bool {
    true
}

impl RelationField {
    /// To-many relation.
    pub fn new(
        field_name: impl Into<String>,
        rel_type: impl Into<String>,
        direction: RelationDirection,
        target: impl Into<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            rel_type: rel_type.into(),
            direction,
            target: target.into(),
            list: true,
            properties: None,
        }
    }

    /// Marks the relation as to-one.
    pub fn single(mut self) -> Self {
        self.list = false;
        self
    }

    /// Attaches a relationship-properties type.
    pub fn with_properties(mut self, properties: impl Into<String>) -> Self {
        self.properties = Some(properties.into());
        self
    }
}

/// Connection over a relation, exposing edge properties to filters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionField {
    /// API-facing field name, e.g. `actorsConnection`.
    pub field_name: String,
    /// Name of the relation field of the same node this connection wraps.
    pub relation: String,
}

impl ConnectionField {
    /// Connection wrapping the relation named `relation`.
    pub fn new(field_name: impl Into<String>, relation: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            relation: relation.into(),
        }
    }
}

/// Ordered scalar descriptor lists shared by nodes and edge-property models.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalarFields {
    /// Primitive scalars, durations included.
    #[serde(default)]
    pub primitive_fields: Vec<ScalarField>,
    /// Date/time scalars.
    #[serde(default)]
    pub temporal_fields: Vec<ScalarField>,
    /// Enum-typed fields.
    #[serde(default)]
    pub enum_fields: Vec<ScalarField>,
    /// Spatial fields.
    #[serde(default)]
    pub point_fields: Vec<ScalarField>,
}
