#![forbid(unsafe_code)]

//! Read-only schema models consulted while compiling filters.
//!
//! Schemas are produced by an external schema compiler. This module only
//! describes the shape the where-clause compiler needs and offers an
//! in-memory provider for tests and tooling.

/// Field descriptors (scalars, relations, connections).
pub mod fields;

/// Global identifier decoding.
pub mod global_id;

/// Node and relationship-property models.
pub mod model;

/// Schema provider seam and the in-memory implementation.
pub mod provider;

pub use fields::{
    ConnectionField, RelationDirection, RelationField, ScalarField, ScalarFields, ScalarKind,
    TypeMeta,
};
pub use global_id::{GlobalId, GlobalIdCodec, GlobalIdError, RelayGlobalId};
pub use model::{FieldModel, FieldRef, RelationshipProperties, ScalarCategory, SchemaNode};
pub use provider::{InMemorySchema, SchemaLoadError, SchemaProvider};
