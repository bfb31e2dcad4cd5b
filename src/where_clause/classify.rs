//! Resolution of a parsed key against a field model.

use crate::schema::{ConnectionField, FieldModel, FieldRef, RelationField, ScalarCategory, ScalarField};
use crate::where_clause::errors::WhereError;
use crate::where_clause::key::ParsedKey;

/// Builder a filter entry is dispatched to.
#[derive(Clone, Copy, Debug)]
pub enum FieldCategory<'a> {
    /// `id` on a type implementing the global `Node` interface.
    GlobalId,
    /// Quantified relation filter.
    Relation(&'a RelationField),
    /// `<relation>Aggregate` filter.
    Aggregate(&'a RelationField),
    /// Connection filter over node and edge properties.
    Connection(&'a ConnectionField),
    /// Scalar comparison.
    Scalar(ScalarCategory, &'a ScalarField),
}

/// Classifies `parsed` against `model`.
///
/// Global ids take precedence, then relations (aggregate or plain), then
/// connections and finally scalars.
pub fn classify<'a>(
    raw_key: &str,
    parsed: &ParsedKey,
    model: &'a dyn FieldModel,
) -> Result<FieldCategory<'a>, WhereError> {
    if model.is_global_node() && raw_key == "id" {
        return Ok(FieldCategory::GlobalId);
    }
    let found = model.field(&parsed.field_name);
    if parsed.is_aggregate {
        return match found {
            Some(FieldRef::Relation(rel)) => Ok(FieldCategory::Aggregate(rel)),
            _ => Err(WhereError::InvalidAggregateTarget {
                field: parsed.field_name.clone(),
                type_name: model.type_name().to_owned(),
            }),
        };
    }
    match found {
        Some(FieldRef::Relation(rel)) => Ok(FieldCategory::Relation(rel)),
        Some(FieldRef::Connection(conn)) => Ok(FieldCategory::Connection(conn)),
        Some(FieldRef::Scalar(category, field)) => Ok(FieldCategory::Scalar(category, field)),
        None => Err(WhereError::UnknownField {
            field: parsed.field_name.clone(),
            type_name: model.type_name().to_owned(),
        }),
    }
}
