#![forbid(unsafe_code)]

//! Cypher predicate AST consumed by the surrounding query builder.
//!
//! The where-clause compiler never emits text directly. It builds the
//! structures defined here and binds literal values into a [`ParamTable`].

/// Predicate and expression tree.
///
/// Comparisons, boolean combinators and quantified pattern sub-queries.
pub mod ast;

/// Bound parameter table.
pub mod params;

/// Explain rendering (`Display`) of predicate trees.
pub mod render;

/// Parameter and literal values.
pub mod value;

pub use ast::{
    AggregateFn, Comparison, ComparisonOp, Direction, Expr, NodePattern, ParamRef, Pattern,
    PatternKind, PatternPredicate, Predicate, RelationshipPattern, Variable,
};
pub use params::ParamTable;
pub use value::Value;
