//! Scalar comparisons: one filter key on a primitive, temporal, enum or point
//! field becomes one predicate leaf.

use crate::config::FilterFeatures;
use crate::cypher::{ComparisonOp, Expr, Predicate, Value, Variable};
use crate::schema::{ScalarCategory, ScalarField, ScalarKind};
use crate::where_clause::context::ExecutionContext;
use crate::where_clause::errors::WhereError;
use crate::where_clause::key::Operator;
use serde_json::Value as Json;

/// Property expression for `field` on `target`.
///
/// The key prefix (`node.`) stays part of the path and the expression is
/// wrapped in `coalesce` when the field declares a default.
pub fn property_expr(target: &Variable, prefix: Option<&str>, field: &ScalarField) -> Expr {
    let path = format!("{}{}", prefix.unwrap_or(""), field.db_property_name());
    let property = target.property(path);
    match &field.coalesce_value {
        Some(default) => property.coalesce(Expr::Literal(default.clone())),
        None => property,
    }
}

/// One scalar comparison awaiting its value.
#[derive(Clone, Debug)]
pub struct ScalarComparison<'a> {
    /// Left-hand side, usually from [`property_expr`].
    pub property: Expr,
    /// Operator with any `NOT` already stripped.
    pub operator: Operator,
    /// Field descriptor.
    pub field: &'a ScalarField,
    /// Descriptor list the field was found in.
    pub category: ScalarCategory,
}

impl ScalarComparison<'_> {
    fn kind(&self) -> ScalarKind {
        if self.category == ScalarCategory::Duration {
            ScalarKind::Duration
        } else {
            self.field.kind()
        }
    }

    fn is_spatial(&self) -> bool {
        self.category == ScalarCategory::Point || self.kind().is_spatial()
    }

    fn unsupported(&self) -> WhereError {
        WhereError::unsupported(self.operator, &self.field.field_name, &self.field.type_meta.name)
    }
}

/// Compiles a non-null value against a scalar field.
///
/// Negation is left to the caller.
pub fn build_comparison(
    cmp: ScalarComparison<'_>,
    value: &Json,
    ctx: &mut ExecutionContext,
) -> Result<Predicate, WhereError> {
    let kind = cmp.kind();
    let list_field = cmp.field.type_meta.list;
    let name = cmp.field.field_name.as_str();
    match cmp.operator {
        Operator::Eq => {
            let param = Expr::param(ctx.param(bind_value(kind, name, value)?));
            let right = if list_field {
                param
            } else {
                wrap_literal(kind, cmp.is_spatial(), param)
            };
            Ok(Predicate::compare(ComparisonOp::Eq, cmp.property, right))
        }
        Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte => {
            let op = ordering_op(cmp.operator).ok_or_else(|| cmp.unsupported())?;
            if list_field || !ordering_allowed(&cmp, kind, ctx.features()) {
                return Err(cmp.unsupported());
            }
            if cmp.is_spatial() {
                return point_distance(cmp.property, op, name, value, ctx);
            }
            let param = Expr::param(ctx.param(bind_value(kind, name, value)?));
            Ok(ordered(kind, op, cmp.property, param))
        }
        Operator::Distance => {
            if list_field || !cmp.is_spatial() {
                return Err(cmp.unsupported());
            }
            point_distance(cmp.property, ComparisonOp::Eq, name, value, ctx)
        }
        Operator::In => {
            if list_field {
                return Err(cmp.unsupported());
            }
            let Json::Array(items) = value else {
                return Err(WhereError::invalid_value(name, "list", value));
            };
            let bound = items
                .iter()
                .map(|item| bind_value(kind, name, item))
                .collect::<Result<Vec<_>, _>>()?;
            let param = Expr::param(ctx.param(Value::List(bound)));
            let right = match wrapper(kind, cmp.is_spatial()) {
                Some(func) => {
                    let var = ctx.fresh_variable();
                    Expr::ListComprehension {
                        variable: var.clone(),
                        list: Box::new(param),
                        map: Box::new(Expr::function(func, vec![Expr::Variable(var)])),
                    }
                }
                None => param,
            };
            Ok(Predicate::compare(ComparisonOp::In, cmp.property, right))
        }
        Operator::Includes => {
            if !list_field {
                return Err(cmp.unsupported());
            }
            let param = Expr::param(ctx.param(bind_value(kind, name, value)?));
            let left = wrap_literal(kind, cmp.is_spatial(), param);
            Ok(Predicate::compare(ComparisonOp::In, left, cmp.property))
        }
        Operator::Contains | Operator::StartsWith | Operator::EndsWith => {
            if list_field || !kind.is_textual() || cmp.category == ScalarCategory::Enum {
                return Err(cmp.unsupported());
            }
            let op = match cmp.operator {
                Operator::Contains => ComparisonOp::Contains,
                Operator::StartsWith => ComparisonOp::StartsWith,
                _ => ComparisonOp::EndsWith,
            };
            let param = Expr::param(ctx.param(expect_string(name, value)?));
            Ok(Predicate::compare(op, cmp.property, param))
        }
        Operator::Matches => {
            let features = ctx.features();
            let enabled = match kind {
                ScalarKind::String => features.string_matches,
                ScalarKind::Id => features.id_matches,
                _ => false,
            };
            if list_field || !enabled || cmp.category == ScalarCategory::Enum {
                return Err(cmp.unsupported());
            }
            let param = Expr::param(ctx.param(expect_string(name, value)?));
            Ok(Predicate::compare(ComparisonOp::Matches, cmp.property, param))
        }
        _ => Err(cmp.unsupported()),
    }
}

fn ordering_allowed(cmp: &ScalarComparison<'_>, kind: ScalarKind, features: FilterFeatures) -> bool {
    if cmp.category == ScalarCategory::Enum {
        return false;
    }
    match kind {
        ScalarKind::Boolean => false,
        ScalarKind::String | ScalarKind::Id => features.string_ordering,
        _ => true,
    }
}

/// Maps an ordering operator onto its Cypher comparison.
pub(crate) fn ordering_op(operator: Operator) -> Option<ComparisonOp> {
    match operator {
        Operator::Eq => Some(ComparisonOp::Eq),
        Operator::Lt => Some(ComparisonOp::Lt),
        Operator::Lte => Some(ComparisonOp::Lte),
        Operator::Gt => Some(ComparisonOp::Gt),
        Operator::Gte => Some(ComparisonOp::Gte),
        _ => None,
    }
}

/// `left <op> right`, comparing durations through a common datetime anchor.
pub(crate) fn ordered(kind: ScalarKind, op: ComparisonOp, left: Expr, param: Expr) -> Predicate {
    if kind != ScalarKind::Duration {
        return Predicate::compare(op, left, param);
    }
    let duration = Expr::function("duration", vec![param]);
    if op == ComparisonOp::Eq {
        return Predicate::compare(op, left, duration);
    }
    let anchor = || Expr::function("datetime", Vec::new());
    Predicate::compare(op, anchor().add(left), anchor().add(duration))
}

fn wrapper(kind: ScalarKind, spatial: bool) -> Option<&'static str> {
    if spatial {
        Some("point")
    } else if kind == ScalarKind::Duration {
        Some("duration")
    } else {
        None
    }
}

fn wrap_literal(kind: ScalarKind, spatial: bool, param: Expr) -> Expr {
    match wrapper(kind, spatial) {
        Some(func) => Expr::function(func, vec![param]),
        None => param,
    }
}

fn point_distance(
    property: Expr,
    op: ComparisonOp,
    field: &str,
    value: &Json,
    ctx: &mut ExecutionContext,
) -> Result<Predicate, WhereError> {
    let (Some(point), Some(distance)) = (value.get("point"), value.get("distance")) else {
        return Err(WhereError::invalid_value(field, "point distance object", value));
    };
    if !point.is_object() {
        return Err(WhereError::invalid_value(field, "point", point));
    }
    if !distance.is_number() {
        return Err(WhereError::invalid_value(field, "number", distance));
    }
    let point = Expr::param(ctx.param(Value::from(point)));
    let distance = Expr::param(ctx.param(Value::from(distance)));
    let measured = Expr::function(
        "point.distance",
        vec![property, Expr::function("point", vec![point])],
    );
    Ok(Predicate::compare(op, measured, distance))
}

fn expect_string(field: &str, value: &Json) -> Result<Value, WhereError> {
    match value {
        Json::String(text) => Ok(Value::String(text.clone())),
        other => Err(WhereError::invalid_value(field, "string", other)),
    }
}

/// Converts a filter value into a parameter value for a field of `kind`.
///
/// BigInt values arrive as numbers or decimal strings and are bound as exact
/// 64-bit integers.
pub(crate) fn bind_value(kind: ScalarKind, field: &str, value: &Json) -> Result<Value, WhereError> {
    if kind != ScalarKind::BigInt {
        return Ok(Value::from(value));
    }
    match value {
        Json::Number(number) => number
            .as_i64()
            .map(Value::Int)
            .ok_or_else(|| WhereError::invalid_value(field, "64-bit integer", value)),
        Json::String(text) => text
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| WhereError::invalid_value(field, "64-bit integer", value)),
        Json::Array(items) => items
            .iter()
            .map(|item| bind_value(kind, field, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        other => Err(WhereError::invalid_value(field, "64-bit integer", other)),
    }
}
