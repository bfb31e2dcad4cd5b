//! Aggregate filters (`actorsAggregate: { count_GT: 2 }`).
//!
//! Conditions are evaluated once over all matches of the relation pattern,
//! comparing counts and per-field aggregations against bound parameters.

use crate::cypher::{AggregateFn, ComparisonOp, Expr, Predicate, Value, Variable};
use crate::schema::{FieldModel, FieldRef, RelationField, ScalarCategory, ScalarField, ScalarKind};
use crate::where_clause::comparison::{bind_value, ordered, ordering_op, property_expr};
use crate::where_clause::context::ExecutionContext;
use crate::where_clause::errors::{CompileError, ResultExt, WhereError};
use crate::where_clause::key::{parse_key, Operator, ParsedKey};
use crate::where_clause::relation::relation_pattern;
use crate::where_clause::{combine, FilterInput, WhereCompiler};
use serde_json::Value as Json;
use tracing::trace;

/// Aggregation applied to a node or edge property.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Aggregation {
    /// `avg(x)`
    Average,
    /// `sum(x)`
    Sum,
    /// `min(x)`
    Min,
    /// `max(x)`
    Max,
    /// `min(size(x))`
    Shortest,
    /// `max(size(x))`
    Longest,
}

impl Aggregation {
    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "AVERAGE" => Aggregation::Average,
            "SUM" => Aggregation::Sum,
            "MIN" => Aggregation::Min,
            "MAX" => Aggregation::Max,
            "SHORTEST" => Aggregation::Shortest,
            "LONGEST" => Aggregation::Longest,
            _ => return None,
        })
    }

    fn token(self) -> &'static str {
        match self {
            Aggregation::Average => "AVERAGE",
            Aggregation::Sum => "SUM",
            Aggregation::Min => "MIN",
            Aggregation::Max => "MAX",
            Aggregation::Shortest => "SHORTEST",
            Aggregation::Longest => "LONGEST",
        }
    }

    fn accepts(self, kind: ScalarKind) -> bool {
        match self {
            Aggregation::Average | Aggregation::Sum => kind.is_numeric(),
            Aggregation::Min | Aggregation::Max => {
                kind.is_numeric() || kind.is_temporal() || kind == ScalarKind::Duration
            }
            Aggregation::Shortest | Aggregation::Longest => kind.is_textual(),
        }
    }
}

/// `<field>_<AGGREGATION>_<COMPARISON>` inside `node` / `edge` inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregateKey {
    /// Field name.
    pub field: String,
    /// Aggregation.
    pub aggregation: Aggregation,
    /// Comparison applied to the aggregate.
    pub operator: ComparisonOp,
}

/// Parses an aggregate field key such as `title_SHORTEST_LT`.
pub fn parse_aggregate_key(key: &str) -> Result<AggregateKey, WhereError> {
    let malformed = || WhereError::MalformedFilterKey {
        key: key.to_owned(),
    };
    let mut parts = key.rsplitn(3, '_');
    let (Some(op), Some(aggregation), Some(field)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };
    let operator = match op {
        "EQUAL" => ComparisonOp::Eq,
        "LT" => ComparisonOp::Lt,
        "LTE" => ComparisonOp::Lte,
        "GT" => ComparisonOp::Gt,
        "GTE" => ComparisonOp::Gte,
        _ => return Err(malformed()),
    };
    let aggregation = Aggregation::from_token(aggregation).ok_or_else(malformed)?;
    if field.is_empty() {
        return Err(malformed());
    }
    Ok(AggregateKey {
        field: field.to_owned(),
        aggregation,
        operator,
    })
}

impl WhereCompiler<'_> {
    pub(crate) fn build_aggregate(
        &self,
        parsed: &ParsedKey,
        field: FieldRef<'_>,
        value: &Json,
        parent: &Variable,
        ctx: &mut ExecutionContext,
        depth: usize,
    ) -> Result<Option<Predicate>, CompileError> {
        let FieldRef::Relation(rel) = field else {
            return Err(WhereError::AggregateFilterMustTargetRelation {
                field: parsed.field_name.clone(),
            }
            .into());
        };
        if let Some(op) = parsed.operator {
            let field = format!("{}Aggregate", rel.field_name);
            return Err(WhereError::unsupported(op, field, &rel.target).into());
        }
        trace!(
            relation = %rel.field_name,
            edge_properties = rel.properties.is_some(),
            depth,
            "where.aggregate"
        );
        let target = self.node(&rel.target)?;
        let filter = field_object(&parsed.field_name, value)?;
        let child = ctx.fresh_variable();
        let edge = rel.properties.as_ref().map(|_| ctx.fresh_variable());
        let scope = AggregateScope {
            rel,
            child: &child,
            edge: edge.as_ref(),
        };
        let Some(condition) = self.aggregate_conditions(&scope, filter, ctx, depth + 1)? else {
            return Ok(None);
        };
        let pattern = relation_pattern(parent, rel, edge.clone(), child.clone(), target);
        Ok(Some(Predicate::aggregate(pattern, condition)))
    }

    fn aggregate_conditions(
        &self,
        scope: &AggregateScope<'_>,
        filter: &FilterInput,
        ctx: &mut ExecutionContext,
        depth: usize,
    ) -> Result<Option<Predicate>, CompileError> {
        self.check_depth(depth)?;
        let mut terms = Vec::new();
        for (key, value) in filter {
            let term = match key.as_str() {
                "AND" | "OR" => {
                    let terms = self
                        .each_filter(key, value, depth, ctx, |inner, depth, ctx| {
                            self.aggregate_conditions(scope, inner, ctx, depth)
                        })
                        .at(key)?;
                    combine(key, terms)
                }
                "node" => {
                    let target = self.node(&scope.rel.target).at(key)?;
                    let fields = field_object(key, value).at(key)?;
                    self.aggregate_fields(target, scope.child, fields, ctx, depth + 1)
                        .at(key)?
                }
                "edge" => {
                    let (Some(props), Some(edge)) = (scope.rel.properties.as_deref(), scope.edge) else {
                        return Err(scope.unknown(key)).at(key);
                    };
                    let model = self
                        .schema()
                        .relationship_properties(props)
                        .ok_or_else(|| WhereError::UnknownNodeType {
                            name: props.to_owned(),
                        })
                        .at(key)?;
                    let fields = field_object(key, value).at(key)?;
                    self.aggregate_fields(model, edge, fields, ctx, depth + 1)
                        .at(key)?
                }
                _ => Some(count_condition(scope, key, value, ctx).at(key)?),
            };
            terms.extend(term);
        }
        Ok(Predicate::and(terms))
    }

    fn aggregate_fields(
        &self,
        model: &dyn FieldModel,
        target: &Variable,
        filter: &FilterInput,
        ctx: &mut ExecutionContext,
        depth: usize,
    ) -> Result<Option<Predicate>, CompileError> {
        self.check_depth(depth)?;
        let mut terms = Vec::with_capacity(filter.len());
        for (key, value) in filter {
            let term = if key == "AND" || key == "OR" {
                let terms = self
                    .each_filter(key, value, depth, ctx, |inner, depth, ctx| {
                        self.aggregate_fields(model, target, inner, ctx, depth)
                    })
                    .at(key)?;
                combine(key, terms)
            } else {
                Some(field_condition(model, target, key, value, ctx).at(key)?)
            };
            terms.extend(term);
        }
        Ok(Predicate::and(terms))
    }
}

fn field_object<'v>(key: &str, value: &'v Json) -> Result<&'v FilterInput, WhereError> {
    match value {
        Json::Object(fields) => Ok(fields),
        other => Err(WhereError::invalid_value(key, "filter object", other)),
    }
}

struct AggregateScope<'a> {
    rel: &'a RelationField,
    child: &'a Variable,
    edge: Option<&'a Variable>,
}

impl AggregateScope<'_> {
    fn unknown(&self, key: &str) -> WhereError {
        WhereError::UnknownField {
            field: key.to_owned(),
            type_name: format!("{}Aggregate", self.rel.field_name),
        }
    }
}

/// `count`, `count_LT`, ... over the matched nodes.
fn count_condition(
    scope: &AggregateScope<'_>,
    key: &str,
    value: &Json,
    ctx: &mut ExecutionContext,
) -> Result<Predicate, WhereError> {
    let parsed = parse_key(key)?;
    if parsed.field_name != "count" || parsed.prefix.is_some() || parsed.is_aggregate {
        return Err(scope.unknown(key));
    }
    let operator = parsed.operator.unwrap_or(Operator::Eq);
    let op = ordering_op(operator)
        .ok_or_else(|| WhereError::unsupported(operator, "count", "Int"))?;
    let Some(count) = value.as_i64() else {
        return Err(WhereError::invalid_value(key, "integer", value));
    };
    let param = Expr::param(ctx.param(count));
    let counted = Expr::Variable(scope.child.clone()).aggregate(AggregateFn::Count);
    Ok(Predicate::compare(op, counted, param))
}

fn field_condition(
    model: &dyn FieldModel,
    target: &Variable,
    key: &str,
    value: &Json,
    ctx: &mut ExecutionContext,
) -> Result<Predicate, WhereError> {
    let agg_key = parse_aggregate_key(key)?;
    let Some(FieldRef::Scalar(category, field)) = model.field(&agg_key.field) else {
        return Err(WhereError::UnknownField {
            field: agg_key.field,
            type_name: model.type_name().to_owned(),
        });
    };
    let kind = aggregate_kind(category, field);
    if field.type_meta.list || !agg_key.aggregation.accepts(kind) {
        return Err(WhereError::unsupported(
            agg_key.aggregation.token(),
            &field.field_name,
            &field.type_meta.name,
        ));
    }
    let property = property_expr(target, None, field);
    let (aggregated, bound) = match agg_key.aggregation {
        Aggregation::Shortest | Aggregation::Longest => {
            let func = if agg_key.aggregation == Aggregation::Shortest {
                AggregateFn::Min
            } else {
                AggregateFn::Max
            };
            let Some(length) = value.as_i64() else {
                return Err(WhereError::invalid_value(key, "integer", value));
            };
            (
                Expr::function("size", vec![property]).aggregate(func),
                Value::Int(length),
            )
        }
        Aggregation::Average => {
            let bound = if kind == ScalarKind::BigInt {
                bind_value(kind, &field.field_name, value)?
            } else if value.is_number() {
                Value::from(value)
            } else {
                return Err(WhereError::invalid_value(key, "number", value));
            };
            (property.aggregate(AggregateFn::Avg), bound)
        }
        Aggregation::Sum => (
            property.aggregate(AggregateFn::Sum),
            bind_value(kind, &field.field_name, value)?,
        ),
        Aggregation::Min => (
            property.aggregate(AggregateFn::Min),
            bind_value(kind, &field.field_name, value)?,
        ),
        Aggregation::Max => (
            property.aggregate(AggregateFn::Max),
            bind_value(kind, &field.field_name, value)?,
        ),
    };
    let param = Expr::param(ctx.param(bound));
    let measured_kind = match agg_key.aggregation {
        Aggregation::Min | Aggregation::Max => kind,
        _ => ScalarKind::Float,
    };
    Ok(ordered(measured_kind, agg_key.operator, aggregated, param))
}

fn aggregate_kind(category: ScalarCategory, field: &ScalarField) -> ScalarKind {
    if category == ScalarCategory::Duration {
        ScalarKind::Duration
    } else {
        field.kind()
    }
}
