//! Relation filters (`actors_SOME: { name: "Keanu" }`).
//!
//! The related node is matched in an existential sub-query; the quantifier
//! in the key decides how matches are counted.

use crate::cypher::{NodePattern, Pattern, Predicate, RelationshipPattern, Variable};
use crate::schema::{RelationField, SchemaNode};
use crate::where_clause::context::ExecutionContext;
use crate::where_clause::errors::{CompileError, WhereError};
use crate::where_clause::key::{Operator, ParsedKey};
use crate::where_clause::{expect_object, WhereCompiler};
use serde_json::Value as Json;
use tracing::trace;

/// `(parent)-[rel_var:TYPE]->(child:Label)` oriented by the descriptor.
pub fn relation_pattern(
    parent: &Variable,
    rel: &RelationField,
    rel_var: Option<Variable>,
    child: Variable,
    target: &SchemaNode,
) -> Pattern {
    Pattern {
        source: NodePattern {
            variable: Some(parent.clone()),
            labels: Vec::new(),
        },
        relationship: RelationshipPattern {
            variable: rel_var,
            rel_type: rel.rel_type.clone(),
            direction: rel.direction.into(),
        },
        target: NodePattern {
            variable: Some(child),
            labels: target.labels(),
        },
    }
}

/// Operators a relation or connection key may carry, checked against the
/// descriptor's cardinality.
pub(crate) fn check_quantifier(
    parsed: &ParsedKey,
    rel: &RelationField,
) -> Result<Operator, WhereError> {
    let op = parsed.base_operator();
    let allowed = match op {
        Operator::Eq => true,
        op if op.is_quantifier() => rel.list,
        _ => false,
    };
    if !allowed {
        return Err(WhereError::unsupported(
            parsed.operator.unwrap_or(op),
            &parsed.field_name,
            &rel.target,
        ));
    }
    Ok(op)
}

/// Applies a quantifier to a pattern and its per-match condition.
///
/// `ALL` over a vacuous condition imposes no constraint.
pub(crate) fn quantify(
    op: Operator,
    negated: bool,
    pattern: Pattern,
    inner: Option<Predicate>,
) -> Option<Predicate> {
    let predicate = match op {
        Operator::All => {
            let inner = inner?;
            Predicate::exists(pattern, Some(inner.negate())).negate()
        }
        Operator::None => Predicate::exists(pattern, inner).negate(),
        Operator::Single => Predicate::single(pattern, inner),
        _ => Predicate::exists(pattern, inner),
    };
    Some(if negated {
        predicate.negate()
    } else {
        predicate
    })
}

/// `rel: null` asserts absence, `rel_NOT: null` presence.
pub(crate) fn null_relation(
    parsed: &ParsedKey,
    op: Operator,
    pattern: Pattern,
    value: &Json,
) -> Result<Predicate, WhereError> {
    if op != Operator::Eq {
        return Err(WhereError::invalid_value(
            &parsed.field_name,
            "filter object",
            value,
        ));
    }
    let exists = Predicate::exists(pattern, None);
    Ok(if parsed.is_not {
        exists
    } else {
        exists.negate()
    })
}

impl WhereCompiler<'_> {
    pub(crate) fn build_relation(
        &self,
        parsed: &ParsedKey,
        rel: &RelationField,
        value: &Json,
        parent: &Variable,
        ctx: &mut ExecutionContext,
        depth: usize,
    ) -> Result<Option<Predicate>, CompileError> {
        let op = check_quantifier(parsed, rel)?;
        trace!(
            relation = %rel.field_name,
            quantifier = %op,
            negated = parsed.is_not,
            depth,
            "where.relation"
        );
        let target = self.node(&rel.target)?;
        let filter = expect_object(&parsed.field_name, value)?;
        let child = ctx.fresh_variable();
        let pattern = relation_pattern(parent, rel, None, child.clone(), target);
        let Some(filter) = filter else {
            return Ok(Some(null_relation(parsed, op, pattern, value)?));
        };
        let inner = self.compile_filter(filter, &child, target, ctx, depth + 1)?;
        Ok(quantify(op, parsed.is_not, pattern, inner))
    }
}
