//! Connection filters (`actorsConnection_SOME: { node: {...}, edge: {...} }`).

use crate::cypher::{Predicate, Variable};
use crate::schema::{ConnectionField, FieldModel, FieldRef, RelationField, SchemaNode};
use crate::where_clause::context::ExecutionContext;
use crate::where_clause::errors::{CompileError, ResultExt, WhereError};
use crate::where_clause::key::ParsedKey;
use crate::where_clause::relation::{check_quantifier, null_relation, quantify, relation_pattern};
use crate::where_clause::{combine, expect_object, FilterInput, WhereCompiler};
use serde_json::Value as Json;
use tracing::trace;

/// Variables and models visible inside one connection filter.
struct ConnectionScope<'a> {
    connection: &'a ConnectionField,
    rel: &'a RelationField,
    target: &'a SchemaNode,
    node: &'a Variable,
    edge: &'a Variable,
}

impl WhereCompiler<'_> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn build_connection(
        &self,
        parsed: &ParsedKey,
        connection: &ConnectionField,
        owner: &dyn FieldModel,
        value: &Json,
        parent: &Variable,
        ctx: &mut ExecutionContext,
        depth: usize,
    ) -> Result<Option<Predicate>, CompileError> {
        let Some(FieldRef::Relation(rel)) = owner.field(&connection.relation) else {
            return Err(WhereError::UnknownField {
                field: connection.relation.clone(),
                type_name: owner.type_name().to_owned(),
            }
            .into());
        };
        let op = check_quantifier(parsed, rel)?;
        trace!(
            connection = %connection.field_name,
            relation = %rel.field_name,
            quantifier = %op,
            negated = parsed.is_not,
            depth,
            "where.connection"
        );
        let target = self.node(&rel.target)?;
        let filter = expect_object(&parsed.field_name, value)?;
        let node = ctx.fresh_variable();
        let edge = ctx.fresh_variable();
        let pattern = relation_pattern(parent, rel, Some(edge.clone()), node.clone(), target);
        let Some(filter) = filter else {
            return Ok(Some(null_relation(parsed, op, pattern, value)?));
        };
        let scope = ConnectionScope {
            connection,
            rel,
            target,
            node: &node,
            edge: &edge,
        };
        let inner = self.connection_where(&scope, filter, ctx, depth + 1)?;
        Ok(quantify(op, parsed.is_not, pattern, inner))
    }

    fn connection_where(
        &self,
        scope: &ConnectionScope<'_>,
        filter: &FilterInput,
        ctx: &mut ExecutionContext,
        depth: usize,
    ) -> Result<Option<Predicate>, CompileError> {
        self.check_depth(depth)?;
        let mut terms = Vec::with_capacity(filter.len());
        for (key, value) in filter {
            let term = match key.as_str() {
                "AND" | "OR" => {
                    let terms = self
                        .each_filter(key, value, depth, ctx, |inner, depth, ctx| {
                            self.connection_where(scope, inner, ctx, depth)
                        })
                        .at(key)?;
                    combine(key, terms)
                }
                "node" | "node_NOT" => {
                    let Some(nested) = expect_object(key, value).at(key)? else {
                        continue;
                    };
                    let inner = self
                        .compile_filter(nested, scope.node, scope.target, ctx, depth + 1)
                        .at(key)?;
                    negate_if(inner, key.ends_with("_NOT"))
                }
                "edge" | "edge_NOT" => {
                    let Some(nested) = expect_object(key, value).at(key)? else {
                        continue;
                    };
                    let Some(props) = scope.rel.properties.as_deref() else {
                        return Err(scope.unknown(key)).at(key);
                    };
                    let model = self
                        .schema()
                        .relationship_properties(props)
                        .ok_or_else(|| WhereError::UnknownNodeType {
                            name: props.to_owned(),
                        })
                        .at(key)?;
                    let inner = self
                        .compile_filter(nested, scope.edge, model, ctx, depth + 1)
                        .at(key)?;
                    negate_if(inner, key.ends_with("_NOT"))
                }
                _ => return Err(scope.unknown(key)).at(key),
            };
            terms.extend(term);
        }
        Ok(Predicate::and(terms))
    }
}

impl ConnectionScope<'_> {
    fn unknown(&self, key: &str) -> WhereError {
        WhereError::UnknownField {
            field: key.to_owned(),
            type_name: format!("{}Where", self.connection.field_name),
        }
    }
}

fn negate_if(predicate: Option<Predicate>, negated: bool) -> Option<Predicate> {
    if negated {
        predicate.map(Predicate::negate)
    } else {
        predicate
    }
}
