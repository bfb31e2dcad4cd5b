//! `id` filters on types implementing the global `Node` interface.

use crate::cypher::{ComparisonOp, Expr, Predicate, Value, Variable};
use crate::schema::{FieldModel, FieldRef, ScalarKind};
use crate::where_clause::comparison::property_expr;
use crate::where_clause::context::ExecutionContext;
use crate::where_clause::errors::WhereError;
use crate::where_clause::WhereCompiler;
use serde_json::Value as Json;

impl WhereCompiler<'_> {
    /// Decodes the global id in `value` and matches the node it names.
    pub(crate) fn build_global_id(
        &self,
        value: &Json,
        target: &Variable,
        model: &dyn FieldModel,
        ctx: &mut ExecutionContext,
    ) -> Result<Predicate, WhereError> {
        let Json::String(raw) = value else {
            return Err(WhereError::invalid_value("id", "global id string", value));
        };
        let invalid = |reason: String| WhereError::InvalidGlobalId {
            value: raw.clone(),
            reason,
        };
        let decoded = self
            .global_ids()
            .decode(raw)
            .map_err(|err| invalid(err.to_string()))?;
        let node = self
            .schema()
            .node(&decoded.type_name)
            .ok_or_else(|| invalid(format!("type '{}' is not registered", decoded.type_name)))?;
        let id_field = node
            .global_id_field
            .as_deref()
            .or_else(|| model.global_id_field())
            .filter(|_| node.is_global_node)
            .ok_or_else(|| invalid(format!("type '{}' does not implement Node", node.name)))?;
        let Some(FieldRef::Scalar(_, field)) = node.field(id_field) else {
            return Err(WhereError::UnknownField {
                field: id_field.to_owned(),
                type_name: node.name.clone(),
            });
        };
        let id = match field.kind() {
            ScalarKind::Int | ScalarKind::BigInt => decoded
                .id
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| invalid(format!("id '{}' is not an integer", decoded.id)))?,
            _ => Value::String(decoded.id.clone()),
        };
        let param = ctx.param(id);
        let label = Predicate::has_label(target.clone(), node.primary_label());
        let matches_id = Predicate::compare(
            ComparisonOp::Eq,
            property_expr(target, None, field),
            Expr::param(param),
        );
        Ok(Predicate::And(vec![label, matches_id]))
    }
}
