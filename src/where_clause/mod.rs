#![forbid(unsafe_code)]

//! Translation of GraphQL filter inputs into Cypher predicates.
//!
//! [`WhereCompiler::compile`] walks a filter object key by key. Each key is
//! parsed ([`key`]), resolved against the model ([`classify`]) and handed to
//! the matching operation builder. The resulting predicates are folded into a
//! conjunction; literal values are bound into the [`ExecutionContext`].

/// Aggregate (`<relation>Aggregate`) filters.
pub mod aggregate;

/// Resolution of keys to builder categories.
pub mod classify;

/// Scalar comparisons.
pub mod comparison;

/// Connection (`<relation>Connection`) filters.
pub mod connection;

/// Per-query parameter and variable state.
pub mod context;

/// Error types surfaced by the compiler.
pub mod errors;

/// Global node identifier filters.
pub mod global_node;

/// Compound filter-key parsing.
pub mod key;

/// Optional compilation counters.
pub mod profile;

/// Quantified relation filters.
pub mod relation;

pub use classify::{classify, FieldCategory};
pub use comparison::{build_comparison, property_expr, ScalarComparison};
pub use context::ExecutionContext;
pub use errors::{CompileError, WhereError, WhereErrorWithCode};
pub use key::{parse_key, Operator, ParsedKey};
pub use profile::{profile_snapshot, WhereProfileSnapshot};

use crate::config::CompilerConfig;
use crate::cypher::{Predicate, Variable};
use crate::schema::{FieldModel, FieldRef, GlobalIdCodec, RelayGlobalId, SchemaNode, SchemaProvider};
use errors::ResultExt;
use profile::{profile_timer, record_profile_timer, WhereProfileKind};
use serde_json::{Map, Value as Json};
use tracing::{debug, trace};

/// Filter input: an ordered JSON object.
pub type FilterInput = Map<String, Json>;

/// Compiles filter inputs against a schema.
///
/// Holds only shared references; independent queries may compile
/// concurrently, each with its own [`ExecutionContext`].
pub struct WhereCompiler<'a> {
    schema: &'a dyn SchemaProvider,
    config: &'a CompilerConfig,
    global_ids: &'a dyn GlobalIdCodec,
}

static RELAY_IDS: RelayGlobalId = RelayGlobalId;

impl<'a> WhereCompiler<'a> {
    /// Compiler using Relay-style global identifiers.
    pub fn new(schema: &'a dyn SchemaProvider, config: &'a CompilerConfig) -> Self {
        Self {
            schema,
            config,
            global_ids: &RELAY_IDS,
        }
    }

    /// Replaces the global identifier codec.
    pub fn with_global_ids(mut self, codec: &'a dyn GlobalIdCodec) -> Self {
        self.global_ids = codec;
        self
    }

    /// Compiles `filter` for nodes of type `node` bound to `target`.
    ///
    /// Returns `Ok(None)` when the filter imposes no constraint.
    pub fn compile(
        &self,
        filter: &FilterInput,
        target: &Variable,
        node: &SchemaNode,
        ctx: &mut ExecutionContext,
    ) -> Result<Option<Predicate>, CompileError> {
        debug!(
            type_name = %node.name,
            target = %target,
            entries = filter.len(),
            "where.compile.start"
        );
        let predicate = self.compile_filter(filter, target, node, ctx, 0)?;
        debug!(
            type_name = %node.name,
            params = ctx.params().len(),
            constrained = predicate.is_some(),
            "where.compile.done"
        );
        Ok(predicate)
    }

    /// Like [`WhereCompiler::compile`], resolving the node type by name.
    pub fn compile_for_type(
        &self,
        filter: &FilterInput,
        target: &Variable,
        type_name: &str,
        ctx: &mut ExecutionContext,
    ) -> Result<Option<Predicate>, CompileError> {
        let node = self.node(type_name)?;
        self.compile(filter, target, node, ctx)
    }

    pub(crate) fn node(&self, name: &str) -> Result<&'a SchemaNode, WhereError> {
        self.schema
            .node(name)
            .ok_or_else(|| WhereError::UnknownNodeType {
                name: name.to_owned(),
            })
    }

    pub(crate) fn schema(&self) -> &'a dyn SchemaProvider {
        self.schema
    }

    pub(crate) fn global_ids(&self) -> &'a dyn GlobalIdCodec {
        self.global_ids
    }

    pub(crate) fn check_depth(&self, depth: usize) -> Result<(), WhereError> {
        if depth > self.config.max_depth {
            return Err(WhereError::FilterTooDeep {
                max: self.config.max_depth,
            });
        }
        Ok(())
    }

    /// Compiles one filter object at `depth` and folds its entries with AND.
    pub(crate) fn compile_filter(
        &self,
        filter: &FilterInput,
        target: &Variable,
        model: &dyn FieldModel,
        ctx: &mut ExecutionContext,
        depth: usize,
    ) -> Result<Option<Predicate>, CompileError> {
        self.check_depth(depth)?;
        let mut terms = Vec::with_capacity(filter.len());
        for (key, value) in filter {
            trace!(key = %key, depth, type_name = model.type_name(), "where.compile.entry");
            if let Some(term) = self
                .compile_entry(key, value, target, model, ctx, depth)
                .at(key)?
            {
                terms.push(term);
            }
        }
        Ok(Predicate::and(terms))
    }

    fn compile_entry(
        &self,
        key: &str,
        value: &Json,
        target: &Variable,
        model: &dyn FieldModel,
        ctx: &mut ExecutionContext,
        depth: usize,
    ) -> Result<Option<Predicate>, CompileError> {
        if key == "AND" || key == "OR" {
            let terms = self.each_filter(key, value, depth, ctx, |filter, depth, ctx| {
                self.compile_filter(filter, target, model, ctx, depth)
            })?;
            return Ok(combine(key, terms));
        }

        let parsed = parse_key(key)?;
        match classify(key, &parsed, model)? {
            FieldCategory::GlobalId => {
                let start = profile_timer();
                let result = self.build_global_id(value, target, model, ctx);
                record_profile_timer(WhereProfileKind::GlobalId, start);
                Ok(Some(result?))
            }
            FieldCategory::Relation(rel) => {
                let start = profile_timer();
                let result = self.build_relation(&parsed, rel, value, target, ctx, depth);
                record_profile_timer(WhereProfileKind::Relation, start);
                result
            }
            FieldCategory::Aggregate(rel) => {
                let start = profile_timer();
                let result = self.build_aggregate(
                    &parsed,
                    FieldRef::Relation(rel),
                    value,
                    target,
                    ctx,
                    depth,
                );
                record_profile_timer(WhereProfileKind::Aggregate, start);
                result
            }
            FieldCategory::Connection(conn) => {
                let start = profile_timer();
                let result = self.build_connection(&parsed, conn, model, value, target, ctx, depth);
                record_profile_timer(WhereProfileKind::Connection, start);
                result
            }
            FieldCategory::Scalar(category, field) => {
                let start = profile_timer();
                let property = property_expr(target, parsed.prefix.as_deref(), field);
                let result = if value.is_null() {
                    Ok(if parsed.is_not {
                        Predicate::is_not_null(property)
                    } else {
                        Predicate::is_null(property)
                    })
                } else {
                    let cmp = ScalarComparison {
                        property,
                        operator: parsed.base_operator(),
                        field,
                        category,
                    };
                    build_comparison(cmp, value, ctx)
                        .map(|p| if parsed.is_not { p.negate() } else { p })
                };
                record_profile_timer(WhereProfileKind::Scalar, start);
                Ok(Some(result?))
            }
        }
    }

    /// Compiles every element of a combinator list with `compile_one`.
    ///
    /// The value must be a list of objects; each element is one level deeper.
    pub(crate) fn each_filter<F>(
        &self,
        key: &str,
        value: &Json,
        depth: usize,
        ctx: &mut ExecutionContext,
        mut compile_one: F,
    ) -> Result<Vec<Predicate>, CompileError>
    where
        F: FnMut(&FilterInput, usize, &mut ExecutionContext) -> Result<Option<Predicate>, CompileError>,
    {
        let Json::Array(items) = value else {
            return Err(WhereError::invalid_value(key, "list of filter objects", value).into());
        };
        let mut terms = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            let Json::Object(filter) = item else {
                return Err(WhereError::invalid_value(key, "filter object", item)).at(idx);
            };
            if let Some(term) = compile_one(filter, depth + 1, ctx).at(idx)? {
                terms.push(term);
            }
        }
        Ok(terms)
    }
}

/// Folds combinator terms for `AND` / `OR`.
pub(crate) fn combine(key: &str, terms: Vec<Predicate>) -> Option<Predicate> {
    if key == "OR" {
        Predicate::or(terms)
    } else {
        Predicate::and(terms)
    }
}

/// Requires a filter object (or null) as value.
pub(crate) fn expect_object<'v>(
    field: &str,
    value: &'v Json,
) -> Result<Option<&'v FilterInput>, WhereError> {
    match value {
        Json::Object(map) => Ok(Some(map)),
        Json::Null => Ok(None),
        other => Err(WhereError::invalid_value(field, "filter object", other)),
    }
}
