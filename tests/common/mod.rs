#![allow(dead_code)]

use serde_json::Value as Json;
use sombra_where::config::CompilerConfig;
use sombra_where::cypher::{Comparison, ComparisonOp, Expr, ParamTable, Predicate, Value, Variable};
use sombra_where::schema::{
    ConnectionField, InMemorySchema, RelationDirection, RelationField, RelationshipProperties,
    ScalarField, SchemaNode,
};
use sombra_where::where_clause::{CompileError, ExecutionContext, FilterInput, WhereCompiler};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Movie / Actor / Person schema shared by the integration suites.
pub fn movie_schema() -> InMemorySchema {
    let movie = SchemaNode::new("Movie")
        .with_primitive(ScalarField::new("id", "ID"))
        .with_primitive(ScalarField::new("title", "String"))
        .with_primitive(ScalarField::new("releasedIn", "Int"))
        .with_primitive(ScalarField::new("averageRating", "Float"))
        .with_primitive(ScalarField::new("fileSize", "BigInt"))
        .with_primitive(ScalarField::new("runtime", "Duration"))
        .with_primitive(ScalarField::new("isFavorite", "Boolean"))
        .with_primitive(ScalarField::list("tags", "String"))
        .with_primitive(ScalarField::new("popularity", "Float").with_coalesce(0.0))
        .with_temporal(ScalarField::new("premiere", "DateTime"))
        .with_enum(ScalarField::new("genre", "Genre"))
        .with_point(ScalarField::new("location", "Point"))
        .with_relation(
            RelationField::new("actors", "ACTED_IN", RelationDirection::In, "Actor")
                .with_properties("ActedIn"),
        )
        .with_relation(
            RelationField::new("director", "DIRECTED", RelationDirection::In, "Person").single(),
        )
        .with_connection(ConnectionField::new("actorsConnection", "actors"))
        .global_node("id");
    let actor = SchemaNode::new("Actor")
        .with_primitive(ScalarField::new("name", "String"))
        .with_primitive(ScalarField::new("age", "Int"))
        .with_relation(RelationField::new(
            "actedIn",
            "ACTED_IN",
            RelationDirection::Out,
            "Movie",
        ))
        .with_relation(RelationField::new(
            "friends",
            "FRIENDS_WITH",
            RelationDirection::Out,
            "Actor",
        ));
    let person = SchemaNode::new("Person").with_primitive(ScalarField::new("name", "String"));
    let acted_in = RelationshipProperties::new("ActedIn")
        .with_primitive(ScalarField::new("screenTime", "Int"))
        .with_primitive(ScalarField::new("role", "String"));
    InMemorySchema::new()
        .with_node(movie)
        .with_node(actor)
        .with_node(person)
        .with_relationship_properties(acted_in)
}

/// Filter object from a JSON literal.
pub fn filter(value: Json) -> FilterInput {
    match value {
        Json::Object(map) => map,
        other => panic!("filter must be an object, got {other}"),
    }
}

/// Compiled predicate together with its parameters.
pub struct Compiled {
    pub predicate: Option<Predicate>,
    pub params: ParamTable,
}

impl Compiled {
    pub fn rendered(&self) -> String {
        self.predicate
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "<no constraint>".to_string())
    }

    pub fn param(&self, name: &str) -> &Value {
        self.params
            .get(name)
            .unwrap_or_else(|| panic!("parameter {name} not bound"))
    }
}

pub fn compile_with(
    schema: &InMemorySchema,
    config: &CompilerConfig,
    type_name: &str,
    input: Json,
) -> Result<Compiled, CompileError> {
    let compiler = WhereCompiler::new(schema, config);
    let mut ctx = ExecutionContext::new(config);
    let predicate =
        compiler.compile_for_type(&filter(input), &Variable::new("this"), type_name, &mut ctx)?;
    Ok(Compiled {
        predicate,
        params: ctx.into_params(),
    })
}

/// Compiles against the movie schema with default configuration.
pub fn compile(type_name: &str, input: Json) -> Result<Compiled, CompileError> {
    compile_with(&movie_schema(), &CompilerConfig::default(), type_name, input)
}

/// In-memory record keyed by property name.
pub type Record = BTreeMap<String, Value>;

pub fn record<I, K, V>(props: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    props
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Movie record with a title and one more property.
pub fn movie(title: &str, prop: &str, value: impl Into<Value>) -> Record {
    record([
        ("title".to_string(), Value::from(title)),
        (prop.to_string(), value.into()),
    ])
}

/// Evaluates a scalar predicate against a record bound to `this`.
///
/// Only property comparisons and boolean combinators are supported; pattern
/// sub-queries need a graph and panic here.
pub fn eval(predicate: &Predicate, params: &ParamTable, record: &Record) -> bool {
    match predicate {
        Predicate::And(terms) => terms.iter().all(|t| eval(t, params, record)),
        Predicate::Or(terms) => terms.iter().any(|t| eval(t, params, record)),
        Predicate::Not(inner) => !eval(inner, params, record),
        Predicate::Comparison(cmp) => eval_comparison(cmp, params, record),
        other => panic!("cannot evaluate {other}"),
    }
}

fn eval_comparison(cmp: &Comparison, params: &ParamTable, record: &Record) -> bool {
    match cmp {
        Comparison::IsNull(expr) => resolve(expr, params, record).is_null(),
        Comparison::IsNotNull(expr) => !resolve(expr, params, record).is_null(),
        Comparison::Binary { op, left, right } => {
            let left = resolve(left, params, record);
            let right = resolve(right, params, record);
            if left.is_null() || right.is_null() {
                return false;
            }
            match op {
                ComparisonOp::Eq => compare(&left, &right) == Some(Ordering::Equal),
                ComparisonOp::Lt => compare(&left, &right) == Some(Ordering::Less),
                ComparisonOp::Lte => matches!(
                    compare(&left, &right),
                    Some(Ordering::Less | Ordering::Equal)
                ),
                ComparisonOp::Gt => compare(&left, &right) == Some(Ordering::Greater),
                ComparisonOp::Gte => matches!(
                    compare(&left, &right),
                    Some(Ordering::Greater | Ordering::Equal)
                ),
                ComparisonOp::In => match &right {
                    Value::List(items) => items
                        .iter()
                        .any(|item| compare(&left, item) == Some(Ordering::Equal)),
                    _ => false,
                },
                ComparisonOp::Contains => text_pair(&left, &right).is_some_and(|(l, r)| l.contains(r)),
                ComparisonOp::StartsWith => {
                    text_pair(&left, &right).is_some_and(|(l, r)| l.starts_with(r))
                }
                ComparisonOp::EndsWith => text_pair(&left, &right).is_some_and(|(l, r)| l.ends_with(r)),
                ComparisonOp::Matches => panic!("regex matching is not evaluated"),
            }
        }
        Comparison::HasLabel { .. } => panic!("labels are not evaluated"),
    }
}

fn text_pair<'v>(left: &'v Value, right: &'v Value) -> Option<(&'v str, &'v str)> {
    match (left, right) {
        (Value::String(l), Value::String(r)) => Some((l, r)),
        _ => None,
    }
}

fn resolve(expr: &Expr, params: &ParamTable, record: &Record) -> Value {
    match expr {
        Expr::Property { target, path } => {
            assert_eq!(target.name(), "this", "evaluator only binds `this`");
            record.get(path).cloned().unwrap_or(Value::Null)
        }
        Expr::Param(param) => params.value(param).cloned().unwrap_or(Value::Null),
        Expr::Literal(value) => value.clone(),
        Expr::Coalesce(args) => args
            .iter()
            .map(|arg| resolve(arg, params, record))
            .find(|v| !v.is_null())
            .unwrap_or(Value::Null),
        other => panic!("cannot evaluate expression {other}"),
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Int(l), Value::Int(r)) => Some(l.cmp(r)),
        (Value::Int(l), Value::Float(r)) => (*l as f64).partial_cmp(r),
        (Value::Float(l), Value::Int(r)) => l.partial_cmp(&(*r as f64)),
        (Value::Float(l), Value::Float(r)) => l.partial_cmp(r),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

/// Titles of the records matched by `input` on `Movie`.
pub fn matching_titles(input: Json, records: &[Record]) -> Vec<String> {
    let compiled = compile("Movie", input).expect("filter should compile");
    records
        .iter()
        .filter(|r| match &compiled.predicate {
            Some(p) => eval(p, &compiled.params, r),
            None => true,
        })
        .filter_map(|r| match r.get("title") {
            Some(Value::String(title)) => Some(title.clone()),
            _ => None,
        })
        .collect()
}
