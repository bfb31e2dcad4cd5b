//! Predicate tree produced by the where-clause compiler.
//!
//! The structures mirror the fragments of Cypher a `WHERE` clause can hold:
//! value expressions, comparisons, boolean combinators and pattern
//! sub-queries. Every [`Predicate`] can be nested inside any other one, so
//! callers embed compiled filters into larger queries without re-validation.

use crate::cypher::Value;

/// Identifier bound to a node or relationship within the query.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Variable(pub String);

impl Variable {
    /// Creates a variable with the supplied name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the variable name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Property access on this variable (`var.path`).
    pub fn property(&self, path: impl Into<String>) -> Expr {
        Expr::Property {
            target: self.clone(),
            path: path.into(),
        }
    }
}

impl From<&str> for Variable {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Reference to a bound query parameter (`$name`).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ParamRef(pub String);

impl ParamRef {
    /// Returns the parameter name without the `$` sigil.
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Aggregation functions usable inside aggregate sub-queries.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AggregateFn {
    /// `count(x)`.
    Count,
    /// `min(x)`.
    Min,
    /// `max(x)`.
    Max,
    /// `avg(x)`.
    Avg,
    /// `sum(x)`.
    Sum,
}

impl AggregateFn {
    /// Cypher function name.
    pub fn as_str(self) -> &'static str {
        match self {
            AggregateFn::Count => "count",
            AggregateFn::Min => "min",
            AggregateFn::Max => "max",
            AggregateFn::Avg => "avg",
            AggregateFn::Sum => "sum",
        }
    }
}

/// Value expressions appearing on either side of a comparison.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Property of a bound variable.
    Property {
        /// Variable owning the property.
        target: Variable,
        /// Database property path.
        path: String,
    },
    /// Bound parameter.
    Param(ParamRef),
    /// Inline literal.
    Literal(Value),
    /// Bare variable reference.
    Variable(Variable),
    /// `coalesce(a, b, ...)`.
    Coalesce(Vec<Expr>),
    /// Scalar function call such as `duration($p)` or `point.distance(a, b)`.
    Function {
        /// Function name, possibly namespaced.
        name: String,
        /// Call arguments.
        args: Vec<Expr>,
    },
    /// Arithmetic addition.
    Add(Box<Expr>, Box<Expr>),
    /// `[variable IN list | map]`.
    ListComprehension {
        /// Iteration variable.
        variable: Variable,
        /// Source list.
        list: Box<Expr>,
        /// Mapping expression evaluated per element.
        map: Box<Expr>,
    },
    /// Aggregation over the rows of an aggregate sub-query.
    Aggregate {
        /// Aggregation function.
        func: AggregateFn,
        /// Aggregated expression.
        arg: Box<Expr>,
    },
}

impl Expr {
    /// Parameter reference expression.
    pub fn param(param: ParamRef) -> Self {
        Expr::Param(param)
    }

    /// Function call expression.
    pub fn function(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Function {
            name: name.into(),
            args,
        }
    }

    /// `coalesce(self, fallback)`.
    pub fn coalesce(self, fallback: Expr) -> Self {
        Expr::Coalesce(vec![self, fallback])
    }

    /// `self + rhs`.
    pub fn add(self, rhs: Expr) -> Self {
        Expr::Add(Box::new(self), Box::new(rhs))
    }

    /// Wraps the expression in an aggregation.
    pub fn aggregate(self, func: AggregateFn) -> Self {
        Expr::Aggregate {
            func,
            arg: Box::new(self),
        }
    }
}

/// Binary comparison operators.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ComparisonOp {
    /// `=`
    Eq,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `IN`
    In,
    /// `CONTAINS`
    Contains,
    /// `STARTS WITH`
    StartsWith,
    /// `ENDS WITH`
    EndsWith,
    /// `=~`
    Matches,
}

impl ComparisonOp {
    /// Cypher spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Lte => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Gte => ">=",
            ComparisonOp::In => "IN",
            ComparisonOp::Contains => "CONTAINS",
            ComparisonOp::StartsWith => "STARTS WITH",
            ComparisonOp::EndsWith => "ENDS WITH",
            ComparisonOp::Matches => "=~",
        }
    }
}

/// Leaf predicates.
#[derive(Clone, Debug, PartialEq)]
pub enum Comparison {
    /// `left <op> right`.
    Binary {
        /// Operator.
        op: ComparisonOp,
        /// Left operand.
        left: Expr,
        /// Right operand.
        right: Expr,
    },
    /// `expr IS NULL`.
    IsNull(Expr),
    /// `expr IS NOT NULL`.
    IsNotNull(Expr),
    /// `variable:Label`.
    HasLabel {
        /// Tested variable.
        target: Variable,
        /// Required label.
        label: String,
    },
}

/// Relationship traversal direction, relative to the pattern source.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    /// `(source)-[]->(target)`
    Out,
    /// `(source)<-[]-(target)`
    In,
}

/// Node element of a pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct NodePattern {
    /// Optional binding.
    pub variable: Option<Variable>,
    /// Label constraints.
    pub labels: Vec<String>,
}

/// Relationship element of a pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct RelationshipPattern {
    /// Optional binding.
    pub variable: Option<Variable>,
    /// Relationship type.
    pub rel_type: String,
    /// Traversal direction.
    pub direction: Direction,
}

/// Single-hop pattern `(source)-[rel]-(target)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    /// Source node, usually the already-bound parent.
    pub source: NodePattern,
    /// Relationship hop.
    pub relationship: RelationshipPattern,
    /// Target node.
    pub target: NodePattern,
}

/// How a pattern sub-query is turned into a boolean.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PatternKind {
    /// At least one match satisfies the condition.
    Exists,
    /// Exactly one match satisfies the condition.
    Single,
    /// The condition is evaluated once over aggregates of all matches.
    Aggregate,
}

/// Quantified pattern sub-query.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternPredicate {
    /// Quantification.
    pub kind: PatternKind,
    /// Matched pattern.
    pub pattern: Pattern,
    /// Optional condition on each match (or on the aggregates).
    pub condition: Option<Box<Predicate>>,
}

/// Boolean expression tree embedded by callers into a `WHERE` clause.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// Leaf comparison.
    Comparison(Comparison),
    /// Conjunction.
    And(Vec<Predicate>),
    /// Disjunction.
    Or(Vec<Predicate>),
    /// Negation.
    Not(Box<Predicate>),
    /// Existential, single or aggregate sub-query.
    Pattern(PatternPredicate),
    /// Opaque fragment supplied by a collaborator.
    Raw(String),
}

impl Predicate {
    /// Conjunction of the supplied terms.
    ///
    /// Nested conjunctions are flattened. Returns `None` when no terms are
    /// supplied and the single term itself when only one is.
    pub fn and<I>(terms: I) -> Option<Predicate>
    where
        I: IntoIterator<Item = Predicate>,
    {
        let mut flattened = Vec::new();
        for term in terms {
            match term {
                Predicate::And(grand) => flattened.extend(grand),
                other => flattened.push(other),
            }
        }
        Self::finish(flattened, Predicate::And)
    }

    /// Disjunction of the supplied terms, with the same collapsing rules as
    /// [`Predicate::and`].
    pub fn or<I>(terms: I) -> Option<Predicate>
    where
        I: IntoIterator<Item = Predicate>,
    {
        let mut flattened = Vec::new();
        for term in terms {
            match term {
                Predicate::Or(grand) => flattened.extend(grand),
                other => flattened.push(other),
            }
        }
        Self::finish(flattened, Predicate::Or)
    }

    fn finish(mut terms: Vec<Predicate>, wrap: fn(Vec<Predicate>) -> Predicate) -> Option<Predicate> {
        match terms.len() {
            0 => None,
            1 => terms.pop(),
            _ => Some(wrap(terms)),
        }
    }

    /// Logical negation; `NOT NOT p` collapses to `p`.
    pub fn negate(self) -> Predicate {
        match self {
            Predicate::Not(inner) => *inner,
            other => Predicate::Not(Box::new(other)),
        }
    }

    /// Binary comparison leaf.
    pub fn compare(op: ComparisonOp, left: Expr, right: Expr) -> Predicate {
        Predicate::Comparison(Comparison::Binary { op, left, right })
    }

    /// `expr IS NULL`.
    pub fn is_null(expr: Expr) -> Predicate {
        Predicate::Comparison(Comparison::IsNull(expr))
    }

    /// `expr IS NOT NULL`.
    pub fn is_not_null(expr: Expr) -> Predicate {
        Predicate::Comparison(Comparison::IsNotNull(expr))
    }

    /// `variable:Label`.
    pub fn has_label(target: Variable, label: impl Into<String>) -> Predicate {
        Predicate::Comparison(Comparison::HasLabel {
            target,
            label: label.into(),
        })
    }

    /// `EXISTS { MATCH pattern [WHERE condition] }`.
    pub fn exists(pattern: Pattern, condition: Option<Predicate>) -> Predicate {
        Predicate::Pattern(PatternPredicate {
            kind: PatternKind::Exists,
            pattern,
            condition: condition.map(Box::new),
        })
    }

    /// Exactly one match of `pattern` satisfies `condition`.
    pub fn single(pattern: Pattern, condition: Option<Predicate>) -> Predicate {
        Predicate::Pattern(PatternPredicate {
            kind: PatternKind::Single,
            pattern,
            condition: condition.map(Box::new),
        })
    }

    /// Condition over aggregates of every match of `pattern`.
    pub fn aggregate(pattern: Pattern, condition: Predicate) -> Predicate {
        Predicate::Pattern(PatternPredicate {
            kind: PatternKind::Aggregate,
            pattern,
            condition: Some(Box::new(condition)),
        })
    }

    /// Opaque fragment.
    pub fn raw(fragment: impl Into<String>) -> Predicate {
        Predicate::Raw(fragment.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str) -> Predicate {
        Predicate::is_null(Variable::new("this").property(name))
    }

    #[test]
    fn and_collapses_empty_and_single() {
        assert_eq!(Predicate::and(Vec::new()), None);
        assert_eq!(Predicate::and([leaf("a")]), Some(leaf("a")));
    }

    #[test]
    fn and_flattens_nested_conjunctions() {
        let inner = Predicate::and([leaf("a"), leaf("b")]).unwrap();
        let outer = Predicate::and([inner, leaf("c")]).unwrap();
        assert_eq!(outer, Predicate::And(vec![leaf("a"), leaf("b"), leaf("c")]));
    }

    #[test]
    fn or_does_not_flatten_conjunctions() {
        let inner = Predicate::and([leaf("a"), leaf("b")]).unwrap();
        let outer = Predicate::or([inner.clone(), leaf("c")]).unwrap();
        assert_eq!(outer, Predicate::Or(vec![inner, leaf("c")]));
    }

    #[test]
    fn double_negation_collapses() {
        assert_eq!(leaf("a").negate().negate(), leaf("a"));
    }
}
