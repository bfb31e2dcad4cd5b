//! Explain rendering of predicate trees as Cypher text.
//!
//! This output is meant for logs, the explain CLI and tests. Query
//! serialization for execution belongs to the caller's query builder.

use crate::cypher::ast::{
    Comparison, Direction, Expr, NodePattern, Pattern, PatternKind, PatternPredicate, Predicate,
    RelationshipPattern, Variable,
};
use std::fmt::{self, Display, Formatter};

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Property { target, path } => write!(f, "{target}.{path}"),
            Expr::Param(param) => write!(f, "${}", param.name()),
            Expr::Literal(value) => write!(f, "{value}"),
            Expr::Variable(var) => write!(f, "{var}"),
            Expr::Coalesce(args) => {
                f.write_str("coalesce(")?;
                write_list(f, args)?;
                f.write_str(")")
            }
            Expr::Function { name, args } => {
                write!(f, "{name}(")?;
                write_list(f, args)?;
                f.write_str(")")
            }
            Expr::Add(lhs, rhs) => write!(f, "({lhs} + {rhs})"),
            Expr::ListComprehension {
                variable,
                list,
                map,
            } => write!(f, "[{variable} IN {list} | {map}]"),
            Expr::Aggregate { func, arg } => write!(f, "{}({arg})", func.as_str()),
        }
    }
}

fn write_list<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl Display for Comparison {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Binary { op, left, right } => write!(f, "{left} {} {right}", op.as_str()),
            Comparison::IsNull(expr) => write!(f, "{expr} IS NULL"),
            Comparison::IsNotNull(expr) => write!(f, "{expr} IS NOT NULL"),
            Comparison::HasLabel { target, label } => write!(f, "{target}:{label}"),
        }
    }
}

impl Display for NodePattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        if let Some(var) = &self.variable {
            write!(f, "{var}")?;
        }
        for label in &self.labels {
            write!(f, ":{label}")?;
        }
        f.write_str(")")
    }
}

impl Display for RelationshipPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let var = self.variable.as_ref().map(Variable::name).unwrap_or("");
        match self.direction {
            Direction::Out => write!(f, "-[{var}:{}]->", self.rel_type),
            Direction::In => write!(f, "<-[{var}:{}]-", self.rel_type),
        }
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.source, self.relationship, self.target)
    }
}

impl Display for PatternPredicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let pattern = &self.pattern;
        match (self.kind, self.condition.as_deref()) {
            (PatternKind::Exists, None) => write!(f, "EXISTS {{ MATCH {pattern} }}"),
            (PatternKind::Exists, Some(cond)) => {
                write!(f, "EXISTS {{ MATCH {pattern} WHERE {cond} }}")
            }
            (PatternKind::Single, None) => write!(f, "size([{pattern} | 1]) = 1"),
            (PatternKind::Single, Some(cond)) => {
                write!(f, "size([{pattern} WHERE {cond} | 1]) = 1")
            }
            (PatternKind::Aggregate, None) => write!(f, "EXISTS {{ MATCH {pattern} }}"),
            (PatternKind::Aggregate, Some(cond)) => write!(
                f,
                "EXISTS {{ MATCH {pattern} WITH {cond} AS aggregation WHERE aggregation }}"
            ),
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Comparison(cmp) => write!(f, "{cmp}"),
            Predicate::And(terms) => write_joined(f, terms, " AND "),
            Predicate::Or(terms) => write_joined(f, terms, " OR "),
            Predicate::Not(inner) => write!(f, "NOT ({inner})"),
            Predicate::Pattern(pattern) => write!(f, "{pattern}"),
            Predicate::Raw(fragment) => f.write_str(fragment),
        }
    }
}

fn write_joined(f: &mut Formatter<'_>, terms: &[Predicate], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (idx, term) in terms.iter().enumerate() {
        if idx > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{term}")?;
    }
    f.write_str(")")
}
