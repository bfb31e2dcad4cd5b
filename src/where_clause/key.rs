//! Decomposition of compound filter keys (`<prefix.><field><Aggregate>_<OPERATOR>`).

use crate::where_clause::errors::WhereError;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

static KEY_GRAMMAR: OnceLock<Regex> = OnceLock::new();

fn key_grammar() -> &'static Regex {
    KEY_GRAMMAR.get_or_init(|| {
        Regex::new(
            r"^(?P<prefix>[A-Za-z0-9]+\.)?(?P<field>[_A-Za-z][_A-Za-z0-9]*?)(?P<aggregate>Aggregate)?(?:_(?P<op>NOT(?:_[A-Z]+)*|[A-Z]+(?:_[A-Z]+)*))?$",
        )
        .expect("filter key grammar is a valid regex")
    })
}

/// Operator suffix of a filter key.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Operator {
    /// Implicit equality (no suffix).
    Eq,
    /// `NOT`: negated equality.
    Not,
    /// Value is one of a list.
    In,
    /// Negated `IN`.
    NotIn,
    /// List field contains the value.
    Includes,
    /// Negated `INCLUDES`.
    NotIncludes,
    /// Substring match.
    Contains,
    /// Negated `CONTAINS`.
    NotContains,
    /// Prefix match.
    StartsWith,
    /// Negated `STARTS_WITH`.
    NotStartsWith,
    /// Suffix match.
    EndsWith,
    /// Negated `ENDS_WITH`.
    NotEndsWith,
    /// Regular-expression match.
    Matches,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// Point distance equality.
    Distance,
    /// At least one related node matches.
    Some,
    /// Every related node matches.
    All,
    /// No related node matches.
    None,
    /// Exactly one related node matches.
    Single,
}

impl Operator {
    /// Parses an operator token such as `NOT_CONTAINS`.
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "EQ" => Operator::Eq,
            "NOT" => Operator::Not,
            "IN" => Operator::In,
            "NOT_IN" => Operator::NotIn,
            "INCLUDES" => Operator::Includes,
            "NOT_INCLUDES" => Operator::NotIncludes,
            "CONTAINS" => Operator::Contains,
            "NOT_CONTAINS" => Operator::NotContains,
            "STARTS_WITH" => Operator::StartsWith,
            "NOT_STARTS_WITH" => Operator::NotStartsWith,
            "ENDS_WITH" => Operator::EndsWith,
            "NOT_ENDS_WITH" => Operator::NotEndsWith,
            "MATCHES" => Operator::Matches,
            "LT" => Operator::Lt,
            "LTE" => Operator::Lte,
            "GT" => Operator::Gt,
            "GTE" => Operator::Gte,
            "DISTANCE" => Operator::Distance,
            "SOME" => Operator::Some,
            "ALL" => Operator::All,
            "NONE" => Operator::None,
            "SINGLE" => Operator::Single,
            _ => return Option::None,
        })
    }

    /// Token as written in filter keys.
    pub fn token(self) -> &'static str {
        match self {
            Operator::Eq => "EQ",
            Operator::Not => "NOT",
            Operator::In => "IN",
            Operator::NotIn => "NOT_IN",
            Operator::Includes => "INCLUDES",
            Operator::NotIncludes => "NOT_INCLUDES",
            Operator::Contains => "CONTAINS",
            Operator::NotContains => "NOT_CONTAINS",
            Operator::StartsWith => "STARTS_WITH",
            Operator::NotStartsWith => "NOT_STARTS_WITH",
            Operator::EndsWith => "ENDS_WITH",
            Operator::NotEndsWith => "NOT_ENDS_WITH",
            Operator::Matches => "MATCHES",
            Operator::Lt => "LT",
            Operator::Lte => "LTE",
            Operator::Gt => "GT",
            Operator::Gte => "GTE",
            Operator::Distance => "DISTANCE",
            Operator::Some => "SOME",
            Operator::All => "ALL",
            Operator::None => "NONE",
            Operator::Single => "SINGLE",
        }
    }

    /// Whether the token starts with `NOT`.
    pub fn is_negated(self) -> bool {
        self.token().starts_with("NOT")
    }

    /// The operator with any `NOT` stripped (`NOT` itself becomes [`Operator::Eq`]).
    pub fn base(self) -> Operator {
        match self {
            Operator::Not => Operator::Eq,
            Operator::NotIn => Operator::In,
            Operator::NotIncludes => Operator::Includes,
            Operator::NotContains => Operator::Contains,
            Operator::NotStartsWith => Operator::StartsWith,
            Operator::NotEndsWith => Operator::EndsWith,
            other => other,
        }
    }

    /// Relation quantifiers.
    pub fn is_quantifier(self) -> bool {
        matches!(
            self,
            Operator::Some | Operator::All | Operator::None | Operator::Single
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Structured view of a compound filter key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedKey {
    /// Path prefix including its trailing dot (`node.`).
    pub prefix: Option<String>,
    /// API-facing field name.
    pub field_name: String,
    /// Key ends in `Aggregate` (before any operator).
    pub is_aggregate: bool,
    /// Explicit operator; `None` means equality.
    pub operator: Option<Operator>,
    /// The operator starts with `NOT`.
    pub is_not: bool,
}

impl ParsedKey {
    /// The un-negated operator, equality when none was given.
    pub fn base_operator(&self) -> Operator {
        self.operator.map_or(Operator::Eq, Operator::base)
    }
}

/// Parses a compound filter key.
pub fn parse_key(key: &str) -> Result<ParsedKey, WhereError> {
    let caps = key_grammar()
        .captures(key)
        .ok_or_else(|| WhereError::MalformedFilterKey {
            key: key.to_owned(),
        })?;
    let operator = match caps.name("op") {
        Some(token) => Some(Operator::from_token(token.as_str()).ok_or_else(|| {
            WhereError::UnknownOperator {
                key: key.to_owned(),
                operator: token.as_str().to_owned(),
            }
        })?),
        None => Option::None,
    };
    Ok(ParsedKey {
        prefix: caps.name("prefix").map(|m| m.as_str().to_owned()),
        field_name: caps["field"].to_owned(),
        is_aggregate: caps.name("aggregate").is_some(),
        is_not: operator.is_some_and(Operator::is_negated),
        operator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(key: &str) -> ParsedKey {
        parse_key(key).expect("key should parse")
    }

    #[test]
    fn bare_field_is_equality() {
        let key = parsed("title");
        assert_eq!(key.field_name, "title");
        assert_eq!(key.operator, Option::None);
        assert_eq!(key.base_operator(), Operator::Eq);
        assert!(!key.is_not && !key.is_aggregate);
    }

    #[test]
    fn splits_operator_suffix() {
        assert_eq!(parsed("releasedIn_LT").operator, Some(Operator::Lt));
        assert_eq!(parsed("releasedIn_LTE").operator, Some(Operator::Lte));
        let key = parsed("title_STARTS_WITH");
        assert_eq!(key.field_name, "title");
        assert_eq!(key.operator, Some(Operator::StartsWith));
    }

    #[test]
    fn not_variants_set_negation() {
        let key = parsed("title_NOT_CONTAINS");
        assert_eq!(key.field_name, "title");
        assert!(key.is_not);
        assert_eq!(key.base_operator(), Operator::Contains);

        let bare = parsed("title_NOT");
        assert!(bare.is_not);
        assert_eq!(bare.base_operator(), Operator::Eq);
    }

    #[test]
    fn underscores_stay_in_field_names() {
        let key = parsed("first_name_IN");
        assert_eq!(key.field_name, "first_name");
        assert_eq!(key.operator, Some(Operator::In));
        assert_eq!(parsed("is_active").field_name, "is_active");
    }

    #[test]
    fn aggregate_suffix_and_prefix() {
        let key = parsed("actorsAggregate");
        assert_eq!(key.field_name, "actors");
        assert!(key.is_aggregate);

        let key = parsed("node.title_IN");
        assert_eq!(key.prefix.as_deref(), Some("node."));
        assert_eq!(key.field_name, "title");
    }

    #[test]
    fn rejects_keys_outside_the_grammar() {
        for key in ["", "1title", "title-name", "title.", "tit le"] {
            let err = parse_key(key).unwrap_err();
            assert!(
                matches!(err, WhereError::MalformedFilterKey { .. }),
                "{key}: {err:?}"
            );
        }
    }

    #[test]
    fn rejects_unknown_operators() {
        let err = parse_key("title_FOO").unwrap_err();
        assert_eq!(
            err,
            WhereError::UnknownOperator {
                key: "title_FOO".into(),
                operator: "FOO".into()
            }
        );
    }
}
