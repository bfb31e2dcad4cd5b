#![forbid(unsafe_code)]
#![allow(missing_docs)]

use std::fmt;

use thiserror::Error;

/// Structured errors emitted by the where-clause compiler.
///
/// All of them are deterministic input-validation failures. Any error aborts
/// the whole translation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WhereError {
    /// Key does not match the compound-key grammar.
    #[error("malformed filter key '{key}'")]
    MalformedFilterKey { key: String },
    /// Key names an operator outside the supported set.
    #[error("filter key '{key}' uses unknown operator '{operator}'")]
    UnknownOperator { key: String, operator: String },
    /// Field name not present in any category of the model.
    #[error("unknown field '{field}' on type '{type_name}'")]
    UnknownField { field: String, type_name: String },
    /// `…Aggregate` key whose base name is not a relation.
    #[error("aggregate filter '{field}' on type '{type_name}' does not name a relation")]
    InvalidAggregateTarget { field: String, type_name: String },
    /// Operator cannot be applied to the field's declared type.
    #[error("operator {operator} is not supported on field '{field}' of type {type_name}")]
    UnsupportedOperatorForType {
        operator: String,
        field: String,
        type_name: String,
    },
    /// Aggregate builder invoked on something other than a relation.
    #[error("aggregate filters must be on relationship fields (got '{field}')")]
    AggregateFilterMustTargetRelation { field: String },
    /// Global identifier could not be decoded.
    #[error("invalid global id '{value}': {reason}")]
    InvalidGlobalId { value: String, reason: String },
    /// Filter nesting exceeds the configured depth.
    #[error("filter exceeds maximum depth {max}")]
    FilterTooDeep { max: usize },
    /// Value shape incompatible with the operator or field.
    #[error("invalid value for '{field}': expected {expected}, got {found}")]
    InvalidValue {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    /// Relation target or edge-properties type missing from the schema.
    #[error("type '{name}' is not registered with the schema")]
    UnknownNodeType { name: String },
}

impl WhereError {
    /// Builds an [`WhereError::UnsupportedOperatorForType`].
    pub fn unsupported(
        operator: impl fmt::Display,
        field: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        WhereError::UnsupportedOperatorForType {
            operator: operator.to_string(),
            field: field.into(),
            type_name: type_name.into(),
        }
    }

    /// Builds an [`WhereError::InvalidValue`] from a JSON value.
    pub fn invalid_value(
        field: impl Into<String>,
        expected: &'static str,
        found: &serde_json::Value,
    ) -> Self {
        WhereError::InvalidValue {
            field: field.into(),
            expected,
            found: json_kind(found),
        }
    }

    /// Returns a machine-readable code for the error variant.
    pub fn code(&self) -> &'static str {
        match self {
            WhereError::MalformedFilterKey { .. } => "MalformedFilterKey",
            WhereError::UnknownOperator { .. } => "MalformedFilterKey",
            WhereError::UnknownField { .. } => "UnknownField",
            WhereError::InvalidAggregateTarget { .. } => "InvalidAggregateTarget",
            WhereError::UnsupportedOperatorForType { .. } => "UnsupportedOperatorForType",
            WhereError::AggregateFilterMustTargetRelation { .. } => {
                "AggregateFilterMustTargetRelation"
            }
            WhereError::InvalidGlobalId { .. } => "InvalidGlobalId",
            WhereError::FilterTooDeep { .. } => "FilterTooDeep",
            WhereError::InvalidValue { .. } => "InvalidValue",
            WhereError::UnknownNodeType { .. } => "UnknownNodeType",
        }
    }
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "object",
    }
}

/// Convenience wrapper that formats compiler errors with their codes.
pub struct WhereErrorWithCode<'a>(pub &'a WhereError);

impl fmt::Display for WhereErrorWithCode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.0.code(), self.0)
    }
}

/// A [`WhereError`] together with the filter path it was raised at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    path: Vec<String>,
    error: WhereError,
}

impl CompileError {
    /// Underlying error kind.
    pub fn error(&self) -> &WhereError {
        &self.error
    }

    /// Machine-readable code of the underlying error.
    pub fn code(&self) -> &'static str {
        self.error.code()
    }

    /// Dotted path of filter keys leading to the failure, outermost first.
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    pub(crate) fn within(mut self, segment: impl Into<String>) -> Self {
        self.path.insert(0, segment.into());
        self
    }
}

impl From<WhereError> for CompileError {
    fn from(error: WhereError) -> Self {
        Self {
            path: Vec::new(),
            error,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", WhereErrorWithCode(&self.error))?;
        if !self.path.is_empty() {
            write!(f, " at {}", self.path())?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Attaches key context to errors while unwinding.
pub(crate) trait ResultExt<T> {
    fn at(self, segment: impl fmt::Display) -> Result<T, CompileError>;
}

impl<T, E: Into<CompileError>> ResultExt<T> for Result<T, E> {
    fn at(self, segment: impl fmt::Display) -> Result<T, CompileError> {
        self.map_err(|err| err.into().within(segment.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_prefixed_while_unwinding() {
        let err: Result<(), WhereError> = Err(WhereError::UnknownField {
            field: "nope".into(),
            type_name: "Actor".into(),
        });
        let err = err.at("nope").at("actors_SOME").unwrap_err();
        assert_eq!(err.path(), "actors_SOME.nope");
        assert_eq!(err.code(), "UnknownField");
        assert_eq!(
            err.to_string(),
            "[UnknownField] unknown field 'nope' on type 'Actor' at actors_SOME.nope"
        );
    }

    #[test]
    fn unknown_operators_report_as_malformed_keys() {
        let err = WhereError::UnknownOperator {
            key: "title_FOO".into(),
            operator: "FOO".into(),
        };
        assert_eq!(err.code(), "MalformedFilterKey");
    }
}
