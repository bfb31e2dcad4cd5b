//! Compiles GraphQL filter inputs into Cypher `WHERE` predicates.
//!
//! A filter such as `{ "title_STARTS_WITH": "The", "actors_SOME": { "name": "Keanu" } }`
//! is resolved against a read-only [`schema`] and turned into a
//! [`cypher::Predicate`] whose literals are bound as parameters:
//!
//! ```
//! use serde_json::json;
//! use sombra_where::config::CompilerConfig;
//! use sombra_where::cypher::Variable;
//! use sombra_where::schema::{InMemorySchema, ScalarField, SchemaNode};
//! use sombra_where::where_clause::{ExecutionContext, WhereCompiler};
//!
//! let schema = InMemorySchema::new()
//!     .with_node(SchemaNode::new("Movie").with_primitive(ScalarField::new("title", "String")));
//! let config = CompilerConfig::default();
//! let compiler = WhereCompiler::new(&schema, &config);
//! let mut ctx = ExecutionContext::new(&config);
//!
//! let filter = json!({ "title": "The Matrix" });
//! let predicate = compiler
//!     .compile_for_type(filter.as_object().unwrap(), &Variable::new("this"), "Movie", &mut ctx)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(predicate.to_string(), "this.title = $param0");
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod cypher;
pub mod schema;
pub mod where_clause;

pub use config::CompilerConfig;
pub use cypher::{ParamTable, Predicate, Variable};
pub use where_clause::{CompileError, ExecutionContext, WhereCompiler, WhereError};
