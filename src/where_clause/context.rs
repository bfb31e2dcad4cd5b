//! Per-query mutable state threaded through every builder.

use crate::config::{CompilerConfig, FilterFeatures};
use crate::cypher::{ParamRef, ParamTable, Value, Variable};

/// Parameter table, name counters and enabled features for one query.
///
/// One context is created per query and passed `&mut` down the recursion;
/// parameter and variable names are unique within it.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    params: ParamTable,
    next_param: usize,
    next_var: usize,
    param_prefix: String,
    variable_prefix: String,
    features: FilterFeatures,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(&CompilerConfig::default())
    }
}

impl ExecutionContext {
    /// Fresh context using the naming and features of `config`.
    pub fn new(config: &CompilerConfig) -> Self {
        Self {
            params: ParamTable::new(),
            next_param: 0,
            next_var: 0,
            param_prefix: config.param_prefix.clone(),
            variable_prefix: config.variable_prefix.clone(),
            features: config.features,
        }
    }

    /// Binds `value` under a fresh parameter name.
    pub fn param(&mut self, value: impl Into<Value>) -> ParamRef {
        let name = format!("{}{}", self.param_prefix, self.next_param);
        self.next_param += 1;
        self.params.insert(name, value.into())
    }

    /// Allocates a variable name unused in this query.
    pub fn fresh_variable(&mut self) -> Variable {
        let var = Variable::new(format!("{}{}", self.variable_prefix, self.next_var));
        self.next_var += 1;
        var
    }

    /// Feature-gated operators enabled for this query.
    pub fn features(&self) -> FilterFeatures {
        self.features
    }

    /// Parameters bound so far.
    pub fn params(&self) -> &ParamTable {
        &self.params
    }

    /// Consumes the context, yielding the parameter table.
    pub fn into_params(self) -> ParamTable {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_sequential_and_unique() {
        let mut ctx = ExecutionContext::default();
        let a = ctx.param(1_i64);
        let b = ctx.param("x");
        assert_eq!(a.name(), "param0");
        assert_eq!(b.name(), "param1");
        assert_eq!(ctx.fresh_variable().name(), "this0");
        assert_eq!(ctx.fresh_variable().name(), "this1");
        assert_eq!(ctx.params().get("param1"), Some(&Value::from("x")));
    }

    #[test]
    fn prefixes_come_from_config() {
        let config = CompilerConfig {
            param_prefix: "p".into(),
            variable_prefix: "n".into(),
            ..CompilerConfig::default()
        };
        let mut ctx = ExecutionContext::new(&config);
        assert_eq!(ctx.param(true).name(), "p0");
        assert_eq!(ctx.fresh_variable().name(), "n0");
    }
}
