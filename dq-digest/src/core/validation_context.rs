//! Task-local context naming the table a constraint runs against.
//!
//! Constraints are built once from rules and have no idea which dataset they
//! will be pointed at. The validator scopes each evaluation with the table it
//! registered, and constraints look it up here.

use std::sync::Arc;

/// Runtime context for one dataset evaluation.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    table_name: Arc<str>,
    suite_name: Arc<str>,
}

impl ValidationContext {
    /// Creates a context for `table_name`, evaluated under `suite_name`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dq_digest::core::ValidationContext;
    ///
    /// let ctx = ValidationContext::new("sales", "sales_expectation_suite");
    /// assert_eq!(ctx.table_name(), "sales");
    /// assert_eq!(ctx.suite_name(), "sales_expectation_suite");
    /// ```
    pub fn new(table_name: impl Into<Arc<str>>, suite_name: impl Into<Arc<str>>) -> Self {
        Self {
            table_name: table_name.into(),
            suite_name: suite_name.into(),
        }
    }

    /// Context used outside any validator scope.
    pub fn detached() -> Self {
        Self::new("data", "default")
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::detached()
    }
}

tokio::task_local! {
    pub static CURRENT_CONTEXT: ValidationContext;
}

/// Gets the current validation context, or the detached one if no scope is set.
pub fn current_validation_context() -> ValidationContext {
    CURRENT_CONTEXT
        .try_with(|ctx| ctx.clone())
        .unwrap_or_else(|_| ValidationContext::detached())
}
