//! Calculate mathematical expressions built-in tool.
//!
//! Evaluates expressions with fasteval, which parses arithmetic only and
//! cannot execute arbitrary code.

use crate::tools::definition::{ToolDefinition, ToolExecutionFuture, ToolExecutor};
use crate::tools::error::ToolError;
use fasteval::ez_eval;

const MAX_EXPRESSION_LEN: usize = 1000;

/// Calculate tool executor.
#[derive(Debug, Default, Clone)]
pub struct CalculateTool;

impl CalculateTool {
    /// Creates a new calculate tool.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the tool definition for registration.
    #[must_use]
    pub fn definition() -> ToolDefinition {
        ToolDefinition::builtin(
            "calculate",
            "Evaluates mathematical expressions. Example: calculate: 4 * 7 / 3",
        )
    }

    /// Evaluates `expression` and formats the result.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty or oversized input and an
    /// execution error when the expression does not evaluate.
    pub fn evaluate(expression: &str) -> Result<String, ToolError> {
        let expression = expression.trim();
        if expression.is_empty() {
            return Err(ToolError::validation_failed(
                "calculate",
                "expression cannot be empty",
            ));
        }
        if expression.len() > MAX_EXPRESSION_LEN {
            return Err(ToolError::validation_failed(
                "calculate",
                format!("expression is too long (max {MAX_EXPRESSION_LEN} characters)"),
            ));
        }

        // fasteval has built-in functions (sin, cos, log, etc.) by default
        let mut namespace = |_: &str, _: Vec<f64>| -> Option<f64> { None };

        let value = ez_eval(expression, &mut namespace).map_err(|e| {
            ToolError::execution_failed("calculate", format!("Error in calculation: {e}"))
        })?;

        Ok(format_number(value))
    }
}

fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

impl ToolExecutor for CalculateTool {
    fn execute(&self, input: String) -> ToolExecutionFuture {
        Box::pin(async move {
            tracing::info!(expression = %input, "Calculating");
            Self::evaluate(&input)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_results_have_no_fraction() {
        assert_eq!(CalculateTool::evaluate("2 + 2").unwrap(), "4");
        assert_eq!(CalculateTool::evaluate("10 / 2").unwrap(), "5");
    }

    #[test]
    fn fractional_results_are_kept() {
        let result = CalculateTool::evaluate("4 * 7 / 3").unwrap();
        assert!(result.starts_with("9.33"));
    }

    #[test]
    fn precedence_and_functions() {
        assert_eq!(CalculateTool::evaluate("2 + 3 * 4").unwrap(), "14");
        assert_eq!(CalculateTool::evaluate("abs(-5)").unwrap(), "5");
    }

    #[test]
    fn division_by_zero_is_infinity() {
        assert_eq!(CalculateTool::evaluate("1 / 0").unwrap(), "Infinity");
    }

    #[test]
    fn empty_expression_rejected() {
        let error = CalculateTool::evaluate("   ").unwrap_err();
        assert!(error.to_string().contains("empty"));
    }

    #[test]
    fn invalid_expression_fails() {
        assert!(CalculateTool::evaluate("2 +").is_err());
    }

    #[tokio::test]
    async fn executes_through_trait() {
        let output = CalculateTool::new().execute("6 * 7".to_string()).await.unwrap();
        assert_eq!(output, "42");
    }
}
