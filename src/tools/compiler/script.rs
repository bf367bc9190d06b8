//! Executor for synthesized tools.

use crate::tools::definition::{ToolExecutionFuture, ToolExecutor};
use crate::tools::error::ToolError;
use rhai::{Dynamic, Engine, Scope, AST};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// A compiled call fragment plus the state its init fragment left behind.
///
/// Top-level variables declared by the init fragment live in `state` and
/// persist across calls. Call-local variables are discarded after each
/// call. Calls to the same tool are serialized on the state lock.
#[derive(Debug)]
pub struct ScriptTool {
    name: String,
    engine: Arc<Engine>,
    ast: Arc<AST>,
    state: Arc<Mutex<Scope<'static>>>,
    timeout: Duration,
}

impl ScriptTool {
    pub(crate) fn new(
        name: String,
        engine: Arc<Engine>,
        ast: AST,
        state: Scope<'static>,
        timeout: Duration,
    ) -> Self {
        Self {
            name,
            engine,
            ast: Arc::new(ast),
            state: Arc::new(Mutex::new(state)),
            timeout,
        }
    }
}

impl ToolExecutor for ScriptTool {
    fn execute(&self, input: String) -> ToolExecutionFuture {
        let name = self.name.clone();
        let engine = Arc::clone(&self.engine);
        let ast = Arc::clone(&self.ast);
        let state = Arc::clone(&self.state);

        Box::pin(async move {
            let outcome =
                tokio::task::spawn_blocking(move || run_call(&engine, &ast, &state, input))
                    .await
                    .map_err(|e| ToolError::internal(format!("script task for '{name}' failed: {e}")))?;

            match outcome {
                Ok(text) => Ok(text),
                Err(message) => {
                    tracing::warn!(tool_name = %name, error = %message, "Script tool raised");
                    Ok(format!("Error: {message}"))
                }
            }
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Runs one invocation against the persistent scope.
///
/// `input` and `result` are pushed for the duration of the call. The value
/// of the final expression wins; when it is unit, whatever was assigned to
/// `result` is returned instead.
fn run_call(
    engine: &Engine,
    ast: &AST,
    state: &Mutex<Scope<'static>>,
    input: String,
) -> Result<String, String> {
    let mut scope = state.lock().unwrap_or_else(PoisonError::into_inner);
    let mark = scope.len();

    scope.push("input", input);
    scope.push("result", Dynamic::UNIT);

    let outcome = engine.eval_ast_with_scope::<Dynamic>(&mut scope, ast);
    let assigned = scope.get_value::<Dynamic>("result");
    scope.rewind(mark);

    match outcome {
        Ok(value) if !value.is_unit() => Ok(render(value)),
        Ok(_) => Ok(assigned
            .filter(|value| !value.is_unit())
            .map(render)
            .unwrap_or_default()),
        Err(error) => Err(error.to_string()),
    }
}

/// Strings are returned verbatim, everything else in display form.
pub(crate) fn render(value: Dynamic) -> String {
    if value.is_string() {
        value.into_string().unwrap_or_default()
    } else {
        value.to_string()
    }
}
