//! Process-spawning built-in tools.
//!
//! Both tools run a child process with captured output and a hard time
//! limit. A child that outlives the limit is killed.

use crate::tools::definition::{ToolDefinition, ToolExecutionFuture, ToolExecutor};
use crate::tools::error::ToolError;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Default limit for a spawned process.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// Grace period added to the tool timeout so the process limit fires first.
const TIMEOUT_MARGIN: Duration = Duration::from_secs(1);

async fn run(
    tool_name: &'static str,
    mut command: Command,
    limit: Duration,
) -> Result<Output, ToolError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match tokio::time::timeout(limit, command.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(ToolError::execution_failed(
            tool_name,
            format!("failed to spawn process: {e}"),
        )),
        Err(_) => Err(ToolError::timeout(tool_name, limit)),
    }
}

fn render(output: &Output, failure_prefix: &str) -> String {
    if output.status.success() {
        String::from_utf8_lossy(&output.stdout).into_owned()
    } else {
        format!(
            "{failure_prefix}: {}",
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

/// Runs a shell command through `sh -c`.
///
/// Returns stdout on success and `Command error: <stderr>` otherwise.
#[derive(Debug, Clone)]
pub struct CommandTool {
    limit: Duration,
}

impl Default for CommandTool {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandTool {
    /// Creates a command tool with the default time limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_COMMAND_TIMEOUT)
    }

    /// Creates a command tool with a custom time limit.
    #[must_use]
    pub fn with_timeout(limit: Duration) -> Self {
        Self { limit }
    }

    /// Returns the tool definition for registration.
    #[must_use]
    pub fn definition() -> ToolDefinition {
        ToolDefinition::builtin(
            "execute_command",
            "Executes a shell command. Example: execute_command: ls -la",
        )
    }
}

impl ToolExecutor for CommandTool {
    fn execute(&self, input: String) -> ToolExecutionFuture {
        let limit = self.limit;

        Box::pin(async move {
            let command_line = input.trim();
            if command_line.is_empty() {
                return Err(ToolError::validation_failed(
                    "execute_command",
                    "command cannot be empty",
                ));
            }

            tracing::info!(command = command_line, "Executing command");

            let mut command = Command::new("sh");
            command.arg("-c").arg(command_line);

            let output = run("execute_command", command, limit).await?;
            Ok(render(&output, "Command error"))
        })
    }

    fn timeout(&self) -> Duration {
        self.limit + TIMEOUT_MARGIN
    }
}

/// Runs a Python script with the local interpreter.
///
/// Returns stdout on success and `Container execution error: <stderr>`
/// otherwise.
#[derive(Debug, Clone)]
pub struct PythonScriptTool {
    interpreter: String,
    limit: Duration,
}

impl Default for PythonScriptTool {
    fn default() -> Self {
        Self::new()
    }
}

impl PythonScriptTool {
    /// Creates a tool that runs scripts with `python3`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            interpreter: "python3".to_string(),
            limit: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Uses a different interpreter binary.
    #[must_use]
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Sets the time limit for one script run.
    #[must_use]
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.limit = limit;
        self
    }

    /// Returns the tool definition for registration.
    #[must_use]
    pub fn definition() -> ToolDefinition {
        ToolDefinition::builtin(
            "run_python_container",
            "Runs Python code in a container. Example: run_python_container: path/to/script.py",
        )
    }
}

impl ToolExecutor for PythonScriptTool {
    fn execute(&self, input: String) -> ToolExecutionFuture {
        let interpreter = self.interpreter.clone();
        let limit = self.limit;

        Box::pin(async move {
            let script = input.trim();
            if script.is_empty() {
                return Err(ToolError::validation_failed(
                    "run_python_container",
                    "script path cannot be empty",
                ));
            }

            tracing::info!(script, interpreter = %interpreter, "Running Python script");

            let mut command = Command::new(&interpreter);
            command.arg(script);

            let output = run("run_python_container", command, limit).await?;
            Ok(render(&output, "Container execution error"))
        })
    }

    fn timeout(&self) -> Duration {
        self.limit + TIMEOUT_MARGIN
    }
}
