//! Runtime synthesis of tools from caller-supplied source.
//!
//! A synthesized tool is built from two fragments of script:
//!
//! - the **init** fragment runs once at construction; top-level variables it
//!   declares become the tool's state
//! - the **call** fragment runs on every invocation with `input` in scope and
//!   either evaluates to the result or assigns it to `result`
//!
//! ```text
//! init / call source
//!         |
//!         v
//! +-------------------+
//! |   CodeTemplate    |  strip fences, normalize line endings
//! +-------------------+
//!         |
//!         v
//! +-------------------+
//! |  Engine::compile  |  syntax errors -> CompilationError::Syntax
//! +-------------------+
//!         |
//!         v
//! +-------------------+
//! |   run init once   |  runtime errors -> CompilationError::Initialization
//! +-------------------+
//!         |
//!         v
//!     ScriptTool        runtime errors -> "Error: ..." text per call
//! ```
//!
//! # Example
//!
//! ```rust
//! use agentic_workflow::tools::compiler::{DynamicToolCompiler, NamespacePolicy};
//!
//! let compiler = DynamicToolCompiler::new(NamespacePolicy::default());
//! let tool = compiler
//!     .compile("shout", "Uppercases text", "let suffix = \"!\";", "input.to_upper() + suffix")
//!     .unwrap();
//! assert!(tool.is_synthesized());
//! ```

pub mod error;
pub mod namespace;
mod script;
pub mod template;

pub use error::{CompilationError, CompilationErrorKind};
pub use namespace::NamespacePolicy;
pub use script::ScriptTool;
pub use template::{strip_code_fence, CodeTemplate};

use crate::tools::definition::{Tool, ToolDefinition};
use rhai::{Engine, Scope};
use std::sync::Arc;

/// Compiles source fragments into [`Tool`]s inside the restricted namespace.
///
/// One engine is built per compiler and shared by every tool it produces.
#[derive(Debug, Clone)]
pub struct DynamicToolCompiler {
    engine: Arc<Engine>,
    policy: NamespacePolicy,
    template: CodeTemplate,
}

impl Default for DynamicToolCompiler {
    fn default() -> Self {
        Self::new(NamespacePolicy::default())
    }
}

impl DynamicToolCompiler {
    /// Creates a compiler whose tools run under `policy`.
    #[must_use]
    pub fn new(policy: NamespacePolicy) -> Self {
        Self {
            engine: Arc::new(namespace::build_engine(&policy)),
            policy,
            template: CodeTemplate::new(),
        }
    }

    /// Returns the policy tools are compiled under.
    #[must_use]
    pub fn policy(&self) -> &NamespacePolicy {
        &self.policy
    }

    /// Builds a tool from its fragments.
    ///
    /// Both fragments are parsed before anything runs, so a syntax error in
    /// either leaves no trace. The init fragment then runs once with
    /// `TOOL_NAME` and `TOOL_DESCRIPTION` in scope. Functions it defines are
    /// callable from the call fragment.
    ///
    /// # Errors
    ///
    /// - `CompilationError::EmptySource` if the call fragment is empty
    /// - `CompilationError::Syntax` if either fragment fails to parse
    /// - `CompilationError::Initialization` if the init fragment raises
    pub fn compile(
        &self,
        name: &str,
        description: &str,
        init_source: &str,
        call_source: &str,
    ) -> Result<Tool, CompilationError> {
        let init = self.template.prepare_init(init_source);
        let call = self.template.prepare_call(call_source)?;

        let init_ast = self
            .engine
            .compile(&init)
            .map_err(|e| CompilationError::syntax("init", e.to_string()))?;
        let call_ast = self
            .engine
            .compile(&call)
            .map_err(|e| CompilationError::syntax("call", e.to_string()))?;

        let mut scope = Scope::new();
        scope.push_constant("TOOL_NAME", name.to_string());
        scope.push_constant("TOOL_DESCRIPTION", description.to_string());

        self.engine
            .run_ast_with_scope(&mut scope, &init_ast)
            .map_err(|e| CompilationError::initialization(e.to_string()))?;

        let ast = init_ast.clone_functions_only().merge(&call_ast);

        tracing::debug!(
            tool_name = name,
            state_variables = scope.len(),
            "Synthesized tool compiled"
        );

        let executor = ScriptTool::new(
            name.to_string(),
            Arc::clone(&self.engine),
            ast,
            scope,
            self.policy.call_timeout(),
        );

        Ok(Tool::new(
            ToolDefinition::synthesized(name, description, init_source, call_source),
            Arc::new(executor),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiler() -> DynamicToolCompiler {
        DynamicToolCompiler::default()
    }

    #[tokio::test]
    async fn call_fragment_value_is_result() {
        let tool = compiler()
            .compile("upper", "Uppercases", "", "input.to_upper()")
            .unwrap();
        assert_eq!(tool.invoke("hello").await.unwrap(), "HELLO");
    }

    #[tokio::test]
    async fn assigned_result_is_returned() {
        let call = r#"
            let words = input.split(" ");
            result = `${words.len()} words`;
        "#;
        let tool = compiler().compile("count", "Counts words", "", call).unwrap();
        assert_eq!(tool.invoke("a b c").await.unwrap(), "3 words");
    }

    #[tokio::test]
    async fn init_state_persists_between_calls() {
        let tool = compiler()
            .compile("counter", "Counts calls", "let calls = 0;", "calls += 1; calls")
            .unwrap();
        assert_eq!(tool.invoke("").await.unwrap(), "1");
        assert_eq!(tool.invoke("").await.unwrap(), "2");
    }

    #[tokio::test]
    async fn call_locals_do_not_leak() {
        let tool = compiler()
            .compile("scope_check", "Checks scope", "", "let seen = is_def_var(\"tmp\"); let tmp = 1; seen")
            .unwrap();
        assert_eq!(tool.invoke("").await.unwrap(), "false");
        assert_eq!(tool.invoke("").await.unwrap(), "false");
    }

    #[tokio::test]
    async fn init_functions_are_callable() {
        let init = "fn shout(s) { s.to_upper() + \"!\" }";
        let tool = compiler().compile("shout", "Shouts", init, "shout(input)").unwrap();
        assert_eq!(tool.invoke("hi").await.unwrap(), "HI!");
    }

    #[tokio::test]
    async fn tool_constants_are_visible() {
        let tool = compiler()
            .compile("whoami", "Reports its name", "", "TOOL_NAME")
            .unwrap();
        assert_eq!(tool.invoke("").await.unwrap(), "whoami");
    }

    #[tokio::test]
    async fn runtime_error_becomes_text() {
        let tool = compiler()
            .compile("boom", "Always fails", "", "throw \"kaboom\";")
            .unwrap();
        let output = tool.invoke("x").await.unwrap();
        assert!(output.starts_with("Error: "));
        assert!(output.contains("kaboom"));
    }

    #[test]
    fn syntax_error_is_compilation_failure() {
        let error = compiler()
            .compile("bad", "Broken", "", "let x = ;")
            .unwrap_err();
        assert!(matches!(
            error.kind(),
            CompilationErrorKind::Syntax { fragment: "call", .. }
        ));
    }

    #[test]
    fn init_syntax_error_names_init_fragment() {
        let error = compiler()
            .compile("bad", "Broken", "fn (", "input")
            .unwrap_err();
        assert!(matches!(
            error.kind(),
            CompilationErrorKind::Syntax { fragment: "init", .. }
        ));
    }

    #[test]
    fn init_runtime_error_is_initialization_failure() {
        let error = compiler()
            .compile("bad", "Broken", "throw \"no config\";", "input")
            .unwrap_err();
        assert!(matches!(
            error.kind(),
            CompilationErrorKind::Initialization { .. }
        ));
        assert!(error.to_string().contains("no config"));
    }

    #[test]
    fn fenced_source_is_accepted() {
        let tool = compiler()
            .compile("fenced", "Fenced", "", "```rhai\ninput.len()\n```")
            .unwrap();
        assert!(tool.is_synthesized());
    }

    #[test]
    fn definition_keeps_original_source() {
        let tool = compiler().compile("t", "d", "let a = 1;", "a").unwrap();
        assert_eq!(
            tool.definition().source,
            crate::tools::ToolSource::Synthesized {
                init_code: "let a = 1;".to_string(),
                call_code: "a".to_string(),
            }
        );
    }
}
