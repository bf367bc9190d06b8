//! Tool system.
//!
//! - **Definition**: the [`Tool`] capability (`name`, `description`,
//!   `invoke(input) -> text`) and the [`ToolExecutor`] trait behind it
//! - **Registry**: process-wide [`ToolRegistry`] with snapshot persistence
//! - **Compiler**: synthesizes tools at runtime from script fragments
//! - **Builtins**: the fixed native tools
//!
//! ## Architecture
//!
//! ```text
//! +-------------------------------------------------------------+
//! |                       ToolRegistry                           |
//! |                                                              |
//! |  register / remove ----> RwLock<order + name -> Tool>        |
//! |  get / find / list <---- cloned Tool handles                 |
//! |  create_from_source ---> DynamicToolCompiler                 |
//! |                                                              |
//! +-------------------------------------------------------------+
//!                            |
//!                            | Tool::invoke (lock not held)
//!                            v
//! +-------------------------------------------------------------+
//! |         Arc<dyn ToolExecutor>  (builtin | ScriptTool)        |
//! +-------------------------------------------------------------+
//! ```
//!
//! Isolation of synthesized tools is best-effort. Their engine withholds
//! module imports, `eval` and (unless enabled) the filesystem, but it is not
//! a security boundary: only trusted callers should be allowed to submit
//! source.

pub mod builtins;
pub mod compiler;
pub mod definition;
pub mod error;
pub mod registry;

pub use compiler::{CompilationError, CompilationErrorKind, DynamicToolCompiler, NamespacePolicy};
pub use definition::{
    Tool, ToolDefinition, ToolExecutionFuture, ToolExecutor, ToolSource, DEFAULT_TOOL_TIMEOUT,
};
pub use error::{ToolError, ToolErrorKind};
pub use registry::ToolRegistry;
