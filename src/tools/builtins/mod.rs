//! Built-in tools.
//!
//! Every built-in takes one line of text as input. Tools that need two
//! values (a path and some content) take them as `first||second`.
//!
//! ## Available Tools
//!
//! ### Information
//! - **calculate**: evaluate arithmetic expressions
//! - **wikipedia**: search Wikipedia and return the top snippet
//!
//! ### Files
//! - **read_file**, **write_file**, **append_file**, **search_file**, **delete_file**
//!
//! ### Directories
//! - **list_files**, **create_directory**, **delete_directory**
//!
//! ### Execution
//! - **execute_command**: run a shell command
//! - **run_python_container**: run a Python script
//!
//! ## Usage
//!
//! ```rust
//! use agentic_workflow::tools::builtins::BuiltinTools;
//!
//! let tools = BuiltinTools::all();
//! assert_eq!(tools.len(), 12);
//! assert!(BuiltinTools::get("calculate").is_some());
//! ```

mod calculate;
mod command;
mod directories;
mod files;
mod wikipedia;

pub use calculate::CalculateTool;
pub use command::{CommandTool, PythonScriptTool};
pub use directories::{CreateDirectoryTool, DeleteDirectoryTool, ListFilesTool};
pub use files::{AppendFileTool, DeleteFileTool, ReadFileTool, SearchFileTool, WriteFileTool};
pub use wikipedia::WikipediaTool;

use crate::tools::definition::{Tool, ToolDefinition, ToolExecutor};
use std::sync::Arc;

/// Separator between the two values of a paired input.
pub const PAIR_SEPARATOR: &str = "||";

/// Catalogue of the built-in tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTools;

impl BuiltinTools {
    /// Creates every built-in tool, in the order they are listed to the model.
    #[must_use]
    pub fn all() -> Vec<Tool> {
        vec![
            build(CalculateTool::definition(), CalculateTool::new()),
            build(WikipediaTool::definition(), WikipediaTool::new()),
            build(ReadFileTool::definition(), ReadFileTool),
            build(WriteFileTool::definition(), WriteFileTool),
            build(AppendFileTool::definition(), AppendFileTool),
            build(SearchFileTool::definition(), SearchFileTool),
            build(ListFilesTool::definition(), ListFilesTool),
            build(DeleteFileTool::definition(), DeleteFileTool),
            build(CreateDirectoryTool::definition(), CreateDirectoryTool),
            build(DeleteDirectoryTool::definition(), DeleteDirectoryTool),
            build(CommandTool::definition(), CommandTool::new()),
            build(PythonScriptTool::definition(), PythonScriptTool::new()),
        ]
    }

    /// Lists the names of all built-in tools.
    #[must_use]
    pub fn available() -> Vec<&'static str> {
        vec![
            "calculate",
            "wikipedia",
            "read_file",
            "write_file",
            "append_file",
            "search_file",
            "list_files",
            "delete_file",
            "create_directory",
            "delete_directory",
            "execute_command",
            "run_python_container",
        ]
    }

    /// Creates the built-in tool with the given name, if there is one.
    #[must_use]
    pub fn get(name: &str) -> Option<Tool> {
        Self::all().into_iter().find(|tool| tool.name() == name)
    }
}

fn build(definition: ToolDefinition, executor: impl ToolExecutor + 'static) -> Tool {
    Tool::new(definition, Arc::new(executor))
}

/// Splits `first||second` at the first separator.
///
/// Returns `None` when the separator is missing.
#[must_use]
pub fn split_pair(input: &str) -> Option<(&str, &str)> {
    input
        .split_once(PAIR_SEPARATOR)
        .map(|(first, second)| (first.trim(), second))
}

/// The text returned when a paired input lacks its separator.
pub(crate) fn invalid_format(first: &str, second: &str) -> String {
    format!("Error: Invalid format. Use '{first}{PAIR_SEPARATOR}{second}'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_matches_available() {
        let names: Vec<String> = BuiltinTools::all()
            .iter()
            .map(|tool| tool.name().to_string())
            .collect();
        assert_eq!(names, BuiltinTools::available());
    }

    #[test]
    fn builtins_are_not_synthesized() {
        assert!(BuiltinTools::all().iter().all(|tool| !tool.is_synthesized()));
    }

    #[test]
    fn descriptions_carry_an_example() {
        for tool in BuiltinTools::all() {
            assert!(
                tool.description().contains("Example:"),
                "{} lacks an example",
                tool.name()
            );
        }
    }

    #[test]
    fn get_unknown_is_none() {
        assert!(BuiltinTools::get("teleport").is_none());
    }

    #[test]
    fn split_pair_uses_first_separator() {
        assert_eq!(split_pair("a.txt||x||y"), Some(("a.txt", "x||y")));
        assert_eq!(split_pair(" a.txt ||x"), Some(("a.txt", "x")));
        assert_eq!(split_pair("no separator"), None);
    }

    #[test]
    fn invalid_format_message() {
        assert_eq!(
            invalid_format("file_path", "content"),
            "Error: Invalid format. Use 'file_path||content'"
        );
    }
}
