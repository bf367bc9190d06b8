//! File built-in tools: read, write, append, search and delete.

use super::{invalid_format, split_pair};
use crate::tools::compiler::strip_code_fence;
use crate::tools::definition::{ToolDefinition, ToolExecutionFuture, ToolExecutor};
use crate::tools::error::ToolError;
use std::path::Path;
use tokio::io::AsyncWriteExt;

fn require_path<'a>(tool_name: &str, input: &'a str) -> Result<&'a str, ToolError> {
    let path = input.trim();
    if path.is_empty() {
        return Err(ToolError::validation_failed(tool_name, "path cannot be empty"));
    }
    Ok(path)
}

/// Reads a file and returns its contents.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadFileTool;

impl ReadFileTool {
    /// Returns the tool definition for registration.
    #[must_use]
    pub fn definition() -> ToolDefinition {
        ToolDefinition::builtin(
            "read_file",
            "Reads content from a file. Example: read_file: path/to/file.txt",
        )
    }
}

impl ToolExecutor for ReadFileTool {
    fn execute(&self, input: String) -> ToolExecutionFuture {
        Box::pin(async move {
            let path = require_path("read_file", &input)?;
            tracing::info!(path, "Reading file");

            tokio::fs::read_to_string(path).await.map_err(|e| {
                ToolError::execution_failed("read_file", format!("Error reading file: {e}"))
            })
        })
    }
}

/// Writes `path||content`, replacing any existing file.
///
/// A Markdown or triple-quote fence around the content is removed and
/// missing parent directories are created.
#[derive(Debug, Default, Clone, Copy)]
pub struct WriteFileTool;

impl WriteFileTool {
    /// Returns the tool definition for registration.
    #[must_use]
    pub fn definition() -> ToolDefinition {
        ToolDefinition::builtin(
            "write_file",
            "Writes content to a file. Format: 'file_path||content'. Example: write_file: example.txt||Hello world",
        )
    }
}

impl ToolExecutor for WriteFileTool {
    fn execute(&self, input: String) -> ToolExecutionFuture {
        Box::pin(async move {
            let Some((path, content)) = split_pair(&input) else {
                return Ok(invalid_format("file_path", "content"));
            };
            let path = require_path("write_file", path)?;
            let content = strip_code_fence(content);

            tracing::info!(path, bytes = content.len(), "Writing file");

            let fail = |e: std::io::Error| {
                ToolError::execution_failed("write_file", format!("Error writing to file: {e}"))
            };

            if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await.map_err(fail)?;
            }
            tokio::fs::write(path, content).await.map_err(fail)?;

            Ok(format!("Successfully wrote to {path}"))
        })
    }
}

/// Appends `path||content` to a file, creating it when missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct AppendFileTool;

impl AppendFileTool {
    /// Returns the tool definition for registration.
    #[must_use]
    pub fn definition() -> ToolDefinition {
        ToolDefinition::builtin(
            "append_file",
            "Appends content to a file. Format: 'file_path||content'. Example: append_file: example.txt||Hello world",
        )
    }
}

impl ToolExecutor for AppendFileTool {
    fn execute(&self, input: String) -> ToolExecutionFuture {
        Box::pin(async move {
            let Some((path, content)) = split_pair(&input) else {
                return Ok(invalid_format("file_path", "content"));
            };
            let path = require_path("append_file", path)?;
            let content = strip_code_fence(content);

            tracing::info!(path, bytes = content.len(), "Appending to file");

            let fail = |e: std::io::Error| {
                ToolError::execution_failed("append_file", format!("Error appending to file: {e}"))
            };

            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await
                .map_err(fail)?;
            file.write_all(content.as_bytes()).await.map_err(fail)?;
            file.flush().await.map_err(fail)?;

            Ok(format!("Successfully appended to {path}"))
        })
    }
}

/// Counts literal occurrences of a string in a file: `path||needle`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchFileTool;

impl SearchFileTool {
    /// Returns the tool definition for registration.
    #[must_use]
    pub fn definition() -> ToolDefinition {
        ToolDefinition::builtin(
            "search_file",
            "Searches for a string in a file. Format: 'file_path||search_string'. Example: search_file: example.txt||Hello",
        )
    }
}

impl ToolExecutor for SearchFileTool {
    fn execute(&self, input: String) -> ToolExecutionFuture {
        Box::pin(async move {
            let Some((path, needle)) = split_pair(&input) else {
                return Ok(invalid_format("file_path", "search_string"));
            };
            let path = require_path("search_file", path)?;
            if needle.is_empty() {
                return Err(ToolError::validation_failed(
                    "search_file",
                    "search string cannot be empty",
                ));
            }

            tracing::info!(path, needle, "Searching file");

            let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                ToolError::execution_failed("search_file", format!("Error searching file: {e}"))
            })?;
            let count = content.matches(needle).count();

            Ok(format!("Found {count} occurrences of '{needle}'"))
        })
    }
}

/// Deletes a single file.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeleteFileTool;

impl DeleteFileTool {
    /// Returns the tool definition for registration.
    #[must_use]
    pub fn definition() -> ToolDefinition {
        ToolDefinition::builtin(
            "delete_file",
            "Deletes a file. Example: delete_file: path/to/file.txt",
        )
    }
}

impl ToolExecutor for DeleteFileTool {
    fn execute(&self, input: String) -> ToolExecutionFuture {
        Box::pin(async move {
            let path = require_path("delete_file", &input)?;
            tracing::info!(path, "Deleting file");

            tokio::fs::remove_file(path).await.map_err(|e| {
                ToolError::execution_failed("delete_file", format!("Error deleting file: {e}"))
            })?;

            Ok(format!("Successfully deleted {path}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn path_in(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = path_in(&dir, "nested/out.txt");

        let written = WriteFileTool
            .execute(format!("{path}||Hello world"))
            .await
            .unwrap();
        assert_eq!(written, format!("Successfully wrote to {path}"));

        let read = ReadFileTool.execute(path).await.unwrap();
        assert_eq!(read, "Hello world");
    }

    #[tokio::test]
    async fn write_strips_code_fence() {
        let dir = TempDir::new().unwrap();
        let path = path_in(&dir, "script.py");

        WriteFileTool
            .execute(format!("{path}||```python\nprint('hi')\n```"))
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "print('hi')");
    }

    #[tokio::test]
    async fn fenced_prose_keeps_its_first_line() {
        let dir = TempDir::new().unwrap();
        let path = path_in(&dir, "letter.txt");

        WriteFileTool
            .execute(format!("{path}||```Dear Ada\nSee you soon\n```"))
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Dear Ada\nSee you soon"
        );
    }

    #[tokio::test]
    async fn write_without_separator_is_format_error() {
        let output = WriteFileTool.execute("just text".to_string()).await.unwrap();
        assert_eq!(output, "Error: Invalid format. Use 'file_path||content'");
    }

    #[tokio::test]
    async fn append_accumulates() {
        let dir = TempDir::new().unwrap();
        let path = path_in(&dir, "log.txt");

        AppendFileTool.execute(format!("{path}||one")).await.unwrap();
        let output = AppendFileTool.execute(format!("{path}||two")).await.unwrap();

        assert_eq!(output, format!("Successfully appended to {path}"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "onetwo");
    }

    #[tokio::test]
    async fn search_counts_literal_matches() {
        let dir = TempDir::new().unwrap();
        let path = path_in(&dir, "haystack.txt");
        std::fs::write(&path, "a.b a.b axb").unwrap();

        let output = SearchFileTool.execute(format!("{path}||a.b")).await.unwrap();
        assert_eq!(output, "Found 2 occurrences of 'a.b'");
    }

    #[tokio::test]
    async fn search_without_separator_is_format_error() {
        let output = SearchFileTool.execute("file.txt".to_string()).await.unwrap();
        assert_eq!(output, "Error: Invalid format. Use 'file_path||search_string'");
    }

    #[tokio::test]
    async fn read_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let error = ReadFileTool
            .execute(path_in(&dir, "absent.txt"))
            .await
            .unwrap_err();
        assert!(error.to_string().contains("Error reading file"));
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = path_in(&dir, "gone.txt");
        std::fs::write(&path, "x").unwrap();

        let output = DeleteFileTool.execute(path.clone()).await.unwrap();
        assert_eq!(output, format!("Successfully deleted {path}"));
        assert!(!Path::new(&path).exists());
    }

    #[tokio::test]
    async fn empty_path_rejected() {
        assert!(ReadFileTool.execute("   ".to_string()).await.is_err());
        assert!(DeleteFileTool.execute(String::new()).await.is_err());
    }
}
