//! Directory built-in tools.

use crate::tools::definition::{ToolDefinition, ToolExecutionFuture, ToolExecutor};
use crate::tools::error::ToolError;

fn require_dir<'a>(tool_name: &str, input: &'a str) -> Result<&'a str, ToolError> {
    let path = input.trim();
    if path.is_empty() {
        return Err(ToolError::validation_failed(
            tool_name,
            "directory path cannot be empty",
        ));
    }
    Ok(path)
}

/// Lists entry names in a directory, sorted, one per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListFilesTool;

impl ListFilesTool {
    /// Returns the tool definition for registration.
    #[must_use]
    pub fn definition() -> ToolDefinition {
        ToolDefinition::builtin(
            "list_files",
            "Lists files in a directory. Example: list_files: path/to/directory",
        )
    }
}

impl ToolExecutor for ListFilesTool {
    fn execute(&self, input: String) -> ToolExecutionFuture {
        Box::pin(async move {
            let path = require_dir("list_files", &input)?;
            tracing::info!(path, "Listing files");

            let fail = |e: std::io::Error| {
                ToolError::execution_failed("list_files", format!("Error listing files: {e}"))
            };

            let mut entries = tokio::fs::read_dir(path).await.map_err(fail)?;
            let mut names = Vec::new();
            while let Some(entry) = entries.next_entry().await.map_err(fail)? {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
            names.sort();

            Ok(names.join("\n"))
        })
    }
}

/// Creates a directory and any missing parents.
#[derive(Debug, Default, Clone, Copy)]
pub struct CreateDirectoryTool;

impl CreateDirectoryTool {
    /// Returns the tool definition for registration.
    #[must_use]
    pub fn definition() -> ToolDefinition {
        ToolDefinition::builtin(
            "create_directory",
            "Creates a directory. Example: create_directory: path/to/directory",
        )
    }
}

impl ToolExecutor for CreateDirectoryTool {
    fn execute(&self, input: String) -> ToolExecutionFuture {
        Box::pin(async move {
            let path = require_dir("create_directory", &input)?;
            tracing::info!(path, "Creating directory");

            tokio::fs::create_dir_all(path).await.map_err(|e| {
                ToolError::execution_failed(
                    "create_directory",
                    format!("Error creating directory: {e}"),
                )
            })?;

            Ok(format!("Successfully created directory {path}"))
        })
    }
}

/// Deletes an empty directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeleteDirectoryTool;

impl DeleteDirectoryTool {
    /// Returns the tool definition for registration.
    #[must_use]
    pub fn definition() -> ToolDefinition {
        ToolDefinition::builtin(
            "delete_directory",
            "Deletes a directory. Example: delete_directory: path/to/directory",
        )
    }
}

impl ToolExecutor for DeleteDirectoryTool {
    fn execute(&self, input: String) -> ToolExecutionFuture {
        Box::pin(async move {
            let path = require_dir("delete_directory", &input)?;
            tracing::info!(path, "Deleting directory");

            tokio::fs::remove_dir(path).await.map_err(|e| {
                ToolError::execution_failed(
                    "delete_directory",
                    format!("Error deleting directory: {e}"),
                )
            })?;

            Ok(format!("Successfully deleted directory {path}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn list_is_sorted() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("c")).unwrap();

        let output = ListFilesTool
            .execute(dir.path().to_string_lossy().into_owned())
            .await
            .unwrap();
        assert_eq!(output, "a.txt\nb.txt\nc");
    }

    #[tokio::test]
    async fn list_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope").to_string_lossy().into_owned();
        let error = ListFilesTool.execute(missing).await.unwrap_err();
        assert!(error.to_string().contains("Error listing files"));
    }

    #[tokio::test]
    async fn create_then_delete() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("x/y").to_string_lossy().into_owned();

        let created = CreateDirectoryTool.execute(target.clone()).await.unwrap();
        assert_eq!(created, format!("Successfully created directory {target}"));
        assert!(dir.path().join("x/y").is_dir());

        let deleted = DeleteDirectoryTool.execute(target.clone()).await.unwrap();
        assert_eq!(deleted, format!("Successfully deleted directory {target}"));
        assert!(!dir.path().join("x/y").exists());
    }

    #[tokio::test]
    async fn delete_non_empty_directory_fails() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("keep.txt"), "").unwrap();

        let result = DeleteDirectoryTool
            .execute(dir.path().to_string_lossy().into_owned())
            .await;
        assert!(result.is_err());
        assert!(dir.path().join("keep.txt").exists());
    }
}
