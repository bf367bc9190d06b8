//! Configuration file loading.
//!
//! This module handles loading configuration from TOML files at
//! XDG-compliant locations.

use crate::config::types::WorkflowConfig;
use crate::error::WorkflowError;
use std::path::{Path, PathBuf};

/// Default configuration file name for project-local config.
pub const LOCAL_CONFIG_NAME: &str = "agentic-workflow.toml";

/// Default configuration file name within XDG config directory.
const XDG_CONFIG_NAME: &str = "config.toml";

/// Application name for XDG directory lookup.
pub const APP_NAME: &str = "agentic-workflow";

/// Loads configuration from the default search paths.
///
/// Search order:
/// 1. `./agentic-workflow.toml` (project-local)
/// 2. `~/.config/agentic-workflow/config.toml` (XDG config)
///
/// Returns the default configuration if no config file is found.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be parsed.
pub fn load() -> Result<WorkflowConfig, WorkflowError> {
    for path in search_paths() {
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading configuration");
            return from_path(&path);
        }
    }

    Ok(WorkflowConfig::default())
}

/// Loads configuration from a specific file path.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The file contains invalid TOML
/// - The TOML doesn't match the expected schema
pub fn from_path(path: &Path) -> Result<WorkflowConfig, WorkflowError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        WorkflowError::configuration(
            "config_file",
            format!("failed to read '{}': {}", path.display(), e),
        )
    })?;

    from_str(&contents).map_err(|e| {
        WorkflowError::configuration(
            "config_file",
            format!("failed to parse '{}': {}", path.display(), e),
        )
    })
}

/// Parses configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or doesn't match the schema.
///
/// # Example
///
/// ```rust
/// use agentic_workflow::config::from_str;
///
/// let config = from_str(r#"
/// [provider]
/// type = "ollama"
/// model = "llama3.2"
/// "#).unwrap();
///
/// assert_eq!(config.provider.model, "llama3.2");
/// assert_eq!(config.server.bind, "127.0.0.1:8000");
/// ```
pub fn from_str(toml_str: &str) -> Result<WorkflowConfig, WorkflowError> {
    toml::from_str(toml_str)
        .map_err(|e| WorkflowError::configuration("config", format!("invalid TOML: {e}")))
}

/// Returns the paths that would be searched for configuration files.
#[must_use]
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_NAME)];

    if let Some(config_dir) = xdg_config_dir() {
        paths.push(config_dir.join(XDG_CONFIG_NAME));
    }

    paths
}

/// Returns the XDG config directory for this application.
///
/// This is `~/.config/agentic-workflow` on most systems.
#[must_use]
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_NAME))
}
