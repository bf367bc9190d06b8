//! Configuration management.
//!
//! # Configuration File Format
//!
//! Configuration is stored in TOML format. The search order is:
//! 1. `./agentic-workflow.toml` (project-local)
//! 2. `~/.config/agentic-workflow/config.toml` (XDG config)
//!
//! Every section is optional.
//!
//! ```toml
//! [provider]
//! type = "ollama"
//! model = "llama3.2"
//! timeout_secs = 300
//!
//! [storage]
//! database = "agentic-workflow.db"
//! tool_snapshot = "tools.json"
//!
//! [sandbox]
//! max_operations = 1000000
//! call_timeout_secs = 30
//!
//! [server]
//! bind = "127.0.0.1:8000"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! API keys are never required in the file: `api_key_env` (or the backend's
//! standard variable such as `GROQ_API_KEY`) is read at startup.

mod file;
mod types;

pub use file::{from_path, from_str, load, search_paths, xdg_config_dir, APP_NAME, LOCAL_CONFIG_NAME};
pub use types::{ProviderSettings, ServerSettings, StorageSettings, WorkflowConfig};
