//! Tool registry.
//!
//! The registry is process-wide shared state: requests read it concurrently
//! while tool management mutates it. A single lock guards the table, and
//! only the table. Lookups hand out cheap [`Tool`] clones so that a slow or
//! hung tool never runs while the lock is held.
//!
//! ## Snapshots
//!
//! Tool metadata can be written to and restored from a JSON snapshot keyed by
//! tool name, in registration order:
//!
//! ```json
//! {
//!   "calculate": {"description": "...", "type": "builtin"},
//!   "shout": {"description": "...", "type": "dynamic", "init_code": "", "call_code": "input.to_upper()"}
//! }
//! ```
//!
//! Synthesized tools are recompiled from their source on load.

use crate::tools::builtins::BuiltinTools;
use crate::tools::compiler::DynamicToolCompiler;
use crate::tools::definition::{Tool, ToolSource};
use crate::tools::error::ToolError;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Name-keyed tool table with stable enumeration order.
#[derive(Debug, Default)]
struct ToolTable {
    order: Vec<String>,
    tools: HashMap<String, Tool>,
}

impl ToolTable {
    fn insert(&mut self, tool: Tool) -> Option<Tool> {
        let name = tool.name().to_string();
        let previous = self.tools.insert(name.clone(), tool);
        if previous.is_none() {
            self.order.push(name);
        }
        previous
    }

    fn remove(&mut self, name: &str) -> Option<Tool> {
        let removed = self.tools.remove(name)?;
        self.order.retain(|entry| entry != name);
        Some(removed)
    }

    fn ordered(&self) -> impl Iterator<Item = &Tool> {
        self.order.iter().filter_map(|name| self.tools.get(name))
    }
}

/// Registry of the tools available to agents.
///
/// Registration and removal are case-sensitive; [`find`](Self::find) is the
/// case-insensitive lookup used when dispatching a model's action.
///
/// # Example
///
/// ```rust
/// use agentic_workflow::tools::ToolRegistry;
///
/// let registry = ToolRegistry::new();
/// registry.create_from_source("echo", "Repeats input. Example: echo: hi", "", "input").unwrap();
///
/// assert!(registry.get("echo").is_some());
/// assert!(registry.find("ECHO").is_some());
/// assert!(registry.remove("echo"));
/// ```
#[derive(Debug, Default)]
pub struct ToolRegistry {
    table: RwLock<ToolTable>,
    compiler: DynamicToolCompiler,
}

impl ToolRegistry {
    /// Creates an empty registry with the default compiler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry that synthesizes tools with `compiler`.
    #[must_use]
    pub fn with_compiler(compiler: DynamicToolCompiler) -> Self {
        Self {
            table: RwLock::default(),
            compiler,
        }
    }

    /// Creates a registry pre-populated with every built-in tool.
    #[must_use]
    pub fn with_builtins(compiler: DynamicToolCompiler) -> Self {
        let registry = Self::with_compiler(compiler);
        registry.register_builtins();
        registry
    }

    fn read(&self) -> RwLockReadGuard<'_, ToolTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ToolTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers every built-in tool.
    pub fn register_builtins(&self) {
        for tool in BuiltinTools::all() {
            self.register(tool);
        }
    }

    /// Inserts a tool, replacing any tool of the same name.
    ///
    /// Replacing is not an error: the last registration wins and keeps the
    /// position of the first in [`list`](Self::list).
    pub fn register(&self, tool: Tool) -> Tool {
        let replaced = self.write().insert(tool.clone());

        if replaced.is_some() {
            tracing::info!(tool_name = %tool.name(), "Tool replaced");
        } else {
            tracing::info!(tool_name = %tool.name(), kind = tool.definition().source.label(), "Tool registered");
        }
        tool
    }

    /// Exact-name lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Tool> {
        self.read().tools.get(name).cloned()
    }

    /// Case-insensitive lookup, preferring an exact match.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<Tool> {
        let table = self.read();
        if let Some(tool) = table.tools.get(name) {
            return Some(tool.clone());
        }
        let found = table
            .ordered()
            .find(|tool| tool.name().eq_ignore_ascii_case(name))
            .cloned();
        found
    }

    /// Returns all tools in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<Tool> {
        self.read().ordered().cloned().collect()
    }

    /// Inserts a tool only if its name is free.
    ///
    /// The check and the insert happen under one write guard, so of two
    /// concurrent registrations of the same name exactly one succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyRegistered` if a tool with that name exists.
    pub fn register_new(&self, tool: Tool) -> Result<Tool, ToolError> {
        {
            let mut table = self.write();
            if table.tools.contains_key(tool.name()) {
                return Err(ToolError::already_registered(tool.name()));
            }
            table.insert(tool.clone());
        }

        tracing::info!(tool_name = %tool.name(), kind = tool.definition().source.label(), "Tool registered");
        Ok(tool)
    }

    /// Removes a tool. Returns false if no tool had that name.
    pub fn remove(&self, name: &str) -> bool {
        let removed = self.write().remove(name).is_some();
        if removed {
            tracing::info!(tool_name = name, "Tool removed");
        }
        removed
    }

    /// Returns true if a tool with exactly this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.read().tools.contains_key(name)
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().tools.len()
    }

    /// Returns true if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().tools.is_empty()
    }

    /// Returns the compiler used for synthesized tools.
    #[must_use]
    pub fn compiler(&self) -> &DynamicToolCompiler {
        &self.compiler
    }

    /// Synthesizes a tool from source and registers it.
    ///
    /// Compilation, including the init fragment's one run, happens before
    /// the table is touched, so a failure leaves the registry unchanged.
    ///
    /// # Errors
    ///
    /// Returns a `Compilation` error for malformed source and an
    /// `Initialization` error when the init fragment raises.
    pub fn create_from_source(
        &self,
        name: &str,
        description: &str,
        init_source: &str,
        call_source: &str,
    ) -> Result<Tool, ToolError> {
        let tool = synthesize(&self.compiler, name, description, init_source, call_source)?;
        Ok(self.register(tool))
    }

    /// Synthesizes a tool from source without registering it.
    ///
    /// The init fragment runs here, so callers on an async runtime should
    /// move this onto the blocking pool.
    ///
    /// # Errors
    ///
    /// Same as [`create_from_source`](Self::create_from_source).
    pub fn synthesize(
        &self,
        name: &str,
        description: &str,
        init_source: &str,
        call_source: &str,
    ) -> Result<Tool, ToolError> {
        synthesize(&self.compiler, name, description, init_source, call_source)
    }

    /// Replaces the description of a registered tool, keeping its behavior.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no tool has that name.
    pub fn update_description(&self, name: &str, description: &str) -> Result<Tool, ToolError> {
        let mut table = self.write();
        let updated = table
            .tools
            .get(name)
            .map(|tool| tool.with_description(description))
            .ok_or_else(|| ToolError::not_found(name))?;
        table.insert(updated.clone());
        Ok(updated)
    }

    /// Writes the metadata of every tool to `path`.
    ///
    /// The snapshot is written to a sibling temporary file and renamed into
    /// place, so readers never observe a partial file.
    ///
    /// # Errors
    ///
    /// Returns a `Snapshot` error if serialization or any file operation fails.
    pub async fn save_snapshot(&self, path: &Path) -> Result<(), ToolError> {
        let entries: Vec<(String, SnapshotEntry)> = self
            .list()
            .iter()
            .map(|tool| (tool.name().to_string(), SnapshotEntry::from(tool)))
            .collect();
        let count = entries.len();

        let fail = |message: String| ToolError::snapshot(path.display().to_string(), message);

        let json = serde_json::to_string_pretty(&Snapshot(entries))
            .map_err(|e| fail(format!("serialization failed: {e}")))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| fail(format!("cannot create directory: {e}")))?;
        }

        let mut temp = path.as_os_str().to_owned();
        temp.push(".tmp");
        tokio::fs::write(&temp, json)
            .await
            .map_err(|e| fail(format!("write failed: {e}")))?;
        tokio::fs::rename(&temp, path)
            .await
            .map_err(|e| fail(format!("rename failed: {e}")))?;

        tracing::debug!(path = %path.display(), tools = count, "Tool snapshot saved");
        Ok(())
    }

    /// Restores tools from a snapshot written by [`save_snapshot`](Self::save_snapshot).
    ///
    /// A missing or unreadable snapshot restores nothing. Entries that fail
    /// to restore are logged and skipped. Returns the number of tools
    /// restored.
    pub async fn load_snapshot(&self, path: &Path) -> usize {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No tool snapshot found");
                return 0;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Tool snapshot unreadable");
                return 0;
            }
        };

        let RawSnapshot(entries) = match serde_json::from_str(&text) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Tool snapshot corrupt, nothing restored");
                return 0;
            }
        };

        let mut restored = 0;
        for (name, value) in entries {
            match self.restore(&name, value).await {
                Ok(()) => restored += 1,
                Err(e) => {
                    tracing::warn!(tool_name = %name, error = %e, "Skipping snapshot entry");
                }
            }
        }

        tracing::info!(path = %path.display(), restored, "Tool snapshot loaded");
        restored
    }

    async fn restore(&self, name: &str, value: serde_json::Value) -> Result<(), ToolError> {
        let entry: SnapshotEntry = serde_json::from_value(value)
            .map_err(|e| ToolError::validation_failed(name, format!("malformed entry: {e}")))?;

        match entry.source {
            ToolSource::Builtin => {
                let builtin = BuiltinTools::get(name).ok_or_else(|| ToolError::not_found(name))?;
                self.register(builtin.with_description(entry.description));
            }
            ToolSource::Synthesized {
                init_code,
                call_code,
            } => {
                let compiler = self.compiler.clone();
                let tool_name = name.to_string();
                let tool = tokio::task::spawn_blocking(move || {
                    synthesize(&compiler, &tool_name, &entry.description, &init_code, &call_code)
                })
                .await
                .map_err(|e| ToolError::internal(format!("tool restore task failed: {e}")))??;
                self.register(tool);
            }
        }
        Ok(())
    }
}

fn synthesize(
    compiler: &DynamicToolCompiler,
    name: &str,
    description: &str,
    init_source: &str,
    call_source: &str,
) -> Result<Tool, ToolError> {
    if name.trim().is_empty() {
        return Err(ToolError::validation_failed(name, "tool name cannot be empty"));
    }

    compiler
        .compile(name, description, init_source, call_source)
        .map_err(|e| {
            tracing::error!(tool_name = name, error = %e, "Tool synthesis failed");
            ToolError::from_compilation(name, &e)
        })
}

/// One tool's persisted metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SnapshotEntry {
    description: String,
    #[serde(flatten)]
    source: ToolSource,
}

impl From<&Tool> for SnapshotEntry {
    fn from(tool: &Tool) -> Self {
        Self {
            description: tool.description().to_string(),
            source: tool.definition().source.clone(),
        }
    }
}

/// Serializes as a JSON object whose keys keep registration order.
struct Snapshot(Vec<(String, SnapshotEntry)>);

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, entry) in &self.0 {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

/// Deserializes a JSON object into its entries in document order, leaving
/// each value unparsed so one bad entry does not spoil the rest.
struct RawSnapshot(Vec<(String, serde_json::Value)>);

impl<'de> Deserialize<'de> for RawSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawSnapshot;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of tool names to tool metadata")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, serde_json::Value>()? {
                    entries.push(entry);
                }
                Ok(RawSnapshot(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::definition::{ToolDefinition, ToolExecutionFuture, ToolExecutor};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[derive(Debug)]
    struct Fixed(&'static str);

    impl ToolExecutor for Fixed {
        fn execute(&self, _input: String) -> ToolExecutionFuture {
            let output = self.0;
            Box::pin(async move { Ok(output.to_string()) })
        }
    }

    fn fixed(name: &str, description: &str, output: &'static str) -> Tool {
        Tool::new(ToolDefinition::builtin(name, description), Arc::new(Fixed(output)))
    }

    fn names(registry: &ToolRegistry) -> Vec<String> {
        registry.list().iter().map(|t| t.name().to_string()).collect()
    }

    #[test]
    fn register_then_get() {
        let registry = ToolRegistry::new();
        registry.register(fixed("alpha", "First tool", "a"));

        let tool = registry.get("alpha").unwrap();
        assert_eq!(tool.name(), "alpha");
        assert_eq!(tool.description(), "First tool");
    }

    #[test]
    fn remove_then_get_is_absent() {
        let registry = ToolRegistry::new();
        registry.register(fixed("alpha", "First tool", "a"));

        assert!(registry.remove("alpha"));
        assert!(registry.get("alpha").is_none());
        assert!(!registry.remove("alpha"));
    }

    #[tokio::test]
    async fn overwrite_keeps_single_entry_and_position() {
        let registry = ToolRegistry::new();
        registry.register(fixed("alpha", "old", "first"));
        registry.register(fixed("beta", "b", "b"));
        registry.register(fixed("alpha", "new", "second"));

        assert_eq!(registry.len(), 2);
        assert_eq!(names(&registry), vec!["alpha", "beta"]);

        let tool = registry.get("alpha").unwrap();
        assert_eq!(tool.description(), "new");
        assert_eq!(tool.invoke("").await.unwrap(), "second");
    }

    #[test]
    fn registration_is_case_sensitive_but_find_is_not() {
        let registry = ToolRegistry::new();
        registry.register(fixed("Search", "s", "s"));

        assert!(registry.get("search").is_none());
        assert!(!registry.remove("search"));
        assert_eq!(registry.find("SEARCH").unwrap().name(), "Search");
    }

    #[test]
    fn find_prefers_exact_match() {
        let registry = ToolRegistry::new();
        registry.register(fixed("tool", "lower", "l"));
        registry.register(fixed("TOOL", "upper", "u"));

        assert_eq!(registry.find("TOOL").unwrap().description(), "upper");
        assert_eq!(registry.find("Tool").unwrap().description(), "lower");
    }

    #[test]
    fn register_new_refuses_taken_name() {
        let registry = ToolRegistry::new();
        registry.register_new(fixed("alpha", "first", "a")).unwrap();

        let error = registry.register_new(fixed("alpha", "second", "b")).unwrap_err();
        assert!(error.is_already_registered());
        assert_eq!(registry.get("alpha").unwrap().description(), "first");
    }

    #[test]
    fn synthesize_does_not_register() {
        let registry = ToolRegistry::new();
        let tool = registry.synthesize("loose", "Unregistered", "", "input").unwrap();
        assert_eq!(tool.name(), "loose");
        assert!(registry.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_and_readers_see_a_consistent_table() {
        let registry = Arc::new(ToolRegistry::new());

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    for i in 0..50 {
                        let name = format!("w{w}-{i}");
                        registry.register(fixed(&name, "tmp", "x"));
                        if i % 2 == 0 {
                            assert!(registry.remove(&name));
                        }
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..2)
            .map(|_| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    for _ in 0..100 {
                        let listed = names(&registry);
                        let mut unique = listed.clone();
                        unique.sort();
                        unique.dedup();
                        assert_eq!(unique.len(), listed.len());
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        for task in writers.into_iter().chain(readers) {
            task.await.unwrap();
        }
        assert_eq!(registry.len(), 4 * 25);
        assert!(names(&registry).iter().all(|name| registry.contains(name)));
    }

    /// Blocks inside `execute` until released.
    #[derive(Debug)]
    struct Gate {
        started: Arc<tokio::sync::Notify>,
        release: Arc<tokio::sync::Notify>,
    }

    impl ToolExecutor for Gate {
        fn execute(&self, _input: String) -> ToolExecutionFuture {
            let started = Arc::clone(&self.started);
            let release = Arc::clone(&self.release);
            Box::pin(async move {
                started.notify_one();
                release.notified().await;
                Ok("released".to_string())
            })
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn running_tool_does_not_hold_the_registry() {
        let started = Arc::new(tokio::sync::Notify::new());
        let release = Arc::new(tokio::sync::Notify::new());
        let registry = Arc::new(ToolRegistry::new());
        registry.register(Tool::new(
            ToolDefinition::builtin("hang", "Hangs until released"),
            Arc::new(Gate {
                started: Arc::clone(&started),
                release: Arc::clone(&release),
            }),
        ));

        let tool = registry.find("hang").unwrap();
        let call = tokio::spawn(async move { tool.invoke("").await });
        started.notified().await;

        let mutate = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                registry.register(fixed("beta", "b", "b"));
                registry.update_description("hang", "Still hanging").unwrap();
                assert!(registry.remove("beta"));
                registry.list().len()
            })
        };
        let listed = tokio::time::timeout(std::time::Duration::from_secs(5), mutate)
            .await
            .expect("registry blocked by a running tool")
            .unwrap();
        assert_eq!(listed, 1);

        release.notify_one();
        assert_eq!(call.await.unwrap().unwrap(), "released");
    }

    #[test]
    fn list_is_stable() {
        let registry = ToolRegistry::with_builtins(DynamicToolCompiler::default());
        assert_eq!(names(&registry), names(&registry));
        assert_eq!(registry.len(), BuiltinTools::available().len());
    }

    #[tokio::test]
    async fn create_from_source_registers_working_tool() {
        let registry = ToolRegistry::new();
        registry
            .create_from_source("shout", "Shouts", "", "input.to_upper()")
            .unwrap();

        let tool = registry.get("shout").unwrap();
        assert!(tool.is_synthesized());
        assert_eq!(tool.invoke("hi").await.unwrap(), "HI");
    }

    #[tokio::test]
    async fn failing_call_returns_text_not_error() {
        let registry = ToolRegistry::new();
        let tool = registry
            .create_from_source("fragile", "Fails", "", "throw \"bad input\";")
            .unwrap();

        let output = tool.invoke("x").await.unwrap();
        assert!(output.starts_with("Error: "));
    }

    #[test]
    fn failing_init_is_not_registered() {
        let registry = ToolRegistry::new();
        let error = registry
            .create_from_source("broken", "Never built", "throw \"boom\";", "input")
            .unwrap_err();

        assert!(matches!(
            error.kind(),
            crate::tools::ToolErrorKind::Initialization { .. }
        ));
        assert!(registry.get("broken").is_none());
    }

    #[test]
    fn syntax_error_is_compilation_error() {
        let registry = ToolRegistry::new();
        let error = registry
            .create_from_source("broken", "Bad", "", "let = ;")
            .unwrap_err();

        assert!(matches!(
            error.kind(),
            crate::tools::ToolErrorKind::Compilation { .. }
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn failed_resynthesis_keeps_existing_tool() {
        let registry = ToolRegistry::new();
        registry.create_from_source("t", "v1", "", "1").unwrap();
        assert!(registry.create_from_source("t", "v2", "", "(").is_err());
        assert_eq!(registry.get("t").unwrap().description(), "v1");
    }

    #[test]
    fn update_description_keeps_behavior() {
        let registry = ToolRegistry::new();
        registry.register(fixed("alpha", "old", "a"));

        let updated = registry.update_description("alpha", "new").unwrap();
        assert_eq!(updated.description(), "new");
        assert_eq!(registry.get("alpha").unwrap().description(), "new");

        assert!(registry
            .update_description("missing", "x")
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn snapshot_round_trip_recompiles_synthesized_tools() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state/tools.json");

        let registry = ToolRegistry::new();
        registry.register(
            BuiltinTools::get("calculate")
                .unwrap()
                .with_description("Custom calculator text"),
        );
        registry
            .create_from_source("greet", "Greets", "let greeting = \"Hello\";", "`${greeting}, ${input}`")
            .unwrap();
        registry.save_snapshot(&path).await.unwrap();

        let restored = ToolRegistry::new();
        assert_eq!(restored.load_snapshot(&path).await, 2);
        assert_eq!(names(&restored), vec!["calculate", "greet"]);
        assert_eq!(
            restored.get("calculate").unwrap().description(),
            "Custom calculator text"
        );

        let greet = restored.get("greet").unwrap();
        assert_eq!(greet.invoke("Ada").await.unwrap(), "Hello, Ada");
    }

    #[tokio::test]
    async fn snapshot_layout_is_name_keyed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tools.json");

        let registry = ToolRegistry::new();
        registry.create_from_source("t", "desc", "let a = 1;", "a").unwrap();
        registry.save_snapshot(&path).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "t": {"description": "desc", "type": "dynamic", "init_code": "let a = 1;", "call_code": "a"}
            })
        );
    }

    #[tokio::test]
    async fn missing_snapshot_restores_nothing() {
        let dir = TempDir::new().unwrap();
        let registry = ToolRegistry::new();
        assert_eq!(registry.load_snapshot(&dir.path().join("absent.json")).await, 0);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn corrupt_snapshot_restores_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tools.json");
        std::fs::write(&path, "{ not json").unwrap();

        let registry = ToolRegistry::new();
        assert_eq!(registry.load_snapshot(&path).await, 0);
    }

    #[tokio::test]
    async fn bad_entries_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tools.json");
        std::fs::write(
            &path,
            r#"{
                "good": {"description": "ok", "type": "dynamic", "init_code": "", "call_code": "input"},
                "unparseable": {"description": "bad", "type": "dynamic", "init_code": "", "call_code": "let = ;"},
                "unknown_builtin": {"description": "x", "type": "builtin"},
                "malformed": {"type": 7}
            }"#,
        )
        .unwrap();

        let registry = ToolRegistry::new();
        assert_eq!(registry.load_snapshot(&path).await, 1);
        assert_eq!(names(&registry), vec!["good"]);
    }
}
