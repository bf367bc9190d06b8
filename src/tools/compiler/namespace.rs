//! The restricted namespace synthesized tools run in.
//!
//! Scripts get the core language (strings, arrays, maps, math) plus a small
//! allow-list of static modules:
//!
//! - `re`: regular expressions (`is_match`, `find_all`, `replace`, `count`)
//! - `path`: path manipulation without touching the disk
//! - `fs`: file access, only when [`NamespacePolicy::allow_filesystem`] is set
//!
//! Module import and `eval` are disabled, and every call runs under
//! operation, size and depth limits. This is best-effort isolation, not a
//! security boundary: whoever may submit tool source must be trusted.

use regex::Regex;
use rhai::module_resolvers::DummyModuleResolver;
use rhai::{Array, Dynamic, Engine, EvalAltResult, ImmutableString, Module, INT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

type ScriptResult<T> = Result<T, Box<EvalAltResult>>;

/// Limits and capabilities granted to synthesized tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespacePolicy {
    /// Maximum script operations per call (init or invocation)
    pub max_operations: u64,
    /// Maximum length of any string value
    pub max_string_size: usize,
    /// Maximum number of elements in an array
    pub max_array_size: usize,
    /// Maximum number of entries in an object map
    pub max_map_size: usize,
    /// Maximum function call depth
    pub max_call_levels: usize,
    /// Registers the `fs` module
    pub allow_filesystem: bool,
    /// Wall-clock bound on one invocation, in seconds
    pub call_timeout_secs: u64,
}

impl Default for NamespacePolicy {
    fn default() -> Self {
        Self {
            max_operations: 1_000_000,
            max_string_size: 1024 * 1024,
            max_array_size: 10_000,
            max_map_size: 10_000,
            max_call_levels: 32,
            allow_filesystem: false,
            call_timeout_secs: 30,
        }
    }
}

impl NamespacePolicy {
    /// Grants or withholds the `fs` module.
    #[must_use]
    pub fn with_filesystem(mut self, allow: bool) -> Self {
        self.allow_filesystem = allow;
        self
    }

    /// Sets the operation budget per call.
    #[must_use]
    pub fn with_max_operations(mut self, max_operations: u64) -> Self {
        self.max_operations = max_operations;
        self
    }

    /// Sets the per-invocation timeout.
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Returns the per-invocation timeout.
    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

/// Builds a script engine confined to `policy`.
#[must_use]
pub fn build_engine(policy: &NamespacePolicy) -> Engine {
    let mut engine = Engine::new();

    engine.set_module_resolver(DummyModuleResolver::new());
    engine.disable_symbol("eval");
    engine.disable_symbol("import");

    engine.set_max_operations(policy.max_operations);
    engine.set_max_string_size(policy.max_string_size);
    engine.set_max_array_size(policy.max_array_size);
    engine.set_max_map_size(policy.max_map_size);
    engine.set_max_call_levels(policy.max_call_levels);
    engine.set_max_expr_depths(64, 32);

    engine.on_print(|text| tracing::info!(target: "agentic_workflow::script", "{text}"));
    engine.on_debug(|text, source, position| {
        tracing::debug!(
            target: "agentic_workflow::script",
            source = source.unwrap_or("tool"),
            position = %position,
            "{text}"
        );
    });

    engine.register_static_module("re", regex_module().into());
    engine.register_static_module("path", path_module().into());
    if policy.allow_filesystem {
        engine.register_static_module("fs", fs_module().into());
    }

    engine
}

fn compile_pattern(pattern: &str) -> ScriptResult<Regex> {
    Regex::new(pattern).map_err(|e| format!("invalid pattern '{pattern}': {e}").into())
}

fn regex_module() -> Module {
    let mut module = Module::new();

    module.set_native_fn(
        "is_match",
        |text: ImmutableString, pattern: ImmutableString| -> ScriptResult<bool> {
            Ok(compile_pattern(&pattern)?.is_match(&text))
        },
    );
    module.set_native_fn(
        "find_all",
        |text: ImmutableString, pattern: ImmutableString| -> ScriptResult<Array> {
            let regex = compile_pattern(&pattern)?;
            Ok(regex
                .find_iter(&text)
                .map(|m| Dynamic::from(m.as_str().to_string()))
                .collect())
        },
    );
    module.set_native_fn(
        "replace",
        |text: ImmutableString,
         pattern: ImmutableString,
         replacement: ImmutableString|
         -> ScriptResult<String> {
            let regex = compile_pattern(&pattern)?;
            Ok(regex.replace_all(&text, replacement.as_str()).into_owned())
        },
    );
    module.set_native_fn(
        "count",
        |text: ImmutableString, pattern: ImmutableString| -> ScriptResult<INT> {
            let regex = compile_pattern(&pattern)?;
            Ok(INT::try_from(regex.find_iter(&text).count()).unwrap_or(INT::MAX))
        },
    );

    module
}

fn path_module() -> Module {
    let mut module = Module::new();

    module.set_native_fn(
        "join",
        |base: ImmutableString, part: ImmutableString| -> ScriptResult<String> {
            Ok(Path::new(base.as_str())
                .join(part.as_str())
                .to_string_lossy()
                .into_owned())
        },
    );
    module.set_native_fn("file_name", |path: ImmutableString| -> ScriptResult<String> {
        Ok(Path::new(path.as_str())
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default())
    });
    module.set_native_fn("extension", |path: ImmutableString| -> ScriptResult<String> {
        Ok(Path::new(path.as_str())
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default())
    });
    module.set_native_fn("parent", |path: ImmutableString| -> ScriptResult<String> {
        Ok(Path::new(path.as_str())
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default())
    });
    module.set_native_fn("is_absolute", |path: ImmutableString| -> ScriptResult<bool> {
        Ok(Path::new(path.as_str()).is_absolute())
    });

    module
}

fn fs_module() -> Module {
    let mut module = Module::new();

    module.set_native_fn("read", |path: ImmutableString| -> ScriptResult<String> {
        std::fs::read_to_string(path.as_str())
            .map_err(|e| format!("cannot read '{path}': {e}").into())
    });
    module.set_native_fn(
        "write",
        |path: ImmutableString, content: ImmutableString| -> ScriptResult<()> {
            std::fs::write(path.as_str(), content.as_str())
                .map_err(|e| format!("cannot write '{path}': {e}").into())
        },
    );
    module.set_native_fn(
        "append",
        |path: ImmutableString, content: ImmutableString| -> ScriptResult<()> {
            use std::io::Write;
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path.as_str())
                .and_then(|mut file| file.write_all(content.as_bytes()))
                .map_err(|e| format!("cannot append to '{path}': {e}").into())
        },
    );
    module.set_native_fn("exists", |path: ImmutableString| -> ScriptResult<bool> {
        Ok(Path::new(path.as_str()).exists())
    });

    module
}
