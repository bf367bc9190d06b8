//! Source normalization for submitted fragments.
//!
//! Callers (and models) routinely paste code wrapped in Markdown fences or
//! with Windows line endings. The script language is whitespace-insensitive,
//! so normalization only has to peel those wrappers off.

use super::error::CompilationError;

/// Normalizes init and call fragments before they are parsed.
///
/// # Example
///
/// ```rust
/// use agentic_workflow::tools::compiler::CodeTemplate;
///
/// let template = CodeTemplate::new();
/// let call = template.prepare_call("```rhai\ninput.to_upper()\n```").unwrap();
/// assert_eq!(call, "input.to_upper()");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CodeTemplate;

impl CodeTemplate {
    /// Creates a new `CodeTemplate`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Normalizes an init fragment. An empty init fragment is allowed.
    #[must_use]
    pub fn prepare_init(&self, code: &str) -> String {
        normalize(code)
    }

    /// Normalizes a call fragment.
    ///
    /// # Errors
    ///
    /// Returns `CompilationError::empty_source` if nothing is left after
    /// normalization.
    pub fn prepare_call(&self, code: &str) -> Result<String, CompilationError> {
        let normalized = normalize(code);
        if normalized.is_empty() {
            return Err(CompilationError::empty_source("call"));
        }
        Ok(normalized)
    }
}

fn normalize(code: &str) -> String {
    let unified = code.replace("\r\n", "\n");
    strip_code_fence(&unified).to_string()
}

/// Removes a surrounding ```` ``` ```` or `"""` fence, with an optional
/// language tag on the opening line, and trims the result.
///
/// Text without a complete fence is returned trimmed.
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    for fence in ["```", "\"\"\""] {
        let Some(inner) = trimmed
            .strip_prefix(fence)
            .and_then(|rest| rest.strip_suffix(fence))
        else {
            continue;
        };

        let body = match inner.split_once('\n') {
            Some((tag, rest)) if is_language_tag(tag) => rest,
            _ => inner,
        };
        return body.trim();
    }
    trimmed
}

/// A blank line or a single word such as `rust`, `c++` or `shell-session`.
fn is_language_tag(line: &str) -> bool {
    let tag = line.trim();
    let mut chars = tag.chars();
    match chars.next() {
        None => true,
        Some(first) if first.is_alphanumeric() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '+' | '-'))
        }
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_backtick_fence_with_language() {
        assert_eq!(strip_code_fence("```python\nprint(1)\n```"), "print(1)");
    }

    #[test]
    fn strips_triple_quote_fence() {
        assert_eq!(strip_code_fence("\"\"\"\nhello\nworld\n\"\"\""), "hello\nworld");
    }

    #[test]
    fn leaves_unfenced_text_trimmed() {
        assert_eq!(strip_code_fence("  plain text \n"), "plain text");
        assert_eq!(strip_code_fence("```unterminated"), "```unterminated");
    }

    #[test]
    fn first_line_of_prose_is_not_a_language_tag() {
        assert_eq!(
            strip_code_fence("```Dear Ada\nSee you soon\n```"),
            "Dear Ada\nSee you soon"
        );
        assert_eq!(
            strip_code_fence("\"\"\"Total: 3 items\nshipped\"\"\""),
            "Total: 3 items\nshipped"
        );
    }

    #[test]
    fn single_word_tags_are_stripped() {
        assert_eq!(strip_code_fence("```c++\nint x;\n```"), "int x;");
        assert_eq!(strip_code_fence("```\nbare\n```"), "bare");
    }

    #[test]
    fn single_line_fence_keeps_content() {
        assert_eq!(strip_code_fence("```x + 1```"), "x + 1");
    }

    #[test]
    fn prepare_call_rejects_empty_fragment() {
        let template = CodeTemplate::new();
        let error = template.prepare_call("```\n\n```").unwrap_err();
        assert!(error.is_code_error());
    }

    #[test]
    fn prepare_normalizes_line_endings() {
        let template = CodeTemplate::new();
        assert_eq!(template.prepare_init("let a = 1;\r\nlet b = 2;"), "let a = 1;\nlet b = 2;");
        assert_eq!(template.prepare_init(""), "");
    }
}
