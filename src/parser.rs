//! Tolerant extraction of agent decisions from model output.
//!
//! Models are asked to reply with a JSON object, but in practice the reply
//! may be bare JSON, JSON wrapped in prose or a code fence, or loosely
//! labeled text. [`ResponseParser`] runs an ordered list of strategies from
//! most to least trustworthy:
//!
//! 1. the whole text as a JSON object
//! 2. the first embedded `{...}` object carrying a decision key
//! 3. `Thought:` / `Answer:` / `Action:` labels
//! 4. the raw text as the answer
//!
//! A field supplied by an earlier strategy is never overwritten by a later
//! one. Parsing never fails.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Keys that mark a JSON object as a decision.
const DECISION_KEYS: [&str; 3] = ["thought", "answer", "action"];

type Strategy = fn(&str) -> Option<Partial>;

/// Strategies consulted after the whole-text parse, in priority order.
const LOWER_STRATEGIES: [(&str, Strategy); 2] = [
    ("embedded_json", embedded_json),
    ("labeled_text", labeled_text),
];

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolAction {
    /// Name of the tool, as the model spelled it
    pub tool_name: String,
    /// Why the model chose the tool
    pub reason: String,
    /// Text passed to the tool
    pub input_text: String,
}

impl ToolAction {
    /// Creates an action with no stated reason.
    #[must_use]
    pub fn new(tool_name: impl Into<String>, input_text: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            reason: String::new(),
            input_text: input_text.into(),
        }
    }

    /// Sets the stated reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Reads an action object: `{"name", "reason", "input"}`.
    ///
    /// `tool` and `tool_name` are accepted for the name. A non-string input
    /// is passed on as compact JSON.
    fn from_object(object: &Map<String, Value>) -> Option<Self> {
        let tool_name = ["name", "tool", "tool_name"]
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .filter(|name| !name.is_empty())?;

        let input_text = ["input", "input_text", "arguments"]
            .iter()
            .find_map(|key| object.get(*key))
            .map(text_of)
            .unwrap_or_default();

        let reason = object.get("reason").map(text_of).unwrap_or_default();

        Some(Self::new(tool_name, input_text).with_reason(reason))
    }
}

/// The structured decision recovered from one model reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDecision {
    /// The model's reasoning; empty when none was found
    pub thought: String,
    /// A requested tool invocation
    pub action: Option<ToolAction>,
    /// The final answer
    pub answer: Option<String>,
}

impl ParsedDecision {
    /// Returns true if the model supplied an answer.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.answer.is_some()
    }

    /// Returns the answer text, or an empty string.
    #[must_use]
    pub fn answer_text(&self) -> &str {
        self.answer.as_deref().unwrap_or_default()
    }
}

/// Fields recovered so far; `None` means "not yet found".
#[derive(Debug, Default)]
struct Partial {
    thought: Option<String>,
    action: Option<ToolAction>,
    answer: Option<String>,
}

impl Partial {
    fn is_empty(&self) -> bool {
        self.thought.is_none() && self.action.is_none() && self.answer.is_none()
    }

    fn is_complete(&self) -> bool {
        self.thought.is_some() && self.action.is_some() && self.answer.is_some()
    }

    /// Fills only the fields still missing.
    fn merge(&mut self, other: Partial) {
        if self.thought.is_none() {
            self.thought = other.thought;
        }
        if self.action.is_none() {
            self.action = other.action;
        }
        if self.answer.is_none() {
            self.answer = other.answer;
        }
    }

    fn into_decision(self) -> ParsedDecision {
        ParsedDecision {
            thought: self.thought.unwrap_or_default(),
            action: self.action,
            answer: self.answer,
        }
    }
}

/// Recovers [`ParsedDecision`]s from raw model output.
///
/// # Example
///
/// ```rust
/// use agentic_workflow::parser::ResponseParser;
///
/// let parser = ResponseParser::new();
///
/// let decision = parser.parse(r#"{"thought":"t","answer":"a"}"#);
/// assert_eq!(decision.thought, "t");
/// assert_eq!(decision.answer.as_deref(), Some("a"));
///
/// let decision = parser.parse("garbage text");
/// assert_eq!(decision.thought, "");
/// assert_eq!(decision.answer.as_deref(), Some("garbage text"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser;

impl ResponseParser {
    /// Creates a parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parses `raw` into a decision.
    #[must_use]
    pub fn parse(&self, raw: &str) -> ParsedDecision {
        let text = raw.trim();

        if let Some(decision) = whole_json(text) {
            tracing::debug!(strategy = "whole_json", "Parsed model reply");
            return decision.into_decision();
        }

        let mut partial = Partial::default();
        for (strategy, extract) in LOWER_STRATEGIES {
            if partial.is_complete() {
                break;
            }
            if let Some(found) = extract(text) {
                tracing::debug!(strategy, "Parsed model reply");
                partial.merge(found);
            }
        }

        if partial.is_empty() {
            tracing::debug!(strategy = "raw_text", "Model reply had no structure");
            partial.answer = Some(text.to_string());
        }

        partial.into_decision()
    }
}

/// Layer 1: the entire reply is a decision object.
fn whole_json(text: &str) -> Option<Partial> {
    let value: Value = serde_json::from_str(text).ok()?;
    decision_from_value(&value)
}

/// Layer 2: the first brace-delimited object in the reply that is a decision.
fn embedded_json(text: &str) -> Option<Partial> {
    text.char_indices()
        .filter(|(_, c)| *c == '{')
        .filter_map(|(start, _)| balanced_object(text, start))
        .filter_map(|candidate| serde_json::from_str::<Value>(candidate).ok())
        .find_map(|value| decision_from_value(&value))
}

/// Layer 3: `Thought:`, `Answer:` and `Action:` labels.
///
/// Labels are case-sensitive and must open a line, so prose such as
/// "the answer: ..." inside a thought is not mistaken for one.
fn labeled_text(text: &str) -> Option<Partial> {
    static LABELS: OnceLock<Option<Regex>> = OnceLock::new();
    let labels = LABELS
        .get_or_init(|| Regex::new(r"(?m)^[ \t]*(Thought|Answer|Action)[ \t]*:").ok())
        .as_ref()?;

    let found: Vec<_> = labels.captures_iter(text).collect();
    let mut partial = Partial::default();

    for (index, captures) in found.iter().enumerate() {
        let (Some(label), Some(whole)) = (captures.get(1), captures.get(0)) else {
            continue;
        };
        let end = found
            .get(index + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |next| next.start());
        let body = text[whole.end()..end].trim();

        match label.as_str() {
            "Thought" if partial.thought.is_none() => partial.thought = Some(body.to_string()),
            "Answer" if partial.answer.is_none() => partial.answer = Some(body.to_string()),
            "Action" if partial.action.is_none() => {
                partial.action = body
                    .find('{')
                    .and_then(|start| balanced_object(body, start))
                    .and_then(|object| serde_json::from_str::<Value>(object).ok())
                    .and_then(|value| value.as_object().and_then(ToolAction::from_object));
            }
            _ => {}
        }
    }

    (!partial.is_empty()).then_some(partial)
}

/// Reads a decision out of a JSON value if it is an object with a decision key.
fn decision_from_value(value: &Value) -> Option<Partial> {
    let object = value.as_object()?;
    if !DECISION_KEYS.iter().any(|key| object.contains_key(*key)) {
        return None;
    }

    let thought = object
        .get("thought")
        .filter(|v| !v.is_null())
        .map(text_of);
    let answer = object.get("answer").filter(|v| !v.is_null()).map(text_of);
    let action = match object.get("action") {
        Some(Value::Object(action)) => ToolAction::from_object(action),
        // {"action": "tool", "action_input": "..."}
        Some(Value::String(name)) if !name.trim().is_empty() => {
            let input = ["action_input", "input"]
                .iter()
                .find_map(|key| object.get(*key))
                .map(text_of)
                .unwrap_or_default();
            Some(ToolAction::new(name.trim(), input))
        }
        _ => None,
    };

    let partial = Partial {
        thought,
        action,
        answer,
    };
    // Recognized the shape but every decision field was null or unusable.
    (!partial.is_empty()).then_some(partial)
}

/// Returns the `{...}` substring starting at `start` whose braces balance,
/// ignoring braces inside JSON strings.
fn balanced_object(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParsedDecision {
        ResponseParser::new().parse(text)
    }

    #[test]
    fn whole_json_thought_and_answer() {
        let decision = parse(r#"{"thought":"t","answer":"a"}"#);
        assert_eq!(decision.thought, "t");
        assert_eq!(decision.answer.as_deref(), Some("a"));
        assert!(decision.action.is_none());
    }

    #[test]
    fn labeled_thought_and_answer() {
        let decision = parse("Thought: t\nAnswer: a");
        assert_eq!(decision.thought, "t");
        assert_eq!(decision.answer.as_deref(), Some("a"));
        assert!(decision.action.is_none());
    }

    #[test]
    fn garbage_becomes_answer() {
        let decision = parse("garbage text");
        assert_eq!(decision.thought, "");
        assert_eq!(decision.answer.as_deref(), Some("garbage text"));
        assert!(decision.action.is_none());
    }

    #[test]
    fn whole_json_action() {
        let decision = parse(
            r#"{"thought":"need math","action":{"name":"calculate","reason":"arithmetic","input":"2 + 2"}}"#,
        );
        assert_eq!(decision.thought, "need math");
        assert_eq!(
            decision.action,
            Some(ToolAction::new("calculate", "2 + 2").with_reason("arithmetic"))
        );
        assert!(decision.answer.is_none());
    }

    #[test]
    fn embedded_json_in_prose() {
        let text = "Sure! Here is my plan:\n```json\n{\"thought\": \"look it up\", \"action\": {\"name\": \"wikipedia\", \"input\": \"Rust {lang}\"}}\n```\nDone.";
        let decision = parse(text);
        assert_eq!(decision.thought, "look it up");
        assert_eq!(decision.action.unwrap().input_text, "Rust {lang}");
    }

    #[test]
    fn embedded_scan_skips_non_decision_objects() {
        let text = r#"config {"retries": 3} then {"answer": "42"}"#;
        let decision = parse(text);
        assert_eq!(decision.answer.as_deref(), Some("42"));
    }

    #[test]
    fn embedded_json_fields_win_over_labels() {
        let text = "Thought: label thought\n{\"thought\": \"json thought\"}\nAnswer: label answer";
        let decision = parse(text);
        assert_eq!(decision.thought, "json thought");
        assert_eq!(decision.answer.as_deref(), Some("label answer"));
    }

    #[test]
    fn labeled_action_block() {
        let text = "Thought: I should read it\nAction: {\"name\": \"read_file\", \"input\": \"notes.txt\"}";
        let decision = parse(text);
        assert_eq!(decision.thought, "I should read it");
        let action = decision.action.unwrap();
        assert_eq!(action.tool_name, "read_file");
        assert_eq!(action.input_text, "notes.txt");
    }

    #[test]
    fn labeled_action_without_object_is_absent() {
        let decision = parse("Thought: hmm\nAction: calculate 2+2");
        assert_eq!(decision.thought, "hmm");
        assert!(decision.action.is_none());
    }

    #[test]
    fn labeled_answer_spans_lines() {
        let decision = parse("Thought: short\nAnswer: line one\nline two");
        assert_eq!(decision.answer.as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn lowercase_label_words_inside_prose_are_not_labels() {
        let decision =
            parse("Thought: the answer: is unclear, I must take action: check\nAnswer: 42");
        assert_eq!(
            decision.thought,
            "the answer: is unclear, I must take action: check"
        );
        assert_eq!(decision.answer.as_deref(), Some("42"));
        assert!(decision.action.is_none());
    }

    #[test]
    fn labels_must_open_a_line() {
        let decision = parse("Thought: compare with Answer: 7 from before\n  Answer: 8");
        assert_eq!(decision.thought, "compare with Answer: 7 from before");
        assert_eq!(decision.answer.as_deref(), Some("8"));
    }

    #[test]
    fn json_without_decision_keys_is_raw_answer() {
        let decision = parse(r#"{"status": "ok"}"#);
        assert_eq!(decision.answer.as_deref(), Some(r#"{"status": "ok"}"#));
    }

    #[test]
    fn string_action_with_action_input() {
        let decision = parse(r#"{"thought":"x","action":"calculate","action_input":"1+1"}"#);
        assert_eq!(decision.action, Some(ToolAction::new("calculate", "1+1")));
    }

    #[test]
    fn structured_input_is_stringified() {
        let decision = parse(r#"{"action":{"name":"t","input":{"a":1}}}"#);
        assert_eq!(decision.action.unwrap().input_text, r#"{"a":1}"#);
    }

    #[test]
    fn action_without_name_is_dropped() {
        let decision = parse(r#"{"thought":"t","action":{"input":"x"}}"#);
        assert!(decision.action.is_none());
        assert_eq!(decision.thought, "t");
    }

    #[test]
    fn unbalanced_braces_do_not_panic() {
        let decision = parse("{{{ \"thought\": ");
        assert!(decision.answer.is_some());
    }

    #[test]
    fn balanced_object_ignores_braces_in_strings() {
        let text = r#"{"a": "}"} tail"#;
        assert_eq!(balanced_object(text, 0), Some(r#"{"a": "}"}"#));
    }
}
