//! System prompt builder.
//!
//! The system prompt is a fixed sequence of bracket-titled sections, followed
//! by any custom sections, joined with blank lines. Caller-supplied extra
//! instructions are appended last on their own line.
//!
//! # Example
//!
//! ```rust
//! use agentic_workflow::prompt::{PromptBuilder, PromptSection};
//!
//! let prompt = PromptBuilder::new("What is 6 * 7?")
//!     .history("none yet")
//!     .tools(["calculate: Evaluates mathematical expressions."])
//!     .section("style", "Answer in one sentence.")
//!     .exclude(PromptSection::Metrics)
//!     .build();
//!
//! assert!(prompt.starts_with("[Introduction & Identity]"));
//! assert!(prompt.contains("Available tools: calculate: Evaluates mathematical expressions.."));
//! assert!(prompt.ends_with("[Style]\nAnswer in one sentence."));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// The built-in sections of the system prompt, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptSection {
    /// Identity and the query being answered
    Introduction,
    /// History and available tools
    Context,
    /// Tone and reasoning style
    Behavior,
    /// Scope and ethics
    Constraints,
    /// Reacting to new observations
    Adaptation,
    /// The JSON reply format
    Format,
    /// Fallback strategies
    ErrorHandling,
    /// Quality targets
    Metrics,
    /// Every section added with [`PromptBuilder::section`]
    Custom,
}

impl PromptSection {
    /// The fixed sections, in the order they are rendered.
    pub const FIXED: [Self; 8] = [
        Self::Introduction,
        Self::Context,
        Self::Behavior,
        Self::Constraints,
        Self::Adaptation,
        Self::Format,
        Self::ErrorHandling,
        Self::Metrics,
    ];

    /// Returns the section's identifier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Introduction => "introduction",
            Self::Context => "context",
            Self::Behavior => "behavior",
            Self::Constraints => "constraints",
            Self::Adaptation => "adaptation",
            Self::Format => "format",
            Self::ErrorHandling => "error_handling",
            Self::Metrics => "metrics",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for PromptSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const BEHAVIOR: &str = "[Behavioral Guidelines]\n\
- Engage in logical, methodical, and analytical reasoning.\n\
- Provide detailed step-by-step analysis of the query.\n\
- Maintain clarity, precision, and a formal yet accessible tone.";

const CONSTRAINTS: &str = "[Functional Constraints & Ethical Guidelines]\n\
- Operate strictly within the defined scope of the query.\n\
- Use available tools only when additional verified information is necessary.\n\
- Base all reasoning on actual observations from prior steps and tool feedback.\n\
- Do not provide unverified details; if uncertain, state that you lack sufficient information.";

const ADAPTATION: &str = "[Dynamic Adaptation & Iterative Refinement]\n\
- Continuously adjust your reasoning based on the evolving context and new tool outputs.\n\
- If a tool yields no results or fails, acknowledge this and consider an alternative approach.\n\
- Iteratively refine your reasoning until you are confident in delivering the final answer.";

const FORMAT: &str = "[Response Format & Output Instructions]\n\
When you need to use a tool, output your next step in the following JSON format:\n\
{ \"thought\": \"Your detailed reasoning about what to do next\", \"action\": { \"name\": \"Tool name\", \
\"reason\": \"Explanation of why you chose this tool\", \"input\": \"Specific input for the tool\" } }\n\
When you have enough information to answer the query, output your final answer in the following JSON format:\n\
{ \"thought\": \"Your final reasoning process\", \"answer\": \"Your comprehensive answer to the query\" }";

const ERROR_HANDLING: &str = "[Error Handling & Fallback Strategies]\n\
- If faced with ambiguous queries or if a tool returns no results, log the issue and request clarification or choose an alternative tool.\n\
- Always ensure that every response is built on verified information.";

const METRICS: &str = "[Performance Metrics]\n\
- Strive for high accuracy, clarity, and timeliness.\n\
- Finalize your answer only when confident that all necessary information has been obtained and verified.";

/// Builds the agent's system prompt.
///
/// Rendering is a pure function of the builder's inputs.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    query: String,
    history: String,
    tools: Vec<String>,
    custom: Vec<(String, String)>,
    excluded: Vec<PromptSection>,
    extra: String,
}

impl PromptBuilder {
    /// Starts a prompt for `query`.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Sets prior reasoning steps and observations.
    #[must_use]
    pub fn history(mut self, history: impl Into<String>) -> Self {
        self.history = history.into();
        self
    }

    /// Sets the tool descriptions, one `name: description` entry per tool.
    #[must_use]
    pub fn tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a custom section rendered after the fixed ones.
    ///
    /// Adding a section under an existing name replaces its content.
    #[must_use]
    pub fn section(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        let content = content.into();
        match self.custom.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = content,
            None => self.custom.push((name, content)),
        }
        self
    }

    /// Leaves a section out of the rendered prompt.
    ///
    /// A custom section whose lowercased name equals an excluded section's
    /// identifier is left out as well.
    #[must_use]
    pub fn exclude(mut self, section: PromptSection) -> Self {
        if !self.excluded.contains(&section) {
            self.excluded.push(section);
        }
        self
    }

    /// Appends caller instructions after all sections.
    #[must_use]
    pub fn extra_instructions(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }

    fn is_excluded(&self, section: PromptSection) -> bool {
        self.excluded.contains(&section)
    }

    fn render_fixed(&self, section: PromptSection) -> String {
        match section {
            PromptSection::Introduction => format!(
                "[Introduction & Identity]\n\
                 You are a ReAct (Reasoning and Acting) agent specialized in answering queries by combining detailed reasoning \
                 and tool usage to provide accurate and comprehensive responses. You are tasked with answering the following query: \
                 {}.",
                self.query
            ),
            PromptSection::Context => format!(
                "[Context & History]\n\
                 Previous reasoning steps and observations: {}.\n\
                 Available tools: {}.",
                self.history,
                self.tools.join(", ")
            ),
            PromptSection::Behavior => BEHAVIOR.to_string(),
            PromptSection::Constraints => CONSTRAINTS.to_string(),
            PromptSection::Adaptation => ADAPTATION.to_string(),
            PromptSection::Format => FORMAT.to_string(),
            PromptSection::ErrorHandling => ERROR_HANDLING.to_string(),
            PromptSection::Metrics => METRICS.to_string(),
            PromptSection::Custom => String::new(),
        }
    }

    /// Renders the prompt.
    #[must_use]
    pub fn build(&self) -> String {
        let mut sections: Vec<String> = PromptSection::FIXED
            .iter()
            .filter(|section| !self.is_excluded(**section))
            .map(|section| self.render_fixed(*section))
            .collect();

        if !self.is_excluded(PromptSection::Custom) {
            sections.extend(
                self.custom
                    .iter()
                    .filter(|(name, _)| {
                        let lowered = name.to_lowercase();
                        !self.excluded.iter().any(|s| s.as_str() == lowered)
                    })
                    .map(|(name, content)| format!("[{}]\n{content}", title_case(name))),
            );
        }

        let mut prompt = sections.join("\n\n");
        if !self.extra.is_empty() {
            prompt.push('\n');
            prompt.push_str(&self.extra);
        }
        prompt
    }
}

/// Uppercases the first letter of every word and lowercases the rest.
/// Any non-alphabetic character starts a new word.
fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_fixed_sections_in_order() {
        let prompt = PromptBuilder::new("q").build();
        let headers = [
            "[Introduction & Identity]",
            "[Context & History]",
            "[Behavioral Guidelines]",
            "[Functional Constraints & Ethical Guidelines]",
            "[Dynamic Adaptation & Iterative Refinement]",
            "[Response Format & Output Instructions]",
            "[Error Handling & Fallback Strategies]",
            "[Performance Metrics]",
        ];
        let positions: Vec<usize> = headers
            .iter()
            .map(|header| prompt.find(header).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(prompt.matches("\n\n[").count(), headers.len() - 1);
    }

    #[test]
    fn query_history_and_tools_are_rendered() {
        let prompt = PromptBuilder::new("What is Rust?")
            .history("searched once")
            .tools(["a: first", "b: second"])
            .build();
        assert!(prompt.contains("answering the following query: What is Rust?."));
        assert!(prompt.contains("Previous reasoning steps and observations: searched once."));
        assert!(prompt.contains("Available tools: a: first, b: second."));
    }

    #[test]
    fn excluded_sections_are_omitted() {
        let prompt = PromptBuilder::new("q")
            .exclude(PromptSection::Introduction)
            .exclude(PromptSection::Metrics)
            .build();
        assert!(prompt.starts_with("[Context & History]"));
        assert!(!prompt.contains("[Performance Metrics]"));
    }

    #[test]
    fn custom_sections_are_title_cased() {
        let prompt = PromptBuilder::new("q")
            .section("output style", "Be brief.")
            .build();
        assert!(prompt.ends_with("\n\n[Output Style]\nBe brief."));
        assert_eq!(title_case("error_handling"), "Error_Handling");
        assert_eq!(title_case("hELLO world"), "Hello World");
    }

    #[test]
    fn custom_section_matching_excluded_name_is_omitted() {
        let prompt = PromptBuilder::new("q")
            .section("Metrics", "custom metrics")
            .section("notes", "kept")
            .exclude(PromptSection::Metrics)
            .build();
        assert!(!prompt.contains("custom metrics"));
        assert!(prompt.contains("[Notes]\nkept"));
    }

    #[test]
    fn excluding_custom_drops_all_custom_sections() {
        let prompt = PromptBuilder::new("q")
            .section("notes", "dropped")
            .exclude(PromptSection::Custom)
            .build();
        assert!(!prompt.contains("dropped"));
    }

    #[test]
    fn section_replaces_same_name() {
        let prompt = PromptBuilder::new("q")
            .section("notes", "first")
            .section("notes", "second")
            .build();
        assert!(!prompt.contains("first"));
        assert_eq!(prompt.matches("[Notes]").count(), 1);
    }

    #[test]
    fn extra_instructions_follow_on_new_line() {
        let prompt = PromptBuilder::new("q")
            .extra_instructions("Reply in French.")
            .build();
        assert!(prompt.ends_with("\nReply in French."));
        assert!(!prompt.ends_with("\n\nReply in French."));
    }

    #[test]
    fn build_is_pure() {
        let builder = PromptBuilder::new("q").tools(["t: d"]);
        assert_eq!(builder.build(), builder.build());
    }
}
