//! Rule engine seam.
//!
//! The orchestrators only ever see [`RuleEngine`]; the grammar rules behind
//! it are somebody else's business. [`PatternRuleEngine`] is a small built-in
//! implementation so the binary is usable on its own.

mod builtin;

pub use builtin::PatternRuleEngine;

use crate::config::Configuration;
use crate::language::Language;
use serde::Serialize;
use std::ops::Range;

/// A flagged span of the checked text.
///
/// `start` and `end` are byte offsets into the text the engine was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleMatch {
    pub rule_id: String,
    pub message: String,
    pub start: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl RuleMatch {
    pub fn new(rule_id: impl Into<String>, message: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            rule_id: rule_id.into(),
            message: message.into(),
            start: span.start,
            end: span.end,
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The flagged slice of `text`, or `""` if the span does not fit it.
    pub fn matched_text<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.span()).unwrap_or_default()
    }
}

/// One rule as listed in the results view and by `proofcheck rules`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDescriptor {
    pub id: String,
    pub description: String,
    pub default_on: bool,
    /// Whether the rule runs under the configuration the set was built for
    pub enabled: bool,
}

/// All rules for a language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    pub language: Language,
    pub rules: Vec<RuleDescriptor>,
}

impl RuleSet {
    pub fn new(language: Language, rules: Vec<RuleDescriptor>) -> Self {
        Self { language, rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&RuleDescriptor> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn active(&self) -> impl Iterator<Item = &RuleDescriptor> {
        self.rules.iter().filter(|rule| rule.enabled)
    }
}

/// The grammar-checking library.
///
/// Implementations are shared with background threads and must not assume
/// which thread calls them.
pub trait RuleEngine: Send + Sync {
    /// Check `text`. Matches are returned in text order.
    fn check(
        &self,
        text: &str,
        language: Language,
        config: &Configuration,
    ) -> anyhow::Result<Vec<RuleMatch>>;

    /// Every rule the engine has for `language`, with its enabled state
    /// under `config`.
    fn rules(&self, language: Language, config: &Configuration) -> RuleSet;
}
