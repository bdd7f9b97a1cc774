use crate::config::Configuration;
use crate::document::DocumentRef;
use crate::engine::{PatternRuleEngine, RuleEngine};
use crate::language::Language;
use crate::presenter::MatchReport;

/// A sentence with exactly one issue for the built-in engine.
pub const SAMPLE_TEXT: &str = "This is an test, don't berate yourself.";

/// Whole-document report for [`SAMPLE_TEXT`] as produced by the built-in
/// engine under the default configuration.
pub fn sample_report() -> MatchReport {
    let engine = PatternRuleEngine::new();
    let config = Configuration::default();
    let language = Language::English;
    MatchReport {
        document: DocumentRef::Memory("sample".into()),
        language,
        text: SAMPLE_TEXT.to_string(),
        selection: None,
        matches: engine
            .check(SAMPLE_TEXT, language, &config)
            .unwrap_or_default(),
        rules: engine.rules(language, &config),
        config,
    }
}
