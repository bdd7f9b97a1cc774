use super::session::GlobalOptions;
use crate::cli::OutputFormat;
use crate::config::load_config;
use crate::engine::{PatternRuleEngine, RuleEngine, RuleSet};
use crate::formatting::{FormattingConfig, Styler};
use crate::language::{DeclaredLanguageResolver, LanguageResolver};
use anyhow::Result;
use std::fmt::Write as _;
use unicode_width::UnicodeWidthStr;

/// Print the built-in rules for a language under the loaded configuration.
pub fn handle_rules(
    global: &GlobalOptions,
    language: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let loaded = load_config(global.config.as_deref());
    let language = DeclaredLanguageResolver::new(language)
        .with_fallback(loaded.config.default_language)
        .resolve_active_language()?;
    let rules = PatternRuleEngine::new().rules(language, &loaded.config);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rules)?),
        OutputFormat::Terminal => {
            let styler = Styler::new(FormattingConfig::from_env());
            print!("{}", format_rules(&rules, &styler));
        }
    }
    Ok(())
}

/// One line per rule: id, on/off, description.
pub fn format_rules(rules: &RuleSet, styler: &Styler) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", styler.header(&format!("Rules for {}", rules.language)));
    if rules.is_empty() {
        let _ = writeln!(out, "  (no rules)");
        return out;
    }

    let width = rules
        .rules
        .iter()
        .map(|rule| rule.id.width())
        .max()
        .unwrap_or(0);
    for rule in &rules.rules {
        let state = if rule.enabled {
            styler.success("on ")
        } else {
            styler.dim("off")
        };
        let padding = " ".repeat(width - rule.id.width());
        let _ = writeln!(
            out,
            "  {}{padding}  {state}  {}",
            styler.bold(&rule.id),
            rule.description
        );
    }
    out
}
