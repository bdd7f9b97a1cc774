use super::{RuleDescriptor, RuleEngine, RuleMatch, RuleSet};
use crate::config::Configuration;
use crate::language::Language;
use once_cell::sync::Lazy;
use regex::Regex;

static RUN_OF_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+(?:'\w+)?").unwrap());
static SENTENCE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\A\s*|[.!?]\s+)(\p{Ll}[\w'-]*)").unwrap());
static SPACE_BEFORE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+([,;:.!?])(?:\s|\z)").unwrap());
static ARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(an?)\s+(\p{L}[\w'-]*)").unwrap());
static DOUBLED_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;]{2,}|[!?]{2,}").unwrap());

/// Words starting with a vowel letter but a consonant sound.
const A_BEFORE: &[&str] = &[
    "one", "once", "eu", "ewe", "unique", "union", "unit", "univers", "uniform", "unicorn",
    "use", "usu", "uti", "ura", "ure", "uro",
];

/// Words starting with a consonant letter but a vowel sound.
const AN_BEFORE: &[&str] = &["hour", "honest", "honor", "honour", "heir"];

struct PatternRule {
    id: &'static str,
    description: &'static str,
    default_on: bool,
    applies_to: fn(Language) -> bool,
    find: fn(&str, Language) -> Vec<RuleMatch>,
}

const RULES: &[PatternRule] = &[
    PatternRule {
        id: "WHITESPACE_RULE",
        description: "Repeated whitespace between words",
        default_on: true,
        applies_to: any_language,
        find: repeated_whitespace,
    },
    PatternRule {
        id: "WORD_REPEAT_RULE",
        description: "Word repeated twice in a row",
        default_on: true,
        applies_to: any_language,
        find: repeated_words,
    },
    PatternRule {
        id: "UPPERCASE_SENTENCE_START",
        description: "Sentence starts with a lowercase letter",
        default_on: true,
        applies_to: any_language,
        find: lowercase_sentence_starts,
    },
    PatternRule {
        id: "COMMA_WHITESPACE",
        description: "Whitespace before punctuation",
        default_on: true,
        applies_to: any_language,
        find: space_before_punctuation,
    },
    PatternRule {
        id: "EN_A_VS_AN",
        description: "Use of 'a' vs. 'an'",
        default_on: true,
        applies_to: english_only,
        find: article_mismatches,
    },
    PatternRule {
        id: "DOUBLE_PUNCTUATION",
        description: "Two consecutive punctuation marks",
        default_on: false,
        applies_to: any_language,
        find: doubled_punctuation,
    },
];

fn any_language(_: Language) -> bool {
    true
}

fn english_only(language: Language) -> bool {
    language == Language::English
}

/// Small regex-based rule engine with a handful of style and typo rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternRuleEngine;

impl PatternRuleEngine {
    pub fn new() -> Self {
        Self
    }

    fn active_rules<'a>(
        language: Language,
        config: &'a Configuration,
    ) -> impl Iterator<Item = &'static PatternRule> + 'a {
        RULES.iter().filter(move |rule| {
            (rule.applies_to)(language) && config.is_rule_enabled(rule.id, rule.default_on)
        })
    }
}

impl RuleEngine for PatternRuleEngine {
    fn check(
        &self,
        text: &str,
        language: Language,
        config: &Configuration,
    ) -> anyhow::Result<Vec<RuleMatch>> {
        let mut matches: Vec<RuleMatch> = Self::active_rules(language, config)
            .flat_map(|rule| (rule.find)(text, language))
            .collect();
        matches.sort_by(|a, b| {
            (a.start, a.end, &a.rule_id).cmp(&(b.start, b.end, &b.rule_id))
        });

        tracing::debug!(
            language = language.short_name(),
            bytes = text.len(),
            matches = matches.len(),
            "Pattern rules applied"
        );
        Ok(matches)
    }

    fn rules(&self, language: Language, config: &Configuration) -> RuleSet {
        let rules = RULES
            .iter()
            .filter(|rule| (rule.applies_to)(language))
            .map(|rule| RuleDescriptor {
                id: rule.id.to_string(),
                description: rule.description.to_string(),
                default_on: rule.default_on,
                enabled: config.is_rule_enabled(rule.id, rule.default_on),
            })
            .collect();
        RuleSet::new(language, rules)
    }
}

fn repeated_whitespace(text: &str, _: Language) -> Vec<RuleMatch> {
    RUN_OF_SPACES
        .find_iter(text)
        .filter(|m| {
            // Indentation and trailing blanks are layout, not typos.
            let before = text[..m.start()].chars().next_back();
            let after = text[m.end()..].chars().next();
            matches!(before, Some(c) if !c.is_whitespace())
                && matches!(after, Some(c) if !c.is_whitespace())
        })
        .map(|m| {
            RuleMatch::new(
                "WHITESPACE_RULE",
                "Possible typo: you repeated a whitespace",
                m.range(),
            )
            .with_suggestion(" ")
        })
        .collect()
}

fn repeated_words(text: &str, _: Language) -> Vec<RuleMatch> {
    let mut found = Vec::new();
    let mut previous: Option<regex::Match<'_>> = None;

    for word in WORD.find_iter(text) {
        if let Some(prev) = previous {
            let gap = &text[prev.end()..word.start()];
            let is_repeat = !gap.is_empty()
                && gap.chars().all(char::is_whitespace)
                && !word.as_str().chars().all(|c| c.is_ascii_digit())
                && prev.as_str().to_lowercase() == word.as_str().to_lowercase();
            if is_repeat {
                found.push(
                    RuleMatch::new(
                        "WORD_REPEAT_RULE",
                        "Possible typo: you repeated a word",
                        prev.start()..word.end(),
                    )
                    .with_suggestion(prev.as_str()),
                );
                previous = None;
                continue;
            }
        }
        previous = Some(word);
    }
    found
}

fn lowercase_sentence_starts(text: &str, _: Language) -> Vec<RuleMatch> {
    SENTENCE_START
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|word| {
            RuleMatch::new(
                "UPPERCASE_SENTENCE_START",
                "This sentence does not start with an uppercase letter",
                word.range(),
            )
            .with_suggestion(capitalize(word.as_str()))
        })
        .collect()
}

fn space_before_punctuation(text: &str, language: Language) -> Vec<RuleMatch> {
    SPACE_BEFORE_PUNCT
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let punct = caps.get(1)?;
            // French typography puts a space before these.
            if language == Language::French && matches!(punct.as_str(), ";" | ":" | "!" | "?") {
                return None;
            }
            Some(
                RuleMatch::new(
                    "COMMA_WHITESPACE",
                    "Don't put a space before the punctuation mark",
                    whole.start()..punct.end(),
                )
                .with_suggestion(punct.as_str()),
            )
        })
        .collect()
}

fn article_mismatches(text: &str, _: Language) -> Vec<RuleMatch> {
    ARTICLE
        .captures_iter(text)
        .filter_map(|caps| {
            let article = caps.get(1)?;
            let next = caps.get(2)?;
            let wants_an = wants_an(next.as_str())?;
            let is_an = article.as_str().len() == 2;
            if wants_an == is_an {
                return None;
            }

            let replacement = match (wants_an, starts_uppercase(article.as_str())) {
                (true, true) => "An",
                (true, false) => "an",
                (false, true) => "A",
                (false, false) => "a",
            };
            Some(
                RuleMatch::new(
                    "EN_A_VS_AN",
                    format!(
                        "Use \"{replacement}\" instead of \"{}\" before \"{}\"",
                        article.as_str(),
                        next.as_str()
                    ),
                    article.range(),
                )
                .with_suggestion(replacement),
            )
        })
        .collect()
}

/// `Some(true)` if `word` takes "an", `None` when the word's sound can't be
/// guessed from its spelling (single letters, acronyms).
fn wants_an(word: &str) -> Option<bool> {
    if word.chars().count() < 2 || word.chars().all(|c| c.is_uppercase()) {
        return None;
    }
    let lower = word.to_lowercase();
    if AN_BEFORE.iter().any(|prefix| lower.starts_with(prefix)) {
        return Some(true);
    }
    if A_BEFORE.iter().any(|prefix| lower.starts_with(prefix)) {
        return Some(false);
    }
    Some(lower.starts_with(['a', 'e', 'i', 'o', 'u']))
}

fn doubled_punctuation(text: &str, _: Language) -> Vec<RuleMatch> {
    DOUBLED_PUNCT
        .find_iter(text)
        .map(|m| {
            let first = &m.as_str()[..1];
            RuleMatch::new(
                "DOUBLE_PUNCTUATION",
                "Two consecutive punctuation marks",
                m.range(),
            )
            .with_suggestion(first)
        })
        .collect()
}

fn starts_uppercase(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
