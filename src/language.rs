//! Supported languages and active-language resolution.

use crate::errors::CheckError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A language the rule engine can check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    English,
    German,
    French,
    Spanish,
    Italian,
    Dutch,
    Polish,
    Swedish,
    Ukrainian,
}

impl Language {
    /// Every supported language, in display order.
    pub const ALL: [Language; 9] = [
        Language::English,
        Language::German,
        Language::French,
        Language::Spanish,
        Language::Italian,
        Language::Dutch,
        Language::Polish,
        Language::Swedish,
        Language::Ukrainian,
    ];

    /// Used when no document context provides a language.
    pub const DEFAULT: Language = Language::English;

    /// ISO 639-1 short name.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::German => "de",
            Self::French => "fr",
            Self::Spanish => "es",
            Self::Italian => "it",
            Self::Dutch => "nl",
            Self::Polish => "pl",
            Self::Swedish => "sv",
            Self::Ukrainian => "uk",
        }
    }

    /// English display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::German => "German",
            Self::French => "French",
            Self::Spanish => "Spanish",
            Self::Italian => "Italian",
            Self::Dutch => "Dutch",
            Self::Polish => "Polish",
            Self::Swedish => "Swedish",
            Self::Ukrainian => "Ukrainian",
        }
    }

    /// Look up a language by tag. Region and encoding suffixes are ignored,
    /// so `en`, `EN`, `en-GB` and `en_US.UTF-8` all resolve to English.
    pub fn from_tag(tag: &str) -> Option<Language> {
        let primary = primary_subtag(tag);
        Self::ALL
            .into_iter()
            .find(|lang| lang.short_name() == primary)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_tag(s).ok_or_else(|| CheckError::unsupported_language(primary_subtag(s)))
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.short_name())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Language::from_tag(&tag)
            .ok_or_else(|| serde::de::Error::custom(format!("unsupported language '{tag}'")))
    }
}

fn primary_subtag(tag: &str) -> String {
    tag.trim()
        .split(['-', '_', '.', '@'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Resolves the language of the document being checked.
pub trait LanguageResolver {
    /// The active language, validated against [`Language::ALL`].
    fn resolve_active_language(&self) -> Result<Language, CheckError>;
}

/// Resolver for a language tag declared by the host (document metadata, CLI
/// flag, environment).
///
/// Without a declared tag there is no document context, and the resolver
/// falls back to the configured default, then to [`Language::DEFAULT`].
#[derive(Debug, Clone, Default)]
pub struct DeclaredLanguageResolver {
    declared: Option<String>,
    fallback: Option<Language>,
}

impl DeclaredLanguageResolver {
    pub fn new(declared: Option<String>) -> Self {
        Self {
            declared: declared.filter(|tag| !tag.trim().is_empty()),
            fallback: None,
        }
    }

    /// Language used when nothing is declared.
    pub fn with_fallback(mut self, fallback: Option<Language>) -> Self {
        self.fallback = fallback;
        self
    }
}

impl LanguageResolver for DeclaredLanguageResolver {
    fn resolve_active_language(&self) -> Result<Language, CheckError> {
        match &self.declared {
            Some(tag) => tag.parse(),
            None => Ok(self.fallback.unwrap_or(Language::DEFAULT)),
        }
    }
}

impl<R: LanguageResolver + ?Sized> LanguageResolver for &R {
    fn resolve_active_language(&self) -> Result<Language, CheckError> {
        (**self).resolve_active_language()
    }
}
