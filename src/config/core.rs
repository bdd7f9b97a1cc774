use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Root configuration for proofcheck.
///
/// Read by the check path as a snapshot, replaced as a whole by the
/// configure path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// The user's native language; passed through to the rule engine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mother_tongue: Option<Language>,

    /// Language used when the document does not declare one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_language: Option<Language>,

    /// Rule ids switched off by the user
    pub disabled_rules: BTreeSet<String>,

    /// Rule ids switched on even though they are off by default
    pub enabled_rules: BTreeSet<String>,

    /// Check execution settings
    pub check: CheckSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckSettings {
    /// Stop waiting for the rule engine after this many seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Configuration {
    /// Whether a rule runs under this configuration. A disabled entry wins
    /// over an enabled one.
    pub fn is_rule_enabled(&self, rule_id: &str, default_on: bool) -> bool {
        if self.disabled_rules.contains(rule_id) {
            false
        } else if self.enabled_rules.contains(rule_id) {
            true
        } else {
            default_on
        }
    }

    pub fn disable_rule(&mut self, rule_id: &str) {
        self.enabled_rules.remove(rule_id);
        self.disabled_rules.insert(rule_id.to_string());
    }

    pub fn enable_rule(&mut self, rule_id: &str) {
        self.disabled_rules.remove(rule_id);
        self.enabled_rules.insert(rule_id.to_string());
    }

    /// Configured wait limit for a check; `None` waits indefinitely.
    pub fn check_timeout(&self) -> Option<Duration> {
        self.check
            .timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
