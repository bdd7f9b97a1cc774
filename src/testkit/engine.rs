use crate::config::Configuration;
use crate::engine::{RuleDescriptor, RuleEngine, RuleMatch, RuleSet};
use crate::language::Language;
use super::gate::{Gate, Latch};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Behavior {
    Return,
    Fail(String),
    Panic(String),
}

#[derive(Debug, Default)]
struct EngineState {
    calls: usize,
    last_text: Option<String>,
    last_language: Option<Language>,
    last_config: Option<Configuration>,
}

/// Rule engine double with scripted results.
///
/// Configure it with the builder methods first; clones share the call
/// record, so keep one clone for assertions and hand the other to the
/// orchestrator.
#[derive(Debug, Clone)]
pub struct ScriptedEngine {
    matches: Vec<RuleMatch>,
    behavior: Behavior,
    delay: Option<Duration>,
    latch: Option<Latch>,
    state: Arc<Mutex<EngineState>>,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedEngine {
    /// An engine that finds nothing.
    pub fn new() -> Self {
        Self {
            matches: Vec::new(),
            behavior: Behavior::Return,
            delay: None,
            latch: None,
            state: Arc::new(Mutex::new(EngineState::default())),
        }
    }

    /// Report these matches for every check. Matches whose rule is disabled
    /// in the configuration are left out.
    pub fn with_matches(mut self, matches: Vec<RuleMatch>) -> Self {
        self.matches = matches;
        self
    }

    /// Fail every check with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.behavior = Behavior::Fail(message.into());
        self
    }

    /// Panic inside every check with `message`.
    pub fn panicking(mut self, message: impl Into<String>) -> Self {
        self.behavior = Behavior::Panic(message.into());
        self
    }

    /// Take at least `delay` per check.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Hold every check until the returned gate releases it.
    pub fn gated(mut self) -> (Self, Gate) {
        let (latch, gate) = Gate::new();
        self.latch = Some(latch);
        (self, gate)
    }

    pub fn calls(&self) -> usize {
        self.state.lock().calls
    }

    pub fn last_text(&self) -> Option<String> {
        self.state.lock().last_text.clone()
    }

    pub fn last_language(&self) -> Option<Language> {
        self.state.lock().last_language
    }

    pub fn last_config(&self) -> Option<Configuration> {
        self.state.lock().last_config.clone()
    }
}

impl RuleEngine for ScriptedEngine {
    fn check(
        &self,
        text: &str,
        language: Language,
        config: &Configuration,
    ) -> anyhow::Result<Vec<RuleMatch>> {
        {
            let mut state = self.state.lock();
            state.calls += 1;
            state.last_text = Some(text.to_string());
            state.last_language = Some(language);
            state.last_config = Some(config.clone());
        }

        if let Some(latch) = &self.latch {
            latch.hold();
        }
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        match &self.behavior {
            Behavior::Return => Ok(self
                .matches
                .iter()
                .filter(|m| config.is_rule_enabled(&m.rule_id, true))
                .cloned()
                .collect()),
            Behavior::Fail(message) => Err(anyhow::anyhow!("{message}")),
            Behavior::Panic(message) => panic!("{message}"),
        }
    }

    fn rules(&self, language: Language, config: &Configuration) -> RuleSet {
        let mut ids: Vec<&str> = self.matches.iter().map(|m| m.rule_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        let rules = ids
            .into_iter()
            .map(|id| RuleDescriptor {
                id: id.to_string(),
                description: format!("Scripted rule {id}"),
                default_on: true,
                enabled: config.is_rule_enabled(id, true),
            })
            .collect();
        RuleSet::new(language, rules)
    }
}
