use super::gate::{Gate, Latch};
use crate::config::Configuration;
use crate::language::Language;
use crate::orchestrator::ConfigurationUi;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Script {
    Save(Configuration),
    Cancel,
    Fail(String),
}

/// Configuration session with a fixed result.
#[derive(Debug, Clone)]
pub struct ScriptedConfigurationUi {
    script: Script,
    latch: Option<Latch>,
    seen: Arc<Mutex<Vec<Language>>>,
}

impl ScriptedConfigurationUi {
    /// The user saves `config`.
    pub fn saving(config: Configuration) -> Self {
        Self::with_script(Script::Save(config))
    }

    /// The user closes the session without saving.
    pub fn cancelling() -> Self {
        Self::with_script(Script::Cancel)
    }

    /// The session itself fails.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_script(Script::Fail(message.into()))
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            latch: None,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Keep every session open until the returned gate releases it.
    pub fn gated(mut self) -> (Self, Gate) {
        let (latch, gate) = Gate::new();
        self.latch = Some(latch);
        (self, gate)
    }

    /// Languages the session was opened for, oldest first.
    pub fn languages_seen(&self) -> Vec<Language> {
        self.seen.lock().clone()
    }
}

impl ConfigurationUi for ScriptedConfigurationUi {
    fn edit(
        &self,
        language: Language,
        _current: &Configuration,
    ) -> anyhow::Result<Option<Configuration>> {
        self.seen.lock().push(language);
        if let Some(latch) = &self.latch {
            latch.hold();
        }
        match &self.script {
            Script::Save(config) => Ok(Some(config.clone())),
            Script::Cancel => Ok(None),
            Script::Fail(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}
