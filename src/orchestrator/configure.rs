use super::{classify, report_failure};
use crate::config::{ConfigStore, Configuration, SharedConfig};
use crate::engine::RuleEngine;
use crate::errors::{CheckError, ErrorCode};
use crate::error_log::ErrorLog;
use crate::language::{Language, LanguageResolver};
use crate::observability::{set_phase, CheckPhase};
use crate::task::{AsyncTaskRunner, InFlightSlot};
use crate::ui::UiSender;
use std::sync::Arc;
use tracing::{debug, info, info_span};

/// The settings dialog.
///
/// `edit` runs on a background thread and may block for as long as the
/// session lasts. `Ok(None)` means the user closed it without changes.
pub trait ConfigurationUi: Send + Sync {
    fn edit(
        &self,
        language: Language,
        current: &Configuration,
    ) -> anyhow::Result<Option<Configuration>>;
}

/// How a configure session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigureStatus {
    /// A new configuration is in effect (and persisted, if a store is attached).
    Saved,
    /// The session ended without changes.
    Unchanged,
    /// Another session was open; this trigger was rejected.
    Busy,
    /// The session failed; the error has been presented.
    Failed(ErrorCode),
}

/// Runs configuration sessions and applies their result to the shared
/// configuration.
pub struct ConfigureOrchestrator {
    runner: AsyncTaskRunner,
    dialog: Arc<dyn ConfigurationUi>,
    config: SharedConfig,
    store: Option<ConfigStore>,
    ui: UiSender,
    slot: InFlightSlot,
    error_log: ErrorLog,
}

impl ConfigureOrchestrator {
    pub fn new(dialog: Arc<dyn ConfigurationUi>, config: SharedConfig, ui: UiSender) -> Self {
        Self {
            runner: AsyncTaskRunner::new(),
            dialog,
            config,
            store: None,
            ui,
            slot: InFlightSlot::new("configure"),
            error_log: ErrorLog::disabled(),
        }
    }

    /// Persist saved configurations to `store`.
    pub fn with_store(mut self, store: ConfigStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_error_log(mut self, error_log: ErrorLog) -> Self {
        self.error_log = error_log;
        self
    }

    pub fn is_busy(&self) -> bool {
        self.slot.is_busy()
    }

    /// Open the configuration session for the active language.
    ///
    /// A declared language outside the supported set fails the session
    /// before it opens.
    pub fn run_configure_for(&self, resolver: &dyn LanguageResolver) -> ConfigureStatus {
        match resolver.resolve_active_language() {
            Ok(language) => self.run_configure(language),
            Err(err) => self.fail(err),
        }
    }

    /// Open the configuration session for `language` and wait for it to end.
    pub fn run_configure(&self, language: Language) -> ConfigureStatus {
        let Some(guard) = self.slot.try_acquire() else {
            info!("Configure requested while a session is open; rejected");
            self.ui
                .info("The configuration is already being edited. Please finish that session first.");
            return ConfigureStatus::Busy;
        };

        let span = info_span!("configure", language = language.short_name());
        let _entered = span.enter();
        let _phase = set_phase(CheckPhase::Configuring);

        let current = self.config.snapshot();
        let dialog = Arc::clone(&self.dialog);
        let session_config = current.clone();
        let work = move || {
            let _guard = guard;
            dialog.edit(language, &session_config)
        };

        let result = self
            .runner
            .start("configure", work)
            .and_then(|handle| handle.wait());

        match result {
            Ok(Some(updated)) if updated != current => self.apply(updated),
            Ok(_) => {
                debug!("Configuration session ended without changes");
                ConfigureStatus::Unchanged
            }
            Err(err) => self.fail(classify(err)),
        }
    }

    /// Persist first; the shared configuration only changes once the store
    /// has accepted it.
    fn apply(&self, updated: Configuration) -> ConfigureStatus {
        let message = match &self.store {
            Some(store) => match store.save(&updated) {
                Ok(()) => format!("Configuration saved to {}", store.path().display()),
                Err(err) => return self.fail(CheckError::from(err)),
            },
            None => "Configuration updated.".to_string(),
        };

        info!(
            disabled = updated.disabled_rules.len(),
            enabled = updated.enabled_rules.len(),
            "Configuration replaced"
        );
        self.config.replace(updated);
        self.ui.info(message);
        ConfigureStatus::Saved
    }

    fn fail(&self, err: CheckError) -> ConfigureStatus {
        report_failure(&err, &self.ui, &self.error_log);
        ConfigureStatus::Failed(err.code())
    }
}

/// Non-interactive configuration session: a fixed set of edits applied to
/// the current configuration.
///
/// Rule ids are validated against the engine's rules for the session
/// language.
pub struct ConfigEdits {
    engine: Arc<dyn RuleEngine>,
    reset: bool,
    disable: Vec<String>,
    enable: Vec<String>,
    mother_tongue: Option<Language>,
    default_language: Option<Language>,
    timeout_secs: Option<u64>,
}

impl ConfigEdits {
    pub fn new(engine: Arc<dyn RuleEngine>) -> Self {
        Self {
            engine,
            reset: false,
            disable: Vec::new(),
            enable: Vec::new(),
            mother_tongue: None,
            default_language: None,
            timeout_secs: None,
        }
    }

    /// Start from the default configuration instead of the current one.
    pub fn reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    pub fn disable(mut self, rule_ids: impl IntoIterator<Item = String>) -> Self {
        self.disable.extend(rule_ids);
        self
    }

    pub fn enable(mut self, rule_ids: impl IntoIterator<Item = String>) -> Self {
        self.enable.extend(rule_ids);
        self
    }

    pub fn mother_tongue(mut self, language: Option<Language>) -> Self {
        self.mother_tongue = language;
        self
    }

    pub fn default_language(mut self, language: Option<Language>) -> Self {
        self.default_language = language;
        self
    }

    pub fn timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn is_empty(&self) -> bool {
        !self.reset
            && self.disable.is_empty()
            && self.enable.is_empty()
            && self.mother_tongue.is_none()
            && self.default_language.is_none()
            && self.timeout_secs.is_none()
    }
}

impl ConfigurationUi for ConfigEdits {
    fn edit(
        &self,
        language: Language,
        current: &Configuration,
    ) -> anyhow::Result<Option<Configuration>> {
        if self.is_empty() {
            return Ok(None);
        }

        let known = self.engine.rules(language, current);
        if let Some(unknown) = self
            .disable
            .iter()
            .chain(&self.enable)
            .find(|id| known.get(id).is_none())
        {
            return Err(CheckError::config(format!(
                "unknown rule '{unknown}' for {language} (see `proofcheck rules`)"
            ))
            .into());
        }

        let mut updated = if self.reset {
            Configuration::default()
        } else {
            current.clone()
        };
        for id in &self.enable {
            updated.enable_rule(id);
        }
        for id in &self.disable {
            updated.disable_rule(id);
        }
        if let Some(tongue) = self.mother_tongue {
            updated.mother_tongue = Some(tongue);
        }
        if let Some(default) = self.default_language {
            updated.default_language = Some(default);
        }
        if let Some(secs) = self.timeout_secs {
            updated.check.timeout_secs = Some(secs);
        }
        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PatternRuleEngine;
    use crate::language::DeclaredLanguageResolver;
    use crate::testkit::ScriptedConfigurationUi;
    use std::time::Duration;
    use crate::ui::{ui_channel, Presentation};
    use tempfile::TempDir;

    fn edits() -> ConfigEdits {
        ConfigEdits::new(Arc::new(PatternRuleEngine::new()))
    }

    #[test]
    fn test_saved_configuration_replaces_shared_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("config.toml"));
        let shared = SharedConfig::default();
        let (sender, ui) = ui_channel();
        let dialog = edits().disable(["WHITESPACE_RULE".to_string()]);
        let orchestrator = ConfigureOrchestrator::new(Arc::new(dialog), shared.clone(), sender)
            .with_store(store.clone());

        let status = orchestrator.run_configure(Language::English);

        assert_eq!(status, ConfigureStatus::Saved);
        assert!(shared.snapshot().disabled_rules.contains("WHITESPACE_RULE"));
        assert_eq!(store.load().unwrap(), shared.snapshot());
        assert!(matches!(ui.drain().as_slice(), [Presentation::Info(m)] if m.starts_with("Configuration saved to")));
        assert!(!orchestrator.is_busy());
    }

    #[test]
    fn test_cancelled_session_is_unchanged() {
        let shared = SharedConfig::default();
        let (sender, ui) = ui_channel();
        let orchestrator = ConfigureOrchestrator::new(
            Arc::new(ScriptedConfigurationUi::cancelling()),
            shared.clone(),
            sender,
        );

        assert_eq!(orchestrator.run_configure(Language::German), ConfigureStatus::Unchanged);
        assert_eq!(shared.snapshot(), Configuration::default());
        assert!(ui.drain().is_empty());
    }

    #[test]
    fn test_unknown_rule_is_a_config_error() {
        let (sender, ui) = ui_channel();
        let dialog = edits().disable(["EN_A_VS_AN".to_string()]);
        let orchestrator =
            ConfigureOrchestrator::new(Arc::new(dialog), SharedConfig::default(), sender);

        // The article rule only exists for English.
        let status = orchestrator.run_configure(Language::German);

        assert_eq!(status, ConfigureStatus::Failed(ErrorCode::CONFIG));
        assert!(matches!(ui.drain().as_slice(), [Presentation::Error(m)] if m.contains("EN_A_VS_AN")));
    }

    #[test]
    fn test_second_session_while_one_is_open_is_rejected() {
        let (dialog, gate) = ScriptedConfigurationUi::cancelling().gated();
        let (sender, ui) = ui_channel();
        let orchestrator =
            ConfigureOrchestrator::new(Arc::new(dialog.clone()), SharedConfig::default(), sender);

        std::thread::scope(|scope| {
            let first = scope.spawn(|| orchestrator.run_configure(Language::English));
            assert!(gate.wait_entered(Duration::from_secs(5)));
            assert!(orchestrator.is_busy());

            assert_eq!(orchestrator.run_configure(Language::German), ConfigureStatus::Busy);
            assert!(matches!(
                ui.drain().as_slice(),
                [Presentation::Info(m)] if m.starts_with("The configuration is already being edited")
            ));

            gate.release();
            assert_eq!(first.join().unwrap(), ConfigureStatus::Unchanged);
        });

        assert_eq!(dialog.languages_seen(), vec![Language::English]);
        assert!(!orchestrator.is_busy());
    }

    #[test]
    fn test_failed_save_keeps_previous_configuration() {
        let dir = TempDir::new().unwrap();
        // A file where the parent directory should be makes the save fail.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let store = ConfigStore::new(blocker.join("config.toml"));
        let shared = SharedConfig::default();
        let (sender, ui) = ui_channel();
        let dialog = edits().disable(["WHITESPACE_RULE".to_string()]);
        let orchestrator = ConfigureOrchestrator::new(Arc::new(dialog), shared.clone(), sender)
            .with_store(store);

        let status = orchestrator.run_configure(Language::English);

        assert_eq!(status, ConfigureStatus::Failed(ErrorCode::CONFIG));
        assert_eq!(shared.snapshot(), Configuration::default());
        assert!(matches!(
            ui.drain().as_slice(),
            [Presentation::Error(m)] if m.starts_with("Configuration error:")
        ));
    }

    #[test]
    fn test_unsupported_declared_language_fails_session() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("config.toml"));
        let dialog = ScriptedConfigurationUi::saving(Configuration::default());
        let (sender, ui) = ui_channel();
        let orchestrator = ConfigureOrchestrator::new(
            Arc::new(dialog.clone()),
            SharedConfig::default(),
            sender,
        )
        .with_store(store.clone());

        let status = orchestrator.run_configure_for(&DeclaredLanguageResolver::new(Some("xx".into())));

        assert_eq!(status, ConfigureStatus::Failed(ErrorCode::UNSUPPORTED_LANGUAGE));
        assert!(dialog.languages_seen().is_empty());
        assert!(!store.path().exists());
        assert!(matches!(
            ui.drain().as_slice(),
            [Presentation::Error(m)] if m == "Error: Sorry, the document language 'xx' is not supported."
        ));
    }

    #[test]
    fn test_undeclared_language_configures_fallback() {
        let dialog = ScriptedConfigurationUi::cancelling();
        let (sender, _ui) = ui_channel();
        let orchestrator =
            ConfigureOrchestrator::new(Arc::new(dialog.clone()), SharedConfig::default(), sender);
        let resolver = DeclaredLanguageResolver::new(None).with_fallback(Some(Language::Dutch));

        assert_eq!(orchestrator.run_configure_for(&resolver), ConfigureStatus::Unchanged);
        assert_eq!(dialog.languages_seen(), vec![Language::Dutch]);
    }

    #[test]
    fn test_reset_starts_from_defaults() {
        let mut current = Configuration::default();
        current.disable_rule("WHITESPACE_RULE");
        let updated = edits()
            .reset(true)
            .mother_tongue(Some(Language::Swedish))
            .edit(Language::English, &current)
            .unwrap()
            .unwrap();

        assert!(updated.disabled_rules.is_empty());
        assert_eq!(updated.mother_tongue, Some(Language::Swedish));
    }

    #[test]
    fn test_no_edits_means_no_change() {
        let result = edits().edit(Language::English, &Configuration::default()).unwrap();
        assert!(result.is_none());
    }
}
