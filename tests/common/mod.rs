// Test utility module for proofcheck integration tests
#![allow(dead_code)]

use proofcheck::config::SharedConfig;
use proofcheck::dispatch::Dispatcher;
use proofcheck::document::TextSource;
use proofcheck::engine::RuleEngine;
use proofcheck::language::DeclaredLanguageResolver;
use proofcheck::orchestrator::{CheckOrchestrator, ConfigurationUi, ConfigureOrchestrator};
use proofcheck::testkit::{Presented, RecordingPresenter};
use proofcheck::ui::{ui_channel, UiLoop};
use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub fn english() -> DeclaredLanguageResolver {
    DeclaredLanguageResolver::new(Some("en-US".to_string()))
}

/// Check orchestrator with a fresh UI channel and default configuration.
pub fn check_orchestrator(engine: Arc<dyn RuleEngine>) -> (CheckOrchestrator, UiLoop) {
    let (sender, ui) = ui_channel();
    let orchestrator = CheckOrchestrator::new(engine, SharedConfig::default(), sender);
    (orchestrator, ui)
}

/// A dispatcher wired the way a host wires it, sharing one configuration
/// between both orchestrators.
pub struct Host {
    pub dispatcher: Dispatcher,
    pub ui: UiLoop,
    pub config: SharedConfig,
}

impl Host {
    pub fn new(
        engine: Arc<dyn RuleEngine>,
        dialog: Arc<dyn ConfigurationUi>,
        source: Box<dyn TextSource>,
    ) -> Self {
        let (sender, ui) = ui_channel();
        let config = SharedConfig::default();
        let check = CheckOrchestrator::new(engine, config.clone(), sender.clone());
        let configure = ConfigureOrchestrator::new(dialog, config.clone(), sender.clone());
        let dispatcher =
            Dispatcher::new(check, configure, source, Box::new(english()), sender);
        Self {
            dispatcher,
            ui,
            config,
        }
    }

    /// Everything posted so far.
    pub fn presented(&self) -> RecordingPresenter {
        let mut presenter = RecordingPresenter::default();
        self.ui.run_pending(&mut presenter);
        presenter
    }
}

pub fn only_event(presenter: &RecordingPresenter) -> &Presented {
    assert_eq!(
        presenter.len(),
        1,
        "expected exactly one presentation, got {:?}",
        presenter.events()
    );
    &presenter.events()[0]
}

/// Poll `condition` until it holds or `limit` passes.
pub fn eventually(limit: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// `proofcheck` command isolated from the user's configuration, data
/// directory and terminal.
pub fn proofcheck(home: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_proofcheck"));
    command
        .current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("XDG_DATA_HOME", home.join(".local/share"))
        .env("PROOFCHECK_QUIET", "1")
        .env("NO_COLOR", "1")
        .env_remove("PROOFCHECK_LANGUAGE")
        .env_remove("PROOFCHECK_LOG")
        .env_remove("CLICOLOR_FORCE");
    command
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
