use crate::cli::{DocumentArgs, EditArgs, OutputArgs, OutputFormat};
use crate::config::{load_config, user_config_path, ConfigStore, SharedConfig};
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::document::{FileTextSource, StdinTextSource, TextSource};
use crate::engine::{PatternRuleEngine, RuleEngine};
use crate::error_log::ErrorLog;
use crate::formatting::{ColorMode, FormattingConfig};
use crate::language::DeclaredLanguageResolver;
use crate::orchestrator::{CheckOrchestrator, ConfigEdits, ConfigureOrchestrator};
use crate::presenter::{JsonPresenter, ResultPresenter, TerminalPresenter};
use crate::progress::{ProgressConfig, ProgressManager};
use crate::ui::{ui_channel, UiLoop};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub quiet: bool,
    pub verbosity: u8,
}

/// What a session is asked to work on.
#[derive(Debug, Clone, Default)]
pub struct SessionRequest {
    pub document: DocumentArgs,
    pub edits: EditArgs,
    /// Seconds; `None` or 0 leaves the configured limit in place
    pub timeout: Option<u64>,
}

/// One host session: a dispatcher wired to the built-in engine, the loaded
/// configuration and the UI channel.
pub struct Session {
    dispatcher: Dispatcher,
    ui: UiLoop,
}

impl Session {
    pub fn open(global: &GlobalOptions, request: SessionRequest) -> Self {
        Self::open_with_engine(global, request, Arc::new(PatternRuleEngine::new()))
    }

    pub fn open_with_engine(
        global: &GlobalOptions,
        request: SessionRequest,
        engine: Arc<dyn RuleEngine>,
    ) -> Self {
        let loaded = load_config(global.config.as_deref());
        let store_path = loaded.path.clone().or_else(user_config_path);
        debug!(config = ?loaded.path, "Configuration loaded");

        let fallback_language = loaded.config.default_language;
        let shared = SharedConfig::new(loaded.config);
        let error_log = ErrorLog::default_location();
        let progress =
            ProgressManager::new(ProgressConfig::from_env(global.quiet, global.verbosity));
        let (ui, ui_loop) = ui_channel();

        let timeout = request
            .timeout
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        let check = CheckOrchestrator::new(Arc::clone(&engine), shared.clone(), ui.clone())
            .with_progress(progress)
            .with_error_log(error_log.clone())
            .with_timeout(timeout);

        let edits = ConfigEdits::new(Arc::clone(&engine))
            .reset(request.edits.reset)
            .disable(request.edits.disable)
            .enable(request.edits.enable)
            .mother_tongue(request.edits.mother_tongue)
            .default_language(request.edits.default_language)
            .timeout_secs(request.edits.set_timeout);
        let mut configure = ConfigureOrchestrator::new(Arc::new(edits), shared, ui.clone())
            .with_error_log(error_log.clone());
        if let Some(path) = store_path {
            configure = configure.with_store(ConfigStore::new(path));
        }

        let document = request.document;
        let source: Box<dyn TextSource> = match document.file() {
            Some(path) => Box::new(FileTextSource::new(path).with_lines(document.lines)),
            None => Box::new(StdinTextSource::new(document.lines)),
        };
        let resolver =
            DeclaredLanguageResolver::new(document.language).with_fallback(fallback_language);

        let dispatcher = Dispatcher::new(check, configure, source, Box::new(resolver), ui)
            .with_error_log(error_log);

        Self {
            dispatcher,
            ui: ui_loop,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Trigger `event` and present everything it posted.
    pub fn run(&self, event: &str, presenter: &mut dyn ResultPresenter) -> SessionOutcome {
        let outcome = self.dispatcher.trigger(event);
        self.ui.run_pending(presenter);
        SessionOutcome {
            outcome,
            errors: self.ui.errors_presented(),
        }
    }
}

/// Result of one triggered event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub outcome: DispatchOutcome,
    /// Error presentations delivered while handling the event
    pub errors: usize,
}

impl SessionOutcome {
    /// Process exit code: 1 if any error was shown, 0 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.errors > 0 {
            1
        } else {
            0
        }
    }
}

/// Presenter for the requested output format.
pub fn presenter_for(output: &OutputArgs) -> Box<dyn ResultPresenter> {
    match output.format {
        OutputFormat::Json => Box::new(JsonPresenter::new()),
        OutputFormat::Terminal => {
            let formatting = match ColorMode::from(output.color) {
                ColorMode::Auto => FormattingConfig::from_env(),
                mode => FormattingConfig::new(mode),
            };
            Box::new(TerminalPresenter::new(formatting))
        }
    }
}
