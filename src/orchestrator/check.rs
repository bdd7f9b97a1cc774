use super::{classify, report_failure, CheckOutcome};
use crate::config::{Configuration, SharedConfig};
use crate::document::{DocumentRef, TextSource};
use crate::engine::RuleEngine;
use crate::errors::{CheckError, ErrorCode};
use crate::error_log::ErrorLog;
use crate::language::LanguageResolver;
use crate::observability::{
    record_check_finished, record_check_started, set_document, set_phase, CheckPhase,
};
use crate::presenter::MatchReport;
use crate::progress::ProgressManager;
use crate::task::{AsyncTaskRunner, InFlightSlot, TaskError, TaskHandle};
use crate::ui::UiSender;
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, Span};

const NOTHING_TO_CHECK: &str = "No text to check.";

/// How a check ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Another check was running; this trigger was rejected.
    Busy,
    /// The text was empty; no task was started.
    NothingToCheck,
    /// The engine found nothing.
    NoIssues,
    /// The engine reported this many matches.
    Issues(usize),
    /// The check failed; the error has been presented.
    Failed(ErrorCode),
}

/// Result of [`CheckOrchestrator::start_check`].
pub enum CheckStart {
    /// The background check is running.
    Pending(PendingCheck),
    /// The check ended before any background work was needed.
    Done(CheckStatus),
}

/// Runs grammar checks in the background and posts their results.
pub struct CheckOrchestrator {
    runner: AsyncTaskRunner,
    engine: Arc<dyn RuleEngine>,
    config: SharedConfig,
    ui: UiSender,
    slot: InFlightSlot,
    progress: ProgressManager,
    error_log: ErrorLog,
    timeout: Option<Duration>,
}

impl CheckOrchestrator {
    pub fn new(engine: Arc<dyn RuleEngine>, config: SharedConfig, ui: UiSender) -> Self {
        Self {
            runner: AsyncTaskRunner::new(),
            engine,
            config,
            ui,
            slot: InFlightSlot::new("check"),
            progress: ProgressManager::default(),
            error_log: ErrorLog::disabled(),
            timeout: None,
        }
    }

    pub fn with_runner(mut self, runner: AsyncTaskRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_progress(mut self, progress: ProgressManager) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_error_log(mut self, error_log: ErrorLog) -> Self {
        self.error_log = error_log;
        self
    }

    /// Wait limit that overrides `[check] timeout_secs`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<dyn RuleEngine> {
        &self.engine
    }

    /// Whether a check is in flight.
    pub fn is_busy(&self) -> bool {
        self.slot.is_busy()
    }

    /// Check the current selection (or the whole document) and block until
    /// the result has been posted.
    pub fn run_check(
        &self,
        source: &dyn TextSource,
        resolver: &dyn LanguageResolver,
    ) -> CheckStatus {
        match self.start_check(source, resolver) {
            CheckStart::Pending(pending) => pending.wait(),
            CheckStart::Done(status) => status,
        }
    }

    /// Gather the inputs and start the background check without waiting for
    /// it. The returned [`PendingCheck`] is polled from the host's event
    /// loop.
    pub fn start_check(
        &self,
        source: &dyn TextSource,
        resolver: &dyn LanguageResolver,
    ) -> CheckStart {
        let Some(guard) = self.slot.try_acquire() else {
            info!("Check requested while another check is running; rejected");
            self.ui.info(CheckError::CheckInFlight.user_message());
            return CheckStart::Done(CheckStatus::Busy);
        };

        let document = source.document();
        let _document_ctx = set_document(document.to_string());
        let span = info_span!("check", document = %document);
        let _entered = span.enter();

        let request = {
            let _phase = set_phase(CheckPhase::ReadingText);
            match source.selection_or_document_text() {
                Ok(request) => request,
                Err(err) => return CheckStart::Done(self.fail(err)),
            }
        };
        if request.is_empty() {
            debug!("Nothing to check");
            self.ui.info(NOTHING_TO_CHECK);
            return CheckStart::Done(CheckStatus::NothingToCheck);
        }
        let request = request.into_normalized();

        let language = {
            let _phase = set_phase(CheckPhase::ResolvingLanguage);
            match resolver.resolve_active_language() {
                Ok(language) => language,
                Err(err) => return CheckStart::Done(self.fail(err)),
            }
        };

        let config = self.config.snapshot();
        let timeout = self.timeout.or_else(|| config.check_timeout());
        let scope = if request.is_selection() {
            "selection"
        } else {
            "document"
        };
        info!(
            language = language.short_name(),
            scope,
            bytes = request.text().len(),
            "Starting check"
        );

        let spinner = self
            .progress
            .create_spinner(&format!("Checking {document} ({language})"));
        let engine = Arc::clone(&self.engine);
        let work_config = config.clone();
        let (text, selection) = request.into_parts();
        let work = move || -> anyhow::Result<CheckOutcome> {
            let _guard = guard;
            let _phase = set_phase(CheckPhase::Checking);
            let matches = engine.check(&text, language, &work_config)?;
            let rules = engine.rules(language, &work_config);
            debug!(matches = matches.len(), "Rule engine finished");
            Ok(CheckOutcome {
                matches,
                source_text: text,
                selection,
                language,
                rules,
            })
        };

        let completion = Completion {
            document,
            config,
            ui: self.ui.clone(),
            error_log: self.error_log.clone(),
            spinner,
            span: span.clone(),
        };
        record_check_started();
        match self.runner.start("check", work) {
            Ok(handle) => CheckStart::Pending(PendingCheck {
                handle,
                timeout,
                finished: None,
                completion,
            }),
            Err(err) => CheckStart::Done(completion.finish(Err(err))),
        }
    }

    fn fail(&self, err: CheckError) -> CheckStatus {
        report_failure(&err, &self.ui, &self.error_log);
        CheckStatus::Failed(err.code())
    }
}

/// A check whose background task has been started.
///
/// Dropping it abandons the task: it runs to the end, its result is
/// discarded and the in-flight slot is released when it ends.
#[must_use = "dropping a PendingCheck discards the check result"]
pub struct PendingCheck {
    handle: TaskHandle<CheckOutcome>,
    timeout: Option<Duration>,
    finished: Option<CheckStatus>,
    completion: Completion,
}

impl PendingCheck {
    /// Non-blocking. Posts the result and returns the status once the task
    /// has ended (or the wait limit has passed); `None` before that and on
    /// every call after.
    pub fn poll(&mut self) -> Option<CheckStatus> {
        if self.finished.is_some() {
            return None;
        }
        let result = match self.handle.poll() {
            Some(result) => result,
            None => match self.timeout {
                Some(limit) if self.handle.elapsed() >= limit => Err(TaskError::TimedOut(limit)),
                _ => return None,
            },
        };
        let status = self.completion.finish(result);
        self.finished = Some(status);
        Some(status)
    }

    /// Block until the task ends (or the wait limit, counted from the start
    /// of the task, passes) and post the result.
    pub fn wait(self) -> CheckStatus {
        if let Some(status) = self.finished {
            return status;
        }
        let result = match self.timeout {
            Some(limit) => {
                let remaining = limit.saturating_sub(self.handle.elapsed());
                self.handle.wait_timeout(remaining).map_err(|err| match err {
                    TaskError::TimedOut(_) => TaskError::TimedOut(limit),
                    other => other,
                })
            }
            None => self.handle.wait(),
        };
        self.completion.finish(result)
    }

    pub fn elapsed(&self) -> Duration {
        self.handle.elapsed()
    }
}

/// The part of a check that runs after the background task, back on the
/// interactive thread.
struct Completion {
    document: DocumentRef,
    config: Configuration,
    ui: UiSender,
    error_log: ErrorLog,
    spinner: ProgressBar,
    span: Span,
}

impl Completion {
    fn finish(&self, result: Result<CheckOutcome, TaskError>) -> CheckStatus {
        let _entered = self.span.enter();
        self.spinner.finish_and_clear();
        record_check_finished();
        let _phase = set_phase(CheckPhase::Presenting);

        match result {
            Ok(outcome) => self.present(outcome),
            Err(err) => {
                let err = classify(err);
                report_failure(&err, &self.ui, &self.error_log);
                CheckStatus::Failed(err.code())
            }
        }
    }

    fn present(&self, outcome: CheckOutcome) -> CheckStatus {
        let CheckOutcome {
            matches,
            source_text,
            selection,
            language,
            rules,
        } = outcome;

        if matches.is_empty() {
            let message = match selection {
                Some(_) => {
                    format!("No errors or warnings found in selected text (language: {language})")
                }
                None => format!("No errors or warnings found (document language: {language})"),
            };
            info!("Check finished without issues");
            self.ui.info(message);
            return CheckStatus::NoIssues;
        }

        let count = matches.len();
        info!(matches = count, "Check finished");
        self.ui.matches(MatchReport {
            document: self.document.clone(),
            language,
            text: source_text,
            selection,
            matches,
            rules,
            config: self.config.clone(),
        });
        CheckStatus::Issues(count)
    }
}

impl Drop for Completion {
    // An abandoned check must not leave its spinner ticking.
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{SelectionRange, StaticTextSource};
    use crate::language::{DeclaredLanguageResolver, Language};
    use crate::testkit::ScriptedEngine;
    use crate::ui::{ui_channel, Presentation, UiLoop};

    fn orchestrator(engine: ScriptedEngine) -> (CheckOrchestrator, UiLoop) {
        let (sender, ui) = ui_channel();
        let orchestrator =
            CheckOrchestrator::new(Arc::new(engine), SharedConfig::default(), sender);
        (orchestrator, ui)
    }

    fn english() -> DeclaredLanguageResolver {
        DeclaredLanguageResolver::new(Some("en".into()))
    }

    #[test]
    fn test_empty_text_starts_no_task() {
        let engine = ScriptedEngine::new();
        let (orchestrator, ui) = orchestrator(engine.clone());

        let status = orchestrator.run_check(&StaticTextSource::new("empty", ""), &english());

        assert_eq!(status, CheckStatus::NothingToCheck);
        assert_eq!(engine.calls(), 0);
        assert!(matches!(ui.drain().as_slice(), [Presentation::Info(m)] if m == "No text to check."));
        assert!(!orchestrator.is_busy());
    }

    #[test]
    fn test_unsupported_language_starts_no_task() {
        let engine = ScriptedEngine::new();
        let (orchestrator, ui) = orchestrator(engine.clone());
        let resolver = DeclaredLanguageResolver::new(Some("xx".into()));

        let status = orchestrator.run_check(&StaticTextSource::new("doc", "Text."), &resolver);

        assert_eq!(status, CheckStatus::Failed(ErrorCode::UNSUPPORTED_LANGUAGE));
        assert_eq!(engine.calls(), 0);
        assert!(matches!(
            ui.drain().as_slice(),
            [Presentation::Error(m)] if m == "Error: Sorry, the document language 'xx' is not supported."
        ));
    }

    #[test]
    fn test_selection_wording_when_clean() {
        let (orchestrator, ui) = orchestrator(ScriptedEngine::new());
        let source = StaticTextSource::new("doc", "Fine. Also fine.")
            .with_selection(SelectionRange::new(0, 5));

        let status = orchestrator.run_check(&source, &english());

        assert_eq!(status, CheckStatus::NoIssues);
        assert!(matches!(
            ui.drain().as_slice(),
            [Presentation::Info(m)] if m == "No errors or warnings found in selected text (language: English)"
        ));
    }

    #[test]
    fn test_engine_sees_normalized_text() {
        let engine = ScriptedEngine::new();
        let (orchestrator, _ui) = orchestrator(engine.clone());

        orchestrator.run_check(&StaticTextSource::new("doc", "a\r\nb\rc"), &english());

        assert_eq!(engine.last_text().as_deref(), Some("a\nb\nc"));
        assert_eq!(engine.last_language(), Some(Language::English));
    }

    #[test]
    fn test_pending_check_polls_to_completion_once() {
        let engine = ScriptedEngine::new().with_matches(vec![crate::engine::RuleMatch::new(
            "R", "m", 0..1,
        )]);
        let (orchestrator, ui) = orchestrator(engine);

        let CheckStart::Pending(mut pending) =
            orchestrator.start_check(&StaticTextSource::new("doc", "x"), &english())
        else {
            panic!("expected a running check");
        };
        let status = loop {
            if let Some(status) = pending.poll() {
                break status;
            }
            std::thread::yield_now();
        };

        assert_eq!(status, CheckStatus::Issues(1));
        assert_eq!(pending.poll(), None);
        assert_eq!(pending.wait(), CheckStatus::Issues(1));
        assert_eq!(ui.drain().len(), 1);
    }

    #[test]
    fn test_wait_after_limit_has_passed_returns_promptly() {
        let (engine, gate) = ScriptedEngine::new().gated();
        let (orchestrator, ui) = orchestrator(engine);
        let orchestrator = orchestrator.with_timeout(Some(Duration::from_millis(300)));

        let CheckStart::Pending(pending) =
            orchestrator.start_check(&StaticTextSource::new("doc", "x"), &english())
        else {
            panic!("expected a running check");
        };
        assert!(gate.wait_entered(Duration::from_secs(5)));
        std::thread::sleep(Duration::from_millis(350));

        let waited = std::time::Instant::now();
        let status = pending.wait();

        assert_eq!(status, CheckStatus::Failed(ErrorCode::TIMED_OUT));
        assert!(waited.elapsed() < Duration::from_millis(250));
        assert!(matches!(ui.drain().as_slice(), [Presentation::Error(_)]));
        gate.release();
    }

    #[test]
    fn test_dropped_completion_clears_spinner() {
        let (sender, _ui) = ui_channel();
        let spinner = ProgressBar::hidden();
        let completion = Completion {
            document: DocumentRef::Memory("doc".into()),
            config: Configuration::default(),
            ui: sender,
            error_log: ErrorLog::disabled(),
            spinner: spinner.clone(),
            span: Span::none(),
        };

        assert!(!spinner.is_finished());
        drop(completion);
        assert!(spinner.is_finished());
    }
}
