//! Check path end to end: text source, language, background engine call and
//! what reaches the presenter.

mod common;

use common::{check_orchestrator, english, eventually, only_event};
use pretty_assertions::assert_eq;
use proofcheck::document::{DocumentRef, SelectionRange, StaticTextSource};
use proofcheck::engine::{PatternRuleEngine, RuleMatch};
use proofcheck::errors::ErrorCode;
use proofcheck::language::{DeclaredLanguageResolver, Language};
use proofcheck::orchestrator::{CheckStart, CheckStatus};
use proofcheck::testkit::{Presented, RecordingPresenter, ScriptedEngine, SAMPLE_TEXT};
use std::sync::Arc;
use std::time::Duration;

fn present_all(ui: &proofcheck::ui::UiLoop) -> RecordingPresenter {
    let mut presenter = RecordingPresenter::default();
    ui.run_pending(&mut presenter);
    presenter
}

#[test]
fn test_one_trigger_one_engine_call_one_presentation() {
    let engine = ScriptedEngine::new();
    let (orchestrator, ui) = check_orchestrator(Arc::new(engine.clone()));

    let status = orchestrator.run_check(&StaticTextSource::new("doc", "Hello there."), &english());

    assert_eq!(status, CheckStatus::NoIssues);
    assert_eq!(engine.calls(), 1);
    assert_eq!(present_all(&ui).len(), 1);
    assert!(!orchestrator.is_busy());
}

#[test]
fn test_clean_document_reports_document_language() {
    let (orchestrator, ui) = check_orchestrator(Arc::new(PatternRuleEngine::new()));

    let status =
        orchestrator.run_check(&StaticTextSource::new("doc", "This is a test."), &english());

    assert_eq!(status, CheckStatus::NoIssues);
    assert_eq!(
        only_event(&present_all(&ui)),
        &Presented::Info("No errors or warnings found (document language: English)".into())
    );
}

#[test]
fn test_matches_reach_presenter_unmodified() {
    let text = "One two three four five.";
    let matches = vec![
        RuleMatch::new("FIRST", "first issue", 0..3),
        RuleMatch::new("SECOND", "second issue", 4..7).with_suggestion("Two"),
        RuleMatch::new("THIRD", "third issue", 8..13),
    ];
    let engine = ScriptedEngine::new().with_matches(matches.clone());
    let (orchestrator, ui) = check_orchestrator(Arc::new(engine));

    let status = orchestrator.run_check(&StaticTextSource::new("doc", text), &english());

    assert_eq!(status, CheckStatus::Issues(3));
    let presenter = present_all(&ui);
    let Presented::Matches(report) = only_event(&presenter) else {
        panic!("expected a match report, got {:?}", presenter.events());
    };
    assert_eq!(report.matches, matches);
    assert_eq!(report.text, text);
    assert_eq!(report.document, DocumentRef::Memory("doc".into()));
    assert_eq!(report.language, Language::English);
    assert_eq!(report.selection, None);
    assert_eq!(report.rules.len(), 3);
}

#[test]
fn test_selection_is_checked_instead_of_document() {
    let engine = ScriptedEngine::new().with_matches(vec![RuleMatch::new("R", "m", 0..3)]);
    let (orchestrator, ui) = check_orchestrator(Arc::new(engine.clone()));
    let source = StaticTextSource::new("doc", "First part. Second part.")
        .with_selection(SelectionRange::new(12, 24));

    orchestrator.run_check(&source, &english());

    assert_eq!(engine.last_text().as_deref(), Some("Second part."));
    let presenter = present_all(&ui);
    let reports = presenter.reports();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].is_selection());
    assert_eq!(reports[0].selection, Some(SelectionRange::new(12, 24)));
}

#[test]
fn test_builtin_engine_sample_sentence() {
    let (orchestrator, ui) = check_orchestrator(Arc::new(PatternRuleEngine::new()));

    let status = orchestrator.run_check(&StaticTextSource::new("sample", SAMPLE_TEXT), &english());

    assert_eq!(status, CheckStatus::Issues(1));
    let presenter = present_all(&ui);
    let report = presenter.reports()[0];
    assert_eq!(report.matches[0].rule_id, "EN_A_VS_AN");
    assert_eq!(report.matches[0].matched_text(&report.text), "an");
}

#[test]
fn test_empty_and_unsupported_inputs_start_no_task() {
    let engine = ScriptedEngine::new();
    let (orchestrator, ui) = check_orchestrator(Arc::new(engine.clone()));

    let empty = orchestrator.run_check(&StaticTextSource::new("doc", ""), &english());
    let not_text = orchestrator.run_check(
        &StaticTextSource::unsupported("image.png", "not a text document"),
        &english(),
    );
    let unknown_language = orchestrator.run_check(
        &StaticTextSource::new("doc", "Bonjour."),
        &DeclaredLanguageResolver::new(Some("tlh".into())),
    );

    assert_eq!(empty, CheckStatus::NothingToCheck);
    assert_eq!(not_text, CheckStatus::Failed(ErrorCode::UNSUPPORTED_DOCUMENT));
    assert_eq!(
        unknown_language,
        CheckStatus::Failed(ErrorCode::UNSUPPORTED_LANGUAGE)
    );
    assert_eq!(engine.calls(), 0);

    let presenter = present_all(&ui);
    assert_eq!(presenter.infos(), vec!["No text to check."]);
    assert_eq!(
        presenter.errors(),
        vec![
            "Sorry, only text documents are supported",
            "Error: Sorry, the document language 'tlh' is not supported.",
        ]
    );
}

#[test]
fn test_overlapping_trigger_is_rejected() {
    let (engine, gate) = ScriptedEngine::new().gated();
    let (orchestrator, ui) = check_orchestrator(Arc::new(engine.clone()));
    let source = StaticTextSource::new("doc", "Some text.");

    let CheckStart::Pending(first) = orchestrator.start_check(&source, &english()) else {
        panic!("expected the first check to start");
    };
    assert!(gate.wait_entered(Duration::from_secs(5)));
    assert!(orchestrator.is_busy());

    let second = orchestrator.run_check(&source, &english());
    assert_eq!(second, CheckStatus::Busy);
    assert_eq!(
        present_all(&ui).infos(),
        vec!["A check is already running. Please wait until it has finished."]
    );

    gate.release();
    assert_eq!(first.wait(), CheckStatus::NoIssues);
    assert_eq!(engine.calls(), 1);
    assert!(!orchestrator.is_busy());
}

#[test]
fn test_timeout_abandons_wait_but_keeps_slot_until_task_ends() {
    let (engine, gate) = ScriptedEngine::new().gated();
    let (orchestrator, ui) = check_orchestrator(Arc::new(engine));
    let orchestrator = orchestrator.with_timeout(Some(Duration::from_millis(50)));

    let status = orchestrator.run_check(&StaticTextSource::new("doc", "Slow."), &english());

    assert_eq!(status, CheckStatus::Failed(ErrorCode::TIMED_OUT));
    let presenter = present_all(&ui);
    assert_eq!(presenter.errors().len(), 1);
    assert!(presenter.reports().is_empty());

    // the abandoned task still owns the slot
    assert!(orchestrator.is_busy());
    gate.release();
    assert!(eventually(Duration::from_secs(5), || !orchestrator.is_busy()));

    // its late result is discarded
    std::thread::sleep(Duration::from_millis(20));
    assert!(present_all(&ui).is_empty());
}

#[test]
fn test_polled_check_times_out_without_blocking() {
    let (engine, gate) = ScriptedEngine::new().gated();
    let (orchestrator, ui) = check_orchestrator(Arc::new(engine));
    let orchestrator = orchestrator.with_timeout(Some(Duration::from_millis(50)));

    let CheckStart::Pending(mut pending) =
        orchestrator.start_check(&StaticTextSource::new("doc", "Slow."), &english())
    else {
        panic!("expected a running check");
    };
    assert!(gate.wait_entered(Duration::from_secs(5)));

    let mut status = None;
    assert!(eventually(Duration::from_secs(5), || {
        status = pending.poll();
        status.is_some()
    }));
    assert_eq!(status, Some(CheckStatus::Failed(ErrorCode::TIMED_OUT)));
    assert!(pending.elapsed() >= Duration::from_millis(50));
    assert_eq!(pending.poll(), None);

    let presenter = present_all(&ui);
    assert_eq!(presenter.errors().len(), 1);
    assert!(presenter.errors()[0].contains("did not finish within"));

    // the slot stays taken until the abandoned task ends
    assert!(orchestrator.is_busy());
    gate.release();
    assert!(eventually(Duration::from_secs(5), || !orchestrator.is_busy()));
    drop(pending);
    assert!(present_all(&ui).is_empty());
}

#[test]
fn test_engine_failure_is_reported_as_error() {
    let engine = ScriptedEngine::new().failing("dictionary not installed");
    let (orchestrator, ui) = check_orchestrator(Arc::new(engine));

    let status = orchestrator.run_check(&StaticTextSource::new("doc", "Text."), &english());

    assert_eq!(status, CheckStatus::Failed(ErrorCode::ENGINE_FAILURE));
    let presenter = present_all(&ui);
    let errors = presenter.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("An error has occurred:\n"));
    assert!(errors[0].contains("dictionary not installed"));
    assert!(!orchestrator.is_busy());
}

#[test]
fn test_engine_panic_is_contained() {
    let engine = ScriptedEngine::new().panicking("rule table corrupted");
    let (orchestrator, ui) = check_orchestrator(Arc::new(engine));

    let status = orchestrator.run_check(&StaticTextSource::new("doc", "Text."), &english());

    assert_eq!(status, CheckStatus::Failed(ErrorCode::ENGINE_FAILURE));
    let presenter = present_all(&ui);
    assert!(presenter.errors()[0].contains("rule table corrupted"));

    // the orchestrator is usable again
    assert!(!orchestrator.is_busy());
}

#[test]
fn test_engine_receives_configuration_snapshot() {
    let engine = ScriptedEngine::new();
    let (orchestrator, _ui) = check_orchestrator(Arc::new(engine.clone()));
    orchestrator
        .config()
        .update(|config| config.disable_rule("WHITESPACE_RULE"));

    orchestrator.run_check(&StaticTextSource::new("doc", "Text."), &english());

    let seen = engine.last_config().unwrap();
    assert!(seen.disabled_rules.contains("WHITESPACE_RULE"));
}
