mod common;

use common::{check_orchestrator, english};
use proofcheck::document::StaticTextSource;
use proofcheck::engine::PatternRuleEngine;
use proofcheck::orchestrator::CheckStatus;
use proofcheck::testkit::RecordingPresenter;
use proptest::prelude::*;
use std::sync::Arc;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Every trigger ends in exactly one presentation and frees the slot.
    #[test]
    fn prop_every_check_presents_once(text in "[ a-zA-Z.,!?'\\n\\r-]{0,120}") {
        let (orchestrator, ui) = check_orchestrator(Arc::new(PatternRuleEngine::new()));

        let status = orchestrator.run_check(&StaticTextSource::new("doc", text.clone()), &english());

        let mut presenter = RecordingPresenter::default();
        ui.run_pending(&mut presenter);
        prop_assert_eq!(presenter.len(), 1);
        prop_assert!(!orchestrator.is_busy());
        prop_assert!(presenter.errors().is_empty());

        match status {
            CheckStatus::NothingToCheck => prop_assert!(text.trim().is_empty()),
            CheckStatus::NoIssues => prop_assert!(presenter.reports().is_empty()),
            CheckStatus::Issues(count) => {
                let report = presenter.reports()[0];
                prop_assert_eq!(report.matches.len(), count);
                prop_assert!(!report.text.contains('\r'));
                for m in &report.matches {
                    prop_assert!(m.end <= report.text.len());
                    prop_assert!(report.text.is_char_boundary(m.start));
                }
            }
            other => prop_assert!(false, "unexpected status {:?}", other),
        }
    }
}
