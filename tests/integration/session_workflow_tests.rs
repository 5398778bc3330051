/*!
 * End-to-end session tests: controller, payload decoding and scoring together
 */

use std::time::Duration;

use nounph::display::Renderer;
use nounph::errors::SessionError;
use nounph::nouns::GenderMarker;
use nounph::session::{OperationOutcome, OperationStatus, SessionState, EMPTY_INPUT_MESSAGE};

use crate::common::{self, noun, OracleCall, Reply, ScriptedOracle};

fn completion(text: String) -> Reply {
    Reply::Completion(text)
}

/// Analysis with one noun of each gender scores 7.333 and groups its nouns
#[tokio::test]
async fn test_analyze_withOneNounPerGender_shouldScoreAndGroup() {
    let oracle = ScriptedOracle::new();
    oracle.on_analyze(completion(common::family_analysis()));
    let session = common::controller(&oracle);
    session.set_input("The car, the mother and the father.");

    assert_eq!(session.analyze().await, OperationOutcome::Succeeded);

    let state = session.snapshot();
    let score = state.displayed_score().unwrap();
    assert!((score - (7.0 + 0.5 * 2.0 / 3.0)).abs() < 1e-9);

    let groups = state.categorized_nouns();
    assert_eq!(groups.masculine, vec![noun("Vater", "der", "father")]);
    assert_eq!(groups.feminine, vec![noun("Mutter", "die", "mother")]);
    assert_eq!(groups.neuter, vec![noun("Auto", "das", "car")]);

    assert_eq!(oracle.calls(), vec![OracleCall::Analyze { text: "The car, the mother and the father.".to_string() }]);
    assert!(Renderer::plain().analysis_panel(&state).contains("pH: 7.33"));
}

/// Blank input sets a validation error and never reaches the oracle
#[tokio::test]
async fn test_analyze_withEmptyInput_shouldRejectWithoutCallingOracle() {
    let oracle = ScriptedOracle::new();
    let session = common::controller(&oracle);
    session.set_input("");

    assert_eq!(session.analyze().await, OperationOutcome::Rejected);

    let state = session.snapshot();
    assert_eq!(state.analyze_error, Some(SessionError::Validation(EMPTY_INPUT_MESSAGE.to_string())));
    assert_eq!(state.analyze_status, OperationStatus::Idle);
    assert!(state.analysis.is_none());
    assert_eq!(oracle.call_count(), 0);
}

/// Rejected input keeps whatever was shown before
#[tokio::test]
async fn test_analyze_withEmptyInputAfterSuccess_shouldKeepPreviousResult() {
    let oracle = ScriptedOracle::new();
    oracle.on_analyze(completion(common::family_analysis()));
    let session = common::controller(&oracle);
    session.set_input("The car, the mother and the father.");
    session.analyze().await;

    session.set_input("   ");
    assert_eq!(session.analyze().await, OperationOutcome::Rejected);

    let state = session.snapshot();
    assert!(state.analysis.is_some());
    assert_eq!(state.analyze_status, OperationStatus::Succeeded);
    assert!(state.analyze_error.unwrap().is_validation());
    assert_eq!(oracle.call_count(), 1);
}

/// Rewrite before any analysis changes nothing
#[tokio::test]
async fn test_rewrite_beforeAnalyze_shouldBeNoOp() {
    let oracle = ScriptedOracle::new();
    let session = common::controller(&oracle);
    session.set_input("Some text");
    let before = session.snapshot();

    assert_eq!(session.rewrite(10.0).await, OperationOutcome::Skipped);

    assert_eq!(session.snapshot(), before);
    assert_eq!(oracle.call_count(), 0);
}

/// A new analysis wipes the previous rewrite and shows only its own nouns
#[tokio::test]
async fn test_analyze_afterRewrite_shouldClearRewrite() {
    let oracle = ScriptedOracle::new();
    oracle
        .on_analyze(completion(common::family_analysis()))
        .on_analyze(completion(common::analysis_json(
            "Der Hund schläft.",
            &[("Hund", "der", "dog")],
        )));
    oracle.on_rewrite(completion(common::rewrite_json(
        "The car, the mother and the aunt.",
        "Das Auto, die Mutter und die Tante.",
        &[("father", "aunt")],
        &[("Auto", "das", "car"), ("Mutter", "die", "mother"), ("Tante", "die", "aunt")],
    )));
    let session = common::controller(&oracle);

    session.set_input("The car, the mother and the father.");
    assert_eq!(session.analyze().await, OperationOutcome::Succeeded);
    assert_eq!(session.rewrite(12.0).await, OperationOutcome::Succeeded);
    assert!(session.snapshot().is_rewritten());

    session.set_input("The dog sleeps.");
    assert_eq!(session.analyze().await, OperationOutcome::Succeeded);

    let state = session.snapshot();
    assert!(state.rewrite.is_none());
    assert!(state.rewrite_error.is_none());
    assert_eq!(state.rewrite_status, OperationStatus::Idle);
    assert_eq!(state.nouns_for_display().unwrap(), &[noun("Hund", "der", "dog")]);
    assert_eq!(state.displayed_score(), Some(1.0));
}

/// A new analysis also wipes a rewrite error
#[tokio::test]
async fn test_analyze_afterFailedRewrite_shouldClearRewriteError() {
    let oracle = ScriptedOracle::new();
    oracle
        .on_analyze(completion(common::family_analysis()))
        .on_analyze(completion(common::family_analysis()));
    oracle.on_rewrite(Reply::Fail("model overloaded".to_string()));
    let session = common::controller(&oracle);
    session.set_input("The car, the mother and the father.");

    session.analyze().await;
    assert_eq!(session.rewrite(3.0).await, OperationOutcome::Failed);
    assert!(session.snapshot().rewrite_error.is_some());

    session.analyze().await;
    assert!(session.snapshot().rewrite_error.is_none());
}

/// Entries with an unknown marker are dropped and the call still succeeds
#[tokio::test]
async fn test_analyze_withUnknownMarker_shouldDropEntry() {
    let oracle = ScriptedOracle::new();
    oracle.on_analyze(completion(common::analysis_json(
        "Die Leute lesen die Zeitung.",
        &[("Leute", "unknown", "people"), ("Zeitung", "die", "newspaper")],
    )));
    let session = common::controller(&oracle);
    session.set_input("The people read the newspaper.");

    assert_eq!(session.analyze().await, OperationOutcome::Succeeded);

    let state = session.snapshot();
    assert_eq!(state.nouns_for_display().unwrap(), &[noun("Zeitung", "die", "newspaper")]);
    assert_eq!(state.displayed_score(), Some(14.0));
}

/// Fenced completions with surrounding prose still decode
#[tokio::test]
async fn test_analyze_withFencedCompletion_shouldDecode() {
    let oracle = ScriptedOracle::new();
    oracle.on_analyze(completion(format!("Here you go:\n```json\n{}\n```\nAnything else?", common::family_analysis())));
    let session = common::controller(&oracle);
    session.set_input("The car, the mother and the father.");

    assert_eq!(session.analyze().await, OperationOutcome::Succeeded);
    assert_eq!(session.snapshot().categorized_nouns().total(), 3);
}

/// A failed analysis leaves no result behind, even from an earlier success
#[tokio::test]
async fn test_analyze_withFailure_shouldStoreErrorAndDropOldResult() {
    let oracle = ScriptedOracle::new();
    oracle
        .on_analyze(completion(common::family_analysis()))
        .on_analyze(Reply::Fail("quota exhausted".to_string()));
    let session = common::controller(&oracle);
    session.set_input("The car, the mother and the father.");

    session.analyze().await;
    assert_eq!(session.analyze().await, OperationOutcome::Failed);

    let state = session.snapshot();
    assert!(state.analysis.is_none());
    assert!(!state.can_rewrite());
    assert_eq!(state.analyze_status, OperationStatus::Failed);
    assert!(state.analyze_error.unwrap().to_string().contains("quota exhausted"));
}

/// A completion without JSON is an oracle error, not a panic
#[tokio::test]
async fn test_analyze_withProseOnly_shouldFail() {
    let oracle = ScriptedOracle::new();
    oracle.on_analyze(completion("I cannot help with that.".to_string()));
    let session = common::controller(&oracle);
    session.set_input("Hello");

    assert_eq!(session.analyze().await, OperationOutcome::Failed);
    assert!(session.snapshot().analyze_error.unwrap().to_string().contains("no JSON object"));
}

/// The rewrite call carries the current text, the nouns on display and the target
#[tokio::test]
async fn test_rewrite_shouldSendCurrentTextNounsAndTarget() {
    let oracle = ScriptedOracle::new();
    oracle.on_analyze(completion(common::family_analysis()));
    oracle.on_rewrite(completion(common::rewrite_json("x", "y", &[], &[])));
    let session = common::controller(&oracle);
    session.set_input("The car, the mother and the father.");
    session.analyze().await;

    session.set_input("The car, the mother and the father!");
    session.rewrite(11.3).await;

    assert_eq!(oracle.last_rewrite(), Some(OracleCall::Rewrite {
        text: "The car, the mother and the father!".to_string(),
        nouns: vec![noun("Auto", "das", "car"), noun("Mutter", "die", "mother"), noun("Vater", "der", "father")],
        target_score: 11.3,
    }));
    assert_eq!(session.snapshot().last_target_score, Some(11.3));
}

/// A second rewrite builds on the nouns of the first one
#[tokio::test]
async fn test_rewrite_twice_shouldComposeOnRewrittenNouns() {
    let oracle = ScriptedOracle::new();
    oracle.on_analyze(completion(common::family_analysis()));
    oracle
        .on_rewrite(completion(common::rewrite_json(
            "The car, the mother and the aunt.",
            "Das Auto, die Mutter und die Tante.",
            &[("father", "aunt")],
            &[("Auto", "das", "car"), ("Mutter", "die", "mother"), ("Tante", "die", "aunt")],
        )))
        .on_rewrite(completion(common::rewrite_json(
            "The lamp, the mother and the aunt.",
            "Die Lampe, die Mutter und die Tante.",
            &[("car", "lamp")],
            &[("Lampe", "die", "lamp"), ("Mutter", "die", "mother"), ("Tante", "die", "aunt")],
        )));
    let session = common::controller(&oracle);
    session.set_input("The car, the mother and the father.");
    session.analyze().await;

    assert_eq!(session.rewrite(12.0).await, OperationOutcome::Succeeded);
    assert_eq!(session.rewrite(14.0).await, OperationOutcome::Succeeded);

    let Some(OracleCall::Rewrite { nouns, .. }) = oracle.last_rewrite() else {
        panic!("expected a rewrite call");
    };
    assert_eq!(nouns[2], noun("Tante", "die", "aunt"));

    let state = session.snapshot();
    assert_eq!(state.rewrite_score(), Some(14.0));
    // The gauge keeps showing the original analysis
    assert!((state.displayed_score().unwrap() - 7.333).abs() < 1e-3);
    assert!(state.categorized_nouns().group(GenderMarker::Masculine).is_empty());
}

/// A failed rewrite leaves no stale result and keeps the analysis
#[tokio::test]
async fn test_rewrite_withFailure_shouldStoreErrorOnly() {
    let oracle = ScriptedOracle::new();
    oracle.on_analyze(completion(common::family_analysis()));
    oracle
        .on_rewrite(completion(common::rewrite_json("a", "b", &[], &[("Tante", "die", "aunt")])))
        .on_rewrite(Reply::Fail("boom".to_string()));
    let session = common::controller(&oracle);
    session.set_input("The car, the mother and the father.");
    session.analyze().await;
    session.rewrite(12.0).await;

    assert_eq!(session.rewrite(13.0).await, OperationOutcome::Failed);

    let state = session.snapshot();
    assert!(state.rewrite.is_none());
    assert!(state.analysis.is_some());
    assert_eq!(state.rewrite_status, OperationStatus::Failed);
    assert_eq!(state.nouns_for_display().unwrap().len(), 3);
}

/// A rewrite target outside the slider range is passed through untouched
#[tokio::test]
async fn test_rewrite_withOutOfRangeTarget_shouldPassThrough() {
    let oracle = ScriptedOracle::new();
    oracle.on_analyze(completion(common::family_analysis()));
    oracle.on_rewrite(completion(common::rewrite_json("a", "b", &[], &[])));
    let session = common::controller(&oracle);
    session.set_input("text");
    session.analyze().await;

    session.rewrite(42.0).await;

    assert!(matches!(oracle.last_rewrite(), Some(OracleCall::Rewrite { target_score, .. }) if target_score == 42.0));
}

/// A hung oracle settles as a timeout error
#[tokio::test]
async fn test_analyze_withHungOracle_shouldFailWithTimeout() {
    let oracle = ScriptedOracle::new();
    oracle.on_analyze(Reply::Hang);
    let session = common::controller_with_timeout(&oracle, Duration::from_millis(30));
    session.set_input("text");

    assert_eq!(session.analyze().await, OperationOutcome::Failed);

    let state = session.snapshot();
    assert_ne!(state.analyze_status, OperationStatus::Running);
    assert!(state.analyze_error.unwrap().to_string().contains("timed out"));
}

/// A hung rewrite settles as a timeout error and keeps the analysis
#[tokio::test]
async fn test_rewrite_withHungOracle_shouldFailWithTimeout() {
    let oracle = ScriptedOracle::new();
    oracle.on_analyze(completion(common::family_analysis()));
    oracle.on_rewrite(Reply::Hang);
    let session = common::controller_with_timeout(&oracle, Duration::from_millis(30));
    session.set_input("The car, the mother and the father.");
    assert_eq!(session.analyze().await, OperationOutcome::Succeeded);

    assert_eq!(session.rewrite(12.0).await, OperationOutcome::Failed);

    let state = session.snapshot();
    assert_eq!(state.rewrite_status, OperationStatus::Failed);
    assert!(state.rewrite.is_none());
    assert!(state.rewrite_error.unwrap().to_string().contains("timed out"));
    assert_eq!(state.analyze_status, OperationStatus::Succeeded);
    assert_eq!(state.analysis.unwrap().nouns.len(), 3);
}

/// Dropping an in-flight rewrite frees its slot for the next call
#[tokio::test]
async fn test_rewrite_whenCancelled_shouldLeaveSlotIdle() {
    let oracle = ScriptedOracle::new();
    oracle.on_analyze(completion(common::family_analysis()));
    oracle.on_rewrite(Reply::Hang);
    oracle.on_rewrite(completion(common::rewrite_json(
        "The car, the mother and the aunt.",
        "Das Auto, die Mutter und die Tante.",
        &[("father", "aunt")],
        &[("Auto", "das", "car"), ("Mutter", "die", "mother"), ("Tante", "die", "aunt")],
    )));
    let session = common::controller(&oracle);
    session.set_input("The car, the mother and the father.");
    session.analyze().await;

    let cancelled = tokio::time::timeout(Duration::from_millis(20), session.rewrite(12.0)).await;

    assert!(cancelled.is_err());
    let state = session.snapshot();
    assert_eq!(state.rewrite_status, OperationStatus::Idle);
    assert!(state.rewrite_error.is_none());
    assert!(state.analysis.is_some());

    assert_eq!(session.rewrite(12.0).await, OperationOutcome::Succeeded);
    assert_eq!(session.snapshot().categorized_nouns().feminine.len(), 2);
}

/// A second rewrite while one is in flight is refused without an oracle call
#[tokio::test]
async fn test_rewrite_whileRunning_shouldReturnBusy() {
    let oracle = ScriptedOracle::new();
    oracle.on_analyze(completion(common::family_analysis()));
    oracle.on_rewrite(Reply::Delayed(common::rewrite_json("a", "b", &[], &[]), Duration::from_millis(40)));
    let session = common::controller(&oracle);
    session.set_input("text");
    session.analyze().await;

    let (first, second) = tokio::join!(session.rewrite(12.0), session.rewrite(2.0));

    assert_eq!(first, OperationOutcome::Succeeded);
    assert_eq!(second, OperationOutcome::Busy);
    assert_eq!(oracle.call_count(), 2);
    assert_eq!(session.snapshot().last_target_score, Some(12.0));
}

/// Analysis and rewrite run in separate slots; a rewrite outliving its
/// analysis is thrown away
#[tokio::test]
async fn test_rewrite_overlappingNewAnalysis_shouldNotSurviveIt() {
    let oracle = ScriptedOracle::new();
    oracle
        .on_analyze(completion(common::family_analysis()))
        .on_analyze(Reply::Delayed(
            common::analysis_json("Der Hund.", &[("Hund", "der", "dog")]),
            Duration::from_millis(60),
        ));
    oracle.on_rewrite(Reply::Delayed(
        common::rewrite_json("a", "b", &[], &[("Tante", "die", "aunt")]),
        Duration::from_millis(30),
    ));
    let session = common::controller(&oracle);
    session.set_input("The car, the mother and the father.");
    session.analyze().await;

    let rewrite = async { session.rewrite(12.0).await };
    let reanalyze = async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        session.analyze().await
    };
    let (rewrite, analysis) = tokio::join!(rewrite, reanalyze);

    assert_eq!(rewrite, OperationOutcome::Discarded);
    assert_eq!(analysis, OperationOutcome::Succeeded);

    let state: SessionState = session.snapshot();
    assert!(state.rewrite.is_none());
    assert_eq!(state.nouns_for_display().unwrap(), &[noun("Hund", "der", "dog")]);
}
