//! Session Integration Tests
//!
//! Observable behaviour of a loaded session, checked through its history.

use core_types::{ErrorInfo, HistoryEntry, MemoryHistory, OutputVariant, EXECUTION_CANCELLED};
use integration_tests::FixtureModules;
use orchestrator::{parse_history, ExecutionOutcome, Session, SessionConfig, SessionState};
use std::sync::Arc;
use std::time::Duration;

fn session() -> (Session, MemoryHistory) {
    let history = MemoryHistory::new();
    let mut config = SessionConfig::default();
    config.cdn.probe = false;
    let mut session = Session::new(config, Arc::new(history.clone()));
    session.load_with_source(FixtureModules::lodash()).unwrap();
    (session, history)
}

fn info(text: &str) -> HistoryEntry {
    HistoryEntry::output(OutputVariant::Info, text)
}

#[tokio::test]
async fn test_const_then_expression() {
    let (mut session, history) = session();

    assert_eq!(session.execute("const a = 10;").await, ExecutionOutcome::Completed(None));
    let outcome = session.execute("a * 2").await;

    let ExecutionOutcome::Completed(Some(value)) = outcome else {
        panic!("expected a value, got {:?}", outcome);
    };
    assert_eq!(value.to_string(), "20");
    assert_eq!(history.entries().last(), Some(&info("20")));
}

#[tokio::test]
async fn test_import_through_session() {
    let (mut session, history) = session();

    session.execute("import _ from 'lodash@4.17.21'").await;
    session.execute("_.chunk(['a', 'b', 'c'], 2).length").await;

    assert_eq!(history.entries().last(), Some(&info("2")));
    assert_eq!(session.binding_names(), vec!["_"]);
}

#[tokio::test]
async fn test_abort_leaves_bindings_alone() {
    let (mut session, history) = session();
    session.execute("let count = 0").await;
    let controller = session.controller();

    let abort = async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        controller.abort();
    };
    let (outcome, ()) = tokio::join!(
        session.execute("count = 5; await new Promise(r => setTimeout(r, 60000))"),
        abort
    );

    assert_eq!(outcome, ExecutionOutcome::Cancelled);
    assert_eq!(session.state(), SessionState::Idle);
    let cancellations = history.entries().iter().filter(|e| e.is_cancellation()).count();
    assert_eq!(cancellations, 1);

    session.execute("count").await;
    assert_eq!(history.entries().last(), Some(&info("0")));
}

#[tokio::test]
async fn test_recovery_from_saved_json() {
    let json = r#"[
        {"type":"input","code":"1+1"},
        {"type":"output","variant":"info","text":"2"},
        {"type":"input","code":":type Foo"},
        {"type":"output","variant":"info","text":"Foo: class Foo"},
        {"type":"input","code":"await stall()"},
        {"type":"output","variant":"info","text":"Execution cancelled"}
    ]"#;
    let saved = parse_history(json).unwrap();
    let (mut session, history) = session();

    let report = session.recover(&saved).await.unwrap();

    assert_eq!(report.reexecuted, 1);
    assert_eq!(report.replayed, 4);
    assert_eq!(
        history.entries(),
        vec![
            HistoryEntry::input("1+1"),
            info("2"),
            HistoryEntry::input(":type Foo"),
            info("Foo: class Foo"),
            HistoryEntry::input("await stall()"),
            info(EXECUTION_CANCELLED),
            HistoryEntry::RecoveredMark,
        ]
    );
}

#[tokio::test]
async fn test_failed_submission_changes_nothing() {
    let (mut session, history) = session();
    session.execute("const kept = 'yes'").await;

    let outcome = session.execute("const other = 1;\nthrow new RangeError('stop')").await;

    assert_eq!(outcome, ExecutionOutcome::Failed(ErrorInfo::new("RangeError", "stop")));
    assert_eq!(session.binding_names(), vec!["kept"]);
    assert_eq!(
        history.entries().last(),
        Some(&HistoryEntry::error(&ErrorInfo::new("RangeError", "stop")))
    );
}
