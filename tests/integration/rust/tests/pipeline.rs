//! Pipeline Integration Tests
//!
//! Source -> classifier -> import rewriter -> synthesized function -> engine,
//! checked at the engine boundary.

use integration_tests::{FixtureModules, TEST_HOST};
use interpreter::{ExecutionEngine, Sandbox, SandboxOptions};
use module_resolver::ImportRewriter;
use parser::{analyze, StatementKind};
use std::cell::RefCell;
use std::rc::Rc;

fn engine_with(modules: FixtureModules) -> ExecutionEngine {
    let options = SandboxOptions {
        cdn_host: TEST_HOST.to_string(),
        ..SandboxOptions::default()
    };
    let sandbox = Sandbox::with_source(&options, modules).unwrap();
    ExecutionEngine::new(sandbox, TEST_HOST)
}

fn rendered(engine: &mut ExecutionEngine, name: &str) -> String {
    engine.describe_binding(name).unwrap().to_string()
}

#[test]
fn test_versioned_import_becomes_cdn_url() {
    let execution = ImportRewriter::execution(TEST_HOST)
        .rewrite("import _ from 'lodash@4.17.21'")
        .unwrap();
    assert!(execution.contains("https://cdn.jsdelivr.net/npm/lodash@4.17.21/+esm"));

    let analysis = ImportRewriter::analysis()
        .rewrite("import _ from 'lodash@4.17.21'")
        .unwrap();
    assert!(analysis.contains(r#"from "lodash""#));
    assert!(!analysis.contains("lodash@"));
}

#[test]
fn test_rewritten_import_classifies_as_binding() {
    let rewritten = ImportRewriter::execution(TEST_HOST)
        .rewrite("import _ from 'lodash@4.17.21'\n_.VERSION")
        .unwrap();

    let statements = analyze(&rewritten).unwrap();

    assert_eq!(statements[0].kind, StatementKind::Binding);
    assert_eq!(statements[0].names, vec!["_"]);
    assert_eq!(statements[1].kind, StatementKind::Expression);
}

#[tokio::test]
async fn test_imported_package_is_usable() {
    let mut engine = engine_with(FixtureModules::lodash());

    engine.execute("import _ from 'lodash@4.17.21'").await.unwrap();
    let chunks = engine.execute("_.chunk([1, 2, 3, 4, 5], 2)").await.unwrap();

    assert_eq!(chunks.unwrap().to_string(), "[ [ 1, 2 ], [ 3, 4 ], [ 5 ] ]");
    assert!(rendered(&mut engine, "_").contains("VERSION: '4.17.21'"));
}

#[tokio::test]
async fn test_destructuring_with_rest() {
    let mut engine = engine_with(FixtureModules::default());

    let result = engine
        .execute("const { a, ...rest } = { a: 1, b: 2, c: 3 };")
        .await
        .unwrap();

    assert_eq!(result, None);
    assert_eq!(rendered(&mut engine, "a"), "1");
    assert_eq!(rendered(&mut engine, "rest"), "{ b: 2, c: 3 }");
}

#[tokio::test]
async fn test_self_assignment_is_not_observed() {
    let mut engine = engine_with(FixtureModules::default());
    engine.execute("let x = { n: 1 }").await.unwrap();
    let notified = Rc::new(RefCell::new(Vec::new()));
    let sink = notified.clone();
    engine
        .bindings_mut()
        .subscribe(move |name| sink.borrow_mut().push(name.to_string()));

    engine.execute("x = x").await.unwrap();
    assert!(notified.borrow().is_empty());

    engine.execute("x = { n: 1 }").await.unwrap();
    assert_eq!(*notified.borrow(), vec!["x"]);
}

#[tokio::test]
async fn test_typescript_submission() {
    let mut engine = engine_with(FixtureModules::default());

    engine
        .execute("type Point = { x: number };\nconst p: Point = { x: 3 };\nfunction dbl(n) { return n * 2 }")
        .await
        .unwrap();
    let result = engine.execute("dbl(p.x)").await.unwrap();

    assert_eq!(result.unwrap().to_string(), "6");
}
