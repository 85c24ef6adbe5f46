//! Unit tests for the execution engine

use async_runtime::AbortToken;
use core_types::{ErrorInfo, Value};
use interpreter::{ExecutionEngine, ExecutionError, Sandbox, SandboxOptions};
use module_resolver::{FetchError, ModuleSource};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

type Calls = Rc<RefCell<Vec<(String, Vec<Value>)>>>;

#[derive(Default)]
struct StaticModules {
    modules: HashMap<String, String>,
}

impl StaticModules {
    fn with(mut self, url: &str, text: &str) -> Self {
        self.modules.insert(url.to_string(), text.to_string());
        self
    }
}

impl ModuleSource for StaticModules {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.modules.get(url).cloned().ok_or(FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

fn engine_with(modules: StaticModules) -> (ExecutionEngine, Calls) {
    let options = SandboxOptions {
        cdn_host: "cdn.test".to_string(),
        ..SandboxOptions::default()
    };
    let sandbox = Sandbox::with_source(&options, modules).unwrap();
    let calls: Calls = Rc::new(RefCell::new(Vec::new()));
    let sink = calls.clone();
    sandbox.set_listener(Rc::new(move |method: &str, args: &[Value]| {
        sink.borrow_mut().push((method.to_string(), args.to_vec()));
    }));
    (ExecutionEngine::new(sandbox, "cdn.test"), calls)
}

fn engine() -> (ExecutionEngine, Calls) {
    engine_with(StaticModules::default())
}

fn number(n: f64) -> Option<Value> {
    Some(Value::Number(n))
}

// ============================================================================
// Bindings
// ============================================================================

#[tokio::test]
async fn test_const_then_expression() {
    let (mut engine, _) = engine();

    assert_eq!(engine.execute("const a = 10;").await.unwrap(), None);
    assert_eq!(engine.describe_binding("a"), number(10.0));
    assert_eq!(engine.execute("a * 2").await.unwrap(), number(20.0));
}

#[tokio::test]
async fn test_destructuring_with_rest() {
    let (mut engine, _) = engine();

    engine
        .execute("const { a, ...rest } = { a: 1, b: 2, c: 3 };")
        .await
        .unwrap();

    assert_eq!(engine.describe_binding("a"), number(1.0));
    assert_eq!(
        engine.describe_binding("rest").unwrap().to_string(),
        "{ b: 2, c: 3 }"
    );
}

#[tokio::test]
async fn test_functions_and_classes_persist() {
    let (mut engine, _) = engine();

    engine
        .execute("function square(x) { return x * x }\nclass Counter { constructor() { this.n = 0 } inc() { return ++this.n } }")
        .await
        .unwrap();
    assert_eq!(engine.execute("square(7)").await.unwrap(), number(49.0));
    assert_eq!(
        engine.execute("const c = new Counter(); c.inc(); c.inc()").await.unwrap(),
        number(2.0)
    );
    assert_eq!(
        engine.describe_binding("Counter"),
        Some(Value::Function {
            name: "Counter".to_string(),
            is_class: true
        })
    );
}

#[tokio::test]
async fn test_let_can_be_redeclared_across_submissions() {
    let (mut engine, _) = engine();

    engine.execute("let v = 1").await.unwrap();
    engine.execute("let v = v0 => v0").await.unwrap();
    engine.execute("const v = 'three'").await.unwrap();

    assert_eq!(engine.describe_binding("v"), Some(Value::String("three".to_string())));
    assert_eq!(engine.bindings().names(), vec!["v"]);
}

#[tokio::test]
async fn test_reassignment_updates_binding() {
    let (mut engine, _) = engine();

    engine.execute("let count = 1").await.unwrap();
    engine.execute("count += 41").await.unwrap();

    assert_eq!(engine.describe_binding("count"), number(42.0));
}

#[tokio::test]
async fn test_self_assignment_is_not_a_change() {
    let (mut engine, _) = engine();
    engine.execute("let x = { deep: true }").await.unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    engine
        .bindings_mut()
        .subscribe(move |name| sink.borrow_mut().push(name.to_string()));

    engine.execute("x = x").await.unwrap();
    assert!(seen.borrow().is_empty());

    engine.execute("x = { deep: false }").await.unwrap();
    assert_eq!(*seen.borrow(), vec!["x"]);
}

#[tokio::test]
async fn test_window_assignment_becomes_binding() {
    let (mut engine, _) = engine();

    engine.execute("window.answer = 42").await.unwrap();

    assert!(engine.bindings().contains("answer"));
    assert_eq!(engine.execute("answer").await.unwrap(), number(42.0));
}

#[tokio::test]
async fn test_type_annotations_are_erased() {
    let (mut engine, _) = engine();

    let result = engine
        .execute("interface Point { x: number }\nconst p: Point = { x: 3 };\np.x")
        .await
        .unwrap();

    assert_eq!(result, number(3.0));
}

// ============================================================================
// Results
// ============================================================================

#[tokio::test]
async fn test_result_only_for_trailing_expression() {
    let (mut engine, _) = engine();

    assert_eq!(engine.execute("1 + 1").await.unwrap(), number(2.0));
    assert_eq!(engine.execute("1 + 1; const y = 3").await.unwrap(), None);
    assert_eq!(engine.execute("if (true) { 5 }").await.unwrap(), None);
    assert_eq!(engine.execute("undefined").await.unwrap(), Some(Value::Undefined));
}

#[tokio::test]
async fn test_top_level_return_skips_reconciliation() {
    let (mut engine, _) = engine();

    assert_eq!(engine.execute("const early = 1; return early").await.unwrap(), None);
    assert!(!engine.bindings().contains("early"));
}

#[tokio::test]
async fn test_blank_submission() {
    let (mut engine, _) = engine();
    assert_eq!(engine.execute("  // nothing here\n").await.unwrap(), None);
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_runtime_error_leaves_bindings_untouched() {
    let (mut engine, _) = engine();
    engine.execute("const a = 1").await.unwrap();

    let error = engine
        .execute("const b = 2;\nthrow new RangeError('boom')")
        .await
        .unwrap_err();

    assert_eq!(error, ExecutionError::Thrown(ErrorInfo::new("RangeError", "boom")));
    assert_eq!(engine.bindings().names(), vec!["a"]);
}

#[tokio::test]
async fn test_thrown_non_error_value() {
    let (mut engine, _) = engine();

    let error = engine.execute("throw 'oops'").await.unwrap_err();

    assert_eq!(error.error_info().to_string(), "Uncaught: 'oops'");
}

#[tokio::test]
async fn test_reference_error() {
    let (mut engine, _) = engine();

    let error = engine.execute("missing + 1").await.unwrap_err();

    assert_eq!(error.error_info().name, "ReferenceError");
}

#[tokio::test]
async fn test_unterminated_string_is_syntax_error() {
    let (mut engine, _) = engine();

    let error = engine.execute("const s = 'open").await.unwrap_err();

    assert!(matches!(error, ExecutionError::Syntax(_)));
    assert!(error.error_info().to_string().starts_with("SyntaxError: "));
}

#[tokio::test]
async fn test_invalid_syntax_surfaces_async_failure() {
    let (mut engine, _) = engine();

    let error = engine.execute("const = 1").await.unwrap_err();

    assert!(error.is_syntax());
    assert!(!error.error_info().message.contains(" at line "));
    assert!(engine.bindings().is_empty());
}

#[tokio::test]
async fn test_anonymous_trailing_function_stays_anonymous() {
    let (mut engine, _) = engine();

    assert_eq!(
        engine.execute("x => x").await.unwrap(),
        Some(Value::Function {
            name: String::new(),
            is_class: false
        })
    );
    assert_eq!(engine.execute("(class {})").await.unwrap().unwrap().to_string(), "[class (anonymous)]");
}

#[tokio::test]
async fn test_aborted_token_discards_synchronous_run() {
    let (mut engine, _) = engine();
    let token = AbortToken::new();
    token.abort();

    let error = engine.execute_abortable("let y = 1; y", &token).await.unwrap_err();

    assert!(matches!(error, ExecutionError::Cancelled));
    assert!(!engine.bindings().contains("y"));
}

#[tokio::test]
async fn test_completed_run_commits_its_token() {
    let (mut engine, _) = engine();
    let token = AbortToken::new();

    engine.execute_abortable("let y = 1", &token).await.unwrap();

    assert!(!token.abort());
    assert!(engine.bindings().contains("y"));
}

// ============================================================================
// Async submissions
// ============================================================================

#[tokio::test]
async fn test_top_level_await() {
    let (mut engine, _) = engine();

    engine.execute("const v = await Promise.resolve(5)").await.unwrap();

    assert_eq!(engine.describe_binding("v"), number(5.0));
    assert_eq!(engine.execute("await v + 1").await.unwrap(), number(6.0));
}

#[tokio::test]
async fn test_await_timer() {
    let (mut engine, calls) = engine();

    let result = engine
        .execute("await new Promise(resolve => setTimeout(() => { console.log('tick'); resolve('done') }, 10))")
        .await
        .unwrap();

    assert_eq!(result, Some(Value::String("done".to_string())));
    assert_eq!(calls.borrow()[0].1, vec![Value::String("tick".to_string())]);
}

#[tokio::test]
async fn test_async_rejection_leaves_bindings_untouched() {
    let (mut engine, _) = engine();

    let error = engine
        .execute("const z = 1; await Promise.reject(new TypeError('no'))")
        .await
        .unwrap_err();

    assert_eq!(error.error_info().to_string(), "TypeError: no");
    assert!(!engine.bindings().contains("z"));
}

#[tokio::test]
async fn test_dropped_execution_applies_nothing() {
    let (mut engine, _) = engine();

    let pending = engine.execute("const never = await new Promise(() => {})");
    let outcome = tokio::time::timeout(std::time::Duration::from_millis(30), pending).await;

    assert!(outcome.is_err());
    assert!(!engine.bindings().contains("never"));
}

// ============================================================================
// Imports
// ============================================================================

#[tokio::test]
async fn test_import_from_cdn() {
    let modules = StaticModules::default()
        .with("https://cdn.test/npm/answer@1.0.0/+esm", "export default 40; export const two = 2;");
    let (mut engine, _) = engine_with(modules);

    engine
        .execute("import answer, { two } from 'answer@1.0.0'")
        .await
        .unwrap();

    assert_eq!(engine.execute("answer + two").await.unwrap(), number(42.0));
}

#[tokio::test]
async fn test_failed_import_is_runtime_error() {
    let (mut engine, _) = engine();

    let error = engine
        .execute("const before = 1;\nimport x from 'nowhere'")
        .await
        .unwrap_err();

    assert_eq!(error.error_info().name, "TypeError");
    assert!(error.error_info().message.contains("https://cdn.test/npm/nowhere/+esm"));
    assert!(engine.bindings().is_empty());
}

// ============================================================================
// Console and timers
// ============================================================================

#[tokio::test]
async fn test_console_parameter_forwards_calls() {
    let (mut engine, calls) = engine();

    engine.execute("console.log('a', [1, 2]); console.error('b')").await.unwrap();

    let calls = calls.borrow();
    assert_eq!(calls[0].0, "log");
    assert_eq!(calls[0].1[1].to_string(), "[ 1, 2 ]");
    assert_eq!(calls[1].0, "error");
}

#[tokio::test]
async fn test_binding_named_console_is_passed_through() {
    let (mut engine, calls) = engine();

    engine.execute("const console = { log() { return 'mine' } }").await.unwrap();
    let result = engine.execute("console.log('x')").await.unwrap();

    assert_eq!(result, Some(Value::String("mine".to_string())));
    assert!(calls.borrow().is_empty());
}

#[tokio::test]
async fn test_clear_helper() {
    let (mut engine, calls) = engine();

    engine.execute("clear()").await.unwrap();

    assert_eq!(calls.borrow()[0].0, "clear");
}

#[tokio::test]
async fn test_pump_runs_background_timers() {
    let (mut engine, calls) = engine();

    engine
        .execute("setTimeout(() => console.log('later'), 0)")
        .await
        .unwrap();
    assert!(calls.borrow().is_empty());

    assert_eq!(engine.pump(), 1);
    assert_eq!(calls.borrow()[0].1, vec![Value::String("later".to_string())]);
}

#[tokio::test]
async fn test_reset_drops_bindings_and_timers() {
    let (mut engine, _) = engine();
    engine
        .execute("const a = 1; setInterval(() => {}, 1000)")
        .await
        .unwrap();

    engine.reset();

    assert!(engine.bindings().is_empty());
    assert_eq!(engine.sandbox().pending_timers(), 0);
}
