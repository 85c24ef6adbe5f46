//! Contract tests for ExecutionEngine
//!
//! Properties every submission must satisfy, whatever its content.

use core_types::Value;
use interpreter::{ExecutionEngine, Sandbox, SandboxOptions};
use proptest::prelude::*;

fn engine() -> ExecutionEngine {
    let sandbox = Sandbox::new(&SandboxOptions::default()).unwrap();
    ExecutionEngine::new(sandbox, "cdn.jsdelivr.net")
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
}

/// Arithmetic expressions over small integers.
fn expression() -> impl Strategy<Value = String> {
    let leaf = (-1000i32..1000).prop_map(|n| format!("({n})"));
    leaf.prop_recursive(3, 16, 2, |inner| {
        (inner.clone(), prop::sample::select(vec!["+", "-", "*"]), inner)
            .prop_map(|(a, op, b)| format!("{a} {op} {b}"))
    })
}

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}".prop_filter("not a keyword", |name| {
        !matches!(
            name.as_str(),
            "do" | "if" | "in" | "for" | "let" | "new" | "try" | "var" | "case" | "else" | "enum"
                | "null" | "this" | "true" | "void" | "with" | "await" | "break" | "catch"
                | "class" | "const" | "false" | "super" | "throw" | "while" | "yield" | "delete"
                | "export" | "import" | "public" | "return" | "static" | "switch" | "typeof"
                | "default" | "extends" | "finally" | "package" | "private" | "continue"
                | "debugger" | "function" | "arguments" | "interface" | "protected"
                | "implements" | "instanceof" | "eval" | "console" | "clear" | "window"
                | "undefined" | "async" | "of" | "type" | "declare" | "as" | "get" | "set"
                | "abstract" | "namespace" | "module" | "readonly" | "keyof" | "infer" | "is"
                | "unique" | "satisfies" | "global" | "require" | "extra"
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn const_binds_the_evaluated_expression(name in identifier(), expr in expression()) {
        let rt = runtime();
        let mut engine = engine();

        let result = rt.block_on(engine.execute(&format!("const {name} = {expr};"))).unwrap();
        prop_assert_eq!(result, None);

        let direct = engine.sandbox().eval(&expr).unwrap();
        let direct = engine.sandbox().describe(&direct);
        prop_assert_eq!(engine.describe_binding(&name), Some(direct));
    }

    #[test]
    fn trailing_expression_equals_direct_evaluation(expr in expression()) {
        let rt = runtime();
        let mut engine = engine();

        let result = rt.block_on(engine.execute(&expr)).unwrap();

        let direct = engine.sandbox().eval(&expr).unwrap();
        let direct = engine.sandbox().describe(&direct);
        prop_assert_eq!(result, Some(direct));
    }

    #[test]
    fn failed_submission_changes_nothing(name in identifier(), n in 0i32..100) {
        let rt = runtime();
        let mut engine = engine();
        rt.block_on(engine.execute(&format!("let {name} = {n}"))).unwrap();

        let failed = rt.block_on(engine.execute(&format!("{name} = {name} + 1;\nconst extra = 1;\nnull.boom")));

        prop_assert!(failed.is_err());
        prop_assert_eq!(engine.bindings().names(), vec![name.clone()]);
        prop_assert_eq!(engine.describe_binding(&name), Some(Value::Number(f64::from(n))));
    }
}

#[test]
fn test_bindings_visible_only_through_earlier_submissions() {
    let rt = runtime();
    let mut engine = engine();

    let error = rt.block_on(engine.execute("later")).unwrap_err();
    assert_eq!(error.error_info().name, "ReferenceError");

    rt.block_on(engine.execute("const later = 'now'")).unwrap();
    assert_eq!(
        rt.block_on(engine.execute("later")).unwrap(),
        Some(Value::String("now".to_string()))
    );
}
