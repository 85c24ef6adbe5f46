//! Turning classified statements into the function the engine runs.
//!
//! A submission runs as the body of a fresh function. Current bindings come
//! in as parameters and every known name goes back out in the returned
//! object, so state crosses submissions only through that function boundary.

use parser::{Statement, StatementKind};

/// Local holding the trailing expression's value.
pub const RESULT_NAME: &str = "__result__";

/// Key of the returned object holding the binding values.
pub const BINDINGS_KEY: &str = "__bindings__";

/// Helpers passed to every submission after the bindings, unless a binding
/// of the same name exists or is declared.
pub const HELPERS: [&str; 2] = ["console", "clear"];

/// The synthesized function of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedBody {
    /// Parameter names, bindings first, then the helpers
    pub params: Vec<String>,
    /// Function body
    pub body: String,
    /// Names exposed in the returned bindings object
    pub names: Vec<String>,
    /// Whether the body computes a trailing-expression result
    pub has_result: bool,
}

impl SynthesizedBody {
    /// Function source, `async` or not, ready to evaluate as a script.
    pub fn source(&self, is_async: bool) -> String {
        format!(
            "({}function ({}) {{\n{}}})",
            if is_async { "async " } else { "" },
            self.params.join(", "),
            self.body
        )
    }

    /// Parameters that are helpers rather than bindings.
    pub fn helper_params(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .map(String::as_str)
            .filter(|param| HELPERS.contains(param) && !self.names.iter().any(|name| name == param))
    }
}

/// Builds the function body for `statements` given the names already bound.
///
/// # Examples
///
/// ```
/// use interpreter::synthesize;
///
/// let statements = parser::analyze("const b = a + 1\nb * 2").unwrap();
/// let body = synthesize(&statements, &["a".to_string(), "b".to_string()]);
///
/// assert_eq!(body.params, vec!["a", "console", "clear"]);
/// assert_eq!(body.names, vec!["a", "b"]);
/// assert!(body.has_result);
/// assert!(body.body.contains("const __result__ = (0, b * 2);"));
/// ```
pub fn synthesize(statements: &[Statement], existing: &[String]) -> SynthesizedBody {
    let declared: Vec<&str> = statements
        .iter()
        .filter(|statement| matches!(statement.kind, StatementKind::Binding | StatementKind::Declaration))
        .flat_map(|statement| statement.names.iter().map(String::as_str))
        .collect();

    let mut params: Vec<String> = existing
        .iter()
        .filter(|name| !declared.contains(&name.as_str()))
        .cloned()
        .collect();
    params.extend(
        HELPERS
            .iter()
            .filter(|helper| !declared.contains(helper) && !existing.iter().any(|name| name == *helper))
            .map(|helper| helper.to_string()),
    );

    let mut names: Vec<String> = existing.to_vec();
    for name in &declared {
        if !names.iter().any(|known| known == name) {
            names.push(name.to_string());
        }
    }

    let last = statements.iter().rposition(|statement| !statement.erased);
    let has_result = last.is_some_and(|index| statements[index].kind == StatementKind::Expression);

    let mut body = String::new();
    for (index, statement) in statements.iter().enumerate() {
        if statement.erased {
            continue;
        }
        if has_result && Some(index) == last {
            // The comma keeps an anonymous function or class from taking the local's name.
            body.push_str(&format!("const {} = (0, {});\n", RESULT_NAME, statement.text));
        } else {
            body.push_str(&statement.text);
            body.push_str(";\n");
        }
    }

    let exported: Vec<String> = names.iter().map(|name| format!("{name}: {name}")).collect();
    body.push_str(&format!("return {{ {}: {{ {} }}", BINDINGS_KEY, exported.join(", ")));
    if has_result {
        body.push_str(&format!(", {}", RESULT_NAME));
    }
    body.push_str(" };\n");

    SynthesizedBody {
        params,
        body,
        names,
        has_result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth(code: &str, existing: &[&str]) -> SynthesizedBody {
        let statements = parser::analyze(code).unwrap();
        let existing: Vec<String> = existing.iter().map(|s| s.to_string()).collect();
        synthesize(&statements, &existing)
    }

    #[test]
    fn test_declarations_keep_their_keyword() {
        let body = synth("let a = 1\nfunction f() { return a }\nclass C {}", &[]);
        assert_eq!(
            body.body,
            "let a = 1;\nfunction f() { return a };\nclass C {};\nreturn { __bindings__: { a: a, f: f, C: C } };\n"
        );
        assert!(!body.has_result);
    }

    #[test]
    fn test_redeclared_names_are_not_parameters() {
        let body = synth("const x = x0 + 1", &["x", "x0"]);
        assert_eq!(body.params, vec!["x0", "console", "clear"]);
        assert_eq!(body.names, vec!["x", "x0"]);
    }

    #[test]
    fn test_helper_shadowing() {
        let body = synth("const console = { log() {} }", &[]);
        assert_eq!(body.params, vec!["clear"]);
        assert_eq!(body.helper_params().collect::<Vec<_>>(), vec!["clear"]);
    }

    #[test]
    fn test_existing_binding_named_like_a_helper() {
        let body = synth("console", &["console", "a"]);
        assert_eq!(body.params, vec!["console", "a", "clear"]);
        assert_eq!(body.helper_params().collect::<Vec<_>>(), vec!["clear"]);
        assert_eq!(body.names, vec!["console", "a"]);
    }

    #[test]
    fn test_type_only_statements_are_erased() {
        let body = synth("const a = 1\ninterface P { x: number }", &[]);
        assert!(!body.body.contains("interface"));
        assert!(!body.has_result);
    }

    #[test]
    fn test_trailing_expression_after_erased_statement() {
        let body = synth("1 + 1\ntype T = string", &[]);
        assert!(body.has_result);
        assert!(body.body.starts_with("const __result__ = (0, 1 + 1);\n"));
        assert!(body.body.ends_with("return { __bindings__: {  }, __result__ };\n"));
    }

    #[test]
    fn test_control_flow_is_not_a_result() {
        let body = synth("for (let i = 0; i < 2; i++) {}", &[]);
        assert!(!body.has_result);
    }

    #[test]
    fn test_source_wraps_body() {
        let body = synth("1", &["a"]);
        let source = body.source(true);
        assert!(source.starts_with("(async function (a, console, clear) {\n"));
        assert!(source.ends_with("})"));
    }
}
