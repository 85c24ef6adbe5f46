//! Unit tests for Value snapshots

use core_types::{ErrorInfo, Value};

fn s(text: &str) -> Value {
    Value::String(text.to_string())
}

#[cfg(test)]
mod value_is_truthy_tests {
    use super::*;

    #[test]
    fn test_falsy_primitives() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(-0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!s("").is_truthy());
        assert!(!Value::BigInt("0".to_string()).is_truthy());
    }

    #[test]
    fn test_objects_are_truthy() {
        assert!(Value::Object {
            class_name: None,
            entries: vec![],
            more: 0
        }
        .is_truthy());
        assert!(Value::Circular.is_truthy());
        assert!(Value::Error(ErrorInfo::new("Error", "")).is_truthy());
    }
}

#[cfg(test)]
mod value_type_of_tests {
    use super::*;

    #[test]
    fn test_null_type_of() {
        // typeof null === "object"
        assert_eq!(Value::Null.type_of(), "object");
    }

    #[test]
    fn test_primitive_type_of() {
        assert_eq!(Value::Undefined.type_of(), "undefined");
        assert_eq!(Value::Number(1.0).type_of(), "number");
        assert_eq!(Value::BigInt("1".to_string()).type_of(), "bigint");
        assert_eq!(s("x").type_of(), "string");
        assert_eq!(Value::Symbol("k".to_string()).type_of(), "symbol");
    }

    #[test]
    fn test_function_type_of() {
        let class = Value::Function {
            name: "Foo".to_string(),
            is_class: true,
        };
        assert_eq!(class.type_of(), "function");
        assert!(!class.is_primitive());
    }
}

#[cfg(test)]
mod value_render_tests {
    use super::*;

    #[test]
    fn test_top_level_strings() {
        assert_eq!(s("hello").to_string(), "'hello'");
        assert_eq!(s("hello").render_plain(), "hello");
    }

    #[test]
    fn test_nested_strings_stay_quoted_in_plain_render() {
        let array = Value::Array {
            items: vec![s("a")],
            more: 0,
        };
        assert_eq!(array.render_plain(), "[ 'a' ]");
    }

    #[test]
    fn test_object_with_rest() {
        // const { a, ...rest } = { a: 1, b: 2, c: 3 }
        let rest = Value::Object {
            class_name: None,
            entries: vec![
                ("b".to_string(), Value::Number(2.0)),
                ("c".to_string(), Value::Number(3.0)),
            ],
            more: 0,
        };
        assert_eq!(rest.to_string(), "{ b: 2, c: 3 }");
    }

    #[test]
    fn test_nested_containers() {
        let value = Value::Object {
            class_name: None,
            entries: vec![(
                "list".to_string(),
                Value::Array {
                    items: vec![Value::Number(1.0), Value::Truncated("Object".to_string())],
                    more: 0,
                },
            )],
            more: 1,
        };
        assert_eq!(value.to_string(), "{ list: [ 1, [Object] ], ... 1 more item }");
    }

    #[test]
    fn test_special_objects() {
        assert_eq!(Value::Circular.to_string(), "[Circular]");
        assert_eq!(Value::Date("2024-01-01T00:00:00.000Z".to_string()).to_string(), "2024-01-01T00:00:00.000Z");
        assert_eq!(Value::RegExp("/a+/g".to_string()).to_string(), "/a+/g");
        assert_eq!(Value::Symbol("id".to_string()).to_string(), "Symbol(id)");
        assert_eq!(Value::BigInt("12".to_string()).to_string(), "12n");
        assert_eq!(
            Value::Error(ErrorInfo::new("TypeError", "bad")).to_string(),
            "TypeError: bad"
        );
    }

    #[test]
    fn test_number_rendering() {
        assert_eq!(Value::Number(20.0).to_string(), "20");
        assert_eq!(Value::Number(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(Value::Number(-0.0).to_string(), "-0");
        assert_eq!(Value::Number(2e-7).to_string(), "2e-7");
    }

    #[test]
    fn test_partial_eq() {
        assert_eq!(Value::Undefined, Value::Undefined);
        assert_eq!(Value::Number(42.0), Value::Number(42.0));
        assert_ne!(s("a"), s("b"));
    }
}
