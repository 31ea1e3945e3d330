//! Built-in calls (§4.2 point 6): `print`, the `to*` coercions,
//! `len`/`length`, `push`/`pop`, and the string helpers. Unknown names
//! fall through to user-defined functions in `Interpreter::call`.

use tulpar_rt::{ops, Value};

pub fn is_builtin(name: &str) -> bool {
    matches!(
        name,
        "print" | "toString" | "toInt" | "toFloat" | "toJson" | "len" | "length" | "push"
            | "pop" | "trim" | "replace" | "split" | "input"
    )
}

pub fn call(name: &str, args: Vec<Value>) -> Value {
    match name {
        "print" => {
            for arg in &args {
                println!("{}", ops::render(arg));
            }
            Value::Void
        },
        "toString" => args.first().map(|v| Value::string(ops::render(v))).unwrap_or(Value::Void),
        "toInt" => Value::int(args.first().map(to_int).unwrap_or(0)),
        "toFloat" => Value::float(args.first().map(to_float).unwrap_or(0.0)),
        "toJson" => args.first().map(|v| Value::string(ops::render_json(v))).unwrap_or(Value::Void),
        "len" | "length" => Value::int(args.first().map(ops::array_len).unwrap_or(0)),
        "push" => {
            let mut args = args.into_iter();
            if let (Some(array), Some(item)) = (args.next(), args.next()) {
                ops::array_push(&array, item);
            }
            Value::Void
        },
        "pop" => args.first().map(ops::array_pop).unwrap_or(Value::Void),
        "trim" => args
            .first()
            .and_then(Value::as_str)
            .map(|s| Value::string(s.trim().to_string()))
            .unwrap_or(Value::string("")),
        "replace" => {
            let mut args = args.into_iter();
            match (args.next(), args.next(), args.next()) {
                (Some(haystack), Some(from), Some(to)) => {
                    let haystack = haystack.as_str().unwrap_or("").to_string();
                    let from = from.as_str().unwrap_or("").to_string();
                    let to = to.as_str().unwrap_or("").to_string();
                    Value::string(haystack.replace(&from, &to))
                },
                _ => Value::string(""),
            }
        },
        "split" => {
            let mut args = args.into_iter();
            match (args.next(), args.next()) {
                (Some(haystack), Some(sep)) => {
                    let haystack = haystack.as_str().unwrap_or("").to_string();
                    let sep = sep.as_str().unwrap_or("").to_string();
                    let result = Value::array();
                    let parts: Vec<&str> =
                        if sep.is_empty() { haystack.split("").filter(|s| !s.is_empty()).collect() } else { haystack.split(sep.as_str()).collect() };
                    for part in parts {
                        ops::array_push(&result, Value::string(part.to_string()));
                    }
                    result
                },
                _ => Value::array(),
            }
        },
        "input" => {
            let mut line = String::new();
            match std::io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => Value::string(""),
                Ok(_) => Value::string(line.trim_end_matches(['\n', '\r']).to_string()),
            }
        },
        _ => {
            ops::runtime_error(&format!("unknown built-in '{}'", name));
            Value::Void
        },
    }
}

fn to_int(value: &Value) -> i64 {
    match value {
        Value::Int(i) => *i,
        Value::Float(f) => *f as i64,
        Value::Bool(b) => *b as i64,
        _ => value.as_str().and_then(|s| s.trim().parse().ok()).unwrap_or(0),
    }
}

fn to_float(value: &Value) -> f64 {
    match value {
        Value::Float(f) => *f,
        Value::Int(i) => *i as f64,
        Value::Bool(b) => if *b { 1.0 } else { 0.0 },
        _ => value.as_str().and_then(|s| s.trim().parse().ok()).unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_string_matches_canonical_render() {
        let result = call("toString", vec![Value::int(42)]);
        assert_eq!(result.as_str(), Some("42"));
    }

    #[test]
    fn push_and_pop_mutate_the_same_array() {
        let array = Value::array();
        call("push", vec![array.clone(), Value::int(1)]);
        call("push", vec![array.clone(), Value::int(2)]);
        assert_eq!(ops::array_len(&array), 2);
        let popped = call("pop", vec![array.clone()]);
        assert!(matches!(popped, Value::Int(2)));
        assert_eq!(ops::array_len(&array), 1);
    }

    #[test]
    fn len_reports_array_and_string_length() {
        let array = Value::array();
        call("push", vec![array.clone(), Value::int(1)]);
        assert!(matches!(call("len", vec![array]), Value::Int(1)));
        assert!(matches!(call("length", vec![Value::string("abc")]), Value::Int(3)));
    }

    #[test]
    fn trim_and_replace_and_split() {
        assert_eq!(call("trim", vec![Value::string("  hi  ")]).as_str(), Some("hi"));
        assert_eq!(
            call("replace", vec![Value::string("aaa"), Value::string("a"), Value::string("b")]).as_str(),
            Some("bbb")
        );
        let parts = call("split", vec![Value::string("a,b,c"), Value::string(",")]);
        assert_eq!(ops::array_len(&parts), 3);
    }

    #[test]
    fn to_json_expands_objects_structurally() {
        let object = Value::object();
        ops::set_element(&object, &Value::string("k"), Value::int(1));
        let json = call("toJson", vec![object]);
        assert_eq!(json.as_str(), Some(r#"{"k":1}"#));
    }

    #[test]
    fn unknown_builtin_reports_an_error_and_yields_void() {
        assert!(call("definitelyNotABuiltin", vec![]).is_void());
    }
}
