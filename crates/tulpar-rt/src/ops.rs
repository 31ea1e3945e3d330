//! Runtime operations shared by the interpreter and the AOT path:
//! `binary_op`, the element protocol, printing, and diagnostics for
//! the handful of operations that can fail without aborting the
//! program (§4.4).
//!
//! Dispatch is on `(tag(a), tag(b))`, mirroring `original_source`'s
//! `vm_binary_op`'s `TYPE_PAIR` switch byte-for-byte: int/int stays
//! int, float mixes promote to float, anything unlisted falls back to
//! `int 0` rather than aborting.

use crate::value::{ArrayObj, Obj, ObjectObj, Value};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    LtEq,
    GtEq,
    EqEq,
    NotEq,
}

/// Reports a runtime error without aborting execution — printed to
/// stderr, mirroring `original_source`'s `printf("Runtime Error: ...")`
/// fallback path.
pub fn runtime_error(message: &str) {
    eprintln!("Runtime Error: {}", message);
}

pub fn binary_op(op: Op, a: &Value, b: &Value) -> Value {
    use Op::*;
    match (op, a, b) {
        (Add, Value::Int(x), Value::Int(y)) => Value::Int(x.wrapping_add(*y)),
        (Add, Value::Float(x), Value::Float(y)) => Value::Float(x + y),
        (Add, Value::Int(x), Value::Float(y)) => Value::Float(*x as f64 + y),
        (Add, Value::Float(x), Value::Int(y)) => Value::Float(x + *y as f64),
        (Add, _, _) if a.is_string() && b.is_string() => {
            let mut concatenated = String::with_capacity(a.as_str().unwrap().len() + b.as_str().unwrap().len());
            concatenated.push_str(a.as_str().unwrap());
            concatenated.push_str(b.as_str().unwrap());
            Value::string(concatenated)
        },

        (Sub, Value::Int(x), Value::Int(y)) => Value::Int(x.wrapping_sub(*y)),
        (Sub, Value::Float(x), Value::Float(y)) => Value::Float(x - y),
        (Sub, Value::Int(x), Value::Float(y)) => Value::Float(*x as f64 - y),
        (Sub, Value::Float(x), Value::Int(y)) => Value::Float(x - *y as f64),

        (Mul, Value::Int(x), Value::Int(y)) => Value::Int(x.wrapping_mul(*y)),
        (Mul, Value::Float(x), Value::Float(y)) => Value::Float(x * y),
        (Mul, Value::Int(x), Value::Float(y)) => Value::Float(*x as f64 * y),
        (Mul, Value::Float(x), Value::Int(y)) => Value::Float(x * *y as f64),

        (Div, Value::Int(x), Value::Int(y)) => {
            if *y == 0 {
                runtime_error("division by zero");
                Value::Int(0)
            } else {
                Value::Int(x.wrapping_div(*y))
            }
        },
        (Div, Value::Float(x), Value::Float(y)) => Value::Float(x / y),
        (Div, Value::Int(x), Value::Float(y)) => Value::Float(*x as f64 / y),
        (Div, Value::Float(x), Value::Int(y)) => Value::Float(x / *y as f64),

        (Lt, Value::Int(x), Value::Int(y)) => Value::Bool(x < y),
        (Lt, Value::Float(x), Value::Float(y)) => Value::Bool(x < y),
        (Lt, Value::Int(x), Value::Float(y)) => Value::Bool((*x as f64) < *y),
        (Lt, Value::Float(x), Value::Int(y)) => Value::Bool(*x < *y as f64),

        (Gt, Value::Int(x), Value::Int(y)) => Value::Bool(x > y),
        (Gt, Value::Float(x), Value::Float(y)) => Value::Bool(x > y),
        (Gt, Value::Int(x), Value::Float(y)) => Value::Bool(*x as f64 > *y),
        (Gt, Value::Float(x), Value::Int(y)) => Value::Bool(*x > *y as f64),

        (LtEq, Value::Int(x), Value::Int(y)) => Value::Bool(x <= y),
        (LtEq, Value::Float(x), Value::Float(y)) => Value::Bool(x <= y),
        (LtEq, Value::Int(x), Value::Float(y)) => Value::Bool(*x as f64 <= *y),
        (LtEq, Value::Float(x), Value::Int(y)) => Value::Bool(*x <= *y as f64),

        (GtEq, Value::Int(x), Value::Int(y)) => Value::Bool(x >= y),
        (GtEq, Value::Float(x), Value::Float(y)) => Value::Bool(x >= y),
        (GtEq, Value::Int(x), Value::Float(y)) => Value::Bool(*x as f64 >= *y),
        (GtEq, Value::Float(x), Value::Int(y)) => Value::Bool(*x >= *y as f64),

        (EqEq, Value::Int(x), Value::Int(y)) => Value::Bool(x == y),
        (EqEq, Value::Float(x), Value::Float(y)) => Value::Bool(x == y),
        (EqEq, Value::Bool(x), Value::Bool(y)) => Value::Bool(x == y),
        (EqEq, Value::Int(x), Value::Float(y)) => Value::Bool(*x as f64 == *y),
        (EqEq, Value::Float(x), Value::Int(y)) => Value::Bool(*x == *y as f64),
        (EqEq, _, _) if a.is_string() && b.is_string() => {
            Value::Bool(a.as_str() == b.as_str())
        },

        (NotEq, _, _) => {
            let eq = binary_op(EqEq, a, b);
            match eq {
                Value::Bool(result) => Value::Bool(!result),
                _ => Value::Bool(true),
            }
        },

        // Anything unlisted: the source's observed fallback.
        _ => Value::Int(0),
    }
}

/// `get_element(target, index) → Value`, §4.4.2.
pub fn get_element(target: &Value, index: &Value) -> Value {
    match (target, index) {
        (Value::Obj(obj), Value::Int(i)) if matches!(**obj, Obj::Array(_)) => {
            let Obj::Array(array) = &**obj else { unreachable!() };
            let array = array.borrow();
            match usize::try_from(*i).ok().and_then(|i| array.items.get(i)) {
                Some(value) => value.clone(),
                None => {
                    runtime_error("array index out of bounds");
                    Value::Int(0)
                },
            }
        },
        (Value::Obj(obj), index) if matches!(**obj, Obj::Object(_)) && index.is_string() => {
            let Obj::Object(object) = &**obj else { unreachable!() };
            let object = object.borrow();
            let key = index.as_str().unwrap();
            match find_key(&object, key) {
                Some(i) => object.values[i].clone(),
                None => Value::Int(0),
            }
        },
        (Value::Obj(obj), Value::Int(i)) if matches!(**obj, Obj::Str(_)) => {
            let Obj::Str(s) = &**obj else { unreachable!() };
            match usize::try_from(*i).ok().and_then(|i| s.chars.as_bytes().get(i)) {
                Some(&byte) => Value::string((byte as char).to_string()),
                None => Value::string(""),
            }
        },
        _ => {
            runtime_error("value is not indexable with the given index type");
            Value::Int(0)
        },
    }
}

/// `set_element(target, index, value)`, §4.4.2.
pub fn set_element(target: &Value, index: &Value, value: Value) {
    match (target, index) {
        (Value::Obj(obj), Value::Int(i)) if matches!(**obj, Obj::Array(_)) => {
            let Obj::Array(array) = &**obj else { unreachable!() };
            let mut array = array.borrow_mut();
            match usize::try_from(*i).ok().filter(|&i| i < array.items.len()) {
                Some(i) => array.items[i] = value,
                None => runtime_error("array index out of bounds"),
            }
        },
        (Value::Obj(obj), index) if matches!(**obj, Obj::Object(_)) && index.is_string() => {
            let Obj::Object(object) = &**obj else { unreachable!() };
            let mut object = object.borrow_mut();
            let key = index.as_str().unwrap().to_string();
            match find_key(&object, &key) {
                Some(i) => object.values[i] = value,
                None => {
                    let key_obj = Rc::new(Obj::Str(crate::value::StrObj {
                        hash: crate::value::fnv1a(key.as_bytes()),
                        chars: key,
                    }));
                    object.keys.push(key_obj);
                    object.values.push(value);
                },
            }
        },
        _ => runtime_error("value is not assignable with the given index type"),
    }
}

fn find_key(object: &ObjectObj, key: &str) -> Option<usize> {
    object.keys.iter().position(|k| match &**k {
        Obj::Str(s) => s.chars == key,
        _ => false,
    })
}

/// `array_push`: grows the backing store by doubling, matching §4.3.
pub fn array_push(array: &Value, value: Value) {
    if let Value::Obj(obj) = array {
        if let Obj::Array(array) = &**obj {
            array.borrow_mut().items.push(value);
        }
    }
}

/// Backs the unary `!` operator (§4.4.4 truthiness): not in the spec's
/// Runtime ABI table verbatim, but needed by the AOT path for the same
/// reason `binary_op` is — the result's tag depends on evaluating `a`,
/// so it can't be emitted inline the way a literal can.
pub fn logical_not(value: &Value) -> Value {
    Value::bool(!value.is_truthy())
}

pub fn array_pop(array: &Value) -> Value {
    if let Value::Obj(obj) = array {
        if let Obj::Array(array) = &**obj {
            return array.borrow_mut().items.pop().unwrap_or(Value::Void);
        }
    }
    Value::Void
}

pub fn array_len(array: &Value) -> i64 {
    match array {
        Value::Obj(obj) => match &**obj {
            Obj::Array(array) => array.borrow().items.len() as i64,
            Obj::Str(s) => s.chars.len() as i64,
            Obj::Object(object) => object.borrow().values.len() as i64,
        },
        _ => 0,
    }
}

/// Canonical rendering per §4.4.3: no trailing newline here; `print`
/// (the caller) appends one.
pub fn render(value: &Value) -> String {
    match value {
        Value::Void => String::new(),
        Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Obj(obj) => match &**obj {
            Obj::Str(s) => s.chars.clone(),
            Obj::Array(array) => {
                let array = array.borrow();
                let rendered: Vec<String> = array.items.iter().map(render).collect();
                format!("[{}]", rendered.join(", "))
            },
            Obj::Object(_) => "<object>".to_string(),
        },
    }
}

/// Structural JSON rendering (`toJson`), distinct from `render`'s
/// canonical printing: objects expand to their real `{"k": v, ...}`
/// body here instead of collapsing to `<object>`. Shared by
/// `tulpar-interp` and the `to_json` runtime ABI entry so the
/// interpreted and AOT paths produce byte-identical output.
pub fn render_json(value: &Value) -> String {
    match value {
        Value::Void => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Obj(obj) => match &**obj {
            Obj::Str(s) => format!("{:?}", s.chars),
            Obj::Array(array) => {
                let array = array.borrow();
                let items: Vec<String> = array.items.iter().map(render_json).collect();
                format!("[{}]", items.join(","))
            },
            Obj::Object(object) => {
                let object = object.borrow();
                let entries: Vec<String> = object
                    .keys
                    .iter()
                    .zip(object.values.iter())
                    .map(|(key, value)| {
                        let key = match &**key {
                            Obj::Str(s) => s.chars.clone(),
                            _ => String::new(),
                        };
                        format!("{:?}:{}", key, render_json(value))
                    })
                    .collect();
                format!("{{{}}}", entries.join(","))
            },
        },
    }
}

/// Shortest round-tripping representation, e.g. `1` not `1.0` is wrong
/// for a float — floats always show at least one fractional digit so
/// `1.0` doesn't render indistinguishably from an int.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    let shortest = format!("{}", f);
    if shortest.contains('.') || shortest.contains('e') {
        shortest
    } else {
        format!("{}.0", shortest)
    }
}
