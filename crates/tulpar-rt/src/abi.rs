//! `extern "C"` surface for AOT-compiled programs (§6 Runtime ABI).
//!
//! Each function here is the one a `tulpar-codegen`-emitted `call`
//! instruction targets by name. `Value` crosses the boundary boxed on
//! the heap: LLVM IR only ever holds an opaque `*mut Value` it got
//! from us and hands back unchanged, never inspecting its layout.
//! This mirrors the teacher's `fax_gc_*` convention of raw-pointer
//! handles into Rust-owned memory, minus the GC: a handle lives until
//! its `Rc` count drops to zero, which for AOT-emitted code is at
//! `release_value`.

use crate::ops::{self, Op};
use crate::value::Value;
use std::cell::RefCell;
use std::ffi::{c_char, CStr};
use std::os::raw::c_int;

pub type ValueHandle = *mut Value;

fn into_handle(value: Value) -> ValueHandle {
    Box::into_raw(Box::new(value))
}

unsafe fn from_handle<'a>(handle: ValueHandle) -> &'a Value {
    &*handle
}

/// Takes ownership of a handle back from generated code, e.g. at the
/// end of a value's lifetime or after copying it into a container.
#[no_mangle]
pub unsafe extern "C" fn release_value(handle: ValueHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

#[no_mangle]
pub unsafe extern "C" fn clone_value(handle: ValueHandle) -> ValueHandle {
    into_handle(from_handle(handle).clone())
}

#[no_mangle]
pub extern "C" fn alloc_void() -> ValueHandle {
    into_handle(Value::Void)
}

#[no_mangle]
pub extern "C" fn alloc_bool(value: c_int) -> ValueHandle {
    into_handle(Value::bool(value != 0))
}

#[no_mangle]
pub extern "C" fn alloc_int(value: i64) -> ValueHandle {
    into_handle(Value::int(value))
}

#[no_mangle]
pub extern "C" fn alloc_float(value: f64) -> ValueHandle {
    into_handle(Value::float(value))
}

/// `alloc_string`: `text` must be a NUL-terminated, valid-UTF-8 C
/// string owned by the caller; the bytes are copied in.
#[no_mangle]
pub unsafe extern "C" fn alloc_string(text: *const c_char) -> ValueHandle {
    let text = CStr::from_ptr(text).to_string_lossy().into_owned();
    into_handle(Value::string(text))
}

#[no_mangle]
pub extern "C" fn allocate_array() -> ValueHandle {
    into_handle(Value::array())
}

#[no_mangle]
pub unsafe extern "C" fn array_push(array: ValueHandle, item: ValueHandle) {
    ops::array_push(from_handle(array), from_handle(item).clone());
}

#[no_mangle]
pub extern "C" fn allocate_object() -> ValueHandle {
    into_handle(Value::object())
}

#[no_mangle]
pub unsafe extern "C" fn object_set(object: ValueHandle, key: ValueHandle, value: ValueHandle) {
    ops::set_element(from_handle(object), from_handle(key), from_handle(value).clone());
}

#[no_mangle]
pub unsafe extern "C" fn get_element(target: ValueHandle, index: ValueHandle) -> ValueHandle {
    into_handle(ops::get_element(from_handle(target), from_handle(index)))
}

#[no_mangle]
pub unsafe extern "C" fn set_element(target: ValueHandle, index: ValueHandle, value: ValueHandle) {
    ops::set_element(from_handle(target), from_handle(index), from_handle(value).clone());
}

/// `op` is the `Op` discriminant as emitted by `tulpar-codegen` (see
/// `ops::Op`'s declaration order).
#[no_mangle]
pub unsafe extern "C" fn binary_op(op: c_int, a: ValueHandle, b: ValueHandle) -> ValueHandle {
    let op = decode_op(op);
    into_handle(ops::binary_op(op, from_handle(a), from_handle(b)))
}

fn decode_op(op: c_int) -> Op {
    match op {
        0 => Op::Add,
        1 => Op::Sub,
        2 => Op::Mul,
        3 => Op::Div,
        4 => Op::Lt,
        5 => Op::Gt,
        6 => Op::LtEq,
        7 => Op::GtEq,
        8 => Op::EqEq,
        _ => Op::NotEq,
    }
}

#[no_mangle]
pub unsafe extern "C" fn print_value(value: ValueHandle) {
    println!("{}", ops::render(from_handle(value)));
}

#[no_mangle]
pub unsafe extern "C" fn to_string(value: ValueHandle) -> ValueHandle {
    into_handle(Value::string(ops::render(from_handle(value))))
}

#[no_mangle]
pub unsafe extern "C" fn to_int(value: ValueHandle) -> i64 {
    match from_handle(value) {
        Value::Int(i) => *i,
        Value::Float(f) => *f as i64,
        Value::Bool(b) => *b as i64,
        value if value.is_string() => value.as_str().unwrap().trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[no_mangle]
pub unsafe extern "C" fn to_float(value: ValueHandle) -> f64 {
    match from_handle(value) {
        Value::Float(f) => *f,
        Value::Int(i) => *i as f64,
        Value::Bool(b) => if *b { 1.0 } else { 0.0 },
        value if value.is_string() => value.as_str().unwrap().trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Structural JSON rendering, distinct from `to_string`'s canonical
/// printing: objects get their real `{"k": v, ...}` body here instead
/// of collapsing to `<object>`.
#[no_mangle]
pub unsafe extern "C" fn to_json(value: ValueHandle) -> ValueHandle {
    into_handle(Value::string(ops::render_json(from_handle(value))))
}

#[no_mangle]
pub unsafe extern "C" fn len(value: ValueHandle) -> i64 {
    ops::array_len(from_handle(value))
}

#[no_mangle]
pub unsafe extern "C" fn array_pop(value: ValueHandle) -> ValueHandle {
    into_handle(ops::array_pop(from_handle(value)))
}

#[no_mangle]
pub unsafe extern "C" fn is_truthy(value: ValueHandle) -> c_int {
    from_handle(value).is_truthy() as c_int
}

#[no_mangle]
pub unsafe extern "C" fn logical_not(value: ValueHandle) -> ValueHandle {
    into_handle(ops::logical_not(from_handle(value)))
}

/// Unary `-`. Added alongside `logical_not` for the same reason: the
/// AOT path needs a tag-dispatching call for an operator the
/// interpreter handles with an inline match (§4.2 point covering
/// `UnaryOp`).
#[no_mangle]
pub unsafe extern "C" fn negate(value: ValueHandle) -> ValueHandle {
    into_handle(match from_handle(value) {
        Value::Int(i) => Value::int(-i),
        Value::Float(f) => Value::float(-f),
        _ => {
            ops::runtime_error("unary '-' applied to a non-numeric value");
            Value::int(0)
        },
    })
}

#[no_mangle]
pub unsafe extern "C" fn trim(value: ValueHandle) -> ValueHandle {
    into_handle(match from_handle(value).as_str() {
        Some(s) => Value::string(s.trim().to_string()),
        None => Value::string(""),
    })
}

#[no_mangle]
pub unsafe extern "C" fn replace(haystack: ValueHandle, from: ValueHandle, to: ValueHandle) -> ValueHandle {
    let haystack = from_handle(haystack).as_str().unwrap_or("").to_string();
    let from = from_handle(from).as_str().unwrap_or("").to_string();
    let to = from_handle(to).as_str().unwrap_or("").to_string();
    into_handle(Value::string(haystack.replace(&from, &to)))
}

#[no_mangle]
pub unsafe extern "C" fn split(haystack: ValueHandle, sep: ValueHandle) -> ValueHandle {
    let haystack = from_handle(haystack).as_str().unwrap_or("").to_string();
    let sep = from_handle(sep).as_str().unwrap_or("").to_string();
    let result = Value::array();
    let parts: Vec<&str> = if sep.is_empty() {
        haystack.split("").filter(|s| !s.is_empty()).collect()
    } else {
        haystack.split(sep.as_str()).collect()
    };
    for part in parts {
        ops::array_push(&result, Value::string(part.to_string()));
    }
    into_handle(result)
}

#[no_mangle]
pub extern "C" fn input() -> ValueHandle {
    let mut line = String::new();
    into_handle(match std::io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => Value::string(""),
        Ok(_) => Value::string(line.trim_end_matches(['\n', '\r']).to_string()),
    })
}

thread_local! {
    /// LIFO handler stack for `try`/`catch`: each frame records whether
    /// its block was entered via a thrown exception, so `setjmp`'s
    /// caller can branch to the matching `catch`/`finally` label (§4.5
    /// point 7). The actual non-local jump is emitted by the generated
    /// IR as a conditional branch on this flag; there is no real
    /// `setjmp`/`longjmp` here, since Tulpar's exceptions never cross
    /// an FFI boundary into non-Tulpar code.
    static HANDLER_STACK: RefCell<Vec<bool>> = RefCell::new(Vec::new());
    static PENDING_EXCEPTION: RefCell<Option<Value>> = RefCell::new(None);
}

#[no_mangle]
pub extern "C" fn try_push() {
    HANDLER_STACK.with(|stack| stack.borrow_mut().push(false));
}

/// Returns nonzero if the most recently pushed try frame was entered
/// because of a pending `throw`.
#[no_mangle]
pub extern "C" fn setjmp_token() -> c_int {
    HANDLER_STACK.with(|stack| stack.borrow().last().copied().unwrap_or(false)) as c_int
}

#[no_mangle]
pub extern "C" fn try_pop() {
    HANDLER_STACK.with(|stack| {
        stack.borrow_mut().pop();
    });
}

#[no_mangle]
pub unsafe extern "C" fn throw(value: ValueHandle) {
    PENDING_EXCEPTION.with(|pending| {
        *pending.borrow_mut() = Some(from_handle(value).clone());
    });
    HANDLER_STACK.with(|stack| {
        if let Some(top) = stack.borrow_mut().last_mut() {
            *top = true;
        }
    });
}

#[no_mangle]
pub extern "C" fn get_exception() -> ValueHandle {
    PENDING_EXCEPTION.with(|pending| match pending.borrow_mut().take() {
        Some(value) => into_handle(value),
        None => into_handle(Value::Void),
    })
}
