//! The `Value` tagged union and heap object model.
//!
//! `Value` is cheap to `Clone`: `Obj` payloads are reference-counted, so
//! cloning a `Value` is exactly "share the referenced object," matching the
//! spec's lifecycle contract. The design leaves the choice of reference counting
//! vs. tracing to the implementer; this crate uses `Rc` because Tulpar
//! programs run single-threaded (§5) and have no cycles a tracing
//! collector would be needed to break (arrays/objects hold `Value`s, never
//! `Obj` handles back to themselves).

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone)]
pub enum Value {
    Void,
    Bool(bool),
    Int(i64),
    Float(f64),
    Obj(Rc<Obj>),
}

pub enum Obj {
    Str(StrObj),
    Array(RefCell<ArrayObj>),
    Object(RefCell<ObjectObj>),
}

pub struct StrObj {
    pub chars: String,
    pub hash: u32,
}

#[derive(Default)]
pub struct ArrayObj {
    pub items: Vec<Value>,
}

#[derive(Default)]
pub struct ObjectObj {
    /// Parallel to `values`; order is insertion order (§3.3: "iteration
    /// and lookup preserve insertion order").
    pub keys: Vec<Rc<Obj>>,
    pub values: Vec<Value>,
}

/// FNV-1a over raw bytes, matching `original_source`'s `aot_allocate_string`
/// exactly (offset basis `2166136261`, prime `16777619`).
pub fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 2166136261;
    for &byte in bytes {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}

impl Value {
    pub fn int(value: i64) -> Value {
        Value::Int(value)
    }

    pub fn float(value: f64) -> Value {
        Value::Float(value)
    }

    pub fn bool(value: bool) -> Value {
        Value::Bool(value)
    }

    /// Allocates a new `Str` object, computing and freezing its hash.
    pub fn string(content: impl Into<String>) -> Value {
        let chars = content.into();
        let hash = fnv1a(chars.as_bytes());
        Value::Obj(Rc::new(Obj::Str(StrObj { chars, hash })))
    }

    /// Allocates a new, empty `Array`.
    pub fn array() -> Value {
        Value::Obj(Rc::new(Obj::Array(RefCell::new(ArrayObj::with_capacity()))))
    }

    /// Allocates a new, empty `Object`.
    pub fn object() -> Value {
        Value::Obj(Rc::new(Obj::Object(RefCell::new(ObjectObj::with_capacity()))))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::Obj(obj) if matches!(**obj, Obj::Str(_)))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Obj(obj) if matches!(**obj, Obj::Array(_)))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Obj(obj) if matches!(**obj, Obj::Object(_)))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Obj(obj) => match &**obj {
                Obj::Str(s) => Some(&s.chars),
                _ => None,
            },
            _ => None,
        }
    }

    /// Truthiness per §4.4.4: non-zero payload is truthy, `Void` is
    /// always falsey.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Void => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Obj(_) => true,
        }
    }
}

/// Array and object storage grows by doubling from an initial capacity,
/// matching §4.3. `Vec` already doubles on reallocation; these helpers
/// just make the initial reservation explicit so the growth curve
/// matches the spec from the very first push.
pub const INITIAL_ARRAY_CAPACITY: usize = 4;
pub const INITIAL_OBJECT_CAPACITY: usize = 8;

impl ArrayObj {
    pub fn with_capacity() -> Self {
        ArrayObj { items: Vec::with_capacity(INITIAL_ARRAY_CAPACITY) }
    }
}

impl ObjectObj {
    pub fn with_capacity() -> Self {
        ObjectObj {
            keys: Vec::with_capacity(INITIAL_OBJECT_CAPACITY),
            values: Vec::with_capacity(INITIAL_OBJECT_CAPACITY),
        }
    }
}
