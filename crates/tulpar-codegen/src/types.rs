//! Per-callee type information for `tulpar-rt::abi` (§6). Every
//! generated IR `call` targets either a user function (always `n`
//! boxed `Value*` params returning one boxed `Value*`) or one of the
//! fixed ABI entries below, several of which return a raw scalar
//! instead of a handle — `to_int`/`to_float`/`len`/`is_truthy`/
//! `setjmp_token`, matching `tulpar-rt::abi`'s actual `extern "C"`
//! signatures rather than the "everything is opaque" shape a first
//! read of the ABI table suggests.

/// One parameter or return slot's LLVM shape. `Ptr` covers both a
/// `Value*` handle and the raw C string pointer `alloc_string` takes —
/// both are the same opaque `ptr` type at the LLVM level.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    Ptr,
    I32,
    I64,
    F64,
}

pub struct RuntimeSignature {
    pub params: &'static [Scalar],
    pub ret: Option<Scalar>,
}

const fn sig(params: &'static [Scalar], ret: Option<Scalar>) -> RuntimeSignature {
    RuntimeSignature { params, ret }
}

/// Looks up `name`'s parameter/return shape. Returns `None` for a name
/// that isn't a runtime entry — the caller treats that as a
/// user-defined function instead (always all-`Ptr`).
pub fn signature(name: &str) -> Option<RuntimeSignature> {
    use Scalar::*;
    Some(match name {
        "release_value" => sig(&[Ptr], None),
        "clone_value" => sig(&[Ptr], Some(Ptr)),
        "alloc_void" => sig(&[], Some(Ptr)),
        "alloc_bool" => sig(&[I32], Some(Ptr)),
        "alloc_int" => sig(&[I64], Some(Ptr)),
        "alloc_float" => sig(&[F64], Some(Ptr)),
        "alloc_string" => sig(&[Ptr], Some(Ptr)),
        "allocate_array" => sig(&[], Some(Ptr)),
        "array_push" => sig(&[Ptr, Ptr], None),
        "allocate_object" => sig(&[], Some(Ptr)),
        "object_set" => sig(&[Ptr, Ptr, Ptr], None),
        "get_element" => sig(&[Ptr, Ptr], Some(Ptr)),
        "set_element" => sig(&[Ptr, Ptr, Ptr], None),
        "binary_op" => sig(&[I32, Ptr, Ptr], Some(Ptr)),
        "print_value" => sig(&[Ptr], None),
        "to_string" => sig(&[Ptr], Some(Ptr)),
        "to_int" => sig(&[Ptr], Some(I64)),
        "to_float" => sig(&[Ptr], Some(F64)),
        "to_json" => sig(&[Ptr], Some(Ptr)),
        "len" => sig(&[Ptr], Some(I64)),
        "array_pop" => sig(&[Ptr], Some(Ptr)),
        "is_truthy" => sig(&[Ptr], Some(I32)),
        "logical_not" => sig(&[Ptr], Some(Ptr)),
        "negate" => sig(&[Ptr], Some(Ptr)),
        "trim" => sig(&[Ptr], Some(Ptr)),
        "replace" => sig(&[Ptr, Ptr, Ptr], Some(Ptr)),
        "split" => sig(&[Ptr, Ptr], Some(Ptr)),
        "input" => sig(&[], Some(Ptr)),
        "try_push" => sig(&[], None),
        "setjmp_token" => sig(&[], Some(I32)),
        "try_pop" => sig(&[], None),
        "throw" => sig(&[Ptr], None),
        "get_exception" => sig(&[], Some(Ptr)),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_returning_entries_are_not_pointers() {
        assert!(matches!(signature("to_int").unwrap().ret, Some(Scalar::I64)));
        assert!(matches!(signature("is_truthy").unwrap().ret, Some(Scalar::I32)));
        assert!(matches!(signature("len").unwrap().ret, Some(Scalar::I64)));
    }

    #[test]
    fn void_entries_have_no_return_slot() {
        assert!(signature("array_push").unwrap().ret.is_none());
        assert!(signature("try_push").unwrap().ret.is_none());
    }

    #[test]
    fn unknown_name_is_not_a_runtime_entry() {
        assert!(signature("fib").is_none());
    }
}
