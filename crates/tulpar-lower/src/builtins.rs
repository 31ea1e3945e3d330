//! Built-in name → runtime-call table (§4.5 point 6). Mirrors
//! `tulpar-interp::builtins::call`'s name set so both execution paths
//! agree on what's callable, but targets the narrower surface
//! `tulpar-rt::abi` actually exports rather than re-deriving behavior
//! inline: every entry here names one `#[no_mangle]` ABI function.

/// How a builtin's raw ABI return value becomes a boxed `Value` local.
/// Some ABI entries already return a `ValueHandle` (`Direct`); others
/// return a bare scalar that must be re-boxed with `alloc_int`/
/// `alloc_float` before the result can live in a Tulpar variable slot.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Wrap {
    Direct,
    Int,
    Float,
}

pub struct BuiltinSig {
    pub runtime_name: &'static str,
    pub wrap: Wrap,
}

/// Looks up a one-call builtin. `print` and `push` are handled
/// separately by the lowerer (variadic print, two-arg void push)
/// rather than through this table.
pub fn lookup(name: &str) -> Option<BuiltinSig> {
    let (runtime_name, wrap) = match name {
        "toString" => ("to_string", Wrap::Direct),
        "toInt" => ("to_int", Wrap::Int),
        "toFloat" => ("to_float", Wrap::Float),
        "toJson" => ("to_json", Wrap::Direct),
        "len" | "length" => ("len", Wrap::Int),
        "pop" => ("array_pop", Wrap::Direct),
        "trim" => ("trim", Wrap::Direct),
        "replace" => ("replace", Wrap::Direct),
        "split" => ("split", Wrap::Direct),
        "input" => ("input", Wrap::Direct),
        _ => return None,
    };
    Some(BuiltinSig { runtime_name, wrap })
}

pub fn is_builtin(name: &str) -> bool {
    matches!(name, "print" | "push") || lookup(name).is_some()
}
