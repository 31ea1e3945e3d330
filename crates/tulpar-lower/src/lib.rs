//! AOT lowering (§4.5): turns a parsed `Program` into a `tulpar-ir`
//! `Module` that `tulpar-codegen` can hand to LLVM. Shares the same
//! runtime operations and short-circuit semantics as `tulpar-interp`
//! so both execution paths agree on every observable behavior.

mod builtins;
mod import;
mod lower;
mod scope;

pub use lower::lower_program;
