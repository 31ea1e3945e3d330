//! Tree-walking executor for Tulpar programs (§4.6): runs an AST
//! produced by `tulpar-par` directly, through the same `tulpar-rt`
//! operations the AOT path calls into, so both paths agree on every
//! observable `print`.

mod builtins;
mod interp;
mod scope;

pub use interp::Interpreter;
