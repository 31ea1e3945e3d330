//! The abstract instruction set `tulpar-lower` emits and `tulpar-codegen`
//! consumes (§4.5): a small, backend-agnostic representation — ten
//! instruction shapes operating on boxed `Value` locals — rather than a
//! fully typed MIR, since Tulpar has no static type system to carry
//! through an intermediate layer.

pub mod builder;
pub mod ir;

pub use builder::Builder;
pub use ir::{
    BasicBlock, BlockId, ConstValue, Function, FunctionId, Instruction, Local, LocalId, Module,
    RuntimeDecl,
};
