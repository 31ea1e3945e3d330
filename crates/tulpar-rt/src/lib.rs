//! Runtime support shared by the tree-walking interpreter and
//! AOT-compiled programs: the `Value` data model, the operations that
//! can fail without aborting execution, and the `extern "C"` ABI
//! generated code links against (§3.3, §4.3, §4.4, §6).

pub mod abi;
pub mod ops;
pub mod value;

pub use ops::{binary_op, get_element, logical_not, render, runtime_error, set_element, Op};
pub use value::{ArrayObj, Obj, ObjectObj, StrObj, Value};
