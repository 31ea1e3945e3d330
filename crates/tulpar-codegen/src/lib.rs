//! `tulpar-ir` → native object code via LLVM (§4.5's closing paragraph,
//! §6): declares the runtime ABI as external functions, lowers every
//! `tulpar-ir` instruction to `inkwell` builder calls, and links the
//! result against `tulpar-rt` (built as a staticlib) to produce an
//! executable.

pub mod error;
pub mod linker;
pub mod llvm;
pub mod types;

pub use error::{CodeGenError, Result};
pub use linker::Linker;
pub use llvm::LlvmBackend;
pub use types::{signature, RuntimeSignature, Scalar};
