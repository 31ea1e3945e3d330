//! Core utilities shared by every phase of the Tulpar toolchain:
//! string interning, source locations, diagnostics, and typed-index
//! collections.

pub mod def_id;
pub mod diagnostic;
pub mod error;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use def_id::{DefId, DefIdGenerator};
pub use diagnostic::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Handler, Level};
pub use error::{
    DiagnosticError, DiagnosticResult, IndexVecError, IndexVecResult, SourceMapError,
    SourceMapResult, SymbolError, SymbolResult,
};
pub use index_vec::{Idx, IndexVec};
pub use span::{FileId, SourceFile, SourceMap, Span};
pub use symbol::Symbol;
