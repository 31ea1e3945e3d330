//! Error type for the `tulpar` CLI driver.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error surfaced by the driver binary.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The source file could not be read.
    #[error("could not read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    /// AOT lowering failed to reach LLVM codegen, or the resulting object
    /// file could not be written.
    #[error("codegen failed: {0}")]
    CodeGen(#[from] tulpar_codegen::CodeGenError),
}

pub type Result<T> = std::result::Result<T, DriverError>;
