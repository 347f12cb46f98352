use anyhow::Error as AnyError;
use std::path::PathBuf;
use thiserror::Error;

/// Gangway bootstrap errors.
///
/// Each stage of the boot pipeline fails with its own variant, so a caller can
/// tell a module that would not read from one that would not compile without
/// consulting exit codes or message text.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid argument: {}", _0)]
    InvalidArgument(&'static str),

    /// The application module could not be read from the filesystem.
    #[error("Error reading module {:?}", path)]
    ModuleRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The application module bytes failed validation or compilation.
    #[error("Compilation error")]
    CompileError(#[source] wasmtime::Error),

    /// The environment library failed to compile.
    #[error("Environment library error")]
    LibraryError(#[source] wasmtime::Error),

    /// The shared memory block could not be created.
    #[error("Memory creation error")]
    MemoryError(#[source] wasmtime::Error),

    /// The application module could not be linked or instantiated.
    #[error("Instantiation error")]
    InstantiateError(#[source] wasmtime::Error),

    /// The guest trapped or faulted during execution.
    #[error("Runtime error")]
    RuntimeError(#[source] wasmtime::Error),

    /// An attempt to look up a WebAssembly function by its symbol name failed.
    #[error("Symbol not found: {}", _0)]
    SymbolNotFound(String),

    /// A binding key resolved correctly but no memory is registered under it.
    #[error("No linear memory available: {}", _0)]
    NoLinearMemory(String),

    #[error("Parse error at {key}::{value:?}")]
    ParseError { key: String, value: String },

    #[error("Parse json error")]
    ParseJsonError(#[from] serde_json::Error),

    #[error("Top-level json must be an object")]
    ParseJsonObjError,

    #[error("Cannot re-bind {key} from {binding} to {attempt}")]
    RebindError {
        key: String,
        binding: String,
        attempt: String,
    },

    #[error("Unknown module for symbol `{module}::{symbol}`")]
    UnknownModule { module: String, symbol: String },

    #[error("Unknown symbol `{module}::{symbol}`")]
    UnknownSymbol { module: String, symbol: String },

    #[error("I/O error")]
    IoError(#[from] std::io::Error),

    /// A catch-all for internal errors that are likely unrecoverable by the
    /// embedding user.
    #[error("Internal error: {}", _0)]
    InternalError(#[source] AnyError),

    /// An unsupported feature was used.
    #[error("Unsupported feature: {}", _0)]
    Unsupported(String),
}
