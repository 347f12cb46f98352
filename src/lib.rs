//! Boot-or-die launcher for WebAssembly applications that share a linear
//! memory with their host environment.
//!
//! A [`Bootstrap`] prepares a fixed-size shared memory block, lets an
//! [`EnvFactory`] bring up the environment side against that block, then
//! reads, compiles, instantiates, and runs an application module whose
//! memory import is bound to the same block. Every failure along the way
//! propagates out of [`Bootstrap::boot`]; callers decide what to do with it
//! exactly once.

#![deny(bare_trait_objects)]

pub mod bindings;
pub mod boot;
pub mod env;
pub mod error;
pub mod instance;
pub mod memory;
pub mod module;

pub use crate::{
    bindings::Bindings,
    boot::Bootstrap,
    env::{
        EnvConfig, EnvFactory, EnvModule, MinimalEnv, WasmLibrary, ENV_NAMESPACE, MEMORY_SYMBOL,
    },
    error::Error,
    instance::AppInstance,
    memory::{MemorySpec, WASM_MAX_PAGES, WASM_PAGE_SIZE},
    module::{read_module, AppModule, DEFAULT_MODULE},
};

pub use wasmtime::{Engine, SharedMemory, Val};
