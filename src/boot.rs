use crate::bindings::Bindings;
use crate::env::{EnvConfig, EnvFactory, EnvModule};
use crate::error::Error;
use crate::instance::AppInstance;
use crate::memory::MemorySpec;
use crate::module::{self, AppModule, DEFAULT_MODULE};
use std::path::PathBuf;
use tracing::{debug, info};
use wasmtime::{Config, Engine};

/// Builder for one boot of an application over a shared memory block.
///
/// Defaults mirror the conventional deployment: the module `example.wasm` in
/// the current directory, a fixed 256-page shared block, the standard `ffi`
/// bindings, and an entry point named `main`.
pub struct Bootstrap {
    module_path: PathBuf,
    memory: MemorySpec,
    bindings: Bindings,
    entrypoint: String,
}

impl Bootstrap {
    pub fn new() -> Self {
        Bootstrap {
            module_path: PathBuf::from(DEFAULT_MODULE),
            memory: MemorySpec::default(),
            bindings: Bindings::standard(),
            entrypoint: "main".to_owned(),
        }
    }

    pub fn module_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.module_path = path.into();
        self
    }

    pub fn memory_spec(mut self, memory: MemorySpec) -> Self {
        self.memory = memory;
        self
    }

    pub fn bindings(mut self, bindings: Bindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn entrypoint<S: Into<String>>(mut self, entrypoint: S) -> Self {
        self.entrypoint = entrypoint.into();
        self
    }

    /// Run the boot sequence to completion.
    ///
    /// The order is fixed: create the shared memory block, bring up the
    /// environment through `factory`, then read, compile, instantiate, and
    /// run the application. The factory always runs before the application
    /// module is read from disk. Any failure aborts the whole sequence; there
    /// is no partial recovery and nothing to clean up.
    ///
    /// On success the booted environment is returned to the caller, which
    /// owns it from here on.
    pub fn boot(&self, factory: &dyn EnvFactory) -> Result<EnvModule, Error> {
        let engine = self.engine()?;

        let memory = self.memory.build(&engine)?;
        debug!(
            "shared memory block ready: {} bytes",
            self.memory.total_bytes()
        );

        let env = factory.instantiate(&engine, EnvConfig { memory })?;
        debug!("environment up");

        let bytes = module::read_module(&self.module_path)?;
        let app = AppModule::compile(&engine, &bytes)?;
        debug!("application module compiled: {:?}", self.module_path);

        let mut instance = AppInstance::instantiate(&engine, &app, &self.bindings, &env)?;
        instance.run(&self.entrypoint)?;
        info!(
            "boot complete: {:?} ran `{}`",
            self.module_path, self.entrypoint
        );

        Ok(env)
    }

    fn engine(&self) -> Result<Engine, Error> {
        let mut config = Config::new();
        config.wasm_threads(true);
        Engine::new(&config).map_err(Error::InternalError)
    }
}

impl Default for Bootstrap {
    fn default() -> Self {
        Bootstrap::new()
    }
}
