use crate::error::Error;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use wasmtime::{Engine, Instance, Linker, Module, SharedMemory, Store, Val};

/// Lookup key the shared memory block is published under.
pub const MEMORY_SYMBOL: &str = "memory";

/// Import namespace an environment library binds its memory through.
pub const ENV_NAMESPACE: &str = "env";

/// Configuration handed to an [`EnvFactory`] when the environment is brought
/// up: the shared memory block the rest of the boot will use.
pub struct EnvConfig {
    pub memory: SharedMemory,
}

/// Brings up the environment side of a boot.
///
/// The factory runs after the shared memory block exists and before the
/// application module is read from disk, and is handed the same block the
/// application will later be instantiated against.
pub trait EnvFactory {
    fn instantiate(&self, engine: &Engine, config: EnvConfig) -> Result<EnvModule, Error>;
}

struct LibraryInstance {
    store: Store<()>,
    instance: Instance,
}

/// The booted environment: a registry of named shared memories, plus the live
/// library instance when the environment is backed by one.
///
/// A boot returns this to its caller, which owns it for the lifetime of the
/// application; nothing is parked in process globals.
pub struct EnvModule {
    memories: Vec<(String, SharedMemory)>,
    exports: Vec<String>,
    library: Option<LibraryInstance>,
}

impl EnvModule {
    pub fn new() -> Self {
        Self {
            memories: Vec::new(),
            exports: Vec::new(),
            library: None,
        }
    }

    /// Publish a memory under `name`.
    ///
    /// Each name is bound exactly once per boot; a second publish under the
    /// same name is refused rather than silently replaced.
    pub fn insert_memory(&mut self, name: &str, memory: SharedMemory) -> Result<(), Error> {
        if let Some((_, bound)) = self.memories.iter().find(|(n, _)| n == name) {
            return Err(Error::RebindError {
                key: name.to_owned(),
                binding: format!("shared memory ({} pages)", bound.ty().minimum()),
                attempt: format!("shared memory ({} pages)", memory.ty().minimum()),
            });
        }
        debug!("published shared memory as `{}`", name);
        self.memories.push((name.to_owned(), memory));
        Ok(())
    }

    pub fn memory(&self, name: &str) -> Option<&SharedMemory> {
        self.memories
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, memory)| memory)
    }

    pub fn memory_names(&self) -> impl Iterator<Item = &str> {
        self.memories.iter().map(|(name, _)| name.as_str())
    }

    /// Names exported by the environment library, when there is one.
    pub fn exports(&self) -> impl Iterator<Item = &str> {
        self.exports.iter().map(|name| name.as_str())
    }

    /// Call an export of the environment library.
    pub fn invoke(&mut self, field: &str, args: &[Val]) -> Result<Vec<Val>, Error> {
        let library = self
            .library
            .as_mut()
            .ok_or_else(|| Error::SymbolNotFound(field.to_owned()))?;
        let func = library
            .instance
            .get_func(&mut library.store, field)
            .ok_or_else(|| Error::SymbolNotFound(field.to_owned()))?;
        let results_len = func.ty(&library.store).results().len();
        let mut results = vec![Val::I32(0); results_len];
        func.call(&mut library.store, args, &mut results)
            .map_err(Error::RuntimeError)?;
        Ok(results)
    }
}

/// Environment that publishes the injected memory and nothing else; the
/// default when the application is self-contained.
#[derive(Debug, Default)]
pub struct MinimalEnv;

impl EnvFactory for MinimalEnv {
    fn instantiate(&self, _engine: &Engine, config: EnvConfig) -> Result<EnvModule, Error> {
        let mut env = EnvModule::new();
        env.insert_memory(MEMORY_SYMBOL, config.memory)?;
        Ok(env)
    }
}

/// Environment backed by a support library module.
///
/// The library is compiled with the boot's engine and instantiated with its
/// `env::memory` import bound to the injected block, so the library and the
/// application read and write one buffer.
pub struct WasmLibrary {
    bytes: Vec<u8>,
}

impl WasmLibrary {
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Self {
        Self {
            bytes: bytes.as_ref().to_vec(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Ok(Self {
            bytes: fs::read(path)?,
        })
    }
}

impl EnvFactory for WasmLibrary {
    fn instantiate(&self, engine: &Engine, config: EnvConfig) -> Result<EnvModule, Error> {
        let module = Module::from_binary(engine, &self.bytes).map_err(Error::LibraryError)?;
        let mut store = Store::new(engine, ());
        let mut linker = Linker::new(engine);
        linker
            .define(&store, ENV_NAMESPACE, MEMORY_SYMBOL, config.memory.clone())
            .map_err(Error::LibraryError)?;
        let instance = linker
            .instantiate(&mut store, &module)
            .map_err(Error::InstantiateError)?;
        let exports: Vec<String> = module.exports().map(|e| e.name().to_owned()).collect();
        info!("environment library up with {} exports", exports.len());

        let mut env = EnvModule::new();
        env.insert_memory(MEMORY_SYMBOL, config.memory)?;
        env.exports = exports;
        env.library = Some(LibraryInstance { store, instance });
        Ok(env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySpec;
    use wasmtime::Engine;

    fn test_memory(engine: &Engine) -> SharedMemory {
        MemorySpec::default()
            .with_fixed_pages(1)
            .build(engine)
            .expect("memory can be created")
    }

    #[test]
    fn minimal_env_publishes_one_memory() {
        let engine = Engine::default();
        let env = MinimalEnv
            .instantiate(&engine, EnvConfig {
                memory: test_memory(&engine),
            })
            .expect("environment can be instantiated");
        let names: Vec<&str> = env.memory_names().collect();
        assert_eq!(names, vec![MEMORY_SYMBOL]);
        assert!(env.memory(MEMORY_SYMBOL).is_some());
    }

    #[test]
    fn memory_cannot_be_rebound() {
        let engine = Engine::default();
        let mut env = EnvModule::new();
        env.insert_memory(MEMORY_SYMBOL, test_memory(&engine))
            .expect("first publish succeeds");
        match env.insert_memory(MEMORY_SYMBOL, test_memory(&engine)) {
            Err(Error::RebindError { key, .. }) => assert_eq!(key, MEMORY_SYMBOL),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn invoke_without_library_is_symbol_not_found() {
        let mut env = EnvModule::new();
        match env.invoke("sum", &[]) {
            Err(Error::SymbolNotFound(name)) => assert_eq!(name, "sum"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
