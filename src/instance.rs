use crate::bindings::Bindings;
use crate::env::EnvModule;
use crate::error::Error;
use crate::module::AppModule;
use tracing::debug;
use wasmtime::{Engine, ExternType, Instance, Linker, Store, Val};

/// A live application instance, bound to its memory and ready to run.
pub struct AppInstance {
    store: Store<()>,
    instance: Instance,
}

impl AppInstance {
    /// Instantiate an application against a booted environment.
    ///
    /// Memory imports resolve in two steps: the bindings translate the
    /// declared `module::symbol` pair to a lookup key, then that key is
    /// searched for in the environment's registry. The memory defined for the
    /// import is a clone of the registered handle, aliasing the same buffer.
    /// Every other import is left to the linker, so anything the environment
    /// does not cover fails instantiation as a link error.
    pub fn instantiate(
        engine: &Engine,
        module: &AppModule,
        bindings: &Bindings,
        env: &EnvModule,
    ) -> Result<AppInstance, Error> {
        let mut store = Store::new(engine, ());
        let mut linker = Linker::new(engine);
        for import in module.imports() {
            if let ExternType::Memory(_) = import.ty() {
                let key = bindings.translate(import.module(), import.name())?;
                let memory = env
                    .memory(key)
                    .ok_or_else(|| Error::NoLinearMemory(key.to_owned()))?;
                debug!(
                    "binding `{}::{}` to shared memory `{}`",
                    import.module(),
                    import.name(),
                    key
                );
                linker
                    .define(&store, import.module(), import.name(), memory.clone())
                    .map_err(Error::InstantiateError)?;
            }
        }
        let instance = linker
            .instantiate(&mut store, &module.module)
            .map_err(Error::InstantiateError)?;
        Ok(AppInstance { store, instance })
    }

    /// Invoke an exported function by name with no arguments.
    ///
    /// Results are discarded; the caller only observes success or failure.
    pub fn run(&mut self, entrypoint: &str) -> Result<(), Error> {
        let func = self
            .instance
            .get_func(&mut self.store, entrypoint)
            .ok_or_else(|| Error::SymbolNotFound(entrypoint.to_owned()))?;
        let results_len = func.ty(&self.store).results().len();
        let mut results = vec![Val::I32(0); results_len];
        func.call(&mut self.store, &[], &mut results)
            .map_err(Error::RuntimeError)?;
        Ok(())
    }
}
