use crate::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;
use wasmtime::{Engine, ImportType, Module};

/// Conventional filename of the application module.
pub const DEFAULT_MODULE: &str = "example.wasm";

/// Read the application module's bytes from the filesystem.
///
/// Contents are returned as-is: a file that exists but does not hold a valid
/// module is not detected here, it fails at the compile step.
pub fn read_module<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, Error> {
    let path = path.as_ref();
    let mut buf: Vec<u8> = Vec::new();
    let mut file = File::open(path).map_err(|source| Error::ModuleRead {
        path: path.to_owned(),
        source,
    })?;
    file.read_to_end(&mut buf)
        .map_err(|source| Error::ModuleRead {
            path: path.to_owned(),
            source,
        })?;
    debug!("read {} bytes from {:?}", buf.len(), path);
    Ok(buf)
}

/// A compiled application module, not yet bound to a memory or a store.
pub struct AppModule {
    pub(crate) module: Module,
}

impl AppModule {
    /// Compile a binary module image.
    ///
    /// Only the binary format is accepted; text-format sources fail here like
    /// any other malformed input.
    pub fn compile(engine: &Engine, bytes: impl AsRef<[u8]>) -> Result<AppModule, Error> {
        let module = Module::from_binary(engine, bytes.as_ref()).map_err(Error::CompileError)?;
        Ok(AppModule { module })
    }

    /// Read and compile the module at `path`.
    pub fn from_file<P: AsRef<Path>>(engine: &Engine, path: P) -> Result<AppModule, Error> {
        let bytes = read_module(path)?;
        AppModule::compile(engine, &bytes)
    }

    /// The imports the application declares, in declaration order.
    pub fn imports(&self) -> impl ExactSizeIterator<Item = ImportType<'_>> {
        self.module.imports()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasmtime::Engine;

    #[test]
    fn missing_file_is_a_read_error() {
        match read_module("nonexistent.wasm") {
            Err(Error::ModuleRead { path, .. }) => {
                assert_eq!(path, Path::new("nonexistent.wasm"))
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn garbage_bytes_fail_at_compile() {
        let engine = Engine::default();
        match AppModule::compile(&engine, b"not a wasm module") {
            Err(Error::CompileError(_)) => (),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn text_format_is_rejected() {
        let engine = Engine::default();
        assert!(AppModule::compile(&engine, b"(module)").is_err());
    }

    #[test]
    fn binary_module_compiles() {
        let engine = Engine::default();
        let bytes = wat::parse_str("(module)").expect("valid wat");
        let module = AppModule::compile(&engine, &bytes).expect("module can be compiled");
        assert_eq!(module.imports().len(), 0);
    }

    #[test]
    fn from_file_reads_then_compiles() {
        let engine = Engine::default();
        let dir = tempfile::TempDir::new().expect("tempdir can be created");
        let path = dir.path().join("module.wasm");
        std::fs::write(&path, wat::parse_str("(module)").expect("valid wat"))
            .expect("module can be written");

        AppModule::from_file(&engine, &path).expect("module can be loaded");
        match AppModule::from_file(&engine, dir.path().join("absent.wasm")) {
            Err(Error::ModuleRead { .. }) => (),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
