use crate::error::Error;
use serde_json::{json, Value};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A namespaced map from import names to the keys they resolve through.
///
/// The application's `(import "ffi" "memory" ...)` does not name the shared
/// memory directly; it resolves through the `ffi` namespace to a lookup key,
/// and that key is what the environment registry is searched for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bindings {
    bindings: HashMap<String, HashMap<String, String>>,
}

impl Bindings {
    pub fn new(bindings: HashMap<String, HashMap<String, String>>) -> Bindings {
        Bindings { bindings }
    }

    pub fn empty() -> Bindings {
        Bindings::new(HashMap::new())
    }

    /// Bindings for symbols imported from the conventional `ffi` namespace.
    pub fn ffi(ffi_bindings: HashMap<String, String>) -> Bindings {
        let mut bindings = HashMap::new();
        bindings.insert("ffi".to_owned(), ffi_bindings);
        Bindings::new(bindings)
    }

    /// The bindings a boot uses when none are given: the application's
    /// `ffi::memory` import resolves through the key `"memory"`.
    pub fn standard() -> Bindings {
        let imports: Value = json!({
            "ffi": {
                "memory": "memory",
            }
        });
        Bindings::from_json(&imports).expect("standard bindings are valid")
    }

    pub fn from_json(v: &Value) -> Result<Bindings, Error> {
        let top = v.as_object().ok_or(Error::ParseJsonObjError)?;
        let mut bindings = HashMap::new();
        for (module, symbols) in top.iter() {
            let symbols = symbols.as_object().ok_or_else(|| Error::ParseError {
                key: module.clone(),
                value: symbols.to_string(),
            })?;
            let mut module_bindings = HashMap::new();
            for (symbol, binding) in symbols.iter() {
                let binding = binding.as_str().ok_or_else(|| Error::ParseError {
                    key: format!("{}::{}", module, symbol),
                    value: binding.to_string(),
                })?;
                module_bindings.insert(symbol.clone(), binding.to_owned());
            }
            bindings.insert(module.clone(), module_bindings);
        }
        Ok(Bindings::new(bindings))
    }

    pub fn from_str(s: &str) -> Result<Bindings, Error> {
        let top: Value = serde_json::from_str(s)?;
        Bindings::from_json(&top)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Bindings, Error> {
        let contents = fs::read_to_string(path)?;
        Bindings::from_str(&contents)
    }

    /// Merge another set of bindings into this one. Binding the same
    /// `module::symbol` to a different key is an error.
    pub fn extend(&mut self, other: &Bindings) -> Result<(), Error> {
        for (module, symbols) in other.bindings.iter() {
            let module_bindings = self.bindings.entry(module.clone()).or_default();
            for (symbol, binding) in symbols.iter() {
                match module_bindings.entry(symbol.clone()) {
                    Entry::Occupied(entry) => {
                        if entry.get() != binding {
                            return Err(Error::RebindError {
                                key: format!("{}::{}", module, symbol),
                                binding: entry.get().clone(),
                                attempt: binding.clone(),
                            });
                        }
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(binding.clone());
                    }
                }
            }
        }
        Ok(())
    }

    /// Resolve one import to its lookup key.
    pub fn translate(&self, module: &str, symbol: &str) -> Result<&str, Error> {
        match self.bindings.get(module) {
            Some(symbols) => match symbols.get(symbol) {
                Some(binding) => Ok(binding),
                None => Err(Error::UnknownSymbol {
                    module: module.to_owned(),
                    symbol: symbol.to_owned(),
                }),
            },
            None => Err(Error::UnknownModule {
                module: module.to_owned(),
                symbol: symbol.to_owned(),
            }),
        }
    }
}
