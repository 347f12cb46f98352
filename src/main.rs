mod options;

#[macro_use]
extern crate clap;

use crate::options::{ErrorStyle, Options};
use anyhow::Error;
use gangway::{Bindings, Bootstrap, EnvFactory, MinimalEnv, WasmLibrary};
use log::info;
use serde::Serialize;
use serde_json;
use std::process;

#[derive(Clone, Debug, Serialize)]
pub struct SerializedBootError {
    error: String,
}

impl From<Error> for SerializedBootError {
    fn from(e: Error) -> Self {
        SerializedBootError {
            error: format!("{}", e),
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum BindingError {
    #[error("adding bindings from {1}")]
    ExtendError(#[source] gangway::Error, String),
    #[error("bindings file {1}")]
    FileError(#[source] gangway::Error, String),
}

fn main() {
    env_logger::init();

    let opts = Options::get().unwrap();

    if let Err(err) = run(&opts) {
        match opts.error_style {
            ErrorStyle::Human => {
                eprintln!("Error: {}\n", err);
            }
            ErrorStyle::Json => {
                let errs: Vec<SerializedBootError> = vec![err.into()];
                let json = serde_json::to_string(&errs).unwrap();
                eprintln!("{}", json);
            }
        }
        process::exit(1);
    }
}

pub fn run(opts: &Options) -> Result<(), Error> {
    info!("gangway {:?}", opts);

    let mut bindings = Bindings::standard();
    for file in opts.binding_files.iter() {
        let file_bindings = Bindings::from_file(file).map_err(|source| {
            let file = format!("{:?}", file);
            BindingError::FileError(source, file)
        })?;

        bindings.extend(&file_bindings).map_err(|source| {
            let file = format!("{:?}", file);
            BindingError::ExtendError(source, file)
        })?;
    }

    let factory: Box<dyn EnvFactory> = match &opts.env_library {
        Some(path) => Box::new(WasmLibrary::from_file(path)?),
        None => Box::new(MinimalEnv),
    };

    Bootstrap::new()
        .module_path(&opts.module_path)
        .memory_spec(opts.memory)
        .bindings(bindings)
        .entrypoint(opts.entrypoint.as_str())
        .boot(factory.as_ref())?;

    Ok(())
}
