use anyhow::{format_err, Error};
use clap::{Arg, ArgMatches};
use gangway::{MemorySpec, DEFAULT_MODULE, WASM_PAGE_SIZE};
use std::convert::TryFrom;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorStyle {
    Human,
    Json,
}

impl Default for ErrorStyle {
    fn default() -> Self {
        ErrorStyle::Human
    }
}

fn parse_humansized(desc: &str) -> Result<u64, Error> {
    use human_size::{Byte, ParsingError, Size, SpecificSize};
    match desc.parse::<Size>() {
        Ok(s) => {
            let bytes: SpecificSize<Byte> = s.into();
            Ok(bytes.value() as u64)
        }
        Err(ParsingError::MissingMultiple) => Ok(desc.parse::<u64>()?),
        Err(e) => Err(e)?,
    }
}

fn humansized(bytes: u64) -> String {
    use human_size::{Byte, Mebibyte, SpecificSize};
    let bytes = SpecificSize::new(bytes as f64, Byte).expect("bytes");
    let mb: SpecificSize<Mebibyte> = bytes.into();
    mb.to_string()
}

fn pages_from_bytes(bytes: u64) -> Result<u32, Error> {
    if bytes == 0 || bytes % u64::from(WASM_PAGE_SIZE) != 0 {
        Err(format_err!(
            "memory size must be a non-zero multiple of the 64 KiB page size"
        ))?;
    }
    Ok(u32::try_from(bytes / u64::from(WASM_PAGE_SIZE))?)
}

#[derive(Debug)]
pub struct Options {
    pub module_path: PathBuf,
    pub entrypoint: String,
    pub env_library: Option<PathBuf>,
    pub binding_files: Vec<PathBuf>,
    pub memory: MemorySpec,
    pub error_style: ErrorStyle,
}

impl Options {
    pub fn from_args(m: &ArgMatches<'_>) -> Result<Self, Error> {
        let module_path = PathBuf::from(m.value_of("module").unwrap_or(DEFAULT_MODULE));

        let entrypoint = m.value_of("entrypoint").unwrap_or("main").to_owned();

        let env_library = m.value_of("env_library").map(PathBuf::from);

        let binding_files: Vec<PathBuf> = m
            .values_of("bindings")
            .unwrap_or_default()
            .map(PathBuf::from)
            .collect();

        let memory = if let Some(size_str) = m.value_of("memory_size") {
            let pages = pages_from_bytes(parse_humansized(size_str)?)?;
            MemorySpec::default().with_fixed_pages(pages)
        } else {
            MemorySpec::default()
        };

        let error_style = match m.value_of("error_style") {
            None => ErrorStyle::default(),
            Some("human") => ErrorStyle::Human,
            Some("json") => ErrorStyle::Json,
            Some(_) => panic!("unknown value for error-style"),
        };

        Ok(Options {
            module_path,
            entrypoint,
            env_library,
            binding_files,
            memory,
            error_style,
        })
    }

    pub fn get() -> Result<Self, Error> {
        let _ = include_str!("../Cargo.toml");
        let m = app_from_crate!()
            .arg(
                Arg::with_name("entrypoint")
                    .long("--entrypoint")
                    .takes_value(true)
                    .multiple(false)
                    .help("exported function to invoke (default: main)"),
            )
            .arg(
                Arg::with_name("env_library")
                    .long("--env-library")
                    .takes_value(true)
                    .multiple(false)
                    .help("environment library module to instantiate over the shared memory before the application boots"),
            )
            .arg(
                Arg::with_name("bindings")
                    .long("--bindings")
                    .takes_value(true)
                    .multiple(true)
                    .number_of_values(1)
                    .help("path to bindings json file"),
            )
            .arg(
                Arg::with_name("memory_size")
                    .long("--memory-size")
                    .takes_value(true)
                    .multiple(false)
                    .help(&format!(
                        "exact size of the shared memory block. must be a multiple of 64 KiB. default: {}",
                        humansized(MemorySpec::default().total_bytes())
                    )),
            )
            .arg(
                Arg::with_name("error_style")
                    .long("error-style")
                    .takes_value(true)
                    .possible_values(&["human", "json"])
                    .help("Style of error reporting (default: human)"),
            )
            .arg(
                Arg::with_name("module")
                    .multiple(false)
                    .required(false)
                    .help(&format!("application module file (default: {})", DEFAULT_MODULE)),
            )
            .get_matches();

        Self::from_args(&m)
    }
}
