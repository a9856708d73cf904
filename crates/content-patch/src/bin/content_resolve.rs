//! `content-resolve` - resolve a module path against a source and schema.
//!
//! Usage:
//!   content-resolve <schema-file> '<module-path>'
//!
//! The module source is read from stdin. Prints `{ "source": ..., "schema": ... }`.

use std::fs;
use std::io::{self, Read};

use content_patch::cli::{init_tracing, resolve, CliError};
use content_patch::CoreConfig;

fn run() -> Result<String, CliError> {
    let config = CoreConfig::from_env()?;
    init_tracing(&config);
    let args: Vec<String> = std::env::args().collect();
    let (schema_file, module_path) = match (args.get(1), args.get(2)) {
        (Some(file), path) => (file, path.map(String::as_str).unwrap_or("")),
        (None, _) => {
            return Err(CliError::Usage("Usage: content-resolve <schema-file> '<module-path>'".into()))
        }
    };
    let schema = fs::read_to_string(schema_file)?;

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    resolve(&schema, buf.trim(), module_path)
}

fn main() {
    match run() {
        Ok(result) => println!("{result}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
