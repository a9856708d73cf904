//! `content-patch` - apply patches to a module source.
//!
//! Usage:
//!   content-patch '<patch-array-json>' ['<patch-array-json>' ...]
//!
//! The module source is read from stdin. Each argument is one queued patch.

use std::io::{self, Read, Write};

use content_patch::cli::{apply_patches, init_tracing, CliError};
use content_patch::CoreConfig;

async fn run() -> Result<String, CliError> {
    let config = CoreConfig::from_env()?;
    init_tracing(&config);
    let patches: Vec<String> = std::env::args().skip(1).collect();

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    apply_patches(buf.trim(), &patches, &config).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    match run().await {
        Ok(result) => {
            let mut stdout = io::stdout();
            if let Err(e) = writeln!(stdout, "{result}") {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
