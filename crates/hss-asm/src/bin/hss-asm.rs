//! `hss-asm <source>`: assemble a program into `<source stem>.hss`.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use hss_runtime::{error, info};

#[derive(Parser)]
#[command(name = "hss-asm")]
#[command(about = "Assemble an HSS program into an executable image", long_about = None)]
struct Cli {
    /// Assembly source file
    source: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    match hss_asm::assemble_file(&cli.source) {
        Ok(out) => info!("wrote {}", out.display()),
        Err(e) => {
            error!("{}: {}", cli.source.display(), e);
            process::exit(1);
        }
    }
}
