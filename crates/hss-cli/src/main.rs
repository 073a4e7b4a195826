//! HSS virtual machine runner.
//!
//! `hss [-q] [--trace] [-L dir]... [--save file] <image>`
//!
//! Exit status: 0 on halt, 42 on a fatal VM error, 255 on a usage error.

use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser};
use hss_runtime::log::{set_min_level, Level};
use hss_runtime::{error, VmResult};
use hss_vm::{Vm, VmConfig};

const EXIT_FATAL: i32 = 42;
const EXIT_USAGE: i32 = 255;

#[derive(Parser)]
#[command(name = "hss")]
#[command(about = "Run an HSS executable image", long_about = None)]
#[command(disable_help_flag = true)]
struct Cli {
    /// Print usage
    #[arg(short, long)]
    help: bool,

    /// Only report warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Log every executed instruction
    #[arg(long)]
    trace: bool,

    /// Extra directory to search for extension libraries (repeatable)
    #[arg(short = 'L', long = "lib-dir", value_name = "DIR")]
    lib_dirs: Vec<PathBuf>,

    /// Save file [default: image path with a .sav extension]
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Image to run
    image: Option<PathBuf>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(EXIT_USAGE);
        }
    };

    let image = match cli.image {
        Some(image) if !cli.help => image,
        _ => {
            let _ = Cli::command().print_help();
            process::exit(EXIT_USAGE);
        }
    };

    if cli.quiet {
        set_min_level(Level::Warn);
    }

    let mut config = VmConfig::new(image)
        .with_lib_dirs(cli.lib_dirs)
        .with_env_lib_dirs()
        .with_trace(cli.trace);
    if let Some(save) = cli.save {
        config = config.with_save(save);
    }

    if let Err(e) = run(&config) {
        error!("{}", e);
        process::exit(EXIT_FATAL);
    }
}

fn run(config: &VmConfig) -> VmResult<()> {
    Vm::load(config)?.run()
}
