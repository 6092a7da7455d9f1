//! Hiss toolchain entry point.
//!
//! This binary does two things, selected by the path extension:
//! 1) Assemble a Hiss source file (`.hissa`) into a binary module written
//!    next to it as `<stem>.hissc`.
//! 2) Run a binary module (`.hissc`), writing `print` output to stdout.
//!
//! Behavior summary:
//! - With `-h/--help`, print usage.
//! - With `-v/--version`, print build-target + version.
//! - With a `.hissa` path, assemble and write the `.hissc` module.
//! - With a `.hissc` path, load the module and execute it.
//!
//! Exit code 0 on success. Any assembler, loader, runtime, or I/O error is
//! rendered as a single diagnostic line on stderr with exit code 1. Log
//! verbosity is controlled through the `HISS_LOG` environment variable
//! (an env-filter directive, e.g. `HISS_LOG=hiss_runtime=trace`).

use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::process;

use hiss_runtime::{asm, Machine, Module};

/// Human-facing toolchain version string.
const VERSION: &str = "0.1.0";

/// Construct the help/usage text shown for `-h/--help`.
fn usage() -> String {
    format!(
        r#"Hiss Toolchain v{0}

Usage:
    hiss <program.hissa>
        Assemble a Hiss source file; the binary module is written to
        <program.hissc> next to the input.

    hiss <program.hissc>
        Load and run a binary module. `print` output goes to stdout.

Options:
    -h, --help
        Show this help message and exit.
    -v, --version
        Show toolchain version."#,
        VERSION
    )
}

/// Assemble `path` and write the module beside it.
fn assemble_file(path: &Path) -> Result<(), String> {
    let source = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    let bytes = asm::assemble(&source).map_err(|e| e.to_string())?;
    let out_path = path.with_extension("hissc");
    fs::write(&out_path, bytes)
        .map_err(|e| format!("failed to write {}: {}", out_path.display(), e))?;
    Ok(())
}

/// Load the module at `path` and run it to completion.
fn run_file(path: &Path) -> Result<(), String> {
    let bytes =
        fs::read(path).map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    let module = Module::load(&bytes).map_err(|e| e.to_string())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut machine = Machine::new(&module).map_err(|e| e.to_string())?;
    machine.run(&mut out).map_err(|e| e.to_string())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("HISS_LOG"))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() == 1 || args[1] == "-h" || args[1] == "--help" {
        println!("{}", usage());
        return;
    }

    if args[1] == "-v" || args[1] == "--version" {
        println!(
            "hiss-build-{}-{}: v{}",
            env::consts::OS,
            env::consts::ARCH,
            VERSION
        );
        return;
    }

    let path = Path::new(&args[1]);
    let result = if args[1].ends_with(".hissa") {
        assemble_file(path)
    } else if args[1].ends_with(".hissc") {
        run_file(path)
    } else {
        Err(format!(
            "unrecognised input '{}': expected a .hissa or .hissc path",
            args[1]
        ))
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(1);
    }
}
