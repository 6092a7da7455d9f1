//! Golden-output harness: every `tests/programs/<stem>.hissa` is assembled,
//! loaded, and run; its `print` output must match the whitespace-trimmed
//! contents of `tests/programs/<stem>.expected`.

use std::fs;
use std::path::PathBuf;

use glob::glob;

use hiss_runtime::{asm, Machine, Module};

fn program_paths() -> Vec<PathBuf> {
    let pattern = format!("{}/tests/programs/*.hissa", env!("CARGO_MANIFEST_DIR"));
    glob(&pattern)
        .expect("valid glob pattern")
        .collect::<Result<Vec<_>, _>>()
        .expect("readable program directory")
}

#[test]
fn golden_programs() {
    let paths = program_paths();
    assert!(!paths.is_empty(), "no golden programs found");

    for path in paths {
        let name = path.display();
        let source =
            fs::read_to_string(&path).unwrap_or_else(|e| panic!("{name}: read failed: {e}"));
        let expected_path = path.with_extension("expected");
        let expected = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("{}: read failed: {e}", expected_path.display()));

        let bytes = asm::assemble(&source).unwrap_or_else(|e| panic!("{name}: assembly: {e}"));
        let module = Module::load(&bytes).unwrap_or_else(|e| panic!("{name}: load: {e}"));

        let mut out = Vec::new();
        let mut machine = Machine::new(&module).unwrap_or_else(|e| panic!("{name}: init: {e}"));
        machine
            .run(&mut out)
            .unwrap_or_else(|e| panic!("{name}: runtime: {e}"));

        let out = String::from_utf8(out).unwrap_or_else(|e| panic!("{name}: output: {e}"));
        assert_eq!(out.trim(), expected.trim(), "{name}");
    }
}
