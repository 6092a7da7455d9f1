//! # Hiss Runtime
//!
//! A small stack-based bytecode toolchain: an assembler that turns textual
//! Hiss source into a binary module, a loader that decodes that binary, and
//! a machine that executes it.
//!
//! The pipeline, end to end:
//!
//! ```
//! use hiss_runtime::{asm, Machine, Module};
//!
//! let bytes = asm::assemble(
//!     ".constants { hfunc 0 $main hint 42 } .code { main: pushc 1 print halt }",
//! )?;
//! let module = Module::load(&bytes)?;
//! let mut out = Vec::new();
//! Machine::new(&module)?.run(&mut out)?;
//! assert_eq!(out, b"42\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod asm;
pub mod error;
pub mod module;
pub mod value;
pub mod vm;

pub use asm::assemble;
pub use error::{AsmError, LoadError, RuntimeError};
pub use module::Module;
pub use value::HValue;
pub use vm::Machine;
