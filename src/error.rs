//! # Error Handling for the Hiss Toolchain
//!
//! Errors are partitioned into three taxonomies matching the three pipeline
//! stages:
//!
//! - [`AsmError`] – raised synchronously while assembling textual source into
//!   a binary module. The first error aborts assembly; the partial byte
//!   buffer is discarded.
//! - [`LoadError`] – raised while decoding a binary module. The first error
//!   aborts loading.
//! - [`RuntimeError`] – raised by a single [`crate::vm::Machine::step`].
//!   Execution cannot be resumed after a runtime error.
//!
//! No error is retried. Everything propagates to the caller of the core API;
//! the command-line wrapper renders the `Display` form as a diagnostic line
//! and exits non-zero.

use thiserror::Error;

/// Errors produced while assembling textual source.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AsmError {
    /// A token is neither punctuation, a literal, a type name, nor a mnemonic.
    #[error("invalid token: '{0}'")]
    InvalidToken(String),
    /// The token stream does not match the grammar at this position.
    #[error("unexpected token: {0}")]
    UnexpectedToken(String),
    /// An integer does not fit the byte width its position requires.
    #[error("integer out of range: {0}")]
    OutOfRange(i64),
    /// A `$label` reference was never given a matching `label:` definition.
    #[error("unresolved reference: ${0}")]
    UnresolvedReference(String),
    /// A label was defined more than once.
    #[error("duplicate label: {0}")]
    DuplicateLabel(String),
}

/// Errors produced while decoding a binary module.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    /// The buffer does not start with the `hiss` magic bytes.
    #[error("missing magic bytes")]
    MissingMagicBytes,
    /// A read would extend past the end of the buffer.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// A constant carries a type tag byte that names no known type.
    #[error("unknown type tag: {0:#04x}")]
    UnknownTypeTag(u8),
}

/// Errors produced while executing a module.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RuntimeError {
    /// An instruction popped more values than the stack holds.
    #[error("stack underflow")]
    StackUnderflow,
    /// A value of the wrong variant reached a consumption site.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    /// A branch condition was an integer other than 0 or 1.
    #[error("invalid boolean: {0}")]
    InvalidBool(i64),
    /// The byte at `pc` names no known opcode.
    #[error("unknown opcode: {0:#04x}")]
    UnknownOpcode(u8),
    /// An `icmp` immediate names no known comparison.
    #[error("unknown comparison code: {0:#04x}")]
    UnknownCmp(u8),
    /// The program counter left the code segment mid-instruction, or a jump
    /// target went negative.
    #[error("program counter out of bounds: {0}")]
    PcOutOfBounds(i64),
    /// A `pushc` index has no constant behind it.
    #[error("constant index out of bounds: {0}")]
    ConstOutOfBounds(u8),
    /// A `loadv`/`storev` slot lies beyond the current stack length.
    #[error("local slot out of bounds: {0}")]
    SlotOutOfBounds(usize),
    /// `idiv` with a zero divisor.
    #[error("division by zero")]
    DivideByZero,
    /// The output sink failed while handling `print`.
    #[error("output error: {0}")]
    Output(String),
}
