//! # Value Representation for the Hiss VM
//!
//! This module defines [`HValue`], the runtime type used on the Hiss virtual
//! machine's operand stack and in module constant pools.
//!
//! ## Supported types
//! - `Int(i64)` – 64-bit signed integer. Booleans are encoded as integers:
//!   `0` is false, `1` is true, and any other integer is an invalid boolean.
//! - `Func(HFunc)` – a function reference: a byte offset into the module's
//!   code segment plus the number of arguments the function consumes.
//!
//! ## Design
//! - Values are plain `Copy` data; nothing on the stack owns heap memory and
//!   there is no garbage collector.
//! - Conversions are checked, never coercing: consuming a `Func` where an
//!   integer is required (or vice versa) is a [`RuntimeError::TypeMismatch`],
//!   and a branch condition outside `{0, 1}` is a
//!   [`RuntimeError::InvalidBool`].

use std::fmt;

use crate::error::RuntimeError;

/// A function reference: entry offset within the code segment and arity.
///
/// `offset` is relative to the start of the module's code segment, not to the
/// start of the encoded file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HFunc {
    pub offset: u64,
    pub arity: u8,
}

/// Value type for the VM stack and the module constant pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HValue {
    /// 64-bit signed integer.
    Int(i64),
    /// Function reference.
    Func(HFunc),
}

impl HValue {
    /// Read the value as an integer.
    ///
    /// Returns [`RuntimeError::TypeMismatch`] if the value is a function.
    pub fn as_int(&self) -> Result<i64, RuntimeError> {
        match self {
            HValue::Int(i) => Ok(*i),
            HValue::Func(_) => Err(RuntimeError::TypeMismatch(format!(
                "expected an integer, found {}",
                self
            ))),
        }
    }

    /// Read the value as a function reference.
    ///
    /// Returns [`RuntimeError::TypeMismatch`] if the value is an integer.
    pub fn as_func(&self) -> Result<HFunc, RuntimeError> {
        match self {
            HValue::Func(f) => Ok(*f),
            HValue::Int(_) => Err(RuntimeError::TypeMismatch(format!(
                "expected a function, found {}",
                self
            ))),
        }
    }

    /// Read the value as a branch condition.
    ///
    /// Only `Int(0)` and `Int(1)` are valid conditions. Any other integer is
    /// [`RuntimeError::InvalidBool`]; a function is a
    /// [`RuntimeError::TypeMismatch`].
    pub fn as_cond(&self) -> Result<bool, RuntimeError> {
        match self.as_int()? {
            0 => Ok(false),
            1 => Ok(true),
            n => Err(RuntimeError::InvalidBool(n)),
        }
    }
}

impl fmt::Display for HValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HValue::Int(i) => write!(f, "{}", i),
            HValue::Func(func) => write!(f, "<func @{}/{}>", func.offset, func.arity),
        }
    }
}
