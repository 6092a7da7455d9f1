//! # Hiss Module Format & Decoder
//!
//! This module defines the **instruction set**, the **wire type tags**, and a
//! **binary decoder** for Hiss modules. It turns a raw byte buffer into a
//! [`Module`]: a constant pool plus a code segment, which the machine in
//! [`crate::vm`] executes.
//!
//! ## Binary layout (big-endian)
//! ```text
//! +------------------+----------------------------+
//! | Magic "hiss"     | 4 bytes                    |
//! +------------------+----------------------------+
//! | Constant count   | u8                         |
//! +------------------+----------------------------+
//! | For each constant:                            |
//! |   Type tag       | u8 (0x01 int, 0x02 func)   |
//! |   Payload        | int:  i64                  |
//! |                  | func: arity u8, offset i64 |
//! +------------------+----------------------------+
//! | Code             | everything remaining       |
//! +------------------+----------------------------+
//! ```
//!
//! The code segment's length is implicit in the buffer length. Function
//! offsets are relative to the start of the code segment; branch
//! displacements inside the code are pc-relative and are not interpreted
//! here.
//!
//! The decoder is strict: a bad magic prefix, a truncated payload, or an
//! unknown type tag aborts with a [`LoadError`]. By convention the first
//! constant is the entry function; that is the machine's concern, not the
//! decoder's.

use crate::error::LoadError;
use crate::value::{HFunc, HValue};

/// The four-byte prefix identifying a Hiss binary module.
pub const MAGIC: [u8; 4] = *b"hiss";

/// Wire type tag for a constant-pool entry.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HType {
    /// `hint` – a 64-bit signed integer.
    Int = 0x01,
    /// `hfunc` – an arity byte plus a code offset.
    Func = 0x02,
}

impl TryFrom<u8> for HType {
    type Error = ();
    fn try_from(v: u8) -> Result<Self, ()> {
        Ok(match v {
            0x01 => HType::Int,
            0x02 => HType::Func,
            _ => return Err(()),
        })
    }
}

/// Instruction set for the Hiss stack VM.
///
/// Each variant is a single opcode byte; immediates follow the opcode in the
/// byte stream and are read by the machine, not stored here.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// No effect.
    Noop = 0x00,
    /// Push `constants[idx]` (imm: idx u8).
    Pushc = 0x11,
    /// Pop and discard.
    Pop = 0x12,
    /// Push the value in frame slot `idx` (imm: idx u8).
    Loadv = 0x13,
    /// Pop into frame slot `idx` (imm: idx u8).
    Storev = 0x14,
    /// Halt execution.
    Halt = 0x20,
    /// Pop a function and enter it.
    Call = 0x21,
    /// Leave the current frame, handing one value back.
    Ret = 0x22,
    /// Pop a condition; if true, add a signed displacement to pc (imm: hi, lo).
    Br = 0x23,
    /// Add a signed displacement to pc unconditionally (imm: hi, lo).
    Jmp = 0x24,
    /// Pop x, pop y; push x + y.
    Iadd = 0x30,
    /// Pop x, pop y; push x - y.
    Isub = 0x31,
    /// Pop x, pop y; push x * y.
    Imul = 0x32,
    /// Pop x, pop y; push x / y, truncated.
    Idiv = 0x33,
    /// Pop x, pop y; push x & y.
    Iand = 0x34,
    /// Pop x, pop y; push x | y.
    Ior = 0x35,
    /// Pop x; push the result of comparing x with 0 (imm: cmp u8).
    Icmp = 0x36,
    /// Peek the top of stack and write its rendering to the output sink.
    Print = 0xF0,
}

impl TryFrom<u8> for Op {
    type Error = ();
    fn try_from(v: u8) -> Result<Self, ()> {
        use Op::*;
        Ok(match v {
            0x00 => Noop,
            0x11 => Pushc,
            0x12 => Pop,
            0x13 => Loadv,
            0x14 => Storev,
            0x20 => Halt,
            0x21 => Call,
            0x22 => Ret,
            0x23 => Br,
            0x24 => Jmp,
            0x30 => Iadd,
            0x31 => Isub,
            0x32 => Imul,
            0x33 => Idiv,
            0x34 => Iand,
            0x35 => Ior,
            0x36 => Icmp,
            0xF0 => Print,
            _ => return Err(()),
        })
    }
}

/// Comparison code carried by the `icmp` immediate.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cmp {
    Eq = 0x00,
    Neq = 0x01,
    Lt = 0x02,
    Leq = 0x03,
    Gt = 0x04,
    Geq = 0x05,
}

impl TryFrom<u8> for Cmp {
    type Error = ();
    fn try_from(v: u8) -> Result<Self, ()> {
        use Cmp::*;
        Ok(match v {
            0x00 => Eq,
            0x01 => Neq,
            0x02 => Lt,
            0x03 => Leq,
            0x04 => Gt,
            0x05 => Geq,
            _ => return Err(()),
        })
    }
}

/// A decoded, self-contained program: constant pool plus code segment.
///
/// Immutable after loading. By convention `constants[0]` is a function and
/// serves as the entry point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    pub constants: Vec<HValue>,
    pub code: Vec<u8>,
}

//
// --- Big-endian readers ----------------------------------------------------
//

/// Read a `u8` and advance `idx`.
fn read_u8(data: &[u8], idx: &mut usize) -> Result<u8, LoadError> {
    let b = *data.get(*idx).ok_or(LoadError::UnexpectedEof)?;
    *idx += 1;
    Ok(b)
}

/// Read an `i64` (big-endian) and advance `idx`.
fn read_i64(data: &[u8], idx: &mut usize) -> Result<i64, LoadError> {
    let end = idx.checked_add(8).ok_or(LoadError::UnexpectedEof)?;
    let bytes: [u8; 8] = data
        .get(*idx..end)
        .ok_or(LoadError::UnexpectedEof)?
        .try_into()
        .map_err(|_| LoadError::UnexpectedEof)?;
    *idx = end;
    Ok(i64::from_be_bytes(bytes))
}

impl Module {
    /// Decode a binary module.
    ///
    /// Validates the magic prefix, decodes the constant pool, and takes the
    /// remaining bytes as the code segment.
    pub fn load(data: &[u8]) -> Result<Module, LoadError> {
        if data.len() < MAGIC.len() || data[..MAGIC.len()] != MAGIC {
            return Err(LoadError::MissingMagicBytes);
        }
        let mut idx = MAGIC.len();

        let count = read_u8(data, &mut idx)? as usize;
        let mut constants = Vec::with_capacity(count);
        for _ in 0..count {
            let tag = read_u8(data, &mut idx)?;
            match HType::try_from(tag) {
                Ok(HType::Int) => {
                    let v = read_i64(data, &mut idx)?;
                    constants.push(HValue::Int(v));
                }
                Ok(HType::Func) => {
                    let arity = read_u8(data, &mut idx)?;
                    let offset = read_i64(data, &mut idx)? as u64;
                    constants.push(HValue::Func(HFunc { offset, arity }));
                }
                Err(()) => return Err(LoadError::UnknownTypeTag(tag)),
            }
        }

        Ok(Module {
            constants,
            code: data[idx..].to_vec(),
        })
    }
}
