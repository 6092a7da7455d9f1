//! # Control-Flow and Stack Operations for the Hiss VM
//!
//! Handlers for the non-arithmetic instructions:
//! - **Constants and locals** (`pushc`, `pop`, `loadv`, `storev`)
//! - **Branches** (`br`, `jmp`) with pc-relative signed displacements
//! - **Function calls** (`call`, `ret`) and the frame discipline around them
//! - **Termination** (`halt`)
//! - **I/O** (`print`)
//!
//! ## Calling convention
//! `call` pops the callee, leaves the top `arity` values in place as the
//! callee's locals, and records the caller's `pc` as the return address.
//! `ret` pops the frame, truncates the stack back to the frame pointer, and
//! pushes the single return value, so the caller observes exactly one new
//! slot at its old stack height. Locals beyond `arity` are never allocated
//! by `call`; a slot access is legal only while the stack is tall enough to
//! contain it.

use std::io::Write;

use tracing::debug;

use super::{pop, read_signed_offset, Frame};
use crate::error::RuntimeError;
use crate::value::HValue;

/// Handle `pushc`: push the constant at `idx`.
pub(super) fn handle_pushc(
    idx: u8,
    constants: &[HValue],
    stack: &mut Vec<HValue>,
) -> Result<(), RuntimeError> {
    let v = constants
        .get(idx as usize)
        .copied()
        .ok_or(RuntimeError::ConstOutOfBounds(idx))?;
    stack.push(v);
    Ok(())
}

/// Handle `pop`: discard the top of stack.
pub(super) fn handle_pop(stack: &mut Vec<HValue>) -> Result<(), RuntimeError> {
    pop(stack)?;
    Ok(())
}

/// Handle `loadv`: push the value in frame slot `idx`.
pub(super) fn handle_loadv(idx: u8, fp: usize, stack: &mut Vec<HValue>) -> Result<(), RuntimeError> {
    let slot = fp + idx as usize;
    let v = *stack.get(slot).ok_or(RuntimeError::SlotOutOfBounds(slot))?;
    stack.push(v);
    Ok(())
}

/// Handle `storev`: pop into frame slot `idx`. The slot must already be
/// within the stack.
pub(super) fn handle_storev(
    idx: u8,
    fp: usize,
    stack: &mut Vec<HValue>,
) -> Result<(), RuntimeError> {
    let v = pop(stack)?;
    let slot = fp + idx as usize;
    match stack.get_mut(slot) {
        Some(cell) => {
            *cell = v;
            Ok(())
        }
        None => Err(RuntimeError::SlotOutOfBounds(slot)),
    }
}

/// Handle `halt`: park `pc` past the end of the code so every later step
/// also observes the halt condition.
pub(super) fn handle_halt(code_len: usize, pc: &mut usize) {
    *pc = code_len;
}

/// Handle `call`: pop the callee, mark the top `arity` stack values as its
/// locals, push a frame, and jump to its offset.
pub(super) fn handle_call(
    stack: &mut Vec<HValue>,
    frames: &mut Vec<Frame>,
    pc: &mut usize,
) -> Result<(), RuntimeError> {
    let callee = pop(stack)?.as_func()?;
    let arity = callee.arity as usize;
    if stack.len() < arity {
        return Err(RuntimeError::StackUnderflow);
    }
    let fp = stack.len() - arity;
    debug!(offset = callee.offset, arity = callee.arity, fp, "call");
    frames.push(Frame {
        func: callee,
        fp,
        ret_addr: *pc,
    });
    *pc = callee.offset as usize;
    Ok(())
}

/// Handle `ret`: pop the frame, truncate the callee's locals away, and push
/// the return value at the caller's old stack height.
pub(super) fn handle_ret(
    stack: &mut Vec<HValue>,
    frames: &mut Vec<Frame>,
    pc: &mut usize,
) -> Result<(), RuntimeError> {
    let frame = frames.pop().ok_or(RuntimeError::StackUnderflow)?;
    *pc = frame.ret_addr;
    let ret = pop(stack)?;
    stack.truncate(frame.fp);
    stack.push(ret);
    debug!(ret_addr = frame.ret_addr, "ret");
    Ok(())
}

/// Handle `br`: pop the condition; when true, apply the signed displacement.
pub(super) fn handle_br(
    hi: u8,
    lo: u8,
    stack: &mut Vec<HValue>,
    pc: &mut usize,
) -> Result<(), RuntimeError> {
    if pop(stack)?.as_cond()? {
        jump_relative(hi, lo, pc)?;
    }
    Ok(())
}

/// Handle `jmp`: apply the signed displacement unconditionally.
pub(super) fn handle_jmp(hi: u8, lo: u8, pc: &mut usize) -> Result<(), RuntimeError> {
    jump_relative(hi, lo, pc)
}

/// Displace `pc` by the decoded offset. `pc` already points at the byte
/// after the second immediate.
fn jump_relative(hi: u8, lo: u8, pc: &mut usize) -> Result<(), RuntimeError> {
    let target = *pc as i64 + read_signed_offset(hi, lo);
    if target < 0 {
        return Err(RuntimeError::PcOutOfBounds(target));
    }
    *pc = target as usize;
    Ok(())
}

/// Handle `print`: peek the top of stack and write its rendering plus a
/// newline to the output sink. The stack is unchanged.
pub(super) fn handle_print(stack: &[HValue], out: &mut dyn Write) -> Result<(), RuntimeError> {
    let v = stack.last().ok_or(RuntimeError::StackUnderflow)?;
    writeln!(out, "{}", v).map_err(|e| RuntimeError::Output(e.to_string()))
}
