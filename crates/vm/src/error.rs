//! Runtime and load errors for the L# VM.
//!
//! Every runtime error carries the index of the instruction that faulted
//! (`at`).

use lsharp_common::{DecodeError, Opcode};
use thiserror::Error;

/// Fatal faults raised while executing a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Operand stack or call stack exceeded its capacity.
    #[error("stack overflow at instruction {at}")]
    StackOverflow { at: usize },

    /// Pop on an empty stack, or a call with fewer arguments than its arity.
    #[error("stack underflow at instruction {at}")]
    StackUnderflow { at: usize },

    /// Operands of the wrong kind for the opcode.
    #[error("type mismatch in {opcode}: got {found} at instruction {at}")]
    TypeMismatch {
        at: usize,
        opcode: Opcode,
        found: String,
    },

    /// Integer or float division by exactly zero.
    #[error("division by zero at instruction {at}")]
    DivisionByZero { at: usize },

    /// An operand of a kind the opcode cannot use.
    #[error("{opcode} cannot take a {kind} operand at instruction {at}")]
    InvalidOperand {
        at: usize,
        opcode: Opcode,
        kind: &'static str,
    },

    /// Variable slot beyond the configured slot count.
    #[error("variable slot {slot} out of range at instruction {at}")]
    SlotOutOfRange { at: usize, slot: u32 },

    /// String reference to an object that is not in the table.
    #[error("object {index} out of range at instruction {at}")]
    ObjectOutOfRange { at: usize, index: usize },

    /// Pool index beyond the program's constant pool.
    #[error("constant {index} out of range at instruction {at}")]
    ConstantOutOfRange { at: usize, index: u32 },

    /// Jump or call target outside the program.
    #[error("invalid jump target {target} at instruction {at}")]
    InvalidJump { at: usize, target: i64 },

    /// CALL to a function index the host never defined.
    #[error("unknown function {index} at instruction {at}")]
    UnknownFunction { at: usize, index: u32 },

    /// Program counter went past the end of the program.
    #[error("unexpected end of program at instruction {at}")]
    UnexpectedEndOfProgram { at: usize },

    /// The machine already halted or faulted.
    #[error("machine is not runnable (state {state}) at instruction {at}")]
    NotRunnable { at: usize, state: &'static str },

    /// Writing to the output sink failed.
    #[error("output error at instruction {at}: {message}")]
    Output { at: usize, message: String },
}

/// Errors reading a bytecode file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("cannot read '{path}': {message}")]
    Io { path: String, message: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
