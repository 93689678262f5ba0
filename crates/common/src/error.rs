//! Decode errors for L# bytecode files.

use thiserror::Error;

/// Errors that occur while decoding a bytecode byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The stream ended before a field could be read in full.
    #[error("truncated bytecode: expected {what} at byte offset {offset}")]
    Truncated { what: &'static str, offset: usize },

    /// Opcode value outside the instruction set.
    #[error("invalid opcode: {0}")]
    InvalidOpcode(u32),

    /// Operand-kind tag not recognized.
    #[error("invalid operand kind: {0}")]
    InvalidOperandKind(u32),

    /// Declared variable type not recognized.
    #[error("invalid declared type: {0}")]
    InvalidDeclaredType(u32),

    /// The self-described operand size does not match the fixed operand width.
    #[error("invalid operand size {found} in instruction {index} (expected {expected})")]
    OperandSize {
        index: usize,
        found: u64,
        expected: u64,
    },

    /// A pool string is not valid UTF-8.
    #[error("object {index} is not valid UTF-8")]
    InvalidUtf8 { index: usize },

    /// Bytes remain after the last instruction.
    #[error("{0} trailing byte(s) after the last instruction")]
    TrailingBytes(usize),
}
