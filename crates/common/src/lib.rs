//! L# common types and bytecode encoding.
//!
//! This crate provides the data structures shared by the compiler and the
//! virtual machine:
//!
//! - [`Opcode`]: the instruction set
//! - [`Operand`], [`OperandKind`], [`DeclaredType`]: instruction operands
//! - [`Instruction`]: opcode plus operand
//! - [`Value`]: runtime value representation for the VM stack
//! - [`Program`]: object pool plus instructions, with the `.lsb` file codec
//! - [`disassemble`]: human-readable listing of a program
//! - [`DecodeError`]: errors from decoding byte streams

pub mod disassembler;
pub mod error;
pub mod instruction;
pub mod opcode;
pub mod operand;
pub mod program;
pub mod value;

pub use disassembler::disassemble;
pub use error::DecodeError;
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use operand::{DeclaredType, Operand, OperandKind, OPERAND_SIZE};
pub use program::Program;
pub use value::{Value, ValueKind};
