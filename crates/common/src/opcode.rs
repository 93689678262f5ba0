//! Opcode definitions for the L# instruction set.

use std::fmt;

use crate::error::DecodeError;

/// Identifies the operation an instruction performs.
///
/// The `#[repr(u32)]` values are the on-disk encoding and must not be
/// reordered.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Push a constant built from the operand (number, bit or pool index).
    LoadConst = 0,
    /// Push a copy of variable slot `operand.slot`.
    LoadVar = 1,
    /// Pop into variable slot `operand.slot`.
    StoreVar = 2,
    /// Pop and discard the top of stack.
    Pop = 3,

    /// Pop right, pop left, push `left + right`.
    Add = 4,
    /// Pop right, pop left, push `left - right`.
    Sub = 5,
    /// Pop right, pop left, push `left * right`.
    Mul = 6,
    /// Pop right, pop left, push `left / right`. Zero divisor faults.
    Div = 7,

    /// Pop two, push BIT (equal).
    Eq = 8,
    /// Pop two, push BIT (not equal).
    Neq = 9,
    /// Pop two, push BIT (`left > right`).
    Gt = 10,
    /// Pop two, push BIT (`left < right`).
    Lt = 11,

    /// Pop two BITs, push their conjunction.
    And = 12,
    /// Pop two BITs, push their disjunction.
    Or = 13,
    /// Pop one BIT, push its negation.
    Not = 14,

    /// Relative jump from the next instruction.
    Jump = 15,
    /// Pop a BIT; jump when it is false.
    JumpIfFalse = 16,
    /// Call function `operand.function`.
    Call = 17,
    /// Return from the current function, or end the program at top level.
    Return = 18,
    /// Stop execution.
    Halt = 19,
    /// Pop one value and print it.
    Print = 20,
    /// Import the module named by pool entry `operand.index`.
    Grab = 21,

    /// Pop a string and log it at error severity.
    BuiltinError = 22,
    /// Pop a string and log it at warning severity.
    BuiltinWarning = 23,
    /// Pop a string and log it at debug severity.
    BuiltinDebug = 24,
    /// Pop a string and log it at info severity.
    BuiltinInfo = 25,
}

/// All opcodes, in encoding order.
pub const ALL_OPCODES: [Opcode; 26] = [
    Opcode::LoadConst,
    Opcode::LoadVar,
    Opcode::StoreVar,
    Opcode::Pop,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Eq,
    Opcode::Neq,
    Opcode::Gt,
    Opcode::Lt,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Jump,
    Opcode::JumpIfFalse,
    Opcode::Call,
    Opcode::Return,
    Opcode::Halt,
    Opcode::Print,
    Opcode::Grab,
    Opcode::BuiltinError,
    Opcode::BuiltinWarning,
    Opcode::BuiltinDebug,
    Opcode::BuiltinInfo,
];

impl TryFrom<u32> for Opcode {
    type Error = DecodeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        ALL_OPCODES
            .get(value as usize)
            .copied()
            .ok_or(DecodeError::InvalidOpcode(value))
    }
}

impl Opcode {
    /// Returns the disassembly mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::LoadConst => "LOAD_CONST",
            Opcode::LoadVar => "LOAD_VAR",
            Opcode::StoreVar => "STORE_VAR",
            Opcode::Pop => "POP",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Eq => "EQ",
            Opcode::Neq => "NEQ",
            Opcode::Gt => "GT",
            Opcode::Lt => "LT",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Jump => "JMP",
            Opcode::JumpIfFalse => "JMP_IF_FALSE",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::Halt => "HALT",
            Opcode::Print => "PRINT",
            Opcode::Grab => "GRAB",
            Opcode::BuiltinError => "BUILTIN_ERROR",
            Opcode::BuiltinWarning => "BUILTIN_WARNING",
            Opcode::BuiltinDebug => "BUILTIN_DEBUG",
            Opcode::BuiltinInfo => "BUILTIN_INFO",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
