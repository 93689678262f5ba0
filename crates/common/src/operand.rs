//! Instruction operands and their on-disk kind tags.
//!
//! Every operand occupies [`OPERAND_SIZE`] bytes on disk. The kind tag
//! written next to it selects how those bytes are read back:
//!
//! ```text
//! Null      zeros
//! Index     u32 pool index in bytes 0..4
//! Number    f64 bits in bytes 0..8
//! Bit       byte 0 (0 or 1)
//! Text      u32 pool index in bytes 0..4
//! Variable  u32 slot in bytes 0..4, u32 declared type in bytes 4..8
//! Jump      i32 relative offset in bytes 0..4
//! Call      u32 function index in bytes 0..4
//! ```

use byteorder::{ByteOrder, LittleEndian};

use crate::error::DecodeError;

/// Width in bytes of an encoded operand.
pub const OPERAND_SIZE: usize = 8;

/// Tag that tells the VM which operand arm is valid.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    Null = 0,
    Index = 1,
    Number = 2,
    Bit = 3,
    Text = 4,
    Variable = 5,
    Jump = 6,
    Call = 7,
}

/// All operand kinds, in encoding order.
pub const ALL_OPERAND_KINDS: [OperandKind; 8] = [
    OperandKind::Null,
    OperandKind::Index,
    OperandKind::Number,
    OperandKind::Bit,
    OperandKind::Text,
    OperandKind::Variable,
    OperandKind::Jump,
    OperandKind::Call,
];

impl TryFrom<u32> for OperandKind {
    type Error = DecodeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        ALL_OPERAND_KINDS
            .get(value as usize)
            .copied()
            .ok_or(DecodeError::InvalidOperandKind(value))
    }
}

impl OperandKind {
    /// Human-readable name used by the disassembler.
    pub fn name(&self) -> &'static str {
        match self {
            OperandKind::Null => "NULL",
            OperandKind::Index => "INDEX",
            OperandKind::Number => "NUMBER",
            OperandKind::Bit => "BIT",
            OperandKind::Text => "TEXT",
            OperandKind::Variable => "VARIABLE",
            OperandKind::Jump => "JUMP",
            OperandKind::Call => "CALL",
        }
    }
}

/// The type a variable was declared with.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeclaredType {
    #[default]
    Unknown = 0,
    Number = 1,
    Text = 2,
    Bit = 3,
}

impl DeclaredType {
    /// Map a source-level type name to a declared type.
    ///
    /// Collection types (`numbers`, `texts`, `bits`) and anything else
    /// map to `Unknown`.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "number" => DeclaredType::Number,
            "text" => DeclaredType::Text,
            "bit" => DeclaredType::Bit,
            _ => DeclaredType::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DeclaredType::Unknown => "unknown",
            DeclaredType::Number => "number",
            DeclaredType::Text => "text",
            DeclaredType::Bit => "bit",
        }
    }
}

impl TryFrom<u32> for DeclaredType {
    type Error = DecodeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DeclaredType::Unknown),
            1 => Ok(DeclaredType::Number),
            2 => Ok(DeclaredType::Text),
            3 => Ok(DeclaredType::Bit),
            other => Err(DecodeError::InvalidDeclaredType(other)),
        }
    }
}

/// The value attached to an instruction.
///
/// The variant is the operand kind, so the tag written to disk can never
/// disagree with the payload.
#[derive(Debug, Clone, Copy)]
pub enum Operand {
    /// No operand.
    None,
    /// Pool index (module names, generic string references).
    Index(u32),
    /// Numeric literal.
    Number(f64),
    /// Boolean literal.
    Bit(bool),
    /// Pool index of a string literal.
    Text(u32),
    /// Variable slot plus the type it was declared with.
    Variable { slot: u32, declared: DeclaredType },
    /// Signed offset relative to the instruction after the jump.
    Jump(i32),
    /// Function index assigned by the generator.
    Call(u32),
}

// Numbers compare by bit pattern so that an operand always equals its own
// decoded copy, NaN included.
impl PartialEq for Operand {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Operand::None, Operand::None) => true,
            (Operand::Index(a), Operand::Index(b)) => a == b,
            (Operand::Number(a), Operand::Number(b)) => a.to_bits() == b.to_bits(),
            (Operand::Bit(a), Operand::Bit(b)) => a == b,
            (Operand::Text(a), Operand::Text(b)) => a == b,
            (
                Operand::Variable {
                    slot: s1,
                    declared: d1,
                },
                Operand::Variable {
                    slot: s2,
                    declared: d2,
                },
            ) => s1 == s2 && d1 == d2,
            (Operand::Jump(a), Operand::Jump(b)) => a == b,
            (Operand::Call(a), Operand::Call(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Operand {}

impl Operand {
    /// The kind tag for this operand.
    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::None => OperandKind::Null,
            Operand::Index(_) => OperandKind::Index,
            Operand::Number(_) => OperandKind::Number,
            Operand::Bit(_) => OperandKind::Bit,
            Operand::Text(_) => OperandKind::Text,
            Operand::Variable { .. } => OperandKind::Variable,
            Operand::Jump(_) => OperandKind::Jump,
            Operand::Call(_) => OperandKind::Call,
        }
    }

    /// Encode the operand payload. Unused bytes are zero.
    pub fn encode(&self) -> [u8; OPERAND_SIZE] {
        let mut bytes = [0u8; OPERAND_SIZE];
        match *self {
            Operand::None => {}
            Operand::Index(i) | Operand::Text(i) | Operand::Call(i) => {
                LittleEndian::write_u32(&mut bytes[0..4], i);
            }
            Operand::Number(n) => LittleEndian::write_f64(&mut bytes, n),
            Operand::Bit(b) => bytes[0] = b as u8,
            Operand::Variable { slot, declared } => {
                LittleEndian::write_u32(&mut bytes[0..4], slot);
                LittleEndian::write_u32(&mut bytes[4..8], declared as u32);
            }
            Operand::Jump(offset) => LittleEndian::write_i32(&mut bytes[0..4], offset),
        }
        bytes
    }

    /// Decode an operand payload according to its kind tag.
    pub fn decode(kind: OperandKind, bytes: &[u8; OPERAND_SIZE]) -> Result<Self, DecodeError> {
        let low = LittleEndian::read_u32(&bytes[0..4]);
        let operand = match kind {
            OperandKind::Null => Operand::None,
            OperandKind::Index => Operand::Index(low),
            OperandKind::Number => Operand::Number(LittleEndian::read_f64(bytes)),
            OperandKind::Bit => Operand::Bit(bytes[0] != 0),
            OperandKind::Text => Operand::Text(low),
            OperandKind::Variable => Operand::Variable {
                slot: low,
                declared: DeclaredType::try_from(LittleEndian::read_u32(&bytes[4..8]))?,
            },
            OperandKind::Jump => Operand::Jump(LittleEndian::read_i32(&bytes[0..4])),
            OperandKind::Call => Operand::Call(low),
        };
        Ok(operand)
    }
}
