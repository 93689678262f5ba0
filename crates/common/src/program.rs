//! Program representation and the `.lsb` bytecode file codec.
//!
//! A bytecode file is little-endian with fixed-width fields:
//!
//! ```text
//! u32            object count
//! repeat:        u32 length, length bytes of UTF-8
//! u32            instruction count
//! repeat:        u32 opcode
//!                u64 operand size (always 8)
//!                [8] operand bytes
//!                u32 operand kind
//! ```
//!
//! There is no header or version field.

use std::io::{Cursor, Read};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};

use crate::error::DecodeError;
use crate::instruction::Instruction;
use crate::opcode::Opcode;
use crate::operand::{Operand, OperandKind, OPERAND_SIZE};

/// Encoded width of one instruction record.
pub const INSTRUCTION_RECORD_SIZE: usize = 4 + 8 + OPERAND_SIZE + 4;

/// A compiled L# program: the constant pool plus the instruction stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// Constant/object pool. Insertion-ordered; never deduplicated.
    pub objects: Vec<String>,
    /// The instruction stream.
    pub instructions: Vec<Instruction>,
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, value);
    out.extend_from_slice(&buf);
}

fn put_u64(out: &mut Vec<u8>, value: u64) {
    let mut buf = [0u8; 8];
    LittleEndian::write_u64(&mut buf, value);
    out.extend_from_slice(&buf);
}

fn read_u32(cursor: &mut Cursor<&[u8]>, what: &'static str) -> Result<u32, DecodeError> {
    let offset = cursor.position() as usize;
    cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| DecodeError::Truncated { what, offset })
}

fn read_u64(cursor: &mut Cursor<&[u8]>, what: &'static str) -> Result<u64, DecodeError> {
    let offset = cursor.position() as usize;
    cursor
        .read_u64::<LittleEndian>()
        .map_err(|_| DecodeError::Truncated { what, offset })
}

fn remaining(cursor: &Cursor<&[u8]>) -> usize {
    cursor
        .get_ref()
        .len()
        .saturating_sub(cursor.position() as usize)
}

impl Program {
    /// Create a program from a pool and an instruction stream.
    pub fn new(objects: Vec<String>, instructions: Vec<Instruction>) -> Self {
        Self {
            objects,
            instructions,
        }
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Encode the program as a bytecode file image.
    pub fn encode(&self) -> Vec<u8> {
        let pool_bytes: usize = self.objects.iter().map(|s| 4 + s.len()).sum();
        let mut out =
            Vec::with_capacity(8 + pool_bytes + self.instructions.len() * INSTRUCTION_RECORD_SIZE);

        put_u32(&mut out, self.objects.len() as u32);
        for object in &self.objects {
            put_u32(&mut out, object.len() as u32);
            out.extend_from_slice(object.as_bytes());
        }

        put_u32(&mut out, self.instructions.len() as u32);
        for instr in &self.instructions {
            put_u32(&mut out, instr.opcode as u32);
            put_u64(&mut out, OPERAND_SIZE as u64);
            out.extend_from_slice(&instr.operand.encode());
            put_u32(&mut out, instr.kind() as u32);
        }
        out
    }

    /// Decode a bytecode file image.
    ///
    /// Every field is validated; the whole input must be consumed.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = Cursor::new(bytes);

        let object_count = read_u32(&mut cursor, "object count")? as usize;
        // Each object needs at least its length prefix.
        let mut objects = Vec::with_capacity(object_count.min(remaining(&cursor) / 4));
        for index in 0..object_count {
            let len = read_u32(&mut cursor, "object length")? as usize;
            let offset = cursor.position() as usize;
            if remaining(&cursor) < len {
                return Err(DecodeError::Truncated {
                    what: "object bytes",
                    offset,
                });
            }
            let mut raw = vec![0u8; len];
            cursor
                .read_exact(&mut raw)
                .map_err(|_| DecodeError::Truncated {
                    what: "object bytes",
                    offset,
                })?;
            let text = String::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8 { index })?;
            objects.push(text);
        }

        let instruction_count = read_u32(&mut cursor, "instruction count")? as usize;
        let mut instructions = Vec::with_capacity(
            instruction_count.min(remaining(&cursor) / INSTRUCTION_RECORD_SIZE),
        );
        for index in 0..instruction_count {
            let opcode = Opcode::try_from(read_u32(&mut cursor, "opcode")?)?;
            let size = read_u64(&mut cursor, "operand size")?;
            if size != OPERAND_SIZE as u64 {
                return Err(DecodeError::OperandSize {
                    index,
                    found: size,
                    expected: OPERAND_SIZE as u64,
                });
            }
            let offset = cursor.position() as usize;
            let mut payload = [0u8; OPERAND_SIZE];
            cursor
                .read_exact(&mut payload)
                .map_err(|_| DecodeError::Truncated {
                    what: "operand bytes",
                    offset,
                })?;
            let kind = OperandKind::try_from(read_u32(&mut cursor, "operand kind")?)?;
            let operand = Operand::decode(kind, &payload)?;
            instructions.push(Instruction::new(opcode, operand));
        }

        let trailing = remaining(&cursor);
        if trailing != 0 {
            return Err(DecodeError::TrailingBytes(trailing));
        }

        Ok(Self {
            objects,
            instructions,
        })
    }
}
