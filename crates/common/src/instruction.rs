//! A single L# instruction.

use crate::opcode::Opcode;
use crate::operand::{Operand, OperandKind};

/// One instruction: an opcode plus its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// The attached value. `Operand::None` if not applicable.
    pub operand: Operand,
}

impl Instruction {
    /// Create a new instruction.
    pub fn new(opcode: Opcode, operand: Operand) -> Self {
        Self { opcode, operand }
    }

    /// Create an instruction with no operand.
    pub fn bare(opcode: Opcode) -> Self {
        Self {
            opcode,
            operand: Operand::None,
        }
    }

    /// The operand-kind tag that is written next to this instruction.
    pub fn kind(&self) -> OperandKind {
        self.operand.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand::DeclaredType;

    #[test]
    fn bare_has_null_kind() {
        let instr = Instruction::bare(Opcode::Halt);
        assert_eq!(instr.operand, Operand::None);
        assert_eq!(instr.kind(), OperandKind::Null);
    }

    #[test]
    fn kind_follows_operand() {
        let instr = Instruction::new(
            Opcode::StoreVar,
            Operand::Variable {
                slot: 0,
                declared: DeclaredType::Number,
            },
        );
        assert_eq!(instr.kind(), OperandKind::Variable);
        assert_eq!(
            Instruction::new(Opcode::LoadConst, Operand::Text(4)).kind(),
            OperandKind::Text
        );
    }
}
