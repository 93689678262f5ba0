//! Disassembler: program → human-readable listing.
//!
//! The listing starts with the object pool, one `.object` line per entry,
//! followed by one line per instruction prefixed with its index. Pool
//! references are annotated with the text they point at.

use std::fmt::Write;

use crate::instruction::Instruction;
use crate::operand::Operand;
use crate::program::Program;

fn quote(text: &str) -> String {
    format!("'{}'", text.escape_default())
}

fn pool_ref(program: &Program, index: u32) -> String {
    match program.objects.get(index as usize) {
        Some(text) => format!("#{index} {}", quote(text)),
        None => format!("#{index} <out of range>"),
    }
}

/// Render a single instruction's operand column.
fn operand_text(program: &Program, instr: &Instruction) -> Option<String> {
    let text = match instr.operand {
        Operand::None => return None,
        Operand::Index(i) | Operand::Text(i) => pool_ref(program, i),
        Operand::Number(n) => format!("{n:?}"),
        Operand::Bit(true) => "on".to_string(),
        Operand::Bit(false) => "off".to_string(),
        Operand::Variable { slot, declared } => format!("${slot} ({})", declared.name()),
        Operand::Jump(offset) => format!("{offset:+}"),
        Operand::Call(function) => format!("fn{function}"),
    };
    Some(text)
}

/// Disassemble a program into a listing.
pub fn disassemble(program: &Program) -> String {
    let mut out = String::new();

    for (i, object) in program.objects.iter().enumerate() {
        let _ = writeln!(out, ".object {i} {}", quote(object));
    }

    for (i, instr) in program.instructions.iter().enumerate() {
        let _ = match operand_text(program, instr) {
            Some(operand) => writeln!(out, "{i:04} {} {operand}", instr.opcode.mnemonic()),
            None => writeln!(out, "{i:04} {}", instr.opcode.mnemonic()),
        };
    }

    out
}
