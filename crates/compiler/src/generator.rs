//! Bytecode generation: AST → instructions plus object pool.
//!
//! One depth-first pass. Slots are handed out in generation order and are
//! never reused within a compilation.

use std::fs;
use std::path::Path;

use log::{debug, error};
use lsharp_common::{DeclaredType, Instruction, Opcode, Operand, Program};

use crate::ast::{self, Node};
use crate::error::{CompileError, Diagnostic};
use crate::symbol_table::{SymbolKind, SymbolTable, SYMBOL_TABLE_CAPACITY};

/// Variable slots available to a program. Matches the VM's default slot
/// count; every declaration and every assignment uses one.
pub const MAX_VARIABLES: u32 = 256;

/// Result of a successful generation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub program: Program,
    /// Parse errors met along the way. Their statements emitted nothing.
    pub diagnostics: Vec<Diagnostic>,
}

impl Compiled {
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Write the program as a bytecode file.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), CompileError> {
        write(&self.program, path)
    }
}

/// Write `program` to `path` in the bytecode file format.
pub fn write(program: &Program, path: impl AsRef<Path>) -> Result<(), CompileError> {
    let path = path.as_ref();
    fs::write(path, program.encode()).map_err(|e| {
        error!("failed to write bytecode to {}: {e}", path.display());
        CompileError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        }
    })?;
    debug!(
        "wrote {} object(s) and {} instruction(s) to {}",
        program.objects.len(),
        program.instructions.len(),
        path.display()
    );
    Ok(())
}

/// Generate bytecode for a parsed program.
pub fn compile(ast: &ast::Program) -> Result<Compiled, CompileError> {
    let mut generator = Generator::new();
    for statement in &ast.statements {
        generator.generate(statement)?;
    }
    generator.emit(Instruction::bare(Opcode::Halt));
    Ok(Compiled {
        program: Program::new(generator.objects, generator.instructions),
        diagnostics: generator.diagnostics,
    })
}

/// Opcode for a builtin callee, if `name` is one.
fn builtin(name: &str) -> Option<Opcode> {
    let opcode = match name {
        "error" => Opcode::BuiltinError,
        "warning" => Opcode::BuiltinWarning,
        "debug" => Opcode::BuiltinDebug,
        "info" => Opcode::BuiltinInfo,
        "print" => Opcode::Print,
        _ => return None,
    };
    Some(opcode)
}

fn binary_opcode(op: &str) -> Option<Opcode> {
    let opcode = match op {
        "+" => Opcode::Add,
        "-" => Opcode::Sub,
        "*" => Opcode::Mul,
        "/" => Opcode::Div,
        _ => return None,
    };
    Some(opcode)
}

struct Generator {
    instructions: Vec<Instruction>,
    objects: Vec<String>,
    symbols: SymbolTable,
    next_variable: u32,
    next_function: u32,
    diagnostics: Vec<Diagnostic>,
}

impl Generator {
    fn new() -> Self {
        Self {
            instructions: Vec::new(),
            objects: Vec::new(),
            symbols: SymbolTable::new(SYMBOL_TABLE_CAPACITY),
            next_variable: 0,
            next_function: 0,
            diagnostics: Vec::new(),
        }
    }

    fn emit(&mut self, instr: Instruction) {
        debug!(
            "{:04} {} {:?}",
            self.instructions.len(),
            instr.opcode,
            instr.operand
        );
        self.instructions.push(instr);
    }

    /// Append a copy of `text` to the pool. Equal strings are not merged.
    fn add_object(&mut self, text: &str) -> u32 {
        self.objects.push(text.to_string());
        (self.objects.len() - 1) as u32
    }

    fn new_variable(&mut self, name: &str, declared: DeclaredType) -> Result<u32, CompileError> {
        let slot = self.next_variable;
        if slot >= MAX_VARIABLES {
            return Err(CompileError::TooManyVariables {
                limit: MAX_VARIABLES,
            });
        }
        self.next_variable += 1;
        self.symbols
            .insert_typed(name, SymbolKind::Variable, slot, declared);
        Ok(slot)
    }

    fn generate(&mut self, node: &Node) -> Result<(), CompileError> {
        match node {
            Node::Declaration {
                type_name,
                name,
                value,
            } => {
                let declared = DeclaredType::from_type_name(type_name);
                let slot = self.new_variable(name, declared)?;
                if let Some(value) = value {
                    self.generate(value)?;
                    self.emit(Instruction::new(
                        Opcode::StoreVar,
                        Operand::Variable { slot, declared },
                    ));
                }
            }
            Node::Assignment { name, value } => {
                self.generate(value)?;
                // Every assignment binds a fresh slot, even for a known name.
                let slot = self.new_variable(name, DeclaredType::Unknown)?;
                self.emit(Instruction::new(
                    Opcode::StoreVar,
                    Operand::Variable {
                        slot,
                        declared: DeclaredType::Unknown,
                    },
                ));
            }
            Node::Return(value) => {
                if let Some(value) = value {
                    self.generate(value)?;
                }
                self.emit(Instruction::bare(Opcode::Return));
            }
            Node::Number(n) => self.emit(Instruction::new(Opcode::LoadConst, Operand::Number(*n))),
            Node::Text(text) => {
                let index = self.add_object(text);
                self.emit(Instruction::new(Opcode::LoadConst, Operand::Text(index)));
            }
            Node::Bit(b) => self.emit(Instruction::new(Opcode::LoadConst, Operand::Bit(*b))),
            Node::Identifier(name) => {
                let symbol = self
                    .symbols
                    .lookup(name)
                    .ok_or_else(|| CompileError::UndefinedVariable(name.clone()))?;
                if symbol.kind != SymbolKind::Variable {
                    return Err(CompileError::NotAVariable(name.clone()));
                }
                let operand = Operand::Variable {
                    slot: symbol.index,
                    declared: symbol.declared,
                };
                self.emit(Instruction::new(Opcode::LoadVar, operand));
            }
            Node::BinaryOp { op, left, right } => {
                let opcode =
                    binary_opcode(op).ok_or_else(|| CompileError::UnknownOperator(op.clone()))?;
                self.generate(left)?;
                self.generate(right)?;
                self.emit(Instruction::bare(opcode));
            }
            Node::Call { name, arguments } => {
                let builtin_op = builtin(name);
                if builtin_op.is_some() && arguments.len() != 1 {
                    return Err(CompileError::BuiltinArity {
                        name: name.clone(),
                        found: arguments.len(),
                    });
                }
                for argument in arguments {
                    self.generate(argument)?;
                }
                match builtin_op {
                    Some(opcode) => self.emit(Instruction::bare(opcode)),
                    None => {
                        let index = self.next_function;
                        self.next_function += 1;
                        self.symbols.insert(name, SymbolKind::Function, index);
                        self.emit(Instruction::new(Opcode::Call, Operand::Call(index)));
                    }
                }
            }
            Node::Grab { module } => {
                let index = self.add_object(module);
                self.emit(Instruction::new(Opcode::Grab, Operand::Index(index)));
            }
            Node::Error(diagnostic) => {
                error!("{diagnostic}");
                self.diagnostics.push(diagnostic.clone());
            }
            Node::Array(_) | Node::Contract { .. } => {
                return Err(CompileError::UnsupportedNode(node.kind_name()));
            }
        }
        Ok(())
    }
}
