//! L# virtual machine: executes decoded bytecode programs.
//!
//! The VM is a stack-based machine with:
//! - An operand stack of runtime values
//! - A fixed array of variable slots per call frame
//! - An object table of strings, reclaimed by a mark-and-sweep collector
//!
//! # Usage
//!
//! ```
//! use lsharp_common::{Instruction, Opcode, Operand, Program, Value};
//! use lsharp_vm::run;
//!
//! let program = Program::new(vec![], vec![
//!     Instruction::new(Opcode::LoadConst, Operand::Number(3.0)),
//!     Instruction::new(Opcode::LoadConst, Operand::Number(4.0)),
//!     Instruction::bare(Opcode::Add),
//!     Instruction::bare(Opcode::Halt),
//! ]);
//!
//! let stack = run(program).unwrap();
//! assert_eq!(stack, vec![Value::Double(7.0)]);
//! ```

pub mod error;
pub mod execute;
pub mod gc;
pub mod heap;
pub mod loader;
pub mod machine;

pub use error::{LoadError, RuntimeError};
pub use execute::BUILTIN_LOG_TARGET;
pub use heap::{GcStats, ObjectTable};
pub use loader::load_program;
pub use machine::{
    CallFrame, FunctionEntry, VmOptions, VmState, STACK_CAPACITY, VARIABLE_SLOTS, VM,
};

use lsharp_common::{Program, Value};

/// Execute a program with default options and return the final stack.
///
/// `PRINT` output goes to stdout.
///
/// # Errors
///
/// Returns [`RuntimeError`] if execution faults (type mismatch, division
/// by zero, stack overflow, etc.).
pub fn run(program: Program) -> Result<Vec<Value>, RuntimeError> {
    let mut vm = VM::new(program);
    vm.run()?;
    Ok(vm.stack().to_vec())
}
