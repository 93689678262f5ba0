//! VM state management: stack, variable slots, call frames, object table.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};

use lsharp_common::{Instruction, Program, Value};

use crate::error::RuntimeError;
use crate::heap::ObjectTable;

/// Default operand stack capacity.
pub const STACK_CAPACITY: usize = 256;

/// Default number of variable slots.
pub const VARIABLE_SLOTS: usize = 256;

/// Host-tunable limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmOptions {
    /// Operand stack capacity. Also bounds call depth.
    pub stack_capacity: usize,
    /// Variable slots per frame.
    pub variable_slots: usize,
    /// Collect garbage after every N executed instructions.
    pub gc_interval: Option<usize>,
}

impl Default for VmOptions {
    fn default() -> Self {
        Self {
            stack_capacity: STACK_CAPACITY,
            variable_slots: VARIABLE_SLOTS,
            gc_interval: None,
        }
    }
}

/// Lifecycle: `Loaded → Running → {Halted | Faulted}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmState {
    Loaded,
    Running,
    Halted,
    Faulted,
}

impl VmState {
    pub fn name(&self) -> &'static str {
        match self {
            VmState::Loaded => "loaded",
            VmState::Running => "running",
            VmState::Halted => "halted",
            VmState::Faulted => "faulted",
        }
    }
}

impl fmt::Display for VmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A host-defined function: where its body starts and how many stack
/// values it takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionEntry {
    pub entry: usize,
    pub arity: usize,
}

/// A call frame for function invocation.
#[derive(Debug, Clone)]
pub struct CallFrame {
    /// Instruction index to resume at after RETURN.
    pub return_pc: usize,
    /// Stack height below the callee's arguments.
    pub stack_base: usize,
    /// The caller's variable slots, restored on RETURN.
    pub saved_variables: Vec<Value>,
}

/// The L# virtual machine.
///
/// Owns its program, object table and all runtime state. `PRINT` output
/// goes to `W` (stdout unless a sink is supplied).
pub struct VM<W: Write = io::Stdout> {
    pub(crate) program: Program,
    /// Pool index → object index for the constant's runtime copy, if it
    /// is still alive. Not a GC root.
    pub(crate) constants: Vec<Option<usize>>,
    pub(crate) objects: ObjectTable,
    pub(crate) stack: Vec<Value>,
    pub(crate) variables: Vec<Value>,
    pub(crate) frames: Vec<CallFrame>,
    pub(crate) functions: HashMap<u32, FunctionEntry>,
    pub(crate) pc: usize,
    /// Index of the instruction being executed, for error reporting.
    pub(crate) current: usize,
    pub(crate) state: VmState,
    pub(crate) options: VmOptions,
    pub(crate) executed: usize,
    pub(crate) output: W,
}

impl VM<io::Stdout> {
    /// Create a VM with default options that prints to stdout.
    pub fn new(program: Program) -> Self {
        Self::with_output(program, VmOptions::default(), io::stdout())
    }

    pub fn with_options(program: Program, options: VmOptions) -> Self {
        Self::with_output(program, options, io::stdout())
    }
}

impl<W: Write> VM<W> {
    /// Create a VM that prints to `output`.
    ///
    /// The object table starts as a copy of the program's pool, with
    /// constant `i` living at object `i`.
    pub fn with_output(program: Program, options: VmOptions, output: W) -> Self {
        let objects = ObjectTable::from_pool(&program.objects);
        let constants = (0..program.objects.len()).map(Some).collect();
        Self {
            program,
            constants,
            objects,
            stack: Vec::with_capacity(options.stack_capacity),
            variables: vec![Value::Null; options.variable_slots],
            frames: Vec::new(),
            functions: HashMap::new(),
            pc: 0,
            current: 0,
            state: VmState::Loaded,
            options,
            executed: 0,
            output,
        }
    }

    /// Register the body of function `index` for CALL.
    pub fn define_function(&mut self, index: u32, function: FunctionEntry) {
        self.functions.insert(index, function);
    }

    pub fn state(&self) -> VmState {
        self.state
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// The operand stack, bottom first.
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// The current frame's variable slots.
    pub fn variables(&self) -> &[Value] {
        &self.variables
    }

    pub fn objects(&self) -> &ObjectTable {
        &self.objects
    }

    /// Text of a string value, if it refers to a live object.
    pub fn resolve(&self, value: &Value) -> Option<&str> {
        value.object_index().and_then(|i| self.objects.get(i))
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Push a value onto the stack, checking for overflow.
    pub(crate) fn push(&mut self, value: Value) -> Result<(), RuntimeError> {
        if self.stack.len() >= self.options.stack_capacity {
            return Err(RuntimeError::StackOverflow { at: self.current });
        }
        self.stack.push(value);
        Ok(())
    }

    /// Pop a value from the stack.
    pub(crate) fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack
            .pop()
            .ok_or(RuntimeError::StackUnderflow { at: self.current })
    }

    /// Fetch the instruction at the current pc.
    pub(crate) fn fetch(&self) -> Result<Instruction, RuntimeError> {
        self.program
            .instructions
            .get(self.pc)
            .copied()
            .ok_or(RuntimeError::UnexpectedEndOfProgram { at: self.pc })
    }

    /// Text of object `index`, or a fault if it is not in the table.
    pub(crate) fn object_text(&self, index: usize) -> Result<&str, RuntimeError> {
        self.objects
            .get(index)
            .ok_or(RuntimeError::ObjectOutOfRange {
                at: self.current,
                index,
            })
    }

    /// Object index for pool constant `index`, copying it back into the
    /// table if its runtime copy was collected.
    pub(crate) fn materialize(&mut self, index: u32) -> Result<usize, RuntimeError> {
        let slot = index as usize;
        let text = self
            .program
            .objects
            .get(slot)
            .ok_or(RuntimeError::ConstantOutOfRange {
                at: self.current,
                index,
            })?;
        if let Some(object) = self.constants[slot] {
            return Ok(object);
        }
        let object = self.objects.alloc(text.clone());
        self.constants[slot] = Some(object);
        log::debug!("constant {index} rematerialized as object {object}");
        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_come_from_constants() {
        let options = VmOptions::default();
        assert_eq!(options.stack_capacity, STACK_CAPACITY);
        assert_eq!(options.variable_slots, VARIABLE_SLOTS);
        assert_eq!(options.gc_interval, None);
    }

    #[test]
    fn new_vm_copies_the_pool() {
        let program = Program::new(vec!["a".to_string(), "b".to_string()], vec![]);
        let vm = VM::new(program);
        assert_eq!(vm.state(), VmState::Loaded);
        assert_eq!(vm.objects().len(), 2);
        assert_eq!(vm.resolve(&Value::Str(1)), Some("b"));
        assert_eq!(vm.variables().len(), VARIABLE_SLOTS);
        assert!(vm.variables().iter().all(|v| *v == Value::Null));
    }

    #[test]
    fn push_respects_capacity() {
        let options = VmOptions {
            stack_capacity: 1,
            ..VmOptions::default()
        };
        let mut vm = VM::with_output(Program::default(), options, Vec::new());
        vm.push(Value::Int(1)).unwrap();
        assert_eq!(
            vm.push(Value::Int(2)),
            Err(RuntimeError::StackOverflow { at: 0 })
        );
        assert_eq!(vm.pop(), Ok(Value::Int(1)));
        assert_eq!(vm.pop(), Err(RuntimeError::StackUnderflow { at: 0 }));
    }

    #[test]
    fn materialize_reuses_live_constant() {
        let program = Program::new(vec!["hi".to_string()], vec![]);
        let mut vm = VM::with_output(program, VmOptions::default(), Vec::new());
        assert_eq!(vm.materialize(0), Ok(0));
        assert_eq!(vm.objects().len(), 1);
        assert_eq!(
            vm.materialize(1),
            Err(RuntimeError::ConstantOutOfRange { at: 0, index: 1 })
        );
    }

    #[test]
    fn state_names() {
        assert_eq!(VmState::Faulted.to_string(), "faulted");
    }
}
