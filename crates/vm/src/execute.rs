//! Main execution loop and opcode dispatch for the L# VM.

use std::io::Write;

use log::{debug, error, info, warn};
use lsharp_common::{Instruction, Opcode, Operand, Value};

use crate::error::RuntimeError;
use crate::machine::{CallFrame, VmState, VM};

/// Log target for the builtin logging opcodes.
pub const BUILTIN_LOG_TARGET: &str = "lsharp::builtin";

fn describe(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| v.kind().to_string())
        .collect::<Vec<_>>()
        .join(" and ")
}

impl<W: Write> VM<W> {
    /// Execute until HALT, a top-level RETURN, or a fault.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        while self.step()? {}
        Ok(())
    }

    /// Execute one instruction. Returns `Ok(true)` while the machine is
    /// still running.
    ///
    /// A fault moves the machine to [`VmState::Faulted`] and is logged
    /// before it is returned.
    pub fn step(&mut self) -> Result<bool, RuntimeError> {
        match self.state {
            VmState::Loaded => self.state = VmState::Running,
            VmState::Running => {}
            VmState::Halted | VmState::Faulted => {
                return Err(RuntimeError::NotRunnable {
                    at: self.pc,
                    state: self.state.name(),
                });
            }
        }

        if let Err(e) = self.dispatch() {
            self.state = VmState::Faulted;
            error!("{e}");
            return Err(e);
        }

        self.executed += 1;
        if let Some(interval) = self.options.gc_interval.filter(|&n| n > 0) {
            if self.executed % interval == 0 {
                self.collect_garbage();
            }
        }

        Ok(self.state == VmState::Running)
    }

    fn dispatch(&mut self) -> Result<(), RuntimeError> {
        self.current = self.pc;
        let instr = self.fetch()?;
        self.pc += 1;

        match instr.opcode {
            Opcode::LoadConst => self.exec_load_const(&instr)?,
            Opcode::LoadVar => {
                let slot = self.variable_slot(&instr)?;
                let value = self.variables[slot];
                self.push(value)?;
            }
            Opcode::StoreVar => {
                let slot = self.variable_slot(&instr)?;
                let value = self.pop()?;
                self.variables[slot] = value;
            }
            Opcode::Pop => {
                self.pop()?;
            }

            Opcode::Add => self.exec_arith(Opcode::Add, i32::wrapping_add, |a, b| a + b)?,
            Opcode::Sub => self.exec_arith(Opcode::Sub, i32::wrapping_sub, |a, b| a - b)?,
            Opcode::Mul => self.exec_arith(Opcode::Mul, i32::wrapping_mul, |a, b| a * b)?,
            Opcode::Div => self.exec_div()?,

            Opcode::Eq => self.exec_comparison(Opcode::Eq, |a, b| a == b, |a, b| a == b)?,
            Opcode::Neq => self.exec_comparison(Opcode::Neq, |a, b| a != b, |a, b| a != b)?,
            Opcode::Gt => self.exec_comparison(Opcode::Gt, |a, b| a > b, |a, b| a > b)?,
            Opcode::Lt => self.exec_comparison(Opcode::Lt, |a, b| a < b, |a, b| a < b)?,

            Opcode::And => self.exec_logic(Opcode::And, |a, b| a && b)?,
            Opcode::Or => self.exec_logic(Opcode::Or, |a, b| a || b)?,
            Opcode::Not => match self.pop()? {
                Value::Bool(b) => self.push(Value::Bool(!b))?,
                other => return Err(self.mismatch(Opcode::Not, &[other])),
            },

            Opcode::Jump => {
                self.pc = self.jump_target(&instr)?;
            }
            Opcode::JumpIfFalse => match self.pop()? {
                Value::Bool(false) => self.pc = self.jump_target(&instr)?,
                Value::Bool(true) => {}
                other => return Err(self.mismatch(Opcode::JumpIfFalse, &[other])),
            },
            Opcode::Call => self.exec_call(&instr)?,
            Opcode::Return => self.exec_return()?,
            Opcode::Halt => {
                debug!("halt at instruction {}", self.current);
                self.state = VmState::Halted;
            }
            Opcode::Print => self.exec_print()?,
            Opcode::Grab => self.exec_grab(&instr)?,

            Opcode::BuiltinError => self.exec_builtin_log(Opcode::BuiltinError, log::Level::Error)?,
            Opcode::BuiltinWarning => {
                self.exec_builtin_log(Opcode::BuiltinWarning, log::Level::Warn)?
            }
            Opcode::BuiltinDebug => self.exec_builtin_log(Opcode::BuiltinDebug, log::Level::Debug)?,
            Opcode::BuiltinInfo => self.exec_builtin_log(Opcode::BuiltinInfo, log::Level::Info)?,
        }
        Ok(())
    }

    fn mismatch(&self, opcode: Opcode, found: &[Value]) -> RuntimeError {
        RuntimeError::TypeMismatch {
            at: self.current,
            opcode,
            found: describe(found),
        }
    }

    fn invalid_operand(&self, instr: &Instruction) -> RuntimeError {
        RuntimeError::InvalidOperand {
            at: self.current,
            opcode: instr.opcode,
            kind: instr.kind().name(),
        }
    }

    // ---- Constants and variables ----

    fn exec_load_const(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = match instr.operand {
            Operand::Number(n) => Value::Double(n),
            Operand::Bit(b) => Value::Bool(b),
            Operand::Text(index) | Operand::Index(index) => Value::Str(self.materialize(index)?),
            _ => {
                warn!(
                    "LOAD_CONST with {} operand at instruction {}; pushing null",
                    instr.kind().name(),
                    self.current
                );
                Value::Null
            }
        };
        self.push(value)
    }

    fn variable_slot(&self, instr: &Instruction) -> Result<usize, RuntimeError> {
        let Operand::Variable { slot, .. } = instr.operand else {
            return Err(self.invalid_operand(instr));
        };
        if slot as usize >= self.variables.len() {
            return Err(RuntimeError::SlotOutOfRange {
                at: self.current,
                slot,
            });
        }
        Ok(slot as usize)
    }

    // ---- Arithmetic and comparison ----

    fn exec_arith(
        &mut self,
        opcode: Opcode,
        int_op: fn(i32, i32) -> i32,
        float_op: fn(f64, f64) -> f64,
    ) -> Result<(), RuntimeError> {
        let right = self.pop()?;
        let left = self.pop()?;

        let result = match (left, right) {
            (Value::Int(a), Value::Int(b)) => Value::Int(int_op(a, b)),
            (Value::Double(a), Value::Double(b)) => Value::Double(float_op(a, b)),
            _ => return Err(self.mismatch(opcode, &[left, right])),
        };

        self.push(result)
    }

    fn exec_div(&mut self) -> Result<(), RuntimeError> {
        let right = self.pop()?;
        let left = self.pop()?;

        let result = match (left, right) {
            (Value::Int(_), Value::Int(0)) => {
                return Err(RuntimeError::DivisionByZero { at: self.current });
            }
            (Value::Double(_), Value::Double(b)) if b == 0.0 => {
                return Err(RuntimeError::DivisionByZero { at: self.current });
            }
            (Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_div(b)),
            (Value::Double(a), Value::Double(b)) => Value::Double(a / b),
            _ => return Err(self.mismatch(Opcode::Div, &[left, right])),
        };

        self.push(result)
    }

    fn exec_comparison(
        &mut self,
        opcode: Opcode,
        int_op: fn(i32, i32) -> bool,
        float_op: fn(f64, f64) -> bool,
    ) -> Result<(), RuntimeError> {
        let right = self.pop()?;
        let left = self.pop()?;

        let result = match (left, right) {
            (Value::Int(a), Value::Int(b)) => int_op(a, b),
            (Value::Double(a), Value::Double(b)) => float_op(a, b),
            _ => return Err(self.mismatch(opcode, &[left, right])),
        };

        self.push(Value::Bool(result))
    }

    fn exec_logic(
        &mut self,
        opcode: Opcode,
        op: fn(bool, bool) -> bool,
    ) -> Result<(), RuntimeError> {
        let right = self.pop()?;
        let left = self.pop()?;

        match (left, right) {
            (Value::Bool(a), Value::Bool(b)) => self.push(Value::Bool(op(a, b))),
            _ => Err(self.mismatch(opcode, &[left, right])),
        }
    }

    // ---- Control flow ----

    /// Absolute target of a jump, relative to the instruction after it.
    fn jump_target(&self, instr: &Instruction) -> Result<usize, RuntimeError> {
        let Operand::Jump(offset) = instr.operand else {
            return Err(self.invalid_operand(instr));
        };
        let target = self.pc as i64 + offset as i64;
        if target < 0 || target >= self.program.instructions.len() as i64 {
            return Err(RuntimeError::InvalidJump {
                at: self.current,
                target,
            });
        }
        Ok(target as usize)
    }

    fn exec_call(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let Operand::Call(index) = instr.operand else {
            return Err(self.invalid_operand(instr));
        };
        let function = *self
            .functions
            .get(&index)
            .ok_or(RuntimeError::UnknownFunction {
                at: self.current,
                index,
            })?;

        if function.entry >= self.program.instructions.len() {
            return Err(RuntimeError::InvalidJump {
                at: self.current,
                target: function.entry as i64,
            });
        }
        if self.stack.len() < function.arity {
            return Err(RuntimeError::StackUnderflow { at: self.current });
        }
        if self.frames.len() >= self.options.stack_capacity {
            return Err(RuntimeError::StackOverflow { at: self.current });
        }

        let fresh = vec![Value::Null; self.options.variable_slots];
        self.frames.push(CallFrame {
            return_pc: self.pc,
            stack_base: self.stack.len() - function.arity,
            saved_variables: std::mem::replace(&mut self.variables, fresh),
        });
        debug!(
            "call function {index} at instruction {} (depth {})",
            function.entry,
            self.frames.len()
        );
        self.pc = function.entry;
        Ok(())
    }

    fn exec_return(&mut self) -> Result<(), RuntimeError> {
        let Some(frame) = self.frames.pop() else {
            debug!("top-level return at instruction {}", self.current);
            self.state = VmState::Halted;
            return Ok(());
        };

        let result = if self.stack.len() > frame.stack_base {
            self.pop()?
        } else {
            Value::Null
        };
        self.stack.truncate(frame.stack_base);
        self.variables = frame.saved_variables;
        self.pc = frame.return_pc;
        self.push(result)
    }

    // ---- Output and host interaction ----

    fn render(&self, value: Value) -> Result<String, RuntimeError> {
        let text = match value {
            Value::Double(d) => format!("{d:.6}"),
            Value::Int(i) => i.to_string(),
            Value::Str(index) => self.object_text(index)?.to_string(),
            Value::Bool(true) => "true".to_string(),
            Value::Bool(false) => "false".to_string(),
            Value::Null => "null".to_string(),
        };
        Ok(text)
    }

    fn exec_print(&mut self) -> Result<(), RuntimeError> {
        let value = self.pop()?;
        let text = self.render(value)?;
        writeln!(self.output, "{text}").map_err(|e| RuntimeError::Output {
            at: self.current,
            message: e.to_string(),
        })
    }

    fn exec_grab(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let (Operand::Index(index) | Operand::Text(index)) = instr.operand else {
            return Err(self.invalid_operand(instr));
        };
        let module = self
            .program
            .objects
            .get(index as usize)
            .ok_or(RuntimeError::ConstantOutOfRange {
                at: self.current,
                index,
            })?;
        info!("grab '{module}'");
        warn!("module loading is not supported; '{module}' was not loaded");
        Ok(())
    }

    fn exec_builtin_log(&mut self, opcode: Opcode, level: log::Level) -> Result<(), RuntimeError> {
        let value = self.pop()?;
        let Value::Str(index) = value else {
            return Err(self.mismatch(opcode, &[value]));
        };
        let text = self.object_text(index)?;
        log::log!(target: BUILTIN_LOG_TARGET, level, "{text}");
        Ok(())
    }
}
