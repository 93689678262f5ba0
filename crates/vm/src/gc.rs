//! Mark-and-sweep collection over the object table.
//!
//! Roots are the operand stack, the current variable slots and the slots
//! saved in every call frame. The constant map is weak: a constant whose
//! runtime copy is collected gets a fresh copy on its next LOAD_CONST.

use std::io::Write;

use log::debug;
use lsharp_common::Value;

use crate::heap::GcStats;
use crate::machine::VM;

fn relocate(value: &mut Value, relocation: &[Option<usize>]) {
    if let Value::Str(index) = value {
        if let Some(Some(new_index)) = relocation.get(*index) {
            *index = *new_index;
        }
    }
}

impl<W: Write> VM<W> {
    /// Run one full collection and rewrite every live string reference.
    pub fn collect_garbage(&mut self) -> GcStats {
        let roots = self
            .stack
            .iter()
            .chain(self.variables.iter())
            .chain(self.frames.iter().flat_map(|f| f.saved_variables.iter()));
        for value in roots {
            if let Some(index) = value.object_index() {
                self.objects.mark(index);
            }
        }

        let (relocation, stats) = self.objects.sweep();

        let roots = self
            .stack
            .iter_mut()
            .chain(self.variables.iter_mut())
            .chain(
                self.frames
                    .iter_mut()
                    .flat_map(|f| f.saved_variables.iter_mut()),
            );
        for value in roots {
            relocate(value, &relocation);
        }
        for constant in &mut self.constants {
            *constant = constant.and_then(|i| relocation.get(i).copied().flatten());
        }

        debug!("gc: {} live, {} freed", stats.live, stats.freed);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::VmOptions;
    use lsharp_common::Program;

    fn vm_with_pool(pool: &[&str]) -> VM<Vec<u8>> {
        let program = Program::new(pool.iter().map(|s| s.to_string()).collect(), vec![]);
        VM::with_output(program, VmOptions::default(), Vec::new())
    }

    #[test]
    fn unreferenced_objects_are_freed() {
        let mut vm = vm_with_pool(&["a", "b", "c"]);
        let stats = vm.collect_garbage();
        assert_eq!(stats, GcStats { live: 0, freed: 3 });
        assert!(vm.objects().is_empty());
        assert!(vm.constants.iter().all(Option::is_none));
    }

    #[test]
    fn roots_are_rewritten_after_compaction() {
        let mut vm = vm_with_pool(&["a", "b", "c"]);
        vm.stack.push(Value::Str(2));
        vm.variables[5] = Value::Str(1);
        let stats = vm.collect_garbage();
        assert_eq!(stats, GcStats { live: 2, freed: 1 });
        assert_eq!(vm.stack(), &[Value::Str(1)]);
        assert_eq!(vm.variables()[5], Value::Str(0));
        assert_eq!(vm.resolve(&vm.stack()[0]), Some("c"));
        assert_eq!(vm.resolve(&vm.variables()[5]), Some("b"));
        assert_eq!(vm.constants, vec![None, Some(0), Some(1)]);
    }

    #[test]
    fn saved_frame_slots_are_roots() {
        let mut vm = vm_with_pool(&["x", "y"]);
        vm.frames.push(crate::machine::CallFrame {
            return_pc: 0,
            stack_base: 0,
            saved_variables: vec![Value::Null, Value::Str(1)],
        });
        vm.collect_garbage();
        assert_eq!(vm.frames[0].saved_variables[1], Value::Str(0));
        assert_eq!(vm.objects().get(0), Some("y"));
    }

    #[test]
    fn shared_reference_survives_once() {
        let mut vm = vm_with_pool(&["s"]);
        vm.stack.push(Value::Str(0));
        vm.stack.push(Value::Str(0));
        let stats = vm.collect_garbage();
        assert_eq!(stats.live, 1);
        assert_eq!(vm.stack(), &[Value::Str(0), Value::Str(0)]);
    }

    #[test]
    fn collected_constant_is_rematerialized() {
        let mut vm = vm_with_pool(&["p", "q"]);
        vm.stack.push(Value::Str(1));
        vm.collect_garbage();
        // "p" is gone; loading it again appends a fresh copy.
        let index = vm.materialize(0).unwrap();
        assert_eq!(index, 1);
        assert_eq!(vm.objects().get(index), Some("p"));
        assert_eq!(vm.materialize(1), Ok(0));
    }
}
