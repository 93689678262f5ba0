//! L# compiler: source text → bytecode.
//!
//! The pipeline is lexer → parser → AST → generator. Parsing never fails;
//! malformed statements travel through the AST as error nodes and come out
//! of [`compile`] as [`Diagnostic`]s next to the best-effort program.
//!
//! # Usage
//!
//! ```
//! use lsharp_compiler::compile_source;
//! use lsharp_common::Opcode;
//!
//! let compiled = compile_source("number x = 3 + 4").unwrap();
//! assert!(compiled.diagnostics.is_empty());
//! assert_eq!(compiled.program.instructions.last().map(|i| i.opcode), Some(Opcode::Halt));
//! ```

pub mod ast;
pub mod error;
pub mod generator;
pub mod lexer;
pub mod parser;
pub mod symbol_table;

pub use error::{CompileError, Diagnostic};
pub use generator::{compile, write, Compiled, MAX_VARIABLES};
pub use parser::parse;
pub use symbol_table::{SymbolKind, SymbolTable, SYMBOL_TABLE_CAPACITY};

/// Parse and compile source text in one step.
pub fn compile_source(source: &str) -> Result<Compiled, CompileError> {
    compile(&parse(source))
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The parser is total: any input yields a program, never a panic.
        #[test]
        fn parse_never_panics(source in "\\PC{0,64}") {
            let _ = parse(&source);
        }

        /// Every name resolves to the last slot inserted for it, no matter
        /// how many buckets the table has.
        #[test]
        fn lookup_returns_latest(
            capacity in 0usize..8,
            names in prop::collection::vec("[a-c]{1,2}", 1..40),
        ) {
            let mut table = SymbolTable::new(capacity);
            let mut latest = std::collections::HashMap::new();
            for (slot, name) in names.iter().enumerate() {
                table.insert(name, SymbolKind::Variable, slot as u32);
                latest.insert(name.clone(), slot as u32);
            }
            for (name, slot) in &latest {
                prop_assert_eq!(table.lookup(name).map(|s| s.index), Some(*slot));
            }
        }

        /// Sums of numeric literals compile to one load per literal and
        /// one add per operator.
        #[test]
        fn sums_compile_linearly(values in prop::collection::vec(0u32..1000, 1..20)) {
            let source = values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" + ");
            let compiled = compile_source(&source).unwrap();
            prop_assert_eq!(compiled.program.len(), values.len() * 2);
        }
    }
}
