//! Error types for the L# compiler.

use std::fmt;

use thiserror::Error;

/// Fatal errors that stop bytecode generation, plus output I/O failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The generator has no lowering for this node kind.
    #[error("unsupported node: {0}")]
    UnsupportedNode(&'static str),

    /// A binary operator symbol outside `+ - * /`.
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    /// An identifier with no symbol in scope.
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),

    /// An identifier that names a function where a value was expected.
    #[error("'{0}' is a function, not a variable")]
    NotAVariable(String),

    /// A builtin called with the wrong number of arguments.
    #[error("builtin '{name}' takes 1 argument, got {found}")]
    BuiltinArity { name: String, found: usize },

    /// More variable bindings than the VM has slots.
    #[error("too many variables: at most {limit} bindings per program")]
    TooManyVariables { limit: u32 },

    /// The bytecode file could not be written.
    #[error("cannot write '{path}': {message}")]
    Io { path: String, message: String },
}

/// A recoverable error carried through the AST as an error node.
///
/// The parser never aborts; each malformed statement becomes one of these
/// and generation keeps going past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub code: u32,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} (E{:03})",
            self.line, self.column, self.message, self.code
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_operator() {
        let e = CompileError::UnknownOperator("%".to_string());
        assert_eq!(e.to_string(), "unknown operator '%'");
    }

    #[test]
    fn display_builtin_arity() {
        let e = CompileError::BuiltinArity {
            name: "info".to_string(),
            found: 2,
        };
        assert_eq!(e.to_string(), "builtin 'info' takes 1 argument, got 2");
    }

    #[test]
    fn display_io() {
        let e = CompileError::Io {
            path: "out.lsb".to_string(),
            message: "denied".to_string(),
        };
        assert_eq!(e.to_string(), "cannot write 'out.lsb': denied");
    }

    #[test]
    fn display_diagnostic() {
        let d = Diagnostic {
            message: "expected closing parenthesis".to_string(),
            line: 3,
            column: 7,
            code: 5,
        };
        assert_eq!(d.to_string(), "3:7: expected closing parenthesis (E005)");
    }
}
