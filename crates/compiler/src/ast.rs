//! Abstract syntax tree for L# programs.
//!
//! The tree is fully owned; every node exclusively owns its children.

use crate::error::Diagnostic;

/// A whole source file: statements in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Node>,
}

/// A statement or expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// `type name (= value)?`
    Declaration {
        type_name: String,
        name: String,
        value: Option<Box<Node>>,
    },
    /// `name = value`
    Assignment { name: String, value: Box<Node> },
    /// `return value?`
    Return(Option<Box<Node>>),
    /// `grab module`
    Grab { module: String },
    /// `contract Name [ declarations ]`
    Contract {
        name: String,
        declarations: Vec<Node>,
    },
    Number(f64),
    Text(String),
    Bit(bool),
    Identifier(String),
    /// `[ elements ]`
    Array(Vec<Node>),
    BinaryOp {
        op: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// `name(arguments)`. Dotted callees (`io.log`) keep the dots in `name`.
    Call { name: String, arguments: Vec<Node> },
    /// A parse error carried into the tree.
    Error(Diagnostic),
}

impl Node {
    /// Short name of the node kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Declaration { .. } => "declaration",
            Node::Assignment { .. } => "assignment",
            Node::Return(_) => "return",
            Node::Grab { .. } => "grab",
            Node::Contract { .. } => "contract definition",
            Node::Number(_) => "number literal",
            Node::Text(_) => "string literal",
            Node::Bit(_) => "bit literal",
            Node::Identifier(_) => "identifier",
            Node::Array(_) => "array literal",
            Node::BinaryOp { .. } => "binary operation",
            Node::Call { .. } => "function call",
            Node::Error(_) => "error",
        }
    }

    pub fn binary(op: &str, left: Node, right: Node) -> Node {
        Node::BinaryOp {
            op: op.to_string(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn call(name: &str, arguments: Vec<Node>) -> Node {
        Node::Call {
            name: name.to_string(),
            arguments,
        }
    }
}

impl Program {
    pub fn new(statements: Vec<Node>) -> Self {
        Self { statements }
    }

    /// Every error node in the tree, depth-first.
    pub fn errors(&self) -> Vec<&Diagnostic> {
        fn walk<'a>(node: &'a Node, out: &mut Vec<&'a Diagnostic>) {
            match node {
                Node::Error(d) => out.push(d),
                Node::Declaration { value, .. } => {
                    if let Some(v) = value {
                        walk(v, out);
                    }
                }
                Node::Return(Some(v)) => walk(v, out),
                Node::Assignment { value, .. } => walk(value, out),
                Node::Contract { declarations, .. } => {
                    declarations.iter().for_each(|n| walk(n, out))
                }
                Node::Array(items) | Node::Call { arguments: items, .. } => {
                    items.iter().for_each(|n| walk(n, out))
                }
                Node::BinaryOp { left, right, .. } => {
                    walk(left, out);
                    walk(right, out);
                }
                _ => {}
            }
        }
        let mut out = Vec::new();
        for statement in &self.statements {
            walk(statement, &mut out);
        }
        out
    }
}
