//! Recursive-descent parser: tokens → AST.
//!
//! Grammar:
//!
//! ```text
//! program     := statement*
//! statement   := 'grab' IDENT
//!              | TYPE IDENT ('=' expression)?
//!              | IDENT '=' expression
//!              | 'return' expression?
//!              | 'contract' IDENT '[' declaration* ']'
//!              | expression
//! expression  := term (('+' | '-') term)*
//! term        := factor (('*' | '/') factor)*
//! factor      := call | NUMBER | IDENT | '(' expression ')' | STRING
//!              | 'on' | 'off' | '[' (expression (',' expression)*)? ']'
//! call        := IDENT ('.' IDENT)* '(' (expression (',' expression)*)? ')'
//! ```
//!
//! Parsing never fails. A malformed statement becomes a `Node::Error`
//! carrying a [`Diagnostic`], and the parser moves on.

use crate::ast::{Node, Program};
use crate::error::Diagnostic;
use crate::lexer::{tokenize, Token, TokenKind};

/// Parse source text into a program.
pub fn parse(source: &str) -> Program {
    Parser::new(tokenize(source)).parse_program()
}

/// Parser state: the token stream and a cursor into it.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    eof: Token,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let (line, column) = tokens
            .last()
            .map(|t| (t.line, t.column))
            .unwrap_or((1, 1));
        Self {
            tokens,
            pos: 0,
            eof: Token {
                kind: TokenKind::Eof,
                text: String::new(),
                line,
                column,
            },
        }
    }

    fn peek(&self) -> &Token {
        self.peek_ahead(0)
    }

    fn peek_ahead(&self, n: usize) -> &Token {
        self.tokens.get(self.pos + n).unwrap_or(&self.eof)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn error(&self, message: &str, code: u32) -> Node {
        let token = self.peek();
        Node::Error(Diagnostic {
            message: message.to_string(),
            line: token.line,
            column: token.column,
            code,
        })
    }

    /// Parse every statement until end of input.
    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.at(TokenKind::Eof) {
            let start = self.pos;
            match self.parse_statement() {
                Some(node) => statements.push(node),
                None => {
                    statements.push(self.error("failed to parse statement", 10));
                    self.advance();
                    continue;
                }
            }
            if self.pos == start {
                self.advance();
            }
        }
        log::debug!("parsed {} statement(s)", statements.len());
        Program::new(statements)
    }

    fn parse_statement(&mut self) -> Option<Node> {
        let (kind, next) = (self.peek().kind, self.peek_ahead(1).kind);
        match kind {
            TokenKind::Grab => Some(self.parse_grab()),
            TokenKind::Type => Some(self.parse_declaration()),
            TokenKind::Identifier if next == TokenKind::Assign => Some(self.parse_assignment()),
            TokenKind::Return => Some(self.parse_return()),
            TokenKind::Contract => Some(self.parse_contract()),
            _ => self.parse_expression(),
        }
    }

    fn parse_grab(&mut self) -> Node {
        self.advance();
        match self.eat(TokenKind::Identifier) {
            Some(module) => Node::Grab { module: module.text },
            None => self.error("expected identifier after grab", 18),
        }
    }

    fn parse_declaration(&mut self) -> Node {
        let Some(type_token) = self.eat(TokenKind::Type) else {
            return self.error("expected type in declaration", 7);
        };
        let Some(name) = self.eat(TokenKind::Identifier) else {
            return self.error("expected identifier in declaration", 8);
        };
        let value = if self.eat(TokenKind::Assign).is_some() {
            match self.parse_expression() {
                Some(value) => Some(Box::new(value)),
                None => return self.error("expected expression after '=' in declaration", 9),
            }
        } else {
            None
        };
        Node::Declaration {
            type_name: type_token.text,
            name: name.text,
            value,
        }
    }

    fn parse_assignment(&mut self) -> Node {
        let name = self.advance();
        self.advance();
        match self.parse_expression() {
            Some(value) => Node::Assignment {
                name: name.text,
                value: Box::new(value),
            },
            None => self.error("expected expression in assignment", 3),
        }
    }

    fn parse_return(&mut self) -> Node {
        self.advance();
        if self.at(TokenKind::Eof) {
            return Node::Return(None);
        }
        match self.parse_expression() {
            Some(value) => Node::Return(Some(Box::new(value))),
            None => self.error("expected expression after 'return'", 12),
        }
    }

    fn parse_contract(&mut self) -> Node {
        self.advance();
        let Some(name) = self.eat(TokenKind::Identifier) else {
            return self.error("expected contract name", 14);
        };
        if self.eat(TokenKind::OpenBracket).is_none() {
            return self.error("expected '[' after contract name", 15);
        }
        let mut declarations = Vec::new();
        while !self.at(TokenKind::CloseBracket) && !self.at(TokenKind::Eof) {
            if !self.at(TokenKind::Type) {
                return self.error("expected declaration in contract", 16);
            }
            declarations.push(self.parse_declaration());
        }
        if self.eat(TokenKind::CloseBracket).is_none() {
            return self.error("expected ']' to close contract", 17);
        }
        Node::Contract {
            name: name.text,
            declarations,
        }
    }

    fn parse_expression(&mut self) -> Option<Node> {
        let mut left = self.parse_term()?;
        while self.at(TokenKind::Plus) || self.at(TokenKind::Minus) {
            let op = self.advance().text;
            let right = self
                .parse_term()
                .unwrap_or_else(|| self.error("expected operand after operator", 4));
            left = Node::binary(&op, left, right);
        }
        Some(left)
    }

    fn parse_term(&mut self) -> Option<Node> {
        let mut left = self.parse_factor()?;
        while self.at(TokenKind::Star) || self.at(TokenKind::Slash) {
            let op = self.advance().text;
            let right = self
                .parse_factor()
                .unwrap_or_else(|| self.error("expected operand after operator", 4));
            left = Node::binary(&op, left, right);
        }
        Some(left)
    }

    fn parse_factor(&mut self) -> Option<Node> {
        let (kind, next) = (self.peek().kind, self.peek_ahead(1).kind);
        let node = match kind {
            TokenKind::Identifier
                if matches!(next, TokenKind::Period | TokenKind::OpenParen) =>
            {
                self.parse_call()
            }
            TokenKind::Number => {
                let token = self.advance();
                match token.text.parse::<f64>() {
                    Ok(value) => Node::Number(value),
                    Err(_) => Node::Error(Diagnostic {
                        message: format!("invalid number '{}'", token.text),
                        line: token.line,
                        column: token.column,
                        code: 22,
                    }),
                }
            }
            TokenKind::Identifier => Node::Identifier(self.advance().text),
            TokenKind::String => Node::Text(self.advance().text),
            TokenKind::On => {
                self.advance();
                Node::Bit(true)
            }
            TokenKind::Off => {
                self.advance();
                Node::Bit(false)
            }
            TokenKind::OpenParen => {
                self.advance();
                let Some(inner) = self.parse_expression() else {
                    return Some(self.error("expected expression", 4));
                };
                if self.eat(TokenKind::CloseParen).is_none() {
                    return Some(self.error("expected closing parenthesis", 5));
                }
                inner
            }
            TokenKind::OpenBracket => self.parse_array(),
            TokenKind::Error => {
                let token = self.advance();
                Node::Error(Diagnostic {
                    message: token.text,
                    line: token.line,
                    column: token.column,
                    code: 23,
                })
            }
            _ => return None,
        };
        Some(node)
    }

    /// Comma-separated expressions up to `close`, which is consumed.
    fn parse_list(&mut self, close: TokenKind) -> Result<Vec<Node>, ()> {
        let mut items = Vec::new();
        if self.eat(close).is_some() {
            return Ok(items);
        }
        loop {
            items.push(self.parse_expression().ok_or(())?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.eat(close).map(|_| items).ok_or(())
    }

    fn parse_call(&mut self) -> Node {
        let mut name = self.advance().text;
        while self.eat(TokenKind::Period).is_some() {
            match self.eat(TokenKind::Identifier) {
                Some(part) => {
                    name.push('.');
                    name.push_str(&part.text);
                }
                None => return self.error("expected identifier after period", 19),
            }
        }
        if self.eat(TokenKind::OpenParen).is_none() {
            return self.error("expected '(' after function name", 21);
        }
        match self.parse_list(TokenKind::CloseParen) {
            Ok(arguments) => Node::Call { name, arguments },
            Err(()) => self.error("expected closing parenthesis in call", 6),
        }
    }

    fn parse_array(&mut self) -> Node {
        self.advance();
        match self.parse_list(TokenKind::CloseBracket) {
            Ok(elements) => Node::Array(elements),
            Err(()) => self.error("expected ']' to close array literal", 7),
        }
    }
}
