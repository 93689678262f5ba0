//! Tokenizer for L# source text.
//!
//! The lexer never fails. Malformed input produces `TokenKind::Error`
//! tokens whose text is the message, and the parser turns those into
//! error nodes.

/// Token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Grab,
    Contract,
    Is,
    Return,
    /// A type name: `number`, `text`, `bit`, `numbers`, `texts`, `bits`.
    Type,
    Identifier,
    Number,
    String,
    On,
    Off,
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Period,
    Comma,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    /// A backtick. Template strings are not lexed further.
    TemplateStart,
    Error,
    Eof,
}

/// A token with its text and 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

fn keyword(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "grab" => TokenKind::Grab,
        "contract" => TokenKind::Contract,
        "is" => TokenKind::Is,
        "return" => TokenKind::Return,
        "number" | "text" | "bit" | "numbers" | "texts" | "bits" => TokenKind::Type,
        "on" => TokenKind::On,
        "off" => TokenKind::Off,
        _ => return None,
    };
    Some(kind)
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek().filter(|&c| pred(c)) {
            out.push(c);
            self.bump();
        }
        out
    }

    /// Skip whitespace and `/* */` comments. Returns an error message for
    /// an unterminated comment.
    fn skip_trivia(&mut self) -> Result<(), &'static str> {
        loop {
            self.take_while(char::is_whitespace);
            if self.peek() == Some('/') && self.peek_at(1) == Some('*') {
                self.bump();
                self.bump();
                loop {
                    match self.peek() {
                        None => return Err("unterminated comment"),
                        Some('*') if self.peek_at(1) == Some('/') => {
                            self.bump();
                            self.bump();
                            break;
                        }
                        Some(_) => {
                            self.bump();
                        }
                    }
                }
                continue;
            }
            return Ok(());
        }
    }

    fn next_token(&mut self) -> Token {
        let trivia = self.skip_trivia();
        let (line, column) = (self.line, self.column);
        let token = |kind, text: String| Token {
            kind,
            text,
            line,
            column,
        };

        if let Err(message) = trivia {
            return token(TokenKind::Error, message.to_string());
        }

        let Some(c) = self.peek() else {
            return token(TokenKind::Eof, String::new());
        };

        if c.is_ascii_alphabetic() {
            let word = self.take_while(is_identifier_char);
            let kind = keyword(&word).unwrap_or(TokenKind::Identifier);
            return token(kind, word);
        }

        if c.is_ascii_digit() || c == '.' {
            let literal = self.take_while(|c| c.is_ascii_digit() || c == '.');
            if !literal.bytes().any(|b| b.is_ascii_digit()) {
                // A lone period. Give back anything after the first dot.
                self.pos -= literal.len() - 1;
                self.column -= literal.len() - 1;
                return token(TokenKind::Period, ".".to_string());
            }
            if literal.matches('.').count() > 1 {
                return token(TokenKind::Error, "invalid number format".to_string());
            }
            return token(TokenKind::Number, literal);
        }

        self.bump();
        let kind = match c {
            '\'' => {
                let text = self.take_while(|c| c != '\'');
                if self.bump().is_none() {
                    return token(TokenKind::Error, "unterminated string".to_string());
                }
                return token(TokenKind::String, text);
            }
            '`' => TokenKind::TemplateStart,
            '=' => TokenKind::Assign,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            ',' => TokenKind::Comma,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            '[' => TokenKind::OpenBracket,
            ']' => TokenKind::CloseBracket,
            other => {
                return token(TokenKind::Error, format!("unexpected character '{other}'"));
            }
        };
        token(kind, c.to_string())
    }
}

/// Tokenize a whole source text. The last token is always `Eof`.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = Lexer {
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
        column: 1,
    };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_source() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("   \n\t "), vec![TokenKind::Eof]);
    }

    #[test]
    fn declaration() {
        let tokens = tokenize("number x = 5");
        let summary: Vec<_> = tokens.iter().map(|t| (t.kind, t.text.as_str())).collect();
        assert_eq!(
            summary,
            vec![
                (TokenKind::Type, "number"),
                (TokenKind::Identifier, "x"),
                (TokenKind::Assign, "="),
                (TokenKind::Number, "5"),
                (TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn keywords_and_bits() {
        assert_eq!(
            kinds("grab contract is return on off texts"),
            vec![
                TokenKind::Grab,
                TokenKind::Contract,
                TokenKind::Is,
                TokenKind::Return,
                TokenKind::On,
                TokenKind::Off,
                TokenKind::Type,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn identifiers_may_contain_dashes() {
        let tokens = tokenize("my-var_2");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "my-var_2");
    }

    #[test]
    fn operators_and_punctuation() {
        assert_eq!(
            kinds("= + - * / . , ( ) [ ] `"),
            vec![
                TokenKind::Assign,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Period,
                TokenKind::Comma,
                TokenKind::OpenParen,
                TokenKind::CloseParen,
                TokenKind::OpenBracket,
                TokenKind::CloseBracket,
                TokenKind::TemplateStart,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn decimal_numbers() {
        let tokens = tokenize("3.25 .5");
        assert_eq!(tokens[0].text, "3.25");
        assert_eq!(tokens[1].kind, TokenKind::Number);
        assert_eq!(tokens[1].text, ".5");
    }

    #[test]
    fn two_decimal_points_is_an_error() {
        let tokens = tokenize("1.2.3");
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].text, "invalid number format");
    }

    #[test]
    fn lone_periods_between_identifiers() {
        assert_eq!(
            kinds("io.log"),
            vec![
                TokenKind::Identifier,
                TokenKind::Period,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn string_literal_strips_quotes() {
        let tokens = tokenize("'hello world'");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, "hello world");
    }

    #[test]
    fn unterminated_string() {
        let tokens = tokenize("'oops");
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].text, "unterminated string");
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("/* a\ncomment */ x /* another */"),
            vec![TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_comment() {
        let tokens = tokenize("x /* never closed");
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens[1].text, "unterminated comment");
        assert_eq!(tokens[2].kind, TokenKind::Eof);
    }

    #[test]
    fn positions_are_tracked() {
        let tokens = tokenize("a\n  bb = 1");
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
        assert_eq!((tokens[2].line, tokens[2].column), (2, 6));
        assert_eq!((tokens[3].line, tokens[3].column), (2, 8));
    }

    #[test]
    fn unexpected_character() {
        let tokens = tokenize("%");
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].text, "unexpected character '%'");
    }
}
