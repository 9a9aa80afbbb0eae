//! Hand-rolled lexer. Produces a flat token stream with line/column
//! positions; the parser consumes it with simple lookahead.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // literals / identifiers
    Ident(String),
    IntLit(i64),
    FloatLit(f64),
    StringLit(String),

    // keywords
    Programa,
    Var,
    Main,
    End,
    Void,
    Int,
    Float,
    If,
    Else,
    While,
    Do,
    Print,
    Return,

    // punctuation
    Semi,
    Colon,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Gt,
    Lt,
    Neq,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(s) => write!(f, "identifier '{s}'"),
            TokenKind::IntLit(n) => write!(f, "integer literal '{n}'"),
            TokenKind::FloatLit(n) => write!(f, "float literal '{n}'"),
            TokenKind::StringLit(s) => write!(f, "string literal \"{s}\""),
            TokenKind::Eof => write!(f, "end of input"),
            other => write!(f, "'{other:?}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for LexError {}

pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0usize;
    let mut line = 1usize;
    let mut col = 1usize;

    macro_rules! advance {
        () => {{
            if chars[i] == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
            i += 1;
        }};
    }

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            advance!();
            continue;
        }

        if c == '/' && i + 1 < chars.len() && chars[i + 1] == '/' {
            while i < chars.len() && chars[i] != '\n' {
                advance!();
            }
            continue;
        }

        let start_line = line;
        let start_col = col;

        if c.is_ascii_digit() {
            let mut text = String::new();
            let mut is_float = false;
            while i < chars.len() && chars[i].is_ascii_digit() {
                text.push(chars[i]);
                advance!();
            }
            if i < chars.len() && chars[i] == '.' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit() {
                is_float = true;
                text.push('.');
                advance!();
                while i < chars.len() && chars[i].is_ascii_digit() {
                    text.push(chars[i]);
                    advance!();
                }
            }
            let kind = if is_float {
                TokenKind::FloatLit(text.parse().map_err(|_| LexError {
                    message: format!("invalid float literal '{text}'"),
                    line: start_line,
                    column: start_col,
                })?)
            } else {
                TokenKind::IntLit(text.parse().map_err(|_| LexError {
                    message: format!("invalid integer literal '{text}'"),
                    line: start_line,
                    column: start_col,
                })?)
            };
            tokens.push(Token { kind, line: start_line, column: start_col });
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let mut text = String::new();
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                text.push(chars[i]);
                advance!();
            }
            let kind = match text.as_str() {
                "programa" => TokenKind::Programa,
                "var" => TokenKind::Var,
                "main" => TokenKind::Main,
                "end" => TokenKind::End,
                "void" => TokenKind::Void,
                "int" => TokenKind::Int,
                "float" => TokenKind::Float,
                "if" => TokenKind::If,
                "else" => TokenKind::Else,
                "while" => TokenKind::While,
                "do" => TokenKind::Do,
                "print" => TokenKind::Print,
                "return" => TokenKind::Return,
                _ => TokenKind::Ident(text),
            };
            tokens.push(Token { kind, line: start_line, column: start_col });
            continue;
        }

        if c == '"' {
            advance!();
            let mut text = String::new();
            loop {
                if i >= chars.len() {
                    return Err(LexError {
                        message: "unterminated string literal".to_string(),
                        line: start_line,
                        column: start_col,
                    });
                }
                if chars[i] == '"' {
                    advance!();
                    break;
                }
                text.push(chars[i]);
                advance!();
            }
            tokens.push(Token { kind: TokenKind::StringLit(text), line: start_line, column: start_col });
            continue;
        }

        let kind = match c {
            ';' => {
                advance!();
                TokenKind::Semi
            }
            ':' => {
                advance!();
                TokenKind::Colon
            }
            ',' => {
                advance!();
                TokenKind::Comma
            }
            '(' => {
                advance!();
                TokenKind::LParen
            }
            ')' => {
                advance!();
                TokenKind::RParen
            }
            '{' => {
                advance!();
                TokenKind::LBrace
            }
            '}' => {
                advance!();
                TokenKind::RBrace
            }
            '[' => {
                advance!();
                TokenKind::LBracket
            }
            ']' => {
                advance!();
                TokenKind::RBracket
            }
            '=' => {
                advance!();
                TokenKind::Assign
            }
            '+' => {
                advance!();
                TokenKind::Plus
            }
            '-' => {
                advance!();
                TokenKind::Minus
            }
            '*' => {
                advance!();
                TokenKind::Star
            }
            '/' => {
                advance!();
                TokenKind::Slash
            }
            '>' => {
                advance!();
                TokenKind::Gt
            }
            '<' => {
                advance!();
                TokenKind::Lt
            }
            '!' => {
                advance!();
                if i < chars.len() && chars[i] == '=' {
                    advance!();
                    TokenKind::Neq
                } else {
                    return Err(LexError {
                        message: "expected '=' after '!'".to_string(),
                        line: start_line,
                        column: start_col,
                    });
                }
            }
            other => {
                return Err(LexError {
                    message: format!("unexpected character '{other}'"),
                    line: start_line,
                    column: start_col,
                });
            }
        };
        tokens.push(Token { kind, line: start_line, column: start_col });
    }

    tokens.push(Token { kind: TokenKind::Eof, line, column: col });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_keywords_and_punctuation() {
        let toks = tokenize("programa P; var a:int; main { } end").unwrap();
        let kinds: Vec<_> = toks.iter().map(|t| t.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Programa,
                TokenKind::Ident("P".to_string()),
                TokenKind::Semi,
                TokenKind::Var,
                TokenKind::Ident("a".to_string()),
                TokenKind::Colon,
                TokenKind::Int,
                TokenKind::Semi,
                TokenKind::Main,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::End,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenizes_float_and_int_literals_distinctly() {
        let toks = tokenize("3 3.0").unwrap();
        assert_eq!(toks[0].kind, TokenKind::IntLit(3));
        assert_eq!(toks[1].kind, TokenKind::FloatLit(3.0));
    }

    #[test]
    fn tokenizes_neq_and_rejects_bare_bang() {
        assert_eq!(tokenize("!=").unwrap()[0].kind, TokenKind::Neq);
        assert!(tokenize("!").is_err());
    }

    #[test]
    fn reports_line_and_column_on_error() {
        let err = tokenize("a\n  $").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 3);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(tokenize("\"abc").is_err());
    }
}
