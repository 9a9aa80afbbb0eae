//! Compiler error types, one per pipeline stage. Each stage's error
//! keeps position information specific to that stage rather than reusing
//! a single generic error type.

use std::fmt;

use crate::lexer::LexError;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    Lex(LexError),
    UnexpectedToken { expected: String, found: String, line: usize, column: usize },
    UnexpectedEof { expected: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex(e) => write!(f, "{e}"),
            ParseError::UnexpectedToken { expected, found, line, column } => {
                write!(f, "{line}:{column}: expected {expected}, found {found}")
            }
            ParseError::UnexpectedEof { expected } => {
                write!(f, "unexpected end of input, expected {expected}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lex(e)
    }
}

/// One semantic-analysis or code-generation defect found while walking
/// the parse tree. Carries the source line so diagnostics stay useful
/// even though all errors for a compile are collected, not stopped-at.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticError {
    pub line: usize,
    pub message: String,
}

impl SemanticError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        SemanticError { line, message: message.into() }
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for SemanticError {}

/// The full collected diagnostic list from one compile. Non-empty means
/// the compile refused to emit an object program (§7).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemanticErrors(pub Vec<SemanticError>);

impl SemanticErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, err: SemanticError) {
        self.0.push(err);
    }
}

impl fmt::Display for SemanticErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SemanticErrors {}

/// Top-level error a `compile_*` entry point can return.
#[derive(Debug)]
pub enum CompileError {
    Io(std::io::Error),
    Parse(ParseError),
    Semantic(SemanticErrors),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Io(e) => write!(f, "{e}"),
            CompileError::Parse(e) => write!(f, "syntax error: {e}"),
            CompileError::Semantic(e) => write!(f, "semantic error(s):\n{e}"),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<std::io::Error> for CompileError {
    fn from(e: std::io::Error) -> Self {
        CompileError::Io(e)
    }
}

impl From<ParseError> for CompileError {
    fn from(e: ParseError) -> Self {
        CompileError::Parse(e)
    }
}

impl From<SemanticErrors> for CompileError {
    fn from(e: SemanticErrors) -> Self {
        CompileError::Semantic(e)
    }
}
