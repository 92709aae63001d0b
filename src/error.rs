use thiserror::Error;

/// Raised for input the tokenizer cannot make sense of. The only case is
/// a string literal that runs to the end of the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unterminated string literal starting on line {line}")]
pub struct LexerError {
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {line}, column {column}")]
pub struct ParserError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParserError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        ParserError {
            message: message.into(),
            line,
            column,
        }
    }
}

/// Failure of an external grammar corrector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("grammar correction failed: {message}")]
pub struct CorrectionError {
    pub message: String,
}

impl CorrectionError {
    pub fn new(message: impl Into<String>) -> Self {
        CorrectionError {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzerError {
    #[error("lexer error: {0}")]
    Lexer(#[from] LexerError),

    #[error("parse error: {0}")]
    Parser(#[from] ParserError),
}

impl AnalyzerError {
    /// Line and column of the failure. Lexer errors only know the line.
    pub fn position(&self) -> (usize, Option<usize>) {
        match self {
            AnalyzerError::Lexer(e) => (e.line, None),
            AnalyzerError::Parser(e) => (e.line, Some(e.column)),
        }
    }
}
