mod lexer;
mod parser;

pub use lexer::{tokenize, Token, TokenKind, ARROW, RESERVED_WORDS};
pub use parser::{Parser, ParserConfig};

use crate::ast::Program;
use crate::error::AnalyzerError;

/// Tokenize and parse with the default (relaxed) configuration.
pub fn parse(source: &str) -> Result<Program, AnalyzerError> {
    parse_with(source, ParserConfig::default())
}

pub fn parse_with(source: &str, config: ParserConfig) -> Result<Program, AnalyzerError> {
    let mut parser = Parser::with_config(source, config)?;
    Ok(parser.parse_program()?)
}
