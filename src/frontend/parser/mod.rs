mod expr;
mod program;
mod stmt;

use super::lexer::{tokenize, Token, TokenKind};
use crate::error::{LexerError, ParserError};

/// Lexemes accepted between an assignment target and its value.
pub(crate) const ASSIGNMENT_SYMBOLS: &[&str] = &[super::lexer::ARROW, ":=", "="];

/// Keywords that end a relaxed statement run.
const STOP_KEYWORDS: &[&str] = &["end", "else", "until"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserConfig {
    /// Reject relaxed blocks and tolerant `let`/`declare` lines.
    pub strict: bool,
}

pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
    config: ParserConfig,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, LexerError> {
        Self::with_config(source, ParserConfig::default())
    }

    pub fn with_config(source: &str, config: ParserConfig) -> Result<Self, LexerError> {
        Ok(Self::from_tokens(tokenize(source)?, config))
    }

    pub fn from_tokens(mut tokens: Vec<Token>, config: ParserConfig) -> Self {
        if !tokens.last().map_or(false, Token::is_eof) {
            let (line, column) = tokens
                .last()
                .map_or((1, 1), |t| (t.line, t.column + t.lexeme.chars().count()));
            tokens.push(Token::new(TokenKind::Eof, "", line, column));
        }
        Parser {
            tokens,
            index: 0,
            config,
        }
    }

    pub fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    pub fn peek_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.index + offset).min(last)]
    }

    pub fn previous(&self) -> Option<&Token> {
        self.index.checked_sub(1).map(|i| &self.tokens[i])
    }

    pub fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.is_eof() {
            self.index += 1;
        }
        token
    }

    pub fn at_end(&self) -> bool {
        self.peek().is_eof()
    }

    pub fn check_keyword(&self, word: &str) -> bool {
        self.peek().is_keyword(word)
    }

    pub fn check_any_keyword(&self, words: &[&str]) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Keyword && words.contains(&token.lexeme.as_str())
    }

    pub fn check_symbol(&self, symbol: &str) -> bool {
        self.peek().is_symbol(symbol)
    }

    pub fn check_identifier(&self) -> bool {
        self.peek().kind == TokenKind::Identifier
    }

    pub fn match_keyword(&mut self, word: &str) -> bool {
        if self.check_keyword(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn match_symbol(&mut self, symbol: &str) -> bool {
        if self.check_symbol(symbol) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect_keyword(&mut self, word: &str, message: &str) -> Result<Token, ParserError> {
        if self.check_keyword(word) {
            Ok(self.advance())
        } else {
            Err(self.error(message))
        }
    }

    pub fn expect_symbol(&mut self, symbol: &str, message: &str) -> Result<Token, ParserError> {
        if self.check_symbol(symbol) {
            Ok(self.advance())
        } else {
            Err(self.error(message))
        }
    }

    pub fn expect_identifier(&mut self, message: &str) -> Result<Token, ParserError> {
        if self.check_identifier() {
            Ok(self.advance())
        } else {
            Err(self.error(message))
        }
    }

    /// Error at the current token, naming what was found there.
    pub fn error(&self, message: &str) -> ParserError {
        let token = self.peek();
        let found = if token.is_eof() {
            "end of input".to_string()
        } else {
            format!("'{}'", token.lexeme)
        };
        ParserError::new(
            format!("{}, found {}", message, found),
            token.line,
            token.column,
        )
    }

    /// Skip every remaining token on the current line.
    fn skip_line(&mut self, line: usize) -> Vec<Token> {
        let mut skipped = Vec::new();
        while !self.at_end() && self.peek().line == line {
            skipped.push(self.advance());
        }
        skipped
    }
}

#[cfg(test)]
mod tests;
