use crate::error::LexerError;
use logos::Logos;
use serde::Serialize;
use std::fmt;

/// Words that lex as [`TokenKind::Keyword`]. Words longer than one
/// character are matched case-insensitively.
pub const RESERVED_WORDS: &[&str] = &[
    "algorithm",
    "algoritmo",
    "procedure",
    "procedimiento",
    "function",
    "returns",
    "begin",
    "end",
    "for",
    "to",
    "do",
    "while",
    "repeat",
    "until",
    "if",
    "then",
    "else",
    "and",
    "or",
    "not",
    "call",
    "length",
    "null",
    "class",
    "mod",
    "div",
    "return",
    "print",
    "t",
    "f",
    "true",
    "false",
    "new",
    "array",
    "swap",
    "with",
    "let",
    "declare",
];

/// The canonical assignment arrow. Every arrow variant lexes to this.
pub const ARROW: &str = "🡨";

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
enum RawToken {
    #[token("\n")]
    Newline,

    #[regex(r"►[^\n]*", allow_greedy = true)]
    Comment,

    #[regex(r"[\p{L}_][\p{L}\p{N}_]*")]
    Word,

    #[regex(r"[0-9]+")]
    Number,

    #[regex(r#""[^"]*""#)]
    String,

    #[regex(r#""[^"]*"#, allow_greedy = true)]
    UnterminatedString,

    #[token("∞")]
    Infinity,

    #[token("🡨")]
    #[token("←")]
    #[token("↨")]
    #[token("<-")]
    Arrow,

    #[token(":=")]
    ColonAssign,

    #[token("<=")]
    #[token("≤")]
    Lte,

    #[token(">=")]
    #[token("≥")]
    Gte,

    #[token("<>")]
    #[token("≠")]
    #[token("!=")]
    Neq,

    #[token("..")]
    Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Identifier,
    Number,
    Keyword,
    Symbol,
    String,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.lexeme == word
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Symbol && self.lexeme == symbol
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}({:?}) {}:{}",
            self.kind, self.lexeme, self.line, self.column
        )
    }
}

fn classify_word(word: &str) -> (TokenKind, String) {
    let lexeme = if word.chars().count() > 1 {
        word.to_lowercase()
    } else {
        word.to_string()
    };
    if RESERVED_WORDS.contains(&lexeme.as_str()) {
        (TokenKind::Keyword, lexeme)
    } else {
        (TokenKind::Identifier, lexeme)
    }
}

/// Tokenize the whole input. The result always ends with an `Eof` token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);
    let mut line = 1;
    let mut line_start = 0;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let slice = lexer.slice();
        let column = source[line_start..span.start].chars().count() + 1;

        match result {
            Ok(RawToken::Newline) => {
                line += 1;
                line_start = span.end;
            }
            Ok(RawToken::Comment) => {}
            Ok(RawToken::UnterminatedString) => return Err(LexerError { line }),
            Ok(RawToken::String) => {
                let content = &slice[1..slice.len() - 1];
                tokens.push(Token::new(TokenKind::String, content, line, column));
                // strings may span lines
                if let Some(offset) = slice.rfind('\n') {
                    line += slice.matches('\n').count();
                    line_start = span.start + offset + 1;
                }
            }
            Ok(RawToken::Word) => {
                let (kind, lexeme) = classify_word(slice);
                tokens.push(Token::new(kind, lexeme, line, column));
            }
            Ok(RawToken::Number) => {
                tokens.push(Token::new(TokenKind::Number, slice, line, column));
            }
            Ok(RawToken::Infinity) => {
                tokens.push(Token::new(TokenKind::Identifier, "infinity", line, column));
            }
            Ok(raw) => {
                let lexeme = match raw {
                    RawToken::Arrow => ARROW,
                    RawToken::ColonAssign => ":=",
                    RawToken::Lte => "<=",
                    RawToken::Gte => ">=",
                    RawToken::Neq => "<>",
                    _ => "..",
                };
                tokens.push(Token::new(TokenKind::Symbol, lexeme, line, column));
            }
            Err(()) => {
                for (offset, ch) in slice.char_indices() {
                    let at = span.start + offset;
                    if ch == '\n' {
                        line += 1;
                        line_start = at + 1;
                    } else if !ch.is_whitespace() {
                        let column = source[line_start..at].chars().count() + 1;
                        tokens.push(Token::new(TokenKind::Symbol, ch.to_string(), line, column));
                    }
                }
            }
        }
    }

    let column = source[line_start..].chars().count() + 1;
    tokens.push(Token::new(TokenKind::Eof, "", line, column));
    tracing::trace!(count = tokens.len(), "tokenized source");
    Ok(tokens)
}
