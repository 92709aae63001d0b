use super::Parser;
use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::error::ParserError;
use crate::frontend::lexer::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Infix {
    Binary(BinaryOp),
    Range,
}

const PREFIX_BINDING_POWER: u8 = 17;

/// Additive expressions and tighter, used for `array of size n`.
const SIZE_BINDING_POWER: u8 = 11;

impl Parser {
    fn infix_binding_power(token: &Token) -> Option<(u8, u8, Infix)> {
        let op = match (token.kind, token.lexeme.as_str()) {
            (TokenKind::Symbol, "..") => return Some((1, 2, Infix::Range)),
            (TokenKind::Keyword, "or") => BinaryOp::Or,
            (TokenKind::Keyword, "and") => BinaryOp::And,
            (TokenKind::Symbol, "=") => BinaryOp::Eq,
            (TokenKind::Symbol, "<>") => BinaryOp::Neq,
            (TokenKind::Symbol, "<") => BinaryOp::Lt,
            (TokenKind::Symbol, "<=") => BinaryOp::Lte,
            (TokenKind::Symbol, ">") => BinaryOp::Gt,
            (TokenKind::Symbol, ">=") => BinaryOp::Gte,
            (TokenKind::Symbol, "+") => BinaryOp::Add,
            (TokenKind::Symbol, "-") => BinaryOp::Sub,
            (TokenKind::Symbol, "*") => BinaryOp::Mul,
            (TokenKind::Symbol, "/") => BinaryOp::Div,
            (TokenKind::Keyword, "div") => BinaryOp::IntDiv,
            (TokenKind::Keyword, "mod") => BinaryOp::Mod,
            (TokenKind::Symbol, "^") => BinaryOp::Pow,
            _ => return None,
        };

        let (l_bp, r_bp) = match op {
            BinaryOp::Or => (3, 4),
            BinaryOp::And => (5, 6),
            BinaryOp::Eq | BinaryOp::Neq => (7, 8),
            BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => (9, 10),
            BinaryOp::Add | BinaryOp::Sub => (11, 12),
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::IntDiv | BinaryOp::Mod => (13, 14),
            BinaryOp::Pow => (16, 15),
        };
        Some((l_bp, r_bp, Infix::Binary(op)))
    }

    fn prefix_operator(token: &Token) -> Option<UnaryOp> {
        match (token.kind, token.lexeme.as_str()) {
            (TokenKind::Symbol, "-") => Some(UnaryOp::Neg),
            (TokenKind::Symbol, "+") => Some(UnaryOp::Plus),
            (TokenKind::Keyword, "not") => Some(UnaryOp::Not),
            _ => None,
        }
    }

    pub fn parse_expression(&mut self, min_bp: u8) -> Result<Expr, ParserError> {
        let mut left = if let Some(op) = Self::prefix_operator(self.peek()) {
            let token = self.advance();
            let operand = self.parse_expression(PREFIX_BINDING_POWER)?;
            Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                token.line,
                token.column,
            )
        } else {
            self.parse_primary()?
        };

        while let Some((l_bp, r_bp, infix)) = Self::infix_binding_power(self.peek()) {
            if l_bp < min_bp {
                break;
            }
            let token = self.advance();
            let right = self.parse_expression(r_bp)?;
            let kind = match infix {
                Infix::Binary(op) => ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                Infix::Range => ExprKind::Range {
                    start: Box::new(left),
                    end: Box::new(right),
                },
            };
            left = Expr::new(kind, token.line, token.column);
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParserError> {
        let token = self.peek().clone();
        let (line, column) = (token.line, token.column);

        match token.kind {
            TokenKind::Number => {
                self.advance();
                let value = token.lexeme.parse::<i64>().map_err(|_| {
                    ParserError::new(
                        format!("number literal '{}' is out of range", token.lexeme),
                        line,
                        column,
                    )
                })?;
                Ok(Expr::new(ExprKind::Number(value), line, column))
            }
            TokenKind::String => {
                self.advance();
                Ok(Expr::new(ExprKind::String(token.lexeme), line, column))
            }
            TokenKind::Identifier => {
                self.advance();
                if self.check_symbol("(") {
                    let arguments = self.parse_arguments()?;
                    let call = ExprKind::Call {
                        name: token.lexeme,
                        arguments,
                    };
                    return self.parse_postfix(Expr::new(call, line, column));
                }
                let identifier = Expr::new(ExprKind::Identifier(token.lexeme), line, column);
                self.parse_postfix(identifier)
            }
            TokenKind::Keyword => match token.lexeme.as_str() {
                "null" => {
                    self.advance();
                    Ok(Expr::new(ExprKind::Null, line, column))
                }
                "t" | "true" => {
                    self.advance();
                    Ok(Expr::new(ExprKind::Boolean(true), line, column))
                }
                "f" | "false" => {
                    self.advance();
                    Ok(Expr::new(ExprKind::Boolean(false), line, column))
                }
                "length" => self.parse_length(),
                "call" => {
                    let call = self.parse_call_expression()?;
                    self.parse_postfix(call)
                }
                "new" => self.parse_new(),
                "array" => self.parse_array_creation(),
                _ => Err(self.error("expected an expression")),
            },
            TokenKind::Symbol if token.lexeme == "(" => {
                self.advance();
                let inner = self.parse_expression(0)?;
                self.expect_symbol(")", "expected ')' to close the expression")?;
                self.parse_postfix(inner)
            }
            _ => Err(self.error("expected an expression")),
        }
    }

    /// Indexing and field access after a primary.
    fn parse_postfix(&mut self, mut expr: Expr) -> Result<Expr, ParserError> {
        loop {
            if self.check_symbol("[") {
                expr = self.parse_index_suffix(expr)?;
            } else if self.match_symbol(".") {
                let field = self.expect_field_name()?;
                let (line, column) = (expr.line, expr.column);
                expr = Expr::new(
                    ExprKind::FieldAccess {
                        base: Box::new(expr),
                        field,
                    },
                    line,
                    column,
                );
            } else {
                return Ok(expr);
            }
        }
    }

    /// `[i]` or `[i, j, ...]`, the latter as nested accesses.
    pub(super) fn parse_index_suffix(&mut self, mut base: Expr) -> Result<Expr, ParserError> {
        self.expect_symbol("[", "expected '['")?;
        loop {
            let index = self.parse_expression(0)?;
            let (line, column) = (base.line, base.column);
            base = Expr::new(
                ExprKind::ArrayAccess {
                    base: Box::new(base),
                    index: Box::new(index),
                },
                line,
                column,
            );
            if !self.match_symbol(",") {
                break;
            }
        }
        self.expect_symbol("]", "expected ']' to close the index")?;
        Ok(base)
    }

    pub(super) fn expect_field_name(&mut self) -> Result<String, ParserError> {
        if matches!(self.peek().kind, TokenKind::Identifier | TokenKind::Keyword) {
            Ok(self.advance().lexeme)
        } else {
            Err(self.error("expected a field name after '.'"))
        }
    }

    /// `call NAME(args)` or a bare `NAME(args)`.
    pub(super) fn parse_call_expression(&mut self) -> Result<Expr, ParserError> {
        let start = self.peek().clone();
        self.match_keyword("call");
        let name = match self.peek().kind {
            TokenKind::Identifier | TokenKind::Keyword => self.advance(),
            _ => return Err(self.error("expected the name of the called procedure")),
        };
        if !self.check_symbol("(") {
            return Err(self.error(&format!("expected '(' after '{}'", name.lexeme)));
        }
        let arguments = self.parse_arguments()?;
        Ok(Expr::new(
            ExprKind::Call {
                name: name.lexeme,
                arguments,
            },
            start.line,
            start.column,
        ))
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParserError> {
        self.expect_symbol("(", "expected '('")?;
        let mut arguments = Vec::new();
        if !self.check_symbol(")") {
            arguments.push(self.parse_expression(0)?);
            while self.match_symbol(",") {
                arguments.push(self.parse_expression(0)?);
            }
        }
        self.expect_symbol(")", "expected ')' to close the argument list")?;
        Ok(arguments)
    }

    fn parse_length(&mut self) -> Result<Expr, ParserError> {
        let keyword = self.advance();
        self.expect_symbol("(", "expected '(' after 'length'")?;
        let name = self.expect_identifier("expected an array name in 'length'")?;
        self.expect_symbol(")", "expected ')' to close 'length'")?;
        Ok(Expr::new(
            ExprKind::Length(name.lexeme),
            keyword.line,
            keyword.column,
        ))
    }

    /// `new array[n]`, `new array of size n`, or `new Name(args)`.
    fn parse_new(&mut self) -> Result<Expr, ParserError> {
        let keyword = self.advance();
        if self.check_keyword("array") {
            let mut creation = self.parse_array_creation()?;
            creation.line = keyword.line;
            creation.column = keyword.column;
            return Ok(creation);
        }
        let name = self.expect_identifier("expected 'array' or a class name after 'new'")?;
        let arguments = if self.check_symbol("(") {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(Expr::new(
            ExprKind::Call {
                name: name.lexeme,
                arguments,
            },
            keyword.line,
            keyword.column,
        ))
    }

    fn parse_array_creation(&mut self) -> Result<Expr, ParserError> {
        let keyword = self.advance();
        let size = if self.match_symbol("[") {
            let size = self.parse_expression(0)?;
            self.expect_symbol("]", "expected ']' after the array size")?;
            size
        } else {
            if self.peek().kind == TokenKind::Identifier && self.peek().lexeme == "of" {
                self.advance();
                if self.peek().kind == TokenKind::Identifier && self.peek().lexeme == "size" {
                    self.advance();
                }
            }
            self.parse_expression(SIZE_BINDING_POWER)?
        };
        Ok(Expr::new(
            ExprKind::ArrayCreation {
                size: Box::new(size),
            },
            keyword.line,
            keyword.column,
        ))
    }
}
