use super::{Parser, ASSIGNMENT_SYMBOLS, STOP_KEYWORDS};
use crate::ast::{Expr, ExprKind, Statement, StmtKind};
use crate::error::ParserError;
use crate::frontend::lexer::TokenKind;

/// How a relaxed body was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyForm {
    /// `begin ... end`
    Block,
    /// One statement on the same line as the keyword that opened the body.
    Inline,
    /// Statements on the following lines, up to a stop keyword.
    Run,
}

impl Parser {
    /// Statements up to and including the closing `end`. The opening
    /// `begin` has already been consumed.
    pub(super) fn parse_block(&mut self) -> Result<Vec<Statement>, ParserError> {
        let mut statements = Vec::new();
        while !self.check_keyword("end") {
            if self.at_end() {
                return Err(self.error("expected 'end' to close the block"));
            }
            statements.push(self.parse_statement()?);
        }
        self.advance();
        Ok(statements)
    }

    /// Body of `if`, `else`, `for` and `while`. `anchor_line` is the line of
    /// the token that introduced the body.
    fn parse_body(&mut self, anchor_line: usize) -> Result<(Vec<Statement>, BodyForm), ParserError> {
        if self.match_keyword("begin") {
            return Ok((self.parse_block()?, BodyForm::Block));
        }
        if self.config.strict {
            return Err(self.error("expected 'begin'"));
        }

        if self.peek().line == anchor_line && !self.check_any_keyword(STOP_KEYWORDS) {
            let statement = self.parse_statement()?;
            return Ok((vec![statement], BodyForm::Inline));
        }

        let mut statements = Vec::new();
        while !self.check_any_keyword(STOP_KEYWORDS) && !self.at_end() {
            statements.push(self.parse_statement()?);
        }
        Ok((statements, BodyForm::Run))
    }

    /// Consume the `end` that closes a relaxed body.
    fn close_body(&mut self, form: BodyForm, anchor_line: usize) {
        match form {
            BodyForm::Block => {}
            BodyForm::Inline => {
                let same_line = self.previous().map_or(anchor_line, |t| t.line);
                if self.check_keyword("end") && self.peek().line == same_line {
                    self.advance();
                }
            }
            BodyForm::Run => {
                self.match_keyword("end");
            }
        }
    }

    pub fn parse_statement(&mut self) -> Result<Statement, ParserError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Keyword => match token.lexeme.as_str() {
                "for" => self.parse_for_statement(),
                "while" => self.parse_while_statement(),
                "repeat" => self.parse_repeat_statement(),
                "if" => self.parse_if_statement(),
                "call" => self.parse_call_statement(),
                "swap" => self.parse_swap_statement(),
                "let" | "declare" => self.parse_tolerated_line(),
                "return" => self.parse_return_statement(),
                "print" => self.parse_print_statement(),
                _ => Err(self.error("expected a statement")),
            },
            TokenKind::Identifier if self.peek_at(1).is_symbol("(") => self.parse_call_statement(),
            TokenKind::Identifier => self.parse_assignment(),
            _ => Err(self.error("expected a statement")),
        }
    }

    fn parse_for_statement(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.advance();
        let iterator = self.expect_identifier("expected the loop variable after 'for'")?;
        self.expect_assignment_symbol("expected an assignment symbol in 'for'")?;
        let start = self.parse_expression(0)?;
        self.expect_keyword("to", "expected 'to' in 'for'")?;
        let stop = self.parse_expression(0)?;
        self.match_keyword("do");

        let anchor = self.previous().map_or(keyword.line, |t| t.line);
        let (body, form) = self.parse_body(anchor)?;
        self.close_body(form, anchor);

        Ok(Statement::new(
            StmtKind::For {
                iterator: iterator.lexeme,
                start,
                stop,
                body,
            },
            keyword.line,
            keyword.column,
        ))
    }

    fn parse_while_statement(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.advance();
        let condition = self.parse_expression(0)?;
        self.match_keyword("do");

        let anchor = self.previous().map_or(keyword.line, |t| t.line);
        let (body, form) = self.parse_body(anchor)?;
        self.close_body(form, anchor);

        Ok(Statement::new(
            StmtKind::While { condition, body },
            keyword.line,
            keyword.column,
        ))
    }

    fn parse_repeat_statement(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.advance();
        let body = if self.match_keyword("begin") {
            self.parse_block()?
        } else {
            let mut statements = Vec::new();
            while !self.check_keyword("until") {
                if self.at_end() {
                    return Err(self.error("expected 'until' to close 'repeat'"));
                }
                statements.push(self.parse_statement()?);
            }
            statements
        };
        self.expect_keyword("until", "expected 'until' to close 'repeat'")?;
        let condition = self.parse_expression(0)?;

        Ok(Statement::new(
            StmtKind::RepeatUntil { body, condition },
            keyword.line,
            keyword.column,
        ))
    }

    fn parse_if_statement(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.advance();
        let condition = self.parse_expression(0)?;
        self.match_keyword("then");

        let anchor = self.previous().map_or(keyword.line, |t| t.line);
        let (then_branch, form) = self.parse_body(anchor)?;

        let else_branch = if self.check_keyword("else") {
            let else_keyword = self.advance();
            if self.check_keyword("if") {
                vec![self.parse_if_statement()?]
            } else {
                let (branch, else_form) = self.parse_body(else_keyword.line)?;
                self.close_body(else_form, else_keyword.line);
                branch
            }
        } else {
            self.close_body(form, anchor);
            Vec::new()
        };

        Ok(Statement::new(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            keyword.line,
            keyword.column,
        ))
    }

    fn parse_call_statement(&mut self) -> Result<Statement, ParserError> {
        let call = self.parse_call_expression()?;
        let Expr { kind, line, column } = call;
        match kind {
            ExprKind::Call { name, arguments } => Ok(Statement::new(
                StmtKind::Call { name, arguments },
                line,
                column,
            )),
            _ => Err(ParserError::new("expected a call", line, column)),
        }
    }

    fn parse_swap_statement(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.advance();
        let first = self.parse_expression(0)?;
        self.expect_keyword("with", "expected 'with' in 'swap'")?;
        let second = self.parse_expression(0)?;
        Ok(Statement::new(
            StmtKind::Call {
                name: "swap".to_string(),
                arguments: vec![first, second],
            },
            keyword.line,
            keyword.column,
        ))
    }

    /// `let` and `declare` lines inside a block carry no cost and are
    /// skipped to the end of their line.
    fn parse_tolerated_line(&mut self) -> Result<Statement, ParserError> {
        if self.config.strict {
            return Err(self.error("expected a statement"));
        }
        let keyword = self.advance();
        self.skip_line(keyword.line);
        Ok(Statement::new(StmtKind::NoOp, keyword.line, keyword.column))
    }

    fn parse_return_statement(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.advance();
        let has_value = !self.at_end()
            && self.peek().line == keyword.line
            && !self.check_any_keyword(STOP_KEYWORDS);
        let value = if has_value {
            Some(self.parse_expression(0)?)
        } else {
            None
        };
        Ok(Statement::new(
            StmtKind::Return(value),
            keyword.line,
            keyword.column,
        ))
    }

    fn parse_print_statement(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.advance();
        let expr = self.parse_expression(0)?;
        Ok(Statement::new(
            StmtKind::Print(expr),
            keyword.line,
            keyword.column,
        ))
    }

    fn parse_assignment(&mut self) -> Result<Statement, ParserError> {
        let target = self.parse_lvalue()?;
        self.expect_assignment_symbol("expected an assignment symbol")?;
        let value = self.parse_expression(0)?;
        let (line, column) = (target.line, target.column);
        Ok(Statement::new(
            StmtKind::Assignment { target, value },
            line,
            column,
        ))
    }

    /// `x`, `A[i]`, `A[i, j]`, `p.next` and combinations.
    fn parse_lvalue(&mut self) -> Result<Expr, ParserError> {
        let name = self.expect_identifier("expected an assignment target")?;
        let mut target = Expr::new(ExprKind::Identifier(name.lexeme), name.line, name.column);
        loop {
            if self.check_symbol("[") {
                target = self.parse_index_suffix(target)?;
            } else if self.match_symbol(".") {
                let field = self.expect_field_name()?;
                let (line, column) = (target.line, target.column);
                target = Expr::new(
                    ExprKind::FieldAccess {
                        base: Box::new(target),
                        field,
                    },
                    line,
                    column,
                );
            } else {
                break;
            }
        }
        Ok(target)
    }

    fn expect_assignment_symbol(&mut self, message: &str) -> Result<(), ParserError> {
        let token = self.peek();
        if token.kind == TokenKind::Symbol && ASSIGNMENT_SYMBOLS.contains(&token.lexeme.as_str()) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(message))
        }
    }
}
