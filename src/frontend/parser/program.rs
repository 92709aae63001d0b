use super::Parser;
use crate::ast::{ClassDefinition, Declaration, Parameter, Procedure, Program};
use crate::error::ParserError;
use crate::frontend::lexer::TokenKind;

const PROCEDURE_KEYWORDS: &[&str] = &[
    "procedure",
    "procedimiento",
    "function",
    "algorithm",
    "algoritmo",
];

const ALGORITHM_KEYWORDS: &[&str] = &["algorithm", "algoritmo"];

impl Parser {
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse_program(&mut self) -> Result<Program, ParserError> {
        let start = self.peek().clone();
        let mut name = None;
        let mut class_definitions = Vec::new();
        let mut declarations = Vec::new();
        let mut procedures = Vec::new();

        while self.check_keyword("class") {
            class_definitions.push(self.parse_class_definition()?);
        }

        // `algorithm NAME` without a parameter list only names the program
        if self.check_any_keyword(ALGORITHM_KEYWORDS)
            && self.peek_at(1).kind == TokenKind::Identifier
            && !self.peek_at(2).is_symbol("(")
        {
            self.advance();
            name = Some(self.advance().lexeme);
        }

        while self.check_keyword("declare") {
            declarations.push(self.parse_declaration()?);
        }

        while let Some((procedure, is_algorithm)) = self.try_parse_procedure()? {
            if is_algorithm && name.is_none() {
                name = Some(procedure.name.clone());
            }
            procedures.push(procedure);
        }

        let mut body = Vec::new();
        if !(self.at_end() && !procedures.is_empty()) {
            self.expect_keyword("begin", "expected 'begin' to open the main block")?;
            body = self.parse_block()?;

            while let Some((procedure, _)) = self.try_parse_procedure()? {
                procedures.push(procedure);
            }
        }

        if !self.at_end() {
            return Err(self.error("expected end of input after the main block"));
        }

        tracing::debug!(
            procedures = procedures.len(),
            statements = body.len(),
            "parsed program"
        );

        Ok(Program {
            name,
            class_definitions,
            declarations,
            procedures,
            body,
            line: start.line,
            column: start.column,
        })
    }

    fn parse_class_definition(&mut self) -> Result<ClassDefinition, ParserError> {
        let keyword = self.expect_keyword("class", "expected 'class'")?;
        let name = self.expect_identifier("expected a class name")?;
        self.expect_symbol("{", "expected '{' after the class name")?;
        let mut attributes = Vec::new();
        while !self.check_symbol("}") {
            if self.match_symbol(",") || self.match_symbol(";") {
                continue;
            }
            let attribute = self.expect_identifier("expected an attribute name")?;
            attributes.push(attribute.lexeme);
        }
        self.advance();
        Ok(ClassDefinition {
            name: name.lexeme,
            attributes,
            line: keyword.line,
            column: keyword.column,
        })
    }

    fn parse_declaration(&mut self) -> Result<Declaration, ParserError> {
        let keyword = self.expect_keyword("declare", "expected 'declare'")?;
        let name = self.expect_identifier("expected a name after 'declare'")?;
        let rest: Vec<String> = self
            .skip_line(name.line)
            .into_iter()
            .map(|t| t.lexeme)
            .collect();
        Ok(Declaration {
            name: name.lexeme,
            annotation: (!rest.is_empty()).then(|| rest.join(" ")),
            line: keyword.line,
            column: keyword.column,
        })
    }

    /// Parse a procedure definition if one starts here. A header that is
    /// not followed by `begin` is only a definition when it was introduced
    /// by a keyword; otherwise the parser rewinds and reports `None`.
    fn try_parse_procedure(&mut self) -> Result<Option<(Procedure, bool)>, ParserError> {
        let saved = self.index;
        let keyword = self
            .check_any_keyword(PROCEDURE_KEYWORDS)
            .then(|| self.advance());

        if !(self.check_identifier() && self.peek_at(1).is_symbol("(")) {
            self.index = saved;
            return Ok(None);
        }

        let name = self.advance();
        let parameters = match self.parse_parameters() {
            Ok(parameters) => parameters,
            Err(e) if keyword.is_some() => return Err(e),
            Err(_) => {
                self.index = saved;
                return Ok(None);
            }
        };

        if self.match_keyword("returns") {
            if matches!(self.peek().kind, TokenKind::Identifier | TokenKind::Keyword) {
                self.advance();
            }
        }

        if !self.check_keyword("begin") {
            if keyword.is_some() {
                return Err(self.error(&format!(
                    "expected 'begin' to open the body of '{}'",
                    name.lexeme
                )));
            }
            self.index = saved;
            return Ok(None);
        }
        self.advance();
        let body = self.parse_block()?;

        let is_algorithm = keyword
            .as_ref()
            .map_or(false, |k| ALGORITHM_KEYWORDS.contains(&k.lexeme.as_str()));
        let anchor = keyword.unwrap_or_else(|| name.clone());
        tracing::trace!(name = %name.lexeme, "parsed procedure");

        Ok(Some((
            Procedure {
                name: name.lexeme,
                parameters,
                body,
                line: anchor.line,
                column: anchor.column,
            },
            is_algorithm,
        )))
    }

    fn parse_parameters(&mut self) -> Result<Vec<Parameter>, ParserError> {
        self.expect_symbol("(", "expected '(' after the procedure name")?;
        let mut parameters = Vec::new();
        if !self.check_symbol(")") {
            parameters.push(self.parse_parameter()?);
            while self.match_symbol(",") {
                parameters.push(self.parse_parameter()?);
            }
        }
        self.expect_symbol(")", "expected ')' to close the parameter list")?;
        Ok(parameters)
    }

    fn parse_parameter(&mut self) -> Result<Parameter, ParserError> {
        let name = self.expect_identifier("expected a parameter name")?;
        let mut datatype = None;

        if self.check_symbol("[") {
            let mut text = self.parse_bracket_annotation()?;
            if self.match_symbol("..") {
                text.push_str("..");
                if !self.check_symbol("[") {
                    return Err(self.error("expected '[' after '..' in a parameter annotation"));
                }
                text.push_str(&self.parse_bracket_annotation()?);
            }
            datatype = Some(text);
        } else if self.match_symbol(":") {
            let ty = self.advance();
            if !matches!(ty.kind, TokenKind::Identifier | TokenKind::Keyword) {
                return Err(ParserError::new(
                    "expected a type after ':'",
                    ty.line,
                    ty.column,
                ));
            }
            datatype = Some(ty.lexeme);
        }

        Ok(Parameter {
            name: name.lexeme,
            datatype,
            line: name.line,
            column: name.column,
        })
    }

    /// `[ ... ]` kept as raw text.
    fn parse_bracket_annotation(&mut self) -> Result<String, ParserError> {
        self.expect_symbol("[", "expected '['")?;
        let mut text = String::from("[");
        while !self.check_symbol("]") {
            if self.at_end() {
                return Err(self.error("expected ']' in a parameter annotation"));
            }
            text.push_str(&self.advance().lexeme);
        }
        self.advance();
        text.push(']');
        Ok(text)
    }
}
