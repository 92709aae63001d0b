//! Textual recurrences such as `T(n) = 2T(n/2) + n log n`.

use crate::analysis::measure::ComplexityMeasure;
use crate::analysis::recurrence::{Recurrence, Reduction, Term};
use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum Piece {
    #[token("T")]
    T,

    #[token("n")]
    N,

    #[token("log")]
    #[token("lg")]
    Log,

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[token("O")]
    #[token("Θ")]
    #[token("Theta")]
    #[token("Ω")]
    #[token("Omega")]
    Bound,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("=")]
    Equals,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    #[token("·")]
    #[token("⋅")]
    Times,

    #[token("/")]
    Slash,

    #[token("^")]
    Caret,
}

struct Reader {
    pieces: Vec<Piece>,
    position: usize,
}

impl Reader {
    fn peek(&self) -> Option<Piece> {
        self.pieces.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<Piece> {
        self.pieces.get(self.position + offset).copied()
    }

    fn bump(&mut self) -> Option<Piece> {
        let piece = self.peek()?;
        self.position += 1;
        Some(piece)
    }

    fn eat(&mut self, expected: Piece) -> Option<()> {
        (self.bump()? == expected).then_some(())
    }

    fn eat_if(&mut self, expected: Piece) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn integer(&mut self) -> Option<u32> {
        match self.bump()? {
            Piece::Number(value) => as_integer(value),
            _ => None,
        }
    }

    fn at_end(&self) -> bool {
        self.position >= self.pieces.len()
    }

    /// `T(`, `k T(` or `k * T(`
    fn at_term(&self) -> bool {
        match (self.peek(), self.peek_at(1), self.peek_at(2)) {
            (Some(Piece::T), _, _) => true,
            (Some(Piece::Number(_)), Some(Piece::T), _) => true,
            (Some(Piece::Number(_)), Some(Piece::Times), Some(Piece::T)) => true,
            _ => false,
        }
    }

    fn at_factor(&self) -> bool {
        matches!(
            self.peek(),
            Some(Piece::Number(_) | Piece::N | Piece::Log | Piece::LParen | Piece::Bound)
        ) && !self.at_term()
    }

    fn recurrence(&mut self) -> Option<Recurrence> {
        self.eat(Piece::T)?;
        self.eat(Piece::LParen)?;
        self.eat(Piece::N)?;
        self.eat(Piece::RParen)?;
        self.eat(Piece::Equals)?;

        let mut terms: Vec<Term> = Vec::new();
        let mut cost = ComplexityMeasure::CONSTANT;
        loop {
            if self.at_term() {
                let term = self.term()?;
                match terms.iter_mut().find(|t| t.reduction == term.reduction) {
                    Some(existing) => {
                        existing.coefficient = existing.coefficient.checked_add(term.coefficient)?
                    }
                    None => terms.push(term),
                }
            } else {
                cost = cost.max_with(self.product()?);
            }
            match self.bump() {
                None => break,
                Some(Piece::Plus) => {}
                Some(Piece::Minus) => {
                    // lower-order constant, e.g. `n - 1`
                    self.integer()?;
                    if !self.eat_if(Piece::Plus) {
                        break;
                    }
                }
                Some(_) => return None,
            }
        }

        if !self.at_end() || terms.is_empty() {
            return None;
        }
        Some(Recurrence::new(terms, cost))
    }

    fn term(&mut self) -> Option<Term> {
        let coefficient = if let Some(Piece::Number(_)) = self.peek() {
            let value = self.integer()?;
            self.eat_if(Piece::Times);
            value
        } else {
            1
        };
        self.eat(Piece::T)?;
        self.eat(Piece::LParen)?;
        self.eat(Piece::N)?;
        let reduction = match self.bump()? {
            Piece::Slash => Reduction::Divide(self.integer()?),
            Piece::Minus => Reduction::Subtract(self.integer()?),
            _ => return None,
        };
        self.eat(Piece::RParen)?;
        Some(Term::new(coefficient, reduction))
    }

    fn sum(&mut self) -> Option<ComplexityMeasure> {
        let mut cost = self.product()?;
        loop {
            if self.eat_if(Piece::Plus) {
                cost = cost.max_with(self.product()?);
            } else if self.eat_if(Piece::Minus) {
                cost = cost.max_with(self.product()?);
            } else {
                return Some(cost);
            }
        }
    }

    fn product(&mut self) -> Option<ComplexityMeasure> {
        let mut cost = self.factor()?;
        loop {
            if self.peek() == Some(Piece::Times) {
                self.bump();
                cost = cost.multiply(self.factor()?);
            } else if self.at_factor() {
                cost = cost.multiply(self.factor()?);
            } else {
                return Some(cost);
            }
        }
    }

    fn factor(&mut self) -> Option<ComplexityMeasure> {
        match self.bump()? {
            Piece::Number(value) => {
                if self.peek() == Some(Piece::Caret) && self.peek_at(1) == Some(Piece::N) {
                    self.position += 2;
                    let base = as_integer(value)?;
                    return Some(if base >= 2 {
                        ComplexityMeasure::exponential(base)
                    } else {
                        ComplexityMeasure::CONSTANT
                    });
                }
                Some(ComplexityMeasure::CONSTANT)
            }
            Piece::N => {
                let degree = if self.eat_if(Piece::Caret) {
                    self.exponent()?
                } else {
                    1
                };
                Some(ComplexityMeasure::polynomial(degree))
            }
            Piece::Log => {
                let power = if self.eat_if(Piece::Caret) {
                    self.exponent()?
                } else {
                    1
                };
                if self.eat_if(Piece::LParen) {
                    self.eat(Piece::N)?;
                    self.eat(Piece::RParen)?;
                } else {
                    self.eat(Piece::N)?;
                }
                Some(ComplexityMeasure::logarithmic(power))
            }
            Piece::LParen => {
                let inner = self.sum()?;
                self.eat(Piece::RParen)?;
                if self.eat_if(Piece::Caret) {
                    let power = self.exponent()?;
                    Some(ComplexityMeasure {
                        degree: inner.degree.checked_mul(power)?,
                        log_power: inner.log_power.checked_mul(power)?,
                        exponential_base: inner.exponential_base,
                    })
                } else {
                    Some(inner)
                }
            }
            Piece::Bound => {
                self.eat(Piece::LParen)?;
                let inner = self.sum()?;
                self.eat(Piece::RParen)?;
                Some(inner)
            }
            _ => None,
        }
    }

    /// Fractional exponents fall back to 1.
    fn exponent(&mut self) -> Option<u32> {
        match self.bump()? {
            Piece::Number(value) => Some(as_integer(value).unwrap_or(1)),
            _ => None,
        }
    }
}

fn as_integer(value: f64) -> Option<u32> {
    if value.fract() == 0.0 && value >= 0.0 && value <= f64::from(u32::MAX) {
        Some(value as u32)
    } else {
        None
    }
}

/// `None` when the text is not a recurrence of a supported shape.
pub fn parse_recurrence(text: &str) -> Option<Recurrence> {
    let pieces = Piece::lexer(text).collect::<Result<Vec<_>, _>>().ok()?;
    let mut reader = Reader {
        pieces,
        position: 0,
    };
    let recurrence = reader.recurrence();
    if recurrence.is_none() {
        tracing::debug!(text, "unrecognised recurrence text");
    }
    recurrence
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rendered(text: &str) -> String {
        parse_recurrence(text).expect("parses").to_string()
    }

    #[test]
    fn accepts_common_spellings() {
        assert_eq!(rendered("T(n)=2*T(n/2)+n"), "T(n) = 2*T(n/2) + n");
        assert_eq!(rendered("T(n) = 2T(n/2) + n log n"), "T(n) = 2*T(n/2) + n log n");
        assert_eq!(rendered("T(n) = 3 · T(n/4) + Θ(n^2)"), "T(n) = 3*T(n/4) + n^2");
        assert_eq!(rendered("T(n) = T(n-1) + T(n-2)"), "T(n) = T(n-1) + T(n-2) + 1");
        assert_eq!(rendered("T(n) = T(n/2) + T(n/2) + 1"), "T(n) = 2*T(n/2) + 1");
        assert_eq!(rendered("T(n) = T(n-1) + n - 1"), "T(n) = T(n-1) + n");
        assert_eq!(rendered("T(n) = 2T(n/2) + (log n)^2"), "T(n) = 2*T(n/2) + (log n)^2");
        assert_eq!(rendered("T(n) = T(n-1) + 2^n"), "T(n) = T(n-1) + 2^n");
    }

    #[test]
    fn fractional_exponents_round_down_to_linear() {
        assert_eq!(rendered("T(n) = 2T(n/2) + n^0.5"), "T(n) = 2*T(n/2) + n");
    }

    #[test]
    fn rejects_other_text() {
        assert_eq!(parse_recurrence("not a recurrence"), None);
        assert_eq!(parse_recurrence("T(n) = n^2"), None);
        assert_eq!(parse_recurrence("T(n) = 1.5T(n/2) + n"), None);
        assert_eq!(parse_recurrence("T(n) = T(n/2) +"), None);
    }
}
