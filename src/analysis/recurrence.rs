use super::measure::ComplexityMeasure;
use serde::Serialize;
use std::fmt;

/// How a recursive term shrinks its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reduction {
    /// `T(n/b)`
    Divide(u32),
    /// `T(n-k)`
    Subtract(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Term {
    pub coefficient: u32,
    pub reduction: Reduction,
}

impl Term {
    pub fn new(coefficient: u32, reduction: Reduction) -> Self {
        Term {
            coefficient,
            reduction,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.coefficient != 1 {
            write!(f, "{}*", self.coefficient)?;
        }
        match self.reduction {
            Reduction::Divide(b) => write!(f, "T(n/{})", b),
            Reduction::Subtract(k) => write!(f, "T(n-{})", k),
        }
    }
}

/// `T(n) = sum(terms) + local_cost`. A recurrence without terms is a
/// closed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recurrence {
    pub terms: Vec<Term>,
    pub local_cost: ComplexityMeasure,
    /// The procedure partitions its input around a pivot before recursing.
    pub partitioned: bool,
}

impl Recurrence {
    pub fn new(terms: Vec<Term>, local_cost: ComplexityMeasure) -> Self {
        Recurrence {
            terms,
            local_cost,
            partitioned: false,
        }
    }

    pub fn closed(local_cost: ComplexityMeasure) -> Self {
        Self::new(Vec::new(), local_cost)
    }

    pub fn divide(calls: u32, divisor: u32, local_cost: ComplexityMeasure) -> Self {
        Self::new(vec![Term::new(calls, Reduction::Divide(divisor))], local_cost)
    }

    pub fn subtract(calls: u32, amount: u32, local_cost: ComplexityMeasure) -> Self {
        Self::new(vec![Term::new(calls, Reduction::Subtract(amount))], local_cost)
    }

    pub fn with_partition(mut self, partitioned: bool) -> Self {
        self.partitioned = partitioned;
        self
    }

    pub fn is_recursive(&self) -> bool {
        !self.terms.is_empty()
    }

    pub fn single_term(&self) -> Option<Term> {
        match self.terms.as_slice() {
            [term] => Some(*term),
            _ => None,
        }
    }

    /// `(a, b)` for `a*T(n/b) + f(n)`.
    pub fn divide_and_conquer(&self) -> Option<(u32, u32)> {
        match self.single_term()? {
            Term {
                coefficient,
                reduction: Reduction::Divide(b),
            } => Some((coefficient, b)),
            _ => None,
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("T(n) = ")?;
        for term in &self.terms {
            write!(f, "{} + ", term)?;
        }
        f.write_str(&self.local_cost.render_factors())
    }
}
