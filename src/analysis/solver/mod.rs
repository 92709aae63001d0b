//! Closed forms for recurrences.
//!
//! Handlers are tried in registration order and the first one that
//! recognises the recurrence's shape answers. The default order is Master
//! theorem, characteristic equation, substitution.

mod characteristic;
mod master;
mod substitution;
mod text;

pub use characteristic::CharacteristicEquation;
pub use master::MasterTheorem;
pub use substitution::Substitution;
pub use text::parse_recurrence;

use super::recurrence::Recurrence;
use serde::Serialize;

/// Tolerance for comparing computed logarithms.
pub const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MathStep {
    pub label: String,
    pub value: String,
}

pub(crate) fn step(label: &str, value: impl Into<String>) -> MathStep {
    MathStep {
        label: label.to_string(),
        value: value.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurrenceSolution {
    pub method: String,
    pub theta: String,
    pub upper: String,
    pub lower: String,
    pub justification: String,
    pub math_steps: Vec<MathStep>,
}

impl RecurrenceSolution {
    /// Matching Θ, O and Ω around one growth term.
    pub fn tight(
        method: &str,
        growth: &str,
        justification: impl Into<String>,
        math_steps: Vec<MathStep>,
    ) -> Self {
        RecurrenceSolution {
            method: method.to_string(),
            theta: format!("Θ({})", growth),
            upper: format!("O({})", growth),
            lower: format!("Ω({})", growth),
            justification: justification.into(),
            math_steps,
        }
    }

    pub fn inconclusive() -> Self {
        RecurrenceSolution {
            method: "inconclusive".to_string(),
            theta: "inconclusive".to_string(),
            upper: "inconclusive".to_string(),
            lower: "inconclusive".to_string(),
            justification: "No known pattern matched the recurrence.".to_string(),
            math_steps: Vec::new(),
        }
    }

    pub fn is_inconclusive(&self) -> bool {
        self.method == "inconclusive"
    }
}

pub trait Handler {
    fn name(&self) -> &'static str;

    /// `None` when the recurrence is not a shape this handler knows.
    fn solve(&self, recurrence: &Recurrence) -> Option<RecurrenceSolution>;
}

pub struct RecurrenceSolver {
    handlers: Vec<Box<dyn Handler>>,
}

impl Default for RecurrenceSolver {
    fn default() -> Self {
        RecurrenceSolver::empty()
            .register(MasterTheorem)
            .register(CharacteristicEquation)
            .register(Substitution)
    }
}

impl RecurrenceSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        RecurrenceSolver {
            handlers: Vec::new(),
        }
    }

    pub fn register(mut self, handler: impl Handler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    #[tracing::instrument(level = "debug", skip_all, fields(recurrence = %recurrence))]
    pub fn solve(&self, recurrence: &Recurrence) -> Option<RecurrenceSolution> {
        self.handlers.iter().find_map(|handler| {
            let solution = handler.solve(recurrence)?;
            tracing::debug!(handler = handler.name(), theta = %solution.theta, "recurrence solved");
            Some(solution)
        })
    }

    pub fn solve_text(&self, text: &str) -> Option<RecurrenceSolution> {
        self.solve(&parse_recurrence(text)?)
    }

    pub fn solve_or_inconclusive(&self, recurrence: &Recurrence) -> RecurrenceSolution {
        self.solve(recurrence)
            .unwrap_or_else(RecurrenceSolution::inconclusive)
    }
}

/// Parse and solve a recurrence written as text, e.g. `T(n)=2*T(n/2)+n`.
pub fn solve(text: &str) -> Option<RecurrenceSolution> {
    RecurrenceSolver::default().solve_text(text)
}

/// `1.0` as `1`, `1.5849` as `1.58`.
pub(crate) fn format_number(value: f64) -> String {
    if (value - value.round()).abs() < EPSILON {
        format!("{}", value.round() as i64)
    } else {
        let text = format!("{:.2}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// `n^exponent (log n)^log_power` with integer exponents rendered bare.
pub(crate) fn render_growth(exponent: f64, log_power: u32) -> String {
    let mut factors = Vec::new();
    if exponent.abs() >= EPSILON {
        if (exponent - 1.0).abs() < EPSILON {
            factors.push("n".to_string());
        } else {
            factors.push(format!("n^{}", format_number(exponent)));
        }
    }
    match log_power {
        0 => {}
        1 => factors.push("log n".to_string()),
        k => factors.push(format!("(log n)^{}", k)),
    }
    if factors.is_empty() {
        "1".to_string()
    } else {
        factors.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::measure::ComplexityMeasure;
    use pretty_assertions::assert_eq;

    fn theta(text: &str) -> String {
        solve(text).expect("solvable").theta
    }

    #[test]
    fn master_theorem_cases() {
        let merge = solve("T(n)=2*T(n/2)+n").expect("solvable");
        assert_eq!(merge.method, "master");
        assert_eq!(merge.theta, "Θ(n log n)");
        assert_eq!(merge.upper, "O(n log n)");
        assert_eq!(theta("T(n)=T(n/2)+1"), "Θ(log n)");
        assert_eq!(theta("T(n)=4*T(n/2)+n^2"), "Θ(n^2 log n)");
        assert_eq!(theta("T(n) = 8T(n/2) + n^2"), "Θ(n^3)");
        assert_eq!(theta("T(n) = 3T(n/2) + n"), "Θ(n^1.58)");
        assert_eq!(theta("T(n) = 2T(n/2) + n^2"), "Θ(n^2)");
        assert_eq!(theta("T(n) = 2T(n/2) + n log n"), "Θ(n (log n)^2)");
    }

    #[test]
    fn master_steps_are_ordered() {
        let solution = solve("T(n) = 2T(n/2) + n^2").expect("solvable");
        let labels: Vec<_> = solution.math_steps.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "1. Identify coefficients",
                "2. Critical exponent",
                "3. Compare exponents",
                "4. Conclusion",
                "5. Regularity condition",
            ]
        );
    }

    #[test]
    fn quicksort_override_needs_partition_hint() {
        let solver = RecurrenceSolver::new();
        let plain = Recurrence::divide(2, 2, ComplexityMeasure::polynomial(1));
        let solution = solver.solve(&plain).expect("solvable");
        assert_eq!(solution.upper, "O(n log n)");

        let partitioned = plain.with_partition(true);
        let solution = solver.solve(&partitioned).expect("solvable");
        assert_eq!(solution.theta, "Θ(n log n)");
        assert_eq!(solution.lower, "Ω(n log n)");
        assert_eq!(solution.upper, "O(n^2)");
    }

    #[test]
    fn linear_shapes() {
        assert_eq!(theta("T(n)=T(n-1)+n"), "Θ(n^2)");
        assert_eq!(theta("T(n) = T(n-1) + 1"), "Θ(n)");
        assert_eq!(theta("T(n) = T(n-1) + T(n-2) + 1"), "Θ(φ^n)");
        assert_eq!(theta("T(n) = 2T(n-1) + 1"), "Θ(2^n)");
        let solution = solve("T(n) = T(n-1) + T(n-2)").expect("solvable");
        assert_eq!(solution.method, "characteristic");
    }

    #[test]
    fn unknown_shapes_are_inconclusive() {
        assert_eq!(solve("T(n) = 2T(n-2) + 1"), None);
        assert_eq!(solve("not a recurrence"), None);
        let solver = RecurrenceSolver::new();
        let closed = Recurrence::closed(ComplexityMeasure::polynomial(1));
        assert!(solver.solve_or_inconclusive(&closed).is_inconclusive());
    }

    #[test]
    fn oversized_numbers_do_not_overflow() {
        assert_eq!(theta("T(n) = T(n-3000000000) + 1"), "Θ(n)");
        assert_eq!(solve("T(n) = 4000000000T(n/2) + 4000000000T(n/2) + 1"), None);
        assert_eq!(theta("T(n) = T(n-1) + n^4294967295"), "Θ(n^4294967295)");
        assert_eq!(solve("T(n) = T(n/2) + (n^65536)^65536"), None);
        assert_eq!(
            ComplexityMeasure::polynomial(u32::MAX).add_degree(1),
            ComplexityMeasure::polynomial(u32::MAX)
        );
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(1.584_962_5), "1.58");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(render_growth(0.0, 0), "1");
        assert_eq!(render_growth(1.0, 1), "n log n");
        assert_eq!(render_growth(0.0, 2), "(log n)^2");
    }
}
