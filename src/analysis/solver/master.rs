use super::{format_number, render_growth, step, Handler, RecurrenceSolution, EPSILON};
use crate::analysis::recurrence::Recurrence;

/// `a*T(n/b) + Θ(n^d (log n)^k)` with `a >= 1` and `b >= 2`.
pub struct MasterTheorem;

impl Handler for MasterTheorem {
    fn name(&self) -> &'static str {
        "master"
    }

    fn solve(&self, recurrence: &Recurrence) -> Option<RecurrenceSolution> {
        let (a, b) = recurrence.divide_and_conquer()?;
        let cost = recurrence.local_cost;
        if a == 0 || b < 2 || cost.is_exponential() {
            return None;
        }

        let d = f64::from(cost.degree);
        let k = cost.log_power;
        let c = f64::from(a).ln() / f64::from(b).ln();

        let mut steps = vec![
            step(
                "1. Identify coefficients",
                format!("a = {}, b = {}, f(n) = {}", a, b, cost.render_factors()),
            ),
            step(
                "2. Critical exponent",
                format!("log_{}({}) ≈ {}", b, a, format_number(c)),
            ),
            step(
                "3. Compare exponents",
                format!(
                    "n^{} (local work) vs n^{} (recursive work)",
                    format_number(d),
                    format_number(c)
                ),
            ),
        ];

        if recurrence.partitioned && (a, b, cost.degree, k) == (2, 2, 1, 0) {
            steps.push(step(
                "4. Conclusion",
                "Balanced partitions meet Case 2; a degenerate pivot turns the recurrence into T(n-1) + n.",
            ));
            return Some(RecurrenceSolution {
                method: self.name().to_string(),
                theta: "Θ(n log n)".to_string(),
                upper: "O(n^2)".to_string(),
                lower: "Ω(n log n)".to_string(),
                justification: "QuickSort partitioning: n log n with balanced splits, n^2 in the worst case."
                    .to_string(),
                math_steps: steps,
            });
        }

        if d < c - EPSILON {
            steps.push(step("4. Conclusion", "The leaves dominate (Case 1)."));
            let growth = render_growth(c, 0);
            Some(RecurrenceSolution::tight(
                self.name(),
                &growth,
                "Case 1: f(n) is polynomially smaller than n^log_b(a).",
                steps,
            ))
        } else if (d - c).abs() < EPSILON {
            steps.push(step(
                "4. Conclusion",
                "Local and recursive work balance (Case 2); multiply by log n.",
            ));
            let growth = render_growth(d, k.saturating_add(1));
            Some(RecurrenceSolution::tight(
                self.name(),
                &growth,
                "Case 2: f(n) and n^log_b(a) grow at the same rate.",
                steps,
            ))
        } else {
            steps.push(step("4. Conclusion", "The root dominates (Case 3)."));
            if f64::from(a) >= f64::from(b).powf(d) {
                tracing::trace!(a, b, d, "regularity condition failed");
                return None;
            }
            steps.push(step(
                "5. Regularity condition",
                format!("holds: {} < {}^{}", a, b, format_number(d)),
            ));
            let growth = render_growth(d, k);
            Some(RecurrenceSolution::tight(
                self.name(),
                &growth,
                "Case 3: f(n) dominates and is regular.",
                steps,
            ))
        }
    }
}
