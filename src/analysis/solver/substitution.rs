use super::{step, Handler, RecurrenceSolution};
use crate::analysis::recurrence::{Recurrence, Reduction, Term};

/// `T(n-k) + f(n)` unrolls into about `n/k` copies of `f(n)`.
pub struct Substitution;

impl Handler for Substitution {
    fn name(&self) -> &'static str {
        "substitution"
    }

    fn solve(&self, recurrence: &Recurrence) -> Option<RecurrenceSolution> {
        let Term {
            coefficient: 1,
            reduction: Reduction::Subtract(k),
        } = recurrence.single_term()?
        else {
            return None;
        };
        if k == 0 {
            return None;
        }

        let cost = recurrence.local_cost;
        let total = if cost.is_exponential() {
            cost
        } else {
            cost.add_degree(1)
        };
        let f = cost.render_factors();
        let growth = total.render_factors();
        let steps = vec![
            step(
                "1. Unroll",
                format!("T(n) = T(n-{k}) + {f} = T(n-{double}) + 2·{f} = ...", double = 2 * u64::from(k)),
            ),
            step("2. Levels", format!("about n/{} levels before the base case", k)),
            step("3. Sum", format!("n · {} = {}", f, growth)),
        ];
        let justification = if cost.is_constant() {
            "Telescoping sum of constants."
        } else {
            "Telescoping sum bounded by n copies of f(n)."
        };
        Some(RecurrenceSolution::tight(
            self.name(),
            &growth,
            justification,
            steps,
        ))
    }
}
