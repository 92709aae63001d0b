use super::{format_number, step, Handler, RecurrenceSolution};
use crate::analysis::recurrence::{Recurrence, Reduction};

/// Linear homogeneous shapes: `c1*T(n-1) + c2*T(n-2)` and `k*T(n-1)`.
pub struct CharacteristicEquation;

impl Handler for CharacteristicEquation {
    fn name(&self) -> &'static str {
        "characteristic"
    }

    fn solve(&self, recurrence: &Recurrence) -> Option<RecurrenceSolution> {
        if recurrence.local_cost.is_exponential() {
            return None;
        }

        let mut first = 0u32;
        let mut second = 0u32;
        for term in &recurrence.terms {
            match term.reduction {
                Reduction::Subtract(1) => first = first.checked_add(term.coefficient)?,
                Reduction::Subtract(2) => second = second.checked_add(term.coefficient)?,
                _ => return None,
            }
        }

        match (first, second) {
            (c1, c2) if c1 > 0 && c2 > 0 => {
                let (c1, c2) = (f64::from(c1), f64::from(c2));
                let discriminant = c1 * c1 + 4.0 * c2;
                let root = (c1 + discriminant.sqrt()) / 2.0;
                let golden = first == 1 && second == 1;
                let base = if golden {
                    "φ".to_string()
                } else {
                    format_number(root)
                };
                let steps = vec![
                    step(
                        "1. Characteristic equation",
                        format!("r^2 = {}r + {}", format_number(c1), format_number(c2)),
                    ),
                    step(
                        "2. Dominant root",
                        format!(
                            "r = ({} + √{}) / 2 ≈ {:.3}",
                            format_number(c1),
                            format_number(discriminant),
                            root
                        ),
                    ),
                    step("3. Conclusion", format!("T(n) grows like {}^n.", base)),
                ];
                let justification = if golden {
                    "Fibonacci-shaped recurrence: the golden ratio is the dominant root."
                } else {
                    "Linear recurrence: the dominant characteristic root sets the growth."
                };
                Some(RecurrenceSolution::tight(
                    self.name(),
                    &format!("{}^n", base),
                    justification,
                    steps,
                ))
            }
            (k, 0) if k >= 2 => {
                let steps = vec![
                    step("1. Characteristic equation", format!("r = {}", k)),
                    step("2. Conclusion", format!("Each level multiplies the work by {}.", k)),
                ];
                Some(RecurrenceSolution::tight(
                    self.name(),
                    &format!("{}^n", k),
                    format!("{} calls on n-1 per level give {}^n leaves.", k, k),
                    steps,
                ))
            }
            _ => None,
        }
    }
}
