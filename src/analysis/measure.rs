use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A growth term `base^n * n^degree * (log n)^log_power`. A zero
/// `exponential_base` means there is no exponential factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct ComplexityMeasure {
    pub degree: u32,
    pub log_power: u32,
    pub exponential_base: u32,
}

impl ComplexityMeasure {
    pub const CONSTANT: ComplexityMeasure = ComplexityMeasure::new(0, 0);

    pub const fn new(degree: u32, log_power: u32) -> Self {
        ComplexityMeasure {
            degree,
            log_power,
            exponential_base: 0,
        }
    }

    pub const fn polynomial(degree: u32) -> Self {
        Self::new(degree, 0)
    }

    pub const fn logarithmic(log_power: u32) -> Self {
        Self::new(0, log_power)
    }

    pub const fn exponential(base: u32) -> Self {
        ComplexityMeasure {
            degree: 0,
            log_power: 0,
            exponential_base: base,
        }
    }

    pub fn is_constant(&self) -> bool {
        *self == Self::CONSTANT
    }

    pub fn is_exponential(&self) -> bool {
        self.exponential_base > 0
    }

    fn key(&self) -> (bool, u32, u32, u32) {
        (
            self.is_exponential(),
            self.exponential_base,
            self.degree,
            self.log_power,
        )
    }

    /// `self` grows at least as fast as `other`.
    pub fn dominates(&self, other: &ComplexityMeasure) -> bool {
        self >= other
    }

    pub fn max_with(self, other: ComplexityMeasure) -> ComplexityMeasure {
        self.max(other)
    }

    pub fn min_with(self, other: ComplexityMeasure) -> ComplexityMeasure {
        self.min(other)
    }

    pub fn add_degree(self, amount: u32) -> ComplexityMeasure {
        ComplexityMeasure {
            degree: self.degree.saturating_add(amount),
            ..self
        }
    }

    pub fn add_log(self, amount: u32) -> ComplexityMeasure {
        ComplexityMeasure {
            log_power: self.log_power.saturating_add(amount),
            ..self
        }
    }

    /// Product of two terms. Exponential bases do not multiply; the larger
    /// one is kept. Exponents saturate at `u32::MAX`.
    pub fn multiply(self, other: ComplexityMeasure) -> ComplexityMeasure {
        ComplexityMeasure {
            degree: self.degree.saturating_add(other.degree),
            log_power: self.log_power.saturating_add(other.log_power),
            exponential_base: self.exponential_base.max(other.exponential_base),
        }
    }

    /// The factors without a prefix: `1`, `n`, `n^2 log n`, `2^n`.
    pub fn render_factors(&self) -> String {
        let mut factors = Vec::new();
        if self.exponential_base > 0 {
            factors.push(format!("{}^n", self.exponential_base));
        }
        match self.degree {
            0 => {}
            1 => factors.push("n".to_string()),
            d => factors.push(format!("n^{}", d)),
        }
        match self.log_power {
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

    pub fn to_notation(&self, prefix: &str) -> String {
        format!("{}({})", prefix, self.render_factors())
    }
}

impl Ord for ComplexityMeasure {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for ComplexityMeasure {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ComplexityMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_factors())
    }
}

/// Notation prefixes for each case.
pub const OMEGA: &str = "Ω";
pub const THETA: &str = "Θ";
pub const BIG_O: &str = "O";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CaseComplexity {
    pub best: ComplexityMeasure,
    pub worst: ComplexityMeasure,
    pub average: ComplexityMeasure,
}

impl CaseComplexity {
    pub const fn new(
        best: ComplexityMeasure,
        worst: ComplexityMeasure,
        average: ComplexityMeasure,
    ) -> Self {
        CaseComplexity {
            best,
            worst,
            average,
        }
    }

    pub const fn uniform(measure: ComplexityMeasure) -> Self {
        Self::new(measure, measure, measure)
    }

    pub const fn constant() -> Self {
        Self::uniform(ComplexityMeasure::CONSTANT)
    }

    /// Sequential composition keeps the dominant term of each case.
    pub fn combine_sequence(self, other: CaseComplexity) -> CaseComplexity {
        self.max_with(other)
    }

    /// Two alternative branches: the best case can take the cheaper one.
    pub fn combine_branch(self, other: CaseComplexity) -> CaseComplexity {
        CaseComplexity {
            best: self.best.min_with(other.best),
            worst: self.worst.max_with(other.worst),
            average: self.average.max_with(other.average),
        }
    }

    pub fn scale_by_degree(self, degree: u32) -> CaseComplexity {
        if degree == 0 {
            return self;
        }
        self.map(|m| m.add_degree(degree))
    }

    pub fn scale_by_log(self, power: u32) -> CaseComplexity {
        if power == 0 {
            return self;
        }
        self.map(|m| m.add_log(power))
    }

    pub fn max_with(self, other: CaseComplexity) -> CaseComplexity {
        CaseComplexity {
            best: self.best.max_with(other.best),
            worst: self.worst.max_with(other.worst),
            average: self.average.max_with(other.average),
        }
    }

    pub fn map(self, f: impl Fn(ComplexityMeasure) -> ComplexityMeasure) -> CaseComplexity {
        CaseComplexity {
            best: f(self.best),
            worst: f(self.worst),
            average: f(self.average),
        }
    }

    /// `best <= average <= worst` under the dominance order.
    pub fn is_ordered(&self) -> bool {
        self.best <= self.average && self.average <= self.worst
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn notation_formatting() {
        assert_eq!(ComplexityMeasure::CONSTANT.to_notation("O"), "O(1)");
        assert_eq!(ComplexityMeasure::polynomial(2).to_notation("O"), "O(n^2)");
        assert_eq!(ComplexityMeasure::new(1, 1).to_notation(THETA), "Θ(n log n)");
        assert_eq!(ComplexityMeasure::new(2, 1).to_notation("O"), "O(n^2 log n)");
        assert_eq!(ComplexityMeasure::logarithmic(2).to_notation(OMEGA), "Ω((log n)^2)");
        assert_eq!(ComplexityMeasure::exponential(2).to_notation("O"), "O(2^n)");
        assert_eq!(
            ComplexityMeasure::exponential(3).add_degree(1).to_notation("O"),
            "O(3^n n)"
        );
    }

    #[test]
    fn exponential_dominates_polynomial() {
        let exp = ComplexityMeasure::exponential(2);
        let poly = ComplexityMeasure::new(10, 3);
        assert!(exp.dominates(&poly));
        assert!(!poly.dominates(&exp));
        assert!(ComplexityMeasure::exponential(3).dominates(&exp));
    }

    #[test]
    fn scaling_keeps_exponential_base() {
        let scaled = CaseComplexity::uniform(ComplexityMeasure::exponential(2)).scale_by_degree(1);
        assert_eq!(scaled.worst.exponential_base, 2);
        assert_eq!(scaled.worst.degree, 1);
    }

    #[test]
    fn branch_takes_cheapest_best_case() {
        let cheap = CaseComplexity::constant();
        let linear = CaseComplexity::uniform(ComplexityMeasure::polynomial(1));
        let combined = cheap.combine_branch(linear);
        assert_eq!(combined.best, ComplexityMeasure::CONSTANT);
        assert_eq!(combined.worst, ComplexityMeasure::polynomial(1));
        assert_eq!(combined.average, ComplexityMeasure::polynomial(1));
    }

    fn polynomial() -> impl Strategy<Value = ComplexityMeasure> {
        (0u32..6, 0u32..4).prop_map(|(d, l)| ComplexityMeasure::new(d, l))
    }

    fn any_measure() -> impl Strategy<Value = ComplexityMeasure> {
        (0u32..6, 0u32..4, prop_oneof![Just(0u32), 2u32..5]).prop_map(|(d, l, b)| {
            ComplexityMeasure {
                degree: d,
                log_power: l,
                exponential_base: b,
            }
        })
    }

    fn case() -> impl Strategy<Value = CaseComplexity> {
        (any_measure(), any_measure(), any_measure())
            .prop_map(|(b, w, a)| CaseComplexity::new(b, w, a))
    }

    proptest! {
        #[test]
        fn polynomial_dominance_is_total(a in polynomial(), b in polynomial()) {
            if a.degree != b.degree {
                prop_assert!(a.dominates(&b) != b.dominates(&a));
                prop_assert_eq!(a.dominates(&b), a.degree > b.degree);
            } else {
                prop_assert_eq!(a.dominates(&b), a.log_power >= b.log_power);
            }
        }

        #[test]
        fn branch_worst_dominates_each_side(x in case(), y in case()) {
            let combined = x.combine_branch(y);
            prop_assert!(combined.worst.dominates(&x.worst));
            prop_assert!(combined.worst.dominates(&y.worst));
            prop_assert!(x.best.dominates(&combined.best));
        }

        #[test]
        fn max_with_is_an_upper_bound(a in any_measure(), b in any_measure()) {
            let m = a.max_with(b);
            prop_assert!(m.dominates(&a) && m.dominates(&b));
            prop_assert!(m == a || m == b);
        }
    }
}
