//! Named algorithm shapes recognised by structural signature.
//!
//! Every recursive procedure is reduced to a [`Signature`] of plain facts,
//! and [`RECURSIVE_IDIOMS`] is scanned in order; the first rule whose
//! predicate holds names the idiom. Matching is heuristic, so every match
//! carries a [`Confidence`].

use super::measure::{CaseComplexity, ComplexityMeasure};
use super::shape::{self, ArgumentShape, RecursionTarget};
use crate::ast::{Expr, Statement, StmtKind};
use serde::Serialize;
use std::fmt;

const EXIT_FLAG_MARKERS: &[&str] = &["encontr", "found", "flag", "exist"];
const PARTITION_MARKERS: &[&str] = &["partici", "partition"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Idiom {
    Fibonacci,
    Hanoi,
    QuickSort,
    MergeSort,
    BinarySearch,
    Linear,
}

impl Idiom {
    pub fn name(self) -> &'static str {
        match self {
            Idiom::Fibonacci => "fibonacci",
            Idiom::Hanoi => "hanoi",
            Idiom::QuickSort => "quicksort",
            Idiom::MergeSort => "mergesort",
            Idiom::BinarySearch => "binarysearch",
            Idiom::Linear => "linear",
        }
    }

    /// The fixed cost profile the idiom raises the structural estimate to.
    pub fn case_complexity(self) -> CaseComplexity {
        let n_log_n = ComplexityMeasure::new(1, 1);
        match self {
            Idiom::Fibonacci | Idiom::Hanoi => {
                CaseComplexity::uniform(ComplexityMeasure::exponential(2))
            }
            Idiom::QuickSort => {
                CaseComplexity::new(n_log_n, ComplexityMeasure::polynomial(2), n_log_n)
            }
            Idiom::MergeSort => CaseComplexity::uniform(n_log_n),
            Idiom::BinarySearch => CaseComplexity::new(
                ComplexityMeasure::CONSTANT,
                ComplexityMeasure::logarithmic(1),
                ComplexityMeasure::logarithmic(1),
            ),
            Idiom::Linear => CaseComplexity::uniform(ComplexityMeasure::polynomial(1)),
        }
    }
}

impl fmt::Display for Idiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Distinctive structure matched.
    High,
    /// Chosen because nothing more specific did.
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdiomMatch {
    pub idiom: Idiom,
    pub confidence: Confidence,
    pub procedure: String,
    pub recursive_calls: usize,
}

/// Facts about one recursive procedure body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub recursive_calls: usize,
    pub has_loops: bool,
    pub has_partition: bool,
    pub has_early_return: bool,
    pub halves_argument: bool,
    pub all_calls_decrement: bool,
    pub has_midpoint_branch: bool,
}

impl Signature {
    pub fn of(body: &[Statement], target: RecursionTarget<'_>) -> Self {
        let sites = target.call_sites(body);
        let halving = shape::halving_names(body);
        let shapes: Vec<_> = sites
            .iter()
            .map(|arguments| shape::argument_shape(arguments, &halving))
            .collect();

        Signature {
            recursive_calls: sites.len(),
            has_loops: shape::contains_loop(body),
            has_partition: has_partition(body),
            has_early_return: has_early_return(body),
            halves_argument: shapes.contains(&Some(ArgumentShape::Halving)),
            all_calls_decrement: !sites.is_empty()
                && sites.iter().all(|arguments| arguments.iter().any(|a| shape::decrement_of(a).is_some())),
            has_midpoint_branch: has_midpoint_branch(body),
        }
    }
}

pub struct IdiomRule {
    pub idiom: Idiom,
    pub confidence: Confidence,
    pub test: fn(&Signature) -> bool,
}

fn fibonacci(s: &Signature) -> bool {
    s.recursive_calls >= 2
        && !s.has_loops
        && !s.has_partition
        && s.has_early_return
        && !s.halves_argument
}

fn hanoi(s: &Signature) -> bool {
    s.recursive_calls == 2 && !s.has_loops && !s.has_partition && s.all_calls_decrement
}

fn quicksort(s: &Signature) -> bool {
    s.recursive_calls >= 2 && s.has_partition
}

fn mergesort(s: &Signature) -> bool {
    s.recursive_calls >= 2
}

fn binary_search(s: &Signature) -> bool {
    s.recursive_calls == 1 && s.has_midpoint_branch
}

fn linear(s: &Signature) -> bool {
    s.recursive_calls == 1
}

/// Scanned in order; the first match wins.
pub const RECURSIVE_IDIOMS: &[IdiomRule] = &[
    IdiomRule {
        idiom: Idiom::Fibonacci,
        confidence: Confidence::High,
        test: fibonacci,
    },
    IdiomRule {
        idiom: Idiom::Hanoi,
        confidence: Confidence::High,
        test: hanoi,
    },
    IdiomRule {
        idiom: Idiom::QuickSort,
        confidence: Confidence::High,
        test: quicksort,
    },
    IdiomRule {
        idiom: Idiom::MergeSort,
        confidence: Confidence::Low,
        test: mergesort,
    },
    IdiomRule {
        idiom: Idiom::BinarySearch,
        confidence: Confidence::High,
        test: binary_search,
    },
    IdiomRule {
        idiom: Idiom::Linear,
        confidence: Confidence::Low,
        test: linear,
    },
];

pub fn classify(signature: &Signature) -> Option<(Idiom, Confidence)> {
    RECURSIVE_IDIOMS
        .iter()
        .find(|rule| (rule.test)(signature))
        .map(|rule| (rule.idiom, rule.confidence))
}

fn is_partition_name(name: &str) -> bool {
    let name = name.to_lowercase();
    PARTITION_MARKERS.iter().any(|marker| name.contains(marker))
}

/// A `while` whose condition compares, or a call to a partition routine.
pub fn has_partition(statements: &[Statement]) -> bool {
    statements.iter().any(|statement| {
        let here = match &statement.kind {
            StmtKind::While { condition, .. } => shape::contains_comparison(condition),
            _ => false,
        };
        here || shape::calls_in_statement(statement)
            .into_iter()
            .any(|(name, _)| is_partition_name(name))
            || statement.children().into_iter().any(has_partition)
    })
}

/// A top-level `if` whose then-branch returns directly.
pub fn has_early_return(statements: &[Statement]) -> bool {
    statements.iter().any(|statement| match &statement.kind {
        StmtKind::If { then_branch, .. } => then_branch
            .iter()
            .any(|s| matches!(s.kind, StmtKind::Return(_))),
        _ => false,
    })
}

/// A top-level `if` with a midpoint assignment directly in either branch.
pub fn has_midpoint_branch(statements: &[Statement]) -> bool {
    let assigns_midpoint = |branch: &[Statement]| {
        branch.iter().any(|s| {
            matches!(&s.kind, StmtKind::Assignment { value, .. } if shape::is_midpoint(value))
        })
    };
    statements.iter().any(|statement| match &statement.kind {
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => assigns_midpoint(then_branch) || assigns_midpoint(else_branch),
        _ => false,
    })
}

fn is_flag_name(name: &str) -> bool {
    let name = name.to_lowercase();
    EXIT_FLAG_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Flag identifiers tested with `=` in a loop condition, through `and`/`or`.
pub fn exit_flags(condition: &Expr) -> Vec<&str> {
    use crate::ast::{BinaryOp, ExprKind};

    match &condition.kind {
        ExprKind::Binary { op, left, right } if op.is_logical() => {
            let mut flags = exit_flags(left);
            flags.extend(exit_flags(right));
            flags
        }
        ExprKind::Binary {
            op: BinaryOp::Eq,
            left,
            right,
        } => [left.as_identifier(), right.as_identifier()]
            .into_iter()
            .flatten()
            .filter(|name| is_flag_name(name))
            .collect(),
        _ => Vec::new(),
    }
}

/// The loop can stop on its first pass: its condition tests a flag that the
/// body assigns, directly or inside an `if`.
pub fn has_early_exit(condition: &Expr, body: &[Statement]) -> bool {
    let flags = exit_flags(condition);
    !flags.is_empty()
        && shape::shallow_assignments(body)
            .into_iter()
            .any(|(name, _)| flags.contains(&name))
}

/// `A[i ± k] <- B[i ± k]` moves inside a loop that steps `i` down: one
/// element shifted per pass.
pub fn is_array_shift_loop(condition: &Expr, body: &[Statement]) -> bool {
    let Some(var) = shape::loop_variable(condition) else {
        return false;
    };
    let mut shifts = 0;
    let mut decrements = 0;
    for statement in body {
        let StmtKind::Assignment { target, value } = &statement.kind else {
            return false;
        };
        if indexes_by(target, var) && indexes_by(value, var) {
            shifts += 1;
        } else if target.as_identifier() == Some(var)
            && shape::decrement_of(value).is_some_and(|(base, _)| base == var)
        {
            decrements += 1;
        } else {
            return false;
        }
    }
    shifts > 0 && decrements > 0
}

fn indexes_by(expr: &Expr, var: &str) -> bool {
    use crate::ast::ExprKind;

    let ExprKind::ArrayAccess { index, .. } = &expr.kind else {
        return false;
    };
    match &index.kind {
        ExprKind::Identifier(name) => name == var,
        ExprKind::Binary { left, right, .. } => {
            left.as_identifier() == Some(var) && right.as_number().is_some()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse;
    use pretty_assertions::assert_eq;

    fn signature(source: &str) -> Signature {
        let program = parse(source).expect("parses");
        let procedure = &program.procedures[0];
        Signature::of(&procedure.body, RecursionTarget::new(&procedure.name))
    }

    #[test]
    fn fibonacci_signature() {
        let sig = signature("procedure fib(n)\nbegin\n if n <= 1 then\n begin\n  return n\n end\n return CALL fib(n - 1) + CALL fib(n - 2)\nend");
        assert_eq!(classify(&sig), Some((Idiom::Fibonacci, Confidence::High)));
    }

    #[test]
    fn halving_base_case_is_not_fibonacci() {
        let sig = signature("procedure ms(A)\nbegin\n if length(A) <= 1 then\n begin\n  return\n end\n mid 🡨 length(A) div 2\n CALL ms(A[1..mid])\n CALL ms(A[mid+1..length(A)])\n CALL merge(A, mid)\nend");
        assert!(sig.halves_argument);
        assert_eq!(classify(&sig), Some((Idiom::MergeSort, Confidence::Low)));
    }

    #[test]
    fn hanoi_signature() {
        let sig = signature("procedure hanoi(n, a, b, c)\nbegin\n if n > 0 then\n begin\n  CALL hanoi(n - 1, a, c, b)\n  print n\n  CALL hanoi(n - 1, c, b, a)\n end\nend");
        assert_eq!(sig.recursive_calls, 2);
        assert_eq!(classify(&sig).map(|m| m.0), Some(Idiom::Hanoi));
    }

    #[test]
    fn partition_call_in_assignment_marks_quicksort() {
        let sig = signature("procedure qs(A, p, r)\nbegin\n if p < r then\n begin\n  q 🡨 CALL PARTITION(A, p, r)\n  CALL qs(A, p, q - 1)\n  CALL qs(A, q + 1, r)\n end\nend");
        assert!(sig.has_partition);
        assert_eq!(classify(&sig).map(|m| m.0), Some(Idiom::QuickSort));
    }

    #[test]
    fn single_call_idioms() {
        let search = signature("procedure bs(A, lo, hi, x)\nbegin\n if lo <= hi then\n begin\n  mid 🡨 (lo + hi) div 2\n  return CALL bs(A, mid + 1, hi, x)\n end\n return -1\nend");
        assert_eq!(classify(&search).map(|m| m.0), Some(Idiom::BinarySearch));

        let fact = signature("procedure fact(n)\nbegin\n if n <= 1 then\n begin\n  return 1\n end\n return n * CALL fact(n - 1)\nend");
        assert_eq!(classify(&fact), Some((Idiom::Linear, Confidence::Low)));
    }

    #[test]
    fn no_recursion_matches_nothing() {
        let sig = signature("procedure p(n)\nbegin\n x 🡨 n\nend");
        assert_eq!(classify(&sig), None);
    }

    #[test]
    fn early_exit_needs_flag_and_assignment() {
        let program = parse("begin\n while (i <= n and found = f) do\n begin\n  if A[i] = x then\n  begin\n   found 🡨 t\n  end\n  i 🡨 i + 1\n end\nend").expect("parses");
        let StmtKind::While { condition, body } = &program.body[0].kind else {
            panic!("expected while");
        };
        assert_eq!(exit_flags(condition), vec!["found"]);
        assert!(has_early_exit(condition, body));
        assert!(!has_early_exit(condition, &body[1..]));
    }

    #[test]
    fn insertion_shift_is_recognised() {
        let program = parse("begin\n while (i > 0 and A[i] > key) do\n begin\n  A[i + 1] 🡨 A[i]\n  i 🡨 i - 1\n end\nend").expect("parses");
        let StmtKind::While { condition, body } = &program.body[0].kind else {
            panic!("expected while");
        };
        assert!(is_array_shift_loop(condition, body));
    }
}
