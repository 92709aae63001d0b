use super::complexity::ComplexityAnalyzer;
use super::idioms;
use super::measure::ComplexityMeasure;
use super::recurrence::Recurrence;
use super::shape::{self, ArgumentShape, LoopGrowth, RecursionTarget};
use crate::ast::{Program, Spanned, Statement, StmtKind};
use serde::Serialize;

pub const BASE_CASE: &str = "T(1) = 1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RecurrenceStats {
    pub max_loop_depth: u32,
    pub max_log_depth: u32,
    pub recursive_calls: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurrenceRelation {
    pub identifier: String,
    /// `shape` rendered as an equation.
    pub recurrence: String,
    pub base_case: String,
    pub notes: String,
    pub shape: Recurrence,
    pub stats: RecurrenceStats,
}

#[derive(Debug, Clone, Copy, Default)]
struct Depth {
    loops: u32,
    logs: u32,
}

impl Depth {
    fn enter(self, growth: LoopGrowth) -> Depth {
        Depth {
            loops: self.loops + growth.degree(),
            logs: self.logs + growth.log_power(),
        }
    }

    fn measure(self) -> ComplexityMeasure {
        ComplexityMeasure::new(self.loops, self.logs)
    }
}

#[derive(Debug, Default)]
struct Walk<'a> {
    max_loop_depth: u32,
    max_log_depth: u32,
    recursive: Vec<Option<ArgumentShape>>,
    callees: Vec<(&'a str, Depth)>,
}

impl<'a> Walk<'a> {
    fn merge(mut self, other: Walk<'a>) -> Walk<'a> {
        self.max_loop_depth = self.max_loop_depth.max(other.max_loop_depth);
        self.max_log_depth = self.max_log_depth.max(other.max_log_depth);
        self.recursive.extend(other.recursive);
        self.callees.extend(other.callees);
        self
    }

    fn reached(mut self, depth: Depth) -> Walk<'a> {
        self.max_loop_depth = self.max_loop_depth.max(depth.loops);
        self.max_log_depth = self.max_log_depth.max(depth.logs);
        self
    }
}

struct Scope<'a> {
    target: RecursionTarget<'a>,
    halving: Vec<&'a str>,
}

/// Second, independent pass over the AST that writes the main recursive
/// routine as a recurrence.
#[derive(Default)]
pub struct RecurrenceExtractor {
    analyzer: ComplexityAnalyzer,
}

impl RecurrenceExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn extract(&self, program: &Program) -> RecurrenceRelation {
        let main_name = program.name.as_deref().unwrap_or("self");
        let recursive_procedure = program
            .procedures
            .iter()
            .find(|p| !RecursionTarget::new(&p.name).call_sites(&p.body).is_empty());

        let (identifier, body) = match recursive_procedure.or_else(|| {
            program
                .body
                .is_empty()
                .then(|| program.procedures.last())
                .flatten()
        }) {
            Some(p) => (p.name.as_str(), p.body.as_slice()),
            None => (main_name, program.body.as_slice()),
        };

        let scope = Scope {
            target: RecursionTarget::new(identifier),
            halving: shape::halving_names(body),
        };
        let walk = walk_block(body, Depth::default(), &scope);
        let calls = u32::try_from(walk.recursive.len()).unwrap_or(u32::MAX);
        let local = ComplexityMeasure::new(walk.max_loop_depth, walk.max_log_depth);

        let (recurrence, notes) = match calls {
            0 => (
                Recurrence::closed(local),
                format!(
                    "Iterative algorithm with loop nesting {}.",
                    walk.max_loop_depth
                ),
            ),
            1 => {
                let shape = walk.recursive.iter().flatten().next().copied();
                if shape == Some(ArgumentShape::Halving) || local.is_constant() {
                    (
                        Recurrence::divide(1, 2, local),
                        "Single recursive call on a halved or constant-cost step (binary search shape)."
                            .to_string(),
                    )
                } else {
                    let amount = match shape {
                        Some(ArgumentShape::Decrement(k)) => k,
                        _ => 1,
                    };
                    (
                        Recurrence::subtract(1, amount, local),
                        "Simple linear recursion.".to_string(),
                    )
                }
            }
            calls => {
                let cost = if local.is_constant() {
                    self.callee_cost(program, &walk, &scope).max(local)
                } else {
                    local
                };
                let partitioned = idioms::has_partition(body);
                (
                    Recurrence::divide(calls, 2, cost).with_partition(partitioned),
                    format!(
                        "Divide and conquer: {} recursive calls with local cost {}.",
                        calls,
                        cost.to_notation("O")
                    ),
                )
            }
        };

        tracing::debug!(identifier, %recurrence, "extracted recurrence");
        RecurrenceRelation {
            identifier: identifier.to_string(),
            recurrence: recurrence.to_string(),
            base_case: BASE_CASE.to_string(),
            notes,
            shape: recurrence,
            stats: RecurrenceStats {
                max_loop_depth: walk.max_loop_depth,
                max_log_depth: walk.max_log_depth,
                recursive_calls: calls,
            },
        }
    }

    /// Each known callee's structural average case scaled by the loop
    /// nesting at its call site.
    fn callee_cost(&self, program: &Program, walk: &Walk<'_>, scope: &Scope<'_>) -> ComplexityMeasure {
        walk.callees
            .iter()
            .filter(|(name, _)| !scope.target.matches(name))
            .filter_map(|(name, depth)| {
                let callee = program.procedure(name)?;
                let average = self.analyzer.analyze_block(&callee.body).average;
                Some(average.multiply(depth.measure()))
            })
            .max()
            .unwrap_or(ComplexityMeasure::CONSTANT)
    }
}

pub fn extract(program: &Program) -> RecurrenceRelation {
    RecurrenceExtractor::new().extract(program)
}

fn walk_block<'a>(statements: &'a [Statement], depth: Depth, scope: &Scope<'_>) -> Walk<'a> {
    statements
        .iter()
        .map(|statement| walk_statement(statement, depth, scope))
        .fold(Walk::default(), Walk::merge)
}

fn walk_statement<'a>(statement: &'a Statement, depth: Depth, scope: &Scope<'_>) -> Walk<'a> {
    let mut walk = Walk::default();
    for (name, arguments) in shape::calls_in_statement(statement) {
        if scope.target.matches(name) {
            walk.recursive
                .push(shape::argument_shape(arguments, &scope.halving));
        } else {
            walk.callees.push((name, depth));
        }
    }

    let inner = match (&statement.kind, shape::loop_growth(statement)) {
        (StmtKind::While { condition, body }, Some(_))
            if idioms::is_array_shift_loop(condition, body) =>
        {
            tracing::trace!(line = statement.line(), "array shift counted as constant work");
            depth
        }
        (_, Some(growth)) => depth.enter(growth),
        (_, None) => depth,
    };

    statement
        .children()
        .into_iter()
        .map(|child| walk_block(child, inner, scope))
        .fold(walk.reached(inner), Walk::merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse;
    use pretty_assertions::assert_eq;

    fn equation(source: &str) -> String {
        extract(&parse(source).expect("parses")).recurrence
    }

    #[test]
    fn iterative_programs_have_closed_forms() {
        assert_eq!(equation("begin\n x 🡨 1\nend"), "T(n) = 1");
        assert_eq!(
            equation("begin\n for i 🡨 1 to n do\n begin\n  for j 🡨 1 to n do\n  begin\n   x 🡨 j\n  end\n end\n for k 🡨 1 to n do y 🡨 k\nend"),
            "T(n) = n^2"
        );
    }

    #[test]
    fn quicksort_takes_partition_cost() {
        let source = "Algoritmo QUICKSORT(A, p, r)\nbegin\n if (p < r) then\n begin\n  q 🡨 CALL PARTITION(A, p, r)\n  CALL QUICKSORT(A, p, q - 1)\n  CALL QUICKSORT(A, q + 1, r)\n end\nend\n\nPARTITION(A, p, r)\nbegin\n x 🡨 A[r]\n i 🡨 p - 1\n for j 🡨 p to r - 1 do\n begin\n  if (A[j] <= x) then\n  begin\n   i 🡨 i + 1\n  end\n end\n return i + 1\nend";
        let relation = extract(&parse(source).expect("parses"));
        assert_eq!(relation.identifier, "quicksort");
        assert_eq!(relation.recurrence, "T(n) = 2*T(n/2) + n");
        assert!(relation.shape.partitioned);
        assert_eq!(relation.base_case, BASE_CASE);
    }

    #[test]
    fn single_call_rules() {
        let factorial = "procedure fact(n)\nbegin\n if n <= 1 then\n begin\n  return 1\n end\n return n * CALL fact(n - 1)\nend";
        assert_eq!(equation(factorial), "T(n) = T(n/2) + 1");

        let scan = "procedure walk(n)\nbegin\n for i 🡨 1 to n do x 🡨 i\n CALL walk(n - 1)\nend";
        assert_eq!(equation(scan), "T(n) = T(n-1) + n");
    }

    #[test]
    fn log_loops_and_shifts() {
        let halving = "procedure f(n)\nbegin\n i 🡨 n\n while i > 1 do\n begin\n  i 🡨 i div 2\n end\n CALL f(n div 2)\n CALL f(n div 2)\nend";
        assert_eq!(equation(halving), "T(n) = 2*T(n/2) + log n");

        let insertion = "begin\n for j 🡨 2 to n do\n begin\n  i 🡨 j - 1\n  while (i > 0 and A[i] > key) do\n  begin\n   A[i + 1] 🡨 A[i]\n   i 🡨 i - 1\n  end\n end\nend";
        let relation = extract(&parse(insertion).expect("parses"));
        assert_eq!(relation.recurrence, "T(n) = n");
        assert_eq!(relation.stats.max_loop_depth, 1);
    }
}
