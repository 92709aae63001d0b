use super::idioms::{self, IdiomMatch, Signature};
use super::measure::{CaseComplexity, ComplexityMeasure, BIG_O, OMEGA, THETA};
use super::patterns::{default_recognizers, PatternMatch, Recognizer};
use super::shape::{self, LoopGrowth, RecursionTarget};
use crate::ast::{Program, Spanned, Statement, StmtKind};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexityResult {
    pub best_case: String,
    pub worst_case: String,
    pub average_case: String,
    pub cases: CaseComplexity,
    pub idiom: Option<IdiomMatch>,
    pub annotations: BTreeMap<String, String>,
}

/// Bottom-up fold over statement lists. Sequences keep the dominant term,
/// branches let the best case take the cheaper side, loops scale their
/// body by the loop's growth.
pub struct ComplexityAnalyzer {
    recognizers: Vec<Box<dyn Recognizer>>,
}

impl Default for ComplexityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ComplexityAnalyzer {
    pub fn new() -> Self {
        Self::with_recognizers(default_recognizers())
    }

    pub fn with_recognizers(recognizers: Vec<Box<dyn Recognizer>>) -> Self {
        ComplexityAnalyzer { recognizers }
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn analyze(&self, program: &Program) -> ComplexityResult {
        let matches: Vec<PatternMatch> = self
            .recognizers
            .iter()
            .flat_map(|r| r.recognize(program))
            .collect();

        let mut annotations = BTreeMap::new();
        let summary = if matches.is_empty() {
            "No relevant patterns detected.".to_string()
        } else {
            matches
                .iter()
                .map(|m| m.description.as_str())
                .collect::<Vec<_>>()
                .join("; ")
        };
        annotations.insert("pattern_summary".to_string(), summary);

        let mut cases = self.analyze_block(&program.body);
        for procedure in &program.procedures {
            cases = cases.max_with(self.analyze_block(&procedure.body));
        }

        let idiom = recursive_idiom(program);
        if let Some(matched) = &idiom {
            tracing::debug!(
                idiom = %matched.idiom,
                procedure = %matched.procedure,
                calls = matched.recursive_calls,
                "recursive idiom matched"
            );
            cases = cases.max_with(matched.idiom.case_complexity());
        }

        let mut heuristic = format!(
            "Estimated polynomial degree -> best: {}, worst: {}, average: {}.",
            cases.best.degree, cases.worst.degree, cases.average.degree
        );
        if let Some(matched) = &idiom {
            heuristic.push_str(&format!(
                " Recursive heuristic applied. Pattern: {}.",
                matched.idiom
            ));
        }
        annotations.insert("heuristic".to_string(), heuristic);
        annotations.insert(
            "note".to_string(),
            "Complexity estimated by structural analysis.".to_string(),
        );

        ComplexityResult {
            best_case: cases.best.to_notation(OMEGA),
            worst_case: cases.worst.to_notation(BIG_O),
            average_case: cases.average.to_notation(THETA),
            cases,
            idiom,
            annotations,
        }
    }

    pub fn analyze_block(&self, statements: &[Statement]) -> CaseComplexity {
        statements
            .iter()
            .fold(CaseComplexity::constant(), |acc, statement| {
                acc.combine_sequence(self.analyze_statement(statement))
            })
    }

    fn analyze_statement(&self, statement: &Statement) -> CaseComplexity {
        match &statement.kind {
            StmtKind::For {
                iterator,
                start,
                stop,
                body,
            } => {
                let growth = shape::for_growth(iterator, start, stop);
                trace_loop(statement, growth);
                scale(self.analyze_block(body), growth)
            }
            StmtKind::While { condition, body } => {
                let growth = shape::while_growth(condition, body);
                trace_loop(statement, growth);
                let scaled = scale(self.analyze_block(body), growth);
                if idioms::has_early_exit(condition, body) {
                    tracing::trace!(line = statement.line(), "loop can exit early");
                    CaseComplexity {
                        best: ComplexityMeasure::CONSTANT,
                        ..scaled
                    }
                } else {
                    scaled
                }
            }
            StmtKind::RepeatUntil { body, condition } => {
                let growth = shape::repeat_growth(condition, body);
                trace_loop(statement, growth);
                scale(self.analyze_block(body), growth)
            }
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => self
                .analyze_block(then_branch)
                .combine_branch(self.analyze_block(else_branch)),
            StmtKind::Assignment { .. }
            | StmtKind::Call { .. }
            | StmtKind::Return(_)
            | StmtKind::Print(_)
            | StmtKind::NoOp => CaseComplexity::constant(),
        }
    }
}

fn scale(case: CaseComplexity, growth: LoopGrowth) -> CaseComplexity {
    case.scale_by_degree(growth.degree())
        .scale_by_log(growth.log_power())
}

fn trace_loop(statement: &Statement, growth: LoopGrowth) {
    tracing::trace!(line = statement.line(), ?growth, "classified loop");
}

/// The idiom of the first procedure that calls itself, or of the main body
/// when it does.
pub fn recursive_idiom(program: &Program) -> Option<IdiomMatch> {
    let procedure = program.procedures.iter().find_map(|p| {
        let target = RecursionTarget::new(&p.name);
        (!target.call_sites(&p.body).is_empty()).then_some((p.name.as_str(), &p.body, target))
    });
    let main_name = program.name.as_deref().unwrap_or("self");
    let (name, body, target) = procedure.or_else(|| {
        let target = RecursionTarget::new(main_name);
        (!target.call_sites(&program.body).is_empty()).then_some((main_name, &program.body, target))
    })?;

    let signature = Signature::of(body, target);
    let (idiom, confidence) = idioms::classify(&signature)?;
    Some(IdiomMatch {
        idiom,
        confidence,
        procedure: name.to_string(),
        recursive_calls: signature.recursive_calls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::idioms::Idiom;
    use crate::frontend::parse;
    use pretty_assertions::assert_eq;

    fn analyze(source: &str) -> ComplexityResult {
        ComplexityAnalyzer::new().analyze(&parse(source).expect("parses"))
    }

    fn cases(result: &ComplexityResult) -> (&str, &str, &str) {
        (&result.best_case, &result.worst_case, &result.average_case)
    }

    #[test]
    fn nested_for_loops_multiply() {
        let result = analyze("begin\n for i 🡨 1 to n do\n begin\n  for j 🡨 1 to n do\n  begin\n   x 🡨 i + j\n  end\n end\nend");
        assert_eq!(cases(&result), ("Ω(n^2)", "O(n^2)", "Θ(n^2)"));
    }

    #[test]
    fn sibling_loops_do_not_add_up() {
        let result = analyze("begin\n for i 🡨 1 to n do x 🡨 i\n for j 🡨 1 to n do y 🡨 j\nend");
        assert_eq!(result.worst_case, "O(n)");
    }

    #[test]
    fn branch_best_case_takes_cheaper_side() {
        let result = analyze("begin\n if x > 0 then\n begin\n  for i 🡨 1 to n do\n  begin\n   y 🡨 i\n  end\n end\n else\n begin\n  y 🡨 0\n end\nend");
        assert_eq!(cases(&result), ("Ω(1)", "O(n)", "Θ(n)"));
    }

    #[test]
    fn early_exit_flag_drops_best_case() {
        let result = analyze("begin\n i 🡨 1\n while (i <= n and found = f) do\n begin\n  if (A[i] = x) then\n  begin\n   found 🡨 t\n  end\n  i 🡨 i + 1\n end\nend");
        assert_eq!(cases(&result), ("Ω(1)", "O(n)", "Θ(n)"));
    }

    #[test]
    fn repeat_with_literal_bound_is_constant() {
        let result = analyze("begin\n i 🡨 0\n repeat\n  i 🡨 i + 1\n until i >= 10\nend");
        assert_eq!(result.worst_case, "O(1)");
    }

    #[test]
    fn main_body_self_recursion_is_linear() {
        let result = analyze("begin\n if (n <= 1) then\n begin\n  return 1\n end\n return n * CALL self(n - 1)\nend");
        assert_eq!(cases(&result), ("Ω(n)", "O(n)", "Θ(n)"));
        let matched = result.idiom.expect("idiom");
        assert_eq!(matched.idiom, Idiom::Linear);
        assert_eq!(matched.procedure, "self");
        assert!(result.annotations["heuristic"].contains("Pattern: linear"));
    }

    #[test]
    fn idiom_only_raises_structural_estimate() {
        let result = analyze("procedure f(n)\nbegin\n for i 🡨 1 to n do\n begin\n  for j 🡨 1 to n do\n  begin\n   x 🡨 j\n  end\n end\n CALL f(n - 1)\nend");
        assert_eq!(result.worst_case, "O(n^2)");
        assert_eq!(result.best_case, "Ω(n^2)");
    }

    #[test]
    fn pattern_summary_lists_recognizers() {
        let result = analyze("begin\n x 🡨 1\nend");
        assert_eq!(result.annotations["pattern_summary"], "No relevant patterns detected.");
        let result = analyze("begin\n for i 🡨 1 to n do x 🡨 i\nend");
        assert_eq!(
            result.annotations["pattern_summary"],
            "The program contains iterative structures."
        );
    }

    #[test]
    fn analysis_is_idempotent() {
        let program = parse("begin\n for i 🡨 1 to n do\n begin\n  j 🡨 n\n  while j > 1 do\n  begin\n   j 🡨 j div 2\n  end\n end\nend")
            .expect("parses");
        let analyzer = ComplexityAnalyzer::new();
        let first = analyzer.analyze(&program);
        assert_eq!(first.worst_case, "O(n log n)");
        assert_eq!(first, analyzer.analyze(&program));
    }
}
