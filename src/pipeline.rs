//! Source text in, [`Report`] out.

use crate::analysis::idioms::IdiomMatch;
use crate::analysis::line_costs::{LineCost, LineCostAnalyzer};
use crate::analysis::tree::{RecursionTree, DEFAULT_DEPTH};
use crate::analysis::{
    ComplexityAnalyzer, RecurrenceExtractor, RecurrenceRelation, RecurrenceSolution,
    RecurrenceSolver,
};
use crate::ast::{Program, Statement};
use crate::error::{AnalyzerError, CorrectionError};
use crate::frontend::{parse_with, ParserConfig};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub enable_validations: bool,
    pub enable_grammar_correction: bool,
    /// A correction is only used when its confidence is strictly above this.
    pub correction_threshold: f64,
    pub tree_depth: u32,
    pub parser: ParserConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            enable_validations: true,
            enable_grammar_correction: true,
            correction_threshold: 0.5,
            tree_depth: DEFAULT_DEPTH,
            parser: ParserConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correction {
    pub corrected_code: String,
    pub explanation: String,
    pub confidence: f64,
}

/// Rewrites pseudocode that failed to parse. Implementations live outside
/// this crate; the pipeline calls one at most once per run.
pub trait GrammarCorrector {
    fn correct(&self, pseudocode: &str, error_message: &str) -> Result<Correction, CorrectionError>;
}

/// Semantic checks on a parsed program. Findings are warnings, not errors.
pub trait Validator {
    fn validate(&self, program: &Program) -> Vec<String>;
}

pub struct EmptyProgramValidator;

impl Validator for EmptyProgramValidator {
    fn validate(&self, program: &Program) -> Vec<String> {
        if program.body.is_empty() && program.procedures.is_empty() {
            vec!["Program body is empty. Analysis result may be trivial.".to_string()]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub best_case: String,
    pub worst_case: String,
    pub average_case: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub summary: Summary,
    pub annotations: BTreeMap<String, String>,
    pub idiom: Option<IdiomMatch>,
    pub recurrence: Option<RecurrenceRelation>,
    pub solution: Option<RecurrenceSolution>,
    pub tree: Option<RecursionTree>,
    pub line_costs: Vec<LineCost>,
    pub warnings: Vec<String>,
}

pub struct Pipeline {
    config: PipelineConfig,
    analyzer: ComplexityAnalyzer,
    extractor: RecurrenceExtractor,
    solver: RecurrenceSolver,
    validators: Vec<Box<dyn Validator>>,
    corrector: Option<Box<dyn GrammarCorrector>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Pipeline {
            config,
            analyzer: ComplexityAnalyzer::new(),
            extractor: RecurrenceExtractor::new(),
            solver: RecurrenceSolver::new(),
            validators: vec![Box::new(EmptyProgramValidator)],
            corrector: None,
        }
    }

    pub fn with_corrector(mut self, corrector: impl GrammarCorrector + 'static) -> Self {
        self.corrector = Some(Box::new(corrector));
        self
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&self, source: &str) -> Result<Report, AnalyzerError> {
        let (program, correction) = self.parse(source)?;
        let parsed_source = correction
            .as_ref()
            .map_or(source, |c| c.corrected_code.as_str());

        let mut warnings = Vec::new();
        if self.config.enable_validations {
            for validator in &self.validators {
                warnings.extend(validator.validate(&program));
            }
        }

        let result = self.analyzer.analyze(&program);
        let mut annotations = result.annotations;
        annotations.insert(
            "statement_count".to_string(),
            statement_count(&program).to_string(),
        );
        if !result.cases.is_ordered() {
            warnings.push(format!(
                "Case estimates are not ordered: best {}, average {}, worst {}.",
                result.best_case, result.average_case, result.worst_case
            ));
        }

        let relation = self.extractor.extract(&program);
        annotations.insert("recurrence".to_string(), relation.recurrence.clone());

        let (solution, tree) = if relation.shape.is_recursive() {
            let solution = self.solver.solve_or_inconclusive(&relation.shape);
            if solution.is_inconclusive() {
                warnings.push(format!(
                    "No closed form found for {}; the structural estimate stands.",
                    relation.recurrence
                ));
            } else {
                annotations.insert("recurrence_solution".to_string(), solution.theta.clone());
            }
            let tree = RecursionTree::from_recurrence(&relation.shape, self.config.tree_depth);
            (Some(solution), tree)
        } else {
            (None, None)
        };

        if let Some(correction) = &correction {
            annotations.insert(
                "grammar_correction".to_string(),
                correction.explanation.clone(),
            );
            annotations.insert(
                "correction_confidence".to_string(),
                correction.confidence.to_string(),
            );
        }

        let line_costs = LineCostAnalyzer::new().analyze(&program, parsed_source);
        tracing::debug!(
            best = %result.best_case,
            worst = %result.worst_case,
            average = %result.average_case,
            warnings = warnings.len(),
            "analysis finished"
        );

        Ok(Report {
            summary: Summary {
                best_case: result.best_case,
                worst_case: result.worst_case,
                average_case: result.average_case,
            },
            annotations,
            idiom: result.idiom,
            recurrence: Some(relation),
            solution,
            tree,
            line_costs,
            warnings,
        })
    }

    /// Parse, retrying once with a correction when one is configured. Any
    /// failure along the retry path reports the first error.
    fn parse(&self, source: &str) -> Result<(Program, Option<Correction>), AnalyzerError> {
        let error = match parse_with(source, self.config.parser) {
            Ok(program) => return Ok((program, None)),
            Err(error) => error,
        };

        let corrector = match &self.corrector {
            Some(corrector) if self.config.enable_grammar_correction => corrector,
            _ => return Err(error),
        };

        let correction = match corrector.correct(source, &error.to_string()) {
            Ok(correction) => correction,
            Err(failure) => {
                tracing::debug!(%failure, "grammar corrector failed");
                return Err(error);
            }
        };
        // NaN compares false, so it is rejected here
        let accepted = correction.confidence > self.config.correction_threshold;
        if !accepted {
            tracing::debug!(confidence = correction.confidence, "correction rejected");
            return Err(error);
        }

        match parse_with(&correction.corrected_code, self.config.parser) {
            Ok(program) => {
                tracing::debug!(confidence = correction.confidence, "correction accepted");
                Ok((program, Some(correction)))
            }
            Err(retry) => {
                tracing::debug!(%retry, "corrected source still fails to parse");
                Err(error)
            }
        }
    }
}

/// Run the default pipeline.
pub fn run(source: &str) -> Result<Report, AnalyzerError> {
    Pipeline::default().run(source)
}

fn statement_count(program: &Program) -> usize {
    fn count(statements: &[Statement]) -> usize {
        statements
            .iter()
            .map(|s| 1 + s.children().into_iter().map(count).sum::<usize>())
            .sum()
    }
    count(&program.body)
        + program
            .procedures
            .iter()
            .map(|p| count(&p.body))
            .sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    const BROKEN: &str = "begin\n  x 🡨 1\n";
    const FIXED: &str = "begin\n  x 🡨 1\nend";

    struct StubCorrector {
        result: Result<Correction, CorrectionError>,
        calls: Rc<Cell<usize>>,
    }

    impl StubCorrector {
        fn returning(code: &str, confidence: f64) -> (Self, Rc<Cell<usize>>) {
            let calls = Rc::new(Cell::new(0));
            let stub = StubCorrector {
                result: Ok(Correction {
                    corrected_code: code.to_string(),
                    explanation: "added the missing end".to_string(),
                    confidence,
                }),
                calls: Rc::clone(&calls),
            };
            (stub, calls)
        }
    }

    impl GrammarCorrector for StubCorrector {
        fn correct(&self, _: &str, _: &str) -> Result<Correction, CorrectionError> {
            self.calls.set(self.calls.get() + 1);
            self.result.clone()
        }
    }

    fn original_error() -> AnalyzerError {
        parse_with(BROKEN, ParserConfig::default()).unwrap_err()
    }

    #[test]
    fn confident_correction_is_retried_once() {
        let (stub, calls) = StubCorrector::returning(FIXED, 0.9);
        let report = Pipeline::default().with_corrector(stub).run(BROKEN).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(report.summary.worst_case, "O(1)");
        assert_eq!(
            report.annotations.get("grammar_correction").map(String::as_str),
            Some("added the missing end")
        );
        assert_eq!(
            report.annotations.get("correction_confidence").map(String::as_str),
            Some("0.9")
        );
    }

    #[test]
    fn rejected_corrections_surface_the_original_error() {
        let (low, _) = StubCorrector::returning(FIXED, 0.5);
        let err = Pipeline::default().with_corrector(low).run(BROKEN).unwrap_err();
        assert_eq!(err, original_error());

        let (unknown, _) = StubCorrector::returning(FIXED, f64::NAN);
        let err = Pipeline::default().with_corrector(unknown).run(BROKEN).unwrap_err();
        assert_eq!(err, original_error());

        let (still_broken, calls) = StubCorrector::returning("begin", 0.95);
        let err = Pipeline::default()
            .with_corrector(still_broken)
            .run(BROKEN)
            .unwrap_err();
        assert_eq!(calls.get(), 1);
        assert_eq!(err, original_error());

        let failing = StubCorrector {
            result: Err(CorrectionError::new("service unavailable")),
            calls: Rc::new(Cell::new(0)),
        };
        let err = Pipeline::default().with_corrector(failing).run(BROKEN).unwrap_err();
        assert_eq!(err, original_error());
    }

    #[test]
    fn correction_can_be_disabled() {
        let (stub, calls) = StubCorrector::returning(FIXED, 0.9);
        let config = PipelineConfig {
            enable_grammar_correction: false,
            ..PipelineConfig::default()
        };
        assert!(Pipeline::new(config).with_corrector(stub).run(BROKEN).is_err());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn lexer_errors_propagate() {
        let err = run("begin\n  print \"never closed\nend").unwrap_err();
        assert!(matches!(err, AnalyzerError::Lexer(_)));
    }

    #[test]
    fn empty_programs_warn() {
        let report = run("begin\nend").unwrap();
        assert_eq!(report.summary.best_case, "Ω(1)");
        assert_eq!(report.summary.average_case, "Θ(1)");
        assert_eq!(
            report.warnings,
            vec!["Program body is empty. Analysis result may be trivial.".to_string()]
        );

        let quiet = PipelineConfig {
            enable_validations: false,
            ..PipelineConfig::default()
        };
        assert!(Pipeline::new(quiet).run("begin\nend").unwrap().warnings.is_empty());
    }

    #[test]
    fn recursive_programs_are_solved() {
        let source = "procedure sort(A, p, r)\nbegin\n if p < r then\n begin\n  q 🡨 (p + r) div 2\n  CALL sort(A, p, q)\n  CALL sort(A, q + 1, r)\n  for i 🡨 p to r do x 🡨 A[i]\n end\nend";
        let report = run(source).unwrap();
        let relation = report.recurrence.expect("relation");
        assert_eq!(relation.recurrence, "T(n) = 2*T(n/2) + n");
        let solution = report.solution.expect("solution");
        assert_eq!(solution.theta, "Θ(n log n)");
        assert_eq!(
            report.annotations.get("recurrence_solution").map(String::as_str),
            Some("Θ(n log n)")
        );
        assert!(report.tree.is_some());
        assert!(!report.line_costs.is_empty());
    }

    #[test]
    fn iterative_programs_have_no_solution() {
        let report = run("begin\n for i 🡨 1 to n do x 🡨 i\nend").unwrap();
        assert_eq!(report.summary.worst_case, "O(n)");
        assert!(report.solution.is_none());
        assert!(report.tree.is_none());
        assert_eq!(report.annotations.get("statement_count").map(String::as_str), Some("2"));
    }
}
