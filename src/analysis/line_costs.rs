use super::measure::{ComplexityMeasure, BIG_O};
use super::shape::{self, LoopGrowth};
use crate::ast::{Program, Spanned, Statement, StmtKind};
use serde::Serialize;
use std::collections::BTreeMap;

pub const MAIN_SCOPE: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineCost {
    pub line: usize,
    /// The trimmed source text of the line.
    pub code: String,
    pub cost: String,
    pub scope: String,
    pub explanation: String,
}

/// How many times a line runs, estimated from the loops around it.
#[derive(Debug, Default)]
pub struct LineCostAnalyzer;

impl LineCostAnalyzer {
    pub fn new() -> Self {
        LineCostAnalyzer
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn analyze(&self, program: &Program, source: &str) -> Vec<LineCost> {
        let lines: Vec<&str> = source.lines().collect();
        let mut entries: BTreeMap<usize, Entry<'_>> = BTreeMap::new();

        visit_block(&program.body, ComplexityMeasure::CONSTANT, MAIN_SCOPE, &mut entries);
        for procedure in &program.procedures {
            visit_block(
                &procedure.body,
                ComplexityMeasure::CONSTANT,
                &procedure.name,
                &mut entries,
            );
        }

        entries
            .into_iter()
            .map(|(line, entry)| LineCost {
                line,
                code: line
                    .checked_sub(1)
                    .and_then(|index| lines.get(index))
                    .map(|text| text.trim().to_string())
                    .unwrap_or_default(),
                cost: entry.cost.to_notation(BIG_O),
                scope: entry.scope.to_string(),
                explanation: entry.explanation,
            })
            .collect()
    }
}

struct Entry<'a> {
    cost: ComplexityMeasure,
    scope: &'a str,
    explanation: String,
}

fn visit_block<'a>(
    statements: &[Statement],
    context: ComplexityMeasure,
    scope: &'a str,
    entries: &mut BTreeMap<usize, Entry<'a>>,
) {
    for statement in statements {
        visit_statement(statement, context, scope, entries);
    }
}

fn visit_statement<'a>(
    statement: &Statement,
    context: ComplexityMeasure,
    scope: &'a str,
    entries: &mut BTreeMap<usize, Entry<'a>>,
) {
    let explanation = explain(statement, context);
    record(entries, statement.line(), context, scope, explanation);

    let inner = match shape::loop_growth(statement) {
        Some(LoopGrowth::Linear) => context.add_degree(1),
        Some(LoopGrowth::Logarithmic) => context.add_log(1),
        Some(LoopGrowth::Constant) | None => context,
    };
    for child in statement.children() {
        visit_block(child, inner, scope, entries);
    }
}

/// Several statements can share a line; the most expensive one wins.
fn record<'a>(
    entries: &mut BTreeMap<usize, Entry<'a>>,
    line: usize,
    cost: ComplexityMeasure,
    scope: &'a str,
    explanation: String,
) {
    match entries.get(&line) {
        Some(existing) if existing.cost >= cost => {}
        _ => {
            entries.insert(
                line,
                Entry {
                    cost,
                    scope,
                    explanation,
                },
            );
        }
    }
}

fn explain(statement: &Statement, context: ComplexityMeasure) -> String {
    let what = match &statement.kind {
        StmtKind::Assignment { .. } => "assignment",
        StmtKind::For { .. } => "for loop header",
        StmtKind::While { .. } => "while loop condition",
        StmtKind::RepeatUntil { .. } => "repeat loop",
        StmtKind::If { .. } => "condition",
        StmtKind::Call { .. } => "call",
        StmtKind::Return(_) => "return",
        StmtKind::Print(_) => "print",
        StmtKind::NoOp => "ignored construct",
    };
    if context.is_constant() {
        format!("{} executed once", what)
    } else {
        format!("{} executed {} times", what, context.render_factors())
    }
}
