//! Passes over a parsed [`Program`](crate::ast::Program).
//!
//! The complexity analyzer and the recurrence extractor walk the same tree
//! independently; the solver and the tree builder only see the extracted
//! [`Recurrence`].

pub mod complexity;
pub mod extractor;
pub mod idioms;
pub mod line_costs;
pub mod measure;
pub mod patterns;
pub mod recurrence;
pub mod shape;
pub mod solver;
pub mod tree;

pub use complexity::{ComplexityAnalyzer, ComplexityResult};
pub use extractor::{extract, RecurrenceExtractor, RecurrenceRelation, RecurrenceStats};
pub use idioms::{Confidence, Idiom, IdiomMatch};
pub use line_costs::{LineCost, LineCostAnalyzer};
pub use measure::{CaseComplexity, ComplexityMeasure};
pub use recurrence::{Recurrence, Reduction, Term};
pub use solver::{solve, MathStep, RecurrenceSolution, RecurrenceSolver};
pub use tree::RecursionTree;
