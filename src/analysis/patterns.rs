use super::shape::{self, RecursionTarget};
use crate::ast::Program;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternMatch {
    pub name: &'static str,
    pub description: String,
}

pub trait Recognizer {
    fn recognize(&self, program: &Program) -> Vec<PatternMatch>;
}

/// Any loop in the main body or in a procedure.
pub struct LoopRecognizer;

impl Recognizer for LoopRecognizer {
    fn recognize(&self, program: &Program) -> Vec<PatternMatch> {
        let in_body = shape::contains_loop(&program.body);
        let in_procedures = program.procedures.iter().any(|p| shape::contains_loop(&p.body));
        if in_body || in_procedures {
            vec![PatternMatch {
                name: "loop-structure",
                description: "The program contains iterative structures.".to_string(),
            }]
        } else {
            Vec::new()
        }
    }
}

/// Self-calls in the main body, and the first procedure that calls itself.
pub struct RecursionRecognizer;

impl Recognizer for RecursionRecognizer {
    fn recognize(&self, program: &Program) -> Vec<PatternMatch> {
        let mut matches = Vec::new();
        let main = RecursionTarget::new(program.name.as_deref().unwrap_or("self"));
        if !main.call_sites(&program.body).is_empty() {
            matches.push(PatternMatch {
                name: "recursion",
                description: "A recursive pattern was detected in the main body.".to_string(),
            });
        }
        if let Some(procedure) = program
            .procedures
            .iter()
            .find(|p| !RecursionTarget::new(&p.name).call_sites(&p.body).is_empty())
        {
            matches.push(PatternMatch {
                name: "recursion",
                description: format!("Recursion detected in subroutine {}.", procedure.name),
            });
        }
        matches
    }
}

pub fn default_recognizers() -> Vec<Box<dyn Recognizer>> {
    vec![Box::new(LoopRecognizer), Box::new(RecursionRecognizer)]
}
