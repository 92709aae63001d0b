//! Asymptotic complexity estimates for textbook pseudocode.
//!
//! ```text
//! source -> tokens -> AST -> { complexity analyzer, recurrence extractor }
//!                                                    -> solver -> recursion tree
//! ```
//!
//! [`run`] drives the whole chain and returns a [`Report`](pipeline::Report).

pub mod analysis;
pub mod ast;
pub mod error;
mod frontend;
pub mod grammar;
pub mod pipeline;

pub use frontend::{parse, parse_with, tokenize, Parser, ParserConfig, Token, TokenKind};
pub use pipeline::{run, Pipeline, PipelineConfig, Report};
