mod expr;
mod stmt;

pub use expr::*;
pub use stmt::*;

/// Anything that remembers where it came from in the source.
pub trait Spanned {
    fn line(&self) -> usize;
    fn column(&self) -> usize;
}

macro_rules! impl_spanned {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Spanned for $ty {
                fn line(&self) -> usize {
                    self.line
                }

                fn column(&self) -> usize {
                    self.column
                }
            }
        )*
    };
}

impl_spanned!(
    Program,
    ClassDefinition,
    Declaration,
    Procedure,
    Parameter,
    Statement,
    Expr,
);

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: Option<String>,
    pub class_definitions: Vec<ClassDefinition>,
    pub declarations: Vec<Declaration>,
    pub procedures: Vec<Procedure>,
    pub body: Vec<Statement>,
    pub line: usize,
    pub column: usize,
}

impl Program {
    pub fn procedure(&self, name: &str) -> Option<&Procedure> {
        self.procedures
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDefinition {
    pub name: String,
    pub attributes: Vec<String>,
    pub line: usize,
    pub column: usize,
}

/// A top-level `declare NAME ...` line. Whatever follows the name on that
/// line is kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub annotation: Option<String>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Procedure {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub body: Vec<Statement>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub datatype: Option<String>,
    pub line: usize,
    pub column: usize,
}
