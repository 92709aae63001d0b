use super::Expr;

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StmtKind,
    pub line: usize,
    pub column: usize,
}

impl Statement {
    pub fn new(kind: StmtKind, line: usize, column: usize) -> Self {
        Statement { kind, line, column }
    }

    pub fn is_loop(&self) -> bool {
        matches!(
            self.kind,
            StmtKind::For { .. } | StmtKind::While { .. } | StmtKind::RepeatUntil { .. }
        )
    }

    /// Nested statement lists, in source order.
    pub fn children(&self) -> Vec<&[Statement]> {
        match &self.kind {
            StmtKind::For { body, .. }
            | StmtKind::While { body, .. }
            | StmtKind::RepeatUntil { body, .. } => vec![body.as_slice()],
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => vec![then_branch.as_slice(), else_branch.as_slice()],
            StmtKind::Assignment { .. }
            | StmtKind::Call { .. }
            | StmtKind::Return(_)
            | StmtKind::Print(_)
            | StmtKind::NoOp => Vec::new(),
        }
    }

    /// Expressions held directly by this statement, not by nested ones.
    pub fn expressions(&self) -> Vec<&Expr> {
        match &self.kind {
            StmtKind::Assignment { target, value } => vec![target, value],
            StmtKind::For { start, stop, .. } => vec![start, stop],
            StmtKind::While { condition, .. } | StmtKind::RepeatUntil { condition, .. } => {
                vec![condition]
            }
            StmtKind::If { condition, .. } => vec![condition],
            StmtKind::Call { arguments, .. } => arguments.iter().collect(),
            StmtKind::Return(value) => value.iter().collect(),
            StmtKind::Print(expr) => vec![expr],
            StmtKind::NoOp => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Assignment {
        target: Expr,
        value: Expr,
    },
    For {
        iterator: String,
        start: Expr,
        stop: Expr,
        body: Vec<Statement>,
    },
    While {
        condition: Expr,
        body: Vec<Statement>,
    },
    RepeatUntil {
        body: Vec<Statement>,
        condition: Expr,
    },
    If {
        condition: Expr,
        then_branch: Vec<Statement>,
        else_branch: Vec<Statement>,
    },
    Call {
        name: String,
        arguments: Vec<Expr>,
    },
    Return(Option<Expr>),
    Print(Expr),
    NoOp,
}
