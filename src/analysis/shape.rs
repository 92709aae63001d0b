//! Structural queries over statements and expressions shared by the
//! analyzer, the recurrence extractor and the line-cost pass.

use crate::ast::{BinaryOp, Expr, ExprKind, Statement, StmtKind};

/// How fast a loop's trip count grows with the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopGrowth {
    Constant,
    Linear,
    Logarithmic,
}

impl LoopGrowth {
    pub fn degree(self) -> u32 {
        u32::from(self == LoopGrowth::Linear)
    }

    pub fn log_power(self) -> u32 {
        u32::from(self == LoopGrowth::Logarithmic)
    }
}

/// Whether `expr` can change with the input. Literals never do; identifiers
/// do unless listed in `ignore`; `length(...)` always does.
pub fn depends_on_input(expr: &Expr, ignore: &[&str]) -> bool {
    match &expr.kind {
        ExprKind::Number(_) | ExprKind::Boolean(_) | ExprKind::Null | ExprKind::String(_) => false,
        ExprKind::Identifier(name) => !ignore.contains(&name.as_str()),
        ExprKind::Length(_) => true,
        ExprKind::FieldAccess { base, .. } => depends_on_input(base, ignore),
        ExprKind::ArrayAccess { base, index } => {
            depends_on_input(base, ignore) || depends_on_input(index, ignore)
        }
        ExprKind::Range { start, end } => {
            depends_on_input(start, ignore) || depends_on_input(end, ignore)
        }
        ExprKind::Unary { operand, .. } => depends_on_input(operand, ignore),
        ExprKind::Binary { left, right, .. } => {
            depends_on_input(left, ignore) || depends_on_input(right, ignore)
        }
        ExprKind::Call { .. } | ExprKind::ArrayCreation { .. } => true,
    }
}

/// The variable a loop condition is bounded on: a bare identifier on either
/// side of the first relational comparison, looking through `and`/`or`.
pub fn loop_variable(condition: &Expr) -> Option<&str> {
    match &condition.kind {
        ExprKind::Binary { op, left, right } if op.is_relational() => {
            left.as_identifier().or_else(|| right.as_identifier())
        }
        ExprKind::Binary { op, left, right } if op.is_logical() => {
            loop_variable(left).or_else(|| loop_variable(right))
        }
        _ => None,
    }
}

pub fn contains_comparison(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Binary { op, left, right } => {
            op.is_relational() || contains_comparison(left) || contains_comparison(right)
        }
        ExprKind::Unary { operand, .. } => contains_comparison(operand),
        _ => false,
    }
}

/// `(a + b) / k` or `(a + b) div k`, returning the two operands of the sum.
pub fn midpoint_operands(expr: &Expr) -> Option<(&Expr, &Expr)> {
    match &expr.kind {
        ExprKind::Binary { op, left, .. } if op.is_division() => match &left.kind {
            ExprKind::Binary {
                op: BinaryOp::Add,
                left,
                right,
            } => Some((left, right)),
            _ => None,
        },
        _ => None,
    }
}

pub fn is_midpoint(expr: &Expr) -> bool {
    midpoint_operands(expr).is_some()
}

/// `x / k` or `x div k` with a literal `k >= 2`.
pub fn is_halving(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Binary { op, right, .. } if op.is_division() => {
            right.as_number().is_some_and(|k| k >= 2)
        }
        _ => false,
    }
}

/// `name - k` for a literal `k`.
pub fn decrement_of(expr: &Expr) -> Option<(&str, i64)> {
    match &expr.kind {
        ExprKind::Binary {
            op: BinaryOp::Sub,
            left,
            right,
        } => Some((left.as_identifier()?, right.as_number()?)),
        _ => None,
    }
}

/// `name + k` or `name - k` for a literal `k`.
fn offset_of(expr: &Expr) -> Option<(&str, i64)> {
    match &expr.kind {
        ExprKind::Binary {
            op: op @ (BinaryOp::Add | BinaryOp::Sub),
            left,
            right,
        } => {
            let k = right.as_number()?;
            let k = if *op == BinaryOp::Sub { -k } else { k };
            Some((left.as_identifier()?, k))
        }
        _ => None,
    }
}

fn assigned_name(statement: &Statement) -> Option<(&str, &Expr)> {
    match &statement.kind {
        StmtKind::Assignment { target, value } => Some((target.as_identifier()?, value)),
        _ => None,
    }
}

/// Assignments in `statements` and in nested `if` branches, not in nested
/// loops.
pub fn shallow_assignments(statements: &[Statement]) -> Vec<(&str, &Expr)> {
    let mut found = Vec::new();
    for statement in statements {
        if let Some(pair) = assigned_name(statement) {
            found.push(pair);
        } else if let StmtKind::If {
            then_branch,
            else_branch,
            ..
        } = &statement.kind
        {
            found.extend(shallow_assignments(then_branch));
            found.extend(shallow_assignments(else_branch));
        }
    }
    found
}

/// Names assigned a midpoint or a halving anywhere in `statements`.
pub fn halving_names(statements: &[Statement]) -> Vec<&str> {
    let mut names = Vec::new();
    for statement in statements {
        if let Some((name, value)) = assigned_name(statement) {
            if is_midpoint(value) || is_halving(value) {
                names.push(name);
            }
        }
        for child in statement.children() {
            names.extend(halving_names(child));
        }
    }
    names
}

/// The body steps `var` by a literal: `var <- var + k` or `var <- var - k`.
pub fn progresses(statements: &[Statement], var: &str) -> bool {
    shallow_assignments(statements)
        .into_iter()
        .any(|(name, value)| name == var && offset_of(value).is_some_and(|(base, _)| base == var))
}

fn scales_by_literal(value: &Expr, var: &str) -> bool {
    match &value.kind {
        ExprKind::Binary { op, left, right } if op.is_division() => {
            left.as_identifier() == Some(var) && right.as_number().is_some_and(|k| k >= 2)
        }
        ExprKind::Binary {
            op: BinaryOp::Mul,
            left,
            right,
        } => {
            let literal_ge_two = |e: &Expr| e.as_number().is_some_and(|k| k >= 2);
            (left.as_identifier() == Some(var) && literal_ge_two(right))
                || (right.as_identifier() == Some(var) && literal_ge_two(left))
        }
        _ => false,
    }
}

/// A midpoint `m <- (lo + hi) / 2` followed by `lo` or `hi` being moved to
/// `m` or `m ± k`.
pub fn narrows_bounds(statements: &[Statement]) -> bool {
    let assignments = shallow_assignments(statements);
    assignments.iter().any(|(mid, value)| {
        let Some((lo, hi)) = midpoint_operands(value) else {
            return false;
        };
        let bounds = [lo.as_identifier(), hi.as_identifier()];
        assignments.iter().any(|(name, value)| {
            bounds.contains(&Some(*name))
                && (value.as_identifier() == Some(*mid)
                    || offset_of(value).is_some_and(|(base, _)| base == *mid))
        })
    })
}

/// A loop on `var` whose trip count is logarithmic: `var` is divided or
/// multiplied by a literal, or the body bisects a range.
pub fn is_logarithmic_loop(var: Option<&str>, body: &[Statement]) -> bool {
    if narrows_bounds(body) {
        return true;
    }
    let Some(var) = var else {
        return false;
    };
    shallow_assignments(body)
        .into_iter()
        .any(|(name, value)| name == var && scales_by_literal(value, var))
}

pub fn while_growth(condition: &Expr, body: &[Statement]) -> LoopGrowth {
    let var = loop_variable(condition);
    if is_logarithmic_loop(var, body) {
        return LoopGrowth::Logarithmic;
    }
    match var {
        Some(var) if progresses(body, var) => {
            if depends_on_input(condition, &[var]) {
                LoopGrowth::Linear
            } else {
                LoopGrowth::Constant
            }
        }
        _ => LoopGrowth::Linear,
    }
}

/// A `repeat` body runs at least once; without a static bound it is
/// assumed to depend on the input.
pub fn repeat_growth(condition: &Expr, body: &[Statement]) -> LoopGrowth {
    let var = loop_variable(condition);
    if is_logarithmic_loop(var, body) {
        return LoopGrowth::Logarithmic;
    }
    let ignore: Vec<&str> = var.filter(|v| progresses(body, v)).into_iter().collect();
    if depends_on_input(condition, &ignore) {
        LoopGrowth::Linear
    } else {
        LoopGrowth::Constant
    }
}

pub fn for_growth(iterator: &str, start: &Expr, stop: &Expr) -> LoopGrowth {
    let ignore = [iterator];
    if depends_on_input(stop, &ignore) || depends_on_input(start, &ignore) {
        LoopGrowth::Linear
    } else {
        LoopGrowth::Constant
    }
}

/// Growth of a loop statement, `None` for anything else.
pub fn loop_growth(statement: &Statement) -> Option<LoopGrowth> {
    match &statement.kind {
        StmtKind::For {
            iterator,
            start,
            stop,
            ..
        } => Some(for_growth(iterator, start, stop)),
        StmtKind::While { condition, body } => Some(while_growth(condition, body)),
        StmtKind::RepeatUntil { body, condition } => Some(repeat_growth(condition, body)),
        _ => None,
    }
}

pub fn contains_loop(statements: &[Statement]) -> bool {
    statements
        .iter()
        .any(|s| s.is_loop() || s.children().into_iter().any(contains_loop))
}

/// Call expressions reachable from `expr`, outermost first.
pub fn calls_in_expr<'a>(expr: &'a Expr, out: &mut Vec<(&'a str, &'a [Expr])>) {
    if let ExprKind::Call { name, arguments } = &expr.kind {
        out.push((name.as_str(), arguments.as_slice()));
    }
    for child in expr.children() {
        calls_in_expr(child, out);
    }
}

/// Calls made directly by one statement: a call statement and every call
/// expression in the statement's own expressions.
pub fn calls_in_statement(statement: &Statement) -> Vec<(&str, &[Expr])> {
    let mut calls = Vec::new();
    if let StmtKind::Call { name, arguments } = &statement.kind {
        calls.push((name.as_str(), arguments.as_slice()));
    }
    for expr in statement.expressions() {
        calls_in_expr(expr, &mut calls);
    }
    calls
}

/// Every call in `statements`, including nested bodies.
pub fn all_calls(statements: &[Statement]) -> Vec<(&str, &[Expr])> {
    let mut calls = Vec::new();
    for statement in statements {
        calls.extend(calls_in_statement(statement));
        for child in statement.children() {
            calls.extend(all_calls(child));
        }
    }
    calls
}

/// Whose self-calls count as recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecursionTarget<'a> {
    pub name: &'a str,
}

impl<'a> RecursionTarget<'a> {
    pub fn new(name: &'a str) -> Self {
        RecursionTarget { name }
    }

    pub fn matches(&self, callee: &str) -> bool {
        callee.eq_ignore_ascii_case(self.name) || callee.eq_ignore_ascii_case("self")
    }

    /// Argument lists of every recursive call site in `statements`.
    pub fn call_sites<'s>(&self, statements: &'s [Statement]) -> Vec<&'s [Expr]> {
        all_calls(statements)
            .into_iter()
            .filter(|(name, _)| self.matches(name))
            .map(|(_, arguments)| arguments)
            .collect()
    }
}

/// How a recursive call shrinks its input, read from its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentShape {
    Halving,
    Decrement(u32),
}

/// Halving wins over decrement: `x / k`, `x div k`, a midpoint, a name bound
/// to one of those (or that name plus an offset), or a range slice.
pub fn argument_shape(arguments: &[Expr], halving: &[&str]) -> Option<ArgumentShape> {
    let is_halving_name = |e: &Expr| e.as_identifier().is_some_and(|n| halving.contains(&n));
    let halves = |e: &Expr| {
        is_halving(e)
            || is_midpoint(e)
            || is_halving_name(e)
            || offset_of(e).is_some_and(|(base, _)| halving.contains(&base))
            || matches!(&e.kind, ExprKind::Range { .. })
            || matches!(&e.kind, ExprKind::ArrayAccess { index, .. } if matches!(index.kind, ExprKind::Range { .. }))
    };
    if arguments.iter().any(halves) {
        return Some(ArgumentShape::Halving);
    }
    arguments.iter().find_map(|e| {
        let (_, k) = decrement_of(e)?;
        u32::try_from(k).ok().filter(|k| *k > 0).map(ArgumentShape::Decrement)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse;

    fn body(source: &str) -> Vec<Statement> {
        parse(source).expect("parses").body
    }

    fn first_while(statements: &[Statement]) -> (&Expr, &[Statement]) {
        match &statements.iter().find(|s| s.is_loop()).expect("a loop").kind {
            StmtKind::While { condition, body } => (condition, body),
            other => panic!("expected while, got {:?}", other),
        }
    }

    #[test]
    fn unit_step_loop_is_linear() {
        let statements = body("begin\n i 🡨 1\n while i <= n do\n begin\n  i 🡨 i + 1\n end\nend");
        let (condition, loop_body) = first_while(&statements);
        assert_eq!(loop_variable(condition), Some("i"));
        assert_eq!(while_growth(condition, loop_body), LoopGrowth::Linear);
    }

    #[test]
    fn literal_bound_loop_is_constant() {
        let statements = body("begin\n while i < 10 do\n begin\n  i 🡨 i + 1\n end\nend");
        let (condition, loop_body) = first_while(&statements);
        assert_eq!(while_growth(condition, loop_body), LoopGrowth::Constant);
    }

    #[test]
    fn halving_loop_is_logarithmic() {
        let statements = body("begin\n while n > 1 do\n begin\n  n 🡨 n div 2\n end\nend");
        let (condition, loop_body) = first_while(&statements);
        assert_eq!(while_growth(condition, loop_body), LoopGrowth::Logarithmic);
    }

    #[test]
    fn bisection_is_logarithmic_through_logical_conditions() {
        let source = "begin\n while (low <= high and found = f) do\n begin\n  mid 🡨 (low + high) div 2\n  if (A[mid] < x) then\n  begin\n   low 🡨 mid + 1\n  end\n  else\n  begin\n   high 🡨 mid - 1\n  end\n end\nend";
        let statements = body(source);
        let (condition, loop_body) = first_while(&statements);
        assert_eq!(loop_variable(condition), Some("low"));
        assert!(narrows_bounds(loop_body));
        assert_eq!(while_growth(condition, loop_body), LoopGrowth::Logarithmic);
    }

    #[test]
    fn for_loop_ignores_its_own_iterator() {
        let statements = body("begin\n for i 🡨 1 to 5 do\n begin\n  x 🡨 i\n end\n for j 🡨 1 to length(A) do\n begin\n  x 🡨 j\n end\nend");
        let growth: Vec<_> = statements.iter().filter_map(loop_growth).collect();
        assert_eq!(growth, vec![LoopGrowth::Constant, LoopGrowth::Linear]);
    }

    #[test]
    fn argument_shapes() {
        let statements = body("begin\n mid 🡨 length(A) div 2\n CALL self(A[1..mid])\n CALL self(n - 1)\n CALL self(A, mid + 1, r)\nend");
        let halving = halving_names(&statements);
        assert_eq!(halving, vec!["mid"]);
        let sites = RecursionTarget::new("main").call_sites(&statements);
        let shapes: Vec<_> = sites.iter().map(|args| argument_shape(args, &halving)).collect();
        assert_eq!(
            shapes,
            vec![
                Some(ArgumentShape::Halving),
                Some(ArgumentShape::Decrement(1)),
                Some(ArgumentShape::Halving),
            ]
        );
    }

    #[test]
    fn recursive_calls_inside_expressions_are_found() {
        let source = "procedure fib(n)\nbegin\n if n <= 1 then\n begin\n  return n\n end\n return CALL fib(n - 1) + CALL fib(n - 2)\nend";
        let program = parse(source).expect("parses");
        let target = RecursionTarget::new("fib");
        assert_eq!(target.call_sites(&program.procedures[0].body).len(), 2);
    }
}
