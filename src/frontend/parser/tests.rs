use super::{Parser, ParserConfig};
use crate::ast::{BinaryOp, ExprKind, Program, Spanned, StmtKind};
use pretty_assertions::assert_eq;

fn parse(source: &str) -> Program {
    Parser::new(source)
        .expect("lexes")
        .parse_program()
        .unwrap_or_else(|e| panic!("parse failed: {}", e))
}

fn parse_strict(source: &str) -> Result<Program, crate::error::ParserError> {
    Parser::with_config(source, ParserConfig { strict: true })
        .expect("lexes")
        .parse_program()
}

#[test]
fn empty_main_block() {
    let program = parse("begin end");
    assert!(program.body.is_empty());
    assert!(program.procedures.is_empty());
    assert_eq!(program.name, None);
}

#[test]
fn nodes_remember_their_position() {
    let program = parse("begin\n  for i 🡨 1 to n do\n  begin\n    x 🡨 i\n  end\nend");
    let outer = &program.body[0];
    assert_eq!((outer.line(), outer.column()), (2, 3));
    let StmtKind::For { stop, body, .. } = &outer.kind else {
        panic!("expected a for loop, got {:?}", outer.kind);
    };
    assert_eq!(stop.line(), 2);
    assert_eq!((body[0].line(), body[0].column()), (4, 5));
}

#[test]
fn header_names_the_program() {
    let program = parse("Algoritmo BUSQUEDA\nbegin\n  x 🡨 1\nend");
    assert_eq!(program.name.as_deref(), Some("busqueda"));
    assert_eq!(program.body.len(), 1);
}

#[test]
fn assignment_symbols_are_synonyms() {
    let program = parse("begin\n a 🡨 1\n b := 2\n c = 3\n d <- 4\n e ← 5\nend");
    assert_eq!(program.body.len(), 5);
    assert!(program
        .body
        .iter()
        .all(|s| matches!(s.kind, StmtKind::Assignment { .. })));
}

#[test]
fn procedures_only_unit() {
    let source = "Algoritmo QUICKSORT(A, p, r)\nbegin\n  if (p < r) then\n  begin\n    q 🡨 CALL PARTITION(A, p, r)\n    CALL QUICKSORT(A, p, q - 1)\n  end\nend\n\nPARTITION(A, p, r)\nbegin\n  return p\nend";
    let program = parse(source);
    assert!(program.body.is_empty());
    let names: Vec<_> = program.procedures.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["quicksort", "partition"]);
    assert_eq!(program.name.as_deref(), Some("quicksort"));
    assert_eq!(program.procedures[0].parameters.len(), 3);
}

#[test]
fn trailing_procedures_after_main_block() {
    let program = parse("begin\n  CALL helper(n)\nend\nprocedure helper(n)\nbegin\nend");
    assert_eq!(program.body.len(), 1);
    assert_eq!(program.procedures[0].name, "helper");
}

#[test]
fn parameter_annotations_are_kept() {
    let program = parse("procedure sort(A[1..n], k: integer, B[n]..[m])\nbegin\nend");
    let params = &program.procedures[0].parameters;
    assert_eq!(params[0].datatype.as_deref(), Some("[1..n]"));
    assert_eq!(params[1].datatype.as_deref(), Some("integer"));
    assert_eq!(params[2].datatype.as_deref(), Some("[n]..[m]"));
}

#[test]
fn keyword_procedure_without_begin_is_an_error() {
    let err = Parser::new("procedure p(x)\n x 🡨 1")
        .unwrap()
        .parse_program()
        .unwrap_err();
    assert!(err.message.contains("begin"), "{}", err.message);
    assert_eq!(err.line, 2);
}

#[test]
fn inline_bodies() {
    let program = parse("begin\n  for i 🡨 1 to n do x 🡨 x + i\n  if x > 3 then y 🡨 1 else y 🡨 2\nend");
    assert_eq!(program.body.len(), 2);
    match &program.body[1].kind {
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            assert_eq!(then_branch.len(), 1);
            assert_eq!(else_branch.len(), 1);
        }
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn statement_runs_close_with_end() {
    let source = "begin\n  while i < n do\n    i 🡨 i + 1\n    j 🡨 j + 1\n  end\n  k 🡨 0\nend";
    let program = parse(source);
    assert_eq!(program.body.len(), 2);
    match &program.body[0].kind {
        StmtKind::While { body, .. } => assert_eq!(body.len(), 2),
        other => panic!("expected while, got {:?}", other),
    }
}

#[test]
fn else_if_chain_nests() {
    let source = "begin\n if (a = 1) then\n begin\n  x 🡨 1\n end\n else if (a = 2) then\n begin\n  x 🡨 2\n end\n else\n begin\n  x 🡨 3\n end\nend";
    let program = parse(source);
    let StmtKind::If { else_branch, .. } = &program.body[0].kind else {
        panic!("expected if");
    };
    assert_eq!(else_branch.len(), 1);
    let StmtKind::If { else_branch: inner, .. } = &else_branch[0].kind else {
        panic!("expected nested if");
    };
    assert_eq!(inner.len(), 1);
}

#[test]
fn let_and_declare_become_noops() {
    let program = parse("begin\n  let x be an integer\n  declare A[n]\n  x 🡨 1\nend");
    let kinds: Vec<_> = program.body.iter().map(|s| &s.kind).collect();
    assert!(matches!(kinds[0], StmtKind::NoOp));
    assert!(matches!(kinds[1], StmtKind::NoOp));
    assert!(matches!(kinds[2], StmtKind::Assignment { .. }));
}

#[test]
fn strict_mode_rejects_tolerant_forms() {
    assert!(parse_strict("begin\n  let x be 1\nend").is_err());
    assert!(parse_strict("begin\n  for i 🡨 1 to n do x 🡨 i\nend").is_err());
    assert!(parse_strict("begin\n  for i 🡨 1 to n do\n  begin\n    x 🡨 i\n  end\nend").is_ok());
}

#[test]
fn top_level_declarations_and_classes() {
    let program = parse("class Node { value next }\ndeclare A[1..n]\ndeclare total\nbegin\nend");
    assert_eq!(program.class_definitions[0].attributes, vec!["value", "next"]);
    assert_eq!(program.declarations.len(), 2);
    assert_eq!(program.declarations[0].annotation.as_deref(), Some("[ 1 .. n ]"));
    assert_eq!(program.declarations[1].annotation, None);
}

#[test]
fn return_value_only_on_same_line() {
    let program = parse("procedure f(n)\nbegin\n  if n <= 1 then\n  begin\n    return\n  end\n  return n * CALL self(n - 1)\nend");
    let body = &program.procedures[0].body;
    let StmtKind::If { then_branch, .. } = &body[0].kind else {
        panic!("expected if");
    };
    assert!(matches!(then_branch[0].kind, StmtKind::Return(None)));
    assert!(matches!(body[1].kind, StmtKind::Return(Some(_))));
}

#[test]
fn matrix_indices_nest() {
    let program = parse("begin\n  C[i, j] 🡨 A[i, k] * B[k, j]\nend");
    let StmtKind::Assignment { target, value } = &program.body[0].kind else {
        panic!("expected assignment");
    };
    let ExprKind::ArrayAccess { base, .. } = &target.kind else {
        panic!("expected array access");
    };
    assert!(matches!(base.kind, ExprKind::ArrayAccess { .. }));
    assert!(matches!(
        value.kind,
        ExprKind::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn operator_precedence() {
    let program = parse("begin\n  x 🡨 a + b * c ^ 2 ^ 3\n  y 🡨 i <= n and found = f\nend");
    let StmtKind::Assignment { value, .. } = &program.body[0].kind else {
        panic!("expected assignment");
    };
    let ExprKind::Binary { op, right, .. } = &value.kind else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Add);
    let ExprKind::Binary { op, right, .. } = &right.kind else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Mul);
    let ExprKind::Binary { op, right, .. } = &right.kind else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Pow);
    assert!(matches!(
        right.kind,
        ExprKind::Binary {
            op: BinaryOp::Pow,
            ..
        }
    ));

    let StmtKind::Assignment { value, .. } = &program.body[1].kind else {
        panic!("expected assignment");
    };
    assert!(matches!(
        value.kind,
        ExprKind::Binary {
            op: BinaryOp::And,
            ..
        }
    ));
}

#[test]
fn ranges_and_calls_in_arguments() {
    let program = parse("begin\n  izq 🡨 CALL self(A[1..mid])\n  swap A[i] with A[j]\n  Merge(A, p, q)\nend");
    let StmtKind::Assignment { value, .. } = &program.body[0].kind else {
        panic!("expected assignment");
    };
    let ExprKind::Call { name, arguments } = &value.kind else {
        panic!("expected call");
    };
    assert_eq!(name, "self");
    let ExprKind::ArrayAccess { index, .. } = &arguments[0].kind else {
        panic!("expected access");
    };
    assert!(matches!(index.kind, ExprKind::Range { .. }));
    assert!(matches!(&program.body[1].kind, StmtKind::Call { name, .. } if name == "swap"));
    assert!(matches!(&program.body[2].kind, StmtKind::Call { name, .. } if name == "merge"));
}

#[test]
fn repeat_until() {
    let program = parse("begin\n  repeat\n    i 🡨 i + 1\n  until i >= n\nend");
    let StmtKind::RepeatUntil { body, condition } = &program.body[0].kind else {
        panic!("expected repeat");
    };
    assert_eq!(body.len(), 1);
    assert!(matches!(
        condition.kind,
        ExprKind::Binary {
            op: BinaryOp::Gte,
            ..
        }
    ));
}

#[test]
fn array_creation_forms() {
    let program = parse("begin\n  B 🡨 new array[n]\n  C 🡨 array of size n + 1\nend");
    for statement in &program.body {
        let StmtKind::Assignment { value, .. } = &statement.kind else {
            panic!("expected assignment");
        };
        assert!(matches!(value.kind, ExprKind::ArrayCreation { .. }));
    }
}

#[test]
fn errors_carry_position() {
    let err = Parser::new("begin\n  x 🡨 1\n  🡨 2\nend")
        .unwrap()
        .parse_program()
        .unwrap_err();
    assert_eq!((err.line, err.column), (3, 3));

    let err = Parser::new("begin\n  x 🡨 1\n").unwrap().parse_program().unwrap_err();
    assert!(err.message.contains("end of input"), "{}", err.message);
}
