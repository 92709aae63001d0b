//! Human-readable description of the accepted pseudocode.
//!
//! Documentation only: the parser is the authority on what is accepted.

use crate::frontend::ARROW;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Production {
    pub name: &'static str,
    pub expansion: &'static [&'static str],
    pub description: &'static str,
}

const fn production(
    name: &'static str,
    expansion: &'static [&'static str],
    description: &'static str,
) -> Production {
    Production {
        name,
        expansion,
        description,
    }
}

pub struct Grammar {
    productions: &'static [Production],
}

pub const DEFAULT_GRAMMAR: Grammar = Grammar {
    productions: &[
        production(
            "program",
            &["[algorithm NAME(params)]", "declarations", "begin", "statement_list", "end", "procedures"],
            "Main algorithm with optional header",
        ),
        production("program", &["procedures"], "Procedures only; the last one is the entry point"),
        production("declarations", &["class NAME {attributes}"], "Class definition"),
        production("declarations", &["declare NAME ..."], "Declaration; the rest of the line is kept as text"),
        production("procedure", &["[procedure] NAME(params)", "begin", "statement_list", "end"], "Subroutine"),
        production("params", &["NAME[[bounds]] [: type]", "{, ...}"], "Parameters with optional array bounds or type"),
        production("statement", &["assignment"], "Simple assignment"),
        production("statement", &["for_loop"], "Counted loop"),
        production("statement", &["while_loop"], "Conditional loop"),
        production("statement", &["repeat_until"], "Loop that runs at least once"),
        production("statement", &["if_statement"], "Conditional with optional else"),
        production("statement", &["CALL NAME(args)"], "Procedure call"),
        production("statement", &["return [expr]"], "Return from a procedure"),
        production("statement", &["print(expr)"], "Output"),
        production("assignment", &["lvalue", "🡨", "expr"], "Also written ←, <-, := or ="),
        production("for_loop", &["for NAME 🡨 expr to expr do", "block"], "Inclusive range"),
        production("while_loop", &["while (expr) do", "block"], ""),
        production("repeat_until", &["repeat", "statement_list", "until (expr)"], ""),
        production("if_statement", &["if (expr) then", "block", "[else block]"], ""),
        production("block", &["begin statement_list end"], "Explicit block"),
        production("block", &["statement"], "Single statement (relaxed mode only)"),
        production("expr", &["expr op expr", "not expr", "-expr", "primary"], "Usual precedence"),
        production(
            "primary",
            &["NUMBER", "NAME", "NAME[expr]", "NAME.field", "length(NAME)", "CALL NAME(args)", "new array[expr]", "T", "F", "NULL", "\"text\""],
            "",
        ),
    ],
};

impl Grammar {
    pub fn productions(&self) -> &'static [Production] {
        self.productions
    }

    /// Every production for the non-terminal `name`, in declaration order.
    pub fn expansions_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'static Production> + 'a {
        self.productions.iter().filter(move |p| p.name == name)
    }

    /// A Markdown table sorted by non-terminal.
    pub fn as_markdown(&self) -> String {
        let mut rows: Vec<&Production> = self.productions.iter().collect();
        rows.sort_by_key(|p| p.name);

        let mut lines = vec![
            "| Non terminal | Expansion | Description |".to_string(),
            "| --- | --- | --- |".to_string(),
        ];
        lines.extend(rows.into_iter().map(|p| {
            format!(
                "| `{}` | `{}` | {} |",
                p.name,
                p.expansion.join(" "),
                p.description
            )
        }));
        lines.join("\n")
    }
}

/// Spellings the lexer accepts, paired with what the parser sees.
pub const ACCEPTED_LEXEMES: &[(&str, &str)] = &[
    ("🡨", ARROW),
    ("←", ARROW),
    ("↨", ARROW),
    ("<-", ARROW),
    (":=", ":="),
    ("<=", "<="),
    ("≤", "<="),
    (">=", ">="),
    ("≥", ">="),
    ("<>", "<>"),
    ("≠", "<>"),
    ("!=", "<>"),
    ("∞", "infinity"),
    ("..", ".."),
    ("► comment", ""),
];
