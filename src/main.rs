use anyhow::{bail, Context, Result};
use asymptote::analysis::RecurrenceSolver;
use asymptote::error::AnalyzerError;
use asymptote::grammar::{ACCEPTED_LEXEMES, DEFAULT_GRAMMAR};
use asymptote::{tokenize, ParserConfig, Pipeline, PipelineConfig, Report};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Estimate the asymptotic complexity of pseudocode
#[derive(Parser, Debug)]
#[command(name = "asymptote", version, about)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). ASYMPTOTE_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a pseudocode file
    Analyze {
        /// Source file, or `-` for stdin
        file: PathBuf,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,

        /// Reject relaxed blocks and tolerant declaration lines
        #[arg(long)]
        strict: bool,

        /// Depth of the recursion tree
        #[arg(long, default_value_t = 5)]
        depth: u32,
    },

    /// Solve a recurrence such as "T(n) = 2T(n/2) + n"
    Solve {
        recurrence: String,

        #[arg(long)]
        json: bool,
    },

    /// Dump the token stream of a file
    Tokens { file: PathBuf },

    /// Print the accepted grammar
    Grammar,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze {
            file,
            json,
            strict,
            depth,
        } => {
            let source = read_source(&file)?;
            let config = PipelineConfig {
                tree_depth: depth,
                parser: ParserConfig { strict },
                ..PipelineConfig::default()
            };
            let report = match Pipeline::new(config).run(&source) {
                Ok(report) => report,
                Err(error) => {
                    eprintln!("{}", render_error(&source, &error));
                    bail!("failed to analyze {}", file.display());
                }
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Solve { recurrence, json } => {
            let Some(solution) = RecurrenceSolver::new().solve_text(&recurrence) else {
                bail!("no known method solves {:?}", recurrence);
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&solution)?);
            } else {
                println!("{}  [{}]", solution.theta, solution.method);
                println!("{}", solution.justification);
                for step in &solution.math_steps {
                    println!("  {}: {}", step.label, step.value);
                }
            }
        }
        Commands::Tokens { file } => {
            let source = read_source(&file)?;
            let tokens = tokenize(&source)
                .with_context(|| format!("failed to tokenize {}", file.display()))?;
            for token in tokens {
                println!("{}", token);
            }
        }
        Commands::Grammar => {
            println!("{}\n", DEFAULT_GRAMMAR.as_markdown());
            println!("| Spelling | Parsed as |\n| --- | --- |");
            for (spelling, canonical) in ACCEPTED_LEXEMES {
                println!("| `{}` | `{}` |", spelling, canonical);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "asymptote=debug",
        _ => "asymptote=trace",
    };
    let filter = EnvFilter::try_from_env("ASYMPTOTE_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("failed to read stdin")?;
        return Ok(source);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// The offending line with a caret under the column.
fn render_error(source: &str, error: &AnalyzerError) -> String {
    let (line, column) = error.position();
    let text = source.lines().nth(line.saturating_sub(1)).unwrap_or("");
    let mut rendered = format!("error: {}\n{:>4} | {}", error, line, text);
    if let Some(column) = column {
        rendered.push_str(&format!(
            "\n     | {}^",
            " ".repeat(column.saturating_sub(1))
        ));
    }
    rendered
}

fn print_report(report: &Report) {
    println!("best:    {}", report.summary.best_case);
    println!("worst:   {}", report.summary.worst_case);
    println!("average: {}", report.summary.average_case);

    if let Some(idiom) = &report.idiom {
        println!("idiom:   {} ({:?} confidence, in {})", idiom.idiom, idiom.confidence, idiom.procedure);
    }
    if let Some(relation) = &report.recurrence {
        println!("\n{}    {}", relation.recurrence, relation.base_case);
        println!("{}", relation.notes);
    }
    if let Some(solution) = report.solution.as_ref().filter(|s| !s.is_inconclusive()) {
        println!("solution: {} via {}", solution.theta, solution.method);
    }
    if let Some(tree) = &report.tree {
        println!("\n{}", tree.description);
        for level in &tree.levels {
            println!("  level {}: {} node(s), {}", level.level, level.nodes.len(), level.total_cost);
        }
        println!("  total: {}", tree.total_cost);
    }

    if !report.line_costs.is_empty() {
        println!();
        for cost in &report.line_costs {
            println!("{:>4}  {:<10} {}", cost.line, cost.cost, cost.code);
        }
    }

    for (key, value) in &report.annotations {
        println!("{}: {}", key, value);
    }
    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }
}
