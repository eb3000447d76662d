use anyhow::{Result, bail};
use clap::Parser;

use minic::error::CompileError;
use minic::report::{self, Report};
use minic::{repl, scanner};

#[derive(Parser, Debug)]
#[command(name = "minic", about = "Tokenize and interpret small C-like programs and expressions")]
struct Cli {
    /// Source text to run (omit for REPL)
    source: Option<String>,

    /// Interpretation mode; `auto` treats text containing ';' or braces as a program
    #[arg(long, default_value = "auto", value_parser = ["auto", "expr", "program"])]
    mode: String,

    /// Print the token table and exit
    #[arg(long)]
    dump_tokens: bool,

    /// Report output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

fn looks_like_program(source: &str) -> bool {
    source.contains([';', '{', '}'])
}

fn report_compile_errors(errors: Vec<CompileError>, source: &str) -> anyhow::Error {
    let count = errors.len();
    for e in errors {
        eprintln!("{:?}", miette::Report::new(e.with_source_code("input", source)));
    }
    anyhow::anyhow!("{count} error(s)")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(source) = cli.source.as_deref() else {
        repl::run_repl();
        return Ok(());
    };

    if cli.dump_tokens {
        let (tokens, errors) = scanner::scan(source);
        print!("{}", report::token_table(&tokens));
        if !errors.is_empty() {
            return Err(report_compile_errors(errors, source));
        }
        return Ok(());
    }

    let report = match cli.mode.as_str() {
        "expr" => Report::expression(source),
        "program" => Report::program(source),
        _ if looks_like_program(source) => Report::program(source),
        _ => Report::expression(source),
    };

    let json = cli.format == "json";
    if json {
        println!("{}", report.to_json(source));
    } else {
        print!("{}", report.to_text(source));
    }

    if report.has_errors() {
        let count = report.errors.len();
        if !json {
            for diagnostic in report.into_diagnostics(source) {
                eprintln!("{diagnostic:?}");
            }
        }
        bail!("{count} error(s)");
    }
    Ok(())
}
