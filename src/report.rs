//! Rendering of a run: token table, then the result or identifier table, then errors.

use std::fmt::Write;

use serde::Serialize;

use crate::error::{ErrorCollector, InterpretError, offset_to_line};
use crate::interpreter::Interpreter;
use crate::interpreter::symbols::{Binding, SymbolTable};
use crate::interpreter::value::Value;
use crate::scanner;
use crate::scanner::token::{Token, TokenKind};

const TYPE_WIDTH: usize = 18;
const VALUE_WIDTH: usize = 10;

#[derive(Debug)]
pub enum Outcome {
    /// Expression mode; `None` when the expression could not be evaluated.
    Value(Option<Value>),
    /// Statement mode: the identifier table after the run.
    Identifiers(SymbolTable),
}

#[derive(Debug)]
pub struct Report {
    pub tokens: Vec<Token>,
    pub outcome: Outcome,
    pub errors: Vec<InterpretError>,
}

impl Report {
    /// Tokenize and evaluate `source` as a single expression.
    pub fn expression(source: &str) -> Self {
        Self::expression_with(&mut Interpreter::new(), source)
    }

    /// Tokenize and execute `source` as a program.
    pub fn program(source: &str) -> Self {
        Self::program_with(&mut Interpreter::new(), source)
    }

    /// Expression mode against existing bindings. Nothing is evaluated when lexing failed.
    pub fn expression_with(interpreter: &mut Interpreter, source: &str) -> Self {
        let (tokens, lex_errors) = scanner::scan(source);
        let mut errors = ErrorCollector::new();
        errors.extend(lex_errors);
        let value = if errors.is_empty() {
            match interpreter.evaluate(tokens.clone()) {
                Ok(value) => Some(value),
                Err(e) => {
                    errors.push(e);
                    None
                }
            }
        } else {
            None
        };
        Self {
            tokens,
            outcome: Outcome::Value(value),
            errors: errors.into_source_order(),
        }
    }

    /// Statement mode against existing bindings. Runs on the best-effort token sequence even
    /// when lexing reported errors; lexical and interpretation errors are merged in source order.
    pub fn program_with(interpreter: &mut Interpreter, source: &str) -> Self {
        let (tokens, lex_errors) = scanner::scan(source);
        let mut errors = ErrorCollector::new();
        errors.extend(lex_errors);
        errors.extend(interpreter.interpret(tokens.clone()));
        Self {
            tokens,
            outcome: Outcome::Identifiers(interpreter.symbols().clone()),
            errors: errors.into_source_order(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn value(&self) -> Option<Value> {
        match self.outcome {
            Outcome::Value(value) => value,
            Outcome::Identifiers(_) => None,
        }
    }

    pub fn to_text(&self, source: &str) -> String {
        let mut buf = String::new();
        buf.push_str("Token Table:\n");
        buf.push_str(&token_table(&self.tokens));
        buf.push('\n');
        match &self.outcome {
            Outcome::Value(Some(value)) => {
                let _ = writeln!(buf, "Result: {value}");
            }
            Outcome::Value(None) => {}
            Outcome::Identifiers(symbols) => {
                buf.push_str("Identifier Table:\n");
                buf.push_str(&identifier_table(symbols));
            }
        }
        if self.has_errors() {
            buf.push_str("\nErrors:\n");
            for error in &self.errors {
                buf.push_str(&error.display_with_line(source));
                buf.push('\n');
            }
        }
        buf
    }

    /// Compile errors as miette reports carrying `source`, so their labelled spans can be shown.
    pub fn into_diagnostics(self, source: &str) -> Vec<miette::Report> {
        self.errors
            .into_iter()
            .filter_map(|e| match e {
                InterpretError::Compile(e) => {
                    Some(miette::Report::new(e.with_source_code("input", source)))
                }
                InterpretError::Runtime(_) => None,
            })
            .collect()
    }

    pub fn to_json(&self, source: &str) -> String {
        let (result, identifiers) = match &self.outcome {
            Outcome::Value(value) => (*value, None),
            Outcome::Identifiers(symbols) => (None, Some(symbols.iter().collect())),
        };
        let view = JsonReport {
            tokens: &self.tokens,
            result,
            identifiers,
            errors: self
                .errors
                .iter()
                .map(|e| ErrorRecord {
                    message: e.to_string(),
                    offset: e.offset(),
                    line: offset_to_line(source, e.offset()),
                })
                .collect(),
        };
        serde_json::to_string_pretty(&view).expect("report should be serializable")
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    tokens: &'a [Token],
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    identifiers: Option<Vec<&'a Binding>>,
    errors: Vec<ErrorRecord>,
}

#[derive(Serialize)]
struct ErrorRecord {
    message: String,
    offset: usize,
    line: usize,
}

/// Two-column token table; the trailing `EOF` marker is not listed.
pub fn token_table(tokens: &[Token]) -> String {
    let rows = tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| (t.kind.to_string(), t.value_text()));
    table("Type", rows)
}

pub fn identifier_table(symbols: &SymbolTable) -> String {
    let rows = symbols.iter().map(|b| (b.name.clone(), b.value.to_string()));
    table("Identifier", rows)
}

fn table(first: &str, rows: impl Iterator<Item = (String, String)>) -> String {
    let mut buf = String::new();
    let _ = writeln!(
        buf,
        "| {first:<TYPE_WIDTH$} | {:<VALUE_WIDTH$} |",
        "Value"
    );
    let _ = writeln!(
        buf,
        "|{}|{}|",
        "-".repeat(TYPE_WIDTH + 2),
        "-".repeat(VALUE_WIDTH + 2)
    );
    for (left, right) in rows {
        let _ = writeln!(buf, "| {left:<TYPE_WIDTH$} | {right:<VALUE_WIDTH$} |");
    }
    buf
}
