use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::interpreter::Interpreter;
use crate::report::{Report, identifier_table};

/// Run the interactive REPL. Bindings persist across lines.
pub fn run_repl() {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("failed to start line editor: {e}");
            return;
        }
    };
    let mut interpreter = Interpreter::new();

    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("read error: {e}");
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(trimmed);

        if trimmed == ":symbols" {
            print!("{}", identifier_table(interpreter.symbols()));
            continue;
        }

        let report = if is_statement(trimmed) {
            Report::program_with(&mut interpreter, trimmed)
        } else {
            Report::expression_with(&mut interpreter, trimmed)
        };
        if let Some(value) = report.value() {
            println!("{value}");
        }
        for e in &report.errors {
            eprintln!("{e}");
        }
    }
}

/// Heuristic: lines ending with ';' or '}' are statements, anything else is an expression.
pub fn is_statement(line: &str) -> bool {
    line.ends_with(';') || line.ends_with('}')
}
