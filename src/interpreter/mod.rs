pub mod symbols;
pub mod value;

use crate::error::InterpretError;
use crate::interpreter::symbols::SymbolTable;
use crate::interpreter::value::Value;
use crate::parser::Parser;
use crate::scanner::token::Token;

/// Owns the symbol table of a run. Successive calls share it, which is what the REPL relies on.
#[derive(Debug, Default)]
pub struct Interpreter {
    symbols: SymbolTable,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate a single expression against the current bindings.
    pub fn evaluate(&mut self, tokens: Vec<Token>) -> Result<Value, InterpretError> {
        Parser::new(tokens, &mut self.symbols).parse_expression()
    }

    /// Execute a sequence of statements, returning every error in the order it occurred.
    pub fn interpret(&mut self, tokens: Vec<Token>) -> Vec<InterpretError> {
        Parser::new(tokens, &mut self.symbols).execute().into_vec()
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn into_symbols(self) -> SymbolTable {
        self.symbols
    }
}

/// Evaluate an expression with an empty symbol table.
pub fn parse_expr(tokens: Vec<Token>) -> Result<Value, InterpretError> {
    Interpreter::new().evaluate(tokens)
}

/// Execute a program from scratch, returning its final bindings and collected errors.
pub fn interpret_program(tokens: Vec<Token>) -> (SymbolTable, Vec<InterpretError>) {
    let mut interpreter = Interpreter::new();
    let errors = interpreter.interpret(tokens);
    (interpreter.into_symbols(), errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner;

    fn tokens(source: &str) -> Vec<Token> {
        let (tokens, errors) = scanner::scan(source);
        assert!(errors.is_empty(), "unexpected scan errors: {errors:?}");
        tokens
    }

    #[test]
    fn parse_expr_uses_empty_table() {
        assert_eq!(parse_expr(tokens("2 / 4")).ok(), Some(Value::Float(0.5)));
        assert_eq!(parse_expr(tokens("x")).ok(), Some(Value::Unset));
    }

    #[test]
    fn interpret_program_returns_snapshot() {
        let (symbols, errors) = interpret_program(tokens("int x = 2; int y = x ** 3;"));
        assert!(errors.is_empty());
        assert_eq!(symbols.get("y"), Some(Value::Int(8)));
    }

    #[test]
    fn bindings_persist_across_calls() {
        let mut interpreter = Interpreter::new();
        assert!(interpreter.interpret(tokens("int x = 5;")).is_empty());
        assert!(interpreter.interpret(tokens("x = x + 1;")).is_empty());
        assert_eq!(interpreter.evaluate(tokens("x * 2")).ok(), Some(Value::Int(12)));
        assert_eq!(interpreter.symbols().len(), 1);
    }

    #[test]
    fn evaluation_error_leaves_table_untouched() {
        let mut interpreter = Interpreter::new();
        interpreter.interpret(tokens("int x = 5;"));
        assert!(interpreter.evaluate(tokens("x / 0")).is_err());
        assert_eq!(interpreter.symbols().get("x"), Some(Value::Int(5)));
    }
}
