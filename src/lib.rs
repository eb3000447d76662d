pub mod error;
pub mod interpreter;
pub mod parser;
pub mod repl;
pub mod report;
pub mod scanner;

// Re-export the entry points and error types for convenience
pub use error::{CompileError, InterpretError, RuntimeError};
pub use interpreter::{interpret_program, parse_expr};
pub use scanner::scan as tokenize;
