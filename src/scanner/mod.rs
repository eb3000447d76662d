pub mod lexer;
pub mod token;

use crate::error::CompileError;
use token::Token;

/// Scan source code into a list of tokens plus any lexical errors met on the way.
pub fn scan(source: &str) -> (Vec<Token>, Vec<CompileError>) {
    lexer::scan_all(source)
}
