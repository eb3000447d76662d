//! Parse-and-execute recursive descent.
//!
//! There is no syntax tree: every grammar routine consumes its tokens and returns the value it
//! denotes, and statements write their bindings straight into the run's [`SymbolTable`].

mod expr;
mod stmt;

use crate::error::{CompileError, ErrorCollector, InterpretError};
use crate::interpreter::symbols::{Binding, SymbolTable};
use crate::interpreter::value::Value;
use crate::scanner::token::{Span, Token, TokenKind};

type ParseResult<T> = Result<T, InterpretError>;

/// Deepest combined nesting of parentheses, unary operators and blocks.
pub const MAX_NESTING: usize = 128;

pub struct Parser<'s> {
    tokens: Vec<Token>,
    current: usize,
    symbols: &'s mut SymbolTable,
    /// Bindings of the statement being executed; committed once it completes.
    staged: Vec<Binding>,
    /// Block nesting depth, used when resynchronizing.
    depth: usize,
    /// Recursion depth of the grammar routines, bounded by [`MAX_NESTING`].
    nesting: usize,
    errors: ErrorCollector,
}

impl<'s> Parser<'s> {
    pub fn new(mut tokens: Vec<Token>, symbols: &'s mut SymbolTable) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let end = tokens
                .last()
                .map_or(0, |t| t.span.offset + t.span.len);
            tokens.push(Token::new(TokenKind::Eof, "", Span::new(end, 0)));
        }
        Self {
            tokens,
            current: 0,
            symbols,
            staged: Vec::new(),
            depth: 0,
            nesting: 0,
            errors: ErrorCollector::new(),
        }
    }

    // --- Symbol access ---

    fn lookup(&self, name: &str) -> Value {
        self.staged
            .iter()
            .rev()
            .find(|b| b.name == name)
            .map_or_else(|| self.symbols.lookup(name), |b| b.value)
    }

    fn is_declared(&self, name: &str) -> bool {
        self.staged.iter().any(|b| b.name == name) || self.symbols.contains(name)
    }

    fn stage(&mut self, name: String, value: Value) {
        self.staged.push(Binding { name, value });
    }

    fn commit(&mut self) {
        for Binding { name, value } in self.staged.drain(..) {
            self.symbols.define(name, value);
        }
    }

    // --- Helper methods ---

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, expected: &str) -> Result<&Token, CompileError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_identifier(&mut self, context: &str) -> Result<Token, CompileError> {
        if self.check(TokenKind::Identifier) {
            Ok(self.advance().clone())
        } else {
            Err(self.unexpected(context))
        }
    }

    /// Run `rule` one nesting level deeper, failing with a syntax error past [`MAX_NESTING`].
    fn nested<T>(&mut self, rule: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.nesting >= MAX_NESTING {
            return Err(self.unexpected("shallower nesting").into());
        }
        self.nesting += 1;
        let result = rule(self);
        self.nesting -= 1;
        result
    }

    /// Syntax error naming what was expected at the current token.
    fn unexpected(&self, expected: &str) -> CompileError {
        let token = self.peek();
        CompileError::syntax(expected, token.describe(), token.kind, token.span)
    }

    fn current_span(&self) -> Span {
        self.peek().span
    }

    fn span_from(&self, start: Span) -> Span {
        start.to(self.previous().span)
    }
}
