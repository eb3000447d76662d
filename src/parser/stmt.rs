use crate::error::{ErrorCollector, RuntimeError};
use crate::interpreter::value::Value;
use crate::parser::{ParseResult, Parser};
use crate::scanner::token::TokenKind;

impl Parser<'_> {
    /// Execute every statement up to end of input.
    ///
    /// A failing statement is recorded and skipped; the statements after it still run.
    pub fn execute(mut self) -> ErrorCollector {
        while !self.is_at_end() {
            self.statement_or_recover();
        }
        self.errors
    }

    fn statement_or_recover(&mut self) {
        let start = self.current;
        match self.statement() {
            Ok(()) => self.commit(),
            Err(e) => {
                self.errors.push(e);
                self.staged.clear();
                self.synchronize(start);
            }
        }
    }

    fn statement(&mut self) -> ParseResult<()> {
        match self.peek().kind {
            TokenKind::Type => self.declaration(),
            TokenKind::Identifier => self.assignment(),
            TokenKind::LeftBrace => self.nested(Self::block),
            TokenKind::Semicolon => {
                self.advance();
                Ok(())
            }
            TokenKind::Control => {
                Err(self.unexpected("statement (control flow is not supported)").into())
            }
            _ => Err(self.unexpected("statement").into()),
        }
    }

    /// `TYPE name ('=' value)? (',' name ('=' value)?)* ';'`
    fn declaration(&mut self) -> ParseResult<()> {
        self.advance(); // consume type keyword
        loop {
            let name = self.expect_identifier("variable name")?;
            let value = if self.match_token(TokenKind::Assign) {
                self.logical_or()?
            } else {
                Value::Unset
            };
            self.stage(name.lexeme, value);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::Semicolon, "';' after declaration")?;
        Ok(())
    }

    /// `name '=' value ';'` where `name` is already declared.
    fn assignment(&mut self) -> ParseResult<()> {
        let target = self.advance().clone();
        self.consume(TokenKind::Assign, "'=' after identifier")?;
        let value = self.logical_or()?;
        if !self.is_declared(&target.lexeme) {
            return Err(RuntimeError::UndeclaredAssignment {
                name: target.lexeme,
                span: target.span,
            }
            .into());
        }
        self.consume(TokenKind::Semicolon, "';' after assignment")?;
        self.stage(target.lexeme, value);
        Ok(())
    }

    fn block(&mut self) -> ParseResult<()> {
        self.advance(); // consume '{'
        self.depth += 1;
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            self.statement_or_recover();
        }
        self.depth -= 1;
        self.consume(TokenKind::RightBrace, "'}' after block")?;
        Ok(())
    }

    /// Skip to the next statement boundary after an error.
    ///
    /// Stops after a `;` or before a `}` that closes an enclosing block. A type keyword right after
    /// a complete operand (`int x = 5 int y = 3;`) is taken as the start of the next declaration;
    /// anywhere else it is skipped with the rest of the broken statement.
    fn synchronize(&mut self, start: usize) {
        if self.current > start && self.previous().kind == TokenKind::Semicolon {
            return;
        }
        loop {
            let after_operand = self.current > start && self.previous().kind.ends_operand();
            match self.peek().kind {
                TokenKind::Eof => return,
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RightBrace if self.depth > 0 => return,
                TokenKind::RightBrace => {
                    self.advance();
                    return;
                }
                TokenKind::Type if after_operand => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
