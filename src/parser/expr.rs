use crate::error::InterpretError;
use crate::interpreter::value::Value;
use crate::parser::{ParseResult, Parser};
use crate::scanner::token::TokenKind;

impl Parser<'_> {
    /// Evaluate one expression spanning the whole token sequence.
    pub fn parse_expression(mut self) -> Result<Value, InterpretError> {
        let value = self.logical_or()?;
        if !self.is_at_end() {
            return Err(self.unexpected("end of input").into());
        }
        Ok(value)
    }

    pub(super) fn logical_or(&mut self) -> ParseResult<Value> {
        let start = self.current_span();
        let mut value = self.logical_and()?;
        while self.match_token(TokenKind::Or) {
            let right = self.logical_and()?;
            value = value.or(right, self.span_from(start))?;
        }
        Ok(value)
    }

    fn logical_and(&mut self) -> ParseResult<Value> {
        let start = self.current_span();
        let mut value = self.expr()?;
        while self.match_token(TokenKind::And) {
            let right = self.expr()?;
            value = value.and(right, self.span_from(start))?;
        }
        Ok(value)
    }

    fn expr(&mut self) -> ParseResult<Value> {
        let start = self.current_span();
        let mut value = self.term()?;
        loop {
            if self.match_token(TokenKind::Plus) {
                let right = self.term()?;
                value = value.add(right, self.span_from(start))?;
            } else if self.match_token(TokenKind::Minus) {
                let right = self.term()?;
                value = value.sub(right, self.span_from(start))?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> ParseResult<Value> {
        let start = self.current_span();
        let mut value = self.power()?;
        loop {
            let kind = self.peek().kind;
            if !matches!(kind, TokenKind::Mul | TokenKind::Div | TokenKind::Mod) {
                return Ok(value);
            }
            self.advance();
            // The right operand is fully evaluated before any zero check.
            let right = self.power()?;
            let span = self.span_from(start);
            value = match kind {
                TokenKind::Mul => value.mul(right, span)?,
                TokenKind::Div => value.div(right, span)?,
                _ => value.rem(right, span)?,
            };
        }
    }

    /// `**` chains left to right: `2 ** 3 ** 2` is `(2 ** 3) ** 2`.
    fn power(&mut self) -> ParseResult<Value> {
        let start = self.current_span();
        let mut value = self.factor()?;
        while self.match_token(TokenKind::Power) {
            let right = self.factor()?;
            value = value.pow(right, self.span_from(start))?;
        }
        Ok(value)
    }

    fn factor(&mut self) -> ParseResult<Value> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Int | TokenKind::Float | TokenKind::Bool => match token.literal {
                Some(literal) => {
                    self.advance();
                    Ok(literal.into())
                }
                None => Err(self.unexpected("literal value").into()),
            },
            TokenKind::Identifier => {
                self.advance();
                Ok(self.lookup(&token.lexeme))
            }
            TokenKind::LeftParen => self.nested(|p| {
                p.advance();
                let value = p.logical_or()?;
                p.consume(TokenKind::RightParen, "')' after expression")?;
                Ok(value)
            }),
            // Unary operators bind to a single factor, so `not a or b` is `(not a) or b`.
            TokenKind::Plus | TokenKind::Minus | TokenKind::Not => self.nested(|p| {
                p.advance();
                let operand = p.factor()?;
                let span = p.span_from(token.span);
                let value = match token.kind {
                    TokenKind::Plus => operand.plus(span)?,
                    TokenKind::Minus => operand.negate(span)?,
                    _ => operand.not(span)?,
                };
                Ok(value)
            }),
            _ => Err(self.unexpected("expression").into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::error::{CompileError, RuntimeError};
    use crate::interpreter::symbols::SymbolTable;
    use crate::parser::MAX_NESTING;
    use crate::scanner;
    use crate::scanner::token::Span;

    fn eval(source: &str) -> Result<Value, InterpretError> {
        let mut symbols = SymbolTable::new();
        eval_with(source, &mut symbols)
    }

    fn eval_with(source: &str, symbols: &mut SymbolTable) -> Result<Value, InterpretError> {
        let (tokens, errors) = scanner::scan(source);
        assert!(errors.is_empty(), "unexpected scan errors: {errors:?}");
        Parser::new(tokens, symbols).parse_expression()
    }

    fn eval_ok(source: &str) -> Value {
        eval(source).unwrap_or_else(|e| panic!("'{source}' failed: {e}"))
    }

    fn runtime_err(source: &str) -> RuntimeError {
        match eval(source) {
            Err(InterpretError::Runtime(e)) => e,
            other => panic!("expected runtime error for '{source}', got {other:?}"),
        }
    }

    #[rstest]
    #[case("1 + 2 * 3", Value::Int(7))]
    #[case("(1 + 2) * 3", Value::Int(9))]
    #[case("10 - 4 - 3", Value::Int(3))]
    #[case("2 / 4", Value::Float(0.5))]
    #[case("7 % 4 * 2", Value::Int(6))]
    #[case("2 ** 3 ** 2", Value::Int(64))]
    #[case("2 * 3 ** 2", Value::Int(18))]
    #[case("-2 ** 2", Value::Int(4))]
    #[case("-(3 - 5)", Value::Int(2))]
    #[case("+4.5", Value::Float(4.5))]
    #[case("1 + 0.5", Value::Float(1.5))]
    fn arithmetic(#[case] source: &str, #[case] expected: Value) {
        assert_eq!(eval_ok(source), expected);
    }

    #[test]
    fn mixed_float_expression() {
        let value = eval_ok("2.5 + (3 - 1.2) * 5.8");
        let Value::Float(x) = value else {
            panic!("expected float, got {value:?}");
        };
        assert!((x - (2.5 + (3.0 - 1.2) * 5.8)).abs() < 1e-9);
    }

    #[rstest]
    #[case("true and false or not false", true)]
    #[case("not true and false", false)]
    #[case("not (true and false)", true)]
    #[case("false or false", false)]
    #[case("1 and 2.5", true)]
    #[case("0 or 0.0", false)]
    #[case("1 + 1 and 0", false)]
    fn logic(#[case] source: &str, #[case] expected: bool) {
        assert_eq!(eval_ok(source), Value::Bool(expected));
    }

    #[test]
    fn not_binds_tighter_than_or() {
        // `not false or false` would be false if `not` applied to the whole disjunction.
        assert_eq!(eval_ok("not false or false"), Value::Bool(true));
    }

    #[test]
    fn division_by_zero_stops_after_right_operand() {
        let mut symbols = SymbolTable::new();
        let (tokens, _) = scanner::scan("5 / 0 + 1");
        let mut parser = Parser::new(tokens, &mut symbols);
        let result = parser.logical_or();
        assert!(matches!(
            result,
            Err(InterpretError::Runtime(RuntimeError::DivisionByZero { .. }))
        ));
        // `5`, `/`, `0` consumed; `+` untouched.
        assert_eq!(parser.current, 3);
        assert_eq!(parser.peek().kind, TokenKind::Plus);
    }

    #[test]
    fn division_by_zero_span_covers_operation() {
        assert_eq!(
            runtime_err("1 + 5 / 0"),
            RuntimeError::DivisionByZero {
                span: Span::new(4, 5)
            }
        );
    }

    #[test]
    fn modulo_by_zero() {
        assert!(matches!(runtime_err("5 % (2 - 2)"), RuntimeError::ModuloByZero { .. }));
    }

    #[test]
    fn identifiers_read_symbols() {
        let mut symbols = SymbolTable::new();
        symbols.define("x".to_string(), Value::Int(5));
        symbols.define("y".to_string(), Value::Float(0.5));
        assert_eq!(eval_with("x * y + x", &mut symbols).ok(), Some(Value::Float(7.5)));
    }

    #[test]
    fn bare_unset_identifier_is_unset() {
        assert_eq!(eval_ok("missing"), Value::Unset);
    }

    #[test]
    fn arithmetic_on_unset_fails() {
        assert!(matches!(runtime_err("missing + 1"), RuntimeError::UnsetValue { .. }));
    }

    #[test]
    fn arithmetic_on_bool_fails() {
        assert!(matches!(runtime_err("true * 2"), RuntimeError::Type { .. }));
    }

    fn parenthesized(depth: usize) -> String {
        format!("{}1{}", "(".repeat(depth), ")".repeat(depth))
    }

    #[test]
    fn nesting_up_to_the_limit_evaluates() {
        assert_eq!(eval_ok(&parenthesized(MAX_NESTING)), Value::Int(1));
        assert_eq!(eval_ok(&format!("{}1", "-".repeat(MAX_NESTING))), Value::Int(1));
    }

    #[rstest]
    #[case(parenthesized(MAX_NESTING + 1), "expected shallower nesting, found '('")]
    #[case(parenthesized(10_000), "expected shallower nesting, found '('")]
    #[case(format!("{}true", "not ".repeat(10_000)), "expected shallower nesting, found 'not'")]
    fn deep_nesting_is_a_syntax_error(#[case] source: String, #[case] message: &str) {
        match eval(&source) {
            Err(InterpretError::Compile(e @ CompileError::Syntax { .. })) => {
                assert_eq!(e.to_string(), message);
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[rstest]
    #[case("1 +", "expected expression, found end of input")]
    #[case("(1 + 2", "expected ')' after expression, found end of input")]
    #[case("1 2", "expected end of input, found '2'")]
    #[case("* 3", "expected expression, found '*'")]
    #[case("x = 3", "expected end of input, found '='")]
    fn syntax_errors(#[case] source: &str, #[case] message: &str) {
        match eval(source) {
            Err(InterpretError::Compile(e @ CompileError::Syntax { .. })) => {
                assert_eq!(e.to_string(), message);
            }
            other => panic!("expected syntax error for '{source}', got {other:?}"),
        }
    }
}
