use std::fmt;

use serde::Serialize;

use crate::error::RuntimeError;
use crate::scanner::token::{Literal, Span};

/// A runtime value. `Unset` is what reading a declared-but-uninitialized (or unknown)
/// identifier produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Unset,
}

/// Numeric view of an operand after unset/boolean checks.
#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Self::Int(n) => n as f64,
            Self::Float(x) => x,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Self::Int(n) => n == 0,
            Self::Float(x) => x == 0.0,
        }
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Int(n) => Self::Int(n),
            Literal::Float(x) => Self::Float(x),
            Literal::Bool(b) => Self::Bool(b),
        }
    }
}

impl Value {
    fn number(self, op: &str, span: Span) -> Result<Number, RuntimeError> {
        match self {
            Self::Int(n) => Ok(Number::Int(n)),
            Self::Float(x) => Ok(Number::Float(x)),
            Self::Bool(_) => Err(RuntimeError::type_error(
                format!("operand of '{op}' must be a number, found a boolean"),
                span,
            )),
            Self::Unset => Err(RuntimeError::UnsetValue { span }),
        }
    }

    /// Truthiness for the logical operators: `false`, `0` and `0.0` are false.
    pub fn truthy(self, span: Span) -> Result<bool, RuntimeError> {
        match self {
            Self::Bool(b) => Ok(b),
            Self::Int(n) => Ok(n != 0),
            Self::Float(x) => Ok(x != 0.0),
            Self::Unset => Err(RuntimeError::UnsetValue { span }),
        }
    }

    pub fn add(self, rhs: Self, span: Span) -> Result<Self, RuntimeError> {
        match (self.number("+", span)?, rhs.number("+", span)?) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_add(b)
                .map(Self::Int)
                .ok_or(RuntimeError::Overflow { span }),
            (a, b) => Ok(Self::Float(a.as_f64() + b.as_f64())),
        }
    }

    pub fn sub(self, rhs: Self, span: Span) -> Result<Self, RuntimeError> {
        match (self.number("-", span)?, rhs.number("-", span)?) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_sub(b)
                .map(Self::Int)
                .ok_or(RuntimeError::Overflow { span }),
            (a, b) => Ok(Self::Float(a.as_f64() - b.as_f64())),
        }
    }

    pub fn mul(self, rhs: Self, span: Span) -> Result<Self, RuntimeError> {
        match (self.number("*", span)?, rhs.number("*", span)?) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_mul(b)
                .map(Self::Int)
                .ok_or(RuntimeError::Overflow { span }),
            (a, b) => Ok(Self::Float(a.as_f64() * b.as_f64())),
        }
    }

    /// Division always produces a float, even for two integers.
    pub fn div(self, rhs: Self, span: Span) -> Result<Self, RuntimeError> {
        let (a, b) = (self.number("/", span)?, rhs.number("/", span)?);
        if b.is_zero() {
            return Err(RuntimeError::DivisionByZero { span });
        }
        Ok(Self::Float(a.as_f64() / b.as_f64()))
    }

    /// Floored modulo: the result takes the sign of the divisor.
    pub fn rem(self, rhs: Self, span: Span) -> Result<Self, RuntimeError> {
        let (a, b) = (self.number("%", span)?, rhs.number("%", span)?);
        if b.is_zero() {
            return Err(RuntimeError::ModuloByZero { span });
        }
        match (a, b) {
            (Number::Int(a), Number::Int(b)) => {
                let r = a.checked_rem(b).ok_or(RuntimeError::Overflow { span })?;
                if r != 0 && (r < 0) != (b < 0) {
                    Ok(Self::Int(r + b))
                } else {
                    Ok(Self::Int(r))
                }
            }
            (a, b) => {
                let (a, b) = (a.as_f64(), b.as_f64());
                let r = a % b;
                if r != 0.0 && (r < 0.0) != (b < 0.0) {
                    Ok(Self::Float(r + b))
                } else {
                    Ok(Self::Float(r))
                }
            }
        }
    }

    pub fn pow(self, rhs: Self, span: Span) -> Result<Self, RuntimeError> {
        let (base, exp) = (self.number("**", span)?, rhs.number("**", span)?);
        if base.is_zero() && exp.as_f64() < 0.0 {
            return Err(RuntimeError::DivisionByZero { span });
        }
        match (base, exp) {
            (Number::Int(a), Number::Int(b)) if b >= 0 => u32::try_from(b)
                .ok()
                .and_then(|b| a.checked_pow(b))
                .map(Self::Int)
                .ok_or(RuntimeError::Overflow { span }),
            (Number::Float(a), Number::Int(b)) if i32::try_from(b).is_ok() => {
                Ok(Self::Float(a.powi(b as i32)))
            }
            (a, b) => Ok(Self::Float(a.as_f64().powf(b.as_f64()))),
        }
    }

    pub fn negate(self, span: Span) -> Result<Self, RuntimeError> {
        match self.number("-", span)? {
            Number::Int(n) => n
                .checked_neg()
                .map(Self::Int)
                .ok_or(RuntimeError::Overflow { span }),
            Number::Float(x) => Ok(Self::Float(-x)),
        }
    }

    pub fn plus(self, span: Span) -> Result<Self, RuntimeError> {
        self.number("+", span)?;
        Ok(self)
    }

    pub fn not(self, span: Span) -> Result<Self, RuntimeError> {
        Ok(Self::Bool(!self.truthy(span)?))
    }

    pub fn and(self, rhs: Self, span: Span) -> Result<Self, RuntimeError> {
        Ok(Self::Bool(self.truthy(span)? && rhs.truthy(span)?))
    }

    pub fn or(self, rhs: Self, span: Span) -> Result<Self, RuntimeError> {
        Ok(Self::Bool(self.truthy(span)? || rhs.truthy(span)?))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Unset => write!(f, "unset"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SPAN: Span = Span { offset: 0, len: 1 };

    #[test]
    fn int_arithmetic_stays_int() {
        assert_eq!(Value::Int(2).add(Value::Int(3), SPAN), Ok(Value::Int(5)));
        assert_eq!(Value::Int(2).sub(Value::Int(3), SPAN), Ok(Value::Int(-1)));
        assert_eq!(Value::Int(4).mul(Value::Int(3), SPAN), Ok(Value::Int(12)));
    }

    #[test]
    fn mixed_arithmetic_promotes() {
        assert_eq!(Value::Int(2).add(Value::Float(0.5), SPAN), Ok(Value::Float(2.5)));
        assert_eq!(Value::Float(1.5).mul(Value::Int(2), SPAN), Ok(Value::Float(3.0)));
    }

    #[test]
    fn division_is_always_float() {
        assert_eq!(Value::Int(2).div(Value::Int(4), SPAN), Ok(Value::Float(0.5)));
        assert_eq!(Value::Int(6).div(Value::Int(3), SPAN), Ok(Value::Float(2.0)));
    }

    #[rstest]
    #[case(Value::Int(0))]
    #[case(Value::Float(0.0))]
    fn division_by_zero(#[case] zero: Value) {
        assert_eq!(
            Value::Int(5).div(zero, SPAN),
            Err(RuntimeError::DivisionByZero { span: SPAN })
        );
        assert_eq!(
            Value::Int(5).rem(zero, SPAN),
            Err(RuntimeError::ModuloByZero { span: SPAN })
        );
    }

    #[rstest]
    #[case(7, 3, 1)]
    #[case(-7, 3, 2)]
    #[case(7, -3, -2)]
    #[case(-7, -3, -1)]
    fn modulo_is_floored(#[case] a: i64, #[case] b: i64, #[case] expected: i64) {
        assert_eq!(Value::Int(a).rem(Value::Int(b), SPAN), Ok(Value::Int(expected)));
    }

    #[test]
    fn float_modulo_is_floored() {
        assert_eq!(Value::Float(-7.5).rem(Value::Int(2), SPAN), Ok(Value::Float(0.5)));
    }

    #[test]
    fn power_rules() {
        assert_eq!(Value::Int(2).pow(Value::Int(10), SPAN), Ok(Value::Int(1024)));
        assert_eq!(Value::Int(2).pow(Value::Int(-1), SPAN), Ok(Value::Float(0.5)));
        assert_eq!(Value::Float(1.5).pow(Value::Int(2), SPAN), Ok(Value::Float(2.25)));
        assert_eq!(Value::Int(4).pow(Value::Float(0.5), SPAN), Ok(Value::Float(2.0)));
        assert_eq!(
            Value::Int(0).pow(Value::Int(-2), SPAN),
            Err(RuntimeError::DivisionByZero { span: SPAN })
        );
    }

    #[test]
    fn overflow_is_reported() {
        let overflow = Err(RuntimeError::Overflow { span: SPAN });
        assert_eq!(Value::Int(i64::MAX).add(Value::Int(1), SPAN), overflow);
        assert_eq!(Value::Int(10).pow(Value::Int(40), SPAN), overflow);
        assert_eq!(Value::Int(i64::MIN).negate(SPAN), overflow);
    }

    #[test]
    fn unset_operand_is_an_error() {
        let unset = Err(RuntimeError::UnsetValue { span: SPAN });
        assert_eq!(Value::Unset.add(Value::Int(1), SPAN), unset);
        assert_eq!(Value::Int(1).mul(Value::Unset, SPAN), unset);
        assert_eq!(Value::Unset.not(SPAN), unset);
    }

    #[test]
    fn boolean_arithmetic_is_a_type_error() {
        let result = Value::Bool(true).add(Value::Int(1), SPAN);
        assert!(matches!(result, Err(RuntimeError::Type { .. })));
        assert!(matches!(Value::Bool(false).negate(SPAN), Err(RuntimeError::Type { .. })));
    }

    #[test]
    fn logic_uses_truthiness() {
        assert_eq!(Value::Bool(true).and(Value::Int(0), SPAN), Ok(Value::Bool(false)));
        assert_eq!(Value::Float(0.0).or(Value::Int(3), SPAN), Ok(Value::Bool(true)));
        assert_eq!(Value::Int(0).not(SPAN), Ok(Value::Bool(true)));
    }

    #[test]
    fn display() {
        assert_eq!(Value::Int(11).to_string(), "11");
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Unset.to_string(), "unset");
    }
}
