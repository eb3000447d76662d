use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::scanner::token::{Span, TokenKind};

// ============= Compile-time errors (with miette diagnostics) =============

#[derive(Error, Debug, Diagnostic)]
pub enum CompileError {
    #[error("unexpected character '{ch}'")]
    #[diagnostic(code(minic::lex))]
    Lex {
        ch: char,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },

    #[error("invalid number '{lexeme}'")]
    #[diagnostic(code(minic::number))]
    InvalidNumber {
        lexeme: String,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },

    #[error("expected {expected}, found {found}")]
    #[diagnostic(code(minic::syntax))]
    Syntax {
        expected: String,
        found: String,
        found_kind: TokenKind,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },
}

impl CompileError {
    pub fn lex(ch: char, offset: usize) -> Self {
        Self::Lex {
            ch,
            span: SourceSpan::new(offset.into(), ch.len_utf8()),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    pub fn invalid_number(lexeme: impl Into<String>, offset: usize) -> Self {
        let lexeme = lexeme.into();
        let len = lexeme.len();
        Self::InvalidNumber {
            lexeme,
            span: SourceSpan::new(offset.into(), len),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    pub fn syntax(
        expected: impl Into<String>,
        found: impl Into<String>,
        found_kind: TokenKind,
        span: Span,
    ) -> Self {
        Self::Syntax {
            expected: expected.into(),
            found: found.into(),
            found_kind,
            span: SourceSpan::new(span.offset.into(), span.len),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    /// Byte offset of the offending source text.
    pub fn offset(&self) -> usize {
        match self {
            Self::Lex { span, .. } | Self::InvalidNumber { span, .. } | Self::Syntax { span, .. } => {
                span.offset()
            }
        }
    }

    /// Attach source code for fancy miette diagnostics
    pub fn with_source_code(self, name: impl Into<String>, source: impl Into<String>) -> Self {
        let src = miette::NamedSource::new(name.into(), source.into());
        match self {
            Self::Lex { ch, span, .. } => Self::Lex { ch, span, src },
            Self::InvalidNumber { lexeme, span, .. } => Self::InvalidNumber { lexeme, span, src },
            Self::Syntax {
                expected,
                found,
                found_kind,
                span,
                ..
            } => Self::Syntax {
                expected,
                found,
                found_kind,
                span,
                src,
            },
        }
    }
}

// ============= Runtime errors (simple, no miette) =============

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("division by zero")]
    DivisionByZero { span: Span },

    #[error("modulo by zero")]
    ModuloByZero { span: Span },

    #[error("operand is unset")]
    UnsetValue { span: Span },

    #[error("type error: {message}")]
    Type { message: String, span: Span },

    #[error("integer overflow")]
    Overflow { span: Span },

    #[error("assignment to undeclared identifier '{name}'")]
    UndeclaredAssignment { name: String, span: Span },
}

impl RuntimeError {
    pub fn type_error(message: impl Into<String>, span: Span) -> Self {
        Self::Type {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::DivisionByZero { span }
            | Self::ModuloByZero { span }
            | Self::UnsetValue { span }
            | Self::Type { span, .. }
            | Self::Overflow { span }
            | Self::UndeclaredAssignment { span, .. } => *span,
        }
    }

    /// Format error with line number (requires source code)
    pub fn display_with_line(&self, source: &str) -> String {
        let line = offset_to_line(source, self.span().offset);
        format!("Error: line {line}: {self}")
    }
}

// ============= Collected errors =============

/// Any error a run can produce, in the order it was produced.
#[derive(Error, Debug)]
pub enum InterpretError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl InterpretError {
    pub fn offset(&self) -> usize {
        match self {
            Self::Compile(e) => e.offset(),
            Self::Runtime(e) => e.span().offset,
        }
    }

    pub fn display_with_line(&self, source: &str) -> String {
        match self {
            Self::Compile(e) => {
                format!("Error: line {}: {e}", offset_to_line(source, e.offset()))
            }
            Self::Runtime(e) => e.display_with_line(source),
        }
    }
}

/// Append-only error sink shared by one interpretation run.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Vec<InterpretError>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: impl Into<InterpretError>) {
        self.errors.push(error.into());
    }

    pub fn extend<E: Into<InterpretError>>(&mut self, errors: impl IntoIterator<Item = E>) {
        self.errors.extend(errors.into_iter().map(Into::into));
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InterpretError> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<InterpretError> {
        self.errors
    }

    /// Errors ordered by source offset. Errors at the same offset keep the order they were pushed.
    pub fn into_source_order(mut self) -> Vec<InterpretError> {
        self.errors.sort_by_key(InterpretError::offset);
        self.errors
    }
}

/// Calculate line number from byte offset in source
pub fn offset_to_line(source: &str, offset: usize) -> usize {
    source
        .bytes()
        .take(offset.min(source.len()))
        .filter(|&b| b == b'\n')
        .count()
        + 1
}

// ============= Tests =============
