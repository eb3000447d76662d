use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    // Literals
    Int,
    Float,
    Bool,
    Identifier,

    // Keywords
    Type,
    Control,

    // Operators
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    Power,
    Assign,
    And,
    Or,
    Not,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,

    Eof,
}

impl TokenKind {
    /// Whether an expression can end with this token.
    pub fn ends_operand(self) -> bool {
        matches!(
            self,
            Self::Int | Self::Float | Self::Bool | Self::Identifier | Self::RightParen
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Self {
        let end = (other.offset + other.len).max(self.offset + self.len);
        Self::new(self.offset, end - self.offset)
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::new(span.offset.into(), span.len)
    }
}

/// Literal payload carried by `Int`, `Float` and `Bool` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<Literal>,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            literal: None,
            span,
        }
    }

    pub fn with_literal(mut self, literal: Literal) -> Self {
        self.literal = Some(literal);
        self
    }

    /// Text shown in the "Value" column of a token table.
    pub fn value_text(&self) -> String {
        match self.literal {
            Some(literal) => literal.to_string(),
            None => self.lexeme.clone(),
        }
    }

    /// How the token is named in syntax error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", self.lexeme),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' @{}", self.kind, self.lexeme, self.span.offset)
    }
}

pub fn keyword_kind(ident: &str) -> Option<TokenKind> {
    match ident {
        "int" | "float" | "char" | "double" | "void" => Some(TokenKind::Type),
        "return" | "if" | "else" | "while" | "for" => Some(TokenKind::Control),
        "true" | "false" => Some(TokenKind::Bool),
        "and" => Some(TokenKind::And),
        "or" => Some(TokenKind::Or),
        "not" => Some(TokenKind::Not),
        _ => None,
    }
}
