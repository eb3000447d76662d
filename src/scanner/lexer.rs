use winnow::combinator::alt;
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::stream::{LocatingSlice, Location};
use winnow::token::{any, take_while};

use crate::error::CompileError;
use crate::scanner::token::{Literal, Span, Token, TokenKind, keyword_kind};

type Input<'a> = LocatingSlice<&'a str>;

/// Outcome of scanning one lexeme: a token, or an error for a lexeme that was consumed anyway.
type Scanned = Result<Token, CompileError>;

fn whitespace<'a>(input: &mut Input<'a>) -> ModalResult<()> {
    take_while(0.., char::is_whitespace)
        .void()
        .parse_next(input)
}

fn number_literal<'a>(input: &mut Input<'a>) -> ModalResult<Scanned> {
    let start = input.current_token_start();
    let lexeme: &str =
        take_while(1.., |c: char| c.is_ascii_digit() || c == '.').parse_next(input)?;
    let span = Span::new(start, lexeme.len());

    let dots = lexeme.matches('.').count();
    let scanned = if dots > 1 {
        Err(CompileError::invalid_number(lexeme, start))
    } else if dots == 1 {
        lexeme
            .parse::<f64>()
            .map(|x| Token::new(TokenKind::Float, lexeme, span).with_literal(Literal::Float(x)))
            .map_err(|_| CompileError::invalid_number(lexeme, start))
    } else {
        lexeme
            .parse::<i64>()
            .map(|n| Token::new(TokenKind::Int, lexeme, span).with_literal(Literal::Int(n)))
            .map_err(|_| CompileError::invalid_number(lexeme, start))
    };
    Ok(scanned)
}

fn identifier_or_keyword<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let first: char = any
        .verify(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .parse_next(input)?;
    let rest: &str =
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)?;
    let mut lexeme = String::with_capacity(1 + rest.len());
    lexeme.push(first);
    lexeme.push_str(rest);
    let span = Span::new(start, lexeme.len());

    let token = match keyword_kind(&lexeme) {
        Some(TokenKind::Bool) => {
            let value = lexeme == "true";
            Token::new(TokenKind::Bool, lexeme, span).with_literal(Literal::Bool(value))
        }
        Some(kind) => Token::new(kind, lexeme, span),
        None => Token::new(TokenKind::Identifier, lexeme, span),
    };
    Ok(token)
}

fn two_char_token<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    "**".parse_next(input)?;
    Ok(Token::new(TokenKind::Power, "**", Span::new(start, 2)))
}

fn single_char_token<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let c = any
        .verify(|c: &char| "+-*/%=;{}(),".contains(*c))
        .parse_next(input)?;
    let kind = match c {
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Mul,
        '/' => TokenKind::Div,
        '%' => TokenKind::Mod,
        '=' => TokenKind::Assign,
        ';' => TokenKind::Semicolon,
        '{' => TokenKind::LeftBrace,
        '}' => TokenKind::RightBrace,
        '(' => TokenKind::LeftParen,
        ')' => TokenKind::RightParen,
        ',' => TokenKind::Comma,
        _ => unreachable!("verify guarantees valid char"),
    };
    Ok(Token::new(kind, c.to_string(), Span::new(start, 1)))
}

fn scan_token<'a>(input: &mut Input<'a>) -> ModalResult<Scanned> {
    alt((
        number_literal,
        identifier_or_keyword.map(Ok),
        two_char_token.map(Ok),
        single_char_token.map(Ok),
    ))
    .parse_next(input)
}

/// Scan all tokens from source.
///
/// Scanning never stops early: an unrecognized character or a malformed number is reported and
/// skipped, so the returned tokens are a best-effort sequence that always ends in one `Eof`.
pub fn scan_all(source: &str) -> (Vec<Token>, Vec<CompileError>) {
    let mut input = LocatingSlice::new(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    loop {
        if whitespace(&mut input).is_err() || input.is_empty() {
            break;
        }
        match scan_token(&mut input) {
            Ok(Ok(token)) => tokens.push(token),
            Ok(Err(error)) => errors.push(error),
            Err(_) => {
                let offset = input.current_token_start();
                let ch = any::<_, ContextError>
                    .parse_next(&mut input)
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                errors.push(CompileError::lex(ch, offset));
            }
        }
    }

    let eof_offset = source.len();
    tokens.push(Token::new(TokenKind::Eof, "", Span::new(eof_offset, 0)));
    (tokens, errors)
}
