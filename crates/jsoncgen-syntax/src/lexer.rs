//! Winnow tokenizer for Go source files
//!
//! Produces the full token stream, comments included, with Go's automatic
//! semicolon insertion applied at line breaks.

use winnow::{
    Parser, Result as WResult,
    ascii::multispace0,
    combinator::{alt, preceded, repeat},
    error::ContextError,
    token::{any, none_of, take_until, take_while},
};

use crate::error::ParseError;
use crate::token::{Keyword, LineIndex, LitKind, Token, TokenKind};

/// Operators and delimiters, longest first.
const PUNCTUATION: &[&str] = &[
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "&^", "+", "-", "*", "/", "%", "&", "|",
    "^", "<", ">", "=", "!", "~", "(", ")", "[", "]", "{", "}", ",", ".", ":", ";",
];

/// Tokenize a complete source file.
///
/// The returned stream always ends with [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let index = LineIndex::new(source);
    let mut input = source;
    let mut raw = Vec::new();

    loop {
        let _: WResult<&str> = multispace0.parse_next(&mut input);
        if input.is_empty() {
            break;
        }

        let start = source.len() - input.len();
        let kind = next_token(&mut input).map_err(|_| {
            let ch = input.chars().next().unwrap_or_default();
            ParseError::new(index.line(start), format!("unexpected character {ch:?}"))
        })?;
        let end = source.len() - input.len();

        raw.push(Token::new(kind, index.line(start), index.line(end.saturating_sub(1))));
    }

    let last_line = index.line(source.len());
    Ok(insert_semicolons(raw, last_line))
}

fn next_token(input: &mut &str) -> WResult<TokenKind> {
    alt((
        line_comment.map(|text: &str| TokenKind::Comment(text.to_string())),
        block_comment.map(|text: &str| TokenKind::Comment(text.to_string())),
        interpreted_string.map(|text: &str| TokenKind::Literal(LitKind::String, text.to_string())),
        raw_string.map(|text: &str| TokenKind::Literal(LitKind::String, text.to_string())),
        rune_literal.map(|text: &str| TokenKind::Literal(LitKind::Char, text.to_string())),
        number.map(|text: &str| TokenKind::Literal(classify_number(text), text.to_string())),
        identifier.map(|ident: &str| match Keyword::from_ident(ident) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Ident(ident.to_string()),
        }),
        punctuation.map(|punct| match punct {
            ";" => TokenKind::Semi,
            other => TokenKind::Punct(other),
        }),
    ))
    .parse_next(input)
}

// Parse line comment: // text
fn line_comment<'s>(input: &mut &'s str) -> WResult<&'s str> {
    ("//", take_while(0.., |c: char| c != '\n'))
        .take()
        .map(|text: &str| text.trim_end_matches('\r'))
        .parse_next(input)
}

// Parse block comment: /* text */
fn block_comment<'s>(input: &mut &'s str) -> WResult<&'s str> {
    ("/*", take_until(0.., "*/"), "*/").take().parse_next(input)
}

// Parse identifier: letters, digits and underscore, not starting with a digit
fn identifier<'s>(input: &mut &'s str) -> WResult<&'s str> {
    (
        take_while(1, |c: char| c.is_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

// Parse interpreted string: "content" with backslash escapes
fn interpreted_string<'s>(input: &mut &'s str) -> WResult<&'s str> {
    (
        '"',
        repeat::<_, _, (), _, _>(
            0..,
            alt((preceded('\\', any).void(), none_of(['"', '\\', '\n']).void())),
        ),
        '"',
    )
        .take()
        .parse_next(input)
}

// Parse raw string: `content`
fn raw_string<'s>(input: &mut &'s str) -> WResult<&'s str> {
    ('`', take_until(0.., '`'), '`').take().parse_next(input)
}

// Parse rune literal: 'c'
fn rune_literal<'s>(input: &mut &'s str) -> WResult<&'s str> {
    (
        '\'',
        repeat::<_, _, (), _, _>(
            1..,
            alt((preceded('\\', any).void(), none_of(['\'', '\\', '\n']).void())),
        ),
        '\'',
    )
        .take()
        .parse_next(input)
}

// Parse number literal: decimal, hex, octal, binary, float or imaginary
fn number<'s>(input: &mut &'s str) -> WResult<&'s str> {
    let bytes = input.as_bytes();
    let starts_number = match bytes {
        [b'0'..=b'9', ..] => true,
        [b'.', b'0'..=b'9', ..] => true,
        _ => false,
    };
    if !starts_number {
        return Err(ContextError::new());
    }

    let hex = bytes.len() > 1 && bytes[0] == b'0' && matches!(bytes[1], b'x' | b'X');
    let mut end = 0;
    while end < bytes.len() {
        let b = bytes[end];
        let exponent_sign = matches!(b, b'+' | b'-')
            && end > 0
            && if hex {
                matches!(bytes[end - 1], b'p' | b'P')
            } else {
                matches!(bytes[end - 1], b'e' | b'E')
            };
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || exponent_sign {
            end += 1;
        } else {
            break;
        }
    }

    let (text, rest) = input.split_at(end);
    *input = rest;
    Ok(text)
}

fn classify_number(text: &str) -> LitKind {
    let hex = text.starts_with("0x") || text.starts_with("0X");
    if text.ends_with('i') {
        LitKind::Imag
    } else if hex {
        if text.contains(['p', 'P']) {
            LitKind::Float
        } else {
            LitKind::Int
        }
    } else if text.contains(['.', 'e', 'E']) {
        LitKind::Float
    } else {
        LitKind::Int
    }
}

fn punctuation(input: &mut &str) -> WResult<&'static str> {
    for punct in PUNCTUATION {
        if let Some(rest) = input.strip_prefix(*punct) {
            *input = rest;
            return Ok(*punct);
        }
    }
    Err(ContextError::new())
}

/// Insert `;` after a statement-ending token followed by a line break.
///
/// The semicolon is placed before any comment that shares the line, so a
/// trailing comment always follows the semicolon that ends its line.
fn insert_semicolons(raw: Vec<Token>, last_line: u32) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(raw.len() + raw.len() / 4 + 1);
    let mut pending: Option<u32> = None;

    for token in raw {
        if let Some(line) = pending {
            let breaks = match &token.kind {
                TokenKind::Comment(text) => text.starts_with("//") || token.end_line > line,
                _ => token.line > line,
            };
            if breaks {
                tokens.push(Token::new(TokenKind::Semi, line, line));
                pending = None;
            }
        }
        if !token.is_comment() {
            pending = token.ends_statement().then_some(token.end_line);
        }
        tokens.push(token);
    }

    if let Some(line) = pending {
        tokens.push(Token::new(TokenKind::Semi, line, line));
    }
    tokens.push(Token::new(TokenKind::Eof, last_line, last_line));
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn tokenizes_field_declaration() {
        let tokens = kinds("Name string `json:\"name\"`\n");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Ident("Name".into()),
                TokenKind::Ident("string".into()),
                TokenKind::Literal(LitKind::String, "`json:\"name\"`".into()),
                TokenKind::Semi,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn semicolon_precedes_trailing_comment() {
        let tokens = kinds("A int // doc\nB int");
        assert_eq!(tokens[2], TokenKind::Semi);
        assert_eq!(tokens[3], TokenKind::Comment("// doc".into()));
        assert_eq!(tokens[4], TokenKind::Ident("B".into()));
        assert_eq!(tokens[6], TokenKind::Semi);
    }

    #[test]
    fn no_semicolon_after_operators() {
        let tokens = kinds("x := 1 +\n2");
        assert!(!tokens[..4].contains(&TokenKind::Semi));
    }

    #[test]
    fn numbers_are_classified() {
        assert_eq!(classify_number("0x1F"), LitKind::Int);
        assert_eq!(classify_number("0xE"), LitKind::Int);
        assert_eq!(classify_number("1.5e3"), LitKind::Float);
        assert_eq!(classify_number("0x1p-2"), LitKind::Float);
        assert_eq!(classify_number("2i"), LitKind::Imag);
        assert_eq!(classify_number("1_000"), LitKind::Int);
    }

    #[test]
    fn hex_digits_do_not_take_signs() {
        let tokens = kinds("0xE-1");
        assert_eq!(tokens[0], TokenKind::Literal(LitKind::Int, "0xE".into()));
        assert_eq!(tokens[1], TokenKind::Punct("-"));
    }

    #[test]
    fn exponent_takes_sign() {
        let tokens = kinds("1e-3");
        assert_eq!(tokens[0], TokenKind::Literal(LitKind::Float, "1e-3".into()));
    }

    #[test]
    fn longest_operator_wins() {
        let tokens = kinds("a &^= b");
        assert_eq!(tokens[1], TokenKind::Punct("&^="));
    }

    #[test]
    fn tracks_lines_of_block_comments() {
        let tokens = tokenize("/* one\ntwo */\nx").unwrap();
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[0].end_line, 2);
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn rejects_stray_characters() {
        let err = tokenize("a\n  @").unwrap_err();
        assert_eq!(err.line, 2);
    }
}
