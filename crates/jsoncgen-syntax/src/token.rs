//! Token definitions shared by the lexer and parser.

use std::fmt;

/// Go keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,
}

impl Keyword {
    pub fn from_ident(ident: &str) -> Option<Self> {
        let keyword = match ident {
            "break" => Self::Break,
            "case" => Self::Case,
            "chan" => Self::Chan,
            "const" => Self::Const,
            "continue" => Self::Continue,
            "default" => Self::Default,
            "defer" => Self::Defer,
            "else" => Self::Else,
            "fallthrough" => Self::Fallthrough,
            "for" => Self::For,
            "func" => Self::Func,
            "go" => Self::Go,
            "goto" => Self::Goto,
            "if" => Self::If,
            "import" => Self::Import,
            "interface" => Self::Interface,
            "map" => Self::Map,
            "package" => Self::Package,
            "range" => Self::Range,
            "return" => Self::Return,
            "select" => Self::Select,
            "struct" => Self::Struct,
            "switch" => Self::Switch,
            "type" => Self::Type,
            "var" => Self::Var,
            _ => return None,
        };
        Some(keyword)
    }
}

/// Kind of a basic literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Keyword(Keyword),
    /// Literal with its raw source text, quotes included.
    Literal(LitKind, String),
    /// Comment with its raw source text, markers included.
    Comment(String),
    Punct(&'static str),
    /// Explicit `;` or one inserted at a line break.
    Semi,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// 1-based line the token starts on.
    pub line: u32,
    /// 1-based line the token ends on.
    pub end_line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, line: u32, end_line: u32) -> Self {
        Self {
            kind,
            line,
            end_line,
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::Comment(_))
    }

    pub fn is_punct(&self, punct: &str) -> bool {
        matches!(self.kind, TokenKind::Punct(p) if p == punct)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    /// Whether a line break after this token terminates a statement.
    pub(crate) fn ends_statement(&self) -> bool {
        match &self.kind {
            TokenKind::Ident(_) | TokenKind::Literal(..) => true,
            TokenKind::Keyword(keyword) => matches!(
                keyword,
                Keyword::Break | Keyword::Continue | Keyword::Fallthrough | Keyword::Return
            ),
            TokenKind::Punct(p) => matches!(*p, "++" | "--" | ")" | "]" | "}"),
            _ => false,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "identifier {name}"),
            TokenKind::Keyword(keyword) => write!(f, "keyword {}", format!("{keyword:?}").to_lowercase()),
            TokenKind::Literal(_, raw) => write!(f, "literal {raw}"),
            TokenKind::Comment(_) => f.write_str("comment"),
            TokenKind::Punct(p) => write!(f, "'{p}'"),
            TokenKind::Semi => f.write_str("newline"),
            TokenKind::Eof => f.write_str("EOF"),
        }
    }
}

/// Maps byte offsets to 1-based line numbers.
pub(crate) struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(source: &str) -> Self {
        let mut line_starts = Vec::with_capacity(128);
        line_starts.push(0);
        for (idx, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        Self { line_starts }
    }

    pub(crate) fn line(&self, offset: usize) -> u32 {
        let idx = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        idx as u32 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_index_maps_offsets() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line(0), 1);
        assert_eq!(index.line(2), 1);
        assert_eq!(index.line(3), 2);
        assert_eq!(index.line(6), 3);
        assert_eq!(index.line(7), 4);
    }

    #[test]
    fn keywords_are_recognized() {
        assert_eq!(Keyword::from_ident("struct"), Some(Keyword::Struct));
        assert_eq!(Keyword::from_ident("structure"), None);
    }
}
