//! Recursive-descent parser for Go declarations
//!
//! Comment attachment follows the Go toolchain: a *lead* comment is the
//! comment group ending on the line right before a token, a *line* comment
//! is the group that starts on the same line as the preceding token and is
//! followed by a line break.

use crate::ast::{
    CompositeLit, Decl, DeclKeyword, Element, Expr, Field, File, FuncDecl, GenDecl, ImportSpec,
    Spec, TypeExpr, TypeSpec, ValueSpec,
};
use crate::comment::CommentGroup;
use crate::constant::unquote;
use crate::error::ParseError;
use crate::lexer::tokenize;
use crate::token::{Keyword, LitKind, Token, TokenKind};

type Result<T> = std::result::Result<T, ParseError>;

static EOF: Token = Token {
    kind: TokenKind::Eof,
    line: 0,
    end_line: 0,
};

/// Parse a complete Go source file.
pub fn parse_file(source: &str) -> Result<File> {
    let tokens = tokenize(source)?;
    Parser::new(&tokens).parse_file()
}

/// Parse a standalone expression, e.g. `1 << 3` or `Config{Port: 80}`.
pub fn parse_expr(source: &str) -> Result<Expr> {
    let tokens = tokenize(source)?;
    let mut parser = Parser::new(&tokens);
    let expr = parser.parse_expr()?;
    while parser.at_semi() {
        parser.next();
    }
    if !parser.at_eof() {
        return Err(parser.unexpected("end of expression"));
    }
    Ok(expr)
}

pub(crate) struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    lead_comment: Option<CommentGroup>,
    line_comment: Option<CommentGroup>,
}

enum Param {
    Bare(TypeExpr),
    Named(String, TypeExpr),
}

impl<'t> Parser<'t> {
    pub(crate) fn new(tokens: &'t [Token]) -> Self {
        let mut parser = Self {
            tokens,
            pos: 0,
            lead_comment: None,
            line_comment: None,
        };
        parser.consume_comments(0);
        parser
    }

    // ---- token navigation -------------------------------------------------

    fn cur(&self) -> &'t Token {
        self.tokens.get(self.pos).unwrap_or(&EOF)
    }

    /// The `n`th non-comment token after the current one.
    fn peek(&self, n: usize) -> &'t Token {
        self.tokens
            .get(self.pos..)
            .unwrap_or(&[])
            .iter()
            .filter(|token| !token.is_comment())
            .nth(n)
            .unwrap_or(&EOF)
    }

    fn next(&mut self) {
        self.lead_comment = None;
        self.line_comment = None;
        let prev_line = self.cur().line;
        if self.cur().kind != TokenKind::Eof {
            self.pos += 1;
        }
        self.consume_comments(prev_line);
    }

    fn consume_comments(&mut self, prev_line: u32) {
        if !self.cur().is_comment() {
            return;
        }

        if self.cur().line == prev_line {
            let (group, end_line) = self.comment_group(0);
            let next_on_other_line = self.cur().line != end_line;
            if next_on_other_line || matches!(self.cur().kind, TokenKind::Semi | TokenKind::Eof) {
                self.line_comment = Some(group);
            }
        }

        let mut last = None;
        while self.cur().is_comment() {
            last = Some(self.comment_group(1));
        }
        if let Some((group, end_line)) = last {
            if end_line + 1 == self.cur().line {
                self.lead_comment = Some(group);
            }
        }
    }

    /// Collect comments while each starts at most `n` lines after the
    /// previous one ended.
    fn comment_group(&mut self, n: u32) -> (CommentGroup, u32) {
        let mut comments = Vec::new();
        let mut end_line = self.cur().line;
        while let TokenKind::Comment(text) = &self.cur().kind {
            if self.cur().line > end_line + n {
                break;
            }
            comments.push(text.clone());
            end_line = self.cur().end_line;
            self.pos += 1;
        }
        (CommentGroup::new(comments), end_line)
    }

    fn at_punct(&self, punct: &str) -> bool {
        self.cur().is_punct(punct)
    }

    fn at_semi(&self) -> bool {
        self.cur().kind == TokenKind::Semi
    }

    fn at_eof(&self) -> bool {
        self.cur().kind == TokenKind::Eof
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::new(
            self.cur().line,
            format!("expected {expected}, found {}", self.cur().kind),
        )
    }

    fn expect_punct(&mut self, punct: &str) -> Result<()> {
        if self.at_punct(punct) {
            self.next();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{punct}'")))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        if self.cur().is_keyword(keyword) {
            self.next();
            Ok(())
        } else {
            Err(self.unexpected(&format!("keyword {}", format!("{keyword:?}").to_lowercase())))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match &self.cur().kind {
            TokenKind::Ident(name) => {
                self.next();
                Ok(name.clone())
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// A semicolon is optional before a closing `)` or `}`.
    fn expect_semi(&mut self) -> Result<()> {
        if self.at_punct(")") || self.at_punct("}") || self.at_eof() {
            return Ok(());
        }
        if self.at_semi() {
            self.next();
            return Ok(());
        }
        Err(self.unexpected("';' or newline"))
    }

    /// Skip a bracketed region starting at `open`, nesting included.
    fn skip_balanced(&mut self, open: &str, close: &str) -> Result<()> {
        let mut depth = 0usize;
        loop {
            if self.at_eof() {
                return Err(self.unexpected(&format!("'{close}'")));
            }
            if self.at_punct(open) {
                depth += 1;
            } else if self.at_punct(close) {
                depth -= 1;
                if depth == 0 {
                    self.next();
                    return Ok(());
                }
            }
            self.next();
        }
    }

    // ---- declarations -----------------------------------------------------

    fn parse_file(&mut self) -> Result<File> {
        let doc = self.lead_comment.take();
        self.expect_keyword(Keyword::Package)?;
        let package = self.expect_ident()?;
        self.expect_semi()?;

        let mut imports = Vec::new();
        let mut decls = Vec::new();
        while !self.at_eof() {
            match &self.cur().kind {
                TokenKind::Keyword(Keyword::Import) => {
                    let decl = self.parse_gen_decl(DeclKeyword::Import)?;
                    imports.extend(decl.specs.into_iter().filter_map(|spec| match spec {
                        Spec::Import(import) => Some(import),
                        _ => None,
                    }));
                }
                TokenKind::Keyword(Keyword::Const) => {
                    decls.push(Decl::Gen(self.parse_gen_decl(DeclKeyword::Const)?));
                }
                TokenKind::Keyword(Keyword::Var) => {
                    decls.push(Decl::Gen(self.parse_gen_decl(DeclKeyword::Var)?));
                }
                TokenKind::Keyword(Keyword::Type) => {
                    decls.push(Decl::Gen(self.parse_gen_decl(DeclKeyword::Type)?));
                }
                TokenKind::Keyword(Keyword::Func) => {
                    decls.push(Decl::Func(self.parse_func_decl()?));
                }
                TokenKind::Semi => self.next(),
                _ => return Err(self.unexpected("declaration")),
            }
        }

        Ok(File {
            package,
            doc,
            imports,
            decls,
        })
    }

    fn parse_gen_decl(&mut self, keyword: DeclKeyword) -> Result<GenDecl> {
        let doc = self.lead_comment.take();
        self.next();

        let mut specs = Vec::new();
        if self.at_punct("(") {
            self.next();
            while !self.at_punct(")") && !self.at_eof() {
                let spec_doc = self.lead_comment.take();
                specs.push(self.parse_spec(keyword, spec_doc)?);
            }
            self.expect_punct(")")?;
            self.expect_semi()?;
        } else {
            let spec_doc = self.lead_comment.take();
            specs.push(self.parse_spec(keyword, spec_doc)?);
        }

        Ok(GenDecl { keyword, doc, specs })
    }

    fn parse_spec(&mut self, keyword: DeclKeyword, doc: Option<CommentGroup>) -> Result<Spec> {
        match keyword {
            DeclKeyword::Import => self.parse_import_spec().map(Spec::Import),
            DeclKeyword::Type => self.parse_type_spec(doc).map(Spec::Type),
            DeclKeyword::Const | DeclKeyword::Var => self.parse_value_spec(doc).map(Spec::Value),
        }
    }

    fn parse_import_spec(&mut self) -> Result<ImportSpec> {
        let name = match &self.cur().kind {
            TokenKind::Ident(name) => Some(name.clone()),
            TokenKind::Punct(".") => Some(".".to_string()),
            _ => None,
        };
        if name.is_some() {
            self.next();
        }

        let path = match &self.cur().kind {
            TokenKind::Literal(LitKind::String, raw) => unquote(raw)
                .ok_or_else(|| ParseError::new(self.cur().line, format!("invalid import path {raw}")))?,
            _ => return Err(self.unexpected("import path")),
        };
        self.next();
        self.expect_semi()?;

        Ok(ImportSpec { name, path })
    }

    fn parse_type_spec(&mut self, doc: Option<CommentGroup>) -> Result<TypeSpec> {
        let name = self.expect_ident()?;

        let mut generic = false;
        if self.at_punct("[") && matches!(self.peek(1).kind, TokenKind::Ident(_)) {
            let third = self.peek(2);
            let type_param = matches!(
                third.kind,
                TokenKind::Ident(_)
                    | TokenKind::Keyword(Keyword::Interface | Keyword::Map | Keyword::Chan | Keyword::Func)
            ) || third.is_punct(",")
                || third.is_punct("~")
                || third.is_punct("[");
            if type_param {
                self.skip_balanced("[", "]")?;
                generic = true;
            }
        }

        let alias = self.at_punct("=");
        if alias {
            self.next();
        }

        let ty = self.parse_type()?;
        self.expect_semi()?;
        let comment = self.line_comment.take();

        Ok(TypeSpec {
            doc,
            name,
            generic,
            alias,
            ty,
            comment,
        })
    }

    fn parse_value_spec(&mut self, doc: Option<CommentGroup>) -> Result<ValueSpec> {
        let mut names = vec![self.expect_ident()?];
        while self.at_punct(",") {
            self.next();
            names.push(self.expect_ident()?);
        }

        let ty = if self.at_punct("=") || self.at_semi() || self.at_punct(")") || self.at_eof() {
            None
        } else {
            Some(self.parse_type()?)
        };

        let mut values = Vec::new();
        if self.at_punct("=") {
            self.next();
            values.push(self.parse_expr()?);
            while self.at_punct(",") {
                self.next();
                values.push(self.parse_expr()?);
            }
        }

        self.expect_semi()?;
        let comment = self.line_comment.take();

        Ok(ValueSpec {
            doc,
            names,
            ty,
            values,
            comment,
        })
    }

    fn parse_func_decl(&mut self) -> Result<FuncDecl> {
        let doc = self.lead_comment.take();
        self.next();

        let recv = if self.at_punct("(") {
            Some(self.parse_params()?)
        } else {
            None
        };
        let name = self.expect_ident()?;
        if self.at_punct("[") {
            self.skip_balanced("[", "]")?;
        }
        let params = self.parse_params()?;
        let results = self.parse_results()?;
        let body = if self.at_punct("{") {
            Some(self.capture_block()?)
        } else {
            None
        };
        self.expect_semi()?;

        Ok(FuncDecl {
            doc,
            recv,
            name,
            params,
            results,
            body,
        })
    }

    /// Copy the tokens of a `{ ... }` block and move past it.
    fn capture_block(&mut self) -> Result<Vec<Token>> {
        let start = self.pos;
        let mut depth = 0usize;
        let mut end = None;
        for (idx, token) in self.tokens.iter().enumerate().skip(start) {
            match &token.kind {
                TokenKind::Punct("{") => depth += 1,
                TokenKind::Punct("}") => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(idx);
                        break;
                    }
                }
                TokenKind::Eof => break,
                _ => {}
            }
        }

        let Some(end) = end else {
            return Err(ParseError::new(self.cur().line, "unterminated function body"));
        };

        let mut body = self.tokens[start..=end].to_vec();
        let last_line = self.tokens[end].end_line;
        body.push(Token::new(TokenKind::Eof, last_line, last_line));

        self.pos = end;
        self.next();
        Ok(body)
    }

    fn parse_params(&mut self) -> Result<Vec<Field>> {
        self.expect_punct("(")?;

        let mut items = Vec::new();
        while !self.at_punct(")") && !self.at_eof() {
            let item = match &self.cur().kind {
                TokenKind::Ident(name) => {
                    let follower = self.peek(1);
                    if follower.is_punct(",") || follower.is_punct(")") {
                        self.next();
                        Param::Bare(TypeExpr::Name(name.clone()))
                    } else if follower.is_punct(".") {
                        Param::Bare(self.parse_type()?)
                    } else {
                        self.next();
                        if self.at_punct("...") {
                            self.next();
                        }
                        Param::Named(name.clone(), self.parse_type()?)
                    }
                }
                _ => {
                    if self.at_punct("...") {
                        self.next();
                    }
                    Param::Bare(self.parse_type()?)
                }
            };
            items.push(item);

            if self.at_punct(",") {
                self.next();
            } else {
                break;
            }
        }
        self.expect_punct(")")?;

        let named = items.iter().any(|item| matches!(item, Param::Named(..)));
        if !named {
            return Ok(items
                .into_iter()
                .filter_map(|item| match item {
                    Param::Bare(ty) => Some(unnamed_field(ty)),
                    Param::Named(..) => None,
                })
                .collect());
        }

        let mut fields = Vec::new();
        let mut pending = Vec::new();
        for item in items {
            match item {
                Param::Bare(TypeExpr::Name(name)) => pending.push(name),
                Param::Bare(_) => {
                    return Err(ParseError::new(
                        self.cur().line,
                        "mixed named and unnamed parameters",
                    ));
                }
                Param::Named(name, ty) => {
                    pending.push(name);
                    let mut field = unnamed_field(ty);
                    field.names = std::mem::take(&mut pending);
                    fields.push(field);
                }
            }
        }
        if !pending.is_empty() {
            return Err(ParseError::new(
                self.cur().line,
                "mixed named and unnamed parameters",
            ));
        }
        Ok(fields)
    }

    fn parse_results(&mut self) -> Result<Vec<Field>> {
        if self.at_punct("(") {
            self.parse_params()
        } else if self.at_type_start() {
            Ok(vec![unnamed_field(self.parse_type()?)])
        } else {
            Ok(Vec::new())
        }
    }

    fn at_type_start(&self) -> bool {
        match &self.cur().kind {
            TokenKind::Ident(_) => true,
            TokenKind::Keyword(keyword) => matches!(
                keyword,
                Keyword::Map | Keyword::Chan | Keyword::Func | Keyword::Struct | Keyword::Interface
            ),
            TokenKind::Punct(p) => matches!(*p, "*" | "[" | "<-"),
            _ => false,
        }
    }

    // ---- types ------------------------------------------------------------

    fn parse_type(&mut self) -> Result<TypeExpr> {
        match &self.cur().kind {
            TokenKind::Ident(name) => {
                self.next();
                let ty = if self.at_punct(".") {
                    self.next();
                    TypeExpr::Qualified {
                        package: name.clone(),
                        name: self.expect_ident()?,
                    }
                } else {
                    TypeExpr::Name(name.clone())
                };
                // Type arguments of an instantiated generic type.
                if self.at_punct("[") {
                    self.skip_balanced("[", "]")?;
                }
                Ok(ty)
            }
            TokenKind::Punct("*") => {
                self.next();
                Ok(TypeExpr::Pointer(Box::new(self.parse_type()?)))
            }
            TokenKind::Punct("(") => {
                self.next();
                let ty = self.parse_type()?;
                self.expect_punct(")")?;
                Ok(ty)
            }
            TokenKind::Punct("[") => {
                self.next();
                if self.at_punct("]") {
                    self.next();
                    return Ok(TypeExpr::Slice(Box::new(self.parse_type()?)));
                }
                let len = if self.at_punct("...") {
                    self.next();
                    None
                } else {
                    Some(Box::new(self.parse_expr()?))
                };
                self.expect_punct("]")?;
                Ok(TypeExpr::Array {
                    len,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Keyword(Keyword::Map) => {
                self.next();
                self.expect_punct("[")?;
                let key = self.parse_type()?;
                self.expect_punct("]")?;
                Ok(TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Keyword(Keyword::Chan) => {
                self.next();
                if self.at_punct("<-") {
                    self.next();
                }
                Ok(TypeExpr::Chan(Box::new(self.parse_type()?)))
            }
            TokenKind::Punct("<-") => {
                self.next();
                self.expect_keyword(Keyword::Chan)?;
                Ok(TypeExpr::Chan(Box::new(self.parse_type()?)))
            }
            TokenKind::Keyword(Keyword::Func) => {
                self.next();
                self.parse_params()?;
                self.parse_results()?;
                Ok(TypeExpr::Func)
            }
            TokenKind::Keyword(Keyword::Struct) => self.parse_struct_type(),
            TokenKind::Keyword(Keyword::Interface) => {
                self.next();
                if !self.at_punct("{") {
                    return Err(self.unexpected("'{'"));
                }
                self.skip_balanced("{", "}")?;
                Ok(TypeExpr::Interface)
            }
            _ => Err(self.unexpected("type")),
        }
    }

    fn parse_struct_type(&mut self) -> Result<TypeExpr> {
        self.next();
        self.expect_punct("{")?;

        let mut fields = Vec::new();
        while !self.at_punct("}") && !self.at_eof() {
            if self.at_semi() {
                self.next();
                continue;
            }
            fields.push(self.parse_field_decl()?);
        }
        self.expect_punct("}")?;

        Ok(TypeExpr::Struct(fields))
    }

    fn parse_field_decl(&mut self) -> Result<Field> {
        let doc = self.lead_comment.take();

        let (names, ty) = match &self.cur().kind {
            TokenKind::Ident(name) => {
                let follower = self.peek(1);
                let embedded = follower.is_punct(".")
                    || follower.is_punct("}")
                    || matches!(
                        follower.kind,
                        TokenKind::Semi | TokenKind::Literal(LitKind::String, _)
                    );
                if embedded {
                    (Vec::new(), self.parse_type()?)
                } else {
                    self.next();
                    let mut names = vec![name.clone()];
                    while self.at_punct(",") {
                        self.next();
                        names.push(self.expect_ident()?);
                    }
                    (names, self.parse_type()?)
                }
            }
            TokenKind::Punct("*") => (Vec::new(), self.parse_type()?),
            _ => return Err(self.unexpected("field name or embedded type")),
        };

        let tag = match &self.cur().kind {
            TokenKind::Literal(LitKind::String, raw) => {
                self.next();
                Some(raw.clone())
            }
            _ => None,
        };

        self.expect_semi()?;
        let comment = self.line_comment.take();

        Ok(Field {
            doc,
            names,
            ty,
            tag,
            comment,
        })
    }

    // ---- expressions ------------------------------------------------------

    pub(crate) fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_binary_expr(1)
    }

    fn binary_op(&self) -> Option<(&'static str, u8)> {
        let TokenKind::Punct(op) = &self.cur().kind else {
            return None;
        };
        let prec = match *op {
            "||" => 1,
            "&&" => 2,
            "==" | "!=" | "<" | "<=" | ">" | ">=" => 3,
            "+" | "-" | "|" | "^" => 4,
            "*" | "/" | "%" | "<<" | ">>" | "&" | "&^" => 5,
            _ => return None,
        };
        Some((*op, prec))
    }

    fn parse_binary_expr(&mut self, min_prec: u8) -> Result<Expr> {
        let mut x = self.parse_unary_expr()?;
        while let Some((op, prec)) = self.binary_op() {
            if prec < min_prec {
                break;
            }
            self.next();
            let y = self.parse_binary_expr(prec + 1)?;
            x = Expr::Binary(op, Box::new(x), Box::new(y));
        }
        Ok(x)
    }

    fn parse_unary_expr(&mut self) -> Result<Expr> {
        if let TokenKind::Punct(op) = &self.cur().kind {
            if matches!(*op, "+" | "-" | "!" | "^" | "*" | "&" | "<-") {
                let op = *op;
                self.next();
                return Ok(Expr::Unary(op, Box::new(self.parse_unary_expr()?)));
            }
        }
        self.parse_primary_expr()
    }

    fn parse_operand(&mut self) -> Result<Expr> {
        match &self.cur().kind {
            TokenKind::Ident(name) => {
                self.next();
                Ok(Expr::Ident(name.clone()))
            }
            TokenKind::Literal(kind, raw) => {
                self.next();
                Ok(Expr::Literal(*kind, raw.clone()))
            }
            TokenKind::Punct("(") => {
                self.next();
                let inner = self.parse_expr()?;
                self.expect_punct(")")?;
                Ok(Expr::Paren(Box::new(inner)))
            }
            TokenKind::Punct("[")
            | TokenKind::Keyword(Keyword::Map | Keyword::Struct | Keyword::Chan | Keyword::Interface) => {
                Ok(Expr::Type(self.parse_type()?))
            }
            TokenKind::Keyword(Keyword::Func) => {
                let ty = self.parse_type()?;
                if self.at_punct("{") {
                    self.skip_balanced("{", "}")?;
                    Ok(Expr::Opaque)
                } else {
                    Ok(Expr::Type(ty))
                }
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_primary_expr(&mut self) -> Result<Expr> {
        let mut x = self.parse_operand()?;
        loop {
            if self.at_punct(".") {
                self.next();
                match &self.cur().kind {
                    TokenKind::Ident(name) => {
                        self.next();
                        x = Expr::Selector(Box::new(x), name.clone());
                    }
                    TokenKind::Punct("(") => {
                        self.skip_balanced("(", ")")?;
                        x = Expr::Opaque;
                    }
                    _ => return Err(self.unexpected("selector")),
                }
            } else if self.at_punct("(") {
                self.next();
                let mut args = Vec::new();
                while !self.at_punct(")") && !self.at_eof() {
                    args.push(self.parse_expr()?);
                    if self.at_punct("...") {
                        self.next();
                    }
                    if self.at_punct(",") {
                        self.next();
                    } else {
                        break;
                    }
                }
                self.expect_punct(")")?;
                x = Expr::Call(Box::new(x), args);
            } else if self.at_punct("[") {
                self.skip_balanced("[", "]")?;
                x = Expr::Opaque;
            } else if self.at_punct("{") && is_literal_type(&x) {
                let ty = x.as_type();
                x = Expr::Composite(self.parse_composite(ty)?);
            } else {
                return Ok(x);
            }
        }
    }

    fn parse_composite(&mut self, ty: Option<TypeExpr>) -> Result<CompositeLit> {
        self.expect_punct("{")?;

        let mut elements = Vec::new();
        loop {
            while self.at_semi() {
                self.next();
            }
            if self.at_punct("}") || self.at_eof() {
                break;
            }

            let first = self.parse_element_value()?;
            let element = if self.at_punct(":") {
                self.next();
                Element {
                    key: Some(first),
                    value: self.parse_element_value()?,
                }
            } else {
                Element {
                    key: None,
                    value: first,
                }
            };
            elements.push(element);

            if self.at_punct(",") {
                self.next();
            } else {
                while self.at_semi() {
                    self.next();
                }
                break;
            }
        }
        self.expect_punct("}")?;

        Ok(CompositeLit { ty, elements })
    }

    fn parse_element_value(&mut self) -> Result<Expr> {
        if self.at_punct("{") {
            Ok(Expr::Composite(self.parse_composite(None)?))
        } else {
            self.parse_expr()
        }
    }
}

fn unnamed_field(ty: TypeExpr) -> Field {
    Field {
        doc: None,
        names: Vec::new(),
        ty,
        tag: None,
        comment: None,
    }
}

fn is_literal_type(expr: &Expr) -> bool {
    match expr {
        Expr::Ident(_) => true,
        Expr::Selector(base, _) => matches!(base.as_ref(), Expr::Ident(_)),
        Expr::Type(ty) => matches!(
            ty,
            TypeExpr::Slice(_) | TypeExpr::Array { .. } | TypeExpr::Map { .. } | TypeExpr::Struct(_)
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::text_of;

    fn struct_fields(file: &File) -> &[Field] {
        for decl in &file.decls {
            if let Decl::Gen(gen_decl) = decl {
                for spec in &gen_decl.specs {
                    if let Spec::Type(TypeSpec {
                        ty: TypeExpr::Struct(fields),
                        ..
                    }) = spec
                    {
                        return fields;
                    }
                }
            }
        }
        panic!("no struct in file");
    }

    #[test]
    fn attaches_doc_and_line_comments_to_fields() {
        let source = r#"package demo

// Server holds listener settings.
type Server struct {
	// Host to bind.
	Host string `json:"host"` // Resolved at startup.

	Port int // TCP port.
	// Verbose logging.
	Verbose bool
}
"#;
        let file = parse_file(source).unwrap();
        let Decl::Gen(decl) = &file.decls[0] else {
            panic!("expected type decl");
        };
        assert_eq!(text_of(decl.doc.as_ref()), "Server holds listener settings.\n");

        let fields = struct_fields(&file);
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].names, vec!["Host"]);
        assert_eq!(text_of(fields[0].doc.as_ref()), "Host to bind.\n");
        assert_eq!(text_of(fields[0].comment.as_ref()), "Resolved at startup.\n");
        assert_eq!(fields[0].tag.as_deref(), Some("`json:\"host\"`"));
        assert!(fields[1].doc.is_none());
        assert_eq!(text_of(fields[1].comment.as_ref()), "TCP port.\n");
        assert_eq!(text_of(fields[2].doc.as_ref()), "Verbose logging.\n");
        assert!(fields[2].comment.is_none());
    }

    #[test]
    fn separated_comment_is_not_a_doc() {
        let source = "package demo\n\n// Detached.\n\ntype A struct{}\n";
        let file = parse_file(source).unwrap();
        let Decl::Gen(decl) = &file.decls[0] else {
            panic!("expected type decl");
        };
        assert!(decl.doc.is_none());
    }

    #[test]
    fn parses_embedded_fields() {
        let source = r#"package demo

type A struct {
	Base
	*other.Shared
	pkg.Thing `json:"thing"`
	List []string
	Lookup map[string]int
}
"#;
        let file = parse_file(source).unwrap();
        let fields = struct_fields(&file);
        assert!(fields[0].names.is_empty());
        assert_eq!(fields[0].ty, TypeExpr::Name("Base".into()));
        assert!(fields[1].names.is_empty());
        assert!(matches!(fields[1].ty, TypeExpr::Pointer(_)));
        assert!(fields[2].names.is_empty());
        assert!(fields[2].tag.is_some());
        assert!(matches!(fields[3].ty, TypeExpr::Slice(_)));
        assert!(matches!(fields[4].ty, TypeExpr::Map { .. }));
    }

    #[test]
    fn parses_const_groups_with_trailing_comments() {
        let source = r#"package demo

type Level int

const (
	// Debug doc.
	Debug Level = iota // Most verbose.
	Info              // Default.
	// Error doc.
	Error
)
"#;
        let file = parse_file(source).unwrap();
        let Decl::Gen(consts) = &file.decls[1] else {
            panic!("expected const decl");
        };
        assert_eq!(consts.keyword, DeclKeyword::Const);
        assert_eq!(consts.specs.len(), 3);

        let Spec::Value(debug) = &consts.specs[0] else {
            panic!("expected value spec");
        };
        assert_eq!(text_of(debug.doc.as_ref()), "Debug doc.\n");
        assert_eq!(text_of(debug.comment.as_ref()), "Most verbose.\n");
        assert_eq!(debug.ty, Some(TypeExpr::Name("Level".into())));

        let Spec::Value(info) = &consts.specs[1] else {
            panic!("expected value spec");
        };
        assert!(info.doc.is_none());
        assert!(info.values.is_empty());
        assert_eq!(text_of(info.comment.as_ref()), "Default.\n");

        let Spec::Value(error) = &consts.specs[2] else {
            panic!("expected value spec");
        };
        assert_eq!(text_of(error.doc.as_ref()), "Error doc.\n");
    }

    #[test]
    fn parses_functions_and_finds_literals() {
        let source = r#"package demo

import (
	"fmt"
	net "example.com/demo/network"
)

// ServerDefaults returns defaults.
func ServerDefaults() *Server {
	if debug {
		fmt.Println("x")
	}
	return &Server{
		Host:  "localhost",
		Ports: []int{80, 443},
		State: net.Online,
	}
}

func (s *Server) Addr() (host string, port int) { return s.Host, 0 }
"#;
        let file = parse_file(source).unwrap();
        assert_eq!(file.imports.len(), 2);
        assert_eq!(file.imports[1].name.as_deref(), Some("net"));
        assert_eq!(file.imports[1].path, "example.com/demo/network");

        let funcs: Vec<&FuncDecl> = file.functions().collect();
        assert_eq!(funcs.len(), 2);
        assert_eq!(funcs[0].name, "ServerDefaults");
        assert!(funcs[0].recv.is_none());
        assert_eq!(funcs[0].result_count(), 1);
        assert_eq!(
            funcs[0].results[0].ty,
            TypeExpr::Pointer(Box::new(TypeExpr::Name("Server".into())))
        );
        assert!(funcs[1].recv.is_some());
        assert_eq!(funcs[1].result_count(), 2);

        let lit = funcs[0].find_composite_literal("Server").unwrap().unwrap();
        assert_eq!(lit.ty, Some(TypeExpr::Name("Server".into())));
        assert_eq!(lit.elements.len(), 3);
        assert_eq!(lit.elements[0].key, Some(Expr::Ident("Host".into())));
        assert!(matches!(lit.elements[1].value, Expr::Composite(_)));
        assert_eq!(
            lit.elements[2].value,
            Expr::Selector(Box::new(Expr::Ident("net".into())), "Online".into())
        );
    }

    #[test]
    fn binary_precedence() {
        let expr = parse_expr("1 + 2 * 3").unwrap();
        let Expr::Binary("+", _, rhs) = expr else {
            panic!("expected addition at the root");
        };
        assert!(matches!(*rhs, Expr::Binary("*", _, _)));
    }

    #[test]
    fn elided_literal_elements() {
        let expr = parse_expr("[]Point{{X: 1}, {X: 2}}").unwrap();
        let Expr::Composite(lit) = expr else {
            panic!("expected composite literal");
        };
        assert_eq!(lit.elements.len(), 2);
        assert!(matches!(&lit.elements[0].value, Expr::Composite(inner) if inner.ty.is_none()));
    }

    #[test]
    fn generic_type_declarations_are_flagged() {
        let source = "package demo\n\ntype List[T any] struct {\n\tItems []T\n}\n\ntype Buf [N]byte\n";
        let file = parse_file(source).unwrap();
        let Decl::Gen(list) = &file.decls[0] else {
            panic!("expected type decl");
        };
        let Spec::Type(list) = &list.specs[0] else {
            panic!("expected type spec");
        };
        assert!(list.generic);

        let Decl::Gen(buf) = &file.decls[1] else {
            panic!("expected type decl");
        };
        let Spec::Type(buf) = &buf.specs[0] else {
            panic!("expected type spec");
        };
        assert!(!buf.generic);
        assert!(matches!(buf.ty, TypeExpr::Array { .. }));
    }

    #[test]
    fn reports_line_of_syntax_error() {
        let err = parse_file("package demo\n\ntype A struct {\n\t1 int\n}\n").unwrap_err();
        assert_eq!(err.line, 4);
    }
}
