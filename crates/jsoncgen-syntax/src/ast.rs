//! Syntax tree for the declaration level of Go source files.
//!
//! Function bodies are not parsed into statements; they are kept as token
//! streams and searched on demand (see [`FuncDecl::find_composite_literal`]).

use crate::comment::CommentGroup;
use crate::parser::Parser;
use crate::token::{LitKind, Token, TokenKind};

#[derive(Debug, Clone)]
pub struct File {
    pub package: String,
    pub doc: Option<CommentGroup>,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
}

impl File {
    /// Generic declarations of the given kind, with their index in `decls`.
    pub fn gen_decls(&self, keyword: DeclKeyword) -> impl Iterator<Item = (usize, &GenDecl)> {
        self.decls
            .iter()
            .enumerate()
            .filter_map(move |(idx, decl)| match decl {
                Decl::Gen(gen_decl) if gen_decl.keyword == keyword => Some((idx, gen_decl)),
                _ => None,
            })
    }

    pub fn functions(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Func(func) => Some(func),
            Decl::Gen(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Local name (`alias "path"`), including `_` and `.`.
    pub name: Option<String>,
    pub path: String,
}

#[derive(Debug, Clone)]
pub enum Decl {
    Gen(GenDecl),
    Func(FuncDecl),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKeyword {
    Import,
    Const,
    Var,
    Type,
}

/// `const`, `var`, `type` or `import` declaration, grouped or not.
#[derive(Debug, Clone)]
pub struct GenDecl {
    pub keyword: DeclKeyword,
    pub doc: Option<CommentGroup>,
    pub specs: Vec<Spec>,
}

#[derive(Debug, Clone)]
pub enum Spec {
    Import(ImportSpec),
    Type(TypeSpec),
    Value(ValueSpec),
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub doc: Option<CommentGroup>,
    pub name: String,
    /// Declared with type parameters.
    pub generic: bool,
    /// `type A = B`
    pub alias: bool,
    pub ty: TypeExpr,
    pub comment: Option<CommentGroup>,
}

#[derive(Debug, Clone)]
pub struct ValueSpec {
    pub doc: Option<CommentGroup>,
    pub names: Vec<String>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
    pub comment: Option<CommentGroup>,
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub doc: Option<CommentGroup>,
    pub recv: Option<Vec<Field>>,
    pub name: String,
    pub params: Vec<Field>,
    pub results: Vec<Field>,
    /// Body tokens from `{` to the matching `}`, terminated by EOF.
    pub body: Option<Vec<Token>>,
}

impl FuncDecl {
    /// Number of results, counting every name of a grouped result.
    pub fn result_count(&self) -> usize {
        self.results.iter().map(|field| field.names.len().max(1)).sum()
    }

    /// The first composite literal in the body whose type is the bare
    /// identifier `type_name`, in source order.
    pub fn find_composite_literal(
        &self,
        type_name: &str,
    ) -> Result<Option<CompositeLit>, crate::error::ParseError> {
        let Some(body) = &self.body else {
            return Ok(None);
        };

        for (idx, window) in body.windows(2).enumerate() {
            let is_type = matches!(&window[0].kind, TokenKind::Ident(name) if name == type_name);
            let qualified = idx > 0 && body[idx - 1].is_punct(".");
            if is_type && !qualified && window[1].is_punct("{") {
                let mut parser = Parser::new(&body[idx..]);
                if let Expr::Composite(lit) = parser.parse_expr()? {
                    return Ok(Some(lit));
                }
            }
        }
        Ok(None)
    }
}

/// Struct field, function parameter or result.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub doc: Option<CommentGroup>,
    /// Empty for embedded fields and unnamed parameters.
    pub names: Vec<String>,
    pub ty: TypeExpr,
    /// Raw tag literal, quotes included.
    pub tag: Option<String>,
    pub comment: Option<CommentGroup>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Name(String),
    Qualified { package: String, name: String },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    /// `[N]T`; `len` is `None` for `[...]T`.
    Array { len: Option<Box<Expr>>, elem: Box<TypeExpr> },
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    Struct(Vec<Field>),
    Interface,
    Func,
    Chan(Box<TypeExpr>),
}

impl TypeExpr {
    /// Render the expression back to Go syntax.
    pub fn to_source(&self) -> String {
        match self {
            TypeExpr::Name(name) => name.clone(),
            TypeExpr::Qualified { package, name } => format!("{package}.{name}"),
            TypeExpr::Pointer(inner) => format!("*{}", inner.to_source()),
            TypeExpr::Slice(elem) => format!("[]{}", elem.to_source()),
            TypeExpr::Array { len: Some(_), elem } => format!("[N]{}", elem.to_source()),
            TypeExpr::Array { len: None, elem } => format!("[...]{}", elem.to_source()),
            TypeExpr::Map { key, value } => {
                format!("map[{}]{}", key.to_source(), value.to_source())
            }
            TypeExpr::Struct(_) => "struct{...}".to_string(),
            TypeExpr::Interface => "interface{...}".to_string(),
            TypeExpr::Func => "func(...)".to_string(),
            TypeExpr::Chan(elem) => format!("chan {}", elem.to_source()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    Literal(LitKind, String),
    Selector(Box<Expr>, String),
    Composite(CompositeLit),
    Unary(&'static str, Box<Expr>),
    Binary(&'static str, Box<Expr>, Box<Expr>),
    Paren(Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    /// A type in expression position, e.g. the callee of `[]byte(s)`.
    Type(TypeExpr),
    /// Function literals, index expressions and type assertions.
    Opaque,
}

impl Expr {
    /// Interpret the expression as a type name, if it has that shape.
    pub fn as_type(&self) -> Option<TypeExpr> {
        match self {
            Expr::Ident(name) => Some(TypeExpr::Name(name.clone())),
            Expr::Selector(base, name) => match base.as_ref() {
                Expr::Ident(package) => Some(TypeExpr::Qualified {
                    package: package.clone(),
                    name: name.clone(),
                }),
                _ => None,
            },
            Expr::Type(ty) => Some(ty.clone()),
            Expr::Paren(inner) => inner.as_type(),
            Expr::Unary("*", inner) => inner.as_type().map(|ty| TypeExpr::Pointer(Box::new(ty))),
            _ => None,
        }
    }

    /// Short human readable form for diagnostics.
    pub fn to_source(&self) -> String {
        match self {
            Expr::Ident(name) => name.clone(),
            Expr::Literal(_, raw) => raw.clone(),
            Expr::Selector(base, name) => format!("{}.{name}", base.to_source()),
            Expr::Composite(lit) => match &lit.ty {
                Some(ty) => format!("{}{{...}}", ty.to_source()),
                None => "{...}".to_string(),
            },
            Expr::Unary(op, inner) => format!("{op}{}", inner.to_source()),
            Expr::Binary(op, x, y) => format!("{} {op} {}", x.to_source(), y.to_source()),
            Expr::Paren(inner) => format!("({})", inner.to_source()),
            Expr::Call(fun, args) => {
                let args: Vec<String> = args.iter().map(Expr::to_source).collect();
                format!("{}({})", fun.to_source(), args.join(", "))
            }
            Expr::Type(ty) => ty.to_source(),
            Expr::Opaque => "<expr>".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeLit {
    /// `None` when the type is elided inside an outer literal.
    pub ty: Option<TypeExpr>,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub key: Option<Expr>,
    pub value: Expr,
}
