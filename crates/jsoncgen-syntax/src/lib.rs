//! Go declaration loading for jsoncgen
//!
//! This crate reads just enough Go to describe configuration structs: package
//! clauses, imports, type and constant declarations, and the bodies of
//! functions (kept as tokens until a composite literal is needed).
//!
//! # Features
//!
//! - **Comment-aware parsing** - Lead and line comments attach to specs and
//!   fields the way the Go toolchain attaches them
//! - **Exact constant folding** - Arbitrary precision integers and rationals,
//!   `iota`, implicit repetition, conversions and cross-package references
//! - **Module-aware loading** - Import paths resolve through the enclosing
//!   `go.mod` module, `$GOROOT/src`, `vendor/` and the module cache; build
//!   constraints select the files of the host platform
//! - **Pluggable** - Generation only depends on the [`SourceProvider`] trait
//!
//! # Examples
//!
//! ## Parsing a file
//!
//! ```rust
//! use jsoncgen_syntax::{Decl, Spec, parse_file};
//!
//! let file = parse_file("package demo\n\nconst Answer = 6 * 7\n")?;
//! assert_eq!(file.package, "demo");
//!
//! let Decl::Gen(decl) = &file.decls[0] else { unreachable!() };
//! let Spec::Value(spec) = &decl.specs[0] else { unreachable!() };
//! assert_eq!(spec.names, vec!["Answer".to_string()]);
//! assert_eq!(spec.values[0].to_source(), "6 * 7");
//! # Ok::<(), jsoncgen_syntax::ParseError>(())
//! ```
//!
//! ## Loading a package
//!
//! ```rust,no_run
//! use jsoncgen_syntax::{GoProgram, SourceProvider};
//! use std::path::Path;
//!
//! let program = GoProgram::new();
//! let packages = program.load_dir(Path::new("./config"))?;
//! for pkg in &packages {
//!     println!("{} ({} files)", pkg.path, pkg.files.len());
//! }
//! # Ok::<(), jsoncgen_syntax::SourceError>(())
//! ```

mod ast;
mod comment;
mod constant;
mod constraint;
mod error;
mod lexer;
mod loader;
mod package;
mod parser;
mod program;
mod provider;
mod token;
mod toolchain;
mod types;

pub use ast::{
    CompositeLit, Decl, DeclKeyword, Element, Expr, Field, File, FuncDecl, GenDecl, ImportSpec,
    Spec, TypeExpr, TypeSpec, ValueSpec,
};
pub use comment::{CommentGroup, text_of};
pub use constant::{Constant, unquote};
pub use constraint::BuildContext;
pub use error::{ParseError, Result, SourceError};
pub use lexer::tokenize;
pub use loader::{Module, ReplaceTarget, Replacement, Requirement, escape_module_path, module_path};
pub use package::{ConstRef, Origin, Package, SourceFile, SpecRef};
pub use parser::{parse_expr, parse_file};
pub use program::GoProgram;
pub use provider::{ConstDecl, SourceProvider, TypedConstant};
pub use token::{Keyword, LitKind, Token, TokenKind};
pub use toolchain::GoEnv;
pub use types::{BasicKind, GoType, NamedType};
