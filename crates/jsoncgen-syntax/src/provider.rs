//! The seam between source loading and JSONC generation.

use std::path::Path;
use std::rc::Rc;

use crate::ast::{Expr, TypeExpr};
use crate::comment::CommentGroup;
use crate::constant::Constant;
use crate::error::Result;
use crate::package::Package;
use crate::types::GoType;

/// A constant value together with its type; `ty` is `None` for untyped
/// constants.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedConstant {
    pub value: Constant,
    pub ty: Option<GoType>,
}

impl TypedConstant {
    pub fn untyped(value: Constant) -> Self {
        Self { value, ty: None }
    }
}

/// A package-level constant as declared in one file.
#[derive(Debug, Clone)]
pub struct ConstDecl {
    pub name: String,
    pub doc: Option<CommentGroup>,
    pub comment: Option<CommentGroup>,
    pub value: TypedConstant,
}

/// Loads packages and answers type and constant questions about them.
///
/// Generation only talks to sources through this trait, so it can be backed
/// by the bundled loader ([`GoProgram`](crate::GoProgram)) or by anything
/// else able to resolve Go declarations.
pub trait SourceProvider {
    /// Parse the packages whose files live directly in `dir`.
    fn load_dir(&self, dir: &Path) -> Result<Vec<Rc<Package>>>;

    /// Load a package by import path, `None` when it is not available.
    fn package(&self, path: &str) -> Result<Option<Rc<Package>>>;

    /// Resolve a type expression written in `file` of `pkg`.
    fn resolve_type(&self, pkg: &Package, file: usize, expr: &TypeExpr) -> Result<GoType>;

    /// Underlying type with named types expanded; `None` when the named type
    /// comes from a package that cannot be loaded.
    fn underlying(&self, ty: &GoType) -> Result<Option<GoType>>;

    /// Fold a constant expression written in `file` of `pkg`.
    fn eval_const(&self, pkg: &Package, file: usize, expr: &Expr) -> Result<TypedConstant>;

    /// Every package-level constant declared in `file` of `pkg`, in source
    /// order.
    fn file_constants(&self, pkg: &Package, file: usize) -> Result<Vec<ConstDecl>>;
}
