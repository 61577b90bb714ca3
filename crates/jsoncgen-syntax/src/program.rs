//! Filesystem-backed [`SourceProvider`].

use std::cell::{OnceCell, RefCell};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::{One, ToPrimitive};
use tracing::{debug, trace};

use crate::ast::{DeclKeyword, Expr, Spec, TypeExpr};
use crate::constant::Constant;
use crate::error::{Result, SourceError};
use crate::loader::{self, Module};
use crate::package::{ConstRef, Origin, Package, SourceFile, SpecRef};
use crate::provider::{ConstDecl, SourceProvider, TypedConstant};
use crate::toolchain::GoEnv;
use crate::types::{BasicKind, GoType};

/// Longest chain of named types followed when computing an underlying type.
const MAX_TYPE_CHAIN: usize = 64;

/// Go sources read from disk.
///
/// Packages are parsed lazily and cached by directory and by import path;
/// constants are folded on first use and memoized.
///
/// Import paths resolve against the modules seen so far, then the standard
/// library under `$GOROOT/src`, then the `require`d modules through `vendor/`
/// or the module cache. A package whose source cannot be found, or that fails
/// to load and is not part of the caller's own modules, stays opaque: its
/// types are named but never expanded.
#[derive(Debug, Default)]
pub struct GoProgram {
    env: OnceCell<GoEnv>,
    modules: RefCell<Vec<(Rc<Module>, Origin)>>,
    by_dir: RefCell<HashMap<PathBuf, Rc<Package>>>,
    by_path: RefCell<HashMap<String, Rc<Package>>>,
    opaque: RefCell<HashSet<String>>,
    constants: RefCell<HashMap<(String, String), TypedConstant>>,
    evaluating: RefCell<HashSet<(String, String)>>,
}

/// The package an import qualifier refers to.
struct ImportTarget {
    path: String,
    package: Option<Rc<Package>>,
}

impl GoProgram {
    /// A program using the Go environment of this process, detected on
    /// first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// A program reading the standard library and dependencies from `env`.
    pub fn with_env(env: GoEnv) -> Self {
        Self {
            env: OnceCell::from(env),
            ..Self::default()
        }
    }

    pub fn env(&self) -> &GoEnv {
        self.env.get_or_init(GoEnv::detect)
    }

    /// The innermost module containing `dir`. A newly found module keeps
    /// `origin` unless it is the standard library.
    fn module_for(&self, dir: &Path, origin: Origin) -> Result<Option<(Rc<Module>, Origin)>> {
        let known = self
            .modules
            .borrow()
            .iter()
            .filter(|(module, _)| dir.starts_with(&module.root))
            .max_by_key(|(module, _)| module.root.components().count())
            .cloned();
        if known.is_some() {
            return Ok(known);
        }

        let module = match Module::find(dir)? {
            Some(module) => module,
            None => match self.env().std_src().filter(|src| dir.starts_with(src)) {
                Some(src) => Module::standard(src),
                None => return Ok(None),
            },
        };
        let origin = if module.is_standard() { Origin::Standard } else { origin };
        debug!(module = %module.path, root = %module.root.display(), ?origin, "found module");
        let found = (Rc::new(module), origin);
        self.modules.borrow_mut().push(found.clone());
        Ok(Some(found))
    }

    /// Directory holding the sources of `import_path`.
    fn locate(&self, import_path: &str) -> Option<(PathBuf, Origin)> {
        let modules = self.modules.borrow().clone();
        let known = modules.iter().find_map(|(module, origin)| {
            let dir = module.dir_for(import_path).filter(|dir| dir.is_dir())?;
            Some((dir, *origin))
        });
        if known.is_some() {
            return known;
        }

        if loader::is_standard_path(import_path) {
            let src = self.env().std_src()?;
            let dir = Module::standard(src).dir_for(import_path)?;
            return dir.is_dir().then_some((dir, Origin::Standard));
        }

        let mod_cache = self.env().mod_cache.as_deref();
        modules.iter().find_map(|(module, _)| {
            let dir = module.dependency_dir(import_path, mod_cache).filter(|dir| dir.is_dir())?;
            Some((dir, Origin::Dependency))
        })
    }

    /// Parse the packages of `dir`. `requested` is the import path the
    /// directory was found under, if any.
    fn load(&self, dir: &Path, requested: Option<&str>, origin: Origin) -> Result<Vec<Rc<Package>>> {
        let dir = dir.canonicalize().map_err(|e| SourceError::io(dir, e))?;
        if let Some(pkg) = self.by_dir.borrow().get(&dir) {
            return Ok(vec![Rc::clone(pkg)]);
        }

        let module = self.module_for(&dir, origin)?;
        let (import_path, origin) = match (requested, &module) {
            (Some(path), _) => (Some(path.to_string()), origin),
            (None, Some((module, found))) => (module.import_path(&dir), *found),
            (None, None) => (None, origin),
        };

        let mut groups: Vec<(String, Vec<SourceFile>)> = Vec::new();
        for file in loader::read_package_files(&dir, &self.env().build)? {
            match groups.iter_mut().find(|(name, _)| *name == file.ast.package) {
                Some((_, files)) => files.push(file),
                None => groups.push((file.ast.package.clone(), vec![file])),
            }
        }

        let packages: Vec<Rc<Package>> = groups
            .into_iter()
            .map(|(name, files)| {
                let path = import_path.clone().unwrap_or_else(|| name.clone());
                Rc::new(Package::new(name, path, dir.clone(), files).with_origin(origin))
            })
            .collect();

        if let [pkg] = packages.as_slice() {
            debug!(package = %pkg.path, files = pkg.files.len(), ?origin, "loaded package");
            self.cache(pkg);
        }
        Ok(packages)
    }

    /// Resolve the import whose local name is `local` in `file` of `pkg`.
    fn import(&self, pkg: &Package, file: usize, local: &str) -> Result<ImportTarget> {
        let imports = pkg.files.get(file).map(|f| f.ast.imports.as_slice()).unwrap_or_default();

        for import in imports {
            let name = match import.name.as_deref() {
                Some("_" | ".") => continue,
                Some(alias) => alias.to_string(),
                None => match self.package(&import.path)? {
                    Some(package) => package.name.clone(),
                    None => loader::guess_package_name(&import.path),
                },
            };
            if name == local {
                return Ok(ImportTarget {
                    path: import.path.clone(),
                    package: self.package(&import.path)?,
                });
            }
        }
        Err(SourceError::UnknownPackage(local.to_string()))
    }

    fn resolve_name(&self, pkg: &Package, name: &str) -> Result<GoType> {
        if let Some((file, spec)) = pkg.type_spec(name) {
            if spec.alias {
                return self.resolve_type(pkg, file, &spec.ty);
            }
            return Ok(GoType::named(pkg.path.clone(), name));
        }
        if let Some(kind) = BasicKind::from_name(name) {
            return Ok(GoType::Basic(kind));
        }
        match name {
            "error" | "any" | "comparable" => Ok(GoType::Interface),
            _ => Err(SourceError::UnknownType(name.to_string())),
        }
    }

    /// Value of the package-level constant `name`, memoized.
    fn constant(&self, pkg: &Package, name: &str) -> Result<TypedConstant> {
        let key = (pkg.path.clone(), name.to_string());
        if let Some(found) = self.constants.borrow().get(&key) {
            return Ok(found.clone());
        }
        let Some(at) = pkg.const_ref(name) else {
            return Err(SourceError::not_constant(name));
        };

        if !self.evaluating.borrow_mut().insert(key.clone()) {
            return Err(SourceError::ConstantCycle(name.to_string()));
        }
        let result = self.evaluate_declared(pkg, at, name);
        self.evaluating.borrow_mut().remove(&key);

        let value = result?;
        trace!(package = %pkg.path, name, value = %value.value, "folded constant");
        self.constants.borrow_mut().insert(key, value.clone());
        Ok(value)
    }

    fn evaluate_declared(&self, pkg: &Package, at: ConstRef, name: &str) -> Result<TypedConstant> {
        let source = pkg
            .value_spec(SpecRef {
                spec: at.source,
                ..at.spec
            })
            .ok_or_else(|| SourceError::not_constant(name))?;
        let expr = source
            .values
            .get(at.name_index)
            .ok_or_else(|| SourceError::not_constant(format!("{name} (missing initializer)")))?;

        let evaluator = Evaluator {
            program: self,
            pkg,
            file: at.spec.file,
            iota: Some(at.iota),
        };
        let value = evaluator.eval(expr)?;

        match &source.ty {
            Some(ty) => {
                let ty = self.resolve_type(pkg, at.spec.file, ty)?;
                self.convert(&value.value, ty)
            }
            None => Ok(value),
        }
    }

    /// Convert a constant to `ty`, checking that its underlying kind can hold
    /// the value. Named types from unloadable packages accept any value.
    fn convert(&self, value: &Constant, ty: GoType) -> Result<TypedConstant> {
        let converted = match self.underlying(&ty)? {
            Some(GoType::Basic(kind)) => value.represent(kind),
            None => Some(value.clone()),
            Some(_) => None,
        };
        match converted {
            Some(value) => Ok(TypedConstant {
                value,
                ty: Some(ty),
            }),
            None => Err(SourceError::invalid_operation(format!(
                "cannot convert {value} to {ty}"
            ))),
        }
    }

    fn basic_kind(&self, ty: Option<&GoType>) -> Result<Option<BasicKind>> {
        match ty {
            Some(ty) => Ok(self.underlying(ty)?.and_then(|ty| ty.as_basic())),
            None => Ok(None),
        }
    }

    fn cache(&self, pkg: &Rc<Package>) {
        self.by_dir.borrow_mut().insert(pkg.dir.clone(), Rc::clone(pkg));
        self.by_path.borrow_mut().insert(pkg.path.clone(), Rc::clone(pkg));
    }
}

impl SourceProvider for GoProgram {
    fn load_dir(&self, dir: &Path) -> Result<Vec<Rc<Package>>> {
        self.load(dir, None, Origin::Local)
    }

    fn package(&self, path: &str) -> Result<Option<Rc<Package>>> {
        if let Some(pkg) = self.by_path.borrow().get(path) {
            return Ok(Some(Rc::clone(pkg)));
        }
        if self.opaque.borrow().contains(path) {
            return Ok(None);
        }

        let Some((dir, origin)) = self.locate(path) else {
            trace!(path, "package source not found");
            return Ok(None);
        };

        let loaded = self.load(&dir, Some(path), origin).and_then(|mut packages| {
            match packages.len() {
                0 | 1 => Ok(packages.pop()),
                count => Err(SourceError::AmbiguousPackage { dir, count }),
            }
        });
        match loaded {
            Err(error) if origin != Origin::Local => {
                debug!(path, %error, "keeping unloadable package opaque");
                self.opaque.borrow_mut().insert(path.to_string());
                Ok(None)
            }
            loaded => loaded,
        }
    }

    fn resolve_type(&self, pkg: &Package, file: usize, expr: &TypeExpr) -> Result<GoType> {
        let ty = match expr {
            TypeExpr::Name(name) => return self.resolve_name(pkg, name),
            TypeExpr::Qualified { package, name } => {
                let target = self.import(pkg, file, package)?;
                match target.package {
                    Some(dep) => return self.resolve_name(&dep, name),
                    None => GoType::named(target.path, name.clone()),
                }
            }
            TypeExpr::Pointer(inner) => GoType::Pointer(Box::new(self.resolve_type(pkg, file, inner)?)),
            TypeExpr::Slice(elem) => GoType::Slice(Box::new(self.resolve_type(pkg, file, elem)?)),
            TypeExpr::Array { len, elem } => {
                let len = match len {
                    Some(len) => self
                        .eval_const(pkg, file, len)
                        .ok()
                        .and_then(|len| len.value.to_int())
                        .and_then(|len| len.to_u64()),
                    None => None,
                };
                GoType::Array(len, Box::new(self.resolve_type(pkg, file, elem)?))
            }
            TypeExpr::Map { key, value } => GoType::Map(
                Box::new(self.resolve_type(pkg, file, key)?),
                Box::new(self.resolve_type(pkg, file, value)?),
            ),
            TypeExpr::Struct(_) => GoType::Struct,
            TypeExpr::Interface => GoType::Interface,
            TypeExpr::Func => GoType::Func,
            TypeExpr::Chan(elem) => GoType::Chan(Box::new(self.resolve_type(pkg, file, elem)?)),
        };
        Ok(ty)
    }

    fn underlying(&self, ty: &GoType) -> Result<Option<GoType>> {
        let mut current = ty.clone();
        for _ in 0..MAX_TYPE_CHAIN {
            let GoType::Named(named) = &current else {
                return Ok(Some(current));
            };
            let Some(pkg) = self.package(&named.package)? else {
                return Ok(None);
            };
            let Some((file, spec)) = pkg.type_spec(&named.name) else {
                return Ok(None);
            };
            current = self.resolve_type(&pkg, file, &spec.ty)?;
        }
        Err(SourceError::UnknownType(format!(
            "{} (type definition chain too long)",
            ty.qualified_name()
        )))
    }

    fn eval_const(&self, pkg: &Package, file: usize, expr: &Expr) -> Result<TypedConstant> {
        Evaluator {
            program: self,
            pkg,
            file,
            iota: None,
        }
        .eval(expr)
    }

    fn file_constants(&self, pkg: &Package, file: usize) -> Result<Vec<ConstDecl>> {
        let Some(source) = pkg.files.get(file) else {
            return Ok(Vec::new());
        };

        let mut found = Vec::new();
        for (_, decl) in source.ast.gen_decls(DeclKeyword::Const) {
            let mut explicitly_typed = false;
            for spec in &decl.specs {
                let Spec::Value(spec) = spec else {
                    continue;
                };
                if !spec.values.is_empty() {
                    explicitly_typed = spec.ty.is_some();
                }
                for name in spec.names.iter().filter(|name| *name != "_") {
                    match self.constant(pkg, name) {
                        Ok(value) => found.push(ConstDecl {
                            name: name.clone(),
                            doc: spec.doc.clone(),
                            comment: spec.comment.clone(),
                            value,
                        }),
                        Err(error) if !explicitly_typed => {
                            debug!(package = %pkg.path, name = %name, %error, "skipping constant");
                        }
                        Err(error) => return Err(error),
                    }
                }
            }
        }
        Ok(found)
    }
}

/// Constant folding within one file; `iota` is set inside const specs.
struct Evaluator<'a> {
    program: &'a GoProgram,
    pkg: &'a Package,
    file: usize,
    iota: Option<usize>,
}

impl Evaluator<'_> {
    fn eval(&self, expr: &Expr) -> Result<TypedConstant> {
        match expr {
            Expr::Literal(kind, raw) => Ok(TypedConstant::untyped(Constant::from_literal(*kind, raw)?)),
            Expr::Paren(inner) => self.eval(inner),
            Expr::Ident(name) => self.ident(name),
            Expr::Selector(base, name) => {
                let Expr::Ident(qualifier) = base.as_ref() else {
                    return Err(SourceError::not_constant(expr.to_source()));
                };
                match self.program.import(self.pkg, self.file, qualifier)?.package {
                    Some(dep) => self.program.constant(&dep, name),
                    None => Err(SourceError::not_constant(expr.to_source())),
                }
            }
            Expr::Unary(op, operand) => {
                let x = self.eval(operand)?;
                let mut value = Constant::unary(op, &x.value)?;
                if *op == "^" {
                    if let Some(kind) = self.program.basic_kind(x.ty.as_ref())? {
                        value = mask_unsigned(value, kind);
                    }
                }
                Ok(TypedConstant { value, ty: x.ty })
            }
            Expr::Binary(op, lhs, rhs) => {
                let x = self.eval(lhs)?;
                let y = self.eval(rhs)?;
                let value = Constant::binary(op, &x.value, &y.value)?;
                if matches!(*op, "==" | "!=" | "<" | "<=" | ">" | ">=") {
                    return Ok(TypedConstant::untyped(value));
                }
                let ty = if matches!(*op, "<<" | ">>") { x.ty } else { x.ty.or(y.ty) };
                match ty {
                    Some(ty) => self.program.convert(&value, ty),
                    None => Ok(TypedConstant::untyped(value)),
                }
            }
            Expr::Call(fun, args) => self.call(expr, fun, args),
            Expr::Composite(_) | Expr::Type(_) | Expr::Opaque => {
                Err(SourceError::not_constant(expr.to_source()))
            }
        }
    }

    fn ident(&self, name: &str) -> Result<TypedConstant> {
        if self.pkg.const_ref(name).is_some() {
            return self.program.constant(self.pkg, name);
        }
        match name {
            "iota" => self
                .iota
                .map(|iota| TypedConstant::untyped(Constant::int(iota as i64)))
                .ok_or_else(|| SourceError::not_constant("iota outside a constant declaration")),
            "true" => Ok(TypedConstant::untyped(Constant::Bool(true))),
            "false" => Ok(TypedConstant::untyped(Constant::Bool(false))),
            _ => Err(SourceError::not_constant(name)),
        }
    }

    /// `len` of a constant string, or a conversion `T(x)`.
    fn call(&self, expr: &Expr, fun: &Expr, args: &[Expr]) -> Result<TypedConstant> {
        let [arg] = args else {
            return Err(SourceError::not_constant(expr.to_source()));
        };

        let is_builtin_len = matches!(fun, Expr::Ident(name) if name == "len")
            && self.pkg.type_spec("len").is_none();
        if is_builtin_len {
            return match self.eval(arg)?.value {
                Constant::String(s) => Ok(TypedConstant::untyped(Constant::int(s.len() as i64))),
                _ => Err(SourceError::not_constant(expr.to_source())),
            };
        }

        let Some(ty) = fun.as_type() else {
            return Err(SourceError::not_constant(expr.to_source()));
        };
        let Ok(ty) = self.program.resolve_type(self.pkg, self.file, &ty) else {
            return Err(SourceError::not_constant(expr.to_source()));
        };
        let value = self.eval(arg)?;
        self.program.convert(&value.value, ty)
    }
}

/// Keep `^x` of an unsigned type within the type's width.
fn mask_unsigned(value: Constant, kind: BasicKind) -> Constant {
    match (value, kind.bits()) {
        (Constant::Int(n), Some(bits)) if kind.is_unsigned() => {
            let mask: BigInt = (BigInt::one() << bits) - 1;
            Constant::Int(n & mask)
        }
        (value, _) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_unsigned_complement() {
        let value = Constant::unary("^", &Constant::int(0)).unwrap();
        assert_eq!(mask_unsigned(value.clone(), BasicKind::Uint8), Constant::int(255));
        assert_eq!(mask_unsigned(value, BasicKind::Int8), Constant::int(-1));
    }
}
