//! Extraction across a package and the packages its structs refer to.

use std::collections::hash_map::Entry;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use indexmap::IndexMap;
use jsoncgen_syntax::{ConstDecl, GoType, Package, SourceProvider, TypeExpr};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::error::{GenerateError, Result};
use crate::extract::parse_defaults;
use crate::model::{ConstantInfo, PackageModel, StructInfo};

/// Package models of one generation run, keyed by import path.
///
/// A registry is meant to live for a single run: nothing is invalidated, so
/// a long-lived caller should build a new one per request.
pub struct Registry<'p> {
    provider: &'p dyn SourceProvider,
    packages: IndexMap<String, PackageModel>,
    in_progress: FxHashSet<String>,
}

impl<'p> Registry<'p> {
    pub fn new(provider: &'p dyn SourceProvider) -> Self {
        Self {
            provider,
            packages: IndexMap::new(),
            in_progress: FxHashSet::default(),
        }
    }

    /// Extract the package in `dir` and, transitively, the packages of the
    /// types its struct fields mention. With a `target`, the defaults of
    /// that struct are parsed too.
    ///
    /// The model is registered only when everything succeeded.
    pub fn extract(&mut self, dir: &Path, target: Option<&str>) -> Result<&PackageModel> {
        let metadata = fs::metadata(dir).map_err(|error| GenerateError::Io {
            path: dir.to_path_buf(),
            error,
        })?;
        if !metadata.is_dir() {
            return Err(GenerateError::NotADirectory {
                path: dir.to_path_buf(),
            });
        }

        let mut packages = self.provider.load_dir(dir)?;
        if packages.len() != 1 {
            return Err(GenerateError::AmbiguousPackage {
                dir: dir.to_path_buf(),
                count: packages.len(),
            });
        }
        let pkg = packages.swap_remove(0);
        let path = pkg.path.clone();

        let mut model = match self.packages.swap_remove(&path) {
            Some(model) => model,
            None => self.build(&pkg)?,
        };

        if let Some(name) = target.filter(|name| !name.is_empty()) {
            let qualified = format!("{path}.{name}");
            let Some(info) = model.structs.get_mut(&qualified) else {
                return Err(GenerateError::StructNotFound {
                    name: name.to_string(),
                    package: path,
                });
            };
            info.defaults = parse_defaults(self.provider, &model.package, info)?;
        }

        self.packages.insert(path.clone(), model);
        Ok(&self.packages[&path])
    }

    pub fn package(&self, path: &str) -> Option<&PackageModel> {
        self.packages.get(path)
    }

    pub fn lookup_struct(&self, qualified: &str) -> Option<&StructInfo> {
        self.packages.values().find_map(|model| model.structs.get(qualified))
    }

    pub fn lookup_typed_constants(&self, qualified: &str) -> Option<&[ConstantInfo]> {
        self.packages
            .values()
            .find_map(|model| model.typed_constants.get(qualified))
            .map(Vec::as_slice)
    }

    /// Underlying type of a named non-struct type.
    pub fn lookup_underlying(&self, qualified: &str) -> Option<&GoType> {
        self.packages.values().find_map(|model| model.underlying.get(qualified))
    }

    /// Make sure the package at `path` is extracted, if it can be loaded.
    fn require(&mut self, path: &str) -> Result<()> {
        if self.packages.contains_key(path) || self.in_progress.contains(path) {
            return Ok(());
        }
        let Some(pkg) = self.provider.package(path)? else {
            trace!(package = path, "dependency is opaque");
            return Ok(());
        };

        debug!(package = path, "extracting dependency");
        match self.build(&pkg) {
            Ok(model) => {
                self.packages.insert(path.to_string(), model);
                Ok(())
            }
            Err(error) if !pkg.is_local() => {
                debug!(package = path, %error, "keeping dependency opaque");
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    fn build(&mut self, pkg: &Rc<Package>) -> Result<PackageModel> {
        self.in_progress.insert(pkg.path.clone());
        let result = self.build_model(pkg);
        self.in_progress.remove(&pkg.path);
        result
    }

    fn build_model(&mut self, pkg: &Rc<Package>) -> Result<PackageModel> {
        let mut model = PackageModel::new(Rc::clone(pkg));
        let mut file_constants: FxHashMap<usize, Vec<ConstDecl>> = FxHashMap::default();

        for (file, decl, spec) in pkg.type_specs() {
            if spec.alias || spec.generic {
                trace!(name = %spec.name, "skipping alias or generic type");
                continue;
            }
            let qualified = format!("{}.{}", pkg.path, spec.name);

            if let TypeExpr::Struct(fields) = &spec.ty {
                let info = StructInfo::extract(self.provider, pkg, file, decl, spec, fields)?;
                for field in &info.fields {
                    for named in field.ty.named_types() {
                        self.require(&named.package)?;
                    }
                }
                debug!(name = %qualified, fields = info.fields.len(), "extracted struct");
                model.structs.insert(qualified, info);
                continue;
            }

            let ty = GoType::named(pkg.path.clone(), spec.name.clone());
            if let Some(underlying) = self.provider.underlying(&ty)? {
                model.underlying.insert(qualified.clone(), underlying);
            }

            let declared = match file_constants.entry(file) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(self.provider.file_constants(pkg, file)?),
            };
            let group: Vec<ConstantInfo> = declared
                .iter()
                .filter(|decl| decl.value.ty.as_ref() == Some(&ty))
                .map(ConstantInfo::from_decl)
                .collect();
            if !group.is_empty() {
                debug!(name = %qualified, constants = group.len(), "collected typed constants");
                model.typed_constants.insert(qualified, group);
            }
        }

        Ok(model)
    }
}
