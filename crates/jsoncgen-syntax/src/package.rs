//! Parsed packages and their package-level declaration index.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::ast::{Decl, DeclKeyword, File, FuncDecl, GenDecl, Spec, TypeSpec, ValueSpec};

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub ast: File,
}

/// Location of a spec: file, declaration within the file, spec within the
/// declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecRef {
    pub file: usize,
    pub decl: usize,
    pub spec: usize,
}

/// Location of a package-level constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstRef {
    /// Spec that declares the name.
    pub spec: SpecRef,
    /// Position of the name within its spec.
    pub name_index: usize,
    /// Value of `iota` for the spec.
    pub iota: usize,
    /// Spec (within the same declaration) supplying type and initializers;
    /// differs from `spec.spec` under implicit repetition.
    pub source: usize,
}

/// Where the sources of a package were found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Origin {
    /// A module the caller works on.
    #[default]
    Local,
    /// `$GOROOT/src`.
    Standard,
    /// A required module, read from `vendor/` or the module cache.
    Dependency,
}

#[derive(Debug)]
pub struct Package {
    /// Name from the package clause.
    pub name: String,
    /// Import path.
    pub path: String,
    pub dir: PathBuf,
    pub files: Vec<SourceFile>,
    pub origin: Origin,
    types: HashMap<String, SpecRef>,
    consts: HashMap<String, ConstRef>,
}

impl Package {
    pub fn new(name: String, path: String, dir: PathBuf, files: Vec<SourceFile>) -> Self {
        let mut types = HashMap::new();
        let mut consts = HashMap::new();

        for (file_idx, file) in files.iter().enumerate() {
            for (decl_idx, decl) in file.ast.decls.iter().enumerate() {
                let Decl::Gen(gen_decl) = decl else {
                    continue;
                };
                match gen_decl.keyword {
                    DeclKeyword::Type => {
                        for (spec_idx, spec) in gen_decl.specs.iter().enumerate() {
                            if let Spec::Type(type_spec) = spec {
                                let at = SpecRef {
                                    file: file_idx,
                                    decl: decl_idx,
                                    spec: spec_idx,
                                };
                                types.insert(type_spec.name.clone(), at);
                            }
                        }
                    }
                    DeclKeyword::Const => {
                        let mut source = None;
                        for (spec_idx, spec) in gen_decl.specs.iter().enumerate() {
                            let Spec::Value(value_spec) = spec else {
                                continue;
                            };
                            if !value_spec.values.is_empty() {
                                source = Some(spec_idx);
                            }
                            let at = SpecRef {
                                file: file_idx,
                                decl: decl_idx,
                                spec: spec_idx,
                            };
                            for (name_index, name) in value_spec.names.iter().enumerate() {
                                if name == "_" {
                                    continue;
                                }
                                consts.insert(
                                    name.clone(),
                                    ConstRef {
                                        spec: at,
                                        name_index,
                                        iota: spec_idx,
                                        source: source.unwrap_or(spec_idx),
                                    },
                                );
                            }
                        }
                    }
                    DeclKeyword::Var | DeclKeyword::Import => {}
                }
            }
        }

        Self {
            name,
            path,
            dir,
            files,
            origin: Origin::Local,
            types,
            consts,
        }
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Whether the package is part of the caller's own sources.
    pub fn is_local(&self) -> bool {
        self.origin == Origin::Local
    }

    fn gen_decl(&self, at: SpecRef) -> Option<&GenDecl> {
        match self.files.get(at.file)?.ast.decls.get(at.decl)? {
            Decl::Gen(gen_decl) => Some(gen_decl),
            Decl::Func(_) => None,
        }
    }

    /// Package-level type declaration named `name`, with its file index.
    pub fn type_spec(&self, name: &str) -> Option<(usize, &TypeSpec)> {
        let at = *self.types.get(name)?;
        match self.gen_decl(at)?.specs.get(at.spec)? {
            Spec::Type(spec) => Some((at.file, spec)),
            _ => None,
        }
    }

    /// Every type declaration in source order: file index, enclosing
    /// declaration and spec.
    pub fn type_specs(&self) -> impl Iterator<Item = (usize, &GenDecl, &TypeSpec)> {
        self.files.iter().enumerate().flat_map(|(file_idx, file)| {
            file.ast
                .gen_decls(DeclKeyword::Type)
                .flat_map(move |(_, gen_decl)| {
                    gen_decl.specs.iter().filter_map(move |spec| match spec {
                        Spec::Type(type_spec) => Some((file_idx, gen_decl, type_spec)),
                        _ => None,
                    })
                })
        })
    }

    pub fn const_ref(&self, name: &str) -> Option<ConstRef> {
        self.consts.get(name).copied()
    }

    pub fn value_spec(&self, at: SpecRef) -> Option<&ValueSpec> {
        match self.gen_decl(at)?.specs.get(at.spec)? {
            Spec::Value(spec) => Some(spec),
            _ => None,
        }
    }

    /// Top-level functions and methods with their file index.
    pub fn functions(&self) -> impl Iterator<Item = (usize, &FuncDecl)> {
        self.files
            .iter()
            .enumerate()
            .flat_map(|(file_idx, file)| file.ast.functions().map(move |func| (file_idx, func)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_file;

    fn package(sources: &[&str]) -> Package {
        let files = sources
            .iter()
            .enumerate()
            .map(|(idx, source)| SourceFile {
                path: PathBuf::from(format!("file{idx}.go")),
                ast: parse_file(source).unwrap(),
            })
            .collect();
        Package::new("demo".into(), "example.com/demo".into(), PathBuf::from("."), files)
    }

    #[test]
    fn indexes_types_across_files() {
        let pkg = package(&[
            "package demo\n\ntype A struct{}\n",
            "package demo\n\ntype (\n\tB int\n\tC = B\n)\n",
        ]);
        assert_eq!(pkg.type_spec("A").map(|(file, _)| file), Some(0));
        let (file, c) = pkg.type_spec("C").unwrap();
        assert_eq!(file, 1);
        assert!(c.alias);
        let names: Vec<&str> = pkg.type_specs().map(|(_, _, spec)| spec.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn constants_track_iota_and_repetition() {
        let pkg = package(&["package demo\n\nconst (\n\t_ = iota\n\tA\n\tB\n\tC = 10\n\tD\n)\n"]);
        assert!(pkg.const_ref("_").is_none());

        let b = pkg.const_ref("B").unwrap();
        assert_eq!(b.iota, 2);
        assert_eq!(b.source, 0);

        let d = pkg.const_ref("D").unwrap();
        assert_eq!(d.iota, 4);
        assert_eq!(d.source, 3);
        assert!(pkg.value_spec(d.spec).unwrap().values.is_empty());
    }
}
