//! Filesystem access: module discovery and package source files.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::constraint::BuildContext;
use crate::error::{Result, SourceError};
use crate::package::SourceFile;
use crate::parser::parse_file;

/// Module path under which `$GOROOT/src` is loaded.
pub const STD_MODULE: &str = "std";

/// A `require` line of `go.mod`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub path: String,
    pub version: String,
}

/// A `replace` line of `go.mod`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub path: String,
    /// Only this version is replaced when set.
    pub version: Option<String>,
    pub target: ReplaceTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceTarget {
    /// A directory, resolved against the module root.
    Dir(PathBuf),
    /// Another module version from the module cache.
    Module { path: String, version: String },
}

/// A Go module rooted at the directory holding its `go.mod`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    pub path: String,
    pub root: PathBuf,
    pub requires: Vec<Requirement>,
    pub replaces: Vec<Replacement>,
}

impl Module {
    /// Find the module enclosing `dir` by walking up to the nearest `go.mod`.
    pub fn find(dir: &Path) -> Result<Option<Self>> {
        for ancestor in dir.ancestors() {
            let go_mod = ancestor.join("go.mod");
            if !go_mod.is_file() {
                continue;
            }
            let contents = fs::read_to_string(&go_mod).map_err(|e| SourceError::io(&go_mod, e))?;
            return Ok(Self::parse(&contents, ancestor.to_path_buf()));
        }
        Ok(None)
    }

    /// Module described by `go.mod` contents, rooted at `root`.
    pub fn parse(go_mod: &str, root: PathBuf) -> Option<Self> {
        let path = module_path(go_mod)?;
        let requires = directives(go_mod, "require")
            .into_iter()
            .filter_map(|fields| match fields.as_slice() {
                [path, version, ..] => Some(Requirement {
                    path: path.to_string(),
                    version: version.to_string(),
                }),
                _ => None,
            })
            .collect();
        let replaces = directives(go_mod, "replace")
            .into_iter()
            .filter_map(|fields| Replacement::parse(&fields, &root))
            .collect();
        Some(Self {
            path,
            root,
            requires,
            replaces,
        })
    }

    /// The standard library, rooted at `$GOROOT/src`.
    pub fn standard(src: PathBuf) -> Self {
        Self {
            path: STD_MODULE.to_string(),
            root: src,
            ..Self::default()
        }
    }

    pub fn is_standard(&self) -> bool {
        self.path == STD_MODULE
    }

    /// Import path of a directory inside the module. Directories below
    /// `vendor/` carry the import path of the vendored package.
    pub fn import_path(&self, dir: &Path) -> Option<String> {
        let relative = dir.strip_prefix(&self.root).ok()?;
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_str()?),
                Component::CurDir => {}
                _ => return None,
            }
        }

        match segments.as_slice() {
            ["vendor", vendored @ ..] if !vendored.is_empty() => Some(vendored.join("/")),
            [] if self.is_standard() => None,
            _ if self.is_standard() => Some(segments.join("/")),
            _ => Some(
                std::iter::once(self.path.as_str())
                    .chain(segments.iter().copied())
                    .collect::<Vec<_>>()
                    .join("/"),
            ),
        }
    }

    /// Directory of an import path that belongs to this module.
    pub fn dir_for(&self, import_path: &str) -> Option<PathBuf> {
        if self.is_standard() {
            return is_standard_path(import_path).then(|| join_import_path(&self.root, import_path));
        }
        if import_path == self.path {
            return Some(self.root.clone());
        }
        let rest = import_path.strip_prefix(&self.path)?.strip_prefix('/')?;
        Some(join_import_path(&self.root, rest))
    }

    /// Directory of an import path provided by a module this one requires:
    /// its `vendor/` copy when present, otherwise the replacement directory
    /// or the module cache entry of the required version.
    pub fn dependency_dir(&self, import_path: &str, mod_cache: Option<&Path>) -> Option<PathBuf> {
        let vendored = join_import_path(&self.root.join("vendor"), import_path);
        if vendored.is_dir() {
            return Some(vendored);
        }

        let requirement = self
            .requires
            .iter()
            .filter(|requirement| within_module(import_path, &requirement.path))
            .max_by_key(|requirement| requirement.path.len())?;
        let rest = import_path[requirement.path.len()..].trim_start_matches('/');

        let replacement = self.replaces.iter().find(|replacement| {
            replacement.path == requirement.path
                && replacement
                    .version
                    .as_ref()
                    .is_none_or(|version| *version == requirement.version)
        });
        let module_dir = match replacement.map(|replacement| &replacement.target) {
            Some(ReplaceTarget::Dir(dir)) => dir.clone(),
            Some(ReplaceTarget::Module { path, version }) => cache_dir(mod_cache?, path, version),
            None => cache_dir(mod_cache?, &requirement.path, &requirement.version),
        };
        Some(join_import_path(&module_dir, rest))
    }
}

impl Replacement {
    /// Parse the fields of `old [version] => new [version]`.
    fn parse(fields: &[&str], root: &Path) -> Option<Self> {
        let arrow = fields.iter().position(|field| *field == "=>")?;
        let (old, new) = fields.split_at(arrow);
        let target = match &new[1..] {
            [dir] if is_local_path(dir) => ReplaceTarget::Dir(root.join(dir)),
            [path, version] => ReplaceTarget::Module {
                path: path.to_string(),
                version: version.to_string(),
            },
            _ => return None,
        };
        Some(Self {
            path: old.first()?.to_string(),
            version: old.get(1).map(|version| version.to_string()),
            target,
        })
    }
}

/// Extract the module path from `go.mod` contents.
pub fn module_path(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or_default().trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with([' ', '\t']) {
            return None;
        }
        let path = rest.trim().trim_matches('"');
        (!path.is_empty()).then(|| path.to_string())
    })
}

/// Fields of every `verb` directive, single-line or inside a block.
fn directives<'a>(go_mod: &'a str, verb: &str) -> Vec<Vec<&'a str>> {
    let fields = |line: &'a str| -> Vec<&'a str> {
        line.split_whitespace().map(|field| field.trim_matches('"')).collect()
    };

    let mut found = Vec::new();
    let mut in_block = false;
    for line in go_mod.lines() {
        let line = line.split("//").next().unwrap_or_default().trim();
        if in_block {
            if line == ")" {
                in_block = false;
            } else if !line.is_empty() {
                found.push(fields(line));
            }
            continue;
        }
        let Some(rest) = line.strip_prefix(verb) else {
            continue;
        };
        if !rest.starts_with([' ', '\t', '(']) {
            continue;
        }
        match rest.trim() {
            "(" => in_block = true,
            "" => {}
            rest => found.push(fields(rest)),
        }
    }
    found
}

/// Standard library import paths have no dot in their first element.
pub fn is_standard_path(import_path: &str) -> bool {
    let first = import_path.split('/').next().unwrap_or_default();
    !first.is_empty() && !first.contains('.')
}

fn within_module(import_path: &str, module: &str) -> bool {
    import_path
        .strip_prefix(module)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn is_local_path(path: &str) -> bool {
    path == "." || path == ".." || path.starts_with("./") || path.starts_with("../") || Path::new(path).is_absolute()
}

/// `$GOMODCACHE/<escaped path>@<version>`.
fn cache_dir(mod_cache: &Path, path: &str, version: &str) -> PathBuf {
    join_import_path(mod_cache, &format!("{}@{version}", escape_module_path(path)))
}

/// Module cache spelling of a path: upper-case letters become `!` and the
/// lower-case letter.
pub fn escape_module_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for ch in path.chars() {
        if ch.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(ch.to_ascii_lowercase());
        } else {
            escaped.push(ch);
        }
    }
    escaped
}

fn join_import_path(base: &Path, import_path: &str) -> PathBuf {
    import_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(base.to_path_buf(), |dir, segment| dir.join(segment))
}

/// Parse every non-test `.go` file of `dir` that `build` selects, sorted by
/// name.
pub fn read_package_files(dir: &Path, build: &BuildContext) -> Result<Vec<SourceFile>> {
    let entries = fs::read_dir(dir).map_err(|e| SourceError::io(dir, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| SourceError::io(dir, e))?.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if name.ends_with(".go") && !name.ends_with("_test.go") && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let source = fs::read_to_string(&path).map_err(|e| SourceError::io(&path, e))?;
        let name = path.file_name().and_then(|name| name.to_str()).unwrap_or_default();
        if !build.includes(name, &source) {
            debug!(file = %path.display(), "skipping file excluded by build constraints");
            continue;
        }
        let ast = parse_file(&source).map_err(|e| e.in_file(&path))?;
        files.push(SourceFile { path, ast });
    }
    Ok(files)
}

/// Best guess at the package name of an import that cannot be loaded.
pub fn guess_package_name(import_path: &str) -> String {
    let mut segments = import_path.rsplit('/');
    let mut last = segments.next().unwrap_or(import_path);
    let is_major_version = last.len() > 1
        && last.starts_with('v')
        && last[1..].bytes().all(|b| b.is_ascii_digit());
    if is_major_version {
        last = segments.next().unwrap_or(last);
    }
    let last = last.split('.').next().unwrap_or(last);
    let last = last.strip_prefix("go-").unwrap_or(last);
    last.replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_module_path() {
        assert_eq!(
            module_path("// comment\nmodule example.com/app // trailing\n\ngo 1.22\n"),
            Some("example.com/app".into())
        );
        assert_eq!(module_path("module \"quoted/path\"\n"), Some("quoted/path".into()));
        assert_eq!(module_path("modules are not declared here\n"), None);
    }

    #[test]
    fn maps_paths_and_directories() {
        let module = Module {
            path: "example.com/app".into(),
            root: PathBuf::from("/src/app"),
            ..Module::default()
        };
        assert_eq!(
            module.import_path(Path::new("/src/app/config/net")),
            Some("example.com/app/config/net".into())
        );
        assert_eq!(module.import_path(Path::new("/src/app")), Some("example.com/app".into()));
        assert_eq!(
            module.import_path(Path::new("/src/app/vendor/github.com/acme/units")),
            Some("github.com/acme/units".into())
        );
        assert_eq!(module.import_path(Path::new("/elsewhere")), None);
        assert_eq!(
            module.dir_for("example.com/app/config/net"),
            Some(PathBuf::from("/src/app/config/net"))
        );
        assert_eq!(module.dir_for("example.com/application"), None);
        assert_eq!(module.dir_for("fmt"), None);
    }

    #[test]
    fn standard_library_paths() {
        let stdlib = Module::standard(PathBuf::from("/go/src"));
        assert_eq!(stdlib.import_path(Path::new("/go/src/net/http")), Some("net/http".into()));
        assert_eq!(stdlib.import_path(Path::new("/go/src")), None);
        assert_eq!(
            stdlib.import_path(Path::new("/go/src/vendor/golang.org/x/net/idna")),
            Some("golang.org/x/net/idna".into())
        );
        assert_eq!(stdlib.dir_for("time"), Some(PathBuf::from("/go/src/time")));
        assert_eq!(stdlib.dir_for("example.com/app"), None);
        assert!(is_standard_path("encoding/json"));
        assert!(!is_standard_path("github.com/acme/units"));
    }

    #[test]
    fn reads_requirements_and_replacements() {
        let go_mod = "module example.com/app\n\n\
                      go 1.22\n\n\
                      require github.com/Acme/units v1.2.0\n\n\
                      require (\n\
                      \tgolang.org/x/text v0.14.0 // indirect\n\
                      \texample.com/shared v0.0.0\n\
                      )\n\n\
                      replace example.com/shared => ../shared\n\
                      replace golang.org/x/text v0.14.0 => golang.org/x/text v0.15.0\n";
        let module = Module::parse(go_mod, PathBuf::from("/src/app")).unwrap();
        assert_eq!(module.requires.len(), 3);
        assert_eq!(module.requires[1].path, "golang.org/x/text");
        assert_eq!(module.requires[1].version, "v0.14.0");
        assert_eq!(
            module.replaces[0].target,
            ReplaceTarget::Dir(PathBuf::from("/src/app/../shared"))
        );
        assert_eq!(module.replaces[1].version.as_deref(), Some("v0.14.0"));

        let cache = Path::new("/cache");
        assert_eq!(
            module.dependency_dir("github.com/Acme/units/si", Some(cache)),
            Some(PathBuf::from("/cache/github.com/!acme/units@v1.2.0/si"))
        );
        assert_eq!(
            module.dependency_dir("golang.org/x/text/language", Some(cache)),
            Some(PathBuf::from("/cache/golang.org/x/text@v0.15.0/language"))
        );
        assert_eq!(
            module.dependency_dir("example.com/shared", None),
            Some(PathBuf::from("/src/app/../shared"))
        );
        assert_eq!(module.dependency_dir("github.com/Acme/units/si", None), None);
        assert_eq!(module.dependency_dir("github.com/other/lib", Some(cache)), None);
    }

    #[test]
    fn escapes_upper_case_letters() {
        assert_eq!(escape_module_path("github.com/BurntSushi/toml"), "github.com/!burnt!sushi/toml");
        assert_eq!(escape_module_path("golang.org/x/net"), "golang.org/x/net");
    }

    #[test]
    fn guesses_package_names() {
        assert_eq!(guess_package_name("fmt"), "fmt");
        assert_eq!(guess_package_name("net/http"), "http");
        assert_eq!(guess_package_name("gopkg.in/yaml.v3"), "yaml");
        assert_eq!(guess_package_name("github.com/jackc/pgx/v5"), "pgx");
        assert_eq!(guess_package_name("github.com/mattn/go-isatty"), "isatty");
    }
}
