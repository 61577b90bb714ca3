//! Build constraints: `//go:build` lines and `_GOOS_GOARCH` file names.

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

/// Target platform deciding which files of a package are compiled.
///
/// `cgo` and `ignore` are never satisfied; every `go1.N` release tag is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub goos: String,
    pub goarch: String,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::host()
    }
}

impl BuildContext {
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>) -> Self {
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
        }
    }

    /// The platform this process runs on, in Go's names.
    pub fn host() -> Self {
        let goos = match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        };
        let goarch = match std::env::consts::ARCH {
            "x86_64" => "amd64",
            "x86" => "386",
            "aarch64" => "arm64",
            "powerpc64" if cfg!(target_endian = "little") => "ppc64le",
            "powerpc64" => "ppc64",
            "loongarch64" => "loong64",
            other => other,
        };
        Self::new(goos, goarch)
    }

    /// Whether a file named `file_name` with contents `source` is part of
    /// the build.
    pub fn includes(&self, file_name: &str, source: &str) -> bool {
        self.matches_file_name(file_name) && build_line(source).is_none_or(|expr| self.eval(expr))
    }

    fn matches_file_name(&self, file_name: &str) -> bool {
        let stem = file_name.strip_suffix(".go").unwrap_or(file_name);
        let stem = stem.strip_suffix("_test").unwrap_or(stem);
        let Some(underscore) = stem.find('_') else {
            return true;
        };
        let parts: Vec<&str> = stem[underscore..].split('_').collect();
        match parts.as_slice() {
            [.., os, arch] if KNOWN_OS.contains(os) && KNOWN_ARCH.contains(arch) => {
                self.satisfies(os) && self.satisfies(arch)
            }
            [.., last] if KNOWN_OS.contains(last) || KNOWN_ARCH.contains(last) => self.satisfies(last),
            _ => true,
        }
    }

    fn satisfies(&self, tag: &str) -> bool {
        tag == self.goos
            || tag == self.goarch
            || tag == "gc"
            || (tag == "unix" && UNIX_OS.contains(&self.goos.as_str()))
            || (tag == "linux" && self.goos == "android")
            || (tag == "solaris" && self.goos == "illumos")
            || (tag == "darwin" && self.goos == "ios")
            || tag
                .strip_prefix("go1.")
                .is_some_and(|minor| !minor.is_empty() && minor.bytes().all(|b| b.is_ascii_digit()))
    }

    /// Evaluate a constraint expression. A malformed one keeps the file.
    fn eval(&self, expr: &str) -> bool {
        let tokens = tokenize(expr);
        let mut parser = ExprParser {
            tokens: &tokens,
            pos: 0,
            context: self,
        };
        match parser.or() {
            Some(value) if parser.pos == tokens.len() => value,
            _ => true,
        }
    }
}

/// The expression of the `//go:build` line preceding the package clause.
fn build_line(source: &str) -> Option<&str> {
    for line in source.lines() {
        let line = line.trim();
        if line.starts_with("package ") {
            return None;
        }
        if let Some(expr) = line.strip_prefix("//go:build") {
            if expr.is_empty() || expr.starts_with([' ', '\t']) {
                return Some(expr.trim());
            }
        }
    }
    None
}

fn tokenize(expr: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = expr.trim_start();
    while !rest.is_empty() {
        let len = if rest.starts_with("&&") || rest.starts_with("||") {
            2
        } else if rest.starts_with(['!', '(', ')']) {
            1
        } else {
            rest.find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
                .unwrap_or(rest.len())
                .max(rest.chars().next().map_or(1, char::len_utf8))
        };
        let (token, tail) = rest.split_at(len);
        tokens.push(token);
        rest = tail.trim_start();
    }
    tokens
}

struct ExprParser<'a> {
    tokens: &'a [&'a str],
    pos: usize,
    context: &'a BuildContext,
}

impl<'a> ExprParser<'a> {
    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn or(&mut self) -> Option<bool> {
        let mut value = self.and()?;
        while self.peek() == Some("||") {
            self.pos += 1;
            let rhs = self.and()?;
            value = value || rhs;
        }
        Some(value)
    }

    fn and(&mut self) -> Option<bool> {
        let mut value = self.not()?;
        while self.peek() == Some("&&") {
            self.pos += 1;
            let rhs = self.not()?;
            value = value && rhs;
        }
        Some(value)
    }

    fn not(&mut self) -> Option<bool> {
        let token = self.peek()?;
        self.pos += 1;
        match token {
            "!" => self.not().map(|value| !value),
            "(" => {
                let value = self.or()?;
                (self.peek() == Some(")")).then(|| {
                    self.pos += 1;
                    value
                })
            }
            "&&" | "||" | ")" => None,
            tag => Some(self.context.satisfies(tag)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux() -> BuildContext {
        BuildContext::new("linux", "amd64")
    }

    #[test]
    fn file_names_select_platform() {
        let ctx = linux();
        assert!(ctx.includes("time.go", ""));
        assert!(ctx.includes("linux.go", ""));
        assert!(ctx.includes("zoneinfo_unix.go", ""));
        assert!(ctx.includes("sys_linux.go", ""));
        assert!(ctx.includes("asm_linux_amd64.go", ""));
        assert!(!ctx.includes("zoneinfo_windows.go", ""));
        assert!(!ctx.includes("asm_linux_arm64.go", ""));
        assert!(!ctx.includes("sys_wasm.go", ""));
    }

    #[test]
    fn build_lines_are_evaluated() {
        let ctx = linux();
        let file = |line: &str| format!("// Copyright.\n\n{line}\n\npackage time\n");
        assert!(ctx.includes("a.go", &file("//go:build unix")));
        assert!(ctx.includes("a.go", &file("//go:build (linux && !android) || windows")));
        assert!(ctx.includes("a.go", &file("//go:build go1.21")));
        assert!(!ctx.includes("a.go", &file("//go:build ignore")));
        assert!(!ctx.includes("a.go", &file("//go:build cgo && linux")));
        assert!(!ctx.includes("a.go", &file("//go:build !unix")));
        assert!(ctx.includes("a.go", "package main\n//go:build ignore\n"));
    }

    #[test]
    fn android_builds_linux_files() {
        let ctx = BuildContext::new("android", "arm64");
        assert!(ctx.includes("sys_linux.go", ""));
        assert!(ctx.includes("a.go", "//go:build linux\n\npackage a\n"));
    }

    #[test]
    fn malformed_expressions_keep_the_file() {
        let ctx = linux();
        assert!(ctx.includes("a.go", "//go:build (linux\n\npackage a\n"));
        assert!(ctx.includes("a.go", "//go:build linux &&\n\npackage a\n"));
    }
}
