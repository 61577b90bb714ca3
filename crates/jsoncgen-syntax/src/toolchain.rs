//! Locations of the Go toolchain: the standard library and the module cache.

use std::env;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::constraint::BuildContext;

/// Where sources outside the caller's modules live.
///
/// Each location is optional; packages that cannot be found there stay
/// opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoEnv {
    /// `$GOROOT`; the standard library is read from `$GOROOT/src`.
    pub goroot: Option<PathBuf>,
    /// `$GOMODCACHE`, usually `$GOPATH/pkg/mod`.
    pub mod_cache: Option<PathBuf>,
    pub build: BuildContext,
}

impl GoEnv {
    /// Read `GOROOT`, `GOMODCACHE`, `GOPATH`, `GOOS` and `GOARCH` from the
    /// environment, asking `go env` for whatever is unset.
    pub fn detect() -> Self {
        let mut goroot = non_empty_var("GOROOT");
        let mut mod_cache = non_empty_var("GOMODCACHE");

        if goroot.is_none() || mod_cache.is_none() {
            let [root, cache] = go_env(["GOROOT", "GOMODCACHE"]);
            goroot = goroot.or(root);
            mod_cache = mod_cache.or(cache);
        }
        let mod_cache = mod_cache.map(PathBuf::from).or_else(default_mod_cache);

        let host = BuildContext::host();
        let build = BuildContext::new(
            non_empty_var("GOOS").unwrap_or(host.goos),
            non_empty_var("GOARCH").unwrap_or(host.goarch),
        );

        let detected = Self {
            goroot: goroot.map(PathBuf::from),
            mod_cache,
            build,
        };
        debug!(
            goroot = ?detected.goroot,
            mod_cache = ?detected.mod_cache,
            goos = %detected.build.goos,
            goarch = %detected.build.goarch,
            "detected Go environment"
        );
        detected
    }

    /// Directory of the standard library sources.
    pub fn std_src(&self) -> Option<PathBuf> {
        self.goroot.as_ref().map(|root| root.join("src"))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

/// `go env` output for `names`; `None` for each value when `go` is missing.
fn go_env<const N: usize>(names: [&str; N]) -> [Option<String>; N] {
    let output = match Command::new("go").arg("env").args(names).output() {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            debug!(status = %output.status, "go env failed");
            return [const { None }; N];
        }
        Err(error) => {
            debug!(%error, "go toolchain not available");
            return [const { None }; N];
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    names.map(|_| {
        lines
            .next()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
    })
}

/// `$GOPATH/pkg/mod`, with `GOPATH` defaulting to `$HOME/go`.
fn default_mod_cache() -> Option<PathBuf> {
    let gopath = non_empty_var("GOPATH")
        .and_then(|list| env::split_paths(&list).next())
        .or_else(|| non_empty_var("HOME").map(|home| PathBuf::from(home).join("go")))?;
    Some(gopath.join("pkg").join("mod"))
}
