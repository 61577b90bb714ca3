//! Loading packages from a module on disk and folding their constants.

use std::fs;
use std::path::Path;

use jsoncgen_syntax::{
    BasicKind, BuildContext, Constant, Expr, GoEnv, GoProgram, GoType, Origin, SourceError,
    SourceProvider, TypeExpr, parse_expr, text_of,
};
use tempfile::TempDir;

const NET: &str = r#"package net

// State of a link.
type State uint8

const (
	// Down means no carrier.
	Down State = iota
	Up // carrier present
	Testing
)

const DefaultPort = 8000 + 80

type Mask uint8

const AllBits = ^Mask(0)
"#;

const CONFIG: &str = r#"package config

import (
	"time"

	link "example.com/demo/net"
)

type Duration = time.Duration

const (
	Port    = link.DefaultPort + 1
	Timeout = time.Duration(30)
)

const (
	KiB = 1 << (10 * (iota + 1))
	MiB
)

const Greeting = "hello, " + "world"

const GreetingLen = len(Greeting)

const Ratio float64 = 1 / 4

const Half = 1.0 / 2
"#;

fn write(root: &Path, file: &str, contents: &str) {
    let path = root.join(file);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn module() -> TempDir {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "go.mod", "module example.com/demo\n\ngo 1.22\n");
    write(temp.path(), "net/net.go", NET);
    write(temp.path(), "config/config.go", CONFIG);
    temp
}

const TIME: &str = r#"package time

type Duration int64

const (
	Nanosecond  Duration = 1
	Microsecond          = 1000 * Nanosecond
	Millisecond          = 1000 * Microsecond
	Second               = 1000 * Millisecond
)
"#;

/// A program that never looks outside the temporary module.
fn offline() -> GoProgram {
    GoProgram::with_env(GoEnv {
        build: BuildContext::new("linux", "amd64"),
        ..GoEnv::default()
    })
}

/// A program whose `$GOROOT` is `root`.
fn with_goroot(root: &Path) -> GoProgram {
    GoProgram::with_env(GoEnv {
        goroot: Some(root.to_path_buf()),
        mod_cache: None,
        build: BuildContext::new("linux", "amd64"),
    })
}

fn values(program: &GoProgram, dir: &Path) -> Vec<(String, String)> {
    let packages = program.load_dir(dir).unwrap();
    program
        .file_constants(&packages[0], 0)
        .unwrap()
        .into_iter()
        .map(|decl| (decl.name, decl.value.value.to_string()))
        .collect()
}

#[test]
fn test_package_path_from_module() {
    let temp = module();
    let program = offline();

    let packages = program.load_dir(&temp.path().join("config")).unwrap();
    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0].name, "config");
    assert_eq!(packages[0].path, "example.com/demo/config");

    let net = program.package("example.com/demo/net").unwrap().unwrap();
    assert_eq!(net.name, "net");
    assert!(program.package("time").unwrap().is_none());
}

#[test]
fn test_constants_across_packages() {
    let temp = module();
    let program = offline();

    let found = values(&program, &temp.path().join("config"));
    let expected = [
        ("Port", "8081"),
        ("Timeout", "30"),
        ("KiB", "1024"),
        ("MiB", "1048576"),
        ("Greeting", "\"hello, world\""),
        ("GreetingLen", "12"),
        ("Ratio", "0"),
        ("Half", "0.5"),
    ];
    let expected: Vec<(String, String)> = expected
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    assert_eq!(found, expected);
}

#[test]
fn test_typed_enum_constants() {
    let temp = module();
    let program = offline();

    let packages = program.load_dir(&temp.path().join("net")).unwrap();
    let consts = program.file_constants(&packages[0], 0).unwrap();
    let state = GoType::named("example.com/demo/net", "State");

    let states: Vec<_> = consts
        .iter()
        .filter(|decl| decl.value.ty.as_ref() == Some(&state))
        .map(|decl| (decl.name.as_str(), decl.value.value.clone()))
        .collect();
    assert_eq!(
        states,
        vec![
            ("Down", Constant::int(0)),
            ("Up", Constant::int(1)),
            ("Testing", Constant::int(2)),
        ]
    );

    assert_eq!(text_of(consts[0].doc.as_ref()), "Down means no carrier.\n");
    assert_eq!(text_of(consts[1].comment.as_ref()), "carrier present\n");

    let all_bits = consts.iter().find(|decl| decl.name == "AllBits").unwrap();
    assert_eq!(all_bits.value.value, Constant::int(255));

    let port = consts.iter().find(|decl| decl.name == "DefaultPort").unwrap();
    assert_eq!(port.value.ty, None);
}

#[test]
fn test_type_resolution() {
    let temp = module();
    let program = offline();
    let packages = program.load_dir(&temp.path().join("config")).unwrap();
    let config = &packages[0];

    let alias = program
        .resolve_type(config, 0, &TypeExpr::Name("Duration".into()))
        .unwrap();
    assert_eq!(alias, GoType::named("time", "Duration"));
    assert_eq!(program.underlying(&alias).unwrap(), None);

    let state = program
        .resolve_type(
            config,
            0,
            &TypeExpr::Slice(Box::new(TypeExpr::Qualified {
                package: "link".into(),
                name: "State".into(),
            })),
        )
        .unwrap();
    assert_eq!(state.short_name(), "[]net.State");

    let named = GoType::named("example.com/demo/net", "State");
    assert_eq!(program.underlying(&named).unwrap(), Some(GoType::Basic(BasicKind::Uint8)));

    let err = program
        .resolve_type(config, 0, &TypeExpr::Name("Missing".into()))
        .unwrap_err();
    assert!(matches!(err, SourceError::UnknownType(name) if name == "Missing"));
}

#[test]
fn test_skips_test_and_ignored_files() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.go", "package solo\n\nconst A = 1\n");
    write(temp.path(), "a_test.go", "package solo_test\n");
    write(temp.path(), "gen.go", "//go:build ignore\n\npackage main\n");

    let program = offline();
    let packages = program.load_dir(temp.path()).unwrap();
    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0].files.len(), 1);
    // No go.mod: the package path is its name.
    assert_eq!(packages[0].path, "solo");
}

#[test]
fn test_multiple_packages_in_directory() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.go", "package a\n");
    write(temp.path(), "b.go", "package b\n");

    let program = offline();
    let packages = program.load_dir(temp.path()).unwrap();
    let mut names: Vec<&str> = packages.iter().map(|pkg| pkg.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_constant_cycles_are_reported() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "cycle.go", "package cycle\n\nconst A = B\n\nconst B = A\n");

    let program = offline();
    let packages = program.load_dir(temp.path()).unwrap();

    // Untyped constants that fail to fold are skipped.
    assert!(program.file_constants(&packages[0], 0).unwrap().is_empty());

    let err = program
        .eval_const(&packages[0], 0, &Expr::Ident("A".into()))
        .unwrap_err();
    assert!(matches!(err, SourceError::ConstantCycle(_)));
}

#[test]
fn test_parse_errors_name_the_file() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "broken.go", "package broken\n\ntype T struct {\n");

    let program = offline();
    let err = program.load_dir(temp.path()).unwrap_err();
    match err {
        SourceError::Parse { path, .. } => assert!(path.ends_with("broken.go")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_standard_library_from_goroot() {
    let temp = module();
    let goroot = TempDir::new().unwrap();
    write(goroot.path(), "src/time/time.go", TIME);
    write(goroot.path(), "src/time/zoneinfo_plan9.go", "package plan9\n");

    let program = with_goroot(goroot.path());
    let packages = program.load_dir(&temp.path().join("config")).unwrap();
    let config = &packages[0];
    assert_eq!(config.origin, Origin::Local);

    let time = program.package("time").unwrap().unwrap();
    assert_eq!(time.origin, Origin::Standard);
    assert_eq!(time.path, "time");
    assert_eq!(time.files.len(), 1);

    let alias = program
        .resolve_type(config, 0, &TypeExpr::Name("Duration".into()))
        .unwrap();
    assert_eq!(program.underlying(&alias).unwrap(), Some(GoType::Basic(BasicKind::Int64)));

    let timeout = parse_expr("5 * time.Second").unwrap();
    let value = program.eval_const(config, 0, &timeout).unwrap();
    assert_eq!(value.value.to_string(), "5000000000");
    assert_eq!(value.ty, Some(GoType::named("time", "Duration")));
}

#[test]
fn test_broken_standard_package_stays_opaque() {
    let temp = module();
    let goroot = TempDir::new().unwrap();
    write(goroot.path(), "src/time/time.go", "package time\n\ntype Duration struct {\n");

    let program = with_goroot(goroot.path());
    program.load_dir(&temp.path().join("config")).unwrap();
    assert!(program.package("time").unwrap().is_none());
    // Remembered: the second lookup does not parse again.
    assert!(program.package("time").unwrap().is_none());
}
