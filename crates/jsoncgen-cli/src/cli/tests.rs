#[cfg(test)]
mod tests {
    use crate::cli::{Cli, parse_doc_types};
    use clap::Parser;
    use jsoncgen::DocTypes;
    use std::path::PathBuf;

    #[test]
    fn test_parse_doc_types_valid() {
        assert_eq!(parse_doc_types("NotFields"), Ok(DocTypes::NOT_FIELDS));
        assert_eq!(
            parse_doc_types("NotArrayFields|NotMapFields"),
            Ok(DocTypes::NOT_ARRAY_FIELDS | DocTypes::NOT_MAP_FIELDS)
        );
        assert_eq!(parse_doc_types("AllFields"), Ok(DocTypes::ALL_FIELDS));
    }

    #[test]
    fn test_parse_doc_types_invalid() {
        let err = parse_doc_types("NotStructFields|Everything").unwrap_err();
        assert!(err.contains("unknown doc type 'Everything'"));
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "jsoncgen",
            "-t",
            "Config",
            "--doc-types",
            "NotStructFields",
            "-o",
            "config.jsonc",
            "./internal/config",
        ]);
        assert_eq!(cli.type_name.as_deref(), Some("Config"));
        assert_eq!(cli.doc_types, Some(DocTypes::NOT_STRUCT_FIELDS));
        assert_eq!(cli.out, Some(PathBuf::from("config.jsonc")));
        assert_eq!(cli.dir, Some(PathBuf::from("./internal/config")));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["jsoncgen"]);
        assert!(cli.type_name.is_none());
        assert!(cli.dir.is_none());
        assert!(cli.doc_types.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_rejects_unknown_doc_types() {
        let result = Cli::try_parse_from(["jsoncgen", "-t", "Config", "--doc-types", "NoTypes"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_verbose_conflicts_with_quiet() {
        let result = Cli::try_parse_from(["jsoncgen", "-t", "Config", "-v", "-q"]);
        assert!(result.is_err());
    }
}
