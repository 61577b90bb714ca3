#[cfg(test)]
mod tests {
    use crate::config::*;
    use jsoncgen::DocTypes;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let config = JsoncgenConfig::default();
        assert_eq!(config.dir, PathBuf::from("."));
        assert!(config.uses_working_dir());
        assert_eq!(config.doc_types().unwrap(), DocTypes::ALL_FIELDS);
        assert!(config.type_name().is_err());
    }

    #[test]
    fn test_type_name_must_not_be_blank() {
        let config = JsoncgenConfig {
            type_name: Some("  ".to_string()),
            ..JsoncgenConfig::default()
        };
        let msg = config.type_name().unwrap_err().to_string();
        assert!(msg.contains("Missing required field: type"));
    }

    #[test]
    fn test_invalid_doc_types() {
        let config = JsoncgenConfig {
            doc_types: "NotStructFields|Sometimes".to_string(),
            ..JsoncgenConfig::default()
        };
        let msg = config.doc_types().unwrap_err().to_string();
        assert!(msg.contains("Invalid value for 'doc_types'"));
        assert!(msg.contains("Sometimes"));
    }
}
