use indexmap::IndexMap;
use jsoncgen_syntax::{Field, Package, SourceProvider, TypeExpr, text_of, unquote};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{GenerateError, Result};
use crate::model::{FieldInfo, FieldLayout};

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\w+):"((?:[^"\\]|\\.)*)""#).expect("tag pattern is valid"));

impl FieldInfo {
    /// Build a field declared in `file` of `pkg`, inside the struct `owner`.
    pub fn extract(
        provider: &dyn SourceProvider,
        pkg: &Package,
        file: usize,
        owner: &str,
        field: &Field,
    ) -> Result<Self> {
        let (name, is_embedded) = match field.names.as_slice() {
            [] => (String::new(), true),
            [name] => (name.clone(), false),
            names => {
                return Err(GenerateError::MultipleNames {
                    owner: owner.to_string(),
                    names: names.to_vec(),
                });
            }
        };

        let ty = provider.resolve_type(pkg, file, &field.ty)?;
        let (layout, element_type) = match &field.ty {
            TypeExpr::Slice(elem) | TypeExpr::Array { elem, .. } => {
                (FieldLayout::Sequence, Some(provider.resolve_type(pkg, file, elem)?))
            }
            TypeExpr::Map { value, .. } => {
                (FieldLayout::Associative, Some(provider.resolve_type(pkg, file, value)?))
            }
            _ => (FieldLayout::Single, None),
        };

        Ok(Self {
            ty,
            name,
            layout,
            element_type,
            is_embedded,
            tags: field.tag.as_deref().map(parse_tags),
            doc: text_of(field.doc.as_ref()) + &text_of(field.comment.as_ref()),
        })
    }
}

/// Parse `key:"value"` pairs out of a raw tag literal. Fragments that do
/// not match are skipped.
pub fn parse_tags(raw: &str) -> IndexMap<String, String> {
    let body = unquote(raw).unwrap_or_else(|| raw.trim_matches(['`', ' ']).to_string());
    TAG_PATTERN
        .captures_iter(&body)
        .map(|captures| (captures[1].to_string(), captures[2].to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_raw_tags() {
        let tags = parse_tags(r#"`json:"port,omitempty" yaml:"port" env:"APP_PORT"`"#);
        let pairs: Vec<(&str, &str)> = tags.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(
            pairs,
            vec![("json", "port,omitempty"), ("yaml", "port"), ("env", "APP_PORT")]
        );
    }

    #[test]
    fn parses_interpreted_tags() {
        let tags = parse_tags(r#""json:\"age\"""#);
        assert_eq!(tags.get("json").map(String::as_str), Some("age"));
    }

    #[test]
    fn skips_malformed_fragments() {
        let tags = parse_tags(r#"`json:"name" broken:unquoted yaml:"n"`"#);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags.get("yaml").map(String::as_str), Some("n"));
        assert!(!tags.contains_key("broken"));
    }

    #[test]
    fn keeps_escaped_quotes() {
        let tags = parse_tags(r#"`doc:"say \"hi\""`"#);
        assert_eq!(tags.get("doc").map(String::as_str), Some(r#"say \"hi\""#));
    }
}
