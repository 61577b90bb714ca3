use std::rc::Rc;

use indexmap::IndexMap;
use jsoncgen_syntax::{Constant, GoType, Package};
use rustc_hash::FxHashMap;

use crate::value::Value;

/// A constant declared with a named type, listed as an allowed value.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantInfo {
    /// Constant name.
    pub name: String,
    /// Exact value.
    pub value: Constant,
    /// Doc comment followed by the trailing line comment.
    pub doc: String,
}

impl ConstantInfo {
    /// Documentation on a single line.
    pub fn inline_doc(&self) -> String {
        self.doc.replace('\n', " ").trim_end().to_string()
    }
}

/// How a field holds its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLayout {
    Single,
    /// Slice or array.
    Sequence,
    /// Map.
    Associative,
}

/// A struct field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    /// Declared type.
    pub ty: GoType,
    /// Field name, empty for embedded fields.
    pub name: String,
    pub layout: FieldLayout,
    /// Element type of sequences, value type of maps.
    pub element_type: Option<GoType>,
    pub is_embedded: bool,
    /// Struct tag pairs in tag order, `None` without a tag.
    pub tags: Option<IndexMap<String, String>>,
    /// Doc comment followed by the trailing line comment.
    pub doc: String,
}

impl FieldInfo {
    /// Key written to the output: the `json` tag name if set, otherwise the
    /// field name. `None` when the tag is `-`.
    pub fn json_name(&self) -> Option<&str> {
        let tag = self.tags.as_ref().and_then(|tags| tags.get("json"));
        match tag.map(String::as_str) {
            Some("-") => None,
            Some(tag) => match tag.split(',').next() {
                Some(name) if !name.is_empty() => Some(name),
                _ => Some(&self.name),
            },
            None => Some(&self.name),
        }
    }

    /// Key of the field in a struct literal: its name, or the type name for
    /// embedded fields.
    pub fn defaults_key(&self) -> &str {
        if !self.is_embedded {
            return &self.name;
        }
        match self.ty.without_pointers() {
            GoType::Named(named) => &named.name,
            _ => &self.name,
        }
    }

    /// Type as shown in comments, packages abbreviated to their last path
    /// element.
    pub fn type_label(&self) -> String {
        self.ty.short_name()
    }

    /// Comment block written above the field.
    ///
    /// Every line is prefixed with `indent` and `// `. With `render_type`
    /// the first line starts with the type label, separated from the doc by
    /// ` - `. `constants` appends an aligned list of allowed values. Returns
    /// an empty string when there is nothing to show.
    pub fn format_doc(
        &self,
        indent: &str,
        render_type: bool,
        constants: Option<&[ConstantInfo]>,
    ) -> String {
        let mut doc = self.doc.clone();

        if let Some(constants) = constants.filter(|constants| !constants.is_empty()) {
            doc.push_str("Allowed values:\n");

            let values: Vec<String> = constants.iter().map(|info| info.value.to_string()).collect();
            let name_width = constants.iter().map(|info| info.name.chars().count()).max().unwrap_or(0);
            let value_width = values.iter().map(|value| value.chars().count()).max().unwrap_or(0);

            for (info, value) in constants.iter().zip(&values) {
                doc.push_str(&format!("{:<name_width$} = {value:>value_width$}", info.name));
                let inline = info.inline_doc();
                if !inline.is_empty() {
                    doc.push_str(&format!("  {inline}"));
                }
                doc.push('\n');
            }
        }

        let prefix = format!("{indent}// ");
        let mut body = if doc.is_empty() {
            "\n".to_string()
        } else {
            let indented = doc.replace('\n', &format!("\n{prefix}"));
            match indented.strip_suffix(&prefix) {
                Some(trimmed) => trimmed.to_string(),
                None => indented,
            }
        };

        if render_type {
            let mut label = self.type_label();
            if body != "\n" {
                label.push_str(" - ");
            }
            body.insert_str(0, &label);
        }

        if body == "\n" {
            String::new()
        } else {
            format!("{prefix}{body}")
        }
    }
}

/// A struct type declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct StructInfo {
    /// Import path of the declaring package.
    pub package: String,
    pub name: String,
    pub doc: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldInfo>,
    /// Parsed `<Name>Defaults` literal; only filled for the generation
    /// target.
    pub defaults: Option<Value>,
}

impl StructInfo {
    /// `path/to/pkg.Name`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.package, self.name)
    }
}

/// Everything extracted from one package.
#[derive(Debug)]
pub struct PackageModel {
    pub package: Rc<Package>,
    /// Structs by qualified name, in declaration order.
    pub structs: IndexMap<String, StructInfo>,
    /// Typed constants by qualified type name, each group in declaration
    /// order.
    pub typed_constants: IndexMap<String, Vec<ConstantInfo>>,
    /// Underlying types of the package's other named types.
    pub underlying: FxHashMap<String, GoType>,
}

impl PackageModel {
    pub fn new(package: Rc<Package>) -> Self {
        Self {
            package,
            structs: IndexMap::new(),
            typed_constants: IndexMap::new(),
            underlying: FxHashMap::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsoncgen_syntax::BasicKind;

    fn field(name: &str, ty: GoType, doc: &str) -> FieldInfo {
        FieldInfo {
            ty,
            name: name.to_string(),
            layout: FieldLayout::Single,
            element_type: None,
            is_embedded: false,
            tags: None,
            doc: doc.to_string(),
        }
    }

    fn constant(name: &str, value: i64, doc: &str) -> ConstantInfo {
        ConstantInfo {
            name: name.to_string(),
            value: Constant::int(value),
            doc: doc.to_string(),
        }
    }

    #[test]
    fn json_name_follows_tag() {
        let mut info = field("Port", GoType::Basic(BasicKind::Int), "");
        assert_eq!(info.json_name(), Some("Port"));

        let tags = |json: &str| Some(IndexMap::from([("json".to_string(), json.to_string())]));
        info.tags = tags("port,omitempty");
        assert_eq!(info.json_name(), Some("port"));
        info.tags = tags(",omitempty");
        assert_eq!(info.json_name(), Some("Port"));
        info.tags = tags("-");
        assert_eq!(info.json_name(), None);
        info.tags = tags("-,");
        assert_eq!(info.json_name(), Some("-"));
    }

    #[test]
    fn defaults_key_of_embedded_field() {
        let mut info = field(
            "",
            GoType::Pointer(Box::new(GoType::named("example.com/app/base", "Common"))),
            "",
        );
        info.is_embedded = true;
        assert_eq!(info.defaults_key(), "Common");
    }

    #[test]
    fn format_doc_with_type_and_doc() {
        let info = field("Name", GoType::Basic(BasicKind::String), "Display name.\nShown in lists.\n");
        assert_eq!(
            info.format_doc("\t", true, None),
            "\t// string - Display name.\n\t// Shown in lists.\n"
        );
        assert_eq!(
            info.format_doc("\t", false, None),
            "\t// Display name.\n\t// Shown in lists.\n"
        );
    }

    #[test]
    fn format_doc_without_doc() {
        let info = field("Count", GoType::Basic(BasicKind::Int), "");
        assert_eq!(info.format_doc("\t\t", true, None), "\t\t// int\n");
        assert_eq!(info.format_doc("\t\t", false, None), "");
    }

    #[test]
    fn format_doc_lists_allowed_values() {
        let info = field("Level", GoType::named("example.com/app/log", "Level"), "Verbosity.\n");
        let constants = vec![
            constant("Quiet", 0, "Nothing at all.\n"),
            constant("Normal", 1, ""),
            constant("Debug", 10, "Everything,\nincluding traces.\n"),
        ];
        assert_eq!(
            info.format_doc("\t", true, Some(&constants)),
            "\t// log.Level - Verbosity.\n\
             \t// Allowed values:\n\
             \t// Quiet  =  0  Nothing at all.\n\
             \t// Normal =  1\n\
             \t// Debug  = 10  Everything, including traces.\n"
        );
    }

    #[test]
    fn inline_doc_joins_lines() {
        let info = constant("A", 1, "First line.\nSecond line.\n");
        assert_eq!(info.inline_doc(), "First line. Second line.");
    }
}
