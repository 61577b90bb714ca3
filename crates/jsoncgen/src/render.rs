//! JSONC rendering of an extracted struct and its defaults.

use jsoncgen_syntax::{Constant, GoType};
use tracing::{debug, trace, warn};

use crate::MAX_DEPTH;
use crate::error::{GenerateError, Result};
use crate::model::{ConstantInfo, FieldInfo, FieldLayout, StructInfo};
use crate::options::DocTypes;
use crate::ordered::OrderedMap;
use crate::registry::Registry;
use crate::value::Value;

/// Walks struct models of a [`Registry`] and writes tab-indented JSONC.
pub struct Renderer<'r, 'p> {
    registry: &'r Registry<'p>,
    doc_types: DocTypes,
}

impl<'r, 'p> Renderer<'r, 'p> {
    pub fn new(registry: &'r Registry<'p>, doc_types: DocTypes) -> Self {
        Self {
            registry,
            doc_types,
        }
    }

    /// Render `info` with its parsed defaults. The output has no trailing
    /// newline.
    pub fn render(&self, info: &StructInfo) -> Result<String> {
        self.render_struct(info, info.defaults.as_ref(), "", false, &[], 0)
    }

    /// Render the fields of `info`.
    ///
    /// An embedded struct is written without braces, straight into the
    /// field list of its owner. `parent_shadowing` holds the names already
    /// declared by the owners, which win over fields of the same name.
    fn render_struct(
        &self,
        info: &StructInfo,
        defaults: Option<&Value>,
        indent: &str,
        embedded: bool,
        parent_shadowing: &[&str],
        depth: usize,
    ) -> Result<String> {
        if depth > MAX_DEPTH {
            return Err(GenerateError::NestingTooDeep(info.qualified_name()));
        }
        let defaults = match defaults {
            None => None,
            Some(Value::Object(fields)) => Some(fields),
            Some(other) => {
                return Err(GenerateError::UnexpectedValue {
                    field: info.qualified_name(),
                    expected: "a struct",
                    found: other.kind_name(),
                });
            }
        };

        let mut out = String::new();
        let mut indent = indent.to_string();
        if !embedded {
            out.push_str("{\n");
            indent.push('\t');
        }

        let shadowing: Vec<&str> = info
            .fields
            .iter()
            .filter(|field| !field.is_embedded)
            .map(|field| field.name.as_str())
            .collect();

        let mut comma = "";
        let mut block_spacing = false;
        let mut position = 0;

        for field in &info.fields {
            if !field.is_embedded {
                let own = position;
                position += 1;
                let redeclared = shadowing
                    .iter()
                    .rposition(|name| *name == field.name)
                    .is_some_and(|last| last > own);
                if redeclared {
                    warn!(owner = %info.qualified_name(), field = %field.name, "field is declared twice, keeping the last one");
                    continue;
                }
                if embedded && parent_shadowing.contains(&field.name.as_str()) {
                    debug!(owner = %info.qualified_name(), field = %field.name, "field is shadowed");
                    continue;
                }
            }

            let Some(name) = field.json_name() else {
                trace!(owner = %info.qualified_name(), field = %field.name, "field is excluded by its json tag");
                continue;
            };
            let value = defaults.and_then(|fields| fields.get(field.defaults_key()));

            if field.is_embedded {
                let mut owners: Vec<&str> = shadowing.clone();
                owners.extend_from_slice(parent_shadowing);
                let rendered = self.render_embedded(field, value, &indent, &owners, depth)?;
                if rendered.is_empty() {
                    continue;
                }
                out.push_str(comma);
                out.push_str(&rendered);
            } else {
                let constants = self.registry.lookup_typed_constants(&field.ty.qualified_name());
                let rendered = self.render_field(field, value, constants, &indent, depth)?;
                let doc = field.format_doc(&indent, self.render_type(field), constants);

                out.push_str(comma);
                if !doc.is_empty() && !block_spacing && !comma.is_empty() {
                    out.push('\n');
                }
                block_spacing = !doc.is_empty();

                out.push_str(&doc);
                out.push_str(&format!("{indent}\"{name}\": {rendered}"));
            }

            comma = if block_spacing { ",\n\n" } else { ",\n" };
        }

        if !embedded {
            if !comma.is_empty() {
                out.push('\n');
            }
            indent.pop();
            out.push_str(&indent);
            out.push('}');
        }

        Ok(out)
    }

    fn render_embedded(
        &self,
        field: &FieldInfo,
        value: Option<&Value>,
        indent: &str,
        owners: &[&str],
        depth: usize,
    ) -> Result<String> {
        let underlying = field
            .ty
            .without_pointers()
            .as_named()
            .and_then(|named| self.registry.lookup_underlying(&named.qualified_name()));
        let collection = matches!(
            underlying,
            Some(GoType::Slice(_) | GoType::Array(..) | GoType::Map(..))
        );
        if field.layout != FieldLayout::Single || collection {
            return Err(GenerateError::EmbeddedCollection(field.type_label()));
        }
        let info = self.struct_for(field.ty.without_pointers())?;
        match value {
            Some(Value::Null) => Ok(String::new()),
            value => self.render_struct(info, value, indent, true, owners, depth + 1),
        }
    }

    /// Whether the type label goes into the doc comment of `field`.
    fn render_type(&self, field: &FieldInfo) -> bool {
        if self.doc_types.contains(DocTypes::NOT_FIELDS) {
            return false;
        }
        match field.layout {
            FieldLayout::Sequence => !self.doc_types.contains(DocTypes::NOT_ARRAY_FIELDS),
            FieldLayout::Associative => !self.doc_types.contains(DocTypes::NOT_MAP_FIELDS),
            FieldLayout::Single => {
                !(self.doc_types.contains(DocTypes::NOT_STRUCT_FIELDS)
                    && self.lookup_struct(field.ty.without_pointers()).is_some())
            }
        }
    }

    fn render_field(
        &self,
        field: &FieldInfo,
        value: Option<&Value>,
        constants: Option<&[ConstantInfo]>,
        indent: &str,
        depth: usize,
    ) -> Result<String> {
        let unexpected = |expected, found: &Value| GenerateError::UnexpectedValue {
            field: field.name.clone(),
            expected,
            found: found.kind_name(),
        };

        match field.layout {
            FieldLayout::Single => self.render_single(&field.name, &field.ty, value, constants, indent, depth),
            FieldLayout::Sequence => match value {
                None => Ok("[]".to_string()),
                Some(Value::Null) => Ok("null".to_string()),
                Some(Value::Sequence(items)) => {
                    let elem = self.element_type_of(field)?;
                    self.render_sequence(&field.name, elem, items, indent, depth)
                }
                Some(other) => Err(unexpected("a sequence", other)),
            },
            FieldLayout::Associative => match value {
                None => Ok("{}".to_string()),
                Some(Value::Null) => Ok("null".to_string()),
                Some(Value::Map(entries)) => {
                    let elem = self.element_type_of(field)?;
                    self.render_map(&field.name, elem, entries, indent, depth)
                }
                Some(other) => Err(unexpected("a map", other)),
            },
        }
    }

    fn element_type_of<'f>(&self, field: &'f FieldInfo) -> Result<&'f GoType> {
        field
            .element_type
            .as_ref()
            .ok_or_else(|| GenerateError::UnresolvedStructure(field.ty.qualified_name()))
    }

    /// Render a single value of type `ty`. Without a value the first
    /// constant of the type is used, then the zero value.
    fn render_single(
        &self,
        label: &str,
        ty: &GoType,
        value: Option<&Value>,
        constants: Option<&[ConstantInfo]>,
        indent: &str,
        depth: usize,
    ) -> Result<String> {
        let Some(value) = value else {
            return match constants.and_then(<[ConstantInfo]>::first) {
                Some(first) => Ok(first.value.to_string()),
                None => self.zero_value(ty, indent, depth),
            };
        };

        match value {
            Value::Null => Ok("null".to_string()),
            Value::Scalar(constant) => Ok(constant.to_string()),
            Value::Object(_) => {
                let info = self.struct_for(ty.without_pointers())?;
                self.render_struct(info, Some(value), indent, false, &[], depth + 1)
            }
            Value::Sequence(items) => {
                let elem = self.collection_element(label, ty, value)?;
                self.render_sequence(label, &elem, items, indent, depth)
            }
            Value::Map(entries) => {
                let elem = self.collection_element(label, ty, value)?;
                self.render_map(label, &elem, entries, indent, depth)
            }
        }
    }

    /// Element type of a named slice, array or map type.
    fn collection_element(&self, label: &str, ty: &GoType, value: &Value) -> Result<GoType> {
        let mut current = ty.without_pointers();
        for _ in 0..MAX_DEPTH {
            match current {
                GoType::Slice(elem) | GoType::Array(_, elem) | GoType::Map(_, elem) => {
                    return Ok(elem.as_ref().clone());
                }
                GoType::Named(named) => match self.registry.lookup_underlying(&named.qualified_name()) {
                    Some(underlying) => current = underlying,
                    None => break,
                },
                _ => break,
            }
        }
        Err(GenerateError::UnexpectedValue {
            field: label.to_string(),
            expected: "a constant",
            found: value.kind_name(),
        })
    }

    fn render_sequence(
        &self,
        label: &str,
        elem: &GoType,
        items: &[Value],
        indent: &str,
        depth: usize,
    ) -> Result<String> {
        if items.is_empty() {
            return Ok("[]".to_string());
        }
        let elem_indent = format!("{indent}\t");
        let rendered = items
            .iter()
            .map(|item| {
                let literal = self.render_element(label, elem, item, &elem_indent, depth)?;
                Ok(format!("{elem_indent}{literal}"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("[\n{}\n{indent}]", rendered.join(",\n")))
    }

    fn render_map(
        &self,
        label: &str,
        elem: &GoType,
        entries: &OrderedMap<Value>,
        indent: &str,
        depth: usize,
    ) -> Result<String> {
        if entries.is_empty() {
            return Ok("{}".to_string());
        }
        let elem_indent = format!("{indent}\t");
        let rendered = entries
            .iter()
            .map(|(key, item)| {
                let literal = self.render_element(label, elem, item, &elem_indent, depth)?;
                let key = Constant::String(key.to_owned());
                Ok(format!("{elem_indent}{key}: {literal}"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("{{\n{}\n{indent}}}", rendered.join(",\n")))
    }

    /// Render an element of a sequence or a map value.
    fn render_element(
        &self,
        label: &str,
        elem: &GoType,
        item: &Value,
        indent: &str,
        depth: usize,
    ) -> Result<String> {
        match item {
            Value::Scalar(constant) => Ok(constant.to_string()),
            Value::Null => Ok("null".to_string()),
            Value::Object(_) => {
                let info = self.struct_for(elem.without_pointers())?;
                self.render_struct(info, Some(item), indent, false, &[], depth + 1)
            }
            Value::Sequence(_) | Value::Map(_) => {
                if depth >= MAX_DEPTH {
                    return Err(GenerateError::NestingTooDeep(label.to_string()));
                }
                self.render_single(label, elem, Some(item), None, indent, depth + 1)
            }
        }
    }

    /// Zero value of `ty`, as written when a field has no default.
    fn zero_value(&self, ty: &GoType, indent: &str, depth: usize) -> Result<String> {
        match ty {
            GoType::Basic(kind) => kind
                .zero()
                .map(|zero| zero.to_string())
                .ok_or_else(|| GenerateError::UnhandledZeroValue(ty.qualified_name())),
            GoType::Pointer(_) | GoType::Interface | GoType::Func | GoType::Chan(_) => Ok("null".to_string()),
            GoType::Slice(_) | GoType::Array(..) => Ok("[]".to_string()),
            GoType::Map(..) => Ok("{}".to_string()),
            GoType::Named(named) => {
                let qualified = named.qualified_name();
                if let Some(info) = self.registry.lookup_struct(&qualified) {
                    return self.render_struct(info, None, indent, false, &[], depth + 1);
                }
                match self.registry.lookup_underlying(&qualified) {
                    Some(underlying) => self.zero_value(underlying, indent, depth),
                    None => {
                        debug!(name = %qualified, "no zero value for opaque type, writing null");
                        Ok("null".to_string())
                    }
                }
            }
            GoType::Struct => Err(GenerateError::UnhandledZeroValue(ty.qualified_name())),
        }
    }

    fn lookup_struct(&self, ty: &GoType) -> Option<&'r StructInfo> {
        let named = ty.as_named()?;
        self.registry.lookup_struct(&named.qualified_name())
    }

    fn struct_for(&self, ty: &GoType) -> Result<&'r StructInfo> {
        self.lookup_struct(ty)
            .ok_or_else(|| GenerateError::UnresolvedStructure(ty.qualified_name()))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use jsoncgen_syntax::GoProgram;
    use tempfile::TempDir;

    use super::*;

    fn module(source: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("go.mod"), "module example.com/render\n").unwrap();
        fs::write(dir.path().join("render.go"), source).unwrap();
        dir
    }

    fn render(source: &str, name: &str, doc_types: DocTypes) -> Result<String> {
        let dir = module(source);
        let program = GoProgram::new();
        let mut registry = Registry::new(&program);
        let path = registry.extract(dir.path(), Some(name))?.package.path.clone();
        let info = registry
            .lookup_struct(&format!("{path}.{name}"))
            .unwrap()
            .clone();
        Renderer::new(&registry, doc_types).render(&info)
    }

    #[test]
    fn later_field_wins_over_earlier_one() {
        let source = "package render\n\n\
                      type Base struct {\n\tName string\n\tLevel int\n}\n\n\
                      type Config struct {\n\tBase\n\tName string\n}\n\n\
                      func ConfigDefaults() *Config {\n\treturn &Config{Name: \"own\", Base: Base{Name: \"base\", Level: 2}}\n}\n";
        let out = render(source, "Config", DocTypes::NOT_FIELDS).unwrap();
        assert_eq!(out, "{\n\t\"Level\": 2,\n\t\"Name\": \"own\"\n}");
    }

    #[test]
    fn embedded_map_is_rejected() {
        let source = "package render\n\n\
                      type Labels map[string]string\n\n\
                      type Config struct {\n\tLabels\n}\n";
        let err = render(source, "Config", DocTypes::ALL_FIELDS).unwrap_err();
        assert!(matches!(err, GenerateError::EmbeddedCollection(_)), "{err:?}");
    }

    #[test]
    fn named_collection_uses_its_underlying_type() {
        let source = "package render\n\n\
                      type Tags []string\n\n\
                      type Config struct {\n\tTags Tags\n}\n\n\
                      func ConfigDefaults() *Config {\n\treturn &Config{Tags: Tags{\"a\", \"b\"}}\n}\n";
        let out = render(source, "Config", DocTypes::NOT_FIELDS).unwrap();
        assert_eq!(out, "{\n\t\"Tags\": [\n\t\t\"a\",\n\t\t\"b\"\n\t]\n}");
    }

    #[test]
    fn map_keys_are_quoted_in_order() {
        let source = "package render\n\n\
                      type Config struct {\n\tLimits map[string]int\n}\n\n\
                      func ConfigDefaults() *Config {\n\treturn &Config{Limits: map[string]int{\"max\": 3, \"say \\\"hi\\\"\": 1}}\n}\n";
        let out = render(source, "Config", DocTypes::NOT_FIELDS).unwrap();
        assert_eq!(out, "{\n\t\"Limits\": {\n\t\t\"max\": 3,\n\t\t\"say \\\"hi\\\"\": 1\n\t}\n}");
    }

    #[test]
    fn empty_struct_renders_braces() {
        let source = "package render\n\ntype Empty struct{}\n";
        assert_eq!(render(source, "Empty", DocTypes::ALL_FIELDS).unwrap(), "{\n}");
    }
}
