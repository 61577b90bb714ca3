use jsoncgen_syntax::{
    CompositeLit, Constant, Expr, FuncDecl, GoType, Package, SourceProvider,
};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::MAX_DEPTH;
use crate::error::{GenerateError, Result};
use crate::model::StructInfo;
use crate::ordered::OrderedMap;
use crate::value::Value;

/// Read the literal returned by `func <Name>Defaults() *<Name>`.
///
/// Returns `None` when the package has no such function, or when its body
/// holds no `<Name>{...}` literal.
pub fn parse_defaults(
    provider: &dyn SourceProvider,
    pkg: &Package,
    info: &StructInfo,
) -> Result<Option<Value>> {
    let function = format!("{}Defaults", info.name);
    let target = GoType::named(info.package.clone(), info.name.clone());

    let Some((file, func)) = pkg.functions().find(|(_, func)| func.name == function) else {
        debug!(function = %function, "no defaults function");
        return Ok(None);
    };

    let result = match func.results.as_slice() {
        [only] if only.names.len() <= 1 => Some(provider.resolve_type(pkg, file, &only.ty)?),
        _ => None,
    };
    let valid = func.recv.is_none()
        && func.params.is_empty()
        && result == Some(GoType::Pointer(Box::new(target.clone())));
    if !valid {
        return Err(GenerateError::InvalidDefaultsSignature {
            expected: format!("func {function}() *{}", target.qualified_name()),
            found: describe_signature(func, result.as_ref()),
        });
    }

    let literal = func
        .find_composite_literal(&info.name)
        .map_err(|error| error.in_file(&pkg.files[file].path))?;
    let Some(literal) = literal else {
        debug!(function = %function, "defaults function returns no literal");
        return Ok(None);
    };

    let parser = LiteralParser {
        provider,
        pkg,
        file,
        function: &function,
    };
    parser.composite(&literal, Some(&target), 0).map(Some)
}

fn describe_signature(func: &FuncDecl, result: Option<&GoType>) -> String {
    let recv = if func.recv.is_some() { "(...) " } else { "" };
    let params = if func.params.is_empty() { "" } else { "..." };
    let results = match result {
        Some(ty) => format!(" {ty}"),
        None if func.results.is_empty() => String::new(),
        None => {
            let types: Vec<String> = func.results.iter().map(|field| field.ty.to_source()).collect();
            format!(" ({})", types.join(", "))
        }
    };
    format!("func {recv}{}({params}){results}", func.name)
}

/// Turns composite literals of one defaults function into values.
struct LiteralParser<'a> {
    provider: &'a dyn SourceProvider,
    pkg: &'a Package,
    file: usize,
    function: &'a str,
}

impl LiteralParser<'_> {
    fn unsupported(&self, detail: impl Into<String>) -> GenerateError {
        GenerateError::UnsupportedLiteral {
            function: self.function.to_string(),
            detail: detail.into(),
        }
    }

    /// Parse a literal; `hint` is the type implied by the enclosing literal
    /// when this one elides its type.
    fn composite(&self, lit: &CompositeLit, hint: Option<&GoType>, depth: usize) -> Result<Value> {
        if depth >= MAX_DEPTH {
            return Err(GenerateError::NestingTooDeep(self.function.to_string()));
        }

        let ty = match (&lit.ty, hint) {
            (Some(expr), _) => self.provider.resolve_type(self.pkg, self.file, expr)?,
            (None, Some(hint)) => hint.without_pointers().clone(),
            (None, None) => return Err(self.unsupported("literal without a type")),
        };

        match self.provider.underlying(&ty)? {
            Some(GoType::Slice(elem) | GoType::Array(_, elem)) => {
                let mut items = Vec::with_capacity(lit.elements.len());
                for element in &lit.elements {
                    if let Some(key) = &element.key {
                        return Err(self.unsupported(format!(
                            "indexed element {} in {}",
                            key.to_source(),
                            ty.short_name()
                        )));
                    }
                    items.push(self.element(&element.value, Some(&elem), depth)?);
                }
                Ok(Value::Sequence(items))
            }
            Some(GoType::Map(_, value_ty)) => {
                let mut map = OrderedMap::new();
                for element in &lit.elements {
                    let Some(key) = &element.key else {
                        return Err(self.unsupported(format!("map element without key in {}", ty.short_name())));
                    };
                    map.insert(self.map_key(key)?, self.element(&element.value, Some(&value_ty), depth)?);
                }
                Ok(Value::Map(map))
            }
            _ => {
                let mut fields = FxHashMap::default();
                for element in &lit.elements {
                    let Some(Expr::Ident(name)) = &element.key else {
                        return Err(self.unsupported(format!(
                            "positional field value {} in {}",
                            element.value.to_source(),
                            ty.short_name()
                        )));
                    };
                    fields.insert(name.clone(), self.element(&element.value, None, depth)?);
                }
                Ok(Value::Object(fields))
            }
        }
    }

    fn element(&self, expr: &Expr, hint: Option<&GoType>, depth: usize) -> Result<Value> {
        match expr {
            Expr::Composite(lit) => self.composite(lit, hint, depth + 1),
            Expr::Unary("&", inner) => match inner.as_ref() {
                Expr::Composite(lit) => self.composite(lit, hint, depth + 1),
                _ => Err(self.unsupported(format!("address of {}", inner.to_source()))),
            },
            Expr::Paren(inner) => self.element(inner, hint, depth),
            Expr::Ident(name) if name == "nil" => Ok(Value::Null),
            _ => self.constant(expr).map(Value::Scalar),
        }
    }

    fn constant(&self, expr: &Expr) -> Result<Constant> {
        self.provider
            .eval_const(self.pkg, self.file, expr)
            .map(|typed| typed.value)
            .map_err(|error| self.unsupported(format!("{}: {error}", expr.to_source())))
    }

    /// String keys stay unquoted here; other constants use their literal
    /// form.
    fn map_key(&self, key: &Expr) -> Result<String> {
        Ok(match self.constant(key)? {
            Constant::String(key) => key,
            other => other.to_string(),
        })
    }
}
