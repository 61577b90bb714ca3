use jsoncgen_syntax::Constant;
use rustc_hash::FxHashMap;

use crate::ordered::OrderedMap;

/// A default value mined from a `<Name>Defaults` literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Constant leaf.
    Scalar(Constant),
    /// Slice or array literal.
    Sequence(Vec<Value>),
    /// Map literal, in literal order.
    Map(OrderedMap<Value>),
    /// Struct literal keyed by Go field name.
    Object(FxHashMap<String, Value>),
    /// `nil`, and the zero value of pointer-like fields.
    Null,
}

impl Value {
    /// Shape name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "a constant",
            Value::Sequence(_) => "a sequence",
            Value::Map(_) => "a map",
            Value::Object(_) => "a struct",
            Value::Null => "nil",
        }
    }

    pub fn as_object(&self) -> Option<&FxHashMap<String, Value>> {
        match self {
            Value::Object(fields) => Some(fields),
            _ => None,
        }
    }
}
