//! Resolved Go types.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

use crate::constant::Constant;

/// Predeclared basic types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    UnsafePointer,
}

impl BasicKind {
    /// Look up a predeclared type name; `byte` and `rune` are aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "bool" => Self::Bool,
            "int" => Self::Int,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" | "rune" => Self::Int32,
            "int64" => Self::Int64,
            "uint" => Self::Uint,
            "uint8" | "byte" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "uintptr" => Self::Uintptr,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "complex64" => Self::Complex64,
            "complex128" => Self::Complex128,
            "string" => Self::String,
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::String => "string",
            Self::UnsafePointer => "unsafe.Pointer",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Int
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Uint
                | Self::Uint8
                | Self::Uint16
                | Self::Uint32
                | Self::Uint64
                | Self::Uintptr
        )
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            Self::Uint | Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64 | Self::Uintptr
        )
    }

    /// Width in bits of fixed-size integer kinds.
    pub fn bits(self) -> Option<u32> {
        match self {
            Self::Int8 | Self::Uint8 => Some(8),
            Self::Int16 | Self::Uint16 => Some(16),
            Self::Int32 | Self::Uint32 => Some(32),
            Self::Int64 | Self::Uint64 | Self::Int | Self::Uint | Self::Uintptr => Some(64),
            _ => None,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    pub fn is_complex(self) -> bool {
        matches!(self, Self::Complex64 | Self::Complex128)
    }

    /// Zero value, `None` for kinds without a constant zero.
    pub fn zero(self) -> Option<Constant> {
        if self.is_integer() {
            Some(Constant::Int(BigInt::zero()))
        } else if self.is_float() {
            Some(Constant::Float(BigRational::zero()))
        } else if self.is_complex() {
            Some(Constant::Complex(BigRational::zero(), BigRational::zero()))
        } else {
            match self {
                Self::Bool => Some(Constant::Bool(false)),
                Self::String => Some(Constant::String(String::new())),
                _ => None,
            }
        }
    }
}

/// A declared (named) type, identified by package path and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedType {
    pub package: String,
    pub name: String,
}

impl NamedType {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// `path/to/pkg.Name`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.package, self.name)
    }

    /// `pkg.Name`, using the last element of the package path.
    pub fn short_name(&self) -> String {
        let package = self.package.rsplit('/').next().unwrap_or(&self.package);
        format!("{package}.{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GoType {
    Basic(BasicKind),
    Named(NamedType),
    Pointer(Box<GoType>),
    Slice(Box<GoType>),
    Array(Option<u64>, Box<GoType>),
    Map(Box<GoType>, Box<GoType>),
    /// Anonymous struct type.
    Struct,
    Interface,
    Func,
    Chan(Box<GoType>),
}

impl GoType {
    pub fn named(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named(NamedType::new(package, name))
    }

    /// Strip any number of pointer indirections.
    pub fn without_pointers(&self) -> &GoType {
        match self {
            GoType::Pointer(inner) => inner.without_pointers(),
            other => other,
        }
    }

    pub fn as_named(&self) -> Option<&NamedType> {
        match self {
            GoType::Named(named) => Some(named),
            _ => None,
        }
    }

    pub fn as_basic(&self) -> Option<BasicKind> {
        match self {
            GoType::Basic(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Fully qualified spelling, e.g. `[]example.com/app/net.State`.
    pub fn qualified_name(&self) -> String {
        self.spell(&NamedType::qualified_name)
    }

    /// Spelling with packages shortened to their last path element,
    /// e.g. `[]net.State`.
    pub fn short_name(&self) -> String {
        self.spell(&NamedType::short_name)
    }

    fn spell(&self, named: &dyn Fn(&NamedType) -> String) -> String {
        match self {
            GoType::Basic(kind) => kind.name().to_string(),
            GoType::Named(ty) => named(ty),
            GoType::Pointer(inner) => format!("*{}", inner.spell(named)),
            GoType::Slice(elem) => format!("[]{}", elem.spell(named)),
            GoType::Array(Some(len), elem) => format!("[{len}]{}", elem.spell(named)),
            GoType::Array(None, elem) => format!("[...]{}", elem.spell(named)),
            GoType::Map(key, value) => format!("map[{}]{}", key.spell(named), value.spell(named)),
            GoType::Struct => "struct{...}".to_string(),
            GoType::Interface => "interface{}".to_string(),
            GoType::Func => "func()".to_string(),
            GoType::Chan(elem) => format!("chan {}", elem.spell(named)),
        }
    }

    /// Every named type mentioned in this type.
    pub fn named_types(&self) -> Vec<&NamedType> {
        let mut found = Vec::new();
        self.collect_named(&mut found);
        found
    }

    fn collect_named<'a>(&'a self, found: &mut Vec<&'a NamedType>) {
        match self {
            GoType::Named(named) => found.push(named),
            GoType::Pointer(inner) | GoType::Slice(inner) | GoType::Array(_, inner) | GoType::Chan(inner) => {
                inner.collect_named(found)
            }
            GoType::Map(key, value) => {
                key.collect_named(found);
                value.collect_named(found);
            }
            GoType::Basic(_) | GoType::Struct | GoType::Interface | GoType::Func => {}
        }
    }
}

impl fmt::Display for GoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spells_types() {
        let state = GoType::named("example.com/app/network", "State");
        let ty = GoType::Map(
            Box::new(GoType::Basic(BasicKind::String)),
            Box::new(GoType::Slice(Box::new(state.clone()))),
        );
        assert_eq!(ty.short_name(), "map[string][]network.State");
        assert_eq!(ty.qualified_name(), "map[string][]example.com/app/network.State");
        assert_eq!(ty.named_types(), vec![state.as_named().unwrap()]);
    }

    #[test]
    fn aliases_resolve_to_kinds() {
        assert_eq!(BasicKind::from_name("byte"), Some(BasicKind::Uint8));
        assert_eq!(BasicKind::from_name("rune"), Some(BasicKind::Int32));
        assert_eq!(BasicKind::from_name("error"), None);
    }

    #[test]
    fn zero_values() {
        assert_eq!(BasicKind::Bool.zero().unwrap().to_string(), "false");
        assert_eq!(BasicKind::Uint16.zero().unwrap().to_string(), "0");
        assert_eq!(BasicKind::Float32.zero().unwrap().to_string(), "0");
        assert_eq!(BasicKind::String.zero().unwrap().to_string(), "\"\"");
        assert!(BasicKind::UnsafePointer.zero().is_none());
    }

    #[test]
    fn deref_strips_pointers() {
        let ty = GoType::Pointer(Box::new(GoType::Pointer(Box::new(GoType::named("p", "T")))));
        assert_eq!(ty.without_pointers(), &GoType::named("p", "T"));
    }
}
