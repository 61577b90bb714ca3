//! Commented JSONC configuration files generated from Go struct declarations.
//!
//! This crate provides:
//! - A model of the structs, fields and typed constants of a Go package and
//!   of the packages its fields refer to.
//! - Parsing of `<Name>Defaults()` factory functions into default values.
//! - A renderer writing the struct as tab-indented JSONC, fields documented
//!   with their doc comments, types and allowed values.
//!
//! ```no_run
//! use jsoncgen::DocTypes;
//!
//! let jsonc = jsoncgen::generate("./config", "Config", DocTypes::NOT_STRUCT_FIELDS)?;
//! println!("{jsonc}");
//! # Ok::<(), jsoncgen::GenerateError>(())
//! ```

pub mod error;
pub mod extract;
pub mod model;
pub mod options;
pub mod ordered;
pub mod registry;
pub mod render;
pub mod value;

use std::path::Path;

use jsoncgen_syntax::{GoProgram, SourceProvider};
use tracing::{debug, info};

pub use error::{ErrorKind, GenerateError, Result};
pub use model::{ConstantInfo, FieldInfo, FieldLayout, PackageModel, StructInfo};
pub use options::{DocTypes, ParseDocTypesError};
pub use ordered::OrderedMap;
pub use registry::Registry;
pub use render::Renderer;
pub use value::Value;

/// Deepest nesting of literals and structs followed before giving up.
pub const MAX_DEPTH: usize = 64;

/// Generate the JSONC document of struct `type_name` declared in the package
/// in `dir`.
///
/// Sources are loaded fresh for every call.
pub fn generate(dir: impl AsRef<Path>, type_name: &str, doc_types: DocTypes) -> Result<String> {
    let program = GoProgram::new();
    Generator::new(&program).generate(dir, type_name, doc_types)
}

/// Runs generations against a [`SourceProvider`].
///
/// Each call to [`Generator::generate`] uses its own [`Registry`]; the
/// provider may cache loaded packages across calls.
pub struct Generator<'p> {
    provider: &'p dyn SourceProvider,
}

impl<'p> Generator<'p> {
    pub fn new(provider: &'p dyn SourceProvider) -> Self {
        Self { provider }
    }

    /// Extract the package in `dir` and render `type_name`.
    pub fn generate(
        &self,
        dir: impl AsRef<Path>,
        type_name: &str,
        doc_types: DocTypes,
    ) -> Result<String> {
        let dir = dir.as_ref();
        info!(dir = %dir.display(), type_name, %doc_types, "generating");

        let mut registry = Registry::new(self.provider);
        let model = registry.extract(dir, Some(type_name))?;
        let package = model.package.path.clone();
        let qualified = format!("{package}.{type_name}");

        let info = registry
            .lookup_struct(&qualified)
            .ok_or_else(|| GenerateError::StructNotFound {
                name: type_name.to_string(),
                package,
            })?;
        debug!(name = %qualified, fields = info.fields.len(), "rendering");

        Renderer::new(&registry, doc_types).render(info)
    }
}
