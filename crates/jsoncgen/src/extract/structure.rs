use jsoncgen_syntax::{Field, GenDecl, Package, SourceProvider, TypeSpec, text_of};

use crate::error::Result;
use crate::model::{FieldInfo, StructInfo};

impl StructInfo {
    /// Build the struct declared by `spec`, whose fields are `fields`.
    ///
    /// The declaration doc is only used when the declaration holds this
    /// single spec; in a `type ( ... )` group it describes the group.
    pub fn extract(
        provider: &dyn SourceProvider,
        pkg: &Package,
        file: usize,
        decl: &GenDecl,
        spec: &TypeSpec,
        fields: &[Field],
    ) -> Result<Self> {
        let mut doc = String::new();
        if decl.specs.len() == 1 {
            doc.push_str(&text_of(decl.doc.as_ref()));
        }
        doc.push_str(&text_of(spec.doc.as_ref()));
        doc.push_str(&text_of(spec.comment.as_ref()));

        let owner = format!("{}.{}", pkg.path, spec.name);
        let fields = fields
            .iter()
            .map(|field| FieldInfo::extract(provider, pkg, file, &owner, field))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            package: pkg.path.clone(),
            name: spec.name.clone(),
            doc,
            fields,
            defaults: None,
        })
    }
}
