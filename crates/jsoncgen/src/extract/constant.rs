use jsoncgen_syntax::{ConstDecl, text_of};

use crate::model::ConstantInfo;

impl ConstantInfo {
    pub fn from_decl(decl: &ConstDecl) -> Self {
        Self {
            name: decl.name.clone(),
            value: decl.value.value.clone(),
            doc: text_of(decl.doc.as_ref()) + &text_of(decl.comment.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsoncgen_syntax::{CommentGroup, Constant, TypedConstant};

    #[test]
    fn merges_doc_and_comment() {
        let decl = ConstDecl {
            name: "Fast".into(),
            doc: Some(CommentGroup::new(vec!["// Fast mode.".into()])),
            comment: Some(CommentGroup::new(vec!["// may drop frames".into()])),
            value: TypedConstant::untyped(Constant::int(2)),
        };
        let info = ConstantInfo::from_decl(&decl);
        assert_eq!(info.name, "Fast");
        assert_eq!(info.value, Constant::int(2));
        assert_eq!(info.doc, "Fast mode.\nmay drop frames\n");
        assert_eq!(info.inline_doc(), "Fast mode. may drop frames");
    }
}
