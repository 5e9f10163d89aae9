//! Empty literals returned next to a non-nil error.
//!
//! `return T{}, err` is the usual way to bail out of a function, and the
//! zero value is expected there. The check is syntactic: it recognizes the
//! shape of the return statement and the declared result types, nothing more.

use crate::syntax::{LiteralSite, NodeKind};

/// Whether an empty literal is exempt because it is returned alongside an error.
///
/// The literal must be a direct result of a `return`. The statement is exempt
/// when some result has the `error` interface as its static type, or when a
/// non-nil result other than the literal itself sits in a position the
/// enclosing function declares as an error. A literal occupying the error slot
/// is never exempted by its own position.
pub fn is_exempt_empty_return(site: &LiteralSite) -> bool {
    let results = match site.parent().map(|n| &n.kind) {
        Some(NodeKind::Return { results }) => results,
        _ => return false,
    };

    // Errors conventionally come last.
    if results.iter().rev().any(|r| r.ty.is_error_interface()) {
        return true;
    }

    let declared = match site.enclosing_function().and_then(|f| f.kind.declared_results()) {
        Some(declared) => declared,
        None => return false,
    };

    results.iter().enumerate().any(|(i, r)| {
        if r.ty.is_untyped_nil() {
            return false;
        }
        let error_slot = declared.get(i).map(|t| t.is_error_like()).unwrap_or(false);
        error_slot && r.node != site.id
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::TypeId;
    use crate::syntax::{Node, NodeId, ReturnValue, Span, TypeRef};

    const LIT: u32 = 50;

    fn ret(values: Vec<(u32, TypeRef)>) -> NodeKind {
        NodeKind::Return {
            results: values
                .into_iter()
                .map(|(id, ty)| ReturnValue { node: NodeId(id), ty })
                .collect(),
        }
    }

    fn site(declared: Vec<TypeRef>, tail: Vec<NodeKind>) -> LiteralSite {
        let mut ancestors = vec![
            Node::new(1, Span::on_line(1, 1, 1), NodeKind::File),
            Node::new(2, Span::on_line(3, 1, 1), NodeKind::FuncDecl { results: declared }),
        ];
        for (i, kind) in tail.into_iter().enumerate() {
            ancestors.push(Node::new(10 + i as u32, Span::on_line(4, 2, 30), kind));
        }
        LiteralSite {
            id: NodeId(LIT),
            span: Span::on_line(4, 9, 15),
            ty: Some(TypeId(0)),
            elements: vec![],
            ancestors,
        }
    }

    fn concrete_error(name: &str) -> TypeRef {
        TypeRef {
            name: name.to_string(),
            implements_error: true,
        }
    }

    #[test]
    fn test_error_interface_result_exempts() {
        // return Test{}, someErr
        let s = site(
            vec![TypeRef::named("Test"), TypeRef::error()],
            vec![ret(vec![(LIT, TypeRef::named("pkg.Test")), (51, TypeRef::error())])],
        );
        assert!(is_exempt_empty_return(&s));
    }

    #[test]
    fn test_nil_error_does_not_exempt() {
        // return Test{}, nil
        let s = site(
            vec![TypeRef::named("Test"), TypeRef::error()],
            vec![ret(vec![(LIT, TypeRef::named("pkg.Test")), (51, TypeRef::untyped_nil())])],
        );
        assert!(!is_exempt_empty_return(&s));
    }

    #[test]
    fn test_declared_error_slot_exempts_sibling() {
        // func f() (Test, error) { return Test{}, &BError{} }
        let s = site(
            vec![TypeRef::named("Test"), TypeRef::error()],
            vec![ret(vec![
                (LIT, TypeRef::named("pkg.Test")),
                (51, concrete_error("*pkg.BError")),
            ])],
        );
        assert!(is_exempt_empty_return(&s));
    }

    #[test]
    fn test_concrete_declared_error_exempts_sibling() {
        // func f() (Test, *AError) { return Test{}, &AError{} }
        let s = site(
            vec![TypeRef::named("Test"), concrete_error("*pkg.AError")],
            vec![ret(vec![
                (LIT, TypeRef::named("pkg.Test")),
                (51, concrete_error("*pkg.AError")),
            ])],
        );
        assert!(is_exempt_empty_return(&s));
    }

    #[test]
    fn test_literal_in_error_slot_not_exempt() {
        // func f() (Test, error) { return Test{A: ""}, BError{} }
        let s = site(
            vec![TypeRef::named("Test"), TypeRef::error()],
            vec![ret(vec![
                (49, TypeRef::named("pkg.Test")),
                (LIT, concrete_error("pkg.BError")),
            ])],
        );
        assert!(!is_exempt_empty_return(&s));
    }

    #[test]
    fn test_parent_must_be_return() {
        // return []Test{{}}, err - the inner literal's parent is a literal
        let s = site(
            vec![TypeRef::named("[]Test"), TypeRef::error()],
            vec![
                ret(vec![(60, TypeRef::named("[]pkg.Test")), (51, TypeRef::error())]),
                NodeKind::CompositeLit,
            ],
        );
        assert!(!is_exempt_empty_return(&s));

        // return &BError{} - address-of is not looked through
        let s = site(
            vec![TypeRef::error()],
            vec![ret(vec![(60, concrete_error("*pkg.BError"))]), NodeKind::Unary],
        );
        assert!(!is_exempt_empty_return(&s));
    }

    #[test]
    fn test_mismatched_result_count() {
        // return Test{}, helper() where the declared list is shorter
        let s = site(
            vec![TypeRef::named("Test")],
            vec![ret(vec![(LIT, TypeRef::named("pkg.Test")), (51, TypeRef::named("int"))])],
        );
        assert!(!is_exempt_empty_return(&s));
    }
}
