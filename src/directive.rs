//! Resolution of the directive that applies to one literal.

use crate::comment::{CommentIndex, Directive};
use crate::syntax::{LiteralSite, NodeKind};

/// Resolve the active directive for a literal.
///
/// A directive bound to the literal itself wins. Otherwise the ancestors are
/// walked upward through wrapping nodes (return, call, index, unary,
/// assignment, declarations, key-value); the walk stops at the first
/// enclosing composite literal or any other opaque node, so a directive
/// never leaks between literals.
pub fn resolve(site: &LiteralSite, comments: &CommentIndex) -> Directive {
    let own = comments.directive_for(&site.span);
    if own.is_specified() {
        return own;
    }

    for ancestor in site.ancestors.iter().rev() {
        if matches!(ancestor.kind, NodeKind::CompositeLit) {
            return Directive::Unspecified;
        }
        if !ancestor.kind.is_directive_transparent() {
            return Directive::Unspecified;
        }

        let directive = comments.directive_for(&ancestor.span);
        if directive.is_specified() {
            return directive;
        }
    }

    Directive::Unspecified
}
