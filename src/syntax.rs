//! Syntax facts supplied by the front end for each literal site.
//!
//! The front end resolves types and walks the tree; the engine only sees the
//! literal, its elements, and the stack of enclosing nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::structure::TypeId;

/// Stable identifier of a syntax node within one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

/// A source position (1-indexed line and byte column).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source span; `end` points just past the last character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Span within a single line.
    pub fn on_line(line: usize, start_col: usize, end_col: usize) -> Self {
        Self::new(Position::new(line, start_col), Position::new(line, end_col))
    }
}

/// Textual type of an expression or declared result, as the type checker prints it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    /// Whether the type has the error interface in its method set.
    #[serde(default)]
    pub implements_error: bool,
}

impl TypeRef {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            implements_error: false,
        }
    }

    /// The built-in `error` interface.
    pub fn error() -> Self {
        Self {
            name: "error".to_string(),
            implements_error: true,
        }
    }

    /// The literal `nil` constant.
    pub fn untyped_nil() -> Self {
        Self::named("untyped nil")
    }

    pub fn is_error_interface(&self) -> bool {
        self.name == "error"
    }

    pub fn is_untyped_nil(&self) -> bool {
        self.name == "untyped nil"
    }

    /// Error interface itself or a concrete type implementing it.
    pub fn is_error_like(&self) -> bool {
        self.is_error_interface() || self.implements_error
    }
}

/// One result expression of a `return` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnValue {
    pub node: NodeId,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

/// Kind of an ancestor node, carrying the facts the engine needs from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    File,
    FuncDecl {
        #[serde(default)]
        results: Vec<TypeRef>,
    },
    FuncLit {
        #[serde(default)]
        results: Vec<TypeRef>,
    },
    Return {
        #[serde(default)]
        results: Vec<ReturnValue>,
    },
    Call,
    Index,
    Unary,
    Paren,
    /// Assignment; `define` is true for `:=`.
    Assign {
        #[serde(default)]
        define: bool,
    },
    VarDecl,
    ValueSpec,
    KeyValue,
    CompositeLit,
    #[serde(other)]
    Other,
}

impl NodeKind {
    /// Nodes a directive may be attached to on behalf of a nested literal.
    pub fn is_directive_transparent(&self) -> bool {
        matches!(
            self,
            NodeKind::Return { .. }
                | NodeKind::Call
                | NodeKind::Index
                | NodeKind::Unary
                | NodeKind::Paren
                | NodeKind::Assign { .. }
                | NodeKind::VarDecl
                | NodeKind::ValueSpec
                | NodeKind::KeyValue
        )
    }

    /// Declared result types for function nodes.
    pub fn declared_results(&self) -> Option<&[TypeRef]> {
        match self {
            NodeKind::FuncDecl { results } | NodeKind::FuncLit { results } => Some(results),
            _ => None,
        }
    }
}

/// An ancestor of a literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub span: Span,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    pub fn new(id: u32, span: Span, kind: NodeKind) -> Self {
        Self {
            id: NodeId(id),
            span,
            kind,
        }
    }
}

/// One element of a literal; `key` is set for `Name: value` elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    #[serde(default)]
    pub key: Option<String>,
}

impl Element {
    pub fn keyed(key: &str) -> Self {
        Self {
            key: Some(key.to_string()),
        }
    }

    pub fn positional() -> Self {
        Self { key: None }
    }
}

/// A composite literal as visited by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteralSite {
    pub id: NodeId,
    pub span: Span,
    /// Resolved record type; absent when the literal is not a struct.
    #[serde(default, rename = "type")]
    pub ty: Option<TypeId>,
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Enclosing nodes from the file root down to the literal's parent.
    #[serde(default)]
    pub ancestors: Vec<Node>,
}

impl LiteralSite {
    pub fn parent(&self) -> Option<&Node> {
        self.ancestors.last()
    }

    /// The nearest enclosing function (declaration or literal).
    pub fn enclosing_function(&self) -> Option<&Node> {
        self.ancestors
            .iter()
            .rev()
            .find(|n| n.kind.declared_results().is_some())
    }
}

/// Syntactic position of a literal, used by the allow-empty rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralContext {
    /// Result of a `return` statement.
    Return,
    /// Right-hand side of `x := T{}` or `var x = T{}`.
    Declaration,
    Other,
}

impl LiteralContext {
    /// Classify a literal by its nearest non-wrapping ancestor.
    ///
    /// Address-of and parentheses are looked through, so `return &T{}` and
    /// `x := &T{}` classify the same as their bare forms.
    pub fn of(site: &LiteralSite) -> Self {
        let parent = site
            .ancestors
            .iter()
            .rev()
            .find(|n| !matches!(n.kind, NodeKind::Unary | NodeKind::Paren));

        match parent.map(|n| &n.kind) {
            Some(NodeKind::Return { .. }) => LiteralContext::Return,
            Some(NodeKind::Assign { define: true }) | Some(NodeKind::ValueSpec) => {
                LiteralContext::Declaration
            }
            _ => LiteralContext::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(ancestors: Vec<Node>) -> LiteralSite {
        LiteralSite {
            id: NodeId(100),
            span: Span::on_line(5, 5, 15),
            ty: Some(TypeId(0)),
            elements: vec![],
            ancestors,
        }
    }

    fn node(id: u32, kind: NodeKind) -> Node {
        Node::new(id, Span::on_line(5, 1, 20), kind)
    }

    #[test]
    fn test_context_return_through_unary() {
        let s = site(vec![
            node(1, NodeKind::File),
            node(2, NodeKind::FuncDecl { results: vec![] }),
            node(3, NodeKind::Return { results: vec![] }),
            node(4, NodeKind::Unary),
        ]);
        assert_eq!(LiteralContext::of(&s), LiteralContext::Return);
    }

    #[test]
    fn test_context_declaration_forms() {
        let define = site(vec![node(1, NodeKind::Assign { define: true })]);
        assert_eq!(LiteralContext::of(&define), LiteralContext::Declaration);

        let var = site(vec![node(1, NodeKind::VarDecl), node(2, NodeKind::ValueSpec)]);
        assert_eq!(LiteralContext::of(&var), LiteralContext::Declaration);

        let assign = site(vec![node(1, NodeKind::Assign { define: false })]);
        assert_eq!(LiteralContext::of(&assign), LiteralContext::Other);
    }

    #[test]
    fn test_context_nested_literal_is_other() {
        let s = site(vec![
            node(1, NodeKind::Return { results: vec![] }),
            node(2, NodeKind::CompositeLit),
        ]);
        assert_eq!(LiteralContext::of(&s), LiteralContext::Other);
    }

    #[test]
    fn test_node_kind_deserialize() {
        let json = r#"{"id": 7, "span": {"start": {"line": 1, "column": 1}, "end": {"line": 1, "column": 9}}, "kind": "assign", "define": true}"#;
        let n: Node = serde_json::from_str(json).unwrap();
        assert_eq!(n.id, NodeId(7));
        assert_eq!(n.kind, NodeKind::Assign { define: true });

        let json = r#"{"id": 8, "span": {"start": {"line": 1, "column": 1}, "end": {"line": 1, "column": 2}}, "kind": "block_stmt"}"#;
        let n: Node = serde_json::from_str(json).unwrap();
        assert_eq!(n.kind, NodeKind::Other);
    }

    #[test]
    fn test_type_ref_predicates() {
        assert!(TypeRef::error().is_error_interface());
        assert!(TypeRef::untyped_nil().is_untyped_nil());
        assert!(!TypeRef::untyped_nil().is_error_like());

        let concrete = TypeRef {
            name: "*pkg.MyErr".to_string(),
            implements_error: true,
        };
        assert!(!concrete.is_error_interface());
        assert!(concrete.is_error_like());
    }
}
