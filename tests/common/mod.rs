//! Builders for hand-written program dumps.

#![allow(dead_code)]

use exhaustruct::comment::CommentGroup;
use exhaustruct::config::Config;
use exhaustruct::structure::{FieldDecl, RecordType, TypeId};
use exhaustruct::syntax::{Element, Node, NodeId, NodeKind, ReturnValue, Span, TypeRef};
use exhaustruct::{Package, Program, Runner, SourceFile};
use exhaustruct::LiteralSite;

/// A record type; fields are written `name` or `name exhaustruct:"optional"`.
pub fn record(package_path: &str, name: Option<&str>, fields: &[&str]) -> RecordType {
    let package_name = package_path.rsplit('/').next().unwrap_or(package_path);
    RecordType {
        name: name.map(str::to_string),
        package_name: package_name.to_string(),
        package_path: package_path.to_string(),
        fields: fields
            .iter()
            .map(|f| match f.split_once(' ') {
                Some((name, tag)) => FieldDecl::tagged(name, tag),
                None => FieldDecl::new(f),
            })
            .collect(),
        comments: vec![],
    }
}

/// Builder for a literal site inside a function body.
///
/// Every node sits on its own line range; by default a literal occupies
/// columns 6..20 of its start line.
pub struct Lit {
    site: LiteralSite,
    next_id: u32,
}

impl Lit {
    pub fn new(id: u32, ty: u32, line: usize) -> Self {
        let file = Node::new(1, Span::on_line(1, 1, 1), NodeKind::File);
        let func = Node::new(
            2,
            Span::new(
                exhaustruct::syntax::Position::new(line.saturating_sub(1).max(1), 1),
                exhaustruct::syntax::Position::new(line + 20, 2),
            ),
            NodeKind::FuncDecl { results: vec![] },
        );
        Self {
            site: LiteralSite {
                id: NodeId(id),
                span: Span::on_line(line, 6, 20),
                ty: Some(TypeId(ty)),
                elements: vec![],
                ancestors: vec![file, func],
            },
            next_id: id * 100,
        }
    }

    /// Literal of a non-struct type.
    pub fn untyped(mut self) -> Self {
        self.site.ty = None;
        self
    }

    pub fn keys(mut self, keys: &[&str]) -> Self {
        self.site.elements = keys.iter().map(|k| Element::keyed(k)).collect();
        self
    }

    pub fn positional(mut self, n: usize) -> Self {
        self.site.elements = vec![Element::positional(); n];
        self
    }

    /// Place the literal at an explicit span.
    pub fn span(mut self, span: Span) -> Self {
        self.site.span = span;
        self
    }

    /// Declared results of the enclosing function.
    pub fn returns(mut self, results: Vec<TypeRef>) -> Self {
        self.site.ancestors[1].kind = NodeKind::FuncDecl { results };
        self
    }

    /// Push an enclosing node spanning the literal's lines.
    pub fn inside(self, kind: NodeKind) -> Self {
        let span = Span::new(
            exhaustruct::syntax::Position::new(self.site.span.start.line, 2),
            self.site.span.end,
        );
        self.inside_at(kind, span)
    }

    /// Push an enclosing node with an explicit span.
    pub fn inside_at(mut self, kind: NodeKind, span: Span) -> Self {
        self.next_id += 1;
        self.site.ancestors.push(Node::new(self.next_id, span, kind));
        self
    }

    pub fn id(&self) -> NodeId {
        self.site.id
    }

    pub fn build(self) -> LiteralSite {
        self.site
    }
}

pub fn assign() -> NodeKind {
    NodeKind::Assign { define: false }
}

pub fn define() -> NodeKind {
    NodeKind::Assign { define: true }
}

/// A `return` node from (node id, static type) pairs.
pub fn ret(values: &[(NodeId, TypeRef)]) -> NodeKind {
    NodeKind::Return {
        results: values
            .iter()
            .map(|(node, ty)| ReturnValue {
                node: *node,
                ty: ty.clone(),
            })
            .collect(),
    }
}

pub fn concrete_error(name: &str) -> TypeRef {
    TypeRef {
        name: name.to_string(),
        implements_error: true,
    }
}

pub fn file(path: &str, comments: Vec<CommentGroup>, literals: Vec<LiteralSite>) -> SourceFile {
    SourceFile {
        path: path.to_string(),
        comments: Some(comments),
        literals,
    }
}

pub fn package(path: &str, files: Vec<SourceFile>) -> Package {
    Package {
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        path: path.to_string(),
        files,
    }
}

/// Check a program and render diagnostics as `file:line: message`.
pub fn check(config: Config, types: Vec<RecordType>, packages: Vec<Package>) -> Vec<String> {
    let settings = config.prepare().expect("valid config");
    let program = Program { types, packages };
    let result = Runner::new(settings).check_program(program, None);
    result
        .diagnostics
        .iter()
        .map(|d| format!("{}:{}: {}", d.file, d.line, d.message))
        .collect()
}
