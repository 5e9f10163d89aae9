//! Comment extraction from Go source files.
//!
//! Used when a program dump does not carry a file's comments. Comments are
//! grouped the way the Go parser groups them: consecutive comments with
//! nothing but whitespace and at most one line break between them. A comment
//! that follows code on its line starts a group that ends with that line.

use std::path::Path;

use crate::comment::CommentGroup;

#[cfg(feature = "tree-sitter")]
mod treesitter {
    use once_cell::sync::Lazy;
    use streaming_iterator::StreamingIterator;
    use tree_sitter::{Language, Parser as TsParser, Query, QueryCursor};

    use crate::comment::{Comment, CommentGroup};
    use crate::syntax::{Position, Span};

    const COMMENT_QUERY: &str = "(comment) @comment";

    static GO: Lazy<Language> = Lazy::new(|| tree_sitter_go::LANGUAGE.into());

    pub fn parse_comment_groups(source: &[u8]) -> anyhow::Result<Vec<CommentGroup>> {
        let mut parser = TsParser::new();
        parser.set_language(&GO)?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse source"))?;

        let query = Query::new(&GO, COMMENT_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, tree.root_node(), source);

        let mut groups: Vec<CommentGroup> = Vec::new();
        let mut last_end_byte = 0;
        // The open group follows code on its first line and only takes
        // comments on that same line.
        let mut trailing = false;

        while let Some(m) = matches.next() {
            for capture in m.captures {
                let node = capture.node;
                let range = node.byte_range();
                let text = String::from_utf8_lossy(&source[range.clone()]);
                let start = node.start_position();
                let end = node.end_position();
                let comment = Comment::new(
                    text.trim_end(),
                    Span::new(
                        Position::new(start.row + 1, start.column + 1),
                        Position::new(end.row + 1, end.column + 1),
                    ),
                );

                let joins_previous = groups.last().map_or(false, |group| {
                    let gap = source.get(last_end_byte..range.start).unwrap_or(&[]);
                    let max_line = if trailing {
                        group.end().line
                    } else {
                        group.end().line + 1
                    };
                    comment.span.start.line <= max_line && gap.iter().all(u8::is_ascii_whitespace)
                });

                match groups.last_mut() {
                    Some(group) if joins_previous => group.comments.push(comment),
                    _ => {
                        trailing = follows_code(source, last_end_byte, range.start);
                        groups.push(CommentGroup::new(vec![comment]));
                    }
                }
                last_end_byte = range.end;
            }
        }

        Ok(groups)
    }

    /// Whether code precedes `start` on its line, looking back no further
    /// than `floor`.
    fn follows_code(source: &[u8], floor: usize, start: usize) -> bool {
        let line_start = source[..start]
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(0, |i| i + 1);
        source[line_start.max(floor)..start]
            .iter()
            .any(|b| !b.is_ascii_whitespace())
    }
}

/// Extract comment groups from Go source text.
#[cfg(feature = "tree-sitter")]
pub fn parse_comment_groups(source: &[u8]) -> anyhow::Result<Vec<CommentGroup>> {
    treesitter::parse_comment_groups(source)
}

/// Extract comment groups from Go source text.
///
/// Without the `tree-sitter` feature no comments can be recovered.
#[cfg(not(feature = "tree-sitter"))]
pub fn parse_comment_groups(_source: &[u8]) -> anyhow::Result<Vec<CommentGroup>> {
    log::debug!("built without tree-sitter, source comments unavailable");
    Ok(Vec::new())
}

/// Read a Go file and extract its comment groups.
pub fn load_comment_groups(path: &Path) -> anyhow::Result<Vec<CommentGroup>> {
    let source = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
    parse_comment_groups(&source)
}
