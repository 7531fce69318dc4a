//! Tree-sitter adapters for the lichen engine.
//!
//! [`TreeSitterParser`] wraps a tree-sitter grammar behind the core
//! [`Parser`] trait: named nodes become engine nodes, leaves carry their
//! token text, and byte ranges carry over unchanged, so every engine span
//! slices the original buffer exactly.
//!
//! Tree-sitter recovers from syntax errors; the adapter instead rejects any
//! tree containing errors, because rules matching over recovered garbage
//! produce junk findings and unsafe edits.

use lichen_core::{Node, ParseError, Parser, SourceText, Span, SyntaxTree};

/// A grammar paired with a display name. Cheap to share across threads;
/// each parse call sets up its own tree-sitter parser.
pub struct TreeSitterParser {
    language: tree_sitter::Language,
    name: &'static str,
}

impl TreeSitterParser {
    pub fn new(name: &'static str, language: tree_sitter::Language) -> Self {
        Self { language, name }
    }

    /// Ruby via the statically linked grammar.
    pub fn ruby() -> Self {
        Self::new("ruby", tree_sitter_ruby::LANGUAGE.into())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Parser for TreeSitterParser {
    fn parse(&self, source: &SourceText) -> Result<SyntaxTree, ParseError> {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&self.language).map_err(|err| {
            ParseError::new(
                source.origin(),
                format!("cannot load {} grammar: {}", self.name, err),
            )
        })?;

        let tree = parser.parse(source.as_str(), None).ok_or_else(|| {
            ParseError::new(
                source.origin(),
                format!("{} parser produced no tree", self.name),
            )
        })?;

        let root = tree.root_node();
        if root.has_error() {
            let (line, column) = source.line_col(first_error_byte(root));
            return Err(ParseError::new(
                source.origin(),
                format!("{} syntax error at {}:{}", self.name, line, column),
            ));
        }

        SyntaxTree::new(convert(root, source.as_str())).map_err(|message| {
            ParseError::new(
                source.origin(),
                format!("non-canonical {} tree: {}", self.name, message),
            )
        })
    }
}

/// Convert a named tree-sitter node: named children recurse, childless
/// nodes become leaves carrying their token text.
fn convert(node: tree_sitter::Node<'_>, text: &str) -> Node {
    let span = Span::new(node.start_byte(), node.end_byte());
    let mut cursor = node.walk();
    let children: Vec<Node> = node
        .named_children(&mut cursor)
        .map(|child| convert(child, text))
        .collect();
    if children.is_empty() {
        let value = text.get(node.start_byte()..node.end_byte()).unwrap_or("");
        Node::leaf(node.kind(), span, value)
    } else {
        Node::branch(node.kind(), span, children)
    }
}

/// Start byte of the first error or missing node, for the diagnostic.
fn first_error_byte(root: tree_sitter::Node<'_>) -> usize {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return node.start_byte();
        }
        let mut cursor = node.walk();
        let mut children: Vec<_> = node.children(&mut cursor).collect();
        children.reverse();
        stack.extend(children);
    }
    root.start_byte()
}
