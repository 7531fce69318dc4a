//! The read-only syntax tree model and the external-parser seam.
//!
//! The engine owns its node model instead of exposing a parser library's
//! node handles. Adapters build a [`SyntaxTree`] once per pass; the engine
//! only reads it and throws it away after producing a rewritten buffer.

use crate::{ParseError, SourceText, Span};

/// One syntax construct: a kind tag, a span, exclusively-owned children, and
/// an optional leaf payload (the token's source text).
///
/// Invariants, checked by [`SyntaxTree::new`]: a node's span contains every
/// child's span, and sibling spans are ordered and disjoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: String,
    span: Span,
    value: Option<String>,
    children: Vec<Node>,
}

impl Node {
    /// A leaf node carrying its token text.
    pub fn leaf(kind: impl Into<String>, span: Span, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            span,
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    /// An interior node owning its children.
    pub fn branch(kind: impl Into<String>, span: Span, children: Vec<Node>) -> Self {
        Self {
            kind: kind.into(),
            span,
            value: None,
            children,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Leaf payload: identifier text, literal text, and so on.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order traversal of this node and everything below it.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    fn check_invariants(&self) -> Result<(), String> {
        let mut prev_end: Option<usize> = None;
        for child in &self.children {
            if !self.span.covers(child.span) {
                return Err(format!(
                    "child `{}` at {} escapes parent `{}` at {}",
                    child.kind, child.span, self.kind, self.span
                ));
            }
            if let Some(end) = prev_end {
                if child.span.start < end {
                    return Err(format!(
                        "sibling `{}` at {} overlaps the previous sibling ending at {}",
                        child.kind, child.span, end
                    ));
                }
            }
            prev_end = Some(child.span.end);
            child.check_invariants()?;
        }
        Ok(())
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// An immutable tree produced by an external parser for one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    root: Node,
}

impl SyntaxTree {
    /// Wrap a root node, checking the span invariants. Adapters map the
    /// error into a [`ParseError`]; a tree that fails here is a parser bug,
    /// not an input problem.
    pub fn new(root: Node) -> Result<Self, String> {
        root.check_invariants()?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }
}

/// The external-parser collaborator: text in, tree out.
///
/// Implemented by `lichen-languages` for tree-sitter grammars; closures with
/// the same shape work too, which keeps engine tests free of any grammar.
pub trait Parser {
    fn parse(&self, source: &SourceText) -> Result<SyntaxTree, ParseError>;
}

impl<F> Parser for F
where
    F: Fn(&SourceText) -> Result<SyntaxTree, ParseError>,
{
    fn parse(&self, source: &SourceText) -> Result<SyntaxTree, ParseError> {
        self(source)
    }
}
