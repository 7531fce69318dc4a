//! The pattern language: declarative node matchers compiled at
//! registration time.
//!
//! A pattern describes the shape of a subtree: a kind head with an ordered
//! child sequence, leaf value matchers, alternation, conjunction, negation,
//! any-order child membership, and positional captures. Compilation is the
//! only place a pattern can fail; matching never does.

use lichen_core::Node;
use regex::Regex;

/// A compiled node matcher.
pub struct NodePattern {
    pat: Pat,
    text: String,
}

/// Pattern text that failed to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError {
    /// Byte position in the pattern text.
    pub position: usize,
    pub message: String,
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "at byte {}: {}", self.position, self.message)
    }
}

impl std::error::Error for PatternError {}

#[derive(Debug)]
enum Pat {
    /// `_`
    Any,
    /// bare word: kind equality, any children
    Kind(String),
    /// `"text"`: leaf whose value equals the text
    Value(String),
    /// `/re/`: leaf whose value matches the regex
    ValueRegex(Regex),
    /// `(head item*)`: head matches the node, items match its children in
    /// order; `...` items absorb any run of children. On a leaf the payload
    /// stands in for the child list, so `(identifier "save")` matches the
    /// token by text.
    Tree { head: Box<Pat>, items: Vec<SeqItem> },
    /// `{a b}`: any alternative matches
    AnyOf(Vec<Pat>),
    /// `[a b]`: every part matches
    AllOf(Vec<Pat>),
    /// `!a`
    Not(Box<Pat>),
    /// `<a b>`: every part matches some child, any order, distinct children
    Contains(Vec<Pat>),
    /// `$a`: record the matched node
    Capture(Box<Pat>),
}

#[derive(Debug)]
enum SeqItem {
    One(Pat),
    /// `...`
    Gap,
}

impl NodePattern {
    /// Compile pattern text. Fails with [`PatternError`] on malformed
    /// input; a compiled pattern can always be evaluated.
    pub fn compile(text: &str) -> Result<Self, PatternError> {
        let tokens = lex(text)?;
        let mut parser = TokenStream {
            tokens: &tokens,
            pos: 0,
            end: text.len(),
        };
        let pat = parser.pattern()?;
        if let Some((at, _)) = parser.peek() {
            return Err(PatternError {
                position: *at,
                message: "trailing input after pattern".into(),
            });
        }
        Ok(Self {
            pat,
            text: text.to_string(),
        })
    }

    pub fn matches(&self, node: &Node) -> bool {
        let mut caps = Vec::new();
        eval(&self.pat, node, &mut caps)
    }

    /// Match and return the `$`-captured nodes in pattern order, or `None`
    /// when the node does not match.
    pub fn captures<'a>(&self, node: &'a Node) -> Option<Vec<&'a Node>> {
        let mut caps = Vec::new();
        if eval(&self.pat, node, &mut caps) {
            Some(caps)
        } else {
            None
        }
    }

    /// Kinds this pattern can possibly match, read off the head; `None`
    /// when the head does not pin the kind. Used as the dispatch hint.
    pub(crate) fn kind_hints(&self) -> Option<Vec<String>> {
        let mut kinds = Vec::new();
        if collect_kind_hints(&self.pat, &mut kinds) {
            Some(kinds)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Debug for NodePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodePattern({})", self.text)
    }
}

impl std::fmt::Display for NodePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

fn collect_kind_hints(pat: &Pat, kinds: &mut Vec<String>) -> bool {
    match pat {
        Pat::Kind(kind) => {
            if !kinds.contains(kind) {
                kinds.push(kind.clone());
            }
            true
        }
        Pat::Tree { head, .. } => collect_kind_hints(head, kinds),
        Pat::Capture(inner) => collect_kind_hints(inner, kinds),
        Pat::AnyOf(alts) => alts.iter().all(|alt| collect_kind_hints(alt, kinds)),
        // One pinned part is a sound over-approximation for a conjunction.
        Pat::AllOf(parts) => parts.iter().any(|part| collect_kind_hints(part, kinds)),
        _ => false,
    }
}

/// Evaluate a pattern. Captures pushed by failed branches are rolled back
/// so the final vector holds exactly the matched pattern's captures.
fn eval<'a>(pat: &Pat, node: &'a Node, caps: &mut Vec<&'a Node>) -> bool {
    match pat {
        Pat::Any => true,
        Pat::Kind(kind) => node.kind() == kind,
        Pat::Value(text) => node.value() == Some(text.as_str()),
        Pat::ValueRegex(re) => node.value().is_some_and(|v| re.is_match(v)),
        Pat::Not(inner) => {
            let mut scratch = Vec::new();
            !eval(inner, node, &mut scratch)
        }
        Pat::Capture(inner) => {
            let mark = caps.len();
            caps.push(node);
            if eval(inner, node, caps) {
                true
            } else {
                caps.truncate(mark);
                false
            }
        }
        Pat::AnyOf(alts) => {
            for alt in alts {
                let mark = caps.len();
                if eval(alt, node, caps) {
                    return true;
                }
                caps.truncate(mark);
            }
            false
        }
        Pat::AllOf(parts) => {
            let mark = caps.len();
            for part in parts {
                if !eval(part, node, caps) {
                    caps.truncate(mark);
                    return false;
                }
            }
            true
        }
        Pat::Tree { head, items } => {
            let mark = caps.len();
            let mut matched = eval(head, node, caps);
            if matched {
                matched = if node.is_leaf() && node.value().is_some() {
                    match_leaf_items(items, node, caps)
                } else {
                    match_sequence(items, node.children(), caps)
                };
            }
            if matched {
                true
            } else {
                caps.truncate(mark);
                false
            }
        }
        Pat::Contains(parts) => {
            let mark = caps.len();
            let mut used = vec![false; node.child_count()];
            if match_membership(parts, node.children(), &mut used, caps) {
                true
            } else {
                caps.truncate(mark);
                false
            }
        }
    }
}

/// A leaf's payload stands in for its children: `(identifier "save")`
/// matches an identifier token whose text is `save`. Gaps match nothing and
/// at most one item may bind to the payload.
fn match_leaf_items<'a>(items: &[SeqItem], node: &'a Node, caps: &mut Vec<&'a Node>) -> bool {
    let mut concrete = items.iter().filter_map(|item| match item {
        SeqItem::One(pat) => Some(pat),
        SeqItem::Gap => None,
    });
    match (concrete.next(), concrete.next()) {
        (None, _) => true,
        (Some(pat), None) => eval(pat, node, caps),
        (Some(_), Some(_)) => false,
    }
}

/// Ordered child matching with `...` gaps, backtracking over gap widths.
fn match_sequence<'a>(items: &[SeqItem], children: &'a [Node], caps: &mut Vec<&'a Node>) -> bool {
    match items.split_first() {
        None => children.is_empty(),
        Some((SeqItem::Gap, rest)) => {
            for skip in 0..=children.len() {
                let mark = caps.len();
                if match_sequence(rest, &children[skip..], caps) {
                    return true;
                }
                caps.truncate(mark);
            }
            false
        }
        Some((SeqItem::One(pat), rest)) => {
            let Some((first, tail)) = children.split_first() else {
                return false;
            };
            let mark = caps.len();
            if eval(pat, first, caps) && match_sequence(rest, tail, caps) {
                true
            } else {
                caps.truncate(mark);
                false
            }
        }
    }
}

/// Any-order membership: each part claims a distinct child, backtracking
/// over assignments.
fn match_membership<'a>(
    parts: &[Pat],
    children: &'a [Node],
    used: &mut [bool],
    caps: &mut Vec<&'a Node>,
) -> bool {
    let Some((part, rest)) = parts.split_first() else {
        return true;
    };
    for (i, child) in children.iter().enumerate() {
        if used[i] {
            continue;
        }
        let mark = caps.len();
        if eval(part, child, caps) {
            used[i] = true;
            if match_membership(rest, children, used, caps) {
                return true;
            }
            used[i] = false;
        }
        caps.truncate(mark);
    }
    false
}

#[derive(Debug, PartialEq)]
enum Token {
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LAngle,
    RAngle,
    Bang,
    Dollar,
    Wildcard,
    Ellipsis,
    Word(String),
    Str(String),
    Regex(String),
}

fn lex(text: &str) -> Result<Vec<(usize, Token)>, PatternError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let at = i;
        match bytes[i] {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            b';' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'(' => {
                tokens.push((at, Token::LParen));
                i += 1;
            }
            b')' => {
                tokens.push((at, Token::RParen));
                i += 1;
            }
            b'{' => {
                tokens.push((at, Token::LBrace));
                i += 1;
            }
            b'}' => {
                tokens.push((at, Token::RBrace));
                i += 1;
            }
            b'[' => {
                tokens.push((at, Token::LBracket));
                i += 1;
            }
            b']' => {
                tokens.push((at, Token::RBracket));
                i += 1;
            }
            b'<' => {
                tokens.push((at, Token::LAngle));
                i += 1;
            }
            b'>' => {
                tokens.push((at, Token::RAngle));
                i += 1;
            }
            b'!' => {
                tokens.push((at, Token::Bang));
                i += 1;
            }
            b'$' => {
                tokens.push((at, Token::Dollar));
                i += 1;
            }
            b'.' => {
                if bytes.get(i..i + 3) == Some(b"...") {
                    tokens.push((at, Token::Ellipsis));
                    i += 3;
                } else {
                    return Err(PatternError {
                        position: at,
                        message: "expected `...`".into(),
                    });
                }
            }
            b'"' => {
                let (value, next) = lex_string(text, i)?;
                tokens.push((at, Token::Str(value)));
                i = next;
            }
            b'/' => {
                let (value, next) = lex_regex(text, i)?;
                tokens.push((at, Token::Regex(value)));
                i = next;
            }
            c if c.is_ascii_alphanumeric() || c == b'_' || c == b'-' => {
                let mut end = i;
                while end < bytes.len()
                    && (bytes[end].is_ascii_alphanumeric()
                        || bytes[end] == b'_'
                        || bytes[end] == b'-')
                {
                    end += 1;
                }
                let word = &text[i..end];
                if word == "_" {
                    tokens.push((at, Token::Wildcard));
                } else {
                    tokens.push((at, Token::Word(word.to_string())));
                }
                i = end;
            }
            other => {
                return Err(PatternError {
                    position: at,
                    message: format!("unexpected character `{}`", other as char),
                });
            }
        }
    }
    Ok(tokens)
}

fn lex_string(text: &str, start: usize) -> Result<(String, usize), PatternError> {
    let bytes = text.as_bytes();
    let mut value = String::new();
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => return Ok((value, i + 1)),
            b'\\' => {
                let escaped = bytes.get(i + 1).ok_or(PatternError {
                    position: i,
                    message: "dangling escape in string".into(),
                })?;
                match escaped {
                    b'"' => value.push('"'),
                    b'\\' => value.push('\\'),
                    b'n' => value.push('\n'),
                    other => {
                        return Err(PatternError {
                            position: i,
                            message: format!("unknown escape `\\{}`", *other as char),
                        });
                    }
                }
                i += 2;
            }
            _ => {
                let ch = text[i..].chars().next().ok_or(PatternError {
                    position: i,
                    message: "invalid string".into(),
                })?;
                value.push(ch);
                i += ch.len_utf8();
            }
        }
    }
    Err(PatternError {
        position: start,
        message: "unterminated string".into(),
    })
}

fn lex_regex(text: &str, start: usize) -> Result<(String, usize), PatternError> {
    let bytes = text.as_bytes();
    let mut value = String::new();
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'/' => return Ok((value, i + 1)),
            b'\\' if bytes.get(i + 1) == Some(&b'/') => {
                value.push('/');
                i += 2;
            }
            b'\\' => {
                // Leave other escapes for the regex engine.
                value.push('\\');
                if let Some(&next) = bytes.get(i + 1) {
                    value.push(next as char);
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => {
                let ch = text[i..].chars().next().ok_or(PatternError {
                    position: i,
                    message: "invalid regex".into(),
                })?;
                value.push(ch);
                i += ch.len_utf8();
            }
        }
    }
    Err(PatternError {
        position: start,
        message: "unterminated regex".into(),
    })
}

struct TokenStream<'t> {
    tokens: &'t [(usize, Token)],
    pos: usize,
    end: usize,
}

impl<'t> TokenStream<'t> {
    fn peek(&self) -> Option<&'t (usize, Token)> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t (usize, Token)> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn pattern(&mut self) -> Result<Pat, PatternError> {
        let Some((at, token)) = self.next() else {
            return Err(PatternError {
                position: self.end,
                message: "expected a pattern".into(),
            });
        };
        match token {
            Token::Wildcard => Ok(Pat::Any),
            Token::Word(word) => Ok(Pat::Kind(word.clone())),
            Token::Str(value) => Ok(Pat::Value(value.clone())),
            Token::Regex(source) => match Regex::new(source) {
                Ok(re) => Ok(Pat::ValueRegex(re)),
                Err(err) => Err(PatternError {
                    position: *at,
                    message: format!("bad regex: {}", err),
                }),
            },
            Token::Bang => Ok(Pat::Not(Box::new(self.pattern()?))),
            Token::Dollar => Ok(Pat::Capture(Box::new(self.pattern()?))),
            Token::LParen => self.tree(*at),
            Token::LBrace => Ok(Pat::AnyOf(self.group(*at, &Token::RBrace, "alternation")?)),
            Token::LBracket => Ok(Pat::AllOf(self.group(
                *at,
                &Token::RBracket,
                "conjunction",
            )?)),
            Token::LAngle => Ok(Pat::Contains(self.group(*at, &Token::RAngle, "membership")?)),
            Token::Ellipsis => Err(PatternError {
                position: *at,
                message: "`...` is only allowed inside a `(...)` child sequence".into(),
            }),
            other => Err(PatternError {
                position: *at,
                message: format!("unexpected `{:?}`", other),
            }),
        }
    }

    fn tree(&mut self, open: usize) -> Result<Pat, PatternError> {
        if matches!(self.peek(), Some((_, Token::RParen))) {
            return Err(PatternError {
                position: open,
                message: "empty node pattern".into(),
            });
        }
        let head = self.pattern()?;
        let mut items = Vec::new();
        loop {
            match self.peek() {
                Some((_, Token::RParen)) => {
                    self.next();
                    return Ok(Pat::Tree {
                        head: Box::new(head),
                        items,
                    });
                }
                Some((_, Token::Ellipsis)) => {
                    self.next();
                    items.push(SeqItem::Gap);
                }
                Some(_) => items.push(SeqItem::One(self.pattern()?)),
                None => {
                    return Err(PatternError {
                        position: open,
                        message: "unterminated `(`".into(),
                    });
                }
            }
        }
    }

    fn group(
        &mut self,
        open: usize,
        close: &Token,
        what: &str,
    ) -> Result<Vec<Pat>, PatternError> {
        let mut parts = Vec::new();
        loop {
            match self.peek() {
                Some((_, token)) if token == close => {
                    self.next();
                    if parts.is_empty() {
                        return Err(PatternError {
                            position: open,
                            message: format!("empty {}", what),
                        });
                    }
                    return Ok(parts);
                }
                Some(_) => parts.push(self.pattern()?),
                None => {
                    return Err(PatternError {
                        position: open,
                        message: format!("unterminated {}", what),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lichen_core::Span;

    fn leaf(kind: &str, text: &str) -> Node {
        Node::leaf(kind, Span::new(0, text.len()), text)
    }

    /// `recv.name(args...)` shaped call node with synthetic spans.
    fn call(name: &str, args: Vec<Node>) -> Node {
        let mut offset = 0;
        let mut children = vec![];
        let recv = Node::leaf("identifier", Span::new(0, 4), "recv");
        offset += 5;
        let method = Node::leaf("identifier", Span::new(offset, offset + name.len()), name);
        offset += name.len() + 1;
        children.push(recv);
        children.push(method);
        let mut repositioned = vec![];
        for arg in args {
            let len = arg.span().len();
            repositioned.push(reposition(arg, offset));
            offset += len + 1;
        }
        if !repositioned.is_empty() {
            let start = repositioned[0].span().start;
            let end = repositioned.last().map(|n| n.span().end).unwrap_or(start);
            children.push(Node::branch("argument_list", Span::new(start, end), repositioned));
        }
        Node::branch("call", Span::new(0, offset), children)
    }

    fn reposition(node: Node, to: usize) -> Node {
        let len = node.span().len();
        match node.value() {
            Some(value) => Node::leaf(node.kind(), Span::new(to, to + len), value),
            None => {
                let children = node.children().to_vec();
                // Good enough for flat fixtures.
                Node::branch(node.kind(), Span::new(to, to + len), children)
            }
        }
    }

    #[test]
    fn test_kind_and_wildcard() {
        let pat = NodePattern::compile("identifier").expect("should compile");
        assert!(pat.matches(&leaf("identifier", "x")));
        assert!(!pat.matches(&leaf("constant", "X")));

        let any = NodePattern::compile("_").expect("should compile");
        assert!(any.matches(&leaf("identifier", "x")));
        assert!(any.matches(&call("save", vec![])));
    }

    #[test]
    fn test_value_literal_and_regex() {
        let pat = NodePattern::compile(r#"(identifier "update_attributes")"#)
            .expect("should compile");
        assert!(pat.matches(&leaf("identifier", "update_attributes")));
        assert!(!pat.matches(&leaf("identifier", "update")));

        let re = NodePattern::compile("/_attributes$/").expect("should compile");
        assert!(re.matches(&leaf("identifier", "update_attributes")));
        assert!(!re.matches(&leaf("identifier", "attributes_x")));
        // Regex only applies to leaves with a value.
        assert!(!re.matches(&call("update_attributes", vec![])));
    }

    #[test]
    fn test_sequence_exact_arity() {
        let pat = NodePattern::compile("(call _ _)").expect("should compile");
        assert!(pat.matches(&call("save", vec![])));
        assert!(!pat.matches(&call("save", vec![leaf("integer", "1")])));
    }

    #[test]
    fn test_sequence_gap() {
        let with_args = call("save", vec![leaf("integer", "1"), leaf("integer", "2")]);
        assert!(NodePattern::compile("(call ...)")
            .expect("should compile")
            .matches(&with_args));
        assert!(NodePattern::compile(r#"(call _ (identifier "save") ...)"#)
            .expect("should compile")
            .matches(&with_args));
        assert!(NodePattern::compile("(call ... (argument_list ...))")
            .expect("should compile")
            .matches(&with_args));
        assert!(!NodePattern::compile("(call ... (argument_list ...))")
            .expect("should compile")
            .matches(&call("save", vec![])));
    }

    #[test]
    fn test_gap_between_items() {
        let node = Node::branch(
            "list",
            Span::new(0, 9),
            vec![
                Node::leaf("word", Span::new(0, 1), "a"),
                Node::leaf("word", Span::new(2, 3), "b"),
                Node::leaf("word", Span::new(4, 5), "c"),
            ],
        );
        let pat = NodePattern::compile(r#"(list "a" ... "c")"#).expect("should compile");
        assert!(pat.matches(&node));
        let missing = NodePattern::compile(r#"(list "a" ... "d")"#).expect("should compile");
        assert!(!missing.matches(&node));
    }

    #[test]
    fn test_alternation_and_conjunction() {
        let pat = NodePattern::compile("{identifier constant}").expect("should compile");
        assert!(pat.matches(&leaf("identifier", "x")));
        assert!(pat.matches(&leaf("constant", "X")));
        assert!(!pat.matches(&leaf("integer", "1")));

        let both = NodePattern::compile(r#"[identifier "save"]"#).expect("should compile");
        assert!(both.matches(&leaf("identifier", "save")));
        assert!(!both.matches(&leaf("constant", "save")));
        assert!(!both.matches(&leaf("identifier", "destroy")));
    }

    #[test]
    fn test_negation() {
        let pat = NodePattern::compile(r#"(call _ !(identifier "save") ...)"#)
            .expect("should compile");
        assert!(pat.matches(&call("destroy", vec![])));
        assert!(!pat.matches(&call("save", vec![])));
    }

    #[test]
    fn test_membership_any_order() {
        let node = Node::branch(
            "hash",
            Span::new(0, 20),
            vec![
                Node::leaf("pair", Span::new(0, 8), "a: 1"),
                Node::leaf("sym", Span::new(9, 14), ":flag"),
            ],
        );
        let pat = NodePattern::compile(r#"<(sym ":flag") pair>"#).expect("should compile");
        assert!(pat.matches(&node));
        let missing = NodePattern::compile(r#"<(sym ":other")>"#).expect("should compile");
        assert!(!missing.matches(&node));
    }

    #[test]
    fn test_membership_claims_distinct_children() {
        let node = Node::branch(
            "hash",
            Span::new(0, 10),
            vec![Node::leaf("pair", Span::new(0, 4), "a: 1")],
        );
        // Two parts cannot both claim the single child.
        let pat = NodePattern::compile("<pair pair>").expect("should compile");
        assert!(!pat.matches(&node));
    }

    #[test]
    fn test_captures_in_pattern_order() {
        let node = call("update_attributes", vec![leaf("integer", "1")]);
        let pat = NodePattern::compile(r#"(call $_ $(identifier /_attributes$/) ...)"#)
            .expect("should compile");
        let caps = pat.captures(&node).expect("should match");
        assert_eq!(caps.len(), 2);
        assert_eq!(caps[0].value(), Some("recv"));
        assert_eq!(caps[1].value(), Some("update_attributes"));
    }

    #[test]
    fn test_failed_branch_discards_captures() {
        let node = leaf("identifier", "save");
        let pat = NodePattern::compile(r#"{$(identifier "destroy") $(identifier "save")}"#)
            .expect("should compile");
        let caps = pat.captures(&node).expect("should match");
        assert_eq!(caps.len(), 1);
        assert_eq!(caps[0].value(), Some("save"));
    }

    #[test]
    fn test_negation_discards_captures() {
        let node = leaf("identifier", "save");
        let pat = NodePattern::compile(r#"[!$(identifier "destroy") _]"#).expect("should compile");
        let caps = pat.captures(&node).expect("should match");
        assert!(caps.is_empty());
    }

    #[test]
    fn test_kind_hints() {
        let hint = |text: &str| {
            NodePattern::compile(text)
                .expect("should compile")
                .kind_hints()
        };
        assert_eq!(hint("(call ...)"), Some(vec!["call".to_string()]));
        assert_eq!(
            hint("{(call ...) (def ...)}"),
            Some(vec!["call".to_string(), "def".to_string()])
        );
        assert_eq!(hint("$(call ...)"), Some(vec!["call".to_string()]));
        assert_eq!(hint(r#"[call "save"]"#), Some(vec!["call".to_string()]));
        assert_eq!(hint("_"), None);
        assert_eq!(hint(r#"{(call ...) _}"#), None);
        assert_eq!(hint(r#""save""#), None);
    }

    #[test]
    fn test_comments_and_whitespace() {
        let pat = NodePattern::compile(
            "; method call with any receiver\n(call _ ; receiver\n ...)",
        )
        .expect("should compile");
        assert!(pat.matches(&call("save", vec![])));
    }

    #[test]
    fn test_compile_errors() {
        for (text, fragment) in [
            ("", "expected a pattern"),
            ("(call", "unterminated"),
            ("()", "empty node pattern"),
            ("{}", "empty alternation"),
            ("call extra", "trailing input"),
            ("...", "only allowed inside"),
            ("{... call}", "only allowed inside"),
            ("(call \"unterminated)", "unterminated string"),
            ("/[/", "bad regex"),
            ("(call @)", "unexpected character"),
            ("..", "expected `...`"),
        ] {
            let err = NodePattern::compile(text).expect_err(text);
            assert!(
                err.message.contains(fragment),
                "pattern `{}`: expected `{}` in `{}`",
                text,
                fragment,
                err.message
            );
        }
    }
}
