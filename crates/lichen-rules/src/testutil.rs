//! A tiny deterministic parser for engine tests: whitespace-separated
//! tokens become `word` leaves under a `doc` root. The token `?!` is
//! defined to be unparsable so error paths can be exercised. No grammar
//! involved; integration tests against a real language live in `tests/`.

use lichen_core::{Node, ParseError, SourceText, Span, SyntaxTree};

pub(crate) fn parse_words(source: &SourceText) -> Result<SyntaxTree, ParseError> {
    let text = source.as_str();
    let bytes = text.as_bytes();
    let mut children = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let token = &text[start..i];
        if token == "?!" {
            return Err(ParseError::new(source.origin(), "unreadable token"));
        }
        children.push(Node::leaf("word", Span::new(start, i), token));
    }
    SyntaxTree::new(Node::branch("doc", Span::new(0, text.len()), children))
        .map_err(|message| ParseError::new(source.origin(), message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_words_spans_slice_back() {
        let source = SourceText::new("foo  bar\nbaz");
        let tree = parse_words(&source).expect("should parse");
        let words: Vec<&str> = tree
            .root()
            .children()
            .iter()
            .map(|n| source.slice(n.span()).expect("valid span"))
            .collect();
        assert_eq!(words, ["foo", "bar", "baz"]);
    }
}
