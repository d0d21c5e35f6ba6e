use pretty_assertions::assert_eq;

use super::*;

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn punctuation_and_names() {
    assert_eq!(
        kinds("{ book(id: $id) { ...F } }"),
        vec![
            TokenKind::LBrace,
            TokenKind::Name("book".to_owned()),
            TokenKind::LParen,
            TokenKind::Name("id".to_owned()),
            TokenKind::Colon,
            TokenKind::Dollar,
            TokenKind::Name("id".to_owned()),
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::Spread,
            TokenKind::Name("F".to_owned()),
            TokenKind::RBrace,
            TokenKind::RBrace,
        ]
    );
}

#[test]
fn commas_and_comments_are_skipped() {
    assert_eq!(
        kinds("a, b # trailing comment\n c"),
        vec![
            TokenKind::Name("a".to_owned()),
            TokenKind::Name("b".to_owned()),
            TokenKind::Name("c".to_owned()),
        ]
    );
}

#[test]
fn numbers() {
    assert_eq!(
        kinds("0 -12 3.5 1e3 -2.5E-1"),
        vec![
            TokenKind::Int(0),
            TokenKind::Int(-12),
            TokenKind::Float(3.5),
            TokenKind::Float(1000.0),
            TokenKind::Float(-0.25),
        ]
    );
}

#[test]
fn string_escapes() {
    assert_eq!(
        kinds(r#""a\"b\nA""#),
        vec![TokenKind::String("a\"b\nA".to_owned())]
    );
}

#[test]
fn block_string_is_dedented() {
    let source = "\"\"\"\n    The book.\n      Indented.\n    \"\"\" type";
    assert_eq!(
        kinds(source),
        vec![
            TokenKind::BlockString("The book.\n  Indented.".to_owned()),
            TokenKind::Name("type".to_owned()),
        ]
    );
}

#[test]
fn spans_cover_tokens() {
    let tokens = tokenize("query  Q").unwrap();
    assert_eq!(tokens[0].span, Span::new(0, 5));
    assert_eq!(tokens[1].span, Span::new(7, 8));
}

#[test]
fn unexpected_character() {
    let err = tokenize("{ book ? }").unwrap_err();
    assert_eq!(err.span, Span::new(7, 8));
    assert!(err.message.contains('?'));
}
