use pretty_assertions::assert_eq;

use super::*;

#[test]
fn keys_drop_list_indices() {
    let path = ResultPath::root().child("author").child("books").index(0).child("title");
    assert_eq!(path.to_string(), "/author/books[0]/title");
    assert_eq!(memo_key(&path), "/author/books/title");
    assert_eq!(memo_key(&ResultPath::root()), "/");
}

#[test]
fn list_and_element_share_an_entry() {
    let mut memo = PathMemo::default();
    let books = ResultPath::root().child("books");
    memo.record(&books.index(0), NodeId::new(4));
    assert_eq!(memo.get(&books), Some(NodeId::new(4)));

    memo.record(&books, NodeId::new(5));
    assert_eq!(memo.get(&books.index(0)), Some(NodeId::new(5)));
    assert_eq!(memo.get(&ResultPath::root()), None);
}
