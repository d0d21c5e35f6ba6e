use pretty_assertions::assert_eq;

use super::*;

fn only_operation(source: &str) -> OperationDefinition {
    let doc = parse_document(source).unwrap();
    let mut ops: Vec<_> = doc.operations().cloned().collect();
    assert_eq!(ops.len(), 1);
    ops.remove(0)
}

fn field(selection: &Selection) -> &Field {
    match selection {
        Selection::Field(f) => f,
        other => panic!("expected a field, got {other:?}"),
    }
}

// Executable documents

#[test]
fn anonymous_query_shorthand() {
    let op = only_operation("{ book { title } }");
    assert_eq!(op.kind, OperationKind::Query);
    assert_eq!(op.name, None);
    let book = field(&op.selection_set.items[0]);
    assert_eq!(book.name, "book");
    let title = field(&book.selection_set.as_ref().unwrap().items[0]);
    assert_eq!(title.name, "title");
    assert!(title.selection_set.is_none());
}

#[test]
fn named_query_with_variables_and_alias() {
    let op = only_operation(
        r#"query Books($id: ID!, $limit: Int = 10) {
            first: book(id: $id) { title @include(if: true) }
        }"#,
    );
    assert_eq!(op.name.as_deref(), Some("Books"));
    assert_eq!(op.variables.len(), 2);
    assert_eq!(
        op.variables[0].ty,
        TypeRef::NonNull(Box::new(TypeRef::named("ID")))
    );
    assert_eq!(op.variables[1].default, Some(Value::Int(10)));

    let book = field(&op.selection_set.items[0]);
    assert_eq!(book.alias.as_deref(), Some("first"));
    assert_eq!(book.response_key(), "first");
    assert_eq!(book.arguments[0].value, Value::Variable("id".to_owned()));

    let title = field(&book.selection_set.as_ref().unwrap().items[0]);
    assert_eq!(title.directives[0].name, "include");
    assert_eq!(title.directives[0].argument("if"), Some(&Value::Boolean(true)));
}

#[test]
fn object_and_list_values() {
    let op = only_operation(
        r#"{ person(where: { operator: AND, constraints: [{ operand: "name", operator: "like", expression: "jhone" }] }) { name } }"#,
    );
    let person = field(&op.selection_set.items[0]);
    let Value::Object(clause) = &person.arguments[0].value else {
        panic!("expected an object value");
    };
    assert_eq!(clause[0], ("operator".to_owned(), Value::Enum("AND".to_owned())));
    let Value::List(constraints) = &clause[1].1 else {
        panic!("expected a list value");
    };
    assert_eq!(constraints.len(), 1);
}

#[test]
fn fragments() {
    let doc = parse_document(
        "query { book { ...Fields ... on Novel { pages } ... @skip(if: false) { isbn } } }
         fragment Fields on Book { title }",
    )
    .unwrap();
    let op = doc.operations().next().unwrap();
    let book = field(&op.selection_set.items[0]);
    let items = &book.selection_set.as_ref().unwrap().items;
    assert!(matches!(&items[0], Selection::FragmentSpread(s) if s.name == "Fields"));
    assert!(
        matches!(&items[1], Selection::InlineFragment(f) if f.type_condition.as_deref() == Some("Novel"))
    );
    assert!(matches!(&items[2], Selection::InlineFragment(f) if f.type_condition.is_none()));

    let fragment = doc.fragments().next().unwrap();
    assert_eq!(fragment.name, "Fields");
    assert_eq!(fragment.type_condition, "Book");
}

// Schema documents

#[test]
fn type_system_definitions() {
    let doc = parse_document(
        r#"
        schema { query: Root }
        "A book."
        type Book implements Node & Titled @model {
            "The id."
            id: ID!
            authors(first: Int = 3): [Author!]! @relation(name: "wrote")
        }
        interface Node { id: ID! }
        enum Genre { FICTION POETRY }
        input Filter { genre: Genre = FICTION }
        scalar Date
        directive @relation(name: String) repeatable on FIELD_DEFINITION | OBJECT
        extend type Book { published: Date }
        "#,
    )
    .unwrap();
    assert_eq!(doc.definitions.len(), 8);

    let Definition::Schema(schema) = &doc.definitions[0] else {
        panic!("expected schema definition");
    };
    assert_eq!(schema.operation_types, vec![(OperationKind::Query, "Root".to_owned())]);

    let Definition::Type(book) = &doc.definitions[1] else {
        panic!("expected type definition");
    };
    assert_eq!(book.name, "Book");
    assert_eq!(book.directives[0].name, "model");
    let TypeDefinitionKind::Object { interfaces, fields } = &book.kind else {
        panic!("expected object type");
    };
    assert_eq!(interfaces, &vec!["Node".to_owned(), "Titled".to_owned()]);
    assert_eq!(fields[1].ty.to_string(), "[Author!]!");
    assert!(fields[1].ty.is_list());
    assert_eq!(fields[1].ty.named_type(), "Author");
    assert_eq!(fields[1].arguments[0].default, Some(Value::Int(3)));

    let Definition::Directive(directive) = &doc.definitions[6] else {
        panic!("expected directive definition");
    };
    assert!(directive.repeatable);
    assert_eq!(directive.locations, vec!["FIELD_DEFINITION", "OBJECT"]);

    let Definition::Type(extension) = &doc.definitions[7] else {
        panic!("expected type extension");
    };
    assert!(extension.extension);
}

// Errors

#[test]
fn missing_closing_brace() {
    let err = parse_document("{ book { title }").unwrap_err();
    assert_eq!(err.message, "expected `}`, found end of input");
}

#[test]
fn empty_selection_set() {
    let err = parse_document("{ }").unwrap_err();
    assert_eq!(err.message, "selection set must not be empty");
}

#[test]
fn variables_in_constant_position() {
    let err = parse_document("type A { f(x: Int = $v): Int }").unwrap_err();
    assert_eq!(err.message, "variables are not allowed here");
}

#[test]
fn empty_document() {
    assert!(parse_document("  # nothing\n").is_err());
}

// Nesting

fn nested_list(depth: usize) -> String {
    format!("{{ book(ids: {}{}) {{ title }} }}", "[".repeat(depth), "]".repeat(depth))
}

#[test]
fn nesting_within_the_limit_parses() {
    let op = only_operation(&nested_list(MAX_NESTING - 8));
    let mut value = &field(&op.selection_set.items[0]).arguments[0].value;
    let mut depth = 0;
    while let Value::List(items) = value {
        depth += 1;
        match items.first() {
            Some(item) => value = item,
            None => break,
        }
    }
    assert_eq!(depth, MAX_NESTING - 8);
}

#[test]
fn deep_list_literal_is_a_syntax_error() {
    for depth in [MAX_NESTING + 1, 30_000] {
        let err = parse_document(&nested_list(depth)).unwrap_err();
        assert_eq!(err.message, "document nests deeper than 256 levels");
    }
}

#[test]
fn deep_selection_and_type_nesting_are_syntax_errors() {
    let depth = 10_000;
    let query = format!("{}title{}", "{ a ".repeat(depth), " }".repeat(depth));
    assert!(parse_document(&query).is_err());

    let sdl = format!("type A {{ f: {}Int{} }}", "[".repeat(depth), "]".repeat(depth));
    let err = parse_document(&sdl).unwrap_err();
    assert_eq!(err.message, "document nests deeper than 256 levels");
}
