use pretty_assertions::assert_eq;
use serde_json::json;
use tql_ir::validate::check;
use tql_ir::{describe, Node, NodeId, QuantifierKind};

use super::*;

const LIBRARY: &str = r#"
    interface Named { name: String! }
    type Person implements Named {
        id: ID!
        name: String!
        description: String
        age: Int
        books: [Book]
    }
    type Author implements Named {
        id: ID!
        name: String!
        books: [Book] @relation(name: "wrote")
    }
    type Book {
        isbn: ID
        title: String
        genre: Genre
        author: Author
    }
    enum Genre { FICTION POETRY }
    type Query {
        person(where: WhereClause): Person
        author(id: ID): Author
        book(where: WhereClause): Book
        books(where: WhereClause): [Book]
    }
"#;

fn library() -> TranslationContext {
    let mut context = TranslationContext::new();
    context.compile([LIBRARY], "library").unwrap();
    context
}

fn printed(ir: &TraversalIr) -> String {
    assert_eq!(check(ir), vec![]);
    describe(ir).map(|d| d.to_string()).unwrap_or_default()
}

fn translate(query: &str) -> String {
    printed(&library().translate(query).unwrap())
}

#[test]
fn single_entity_with_one_property() {
    assert_eq!(
        translate("{ book { title } }"),
        "\
Start[0]
└── Entity[1]:Book#book
    └── Quant[2]:ALL{3}
        └── Prop[3]:title<Identity>
"
    );
}

#[test]
fn and_where_clause() {
    let query = r#"{
        person(where: {
            operator: AND
            constraints: [
                { operand: "name", operator: "like", expression: "jhone" }
                { operand: "description", operator: "notEmpty" }
            ]
        }) { name }
    }"#;
    assert_eq!(
        translate(query),
        "\
Start[0]
└── Entity[1]:Person#person
    └── Quant[2]:ALL{3,6}
        ├── Group[3]:ALL{4,5}
        │   ├── Prop[4]:name<like,jhone>
        │   └── Prop[5]:description<notEmpty,>
        └── Prop[6]:name<Identity>
"
    );
}

#[test]
fn unknown_operand_fails_without_ir() {
    let query = r#"{
        person(where: { constraints: [
            { operand: "shoeSize", operator: "gt", expression: "40" }
            { operand: "name", operator: "eq", expression: "x" }
        ] }) { name }
    }"#;
    assert_eq!(
        library().translate(query).unwrap_err(),
        TranslateError::UnknownConstraintOperand {
            operands: vec!["shoeSize".to_owned()],
            entity: "Person".to_owned(),
            path: "/person".to_owned(),
        }
    );
}

#[test]
fn sibling_properties_share_one_quantifier() {
    let ir = library().translate("{ book { title genre } }").unwrap();
    let quantifiers: Vec<_> = ir.iter().filter(|(_, n)| n.is_quantifier()).collect();
    assert_eq!(quantifiers.len(), 1);
    assert_eq!(quantifiers[0].1.next(), &[NodeId::new(3), NodeId::new(4)]);
    assert_eq!(
        printed(&ir),
        "\
Start[0]
└── Entity[1]:Book#book
    └── Quant[2]:ALL{3,4}
        ├── Prop[3]:title<Identity>
        └── Prop[4]:genre<Identity>
"
    );
}

#[test]
fn relation_field_enters_relation_then_entity() {
    let ir = library().translate("{ person { books { title } } }").unwrap();
    assert_eq!(
        printed(&ir),
        "\
Start[0]
└── Entity[1]:Person#person
    └── Quant[2]:ALL{3}
        └── Rel[3]:has_Book(R)#books
            └── Entity[4]:Book#books
                └── Quant[5]:ALL{6}
                    └── Prop[6]:title<Identity>
"
    );
    let relation = ir.node(NodeId::new(3)).unwrap();
    assert_eq!(relation.next(), &[NodeId::new(4)]);
}

#[test]
fn or_where_clause_groups_with_some() {
    let query = r#"{
        person(where: {
            operator: OR
            constraints: [
                { operand: "age", operator: "gt", expression: "30" }
                { operand: "name", operator: "starts with", expression: "J" }
            ]
        }) { id }
    }"#;
    let ir = library().translate(query).unwrap();
    assert_eq!(
        printed(&ir),
        "\
Start[0]
└── Entity[1]:Person#person
    └── Quant[2]:ALL{3,6}
        ├── Group[3]:SOME{4,5}
        │   ├── Prop[4]:age<gt,30>
        │   └── Prop[5]:name<startsWith,J>
        └── Prop[6]:id<Identity>
"
    );
    match ir.node(NodeId::new(3)) {
        Some(Node::PropertyGroup(group)) => assert_eq!(group.quantifier, QuantifierKind::Some),
        other => panic!("expected a property group, found {other:?}"),
    }
}

#[test]
fn where_clause_from_variables() {
    let context = library();
    let variables = json!({
        "w": { "constraints": [{ "operand": "title", "operator": "eq", "expression": "Dune" }] }
    });
    let ir = context
        .translate_with(
            "query Find($w: WhereClause) { books(where: $w) { title } }",
            variables.as_object(),
            Some("Find"),
        )
        .unwrap();
    assert_eq!(ir.name(), Some("Find"));
    assert_eq!(ir.ontology(), Some("library"));
    assert_eq!(
        printed(&ir),
        "\
Start[0]
└── Entity[1]:Book#books
    └── Quant[2]:ALL{3,5}
        ├── Group[3]:ALL{4}
        │   └── Prop[4]:title<eq,Dune>
        └── Prop[5]:title<Identity>
"
    );
}

#[test]
fn unset_where_variable_adds_no_filter() {
    let ir = library()
        .translate("query Find($w: WhereClause) { books(where: $w) { title } }")
        .unwrap();
    assert_eq!(
        printed(&ir),
        "\
Start[0]
└── Entity[1]:Book#books
    └── Quant[2]:ALL{3}
        └── Prop[3]:title<Identity>
"
    );
}

#[test]
fn id_argument_makes_a_concrete_entity() {
    assert_eq!(
        translate(r#"{ author(id: "a1") { name } }"#),
        "\
Start[0]
└── Concrete[1]:Author#author(a1)
    └── Quant[2]:ALL{3}
        └── Prop[3]:name<Identity>
"
    );
}

#[test]
fn second_root_field_splices_a_root_quantifier() {
    assert_eq!(
        translate("{ book { title } author { name } }"),
        "\
Start[0]
└── Quant[4]:ALL{1,5}
    ├── Entity[1]:Book#book
    │   └── Quant[2]:ALL{3}
    │       └── Prop[3]:title<Identity>
    └── Entity[5]:Author#author
        └── Quant[6]:ALL{7}
            └── Prop[7]:name<Identity>
"
    );
}

#[test]
fn filter_on_a_later_root_field_joins_the_root_quantifier() {
    assert_eq!(
        translate(
            r#"{ book { title } books(where: { constraints: [
                { operand: "title", operator: "eq", expression: "x" }
            ] }) { title } }"#
        ),
        "\
Start[0]
└── Quant[4]:ALL{1,5,6}
    ├── Entity[1]:Book#book
    │   └── Quant[2]:ALL{3}
    │       └── Prop[3]:title<Identity>
    ├── Entity[5]:Book#books
    │   └── Quant[8]:ALL{9}
    │       └── Prop[9]:title<Identity>
    └── Group[6]:ALL{7}
        └── Prop[7]:title<eq,x>
"
    );
}

#[test]
fn nested_relations_and_fragments() {
    let query = "
        { person { ...Reader } }
        fragment Reader on Person { name books { title author { name } } }
    ";
    assert_eq!(
        translate(query),
        "\
Start[0]
└── Entity[1]:Person#person
    └── Quant[2]:ALL{3,4}
        ├── Prop[3]:name<Identity>
        └── Rel[4]:has_Book(R)#books
            └── Entity[5]:Book#books
                └── Quant[6]:ALL{7,8}
                    ├── Prop[7]:title<Identity>
                    └── Rel[8]:has_Author(R)#author
                        └── Entity[9]:Author#author
                            └── Quant[10]:ALL{11}
                                └── Prop[11]:name<Identity>
"
    );
}

#[test]
fn skipped_fields_are_not_translated() {
    assert_eq!(
        translate("{ book { title genre @skip(if: true) } }"),
        "\
Start[0]
└── Entity[1]:Book#book
    └── Quant[2]:ALL{3}
        └── Prop[3]:title<Identity>
"
    );
}

#[test]
fn unknown_field_is_a_validation_failure() {
    assert_eq!(
        library().translate("{ book { pages } }").unwrap_err(),
        TranslateError::SchemaValidationFailure {
            messages: vec!["unknown field `pages` on type `Book` (at book.pages)".to_owned()],
        }
    );
}

#[test]
fn unknown_operator_and_syntax_errors() {
    let query = r#"{ book(where: { constraints: [
        { operand: "title", operator: "sounds like", expression: "x" }
    ] }) { title } }"#;
    assert!(matches!(
        library().translate(query),
        Err(TranslateError::UnknownConstraintOperator { operator, .. }) if operator == "sounds like"
    ));
    assert!(matches!(
        library().translate("{ book { title }"),
        Err(TranslateError::QuerySyntax(_))
    ));
}

#[test]
fn overly_deep_queries_are_rejected_as_syntax_errors() {
    for depth in [2_000, 30_000] {
        let query = format!(
            "{{ person(where: {}{}) {{ name }} }}",
            "[".repeat(depth),
            "]".repeat(depth)
        );
        assert!(matches!(
            library().translate(&query),
            Err(TranslateError::QuerySyntax(e)) if e.message.contains("nests deeper")
        ));
    }
}

#[test]
fn deep_relation_chains_translate() {
    let levels = 60;
    let query = format!(
        "{{ person {{ {}name{} }} }}",
        "books { author { ".repeat(levels),
        " } }".repeat(levels)
    );
    let ir = library().translate(&query).unwrap();
    assert_eq!(check(&ir), vec![]);
    let leaf = ir.iter().map(|(id, _)| id).last().unwrap();
    // At least an entity and its quantifier for each of books and author.
    assert!(ir.path_to_root(leaf).len() > levels * 4);
    assert!(describe(&ir).is_some());
}

#[test]
fn translate_requires_a_compiled_schema() {
    let mut context = TranslationContext::new();
    assert!(!context.is_compiled());
    assert_eq!(
        context.translate("{ book { title } }").unwrap_err(),
        TranslateError::PrerequisiteMissing
    );

    context.compile([LIBRARY], "library").unwrap();
    assert!(context.translate("{ book { title } }").is_ok());

    context.reset();
    assert!(context.shared().is_none());
    assert_eq!(
        context.translate("{ book { title } }").unwrap_err(),
        TranslateError::PrerequisiteMissing
    );
}

#[test]
fn failed_compile_keeps_previous_state() {
    let mut context = library();
    let err = context.compile(["type Query { book: Missing }"], "broken").unwrap_err();
    assert!(matches!(err, TranslateError::Schema(_)), "{err:?}");
    assert_eq!(context.shared().unwrap().ontology().name, "library");
}

#[test]
fn compile_with_a_loaded_ontology() {
    let derived = library().shared().unwrap().ontology().clone();
    let mut renamed = derived;
    renamed.name = "loaded".to_owned();

    let mut context = TranslationContext::new();
    context.compile_with_ontology([LIBRARY], renamed).unwrap();
    let ir = context.translate("{ book { title } }").unwrap();
    assert_eq!(ir.ontology(), Some("loaded"));
}

#[test]
fn field_without_ontology_counterpart() {
    let mut ontology = library().shared().unwrap().ontology().clone();
    ontology.properties.retain(|p| p.name != "title");

    let mut context = TranslationContext::new();
    context.compile_with_ontology([LIBRARY], ontology).unwrap();
    assert_eq!(
        context.translate("{ book { title } }").unwrap_err(),
        TranslateError::UnknownOntologyElement {
            kind: "property",
            name: "title".to_owned(),
            path: "/book/title".to_owned(),
        }
    );
}

#[test]
fn shared_state_translates_across_threads() {
    let shared = library().shared().unwrap();
    let handles: Vec<_> = ["{ book { title } }", "{ person { name } }"]
        .into_iter()
        .map(|query| {
            let compiled = Arc::clone(&shared);
            std::thread::spawn(move || compiled.translate(query, None, None).map(|ir| ir.len()))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(4));
    }
}
