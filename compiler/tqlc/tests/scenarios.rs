//! End to end translation scenarios through the library API.

#![allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]

use pretty_assertions::assert_eq;
use tql_ir::validate::check;
use tql_ir::{describe, Description, Direction, Node, NodeId, QuantifierKind, TraversalIr};
use tql_translate::{TranslateError, TranslationContext};

const PEOPLE: &str = r#"
    scalar Date

    type Person {
        id: ID!
        name: String
        description: String
        born: Date
        friends(where: WhereClause): [Person]
        employer: Company
    }

    type Company {
        id: ID!
        name: String
        founded: Date
    }

    type Query {
        person(where: WhereClause): Person
        people(where: WhereClause): [Person]
        company(id: ID): Company
    }
"#;

fn context() -> TranslationContext {
    let mut context = TranslationContext::new();
    context.compile([PEOPLE], "people").unwrap();
    context
}

/// Translate, check every invariant, and print.
fn tree(query: &str) -> (TraversalIr, String) {
    let ir = context().translate(query).unwrap();
    assert_eq!(check(&ir), vec![], "malformed IR for {query}");
    let printed = describe(&ir).unwrap().to_string();
    (ir, printed)
}

fn group_kinds(ir: &TraversalIr) -> Vec<QuantifierKind> {
    ir.iter()
        .filter_map(|(_, node)| match node {
            Node::PropertyGroup(group) => Some(group.quantifier),
            _ => None,
        })
        .collect()
}

#[test]
fn single_property_chains_through_one_quantifier() {
    let (_, printed) = tree("{ person { name } }");
    assert_eq!(
        printed,
        "\
Start[0]
└── Entity[1]:Person#person
    └── Quant[2]:ALL{3}
        └── Prop[3]:name<Identity>
"
    );
}

#[test]
fn and_clause_becomes_an_all_group_under_the_first_quantifier() {
    let (ir, printed) = tree(
        r#"{ person(where: { operator: AND, constraints: [
            { operand: "name", operator: "like", expression: "jhone" },
            { operand: "description", operator: "notEmpty" }
        ] }) { name } }"#,
    );
    assert_eq!(
        printed,
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
    assert_eq!(group_kinds(&ir), vec![QuantifierKind::All]);
    let scope = ir.parent(NodeId::new(3)).unwrap();
    assert!(ir.node(scope).is_some_and(Node::is_quantifier));
}

#[test]
fn unknown_operand_is_fatal() {
    let err = context()
        .translate(
            r#"{ person(where: { constraints: [
                { operand: "salary", operator: "gt", expression: "10" }
            ] }) { name } }"#,
        )
        .unwrap_err();
    assert_eq!(
        err,
        TranslateError::UnknownConstraintOperand {
            operands: vec!["salary".to_owned()],
            entity: "Person".to_owned(),
            path: "/person".to_owned(),
        }
    );
    let message = err.to_string();
    assert!(message.contains("`salary`") && message.contains("`Person`"), "{message}");
}

#[test]
fn sibling_scalars_fan_out_from_one_quantifier() {
    let (ir, _) = tree("{ person { name born description } }");
    let quantifiers: Vec<&Node> = ir
        .iter()
        .map(|(_, node)| node)
        .filter(|node| node.is_quantifier())
        .collect();
    assert_eq!(quantifiers.len(), 1);
    assert_eq!(
        quantifiers[0].next(),
        &[NodeId::new(3), NodeId::new(4), NodeId::new(5)]
    );
}

#[test]
fn relation_is_followed_by_its_target_entity() {
    let (ir, printed) = tree("{ person { employer { name } } }");
    assert_eq!(
        printed,
        "\
Start[0]
└── Entity[1]:Person#person
    └── Quant[2]:ALL{3}
        └── Rel[3]:has_Company(R)#employer
            └── Entity[4]:Company#employer
                └── Quant[5]:ALL{6}
                    └── Prop[6]:name<Identity>
"
    );
    match ir.node(NodeId::new(3)) {
        Some(Node::Relation(relation)) => {
            assert_eq!(relation.direction, Direction::R);
            assert_eq!(relation.next, Some(NodeId::new(4)));
        }
        other => panic!("expected a relation, found {other:?}"),
    }
    assert_eq!(ir.find_by_tag("employer"), Some(NodeId::new(3)));
}

#[test]
fn or_clause_becomes_a_some_group() {
    let (ir, printed) = tree(
        r#"{ people(where: { operator: OR, constraints: [
            { operand: "name", operator: "eq", expression: "Ada" },
            { operand: "born", operator: "lt", expression: "1900-01-01" }
        ] }) { name } }"#,
    );
    assert_eq!(group_kinds(&ir), vec![QuantifierKind::Some]);
    assert_eq!(
        printed,
        "\
Start[0]
└── Entity[1]:Person#people
    └── Quant[2]:ALL{3,6}
        ├── Group[3]:SOME{4,5}
        │   ├── Prop[4]:name<eq,Ada>
        │   └── Prop[5]:born<lt,1900-01-01>
        └── Prop[6]:name<Identity>
"
    );
}

#[test]
fn nested_filter_joins_the_enclosing_quantifier() {
    let (ir, printed) = tree(
        r#"{ person { name friends(where: { constraints: [
            { operand: "name", operator: "startsWith", expression: "J" }
        ] }) { name } } }"#,
    );
    assert_eq!(
        printed,
        "\
Start[0]
└── Entity[1]:Person#person
    └── Quant[2]:ALL{3,4,6}
        ├── Prop[3]:name<Identity>
        ├── Rel[4]:has_Person(R)#friends
        │   └── Entity[5]:Person#friends
        │       └── Quant[8]:ALL{9}
        │           └── Prop[9]:name<Identity>
        └── Group[6]:ALL{7}
            └── Prop[7]:name<startsWith,J>
"
    );
    assert_eq!(ir.parent(NodeId::new(6)), Some(NodeId::new(2)));
}

#[test]
fn printed_trees_parse_back() {
    let (ir, printed) = tree("{ person { name employer { name founded } } company(id: \"c1\") { name } }");
    let parsed: Description = printed.parse().unwrap();
    assert_eq!(Some(parsed.clone()), describe(&ir));
    assert_eq!(parsed.to_string(), printed);
}

#[test]
fn every_node_ascends_to_start() {
    let (ir, _) = tree("{ person { friends { employer { name } } } people { name } }");
    for (id, _) in ir.iter() {
        assert_eq!(ir.path_to_root(id).last(), Some(&NodeId::START), "node {id}");
    }
    let ids: Vec<u32> = ir.iter().map(|(id, _)| id.raw()).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}
