use pretty_assertions::assert_eq;

use crate::builder::IrBuilder;
use crate::constraint::{Constraint, ConstraintOp};

use super::*;

fn filtered_person() -> TraversalIr {
    let mut builder = IrBuilder::new();
    builder.start().unwrap();
    builder.enter_entity("person", "Person").unwrap();
    builder.add_quantifier(QuantifierKind::All).unwrap();
    builder
        .add_property("title", PropertyPayload::IDENTITY)
        .unwrap();
    builder
        .add_property_group(
            vec![
                (
                    "name".to_owned(),
                    Some(Constraint::new(ConstraintOp::Like, Some("jhone".to_owned()))),
                ),
                (
                    "description".to_owned(),
                    Some(Constraint::unary(ConstraintOp::NotEmpty)),
                ),
            ],
            QuantifierKind::Some,
        )
        .unwrap();
    builder
        .enter_relation("has_Book", Direction::L, "wrote")
        .unwrap();
    builder
        .enter_concrete_entity("42", Some("Dune".to_owned()), "Book", "book")
        .unwrap();
    builder
        .add_relation_property("since", PropertyPayload::IDENTITY)
        .unwrap();
    builder.build()
}

const FILTERED_PERSON: &str = "\
Start[0]
└── Entity[1]:Person#person
    └── Quant[2]:ALL{3,4,7}
        ├── Prop[3]:title<Identity>
        ├── Group[4]:SOME{5,6}
        │   ├── Prop[5]:name<like,jhone>
        │   └── Prop[6]:description<notEmpty,>
        └── Rel[7]:has_Book(L)#wrote
            └── Concrete[8]:Book#book(42|Dune)
                └── RelProp[9]:since<Identity>
";

#[test]
fn prints_tree() {
    let description = describe(&filtered_person()).unwrap();
    assert_eq!(description.to_string(), FILTERED_PERSON);
}

#[test]
fn printed_tree_parses_back() {
    let description = describe(&filtered_person()).unwrap();
    let parsed: Description = FILTERED_PERSON.parse().unwrap();
    assert_eq!(parsed, description);
    assert_eq!(parsed.to_string(), FILTERED_PERSON);
}

#[test]
fn empty_expression_reads_as_missing() {
    let mut builder = IrBuilder::new();
    builder.start().unwrap();
    builder.enter_entity("person", "Person").unwrap();
    builder
        .add_property(
            "description",
            PropertyPayload::Constraint(Constraint::new(ConstraintOp::Eq, Some(String::new()))),
        )
        .unwrap();
    let description = describe(&builder.build()).unwrap();
    let reparsed: Description = description.to_string().parse().unwrap();
    assert_eq!(reparsed, description);
}

#[test]
fn rejects_malformed_text() {
    let err = "Start[0]\n└── Widget[1]:x".parse::<Description>().unwrap_err();
    assert_eq!(err.line, 2);
    assert!(err.message.contains("Widget"), "{err}");

    let err = "Start[0]\n        └── Entity[1]:A#a".parse::<Description>().unwrap_err();
    assert_eq!(err.line, 2);

    let err = "Start[0]\nStart[1]".parse::<Description>().unwrap_err();
    assert_eq!(err.message, "more than one root");

    assert!("".parse::<Description>().is_err());
}
