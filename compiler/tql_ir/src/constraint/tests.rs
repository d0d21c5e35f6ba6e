use pretty_assertions::assert_eq;

use super::*;

#[test]
fn identifier_and_alias_parse_to_same_op() {
    assert_eq!("notEmpty".parse::<ConstraintOp>(), Ok(ConstraintOp::NotEmpty));
    assert_eq!("not empty".parse::<ConstraintOp>(), Ok(ConstraintOp::NotEmpty));
    assert_eq!("in set".parse::<ConstraintOp>(), Ok(ConstraintOp::InSet));
    assert_eq!("match_phrase".parse::<ConstraintOp>(), Ok(ConstraintOp::MatchPhrase));
}

#[test]
fn every_op_parses_from_its_own_name() {
    for op in ConstraintOp::ALL {
        assert_eq!(op.as_str().parse::<ConstraintOp>(), Ok(op));
        if let Some(alias) = op.alias() {
            assert_eq!(alias.parse::<ConstraintOp>(), Ok(op));
        }
    }
}

#[test]
fn unknown_operator_is_rejected() {
    assert_eq!(
        "approximately".parse::<ConstraintOp>(),
        Err(UnknownOperator("approximately".to_owned()))
    );
}

#[test]
fn payload_display() {
    let like = PropertyPayload::Constraint(Constraint::new(
        ConstraintOp::Like,
        Some("jhone".to_owned()),
    ));
    assert_eq!(like.to_string(), "like,jhone");
    let not_empty = PropertyPayload::Constraint(Constraint::unary(ConstraintOp::NotEmpty));
    assert_eq!(not_empty.to_string(), "notEmpty,");
    assert_eq!(PropertyPayload::IDENTITY.to_string(), "Identity");
}

#[test]
fn missing_constraint_means_identity() {
    assert_eq!(PropertyPayload::from(None), PropertyPayload::IDENTITY);
    let eq = Constraint::new(ConstraintOp::Eq, Some("1".to_owned()));
    let payload = PropertyPayload::from(Some(eq.clone()));
    assert_eq!(payload.constraint(), Some(&eq));
    assert_eq!(payload.projection(), None);
}
