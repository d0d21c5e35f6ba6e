use pretty_assertions::assert_eq;
use serde_json::json;
use tql_graphql::{Engine, Request, Schema};
use tql_ir::Node;
use tql_ontology::{derive_ontology, EPair};

use super::*;

const SHOP: &str = r#"
    type Customer { id: ID! name: String vip: Boolean orders: [Order] }
    type Order { number: Int total: Float status: Status placedBy: Customer }
    enum Status { OPEN CLOSED }
    type Query { customer: Customer orders: [Order] }
"#;

fn shop() -> (Schema, Accessor) {
    let schema = Schema::with_prelude([SHOP]).unwrap();
    let ontology = derive_ontology("shop", &schema).unwrap();
    (schema, Accessor::new(ontology))
}

fn relation(directional: bool) -> RelationshipType {
    RelationshipType {
        name: "placedBy".to_owned(),
        r_type: "has_Customer".to_owned(),
        directional,
        e_pairs: vec![EPair {
            name: EPair::default_name("Order", "Customer"),
            side_a_type: "Order".to_owned(),
            side_b_type: "Customer".to_owned(),
            ..EPair::default()
        }],
        properties: Vec::new(),
    }
}

#[test]
fn relation_direction_follows_the_pair_side() {
    assert_eq!(direction(&relation(true), "Order"), Direction::R);
    assert_eq!(direction(&relation(true), "Customer"), Direction::L);
    assert_eq!(direction(&relation(true), "Invoice"), Direction::R);
    assert_eq!(direction(&relation(false), "Order"), Direction::RL);
}

#[test]
fn mock_values_by_type() {
    let (schema, accessor) = shop();
    let mut strategy = TraversalStrategy::new(&accessor, IrBuilder::new()).unwrap();
    let data = Engine::new(&schema)
        .execute(
            &Request::new("{ customer { id name vip orders { number total status } } }"),
            &mut strategy,
        )
        .unwrap();
    assert_eq!(
        data,
        json!({
            "customer": {
                "id": "id_id",
                "name": "name",
                "vip": true,
                "orders": [{ "number": 1, "total": 1.0, "status": "OPEN" }],
            }
        })
    );
}

#[test]
fn memo_holds_the_entity_after_a_relation() {
    let (schema, accessor) = shop();
    let mut strategy = TraversalStrategy::new(&accessor, IrBuilder::new()).unwrap();
    Engine::new(&schema)
        .execute(
            &Request::new("{ orders { placedBy { __typename } } }"),
            &mut strategy,
        )
        .unwrap();

    let placed_by = ResultPath::root().child("orders").index(0).child("placedBy");
    let entity = strategy.position(&placed_by).unwrap();
    let ir = strategy.finish();
    assert!(matches!(ir.node(entity), Some(Node::Entity(e)) if e.type_name == "Customer"));
    let relation = ir.parent(entity).unwrap();
    assert!(matches!(ir.node(relation), Some(Node::Relation(r)) if r.tag == "placedBy"));
}

#[test]
fn a_started_builder_is_rejected() {
    let (_, accessor) = shop();
    let mut builder = IrBuilder::new();
    builder.start().unwrap();
    assert_eq!(
        TraversalStrategy::new(&accessor, builder).unwrap_err(),
        TranslateError::BuilderInvariantViolation(tql_ir::BuilderError::AlreadyStarted)
    );
}
