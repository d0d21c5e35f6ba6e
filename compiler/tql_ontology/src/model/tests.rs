use pretty_assertions::assert_eq;

use super::*;

#[test]
fn reads_camel_case_json_with_defaults() {
    let ontology: Ontology = serde_json::from_str(
        r#"{
            "name": "library",
            "entityTypes": [
                { "eType": "Book", "name": "Book", "properties": ["title"], "idFields": ["isbn"] },
                { "eType": "Author", "name": "Author" }
            ],
            "relationshipTypes": [{
                "name": "wrote",
                "rType": "has_Book",
                "directional": true,
                "ePairs": [{
                    "name": "Author->Book",
                    "referenceType": "ONE_TO_MANY",
                    "sideAType": "Author",
                    "sideBType": "Book"
                }]
            }],
            "properties": [{ "name": "title", "pType": "title", "type": "string" }]
        }"#,
    )
    .unwrap();

    assert_eq!(ontology.entity_types[0].id_field(), "isbn");
    assert_eq!(ontology.entity_types[1].id_field(), DEFAULT_ID_FIELD);
    assert!(ontology.entity_types[1].properties.is_empty());

    let wrote = &ontology.relationship_types[0];
    assert_eq!(wrote.e_pairs[0].reference_type, RelationReferenceType::OneToMany);
    assert_eq!(wrote.pair_from("Author").map(|p| p.side_b_type.as_str()), Some("Book"));
    assert_eq!(wrote.pair_to("Book").map(|p| p.side_a_type.as_str()), Some("Author"));
    assert!(wrote.pair_from("Book").is_none());

    assert_eq!(ontology.properties[0], Property::new("title", "string"));
}

#[test]
fn writes_camel_case_keys() {
    let pair = EPair {
        name: EPair::default_name("Author", "Book"),
        side_a_type: "Author".to_owned(),
        side_b_type: "Book".to_owned(),
        ..EPair::default()
    };
    let json = serde_json::to_value(&pair).unwrap();
    assert_eq!(json["name"], "Author->Book");
    assert_eq!(json["sideAType"], "Author");
    assert_eq!(json["referenceType"], "ONE_TO_ONE");
}

#[test]
fn entity_builder() {
    let book = EntityType::new("Book")
        .with_properties(["title", "year"])
        .with_id_field("isbn");
    assert_eq!(book.e_type, "Book");
    assert!(book.has_property("year"));
    assert!(!book.has_property("isbn"));
    assert_eq!(book.id_field(), "isbn");
}
