//! Driver commands over files on disk.

#![allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tqlc::{batch, ontology, parse_translate_options, translate, CommandError};

const LIBRARY: &str = r#"
type Author { id: ID! name: String books: [Book] }
type Book { isbn: ID title: String }
type Query { author(id: ID, where: WhereClause): Author books: [Book] }
"#;

fn write(dir: &Path, name: &str, text: &str) -> String {
    let path: PathBuf = dir.join(name);
    fs::write(&path, text).unwrap();
    path.display().to_string()
}

fn options(args: &[String]) -> tqlc::TranslateOptions {
    parse_translate_options(args)
}

#[test]
fn translate_prints_the_tree() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "library.graphql", LIBRARY);
    let query = write(dir.path(), "q.graphql", "{ books { title } }");

    let output = translate(&options(&[schema, format!("--query={query}")])).unwrap();
    assert_eq!(
        output,
        "\
Start[0]
└── Entity[1]:Book#books
    └── Quant[2]:ALL{3}
        └── Prop[3]:title<Identity>
"
    );
}

#[test]
fn translate_with_variables_and_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "library.graphql", LIBRARY);
    let query = write(
        dir.path(),
        "q.graphql",
        "query One($id: ID) { author(id: $id) { name } }",
    );
    let vars = write(dir.path(), "vars.json", r#"{ "id": "a7" }"#);

    let output = translate(&options(&[
        schema,
        format!("--query={query}"),
        format!("--vars={vars}"),
        "--operation=One".to_owned(),
        "--format=json".to_owned(),
    ]))
    .unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["name"], "One");
    assert_eq!(json["ontology"], "default");
    assert_eq!(json["slots"][1]["node"]["Entity"]["concrete"]["id"], "a7");
    assert_eq!(json["slots"].as_array().map(Vec::len), Some(4));
}

#[test]
fn ontology_prints_json() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "library.graphql", LIBRARY);

    let output = ontology(&options(&[schema, "--name=library".to_owned()])).unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["name"], "library");
    assert_eq!(json["relationshipTypes"][0]["rType"], "has_Book");
}

#[test]
fn translate_with_a_loaded_ontology() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "library.graphql", LIBRARY);
    let derived = ontology(&options(&[schema.clone(), "--name=stored".to_owned()])).unwrap();
    let stored = write(dir.path(), "ontology.json", &derived);
    let query = write(dir.path(), "q.graphql", "{ books { title } }");

    let output = translate(&options(&[
        schema,
        format!("--query={query}"),
        format!("--ontology={stored}"),
        "--format=json".to_owned(),
    ]))
    .unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["ontology"], "stored");
}

#[test]
fn query_syntax_errors_are_rendered_against_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "library.graphql", LIBRARY);
    let query = write(dir.path(), "broken.graphql", "{ books { title }");

    let err = translate(&options(&[schema, format!("--query={query}")])).unwrap_err();
    match err {
        CommandError::Syntax { rendered } => {
            assert!(rendered.contains("broken.graphql"), "{rendered}");
        }
        other => panic!("expected a rendered syntax error, found {other:?}"),
    }
}

#[test]
fn schema_syntax_errors_name_the_schema_file() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "bad.graphql", "type Book {");
    let query = write(dir.path(), "q.graphql", "{ books { title } }");

    let err = translate(&options(&[schema, format!("--query={query}")])).unwrap_err();
    assert!(
        matches!(&err, CommandError::Syntax { rendered } if rendered.contains("bad.graphql")),
        "{err:?}"
    );
}

#[test]
fn variables_must_be_an_object() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "library.graphql", LIBRARY);
    let query = write(dir.path(), "q.graphql", "{ books { title } }");
    let vars = write(dir.path(), "vars.json", "[1, 2]");

    let err = translate(&options(&[
        schema,
        format!("--query={query}"),
        format!("--vars={vars}"),
    ]))
    .unwrap_err();
    assert!(matches!(err, CommandError::NotAnObject { .. }), "{err:?}");
}

#[test]
fn batch_keeps_input_order_and_isolates_failures() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "library.graphql", LIBRARY);
    let mut args = vec![schema];
    for i in 0..8 {
        args.push(write(dir.path(), &format!("q{i}.graphql"), "{ books { isbn title } }"));
    }
    args.push(write(dir.path(), "bad.graphql", "{ books { pages } }"));

    let outcome = batch(&options(&args)).unwrap();
    assert_eq!(outcome.entries.len(), 9);
    assert_eq!(outcome.failures(), 1);
    for (i, (path, result)) in outcome.entries.iter().take(8).enumerate() {
        assert!(path.ends_with(&format!("q{i}.graphql")), "{path}");
        assert!(result.as_ref().is_ok_and(|ir| ir.contains("Quant[2]:ALL{3,4}")));
    }

    let rendered = outcome.render();
    assert!(rendered.contains("bad.graphql =="), "{rendered}");
    assert!(
        rendered.contains("error: query does not match the schema: unknown field `pages`"),
        "{rendered}"
    );
}
