use pretty_assertions::assert_eq;

use super::*;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

#[test]
fn options_and_positionals() {
    let options = parse_translate_options(&args(&[
        "schema.graphql",
        "--query=q.graphql",
        "extra.graphql",
        "--vars=v.json",
        "--operation=Find",
        "--format=json",
        "--name=library",
    ]));
    assert_eq!(
        options,
        TranslateOptions {
            inputs: vec![PathBuf::from("schema.graphql"), PathBuf::from("extra.graphql")],
            query: Some(PathBuf::from("q.graphql")),
            variables: Some(PathBuf::from("v.json")),
            ontology: None,
            operation: Some("Find".to_owned()),
            name: Some("library".to_owned()),
            format: OutputFormat::Json,
        }
    );
    assert_eq!(options.ontology_name(), "library");
}

#[test]
fn unknown_options_are_skipped() {
    let options = parse_translate_options(&args(&["--colour=always", "--format=yaml", "s.graphql"]));
    assert_eq!(options.inputs, vec![PathBuf::from("s.graphql")]);
    assert_eq!(options.format, OutputFormat::Tree);
    assert_eq!(options.ontology_name(), TranslateOptions::DEFAULT_ONTOLOGY_NAME);
}

#[test]
fn merge_overrides_set_options_only() {
    let mut base = parse_translate_options(&args(&["a.graphql", "--query=q1", "--format=json"]));
    base.merge(&parse_translate_options(&args(&["b.graphql", "--query=q2"])));
    assert_eq!(
        base.inputs,
        vec![PathBuf::from("a.graphql"), PathBuf::from("b.graphql")]
    );
    assert_eq!(base.query, Some(PathBuf::from("q2")));
    assert_eq!(base.format, OutputFormat::Json);
}

#[test]
fn missing_inputs_are_usage_errors() {
    let err = translate(&TranslateOptions::default()).unwrap_err();
    assert!(matches!(err, CommandError::Usage(_)), "{err:?}");

    let err = ontology(&TranslateOptions::default()).unwrap_err();
    assert!(matches!(err, CommandError::Usage(_)), "{err:?}");

    let only_schema = parse_translate_options(&args(&["schema.graphql"]));
    let err = batch(&only_schema).unwrap_err();
    assert!(matches!(err, CommandError::Usage(_)), "{err:?}");
}

#[test]
fn unreadable_files_name_the_path() {
    let options = parse_translate_options(&args(&["/nonexistent/schema.graphql"]));
    let err = ontology(&options).unwrap_err();
    assert!(
        err.to_string().starts_with("cannot read `/nonexistent/schema.graphql`"),
        "{err}"
    );
}
