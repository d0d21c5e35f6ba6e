//! TQL command line driver.
//!
//! Translates GraphQL queries into Traversal IR.

use tqlc::{batch, init_tracing, ontology, parse_translate_options, translate, CommandError};

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];
    let options = parse_translate_options(&args[2..]);

    match command.as_str() {
        "translate" => {
            if options.inputs.is_empty() || options.query.is_none() {
                eprintln!("Usage: tqlc translate <schema.graphql>... --query=<file> [options]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --vars=<file>        Query variables (JSON object)");
                eprintln!("  --ontology=<file>    Use this ontology instead of deriving one");
                eprintln!("  --operation=<name>   Operation to translate");
                eprintln!("  --format=<fmt>       Output: tree (default), json");
                std::process::exit(1);
            }
            finish(translate(&options));
        }
        "ontology" => {
            if options.inputs.is_empty() {
                eprintln!("Usage: tqlc ontology <schema.graphql>... [--name=<name>]");
                std::process::exit(1);
            }
            finish(ontology(&options));
        }
        "batch" => {
            if options.inputs.len() < 2 {
                eprintln!("Usage: tqlc batch <schema.graphql> <query>... [options]");
                std::process::exit(1);
            }
            match batch(&options) {
                Ok(outcome) => {
                    print!("{}", outcome.render());
                    let failures = outcome.failures();
                    if failures > 0 {
                        eprintln!("error: {failures} of {} queries failed", outcome.entries.len());
                        std::process::exit(1);
                    }
                }
                Err(e) => fail(&e),
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("tqlc {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn finish(result: Result<String, CommandError>) {
    match result {
        Ok(output) => {
            print!("{output}");
            if !output.ends_with('\n') {
                println!();
            }
        }
        Err(e) => fail(&e),
    }
}

fn fail(error: &CommandError) -> ! {
    match error {
        CommandError::Syntax { rendered } => eprint!("{rendered}"),
        other => eprintln!("error: {other}"),
    }
    std::process::exit(1);
}

fn print_usage() {
    println!("TQL: GraphQL to Traversal IR translator");
    println!();
    println!("Usage: tqlc <command> [options]");
    println!();
    println!("Commands:");
    println!("  translate <schema>... --query=<file>   Translate one query");
    println!("  ontology <schema>...                   Print the derived ontology as JSON");
    println!("  batch <schema> <query>...              Translate several queries in parallel");
    println!("  help                                   Show this help message");
    println!("  version                                Show version information");
    println!();
    println!("Options:");
    println!("  --query=<file>       Query document to translate");
    println!("  --vars=<file>        Query variables (JSON object)");
    println!("  --ontology=<file>    Use this ontology instead of deriving one");
    println!("  --operation=<name>   Operation to translate in a multi-operation document");
    println!("  --name=<name>        Name of the derived ontology (default: default)");
    println!("  --format=<fmt>       Output: tree (default), json");
    println!();
    println!("Environment:");
    println!("  RUST_LOG=tql_translate=debug   Log translation steps");
    println!("  TQL_LOG_TREE=1                 Log as a tree of per-field spans");
    println!();
    println!("Examples:");
    println!("  tqlc translate library.graphql --query=books.graphql");
    println!("  tqlc translate library.graphql --query=find.graphql --vars=find.json --format=json");
    println!("  tqlc ontology library.graphql --name=library");
    println!("  tqlc batch library.graphql queries/*.graphql");
}
