use clap::Parser;
use declquery::{
    process_path, NodeKind, OutputFormat, ProcessOptions, Query, QueryBuilder, QueryError,
    SourceOptions, TraversalOptions, TypeRef,
};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "declquery")]
#[command(about = "Query declarations in source trees and serialized declaration trees", long_about = None, version)]
struct Cli {
    /// Source file, directory, or JSON declaration tree
    #[arg(value_name = "PATH")]
    path: String,

    /// Declaration kinds to report (repeatable, default: all)
    #[arg(long = "kind", value_name = "KIND")]
    kinds: Vec<NodeKind>,

    /// Exact declaration name
    #[arg(long, group = "name_filter")]
    name: Option<String>,

    /// Declaration name contains this text
    #[arg(long = "name-like", group = "name_filter")]
    name_like: Option<String>,

    /// Declaration name matches this regular expression
    #[arg(long = "name-matches", group = "name_filter")]
    name_matches: Option<String>,

    /// Case-insensitive --name-like and --name-matches
    #[arg(long = "ignore-case", short = 'i')]
    ignore_case: bool,

    /// Exact containing namespace ("" for the global namespace)
    #[arg(long, group = "namespace_filter")]
    namespace: Option<String>,

    /// Containing namespace contains this text
    #[arg(long = "namespace-like", group = "namespace_filter")]
    namespace_like: Option<String>,

    /// Accepted visibilities (repeatable)
    #[arg(long = "visibility", value_name = "VISIBILITY")]
    visibilities: Vec<String>,

    /// Required interfaces, all of them (repeatable)
    #[arg(long = "implements", value_name = "TYPE")]
    implements: Vec<String>,

    /// Only annotated declarations
    #[arg(long)]
    annotated: bool,

    /// Annotations, any of them (repeatable)
    #[arg(long = "annotated-with", value_name = "TYPE")]
    annotated_with: Vec<String>,

    /// Only generic declarations
    #[arg(long)]
    generic: bool,

    /// Constraints every type parameter must carry (repeatable)
    #[arg(long = "constraint", value_name = "CONSTRAINT")]
    constraints: Vec<String>,

    /// Directory recursion depth (default: unlimited)
    #[arg(long)]
    depth: Option<usize>,

    /// Only lower files with these extensions (e.g. --ext rs --ext ts)
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// JSON output instead of plain text
    #[arg(long)]
    json: bool,

    /// Traverse on the current thread only
    #[arg(long)]
    sequential: bool,

    /// Debug logging on stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={level}", env!("CARGO_CRATE_NAME"))));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<String, QueryError> {
    let options = ProcessOptions {
        source: SourceOptions {
            depth: cli.depth,
            extensions: cli.extensions.clone(),
        },
        traversal: TraversalOptions {
            parallel: !cli.sequential,
        },
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Plain
        },
    };
    let spec = build_query(&cli)?.build();
    process_path(&cli.path, &spec, options)
}

fn build_query(cli: &Cli) -> Result<QueryBuilder, QueryError> {
    let mut query = if cli.kinds.is_empty() {
        Query::all()
    } else {
        Query::of_kinds(cli.kinds.iter().copied())
    };

    if let Some(name) = &cli.name {
        query = query.with_name().equal_to(name.as_str());
    } else if let Some(fragment) = &cli.name_like {
        query = if cli.ignore_case {
            query.with_name().like_ignore_case(fragment.as_str())
        } else {
            query.with_name().like(fragment.as_str())
        };
    } else if let Some(pattern) = &cli.name_matches {
        query = query.with_name().matches(pattern, cli.ignore_case)?;
    }

    if let Some(namespace) = &cli.namespace {
        query = query.with_namespace().equal_to(namespace.as_str());
    } else if let Some(fragment) = &cli.namespace_like {
        query = query.with_namespace().like(fragment.as_str());
    }

    if !cli.visibilities.is_empty() {
        query = query
            .with_visibility()
            .one_of(cli.visibilities.iter().map(String::as_str))?;
    }

    if !cli.implements.is_empty() {
        query = query.with_interface().of_types().all_of(parse_types(&cli.implements)?);
    }

    if !cli.annotated_with.is_empty() {
        query = query
            .with_annotation()
            .of_types()
            .one_of(parse_types(&cli.annotated_with)?);
    } else if cli.annotated {
        query = query.with_annotation().any_type();
    }

    if !cli.constraints.is_empty() {
        query = query
            .with_generic_parameter()
            .with_constraint()
            .all_of(cli.constraints.iter().map(String::as_str))?
            .any_type();
    } else if cli.generic {
        query = query.with_generic_parameter().any_type();
    }

    Ok(query)
}

fn parse_types(names: &[String]) -> Result<Vec<TypeRef>, QueryError> {
    names.iter().map(|name| TypeRef::parse(name)).collect()
}
