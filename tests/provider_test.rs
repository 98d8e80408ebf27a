use declquery::provider::{self, DeclarationProvider, JsonProvider, SourceOptions, SourceProvider};
use declquery::{
    process_path, OutputFormat, ProcessOptions, Query, QueryError, QuerySpec, ResultEntity,
    NodeKind,
};

const RUST_FIXTURE: &str = "tests/fixtures/rust/shapes.rs";
const TS_FIXTURE: &str = "tests/fixtures/ts/store.ts";
const ZOO_FIXTURE: &str = "tests/fixtures/ts/zoo.ts";
const JSON_FIXTURE: &str = "tests/fixtures/tree.json";
const FIXTURE_DIR: &str = "tests/fixtures";

fn full_names(results: Vec<ResultEntity>) -> Vec<String> {
    let mut names: Vec<String> = results.into_iter().map(|r| r.full_name).collect();
    names.sort();
    names
}

fn run_source(path: &str, spec: &QuerySpec) -> Vec<String> {
    let provider = SourceProvider::new(path, SourceOptions::default());
    let results = spec.execute(&provider);
    assert!(results.is_ok(), "execute failed: {:?}", results.err());
    full_names(results.unwrap())
}

fn run_json(spec: &QuerySpec) -> Vec<String> {
    full_names(spec.execute(&JsonProvider::new(JSON_FIXTURE)).unwrap())
}

#[test]
fn test_rust_interfaces_include_supertraits() {
    let spec = Query::types().with_interface().of_type_name("Named").unwrap().build();
    assert_eq!(run_source(RUST_FIXTURE, &spec), vec!["shapes.Circle", "shapes.Shape"]);

    let spec = Query::types().with_interface().of_type_name("fmt::Display").unwrap().build();
    assert_eq!(run_source(RUST_FIXTURE, &spec), vec!["shapes.Circle"]);

    let spec = Query::types().with_interface().of_type_name("Copy").unwrap().build();
    assert_eq!(run_source(RUST_FIXTURE, &spec), vec!["shapes.Circle"]);
}

#[test]
fn test_rust_generic_constraints() {
    let spec = Query::all()
        .with_generic_parameter()
        .with_constraint()
        .one_of(["value", "new"])
        .unwrap()
        .any_type()
        .build();
    assert_eq!(run_source(RUST_FIXTURE, &spec), vec!["shapes.Canvas<S, C>"]);

    let spec = Query::all().with_generic_parameter().any_type().build();
    assert_eq!(
        run_source(RUST_FIXTURE, &spec),
        vec!["shapes.Canvas<S, C>", "shapes.solids.volume<T>"]
    );
}

#[test]
fn test_rust_visibility_and_annotations() {
    let spec = Query::types().with_visibility().equal_to("internal").unwrap().build();
    assert_eq!(run_source(RUST_FIXTURE, &spec), vec!["shapes.Canvas<S, C>"]);

    let spec = Query::methods().with_visibility().equal_to("private").unwrap().build();
    assert_eq!(run_source(RUST_FIXTURE, &spec), vec!["shapes.Circle.diameter"]);

    let spec = Query::all().with_annotation().of_type_name("non_exhaustive").unwrap().build();
    assert_eq!(run_source(RUST_FIXTURE, &spec), vec!["shapes.solids.Cube"]);
}

#[test]
fn test_rust_members_and_parameters() {
    let spec = Query::parameters().with_name().equal_to("radius").build();
    assert_eq!(run_source(RUST_FIXTURE, &spec), vec!["shapes.Circle.new.radius"]);

    let spec = Query::of_kinds([NodeKind::Field])
        .with_namespace()
        .equal_to("shapes")
        .build();
    assert_eq!(
        run_source(RUST_FIXTURE, &spec),
        vec![
            "shapes.Canvas<S, C>.color",
            "shapes.Canvas<S, C>.shapes",
            "shapes.Circle.radius",
            "shapes.Fill.Hatched",
            "shapes.Fill.Solid",
        ]
    );
}

#[test]
fn test_typescript_classes_and_interfaces() {
    let spec = Query::classes().with_interface().of_type_name("Entity").unwrap().build();
    assert_eq!(run_source(TS_FIXTURE, &spec), vec!["store.UserStore<T>"]);

    let spec = Query::classes().with_visibility().equal_to("internal").unwrap().build();
    assert_eq!(
        run_source(TS_FIXTURE, &spec),
        vec!["store.Admin.Secret", "store.Counter<N>"]
    );

    let spec = Query::of_kinds([NodeKind::Property])
        .with_namespace()
        .equal_to("store")
        .with_name()
        .equal_to("size")
        .build();
    assert_eq!(run_source(TS_FIXTURE, &spec), vec!["store.UserStore<T>.size"]);
}

#[test]
fn test_typescript_base_classes_pass_on_interfaces() {
    let spec = Query::classes().with_interface().of_type_name("Named").unwrap().build();
    assert_eq!(
        run_source(ZOO_FIXTURE, &spec),
        vec!["zoo.Animal", "zoo.Dog", "zoo.Puppy"]
    );

    let spec = Query::classes().with_interface().any_type().with_name().equal_to("Rock").build();
    assert_eq!(run_source(ZOO_FIXTURE, &spec), vec!["zoo.Rock"]);
}

#[test]
fn test_typescript_decorators_and_constraints() {
    let spec = Query::all().with_annotation().of_type_name("Logged").unwrap().build();
    assert_eq!(run_source(TS_FIXTURE, &spec), vec!["store.UserStore<T>.audit"]);

    let spec = Query::all().with_annotation().of_type_name("Injectable").unwrap().build();
    assert_eq!(run_source(TS_FIXTURE, &spec), vec!["store.UserStore<T>"]);

    let constrained = |constraint: &str| {
        let spec = Query::all()
            .with_generic_parameter()
            .with_constraint()
            .equal_to(constraint)
            .unwrap()
            .any_type()
            .build();
        run_source(TS_FIXTURE, &spec)
    };
    assert_eq!(constrained("reference"), vec!["store.UserStore<T>"]);
    assert_eq!(constrained("value"), vec!["store.Counter<N>"]);
    assert_eq!(constrained("new"), vec!["store.createStore<F>"]);
}

#[test]
fn test_json_tree_scenarios() {
    let spec = Query::classes().with_name().like("Widget").build();
    assert_eq!(run_json(&spec), vec!["Acme.Widget", "Acme.WidgetFactory"]);

    let spec = Query::all().with_name().equal_to(".ctor").build();
    assert!(run_json(&spec).is_empty());

    let spec = Query::types().with_namespace().equal_to("Acme.Data").build();
    assert_eq!(run_json(&spec), vec!["Acme.Data.Key", "Acme.Data.Repository<T>"]);
}

#[test]
fn test_json_interface_closure_and_generics() {
    let spec = Query::types().with_interface().of_type_name("Acme.IEntity").unwrap().build();
    assert_eq!(run_json(&spec), vec!["Acme.Data.Repository<T>", "Acme.IRepository<T>"]);

    let spec = Query::types()
        .with_interface()
        .of_type_name("System.IEquatable<Acme.Data.Key>")
        .unwrap()
        .build();
    assert_eq!(run_json(&spec), vec!["Acme.Data.Key"]);

    let spec = Query::types()
        .with_generic_parameter()
        .with_constraint()
        .all_of(["reference", "new"])
        .unwrap()
        .any_type()
        .build();
    assert_eq!(run_json(&spec), vec!["Acme.Data.Repository<T>"]);
}

#[test]
fn test_for_path_picks_provider() {
    let json = provider::for_path(JSON_FIXTURE, SourceOptions::default()).unwrap();
    let root = json.load().unwrap();
    assert!(root.children.iter().any(|c| c.name == "Acme"));

    let source = provider::for_path(RUST_FIXTURE, SourceOptions::default()).unwrap();
    let root = source.load().unwrap();
    assert_eq!(root.children[0].name, "shapes");

    let err = provider::for_path("tests/fixtures/missing.json", SourceOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err, QueryError::PathNotFound(_)));
}

#[test]
fn test_process_path_directory() {
    let spec = Query::classes().with_name().like("Store").build();
    let output = process_path(FIXTURE_DIR, &spec, ProcessOptions::default()).unwrap();
    assert_eq!(output, "ts.store.UserStore<T>\n");
}

#[test]
fn test_process_path_extension_filter() {
    let spec = Query::types().build();
    let options = ProcessOptions {
        source: SourceOptions {
            depth: None,
            extensions: vec!["rs".to_string()],
        },
        ..ProcessOptions::default()
    };
    let output = process_path(FIXTURE_DIR, &spec, options).unwrap();
    assert!(output.contains("rust.shapes.Circle"));
    assert!(!output.contains("ts.store"));
}

#[test]
fn test_process_path_json_output() {
    let spec = Query::classes().with_name().equal_to("Widget").build();
    let options = ProcessOptions {
        format: OutputFormat::Json,
        ..ProcessOptions::default()
    };
    let output = process_path(JSON_FIXTURE, &spec, options).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["count"], 1);
    assert_eq!(value["results"][0]["full_name"], "Acme.Widget");
}
