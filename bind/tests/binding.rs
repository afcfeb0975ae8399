use std::fs;
use std::path::PathBuf;

use config_schema_bind::{ArgumentBinder, BindError, Binding, Mapping, ParseError, load_package};
use config_schema_core::{ConfigSchema, EnumType, FieldSchema, ScalarType, TypeDescriptor, Value};
use serde::Deserialize;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn binder(schemas: impl IntoIterator<Item = ConfigSchema>) -> ArgumentBinder {
    ArgumentBinder::builder()
        .schemas(schemas)
        .look_for_args_file(false)
        .program("prog")
        .build()
        .expect("schemas should build")
}

fn basic_schema() -> ConfigSchema {
    ConfigSchema::new("basic")
        .with_field(FieldSchema::new("foo", TypeDescriptor::Int))
        .with_field(FieldSchema::new("bar", TypeDescriptor::Float))
        .with_field(FieldSchema::new("baz", TypeDescriptor::Str))
        .with_field(FieldSchema::new("flag", TypeDescriptor::Bool).with_default(true))
}

fn flag_of(binding: &Binding) -> &Value {
    binding.instances[0].get("flag").expect("flag is bound")
}

#[test]
fn test_missing_required_names_every_field() {
    let err = binder([basic_schema()])
        .bind_args(Vec::<String>::new())
        .unwrap_err();
    match err {
        BindError::MissingRequired(fields) => assert_eq!(fields, vec!["foo", "bar", "baz"]),
        other => panic!("expected missing required, got {other}"),
    }
}

#[test]
fn test_basic_scenario() {
    let binding = binder([basic_schema()])
        .bind_args(["--foo", "1", "--bar", "2.5", "--baz", "x"])
        .unwrap();
    let basic = &binding.instances[0];
    assert_eq!(basic.schema, "basic");
    assert_eq!(basic.get("foo"), Some(&Value::Int(1)));
    assert_eq!(basic.get("bar"), Some(&Value::Float(2.5)));
    assert_eq!(basic.get("baz"), Some(&Value::from("x")));
    assert_eq!(basic.get("flag"), Some(&Value::Bool(true)));
    assert!(!binding.has_leftovers());
}

#[test]
fn test_defaults_fill_absent_fields() {
    let schema = ConfigSchema::new("defaults")
        .with_field(FieldSchema::new("foo", TypeDescriptor::Int).with_default(42))
        .with_field(FieldSchema::new("ratio", TypeDescriptor::Float).with_default(0.5))
        .with_field(FieldSchema::new("name", TypeDescriptor::Str).with_default("toto"))
        .with_field(
            FieldSchema::new("xs", TypeDescriptor::list(TypeDescriptor::Int))
                .with_factory(|| Value::from(vec![1, 2])),
        )
        .with_field(FieldSchema::new("opt", TypeDescriptor::optional(TypeDescriptor::Str)));
    let binder = binder([schema]);

    for binding in [
        binder.bind_args(Vec::<String>::new()).unwrap(),
        binder.bind_mapping(&Mapping::new()).unwrap(),
    ] {
        let inst = &binding.instances[0];
        assert_eq!(inst.get("foo"), Some(&Value::Int(42)));
        assert_eq!(inst.get("ratio"), Some(&Value::Float(0.5)));
        assert_eq!(inst.get("name"), Some(&Value::from("toto")));
        assert_eq!(inst.get("xs"), Some(&Value::from(vec![1, 2])));
        assert_eq!(inst.get("opt"), Some(&Value::None));
    }
}

#[test]
fn test_true_defaulted_bool_matrix() {
    let binder = binder([basic_schema()]);
    let base = ["--foo", "1", "--bar", "2", "--baz", "x"];
    let bind = |extra: &[&str]| {
        let tokens: Vec<&str> = base.iter().chain(extra).copied().collect();
        binder.bind_args(tokens)
    };

    assert_eq!(flag_of(&bind(&["--no_flag"]).unwrap()), &Value::Bool(false));
    assert_eq!(flag_of(&bind(&["--flag"]).unwrap()), &Value::Bool(true));
    assert_eq!(flag_of(&bind(&["--flag", "false"]).unwrap()), &Value::Bool(false));
    assert_eq!(flag_of(&bind(&["--flag", "true"]).unwrap()), &Value::Bool(true));

    for token in ["YES", "y", "T", "1", "True"] {
        assert_eq!(flag_of(&bind(&["--flag", token]).unwrap()), &Value::Bool(true));
    }
    for token in ["NO", "n", "F", "0", "FALSE"] {
        assert_eq!(flag_of(&bind(&["--flag", token]).unwrap()), &Value::Bool(false));
    }

    match bind(&["--flag", "maybe"]).unwrap_err() {
        BindError::Value(e) => {
            assert_eq!(e.field, "flag");
            assert_eq!(e.token, "maybe");
        }
        other => panic!("expected value error, got {other}"),
    }
}

#[test]
fn test_false_defaulted_bool_has_no_negation() {
    let schema = ConfigSchema::new("s")
        .with_field(FieldSchema::new("verbose", TypeDescriptor::Bool).with_default(false));
    let binder = ArgumentBinder::builder()
        .schema(schema)
        .look_for_args_file(false)
        .lenient(true)
        .build()
        .unwrap();

    let binding = binder.bind_args(["--verbose"]).unwrap();
    assert_eq!(binding.instances[0].get("verbose"), Some(&Value::Bool(true)));

    let binding = binder.bind_args(["--no_verbose"]).unwrap();
    assert_eq!(binding.instances[0].get("verbose"), Some(&Value::Bool(false)));
    assert_eq!(binding.leftover_tokens, vec!["--no_verbose"]);
}

#[test]
fn test_optional_bool_scenario() {
    let schema = ConfigSchema::new("s").with_field(
        FieldSchema::new("opt", TypeDescriptor::optional(TypeDescriptor::Bool))
            .with_default(Value::None),
    );
    let binder = binder([schema]);

    let binding = binder.bind_args(["--opt", "True"]).unwrap();
    assert_eq!(binding.instances[0].get("opt"), Some(&Value::Bool(true)));

    let binding = binder.bind_args(Vec::<String>::new()).unwrap();
    assert_eq!(binding.instances[0].get("opt"), Some(&Value::None));

    assert!(matches!(
        binder.bind_args(["--opt"]).unwrap_err(),
        BindError::ExpectedArgument { .. }
    ));
}

#[test]
fn test_enum_accepts_members_and_rejects_others() {
    let level = EnumType::new("Level", ScalarType::Int)
        .with_member("low", 1)
        .with_member("high", 10);
    let schema = ConfigSchema::new("s")
        .with_field(FieldSchema::new(
            "color",
            TypeDescriptor::Enum(EnumType::of_strings("Color", &["red", "blue"])),
        ))
        .with_field(FieldSchema::new("level", TypeDescriptor::Enum(level)).with_default(1));
    let binder = binder([schema]);

    let binding = binder.bind_args(["--color", "blue"]).unwrap();
    let inst = &binding.instances[0];
    assert_eq!(inst.get("color").and_then(Value::enum_member), Some("blue"));
    assert_eq!(inst.get("level").and_then(Value::enum_member), Some("low"));

    let binding = binder.bind_args(["--color", "red", "--level", "10"]).unwrap();
    assert_eq!(
        binding.instances[0].get("level").and_then(Value::enum_member),
        Some("high")
    );

    for tokens in [["--color", "green"], ["--color", "RED"]] {
        assert!(matches!(binder.bind_args(tokens).unwrap_err(), BindError::Value(_)));
    }
    let err = binder
        .bind_args(["--color", "red", "--level", "5"])
        .unwrap_err();
    assert!(err.to_string().contains("invalid choice"));
}

#[test]
fn test_list_fields() {
    let schema = ConfigSchema::new("s")
        .with_field(FieldSchema::new("xs", TypeDescriptor::list(TypeDescriptor::Int)))
        .with_field(
            FieldSchema::new("names", TypeDescriptor::list(TypeDescriptor::Str))
                .with_default(vec!["a"]),
        );
    let binder = binder([schema]);

    let binding = binder.bind_args(["--xs", "1", "2", "3"]).unwrap();
    assert_eq!(binding.instances[0].get("xs"), Some(&Value::from(vec![1, 2, 3])));
    assert_eq!(binding.instances[0].get("names"), Some(&Value::from(vec!["a"])));

    assert!(matches!(
        binder.bind_args(Vec::<String>::new()).unwrap_err(),
        BindError::MissingRequired(fields) if fields == ["xs"]
    ));
    assert!(matches!(
        binder.bind_args(["--xs"]).unwrap_err(),
        BindError::MissingRequired(fields) if fields == ["xs"]
    ));

    let binding = binder.bind_args(["--xs", "1", "--names"]).unwrap();
    assert_eq!(binding.instances[0].get("names"), Some(&Value::List(Vec::new())));

    assert!(matches!(
        binder.bind_args(["--xs", "1", "two"]).unwrap_err(),
        BindError::Value(e) if e.token == "two"
    ));
}

#[test]
fn test_mapping_round_trip() {
    let level = EnumType::new("Level", ScalarType::Int)
        .with_member("low", 1)
        .with_member("high", 10);
    let schema = basic_schema()
        .with_field(FieldSchema::new("level", TypeDescriptor::Enum(level)).with_default(10))
        .with_field(
            FieldSchema::new("xs", TypeDescriptor::list(TypeDescriptor::Float))
                .with_default(vec![0.5]),
        )
        .with_field(FieldSchema::new(
            "opt",
            TypeDescriptor::optional(TypeDescriptor::Int),
        ));
    let binder = binder([schema]);

    let original = binder
        .bind_args(["--foo", "7", "--bar", "-1.5", "--baz", "q", "--no_flag", "--xs", "1", "2"])
        .unwrap();
    let rebound = binder.bind_mapping(&original.to_mapping()).unwrap();
    assert_eq!(rebound, original);

    let json = serde_json::to_string(&original.instances[0].to_json()).unwrap();
    assert_eq!(binder.bind_json_str(&json).unwrap(), original);
}

#[test]
fn test_mapping_conversions() {
    let binder = binder([basic_schema()]);
    let mut mapping = Mapping::new();
    mapping.insert("foo".into(), Value::Int(12));
    mapping.insert("bar".into(), Value::Int(3));
    mapping.insert("baz".into(), Value::from("42"));
    mapping.insert("extra".into(), Value::from(true));

    let binding = binder.bind_mapping(&mapping).unwrap();
    assert_eq!(binding.instances[0].get("bar"), Some(&Value::Float(3.0)));
    assert!(binding.leftover_fields.is_empty());

    mapping.insert("flag".into(), Value::None);
    assert!(matches!(binder.bind_mapping(&mapping).unwrap_err(), BindError::Value(_)));
}

#[test]
fn test_multiple_schemas_and_extra_arguments() {
    let model = ConfigSchema::new("model")
        .with_field(FieldSchema::new("lr", TypeDescriptor::Float))
        .with_field(FieldSchema::new("depth", TypeDescriptor::Int).with_default(4));
    let data = ConfigSchema::new("data")
        .with_field(FieldSchema::new("path", TypeDescriptor::Str))
        .with_field(FieldSchema::new("shuffle", TypeDescriptor::Bool).with_default(true));
    let binder = ArgumentBinder::builder()
        .schema(model)
        .schema(data)
        .argument(FieldSchema::new("seed", TypeDescriptor::Int).with_default(0))
        .look_for_args_file(false)
        .lenient(true)
        .build()
        .unwrap();

    let binding = binder
        .bind_args(["--path", "/tmp", "--lr", "0.1", "--seed", "9", "--epochs", "3", "stray"])
        .unwrap();
    assert_eq!(binding.instances.len(), 2);
    assert_eq!(binding.instances[0].schema, "model");
    assert_eq!(binding.instances[0].get("depth"), Some(&Value::Int(4)));
    assert_eq!(binding.instance("data").unwrap().get("path"), Some(&Value::from("/tmp")));
    assert_eq!(binding.leftover_fields["seed"], Value::Int(9));
    assert_eq!(binding.leftover_tokens, vec!["--epochs", "3", "stray"]);
}

#[test]
fn test_strict_mode_rejects_leftovers() {
    let err = binder([basic_schema()])
        .bind_args(["--foo", "1", "--bar", "2", "--baz", "x", "--extra"])
        .unwrap_err();
    assert!(matches!(err, BindError::Unrecognized(tokens) if tokens == ["--extra"]));
}

#[test]
fn test_response_file_precedes_explicit_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let entry = dir.path().join("train");
    fs::write(dir.path().join("train.args"), "--foo 1 --bar 2.5\n--baz from_file\n").unwrap();

    let binder = ArgumentBinder::builder()
        .schema(basic_schema())
        .entry_point(&entry)
        .build()
        .unwrap();
    let binding = binder.bind_args(["--baz", "explicit"]).unwrap();
    let inst = &binding.instances[0];
    assert_eq!(inst.get("foo"), Some(&Value::Int(1)));
    assert_eq!(inst.get("baz"), Some(&Value::from("explicit")));

    let disabled = ArgumentBinder::builder()
        .schema(basic_schema())
        .entry_point(&entry)
        .look_for_args_file(false)
        .build()
        .unwrap();
    assert!(matches!(
        disabled.bind_args(["--baz", "x"]).unwrap_err(),
        BindError::MissingRequired(_)
    ));
}

#[test]
fn test_help_is_reported() {
    let err = binder([basic_schema()]).bind_args(["--foo", "1", "-h"]).unwrap_err();
    let BindError::HelpRequested(text) = err else {
        panic!("expected help");
    };
    assert!(text.starts_with("usage: prog [-h] --foo FOO --bar BAR --baz BAZ [--no_flag]"));
    assert!(text.contains("set flag to false"));
}

#[test]
fn test_package_fixture_binds_documents() {
    let package = load_package(fixture("training.yaml")).unwrap();
    assert_eq!(package.name.as_deref(), Some("train"));
    let binder = binder(package.schemas);

    let binding = binder.bind_json_file(fixture("run.json")).unwrap();
    let model = binding.instance("model").unwrap();
    assert_eq!(model.get("lr"), Some(&Value::Float(0.001)));
    assert_eq!(model.get("layers"), Some(&Value::from(vec![64, 64])));
    assert_eq!(model.get("activation").and_then(Value::enum_member), Some("gelu"));
    assert_eq!(model.get("dropout"), Some(&Value::None));
    let data = binding.instance("data").unwrap();
    assert_eq!(data.get("workers"), Some(&Value::Int(8)));
    assert_eq!(data.get("shuffle"), Some(&Value::Bool(true)));

    let binding = binder.bind_yaml_file(fixture("run.yaml")).unwrap();
    let model = binding.instance("model").unwrap();
    assert_eq!(model.get("lr"), Some(&Value::Float(3.0)));
    assert_eq!(model.get("layers"), Some(&Value::from(vec![128, 32])));
    assert_eq!(model.get("dropout"), Some(&Value::Float(0.1)));
    assert_eq!(binding.instance("data").unwrap().get("shuffle"), Some(&Value::Bool(false)));
}

#[test]
fn test_malformed_documents_bind_nothing() {
    let binder = binder([basic_schema()]);
    assert!(matches!(
        binder.bind_json_str("{\"foo\": 1,").unwrap_err(),
        BindError::Parse(ParseError::Json(_))
    ));
    assert!(matches!(
        binder.bind_yaml_str("foo: [1").unwrap_err(),
        BindError::Parse(ParseError::Yaml(_))
    ));
    assert!(matches!(
        binder.bind_yaml_str("just a string").unwrap_err(),
        BindError::Parse(ParseError::NotAMapping(_))
    ));
    assert!(matches!(
        binder.bind_json_file("/nonexistent/run.json").unwrap_err(),
        BindError::Io { .. }
    ));
}

#[test]
fn test_extract_typed_struct() {
    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Activation {
        Relu,
        Gelu,
    }

    #[derive(Debug, Deserialize)]
    struct Model {
        lr: f64,
        layers: Vec<i64>,
        activation: Activation,
        dropout: Option<f64>,
    }

    let package = load_package(fixture("training.yaml")).unwrap();
    let binding = binder(package.schemas)
        .bind_args(["--lr", "0.2", "--activation", "gelu", "--dropout", "0.3", "--path", "p"])
        .unwrap();
    let model: Model = binding.extract("model").unwrap();
    assert_eq!(model.lr, 0.2);
    assert_eq!(model.layers, vec![64, 64]);
    assert_eq!(model.activation, Activation::Gelu);
    assert_eq!(model.dropout, Some(0.3));

    assert!(matches!(
        binding.extract::<Model>("data").unwrap_err(),
        BindError::Materialize { .. }
    ));
}
