use indexmap::IndexMap;
use replica::config::{VariableSpec, VariableType};
use replica::pattern::{ResolvedValue, Values};
use replica::processor::Processor;
use replica::tree::TreeFilter;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test_log::test]
fn test_injected_tree_matches_expected() {
    let template = TempDir::new().unwrap();
    write(template.path(), "{{ crate }}/Cargo.toml", "[package]\nname = \"{{ crate }}\"\nversion = \"{{version}}\"\n");
    write(template.path(), "{{ crate }}/src/{{ module }}.rs", "pub const DEBUG: bool = {{ debug }};\n// {{ note }}\n");
    write(template.path(), "{{ crate }}/src/lib.rs", "pub mod {{ module }};\n");
    write(template.path(), "docs/README.md", "Use {{{{ crate }}}} in templates.\nPython: {{ py_debug }}\n");
    write(template.path(), "build/cache.txt", "{{ crate }}");

    let expected = TempDir::new().unwrap();
    write(expected.path(), "demo/Cargo.toml", "[package]\nname = \"demo\"\nversion = \"2.5\"\n");
    write(expected.path(), "demo/src/core.rs", "pub const DEBUG: bool = false;\n// \n");
    write(expected.path(), "demo/src/lib.rs", "pub mod core;\n");
    write(expected.path(), "docs/README.md", "Use {{ crate }} in templates.\nPython: True\n");
    write(expected.path(), "build/cache.txt", "{{ crate }}");

    let mut variables = IndexMap::new();
    variables.insert("crate".to_string(), VariableSpec::new("crate", VariableType::String));
    variables.insert("module".to_string(), VariableSpec::new("module", VariableType::String));
    variables.insert("version".to_string(), VariableSpec::new("version", VariableType::Number));
    variables.insert("debug".to_string(), VariableSpec::new("debug", VariableType::Boolean));
    variables.insert(
        "py_debug".to_string(),
        VariableSpec::new("py_debug", VariableType::Boolean).with_item(json!("Capitalized")),
    );
    variables.insert("note".to_string(), VariableSpec::new("note", VariableType::String).optional());

    let values: Values = [
        ("crate", Some(ResolvedValue::from("demo"))),
        ("module", Some(ResolvedValue::from("core"))),
        ("version", Some(ResolvedValue::Number(2.5))),
        ("debug", Some(ResolvedValue::Boolean(false))),
        ("py_debug", Some(ResolvedValue::Boolean(true))),
        ("note", None),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value))
    .collect();

    let filter = TreeFilter::new(template.path(), &["build", "build/**"], true).unwrap();
    let report = Processor::new(template.path(), &variables, &values).inject(filter.entries());

    assert!(report.success(), "{report:?}");
    assert!(!dir_diff::is_different(template.path(), expected.path()).unwrap());
}
