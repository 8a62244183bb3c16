use indexmap::IndexMap;
use replica::config::{VariableSpec, VariableType};
use replica::error::Result;
use replica::pattern::ResolvedValue;
use replica::prompt::{parse_variable_input, resolve_values, Prompter};
use serde_json::json;

/// Answers every variable with a fixed raw input, like a user typing it.
struct Typed(&'static str);

impl Prompter for Typed {
    fn confirm(&self, skip: bool, _prompt: String) -> Result<bool> {
        Ok(skip)
    }

    fn ask(&self, variable: &VariableSpec) -> Result<Option<ResolvedValue>> {
        Ok(parse_variable_input(variable, self.0))
    }

    fn ask_text(&self, _prompt: String, _required: bool) -> Result<Option<String>> {
        Ok(Some(self.0.to_string()))
    }
}

#[test]
fn test_parse_variable_input() {
    let boolean = VariableSpec::new("b", VariableType::Boolean);
    assert_eq!(parse_variable_input(&boolean, "True"), Some(ResolvedValue::Boolean(true)));
    assert_eq!(parse_variable_input(&boolean, "y"), None);

    let number = VariableSpec::new("n", VariableType::Number);
    assert_eq!(parse_variable_input(&number, "42"), Some(ResolvedValue::Number(42.0)));
    assert_eq!(parse_variable_input(&number, "forty"), None);

    let regex = VariableSpec::new("r", VariableType::Regex).with_item(json!(r"\d{3}"));
    assert_eq!(parse_variable_input(&regex, "123"), Some(ResolvedValue::from("123")));
    assert_eq!(parse_variable_input(&regex, "12"), None);

    let choice = VariableSpec::new("c", VariableType::Choice).with_item(json!(["a", "b"]));
    assert_eq!(parse_variable_input(&choice, "0"), Some(ResolvedValue::from("a")));
    assert_eq!(parse_variable_input(&choice, "-1"), None);
}

#[test]
fn test_resolve_values_keeps_declaration_order() {
    let mut variables = IndexMap::new();
    variables.insert("zeta".to_string(), VariableSpec::new("zeta", VariableType::Number));
    variables.insert("alpha".to_string(), VariableSpec::new("alpha", VariableType::String));

    let values = resolve_values(&Typed("7"), &variables).unwrap();
    let names: Vec<&str> = values.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
    assert_eq!(values["zeta"], Some(ResolvedValue::Number(7.0)));
    assert_eq!(values["alpha"], Some(ResolvedValue::from("7")));
}

#[test]
fn test_invalid_optional_input_leaves_variable_unbound() {
    let mut variables = IndexMap::new();
    variables.insert("flag".to_string(), VariableSpec::new("flag", VariableType::Boolean).optional());

    let values = resolve_values(&Typed("maybe"), &variables).unwrap();
    assert_eq!(values["flag"], None);
}
