//! Placeholder grammar.
//!
//! A live placeholder is `{{ name }}` where `name` matches `\w+` and the braces
//! may enclose any amount of whitespace. It must not be glued to another brace
//! pair: `{{{{ name }}}}` is the escaped form, which every injection pass
//! degrades by one level into the literal `{{ name }}`.

use crate::config::{VariableSpec, VariableType};
use indexmap::IndexMap;
use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

static LIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(?P<name>\w+)\s*\}\}").expect("valid live placeholder regex"));

static ESCAPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\{\{\s*(?P<name>\w+)\s*\}\}\}\}").expect("valid escaped placeholder regex")
});

/// A value bound to a declared variable.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedValue::String(s) => write!(f, "{s}"),
            ResolvedValue::Number(n) => write!(f, "{n}"),
            ResolvedValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ResolvedValue {
    fn from(value: &str) -> Self {
        ResolvedValue::String(value.to_string())
    }
}

impl From<bool> for ResolvedValue {
    fn from(value: bool) -> Self {
        ResolvedValue::Boolean(value)
    }
}

impl From<f64> for ResolvedValue {
    fn from(value: f64) -> Self {
        ResolvedValue::Number(value)
    }
}

/// Resolved values keyed by variable name.
///
/// `None` marks a declared variable the user left unbound, which is not the
/// same as a variable bound to the empty string.
pub type Values = IndexMap<String, Option<ResolvedValue>>;

/// Formats a value the way it is written into the generated project.
pub fn format_value(variable: &VariableSpec, value: &ResolvedValue) -> String {
    match (variable.variable_type, value) {
        (VariableType::Boolean, ResolvedValue::Boolean(b)) if variable.is_capitalized() => {
            if *b { "True".to_string() } else { "False".to_string() }
        }
        _ => value.to_string(),
    }
}

/// How the Fixer rewrites a placeholder whose variable is not declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixStrategy {
    /// Turn `{{ name }}` into `{{{{ name }}}}`
    Escape,
    /// Delete the placeholder
    Clear,
}

impl std::str::FromStr for FixStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "escape" => Ok(FixStrategy::Escape),
            "clear" => Ok(FixStrategy::Clear),
            other => Err(format!("unknown fix strategy '{other}' (expected escape or clear)")),
        }
    }
}

/// A live placeholder is rejected when it is glued to an extra brace pair,
/// which is how `{{{{ name }}}}` avoids being read as a live `{{ name }}`.
fn is_live(text: &str, caps: &Captures<'_>) -> bool {
    let whole = caps.get(0).expect("capture group 0 always matches");
    !text[..whole.start()].ends_with("{{") && !text[whole.end()..].starts_with("}}")
}

/// Replaces every live placeholder with `replace(name)`.
fn replace_live<F>(text: &str, mut replace: F) -> String
where
    F: FnMut(&str) -> String,
{
    LIVE.replace_all(text, |caps: &Captures<'_>| {
        if is_live(text, caps) {
            replace(&caps["name"])
        } else {
            caps[0].to_string()
        }
    })
    .into_owned()
}

/// Names of every live placeholder in `text`.
pub fn extract(text: &str) -> BTreeSet<String> {
    LIVE.captures_iter(text)
        .filter(|caps| is_live(text, caps))
        .map(|caps| caps["name"].to_string())
        .collect()
}

/// Substitutes live placeholders, then removes one level of escaping.
///
/// Declared variables with a bound value are replaced by their formatted
/// value. Undeclared and unbound placeholders are replaced by nothing.
pub fn substitute(text: &str, variables: &IndexMap<String, VariableSpec>, values: &Values) -> String {
    let replaced = replace_live(text, |name| {
        match (variables.get(name), values.get(name).and_then(Option::as_ref)) {
            (Some(variable), Some(value)) => format_value(variable, value),
            _ => String::new(),
        }
    });
    ESCAPED.replace_all(&replaced, "{{ $name }}").into_owned()
}

/// Rewrites placeholders so that only declared variables remain live.
pub fn rewrite(text: &str, variables: &IndexMap<String, VariableSpec>, strategy: FixStrategy) -> String {
    replace_live(text, |name| {
        if variables.contains_key(name) {
            format!("{{{{ {name} }}}}")
        } else {
            match strategy {
                FixStrategy::Escape => format!("{{{{{{{{ {name} }}}}}}}}"),
                FixStrategy::Clear => String::new(),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared(names: &[&str]) -> IndexMap<String, VariableSpec> {
        names
            .iter()
            .map(|name| (name.to_string(), VariableSpec::new(*name, VariableType::String)))
            .collect()
    }

    fn values(pairs: &[(&str, Option<ResolvedValue>)]) -> Values {
        pairs.iter().map(|(name, value)| (name.to_string(), value.clone())).collect()
    }

    #[test]
    fn extract_finds_live_placeholders_only() {
        let names = extract("{{a}} {{ b }} {{  a  }} {{{{ c }}}} {{ d-e }}");
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn extract_rejects_half_escaped_forms() {
        assert!(extract("{{{{x}}").is_empty());
        assert!(extract("{{x}}}}").is_empty());
        assert_eq!(extract("{{{x}}}").into_iter().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn substitute_replaces_bound_and_clears_the_rest() {
        let variables = declared(&["name", "unset"]);
        let values = values(&[("name", Some("World".into())), ("unset", None)]);
        assert_eq!(
            substitute("Hello {{name}}{{ unset }}{{ ghost }}!", &variables, &values),
            "Hello World!"
        );
    }

    #[test]
    fn substitute_keeps_empty_string_bindings() {
        let variables = declared(&["name"]);
        let values = values(&[("name", Some("".into()))]);
        assert_eq!(substitute("[{{ name }}]", &variables, &values), "[]");
    }

    #[test]
    fn escaped_placeholder_always_degrades_to_literal() {
        let variables = declared(&["name"]);
        let values = values(&[("name", Some("World".into()))]);
        assert_eq!(substitute("{{{{name}}}}", &variables, &values), "{{ name }}");
        assert_eq!(substitute("{{{{  other }}}}", &variables, &values), "{{ other }}");
        assert_eq!(
            substitute("Hello {{name}}\n{{{{name}}}}\n", &variables, &values),
            "Hello World\n{{ name }}\n"
        );
    }

    #[test]
    fn booleans_are_lowercase_unless_capitalized() {
        let plain = VariableSpec::new("flag", VariableType::Boolean);
        let capitalized = VariableSpec::new("flag", VariableType::Boolean)
            .with_item(serde_json::json!("Capitalized"));
        assert_eq!(format_value(&plain, &ResolvedValue::Boolean(true)), "true");
        assert_eq!(format_value(&capitalized, &ResolvedValue::Boolean(true)), "True");
        assert_eq!(format_value(&capitalized, &ResolvedValue::Boolean(false)), "False");
    }

    #[test]
    fn numbers_use_display() {
        let number = VariableSpec::new("n", VariableType::Number);
        assert_eq!(format_value(&number, &ResolvedValue::Number(3.0)), "3");
        assert_eq!(format_value(&number, &ResolvedValue::Number(-1.5)), "-1.5");
    }

    #[test]
    fn substitution_leaves_no_bound_placeholder() {
        let variables = declared(&["a", "b"]);
        let values = values(&[("a", Some("x".into())), ("b", Some("{y}".into()))]);
        let out = substitute("{{a}}/{{ b }}/{{a}}{{b}}", &variables, &values);
        assert!(extract(&out).is_empty());
        assert_eq!(out, "x/{y}/x{y}");
    }

    #[test]
    fn rewrite_escapes_or_clears_undeclared() {
        let variables = declared(&["keep"]);
        let text = "{{keep}} {{drop}} {{{{ esc }}}}";
        assert_eq!(
            rewrite(text, &variables, FixStrategy::Escape),
            "{{ keep }} {{{{ drop }}}} {{{{ esc }}}}"
        );
        assert_eq!(rewrite(text, &variables, FixStrategy::Clear), "{{ keep }}  {{{{ esc }}}}");
    }

    #[test]
    fn rewritten_text_has_no_undeclared_placeholder() {
        let variables = declared(&["keep"]);
        let fixed = rewrite("{{ a }}{{b}} {{keep}}", &variables, FixStrategy::Escape);
        assert!(extract(&fixed).iter().all(|name| variables.contains_key(name)));
    }

    #[test]
    fn fix_strategy_parses() {
        assert_eq!("escape".parse::<FixStrategy>().unwrap(), FixStrategy::Escape);
        assert_eq!("clear".parse::<FixStrategy>().unwrap(), FixStrategy::Clear);
        assert!("nope".parse::<FixStrategy>().is_err());
    }
}
