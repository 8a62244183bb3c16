//! User input and interaction handling.
//! Resolves declared variables into values and asks for confirmations.

use crate::config::{VariableSpec, VariableType};
use crate::error::Result;
use crate::pattern::{ResolvedValue, Values};
use colored::Colorize;
use dialoguer::{Confirm, Input, Select};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("valid number regex"));

/// Terminal interactions needed by replica commands.
pub trait Prompter {
    /// Asks a yes/no question. Returns `true` without asking when `skip` is set.
    fn confirm(&self, skip: bool, prompt: String) -> Result<bool>;

    /// Asks for the value of a declared variable. `None` leaves it unbound.
    fn ask(&self, variable: &VariableSpec) -> Result<Option<ResolvedValue>>;

    /// Asks for free text. `None` when the answer is empty and not required.
    fn ask_text(&self, prompt: String, required: bool) -> Result<Option<String>>;
}

/// Validates raw input against the type of a variable.
///
/// # Returns
/// * `Option<ResolvedValue>` - The typed value, `None` if the input is invalid
pub fn parse_variable_input(variable: &VariableSpec, input: &str) -> Option<ResolvedValue> {
    let input = input.trim();
    match variable.variable_type {
        VariableType::Boolean => match input.to_lowercase().as_str() {
            "true" => Some(ResolvedValue::Boolean(true)),
            "false" => Some(ResolvedValue::Boolean(false)),
            _ => None,
        },
        VariableType::Number => {
            if NUMBER.is_match(input) {
                input.parse::<f64>().ok().map(ResolvedValue::Number)
            } else {
                None
            }
        }
        VariableType::String => (!input.is_empty()).then(|| ResolvedValue::from(input)),
        VariableType::Regex => {
            let pattern = Regex::new(&format!("^(?:{})", variable.pattern()?)).ok()?;
            pattern.is_match(input).then(|| ResolvedValue::from(input))
        }
        VariableType::Choice => {
            let index: usize = input.parse().ok()?;
            variable.choices().get(index).map(|label| ResolvedValue::from(*label))
        }
    }
}

/// Converts a configured default into a value of the variable's type.
pub fn default_value(variable: &VariableSpec) -> Option<ResolvedValue> {
    let default = variable.default.as_ref()?;
    match (variable.variable_type, default) {
        (_, serde_json::Value::Null) => None,
        (VariableType::Boolean, serde_json::Value::Bool(b)) => Some(ResolvedValue::Boolean(*b)),
        (VariableType::Number, serde_json::Value::Number(n)) => n.as_f64().map(ResolvedValue::Number),
        (_, serde_json::Value::String(s)) => parse_variable_input(variable, s).or_else(|| {
            // choice defaults are labels, not indexes
            variable
                .choices()
                .into_iter()
                .find(|label| label == s)
                .map(ResolvedValue::from)
        }),
        (_, other) => parse_variable_input(variable, &other.to_string()),
    }
}

/// Prompt line shown for a variable.
pub fn variable_prompt(variable: &VariableSpec) -> String {
    let mut prompt = variable.name.clone();
    if let Some(description) = &variable.description {
        prompt.push_str(&format!(", {description}"));
    }
    if !variable.required {
        prompt.push_str(" <skip empty>");
    }
    prompt
}

/// Explanation shown after an invalid answer.
pub fn invalid_input_hint(variable: &VariableSpec) -> String {
    let constraint = match variable.variable_type {
        VariableType::Number => "must be a number".to_string(),
        VariableType::String => "must be non empty".to_string(),
        VariableType::Boolean => "can be either \"true\" or \"false\"".to_string(),
        VariableType::Regex => format!("must match {}", variable.pattern().unwrap_or_default()),
        VariableType::Choice => {
            format!("select an option between 0 and {}", variable.choices().len().saturating_sub(1))
        }
    };
    format!("invalid value, please retry ({constraint})")
}

/// Prompter backed by dialoguer.
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }

    fn ask_choice(&self, variable: &VariableSpec) -> Result<Option<ResolvedValue>> {
        let choices = variable.choices();
        let default_index = default_value(variable)
            .and_then(|value| choices.iter().position(|label| value == ResolvedValue::from(*label)))
            .unwrap_or(0);
        let selection = Select::new()
            .with_prompt(variable_prompt(variable))
            .items(&choices)
            .default(default_index)
            .interact()?;
        Ok(choices.get(selection).map(|label| ResolvedValue::from(*label)))
    }

    fn ask_boolean(&self, variable: &VariableSpec) -> Result<Option<ResolvedValue>> {
        let default = matches!(default_value(variable), Some(ResolvedValue::Boolean(true)));
        let answer = Confirm::new()
            .with_prompt(variable_prompt(variable))
            .default(default)
            .interact()?;
        Ok(Some(ResolvedValue::Boolean(answer)))
    }

    fn ask_input(&self, variable: &VariableSpec) -> Result<Option<ResolvedValue>> {
        let default = default_value(variable).map(|value| value.to_string());
        loop {
            let mut input = Input::<String>::new()
                .with_prompt(variable_prompt(variable))
                .allow_empty(true);
            if let Some(default) = &default {
                input = input.default(default.clone());
            }
            let answer = input.interact_text()?;
            if answer.trim().is_empty() && !variable.required {
                return Ok(None);
            }
            if let Some(value) = parse_variable_input(variable, &answer) {
                return Ok(Some(value));
            }
            eprintln!("{}", invalid_input_hint(variable).red());
        }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        DialoguerPrompter::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn confirm(&self, skip: bool, prompt: String) -> Result<bool> {
        if skip {
            return Ok(true);
        }
        Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
    }

    fn ask(&self, variable: &VariableSpec) -> Result<Option<ResolvedValue>> {
        let value = match variable.variable_type {
            VariableType::Choice => self.ask_choice(variable)?,
            VariableType::Boolean => self.ask_boolean(variable)?,
            _ => self.ask_input(variable)?,
        };
        match &value {
            Some(value) => println!("{}", format!("{}: {}", variable.name, value).magenta()),
            None => println!("{}", format!("{}: <undefined>", variable.name).magenta()),
        }
        Ok(value)
    }

    fn ask_text(&self, prompt: String, required: bool) -> Result<Option<String>> {
        loop {
            let answer: String = Input::new().with_prompt(&prompt).allow_empty(true).interact_text()?;
            let answer = answer.trim().to_string();
            if !answer.is_empty() {
                return Ok(Some(answer));
            }
            if !required {
                return Ok(None);
            }
        }
    }
}

/// Asks a value for every declared variable, in declaration order.
pub fn resolve_values(prompt: &dyn Prompter, variables: &IndexMap<String, VariableSpec>) -> Result<Values> {
    let mut values = Values::new();
    for (name, variable) in variables {
        values.insert(name.clone(), prompt.ask(variable)?);
    }
    Ok(values)
}
