use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde_json::{Number, Value};

use crate::core::Error;

static CONFIGURATION_SPECIFICATION: &str = include_str!("../../../../../resources/specification/configuration.json");

const ENVIRONMENT_PREFIX: &str = "ORACLE_";

lazy_static! {
    static ref IS_ARGUMENT: regex::Regex = regex::Regex::new(r"^--[^=]+=.+$").expect("invalid regex");
    static ref IS_STRING: regex::Regex = regex::Regex::new(r"^'[^']*'$").expect("invalid regex");
    static ref IS_NUMBER: regex::Regex = regex::Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("invalid regex");
    static ref IS_ARRAY: regex::Regex = regex::Regex::new(r"^\[.*\]$").expect("invalid regex");
}

/// Location of a value inside the configuration document
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct JSONPath(Vec<String>);

impl JSONPath {
    pub fn parse(s: &str) -> Self {
        JSONPath(s.split('.').map(|x| x.to_lowercase()).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

/// Configuration entry a flat variable is written to. Textual entries, such as felts given in
/// decimal, are kept as strings whatever they look like.
#[derive(PartialEq, Eq, Clone, Debug)]
struct Variable {
    path: JSONPath,
    textual: bool,
}

/// Maps flat variable names such as `starknet_chain_id` to their path in the configuration
#[derive(Debug)]
pub struct VariablesResolver(HashMap<String, Variable>);

impl VariablesResolver {
    pub fn initialize() -> Result<Self, Error> {
        Self::from_specification(CONFIGURATION_SPECIFICATION)
    }

    pub fn from_specification(specification: &str) -> Result<Self, Error> {
        fn collect(path: &[String], value: Value, variables: &mut HashMap<String, Variable>) {
            match value {
                Value::Object(fields) => {
                    for (field, value) in fields {
                        collect(&[path, &[field]].concat(), value, variables)
                    }
                },
                value => {
                    let variable = Variable {
                        path: JSONPath(path.to_vec()),
                        textual: value.is_string(),
                    };
                    variables.insert(path.join("_"), variable);
                },
            }
        }

        let specification: Value = serde_json::from_str(specification).map_err(|e| Error::Configuration(format!("invalid specification {}", e)))?;

        let profile = Variable {
            path: JSONPath::parse("profile"),
            textual: true,
        };

        let mut variables = HashMap::from([("profile".to_string(), profile)]);
        collect(&[], specification, &mut variables);

        Ok(Self(variables))
    }

    /// Variables prefixed with `ORACLE_` in the process environment
    pub fn resolve_environment(&self) -> Result<Variables, Error> {
        let variables = envy::prefixed(ENVIRONMENT_PREFIX)
            .from_env::<HashMap<String, String>>()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        self.resolve_variables(variables)
    }

    /// `--name=value` arguments of the process
    pub fn resolve_arguments(&self) -> Result<Variables, Error> {
        self.resolve_raw_arguments(env::args().skip(1))
    }

    fn resolve_raw_arguments(&self, raw_arguments: impl Iterator<Item = String>) -> Result<Variables, Error> {
        let mut arguments = HashMap::new();
        for raw_argument in raw_arguments {
            if !IS_ARGUMENT.is_match(&raw_argument) {
                return Err(Error::Configuration(format!("invalid argument {}, must be of the form '--xxx=yyy'", raw_argument)));
            }

            let Some((raw_name, raw_value)) = raw_argument.split_once('=') else { continue };
            arguments.insert(raw_name.trim().trim_start_matches("--").to_string(), raw_value.to_string());
        }

        self.resolve_variables(arguments)
    }

    fn resolve_variables(&self, variables: HashMap<String, String>) -> Result<Variables, Error> {
        let mut resolved = HashMap::new();
        for (name, value) in variables {
            let Some(variable) = self.0.get(&name.to_lowercase()) else { continue };

            let value = if variable.textual { decode_text(&value) } else { decode_value(&value)? };
            resolved.insert(variable.path.clone(), value);
        }

        Ok(Variables(resolved))
    }
}

fn decode_text(value: &str) -> Value {
    let value = value.trim();
    if IS_STRING.is_match(value) {
        Value::String(value[1..value.len() - 1].to_string())
    } else {
        Value::String(value.to_string())
    }
}

fn decode_value(value: &str) -> Result<Value, Error> {
    let value = value.trim();

    Ok(match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),

        value if IS_STRING.is_match(value) => Value::String(value[1..value.len() - 1].to_string()),
        value if IS_NUMBER.is_match(value) => Number::from_str(value)
            .map(Value::Number)
            .map_err(|e| Error::Configuration(e.to_string()))?,
        value if IS_ARRAY.is_match(value) => {
            let inner = value[1..value.len() - 1].trim();
            if inner.is_empty() {
                Value::Array(vec![])
            } else {
                Value::Array(inner.split(',').map(decode_value).collect::<Result<_, _>>()?)
            }
        },

        value => Value::String(value.to_string()),
    })
}

pub struct Variables(HashMap<JSONPath, Value>);

impl Variables {
    pub fn get(&self, s: &str) -> Option<&Value> {
        self.0.get(&JSONPath::parse(s))
    }
}

impl IntoIterator for Variables {
    type Item = (JSONPath, Value);
    type IntoIter = std::collections::hash_map::IntoIter<JSONPath, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
