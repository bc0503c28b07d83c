//! Role input schema and filled input sets
//!
//! Every role declares an ordered list of `InputSpec`s. An `InputSet` carries one
//! value per declared input; values are checked against the input's kind and domain when they
//! are collected, and again in full before any formula runs.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of value an input accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    /// Non-negative unit count
    Int,
    /// Real number, typically a ratio or a money amount
    Float,
    /// Yes/no flag
    Bool,
    /// One of a fixed list of options
    Enum,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Int => "integer",
            InputKind::Float => "decimal",
            InputKind::Bool => "boolean",
            InputKind::Enum => "choice",
        }
    }
}

/// A concrete input value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Choice(String),
}

impl InputValue {
    fn type_name(&self) -> String {
        match self {
            InputValue::Bool(b) => format!("boolean {}", b),
            InputValue::Int(i) => format!("integer {}", i),
            InputValue::Float(f) => format!("decimal {}", f),
            InputValue::Choice(s) => format!("text \"{}\"", s),
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputValue::Bool(b) => write!(f, "{}", b),
            InputValue::Int(i) => write!(f, "{}", i),
            InputValue::Float(x) => write!(f, "{}", x),
            InputValue::Choice(s) => f.write_str(s),
        }
    }
}

impl From<bool> for InputValue {
    fn from(value: bool) -> Self {
        InputValue::Bool(value)
    }
}

impl From<i64> for InputValue {
    fn from(value: i64) -> Self {
        InputValue::Int(value)
    }
}

impl From<i32> for InputValue {
    fn from(value: i32) -> Self {
        InputValue::Int(value as i64)
    }
}

impl From<u32> for InputValue {
    fn from(value: u32) -> Self {
        InputValue::Int(value as i64)
    }
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        InputValue::Float(value)
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        InputValue::Choice(value.to_string())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        InputValue::Choice(value)
    }
}

/// Declaration of one role input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSpec {
    /// Key, unique within a role
    pub key: &'static str,
    /// Human-readable label
    pub label: &'static str,
    pub kind: InputKind,
    /// Value pre-populated by input collectors
    pub default: InputValue,
    /// Allowed options for `InputKind::Enum`
    pub options: &'static [&'static str],
    /// Inclusive lower bound for numeric kinds
    pub min: f64,
    /// Inclusive upper bound for numeric kinds
    pub max: Option<f64>,
}

impl InputSpec {
    /// Non-negative unit count, defaulting to 0
    pub fn count(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: InputKind::Int,
            default: InputValue::Int(0),
            options: &[],
            min: 0.0,
            max: None,
        }
    }

    /// Fraction in [0, 1]
    pub fn ratio(key: &'static str, label: &'static str, default: f64) -> Self {
        Self {
            key,
            label,
            kind: InputKind::Float,
            default: InputValue::Float(default),
            options: &[],
            min: 0.0,
            max: Some(1.0),
        }
    }

    /// Non-negative decimal amount
    pub fn amount(key: &'static str, label: &'static str, default: f64) -> Self {
        Self {
            key,
            label,
            kind: InputKind::Float,
            default: InputValue::Float(default),
            options: &[],
            min: 0.0,
            max: None,
        }
    }

    pub fn flag(key: &'static str, label: &'static str, default: bool) -> Self {
        Self {
            key,
            label,
            kind: InputKind::Bool,
            default: InputValue::Bool(default),
            options: &[],
            min: 0.0,
            max: None,
        }
    }

    /// Enumerated choice; the default must be one of the options
    pub fn choice(
        key: &'static str,
        label: &'static str,
        options: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        Self {
            key,
            label,
            kind: InputKind::Enum,
            default: InputValue::Choice(default.to_string()),
            options,
            min: 0.0,
            max: None,
        }
    }

    /// Override the inclusive lower bound
    pub fn at_least(mut self, min: f64) -> Self {
        self.min = min;
        self
    }

    fn domain(&self) -> String {
        match (self.kind, self.max) {
            (InputKind::Enum, _) => self.options.join(", "),
            (InputKind::Bool, _) => "true or false".to_string(),
            (_, Some(max)) => format!("{} to {}", self.min, max),
            (_, None) => format!(">= {}", self.min),
        }
    }

    fn mismatch(&self, value: &InputValue) -> EngineError {
        EngineError::KindMismatch {
            key: self.key.to_string(),
            expected: self.kind.as_str(),
            found: value.type_name(),
        }
    }

    fn check_bounds(&self, value: &InputValue, number: f64) -> Result<()> {
        let within = number.is_finite()
            && number >= self.min
            && self.max.map_or(true, |max| number <= max);
        if within {
            Ok(())
        } else {
            Err(EngineError::OutOfDomain {
                key: self.key.to_string(),
                value: value.to_string(),
                domain: self.domain(),
            })
        }
    }

    /// Check a value against this input's kind and domain
    pub fn check(&self, value: &InputValue) -> Result<()> {
        match (self.kind, value) {
            (InputKind::Int, InputValue::Int(i)) => self.check_bounds(value, *i as f64),
            (InputKind::Float, InputValue::Float(x)) => self.check_bounds(value, *x),
            (InputKind::Float, InputValue::Int(i)) => self.check_bounds(value, *i as f64),
            (InputKind::Bool, InputValue::Bool(_)) => Ok(()),
            (InputKind::Enum, InputValue::Choice(choice)) => {
                if self.options.contains(&choice.as_str()) {
                    Ok(())
                } else {
                    Err(EngineError::UnknownChoice {
                        key: self.key.to_string(),
                        value: choice.clone(),
                        allowed: self.domain(),
                    })
                }
            }
            _ => Err(self.mismatch(value)),
        }
    }

    /// Parse a textual value according to this input's kind, rejecting out-of-domain values
    pub fn parse_value(&self, raw: &str) -> Result<InputValue> {
        let raw = raw.trim();
        let text = InputValue::Choice(raw.to_string());
        let value = match self.kind {
            InputKind::Int => raw
                .parse::<i64>()
                .map(InputValue::Int)
                .map_err(|_| self.mismatch(&text))?,
            InputKind::Float => raw
                .parse::<f64>()
                .map(InputValue::Float)
                .map_err(|_| self.mismatch(&text))?,
            InputKind::Bool => match raw.to_lowercase().as_str() {
                "true" | "yes" | "si" | "sí" | "1" => InputValue::Bool(true),
                "false" | "no" | "0" => InputValue::Bool(false),
                _ => return Err(self.mismatch(&text)),
            },
            InputKind::Enum => {
                let canonical = self
                    .options
                    .iter()
                    .find(|option| option.eq_ignore_ascii_case(raw))
                    .copied()
                    .unwrap_or(raw);
                InputValue::Choice(canonical.to_string())
            }
        };
        self.check(&value)?;
        Ok(value)
    }
}

/// Validate a complete input set against an ordered schema
///
/// Every declared key must be present and in-domain, and no extra keys are allowed.
pub fn validate(specs: &[InputSpec], inputs: &InputSet) -> Result<()> {
    for spec in specs {
        let value = inputs.get(spec.key).ok_or_else(|| EngineError::MissingInput {
            key: spec.key.to_string(),
        })?;
        spec.check(value)?;
    }
    if let Some(extra) = inputs.keys().find(|key| !specs.iter().any(|s| s.key == *key)) {
        return Err(EngineError::UnknownInput {
            key: extra.to_string(),
        });
    }
    Ok(())
}

/// A filled set of input values, keyed by `InputSpec::key`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputSet {
    values: BTreeMap<String, InputValue>,
}

impl InputSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input set pre-populated with every declared input's default
    pub fn defaults(specs: &[InputSpec]) -> Self {
        let values = specs
            .iter()
            .map(|spec| (spec.key.to_string(), spec.default.clone()))
            .collect();
        Self { values }
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<InputValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<InputValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Overlay another set's values on this one
    pub fn merge(&mut self, other: InputSet) {
        self.values.extend(other.values);
    }

    /// Apply a textual `key=value` assignment, parsed by the matching input declaration
    pub fn assign(&mut self, specs: &[InputSpec], assignment: &str) -> Result<()> {
        let (key, raw) = assignment
            .split_once('=')
            .ok_or_else(|| EngineError::MalformedAssignment(assignment.to_string()))?;
        let key = key.trim();
        let spec = specs
            .iter()
            .find(|spec| spec.key == key)
            .ok_or_else(|| EngineError::UnknownInput {
                key: key.to_string(),
            })?;
        let value = spec.parse_value(raw)?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&InputValue> {
        self.values.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn require(&self, key: &str) -> Result<&InputValue> {
        self.values.get(key).ok_or_else(|| EngineError::MissingInput {
            key: key.to_string(),
        })
    }

    /// Unit count for an integer input
    pub fn count(&self, key: &str) -> Result<u64> {
        match self.require(key)? {
            InputValue::Int(i) if *i >= 0 => Ok(*i as u64),
            InputValue::Int(i) => Err(EngineError::OutOfDomain {
                key: key.to_string(),
                value: i.to_string(),
                domain: ">= 0".to_string(),
            }),
            other => Err(EngineError::KindMismatch {
                key: key.to_string(),
                expected: InputKind::Int.as_str(),
                found: other.type_name(),
            }),
        }
    }

    /// Numeric value of an integer or decimal input
    pub fn number(&self, key: &str) -> Result<f64> {
        match self.require(key)? {
            InputValue::Int(i) => Ok(*i as f64),
            InputValue::Float(x) => Ok(*x),
            other => Err(EngineError::KindMismatch {
                key: key.to_string(),
                expected: InputKind::Float.as_str(),
                found: other.type_name(),
            }),
        }
    }

    pub fn flag(&self, key: &str) -> Result<bool> {
        match self.require(key)? {
            InputValue::Bool(b) => Ok(*b),
            other => Err(EngineError::KindMismatch {
                key: key.to_string(),
                expected: InputKind::Bool.as_str(),
                found: other.type_name(),
            }),
        }
    }

    pub fn choice(&self, key: &str) -> Result<&str> {
        match self.require(key)? {
            InputValue::Choice(s) => Ok(s.as_str()),
            other => Err(EngineError::KindMismatch {
                key: key.to_string(),
                expected: InputKind::Enum.as_str(),
                found: other.type_name(),
            }),
        }
    }
}
