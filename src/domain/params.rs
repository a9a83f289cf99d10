//! Strategy parameter schemas and typed values.
//!
//! Every strategy declares its inputs as a list of [`ParamSpec`]s; callers
//! build a [`Parameters`] map and the strategy validates it against the schema
//! before any computation starts. A front end can render input forms from the
//! schema alone.

use crate::domain::error::LedgerError;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Text,
    Number,
    Date,
    Select,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

/// One declared strategy input.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub param_type: ParamType,
    pub default: Option<ParamValue>,
    pub required: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub options: &'static [&'static str],
    pub help: &'static str,
}

impl ParamSpec {
    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, ParamType::Text)
    }

    pub fn number(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, ParamType::Number)
    }

    pub fn date(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, ParamType::Date)
    }

    fn new(name: &'static str, label: &'static str, param_type: ParamType) -> Self {
        ParamSpec {
            name,
            label,
            param_type,
            default: None,
            required: true,
            min: None,
            max: None,
            options: &[],
            help: "",
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn default_number(mut self, value: f64) -> Self {
        self.default = Some(ParamValue::Number(value));
        self
    }

    pub fn default_text(mut self, value: &str) -> Self {
        self.default = Some(ParamValue::Text(value.to_string()));
        self
    }

    pub fn bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }
}

/// Parameter values keyed by spec name.
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    values: HashMap<String, ParamValue>,
}

impl Parameters {
    pub fn new() -> Self {
        Parameters {
            values: HashMap::new(),
        }
    }

    pub fn set(&mut self, name: &str, value: ParamValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn with(mut self, name: &str, value: ParamValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.values.get(name)? {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.values.get(name)? {
            ParamValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn number_or(&self, name: &str, default: f64) -> f64 {
        self.number(name).unwrap_or(default)
    }

    /// Required accessors for use after [`validate`] has passed.
    pub fn require_text(&self, name: &str) -> Result<&str, LedgerError> {
        self.text(name).ok_or_else(|| LedgerError::MissingParameter {
            parameter: name.to_string(),
        })
    }

    pub fn require_number(&self, name: &str) -> Result<f64, LedgerError> {
        self.number(name)
            .ok_or_else(|| LedgerError::MissingParameter {
                parameter: name.to_string(),
            })
    }

    pub fn require_date(&self, name: &str) -> Result<NaiveDate, LedgerError> {
        self.date(name).ok_or_else(|| LedgerError::MissingParameter {
            parameter: name.to_string(),
        })
    }
}

/// Validate `params` against `schema`: required presence, value types,
/// numeric bounds, select-option membership. Runs before any computation.
pub fn validate(schema: &[ParamSpec], params: &Parameters) -> Result<(), LedgerError> {
    for spec in schema {
        let value = match params.get(spec.name) {
            Some(v) => v,
            None => {
                if spec.required {
                    return Err(LedgerError::MissingParameter {
                        parameter: spec.name.to_string(),
                    });
                }
                continue;
            }
        };

        match (spec.param_type, value) {
            (ParamType::Number, ParamValue::Number(n)) => {
                if let Some(min) = spec.min {
                    if *n < min {
                        return Err(LedgerError::InvalidParameter {
                            parameter: spec.name.to_string(),
                            reason: format!("{} is below the minimum {}", n, min),
                        });
                    }
                }
                if let Some(max) = spec.max {
                    if *n > max {
                        return Err(LedgerError::InvalidParameter {
                            parameter: spec.name.to_string(),
                            reason: format!("{} is above the maximum {}", n, max),
                        });
                    }
                }
            }
            (ParamType::Date, ParamValue::Date(_)) => {}
            (ParamType::Text, ParamValue::Text(_)) => {}
            (ParamType::Select, ParamValue::Text(s)) => {
                if !spec.options.contains(&s.as_str()) {
                    return Err(LedgerError::InvalidParameter {
                        parameter: spec.name.to_string(),
                        reason: format!("'{}' is not one of {:?}", s, spec.options),
                    });
                }
            }
            (expected, _) => {
                return Err(LedgerError::InvalidParameter {
                    parameter: spec.name.to_string(),
                    reason: format!("expected a {:?} value", expected),
                });
            }
        }
    }
    Ok(())
}
