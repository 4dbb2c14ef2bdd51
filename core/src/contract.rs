//! Strict validation of parsed agent replies against result contracts.
//!
//! The agent is untrusted, so results are not deserialized with serde directly:
//! every field is read through [`ObjectReader`], which reports the exact path
//! of the first violation (`missions[1].difficulty`), why it failed, and the
//! value that was rejected. Unknown extra fields are ignored.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::PipelineError;

/// Location of a value inside a parsed reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn key(&self, key: &str) -> Self {
        if self.0.is_empty() {
            Self(key.to_string())
        } else {
            Self(format!("{}.{key}", self.0))
        }
    }

    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{index}]", self.0))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationReason {
    Missing,
    WrongType { expected: &'static str },
    NotInEnum { allowed: &'static [&'static str] },
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationReason::Missing => f.write_str("required field is missing"),
            ViolationReason::WrongType { expected } => write!(f, "expected {expected}"),
            ViolationReason::NotInEnum { allowed } => {
                write!(f, "expected one of {}", allowed.join(", "))
            }
        }
    }
}

/// First contract violation found in a reply.
///
/// For [`ViolationReason::Missing`], `received` is the object that lacks the field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct Violation {
    pub field: FieldPath,
    pub reason: ViolationReason,
    pub received: Value,
}

/// A closed result record that can be read out of a parsed reply.
pub trait Contract: Sized {
    /// Contract name used in diagnostics.
    const NAME: &'static str;

    fn read(value: &Value, path: &FieldPath) -> Result<Self, Violation>;
}

/// A string enumeration with a fixed set of wire names.
pub trait ContractEnum: Sized + Copy + 'static {
    const NAMES: &'static [&'static str];

    fn from_name(name: &str) -> Option<Self>;
}

/// Validate a whole parsed document against contract `C`.
pub fn validate<C: Contract>(document: Value) -> Result<C, PipelineError> {
    match C::read(&document, &FieldPath::root()) {
        Ok(result) => Ok(result),
        Err(violation) => Err(PipelineError::ContractValidation {
            contract: C::NAME,
            violation,
            document,
        }),
    }
}

/// Field-by-field reader over one JSON object.
pub struct ObjectReader<'a> {
    path: &'a FieldPath,
    fields: &'a Map<String, Value>,
}

impl<'a> ObjectReader<'a> {
    pub fn new(value: &'a Value, path: &'a FieldPath) -> Result<Self, Violation> {
        match value {
            Value::Object(fields) => Ok(Self { path, fields }),
            other => Err(wrong_type(path.clone(), "object", other)),
        }
    }

    fn field(&self, key: &str) -> Result<(&'a Value, FieldPath), Violation> {
        let path = self.path.key(key);
        match self.fields.get(key) {
            Some(value) => Ok((value, path)),
            None => Err(Violation {
                field: path,
                reason: ViolationReason::Missing,
                received: Value::Object(self.fields.clone()),
            }),
        }
    }

    pub fn string(&self, key: &str) -> Result<String, Violation> {
        let (value, path) = self.field(key)?;
        read_string(value, path)
    }

    pub fn integer(&self, key: &str) -> Result<i64, Violation> {
        let (value, path) = self.field(key)?;
        // Floats and out-of-range numbers have no i64 form.
        value
            .as_i64()
            .ok_or_else(|| wrong_type(path, "integer", value))
    }

    pub fn boolean(&self, key: &str) -> Result<bool, Violation> {
        let (value, path) = self.field(key)?;
        value
            .as_bool()
            .ok_or_else(|| wrong_type(path, "boolean", value))
    }

    pub fn enumeration<E: ContractEnum>(&self, key: &str) -> Result<E, Violation> {
        let (value, path) = self.field(key)?;
        let name = value
            .as_str()
            .ok_or_else(|| wrong_type(path.clone(), "string", value))?;
        E::from_name(name).ok_or_else(|| Violation {
            field: path,
            reason: ViolationReason::NotInEnum { allowed: E::NAMES },
            received: value.clone(),
        })
    }

    pub fn nested<C: Contract>(&self, key: &str) -> Result<C, Violation> {
        let (value, path) = self.field(key)?;
        C::read(value, &path)
    }

    /// Every element must satisfy `C`; the first bad element fails the list.
    pub fn list<C: Contract>(&self, key: &str) -> Result<Vec<C>, Violation> {
        let (value, path) = self.field(key)?;
        let items = value
            .as_array()
            .ok_or_else(|| wrong_type(path.clone(), "array", value))?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| C::read(item, &path.index(index)))
            .collect()
    }
}

fn read_string(value: &Value, path: FieldPath) -> Result<String, Violation> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(wrong_type(path, "string", other)),
    }
}

fn wrong_type(field: FieldPath, expected: &'static str, received: &Value) -> Violation {
    Violation {
        field,
        reason: ViolationReason::WrongType { expected },
        received: received.clone(),
    }
}
