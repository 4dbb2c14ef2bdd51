use std::collections::BTreeMap;

use serde::Serialize;

/// A scalar fact handed to the agent alongside the instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ContextValue {
    Text(String),
    Integer(i64),
    Null,
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Text(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::Text(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        ContextValue::Integer(value)
    }
}

impl From<u32> for ContextValue {
    fn from(value: u32) -> Self {
        ContextValue::Integer(i64::from(value))
    }
}

impl From<usize> for ContextValue {
    fn from(value: usize) -> Self {
        ContextValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl<T: Into<ContextValue>> From<Option<T>> for ContextValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ContextValue::Null, Into::into)
    }
}

/// Flat key/value bucket. Keys are sorted so the serialized payload is stable.
pub type ContextBucket = BTreeMap<String, ContextValue>;

/// Structured side-channel sent with every agent call.
///
/// `preferences` holds stable user attributes, `event` the facts of this call.
/// Both buckets are always serialized, empty or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuxiliaryContext {
    pub preferences: ContextBucket,
    pub event: ContextBucket,
}

impl AuxiliaryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preference(mut self, key: &str, value: impl Into<ContextValue>) -> Self {
        self.preferences.insert(key.to_string(), value.into());
        self
    }

    pub fn event(mut self, key: &str, value: impl Into<ContextValue>) -> Self {
        self.event.insert(key.to_string(), value.into());
        self
    }
}
