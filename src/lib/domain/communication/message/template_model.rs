//! Template model

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur when building a [`TemplateModel`]
#[derive(Debug, Error)]
pub enum TemplateModelError {
    /// The value did not serialize into a JSON object
    #[error("template model must serialize to an object, got {0}")]
    NotAnObject(&'static str),

    /// The value could not be serialized
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Named values available to template placeholders.
///
/// Field names are matched exactly and case-sensitively.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TemplateModel(Map<String, Value>);

impl TemplateModel {
    /// Creates an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a model from any value that serializes to a JSON object, such as a struct
    /// with named fields or a map.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, TemplateModelError> {
        match serde_json::to_value(value)? {
            Value::Object(fields) => Ok(Self(fields)),
            Value::Null => Err(TemplateModelError::NotAnObject("null")),
            Value::Bool(_) => Err(TemplateModelError::NotAnObject("a boolean")),
            Value::Number(_) => Err(TemplateModelError::NotAnObject("a number")),
            Value::String(_) => Err(TemplateModelError::NotAnObject("a string")),
            Value::Array(_) => Err(TemplateModelError::NotAnObject("an array")),
        }
    }

    /// Adds a field, replacing any previous value with the same name
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a field, replacing any previous value with the same name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Raw value of a field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Text form of a field for substitution.
    ///
    /// Returns `None` when the field does not exist. A `null` field is the empty string,
    /// strings are used without quotes and any other value in its JSON form.
    pub fn field_text(&self, name: &str) -> Option<String> {
        self.0.get(name).map(|value| match value {
            Value::Null => String::new(),
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }

    /// Whether the model has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for TemplateModel
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}
