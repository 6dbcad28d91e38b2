//! Typed path variables.
//!
//! Variables extracted from a matched path template are stored in a small
//! vector of `(name, value)` pairs, in the order the placeholders appear in
//! the template. Most templates declare only a handful of placeholders, so
//! the common case never touches the heap.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;

/// Maximum number of variables stored inline (stack allocated).
const INLINE_VARIABLES: usize = 4;

/// A single typed path variable value.
#[derive(Debug, Clone, PartialEq)]
pub enum PathValue {
    /// Value captured by an `int` placeholder.
    Int(i64),
    /// Value captured by a `float` placeholder.
    Float(f64),
    /// Value captured by a `str` (or untyped) placeholder.
    Str(String),
}

impl PathValue {
    /// Returns the integer value, if this is an `Int`.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the float value. Integers are widened.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::Str(_) => None,
        }
    }

    /// Returns the string value, if this is a `Str`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for PathValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

impl Serialize for PathValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Str(v) => serializer.serialize_str(v),
        }
    }
}

impl From<i64> for PathValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for PathValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PathValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PathValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Variables extracted from a path match.
///
/// # Example
///
/// ```rust
/// use halyard_core::{PathValue, PathVariables};
///
/// let mut vars = PathVariables::new();
/// vars.push("user_id", 10_i64);
/// vars.push("tab", "settings");
///
/// assert_eq!(vars.get_int("user_id"), Some(10));
/// assert_eq!(vars.get_str("tab"), Some("settings"));
/// assert_eq!(vars.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathVariables {
    inner: SmallVec<[(String, PathValue); INLINE_VARIABLES]>,
}

impl PathVariables {
    /// Creates a new empty variable set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a variable set with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: SmallVec::with_capacity(capacity),
        }
    }

    /// Adds a variable to the set.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<PathValue>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value for a variable by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PathValue> {
        self.inner.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns an `int` variable by name.
    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(PathValue::as_int)
    }

    /// Returns a `float` variable by name.
    #[must_use]
    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(PathValue::as_float)
    }

    /// Returns a `str` variable by name.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PathValue::as_str)
    }

    /// Returns true if there are no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the variables in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PathValue)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl FromIterator<(String, PathValue)> for PathVariables {
    fn from_iter<I: IntoIterator<Item = (String, PathValue)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl Serialize for PathVariables {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.inner.len()))?;
        for (name, value) in &self.inner {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_new() {
        let vars = PathVariables::new();
        assert!(vars.is_empty());
        assert_eq!(vars.len(), 0);
    }

    #[test]
    fn test_typed_getters() {
        let mut vars = PathVariables::new();
        vars.push("id", 42_i64);
        vars.push("ratio", 0.5_f64);
        vars.push("name", "alice");

        assert_eq!(vars.get_int("id"), Some(42));
        assert_eq!(vars.get_float("ratio"), Some(0.5));
        assert_eq!(vars.get_str("name"), Some("alice"));

        // Wrong-kind lookups return None, except int widening to float.
        assert_eq!(vars.get_int("name"), None);
        assert_eq!(vars.get_str("id"), None);
        assert_eq!(vars.get_float("id"), Some(42.0));
    }

    #[test]
    fn test_iter_preserves_order() {
        let mut vars = PathVariables::new();
        vars.push("b", "2");
        vars.push("a", 1_i64);

        let names: Vec<_> = vars.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_many_variables_spill() {
        let mut vars = PathVariables::new();
        for i in 0..10 {
            vars.push(format!("key{i}"), i64::from(i));
        }

        assert_eq!(vars.len(), 10);
        assert_eq!(vars.get_int("key7"), Some(7));
    }

    #[test]
    fn test_serialize_as_map() {
        let mut vars = PathVariables::new();
        vars.push("user_id", 10_i64);
        vars.push("page", "abc");

        let json = serde_json::to_value(&vars).unwrap();
        assert_eq!(json, serde_json::json!({ "user_id": 10, "page": "abc" }));
    }

    #[test]
    fn test_display() {
        assert_eq!(PathValue::Int(3).to_string(), "3");
        assert_eq!(PathValue::Str("x".into()).to_string(), "x");
        assert_eq!(PathValue::Float(1.5).to_string(), "1.5");
    }
}
