//! JOSE header parameter map

use serde_json::{Map, Value};

/// Protected header under construction or as received.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header(Map<String, Value>);

impl Header {
    /// Empty header.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value.
    pub fn put(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Raw parameter value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// String parameter value, `None` if absent or not a string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Remove a parameter.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// `alg`
    #[must_use]
    pub fn algorithm(&self) -> Option<&str> {
        self.get_str("alg")
    }

    /// `enc`
    #[must_use]
    pub fn encryption_algorithm(&self) -> Option<&str> {
        self.get_str("enc")
    }

    /// `zip`
    #[must_use]
    pub fn compression_algorithm(&self) -> Option<&str> {
        self.get_str("zip")
    }

    /// Merge parameters published by an algorithm. Later values win.
    pub fn extend(&mut self, params: Map<String, Value>) {
        self.0.extend(params);
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no parameter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Underlying map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Header {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Header> for Map<String, Value> {
    fn from(header: Header) -> Self {
        header.0
    }
}
