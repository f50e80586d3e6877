use std::fmt;

/// A single query-parameter value.
///
/// The Yelp API grows parameters over time, so endpoint methods accept an
/// open mapping of scalar values rather than per-endpoint structs. Values
/// keep their native type until transmission, where they are stringified.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ParamValue {
    /// Returns true for values that count as "missing" in required-parameter
    /// checks. Only the empty string qualifies; numbers and booleans are
    /// always considered present.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Str(s) if s.is_empty())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Ordered mapping from query-parameter name to [`ParamValue`].
///
/// Absent (`None`) values are dropped at insertion time, so a request is
/// never sent with a parameter whose value is missing. Inserting a key twice
/// replaces the earlier value in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a parameter set from possibly-absent values, keeping exactly
    /// the entries whose value is `Some` and preserving their order.
    pub fn from_optional<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<ParamValue>,
        I: IntoIterator<Item = (K, Option<V>)>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.insert_opt(key, value);
        }
        params
    }

    /// Inserts a value, replacing any existing entry with the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(existing) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            existing.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Inserts a value when present; `None` is dropped entirely.
    pub fn insert_opt(&mut self, key: impl Into<String>, value: Option<impl Into<ParamValue>>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    /// Chaining variant of [`Self::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Chaining variant of [`Self::insert_opt`].
    #[must_use]
    pub fn with_opt(mut self, key: impl Into<String>, value: Option<impl Into<ParamValue>>) -> Self {
        self.insert_opt(key, value);
        self
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns true when `key` is present with a non-blank value.
    ///
    /// An empty string counts as missing, matching the API's treatment of
    /// required parameters.
    pub fn has_value(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| !value.is_blank())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Renders the parameter set as stringified query pairs for transmission.
    pub(crate) fn to_query(&self) -> Vec<(&str, String)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.to_string()))
            .collect()
    }
}
