//! Filter option values.

use std::fmt;

use regex::Regex;

/// A value passed to a filter rule.
///
/// Patterns compare equal when their source text is equal.
#[derive(Debug, Clone)]
pub enum FilterValue {
    /// A boolean, e.g. `checked: true`.
    Bool(bool),
    /// A plain string.
    Text(String),
    /// A regular expression, matched with `is_match`.
    Pattern(Regex),
    /// A list of strings, e.g. the options of a select box.
    List(Vec<String>),
}

impl FilterValue {
    /// Returns the boolean, if this is a [`FilterValue::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FilterValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string, if this is a [`FilterValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a list of strings.
    ///
    /// A single text is a one-element list; booleans and patterns are not lists.
    pub fn as_list(&self) -> Option<Vec<&str>> {
        match self {
            FilterValue::List(items) => Some(items.iter().map(String::as_str).collect()),
            FilterValue::Text(s) => Some(vec![s.as_str()]),
            _ => None,
        }
    }

    /// The value as literal text for building expressions.
    pub fn literal(&self) -> String {
        match self {
            FilterValue::Bool(b) => b.to_string(),
            FilterValue::Text(s) => s.clone(),
            FilterValue::Pattern(re) => re.as_str().to_string(),
            FilterValue::List(items) => items.join(" "),
        }
    }

    /// Returns true if `actual` equals this text or is matched by this pattern.
    ///
    /// Other variants never match.
    pub fn matches_text(&self, actual: &str) -> bool {
        match self {
            FilterValue::Text(s) => s == actual,
            FilterValue::Pattern(re) => re.is_match(actual),
            _ => false,
        }
    }

    /// Returns true if `actual` contains this text or is matched by this pattern.
    pub fn found_in(&self, actual: &str) -> bool {
        match self {
            FilterValue::Text(s) => actual.contains(s.as_str()),
            FilterValue::Pattern(re) => re.is_match(actual),
            _ => false,
        }
    }

    /// Returns true for values that count as "set" in descriptions:
    /// `true`, non-empty text, patterns and non-empty lists.
    pub fn is_truthy(&self) -> bool {
        match self {
            FilterValue::Bool(b) => *b,
            FilterValue::Text(s) => !s.is_empty(),
            FilterValue::Pattern(_) => true,
            FilterValue::List(items) => !items.is_empty(),
        }
    }
}

impl PartialEq for FilterValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FilterValue::Bool(a), FilterValue::Bool(b)) => a == b,
            (FilterValue::Text(a), FilterValue::Text(b)) => a == b,
            (FilterValue::Pattern(a), FilterValue::Pattern(b)) => a.as_str() == b.as_str(),
            (FilterValue::List(a), FilterValue::List(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Bool(b) => write!(f, "{}", b),
            FilterValue::Text(s) => write!(f, "{:?}", s),
            FilterValue::Pattern(re) => write!(f, "/{}/", re.as_str()),
            FilterValue::List(items) => write!(f, "{:?}", items),
        }
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<Regex> for FilterValue {
    fn from(value: Regex) -> Self {
        FilterValue::Pattern(value)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(value: Vec<String>) -> Self {
        FilterValue::List(value)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(value: Vec<&str>) -> Self {
        FilterValue::List(value.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FilterValue {
    fn from(value: [&str; N]) -> Self {
        FilterValue::List(value.iter().map(|s| s.to_string()).collect())
    }
}

/// Filter option values keyed by filter name, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    entries: Vec<(String, FilterValue)>,
}

impl FilterOptions {
    /// Creates an empty option map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an option, returning the map (builder style).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets an option. An existing option keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FilterValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Removes an option.
    pub fn remove(&mut self, name: &str) -> Option<FilterValue> {
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(pos).1)
    }

    /// Gets an option value.
    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Gets an option as a boolean.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FilterValue::as_bool)
    }

    /// Returns true if the option is present and truthy.
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(FilterValue::is_truthy)
    }

    /// Returns true if the option is present.
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Option names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Iterates `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no options are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FilterOptions
where
    K: Into<String>,
    V: Into<FilterValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = FilterOptions::new();
        for (k, v) in iter {
            options.insert(k, v);
        }
        options
    }
}
