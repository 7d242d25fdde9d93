//! Query values.

use crate::selector::SelectorDefinition;
use crate::value::{FilterOptions, FilterValue};

/// How many nodes a query must resolve to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Cardinality {
    /// Exactly one node; none or several is an error.
    One,
    /// The first node; none is an error.
    First,
    /// Every node; none is fine.
    All,
    /// Exact text matching first, partial matching if that finds nothing;
    /// then exactly one node.
    #[default]
    Smart,
    /// As [`Cardinality::Smart`], but several nodes resolve to the first.
    PreferExact,
}

impl Cardinality {
    /// Returns true for the modes that retry with partial matching.
    pub fn prefers_exact(self) -> bool {
        matches!(self, Cardinality::Smart | Cardinality::PreferExact)
    }
}

/// Which nodes a query keeps by visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Visibility {
    /// Visible and hidden nodes.
    All,
    /// Visible nodes only.
    Visible,
    /// Hidden nodes only.
    Hidden,
}

impl Visibility {
    /// `Visible` when hidden elements are ignored, `All` otherwise.
    pub fn from_ignore_hidden(ignore_hidden_elements: bool) -> Self {
        if ignore_hidden_elements {
            Visibility::Visible
        } else {
            Visibility::All
        }
    }

    /// Returns true if a node with this visibility state is kept.
    pub fn admits(self, visible: bool) -> bool {
        match self {
            Visibility::All => true,
            Visibility::Visible => visible,
            Visibility::Hidden => !visible,
        }
    }
}

/// A declarative query: selector kind, locator and filter options.
///
/// Query-level options (`exact`, `visible`, `text`, `cardinality`) fall back
/// to the engine configuration when unset.
///
/// # Example
///
/// ```rust
/// use sift_selector::{Cardinality, Query};
///
/// let query = Query::new("checkbox")
///     .with_locator("Remember me")
///     .with_filter("checked", true)
///     .with_cardinality(Cardinality::One);
///
/// assert_eq!(query.locator(), Some("Remember me"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Selector kind name.
    pub kind: String,
    /// Locator passed to the generator.
    pub locator: Option<String>,
    /// Filter option values keyed by filter name.
    pub options: FilterOptions,
    /// Exact text matching.
    pub exact: Option<bool>,
    /// Visibility filter.
    pub visible: Option<Visibility>,
    /// Node text must contain this text or match this pattern.
    pub text: Option<FilterValue>,
    /// How many nodes to resolve to.
    pub cardinality: Option<Cardinality>,
}

impl Query {
    /// Creates a query for `kind` with no locator and no options.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            locator: None,
            options: FilterOptions::new(),
            exact: None,
            visible: None,
            text: None,
            cardinality: None,
        }
    }

    /// Sets the locator.
    pub fn with_locator(mut self, locator: impl Into<String>) -> Self {
        self.locator = Some(locator.into());
        self
    }

    /// Sets one filter option.
    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.options.insert(name, value);
        self
    }

    /// Replaces all filter options.
    pub fn with_options(mut self, options: FilterOptions) -> Self {
        self.options = options;
        self
    }

    /// Requests exact or partial text matching.
    pub fn with_exact(mut self, exact: bool) -> Self {
        self.exact = Some(exact);
        self
    }

    /// Sets the visibility filter.
    pub fn with_visibility(mut self, visible: Visibility) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Sets the text filter.
    pub fn with_text(mut self, text: impl Into<FilterValue>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the cardinality.
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = Some(cardinality);
        self
    }

    /// The locator, if any. An empty locator counts as none.
    pub fn locator(&self) -> Option<&str> {
        self.locator.as_deref().filter(|l| !l.is_empty())
    }
}

/// Describes `query` for error messages, e.g.
/// `checkbox "Remember me" that is checked`.
pub(crate) fn describe(definition: &SelectorDefinition, query: &Query) -> String {
    let mut description = match query.locator() {
        Some(locator) => format!("{} \"{}\"", definition.label(), locator),
        None => definition.label().to_string(),
    };
    if let Some(text) = &query.text {
        description.push_str(&format!(" with text {}", text));
    }
    description.push_str(&definition.description(&query.options));
    description
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use sift_xpath::dsl::descendant;

    fn definition() -> SelectorDefinition {
        SelectorDefinition::builder("radio_button")
            .label("radio button")
            .xpath(|_, _| descendant(["input"]))
            .describe(|options| {
                if options.is_set("checked") {
                    " that is checked".to_string()
                } else {
                    String::new()
                }
            })
            .finish()
            .unwrap()
    }

    #[test]
    fn test_defaults_unset() {
        let query = Query::new("link");
        assert_eq!(query.kind, "link");
        assert!(query.locator().is_none());
        assert!(query.options.is_empty());
        assert!(query.exact.is_none());
        assert!(query.cardinality.is_none());
    }

    #[test]
    fn test_cardinality_default_is_smart() {
        assert_eq!(Cardinality::default(), Cardinality::Smart);
        assert!(Cardinality::PreferExact.prefers_exact());
        assert!(!Cardinality::One.prefers_exact());
    }

    #[test]
    fn test_visibility_admits() {
        assert!(Visibility::All.admits(false));
        assert!(Visibility::Visible.admits(true));
        assert!(!Visibility::Visible.admits(false));
        assert!(Visibility::Hidden.admits(false));
        assert_eq!(Visibility::from_ignore_hidden(true), Visibility::Visible);
        assert_eq!(Visibility::from_ignore_hidden(false), Visibility::All);
    }

    #[test]
    fn test_describe_with_locator_and_options() {
        let query = Query::new("radio_button")
            .with_locator("Blue")
            .with_filter("checked", true);
        assert_eq!(
            describe(&definition(), &query),
            "radio button \"Blue\" that is checked"
        );
    }

    #[test]
    fn test_describe_without_locator() {
        assert_eq!(
            describe(&definition(), &Query::new("radio_button")),
            "radio button"
        );
    }

    #[test]
    fn test_empty_locator_is_none() {
        let query = Query::new("option").with_locator("");
        assert_eq!(query.locator(), None);
        assert_eq!(query.locator.as_deref(), Some(""));
        assert_eq!(describe(&definition(), &query), "radio button");
    }

    #[test]
    fn test_describe_with_text() {
        let query = Query::new("radio_button").with_text(Regex::new("^Bl").unwrap());
        assert_eq!(
            describe(&definition(), &query),
            "radio button with text /^Bl/"
        );
    }
}
