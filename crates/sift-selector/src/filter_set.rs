//! Reusable bundles of filter rules.

use std::fmt;
use std::sync::Arc;

use crate::error::DefinitionError;
use crate::expression::Expression;
use crate::filter::{insert_rule, Constraints, FilterRule};
use crate::traits::Node;
use crate::value::{FilterOptions, FilterValue};

/// Builds the description fragment for a set of filter options,
/// e.g. `" that is disabled"`. Returns an empty string when nothing applies.
pub type DescriptionBuilder = Arc<dyn Fn(&FilterOptions) -> String + Send + Sync>;

/// A named bundle of filter rules and description builders that selector
/// definitions import.
///
/// # Example
///
/// ```rust
/// use sift_selector::{Constraints, FilterSet};
///
/// let set = FilterSet::builder("state")
///     .node_filter("checked", Constraints::boolean(), |node, value| {
///         value.as_bool() == Some(node.is_checked())
///     })
///     .finish()
///     .unwrap();
///
/// assert!(set.rule("checked").is_some());
/// ```
#[derive(Clone)]
pub struct FilterSet {
    name: String,
    rules: Vec<FilterRule>,
    descriptions: Vec<DescriptionBuilder>,
}

impl FilterSet {
    /// Starts building a filter set.
    pub fn builder(name: impl Into<String>) -> FilterSetBuilder {
        FilterSetBuilder {
            name: name.into(),
            rules: Vec::new(),
            descriptions: Vec::new(),
        }
    }

    /// The set name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    /// Looks up a rule by name.
    pub fn rule(&self, name: &str) -> Option<&FilterRule> {
        self.rules.iter().find(|r| r.name() == name)
    }

    /// Description builders in declaration order.
    pub fn descriptions(&self) -> &[DescriptionBuilder] {
        &self.descriptions
    }
}

impl fmt::Debug for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSet")
            .field("name", &self.name)
            .field("rules", &self.rules)
            .field("descriptions", &self.descriptions.len())
            .finish()
    }
}

/// Builder for [`FilterSet`].
pub struct FilterSetBuilder {
    name: String,
    rules: Vec<FilterRule>,
    descriptions: Vec<DescriptionBuilder>,
}

impl FilterSetBuilder {
    /// Adds a node-level rule. A same-named rule is replaced in place.
    pub fn node_filter<F>(self, name: impl Into<String>, constraints: Constraints, matcher: F) -> Self
    where
        F: Fn(&dyn Node, &FilterValue) -> bool + Send + Sync + 'static,
    {
        self.filter(FilterRule::node(name, constraints, matcher))
    }

    /// Adds an expression-level rule. A same-named rule is replaced in place.
    pub fn expression_filter<F>(
        self,
        name: impl Into<String>,
        constraints: Constraints,
        matcher: F,
    ) -> Self
    where
        F: Fn(Expression, &FilterValue) -> Expression + Send + Sync + 'static,
    {
        self.filter(FilterRule::expression(name, constraints, matcher))
    }

    /// Adds a prebuilt rule.
    pub fn filter(mut self, rule: FilterRule) -> Self {
        insert_rule(&mut self.rules, rule);
        self
    }

    /// Adds a description builder.
    pub fn describe<F>(mut self, builder: F) -> Self
    where
        F: Fn(&FilterOptions) -> String + Send + Sync + 'static,
    {
        self.descriptions.push(Arc::new(builder));
        self
    }

    /// Freezes the set.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidDefault`] if a rule's default is not
    /// one of its valid values.
    pub fn finish(self) -> Result<FilterSet, DefinitionError> {
        if let Some(rule) = self.rules.iter().find(|r| !r.default_is_valid()) {
            return Err(DefinitionError::InvalidDefault {
                owner: self.name,
                filter: rule.name().to_string(),
                value: rule
                    .default_value()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            });
        }

        Ok(FilterSet {
            name: self.name,
            rules: self.rules,
            descriptions: self.descriptions,
        })
    }
}
