//! Selector definitions and their builder.
//!
//! A [`SelectorDefinition`] is one query kind: a generator that turns a
//! locator into a CSS or XPath expression, plus the filter rules and
//! description builders the kind supports. Definitions are built with
//! [`SelectorBuilder`] and are immutable once finished.

use std::fmt;
use std::sync::Arc;

use sift_xpath::Expr;

use crate::error::DefinitionError;
use crate::expression::Expression;
use crate::filter::{insert_rule, Constraints, FilterRule};
use crate::filter_set::{DescriptionBuilder, FilterSet};
use crate::traits::Node;
use crate::value::{FilterOptions, FilterValue};

/// Engine-wide flags passed to every generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorContext {
    /// Also match buttons, links and fields by their `aria-label`.
    pub enable_aria_label: bool,
}

/// Turns a locator into a CSS selector.
pub type CssGenerator = Arc<dyn Fn(Option<&str>, &GeneratorContext) -> String + Send + Sync>;

/// Turns a locator into an XPath expression tree.
pub type XPathGenerator = Arc<dyn Fn(Option<&str>, &GeneratorContext) -> Expr + Send + Sync>;

/// How a selector kind produces its base expression.
#[derive(Clone)]
pub enum ExpressionMode {
    /// A CSS generator.
    Css(CssGenerator),
    /// An XPath generator.
    XPath(XPathGenerator),
}

impl ExpressionMode {
    /// Runs the generator.
    pub fn generate(&self, locator: Option<&str>, context: &GeneratorContext) -> Expression {
        match self {
            ExpressionMode::Css(generator) => Expression::Css(generator(locator, context)),
            ExpressionMode::XPath(generator) => Expression::XPath(generator(locator, context)),
        }
    }

    /// Returns true for CSS generators.
    pub fn is_css(&self) -> bool {
        matches!(self, ExpressionMode::Css(_))
    }
}

impl fmt::Debug for ExpressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionMode::Css(_) => f.write_str("Css"),
            ExpressionMode::XPath(_) => f.write_str("XPath"),
        }
    }
}

/// A named selector kind.
#[derive(Clone)]
pub struct SelectorDefinition {
    name: String,
    label: String,
    mode: ExpressionMode,
    rules: Vec<FilterRule>,
    descriptions: Vec<DescriptionBuilder>,
}

impl SelectorDefinition {
    /// Starts building a definition.
    pub fn builder(name: impl Into<String>) -> SelectorBuilder {
        SelectorBuilder::new(name)
    }

    /// The kind name, e.g. `"radio_button"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The human label used in descriptions, e.g. `"radio button"`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The expression generator.
    pub fn mode(&self) -> &ExpressionMode {
        &self.mode
    }

    /// Generates the base expression for `locator`, before any filter.
    pub fn expression_for(&self, locator: Option<&str>, context: &GeneratorContext) -> Expression {
        self.mode.generate(locator, context)
    }

    /// All rules in declaration order.
    pub fn filters(&self) -> &[FilterRule] {
        &self.rules
    }

    /// Looks up a rule by name.
    pub fn filter(&self, name: &str) -> Option<&FilterRule> {
        self.rules.iter().find(|r| r.name() == name)
    }

    /// Names of all rules in declaration order.
    pub fn filter_names(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.name().to_string()).collect()
    }

    /// Node-level rules in declaration order.
    pub fn node_filters(&self) -> impl Iterator<Item = &FilterRule> {
        self.rules.iter().filter(|r| r.is_node_filter())
    }

    /// Expression-level rules in declaration order.
    pub fn expression_filters(&self) -> impl Iterator<Item = &FilterRule> {
        self.rules.iter().filter(|r| r.is_expression_filter())
    }

    /// Concatenated output of the description builders for `options`.
    pub fn description(&self, options: &FilterOptions) -> String {
        self.descriptions.iter().map(|d| d(options)).collect()
    }
}

impl fmt::Debug for SelectorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectorDefinition")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("mode", &self.mode)
            .field("filters", &self.filter_names())
            .field("descriptions", &self.descriptions.len())
            .finish()
    }
}

/// Builder for [`SelectorDefinition`].
///
/// # Example
///
/// ```rust
/// use sift_selector::{Constraints, SelectorDefinition};
/// use sift_xpath::dsl::{attr, descendant};
///
/// let definition = SelectorDefinition::builder("heading")
///     .xpath(|locator, _| {
///         let expr = descendant(["h1", "h2", "h3"]);
///         match locator {
///             Some(id) => expr.predicate(attr("id").equals(id)),
///             None => expr,
///         }
///     })
///     .node_filter("visible_text", Constraints::new(), |node, value| {
///         value.matches_text(&node.text())
///     })
///     .finish()
///     .unwrap();
///
/// assert_eq!(definition.label(), "heading");
/// ```
pub struct SelectorBuilder {
    name: String,
    label: Option<String>,
    mode: Option<ExpressionMode>,
    rules: Vec<FilterRule>,
    descriptions: Vec<DescriptionBuilder>,
}

impl SelectorBuilder {
    /// Creates an empty builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            mode: None,
            rules: Vec::new(),
            descriptions: Vec::new(),
        }
    }

    /// Sets a CSS generator, replacing any generator set before.
    pub fn css<F>(mut self, generator: F) -> Self
    where
        F: Fn(Option<&str>, &GeneratorContext) -> String + Send + Sync + 'static,
    {
        self.mode = Some(ExpressionMode::Css(Arc::new(generator)));
        self
    }

    /// Sets an XPath generator, replacing any generator set before.
    pub fn xpath<F>(mut self, generator: F) -> Self
    where
        F: Fn(Option<&str>, &GeneratorContext) -> Expr + Send + Sync + 'static,
    {
        self.mode = Some(ExpressionMode::XPath(Arc::new(generator)));
        self
    }

    /// Sets the generator directly.
    pub fn mode(mut self, mode: ExpressionMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets the label used in descriptions. Defaults to the name.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

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

    /// Adds a prebuilt rule. A same-named rule is replaced in place.
    pub fn filter(mut self, rule: FilterRule) -> Self {
        insert_rule(&mut self.rules, rule);
        self
    }

    /// Copies every rule and description builder of `set` into this
    /// definition. Imported rules replace same-named rules in place.
    pub fn import_filter_set(mut self, set: &FilterSet) -> Self {
        for rule in set.rules() {
            insert_rule(&mut self.rules, rule.clone());
        }
        self.descriptions.extend(set.descriptions().iter().cloned());
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

    /// Freezes the definition.
    ///
    /// # Errors
    ///
    /// - [`DefinitionError::MissingExpressionMode`] if neither
    ///   [`css`](Self::css) nor [`xpath`](Self::xpath) was called.
    /// - [`DefinitionError::InvalidDefault`] if a rule's default is not one of
    ///   its valid values.
    pub fn finish(self) -> Result<SelectorDefinition, DefinitionError> {
        let Some(mode) = self.mode else {
            return Err(DefinitionError::MissingExpressionMode(self.name));
        };

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

        Ok(SelectorDefinition {
            label: self.label.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            mode,
            rules: self.rules,
            descriptions: self.descriptions,
        })
    }
}

impl fmt::Debug for SelectorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectorBuilder")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("mode", &self.mode)
            .field("rules", &self.rules.len())
            .finish()
    }
}
