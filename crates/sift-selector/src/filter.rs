//! Filter rules.
//!
//! A [`FilterRule`] is a named predicate attached to a selector kind. Node
//! rules are evaluated against every node the driver returns; expression
//! rules narrow the query expression before it is executed.
//!
//! Every rule passes the caller's value through the same gate first:
//!
//! 1. a value equal to the rule's `skip_if` value makes the rule inert;
//! 2. a value outside `valid_values` is replaced by the default, or makes the
//!    rule inert when there is no default. Either way a [`FilterWarning`] is
//!    produced and logged; the query itself never fails on a bad value;
//! 3. anything else is handed to the matcher.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::expression::Expression;
use crate::traits::Node;
use crate::value::FilterValue;

/// Node-level matcher: does `node` satisfy the rule for `value`?
pub type NodeMatcher = Arc<dyn Fn(&dyn Node, &FilterValue) -> bool + Send + Sync>;

/// Expression-level matcher: narrows `expression` for `value`.
pub type ExpressionMatcher = Arc<dyn Fn(Expression, &FilterValue) -> Expression + Send + Sync>;

/// The level a rule works at.
#[derive(Clone)]
pub enum FilterKind {
    /// Evaluated per node after the driver call.
    Node(NodeMatcher),
    /// Applied to the expression before the driver call.
    Expression(ExpressionMatcher),
}

impl fmt::Debug for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Node(_) => f.write_str("Node"),
            FilterKind::Expression(_) => f.write_str("Expression"),
        }
    }
}

/// Value constraints of a filter rule.
///
/// # Example
///
/// ```rust
/// use sift_selector::Constraints;
///
/// let disabled = Constraints::boolean()
///     .with_default(false)
///     .with_skip_if("all");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    boolean: bool,
    default: Option<FilterValue>,
    skip_if: Option<FilterValue>,
    valid_values: Option<Vec<FilterValue>>,
}

impl Constraints {
    /// No constraints: every value is passed to the matcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// A boolean rule: valid values are exactly `true` and `false`.
    pub fn boolean() -> Self {
        Self::new().with_boolean()
    }

    /// Restricts valid values to `true` and `false`, overriding any
    /// explicit list.
    pub fn with_boolean(mut self) -> Self {
        self.boolean = true;
        self
    }

    /// Value substituted for an invalid value, and applied when the caller
    /// does not pass the option at all.
    pub fn with_default(mut self, value: impl Into<FilterValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Value that makes the rule inert.
    pub fn with_skip_if(mut self, value: impl Into<FilterValue>) -> Self {
        self.skip_if = Some(value.into());
        self
    }

    /// Allow-list of values.
    pub fn with_valid_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        self.valid_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// A warning about an invalid filter value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterWarning {
    /// Filter name.
    pub filter: String,
    /// Display form of the rejected value.
    pub value: String,
    /// Display form of the substituted default, if one was used.
    pub defaulted_to: Option<String>,
}

impl fmt::Display for FilterWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid value {} passed to filter {} - ",
            self.value, self.filter
        )?;
        match &self.defaulted_to {
            Some(default) => write!(f, "defaulting to {}", default),
            None => f.write_str("skipping"),
        }
    }
}

/// How a rule treated the value it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterOutcome {
    /// The value was valid and the matcher ran.
    Applied,
    /// The value equals the rule's skip value; the rule is inert.
    Skipped,
    /// The value was invalid and the default was used instead.
    DefaultedWithWarning(FilterWarning),
    /// The value was invalid and there is no default; the rule is inert.
    SkippedWithWarning(FilterWarning),
}

impl FilterOutcome {
    /// The warning carried by this outcome, if any.
    pub fn warning(&self) -> Option<&FilterWarning> {
        match self {
            FilterOutcome::DefaultedWithWarning(w) | FilterOutcome::SkippedWithWarning(w) => {
                Some(w)
            }
            _ => None,
        }
    }

    /// Consumes the outcome, returning its warning.
    pub fn into_warning(self) -> Option<FilterWarning> {
        match self {
            FilterOutcome::DefaultedWithWarning(w) | FilterOutcome::SkippedWithWarning(w) => {
                Some(w)
            }
            _ => None,
        }
    }

    /// Returns true if the matcher runs.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            FilterOutcome::Applied | FilterOutcome::DefaultedWithWarning(_)
        )
    }
}

/// The result of gating a value: the value the matcher should receive
/// (`None` when the rule is inert) and how it was decided.
#[derive(Debug, Clone)]
pub struct Gate<'a> {
    /// Effective value, or `None` when the rule does not apply.
    pub value: Option<&'a FilterValue>,
    /// How the value was treated.
    pub outcome: FilterOutcome,
}

/// A named filter rule.
#[derive(Clone)]
pub struct FilterRule {
    name: String,
    kind: FilterKind,
    boolean: bool,
    default: Option<FilterValue>,
    skip_if: Option<FilterValue>,
    valid_values: Option<Vec<FilterValue>>,
}

impl FilterRule {
    /// Creates a node-level rule.
    pub fn node<F>(name: impl Into<String>, constraints: Constraints, matcher: F) -> Self
    where
        F: Fn(&dyn Node, &FilterValue) -> bool + Send + Sync + 'static,
    {
        Self::new(name, constraints, FilterKind::Node(Arc::new(matcher)))
    }

    /// Creates an expression-level rule.
    pub fn expression<F>(name: impl Into<String>, constraints: Constraints, matcher: F) -> Self
    where
        F: Fn(Expression, &FilterValue) -> Expression + Send + Sync + 'static,
    {
        Self::new(name, constraints, FilterKind::Expression(Arc::new(matcher)))
    }

    /// Creates a rule from an existing matcher.
    pub fn new(name: impl Into<String>, constraints: Constraints, kind: FilterKind) -> Self {
        let Constraints {
            boolean,
            default,
            skip_if,
            valid_values,
        } = constraints;
        let valid_values = if boolean {
            Some(vec![FilterValue::Bool(true), FilterValue::Bool(false)])
        } else {
            valid_values
        };
        Self {
            name: name.into(),
            kind,
            boolean,
            default,
            skip_if,
            valid_values,
        }
    }

    /// The rule name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The rule kind.
    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    /// Returns true for node-level rules.
    pub fn is_node_filter(&self) -> bool {
        matches!(self.kind, FilterKind::Node(_))
    }

    /// Returns true for expression-level rules.
    pub fn is_expression_filter(&self) -> bool {
        matches!(self.kind, FilterKind::Expression(_))
    }

    /// Returns true for boolean rules.
    pub fn is_boolean(&self) -> bool {
        self.boolean
    }

    /// The default value, if any.
    pub fn default_value(&self) -> Option<&FilterValue> {
        self.default.as_ref()
    }

    /// The skip value, if any.
    pub fn skip_value(&self) -> Option<&FilterValue> {
        self.skip_if.as_ref()
    }

    /// The allow-list, if any.
    pub fn valid_values(&self) -> Option<&[FilterValue]> {
        self.valid_values.as_deref()
    }

    /// Returns true if `value` makes this rule inert.
    pub fn skips(&self, value: &FilterValue) -> bool {
        self.skip_if.as_ref().is_some_and(|skip| skip == value)
    }

    /// Returns true if `value` is allowed (always true without an allow-list).
    pub fn is_valid(&self, value: &FilterValue) -> bool {
        match &self.valid_values {
            Some(valid) if !valid.is_empty() => valid.contains(value),
            _ => true,
        }
    }

    /// Decides which value, if any, the matcher receives.
    ///
    /// Invalid values are logged at `warn` level.
    pub fn gate<'a>(&'a self, value: &'a FilterValue) -> Gate<'a> {
        if self.skips(value) {
            return Gate {
                value: None,
                outcome: FilterOutcome::Skipped,
            };
        }

        if self.is_valid(value) {
            return Gate {
                value: Some(value),
                outcome: FilterOutcome::Applied,
            };
        }

        let warning = FilterWarning {
            filter: self.name.clone(),
            value: value.to_string(),
            defaulted_to: self.default.as_ref().map(ToString::to_string),
        };
        warn!(filter = %self.name, value = %value, "{}", warning);

        match &self.default {
            Some(default) => Gate {
                value: Some(default),
                outcome: FilterOutcome::DefaultedWithWarning(warning),
            },
            None => Gate {
                value: None,
                outcome: FilterOutcome::SkippedWithWarning(warning),
            },
        }
    }

    /// Returns whether `node` satisfies this rule for `value`.
    ///
    /// Expression-level rules always match here.
    pub fn matches(&self, node: &dyn Node, value: &FilterValue) -> bool {
        if self.is_expression_filter() {
            return true;
        }
        match self.gate(value).value {
            Some(effective) => self.run_node(node, effective),
            None => true,
        }
    }

    /// Narrows `expression` for `value`.
    ///
    /// Node-level rules return the expression unchanged.
    pub fn apply(&self, expression: Expression, value: &FilterValue) -> Expression {
        if self.is_node_filter() {
            return expression;
        }
        match self.gate(value).value {
            Some(effective) => self.run_expression(expression, effective),
            None => expression,
        }
    }

    /// Runs a node matcher on an already gated value.
    pub(crate) fn run_node(&self, node: &dyn Node, effective: &FilterValue) -> bool {
        match &self.kind {
            FilterKind::Node(matcher) => matcher(node, effective),
            FilterKind::Expression(_) => true,
        }
    }

    /// Runs an expression matcher on an already gated value.
    pub(crate) fn run_expression(&self, expression: Expression, effective: &FilterValue) -> Expression {
        match &self.kind {
            FilterKind::Expression(matcher) => matcher(expression, effective),
            FilterKind::Node(_) => expression,
        }
    }

    /// Returns false if the rule has a default outside its allow-list.
    pub(crate) fn default_is_valid(&self) -> bool {
        self.default.as_ref().map_or(true, |d| self.is_valid(d))
    }
}

impl fmt::Debug for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRule")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("boolean", &self.boolean)
            .field("default", &self.default)
            .field("skip_if", &self.skip_if)
            .field("valid_values", &self.valid_values)
            .finish()
    }
}

/// Inserts a rule, replacing a same-named rule in place.
pub(crate) fn insert_rule(rules: &mut Vec<FilterRule>, rule: FilterRule) {
    match rules.iter_mut().find(|r| r.name == rule.name) {
        Some(existing) => *existing = rule,
        None => rules.push(rule),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_xpath::dsl::{attr, descendant};

    struct Checkbox {
        checked: bool,
    }

    impl Node for Checkbox {
        fn tag_name(&self) -> String {
            "input".to_string()
        }

        fn text(&self) -> String {
            String::new()
        }

        fn attribute(&self, _name: &str) -> Option<String> {
            None
        }

        fn is_checked(&self) -> bool {
            self.checked
        }
    }

    fn checked_rule() -> FilterRule {
        FilterRule::node("checked", Constraints::boolean(), |node, value| {
            value.as_bool() == Some(node.is_checked())
        })
    }

    fn disabled_rule() -> FilterRule {
        FilterRule::node(
            "disabled",
            Constraints::boolean().with_default(false).with_skip_if("all"),
            |node, value| value.as_bool() == Some(node.is_disabled()),
        )
    }

    #[test]
    fn test_boolean_overrides_valid_values() {
        let rule = FilterRule::node(
            "x",
            Constraints::new()
                .with_valid_values(["a", "b"])
                .with_boolean(),
            |_, _| true,
        );
        assert_eq!(
            rule.valid_values(),
            Some(&[FilterValue::Bool(true), FilterValue::Bool(false)][..])
        );
        assert!(rule.is_boolean());
    }

    #[test]
    fn test_gate_applied() {
        let rule = checked_rule();
        let value = FilterValue::Bool(true);
        let gate = rule.gate(&value);
        assert_eq!(gate.value, Some(&FilterValue::Bool(true)));
        assert_eq!(gate.outcome, FilterOutcome::Applied);
    }

    #[test]
    fn test_gate_skip_value() {
        let rule = disabled_rule();
        let value = FilterValue::from("all");
        let gate = rule.gate(&value);
        assert!(gate.value.is_none());
        assert_eq!(gate.outcome, FilterOutcome::Skipped);
        assert!(gate.outcome.warning().is_none());
    }

    #[test]
    fn test_gate_invalid_with_default() {
        let rule = disabled_rule();
        let value = FilterValue::from("yes");
        let gate = rule.gate(&value);
        assert_eq!(gate.value, Some(&FilterValue::Bool(false)));
        let warning = gate.outcome.warning().expect("warning");
        assert_eq!(
            warning.to_string(),
            "Invalid value \"yes\" passed to filter disabled - defaulting to false"
        );
    }

    #[test]
    fn test_gate_invalid_without_default() {
        let rule = checked_rule();
        let value = FilterValue::from("yes");
        let gate = rule.gate(&value);
        assert!(gate.value.is_none());
        assert!(matches!(gate.outcome, FilterOutcome::SkippedWithWarning(_)));
        assert!(!gate.outcome.is_active());
        assert_eq!(
            gate.outcome.into_warning().unwrap().to_string(),
            "Invalid value \"yes\" passed to filter checked - skipping"
        );
    }

    #[test]
    fn test_matches_boolean() {
        let rule = checked_rule();
        let on = Checkbox { checked: true };
        let off = Checkbox { checked: false };
        assert!(rule.matches(&on, &FilterValue::Bool(true)));
        assert!(!rule.matches(&on, &FilterValue::Bool(false)));
        assert!(rule.matches(&off, &FilterValue::Bool(false)));
    }

    #[test]
    fn test_matches_invalid_value_is_lenient() {
        let rule = checked_rule();
        let off = Checkbox { checked: false };
        assert!(rule.matches(&off, &FilterValue::from("nonsense")));
    }

    #[test]
    fn test_apply_expression_rule() {
        let rule = FilterRule::expression("name", Constraints::new(), |expr, value| {
            expr.map_xpath(|x| x.predicate(attr("name").equals(value.literal())))
        });
        let narrowed = rule.apply(
            Expression::from(descendant(["input"])),
            &FilterValue::from("email"),
        );
        assert_eq!(
            narrowed.as_xpath().map(ToString::to_string),
            Some(".//input[./@name = 'email']".to_string())
        );
        assert!(rule.is_expression_filter());
        assert!(rule.matches(&Checkbox { checked: false }, &FilterValue::from("x")));
    }

    #[test]
    fn test_node_rule_leaves_expression_alone() {
        let rule = checked_rule();
        let expr = Expression::Css("input".to_string());
        assert_eq!(rule.apply(expr.clone(), &FilterValue::Bool(true)), expr);
    }

    #[test]
    fn test_default_is_valid() {
        assert!(disabled_rule().default_is_valid());
        let bad = FilterRule::node("x", Constraints::boolean().with_default("maybe"), |_, _| true);
        assert!(!bad.default_is_valid());
    }

    #[test]
    fn test_insert_rule_replaces_in_place() {
        let mut rules = vec![checked_rule(), disabled_rule()];
        insert_rule(
            &mut rules,
            FilterRule::node("checked", Constraints::new(), |_, _| false),
        );
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name(), "checked");
        assert!(!rules[0].is_boolean());
    }
}
