//! Query resolution engine.

use std::sync::Arc;
use std::time::Instant;

use sift_xpath::Matching;
use tracing::{debug, trace, warn};

use crate::cache::{CacheKey, ExpressionCache};
use crate::config::ResolverConfig;
use crate::error::{SelectorError, SelectorResult};
use crate::filter::{FilterRule, FilterWarning};
use crate::query::{self, Cardinality, Query, Visibility};
use crate::registry::Registry;
use crate::result::{CompiledQuery, MatchResult, ResolutionStats};
use crate::selector::SelectorDefinition;
use crate::traits::{Driver, Node};
use crate::value::FilterValue;

/// A node-level rule with the value it was gated to.
type GatedRule<'q> = (&'q FilterRule, &'q FilterValue);

/// Main selector resolution engine.
///
/// The engine bridges the selector registry and any driver that implements
/// [`Driver`]: it compiles a [`Query`] to a CSS or XPath expression, runs it
/// through the driver and filters the returned nodes.
///
/// # Example
///
/// ```ignore
/// use sift_selector::{Query, SelectorEngine};
///
/// // Assumes MySession implements Driver
/// let session = MySession::connect()?;
/// let engine = SelectorEngine::new(&session);
///
/// let save = engine.find(&Query::new("button").with_locator("Save"))?;
/// let links = engine.all(&Query::new("link"))?;
/// println!("{} links", links.len());
/// ```
pub struct SelectorEngine<'a, D: Driver> {
    /// The driver that executes expressions.
    driver: &'a D,
    /// Selector kinds and filter sets.
    registry: Registry,
    /// Engine configuration.
    config: ResolverConfig,
    /// Compiled expression cache (optional).
    cache: Option<ExpressionCache>,
}

impl<'a, D: Driver> SelectorEngine<'a, D> {
    /// Creates an engine with the built-in catalog and default configuration.
    pub fn new(driver: &'a D) -> Self {
        Self::with_config(driver, ResolverConfig::default())
    }

    /// Creates an engine with the built-in catalog and custom configuration.
    pub fn with_config(driver: &'a D, config: ResolverConfig) -> Self {
        Self::with_registry(driver, Registry::new(), config)
    }

    /// Creates an engine over an explicit registry.
    pub fn with_registry(driver: &'a D, registry: Registry, config: ResolverConfig) -> Self {
        let cache = config.cache.as_ref().map(ExpressionCache::new);
        Self {
            driver,
            registry,
            config,
            cache,
        }
    }

    /// Returns the registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Returns the cache if enabled.
    pub fn cache(&self) -> Option<&ExpressionCache> {
        self.cache.as_ref()
    }

    /// Registers a definition, replacing any same-named one.
    ///
    /// Clears the expression cache.
    pub fn register(
        &mut self,
        definition: impl Into<Arc<SelectorDefinition>>,
    ) -> Option<Arc<SelectorDefinition>> {
        self.clear_cache();
        self.registry.register(definition)
    }

    /// Removes a definition. Clears the expression cache.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<SelectorDefinition>> {
        self.clear_cache();
        self.registry.unregister(name)
    }

    /// Compiles a query to the expression the driver would receive first,
    /// without calling the driver.
    ///
    /// Under [`Cardinality::Smart`] and [`Cardinality::PreferExact`] this is
    /// the exact rendering; the partial retry is not compiled.
    ///
    /// # Errors
    ///
    /// [`SelectorError::UnknownSelectorKind`] and
    /// [`SelectorError::UnsupportedOption`].
    pub fn compile(&self, query: &Query) -> SelectorResult<CompiledQuery> {
        let definition = self.definition(query)?;
        let cardinality = query.cardinality.unwrap_or(self.config.default_cardinality);
        let matching = initial_matching(cardinality, self.requested_exact(query));
        Ok(self.compile_with(&definition, query, matching))
    }

    /// Resolves a query according to its cardinality.
    ///
    /// Single-node cardinalities produce a result holding exactly one node.
    ///
    /// # Errors
    ///
    /// - [`SelectorError::UnknownSelectorKind`] / [`SelectorError::UnsupportedOption`]
    ///   before the driver is called.
    /// - [`SelectorError::Driver`] if the driver fails.
    /// - [`SelectorError::NoMatchingNode`] / [`SelectorError::AmbiguousMatch`]
    ///   when the cardinality is not met.
    pub fn resolve(&self, query: &Query) -> SelectorResult<MatchResult<D::Node>> {
        let start = Instant::now();
        let definition = self.definition(query)?;
        let cardinality = query.cardinality.unwrap_or(self.config.default_cardinality);
        let visibility = query
            .visible
            .unwrap_or_else(|| self.config.default_visibility());

        let mut warnings = Vec::new();
        let node_rules = gate_node_filters(&definition, query, &mut warnings);

        let requested = self.requested_exact(query);
        let first_matching = initial_matching(cardinality, requested);

        let mut stats = ResolutionStats::default();
        let mut pass = self.run_pass(&definition, query, first_matching, &node_rules, visibility)?;
        stats.driver_calls += 1;

        if pass.nodes.is_empty()
            && cardinality.prefers_exact()
            && requested.is_none()
            && pass.compiled.depends_on_matching
        {
            trace!(kind = %query.kind, "no exact match, retrying with partial matching");
            pass = self.run_pass(&definition, query, Matching::Partial, &node_rules, visibility)?;
            stats.driver_calls += 1;
        }

        let Pass {
            compiled,
            mut nodes,
            returned,
        } = pass;
        warnings.extend(compiled.warnings);

        match cardinality {
            Cardinality::All => {}
            Cardinality::First | Cardinality::PreferExact => {
                if nodes.is_empty() {
                    return Err(SelectorError::NoMatchingNode {
                        description: query::describe(&definition, query),
                    });
                }
                nodes.truncate(1);
            }
            Cardinality::One | Cardinality::Smart => match nodes.len() {
                0 => {
                    return Err(SelectorError::NoMatchingNode {
                        description: query::describe(&definition, query),
                    })
                }
                1 => {}
                count => {
                    return Err(SelectorError::AmbiguousMatch {
                        count,
                        description: query::describe(&definition, query),
                    })
                }
            },
        }

        stats.duration = start.elapsed();
        stats.nodes_returned = returned;
        stats.nodes_matched = nodes.len();
        stats.cache_hit = compiled.cache_hit;

        Ok(MatchResult::new(
            nodes,
            definition,
            query.clone(),
            compiled.expression,
            warnings,
            stats,
        ))
    }

    /// Resolves every matching node; an empty result is not an error.
    pub fn all(&self, query: &Query) -> SelectorResult<MatchResult<D::Node>> {
        self.resolve(&query.clone().with_cardinality(Cardinality::All))
    }

    /// Resolves the first matching node.
    pub fn first(&self, query: &Query) -> SelectorResult<D::Node> {
        let query = query.clone().with_cardinality(Cardinality::First);
        self.single(&query)
    }

    /// Resolves a single node using the query's cardinality.
    ///
    /// [`Cardinality::All`] is replaced by the configured default, or by
    /// [`Cardinality::Smart`] when the default is `All` too.
    pub fn find(&self, query: &Query) -> SelectorResult<D::Node> {
        let cardinality = match query.cardinality {
            Some(Cardinality::All) | None => match self.config.default_cardinality {
                Cardinality::All => Cardinality::Smart,
                default => default,
            },
            Some(cardinality) => cardinality,
        };
        self.single(&query.clone().with_cardinality(cardinality))
    }

    // =========================================================================
    // Internal Methods
    // =========================================================================

    fn single(&self, query: &Query) -> SelectorResult<D::Node> {
        let result = self.resolve(query)?;
        let description = result.description().to_string();
        result
            .into_nodes()
            .into_iter()
            .next()
            .ok_or(SelectorError::NoMatchingNode { description })
    }

    /// Exactness asked for by the query, or by the config when it is strict.
    fn requested_exact(&self, query: &Query) -> Option<bool> {
        query.exact.or_else(|| self.config.exact.then_some(true))
    }

    fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    /// Looks up the query's kind and checks its options.
    fn definition(&self, query: &Query) -> SelectorResult<Arc<SelectorDefinition>> {
        let definition = self
            .registry
            .get(&query.kind)
            .cloned()
            .ok_or_else(|| SelectorError::UnknownSelectorKind(query.kind.clone()))?;

        if let Some(option) = query.options.keys().find(|k| definition.filter(k).is_none()) {
            return Err(SelectorError::UnsupportedOption {
                kind: query.kind.clone(),
                option: option.to_string(),
                supported: definition.filter_names(),
            });
        }

        Ok(definition)
    }

    fn compile_with(
        &self,
        definition: &SelectorDefinition,
        query: &Query,
        matching: Matching,
    ) -> CompiledQuery {
        let key = self.cache.as_ref().map(|_| {
            let filters = definition
                .expression_filters()
                .filter_map(|rule| {
                    query
                        .options
                        .get(rule.name())
                        .map(|value| (rule.name().to_string(), value.to_string()))
                })
                .collect();
            CacheKey::new(&query.kind, query.locator(), matching, filters)
        });

        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(hit) = cache.get(key) {
                trace!(kind = %query.kind, expression = %hit.expression, "expression cache hit");
                for warning in &hit.warnings {
                    warn!(filter = %warning.filter, value = %warning.value, "{}", warning);
                }
                return CompiledQuery {
                    cache_hit: true,
                    ..hit
                };
            }
        }

        let context = self.config.generator_context();
        let mut expression = definition.expression_for(query.locator(), &context);
        let mut warnings = Vec::new();
        for rule in definition.expression_filters() {
            let Some(value) = query.options.get(rule.name()).or(rule.default_value()) else {
                continue;
            };
            let gate = rule.gate(value);
            if let Some(effective) = gate.value {
                expression = rule.run_expression(expression, effective);
            }
            warnings.extend(gate.outcome.into_warning());
        }

        let compiled = CompiledQuery {
            expression: expression.render(matching),
            matching,
            depends_on_matching: expression.depends_on_matching(),
            warnings,
            cache_hit: false,
        };
        debug!(
            kind = %query.kind,
            matching = ?matching,
            expression = %compiled.expression,
            "compiled selector query"
        );

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.insert(key, compiled.clone());
        }
        compiled
    }

    fn run_pass(
        &self,
        definition: &SelectorDefinition,
        query: &Query,
        matching: Matching,
        node_rules: &[GatedRule<'_>],
        visibility: Visibility,
    ) -> SelectorResult<Pass<D::Node>> {
        let compiled = self.compile_with(definition, query, matching);
        let mut nodes = self
            .driver
            .execute(&compiled.expression)
            .map_err(SelectorError::Driver)?;
        let returned = nodes.len();

        nodes.retain(|node| {
            visibility.admits(node.is_visible())
                && text_matches(node, query.text.as_ref(), visibility)
                && node_rules
                    .iter()
                    .all(|(rule, value)| rule.run_node(node, value))
        });

        debug!(
            kind = %query.kind,
            returned,
            matched = nodes.len(),
            "filtered driver results"
        );

        Ok(Pass {
            compiled,
            nodes,
            returned,
        })
    }
}

impl<D: Driver> std::fmt::Debug for SelectorEngine<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectorEngine")
            .field("selectors", &self.registry.len())
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish()
    }
}

/// One compile-execute-filter round.
struct Pass<N> {
    compiled: CompiledQuery,
    nodes: Vec<N>,
    returned: usize,
}

/// Matching mode of the first driver call: exact for the smart modes unless
/// the caller decided, otherwise the requested mode (partial by default).
fn initial_matching(cardinality: Cardinality, requested: Option<bool>) -> Matching {
    match (cardinality.prefers_exact(), requested) {
        (true, None) => Matching::Exact,
        (_, exact) => Matching::from_exact(exact.unwrap_or(false)),
    }
}

/// Gates every node-level rule once per query. Rules with neither an option
/// value nor a default are left out.
fn gate_node_filters<'q>(
    definition: &'q SelectorDefinition,
    query: &'q Query,
    warnings: &mut Vec<FilterWarning>,
) -> Vec<GatedRule<'q>> {
    let mut gated = Vec::new();
    for rule in definition.node_filters() {
        let Some(value) = query.options.get(rule.name()).or(rule.default_value()) else {
            continue;
        };
        let gate = rule.gate(value);
        if let Some(effective) = gate.value {
            gated.push((rule, effective));
        }
        warnings.extend(gate.outcome.into_warning());
    }
    gated
}

/// Query-level text filter: visible text when only visible nodes are
/// wanted, all text otherwise.
fn text_matches<N: Node>(node: &N, text: Option<&FilterValue>, visibility: Visibility) -> bool {
    let Some(text) = text else {
        return true;
    };
    let actual = match visibility {
        Visibility::Visible => node.text(),
        _ => node.all_text(),
    };
    text.found_in(&actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::filter::Constraints;
    use crate::traits::{DriverError, QueryExpression};
    use sift_xpath::dsl::{attr, descendant, string_n};
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: &'static str,
        visible: bool,
    }

    impl Node for Item {
        fn tag_name(&self) -> String {
            "li".to_string()
        }

        fn text(&self) -> String {
            if self.visible {
                self.name.to_string()
            } else {
                String::new()
            }
        }

        fn all_text(&self) -> String {
            self.name.to_string()
        }

        fn attribute(&self, name: &str) -> Option<String> {
            (name == "id").then(|| self.name.to_string())
        }

        fn is_visible(&self) -> bool {
            self.visible
        }
    }

    /// Returns the scripted answer for each call and records the expressions.
    struct Scripted {
        answers: RefCell<Vec<Vec<Item>>>,
        calls: RefCell<Vec<QueryExpression>>,
    }

    impl Scripted {
        fn new(answers: Vec<Vec<Item>>) -> Self {
            Self {
                answers: RefCell::new(answers),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Driver for Scripted {
        type Node = Item;

        fn execute(&self, expression: &QueryExpression) -> Result<Vec<Item>, DriverError> {
            self.calls.borrow_mut().push(expression.clone());
            let mut answers = self.answers.borrow_mut();
            if answers.is_empty() {
                Ok(Vec::new())
            } else {
                Ok(answers.remove(0))
            }
        }
    }

    fn item(name: &'static str) -> Item {
        Item {
            name,
            visible: true,
        }
    }

    fn registry() -> Registry {
        let mut registry = Registry::empty();
        registry
            .define("item", |s| {
                s.xpath(|locator, _| {
                    let expr = descendant(["li"]);
                    match locator {
                        Some(text) => expr.predicate(string_n().is(text)),
                        None => expr,
                    }
                })
                .node_filter("named", Constraints::new(), |node, value| {
                    value.matches_text(&node.all_text())
                })
                .expression_filter("class", Constraints::new(), |expr, value| {
                    expr.map_xpath(|x| x.predicate(attr("class").equals(value.literal())))
                })
            })
            .unwrap();
        registry
    }

    #[test]
    fn test_compile_does_not_call_driver() {
        let driver = Scripted::new(vec![]);
        let engine = SelectorEngine::with_registry(&driver, registry(), ResolverConfig::default());
        let compiled = engine
            .compile(&Query::new("item").with_locator("A").with_filter("class", "x"))
            .unwrap();
        assert_eq!(
            compiled.expression.as_str(),
            ".//li[normalize-space(string(.)) = 'A'][./@class = 'x']"
        );
        assert_eq!(compiled.matching, Matching::Exact);
        assert!(driver.calls.borrow().is_empty());
    }

    #[test]
    fn test_compile_matches_first_driver_call() {
        let driver = Scripted::new(vec![vec![], vec![]]);
        let engine = SelectorEngine::with_registry(&driver, registry(), ResolverConfig::default());

        for query in [
            Query::new("item").with_locator("A"),
            Query::new("item").with_locator("A").with_cardinality(Cardinality::All),
            Query::new("item")
                .with_locator("A")
                .with_cardinality(Cardinality::PreferExact)
                .with_exact(false),
        ] {
            driver.calls.borrow_mut().clear();
            let compiled = engine.compile(&query).unwrap();
            let _ = engine.resolve(&query);
            assert_eq!(driver.calls.borrow()[0], compiled.expression);
        }
    }

    #[test]
    fn test_initial_matching() {
        assert_eq!(initial_matching(Cardinality::Smart, None), Matching::Exact);
        assert_eq!(initial_matching(Cardinality::Smart, Some(false)), Matching::Partial);
        assert_eq!(initial_matching(Cardinality::One, None), Matching::Partial);
        assert_eq!(initial_matching(Cardinality::All, Some(true)), Matching::Exact);
    }

    #[test]
    fn test_smart_retries_partial_once() {
        let driver = Scripted::new(vec![vec![], vec![item("Apple pie")]]);
        let engine = SelectorEngine::with_registry(&driver, registry(), ResolverConfig::default());
        let result = engine.resolve(&Query::new("item").with_locator("Apple")).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.stats().driver_calls, 2);
        let calls = driver.calls.borrow();
        assert!(calls[0].as_str().contains("= 'Apple'"));
        assert!(calls[1].as_str().contains("contains("));
    }

    #[test]
    fn test_smart_does_not_retry_when_exact_requested() {
        let driver = Scripted::new(vec![vec![], vec![item("Apple pie")]]);
        let engine = SelectorEngine::with_registry(&driver, registry(), ResolverConfig::default());
        let err = engine
            .resolve(&Query::new("item").with_locator("Apple").with_exact(true))
            .unwrap_err();
        assert!(matches!(err, SelectorError::NoMatchingNode { .. }));
        assert_eq!(driver.calls.borrow().len(), 1);
    }

    #[test]
    fn test_smart_skips_retry_without_text_matching() {
        let driver = Scripted::new(vec![vec![], vec![item("A")]]);
        let engine = SelectorEngine::with_registry(&driver, registry(), ResolverConfig::default());
        assert!(engine.resolve(&Query::new("item")).is_err());
        assert_eq!(driver.calls.borrow().len(), 1);
    }

    #[test]
    fn test_hidden_nodes_dropped_by_default() {
        let hidden = Item {
            name: "B",
            visible: false,
        };
        let driver = Scripted::new(vec![vec![item("A"), hidden.clone()], vec![item("A"), hidden]]);
        let engine = SelectorEngine::with_registry(&driver, registry(), ResolverConfig::default());

        let visible = engine.all(&Query::new("item")).unwrap();
        assert_eq!(visible.into_nodes(), vec![item("A")]);

        let hidden_only = engine
            .all(&Query::new("item").with_visibility(Visibility::Hidden))
            .unwrap();
        assert_eq!(hidden_only.len(), 1);
        assert_eq!(hidden_only.stats().nodes_returned, 2);
    }

    #[test]
    fn test_text_filter() {
        let driver = Scripted::new(vec![vec![item("Apple"), item("Banana")]]);
        let engine = SelectorEngine::with_registry(&driver, registry(), ResolverConfig::default());
        let result = engine.all(&Query::new("item").with_text("nan")).unwrap();
        assert_eq!(result.into_nodes(), vec![item("Banana")]);
    }

    #[test]
    fn test_cache_hit_on_repeat() {
        let driver = Scripted::new(vec![vec![item("A")], vec![item("A")]]);
        let config = ResolverConfig::builder()
            .with_cache(CacheConfig::default())
            .build();
        let mut engine = SelectorEngine::with_registry(&driver, registry(), config);
        let query = Query::new("item").with_cardinality(Cardinality::All);

        assert!(!engine.resolve(&query).unwrap().stats().cache_hit);
        assert!(engine.resolve(&query).unwrap().stats().cache_hit);
        assert_eq!(engine.cache().map(ExpressionCache::len), Some(1));

        engine.unregister("nothing");
        assert_eq!(engine.cache().map(ExpressionCache::len), Some(0));
    }

    #[test]
    fn test_find_treats_all_as_default() {
        let driver = Scripted::new(vec![vec![item("A"), item("B")]]);
        let engine = SelectorEngine::with_registry(&driver, registry(), ResolverConfig::default());
        let err = engine
            .find(&Query::new("item").with_cardinality(Cardinality::All))
            .unwrap_err();
        assert!(matches!(err, SelectorError::AmbiguousMatch { count: 2, .. }));
    }
}
