//! Result types for query resolution.

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use sift_xpath::Matching;

use crate::filter::FilterWarning;
use crate::query::{self, Query};
use crate::selector::SelectorDefinition;
use crate::traits::QueryExpression;

/// A query compiled to a driver expression, without running it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompiledQuery {
    /// The rendered expression.
    pub expression: QueryExpression,
    /// The matching mode it was rendered with.
    pub matching: Matching,
    /// Whether a different matching mode would render differently.
    pub depends_on_matching: bool,
    /// Warnings raised by expression-level filters.
    pub warnings: Vec<FilterWarning>,
    /// Whether the compiled query came from the cache.
    pub cache_hit: bool,
}

/// Statistics from query resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    /// Total resolution duration, driver calls included.
    pub duration: Duration,
    /// Number of driver calls (two when partial matching was retried).
    pub driver_calls: usize,
    /// Nodes returned by the last driver call.
    pub nodes_returned: usize,
    /// Nodes that passed every filter.
    pub nodes_matched: usize,
    /// Whether the last compiled expression came from the cache.
    pub cache_hit: bool,
}

/// Nodes matched by a query, in driver order.
///
/// # Example
///
/// ```ignore
/// let result = engine.all(&Query::new("link"))?;
///
/// println!("{} links via {}", result.len(), result.expression());
///
/// for link in result.iter() {
///     println!("{}", link.text());
/// }
/// ```
pub struct MatchResult<N> {
    nodes: Vec<N>,
    definition: Arc<SelectorDefinition>,
    query: Query,
    expression: QueryExpression,
    warnings: Vec<FilterWarning>,
    stats: ResolutionStats,
    description: OnceLock<String>,
}

impl<N> MatchResult<N> {
    pub(crate) fn new(
        nodes: Vec<N>,
        definition: Arc<SelectorDefinition>,
        query: Query,
        expression: QueryExpression,
        warnings: Vec<FilterWarning>,
        stats: ResolutionStats,
    ) -> Self {
        Self {
            nodes,
            definition,
            query,
            expression,
            warnings,
            stats,
            description: OnceLock::new(),
        }
    }

    /// Human-readable description of the query, built on first use.
    pub fn description(&self) -> &str {
        self.description
            .get_or_init(|| query::describe(&self.definition, &self.query))
    }

    /// The matched nodes.
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    /// Number of matched nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The first matched node.
    pub fn first(&self) -> Option<&N> {
        self.nodes.first()
    }

    /// Iterates the matched nodes in driver order.
    pub fn iter(&self) -> std::slice::Iter<'_, N> {
        self.nodes.iter()
    }

    /// Consumes the result, returning the nodes.
    pub fn into_nodes(self) -> Vec<N> {
        self.nodes
    }

    /// The expression that was executed last.
    pub fn expression(&self) -> &QueryExpression {
        &self.expression
    }

    /// Warnings about invalid filter values.
    pub fn warnings(&self) -> &[FilterWarning] {
        &self.warnings
    }

    /// Resolution statistics.
    pub fn stats(&self) -> &ResolutionStats {
        &self.stats
    }

    /// The query that produced this result.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The selector definition the query resolved against.
    pub fn definition(&self) -> &SelectorDefinition {
        &self.definition
    }
}

impl<N: fmt::Debug> fmt::Debug for MatchResult<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchResult")
            .field("nodes", &self.nodes)
            .field("kind", &self.definition.name())
            .field("expression", &self.expression)
            .field("warnings", &self.warnings)
            .field("stats", &self.stats)
            .finish()
    }
}

impl<N> IntoIterator for MatchResult<N> {
    type Item = N;
    type IntoIter = std::vec::IntoIter<N>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a, N> IntoIterator for &'a MatchResult<N> {
    type Item = &'a N;
    type IntoIter = std::slice::Iter<'a, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
