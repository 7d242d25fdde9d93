//! # sift-selector
//!
//! Selector registry and query resolution engine for browser automation.
//!
//! A query names a **selector kind** (`"button"`, `"checkbox"`, ...), an
//! optional **locator** (`"Save"`) and **filter options**
//! (`checked: true`). The engine turns it into a CSS or XPath expression,
//! hands that to your [`Driver`], and filters the node handles that come back.
//!
//! ## Key Features
//!
//! - **Built-in catalog** - 17 selector kinds for links, buttons and form controls
//! - **Extensible** - register your own kinds and filter sets with a builder
//! - **Lenient filters** - invalid filter values become warnings, never errors
//! - **Smart matching** - exact text first, partial text if nothing matched
//! - **Configurable caching** - LRU cache for compiled expressions
//!
//! ## Quick Start
//!
//! ```ignore
//! use sift_selector::{Query, SelectorEngine};
//!
//! // Assumes MySession implements Driver
//! let session = MySession::connect()?;
//! let engine = SelectorEngine::new(&session);
//!
//! let remember = engine.find(
//!     &Query::new("checkbox")
//!         .with_locator("Remember me")
//!         .with_filter("checked", false),
//! )?;
//! ```
//!
//! ## Defining a Selector
//!
//! ```rust
//! use sift_selector::{Constraints, Registry, FIELD_FILTER_SET};
//! use sift_xpath::dsl::{attr, descendant};
//!
//! let mut registry = Registry::new();
//! let field = registry.filter_set(FIELD_FILTER_SET).unwrap().clone();
//!
//! registry
//!     .define("search_box", |s| {
//!         s.label("search box")
//!             .xpath(|locator, _| {
//!                 let expr = descendant(["input"]).predicate(attr("type").equals("search"));
//!                 match locator {
//!                     Some(name) => expr.predicate(attr("name").equals(name)),
//!                     None => expr,
//!                 }
//!             })
//!             .import_filter_set(&field)
//!             .node_filter("value", Constraints::new(), |node, value| {
//!                 value.matches_text(&node.value().unwrap_or_default())
//!             })
//!     })
//!     .unwrap();
//!
//! assert!(registry.get("search_box").unwrap().filter("disabled").is_some());
//! ```
//!
//! ## Cardinality
//!
//! | Cardinality | 0 nodes | 1 node | n nodes |
//! |-------------|---------|--------|---------|
//! | `One` | not found | node | ambiguous |
//! | `First` | not found | node | first |
//! | `All` | empty | all | all |
//! | `Smart` (default) | retry partial, else not found | node | ambiguous |
//! | `PreferExact` | retry partial, else not found | node | first |
//!
//! ## Feature Flags
//!
//! - `serde` - Serialize/Deserialize for configuration and plain data types
//!
//! ## Logging
//!
//! Events are emitted through `tracing`: `warn` for invalid filter values,
//! `debug` for compiled expressions and match counts, `trace` for cache hits.
//! No subscriber is installed by this crate.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod cache;
mod catalog;
mod config;
mod engine;
mod error;
mod expression;
mod filter;
mod filter_set;
mod query;
mod registry;
mod result;
mod selector;
mod traits;
mod value;

// Public re-exports
pub use cache::{CacheKey, CacheStats, ExpressionCache};
pub use catalog::{install as install_catalog, FIELD_FILTER_SET};
pub use config::{CacheConfig, ResolverConfig, ResolverConfigBuilder};
pub use engine::SelectorEngine;
pub use error::{DefinitionError, SelectorError, SelectorResult};
pub use expression::Expression;
pub use filter::{
    Constraints, ExpressionMatcher, FilterKind, FilterOutcome, FilterRule, FilterWarning, Gate,
    NodeMatcher,
};
pub use filter_set::{DescriptionBuilder, FilterSet, FilterSetBuilder};
pub use query::{Cardinality, Query, Visibility};
pub use registry::Registry;
pub use result::{CompiledQuery, MatchResult, ResolutionStats};
pub use selector::{
    CssGenerator, ExpressionMode, GeneratorContext, SelectorBuilder, SelectorDefinition,
    XPathGenerator,
};
pub use traits::{Driver, DriverError, Node, QueryExpression, SelectOption};
pub use value::{FilterOptions, FilterValue};

// Re-export commonly used types from dependencies for convenience
pub use sift_xpath::{Expr, Matching};
