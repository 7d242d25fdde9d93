//! Configuration types for the selector engine.

use crate::query::{Cardinality, Visibility};
use crate::selector::GeneratorContext;

/// Configuration for the selector engine.
///
/// # Example
///
/// ```rust
/// use sift_selector::{CacheConfig, Cardinality, ResolverConfig};
///
/// let config = ResolverConfig::builder()
///     .with_exact(true)
///     .with_enable_aria_label(true)
///     .with_default_cardinality(Cardinality::First)
///     .with_cache(CacheConfig::default())
///     .build();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResolverConfig {
    /// Exact text matching when a query does not say.
    pub exact: bool,
    /// Also match buttons, links and fields by `aria-label`.
    pub enable_aria_label: bool,
    /// Only keep visible nodes when a query does not say.
    pub ignore_hidden_elements: bool,
    /// Cardinality when a query does not say.
    pub default_cardinality: Cardinality,
    /// Expression cache configuration (None = caching disabled).
    pub cache: Option<CacheConfig>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            exact: false,
            enable_aria_label: false,
            ignore_hidden_elements: true,
            default_cardinality: Cardinality::Smart,
            cache: None,
        }
    }
}

impl ResolverConfig {
    /// Creates a new builder for ResolverConfig.
    pub fn builder() -> ResolverConfigBuilder {
        ResolverConfigBuilder::default()
    }

    /// The flags handed to selector generators.
    pub fn generator_context(&self) -> GeneratorContext {
        GeneratorContext {
            enable_aria_label: self.enable_aria_label,
        }
    }

    /// The visibility filter for queries that do not set one.
    pub fn default_visibility(&self) -> Visibility {
        Visibility::from_ignore_hidden(self.ignore_hidden_elements)
    }
}

/// Builder for ResolverConfig.
#[derive(Debug, Clone, Default)]
pub struct ResolverConfigBuilder {
    config: ResolverConfig,
}

impl ResolverConfigBuilder {
    /// Sets the default exactness.
    pub fn with_exact(mut self, exact: bool) -> Self {
        self.config.exact = exact;
        self
    }

    /// Enables or disables `aria-label` matching.
    pub fn with_enable_aria_label(mut self, enable: bool) -> Self {
        self.config.enable_aria_label = enable;
        self
    }

    /// Sets whether hidden elements are ignored by default.
    pub fn with_ignore_hidden_elements(mut self, ignore: bool) -> Self {
        self.config.ignore_hidden_elements = ignore;
        self
    }

    /// Sets the default cardinality.
    pub fn with_default_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.config.default_cardinality = cardinality;
        self
    }

    /// Enables the expression cache.
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.config.cache = Some(cache);
        self
    }

    /// Builds the ResolverConfig.
    pub fn build(self) -> ResolverConfig {
        self.config
    }
}

/// Configuration for the expression cache.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheConfig {
    /// Maximum number of compiled expressions kept.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 256 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_config_default() {
        let config = ResolverConfig::default();
        assert!(!config.exact);
        assert!(!config.enable_aria_label);
        assert!(config.ignore_hidden_elements);
        assert_eq!(config.default_cardinality, Cardinality::Smart);
        assert!(config.cache.is_none());
        assert_eq!(config.default_visibility(), Visibility::Visible);
    }

    #[test]
    fn test_resolver_config_builder() {
        let config = ResolverConfig::builder()
            .with_exact(true)
            .with_enable_aria_label(true)
            .with_ignore_hidden_elements(false)
            .with_default_cardinality(Cardinality::All)
            .with_cache(CacheConfig { max_entries: 8 })
            .build();

        assert!(config.exact);
        assert!(config.generator_context().enable_aria_label);
        assert_eq!(config.default_visibility(), Visibility::All);
        assert_eq!(config.default_cardinality, Cardinality::All);
        assert_eq!(config.cache, Some(CacheConfig { max_entries: 8 }));
    }

    #[test]
    fn test_cache_config_default() {
        assert_eq!(CacheConfig::default().max_entries, 256);
    }
}
