//! The selector registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, error};

use crate::catalog;
use crate::error::{SelectorError, SelectorResult};
use crate::filter_set::FilterSet;
use crate::selector::{SelectorBuilder, SelectorDefinition};

/// Maps selector kind names to definitions and filter set names to sets.
///
/// [`Registry::new`] comes preloaded with the built-in catalog;
/// [`Registry::empty`] starts blank. Registering a name that already exists
/// replaces the earlier entry.
///
/// # Example
///
/// ```rust
/// use sift_selector::Registry;
/// use sift_xpath::dsl::descendant;
///
/// let mut registry = Registry::new();
/// assert!(registry.contains("link"));
///
/// registry
///     .define("paragraph", |s| s.xpath(|_, _| descendant(["p"])))
///     .unwrap();
/// assert!(registry.contains("paragraph"));
/// ```
#[derive(Debug, Clone)]
pub struct Registry {
    selectors: BTreeMap<String, Arc<SelectorDefinition>>,
    filter_sets: BTreeMap<String, Arc<FilterSet>>,
}

impl Registry {
    /// Creates a registry containing the built-in catalog.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        if let Err(err) = catalog::install(&mut registry) {
            error!(error = %err, "failed to install built-in selectors");
        }
        registry
    }

    /// Creates a registry with no selectors and no filter sets.
    pub fn empty() -> Self {
        Self {
            selectors: BTreeMap::new(),
            filter_sets: BTreeMap::new(),
        }
    }

    /// Registers a definition under its name, returning the one it replaced.
    pub fn register(
        &mut self,
        definition: impl Into<Arc<SelectorDefinition>>,
    ) -> Option<Arc<SelectorDefinition>> {
        let definition = definition.into();
        let name = definition.name().to_string();
        let replaced = self.selectors.insert(name.clone(), definition);
        debug!(kind = %name, replaced = replaced.is_some(), "registered selector");
        replaced
    }

    /// Removes a definition. Removing an unknown name is a no-op.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<SelectorDefinition>> {
        self.selectors.remove(name)
    }

    /// Looks up a definition.
    pub fn get(&self, name: &str) -> Option<&Arc<SelectorDefinition>> {
        self.selectors.get(name)
    }

    /// Returns true if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.selectors.contains_key(name)
    }

    /// Registered kind names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.selectors.keys().map(String::as_str).collect()
    }

    /// Number of registered selector kinds.
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Returns true if no selector kind is registered.
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Registers a filter set under its name, returning the one it replaced.
    pub fn register_filter_set(&mut self, set: impl Into<Arc<FilterSet>>) -> Option<Arc<FilterSet>> {
        let set = set.into();
        self.filter_sets.insert(set.name().to_string(), set)
    }

    /// Removes a filter set. Definitions that imported it keep their copies.
    pub fn unregister_filter_set(&mut self, name: &str) -> Option<Arc<FilterSet>> {
        self.filter_sets.remove(name)
    }

    /// Looks up a filter set.
    pub fn filter_set(&self, name: &str) -> Option<&Arc<FilterSet>> {
        self.filter_sets.get(name)
    }

    /// Looks up a filter set, failing with [`SelectorError::UnknownFilterSet`].
    pub fn require_filter_set(&self, name: &str) -> SelectorResult<&Arc<FilterSet>> {
        self.filter_set(name)
            .ok_or_else(|| SelectorError::UnknownFilterSet(name.to_string()))
    }

    /// Builds a definition and registers it.
    ///
    /// The registry is only changed if `build` produces a valid definition.
    /// Returns the definition that was replaced, if any.
    pub fn define<F>(&mut self, name: &str, build: F) -> SelectorResult<Option<Arc<SelectorDefinition>>>
    where
        F: FnOnce(SelectorBuilder) -> SelectorBuilder,
    {
        let definition = build(SelectorDefinition::builder(name)).finish()?;
        Ok(self.register(definition))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
