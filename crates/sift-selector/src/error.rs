//! Error types for selector definition and query resolution.

use thiserror::Error;

use crate::traits::DriverError;

/// Errors that can occur while resolving a query.
#[derive(Error, Debug)]
pub enum SelectorError {
    /// No selector is registered under this kind.
    #[error("no selector registered for kind {0:?}")]
    UnknownSelectorKind(String),

    /// A filter option does not name a filter of the selector kind.
    #[error("invalid option {option:?} for selector {kind:?}, expected one of: {}", supported.join(", "))]
    UnsupportedOption {
        /// Selector kind.
        kind: String,
        /// The offending option name.
        option: String,
        /// Filter names the kind supports.
        supported: Vec<String>,
    },

    /// No node matched.
    #[error("Unable to find {description}")]
    NoMatchingNode {
        /// Description of the query.
        description: String,
    },

    /// More than one node matched where exactly one was required.
    #[error("Ambiguous match, found {count} elements matching {description}")]
    AmbiguousMatch {
        /// Number of matching nodes.
        count: usize,
        /// Description of the query.
        description: String,
    },

    /// A filter set name was not found in the registry.
    #[error("no filter set registered as {0:?}")]
    UnknownFilterSet(String),

    /// A selector definition could not be built.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// The driver failed to execute the expression.
    #[error(transparent)]
    Driver(DriverError),
}

impl SelectorError {
    /// Returns true for errors caused by the caller's query itself
    /// (unknown kind or option), which retrying will not fix.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            SelectorError::UnknownSelectorKind(_) | SelectorError::UnsupportedOption { .. }
        )
    }

    /// Returns true for not-found and ambiguous outcomes.
    pub fn is_match_error(&self) -> bool {
        matches!(
            self,
            SelectorError::NoMatchingNode { .. } | SelectorError::AmbiguousMatch { .. }
        )
    }
}

/// Errors that can occur while finishing a selector definition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// Neither a CSS nor an XPath generator was set.
    #[error("selector {0:?} has no css or xpath generator")]
    MissingExpressionMode(String),

    /// A filter's default value is not among its valid values.
    #[error("default value {value} of filter {filter:?} on {owner:?} is not a valid value")]
    InvalidDefault {
        /// Selector or filter set name.
        owner: String,
        /// Filter name.
        filter: String,
        /// Display form of the default.
        value: String,
    },
}

/// Result type for selector operations.
pub type SelectorResult<T> = std::result::Result<T, SelectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unknown_kind() {
        let err = SelectorError::UnknownSelectorKind("widget".to_string());
        assert_eq!(err.to_string(), "no selector registered for kind \"widget\"");
    }

    #[test]
    fn test_error_display_unsupported_option() {
        let err = SelectorError::UnsupportedOption {
            kind: "button".to_string(),
            option: "chekced".to_string(),
            supported: vec!["disabled".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "invalid option \"chekced\" for selector \"button\", expected one of: disabled"
        );
    }

    #[test]
    fn test_error_display_no_match() {
        let err = SelectorError::NoMatchingNode {
            description: "checkbox \"Remember me\"".to_string(),
        };
        assert_eq!(err.to_string(), "Unable to find checkbox \"Remember me\"");
    }

    #[test]
    fn test_error_display_ambiguous() {
        let err = SelectorError::AmbiguousMatch {
            count: 2,
            description: "button \"Save\"".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Ambiguous match, found 2 elements matching button \"Save\""
        );
    }

    #[test]
    fn test_error_from_definition_error() {
        let err: SelectorError = DefinitionError::MissingExpressionMode("x".to_string()).into();
        assert!(matches!(err, SelectorError::Definition(_)));
        assert_eq!(err.to_string(), "selector \"x\" has no css or xpath generator");
    }

    #[test]
    fn test_error_classification() {
        assert!(SelectorError::UnknownSelectorKind("x".into()).is_caller_error());
        assert!(!SelectorError::UnknownSelectorKind("x".into()).is_match_error());
        let err = SelectorError::NoMatchingNode {
            description: String::new(),
        };
        assert!(err.is_match_error());
    }

    #[test]
    fn test_driver_error_is_transparent() {
        let source: DriverError = "stale element reference".into();
        let err = SelectorError::Driver(source);
        assert_eq!(err.to_string(), "stale element reference");
    }
}
