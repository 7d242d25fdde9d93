//! Traits for the external driver and the node handles it returns.
//!
//! This crate never talks to a browser itself. The engine hands a rendered
//! [`QueryExpression`] to a [`Driver`] and filters the [`Node`] handles it gets
//! back. Implement both traits for your WebDriver/CDP client in your
//! application crate.
//!
//! # Example: a WebDriver-backed implementation
//!
//! ```ignore
//! use sift_selector::{Driver, DriverError, Node, QueryExpression};
//!
//! impl Driver for MySession {
//!     type Node = MyElement;
//!
//!     fn execute(&self, expression: &QueryExpression) -> Result<Vec<MyElement>, DriverError> {
//!         let found = match expression {
//!             QueryExpression::Css(css) => self.find_all_css(css)?,
//!             QueryExpression::XPath(xpath) => self.find_all_xpath(xpath)?,
//!         };
//!         Ok(found)
//!     }
//! }
//! ```

use std::fmt;

/// Error raised by a driver. Passed through the engine unchanged, so callers
/// can downcast it back to the driver's own error type.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A rendered query ready for the driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "format", content = "expression", rename_all = "lowercase"))]
pub enum QueryExpression {
    /// A CSS selector.
    Css(String),
    /// An XPath expression.
    XPath(String),
}

impl QueryExpression {
    /// The expression text.
    pub fn as_str(&self) -> &str {
        match self {
            QueryExpression::Css(s) | QueryExpression::XPath(s) => s,
        }
    }

    /// Returns true for XPath expressions.
    pub fn is_xpath(&self) -> bool {
        matches!(self, QueryExpression::XPath(_))
    }
}

impl fmt::Display for QueryExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `<option>` of a select box, as seen by the select filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Visible text.
    pub text: String,
    /// Full text content, including hidden text.
    pub all_text: String,
    /// Whether the option is selected.
    pub selected: bool,
    /// Whether the option is visible.
    pub visible: bool,
}

impl SelectOption {
    /// A visible, unselected option whose text and full text are `text`.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            all_text: text.clone(),
            text,
            selected: false,
            visible: true,
        }
    }

    /// Marks the option as selected.
    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Marks the option as hidden.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// A handle to a document node returned by a [`Driver`].
///
/// Only [`tag_name`](Self::tag_name), [`text`](Self::text) and
/// [`attribute`](Self::attribute) are required. State accessors default to
/// the state of a plain, visible, enabled element.
pub trait Node {
    /// Lower-case tag name, e.g. `"input"`.
    fn tag_name(&self) -> String;

    /// Visible text of the node.
    fn text(&self) -> String;

    /// Attribute value, or `None` if the attribute is absent.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Full text content, including hidden text.
    fn all_text(&self) -> String {
        self.text()
    }

    /// Current value of a form control.
    fn value(&self) -> Option<String> {
        self.attribute("value")
    }

    /// Whether the node is rendered and visible.
    fn is_visible(&self) -> bool {
        true
    }

    /// Whether a checkbox or radio button is checked.
    fn is_checked(&self) -> bool {
        false
    }

    /// Whether an option is selected.
    fn is_selected(&self) -> bool {
        false
    }

    /// Whether a form control is disabled.
    fn is_disabled(&self) -> bool {
        false
    }

    /// Whether a form control is read-only.
    fn is_readonly(&self) -> bool {
        false
    }

    /// Whether a select box accepts multiple selections.
    fn is_multiple(&self) -> bool {
        false
    }

    /// The options of a select box in document order. Empty for other nodes.
    fn select_options(&self) -> Vec<SelectOption> {
        Vec::new()
    }
}

/// A driver capable of running a query expression against a live document.
///
/// Handles must be returned in document order. The engine preserves that
/// order and never retries a failed call.
pub trait Driver {
    /// The node handle type.
    type Node: Node;

    /// Runs an expression and returns the matching nodes in document order.
    fn execute(&self, expression: &QueryExpression) -> Result<Vec<Self::Node>, DriverError>;
}

impl<D: Driver + ?Sized> Driver for &D {
    type Node = D::Node;

    fn execute(&self, expression: &QueryExpression) -> Result<Vec<Self::Node>, DriverError> {
        (**self).execute(expression)
    }
}
