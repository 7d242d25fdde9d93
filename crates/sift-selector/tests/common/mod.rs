//! In-memory document used by the integration tests.
//!
//! The fake driver does not evaluate XPath. It returns a scripted node list
//! for exact renders and another for partial renders (expressions containing
//! `contains(`), and records every expression it receives.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fmt;

use sift_selector::{Driver, DriverError, Node, QueryExpression, SelectOption};

/// A node handle with plain fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeNode {
    pub tag: String,
    pub text: String,
    pub hidden_text: String,
    pub attributes: Vec<(String, String)>,
    pub visible: bool,
    pub checked: bool,
    pub disabled: bool,
    pub readonly: bool,
    pub multiple: bool,
    pub options: Vec<SelectOption>,
}

impl FakeNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            text: String::new(),
            hidden_text: String::new(),
            attributes: Vec::new(),
            visible: true,
            checked: false,
            disabled: false,
            readonly: false,
            multiple: false,
            options: Vec::new(),
        }
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_hidden_text(mut self, text: &str) -> Self {
        self.hidden_text = text.to_string();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn checked(mut self) -> Self {
        self.checked = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn option(mut self, option: SelectOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn id_attr(&self) -> Option<String> {
        self.attribute("id")
    }
}

impl Node for FakeNode {
    fn tag_name(&self) -> String {
        self.tag.clone()
    }

    fn text(&self) -> String {
        if self.visible {
            self.text.clone()
        } else {
            String::new()
        }
    }

    fn all_text(&self) -> String {
        format!("{}{}", self.text, self.hidden_text)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn is_checked(&self) -> bool {
        self.checked
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn is_readonly(&self) -> bool {
        self.readonly
    }

    fn is_multiple(&self) -> bool {
        self.multiple
    }

    fn select_options(&self) -> Vec<SelectOption> {
        self.options.clone()
    }
}

/// Error raised by the fake driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleElement(pub String);

impl fmt::Display for StaleElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stale element: {}", self.0)
    }
}

impl std::error::Error for StaleElement {}

/// A scripted driver.
#[derive(Default)]
pub struct FakeDocument {
    exact: Vec<FakeNode>,
    partial: Vec<FakeNode>,
    failure: Option<String>,
    calls: RefCell<Vec<QueryExpression>>,
}

impl FakeDocument {
    /// Returns `nodes` for every expression.
    pub fn with(nodes: Vec<FakeNode>) -> Self {
        Self {
            exact: nodes.clone(),
            partial: nodes,
            ..Self::default()
        }
    }

    /// Returns `exact` for exact renders and `partial` for partial renders.
    pub fn split(exact: Vec<FakeNode>, partial: Vec<FakeNode>) -> Self {
        Self {
            exact,
            partial,
            ..Self::default()
        }
    }

    /// Fails every call.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<QueryExpression> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Driver for FakeDocument {
    type Node = FakeNode;

    fn execute(&self, expression: &QueryExpression) -> Result<Vec<FakeNode>, DriverError> {
        self.calls.borrow_mut().push(expression.clone());
        if let Some(message) = &self.failure {
            return Err(Box::new(StaleElement(message.clone())));
        }
        if expression.as_str().contains("contains(") {
            Ok(self.partial.clone())
        } else {
            Ok(self.exact.clone())
        }
    }
}

/// Ids of `nodes`, in order.
pub fn ids<'a>(nodes: impl IntoIterator<Item = &'a FakeNode>) -> Vec<String> {
    nodes
        .into_iter()
        .map(|n| n.id_attr().unwrap_or_default())
        .collect()
}
