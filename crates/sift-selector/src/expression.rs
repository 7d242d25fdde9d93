//! Unrendered query expressions.

use sift_xpath::{Expr, Matching};

use crate::traits::QueryExpression;

/// An expression produced by a selector generator and narrowed by
/// expression filters, before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// A CSS selector.
    Css(String),
    /// An XPath expression tree.
    XPath(Expr),
}

impl Expression {
    /// Renders the expression for the driver.
    pub fn render(&self, matching: Matching) -> QueryExpression {
        match self {
            Expression::Css(css) => QueryExpression::Css(css.clone()),
            Expression::XPath(expr) => QueryExpression::XPath(expr.to_xpath(matching)),
        }
    }

    /// Applies `f` to an XPath expression; CSS passes through unchanged.
    pub fn map_xpath(self, f: impl FnOnce(Expr) -> Expr) -> Self {
        match self {
            Expression::XPath(expr) => Expression::XPath(f(expr)),
            css => css,
        }
    }

    /// Returns the XPath tree, if any.
    pub fn as_xpath(&self) -> Option<&Expr> {
        match self {
            Expression::XPath(expr) => Some(expr),
            Expression::Css(_) => None,
        }
    }

    /// Returns true if rendering differs between exact and partial matching.
    pub fn depends_on_matching(&self) -> bool {
        self.as_xpath().is_some_and(Expr::depends_on_matching)
    }
}

impl From<Expr> for Expression {
    fn from(expr: Expr) -> Self {
        Expression::XPath(expr)
    }
}
