//! Fluent builder functions for XPath expressions.
//!
//! Free functions start a path from the context node; methods on [`Expr`]
//! extend it. Path-extending methods distribute over unions, so a predicate
//! applied to `a + b` narrows both members.
//!
//! ```rust
//! use sift_xpath::dsl::{attr, descendant};
//! use sift_xpath::Matching;
//!
//! let expr = descendant(["input"]).predicate(attr("type").equals("checkbox"));
//! assert_eq!(expr.to_xpath(Matching::Exact), ".//input[./@type = 'checkbox']");
//! ```

use std::ops::{Add, BitAnd, BitOr, Not};

use crate::ast::Expr;

fn names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

/// The context node (`.`).
pub fn current() -> Expr {
    Expr::Current
}

/// Descendants of the context node with any of the given element names.
///
/// An empty list matches any element.
pub fn descendant<I, S>(element_names: I) -> Expr
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    current().descendant(element_names)
}

/// Children of the context node with any of the given element names.
pub fn child<I, S>(element_names: I) -> Expr
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    current().child(element_names)
}

/// Elements anywhere in the document with any of the given element names.
pub fn anywhere<I, S>(element_names: I) -> Expr
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Expr::Anywhere(names(element_names))
}

/// An attribute of the context node.
pub fn attr(name: impl Into<String>) -> Expr {
    current().attr(name)
}

/// The normalized string value of the context node:
/// `normalize-space(string(.))`.
pub fn string_n() -> Expr {
    current().string_n()
}

/// A string literal.
pub fn literal(value: impl Into<String>) -> Expr {
    Expr::Literal(value.into())
}

/// Caller-supplied XPath text, rendered verbatim.
pub fn raw(xpath: impl Into<String>) -> Expr {
    Expr::Raw(xpath.into())
}

impl Expr {
    fn map_members(self, f: impl Fn(Expr) -> Expr) -> Expr {
        match self {
            Expr::Union(items) => Expr::Union(items.into_iter().map(f).collect()),
            other => f(other),
        }
    }

    /// Descendant elements with any of the given names.
    pub fn descendant<I, S>(self, element_names: I) -> Expr
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let element_names = names(element_names);
        self.map_members(|e| Expr::Descendant(Box::new(e), element_names.clone()))
    }

    /// Child elements with any of the given names.
    pub fn child<I, S>(self, element_names: I) -> Expr
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let element_names = names(element_names);
        self.map_members(|e| Expr::Child(Box::new(e), element_names.clone()))
    }

    /// A step along an explicit axis, e.g. `axis("self", "select")`.
    pub fn axis(self, axis: impl Into<String>, name: impl Into<String>) -> Expr {
        let axis = axis.into();
        let name = name.into();
        self.map_members(|e| Expr::Axis {
            current: Box::new(e),
            axis: axis.clone(),
            name: name.clone(),
        })
    }

    /// Evaluates `inner` (a relative expression) below this one.
    ///
    /// A union `inner` yields one nested path per member.
    pub fn descendant_expr(self, inner: Expr) -> Expr {
        let outer = self;
        let paths: Vec<Expr> = outer
            .members()
            .into_iter()
            .flat_map(|o| {
                inner
                    .members()
                    .into_iter()
                    .map(|i| Expr::NestedDescendant(Box::new(o.clone()), Box::new(i.clone())))
                    .collect::<Vec<_>>()
            })
            .collect();

        if paths.len() == 1 {
            paths.into_iter().next().unwrap_or(Expr::False)
        } else {
            Expr::Union(paths)
        }
    }

    /// Narrows this expression with a predicate: `self[condition]`.
    pub fn predicate(self, condition: Expr) -> Expr {
        self.map_members(|e| Expr::Where(Box::new(e), Box::new(condition.clone())))
    }

    /// An attribute of the nodes selected by this expression.
    pub fn attr(self, name: impl Into<String>) -> Expr {
        let name = name.into();
        self.map_members(|e| Expr::Attribute(Box::new(e), name.clone()))
    }

    /// `string(self)`
    pub fn string(self) -> Expr {
        Expr::StringOf(Box::new(self))
    }

    /// `normalize-space(self)`
    pub fn normalize(self) -> Expr {
        Expr::NormalizeSpace(Box::new(self))
    }

    /// `normalize-space(string(self))`
    pub fn string_n(self) -> Expr {
        self.string().normalize()
    }

    /// `self = other`
    pub fn equals(self, other: impl Into<Expr>) -> Expr {
        Expr::Equality(Box::new(self), Box::new(other.into()))
    }

    /// Equality under exact matching, containment under partial matching.
    pub fn is(self, other: impl Into<Expr>) -> Expr {
        Expr::Is(Box::new(self), Box::new(other.into()))
    }

    /// `contains(self, other)`
    pub fn contains(self, other: impl Into<Expr>) -> Expr {
        Expr::Contains(Box::new(self), Box::new(other.into()))
    }

    /// `starts-with(self, other)`
    pub fn starts_with(self, other: impl Into<Expr>) -> Expr {
        Expr::StartsWith(Box::new(self), Box::new(other.into()))
    }

    /// True when `self` equals any of `values`.
    ///
    /// An empty list renders as `false()`.
    pub fn one_of<I, V>(self, values: I) -> Expr
    where
        I: IntoIterator<Item = V>,
        V: Into<Expr>,
    {
        values
            .into_iter()
            .map(|v| self.clone().equals(v))
            .reduce(|acc, e| acc | e)
            .unwrap_or(Expr::False)
    }

    /// `(self and other)`
    pub fn and(self, other: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(other))
    }

    /// `(self or other)`
    pub fn or(self, other: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(other))
    }

    /// `(self | other)`, flattening nested unions.
    pub fn union(self, other: Expr) -> Expr {
        let mut items = match self {
            Expr::Union(items) => items,
            e => vec![e],
        };
        match other {
            Expr::Union(more) => items.extend(more),
            e => items.push(e),
        }
        Expr::Union(items)
    }
}

impl BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Expr) -> Expr {
        self.or(rhs)
    }
}

impl BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, rhs: Expr) -> Expr {
        self.and(rhs)
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        self.union(rhs)
    }
}
