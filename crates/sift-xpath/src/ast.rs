//! XPath expression AST types.
//!
//! An [`Expr`] is an immutable tree describing an XPath 1.0 location path or
//! predicate. Trees are built with the fluent methods in [`crate::dsl`] and
//! turned into query text by the [`Renderer`](crate::Renderer).
//!
//! ```text
//! descendant("input")[attr("type") = 'checkbox']
//!   => .//input[./@type = 'checkbox']
//! ```

/// An XPath expression.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Expr {
    /// The context node: `.`
    Current,

    /// Elements anywhere in the document: `//name`.
    Anywhere(Vec<String>),

    /// Descendant elements of an expression: `current//name`.
    Descendant(Box<Expr>, Vec<String>),

    /// Child elements of an expression: `current/name`.
    Child(Box<Expr>, Vec<String>),

    /// An explicit axis step: `current/axis::name`.
    Axis {
        /// The expression the step starts from.
        current: Box<Expr>,
        /// Axis name, e.g. `self` or `ancestor`.
        axis: String,
        /// Element name (`*` for any).
        name: String,
    },

    /// A relative expression evaluated below another: `current//inner`.
    NestedDescendant(Box<Expr>, Box<Expr>),

    /// A predicate applied to an expression: `current[condition]`.
    Where(Box<Expr>, Box<Expr>),

    /// Attribute access: `current/@name`.
    Attribute(Box<Expr>, String),

    /// A string literal.
    Literal(String),

    /// Caller-supplied XPath text, rendered verbatim.
    Raw(String),

    /// `string(expr)`
    StringOf(Box<Expr>),

    /// `normalize-space(expr)`
    NormalizeSpace(Box<Expr>),

    /// `left = right`
    Equality(Box<Expr>, Box<Expr>),

    /// Equality when rendered exactly, `contains()` when rendered partially.
    Is(Box<Expr>, Box<Expr>),

    /// `contains(haystack, needle)`
    Contains(Box<Expr>, Box<Expr>),

    /// `starts-with(haystack, prefix)`
    StartsWith(Box<Expr>, Box<Expr>),

    /// `(left and right)`
    And(Box<Expr>, Box<Expr>),

    /// `(left or right)`
    Or(Box<Expr>, Box<Expr>),

    /// `not(expr)`
    Not(Box<Expr>),

    /// `(a | b | ...)`
    Union(Vec<Expr>),

    /// `false()`
    False,
}

/// Text matching mode used when rendering [`Expr::Is`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Matching {
    /// `is` renders as equality.
    Exact,
    /// `is` renders as `contains()`.
    #[default]
    Partial,
}

impl Matching {
    /// Returns the mode for an `exact` flag.
    pub fn from_exact(exact: bool) -> Self {
        if exact {
            Matching::Exact
        } else {
            Matching::Partial
        }
    }

    /// Returns true for [`Matching::Exact`].
    pub fn is_exact(self) -> bool {
        matches!(self, Matching::Exact)
    }
}

// =============================================================================
// Implementations
// =============================================================================

impl Expr {
    /// Returns true if this expression is a union.
    pub fn is_union(&self) -> bool {
        matches!(self, Expr::Union(_))
    }

    /// Returns the union members, or the expression itself as the only member.
    pub fn members(&self) -> Vec<&Expr> {
        match self {
            Expr::Union(items) => items.iter().collect(),
            other => vec![other],
        }
    }

    /// Returns true if the expression contains an [`Expr::Is`] node, i.e.
    /// its rendering depends on the [`Matching`] mode.
    pub fn depends_on_matching(&self) -> bool {
        match self {
            Expr::Is(_, _) => true,
            Expr::Current
            | Expr::Anywhere(_)
            | Expr::Literal(_)
            | Expr::Raw(_)
            | Expr::False => false,
            Expr::Descendant(e, _)
            | Expr::Child(e, _)
            | Expr::Attribute(e, _)
            | Expr::StringOf(e)
            | Expr::NormalizeSpace(e)
            | Expr::Not(e) => e.depends_on_matching(),
            Expr::Axis { current, .. } => current.depends_on_matching(),
            Expr::NestedDescendant(a, b)
            | Expr::Where(a, b)
            | Expr::Equality(a, b)
            | Expr::Contains(a, b)
            | Expr::StartsWith(a, b)
            | Expr::And(a, b)
            | Expr::Or(a, b) => a.depends_on_matching() || b.depends_on_matching(),
            Expr::Union(items) => items.iter().any(Expr::depends_on_matching),
        }
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::Literal(value.to_string())
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::Literal(value)
    }
}

impl From<&String> for Expr {
    fn from(value: &String) -> Self {
        Expr::Literal(value.clone())
    }
}
