//! XPath renderer.
//!
//! Turns an [`Expr`] tree into XPath 1.0 text. The only context the
//! renderer needs is the [`Matching`] mode, which decides how
//! [`Expr::Is`] is rendered.

use std::fmt;

use crate::ast::{Expr, Matching};

/// XPath renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    matching: Matching,
}

impl Renderer {
    /// Create a renderer for the given matching mode.
    pub fn new(matching: Matching) -> Self {
        Self { matching }
    }

    /// Returns the matching mode of this renderer.
    pub fn matching(&self) -> Matching {
        self.matching
    }

    /// Render an expression.
    pub fn render(&self, expr: &Expr) -> String {
        match expr {
            Expr::Current => ".".to_string(),
            Expr::Anywhere(names) => format!("//{}", Self::element_step(names)),
            Expr::Descendant(current, names) => {
                format!("{}//{}", self.base(current), Self::element_step(names))
            }
            Expr::Child(current, names) => {
                format!("{}/{}", self.base(current), Self::element_step(names))
            }
            Expr::Axis {
                current,
                axis,
                name,
            } => format!("{}/{}::{}", self.base(current), axis, name),
            Expr::NestedDescendant(outer, inner) => {
                format!("{}//{}", self.base(outer), self.render(inner))
            }
            Expr::Where(current, condition) => {
                format!("{}[{}]", self.base(current), self.render(condition))
            }
            Expr::Attribute(current, name) => {
                if is_xml_name(name) {
                    format!("{}/@{}", self.base(current), name)
                } else {
                    format!(
                        "{}/attribute::*[local-name(.) = {}]",
                        self.base(current),
                        quote(name)
                    )
                }
            }
            Expr::Literal(value) => quote(value),
            Expr::Raw(xpath) => xpath.clone(),
            Expr::StringOf(e) => format!("string({})", self.render(e)),
            Expr::NormalizeSpace(e) => format!("normalize-space({})", self.render(e)),
            Expr::Equality(a, b) => format!("{} = {}", self.render(a), self.render(b)),
            Expr::Is(a, b) => match self.matching {
                Matching::Exact => format!("{} = {}", self.render(a), self.render(b)),
                Matching::Partial => {
                    format!("contains({}, {})", self.render(a), self.render(b))
                }
            },
            Expr::Contains(a, b) => format!("contains({}, {})", self.render(a), self.render(b)),
            Expr::StartsWith(a, b) => {
                format!("starts-with({}, {})", self.render(a), self.render(b))
            }
            Expr::And(a, b) => format!("({} and {})", self.render(a), self.render(b)),
            Expr::Or(a, b) => format!("({} or {})", self.render(a), self.render(b)),
            Expr::Not(e) => format!("not({})", self.render(e)),
            Expr::Union(items) => match items.as_slice() {
                [] => "false()".to_string(),
                [only] => self.render(only),
                many => format!(
                    "({})",
                    many.iter()
                        .map(|e| self.render(e))
                        .collect::<Vec<_>>()
                        .join(" | ")
                ),
            },
            Expr::False => "false()".to_string(),
        }
    }

    /// Render an expression (static method).
    pub fn render_expression(expr: &Expr, matching: Matching) -> String {
        Self::new(matching).render(expr)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Renders the expression a step or predicate extends. Raw XPath is
    /// parenthesized so that a raw union keeps its precedence.
    fn base(&self, current: &Expr) -> String {
        match current {
            Expr::Raw(xpath) => format!("({})", xpath),
            other => self.render(other),
        }
    }

    fn element_step(names: &[String]) -> String {
        match names {
            [] => "*".to_string(),
            [only] => only.clone(),
            many => format!(
                "*[{}]",
                many.iter()
                    .map(|n| format!("self::{}", n))
                    .collect::<Vec<_>>()
                    .join(" | ")
            ),
        }
    }
}

/// Quotes a string as an XPath literal.
///
/// XPath 1.0 has no escape sequences, so text containing both quote kinds is
/// split around single quotes and joined with `concat()`.
pub fn quote(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

impl Expr {
    /// Render this expression as XPath text.
    pub fn to_xpath(&self, matching: Matching) -> String {
        Renderer::render_expression(self, matching)
    }
}

impl fmt::Display for Expr {
    /// Renders with the default (partial) matching mode.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xpath(Matching::default()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::{anywhere, attr, child, descendant, raw, string_n};

    #[test]
    fn test_render_current() {
        assert_eq!(Expr::Current.to_xpath(Matching::Exact), ".");
    }

    #[test]
    fn test_render_descendant_single() {
        assert_eq!(descendant(["input"]).to_string(), ".//input");
    }

    #[test]
    fn test_render_descendant_any() {
        assert_eq!(descendant(Vec::<String>::new()).to_string(), ".//*");
    }

    #[test]
    fn test_render_descendant_many() {
        assert_eq!(
            descendant(["input", "select"]).to_string(),
            ".//*[self::input | self::select]"
        );
    }

    #[test]
    fn test_render_child_and_anywhere() {
        assert_eq!(child(["legend"]).to_string(), "./legend");
        assert_eq!(anywhere(["label"]).to_string(), "//label");
    }

    #[test]
    fn test_render_attribute_predicate() {
        let expr = descendant(["a"]).predicate(attr("href"));
        assert_eq!(expr.to_string(), ".//a[./@href]");
    }

    #[test]
    fn test_render_invalid_attribute_name() {
        let expr = attr("data value");
        assert_eq!(
            expr.to_string(),
            "./attribute::*[local-name(.) = 'data value']"
        );
    }

    #[test]
    fn test_render_is_exact_and_partial() {
        let expr = string_n().is("Save");
        assert_eq!(
            expr.to_xpath(Matching::Exact),
            "normalize-space(string(.)) = 'Save'"
        );
        assert_eq!(
            expr.to_xpath(Matching::Partial),
            "contains(normalize-space(string(.)), 'Save')"
        );
    }

    #[test]
    fn test_render_one_of() {
        let expr = attr("type").one_of(["submit", "reset", "image"]);
        assert_eq!(
            expr.to_string(),
            "((./@type = 'submit' or ./@type = 'reset') or ./@type = 'image')"
        );
    }

    #[test]
    fn test_render_not() {
        let expr = !attr("type").equals("hidden");
        assert_eq!(expr.to_string(), "not(./@type = 'hidden')");
    }

    #[test]
    fn test_render_union() {
        let expr = descendant(["frame"]) + descendant(["iframe"]);
        assert_eq!(expr.to_string(), "(.//frame | .//iframe)");
    }

    #[test]
    fn test_render_raw_with_predicate() {
        let expr = raw("//a | //b").predicate(attr("id").equals("x"));
        assert_eq!(expr.to_string(), "(//a | //b)[./@id = 'x']");
    }

    #[test]
    fn test_render_raw_steps_keep_precedence() {
        assert_eq!(raw("//a | //b").descendant(["x"]).to_string(), "(//a | //b)//x");
        assert_eq!(raw("//a | //b").child(["x"]).to_string(), "(//a | //b)/x");
        assert_eq!(raw("//a | //b").attr("id").to_string(), "(//a | //b)/@id");
        assert_eq!(
            raw("//a | //b").axis("self", "a").to_string(),
            "(//a | //b)/self::a"
        );
        assert_eq!(raw("//h1").to_string(), "//h1");
    }

    #[test]
    fn test_render_axis() {
        let expr = descendant(["select"]).axis("self", "select");
        assert_eq!(expr.to_string(), ".//select/self::select");
    }

    #[test]
    fn test_render_nested_descendant() {
        let expr = descendant(["label"]).descendant_expr(descendant(["input"]));
        assert_eq!(expr.to_string(), ".//label//.//input");
    }

    #[test]
    fn test_quote_plain() {
        assert_eq!(quote("hello"), "'hello'");
    }

    #[test]
    fn test_quote_single_quote() {
        assert_eq!(quote("it's"), "\"it's\"");
    }

    #[test]
    fn test_quote_both_quotes() {
        assert_eq!(quote("it's \"x\""), "concat('it', \"'\", 's \"x\"')");
    }

    #[test]
    fn test_render_false() {
        assert_eq!(Expr::False.to_string(), "false()");
        assert_eq!(Expr::Union(vec![]).to_string(), "false()");
    }

    #[test]
    fn test_renderer_matching() {
        let renderer = Renderer::new(Matching::Exact);
        assert_eq!(renderer.matching(), Matching::Exact);
    }
}
