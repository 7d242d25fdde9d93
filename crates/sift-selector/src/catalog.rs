//! Built-in selector kinds.
//!
//! | Kind | Label | Matches |
//! |------|-------|---------|
//! | `css` | css | the locator as a CSS selector |
//! | `xpath` | xpath | the locator as raw XPath |
//! | `id` | id | any element whose id equals the locator |
//! | `button` | button | buttons and submit/reset/image/button inputs |
//! | `checkbox` | checkbox | checkbox inputs |
//! | `field` | field | inputs, selects and textareas except hidden/image/submit |
//! | `fieldset` | fieldset | fieldsets by id or legend |
//! | `file_field` | file field | file inputs |
//! | `fillable_field` | field | text-like inputs and textareas |
//! | `frame` | frame | frames and iframes by id or name |
//! | `label` | label | labels by text or id |
//! | `link` | link | anchors with an href |
//! | `link_or_button` | link or button | union of `link` and `button` |
//! | `option` | option | options by text |
//! | `radio_button` | radio button | radio inputs |
//! | `select` | select box | select boxes |
//! | `table` | table | tables by id or caption |
//!
//! Form controls are located by id, name, placeholder, or the text of a
//! label that points at them (`for`) or wraps them.

use sift_xpath::dsl::{anywhere, attr, child, current, descendant, raw, string_n};
use sift_xpath::Expr;

use crate::error::{DefinitionError, SelectorResult};
use crate::filter::Constraints;
use crate::filter_set::FilterSet;
use crate::registry::Registry;
use crate::selector::{GeneratorContext, SelectorBuilder, SelectorDefinition};
use crate::value::{FilterOptions, FilterValue};

/// Name of the built-in filter set shared by form controls.
pub const FIELD_FILTER_SET: &str = "field";

type CssFn = fn(Option<&str>, &GeneratorContext) -> String;
type XPathFn = fn(Option<&str>, &GeneratorContext) -> Expr;
type Extend = fn(SelectorBuilder) -> SelectorBuilder;

enum Generator {
    Css(CssFn),
    XPath(XPathFn),
}

struct CatalogEntry {
    name: &'static str,
    label: Option<&'static str>,
    generator: Generator,
    filter_sets: &'static [&'static str],
    extend: Option<Extend>,
}

const FIELD: &[&str] = &[FIELD_FILTER_SET];

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        name: "css",
        label: None,
        generator: Generator::Css(css),
        filter_sets: &[],
        extend: None,
    },
    CatalogEntry {
        name: "xpath",
        label: None,
        generator: Generator::XPath(xpath),
        filter_sets: &[],
        extend: None,
    },
    CatalogEntry {
        name: "id",
        label: None,
        generator: Generator::XPath(id),
        filter_sets: &[],
        extend: None,
    },
    CatalogEntry {
        name: "button",
        label: None,
        generator: Generator::XPath(button),
        filter_sets: &[],
        extend: Some(button_rules),
    },
    CatalogEntry {
        name: "checkbox",
        label: None,
        generator: Generator::XPath(checkbox),
        filter_sets: FIELD,
        extend: None,
    },
    CatalogEntry {
        name: "field",
        label: None,
        generator: Generator::XPath(field),
        filter_sets: FIELD,
        extend: Some(field_rules),
    },
    CatalogEntry {
        name: "fieldset",
        label: None,
        generator: Generator::XPath(fieldset),
        filter_sets: &[],
        extend: None,
    },
    CatalogEntry {
        name: "file_field",
        label: Some("file field"),
        generator: Generator::XPath(file_field),
        filter_sets: FIELD,
        extend: None,
    },
    CatalogEntry {
        name: "fillable_field",
        label: Some("field"),
        generator: Generator::XPath(fillable_field),
        filter_sets: FIELD,
        extend: Some(value_rule),
    },
    CatalogEntry {
        name: "frame",
        label: None,
        generator: Generator::XPath(frame),
        filter_sets: &[],
        extend: Some(frame_rules),
    },
    CatalogEntry {
        name: "label",
        label: None,
        generator: Generator::XPath(label),
        filter_sets: &[],
        extend: Some(label_rules),
    },
    CatalogEntry {
        name: "link",
        label: None,
        generator: Generator::XPath(link),
        filter_sets: &[],
        extend: Some(link_rules),
    },
    CatalogEntry {
        name: "link_or_button",
        label: Some("link or button"),
        generator: Generator::XPath(link_or_button),
        filter_sets: &[],
        extend: Some(link_or_button_rules),
    },
    CatalogEntry {
        name: "option",
        label: None,
        generator: Generator::XPath(option),
        filter_sets: &[],
        extend: None,
    },
    CatalogEntry {
        name: "radio_button",
        label: Some("radio button"),
        generator: Generator::XPath(radio_button),
        filter_sets: FIELD,
        extend: None,
    },
    CatalogEntry {
        name: "select",
        label: Some("select box"),
        generator: Generator::XPath(select),
        filter_sets: FIELD,
        extend: Some(select_rules),
    },
    CatalogEntry {
        name: "table",
        label: None,
        generator: Generator::XPath(table),
        filter_sets: &[],
        extend: None,
    },
];

/// Registers the built-in filter sets and selector kinds.
///
/// Existing entries with the same names are replaced.
pub fn install(registry: &mut Registry) -> SelectorResult<()> {
    registry.register_filter_set(field_filter_set()?);

    for entry in CATALOG {
        let mut builder = SelectorDefinition::builder(entry.name);
        builder = match entry.generator {
            Generator::Css(f) => builder.css(f),
            Generator::XPath(f) => builder.xpath(f),
        };
        if let Some(label) = entry.label {
            builder = builder.label(label);
        }
        for set in entry.filter_sets {
            builder = builder.import_filter_set(registry.require_filter_set(set)?);
        }
        if let Some(extend) = entry.extend {
            builder = extend(builder);
        }
        registry.register(builder.finish()?);
    }

    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

/// An empty locator counts as no locator.
fn present(locator: Option<&str>) -> Option<&str> {
    locator.filter(|l| !l.is_empty())
}

/// Compares a boolean node state with a boolean filter value.
fn state_is(state: bool, value: &FilterValue) -> bool {
    value.as_bool().map_or(true, |wanted| wanted == state)
}

fn sorted(mut items: Vec<String>) -> Vec<String> {
    items.sort();
    items
}

fn is_disabled_description(options: &FilterOptions) -> String {
    if options.get_bool("disabled") == Some(true) {
        " that is disabled".to_string()
    } else {
        String::new()
    }
}

fn value_description(options: &FilterOptions) -> String {
    match options.get("value") {
        Some(value) if value.is_truthy() => format!(" with value {}", value),
        _ => String::new(),
    }
}

/// Narrows `field` to controls matching `locator` by id, name, placeholder
/// or the text of an associated label, or nested inside a matching label.
fn locate_field(field: Expr, locator: Option<&str>, context: &GeneratorContext) -> Expr {
    let Some(locator) = present(locator) else {
        return field;
    };

    let mut attr_matchers = attr("id").equals(locator)
        | attr("name").equals(locator)
        | attr("placeholder").equals(locator)
        | attr("id").equals(
            anywhere(["label"])
                .predicate(string_n().is(locator))
                .attr("for"),
        );
    if context.enable_aria_label {
        attr_matchers = attr_matchers | attr("aria-label").is(locator);
    }

    let by_attribute = field.clone().predicate(attr_matchers);
    let wrapped = descendant(["label"])
        .predicate(string_n().is(locator))
        .descendant_expr(field);
    by_attribute + wrapped
}

// =============================================================================
// Generators
// =============================================================================

fn css(locator: Option<&str>, _: &GeneratorContext) -> String {
    locator.unwrap_or("*").to_string()
}

fn xpath(locator: Option<&str>, _: &GeneratorContext) -> Expr {
    match locator {
        Some(expression) => raw(expression),
        None => current(),
    }
}

fn id(locator: Option<&str>, _: &GeneratorContext) -> Expr {
    let expr = descendant(Vec::<String>::new());
    match locator {
        Some(id) => expr.predicate(attr("id").equals(id)),
        None => expr,
    }
}

fn button(locator: Option<&str>, context: &GeneratorContext) -> Expr {
    let mut input_button =
        descendant(["input"]).predicate(attr("type").one_of(["submit", "reset", "image", "button"]));
    let mut button = descendant(["button"]);
    let mut image_button = descendant(["input"]).predicate(attr("type").equals("image"));

    if let Some(locator) = present(locator) {
        let mut attr_matchers = attr("id").equals(locator)
            | attr("value").is(locator)
            | attr("title").is(locator);
        let mut image_attr_matchers = attr("alt").is(locator);
        if context.enable_aria_label {
            attr_matchers = attr_matchers | attr("aria-label").is(locator);
            image_attr_matchers = image_attr_matchers | attr("aria-label").is(locator);
        }

        input_button = input_button.predicate(attr_matchers.clone());
        button = button.predicate(
            attr_matchers
                | string_n().is(locator)
                | descendant(["img"]).predicate(attr("alt").is(locator)),
        );
        image_button = image_button.predicate(image_attr_matchers);
    }

    input_button + button + image_button
}

fn checkbox(locator: Option<&str>, context: &GeneratorContext) -> Expr {
    let expr = descendant(["input"]).predicate(attr("type").equals("checkbox"));
    locate_field(expr, locator, context)
}

fn field(locator: Option<&str>, context: &GeneratorContext) -> Expr {
    let expr = descendant(["input", "select", "textarea"])
        .predicate(!attr("type").one_of(["hidden", "image", "submit"]));
    locate_field(expr, locator, context)
}

fn fieldset(locator: Option<&str>, _: &GeneratorContext) -> Expr {
    let expr = descendant(["fieldset"]);
    match present(locator) {
        Some(locator) => expr.predicate(
            attr("id").equals(locator) | child(["legend"]).predicate(string_n().is(locator)),
        ),
        None => expr,
    }
}

fn file_field(locator: Option<&str>, context: &GeneratorContext) -> Expr {
    let expr = descendant(["input"]).predicate(attr("type").equals("file"));
    locate_field(expr, locator, context)
}

fn fillable_field(locator: Option<&str>, context: &GeneratorContext) -> Expr {
    let expr = descendant(["input", "textarea"]).predicate(
        !attr("type").one_of(["checkbox", "file", "hidden", "image", "radio", "submit"]),
    );
    locate_field(expr, locator, context)
}

fn frame(locator: Option<&str>, _: &GeneratorContext) -> Expr {
    let expr = descendant(["frame"]) + descendant(["iframe"]);
    match present(locator) {
        Some(locator) => {
            expr.predicate(attr("id").equals(locator) | attr("name").equals(locator))
        }
        None => expr,
    }
}

fn label(locator: Option<&str>, _: &GeneratorContext) -> Expr {
    let expr = descendant(["label"]);
    match present(locator) {
        Some(locator) => {
            expr.predicate(string_n().is(locator) | attr("id").equals(locator))
        }
        None => expr,
    }
}

fn link(locator: Option<&str>, context: &GeneratorContext) -> Expr {
    let expr = descendant(["a"]).predicate(attr("href"));
    let Some(locator) = present(locator) else {
        return expr;
    };

    let mut attr_matchers = attr("id").equals(locator)
        | attr("title").is(locator)
        | string_n().is(locator);
    if context.enable_aria_label {
        attr_matchers = attr_matchers | attr("aria-label").is(locator);
    }

    expr.predicate(attr_matchers | descendant(["img"]).predicate(attr("alt").is(locator)))
}

fn link_or_button(locator: Option<&str>, context: &GeneratorContext) -> Expr {
    link(locator, context) + button(locator, context)
}

fn option(locator: Option<&str>, _: &GeneratorContext) -> Expr {
    let expr = descendant(["option"]);
    match present(locator) {
        Some(locator) => expr.predicate(string_n().is(locator)),
        None => expr,
    }
}

fn radio_button(locator: Option<&str>, context: &GeneratorContext) -> Expr {
    let expr = descendant(["input"]).predicate(attr("type").equals("radio"));
    locate_field(expr, locator, context)
}

fn select(locator: Option<&str>, context: &GeneratorContext) -> Expr {
    locate_field(descendant(["select"]), locator, context)
}

fn table(locator: Option<&str>, _: &GeneratorContext) -> Expr {
    let expr = descendant(["table"]);
    match present(locator) {
        Some(locator) => expr.predicate(
            attr("id").equals(locator) | descendant(["caption"]).is(locator),
        ),
        None => expr,
    }
}

// =============================================================================
// Filter sets and extra rules
// =============================================================================

fn field_filter_set() -> Result<FilterSet, DefinitionError> {
    FilterSet::builder(FIELD_FILTER_SET)
        .node_filter("checked", Constraints::boolean(), |node, value| {
            state_is(node.is_checked(), value)
        })
        .node_filter(
            "disabled",
            Constraints::boolean().with_default(false).with_skip_if("all"),
            |node, value| state_is(node.is_disabled(), value),
        )
        .node_filter("id", Constraints::new(), |node, value| {
            value
                .as_text()
                .is_some_and(|id| node.attribute("id").as_deref() == Some(id))
        })
        .expression_filter("name", Constraints::new(), |expr, value| {
            expr.map_xpath(|x| x.predicate(attr("name").equals(value.literal())))
        })
        .expression_filter("placeholder", Constraints::new(), |expr, value| {
            expr.map_xpath(|x| x.predicate(attr("placeholder").equals(value.literal())))
        })
        .node_filter("readonly", Constraints::boolean(), |node, value| {
            state_is(node.is_readonly(), value)
        })
        .node_filter("unchecked", Constraints::boolean(), |node, value| {
            state_is(!node.is_checked(), value)
        })
        .describe(|options| {
            let mut states = Vec::new();
            if options.is_set("checked") || options.get_bool("unchecked") == Some(false) {
                states.push("checked");
            }
            if options.is_set("unchecked") || options.get_bool("checked") == Some(false) {
                states.push("not checked");
            }
            if options.get_bool("disabled") == Some(true) {
                states.push("disabled");
            }
            if states.is_empty() {
                String::new()
            } else {
                format!(" that is {}", states.join(" and "))
            }
        })
        .finish()
}

fn disabled_constraints() -> Constraints {
    Constraints::boolean().with_default(false).with_skip_if("all")
}

fn button_rules(builder: SelectorBuilder) -> SelectorBuilder {
    builder
        .node_filter("disabled", disabled_constraints(), |node, value| {
            state_is(node.is_disabled(), value)
        })
        .describe(is_disabled_description)
}

fn value_rule(builder: SelectorBuilder) -> SelectorBuilder {
    builder
        .node_filter("value", Constraints::new(), |node, value| {
            value.matches_text(&node.value().unwrap_or_default())
        })
        .describe(value_description)
}

fn field_rules(builder: SelectorBuilder) -> SelectorBuilder {
    let builder = builder.expression_filter("field_type", Constraints::new(), |expr, value| {
        let kind = value.literal();
        expr.map_xpath(|x| match kind.as_str() {
            "select" | "textarea" => x.axis("self", kind.as_str()),
            _ => x.predicate(attr("type").equals(kind.as_str())),
        })
    });
    value_rule(builder)
}

fn frame_rules(builder: SelectorBuilder) -> SelectorBuilder {
    builder.expression_filter("name", Constraints::new(), |expr, value| {
        expr.map_xpath(|x| x.predicate(attr("name").equals(value.literal())))
    })
}

fn label_rules(builder: SelectorBuilder) -> SelectorBuilder {
    builder
        .node_filter("field", Constraints::new(), |node, value| {
            value
                .as_text()
                .is_some_and(|id| node.attribute("for").as_deref() == Some(id))
        })
        .describe(|options| match options.get("field") {
            Some(field) if field.is_truthy() => format!(" for {}", field.literal()),
            _ => String::new(),
        })
}

fn link_rules(builder: SelectorBuilder) -> SelectorBuilder {
    builder
        .node_filter("href", Constraints::new(), |node, value| {
            node.attribute("href")
                .is_some_and(|href| value.matches_text(&href))
        })
        .describe(|options| match options.get("href") {
            Some(href) if href.is_truthy() => format!(" with href {}", href),
            _ => String::new(),
        })
}

fn link_or_button_rules(builder: SelectorBuilder) -> SelectorBuilder {
    builder
        .node_filter("disabled", disabled_constraints(), |node, value| {
            node.tag_name() == "a" || state_is(node.is_disabled(), value)
        })
        .describe(is_disabled_description)
}

fn select_rules(builder: SelectorBuilder) -> SelectorBuilder {
    builder
        .node_filter("multiple", Constraints::boolean(), |node, value| {
            state_is(node.is_multiple(), value)
        })
        .node_filter("options", Constraints::new(), |node, value| {
            let Some(expected) = value.as_list() else {
                return false;
            };
            let actual: Vec<String> = if node.is_visible() {
                node.select_options()
                    .into_iter()
                    .filter(|o| o.visible)
                    .map(|o| o.text)
                    .collect()
            } else {
                node.select_options()
                    .into_iter()
                    .map(|o| o.all_text)
                    .collect()
            };
            sorted(expected.into_iter().map(str::to_string).collect()) == sorted(actual)
        })
        .node_filter("selected", Constraints::new(), |node, value| {
            let Some(expected) = value.as_list() else {
                return false;
            };
            let actual: Vec<String> = node
                .select_options()
                .into_iter()
                .filter(|o| o.selected)
                .map(|o| o.all_text)
                .collect();
            sorted(expected.into_iter().map(str::to_string).collect()) == sorted(actual)
        })
        .expression_filter("with_options", Constraints::new(), |expr, value| {
            let wanted: Vec<String> = value
                .as_list()
                .unwrap_or_default()
                .into_iter()
                .map(str::to_string)
                .collect();
            expr.map_xpath(|x| {
                wanted.iter().fold(x, |acc, text| {
                    acc.predicate(option(Some(text.as_str()), &GeneratorContext::default()))
                })
            })
        })
        .describe(|options| {
            let mut description = String::new();
            match options.get_bool("multiple") {
                Some(true) => description.push_str(" with the multiple attribute"),
                Some(false) => description.push_str(" without the multiple attribute"),
                None => {}
            }
            if let Some(value) = options.get("options").filter(|v| v.is_truthy()) {
                description.push_str(&format!(" with options {}", value));
            }
            if let Some(value) = options.get("selected").filter(|v| v.is_truthy()) {
                description.push_str(&format!(" with {} selected", value));
            }
            if let Some(value) = options.get("with_options").filter(|v| v.is_truthy()) {
                description.push_str(&format!(" with at least options {}", value));
            }
            description
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_xpath::Matching;

    fn render(f: XPathFn, locator: Option<&str>, matching: Matching) -> String {
        f(locator, &GeneratorContext::default()).to_xpath(matching)
    }

    #[test]
    fn test_catalog_names_unique() {
        let mut names: Vec<&str> = CATALOG.iter().map(|e| e.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), CATALOG.len());
        assert_eq!(names.len(), 17);
    }

    #[test]
    fn test_install_into_empty_registry() {
        let mut registry = Registry::empty();
        install(&mut registry).unwrap();
        assert_eq!(registry.get("radio_button").unwrap().label(), "radio button");
        assert_eq!(registry.get("fillable_field").unwrap().label(), "field");
        assert_eq!(registry.get("select").unwrap().label(), "select box");
    }

    #[test]
    fn test_id_xpath() {
        assert_eq!(render(id, Some("main"), Matching::Exact), ".//*[./@id = 'main']");
    }

    #[test]
    fn test_option_exact_and_partial() {
        assert_eq!(
            render(option, Some("Red"), Matching::Exact),
            ".//option[normalize-space(string(.)) = 'Red']"
        );
        assert_eq!(
            render(option, Some("Red"), Matching::Partial),
            ".//option[contains(normalize-space(string(.)), 'Red')]"
        );
    }

    #[test]
    fn test_empty_locator_is_no_locator() {
        assert_eq!(render(option, Some(""), Matching::Exact), ".//option");
        assert_eq!(render(table, None, Matching::Exact), ".//table");
    }

    #[test]
    fn test_frame_distributes_predicate() {
        assert_eq!(
            render(frame, Some("main"), Matching::Exact),
            "(.//frame[(./@id = 'main' or ./@name = 'main')] | .//iframe[(./@id = 'main' or ./@name = 'main')])"
        );
    }

    #[test]
    fn test_fieldset_legend() {
        assert_eq!(
            render(fieldset, Some("Billing"), Matching::Exact),
            ".//fieldset[(./@id = 'Billing' or ./legend[normalize-space(string(.)) = 'Billing'])]"
        );
    }

    #[test]
    fn test_checkbox_without_locator() {
        assert_eq!(
            render(checkbox, None, Matching::Exact),
            ".//input[./@type = 'checkbox']"
        );
    }

    #[test]
    fn test_locate_field_includes_wrapping_label() {
        let xpath = render(checkbox, Some("Remember me"), Matching::Exact);
        assert!(xpath.starts_with("(.//input[./@type = 'checkbox'][("));
        assert!(xpath.contains("./@id = //label[normalize-space(string(.)) = 'Remember me']/@for"));
        assert!(xpath.contains(
            ".//label[normalize-space(string(.)) = 'Remember me']//.//input[./@type = 'checkbox']"
        ));
        assert!(!xpath.contains("aria-label"));
    }

    #[test]
    fn test_aria_label_flag() {
        let context = GeneratorContext {
            enable_aria_label: true,
        };
        let xpath = link(Some("Home"), &context).to_xpath(Matching::Exact);
        assert!(xpath.contains("./@aria-label = 'Home'"));
        let xpath = button(Some("Go"), &context).to_xpath(Matching::Exact);
        assert!(xpath.contains("./@aria-label = 'Go'"));
    }

    #[test]
    fn test_button_has_three_members() {
        let expr = button(Some("Save"), &GeneratorContext::default());
        assert_eq!(expr.members().len(), 3);
        let xpath = expr.to_xpath(Matching::Exact);
        assert!(xpath.starts_with("(.//input[(((./@type = 'submit'"));
        assert!(xpath.contains(".//img[./@alt = 'Save']"));
    }

    #[test]
    fn test_link_or_button_is_union_of_both() {
        let context = GeneratorContext::default();
        let expr = link_or_button(Some("Go"), &context);
        assert_eq!(expr.members().len(), 4);
    }

    #[test]
    fn test_css_and_xpath_pass_through() {
        let context = GeneratorContext::default();
        assert_eq!(css(Some("a.nav"), &context), "a.nav");
        assert_eq!(css(None, &context), "*");
        assert_eq!(
            xpath(Some("//h1"), &context).to_xpath(Matching::Exact),
            "//h1"
        );
    }

    #[test]
    fn test_field_set_description() {
        let set = field_filter_set().unwrap();
        let describe = |options: FilterOptions| -> String {
            set.descriptions().iter().map(|d| d(&options)).collect()
        };
        assert_eq!(describe(FilterOptions::new().with("checked", true)), " that is checked");
        assert_eq!(
            describe(FilterOptions::new().with("checked", false)),
            " that is not checked"
        );
        assert_eq!(
            describe(FilterOptions::new().with("unchecked", true).with("disabled", true)),
            " that is not checked and disabled"
        );
        assert_eq!(describe(FilterOptions::new()), "");
    }
}
