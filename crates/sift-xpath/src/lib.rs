//! # sift-xpath
//!
//! A small library for building XPath 1.0 expressions as data and rendering
//! them to query text.
//!
//! This crate provides:
//! - **AST**: [`Expr`], an immutable tree of location paths and predicates
//! - **DSL**: fluent constructors in [`dsl`] (`descendant`, `attr`, `string_n`, ...)
//! - **Renderer**: [`Renderer`], turning an [`Expr`] into XPath text
//!
//! ## Exact vs partial matching
//!
//! Expressions built with [`Expr::is`] compare text. How they compare is
//! decided at render time, so the same expression can be rendered strictly
//! and, if nothing matched, leniently:
//!
//! | Mode | `string_n().is("Save")` renders as |
//! |------|------------------------------------|
//! | [`Matching::Exact`] | `normalize-space(string(.)) = 'Save'` |
//! | [`Matching::Partial`] | `contains(normalize-space(string(.)), 'Save')` |
//!
//! ## Usage
//!
//! ```rust
//! use sift_xpath::dsl::{attr, descendant, string_n};
//! use sift_xpath::Matching;
//!
//! let buttons = descendant(["button"]).predicate(attr("id").equals("save") | string_n().is("Save"));
//!
//! assert_eq!(
//!     buttons.to_xpath(Matching::Exact),
//!     ".//button[(./@id = 'save' or normalize-space(string(.)) = 'Save')]"
//! );
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod ast;
pub mod dsl;
mod renderer;

pub use ast::{Expr, Matching};
pub use renderer::{quote, Renderer};
