//! # wlocate-core
//!
//! Resolves human-readable locators against a snapshot of a web page.
//!
//! A locator is a short list of text fragments (`"Login" > "Password"`): the
//! last one names the control, the others narrow down where on the page it
//! sits. Table coordinates such as `[Total; Qty]` select a cell. This crate
//! indexes a document once and then answers "which element does this
//! locator mean?" with a ranked list of candidates.
//!
//! ## Modules
//!
//! - [`search_pattern`] - Wildcard patterns (`*`, `?`, `\` escapes) with occurrence queries
//! - [`content_pattern`] - Ordered-fragment assertions over page text
//! - [`wpath`] - Locator classification into path, target and table coordinates
//! - [`element`] - The JSON document model
//! - [`page_index`] - Normalized page text, element spans, visibility, labels and tables
//! - [`matcher`] - Matching strategies scoring one element each
//! - [`identifier`] - Control kinds and the matchers that identify them
//! - [`finder`] - Finders running identifiers on a worker pool, and the [`finder::ControlFinder`] facade
//! - [`ranking`] - Match kinds, priorities and the ranked candidate list
//! - [`config`] - Persistent finder configuration
//!
//! ## Example
//!
//! ```
//! use wlocate_core::config::FinderConfig;
//! use wlocate_core::element::{Document, Element};
//! use wlocate_core::finder::ControlFinder;
//! use wlocate_core::wpath::WPath;
//!
//! let document = Document::new(
//!     Element::new("html").child(
//!         Element::new("body")
//!             .child(Element::new("input").attr("type", "submit").attr("id", "go").attr("value", "Search")),
//!     ),
//! );
//! let finder = ControlFinder::new(&document, FinderConfig::default()).unwrap();
//! let found = finder.all_clickables(&WPath::new(["Search"]).unwrap()).unwrap();
//! assert!(!found.is_empty());
//! ```

pub mod config;
pub mod content_pattern;
pub mod element;
pub mod find_spot;
pub mod finder;
pub mod identifier;
pub mod matcher;
pub mod page_index;
pub mod ranking;
pub mod search_pattern;
pub mod wpath;
