//! Ordered content assertions.
//!
//! A [`ContentPattern`] is a list of wildcard fragments that have to occur in
//! a text one after another. When the check fails, the mismatch report lists
//! every fragment and marks the ones that failed: `{x}` if `x` does not occur
//! at all, `[x]` if it only occurs before an earlier fragment.
//!
//! # Example
//!
//! ```
//! use wlocate_core::content_pattern::ContentPattern;
//!
//! let pattern = ContentPattern::new(["Order", "Total", "Ship*"]);
//! assert!(pattern.check("Order 42 Total 10 Shipping").is_ok());
//!
//! let err = pattern.check("Total 10 Order 42").unwrap_err();
//! assert_eq!(err.report, "Order, [Total], {Ship*}");
//! ```

use std::fmt;

use thiserror::Error;

use crate::search_pattern::SearchPattern;

/// The content did not contain all fragments in order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected content {report} not found in '{content}'")]
pub struct ContentMismatch {
    /// Every fragment in order, failed ones wrapped in `{}` or `[]`.
    pub report: String,
    /// The checked text.
    pub content: String,
}

/// Fragments expected to occur in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPattern {
    fragments: Vec<String>,
}

impl ContentPattern {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Checks that every fragment occurs after the previous one.
    pub fn check(&self, content: &str) -> Result<(), ContentMismatch> {
        let mut failed = false;
        let mut position = 0;
        let mut report = Vec::with_capacity(self.fragments.len());

        for fragment in &self.fragments {
            let pattern = SearchPattern::compile(fragment);
            let spot = pattern.first_occurrence_in_from(content, position);
            if spot.is_found() {
                report.push(fragment.clone());
                position = spot.end;
                continue;
            }

            failed = true;
            if pattern.first_occurrence_in(content).is_found() {
                report.push(format!("[{fragment}]"));
            } else {
                report.push(format!("{{{fragment}}}"));
            }
        }

        if failed {
            return Err(ContentMismatch {
                report: report.join(", "),
                content: content.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for ContentPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fragments.join(", "))
    }
}
