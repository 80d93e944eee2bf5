//! Matching strategies.
//!
//! A matcher inspects one candidate element and emits zero or more
//! [`MatchResult`]s. All matchers share the same anchor handling: if the
//! locator has path nodes, their first occurrence in the page text is the
//! anchor, and only elements starting at or after the anchor's end are
//! eligible. An anchor that does not occur at all disqualifies everything.
//!
//! The set of strategies is closed: [`Matcher`] enumerates them and
//! dispatches through [`ElementMatcher`].

mod attribute;
mod label;
mod table;

pub use attribute::{AttributeMatcher, InnerImageMatcher, ValueSource};
pub use label::{HtmlLabelMatcher, LabelTextBeforeMatcher, LabelingTextBeforeAsTextMatcher};
pub use table::{in_table_coordinates, CompiledCoordinate, TableCoordinatesMatcher};

use serde::Serialize;

use crate::find_spot::FindSpot;
use crate::page_index::{ElementId, PageIndex};
use crate::ranking::MatchKind;
use crate::search_pattern::SearchPattern;
use crate::wpath::WPath;

/// One scored hit of a matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// The matched control (for label matches, the labeled control).
    pub element: ElementId,
    pub kind: MatchKind,
    pub deviation: usize,
    pub distance: usize,
    pub start: usize,
    /// The label element a label-based match went through.
    pub label: Option<ElementId>,
}

impl MatchResult {
    pub fn new(element: ElementId, kind: MatchKind, deviation: usize, distance: usize, start: usize) -> Self {
        Self {
            element,
            kind,
            deviation,
            distance,
            start,
            label: None,
        }
    }
}

/// How a value is compared with the target pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// The pattern occurs somewhere; deviation is the uncovered rest.
    Contains,
    /// The whole value matches; deviation is the uncovered rest.
    Exact,
    /// Deviation is the number of characters after the last occurrence.
    StartsWith,
    /// An occurrence ends the value; deviation is what precedes it.
    EndsWith,
}

impl MatchMode {
    /// The deviation of `value`, or `None` if it does not match.
    pub fn evaluate(&self, pattern: &SearchPattern, value: &str) -> Option<usize> {
        if value.is_empty() {
            return None;
        }
        match self {
            MatchMode::Contains => pattern.no_of_surrounding_chars_in(value),
            MatchMode::Exact => {
                if pattern.matches(value) {
                    pattern.no_of_surrounding_chars_in(value)
                } else {
                    None
                }
            }
            MatchMode::StartsWith => pattern.no_of_chars_after_last_occurrence_in(value),
            MatchMode::EndsWith => {
                if pattern.matches_at_end(value) {
                    pattern.no_of_chars_before_last_occurrence_in(value)
                } else {
                    None
                }
            }
        }
    }
}

/// The path part of a locator, resolved against one page.
#[derive(Debug, Clone)]
pub struct Anchor {
    pub path_pattern: Option<SearchPattern>,
    /// `None` without path nodes, [`FindSpot::NOT_FOUND`] if the path does
    /// not occur in the page.
    pub path_spot: Option<FindSpot>,
}

impl Anchor {
    pub fn locate(index: &PageIndex, wpath: &WPath) -> Self {
        let path_pattern = wpath.path_pattern();
        let path_spot = path_pattern.as_ref().map(|p| index.first_occurrence(p));
        Self {
            path_pattern,
            path_spot,
        }
    }

    /// An anchor for locators without path nodes.
    pub fn none() -> Self {
        Self {
            path_pattern: None,
            path_spot: None,
        }
    }

    /// True if the path was given but does not occur in the page.
    pub fn is_missing(&self) -> bool {
        self.path_spot.is_some_and(|spot| spot.is_not_found())
    }

    /// End of the anchor text, 0 without a path.
    pub fn end(&self) -> usize {
        match self.path_spot {
            Some(spot) if spot.is_found() => spot.end,
            _ => 0,
        }
    }

    /// True if an element at `spot` lies at or after the anchor.
    pub fn admits(&self, spot: FindSpot) -> bool {
        match self.path_spot {
            None => true,
            Some(path) => path.is_found() && path.end <= spot.start,
        }
    }

    /// Characters between the last occurrence of the path in `text_before`
    /// and its end; 0 without a path.
    pub fn distance(&self, text_before: &str) -> usize {
        match &self.path_pattern {
            None => 0,
            Some(pattern) => pattern
                .no_of_chars_after_last_shortest_occurrence_in(text_before)
                .unwrap_or_else(|| text_before.chars().count()),
        }
    }
}

/// A strategy testing one candidate element.
pub trait ElementMatcher {
    fn name(&self) -> &'static str;

    fn matches(&self, index: &PageIndex, anchor: &Anchor, element: ElementId) -> Vec<MatchResult>;
}

/// Every matching strategy.
#[derive(Debug, Clone)]
pub enum Matcher {
    Attribute(AttributeMatcher),
    InnerImage(InnerImageMatcher),
    LabelTextBefore(LabelTextBeforeMatcher),
    LabelingTextBeforeAsText(LabelingTextBeforeAsTextMatcher),
    HtmlLabel(HtmlLabelMatcher),
    TableCoordinates(TableCoordinatesMatcher),
}

impl ElementMatcher for Matcher {
    fn name(&self) -> &'static str {
        match self {
            Matcher::Attribute(m) => m.name(),
            Matcher::InnerImage(m) => m.name(),
            Matcher::LabelTextBefore(m) => m.name(),
            Matcher::LabelingTextBeforeAsText(m) => m.name(),
            Matcher::HtmlLabel(m) => m.name(),
            Matcher::TableCoordinates(m) => m.name(),
        }
    }

    fn matches(&self, index: &PageIndex, anchor: &Anchor, element: ElementId) -> Vec<MatchResult> {
        if anchor.is_missing() {
            return Vec::new();
        }
        match self {
            Matcher::Attribute(m) => m.matches(index, anchor, element),
            Matcher::InnerImage(m) => m.matches(index, anchor, element),
            Matcher::LabelTextBefore(m) => m.matches(index, anchor, element),
            Matcher::LabelingTextBeforeAsText(m) => m.matches(index, anchor, element),
            Matcher::HtmlLabel(m) => m.matches(index, anchor, element),
            Matcher::TableCoordinates(m) => m.matches(index, anchor, element),
        }
    }
}

impl From<AttributeMatcher> for Matcher {
    fn from(m: AttributeMatcher) -> Self {
        Matcher::Attribute(m)
    }
}

impl From<InnerImageMatcher> for Matcher {
    fn from(m: InnerImageMatcher) -> Self {
        Matcher::InnerImage(m)
    }
}

impl From<LabelTextBeforeMatcher> for Matcher {
    fn from(m: LabelTextBeforeMatcher) -> Self {
        Matcher::LabelTextBefore(m)
    }
}

impl From<LabelingTextBeforeAsTextMatcher> for Matcher {
    fn from(m: LabelingTextBeforeAsTextMatcher) -> Self {
        Matcher::LabelingTextBeforeAsText(m)
    }
}

impl From<HtmlLabelMatcher> for Matcher {
    fn from(m: HtmlLabelMatcher) -> Self {
        Matcher::HtmlLabel(m)
    }
}

impl From<TableCoordinatesMatcher> for Matcher {
    fn from(m: TableCoordinatesMatcher) -> Self {
        Matcher::TableCoordinates(m)
    }
}
