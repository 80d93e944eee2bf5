//! Weighted ranking of candidate controls.
//!
//! Every matcher hit becomes an [`Entry`] in a [`WeightedControlList`]. The
//! list keeps all entries, duplicates included, and produces a total order on
//! demand:
//!
//! 1. match-kind priority (smaller is better, see [`MatchKind::default_priority`]),
//! 2. deviation, ascending,
//! 3. distance, ascending,
//! 4. start offset, ascending,
//! 5. hierarchy depth, deeper first,
//! 6. document-order index, ascending,
//! 7. describing text.
//!
//! The order does not depend on insertion order.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ConfigError;
use crate::identifier::Control;
use crate::page_index::ElementId;

/// How a candidate was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchKind {
    ByText,
    ByTableCoordinate,
    ByImgSrcAttribute,
    ByImgAltAttribute,
    ByImgTitleAttribute,
    ByInnerImgSrcAttribute,
    ByInnerImgAltAttribute,
    ByInnerImgTitleAttribute,
    ByTitleAttribute,
    ByAriaLabelAttribute,
    ByLabelText,
    ByLabel,
    ByName,
    ByInnerName,
    ById,
}

impl MatchKind {
    pub const ALL: [MatchKind; 15] = [
        MatchKind::ByText,
        MatchKind::ByTableCoordinate,
        MatchKind::ByImgSrcAttribute,
        MatchKind::ByImgAltAttribute,
        MatchKind::ByImgTitleAttribute,
        MatchKind::ByInnerImgSrcAttribute,
        MatchKind::ByInnerImgAltAttribute,
        MatchKind::ByInnerImgTitleAttribute,
        MatchKind::ByTitleAttribute,
        MatchKind::ByAriaLabelAttribute,
        MatchKind::ByLabelText,
        MatchKind::ByLabel,
        MatchKind::ByName,
        MatchKind::ByInnerName,
        MatchKind::ById,
    ];

    /// The built-in priority; smaller values rank first.
    pub fn default_priority(&self) -> u32 {
        match self {
            MatchKind::ByText => 9999,
            MatchKind::ByTableCoordinate => 6000,
            MatchKind::ByImgSrcAttribute | MatchKind::ByImgAltAttribute | MatchKind::ByImgTitleAttribute => 5000,
            MatchKind::ByInnerImgSrcAttribute
            | MatchKind::ByInnerImgAltAttribute
            | MatchKind::ByInnerImgTitleAttribute => 4000,
            MatchKind::ByTitleAttribute | MatchKind::ByAriaLabelAttribute => 3500,
            MatchKind::ByLabelText => 3000,
            MatchKind::ByLabel => 2000,
            MatchKind::ByName => 1000,
            MatchKind::ByInnerName => 900,
            MatchKind::ById => 400,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MatchKind::ByText => "BY_TEXT",
            MatchKind::ByTableCoordinate => "BY_TABLE_COORDINATE",
            MatchKind::ByImgSrcAttribute => "BY_IMG_SRC_ATTRIBUTE",
            MatchKind::ByImgAltAttribute => "BY_IMG_ALT_ATTRIBUTE",
            MatchKind::ByImgTitleAttribute => "BY_IMG_TITLE_ATTRIBUTE",
            MatchKind::ByInnerImgSrcAttribute => "BY_INNER_IMG_SRC_ATTRIBUTE",
            MatchKind::ByInnerImgAltAttribute => "BY_INNER_IMG_ALT_ATTRIBUTE",
            MatchKind::ByInnerImgTitleAttribute => "BY_INNER_IMG_TITLE_ATTRIBUTE",
            MatchKind::ByTitleAttribute => "BY_TITLE_ATTRIBUTE",
            MatchKind::ByAriaLabelAttribute => "BY_ARIA_LABEL_ATTRIBUTE",
            MatchKind::ByLabelText => "BY_LABEL_TEXT",
            MatchKind::ByLabel => "BY_LABEL",
            MatchKind::ByName => "BY_NAME",
            MatchKind::ByInnerName => "BY_INNER_NAME",
            MatchKind::ById => "BY_ID",
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MatchKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MatchKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownMatchKind(s.to_string()))
    }
}

/// Match-kind priorities: the built-in table with optional overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Priorities {
    overrides: BTreeMap<MatchKind, u32>,
}

impl Priorities {
    pub fn new(overrides: BTreeMap<MatchKind, u32>) -> Self {
        Self { overrides }
    }

    pub fn get(&self, kind: MatchKind) -> u32 {
        self.overrides.get(&kind).copied().unwrap_or_else(|| kind.default_priority())
    }
}

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub control: Control,
    pub kind: MatchKind,
    /// Characters the pattern had to tolerate; 0 is exact.
    pub deviation: usize,
    /// Characters between the path anchor and the candidate.
    pub distance: usize,
    pub start: usize,
    pub hierarchy: usize,
    pub index: usize,
    /// The label element a label-based match went through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<ElementId>,
    pub description: String,
}

impl Entry {
    pub fn new(
        control: Control,
        kind: MatchKind,
        deviation: usize,
        distance: usize,
        start: usize,
        hierarchy: usize,
        index: usize,
    ) -> Self {
        Self {
            control,
            kind,
            deviation,
            distance,
            start,
            hierarchy,
            index,
            label: None,
            description: String::new(),
        }
    }

    pub fn with_label(mut self, label: Option<ElementId>) -> Self {
        self.label = label;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Same kind, deviation and distance: indistinguishable for a user.
    pub fn ties_with(&self, other: &Entry) -> bool {
        self.kind == other.kind && self.deviation == other.deviation && self.distance == other.distance
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] found by: {} deviation: {} distance: {} start: {} hierarchy: {} index: {}",
            self.description, self.kind, self.deviation, self.distance, self.start, self.hierarchy, self.index
        )
    }
}

/// The best entry of a list, plus every other control tied with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub best: Entry,
    pub ties: Vec<Entry>,
}

impl Resolution {
    pub fn is_ambiguous(&self) -> bool {
        !self.ties.is_empty()
    }
}

/// Collected candidates of one find.
#[derive(Debug, Clone, Default)]
pub struct WeightedControlList {
    entries: Vec<Entry>,
    priorities: Arc<Priorities>,
}

impl WeightedControlList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_priorities(priorities: Arc<Priorities>) -> Self {
        Self {
            entries: Vec::new(),
            priorities,
        }
    }

    pub fn add(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = Entry>) {
        self.entries.extend(entries);
    }

    /// Appends all entries of another list.
    pub fn merge(&mut self, other: WeightedControlList) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_many_entries(&self) -> bool {
        self.entries.len() > 1
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        self.priorities
            .get(a.kind)
            .cmp(&self.priorities.get(b.kind))
            .then(a.deviation.cmp(&b.deviation))
            .then(a.distance.cmp(&b.distance))
            .then(a.start.cmp(&b.start))
            .then(b.hierarchy.cmp(&a.hierarchy))
            .then(a.index.cmp(&b.index))
            .then_with(|| a.description.cmp(&b.description))
            .then(a.kind.cmp(&b.kind))
            .then(a.control.cmp(&b.control))
            .then(a.label.cmp(&b.label))
    }

    /// All entries, best first.
    pub fn sorted(&self) -> Vec<Entry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| self.compare(a, b));
        sorted
    }

    /// The best entry per element, best first.
    pub fn sorted_distinct(&self) -> Vec<Entry> {
        let mut seen = Vec::new();
        self.sorted()
            .into_iter()
            .filter(|entry| {
                if seen.contains(&entry.control.element) {
                    false
                } else {
                    seen.push(entry.control.element);
                    true
                }
            })
            .collect()
    }

    /// The best entry and every other control tied with it, or `None` for an
    /// empty list. Logs all candidates and warns about ties.
    pub fn resolve(&self, locator: &str) -> Option<Resolution> {
        let mut distinct = self.sorted_distinct().into_iter();
        let best = distinct.next()?;
        let rest: Vec<Entry> = distinct.collect();

        debug!(locator, candidate = %best, "best candidate");
        for entry in &rest {
            debug!(locator, candidate = %entry, "other candidate");
        }

        let ties: Vec<Entry> = rest.into_iter().filter(|e| e.ties_with(&best)).collect();
        if !ties.is_empty() {
            warn!(
                locator,
                count = ties.len() + 1,
                using = %best.description,
                "many elements found, using the first one"
            );
        }
        Some(Resolution { best, ties })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::ControlKind;

    fn entry(element: usize, kind: MatchKind, deviation: usize, distance: usize) -> Entry {
        Entry::new(
            Control::new(ElementId(element), ControlKind::Button),
            kind,
            deviation,
            distance,
            element * 10,
            3,
            element,
        )
        .with_description(format!("button {element}"))
    }

    #[test]
    fn test_priority_before_deviation() {
        let mut list = WeightedControlList::new();
        list.add(entry(1, MatchKind::ByText, 0, 0));
        list.add(entry(2, MatchKind::ById, 5, 5));
        list.add(entry(3, MatchKind::ByLabelText, 0, 0));
        let sorted = list.sorted();
        let order: Vec<usize> = sorted.iter().map(|e| e.index).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn test_deviation_then_distance() {
        let mut list = WeightedControlList::new();
        list.add(entry(1, MatchKind::ByLabelText, 1, 0));
        list.add(entry(2, MatchKind::ByLabelText, 0, 7));
        list.add(entry(3, MatchKind::ByLabelText, 0, 2));
        let order: Vec<usize> = list.sorted().iter().map(|e| e.index).collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[test]
    fn test_deeper_element_first() {
        let mut list = WeightedControlList::new();
        let mut outer = entry(1, MatchKind::ByText, 0, 0);
        outer.start = 0;
        outer.hierarchy = 2;
        let mut inner = entry(2, MatchKind::ByText, 0, 0);
        inner.start = 0;
        inner.hierarchy = 5;
        list.add(outer);
        list.add(inner);
        assert_eq!(list.sorted()[0].index, 2);
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let entries = vec![
            entry(4, MatchKind::ByName, 0, 3),
            entry(1, MatchKind::ByLabelText, 0, 0),
            entry(2, MatchKind::ByLabelText, 0, 0),
            entry(3, MatchKind::ById, 2, 0),
            entry(1, MatchKind::ByText, 0, 0),
        ];
        let mut forward = WeightedControlList::new();
        forward.extend(entries.clone());
        let mut backward = WeightedControlList::new();
        backward.extend(entries.into_iter().rev());
        assert_eq!(forward.sorted(), backward.sorted());
    }

    #[test]
    fn test_sorted_keeps_duplicates_distinct_drops_them() {
        let mut list = WeightedControlList::new();
        list.add(entry(1, MatchKind::ByLabelText, 0, 0));
        list.add(entry(1, MatchKind::ById, 0, 0));
        list.add(entry(2, MatchKind::ByText, 0, 0));
        assert_eq!(list.sorted().len(), 3);
        let distinct = list.sorted_distinct();
        assert_eq!(distinct.len(), 2);
        assert_eq!(distinct[0].kind, MatchKind::ById);
    }

    #[test]
    fn test_resolve_reports_ties() {
        let mut list = WeightedControlList::new();
        list.add(entry(2, MatchKind::ByLabelText, 0, 0));
        list.add(entry(1, MatchKind::ByLabelText, 0, 0));
        list.add(entry(3, MatchKind::ByLabelText, 1, 0));
        let resolution = list.resolve("Submit").unwrap();
        assert_eq!(resolution.best.index, 1);
        assert!(resolution.is_ambiguous());
        assert_eq!(resolution.ties.len(), 1);
        assert_eq!(resolution.ties[0].index, 2);
    }

    #[test]
    fn test_resolve_empty() {
        assert!(WeightedControlList::new().resolve("x").is_none());
    }

    #[test]
    fn test_priority_override() {
        let mut overrides = BTreeMap::new();
        overrides.insert(MatchKind::ByText, 1);
        let mut list = WeightedControlList::with_priorities(Arc::new(Priorities::new(overrides)));
        list.add(entry(1, MatchKind::ById, 0, 0));
        list.add(entry(2, MatchKind::ByText, 0, 0));
        assert_eq!(list.sorted()[0].kind, MatchKind::ByText);
    }

    #[test]
    fn test_merge() {
        let mut first = WeightedControlList::new();
        first.add(entry(1, MatchKind::ById, 0, 0));
        let mut second = WeightedControlList::new();
        second.add(entry(2, MatchKind::ById, 0, 0));
        first.merge(second);
        assert_eq!(first.len(), 2);
        assert!(first.has_many_entries());
    }

    #[test]
    fn test_match_kind_names() {
        assert_eq!("by_label_text".parse::<MatchKind>().unwrap(), MatchKind::ByLabelText);
        assert!("BY_NOTHING".parse::<MatchKind>().is_err());
        assert_eq!(
            serde_json::to_string(&MatchKind::ByAriaLabelAttribute).unwrap(),
            "\"BY_ARIA_LABEL_ATTRIBUTE\""
        );
        for kind in MatchKind::ALL {
            assert_eq!(kind.name().parse::<MatchKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_entry_display() {
        let text = entry(1, MatchKind::ById, 0, 2).to_string();
        assert_eq!(
            text,
            "[button 1] found by: BY_ID deviation: 0 distance: 2 start: 10 hierarchy: 3 index: 1"
        );
    }
}
