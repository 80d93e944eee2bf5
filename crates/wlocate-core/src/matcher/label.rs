//! Matchers driven by labeling text and `label` elements.

use crate::element::ElementKind;
use crate::page_index::{ElementId, PageIndex};
use crate::ranking::MatchKind;
use crate::search_pattern::SearchPattern;
use crate::wpath::WPath;

use super::{Anchor, ElementMatcher, MatchMode, MatchResult};

/// The text between the previous form control and the candidate.
///
/// Deviation and distance are both measured inside that text, so a label
/// right before the control has distance 0.
#[derive(Debug, Clone)]
pub struct LabelTextBeforeMatcher {
    pattern: SearchPattern,
}

impl LabelTextBeforeMatcher {
    pub fn new(pattern: SearchPattern) -> Self {
        Self { pattern }
    }
}

impl ElementMatcher for LabelTextBeforeMatcher {
    fn name(&self) -> &'static str {
        "ByLabelTextBefore"
    }

    fn matches(&self, index: &PageIndex, anchor: &Anchor, element: ElementId) -> Vec<MatchResult> {
        let spot = index.position(element);
        if !anchor.admits(spot) {
            return Vec::new();
        }
        let text = index.labeling_text_before(element, anchor.end());
        let Some(deviation) = MatchMode::Contains.evaluate(&self.pattern, &text) else {
            return Vec::new();
        };
        let distance = self
            .pattern
            .no_of_chars_after_last_shortest_occurrence_in(&text)
            .unwrap_or(0);
        vec![MatchResult::new(element, MatchKind::ByLabelText, deviation, distance, spot.start)]
    }
}

/// Labeling text treated as plain text.
///
/// With an empty target and a path, the last path node itself has to start
/// the labeling text.
#[derive(Debug, Clone)]
pub struct LabelingTextBeforeAsTextMatcher {
    pattern: SearchPattern,
    mode: MatchMode,
}

impl LabelingTextBeforeAsTextMatcher {
    pub fn new(wpath: &WPath, pattern: SearchPattern) -> Self {
        match wpath.path_nodes().last() {
            Some(last_path_node) if pattern.min_length() == 0 => Self {
                pattern: SearchPattern::create_from_list(&[last_path_node.as_str(), wpath.last_node().unwrap_or("")]),
                mode: MatchMode::StartsWith,
            },
            _ => Self {
                pattern,
                mode: MatchMode::Contains,
            },
        }
    }

    /// The text before without the label itself.
    fn text_for_distance(&self, text_before: String) -> String {
        if self.mode == MatchMode::StartsWith {
            return text_before;
        }
        match self.pattern.no_of_chars_before_last_shortest_occurrence_in(&text_before) {
            Some(cut) => text_before.chars().take(cut).collect(),
            None => text_before,
        }
    }
}

impl ElementMatcher for LabelingTextBeforeAsTextMatcher {
    fn name(&self) -> &'static str {
        "ByLabelingTextBeforeAsText"
    }

    fn matches(&self, index: &PageIndex, anchor: &Anchor, element: ElementId) -> Vec<MatchResult> {
        let spot = index.position(element);
        if !anchor.admits(spot) {
            return Vec::new();
        }
        let from = if self.mode == MatchMode::StartsWith { 0 } else { anchor.end() };
        let text = index.labeling_text_before(element, from);
        let Some(deviation) = self.mode.evaluate(&self.pattern, &text) else {
            return Vec::new();
        };
        let distance = anchor.distance(&self.text_for_distance(index.text_before(element)));
        vec![MatchResult::new(element, MatchKind::ByText, deviation, distance, spot.start)]
    }
}

/// `label` elements whose text matches, reported as their labeled control.
#[derive(Debug, Clone)]
pub struct HtmlLabelMatcher {
    pattern: SearchPattern,
    targets: &'static [ElementKind],
}

impl HtmlLabelMatcher {
    /// `targets` are the element kinds the labeled control may have.
    pub fn new(pattern: SearchPattern, targets: &'static [ElementKind]) -> Self {
        Self { pattern, targets }
    }

    fn accepts(&self, index: &PageIndex, target: ElementId) -> bool {
        self.targets.contains(&index.kind(target)) && index.is_visible(target)
    }
}

impl ElementMatcher for HtmlLabelMatcher {
    fn name(&self) -> &'static str {
        "ByHtmlLabel"
    }

    fn matches(&self, index: &PageIndex, anchor: &Anchor, label: ElementId) -> Vec<MatchResult> {
        if index.kind(label) != ElementKind::Label {
            return Vec::new();
        }
        let spot = index.position(label);
        if !anchor.admits(spot) {
            return Vec::new();
        }
        let text = index.as_text_without_form_controls(label);
        let Some(deviation) = self.pattern.no_of_surrounding_chars_in(&text) else {
            return Vec::new();
        };
        let distance = anchor.distance(&index.text_before(label));

        let mut targets = Vec::new();
        if let Some(target_id) = index.element(label).attribute("for").filter(|f| !f.is_empty()) {
            if let Some(target) = index.element_by_id(target_id) {
                targets.push(target);
            }
        }
        for nested in index.descendants(label) {
            if !targets.contains(&nested) {
                targets.push(nested);
            }
        }

        targets
            .into_iter()
            .filter(|target| self.accepts(index, *target))
            .map(|target| MatchResult {
                label: Some(label),
                ..MatchResult::new(target, MatchKind::ByLabel, deviation, distance, spot.start)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::matcher::test_support::{by_id, page};

    fn marker_form() -> PageIndex {
        page(
            Element::new("body").child(
                Element::new("form")
                    .child(Element::new("input").attr("id", "otherId"))
                    .child(Element::new("p").text("Marker"))
                    .child(Element::new("input").attr("id", "myId")),
            ),
        )
    }

    #[test]
    fn test_label_text_before() {
        let index = marker_form();
        let matcher = LabelTextBeforeMatcher::new(SearchPattern::compile("Marker"));
        let anchor = Anchor::none();
        assert!(matcher.matches(&index, &anchor, by_id(&index, "otherId")).is_empty());

        let results = matcher.matches(&index, &anchor, by_id(&index, "myId"));
        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!((r.kind, r.deviation, r.distance, r.start), (MatchKind::ByLabelText, 0, 0, 6));
    }

    #[test]
    fn test_label_text_before_partial() {
        let index = marker_form();
        let results = LabelTextBeforeMatcher::new(SearchPattern::compile("arke")).matches(
            &index,
            &Anchor::none(),
            by_id(&index, "myId"),
        );
        assert_eq!((results[0].deviation, results[0].distance), (2, 1));

        let results = LabelTextBeforeMatcher::new(SearchPattern::compile("Mark*")).matches(
            &index,
            &Anchor::none(),
            by_id(&index, "myId"),
        );
        assert_eq!((results[0].deviation, results[0].distance), (0, 0));
    }

    #[test]
    fn test_labeling_text_before_as_text() {
        let index = page(
            Element::new("body")
                .child(Element::new("h1").text("Section"))
                .child(Element::new("p").text("Comment"))
                .child(Element::new("textarea").attr("id", "area")),
        );
        let area = by_id(&index, "area");

        let wpath = WPath::new(["Comment"]).unwrap();
        let matcher = LabelingTextBeforeAsTextMatcher::new(&wpath, wpath.last_node_pattern().unwrap());
        let results = matcher.matches(&index, &Anchor::locate(&index, &wpath), area);
        assert_eq!(results.len(), 1);
        assert_eq!((results[0].kind, results[0].deviation, results[0].distance), (MatchKind::ByText, 8, 0));

        let wpath = WPath::new(["Comment", ""]).unwrap();
        let matcher = LabelingTextBeforeAsTextMatcher::new(&wpath, wpath.last_node_pattern().unwrap());
        let results = matcher.matches(&index, &Anchor::locate(&index, &wpath), area);
        assert_eq!(results.len(), 1);
        assert_eq!((results[0].deviation, results[0].distance), (0, 0));
    }

    #[test]
    fn test_html_label_for_and_nested() {
        let index = page(
            Element::new("body")
                .child(Element::new("label").attr("id", "l1").attr("for", "target").text("Name"))
                .child(Element::new("input").attr("id", "target"))
                .child(
                    Element::new("label")
                        .attr("id", "l2")
                        .text("Name too")
                        .child(Element::new("input").attr("type", "checkbox").attr("id", "nested")),
                ),
        );
        let anchor = Anchor::none();
        let text_inputs = HtmlLabelMatcher::new(SearchPattern::compile("Name"), &[ElementKind::TextInput]);

        let results = text_inputs.matches(&index, &anchor, by_id(&index, "l1"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].element, by_id(&index, "target"));
        assert_eq!(results[0].label, Some(by_id(&index, "l1")));
        assert_eq!(results[0].kind, MatchKind::ByLabel);

        assert!(text_inputs.matches(&index, &anchor, by_id(&index, "l2")).is_empty());
        assert!(text_inputs.matches(&index, &anchor, by_id(&index, "target")).is_empty());

        let checkboxes = HtmlLabelMatcher::new(SearchPattern::compile("Name"), &[ElementKind::CheckBox]);
        let results = checkboxes.matches(&index, &anchor, by_id(&index, "l2"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].element, by_id(&index, "nested"));
        assert_eq!(results[0].deviation, 4);
    }

    #[test]
    fn test_html_label_skips_hidden_target() {
        let index = page(
            Element::new("body")
                .child(Element::new("label").attr("id", "l").attr("for", "t").text("Name"))
                .child(Element::new("input").attr("id", "t").hidden()),
        );
        let matcher = HtmlLabelMatcher::new(SearchPattern::compile("Name"), &[ElementKind::TextInput]);
        assert!(matcher.matches(&index, &Anchor::none(), by_id(&index, "l")).is_empty());
    }
}
