//! Matchers comparing one string value of the candidate with the target.

use crate::element::ElementKind;
use crate::page_index::{ElementId, PageIndex};
use crate::ranking::MatchKind;
use crate::search_pattern::SearchPattern;

use super::{Anchor, ElementMatcher, MatchMode, MatchResult};

/// Where the compared value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// An attribute of the candidate.
    Attribute(&'static str),
    /// The rendered text of the candidate.
    Text,
    /// The text between the candidate and the next form control.
    LabelingTextAfter,
    /// Everything before the candidate.
    WholeTextBefore,
}

/// The shared attribute algorithm, parameterized by value source, match
/// mode and the kind reported on success.
#[derive(Debug, Clone)]
pub struct AttributeMatcher {
    name: &'static str,
    source: ValueSource,
    mode: MatchMode,
    kind: MatchKind,
    pattern: SearchPattern,
}

impl AttributeMatcher {
    pub fn new(
        name: &'static str,
        source: ValueSource,
        mode: MatchMode,
        kind: MatchKind,
        pattern: SearchPattern,
    ) -> Self {
        Self {
            name,
            source,
            mode,
            kind,
            pattern,
        }
    }

    pub fn by_id(pattern: SearchPattern) -> Self {
        Self::new("ById", ValueSource::Attribute("id"), MatchMode::Exact, MatchKind::ById, pattern)
    }

    pub fn by_name(pattern: SearchPattern) -> Self {
        Self::new("ByName", ValueSource::Attribute("name"), MatchMode::Exact, MatchKind::ByName, pattern)
    }

    /// Test ids rank like element ids.
    pub fn by_data_testid(pattern: SearchPattern) -> Self {
        Self::new(
            "ByDataTestid",
            ValueSource::Attribute("data-testid"),
            MatchMode::Exact,
            MatchKind::ById,
            pattern,
        )
    }

    pub fn by_title(pattern: SearchPattern) -> Self {
        Self::new(
            "ByTitleAttribute",
            ValueSource::Attribute("title"),
            MatchMode::Contains,
            MatchKind::ByTitleAttribute,
            pattern,
        )
    }

    pub fn by_aria_label(pattern: SearchPattern) -> Self {
        Self::new(
            "ByAriaLabelAttribute",
            ValueSource::Attribute("aria-label"),
            MatchMode::Contains,
            MatchKind::ByAriaLabelAttribute,
            pattern,
        )
    }

    pub fn by_image_alt(pattern: SearchPattern) -> Self {
        Self::new(
            "ByImageAltAttribute",
            ValueSource::Attribute("alt"),
            MatchMode::Contains,
            MatchKind::ByImgAltAttribute,
            pattern,
        )
    }

    pub fn by_image_title(pattern: SearchPattern) -> Self {
        Self::new(
            "ByImageTitleAttribute",
            ValueSource::Attribute("title"),
            MatchMode::Contains,
            MatchKind::ByImgTitleAttribute,
            pattern,
        )
    }

    /// Matches the end of the `src` attribute, typically the file name.
    pub fn by_image_src(pattern: SearchPattern) -> Self {
        Self::new(
            "ByImageSrcAttribute",
            ValueSource::Attribute("src"),
            MatchMode::EndsWith,
            MatchKind::ByImgSrcAttribute,
            pattern,
        )
    }

    /// Button captions of `input` buttons.
    pub fn by_value(pattern: SearchPattern) -> Self {
        Self::new(
            "ByValueAttribute",
            ValueSource::Attribute("value"),
            MatchMode::Contains,
            MatchKind::ByLabelText,
            pattern,
        )
    }

    /// The `label` attribute of options and option groups.
    pub fn by_label_attribute(pattern: SearchPattern) -> Self {
        Self::new(
            "ByLabelAttribute",
            ValueSource::Attribute("label"),
            MatchMode::Contains,
            MatchKind::ByLabel,
            pattern,
        )
    }

    pub fn by_text(pattern: SearchPattern) -> Self {
        Self::new("ByText", ValueSource::Text, MatchMode::Contains, MatchKind::ByLabelText, pattern)
    }

    /// Option text; reported as a label match.
    pub fn by_option_text(pattern: SearchPattern) -> Self {
        Self::new("ByOptionText", ValueSource::Text, MatchMode::Contains, MatchKind::ByLabel, pattern)
    }

    /// Text following checkboxes and radio buttons.
    pub fn by_label_text_after(pattern: SearchPattern) -> Self {
        Self::new(
            "ByLabelTextAfter",
            ValueSource::LabelingTextAfter,
            MatchMode::Contains,
            MatchKind::ByLabelText,
            pattern,
        )
    }

    /// The whole path, target included, has to end the text before.
    pub fn by_whole_text_before(whole_path_pattern: SearchPattern) -> Self {
        Self::new(
            "ByWholeTextBefore",
            ValueSource::WholeTextBefore,
            MatchMode::StartsWith,
            MatchKind::ByText,
            whole_path_pattern,
        )
    }

    fn value(&self, index: &PageIndex, element: ElementId) -> Option<String> {
        match self.source {
            ValueSource::Attribute(name) => index.element(element).attribute(name).map(str::to_string),
            ValueSource::Text => Some(index.as_text(element)),
            ValueSource::LabelingTextAfter => Some(index.labeling_text_after(element)),
            ValueSource::WholeTextBefore => Some(index.text_before(element)),
        }
    }
}

impl ElementMatcher for AttributeMatcher {
    fn name(&self) -> &'static str {
        self.name
    }

    fn matches(&self, index: &PageIndex, anchor: &Anchor, element: ElementId) -> Vec<MatchResult> {
        let spot = index.position(element);
        if !anchor.admits(spot) {
            return Vec::new();
        }
        let Some(value) = self.value(index, element) else {
            return Vec::new();
        };
        let Some(deviation) = self.mode.evaluate(&self.pattern, &value) else {
            return Vec::new();
        };
        let distance = anchor.distance(&index.text_before(element));
        vec![MatchResult::new(element, self.kind, deviation, distance, spot.start)]
    }
}

/// Matches images nested in the candidate (image links, image buttons).
#[derive(Debug, Clone)]
pub struct InnerImageMatcher {
    pattern: SearchPattern,
}

const INNER_IMAGE_CHECKS: [(&str, MatchMode, MatchKind); 4] = [
    ("alt", MatchMode::Contains, MatchKind::ByInnerImgAltAttribute),
    ("title", MatchMode::Contains, MatchKind::ByInnerImgTitleAttribute),
    ("src", MatchMode::EndsWith, MatchKind::ByInnerImgSrcAttribute),
    ("name", MatchMode::Exact, MatchKind::ByInnerName),
];

impl InnerImageMatcher {
    pub fn new(pattern: SearchPattern) -> Self {
        Self { pattern }
    }
}

impl ElementMatcher for InnerImageMatcher {
    fn name(&self) -> &'static str {
        "ByInnerImage"
    }

    fn matches(&self, index: &PageIndex, anchor: &Anchor, element: ElementId) -> Vec<MatchResult> {
        let spot = index.position(element);
        if !anchor.admits(spot) {
            return Vec::new();
        }

        let mut results = Vec::new();
        for inner in index.descendants(element) {
            if !matches!(index.kind(inner), ElementKind::Image | ElementKind::ImageInput) {
                continue;
            }
            let image = index.element(inner);
            for (attribute, mode, kind) in INNER_IMAGE_CHECKS {
                let Some(value) = image.attribute(attribute) else {
                    continue;
                };
                if let Some(deviation) = mode.evaluate(&self.pattern, value) {
                    let distance = anchor.distance(&index.text_before(element));
                    results.push(MatchResult::new(element, kind, deviation, distance, spot.start));
                }
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::matcher::test_support::{by_id, page};
    use crate::wpath::WPath;

    fn markers() -> PageIndex {
        page(
            Element::new("body").child(
                Element::new("form")
                    .child(Element::new("p").text("Marker1"))
                    .child(Element::new("input").attr("id", "otherId").attr("name", "otherName"))
                    .child(Element::new("p").text("Marker2"))
                    .child(Element::new("input").attr("id", "myId").attr("name", "myName")),
            ),
        )
    }

    fn run(matcher: &AttributeMatcher, index: &PageIndex, wpath: &WPath, ids: &[&str]) -> Vec<MatchResult> {
        let anchor = Anchor::locate(index, wpath);
        ids.iter()
            .flat_map(|id| matcher.matches(index, &anchor, by_id(index, id)))
            .collect()
    }

    #[test]
    fn test_by_id_exact() {
        let index = markers();
        let wpath = WPath::new(["myId"]).unwrap();
        let results = run(&AttributeMatcher::by_id(SearchPattern::compile("myId")), &index, &wpath, &["otherId", "myId"]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].element, by_id(&index, "myId"));
        assert_eq!((results[0].kind, results[0].deviation, results[0].distance), (MatchKind::ById, 0, 0));

        let partial = run(&AttributeMatcher::by_id(SearchPattern::compile("my")), &index, &wpath, &["myId"]);
        assert!(partial.is_empty());
    }

    #[test]
    fn test_by_name_after_path() {
        let index = markers();
        let wpath = WPath::new(["Marker2", "*Name"]).unwrap();
        let matcher = AttributeMatcher::by_name(SearchPattern::compile("*Name"));
        let results = run(&matcher, &index, &wpath, &["otherId", "myId"]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].element, by_id(&index, "myId"));
        assert_eq!(results[0].distance, 0);
    }

    #[test]
    fn test_whole_text_before() {
        let index = markers();
        let wpath = WPath::new(["Marker1", "Marker2"]).unwrap();
        let matcher = AttributeMatcher::by_whole_text_before(wpath.whole_path_pattern());
        let results = run(&matcher, &index, &wpath, &["otherId", "myId"]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, MatchKind::ByText);
        assert_eq!((results[0].deviation, results[0].distance, results[0].start), (0, 8, 15));

        let wpath = WPath::new(["Marker1", "arker"]).unwrap();
        let matcher = AttributeMatcher::by_whole_text_before(wpath.whole_path_pattern());
        let results = run(&matcher, &index, &wpath, &["otherId", "myId"]);
        assert_eq!(results.len(), 1);
        assert_eq!((results[0].deviation, results[0].distance, results[0].start), (1, 8, 15));
    }

    #[test]
    fn test_missing_path_matches_nothing() {
        let index = markers();
        let wpath = WPath::new(["nowhere", "myId"]).unwrap();
        let anchor = Anchor::locate(&index, &wpath);
        let matcher = crate::matcher::Matcher::from(AttributeMatcher::by_id(SearchPattern::compile("myId")));
        assert!(matcher.matches(&index, &anchor, by_id(&index, "myId")).is_empty());
    }

    #[test]
    fn test_by_text() {
        let index = page(Element::new("body").child(Element::new("a").attr("id", "a").text("TestAnchor")));
        let anchor = Anchor::none();
        let a = by_id(&index, "a");

        let results = AttributeMatcher::by_text(SearchPattern::compile("TestAnch*")).matches(&index, &anchor, a);
        assert_eq!((results[0].kind, results[0].deviation, results[0].distance), (MatchKind::ByLabelText, 0, 0));

        let results = AttributeMatcher::by_text(SearchPattern::compile("estAncho")).matches(&index, &anchor, a);
        assert_eq!(results[0].deviation, 2);

        assert!(AttributeMatcher::by_text(SearchPattern::compile("other"))
            .matches(&index, &anchor, a)
            .is_empty());
    }

    #[test]
    fn test_by_label_text_after() {
        let index = page(
            Element::new("body").child(
                Element::new("form")
                    .child(Element::new("input").attr("type", "checkbox").attr("id", "cb"))
                    .text("CheckBox"),
            ),
        );
        let results = AttributeMatcher::by_label_text_after(SearchPattern::compile("heckBo")).matches(
            &index,
            &Anchor::none(),
            by_id(&index, "cb"),
        );
        assert_eq!(results.len(), 1);
        assert_eq!((results[0].kind, results[0].deviation, results[0].distance), (MatchKind::ByLabelText, 2, 0));
    }

    #[test]
    fn test_by_image_src_ends_with() {
        let index = page(
            Element::new("body").child(Element::new("img").attr("id", "img").attr("src", "images/picture.png")),
        );
        let img = by_id(&index, "img");
        let anchor = Anchor::none();
        let results = AttributeMatcher::by_image_src(SearchPattern::compile("picture.png")).matches(&index, &anchor, img);
        assert_eq!(results.len(), 1);
        assert_eq!((results[0].kind, results[0].deviation), (MatchKind::ByImgSrcAttribute, 7));
        assert!(AttributeMatcher::by_image_src(SearchPattern::compile("picture"))
            .matches(&index, &anchor, img)
            .is_empty());
    }

    #[test]
    fn test_inner_image() {
        let index = page(
            Element::new("body").child(
                Element::new("a").attr("id", "link").child(
                    Element::new("img")
                        .attr("alt", "Home")
                        .attr("title", "Go home")
                        .attr("src", "img/home.png"),
                ),
            ),
        );
        let results = InnerImageMatcher::new(SearchPattern::compile("Home")).matches(
            &index,
            &Anchor::none(),
            by_id(&index, "link"),
        );
        let kinds: Vec<MatchKind> = results.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![MatchKind::ByInnerImgAltAttribute]);

        let results = InnerImageMatcher::new(SearchPattern::compile("*home")).matches(
            &index,
            &Anchor::none(),
            by_id(&index, "link"),
        );
        let kinds: Vec<MatchKind> = results.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![MatchKind::ByInnerImgTitleAttribute]);
    }
}
