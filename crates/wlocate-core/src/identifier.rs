//! Control identifiers.
//!
//! An [`Identifier`] knows one family of controls: which elements it looks
//! at and which matchers it runs against them. The set is a static registry;
//! finders pick the identifiers they need from the groups on [`Identifier`]
//! ([`Identifier::SETTABLES`], [`Identifier::CLICKABLES`], ...).
//!
//! Identifiers are prepared once per find ([`Identifier::prepare`]) so that
//! patterns and the path anchor are resolved a single time, then invoked per
//! candidate element.

use serde::Serialize;

use crate::element::ElementKind;
use crate::find_spot::FindSpot;
use crate::matcher::{
    in_table_coordinates, Anchor, AttributeMatcher, CompiledCoordinate, ElementMatcher, HtmlLabelMatcher,
    InnerImageMatcher, LabelTextBeforeMatcher, LabelingTextBeforeAsTextMatcher, MatchResult, Matcher,
    TableCoordinatesMatcher,
};
use crate::page_index::{ElementId, PageIndex};
use crate::ranking::Entry;
use crate::search_pattern::SearchPattern;
use crate::wpath::WPath;

/// The kind of control a ranked entry stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    TextField,
    PasswordField,
    TextArea,
    FileField,
    Button,
    InputButton,
    ImageButton,
    Anchor,
    Image,
    CheckBox,
    RadioButton,
    Select,
    Option,
    /// Any element, found through its listeners or its text.
    Unspecific,
    /// The page pseudo-target.
    Page,
}

impl ControlKind {
    /// The control an element of this kind is, if any.
    pub fn for_element(kind: ElementKind) -> Option<ControlKind> {
        Some(match kind {
            ElementKind::TextInput => ControlKind::TextField,
            ElementKind::PasswordInput => ControlKind::PasswordField,
            ElementKind::TextArea => ControlKind::TextArea,
            ElementKind::FileInput => ControlKind::FileField,
            ElementKind::Button => ControlKind::Button,
            ElementKind::SubmitInput | ElementKind::ResetInput | ElementKind::ButtonInput => ControlKind::InputButton,
            ElementKind::ImageInput => ControlKind::ImageButton,
            ElementKind::Anchor => ControlKind::Anchor,
            ElementKind::Image => ControlKind::Image,
            ElementKind::CheckBox => ControlKind::CheckBox,
            ElementKind::RadioButton => ControlKind::RadioButton,
            ElementKind::Select => ControlKind::Select,
            ElementKind::Option => ControlKind::Option,
            _ => return None,
        })
    }
}

/// A found control: the element handle plus what it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Control {
    pub element: ElementId,
    pub kind: ControlKind,
}

impl Control {
    pub fn new(element: ElementId, kind: ControlKind) -> Self {
        Self { element, kind }
    }
}

/// Every control identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Identifier {
    TextInput,
    PasswordInput,
    TextArea,
    FileInput,
    Button,
    InputButton,
    ImageInput,
    Anchor,
    Image,
    CheckBox,
    RadioButton,
    Select,
    Option,
    /// Text, title, aria-label and id of any element; used by the listener
    /// fallbacks.
    Unspecific,
}

impl Identifier {
    pub const ALL: [Identifier; 14] = [
        Identifier::TextInput,
        Identifier::PasswordInput,
        Identifier::TextArea,
        Identifier::FileInput,
        Identifier::Button,
        Identifier::InputButton,
        Identifier::ImageInput,
        Identifier::Anchor,
        Identifier::Image,
        Identifier::CheckBox,
        Identifier::RadioButton,
        Identifier::Select,
        Identifier::Option,
        Identifier::Unspecific,
    ];

    pub const SETTABLES: &'static [Identifier] = &[
        Identifier::TextInput,
        Identifier::PasswordInput,
        Identifier::TextArea,
        Identifier::FileInput,
    ];

    pub const CLICKABLES: &'static [Identifier] = &[
        Identifier::Button,
        Identifier::InputButton,
        Identifier::ImageInput,
        Identifier::Anchor,
        Identifier::Image,
        Identifier::CheckBox,
        Identifier::RadioButton,
        Identifier::Option,
    ];

    pub const SELECTABLES: &'static [Identifier] =
        &[Identifier::CheckBox, Identifier::RadioButton, Identifier::Option];

    pub const DESELECTABLES: &'static [Identifier] = &[Identifier::CheckBox, Identifier::Option];

    pub const OTHERS: &'static [Identifier] = &[Identifier::Select];

    pub fn name(&self) -> &'static str {
        match self {
            Identifier::TextInput => "TextInputIdentifier",
            Identifier::PasswordInput => "PasswordInputIdentifier",
            Identifier::TextArea => "TextAreaIdentifier",
            Identifier::FileInput => "FileInputIdentifier",
            Identifier::Button => "ButtonIdentifier",
            Identifier::InputButton => "InputButtonIdentifier",
            Identifier::ImageInput => "ImageInputIdentifier",
            Identifier::Anchor => "AnchorIdentifier",
            Identifier::Image => "ImageIdentifier",
            Identifier::CheckBox => "CheckBoxIdentifier",
            Identifier::RadioButton => "RadioButtonIdentifier",
            Identifier::Select => "SelectIdentifier",
            Identifier::Option => "OptionIdentifier",
            Identifier::Unspecific => "UnspecificIdentifier",
        }
    }

    pub fn control_kind(&self) -> ControlKind {
        match self {
            Identifier::TextInput => ControlKind::TextField,
            Identifier::PasswordInput => ControlKind::PasswordField,
            Identifier::TextArea => ControlKind::TextArea,
            Identifier::FileInput => ControlKind::FileField,
            Identifier::Button => ControlKind::Button,
            Identifier::InputButton => ControlKind::InputButton,
            Identifier::ImageInput => ControlKind::ImageButton,
            Identifier::Anchor => ControlKind::Anchor,
            Identifier::Image => ControlKind::Image,
            Identifier::CheckBox => ControlKind::CheckBox,
            Identifier::RadioButton => ControlKind::RadioButton,
            Identifier::Select => ControlKind::Select,
            Identifier::Option => ControlKind::Option,
            Identifier::Unspecific => ControlKind::Unspecific,
        }
    }

    /// The element kinds this identifier reports.
    pub fn targets(&self) -> Option<&'static [ElementKind]> {
        Some(match self {
            Identifier::TextInput => &[ElementKind::TextInput],
            Identifier::PasswordInput => &[ElementKind::PasswordInput],
            Identifier::TextArea => &[ElementKind::TextArea],
            Identifier::FileInput => &[ElementKind::FileInput],
            Identifier::Button => &[ElementKind::Button],
            Identifier::InputButton => &[ElementKind::SubmitInput, ElementKind::ResetInput, ElementKind::ButtonInput],
            Identifier::ImageInput => &[ElementKind::ImageInput],
            Identifier::Anchor => &[ElementKind::Anchor],
            Identifier::Image => &[ElementKind::Image],
            Identifier::CheckBox => &[ElementKind::CheckBox],
            Identifier::RadioButton => &[ElementKind::RadioButton],
            Identifier::Select => &[ElementKind::Select],
            Identifier::Option => &[ElementKind::Option],
            Identifier::Unspecific => return None,
        })
    }

    /// Whether `label` elements are candidates too.
    fn accepts_labels(&self) -> bool {
        matches!(
            self,
            Identifier::TextInput
                | Identifier::PasswordInput
                | Identifier::TextArea
                | Identifier::FileInput
                | Identifier::CheckBox
                | Identifier::RadioButton
                | Identifier::Select
        )
    }

    /// True if the identifier wants to inspect `element`.
    pub fn supports(&self, index: &PageIndex, element: ElementId) -> bool {
        let kind = index.kind(element);
        match self {
            Identifier::Unspecific => true,
            Identifier::Option => {
                kind == ElementKind::Option
                    || (kind == ElementKind::Label
                        && index
                            .labeled_element(element)
                            .is_some_and(|labeled| index.kind(labeled) == ElementKind::Select))
            }
            _ => {
                self.targets().is_some_and(|targets| targets.contains(&kind))
                    || (kind == ElementKind::Label && self.accepts_labels())
            }
        }
    }

    /// True if `element` is a control some identifier other than
    /// [`Identifier::Unspecific`] reports.
    pub fn is_claimed(index: &PageIndex, element: ElementId) -> bool {
        ControlKind::for_element(index.kind(element)).is_some()
    }

    /// Resolves the locator against the page for this identifier.
    pub fn prepare(&self, index: &PageIndex, wpath: &WPath) -> PreparedIdentifier {
        let anchor = Anchor::locate(index, wpath);
        let coordinates: Vec<CompiledCoordinate> =
            wpath.table_coordinates_reversed().iter().map(CompiledCoordinate::from).collect();

        let mut control_matchers = Vec::new();
        let mut label_matchers = Vec::new();
        let mut option = None;

        if *self == Identifier::Option {
            option = OptionPlan::new(index, wpath, coordinates.clone());
        } else if let Some(target) = wpath.last_node_pattern() {
            control_matchers = self.matchers(wpath, &target);
            if let Some(targets) = self.targets().filter(|_| self.accepts_labels()) {
                label_matchers.push(HtmlLabelMatcher::new(target, targets).into());
            }
        } else if !coordinates.is_empty() {
            control_matchers.push(
                TableCoordinatesMatcher::new(&wpath.table_coordinates_reversed(), self.targets()).into(),
            );
        }

        // coordinates not used by a matcher filter the results afterwards
        let post_filter = if wpath.last_node().is_some() { coordinates } else { Vec::new() };

        PreparedIdentifier {
            identifier: *self,
            anchor,
            control_matchers,
            label_matchers,
            post_filter,
            option,
        }
    }

    fn matchers(&self, wpath: &WPath, target: &SearchPattern) -> Vec<Matcher> {
        let t = || target.clone();
        match self {
            Identifier::TextInput | Identifier::PasswordInput | Identifier::FileInput => vec![
                AttributeMatcher::by_whole_text_before(wpath.whole_path_pattern()).into(),
                LabelTextBeforeMatcher::new(t()).into(),
                AttributeMatcher::by_name(t()).into(),
                AttributeMatcher::by_id(t()).into(),
            ],
            Identifier::TextArea => vec![
                LabelingTextBeforeAsTextMatcher::new(wpath, t()).into(),
                LabelTextBeforeMatcher::new(t()).into(),
                AttributeMatcher::by_name(t()).into(),
                AttributeMatcher::by_id(t()).into(),
            ],
            Identifier::Button => vec![
                InnerImageMatcher::new(t()).into(),
                AttributeMatcher::by_text(t()).into(),
                AttributeMatcher::by_name(t()).into(),
                AttributeMatcher::by_id(t()).into(),
            ],
            Identifier::InputButton => vec![
                AttributeMatcher::by_value(t()).into(),
                AttributeMatcher::by_name(t()).into(),
                AttributeMatcher::by_id(t()).into(),
            ],
            Identifier::ImageInput => vec![
                AttributeMatcher::by_image_alt(t()).into(),
                AttributeMatcher::by_image_title(t()).into(),
                AttributeMatcher::by_image_src(t()).into(),
                AttributeMatcher::by_name(t()).into(),
                AttributeMatcher::by_id(t()).into(),
            ],
            Identifier::Anchor => vec![
                InnerImageMatcher::new(t()).into(),
                AttributeMatcher::by_text(t()).into(),
                AttributeMatcher::by_title(t()).into(),
                AttributeMatcher::by_aria_label(t()).into(),
                AttributeMatcher::by_name(t()).into(),
                AttributeMatcher::by_data_testid(t()).into(),
                AttributeMatcher::by_id(t()).into(),
            ],
            Identifier::Image => vec![
                LabelingTextBeforeAsTextMatcher::new(wpath, t()).into(),
                AttributeMatcher::by_image_alt(t()).into(),
                AttributeMatcher::by_image_src(t()).into(),
                AttributeMatcher::by_title(t()).into(),
                AttributeMatcher::by_aria_label(t()).into(),
                AttributeMatcher::by_name(t()).into(),
                AttributeMatcher::by_data_testid(t()).into(),
                AttributeMatcher::by_id(t()).into(),
            ],
            Identifier::CheckBox => vec![
                AttributeMatcher::by_label_text_after(t()).into(),
                AttributeMatcher::by_name(t()).into(),
                AttributeMatcher::by_title(t()).into(),
                AttributeMatcher::by_id(t()).into(),
            ],
            Identifier::RadioButton => vec![
                AttributeMatcher::by_label_text_after(t()).into(),
                AttributeMatcher::by_id(t()).into(),
            ],
            Identifier::Select => vec![
                AttributeMatcher::by_whole_text_before(wpath.whole_path_pattern()).into(),
                LabelTextBeforeMatcher::new(t()).into(),
                AttributeMatcher::by_name(t()).into(),
                AttributeMatcher::by_id(t()).into(),
            ],
            Identifier::Unspecific => vec![
                AttributeMatcher::by_text(t()).into(),
                AttributeMatcher::by_title(t()).into(),
                AttributeMatcher::by_aria_label(t()).into(),
                AttributeMatcher::by_id(t()).into(),
            ],
            Identifier::Option => Vec::new(),
        }
    }
}

/// An identifier with its matchers resolved for one locator and page.
#[derive(Debug, Clone)]
pub struct PreparedIdentifier {
    identifier: Identifier,
    anchor: Anchor,
    control_matchers: Vec<Matcher>,
    label_matchers: Vec<Matcher>,
    post_filter: Vec<CompiledCoordinate>,
    option: Option<OptionPlan>,
}

impl PreparedIdentifier {
    pub fn identifier(&self) -> Identifier {
        self.identifier
    }

    pub fn anchor(&self) -> &Anchor {
        &self.anchor
    }

    /// Matcher names in the order they run, for diagnostics.
    pub fn matcher_names(&self) -> Vec<&'static str> {
        self.control_matchers
            .iter()
            .chain(&self.label_matchers)
            .map(|m| m.name())
            .collect()
    }

    /// Runs all matchers against `element` and turns the hits into entries.
    pub fn identify(&self, index: &PageIndex, element: ElementId) -> Vec<Entry> {
        if let Some(option) = &self.option {
            return option.identify(index, element);
        }

        let matchers = if index.kind(element) == ElementKind::Label && self.identifier != Identifier::Unspecific {
            &self.label_matchers
        } else {
            &self.control_matchers
        };

        matchers
            .iter()
            .flat_map(|matcher| matcher.matches(index, &self.anchor, element))
            .filter(|result| {
                self.post_filter.is_empty()
                    || in_table_coordinates(index, result.element, &self.post_filter, self.anchor.path_spot)
            })
            .map(|result| to_entry(index, self.identifier.control_kind(), &result))
            .collect()
    }
}

/// Builds the ranked entry for a matcher hit.
pub fn to_entry(index: &PageIndex, kind: ControlKind, result: &MatchResult) -> Entry {
    Entry::new(
        Control::new(result.element, kind),
        result.kind,
        result.deviation,
        result.distance,
        index.position(result.element).start,
        index.hierarchy(result.element),
        index.index(result.element),
    )
    .with_label(result.label)
    .with_description(index.describe(result.element))
}

/// Options are located in two steps: the last path node names the select,
/// the last node names the option.
#[derive(Debug, Clone)]
struct OptionPlan {
    has_path: bool,
    select_pattern: SearchPattern,
    select_spot: Option<FindSpot>,
    by_id: AttributeMatcher,
    by_text: AttributeMatcher,
    by_label: AttributeMatcher,
    target_has_content: bool,
    coordinates: Vec<CompiledCoordinate>,
}

impl OptionPlan {
    fn new(index: &PageIndex, wpath: &WPath, coordinates: Vec<CompiledCoordinate>) -> Option<Self> {
        let target = wpath.last_node_pattern()?;
        let path_nodes = wpath.path_nodes();

        let (select_pattern, select_spot) = match path_nodes.split_last() {
            None => (SearchPattern::compile(""), None),
            Some((last, leading)) => {
                let spot = (!leading.is_empty())
                    .then(|| index.first_occurrence(&SearchPattern::create_from_list(leading)));
                (SearchPattern::compile(last), spot)
            }
        };
        if select_spot.is_some_and(|spot| spot.is_not_found()) {
            return None;
        }

        Some(Self {
            has_path: !path_nodes.is_empty(),
            select_pattern,
            select_spot,
            target_has_content: target.min_length() > 0,
            by_id: AttributeMatcher::by_id(target.clone()),
            by_text: AttributeMatcher::by_option_text(target.clone()),
            by_label: AttributeMatcher::by_label_attribute(target),
            coordinates,
        })
    }

    fn admits(&self, spot: FindSpot) -> bool {
        self.select_spot.map_or(true, |path| path.end <= spot.start)
    }

    fn identify(&self, index: &PageIndex, element: ElementId) -> Vec<Entry> {
        match index.kind(element) {
            ElementKind::Option => self.identify_option(index, element),
            ElementKind::Label => self.identify_label(index, element),
            _ => Vec::new(),
        }
    }

    fn distance_from_page_start(index: &PageIndex, select: ElementId) -> usize {
        index.text_before(select).chars().count()
    }

    fn identify_option(&self, index: &PageIndex, option: ElementId) -> Vec<Entry> {
        let Some(select) = index.enclosing(option, ElementKind::Select) else {
            return Vec::new();
        };
        if !self.admits(index.position(select)) {
            return Vec::new();
        }

        let mut entries = Vec::new();
        let from = self.select_spot.map_or(0, |spot| spot.end);
        let labeling_text = index.labeling_text_before(select, from);
        if !labeling_text.is_empty() && self.select_pattern.no_of_surrounding_chars_in(&labeling_text).is_some() {
            let distance = if self.has_path {
                self.select_pattern
                    .no_of_chars_after_last_occurrence_in(&labeling_text)
                    .unwrap_or(0)
            } else {
                Self::distance_from_page_start(index, select)
            };
            entries.extend(self.match_option(index, select, option, distance));
        }

        let element = index.element(select);
        for value in [element.attribute("name"), element.id()].into_iter().flatten() {
            if !value.is_empty() && self.select_pattern.matches(value) {
                let distance = if self.has_path { 0 } else { Self::distance_from_page_start(index, select) };
                entries.extend(self.match_option(index, select, option, distance));
            }
        }
        entries
    }

    fn identify_label(&self, index: &PageIndex, label: ElementId) -> Vec<Entry> {
        if !self.admits(index.position(label)) {
            return Vec::new();
        }
        let text = index.as_text_without_form_controls(label);
        if self.select_pattern.no_of_chars_after_last_occurrence_in(&text).is_none() {
            return Vec::new();
        }
        let Some(select) = index
            .labeled_element(label)
            .filter(|s| index.kind(*s) == ElementKind::Select && index.is_visible(*s))
        else {
            return Vec::new();
        };

        let distance = if self.has_path {
            self.select_pattern
                .no_of_chars_after_last_occurrence_in(&index.text_before(select))
                .unwrap_or(0)
        } else {
            Self::distance_from_page_start(index, select)
        };
        index
            .descendants(select)
            .into_iter()
            .filter(|d| index.kind(*d) == ElementKind::Option)
            .flat_map(|option| {
                self.match_option(index, select, option, distance)
                    .into_iter()
                    .map(move |entry| entry.with_label(Some(label)))
            })
            .collect()
    }

    fn match_option(&self, index: &PageIndex, select: ElementId, option: ElementId, distance: usize) -> Vec<Entry> {
        if !self.coordinates.is_empty() && !in_table_coordinates(index, select, &self.coordinates, None) {
            return Vec::new();
        }
        let anchor = Anchor::none();
        let mut results = Vec::new();
        if self.target_has_content {
            results.extend(self.by_id.matches(index, &anchor, option));
        }
        results.extend(self.by_text.matches(index, &anchor, option));
        results.extend(self.by_label.matches(index, &anchor, option));

        results
            .into_iter()
            .map(|result| MatchResult { distance, ..result })
            .map(|result| to_entry(index, ControlKind::Option, &result))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::matcher::test_support::{by_id, page};
    use crate::ranking::MatchKind;

    fn identify(identifier: Identifier, index: &PageIndex, wpath: &WPath) -> Vec<Entry> {
        let prepared = identifier.prepare(index, wpath);
        index
            .visible_elements()
            .iter()
            .filter(|e| identifier.supports(index, **e))
            .flat_map(|e| prepared.identify(index, *e))
            .collect()
    }

    #[test]
    fn test_supports() {
        let index = page(
            Element::new("body")
                .child(Element::new("input").attr("id", "text"))
                .child(Element::new("label").attr("id", "label").attr("for", "sel").text("Pick"))
                .child(Element::new("select").attr("id", "sel").child(Element::new("option").attr("id", "o"))),
        );
        let text = by_id(&index, "text");
        let label = by_id(&index, "label");
        assert!(Identifier::TextInput.supports(&index, text));
        assert!(!Identifier::PasswordInput.supports(&index, text));
        assert!(Identifier::TextInput.supports(&index, label));
        assert!(!Identifier::Button.supports(&index, label));
        assert!(Identifier::Option.supports(&index, label));
        assert!(Identifier::Option.supports(&index, by_id(&index, "o")));
        assert!(Identifier::Unspecific.supports(&index, text));
        assert!(Identifier::is_claimed(&index, text));
        assert!(!Identifier::is_claimed(&index, label));
    }

    #[test]
    fn test_text_input_by_label_text() {
        let index = page(
            Element::new("body")
                .text("Username:")
                .child(Element::new("input").attr("id", "user")),
        );
        let entries = identify(Identifier::TextInput, &index, &WPath::new(["Username"]).unwrap());
        let by_label_text: Vec<&Entry> = entries.iter().filter(|e| e.kind == MatchKind::ByLabelText).collect();
        assert_eq!(by_label_text.len(), 1);
        assert_eq!(by_label_text[0].control, Control::new(by_id(&index, "user"), ControlKind::TextField));
        assert_eq!((by_label_text[0].deviation, by_label_text[0].distance), (1, 1));
    }

    #[test]
    fn test_html_label_entry_keeps_label() {
        let index = page(
            Element::new("body")
                .child(Element::new("label").attr("id", "l").attr("for", "mail").text("E-Mail"))
                .child(Element::new("input").attr("id", "mail")),
        );
        let entries = identify(Identifier::TextInput, &index, &WPath::new(["E-Mail"]).unwrap());
        let label_entry = entries.iter().find(|e| e.kind == MatchKind::ByLabel).unwrap();
        assert_eq!(label_entry.control.element, by_id(&index, "mail"));
        assert_eq!(label_entry.label, Some(by_id(&index, "l")));
    }

    #[test]
    fn test_button_by_text_and_id() {
        let index = page(
            Element::new("body").child(Element::new("button").attr("id", "ok").text("Confirm")),
        );
        let entries = identify(Identifier::Button, &index, &WPath::new(["Confirm"]).unwrap());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, MatchKind::ByLabelText);

        let entries = identify(Identifier::Button, &index, &WPath::new(["ok"]).unwrap());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, MatchKind::ById);
    }

    #[test]
    fn test_table_coordinates_without_last_node() {
        let index = page(
            Element::new("body").child(
                Element::new("table")
                    .child(Element::new("tr").child(Element::new("td")).child(Element::new("td").text("Qty")))
                    .child(
                        Element::new("tr")
                            .child(Element::new("td").text("Total"))
                            .child(Element::new("td").child(Element::new("input").attr("id", "cell"))),
                    ),
            ),
        );
        let entries = identify(Identifier::TextInput, &index, &WPath::new(["[Total;Qty]"]).unwrap());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, MatchKind::ByTableCoordinate);
        assert_eq!(entries[0].control.element, by_id(&index, "cell"));
    }

    #[test]
    fn test_table_coordinates_filter_results() {
        let row = |header: &str, id: &str| {
            Element::new("tr")
                .child(Element::new("td").text(header))
                .child(Element::new("td").child(Element::new("input").attr("type", "submit").attr("id", id).attr("value", "Edit")))
        };
        let index = page(
            Element::new("body").child(Element::new("table").child(row("Alice", "first")).child(row("Bob", "second"))),
        );
        let entries = identify(Identifier::InputButton, &index, &WPath::new(["[Bob]", "Edit"]).unwrap());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].control.element, by_id(&index, "second"));
    }

    fn select_page() -> PageIndex {
        page(
            Element::new("body")
                .child(Element::new("label").attr("id", "l").attr("for", "color").text("Color"))
                .child(
                    Element::new("select")
                        .attr("id", "color")
                        .attr("name", "colorName")
                        .child(Element::new("option").attr("id", "red").text("Red"))
                        .child(Element::new("option").attr("id", "blue").text("Blue")),
                ),
        )
    }

    #[test]
    fn test_option_by_select_label() {
        let index = select_page();
        let entries = identify(Identifier::Option, &index, &WPath::new(["Color", "Blue"]).unwrap());
        assert!(!entries.is_empty());
        assert!(entries.iter().all(|e| e.control.element == by_id(&index, "blue")));
        assert!(entries.iter().all(|e| e.kind == MatchKind::ByLabel));
        assert!(entries.iter().any(|e| e.label == Some(by_id(&index, "l"))));
    }

    #[test]
    fn test_option_by_select_name() {
        let index = select_page();
        let entries = identify(Identifier::Option, &index, &WPath::new(["colorName", "Red"]).unwrap());
        let red: Vec<&Entry> = entries.iter().filter(|e| e.control.element == by_id(&index, "red")).collect();
        assert!(!red.is_empty());
        assert!(red.iter().any(|e| e.distance == 0));
        assert!(entries.iter().all(|e| e.control.kind == ControlKind::Option));
    }

    #[test]
    fn test_option_requires_last_node() {
        let index = select_page();
        assert!(identify(Identifier::Option, &index, &WPath::new(["[a;b]"]).unwrap()).is_empty());
    }
}
