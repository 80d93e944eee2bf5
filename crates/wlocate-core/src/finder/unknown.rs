//! Elements no identifier knows about, found by id or by the text they
//! render.

use tracing::{debug, trace};

use crate::find_spot::FindSpot;
use crate::identifier::{Control, ControlKind, Identifier};
use crate::matcher::{in_table_coordinates, Anchor, AttributeMatcher, CompiledCoordinate, ElementMatcher};
use crate::page_index::{ElementId, PageIndex};
use crate::ranking::{Entry, MatchKind, WeightedControlList};
use crate::search_pattern::SearchPattern;
use crate::wpath::WPath;

use super::{FindContext, FindError, Finder};

/// Finder for arbitrary page content ("for text" lookups).
///
/// Runs on the calling thread: every text hit has to be mapped to its
/// innermost element, which is a single pass over the page.
#[derive(Debug, Clone)]
pub struct UnknownFinder {
    context: FindContext,
    fallback: bool,
}

impl UnknownFinder {
    /// With `fallback`, an empty target picks the first unclaimed element
    /// after the path (or inside the table cell).
    pub fn new(context: FindContext, fallback: bool) -> Self {
        Self { context, fallback }
    }

    fn first_after_path(
        &self,
        anchor: &Anchor,
        coordinates: &[CompiledCoordinate],
        found: &mut WeightedControlList,
    ) {
        let index = &self.context.index;
        let first = index.visible_elements_bottom_up().iter().copied().find(|element| {
            let spot = index.position(*element);
            anchor.admits(spot)
                && !Identifier::is_claimed(index, *element)
                && !spot.is_empty()
                && (coordinates.is_empty() || in_table_coordinates(index, *element, coordinates, anchor.path_spot))
        });
        if let Some(element) = first {
            let distance = anchor.distance(&index.text_before(element));
            found.add(entry(index, element, MatchKind::ByText, 0, distance));
        }
    }

    fn by_id(&self, target: &SearchPattern, anchor: &Anchor, found: &mut WeightedControlList) {
        let index = &self.context.index;
        let matcher = AttributeMatcher::by_id(target.clone());
        for element in index.visible_elements() {
            if Identifier::is_claimed(index, *element) {
                continue;
            }
            for result in matcher.matches(index, anchor, *element) {
                found.add(entry(index, result.element, result.kind, result.deviation, result.distance));
            }
        }
    }

    fn by_text(
        &self,
        target: &SearchPattern,
        anchor: &Anchor,
        coordinates: &[CompiledCoordinate],
        found: &mut WeightedControlList,
    ) {
        let index = &self.context.index;
        let mut hit = index.first_occurrence_from(target, anchor.end());
        while hit.is_found() {
            trace!(pattern = target.original_string(), %hit, "text hit");
            if let Some(element) = innermost_containing(index, hit) {
                let in_table =
                    coordinates.is_empty() || in_table_coordinates(index, element, coordinates, anchor.path_spot);
                if in_table && !Identifier::is_claimed(index, element) {
                    let text = index.text_before_including_self(element);
                    let last = target.last_occurrence_in(&text);
                    if last.is_found() {
                        let deviation = text.chars().count().saturating_sub(last.end);
                        let before: String = text.chars().take(last.start).collect();
                        found.add(entry(index, element, MatchKind::ByText, deviation, anchor.distance(&before)));
                    }
                }
            }
            hit = index.first_occurrence_from(target, hit.start + 1);
        }
    }
}

impl Finder for UnknownFinder {
    fn name(&self) -> &'static str {
        "UnknownFinder"
    }

    fn find(&self, wpath: &WPath) -> Result<WeightedControlList, FindError> {
        let index = &self.context.index;
        let mut found = self.context.new_list();

        let anchor = Anchor::locate(index, wpath);
        if anchor.is_missing() {
            debug!(locator = %wpath, "path not on page");
            return Ok(found);
        }
        let coordinates: Vec<CompiledCoordinate> =
            wpath.table_coordinates_reversed().iter().map(CompiledCoordinate::from).collect();

        let target = wpath.last_node_pattern();
        let empty_target = target.as_ref().map_or(true, |t| t.is_match_all());
        if empty_target {
            let has_context = anchor.path_spot.is_some() || !coordinates.is_empty();
            if self.fallback && has_context {
                self.first_after_path(&anchor, &coordinates, &mut found);
            }
            return Ok(found);
        }

        if let Some(target) = target {
            self.by_id(&target, &anchor, &mut found);
            self.by_text(&target, &anchor, &coordinates, &mut found);
        }
        Ok(found)
    }
}

/// The innermost visible element whose text covers the whole hit.
fn innermost_containing(index: &PageIndex, hit: FindSpot) -> Option<ElementId> {
    index
        .visible_elements_bottom_up()
        .iter()
        .copied()
        .find(|element| index.position(*element).contains(&hit))
}

fn entry(index: &PageIndex, element: ElementId, kind: MatchKind, deviation: usize, distance: usize) -> Entry {
    Entry::new(
        Control::new(element, ControlKind::Unspecific),
        kind,
        deviation,
        distance,
        index.position(element).start,
        index.hierarchy(element),
        index.index(element),
    )
    .with_description(index.describe(element))
}
