//! Table coordinate matching.
//!
//! A coordinate `[x;y]` constrains the cell a candidate sits in: some cell
//! sharing its rows has to read `x` and some cell sharing its columns has to
//! read `y`. Coordinates are checked innermost first; after a match the walk
//! continues from the matched row, so the next coordinate applies to the
//! cell of an outer table.

use crate::element::ElementKind;
use crate::find_spot::FindSpot;
use crate::page_index::{ElementId, PageIndex};
use crate::ranking::MatchKind;
use crate::search_pattern::SearchPattern;
use crate::wpath::TableCoordinate;

use super::{Anchor, ElementMatcher, MatchResult};

/// A table coordinate with compiled patterns.
#[derive(Debug, Clone)]
pub struct CompiledCoordinate {
    pub x: Option<SearchPattern>,
    pub y: Option<SearchPattern>,
}

impl From<&TableCoordinate> for CompiledCoordinate {
    fn from(coordinate: &TableCoordinate) -> Self {
        Self {
            x: coordinate.x_pattern(),
            y: coordinate.y_pattern(),
        }
    }
}

/// Compiles coordinates given innermost first.
pub fn compile_coordinates(reversed: &[TableCoordinate]) -> Vec<CompiledCoordinate> {
    reversed.iter().map(CompiledCoordinate::from).collect()
}

fn header_matches(index: &PageIndex, cells: &[ElementId], pattern: &SearchPattern, path_spot: Option<FindSpot>) -> bool {
    cells.iter().any(|cell| {
        let after_path = path_spot.map_or(true, |path| path.end < index.position(*cell).start);
        after_path && pattern.matches(&index.as_text(*cell))
    })
}

/// True if `element` satisfies all coordinates, given innermost first.
pub fn in_table_coordinates(
    index: &PageIndex,
    element: ElementId,
    coordinates: &[CompiledCoordinate],
    path_spot: Option<FindSpot>,
) -> bool {
    let mut current = element;
    let mut found = true;

    for coordinate in coordinates {
        if !found {
            break;
        }
        found = false;
        let mut found_x = false;
        let mut found_y = false;

        let mut cell = index.enclosing_cell(current);
        while let Some(current_cell) = cell {
            let placement = index
                .enclosing_table(current_cell)
                .and_then(|table| index.table_layout(table))
                .and_then(|layout| layout.placement(current_cell).map(|p| (layout, p)));

            if let Some((layout, placement)) = placement {
                if let (false, Some(x)) = (found_x, &coordinate.x) {
                    let row_cells = layout.cells_in_rows(placement.row..placement.row + placement.row_span);
                    found_x = header_matches(index, &row_cells, x, path_spot);
                }
                if let (false, Some(y)) = (found_y, &coordinate.y) {
                    let column_cells =
                        layout.cells_in_columns(placement.column..placement.column + placement.column_span);
                    found_y = header_matches(index, &column_cells, y, path_spot);
                }

                if (found_x || coordinate.x.is_none()) && (found_y || coordinate.y.is_none()) {
                    found = true;
                    current = index.enclosing_row(current_cell).unwrap_or(current_cell);
                    break;
                }
            }
            cell = index.enclosing(current_cell, ElementKind::TableCell);
        }
    }
    found
}

/// Matches elements of the given kinds purely by their table position.
#[derive(Debug, Clone)]
pub struct TableCoordinatesMatcher {
    coordinates: Vec<CompiledCoordinate>,
    /// Accepted element kinds; `None` accepts every element.
    targets: Option<&'static [ElementKind]>,
}

impl TableCoordinatesMatcher {
    /// `reversed` lists the coordinates innermost first.
    pub fn new(reversed: &[TableCoordinate], targets: Option<&'static [ElementKind]>) -> Self {
        Self {
            coordinates: compile_coordinates(reversed),
            targets,
        }
    }
}

impl ElementMatcher for TableCoordinatesMatcher {
    fn name(&self) -> &'static str {
        "ByTableCoordinates"
    }

    fn matches(&self, index: &PageIndex, anchor: &Anchor, element: ElementId) -> Vec<MatchResult> {
        if let Some(targets) = self.targets {
            if !targets.contains(&index.kind(element)) {
                return Vec::new();
            }
        }
        let spot = index.position(element);
        if !anchor.admits(spot) || !in_table_coordinates(index, element, &self.coordinates, anchor.path_spot) {
            return Vec::new();
        }
        let distance = anchor.distance(&index.text_before(element));
        vec![MatchResult::new(element, MatchKind::ByTableCoordinate, 0, distance, spot.start)]
    }
}
