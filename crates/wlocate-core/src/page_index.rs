//! Precomputed positional data for one document snapshot.
//!
//! The [`PageIndex`] linearizes a [`Document`] into a whitespace-normalized
//! text and records, for every element, the span of that text it produced.
//! A second text leaves out everything form controls contribute (values,
//! option texts, button captions). All matchers work on these texts; offsets
//! are character offsets.
//!
//! Elements are addressed by [`ElementId`], their position in a pre-order
//! walk of the whole tree. The index is immutable once built and can be
//! shared between worker threads.

use std::collections::HashMap;

use serde::Serialize;

use crate::element::{Document, Element, ElementKind, MouseAction, Node};
use crate::find_spot::FindSpot;
use crate::search_pattern::SearchPattern;

/// Handle of an element within one [`PageIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ElementId(pub usize);

/// Whitespace-collapsing text builder.
///
/// Every run of whitespace becomes a single blank and the text never starts
/// with a blank. A trailing blank is kept internally but does not count for
/// [`NormalizedText::len`].
#[derive(Debug, Default)]
struct NormalizedText {
    content: Vec<char>,
    disabled: usize,
}

impl NormalizedText {
    fn ends_blank(&self) -> bool {
        self.content.last().map_or(true, |c| c.is_whitespace())
    }

    fn append(&mut self, s: &str) {
        if self.disabled > 0 {
            return;
        }
        let mut blank = self.ends_blank();
        for c in s.chars() {
            if c.is_whitespace() {
                if !blank {
                    blank = true;
                    self.content.push(' ');
                }
            } else {
                blank = false;
                self.content.push(c);
            }
        }
    }

    fn append_blank(&mut self) {
        if self.disabled == 0 && !self.ends_blank() {
            self.content.push(' ');
        }
    }

    fn disable(&mut self) {
        self.disabled += 1;
    }

    fn enable(&mut self) {
        self.disabled = self.disabled.saturating_sub(1);
    }

    fn len(&self) -> usize {
        match self.content.last() {
            Some(c) if c.is_whitespace() => self.content.len() - 1,
            _ => self.content.len(),
        }
    }
}

/// The trimmed text between two offsets of a normalized text.
fn substring(content: &[char], length: usize, start: usize, end: usize) -> String {
    let end = end.min(length);
    if start >= end {
        return String::new();
    }
    let mut start = start;
    let mut end = end;
    if content[end - 1].is_whitespace() {
        end -= 1;
    }
    if start < end && content[start].is_whitespace() {
        start += 1;
    }
    if start >= end {
        return String::new();
    }
    content[start..end].iter().collect()
}

/// Everything the index knows about one element.
#[derive(Debug, Clone)]
pub struct IndexedNode {
    /// The element itself, without its children.
    pub element: Element,
    pub kind: ElementKind,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
    /// Nesting depth; the root has depth 0.
    pub depth: usize,
    /// True if the element and all its ancestors are displayed.
    pub visible: bool,
    /// The enclosing form, if any.
    pub form: Option<ElementId>,
    span: FindSpot,
    span_without_form_controls: FindSpot,
}

/// Where a cell sits in the occupancy matrix of its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPlacement {
    pub row: usize,
    pub column: usize,
    pub row_span: usize,
    pub column_span: usize,
}

/// Occupancy matrix of one table, with row and column spans resolved.
#[derive(Debug, Clone, Default)]
pub struct TableLayout {
    rows: Vec<ElementId>,
    grid: Vec<Vec<Option<ElementId>>>,
    placements: HashMap<ElementId, CellPlacement>,
}

impl TableLayout {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.grid.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// The cell covering the given slot, following spans.
    pub fn cell_at(&self, row: usize, column: usize) -> Option<ElementId> {
        self.grid.get(row).and_then(|r| r.get(column)).copied().flatten()
    }

    pub fn placement(&self, cell: ElementId) -> Option<CellPlacement> {
        self.placements.get(&cell).copied()
    }

    /// Distinct cells covering any slot of the given rows.
    pub fn cells_in_rows(&self, rows: std::ops::Range<usize>) -> Vec<ElementId> {
        let mut cells = Vec::new();
        for row in rows.start..rows.end.min(self.row_count()) {
            for column in 0..self.column_count() {
                if let Some(cell) = self.cell_at(row, column) {
                    if !cells.contains(&cell) {
                        cells.push(cell);
                    }
                }
            }
        }
        cells
    }

    /// Distinct cells covering any slot of the given columns.
    pub fn cells_in_columns(&self, columns: std::ops::Range<usize>) -> Vec<ElementId> {
        let mut cells = Vec::new();
        for row in 0..self.row_count() {
            for column in columns.clone() {
                if let Some(cell) = self.cell_at(row, column) {
                    if !cells.contains(&cell) {
                        cells.push(cell);
                    }
                }
            }
        }
        cells
    }
}

/// Linearized text and per-element positions of one document.
#[derive(Debug)]
pub struct PageIndex {
    nodes: Vec<IndexedNode>,
    text: Vec<char>,
    text_length: usize,
    text_without_form_controls: Vec<char>,
    text_without_form_controls_length: usize,
    visible: Vec<ElementId>,
    visible_bottom_up: Vec<ElementId>,
    ids: HashMap<String, ElementId>,
    tables: HashMap<ElementId, TableLayout>,
}

struct Builder {
    nodes: Vec<IndexedNode>,
    text: NormalizedText,
    without_form_controls: NormalizedText,
    visible: Vec<ElementId>,
    visible_bottom_up: Vec<ElementId>,
}

impl Builder {
    fn visit(
        &mut self,
        element: &Element,
        parent: Option<ElementId>,
        form: Option<ElementId>,
        parent_visible: bool,
        prefix: Option<&str>,
    ) -> ElementId {
        let id = ElementId(self.nodes.len());
        let kind = element.kind();
        let depth = parent.map_or(0, |p| self.nodes[p.0].depth + 1);
        let visible = parent_visible
            && !element.hidden
            && !matches!(kind, ElementKind::NonRendered | ElementKind::HiddenInput);

        let start = self.text.len();
        let start_without_form_controls = self.without_form_controls.len();

        self.nodes.push(IndexedNode {
            element: Element {
                children: Vec::new(),
                ..element.clone()
            },
            kind,
            parent,
            children: Vec::new(),
            depth,
            visible,
            form,
            span: FindSpot::new(start, start),
            span_without_form_controls: FindSpot::new(start_without_form_controls, start_without_form_controls),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }

        let child_form = if kind == ElementKind::Form { Some(id) } else { form };

        if visible {
            self.visible.push(id);
            if let Some(prefix) = prefix {
                self.text.append(prefix);
                self.without_form_controls.append(prefix);
            }
            self.append_content(element, id, kind, child_form);
            self.visible_bottom_up.push(id);
        } else {
            self.visit_children(element, id, child_form, false);
        }

        let node = &mut self.nodes[id.0];
        node.span = FindSpot::new(start, self.text.len().max(start));
        node.span_without_form_controls = FindSpot::new(
            start_without_form_controls,
            self.without_form_controls.len().max(start_without_form_controls),
        );
        id
    }

    fn visit_children(&mut self, element: &Element, id: ElementId, form: Option<ElementId>, visible: bool) {
        for child in &element.children {
            match child {
                Node::Text(text) => {
                    if visible {
                        self.text.append(text);
                        self.without_form_controls.append(text);
                    }
                }
                Node::Element(child) => {
                    self.visit(child, Some(id), form, visible, None);
                }
            }
        }
    }

    fn blank_both(&mut self) {
        self.text.append_blank();
        self.without_form_controls.append_blank();
    }

    fn append_content(&mut self, element: &Element, id: ElementId, kind: ElementKind, form: Option<ElementId>) {
        let value = element.attribute("value").unwrap_or("");
        let alt = element.attribute("alt").unwrap_or("");
        match kind {
            ElementKind::NonRendered | ElementKind::HiddenInput | ElementKind::FileInput => {}
            ElementKind::Break => self.blank_both(),
            ElementKind::Image => {
                self.text.append(alt);
                self.without_form_controls.append(alt);
            }
            ElementKind::Select => {
                self.without_form_controls.disable();
                self.visit_select_items(element, id, form);
                self.without_form_controls.enable();
                self.blank_both();
            }
            ElementKind::OptionGroup => {
                self.text.append(element.attribute("label").unwrap_or(""));
            }
            ElementKind::Legend => {
                self.visit_children(element, id, form, true);
                self.blank_both();
            }
            ElementKind::SubmitInput | ElementKind::ResetInput | ElementKind::ButtonInput => {
                self.text.append(value);
                self.text.append_blank();
            }
            ElementKind::CheckBox | ElementKind::RadioButton | ElementKind::Button => {
                self.without_form_controls.disable();
                self.visit_children(element, id, form, true);
                self.without_form_controls.enable();
                self.blank_both();
            }
            ElementKind::ImageInput => self.text.append(alt),
            ElementKind::TextInput | ElementKind::PasswordInput => self.text.append(value),
            ElementKind::TextArea => {
                self.without_form_controls.disable();
                self.visit_children(element, id, form, true);
                self.without_form_controls.enable();
            }
            ElementKind::OrderedList => {
                self.blank_both();
                let mut number = 1;
                for child in &element.children {
                    match child {
                        Node::Element(item) if item.kind() == ElementKind::ListItem => {
                            let prefix = format!("{number}. ");
                            number += 1;
                            self.visit(item, Some(id), form, true, Some(&prefix));
                        }
                        Node::Element(other) => {
                            self.visit(other, Some(id), form, true, None);
                        }
                        Node::Text(text) => {
                            self.text.append(text);
                            self.without_form_controls.append(text);
                        }
                    }
                }
                self.blank_both();
            }
            ElementKind::Block | ElementKind::Table | ElementKind::TableRow | ElementKind::TableCell | ElementKind::ListItem => {
                self.blank_both();
                self.visit_children(element, id, form, true);
                self.blank_both();
            }
            _ => self.visit_children(element, id, form, true),
        }
    }

    /// Options and option groups, each preceded by a blank.
    fn visit_select_items(&mut self, container: &Element, container_id: ElementId, form: Option<ElementId>) {
        for child in &container.children {
            let Node::Element(item) = child else {
                continue;
            };
            match item.kind() {
                ElementKind::Option => {
                    self.blank_both();
                    self.visit(item, Some(container_id), form, true, None);
                }
                ElementKind::OptionGroup => {
                    self.blank_both();
                    let group = self.visit(item, Some(container_id), form, true, None);
                    if self.nodes[group.0].visible {
                        self.visit_select_items(item, group, form);
                    }
                }
                _ => {}
            }
        }
    }
}

fn span_attribute(element: &Element, name: &str) -> usize {
    element
        .attribute(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(1)
}

impl PageIndex {
    /// Walks the document once and records all positions.
    pub fn new(document: &Document) -> Self {
        let mut builder = Builder {
            nodes: Vec::new(),
            text: NormalizedText::default(),
            without_form_controls: NormalizedText::default(),
            visible: Vec::new(),
            visible_bottom_up: Vec::new(),
        };
        builder.visit(&document.root, None, None, true, None);

        let mut ids = HashMap::new();
        for (i, node) in builder.nodes.iter().enumerate() {
            if let Some(id) = node.element.id() {
                ids.entry(id.to_string()).or_insert(ElementId(i));
            }
        }

        let text_length = builder.text.len();
        let text_without_form_controls_length = builder.without_form_controls.len();
        let mut index = Self {
            nodes: builder.nodes,
            text: builder.text.content,
            text_length,
            text_without_form_controls: builder.without_form_controls.content,
            text_without_form_controls_length,
            visible: builder.visible,
            visible_bottom_up: builder.visible_bottom_up,
            ids,
            tables: HashMap::new(),
        };

        let tables: Vec<ElementId> = (0..index.nodes.len())
            .map(ElementId)
            .filter(|id| index.nodes[id.0].kind == ElementKind::Table)
            .collect();
        for table in tables {
            let layout = index.build_table_layout(table);
            index.tables.insert(table, layout);
        }
        index
    }

    /// The whole normalized text.
    pub fn text(&self) -> String {
        substring(&self.text, self.text_length, 0, self.text_length)
    }

    /// The normalized text without anything form controls contribute.
    pub fn text_without_form_controls(&self) -> String {
        substring(
            &self.text_without_form_controls,
            self.text_without_form_controls_length,
            0,
            self.text_without_form_controls_length,
        )
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: ElementId) -> &IndexedNode {
        &self.nodes[id.0]
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.nodes[id.0].element
    }

    pub fn kind(&self, id: ElementId) -> ElementKind {
        self.nodes[id.0].kind
    }

    pub fn is_visible(&self, id: ElementId) -> bool {
        self.nodes[id.0].visible
    }

    /// Visible elements in document order.
    pub fn visible_elements(&self) -> &[ElementId] {
        &self.visible
    }

    /// Visible elements, innermost first (post-order).
    pub fn visible_elements_bottom_up(&self) -> &[ElementId] {
        &self.visible_bottom_up
    }

    pub fn element_by_id(&self, id: &str) -> Option<ElementId> {
        self.ids.get(id).copied()
    }

    /// The first `body` element.
    pub fn body(&self) -> Option<ElementId> {
        self.nodes
            .iter()
            .position(|n| n.kind == ElementKind::Body)
            .map(ElementId)
    }

    /// The span this element produced in the normalized text.
    pub fn position(&self, id: ElementId) -> FindSpot {
        self.nodes[id.0].span
    }

    pub fn hierarchy(&self, id: ElementId) -> usize {
        self.nodes[id.0].depth
    }

    /// Document-order index.
    pub fn index(&self, id: ElementId) -> usize {
        id.0
    }

    pub fn first_occurrence(&self, pattern: &SearchPattern) -> FindSpot {
        self.first_occurrence_from(pattern, 0)
    }

    pub fn first_occurrence_from(&self, pattern: &SearchPattern, start: usize) -> FindSpot {
        pattern.first_occurrence_in_from(&self.text(), start)
    }

    /// The whole text before the element.
    pub fn text_before(&self, id: ElementId) -> String {
        substring(&self.text, self.text_length, 0, self.position(id).start)
    }

    /// The whole text up to the end of the element.
    pub fn text_before_including_self(&self, id: ElementId) -> String {
        substring(&self.text, self.text_length, 0, self.position(id).end)
    }

    pub fn as_text(&self, id: ElementId) -> String {
        let span = self.position(id);
        substring(&self.text, self.text_length, span.start, span.end)
    }

    pub fn as_text_without_form_controls(&self, id: ElementId) -> String {
        let span = self.nodes[id.0].span_without_form_controls;
        substring(
            &self.text_without_form_controls,
            self.text_without_form_controls_length,
            span.start,
            span.end,
        )
    }

    fn is_labeling_boundary(&self, id: ElementId) -> bool {
        self.nodes[id.0].kind.is_form_control()
    }

    /// The text between the preceding form control (or the body start, or
    /// the end of an element of another form) and the element, never
    /// reaching before `from`.
    pub fn labeling_text_before(&self, id: ElementId, from: usize) -> String {
        let own = self.position(id);
        let current_form = self.nodes[id.0].form;
        let mut start = 0;

        let at = self.visible.iter().position(|v| *v == id).unwrap_or(self.visible.len());
        for &previous in self.visible[..at].iter().rev() {
            let node = &self.nodes[previous.0];
            if node.kind == ElementKind::Body {
                start = node.span.start;
                break;
            }
            if self.is_labeling_boundary(previous) {
                start = node.span.end;
                let text = substring(&self.text, self.text_length, start.max(from), own.start);
                if !text.is_empty() {
                    return text;
                }
            }
            if node.form.is_some() && node.form != current_form {
                start = node.span.end;
                break;
            }
        }
        substring(&self.text, self.text_length, start.max(from), own.start)
    }

    /// The text between the element and the next form control (or the next
    /// element outside the element's form).
    pub fn labeling_text_after(&self, id: ElementId) -> String {
        let own = self.position(id);
        let current_form = self.nodes[id.0].form;
        let mut end = self.text_length;

        let at = self.visible.iter().position(|v| *v == id).map_or(self.visible.len(), |p| p + 1);
        for &next in &self.visible[at..] {
            let node = &self.nodes[next.0];
            if self.is_labeling_boundary(next) {
                end = node.span.start;
                break;
            }
            if current_form.is_some() && node.form != current_form {
                end = node.span.start;
                break;
            }
        }
        substring(&self.text, self.text_length, own.end, end)
    }

    pub fn has_mouse_action_listener(&self, id: ElementId, action: MouseAction) -> bool {
        self.nodes[id.0].element.has_listener(action)
    }

    pub fn has_click_listener(&self, id: ElementId) -> bool {
        self.has_mouse_action_listener(id, MouseAction::Click)
    }

    /// The control a `label` element points at: the element named by its
    /// `for` attribute, or else the first labelable descendant.
    pub fn labeled_element(&self, label: ElementId) -> Option<ElementId> {
        let node = &self.nodes[label.0];
        if node.kind != ElementKind::Label {
            return None;
        }
        if let Some(target) = node.element.attribute("for") {
            return self.element_by_id(target);
        }
        self.descendants(label)
            .into_iter()
            .find(|d| self.nodes[d.0].kind.is_labelable())
    }

    /// All descendants in document order.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut stack: Vec<ElementId> = self.nodes[id.0].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            result.push(next);
            stack.extend(self.nodes[next.0].children.iter().rev().copied());
        }
        result
    }

    /// The nearest strict ancestor of the given kind.
    pub fn enclosing(&self, id: ElementId, kind: ElementKind) -> Option<ElementId> {
        let mut current = self.nodes[id.0].parent;
        while let Some(ancestor) = current {
            if self.nodes[ancestor.0].kind == kind {
                return Some(ancestor);
            }
            current = self.nodes[ancestor.0].parent;
        }
        None
    }

    /// The element itself if it is a cell, else its nearest enclosing cell.
    pub fn enclosing_cell(&self, id: ElementId) -> Option<ElementId> {
        if self.nodes[id.0].kind == ElementKind::TableCell {
            return Some(id);
        }
        self.enclosing(id, ElementKind::TableCell)
    }

    pub fn enclosing_row(&self, id: ElementId) -> Option<ElementId> {
        self.enclosing(id, ElementKind::TableRow)
    }

    pub fn enclosing_table(&self, id: ElementId) -> Option<ElementId> {
        self.enclosing(id, ElementKind::Table)
    }

    pub fn table_layout(&self, table: ElementId) -> Option<&TableLayout> {
        self.tables.get(&table)
    }

    fn build_table_layout(&self, table: ElementId) -> TableLayout {
        let rows: Vec<ElementId> = self
            .descendants(table)
            .into_iter()
            .filter(|d| self.nodes[d.0].kind == ElementKind::TableRow && self.enclosing_table(*d) == Some(table))
            .collect();

        let mut layout = TableLayout {
            grid: vec![Vec::new(); rows.len()],
            ..TableLayout::default()
        };
        for (r, row) in rows.iter().enumerate() {
            let mut column = 0;
            for &cell in &self.nodes[row.0].children {
                if self.nodes[cell.0].kind != ElementKind::TableCell {
                    continue;
                }
                while layout.grid[r].get(column).copied().flatten().is_some() {
                    column += 1;
                }
                let element = &self.nodes[cell.0].element;
                let row_span = span_attribute(element, "rowspan").min(rows.len() - r);
                let column_span = span_attribute(element, "colspan");
                for grid_row in &mut layout.grid[r..r + row_span] {
                    if grid_row.len() < column + column_span {
                        grid_row.resize(column + column_span, None);
                    }
                    for slot in &mut grid_row[column..column + column_span] {
                        *slot = Some(cell);
                    }
                }
                layout.placements.insert(
                    cell,
                    CellPlacement {
                        row: r,
                        column,
                        row_span,
                        column_span,
                    },
                );
                column += column_span;
            }
        }
        layout.rows = rows;
        layout
    }

    /// A short description such as `input id="user" name="u"`.
    pub fn describe(&self, id: ElementId) -> String {
        let element = &self.nodes[id.0].element;
        let mut description = element.tag.clone();
        for attribute in ["type", "id", "name", "value"] {
            if let Some(value) = element.attribute(attribute) {
                description.push_str(&format!(" {attribute}=\"{value}\""));
            }
        }
        description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: Element) -> PageIndex {
        PageIndex::new(&Document::new(Element::new("html").child(body)))
    }

    fn by_id(index: &PageIndex, id: &str) -> ElementId {
        index.element_by_id(id).unwrap()
    }

    #[test]
    fn test_normalized_text() {
        let mut text = NormalizedText::default();
        text.append("  a \t\n b\u{a0}\u{a0}c ");
        assert_eq!(text.content.iter().collect::<String>(), "a b c ");
        assert_eq!(text.len(), 5);
        text.append_blank();
        text.disable();
        text.append("ignored");
        text.enable();
        text.append("d");
        assert_eq!(substring(&text.content, text.len(), 0, text.len()), "a b c d");
        assert_eq!(substring(&text.content, text.len(), 1, 4), "b");
    }

    #[test]
    fn test_text_and_positions() {
        let index = page(
            Element::new("body")
                .child(Element::new("p").attr("id", "label").text("Username"))
                .child(Element::new("input").attr("id", "user").attr("value", "alice")),
        );
        assert_eq!(index.text(), "Username alice");
        assert_eq!(index.text_without_form_controls(), "Username");
        let user = by_id(&index, "user");
        assert_eq!(index.text_before(user), "Username");
        assert_eq!(index.as_text(user), "alice");
        assert_eq!(index.text_before_including_self(user), "Username alice");
        assert_eq!(index.as_text(by_id(&index, "label")), "Username");
    }

    #[test]
    fn test_hidden_content_is_skipped() {
        let index = page(
            Element::new("body")
                .text("visible ")
                .child(Element::new("span").attr("id", "gone").hidden().text("invisible"))
                .child(Element::new("input").attr("type", "hidden").attr("value", "secret"))
                .child(Element::new("script").text("var x;"))
                .text(" end"),
        );
        assert_eq!(index.text(), "visible end");
        let gone = by_id(&index, "gone");
        assert!(!index.is_visible(gone));
        assert!(!index.visible_elements().contains(&gone));
    }

    #[test]
    fn test_buttons_and_selects() {
        let index = page(
            Element::new("body")
                .child(Element::new("input").attr("type", "submit").attr("value", "Send"))
                .child(
                    Element::new("select")
                        .attr("id", "sel")
                        .child(Element::new("option").attr("id", "o1").text("One"))
                        .child(
                            Element::new("optgroup")
                                .attr("label", "More")
                                .child(Element::new("option").text("Two")),
                        ),
                )
                .text("after"),
        );
        assert_eq!(index.text(), "Send One More Two after");
        assert_eq!(index.text_without_form_controls(), "after");
        assert_eq!(index.as_text(by_id(&index, "o1")), "One");
        assert_eq!(index.as_text(by_id(&index, "sel")), "One More Two");
    }

    #[test]
    fn test_ordered_list_numbering() {
        let index = page(
            Element::new("body").child(
                Element::new("ol")
                    .child(Element::new("li").attr("id", "first").text("Apple"))
                    .child(Element::new("li").text("Pear")),
            ),
        );
        assert_eq!(index.text(), "1. Apple 2. Pear");
        assert_eq!(index.as_text(by_id(&index, "first")), "1. Apple");
    }

    #[test]
    fn test_labeling_text_before() {
        let index = page(
            Element::new("body")
                .child(Element::new("p").text("MoreText"))
                .child(
                    Element::new("form")
                        .text("MyLabel")
                        .child(Element::new("input").attr("type", "hidden").attr("value", "h"))
                        .child(Element::new("input").attr("id", "first").attr("value", "v1"))
                        .text("Second")
                        .child(Element::new("input").attr("id", "second")),
                ),
        );
        assert_eq!(index.labeling_text_before(by_id(&index, "first"), 0), "MoreText MyLabel");
        assert_eq!(index.labeling_text_before(by_id(&index, "second"), 0), "Second");
        assert_eq!(index.labeling_text_before(by_id(&index, "first"), 9), "MyLabel");
    }

    #[test]
    fn test_labeling_text_stops_at_other_form() {
        let index = page(
            Element::new("body")
                .child(Element::new("form").child(Element::new("p").text("Other")))
                .child(
                    Element::new("form")
                        .text("Mine")
                        .child(Element::new("input").attr("id", "mine")),
                ),
        );
        assert_eq!(index.labeling_text_before(by_id(&index, "mine"), 0), "Mine");
    }

    #[test]
    fn test_labeling_text_after() {
        let index = page(
            Element::new("body").child(
                Element::new("form")
                    .child(Element::new("input").attr("type", "checkbox").attr("id", "cb"))
                    .text("Remember me")
                    .child(Element::new("input").attr("id", "next")),
            ),
        );
        assert_eq!(index.labeling_text_after(by_id(&index, "cb")), "Remember me");
    }

    #[test]
    fn test_labeled_element() {
        let index = page(
            Element::new("body")
                .child(Element::new("label").attr("id", "l1").attr("for", "target").text("Name"))
                .child(Element::new("input").attr("id", "target"))
                .child(
                    Element::new("label")
                        .attr("id", "l2")
                        .text("Agree")
                        .child(Element::new("input").attr("type", "checkbox").attr("id", "nested")),
                ),
        );
        assert_eq!(index.labeled_element(by_id(&index, "l1")), Some(by_id(&index, "target")));
        assert_eq!(index.labeled_element(by_id(&index, "l2")), Some(by_id(&index, "nested")));
        assert_eq!(index.labeled_element(by_id(&index, "target")), None);
    }

    #[test]
    fn test_table_layout_with_spans() {
        let index = page(
            Element::new("body").child(
                Element::new("table").attr("id", "t").child(
                    Element::new("tbody")
                        .child(
                            Element::new("tr")
                                .child(Element::new("td").attr("id", "a").attr("rowspan", "2").text("A"))
                                .child(Element::new("td").attr("id", "b").attr("colspan", "2").text("B")),
                        )
                        .child(
                            Element::new("tr")
                                .child(Element::new("td").attr("id", "c").text("C"))
                                .child(Element::new("td").attr("id", "d").text("D")),
                        ),
                ),
            ),
        );
        let layout = index.table_layout(by_id(&index, "t")).unwrap();
        assert_eq!(layout.row_count(), 2);
        assert_eq!(layout.column_count(), 3);
        assert_eq!(layout.cell_at(1, 0), Some(by_id(&index, "a")));
        assert_eq!(layout.cell_at(1, 1), Some(by_id(&index, "c")));
        assert_eq!(layout.cell_at(0, 2), Some(by_id(&index, "b")));
        let placement = layout.placement(by_id(&index, "d")).unwrap();
        assert_eq!((placement.row, placement.column), (1, 2));
        assert_eq!(layout.cells_in_columns(2..3).len(), 2);
        assert_eq!(index.enclosing_cell(by_id(&index, "d")), Some(by_id(&index, "d")));
        assert_eq!(index.enclosing_table(by_id(&index, "d")), Some(by_id(&index, "t")));
    }

    #[test]
    fn test_bottom_up_order() {
        let index = page(Element::new("body").attr("id", "b").child(Element::new("span").attr("id", "s")));
        let bottom_up = index.visible_elements_bottom_up();
        let span = bottom_up.iter().position(|i| *i == by_id(&index, "s")).unwrap();
        let body = bottom_up.iter().position(|i| *i == by_id(&index, "b")).unwrap();
        assert!(span < body);
    }
}
