//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use wlocate_core::config::FinderConfig;
use wlocate_core::element::{Document, Element};
use wlocate_core::finder::ControlFinder;
use wlocate_core::page_index::ElementId;
use wlocate_core::wpath::WPath;

/// Wraps a body element into a complete document.
pub fn document(body: Element) -> Document {
    Document::new(Element::new("html").child(body))
}

/// A finder over `body` with a small, fixed pool.
pub fn finder(body: Element) -> ControlFinder {
    let config = FinderConfig {
        worker_threads: Some(2),
        ..FinderConfig::default()
    };
    ControlFinder::new(&document(body), config).expect("finder")
}

pub fn wpath(nodes: &[&str]) -> WPath {
    WPath::new(nodes.iter().copied()).expect("valid locator")
}

pub fn id_of(finder: &ControlFinder, id: &str) -> ElementId {
    finder.index().element_by_id(id).unwrap_or_else(|| panic!("no element with id {id}"))
}

pub fn text_input(id: &str) -> Element {
    Element::new("input").attr("type", "text").attr("id", id)
}

pub fn password_input(id: &str) -> Element {
    Element::new("input").attr("type", "password").attr("id", id)
}

pub fn submit(id: &str, value: &str) -> Element {
    Element::new("input").attr("type", "submit").attr("id", id).attr("value", value)
}

pub fn cell(text: &str) -> Element {
    Element::new("td").text(text)
}

pub fn cell_with(child: Element) -> Element {
    Element::new("td").child(child)
}

/// A row from its cells.
pub fn row(cells: Vec<Element>) -> Element {
    cells.into_iter().fold(Element::new("tr"), |row, cell| row.child(cell))
}
