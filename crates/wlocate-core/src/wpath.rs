//! The tokenized locator.
//!
//! A [`WPath`] is built from already-tokenized fragments. Every fragment but
//! the last is a *path node* that has to occur, in order, somewhere before the
//! target; the last fragment describes the target itself. Fragments of the
//! form `[x;y]` are table coordinates instead.
//!
//! # Example
//!
//! ```
//! use wlocate_core::wpath::WPath;
//!
//! let wpath = WPath::new(["Orders", "[Total; Qty]"]).unwrap();
//! assert_eq!(wpath.path_nodes(), ["Orders"]);
//! assert!(wpath.last_node().is_none());
//! assert_eq!(wpath.table_coordinates().len(), 1);
//! ```

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::search_pattern::SearchPattern;

/// Errors raised while classifying locator fragments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WPathError {
    /// Table coordinates were interrupted by a path node and resumed later.
    #[error("Invalid WPath '{0}'. Only one group of table coordinates allowed.")]
    MultipleCoordinateGroups(String),

    /// A bracketed fragment is not a valid `[x;y]` pair.
    #[error("'{0}' is not a valid table coordinate.")]
    InvalidTableCoordinate(String),
}

/// One `[x;y]` table coordinate.
///
/// Either axis may be absent, meaning that axis is not constrained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCoordinate {
    /// Text expected in the same row as the target cell (a row header).
    pub x: Option<String>,
    /// Text expected in the same column as the target cell (a column header).
    pub y: Option<String>,
}

impl TableCoordinate {
    /// Parses `[x]`, `[x;y]`, `[;y]` or `[x;]`.
    pub fn parse(node: &str) -> Result<Self, WPathError> {
        let inner = node
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| WPathError::InvalidTableCoordinate(node.to_string()))?;

        let parts: Vec<&str> = inner.split(';').collect();
        if parts.len() > 2 {
            return Err(WPathError::InvalidTableCoordinate(node.to_string()));
        }

        let axis = |part: Option<&&str>| {
            part.map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(str::to_string)
        };
        Ok(Self {
            x: axis(parts.first()),
            y: axis(parts.get(1)),
        })
    }

    pub fn x_pattern(&self) -> Option<SearchPattern> {
        self.x.as_deref().map(SearchPattern::compile)
    }

    pub fn y_pattern(&self) -> Option<SearchPattern> {
        self.y.as_deref().map(SearchPattern::compile)
    }
}

impl fmt::Display for TableCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{};{}]",
            self.x.as_deref().unwrap_or(""),
            self.y.as_deref().unwrap_or("")
        )
    }
}

fn is_table_coordinate(node: &str) -> bool {
    node.starts_with('[') && node.ends_with(']') && !node.ends_with("\\]")
}

/// An immutable, classified locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WPath {
    raw_path: Vec<String>,
    path_nodes: Vec<String>,
    last_node: Option<String>,
    table_coordinates: Vec<TableCoordinate>,
}

impl WPath {
    /// Classifies the fragments into path nodes, the last node and table
    /// coordinates.
    pub fn new<I, S>(nodes: I) -> Result<Self, WPathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let raw_path: Vec<String> = nodes.into_iter().map(Into::into).collect();
        let mut path_nodes = Vec::new();
        let mut table_coordinates = Vec::new();
        let mut last_node = None;
        let mut coordinates_finished = false;

        if let Some((last, leading)) = raw_path.split_last() {
            for node in leading {
                if is_table_coordinate(node) {
                    if coordinates_finished {
                        return Err(WPathError::MultipleCoordinateGroups(raw_path.join(" > ")));
                    }
                    table_coordinates.push(TableCoordinate::parse(node)?);
                } else {
                    if !table_coordinates.is_empty() {
                        coordinates_finished = true;
                    }
                    path_nodes.push(node.clone());
                }
            }

            if is_table_coordinate(last) {
                if coordinates_finished {
                    return Err(WPathError::MultipleCoordinateGroups(raw_path.join(" > ")));
                }
                table_coordinates.push(TableCoordinate::parse(last)?);
            } else {
                last_node = Some(last.clone());
            }
        }

        Ok(Self {
            raw_path,
            path_nodes,
            last_node,
            table_coordinates,
        })
    }

    /// The locator with no fragments at all.
    pub fn empty() -> Self {
        Self {
            raw_path: Vec::new(),
            path_nodes: Vec::new(),
            last_node: None,
            table_coordinates: Vec::new(),
        }
    }

    /// True if no fragment was given.
    pub fn is_empty(&self) -> bool {
        self.raw_path.is_empty()
    }

    pub fn raw_path(&self) -> &[String] {
        &self.raw_path
    }

    pub fn path_nodes(&self) -> &[String] {
        &self.path_nodes
    }

    pub fn last_node(&self) -> Option<&str> {
        self.last_node.as_deref()
    }

    /// Coordinates ordered outer to inner, as written.
    pub fn table_coordinates(&self) -> &[TableCoordinate] {
        &self.table_coordinates
    }

    /// Coordinates ordered inner to outer, the order matching works in.
    pub fn table_coordinates_reversed(&self) -> Vec<TableCoordinate> {
        self.table_coordinates.iter().rev().cloned().collect()
    }

    /// All path nodes joined with `*`, or `None` without path nodes.
    pub fn path_pattern(&self) -> Option<SearchPattern> {
        if self.path_nodes.is_empty() {
            None
        } else {
            Some(SearchPattern::create_from_list(&self.path_nodes))
        }
    }

    pub fn last_node_pattern(&self) -> Option<SearchPattern> {
        self.last_node.as_deref().map(SearchPattern::compile)
    }

    /// Path nodes and the last node joined with `*`.
    pub fn whole_path_pattern(&self) -> SearchPattern {
        let mut nodes: Vec<&str> = self.path_nodes.iter().map(String::as_str).collect();
        if let Some(last) = self.last_node() {
            nodes.push(last);
        }
        SearchPattern::create_from_list(&nodes)
    }
}

impl fmt::Display for WPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_path.join(" > "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let wpath = WPath::new(Vec::<String>::new()).unwrap();
        assert!(wpath.is_empty());
        assert!(wpath.path_nodes().is_empty());
        assert!(wpath.last_node().is_none());
        assert!(wpath.path_pattern().is_none());
        assert_eq!(wpath, WPath::empty());
    }

    #[test]
    fn test_path_and_last_node() {
        let wpath = WPath::new(["Login", "Username"]).unwrap();
        assert_eq!(wpath.path_nodes(), ["Login"]);
        assert_eq!(wpath.last_node(), Some("Username"));
        assert_eq!(wpath.path_pattern().unwrap(), "Login");
        assert_eq!(wpath.whole_path_pattern(), "Login*Username");
        assert_eq!(wpath.to_string(), "Login > Username");
    }

    #[test]
    fn test_empty_last_node_is_present() {
        let wpath = WPath::new(["Login", ""]).unwrap();
        assert_eq!(wpath.last_node(), Some(""));
        assert!(wpath.last_node_pattern().unwrap().is_match_all());
    }

    #[test]
    fn test_coordinates_between_path_and_last_node() {
        let wpath = WPath::new(["Orders", "[Total;Qty]", "[ x ; y ]", "Edit"]).unwrap();
        assert_eq!(wpath.path_nodes(), ["Orders"]);
        assert_eq!(wpath.last_node(), Some("Edit"));
        assert_eq!(wpath.table_coordinates().len(), 2);
        assert_eq!(wpath.table_coordinates()[1].x.as_deref(), Some("x"));
        assert_eq!(wpath.table_coordinates()[1].y.as_deref(), Some("y"));

        let reversed = wpath.table_coordinates_reversed();
        assert_eq!(reversed[0].x.as_deref(), Some("x"));
        assert_eq!(reversed[1].x.as_deref(), Some("Total"));
    }

    #[test]
    fn test_last_node_coordinate() {
        let wpath = WPath::new(["[;Qty]"]).unwrap();
        assert!(wpath.last_node().is_none());
        assert_eq!(
            wpath.table_coordinates(),
            [TableCoordinate {
                x: None,
                y: Some("Qty".to_string())
            }]
        );
    }

    #[test]
    fn test_escaped_bracket_is_no_coordinate() {
        let wpath = WPath::new(["[abc\\]", "x"]).unwrap();
        assert_eq!(wpath.path_nodes(), ["[abc\\]"]);
        assert!(wpath.table_coordinates().is_empty());
    }

    #[test]
    fn test_two_coordinate_groups_rejected() {
        let result = WPath::new(["[a;b]", "middle", "[c;d]", "x"]);
        assert!(matches!(result, Err(WPathError::MultipleCoordinateGroups(_))));

        let result = WPath::new(["[a;b]", "middle", "[c;d]"]);
        assert!(matches!(result, Err(WPathError::MultipleCoordinateGroups(_))));
    }

    #[test]
    fn test_table_coordinate_parse() {
        let only_x = TableCoordinate::parse("[ Total ]").unwrap();
        assert_eq!(only_x.x.as_deref(), Some("Total"));
        assert!(only_x.y.is_none());

        let only_y = TableCoordinate::parse("[;Qty]").unwrap();
        assert!(only_y.x.is_none());
        assert_eq!(only_y.y_pattern().unwrap(), "Qty");

        let no_y = TableCoordinate::parse("[Total;]").unwrap();
        assert!(no_y.y.is_none());

        assert!(TableCoordinate::parse("[a;b;c]").is_err());
        assert!(TableCoordinate::parse("a;b").is_err());
        assert_eq!(TableCoordinate::parse("[a;b]").unwrap().to_string(), "[a;b]");
    }
}
