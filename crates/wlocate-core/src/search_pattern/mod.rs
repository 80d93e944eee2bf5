//! DOS-style wildcard patterns with positional queries.
//!
//! `*` matches any sequence of characters and `?` any single character.
//! A backslash escapes `*`, `?` and itself; before any other character (or at
//! the end of the pattern) it stands for a literal backslash. Everything else
//! is matched literally, including characters that would be special in a
//! regular expression.
//!
//! Occurrences are shortest matches. A pattern that starts (ends) with an
//! unescaped `*` is "left-truncated" ("right-truncated"): its occurrences
//! reach to the start (end) of the searched string.
//!
//! Compiled patterns are cached process-wide, so compiling the same string
//! twice is cheap and yields equal patterns.
//!
//! # Example
//!
//! ```
//! use wlocate_core::search_pattern::SearchPattern;
//! use wlocate_core::find_spot::FindSpot;
//!
//! let pattern = SearchPattern::compile("M*t");
//! assert!(pattern.matches("Mut"));
//! assert_eq!(pattern.first_occurrence_in("Mutator"), FindSpot::new(0, 3));
//! assert_eq!(pattern.no_of_surrounding_chars_in("Mutator"), Some(4));
//! ```

mod dfa;

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::find_spot::FindSpot;
use dfa::{Dfa, Token};

/// An immutable, compiled wildcard pattern.
///
/// Cloning is cheap. Two patterns are equal when their original strings are
/// equal; a pattern also compares equal to its original string.
#[derive(Clone)]
pub struct SearchPattern {
    inner: Arc<Compiled>,
}

struct Compiled {
    original: String,
    kind: PatternKind,
}

enum PatternKind {
    /// Empty or only `*`: matches everything without evaluation.
    MatchAll,
    Automaton(Automaton),
}

struct Automaton {
    /// Accepts exactly the strings the pattern describes.
    full: Dfa,
    /// The pattern without leading and trailing `*`, used to locate spans.
    core: Dfa,
    open_start: bool,
    open_end: bool,
    min_length: usize,
}

/// Size and hit count of the process-wide pattern cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatistics {
    /// Number of distinct patterns compiled so far.
    pub entries: usize,
    /// Number of compile calls answered from the cache.
    pub hits: u64,
}

impl fmt::Display for CacheStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SearchPattern cache: {} entries, {} hits", self.entries, self.hits)
    }
}

#[derive(Default)]
struct PatternCache {
    patterns: HashMap<String, SearchPattern>,
    hits: u64,
}

fn cache() -> &'static Mutex<PatternCache> {
    static CACHE: OnceLock<Mutex<PatternCache>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(PatternCache::default()))
}

fn tokenize(wildcard: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut escaped = false;
    for c in wildcard.chars() {
        if escaped {
            escaped = false;
            match c {
                '*' | '?' | '\\' => tokens.push(Token::Literal(c)),
                _ => {
                    tokens.push(Token::Literal('\\'));
                    tokens.push(Token::Literal(c));
                }
            }
            continue;
        }
        match c {
            '*' => tokens.push(Token::AnyString),
            '?' => tokens.push(Token::AnyChar),
            '\\' => escaped = true,
            _ => tokens.push(Token::Literal(c)),
        }
    }
    if escaped {
        tokens.push(Token::Literal('\\'));
    }
    tokens
}

impl SearchPattern {
    /// Compiles a wildcard string, reusing a cached pattern when possible.
    pub fn compile(wildcard: &str) -> SearchPattern {
        {
            let mut cache = cache().lock();
            if let Some(pattern) = cache.patterns.get(wildcard).cloned() {
                cache.hits += 1;
                return pattern;
            }
        }

        let pattern = Self::build(wildcard);
        debug!(pattern = wildcard, "compiled search pattern");

        let mut cache = cache().lock();
        cache
            .patterns
            .entry(wildcard.to_string())
            .or_insert(pattern)
            .clone()
    }

    /// Joins all fragments with `*` and compiles the result.
    pub fn create_from_list<S: AsRef<str>>(nodes: &[S]) -> SearchPattern {
        Self::create_from_list_prefix(nodes, nodes.len())
    }

    /// Joins the first `count` fragments with `*` and compiles the result.
    pub fn create_from_list_prefix<S: AsRef<str>>(nodes: &[S], count: usize) -> SearchPattern {
        let joined = nodes
            .iter()
            .take(count)
            .map(|node| node.as_ref())
            .collect::<Vec<_>>()
            .join("*");
        Self::compile(&joined)
    }

    /// Current size and hit count of the compile cache.
    pub fn cache_statistics() -> CacheStatistics {
        let cache = cache().lock();
        CacheStatistics {
            entries: cache.patterns.len(),
            hits: cache.hits,
        }
    }

    fn build(wildcard: &str) -> SearchPattern {
        let tokens = tokenize(wildcard);
        let kind = if tokens.iter().all(|t| *t == Token::AnyString) {
            PatternKind::MatchAll
        } else {
            let first = tokens.iter().position(|t| *t != Token::AnyString).unwrap_or(0);
            let last = tokens
                .iter()
                .rposition(|t| *t != Token::AnyString)
                .unwrap_or(tokens.len() - 1);
            PatternKind::Automaton(Automaton {
                full: Dfa::from_tokens(&tokens),
                core: Dfa::from_tokens(&tokens[first..=last]),
                open_start: first > 0,
                open_end: last + 1 < tokens.len(),
                min_length: tokens.iter().filter(|t| **t != Token::AnyString).count(),
            })
        };
        SearchPattern {
            inner: Arc::new(Compiled {
                original: wildcard.to_string(),
                kind,
            }),
        }
    }

    /// The wildcard string this pattern was compiled from.
    pub fn original_string(&self) -> &str {
        &self.inner.original
    }

    /// True for the empty pattern and patterns made only of `*`.
    pub fn is_match_all(&self) -> bool {
        matches!(self.inner.kind, PatternKind::MatchAll)
    }

    /// Length of the shortest string this pattern accepts.
    pub fn min_length(&self) -> usize {
        match &self.inner.kind {
            PatternKind::MatchAll => 0,
            PatternKind::Automaton(a) => a.min_length,
        }
    }

    /// True if the whole string is accepted.
    pub fn matches(&self, s: &str) -> bool {
        match &self.inner.kind {
            PatternKind::MatchAll => true,
            PatternKind::Automaton(a) => {
                let chars: Vec<char> = s.chars().collect();
                chars.len() >= a.min_length && a.full.accepts(&chars)
            }
        }
    }

    /// True if some occurrence ends at the end of `s`.
    pub fn matches_at_end(&self, s: &str) -> bool {
        match &self.inner.kind {
            PatternKind::MatchAll => !s.is_empty(),
            PatternKind::Automaton(a) => {
                let chars: Vec<char> = s.chars().collect();
                if chars.is_empty() || chars.len() < a.min_length {
                    return false;
                }
                if a.open_end {
                    return a.find_from(&chars, 0).is_some();
                }
                (0..chars.len()).any(|begin| a.core.accepts(&chars[begin..]))
            }
        }
    }

    /// The leftmost occurrence in `s`.
    pub fn first_occurrence_in(&self, s: &str) -> FindSpot {
        self.first_occurrence_in_from(s, 0)
    }

    /// The leftmost occurrence in `s` starting at or after `from`.
    pub fn first_occurrence_in_from(&self, s: &str, from: usize) -> FindSpot {
        let chars: Vec<char> = s.chars().collect();
        match &self.inner.kind {
            PatternKind::MatchAll => {
                if from <= chars.len() {
                    FindSpot::new(from, from)
                } else {
                    FindSpot::NOT_FOUND
                }
            }
            PatternKind::Automaton(a) => {
                if chars.is_empty() || chars.len() < a.min_length {
                    return FindSpot::NOT_FOUND;
                }
                match a.find_from(&chars, from) {
                    Some((start, end)) => a.stretch(start, end, from, chars.len()),
                    None => FindSpot::NOT_FOUND,
                }
            }
        }
    }

    /// The rightmost occurrence in `s`.
    pub fn last_occurrence_in(&self, s: &str) -> FindSpot {
        let chars: Vec<char> = s.chars().collect();
        match &self.inner.kind {
            PatternKind::MatchAll => FindSpot::new(chars.len(), chars.len()),
            PatternKind::Automaton(a) => match a.find_last(&chars) {
                Some((start, end)) => a.stretch(start, end, 0, chars.len()),
                None => FindSpot::NOT_FOUND,
            },
        }
    }

    /// Characters before the first occurrence; 0 for left-truncated patterns.
    pub fn no_of_chars_before_first_occurrence_in(&self, s: &str) -> Option<usize> {
        self.no_of_chars_before_first_occurrence_in_after(s, 0)
    }

    /// Like [`Self::no_of_chars_before_first_occurrence_in`] on the suffix
    /// beginning at `start`, reported as an offset into the whole of `s`.
    pub fn no_of_chars_before_first_occurrence_in_after(&self, s: &str, start: usize) -> Option<usize> {
        let spot = self.first_occurrence_in_from(s, start);
        spot.is_found().then_some(spot.start)
    }

    /// Characters before the last occurrence; 0 for left-truncated patterns.
    pub fn no_of_chars_before_last_occurrence_in(&self, s: &str) -> Option<usize> {
        match &self.inner.kind {
            PatternKind::MatchAll => Some(0),
            PatternKind::Automaton(_) => {
                let spot = self.last_occurrence_in(s);
                spot.is_found().then_some(spot.start)
            }
        }
    }

    /// Characters before the last occurrence, ignoring a leading `*`.
    pub fn no_of_chars_before_last_shortest_occurrence_in(&self, s: &str) -> Option<usize> {
        match &self.inner.kind {
            PatternKind::MatchAll => Some(0),
            PatternKind::Automaton(a) => {
                let chars: Vec<char> = s.chars().collect();
                a.find_last(&chars).map(|(start, _)| start)
            }
        }
    }

    /// Characters after the last occurrence; 0 for right-truncated patterns.
    pub fn no_of_chars_after_last_occurrence_in(&self, s: &str) -> Option<usize> {
        let length = s.chars().count();
        match &self.inner.kind {
            PatternKind::MatchAll => Some(length),
            PatternKind::Automaton(_) => {
                let spot = self.last_occurrence_in(s);
                spot.is_found().then(|| length - spot.end)
            }
        }
    }

    /// Characters after the last occurrence, ignoring a trailing `*`.
    pub fn no_of_chars_after_last_shortest_occurrence_in(&self, s: &str) -> Option<usize> {
        match &self.inner.kind {
            PatternKind::MatchAll => Some(s.chars().count()),
            PatternKind::Automaton(a) => {
                let chars: Vec<char> = s.chars().collect();
                a.find_last(&chars).map(|(_, end)| chars.len() - end)
            }
        }
    }

    /// The deviation: the smallest number of characters of `s` left
    /// uncovered by any single occurrence.
    pub fn no_of_surrounding_chars_in(&self, s: &str) -> Option<usize> {
        match &self.inner.kind {
            PatternKind::MatchAll => Some(0),
            PatternKind::Automaton(a) => {
                let chars: Vec<char> = s.chars().collect();
                a.occurrences(&chars)
                    .into_iter()
                    .map(|(start, end)| chars.len() - a.stretch(start, end, 0, chars.len()).len())
                    .min()
            }
        }
    }

    /// The longest span covered by any single occurrence.
    pub fn no_of_matching_chars_in(&self, s: &str) -> Option<usize> {
        match &self.inner.kind {
            PatternKind::MatchAll => Some(s.chars().count()),
            PatternKind::Automaton(a) => {
                let chars: Vec<char> = s.chars().collect();
                a.occurrences(&chars)
                    .into_iter()
                    .map(|(start, end)| a.stretch(start, end, 0, chars.len()).len())
                    .max()
            }
        }
    }
}

impl Automaton {
    /// Leftmost shortest span of the core starting at or after `from`,
    /// tightened to the latest start that still ends at the same offset.
    fn find_from(&self, chars: &[char], from: usize) -> Option<(usize, usize)> {
        if chars.len() < self.min_length {
            return None;
        }
        for begin in from..chars.len() {
            if let Some(end) = self.core.shortest_end_from(chars, begin) {
                let start = ((begin + 1)..end)
                    .rev()
                    .find(|b| self.core.accepts(&chars[*b..end]))
                    .unwrap_or(begin);
                return Some((start, end));
            }
        }
        None
    }

    /// Rightmost start with any span of the core, with its shortest end.
    fn find_last(&self, chars: &[char]) -> Option<(usize, usize)> {
        if chars.len() < self.min_length {
            return None;
        }
        (0..chars.len())
            .rev()
            .find_map(|begin| self.core.shortest_end_from(chars, begin).map(|end| (begin, end)))
    }

    /// Every occurrence, each search resuming one past the previous start.
    fn occurrences(&self, chars: &[char]) -> Vec<(usize, usize)> {
        let mut found = Vec::new();
        let mut from = 0;
        while let Some((start, end)) = self.find_from(chars, from) {
            found.push((start, end));
            from = start + 1;
        }
        found
    }

    fn stretch(&self, start: usize, end: usize, lower: usize, upper: usize) -> FindSpot {
        let start = if self.open_start { lower.min(start) } else { start };
        let end = if self.open_end { upper } else { end };
        FindSpot::new(start, end)
    }
}

impl fmt::Debug for SearchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchPattern")
            .field("original", &self.inner.original)
            .field("match_all", &self.is_match_all())
            .finish()
    }
}

impl fmt::Display for SearchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.original)
    }
}

impl PartialEq for SearchPattern {
    fn eq(&self, other: &Self) -> bool {
        self.inner.original == other.inner.original
    }
}

impl Eq for SearchPattern {}

impl PartialEq<str> for SearchPattern {
    fn eq(&self, other: &str) -> bool {
        self.inner.original == other
    }
}

impl PartialEq<&str> for SearchPattern {
    fn eq(&self, other: &&str) -> bool {
        self.inner.original == *other
    }
}

impl Hash for SearchPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.original.hash(state);
    }
}

impl Serialize for SearchPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner.original)
    }
}
