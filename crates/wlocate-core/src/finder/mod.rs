//! Finders: locator in, ranked candidates out.
//!
//! Every finder walks the visible elements of one [`PageIndex`] and collects
//! [`Entry`]s into a [`WeightedControlList`]. The identifier-based finders fan
//! the work out to a [`WorkerPool`], one job per candidate element and
//! identifier, and fold the results once every job has finished.
//!
//! [`ControlFinder`] is the facade callers use: it owns the index and the
//! pool and routes each kind of lookup to its finder.
//!
//! # Example
//!
//! ```
//! use wlocate_core::config::FinderConfig;
//! use wlocate_core::element::{Document, Element};
//! use wlocate_core::finder::ControlFinder;
//! use wlocate_core::wpath::WPath;
//!
//! let document = Document::new(
//!     Element::new("html").child(
//!         Element::new("body")
//!             .text("Username")
//!             .child(Element::new("input").attr("id", "user")),
//!     ),
//! );
//! let finder = ControlFinder::new(&document, FinderConfig::default()).unwrap();
//! let found = finder.all_settables(&WPath::new(["Username"]).unwrap()).unwrap();
//! let best = found.resolve("Username").unwrap().best;
//! assert_eq!(finder.index().element(best.control.element).id(), Some("user"));
//! ```

mod identifier_based;
mod pool;
mod settable;
mod unknown;

pub use identifier_based::{IdentifierBasedFinder, ListenerFallback};
pub use pool::WorkerPool;
pub use settable::SettableFinder;
pub use unknown::UnknownFinder;

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::config::FinderConfig;
use crate::element::{Document, MouseAction};
use crate::identifier::{Control, ControlKind, Identifier};
use crate::page_index::PageIndex;
use crate::ranking::{Entry, MatchKind, Priorities, WeightedControlList};
use crate::wpath::WPath;

/// Faults that abort a find. "Nothing found" is an empty list, not an error.
#[derive(Error, Debug)]
pub enum FindError {
    /// A matcher failed while inspecting an element.
    #[error("Matcher '{matcher}' failed on element [{element}]: {message}")]
    MatcherFault {
        matcher: String,
        element: String,
        message: String,
    },

    /// A worker task died outside of any matcher.
    #[error("Worker task panicked: {0}")]
    TaskPanicked(String),

    /// The worker pool could not be started.
    #[error("Could not start worker pool: {0}")]
    Runtime(#[from] std::io::Error),

    /// The worker pool has already been shut down.
    #[error("Worker pool is shut down")]
    PoolShutDown,
}

/// Strategy producing ranked candidates for a locator.
pub trait Finder {
    fn name(&self) -> &'static str;

    fn find(&self, wpath: &WPath) -> Result<WeightedControlList, FindError>;
}

/// What every finder shares within one page snapshot.
#[derive(Debug, Clone)]
pub struct FindContext {
    pub index: Arc<PageIndex>,
    pub pool: Arc<WorkerPool>,
    pub priorities: Arc<Priorities>,
}

impl FindContext {
    pub fn new(index: Arc<PageIndex>, pool: Arc<WorkerPool>, priorities: Priorities) -> Self {
        Self {
            index,
            pool,
            priorities: Arc::new(priorities),
        }
    }

    /// An empty list ranked with this context's priorities.
    pub fn new_list(&self) -> WeightedControlList {
        WeightedControlList::with_priorities(Arc::clone(&self.priorities))
    }
}

/// Entry point for all lookups on one document snapshot.
#[derive(Debug)]
pub struct ControlFinder {
    context: FindContext,
    config: FinderConfig,
}

impl ControlFinder {
    /// Indexes the document and starts a pool sized by the configuration.
    pub fn new(document: &Document, config: FinderConfig) -> Result<Self, FindError> {
        let pool = WorkerPool::new(config.effective_worker_threads())?;
        Ok(Self::with_pool(
            Arc::new(PageIndex::new(document)),
            Arc::new(pool),
            config,
        ))
    }

    /// Uses an existing pool, e.g. one shared between snapshots.
    pub fn with_pool(index: Arc<PageIndex>, pool: Arc<WorkerPool>, config: FinderConfig) -> Self {
        let priorities = config.priorities();
        Self {
            context: FindContext::new(index, pool, priorities),
            config,
        }
    }

    pub fn index(&self) -> &PageIndex {
        &self.context.index
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    pub fn context(&self) -> &FindContext {
        &self.context
    }

    pub fn all_settables(&self, wpath: &WPath) -> Result<WeightedControlList, FindError> {
        self.run(&SettableFinder::new(self.context.clone()), wpath)
    }

    pub fn all_clickables(&self, wpath: &WPath) -> Result<WeightedControlList, FindError> {
        self.run(&IdentifierBasedFinder::clickables(self.context.clone()), wpath)
    }

    pub fn all_selectables(&self, wpath: &WPath) -> Result<WeightedControlList, FindError> {
        let finder = IdentifierBasedFinder::new("SelectableFinder", self.context.clone(), Identifier::SELECTABLES);
        self.run(&finder, wpath)
    }

    pub fn all_deselectables(&self, wpath: &WPath) -> Result<WeightedControlList, FindError> {
        let finder =
            IdentifierBasedFinder::new("DeselectableFinder", self.context.clone(), Identifier::DESELECTABLES);
        self.run(&finder, wpath)
    }

    pub fn all_other_controls(&self, wpath: &WPath) -> Result<WeightedControlList, FindError> {
        let finder = IdentifierBasedFinder::new("OtherControlsFinder", self.context.clone(), Identifier::OTHERS);
        self.run(&finder, wpath)
    }

    /// Elements no identifier claims, found by id or by their text.
    pub fn all_controls_for_text(&self, wpath: &WPath) -> Result<WeightedControlList, FindError> {
        let finder = UnknownFinder::new(self.context.clone(), self.config.unknown_fallback);
        self.run(&finder, wpath)
    }

    pub fn all_for_mouse_action(&self, wpath: &WPath, action: MouseAction) -> Result<WeightedControlList, FindError> {
        self.run(&IdentifierBasedFinder::for_mouse_action(self.context.clone(), action), wpath)
    }

    fn run(&self, finder: &dyn Finder, wpath: &WPath) -> Result<WeightedControlList, FindError> {
        if let Some(page) = self.page_target(wpath) {
            debug!(locator = %wpath, "page target");
            return Ok(page);
        }
        let found = finder.find(wpath)?;
        debug!(finder = finder.name(), locator = %wpath, found = found.len(), "find finished");
        Ok(found)
    }

    /// The body element if the locator is exactly the page pseudo-target.
    fn page_target(&self, wpath: &WPath) -> Option<WeightedControlList> {
        match wpath.raw_path() {
            [only] if *only == self.config.page_target => {}
            _ => return None,
        }
        let index = &self.context.index;
        let body = index.body()?;
        let mut list = self.context.new_list();
        list.add(
            Entry::new(
                Control::new(body, ControlKind::Page),
                MatchKind::ById,
                0,
                0,
                index.position(body).start,
                index.hierarchy(body),
                index.index(body),
            )
            .with_description("page"),
        );
        Some(list)
    }
}
