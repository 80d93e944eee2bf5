//! The base strategy: run a fixed set of identifiers over every visible
//! element, optionally falling back to listener-based identification for
//! elements none of them supports.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, error, trace};

use crate::element::{ElementKind, MouseAction};
use crate::identifier::{Identifier, PreparedIdentifier};
use crate::page_index::{ElementId, PageIndex};
use crate::ranking::{Entry, WeightedControlList};
use crate::wpath::WPath;

use super::{FindContext, FindError, Finder};

/// Extra tier for elements none of the finder's identifiers supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerFallback {
    /// Elements with a click listener, matched by text, title, aria-label
    /// or id.
    Click,
    /// Elements listening to the action, matched by their own identifier,
    /// else like [`ListenerFallback::Click`]. A label counts as listening if
    /// the control it points at does.
    MouseAction(MouseAction),
}

/// Finds controls through a fixed list of identifiers.
#[derive(Debug, Clone)]
pub struct IdentifierBasedFinder {
    name: &'static str,
    context: FindContext,
    identifiers: &'static [Identifier],
    fallback: Option<ListenerFallback>,
}

/// One unit of work: an element and the identifier to run on it.
#[derive(Debug, Clone, Copy)]
struct Job {
    element: ElementId,
    identifier: Identifier,
}

impl IdentifierBasedFinder {
    pub fn new(name: &'static str, context: FindContext, identifiers: &'static [Identifier]) -> Self {
        Self {
            name,
            context,
            identifiers,
            fallback: None,
        }
    }

    /// Clickable controls plus anything carrying a click listener.
    pub fn clickables(context: FindContext) -> Self {
        Self::new("ClickableFinder", context, Identifier::CLICKABLES).with_fallback(ListenerFallback::Click)
    }

    /// Clickable controls plus anything listening to `action`.
    pub fn for_mouse_action(context: FindContext, action: MouseAction) -> Self {
        Self::new("MouseActionFinder", context, Identifier::CLICKABLES)
            .with_fallback(ListenerFallback::MouseAction(action))
    }

    pub fn with_fallback(mut self, fallback: ListenerFallback) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn context(&self) -> &FindContext {
        &self.context
    }

    pub fn identifiers(&self) -> &'static [Identifier] {
        self.identifiers
    }

    /// The jobs for one element; empty if nothing supports it.
    fn plan(&self, index: &PageIndex, element: ElementId, jobs: &mut Vec<Job>) {
        let before = jobs.len();
        for identifier in self.identifiers {
            if identifier.supports(index, element) {
                jobs.push(Job {
                    element,
                    identifier: *identifier,
                });
            }
        }
        let supported = jobs.len() > before;

        match self.fallback {
            None => {}
            Some(ListenerFallback::Click) => {
                if !supported && index.has_click_listener(element) {
                    jobs.push(Job {
                        element,
                        identifier: Identifier::Unspecific,
                    });
                }
            }
            Some(ListenerFallback::MouseAction(action)) => {
                if !is_listening(index, element, action) {
                    return;
                }
                let own = owning_identifier(index, element).filter(|identifier| identifier.supports(index, element));
                let identifier = match own {
                    Some(identifier) if jobs[before..].iter().all(|job| job.identifier != identifier) => identifier,
                    None if !supported => Identifier::Unspecific,
                    _ => return,
                };
                jobs.push(Job { element, identifier });
            }
        }
    }

    fn prepare(&self, index: &PageIndex, wpath: &WPath, jobs: &[Job]) -> Vec<(Identifier, PreparedIdentifier)> {
        let mut prepared: Vec<(Identifier, PreparedIdentifier)> = Vec::new();
        for job in jobs {
            if !prepared.iter().any(|(identifier, _)| *identifier == job.identifier) {
                prepared.push((job.identifier, job.identifier.prepare(index, wpath)));
            }
        }
        prepared
    }
}

impl Finder for IdentifierBasedFinder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn find(&self, wpath: &WPath) -> Result<WeightedControlList, FindError> {
        let index = &self.context.index;

        let mut jobs = Vec::new();
        for element in index.visible_elements() {
            self.plan(index, *element, &mut jobs);
        }
        let prepared = Arc::new(self.prepare(index, wpath, &jobs));
        debug!(finder = self.name, locator = %wpath, jobs = jobs.len(), "identifying");

        let tasks: Vec<_> = jobs
            .into_iter()
            .map(|job| {
                let index = Arc::clone(&self.context.index);
                let prepared = Arc::clone(&prepared);
                move || {
                    let identifier = prepared
                        .iter()
                        .find(|(identifier, _)| *identifier == job.identifier)
                        .map(|(_, prepared)| prepared);
                    match identifier {
                        Some(identifier) => run_identifier(&index, identifier, job.element),
                        None => Ok(Vec::new()),
                    }
                }
            })
            .collect();

        let mut found = self.context.new_list();
        for entries in self.context.pool.run(tasks)? {
            found.extend(entries);
        }
        Ok(found)
    }
}

/// Runs one identifier on one element; a panic becomes a [`FindError`].
fn run_identifier(index: &PageIndex, prepared: &PreparedIdentifier, element: ElementId) -> Result<Vec<Entry>, FindError> {
    match panic::catch_unwind(AssertUnwindSafe(|| prepared.identify(index, element))) {
        Ok(entries) => {
            for entry in &entries {
                trace!(identifier = prepared.identifier().name(), candidate = %entry, "match");
            }
            Ok(entries)
        }
        Err(payload) => {
            let fault = FindError::MatcherFault {
                matcher: prepared.identifier().name().to_string(),
                element: index.describe(element),
                message: panic_message(payload.as_ref()),
            };
            error!(error = %fault, "identifier failed");
            Err(fault)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// True if the element, or the control a label points at, listens to
/// `action`.
fn is_listening(index: &PageIndex, element: ElementId, action: MouseAction) -> bool {
    if index.has_mouse_action_listener(element, action) {
        return true;
    }
    index.kind(element) == ElementKind::Label
        && index
            .labeled_element(element)
            .is_some_and(|labeled| index.has_mouse_action_listener(labeled, action))
}

/// The identifier for the element's own control kind; for labels the one of
/// the labeled control.
fn owning_identifier(index: &PageIndex, element: ElementId) -> Option<Identifier> {
    let kind = match index.kind(element) {
        ElementKind::Label => index.kind(index.labeled_element(element)?),
        kind => kind,
    };
    Identifier::ALL
        .iter()
        .copied()
        .find(|identifier| identifier.targets().is_some_and(|targets| targets.contains(&kind)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FinderConfig;
    use crate::element::{Document, Element};
    use crate::finder::WorkerPool;
    use crate::identifier::ControlKind;
    use crate::ranking::MatchKind;

    fn context(body: Element) -> FindContext {
        let index = PageIndex::new(&Document::new(Element::new("html").child(body)));
        FindContext::new(
            Arc::new(index),
            Arc::new(WorkerPool::new(2).unwrap()),
            FinderConfig::default().priorities(),
        )
    }

    fn element(context: &FindContext, id: &str) -> ElementId {
        context.index.element_by_id(id).unwrap()
    }

    #[test]
    fn test_two_submit_buttons_tie() {
        let context = context(
            Element::new("body")
                .child(Element::new("input").attr("type", "submit").attr("id", "first").attr("value", "Submit"))
                .child(Element::new("input").attr("type", "submit").attr("id", "second").attr("value", "Submit")),
        );
        let found = IdentifierBasedFinder::clickables(context.clone())
            .find(&WPath::new(["Submit"]).unwrap())
            .unwrap();
        let sorted = found.sorted();
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted[0].control.element, element(&context, "first"));
        assert!(sorted[0].ties_with(&sorted[1]));

        let resolution = found.resolve("Submit").unwrap();
        assert!(resolution.is_ambiguous());
    }

    #[test]
    fn test_click_listener_fallback() {
        let context = context(
            Element::new("body")
                .child(Element::new("span").attr("id", "plain").text("Open"))
                .child(
                    Element::new("div")
                        .attr("id", "active")
                        .listener(MouseAction::Click)
                        .text("Open"),
                ),
        );
        let wpath = WPath::new(["Open"]).unwrap();
        let found = IdentifierBasedFinder::clickables(context.clone()).find(&wpath).unwrap();
        assert_eq!(found.len(), 1);
        let entry = &found.sorted()[0];
        assert_eq!(entry.control.element, element(&context, "active"));
        assert_eq!(entry.control.kind, ControlKind::Unspecific);

        let without = IdentifierBasedFinder::new("plain", context, Identifier::CLICKABLES)
            .find(&wpath)
            .unwrap();
        assert!(without.is_empty());
    }

    #[test]
    fn test_mouse_action_own_identifier() {
        let context = context(
            Element::new("body")
                .text("Hover")
                .child(Element::new("input").attr("id", "field").listener(MouseAction::MouseOver)),
        );
        let found = IdentifierBasedFinder::for_mouse_action(context.clone(), MouseAction::MouseOver)
            .find(&WPath::new(["Hover"]).unwrap())
            .unwrap();
        let best = &found.sorted()[0];
        assert_eq!(best.control.element, element(&context, "field"));
        assert_eq!(best.control.kind, ControlKind::TextField);

        let other_action = IdentifierBasedFinder::for_mouse_action(context, MouseAction::DoubleClick)
            .find(&WPath::new(["Hover"]).unwrap())
            .unwrap();
        assert!(other_action.is_empty());
    }

    #[test]
    fn test_mouse_action_through_label() {
        let context = context(
            Element::new("body")
                .child(Element::new("label").attr("id", "l").attr("for", "field").text("Name"))
                .child(Element::new("input").attr("id", "field").listener(MouseAction::MouseOver)),
        );
        let found = IdentifierBasedFinder::for_mouse_action(context.clone(), MouseAction::MouseOver)
            .find(&WPath::new(["Name"]).unwrap())
            .unwrap();
        let by_label = found.sorted().into_iter().find(|e| e.kind == MatchKind::ByLabel).unwrap();
        assert_eq!(by_label.control.element, element(&context, "field"));
        assert_eq!(by_label.label, Some(element(&context, "l")));
    }

    #[test]
    fn test_missing_path_finds_nothing() {
        let context = context(Element::new("body").child(Element::new("a").attr("id", "link").text("Next")));
        let found = IdentifierBasedFinder::clickables(context)
            .find(&WPath::new(["Chapter 9", "Next"]).unwrap())
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
