//! Settable controls: text fields, password fields, text areas and file
//! inputs.

use crate::element::ElementKind;
use crate::identifier::{Control, ControlKind, Identifier};
use crate::ranking::{Entry, MatchKind, WeightedControlList};
use crate::wpath::WPath;

use super::{FindContext, FindError, Finder, IdentifierBasedFinder};

/// The settable identifiers, plus a shortcut for the empty locator: every
/// settable field of the page, nearest to the page start first.
#[derive(Debug, Clone)]
pub struct SettableFinder {
    inner: IdentifierBasedFinder,
}

impl SettableFinder {
    pub fn new(context: FindContext) -> Self {
        Self {
            inner: IdentifierBasedFinder::new("SettableFinder", context, Identifier::SETTABLES),
        }
    }

    fn all_fields(&self) -> WeightedControlList {
        let context = self.inner.context();
        let index = &context.index;
        let mut found = context.new_list();

        for element in index.visible_elements() {
            let kind = match index.kind(*element) {
                ElementKind::TextInput => ControlKind::TextField,
                ElementKind::PasswordInput => ControlKind::PasswordField,
                ElementKind::TextArea => ControlKind::TextArea,
                ElementKind::FileInput => ControlKind::FileField,
                _ => continue,
            };
            found.add(
                Entry::new(
                    Control::new(*element, kind),
                    MatchKind::ById,
                    0,
                    index.text_before(*element).chars().count(),
                    index.position(*element).start,
                    index.hierarchy(*element),
                    index.index(*element),
                )
                .with_description(index.describe(*element)),
            );
        }
        found
    }
}

impl Finder for SettableFinder {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn find(&self, wpath: &WPath) -> Result<WeightedControlList, FindError> {
        if wpath.is_empty() {
            return Ok(self.all_fields());
        }
        self.inner.find(wpath)
    }
}
