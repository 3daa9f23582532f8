//! <https://dom.spec.whatwg.org/>

pub mod dom_objects;

pub use dom_objects::{
    Document, HtmlObjectElement, ObjectLayoutBox, RepresentationMode, RepresentationStep,
    ResourceState, RunGeneration,
};

/// Identifies an element within its [BrowsingContext](crate::BrowsingContext)
///
/// Ids are never reused, not even after the element was removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }
}
