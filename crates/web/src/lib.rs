//! The representation of `<object>` elements
//!
//! An `<object>` element shows some external resource, chosen by its `data` attribute.
//! Whenever that attribute changes, the element runs the
//! [representation algorithm](https://html.spec.whatwg.org/multipage/iframe-embed-object.html#the-object-element):
//! the resource is fetched, its type is determined and the element ends up either showing
//! the resource as an image or falling back to its own children.
//!
//! None of this blocks. Fetches and image decodes report back through the [event
//! loop](event_loop::EventLoop) of the element's [BrowsingContext], which applies their
//! results in the order in which they arrived.

mod browsing_context;
pub mod dom;
pub mod event;
pub mod event_loop;
pub mod html;

#[cfg(test)]
pub(crate) mod testing;

pub use browsing_context::BrowsingContext;
