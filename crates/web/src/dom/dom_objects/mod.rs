mod document;
mod html_object_element;

pub use document::Document;
pub use html_object_element::{
    HtmlObjectElement, ObjectLayoutBox, RepresentationMode, RepresentationStep, ResourceState,
    RunGeneration,
};
