//! HTTP vocabulary shared between the resource loader and its consumers
//!
//! [Specifications](https://developer.mozilla.org/en-US/docs/Web/HTTP/Resources_and_specifications)

mod headers;
mod status_code;

pub use headers::{DefinedHeader, Header, Headers};
pub use status_code::StatusCode;
