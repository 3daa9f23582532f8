//! Decides how the resource behind an `<object>` element should be represented
//!
//! <https://html.spec.whatwg.org/multipage/iframe-embed-object.html#the-object-element>

use std::fmt;

use http::{Header, Headers};
use mime::MIMEType;

/// The resource type of content whose type could not be determined
pub const UNKNOWN: &str = "unknown";

/// The type that was chosen for a fetched resource
///
/// This is usually a MIME type, taken verbatim from wherever it was found.
/// [UNKNOWN] is used when nothing usable could be found.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceType(String);

/// How a resource of a given [ResourceType] is represented
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceHandler {
    Image,

    /// Anything that is not an image would be rendered in a nested browsing context
    NestedBrowsingContext,

    Fallback,
}

impl ResourceType {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn unknown() -> Self {
        Self(UNKNOWN.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        starts_with_image(&self.0)
    }

    /// Picks the handler for this type
    ///
    /// Image types are only handled as images if `images_enabled` is set.
    #[must_use]
    pub fn handler(&self, images_enabled: bool) -> ResourceHandler {
        if self.is_unknown() {
            ResourceHandler::Fallback
        } else if self.is_image() {
            if images_enabled {
                ResourceHandler::Image
            } else {
                ResourceHandler::Fallback
            }
        } else {
            ResourceHandler::NestedBrowsingContext
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Determines the resource type of a fetched resource
///
/// * `declared_type` is the value of the element's `type` attribute
/// * `headers` are the headers the resource was transferred with, if any
/// * `computed_type` is the type that was sniffed from the resource's contents
///
/// If `obey_content_type` is set, a `Content-Type` header is always taken at face value.
#[must_use]
pub fn determine_resource_type(
    declared_type: Option<&str>,
    headers: Option<&Headers>,
    computed_type: &str,
    obey_content_type: bool,
) -> ResourceType {
    let content_type = headers.and_then(|headers| headers.get(&Header::CONTENT_TYPE));

    if let Some(content_type) = content_type {
        if obey_content_type {
            return ResourceType::new(content_type);
        }

        if !is_octet_stream(content_type) {
            return ResourceType::new(content_type);
        }

        // The server claims the content is binary, trust the element instead
        // if it says that this is an image
        return match declared_type {
            Some(declared_type)
                if !declared_type.is_empty()
                    && !is_octet_stream(declared_type)
                    && starts_with_image(declared_type) =>
            {
                ResourceType::new(declared_type)
            },
            _ => ResourceType::unknown(),
        };
    }

    let tentative_type = match declared_type {
        Some(declared_type) if !declared_type.is_empty() => declared_type,
        _ => computed_type,
    };

    if is_octet_stream(tentative_type) {
        ResourceType::unknown()
    } else {
        ResourceType::new(tentative_type)
    }
}

fn is_octet_stream(value: &str) -> bool {
    match value.parse::<MIMEType>() {
        Ok(mime_type) => mime_type.is_octet_stream(),
        Err(_) => value.trim().eq_ignore_ascii_case("application/octet-stream"),
    }
}

fn starts_with_image(value: &str) -> bool {
    value
        .trim_start()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}
