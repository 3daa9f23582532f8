//! <https://www.rfc-editor.org/rfc/rfc9110#section-5>

use std::{collections::HashMap, fmt};

/// Thin wrapper around a [HashMap] to provide case-insensitive
/// key lookup, as is required for HTTP Headers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers {
    internal: HashMap<Header, String>,
}

impl Headers {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            internal: HashMap::with_capacity(capacity),
        }
    }

    #[must_use]
    pub fn get(&self, header: &Header) -> Option<&str> {
        self.internal.get(header).map(String::as_str)
    }

    /// Sets a header, replacing any previous value
    pub fn set(&mut self, header: Header, value: impl Into<String>) {
        self.internal.insert(header, value.into());
    }
}

impl<N: AsRef<str>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut headers = Self::default();
        for (name, value) in iter {
            headers.set(Header::from_name(name.as_ref()), value);
        }
        headers
    }
}

/// The name of a HTTP header
///
/// Names are compared case-insensitively.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Header {
    /// A header name with a predefined meaning
    Defined(DefinedHeader),

    /// A header whose meaning we don't understand, stored in lowercase
    ///
    /// Maybe the application layer knows more.
    Custom(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DefinedHeader {
    ContentType,
    ContentLength,
    UserAgent,
    XContentTypeOptions,
}

macro_rules! defined_headers {
    ($($name: literal => $header: ident,)*) => (
        impl Header {
            /// Looks up a header by name, ignoring ASCII case
            #[must_use]
            pub fn from_name(name: &str) -> Self {
                $(
                    if name.eq_ignore_ascii_case($name) {
                        return Self::Defined(DefinedHeader::$header);
                    }
                )*

                Self::Custom(name.to_ascii_lowercase())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $(
                        Self::Defined(DefinedHeader::$header) => $name,
                    )*
                    Self::Custom(name) => name.as_str(),
                }
            }
        }
    )
}

defined_headers!(
    "content-type" => ContentType,
    "content-length" => ContentLength,
    "user-agent" => UserAgent,
    "x-content-type-options" => XContentTypeOptions,
);

impl Header {
    /// The media type of the resource.
    ///
    /// [MDN](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Content-Type)
    pub const CONTENT_TYPE: Self = Self::Defined(DefinedHeader::ContentType);

    /// The size of the message body, in bytes.
    ///
    /// [MDN](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Content-Length)
    pub const CONTENT_LENGTH: Self = Self::Defined(DefinedHeader::ContentLength);

    /// [MDN](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/User-Agent)
    pub const USER_AGENT: Self = Self::Defined(DefinedHeader::UserAgent);

    /// Disables MIME type sniffing when set to `nosniff`.
    ///
    /// [MDN](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/X-Content-Type-Options)
    pub const X_CONTENT_TYPE_OPTIONS: Self = Self::Defined(DefinedHeader::XContentTypeOptions);
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
