//! [HTTP status codes](https://developer.mozilla.org/en-US/docs/Web/HTTP/Status)

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: Self = Self(200);
    pub const NOT_FOUND: Self = Self(404);

    #[must_use]
    pub const fn new(numeric: u16) -> Self {
        Self(numeric)
    }

    /// <https://fetch.spec.whatwg.org/#ok-status>
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self.0, 200..=299)
    }
}

impl From<u16> for StatusCode {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
