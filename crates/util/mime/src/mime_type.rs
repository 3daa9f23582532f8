use std::{fmt, str::FromStr};

/// <https://mimesniff.spec.whatwg.org/#http-token-code-point>
#[inline]
fn is_http_token_code_point(c: char) -> bool {
    matches!(c, '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`' | '|' | '~' | 'a'..='z' | 'A'..='Z' | '0'..='9')
}

/// <https://fetch.spec.whatwg.org/#http-whitespace>
const HTTP_WHITESPACE: &[char] = &['\t', '\n', '\r', ' '];

/// <https://mimesniff.spec.whatwg.org/#mime-type>
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MIMEType {
    /// <https://mimesniff.spec.whatwg.org/#type>
    pub mime_type: String,

    /// <https://mimesniff.spec.whatwg.org/#subtype>
    pub mime_subtype: String,

    /// <https://mimesniff.spec.whatwg.org/#parameters>
    ///
    /// Kept in insertion order, names are unique.
    pub parameters: Vec<(String, String)>,
}

/// Errors that can occur while parsing a [MIMEType]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MIMEParseError {
    NoSubType,
    TypeContainsNonHTTPCodePoint,
    SubTypeContainsNonHTTPCodePoint,
    EmptyType,
    EmptySubType,
}

impl MIMEType {
    #[must_use]
    pub fn new(mime_type: &str, mime_subtype: &str) -> Self {
        Self {
            mime_type: mime_type.to_ascii_lowercase(),
            mime_subtype: mime_subtype.to_ascii_lowercase(),
            parameters: vec![],
        }
    }

    /// `application/octet-stream`, the type of a resource whose contents are opaque
    #[must_use]
    pub fn octet_stream() -> Self {
        Self::new("application", "octet-stream")
    }

    /// <https://mimesniff.spec.whatwg.org/#mime-type-essence>
    #[must_use]
    pub fn essence(&self) -> String {
        format!("{}/{}", self.mime_type, self.mime_subtype)
    }

    /// <https://mimesniff.spec.whatwg.org/#image-mime-type>
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime_type == "image"
    }

    #[must_use]
    pub fn is_octet_stream(&self) -> bool {
        self.mime_type == "application" && self.mime_subtype == "octet-stream"
    }

    /// Whether this is one of the placeholder types servers send when they don't know better
    ///
    /// Resources with such a type are treated as if they had no type at all.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(
            (self.mime_type.as_str(), self.mime_subtype.as_str()),
            ("unknown", "unknown") | ("application", "unknown") | ("*", "*")
        )
    }
}

impl fmt::Display for MIMEType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.mime_type, self.mime_subtype)?;

        for (name, value) in &self.parameters {
            write!(f, ";{name}={value}")?;
        }

        Ok(())
    }
}

impl FromStr for MIMEType {
    type Err = MIMEParseError;

    /// <https://mimesniff.spec.whatwg.org/#parse-a-mime-type>
    ///
    /// Quoted parameter values are taken up to the next quote, escapes inside them are not
    /// processed.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim_matches(HTTP_WHITESPACE);

        let (mime_type, rest) = input.split_once('/').ok_or(MIMEParseError::NoSubType)?;

        if mime_type.is_empty() {
            return Err(MIMEParseError::EmptyType);
        }
        if !mime_type.chars().all(is_http_token_code_point) {
            return Err(MIMEParseError::TypeContainsNonHTTPCodePoint);
        }

        let (mime_subtype, mut rest) = rest.split_once(';').unwrap_or((rest, ""));
        let mime_subtype = mime_subtype.trim_end_matches(HTTP_WHITESPACE);

        if mime_subtype.is_empty() {
            return Err(MIMEParseError::EmptySubType);
        }
        if !mime_subtype.chars().all(is_http_token_code_point) {
            return Err(MIMEParseError::SubTypeContainsNonHTTPCodePoint);
        }

        let mut mime = Self::new(mime_type, mime_subtype);

        while !rest.is_empty() {
            rest = rest.trim_start_matches(HTTP_WHITESPACE);

            let Some(name_end) = rest.find(['=', ';']) else {
                break;
            };

            if rest[name_end..].starts_with(';') {
                rest = &rest[name_end + 1..];
                continue;
            }

            let name = rest[..name_end].to_ascii_lowercase();
            rest = &rest[name_end + 1..];

            let value = if let Some(quoted) = rest.strip_prefix('"') {
                let (value, after_quote) = quoted.split_once('"').unwrap_or((quoted, ""));
                rest = after_quote.split_once(';').map_or("", |(_, tail)| tail);
                value
            } else {
                let (value, tail) = rest.split_once(';').unwrap_or((rest, ""));
                rest = tail;

                let value = value.trim_end_matches(HTTP_WHITESPACE);
                if value.is_empty() {
                    continue;
                }
                value
            };

            let is_new = !mime.parameters.iter().any(|(key, _)| *key == name);
            if is_new
                && !name.is_empty()
                && name.chars().all(is_http_token_code_point)
                && value.chars().all(is_http_token_code_point)
            {
                mime.parameters.push((name, value.to_string()));
            }
        }

        Ok(mime)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{MIMEParseError, MIMEType};

    #[test]
    fn invalid_mime_type() {
        assert_eq!(MIMEType::from_str("image"), Err(MIMEParseError::NoSubType));
        assert_eq!(MIMEType::from_str("/png"), Err(MIMEParseError::EmptyType));
        assert_eq!(
            MIMEType::from_str("image/"),
            Err(MIMEParseError::EmptySubType)
        );
        assert_eq!(
            MIMEType::from_str("ima ge/png"),
            Err(MIMEParseError::TypeContainsNonHTTPCodePoint)
        );
        assert_eq!(
            MIMEType::from_str("image/p@ng"),
            Err(MIMEParseError::SubTypeContainsNonHTTPCodePoint)
        );
    }

    #[test]
    fn essence_is_lowercase() {
        let mime = MIMEType::from_str("  Application/Octet-Stream  ").unwrap();
        assert_eq!(mime.essence(), "application/octet-stream");
        assert!(mime.is_octet_stream());
    }

    #[test]
    fn parameters() {
        let mime = MIMEType::from_str("text/plain; charset=UTF-8;;format=\"flowed\"").unwrap();
        assert_eq!(mime.essence(), "text/plain");
        assert_eq!(
            mime.parameters,
            vec![
                ("charset".to_string(), "UTF-8".to_string()),
                ("format".to_string(), "flowed".to_string())
            ]
        );

        // Later duplicates are ignored
        let mime = MIMEType::from_str("text/plain;charset=a;charset=b").unwrap();
        assert_eq!(mime.parameters, vec![("charset".to_string(), "a".to_string())]);
        assert_eq!(mime.to_string(), "text/plain;charset=a");
    }

    #[test]
    fn classification() {
        assert!(MIMEType::new("image", "png").is_image());
        assert!(MIMEType::new("image", "svg+xml").is_image());
        assert!(MIMEType::new("unknown", "unknown").is_unknown());
        assert!(!MIMEType::new("text", "html").is_unknown());
    }
}
