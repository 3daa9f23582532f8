//! <https://mimesniff.spec.whatwg.org/#resource>

use crate::{sniff, MIMEType};

/// Whether or not the user agent may guess the computed [MIMEType] of a resource
///
/// Corresponds to `X-Content-Type-Options: nosniff`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoSniff {
    Yes,
    #[default]
    No,
}

/// Type information associated with a fetched resource
#[derive(Clone, Debug)]
pub struct Metadata {
    /// <https://mimesniff.spec.whatwg.org/#supplied-mime-type>
    pub supplied_mime_type: Option<MIMEType>,

    /// <https://mimesniff.spec.whatwg.org/#computed-mime-type>
    pub computed_mime_type: MIMEType,

    pub no_sniff: NoSniff,
}

impl Metadata {
    /// Computes the metadata for a resource that was transferred with the given `Content-Type`
    /// value (or none at all)
    #[must_use]
    pub fn for_content_type(content_type: Option<&str>, no_sniff: NoSniff, data: &[u8]) -> Self {
        // A Content-Type that doesn't parse is as good as none
        let supplied_mime_type = content_type.and_then(|value| match value.parse() {
            Ok(mime_type) => Some(mime_type),
            Err(error) => {
                log::debug!("Ignoring invalid Content-Type {value:?}: {error:?}");
                None
            },
        });

        Self::with_supplied_mime_type(supplied_mime_type, no_sniff, data)
    }

    #[must_use]
    pub fn with_supplied_mime_type(
        supplied_mime_type: Option<MIMEType>,
        no_sniff: NoSniff,
        data: &[u8],
    ) -> Self {
        let computed_mime_type =
            determine_computed_mime_type(supplied_mime_type.as_ref(), no_sniff, data);

        Self {
            supplied_mime_type,
            computed_mime_type,
            no_sniff,
        }
    }
}

/// <https://mimesniff.spec.whatwg.org/#determining-the-computed-mime-type-of-a-resource>
///
/// The apache-bug check and the per-type sniffing steps are not implemented, a supplied
/// type is trusted as long as it is meaningful.
fn determine_computed_mime_type(
    supplied_mime_type: Option<&MIMEType>,
    no_sniff: NoSniff,
    data: &[u8],
) -> MIMEType {
    let resource_header = &data[..data.len().min(sniff::RESOURCE_HEADER_LENGTH)];

    match supplied_mime_type {
        Some(supplied) if !supplied.is_unknown() => supplied.clone(),
        Some(supplied) if no_sniff == NoSniff::Yes => supplied.clone(),
        _ => sniff::identify_unknown_mime_type(resource_header),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supplied_type_is_trusted() {
        let metadata = Metadata::for_content_type(Some("image/png"), NoSniff::No, b"plain text");
        assert_eq!(metadata.computed_mime_type.essence(), "image/png");
    }

    #[test]
    fn placeholder_type_is_sniffed() {
        let metadata = Metadata::for_content_type(Some("*/*"), NoSniff::No, b"GIF87a....");
        assert_eq!(metadata.computed_mime_type.essence(), "image/gif");

        let metadata = Metadata::for_content_type(Some("*/*"), NoSniff::Yes, b"GIF87a....");
        assert_eq!(metadata.computed_mime_type.essence(), "*/*");
    }

    #[test]
    fn missing_or_invalid_type_is_sniffed() {
        let metadata = Metadata::for_content_type(None, NoSniff::No, &[0x00, 0x01]);
        assert_eq!(metadata.computed_mime_type, MIMEType::octet_stream());

        let metadata = Metadata::for_content_type(Some("not a mime type"), NoSniff::No, b"text");
        assert!(metadata.supplied_mime_type.is_none());
        assert_eq!(metadata.computed_mime_type.essence(), "text/plain");
    }
}
