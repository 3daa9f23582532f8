//! Algorithms for determining a [MIMEType] from the first few bytes in a file

use crate::{sniff_tables::IMAGE_SIGNATURES, MIMEType};

/// The number of bytes that are inspected when sniffing
///
/// <https://mimesniff.spec.whatwg.org/#reading-the-resource-header>
pub(crate) const RESOURCE_HEADER_LENGTH: usize = 1445;

/// <https://mimesniff.spec.whatwg.org/#image-type-pattern-matching-algorithm>
#[must_use]
pub fn identify_image_type(resource_header: &[u8]) -> Option<MIMEType> {
    IMAGE_SIGNATURES
        .iter()
        .find(|signature| signature.matches(resource_header))
        .map(|signature| MIMEType::new(signature.computed_mime.0, signature.computed_mime.1))
}

/// A reduced version of <https://mimesniff.spec.whatwg.org/#rules-for-identifying-an-unknown-mime-type>
///
/// Only images are recognized by their signature, everything else is classified as either
/// plain text or opaque binary data.
#[must_use]
pub(crate) fn identify_unknown_mime_type(resource_header: &[u8]) -> MIMEType {
    if let Some(image_type) = identify_image_type(resource_header) {
        return image_type;
    }

    if !resource_header.iter().copied().any(is_binary_data_byte) {
        return MIMEType::new("text", "plain");
    }

    MIMEType::octet_stream()
}

/// <https://mimesniff.spec.whatwg.org/#binary-data-byte>
#[inline]
#[must_use]
pub fn is_binary_data_byte(byte: u8) -> bool {
    matches!(byte, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

    #[test]
    fn image_signatures() {
        assert_eq!(
            identify_image_type(PNG_HEADER),
            Some(MIMEType::new("image", "png"))
        );
        assert_eq!(
            identify_image_type(b"GIF89a\x01\x00"),
            Some(MIMEType::new("image", "gif"))
        );
        assert_eq!(
            identify_image_type(b"RIFF\x24\x00\x00\x00WEBPVP8 "),
            Some(MIMEType::new("image", "webp"))
        );
        assert_eq!(
            identify_image_type(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(MIMEType::new("image", "jpeg"))
        );

        // Too short to match the PNG signature
        assert_eq!(identify_image_type(&PNG_HEADER[..4]), None);
    }

    #[test]
    fn unknown_types() {
        assert_eq!(
            identify_unknown_mime_type(b"hello world\n"),
            MIMEType::new("text", "plain")
        );
        assert_eq!(
            identify_unknown_mime_type(&[0x01, 0x02, 0x03]),
            MIMEType::octet_stream()
        );
        assert_eq!(identify_unknown_mime_type(PNG_HEADER).essence(), "image/png");
    }
}
