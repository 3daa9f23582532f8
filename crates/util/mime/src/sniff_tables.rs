//! Byte patterns used to recognize image formats.

/// A row of a mimesniff pattern table
///
/// <https://mimesniff.spec.whatwg.org/#pattern-matching-algorithm>
pub struct Signature {
    pub pattern: &'static [u8],
    pub mask: &'static [u8],
    pub computed_mime: (&'static str, &'static str),
}

impl Signature {
    /// The leading bytes of `input` equal `pattern` wherever `mask` is set
    #[must_use]
    pub fn matches(&self, input: &[u8]) -> bool {
        debug_assert_eq!(self.pattern.len(), self.mask.len());

        if input.len() < self.pattern.len() {
            return false;
        }

        self.pattern
            .iter()
            .zip(self.mask)
            .zip(input)
            .all(|((pattern, mask), byte)| byte & mask == *pattern)
    }
}

/// <https://mimesniff.spec.whatwg.org/#image-type-pattern-matching-algorithm>
pub const IMAGE_SIGNATURES: &[Signature] = &[
    // A Windows Icon signature.
    Signature {
        pattern: &[0x00, 0x00, 0x01, 0x00],
        mask: &[0xFF, 0xFF, 0xFF, 0xFF],
        computed_mime: ("image", "x-icon"),
    },
    // A Windows Cursor signature.
    Signature {
        pattern: &[0x00, 0x00, 0x02, 0x00],
        mask: &[0xFF, 0xFF, 0xFF, 0xFF],
        computed_mime: ("image", "x-icon"),
    },
    // The string "BM", a BMP signature.
    Signature {
        pattern: b"BM",
        mask: &[0xFF, 0xFF],
        computed_mime: ("image", "bmp"),
    },
    // The string "GIF87a", a GIF signature.
    Signature {
        pattern: b"GIF87a",
        mask: &[0xFF; 6],
        computed_mime: ("image", "gif"),
    },
    // The string "GIF89a", a GIF signature.
    Signature {
        pattern: b"GIF89a",
        mask: &[0xFF; 6],
        computed_mime: ("image", "gif"),
    },
    // The string "RIFF" followed by four bytes followed by the string "WEBPVP".
    Signature {
        pattern: b"RIFF\0\0\0\0WEBPVP",
        mask: &[
            0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        ],
        computed_mime: ("image", "webp"),
    },
    // An error-checking byte followed by the string "PNG" followed by CR LF SUB LF, the PNG signature.
    Signature {
        pattern: &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
        mask: &[0xFF; 8],
        computed_mime: ("image", "png"),
    },
    // The JPEG Start of Image marker followed by the indicator byte of another marker.
    Signature {
        pattern: &[0xFF, 0xD8, 0xFF],
        mask: &[0xFF, 0xFF, 0xFF],
        computed_mime: ("image", "jpeg"),
    },
];
