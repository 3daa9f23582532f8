//! <https://mimesniff.spec.whatwg.org/>
//!
//! Only the parts needed to classify fetched resources are implemented: parsing MIME types
//! and computing the type of a payload that arrived without usable type metadata.
//! Scriptable, audio/video and archive sniffing are not.

mod metadata;
mod mime_type;
mod sniff;
mod sniff_tables;

pub use metadata::{Metadata, NoSniff};
pub use mime_type::{MIMEParseError, MIMEType};
pub use sniff::{identify_image_type, is_binary_data_byte};
