//! The parts of <https://html.spec.whatwg.org> that `<object>` elements need

mod image_loader;
mod object_type_detection;

pub use image_loader::{
    decode_image, DecodeCallback, DecodeOutcome, DecodeState, DecodedImage, ImageDecodeError,
    ImageDecoder, ImageRepresentationAdapter, ThreadedImageDecoder,
};
pub use object_type_detection::{determine_resource_type, ResourceHandler, ResourceType, UNKNOWN};
