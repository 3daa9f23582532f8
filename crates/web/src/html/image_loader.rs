//! Turns fetched image data into pixels that can be painted
//!
//! Decoding happens off the main thread. The outcome is reported through a callback,
//! just like fetch completions are.

use std::{
    fmt,
    sync::{mpsc, Arc},
    thread,
};

use error_derive::Error;
use resourceloader::{CancellationToken, Resource};

/// Fully decoded image data, in RGBA8
///
/// Once decoded, the pixels are never modified again and can be shared freely.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ImageDecodeError {
    #[msg = "malformed or unsupported image data"]
    Decode(image::ImageError),

    #[msg = "resource contains no image data"]
    NoData,

    #[msg = "image decoder thread disconnected"]
    DecoderDisconnected,
}

pub type DecodeOutcome = Result<Arc<DecodedImage>, ImageDecodeError>;

/// Receives the outcome of a decode, exactly once
pub type DecodeCallback = Box<dyn FnOnce(DecodeOutcome) + Send>;

/// Something that can decode images
pub trait ImageDecoder {
    /// Starts decoding the data of `resource`
    ///
    /// Must not block. `on_settled` is called at most once, when decoding is done.
    /// Decodes whose `cancellation` token was cancelled before they started may be skipped.
    fn decode(
        &self,
        resource: Arc<Resource>,
        cancellation: CancellationToken,
        on_settled: DecodeCallback,
    );
}

struct DecodeRequest {
    resource: Arc<Resource>,
    cancellation: CancellationToken,
    on_settled: DecodeCallback,
}

/// Decodes images one after another on a single background thread
///
/// The thread exits once the decoder is dropped and the queued decodes are done.
pub struct ThreadedImageDecoder {
    sender: mpsc::Sender<DecodeRequest>,
}

impl ThreadedImageDecoder {
    /// # Panics
    ///
    /// Panics if the operating system refuses to create the thread.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();

        thread::Builder::new()
            .name("ImageDecoder".to_string())
            .spawn(move || run_decoder(receiver))
            .expect("Failed to spawn ImageDecoder thread");

        Self { sender }
    }
}

impl Default for ThreadedImageDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ThreadedImageDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadedImageDecoder").finish_non_exhaustive()
    }
}

impl ImageDecoder for ThreadedImageDecoder {
    fn decode(
        &self,
        resource: Arc<Resource>,
        cancellation: CancellationToken,
        on_settled: DecodeCallback,
    ) {
        let request = DecodeRequest {
            resource,
            cancellation,
            on_settled,
        };

        if let Err(error) = self.sender.send(request) {
            log::error!("Failed to schedule image decode: decoder thread disconnected");
            (error.0.on_settled)(Err(ImageDecodeError::DecoderDisconnected));
        }
    }
}

fn run_decoder(receiver: mpsc::Receiver<DecodeRequest>) {
    log::info!("Starting ImageDecoder thread");

    while let Ok(request) = receiver.recv() {
        if request.cancellation.is_cancelled() {
            log::debug!("Skipping decode that nobody is waiting for");
            continue;
        }

        (request.on_settled)(decode_image(request.resource.data()));
    }

    log::info!("ImageDecoder thread shutting down");
}

/// Decodes `data`, guessing the image format from its contents
pub fn decode_image(data: &[u8]) -> DecodeOutcome {
    if data.is_empty() {
        return Err(ImageDecodeError::NoData);
    }

    let image = image::load_from_memory(data)?.to_rgba8();
    let (width, height) = image.dimensions();
    log::debug!("Decoded {width}x{height} image");

    Ok(Arc::new(DecodedImage::new(width, height, image.into_raw())))
}

impl DecodedImage {
    /// # Panics
    ///
    /// Panics if `pixels` does not hold exactly `width * height` RGBA8 pixels.
    #[must_use]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        assert_eq!(pixels.len(), width as usize * height as usize * 4);

        Self {
            width,
            height,
            pixels,
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub enum DecodeState {
    Pending,
    Ready(Arc<DecodedImage>),
    Failed,
}

/// The image representation of an `<object>` element
///
/// Owns the fetched resource for as long as the element represents it.
#[derive(Debug)]
pub struct ImageRepresentationAdapter {
    resource: Arc<Resource>,
    state: DecodeState,
    cancellation: CancellationToken,
}

impl ImageRepresentationAdapter {
    /// Hands `resource` to `decoder`
    ///
    /// The adapter stays pending until the outcome reported to `on_settled` is passed
    /// to [Self::settle].
    #[must_use]
    pub fn create(
        resource: Arc<Resource>,
        decoder: &dyn ImageDecoder,
        on_settled: DecodeCallback,
    ) -> Self {
        let cancellation = CancellationToken::default();
        decoder.decode(resource.clone(), cancellation.clone(), on_settled);

        Self {
            resource,
            state: DecodeState::Pending,
            cancellation,
        }
    }

    /// Tells the decoder that the outcome is no longer needed
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    #[must_use]
    pub fn resource(&self) -> &Arc<Resource> {
        &self.resource
    }

    #[must_use]
    pub fn state(&self) -> &DecodeState {
        &self.state
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, DecodeState::Pending)
    }

    /// The decoded pixels, once decoding succeeded
    #[must_use]
    pub fn image(&self) -> Option<&Arc<DecodedImage>> {
        match &self.state {
            DecodeState::Ready(image) => Some(image),
            _ => None,
        }
    }

    /// Records the outcome of the decode
    ///
    /// Only the first outcome is applied, later ones are ignored.
    pub fn settle(&mut self, outcome: DecodeOutcome) -> Result<(), ImageDecodeError> {
        if !self.is_pending() {
            log::debug!("Ignoring decode outcome for an image that already settled");
            return Ok(());
        }

        match outcome {
            Ok(image) => {
                self.state = DecodeState::Ready(image);
                Ok(())
            },
            Err(error) => {
                self.state = DecodeState::Failed;
                Err(error)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::testing;

    #[test]
    fn decode_png() {
        let image = decode_image(&testing::png_bytes(3, 2)).unwrap();

        assert_eq!(image.width(), 3);
        assert_eq!(image.height(), 2);
        assert_eq!(image.pixels().len(), 3 * 2 * 4);
        assert_eq!(&image.pixels()[..4], &testing::PNG_COLOR);
    }

    #[test]
    fn decode_garbage() {
        assert!(matches!(
            decode_image(b"definitely not an image"),
            Err(ImageDecodeError::Decode(_))
        ));
        assert!(matches!(decode_image(&[]), Err(ImageDecodeError::NoData)));
    }

    #[test]
    fn truncated_image_fails() {
        let png = testing::png_bytes(8, 8);
        assert!(decode_image(&png[..png.len() / 2]).is_err());
    }

    #[test]
    fn threaded_decoder_reports_outcome() {
        let resource = Arc::new(Resource::new(testing::png_bytes(1, 1), None));
        let (sender, receiver) = mpsc::channel();

        let mut adapter = ImageRepresentationAdapter::create(
            resource,
            &ThreadedImageDecoder::new(),
            Box::new(move |outcome| {
                let _ = sender.send(outcome);
            }),
        );
        assert!(adapter.is_pending());
        assert!(adapter.image().is_none());

        let outcome = receiver
            .recv_timeout(std::time::Duration::from_secs(10))
            .unwrap();
        adapter.settle(outcome).unwrap();

        assert_eq!(adapter.image().unwrap().width(), 1);
    }

    #[test]
    fn decodes_share_one_thread() {
        let decoder = ThreadedImageDecoder::new();
        let (sender, receiver) = mpsc::channel();

        for size in 1..=3 {
            let sender = sender.clone();
            decoder.decode(
                Arc::new(Resource::new(testing::png_bytes(size, size), None)),
                CancellationToken::default(),
                Box::new(move |outcome| {
                    let current = thread::current();
                    let _ = sender.send((current.id(), current.name().map(String::from), outcome));
                }),
            );
        }

        let results: Vec<_> = (0..3)
            .map(|_| {
                receiver
                    .recv_timeout(std::time::Duration::from_secs(10))
                    .unwrap()
            })
            .collect();

        let decoder_thread = results[0].0;
        for (index, (thread_id, name, outcome)) in results.into_iter().enumerate() {
            assert_eq!(thread_id, decoder_thread);
            assert_ne!(thread_id, thread::current().id());
            assert_eq!(name.as_deref(), Some("ImageDecoder"));
            assert_eq!(outcome.unwrap().width(), index as u32 + 1);
        }
    }

    #[test]
    fn cancelled_decodes_are_skipped() {
        let decoder = ThreadedImageDecoder::new();
        let (sender, receiver) = mpsc::channel();

        let cancelled = CancellationToken::default();
        cancelled.cancel();
        let skipped_sender = sender.clone();
        decoder.decode(
            Arc::new(Resource::new(testing::png_bytes(1, 1), None)),
            cancelled,
            Box::new(move |_| {
                let _ = skipped_sender.send("cancelled");
            }),
        );
        decoder.decode(
            Arc::new(Resource::new(testing::png_bytes(1, 1), None)),
            CancellationToken::default(),
            Box::new(move |_| {
                let _ = sender.send("kept");
            }),
        );

        // Decodes run in order, so the cancelled one would have reported first
        let first = receiver
            .recv_timeout(std::time::Duration::from_secs(10))
            .unwrap();
        assert_eq!(first, "kept");
    }

    #[test]
    fn cancelling_the_adapter_cancels_the_decode() {
        let resource = Arc::new(Resource::new(testing::png_bytes(1, 1), None));
        let decoder = testing::ManualDecoder::default();
        let adapter = ImageRepresentationAdapter::create(resource, &decoder, Box::new(|_| {}));
        assert!(!decoder.is_cancelled(0));

        adapter.cancel();
        assert!(decoder.is_cancelled(0));
    }

    #[test]
    fn only_first_outcome_is_applied() {
        let resource = Arc::new(Resource::new(b"GIF89a".to_vec(), None));
        let decoder = testing::ManualDecoder::default();
        let mut adapter =
            ImageRepresentationAdapter::create(resource, &decoder, Box::new(|_| {}));
        assert_eq!(decoder.pending_decodes(), 1);

        assert!(adapter.settle(Err(ImageDecodeError::NoData)).is_err());
        assert!(matches!(adapter.state(), DecodeState::Failed));

        let image = Arc::new(DecodedImage::new(1, 1, vec![0; 4]));
        assert!(adapter.settle(Ok(image)).is_ok());
        assert!(matches!(adapter.state(), DecodeState::Failed));
    }
}
