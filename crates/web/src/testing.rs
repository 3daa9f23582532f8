//! Fetchers and decoders that only make progress when a test tells them to

use std::{cell::RefCell, io::Cursor, rc::Rc, sync::Arc};

use http::Headers;
use resourceloader::{
    CancellationToken, CompletionCallback, FetchHandle, Fetcher, LoadCompletion, Resource,
};
use settings::Settings;
use url::Url;

use crate::{
    html::{decode_image, DecodeCallback, DecodeOutcome, ImageDecoder},
    BrowsingContext,
};

pub const PNG_COLOR: [u8; 4] = [255, 0, 0, 255];

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba(PNG_COLOR));
    let mut bytes = vec![];
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn resource(data: Vec<u8>, content_type: Option<&str>) -> Arc<Resource> {
    let headers: Headers = content_type
        .map(|content_type| ("Content-Type", content_type))
        .into_iter()
        .collect();
    Arc::new(Resource::with_headers(data, headers))
}

struct PendingFetch {
    url: Url,
    cancellation: CancellationToken,
    on_settled: Option<CompletionCallback>,
}

#[derive(Clone, Default)]
pub struct ManualFetcher {
    fetches: Rc<RefCell<Vec<PendingFetch>>>,
}

impl ManualFetcher {
    pub fn fetch_count(&self) -> usize {
        self.fetches.borrow().len()
    }

    pub fn url(&self, index: usize) -> Url {
        self.fetches.borrow()[index].url.clone()
    }

    pub fn is_cancelled(&self, index: usize) -> bool {
        self.fetches.borrow()[index].cancellation.is_cancelled()
    }

    /// Reports the outcome of a fetch, even if it was cancelled
    pub fn complete(&self, index: usize, completion: LoadCompletion) {
        let on_settled = self.fetches.borrow_mut()[index]
            .on_settled
            .take()
            .expect("fetch was completed twice");
        on_settled(completion);
    }
}

impl Fetcher for ManualFetcher {
    fn fetch(&self, url: Url, on_settled: CompletionCallback) -> FetchHandle {
        let handle = FetchHandle::new(url.clone());
        self.fetches.borrow_mut().push(PendingFetch {
            url,
            cancellation: handle.cancellation_token(),
            on_settled: Some(on_settled),
        });
        handle
    }
}

struct PendingDecode {
    resource: Arc<Resource>,
    cancellation: CancellationToken,
    on_settled: Option<DecodeCallback>,
}

#[derive(Clone, Default)]
pub struct ManualDecoder {
    decodes: Rc<RefCell<Vec<PendingDecode>>>,
}

impl ManualDecoder {
    /// The number of decodes that were started but not finished
    pub fn pending_decodes(&self) -> usize {
        self.decodes
            .borrow()
            .iter()
            .filter(|decode| decode.on_settled.is_some())
            .count()
    }

    pub fn decode_count(&self) -> usize {
        self.decodes.borrow().len()
    }

    pub fn is_cancelled(&self, index: usize) -> bool {
        self.decodes.borrow()[index].cancellation.is_cancelled()
    }

    /// Decodes the data for real and reports the outcome, even if it was cancelled
    pub fn finish(&self, index: usize) {
        let resource = self.decodes.borrow()[index].resource.clone();
        self.report(index, decode_image(resource.data()));
    }

    pub fn report(&self, index: usize, outcome: DecodeOutcome) {
        let on_settled = self.decodes.borrow_mut()[index]
            .on_settled
            .take()
            .expect("decode was finished twice");
        on_settled(outcome);
    }
}

impl ImageDecoder for ManualDecoder {
    fn decode(
        &self,
        resource: Arc<Resource>,
        cancellation: CancellationToken,
        on_settled: DecodeCallback,
    ) {
        self.decodes.borrow_mut().push(PendingDecode {
            resource,
            cancellation,
            on_settled: Some(on_settled),
        });
    }
}

pub fn browsing_context(settings: Settings) -> (BrowsingContext, ManualFetcher, ManualDecoder) {
    let fetcher = ManualFetcher::default();
    let decoder = ManualDecoder::default();
    let browsing_context = BrowsingContext::with_collaborators(
        settings,
        Box::new(fetcher.clone()),
        Box::new(decoder.clone()),
    );
    (browsing_context, fetcher, decoder)
}
