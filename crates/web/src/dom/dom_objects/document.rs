use std::fmt;

use resourceloader::Fetcher;
use settings::Settings;
use url::Url;

use crate::{event_loop::TaskQueueHandle, html::ImageDecoder};

/// <https://dom.spec.whatwg.org/#interface-document>
///
/// Holds everything that the elements of a document share: where relative urls
/// are resolved against, how resources are fetched and decoded and where tasks are queued.
pub struct Document {
    /// <https://html.spec.whatwg.org/multipage/urls-and-fetching.html#document-base-url>
    base_url: Url,

    needs_layout: bool,

    settings: Settings,

    fetcher: Box<dyn Fetcher>,

    image_decoder: Box<dyn ImageDecoder>,

    task_queue: TaskQueueHandle,
}

impl Document {
    #[must_use]
    pub fn new(
        settings: Settings,
        fetcher: Box<dyn Fetcher>,
        image_decoder: Box<dyn ImageDecoder>,
        task_queue: TaskQueueHandle,
    ) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            needs_layout: false,
            settings,
            fetcher,
            image_decoder,
            task_queue,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// <https://html.spec.whatwg.org/multipage/urls-and-fetching.html#encoding-parsing-a-url>
    pub fn parse_url(&self, input: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(input)
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn fetcher(&self) -> &dyn Fetcher {
        self.fetcher.as_ref()
    }

    #[must_use]
    pub fn image_decoder(&self) -> &dyn ImageDecoder {
        self.image_decoder.as_ref()
    }

    #[must_use]
    pub fn task_queue(&self) -> &TaskQueueHandle {
        &self.task_queue
    }

    pub fn set_needs_layout(&mut self) {
        self.needs_layout = true;
    }

    #[must_use]
    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    /// Clears the layout flag, returning whether it was set
    pub fn take_needs_layout(&mut self) -> bool {
        std::mem::take(&mut self.needs_layout)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("base_url", &self.base_url.as_str())
            .field("needs_layout", &self.needs_layout)
            .finish_non_exhaustive()
    }
}
