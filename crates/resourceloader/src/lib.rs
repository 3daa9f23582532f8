//! Fetches resources on a dedicated thread
//!
//! Consumers talk to the loader through the [Fetcher] trait. Every fetch hands out a
//! [FetchHandle] immediately and reports the outcome later, exactly once, through the
//! completion callback that was passed along with the request.

mod handle;
mod loader;
mod resource;

use std::{
    fmt,
    sync::{mpsc, Arc},
    thread,
};

use loader::{ResourceLoadRequest, ResourceLoader};
use settings::Settings;
use url::Url;

pub use handle::{CancellationToken, FetchHandle, FetchState};
pub use resource::{Resource, ResourceLoadError};

pub type LoadCompletion = Result<Arc<Resource>, ResourceLoadError>;

/// Receives the outcome of a fetch
///
/// Called at most once, from whatever thread finished the load. It is never called
/// for a fetch that was cancelled before it settled.
pub type CompletionCallback = Box<dyn FnOnce(LoadCompletion) + Send>;

/// Something that can fetch resources
pub trait Fetcher {
    /// Starts loading `url`
    ///
    /// Implementations must not block on the load. The returned handle is pending
    /// until its owner records the completion with [FetchHandle::settle].
    fn fetch(&self, url: Url, on_settled: CompletionCallback) -> FetchHandle;
}

/// A handle held by the main thread to communicate
/// with the resource thread
pub struct ResourceThreadHandle {
    /// Channel to forward incoming requests to the ResourceLoader
    sender: mpsc::Sender<ResourceLoadRequest>,
}

/// Indicates that a message could not be sent because the resource thread
/// disconnected.
pub struct ResourceLoaderDisconnected(CompletionCallback);

impl ResourceThreadHandle {
    /// Spawns a new loader thread
    ///
    /// The thread exits once this handle is dropped and all pending loads are done.
    ///
    /// # Panics
    ///
    /// Panics if the operating system refuses to create the thread.
    #[must_use]
    pub fn spawn(settings: Settings) -> Self {
        let (sender, receiver) = mpsc::channel();

        thread::Builder::new()
            .name("ResourceLoader".to_string())
            .spawn(move || ResourceLoader::start(receiver, settings))
            .expect("Failed to spawn ResourceLoader thread");

        Self { sender }
    }

    pub fn try_schedule_load(
        &self,
        url: Url,
        on_settled: CompletionCallback,
    ) -> Result<FetchHandle, ResourceLoaderDisconnected> {
        let handle = FetchHandle::new(url.clone());
        let request = ResourceLoadRequest::new(url, handle.cancellation_token(), on_settled);

        // Hand the callback back so that the caller can still report the failure
        self.sender
            .send(request)
            .map_err(|error| ResourceLoaderDisconnected(error.0.on_settled))?;

        Ok(handle)
    }
}

impl Fetcher for ResourceThreadHandle {
    fn fetch(&self, url: Url, on_settled: CompletionCallback) -> FetchHandle {
        match self.try_schedule_load(url.clone(), on_settled) {
            Ok(handle) => handle,
            Err(ResourceLoaderDisconnected(on_settled)) => {
                log::error!("Cannot load {url}: the resource loader thread is gone");
                on_settled(Err(ResourceLoadError::LoaderDisconnected));
                FetchHandle::new(url)
            },
        }
    }
}

impl fmt::Debug for ResourceLoaderDisconnected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceLoader disconnected")
    }
}
