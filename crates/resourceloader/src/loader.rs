use std::{
    collections::HashMap,
    mem,
    sync::{mpsc, Arc},
};

use settings::Settings;
use url::Url;

use crate::{CancellationToken, CompletionCallback, LoadCompletion, Resource};

pub struct ResourceLoader {
    receiver: mpsc::Receiver<ResourceLoadRequest>,
    cache: HashMap<Url, Arc<Resource>>,
    pending_loads: Vec<ResourceLoadRequest>,
    settings: Settings,
}

/// A load that was requested by some [FetchHandle](crate::FetchHandle)
pub struct ResourceLoadRequest {
    /// The location of the resource that should be loaded
    pub url: Url,

    pub cancellation: CancellationToken,

    pub on_settled: CompletionCallback,
}

impl ResourceLoadRequest {
    #[must_use]
    pub fn new(url: Url, cancellation: CancellationToken, on_settled: CompletionCallback) -> Self {
        Self {
            url,
            cancellation,
            on_settled,
        }
    }

    fn settle(self, completion: LoadCompletion) {
        if self.cancellation.is_cancelled() {
            log::debug!("Dropping result for cancelled load of {}", self.url);
            return;
        }

        (self.on_settled)(completion);
    }
}

impl ResourceLoader {
    #[must_use]
    pub fn new(receiver: mpsc::Receiver<ResourceLoadRequest>, settings: Settings) -> Self {
        Self {
            receiver,
            cache: HashMap::default(),
            pending_loads: Vec::default(),
            settings,
        }
    }

    /// Starts a [ResourceLoader] instance on the current thread
    ///
    /// Returns once every sender has disconnected.
    pub fn start(receiver: mpsc::Receiver<ResourceLoadRequest>, settings: Settings) {
        log::info!("Starting ResourceLoader thread");

        Self::new(receiver, settings).run();

        log::info!("ResourceLoader thread shutting down");
    }

    fn run(&mut self) {
        while self.wait_for_requests() {
            self.handle_pending_loads();
        }
    }

    /// Blocks until at least one request arrived, then collects everything else
    /// that is queued up
    ///
    /// Returns `false` if the requesting side went away.
    fn wait_for_requests(&mut self) -> bool {
        let Ok(request) = self.receiver.recv() else {
            return false;
        };
        self.handle_incoming_request(request);

        loop {
            match self.receiver.try_recv() {
                Ok(request) => self.handle_incoming_request(request),
                Err(mpsc::TryRecvError::Empty) => return true,
                Err(mpsc::TryRecvError::Disconnected) => {
                    // Finish what we have, there will be no more requests
                    self.handle_pending_loads();
                    return false;
                },
            }
        }
    }

    /// Answers a request from the cache if possible and adds it to the list of
    /// pending loads otherwise.
    fn handle_incoming_request(&mut self, request: ResourceLoadRequest) {
        if let Some(cached_resource) = self.cache.get(&request.url) {
            log::debug!("Serving {} from cache", request.url);
            let resource = cached_resource.clone();
            request.settle(Ok(resource));
            return;
        }

        self.pending_loads.push(request);
    }

    pub(crate) fn handle_pending_loads(&mut self) {
        // FIXME: make this concurrent
        for pending_load in mem::take(&mut self.pending_loads) {
            if pending_load.cancellation.is_cancelled() {
                log::debug!("Skipping cancelled load of {}", pending_load.url);
                continue;
            }

            let completion = match self.cache.get(&pending_load.url) {
                Some(cached_resource) => Ok(cached_resource.clone()),
                None => Resource::load(&pending_load.url, &self.settings).map(Arc::new),
            };

            if let Err(error) = &completion {
                log::warn!("Failed to load {}: {error}", pending_load.url);
            }

            if let Ok(resource) = &completion {
                if self.settings.cache_resources {
                    self.cache.insert(pending_load.url.clone(), resource.clone());
                }
            }

            pending_load.settle(completion);
        }
    }
}
