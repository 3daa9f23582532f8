use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use url::Url;

use crate::{LoadCompletion, Resource, ResourceLoadError};

/// Shared flag that tells whoever performs a load that nobody is interested in the result anymore
///
/// Cancellation is advisory: a load that is already running may still finish.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchState {
    Pending,
    Succeeded,
    Failed,
}

/// The requesting side of a single in-flight load
///
/// The outcome of the load is not delivered to the handle directly. Instead, the completion
/// callback given to the [Fetcher](crate::Fetcher) reports it and the owner then records it
/// with [FetchHandle::settle].
#[derive(Debug)]
pub struct FetchHandle {
    url: Url,
    state: FetchState,
    resource: Option<Arc<Resource>>,
    cancellation: CancellationToken,
}

impl FetchHandle {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            state: FetchState::Pending,
            resource: None,
            cancellation: CancellationToken::default(),
        }
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn state(&self) -> FetchState {
        self.state
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state == FetchState::Pending
    }

    /// A token that the loading side can poll to find out whether the load was cancelled
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn cancel(&self) {
        if self.is_pending() {
            log::debug!("Cancelling load of {}", self.url);
        }

        self.cancellation.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Records the outcome of the load
    ///
    /// A handle settles exactly once. On failure, the error is handed back to the caller.
    pub fn settle(&mut self, completion: LoadCompletion) -> Result<(), ResourceLoadError> {
        debug_assert!(self.is_pending(), "fetch handle settled twice");

        match completion {
            Ok(resource) => {
                self.state = FetchState::Succeeded;
                self.resource = Some(resource);
                Ok(())
            },
            Err(error) => {
                self.state = FetchState::Failed;
                Err(error)
            },
        }
    }

    /// The fetched resource, once the load has succeeded
    #[must_use]
    pub fn resource(&self) -> Option<&Arc<Resource>> {
        self.resource.as_ref()
    }

    /// Moves the fetched resource out of the handle
    pub fn take_resource(&mut self) -> Option<Arc<Resource>> {
        self.resource.take()
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;

    fn handle() -> FetchHandle {
        FetchHandle::new(Url::parse("https://example.com/image.png").unwrap())
    }

    #[test]
    fn cancellation_is_shared_with_token() {
        let handle = handle();
        let token = handle.cancellation_token();

        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
        assert!(handle.is_cancelled());
    }

    #[test]
    fn settle_success() {
        let mut handle = handle();
        let resource = Arc::new(Resource::new(b"GIF89a".to_vec(), None));

        assert!(handle.settle(Ok(resource)).is_ok());
        assert_eq!(handle.state(), FetchState::Succeeded);

        let resource = handle.take_resource().unwrap();
        assert_eq!(resource.data(), b"GIF89a");
        assert!(handle.resource().is_none());
    }

    #[test]
    fn settle_failure() {
        let mut handle = handle();

        let error = handle
            .settle(Err(ResourceLoadError::HttpStatus(StatusCode::NOT_FOUND)))
            .unwrap_err();
        assert!(matches!(error, ResourceLoadError::HttpStatus(StatusCode::NOT_FOUND)));
        assert_eq!(handle.state(), FetchState::Failed);
        assert!(handle.resource().is_none());
    }
}
