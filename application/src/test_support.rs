//! Shared test doubles for use-case tests.

use crate::ports::model_backend::{BackendError, BackendRequest, BackendResponse, ModelBackend};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Backend double that replays a scripted sequence of responses.
pub(crate) struct MockBackend {
    script: Mutex<VecDeque<Result<BackendResponse, BackendError>>>,
    calls: AtomicUsize,
}

impl MockBackend {
    pub fn returning(script: Vec<Result<BackendResponse, BackendError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of completions requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Record of the last request's user content, for assertion purposes.
    pub fn next_scripted(&self) -> Option<Result<BackendResponse, BackendError>> {
        self.script.lock().ok()?.pop_front()
    }
}

#[async_trait]
impl ModelBackend for MockBackend {
    async fn complete(&self, _request: BackendRequest) -> Result<BackendResponse, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.next_scripted()
            .unwrap_or_else(|| Err(BackendError::InvalidResponse("script exhausted".into())))
    }
}
