//! Fan-Out use case
//!
//! Runs a fixed set of independent invocations concurrently and joins them
//! into one combined result. The join completes only once every branch has
//! finished: a failed branch makes the whole batch fail with the first
//! failure encountered, but in-flight siblings are drained rather than
//! cancelled so nothing leaks. Requests must not depend on each other's
//! output; there is no intra-batch sequencing.

use crate::ports::model_backend::ModelBackend;
use crate::use_cases::invoke_model::{InvokeError, ModelInvoker};
use crate::config::ExecutionParams;
use relay_domain::{InvocationRequest, InvocationResult};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Errors that fail an entire fan-out batch.
#[derive(Error, Debug)]
pub enum FanOutError {
    #[error("fan-out request {index} failed: {source}")]
    RequestFailed {
        index: usize,
        #[source]
        source: InvokeError,
    },

    #[error("fan-out task panicked: {0}")]
    Join(String),

    #[error("fan-out timed out after {0:?}")]
    TimedOut(Duration),
}

/// Use case for concurrent invocation of independent requests.
pub struct FanOutExecutor<B: ModelBackend + 'static> {
    invoker: Arc<ModelInvoker<B>>,
    timeout: Option<Duration>,
}

impl<B: ModelBackend + 'static> FanOutExecutor<B> {
    pub fn new(invoker: Arc<ModelInvoker<B>>, params: &ExecutionParams) -> Self {
        Self {
            invoker,
            timeout: params.fan_out_timeout(),
        }
    }

    /// Launch all requests concurrently and wait for every branch.
    ///
    /// On success the results come back in input order. On failure no
    /// partial results are exposed; the error wraps the first failure
    /// observed in completion order.
    pub async fn run_concurrent(
        &self,
        requests: Vec<InvocationRequest>,
    ) -> Result<Vec<InvocationResult>, FanOutError> {
        let join = self.join_all(requests);

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, join)
                .await
                .map_err(|_| FanOutError::TimedOut(limit))?,
            None => join.await,
        }
    }

    async fn join_all(
        &self,
        requests: Vec<InvocationRequest>,
    ) -> Result<Vec<InvocationResult>, FanOutError> {
        let total = requests.len();
        debug!("Fanning out {} request(s)", total);

        let mut join_set = JoinSet::new();
        for (index, request) in requests.into_iter().enumerate() {
            let invoker = Arc::clone(&self.invoker);
            join_set.spawn(async move { (index, invoker.invoke(request).await) });
        }

        let mut slots: Vec<Option<InvocationResult>> = std::iter::repeat_with(|| None)
            .take(total)
            .collect();
        let mut first_failure: Option<FanOutError> = None;

        // Drain every branch even after a failure
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, Ok(result))) => {
                    slots[index] = Some(result);
                }
                Ok((index, Err(err))) => {
                    warn!("Fan-out request {} failed: {}", index, err);
                    if first_failure.is_none() {
                        first_failure = Some(FanOutError::RequestFailed { index, source: err });
                    }
                }
                Err(err) => {
                    warn!("Fan-out task join error: {}", err);
                    if first_failure.is_none() {
                        first_failure = Some(FanOutError::Join(err.to_string()));
                    }
                }
            }
        }

        if let Some(failure) = first_failure {
            return Err(failure);
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::model_backend::{BackendError, BackendRequest, BackendResponse};
    use async_trait::async_trait;
    use relay_domain::Conversation;
    use tokio::time::Instant;

    /// Backend whose behavior is scripted into the user turn as
    /// "ok:<delay_ms>:<text>" or "fail:<delay_ms>".
    struct DelayBackend;

    #[async_trait]
    impl ModelBackend for DelayBackend {
        async fn complete(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
            let directive = request
                .conversation
                .last()
                .map(|t| t.content.clone())
                .unwrap_or_default();
            let mut parts = directive.splitn(3, ':');
            let verb = parts.next().unwrap_or("");
            let delay_ms: u64 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;

            match verb {
                "ok" => Ok(BackendResponse::text(parts.next().unwrap_or("done"))),
                _ => Err(BackendError::Auth("scripted failure".into())),
            }
        }
    }

    fn executor(timeout_ms: u64) -> FanOutExecutor<DelayBackend> {
        let params = ExecutionParams {
            max_retries: 0,
            fan_out_timeout_ms: timeout_ms,
            ..ExecutionParams::default()
        };
        let invoker = Arc::new(ModelInvoker::new(Arc::new(DelayBackend), &params));
        FanOutExecutor::new(invoker, &params)
    }

    fn request(directive: &str) -> InvocationRequest {
        InvocationRequest::free_text(Conversation::exchange("validator", directive))
    }

    #[tokio::test(start_paused = true)]
    async fn results_come_back_in_input_order() {
        let results = executor(0)
            .run_concurrent(vec![request("ok:50:first"), request("ok:10:second")])
            .await
            .expect("both succeed");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_text(), Some("first"));
        assert_eq!(results[1].as_text(), Some("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_waits_for_slower_sibling() {
        let start = Instant::now();
        let err = executor(0)
            .run_concurrent(vec![request("fail:100"), request("ok:200:late")])
            .await
            .expect_err("batch fails");

        // The early failure must not short-circuit the join
        assert!(start.elapsed() >= Duration::from_millis(200));
        match err {
            FanOutError::RequestFailed { index, .. } => assert_eq!(index, 0),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn empty_batch_completes_immediately() {
        let results = executor(0).run_concurrent(vec![]).await.expect("empty ok");
        assert!(results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn overall_timeout_fails_the_batch() {
        let err = executor(100)
            .run_concurrent(vec![request("ok:500:too-slow")])
            .await
            .expect_err("deadline exceeded");
        assert!(matches!(err, FanOutError::TimedOut(_)));
    }
}
