use core::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::metrics::Metrics;
use crate::metrics::ServerState;

// Error variants related to metrics.
#[derive(Debug, thiserror::Error)]
pub enum WaitError {
    #[error("timeout after {0:?} when {1}")]
    Timeout(Duration, String),

    #[error("node is shutting down")]
    ShuttingDown,
}

/// Wait is a wrapper of Metrics channel that impls several utils to wait
/// for metrics to satisfy some condition.
pub struct Wait {
    pub timeout: Duration,
    pub rx: watch::Receiver<Metrics>,
}

impl Wait {
    /// Wait for metrics to satisfy some condition or timeout.
    #[tracing::instrument(level = "trace", skip(self, func), fields(msg=%msg.to_string()))]
    pub async fn metrics<T>(
        &self,
        func: T,
        msg: impl ToString,
    ) -> Result<Metrics, WaitError>
    where
        T: Fn(&Metrics) -> bool + Send,
    {
        let timeout_at = Instant::now() + self.timeout;

        let mut rx = self.rx.clone();
        loop {
            let latest = rx.borrow().clone();

            tracing::debug!(
                "id={} wait {:} latest: {}",
                latest.id,
                msg.to_string(),
                latest
            );

            if func(&latest) {
                tracing::debug!(
                    "id={} done wait {:} latest: {}",
                    latest.id,
                    msg.to_string(),
                    latest
                );
                return Ok(latest);
            }

            let changed =
                tokio::time::timeout_at(timeout_at, rx.changed()).await;

            match changed {
                Ok(Ok(_)) => {
                    // metrics changed, continue the waiting loop
                }
                Ok(Err(err)) => {
                    tracing::debug!(
                        "id={} error: {:?}; wait {:} latest: {:?}",
                        latest.id,
                        err,
                        msg.to_string(),
                        latest
                    );
                    return Err(WaitError::ShuttingDown);
                }
                Err(_elapsed) => {
                    let latest = rx.borrow().clone();
                    return Err(WaitError::Timeout(
                        self.timeout,
                        format!("{} latest: {}", msg.to_string(), latest),
                    ));
                }
            }
        }
    }

    /// Wait for `server_state` to become `want_state` or timeout.
    #[tracing::instrument(level = "trace", skip(self), fields(msg=msg.to_string().as_str()))]
    pub async fn state(
        &self,
        want_state: ServerState,
        msg: impl ToString,
    ) -> Result<Metrics, WaitError> {
        self.metrics(
            |m| m.server_state == want_state,
            &format!("{} .server_state == {:?}", msg.to_string(), want_state),
        )
        .await
    }

    /// Wait for `term` to reach at least `want_term` or timeout.
    #[tracing::instrument(level = "trace", skip(self), fields(msg=msg.to_string().as_str()))]
    pub async fn term_at_least(
        &self,
        want_term: u64,
        msg: impl ToString,
    ) -> Result<Metrics, WaitError> {
        self.metrics(
            |m| m.term >= want_term,
            &format!("{} .term >= {}", msg.to_string(), want_term),
        )
        .await
    }
}
