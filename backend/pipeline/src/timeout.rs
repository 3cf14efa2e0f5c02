use std::future::Future;
use std::time::Duration;

use iris_core::{Stage, TimeoutError};

/// Run `fut`, giving up after `after`. The future is dropped on expiry.
pub(crate) async fn bounded<F: Future>(
    stage: Stage,
    after: Duration,
    fut: F,
) -> Result<F::Output, TimeoutError> {
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| TimeoutError { stage, after })
}
