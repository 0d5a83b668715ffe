use anyhow::{anyhow, Result};
use tokio::task::JoinHandle;

/// Collapses a task's own error and a join error (panic, cancellation) into one result.
pub async fn flatten<T>(handle: JoinHandle<Result<T>>) -> Result<T> {
    match handle.await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(err),
        Err(err) => Err(anyhow!(err)),
    }
}
