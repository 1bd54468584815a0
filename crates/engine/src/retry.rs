//! Bounded retry of whole operations on contention.

use std::future::Future;
use std::time::Duration;

use chamba_core::types::DbId;

use crate::config::EngineConfig;
use crate::error::EngineError;

/// Run `op` until it succeeds, fails with a non-contention error, or has
/// been retried `config.max_retries` times.
///
/// Each attempt must open and commit its own transaction. Contention that
/// outlasts the retries surfaces as `ConcurrentModification` on
/// `(entity, id)`.
pub(crate) async fn with_retry<T, F, Fut>(
    config: &EngineConfig,
    entity: &'static str,
    id: DbId,
    mut op: F,
) -> Result<T, EngineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EngineError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_contention() && attempt < config.max_retries => {
                attempt += 1;
                tracing::warn!(
                    entity,
                    id,
                    attempt,
                    error = %err,
                    "Contended transaction, retrying",
                );
                let backoff = config.retry_backoff_ms * u64::from(attempt);
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }
            Err(err) => return Err(err.on_target(entity, id)),
        }
    }
}
