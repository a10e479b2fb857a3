use std::fmt::Debug;
use std::future::Future;

/// Awaits `operation` and discards its outcome. A failure is logged and
/// otherwise ignored, so the caller's result never depends on it.
pub async fn best_effort<F, T, E>(description: &str, operation: F)
where
    F: Future<Output = Result<T, E>>,
    E: Debug,
{
    if let Err(e) = operation.await {
        tracing::error!("best-effort step failed, {description}: {e:?}");
    }
}
