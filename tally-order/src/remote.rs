use std::future::Future;
use std::time::Duration;
use tally_core::OrderError;

/// Await a collaborator call, failing once `deadline` passes.
///
/// The inner error is returned untouched so each workflow can map it to its
/// own kind; only expiry is turned into an `OrderError` here.
pub async fn with_deadline<T, E, F>(
    collaborator: &str,
    deadline: Duration,
    call: F,
) -> Result<Result<T, E>, OrderError>
where
    F: Future<Output = Result<T, E>>,
{
    tokio::time::timeout(deadline, call).await.map_err(|_| {
        tracing::error!("{} did not respond within {} ms", collaborator, deadline.as_millis());
        OrderError::CollaboratorFailure(format!(
            "{} did not respond within {} ms",
            collaborator,
            deadline.as_millis()
        ))
    })
}
