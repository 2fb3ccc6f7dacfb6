use super::types::RetryPolicy;
use crate::error::HazDistError;
use std::future::Future;
use tracing::{info, warn};

/// Runs `operation` until it succeeds or `policy.max_attempts` attempts have
/// failed, sleeping `policy.delay` between attempts.
///
/// The operation receives the zero-based attempt index. At least one attempt
/// is always made. When the budget is exhausted the last error is returned
/// wrapped in [`HazDistError::RetriesExhausted`].
pub async fn retry_with_fixed_delay<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, HazDistError>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, HazDistError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        let err = match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        attempt += 1;
        warn!("Attempt {}/{} failed: {:#}", attempt, max_attempts, err);

        if attempt >= max_attempts {
            warn!("Reached the maximum of {} attempts, giving up", max_attempts);
            return Err(HazDistError::RetriesExhausted {
                attempts: attempt,
                source: Box::new(err),
            });
        }

        info!("Retrying in {} seconds...", policy.delay.as_secs_f64());
        tokio::time::sleep(policy.delay).await;
    }
}
