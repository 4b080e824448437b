//! Timeout utilities for page operations
//!
//! Navigation and readiness waits are the only operations that can hang on a
//! misbehaving site, so both go through [`with_page_timeout`].

use anyhow::Result;
use std::future::Future;
use std::time::Duration;

/// Run `operation` with an explicit timeout
///
/// Returns the operation's own error if it fails, or
/// `"<operation_name> timeout after N seconds"` if the deadline passes first.
pub async fn with_page_timeout<F, T>(
    operation: F,
    timeout: Duration,
    operation_name: &str,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "{operation_name} timeout after {} seconds",
            timeout.as_secs_f64()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timeout_names_the_operation() {
        let err = with_page_timeout(
            async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            },
            Duration::from_millis(50),
            "Page navigation",
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Page navigation timeout after 0.05 seconds");
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let err = with_page_timeout(
            async { Err::<(), _>(anyhow::anyhow!("net::ERR_NAME_NOT_RESOLVED")) },
            Duration::from_secs(1),
            "Page navigation",
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("ERR_NAME_NOT_RESOLVED"));
    }
}
