use anyhow::Error;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retries an async request with a fixed delay between attempts.
///
/// `retries` counts the extra attempts, so the operation runs at most
/// `retries + 1` times. The last error is returned when every attempt fails.
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        match operation().await.map_err(anyhow::Error::from) {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt,
                    retries + 1,
                    err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_retries_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        let url = format!("{}/flaky", server.uri());
        let attempts = AtomicUsize::new(0);

        let status = with_retry(
            || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                let target = if n == 0 {
                    // Nothing listens on port 9 locally; the first attempt fails to connect.
                    "http://127.0.0.1:9/flaky".to_string()
                } else {
                    url.clone()
                };
                async move { reqwest::get(target).await.map(|r| r.status()) }
            },
            2,
            10,
        )
        .await
        .unwrap();

        assert!(status.is_success());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_retries() {
        let attempts = AtomicUsize::new(0);
        let result = with_retry(
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { reqwest::get("http://127.0.0.1:9/down").await }
            },
            2,
            10,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
