//! Retry with exponential backoff for schema downloads.
//!
//! Retries only on transport errors (connection failures, timeouts). Any
//! HTTP response, including 4xx and 5xx, is returned to the caller as-is.

use std::time::Duration;

/// Maximum number of retry attempts after the initial request.
pub(crate) const MAX_RETRIES: u32 = 3;

/// Base delay between retries (doubles each attempt: 200ms, 400ms, 800ms).
const BASE_DELAY_MS: u64 = 200;

/// Send a blocking HTTP request, retrying transport failures.
///
/// The closure `f` is called up to `MAX_RETRIES + 1` times.
pub(crate) fn retry_send<F>(url: &str, f: F) -> Result<reqwest::blocking::Response, reqwest::Error>
where
    F: Fn() -> Result<reqwest::blocking::Response, reqwest::Error>,
{
    for attempt in 0..MAX_RETRIES {
        match f() {
            Ok(resp) => return Ok(resp),
            Err(e) => {
                let delay = Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt));
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries = MAX_RETRIES,
                    url,
                    "schema download failed, retrying in {delay:?}: {e}"
                );
                std::thread::sleep(delay);
            }
        }
    }
    f()
}
