use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

const MAX_RETRIES: u32 = 3;

/// HTTP client that retries transient failures (connect errors, 5xx, 429)
/// with exponential backoff.
pub(crate) fn retrying_client() -> ClientWithMiddleware {
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(MAX_RETRIES);

    ClientBuilder::new(reqwest::Client::new())
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}
