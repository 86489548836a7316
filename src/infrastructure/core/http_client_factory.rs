use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Transport knobs for the market data client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpClientSettings {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Transient-failure retries. Zero leaves retrying to the next refresh cycle.
    pub max_retries: u32,
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            max_retries: 0,
        }
    }
}

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates an HTTP client with timeouts and, when asked for, retry middleware
    pub fn create_client(settings: HttpClientSettings) -> ClientWithMiddleware {
        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("HttpClientFactory: Falling back to default client: {}", e);
                Client::new()
            });

        let builder = ClientBuilder::new(client);
        if settings.max_retries == 0 {
            return builder.build();
        }

        // Exponential backoff between attempts
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(settings.max_retries);
        builder
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }
}

/// Appends percent-encoded query parameters to `base_url`.
///
/// reqwest-middleware's request builder has no `.query()`, so the URL is
/// assembled up front.
pub fn build_url_with_query<K, V>(base_url: &str, params: &[(K, V)]) -> Result<String, url::ParseError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut url = Url::parse(base_url)?;
    if !params.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (k.as_ref(), v.as_ref())));
    }
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_with_query() {
        let url = build_url_with_query(
            "https://api.binance.com/api/v3/klines",
            &[("symbol", "SOLUSDT"), ("interval", "1d"), ("limit", "3")],
        )
        .unwrap();
        assert_eq!(
            url,
            "https://api.binance.com/api/v3/klines?symbol=SOLUSDT&interval=1d&limit=3"
        );
    }

    #[test]
    fn test_build_url_encodes_values() {
        let url = build_url_with_query("http://localhost:8080/q", &[("symbols", "[\"A B\"]")]).unwrap();
        assert_eq!(url, "http://localhost:8080/q?symbols=%5B%22A+B%22%5D");
    }

    #[test]
    fn test_build_url_without_params() {
        let params: [(&str, &str); 0] = [];
        let url = build_url_with_query("https://api.binance.com/api/v3/ticker/24hr", &params).unwrap();
        assert_eq!(url, "https://api.binance.com/api/v3/ticker/24hr");
    }

    #[test]
    fn test_build_url_rejects_garbage_base() {
        assert!(build_url_with_query("not a url", &[("a", "b")]).is_err());
    }

    #[test]
    fn test_default_settings_do_not_retry() {
        let settings = HttpClientSettings::default();
        assert_eq!(settings.max_retries, 0);
        assert_eq!(settings.request_timeout, Duration::from_secs(10));
    }
}
