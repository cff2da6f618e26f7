use crate::EmbedError;
use reqwest::{header::HeaderMap, Client};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Subset of the oEmbed JSON document returned by publish.twitter.com.
#[derive(Debug, Clone, Deserialize)]
pub struct OEmbedResponse {
    pub html: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_url: String,
    pub provider_name: String,
    pub provider_url: String,
}

#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    pub fn new() -> Self {
        let user_agent = "roundup_embed/0.1.0";
        let timeout = Duration::from_secs(10);
        debug!("Fetcher initialized with default configuration");

        Self::new_with_custom_config(timeout, user_agent)
    }

    pub fn new_with_custom_config(timeout: Duration, user_agent: &str) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|e| {
                error!(error = %e, "Failed to create HTTP client");
                panic!("Failed to initialize HTTP client: {}", e);
            });
        Fetcher { client }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Creates a Fetcher with custom configuration
    /// This method allows users to provide their own configuration options
    pub fn new_with_config(config: FetcherConfig) -> Self {
        let mut client_builder = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout);

        if let Some(headers) = config.headers {
            client_builder = client_builder.default_headers(headers);
        }

        if let Some(redirect_policy) = config.redirect_policy {
            client_builder = client_builder.redirect(redirect_policy);
        }

        let client = client_builder
            .build()
            .expect("Failed to create HTTP client with custom config");

        Self { client }
    }

    /// Check that a platform embed endpoint answers at all. The widget
    /// content itself is opaque (iframes are cross-origin); a successful
    /// status is the only readiness signal available.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn probe(&self, url: &str) -> Result<(), EmbedError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            error!(error = %e, url = %url, "Embed endpoint probe failed");
            EmbedError::FetchError(e.to_string())
        })?;

        if !response.status().is_success() {
            return Err(EmbedError::FetchError(format!(
                "Embed endpoint returned status: {}",
                response.status()
            )));
        }

        debug!(url = %url, "Embed endpoint is reachable");
        Ok(())
    }

    #[instrument(level = "debug", skip(self), err)]
    pub async fn fetch_twitter_oembed(&self, tweet_url: &str) -> Result<OEmbedResponse, EmbedError> {
        let oembed_url = format!(
            "https://publish.twitter.com/oembed?url={}&omit_script=1&lang=en",
            tweet_url
        );

        debug!(tweet_url = %tweet_url, "Fetching Twitter oEmbed data");

        let response = self.client.get(&oembed_url).send().await.map_err(|e| {
            error!(error = %e, url = %tweet_url, "Failed to fetch Twitter oEmbed");
            EmbedError::ExternalServiceError {
                service: "Twitter".to_string(),
                message: e.to_string(),
            }
        })?;

        let oembed: OEmbedResponse = response.json().await.map_err(|e| {
            error!(error = %e, url = %tweet_url, "Failed to parse Twitter oEmbed response");
            EmbedError::ExternalServiceError {
                service: "Twitter".to_string(),
                message: e.to_string(),
            }
        })?;

        debug!(tweet_url = %tweet_url, "Successfully fetched Twitter oEmbed data");
        Ok(oembed)
    }
}

// for Twitter
impl Fetcher {
    /// Twitter serves bot-looking clients an empty shell; a browser-like
    /// header set keeps the oEmbed endpoint cooperative.
    #[instrument(level = "debug")]
    pub fn new_twitter_client() -> Self {
        debug!("Creating Twitter-specific fetcher");

        let mut headers = HeaderMap::new();

        headers.insert("Accept-Language", "en-US,en;q=0.9".parse().unwrap());
        headers.insert(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .parse()
                .unwrap(),
        );

        headers.insert("Sec-Fetch-Dest", "document".parse().unwrap());
        headers.insert("Sec-Fetch-Mode", "navigate".parse().unwrap());
        headers.insert("Sec-Fetch-Site", "none".parse().unwrap());
        headers.insert("Sec-Fetch-User", "?1".parse().unwrap());
        headers.insert("Upgrade-Insecure-Requests", "1".parse().unwrap());

        headers.insert("Cache-Control", "no-cache".parse().unwrap());
        headers.insert("Pragma", "no-cache".parse().unwrap());

        let client = Client::builder()
            .user_agent(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                AppleWebKit/537.36 (KHTML, like Gecko) \
                Chrome/119.0.0.0 Safari/537.36",
            )
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::limited(10))
            .default_headers(headers)
            .build()
            .expect("Failed to create Twitter HTTP client");

        debug!("Twitter-specific fetcher created successfully");
        Self { client }
    }
}

/// Custom client profile for `Fetcher::new_with_config`.
///
/// # Examples
/// ```ignore
/// let fetcher = Fetcher::new();
///
/// // Using Twitter-specific configuration
/// let twitter_fetcher = Fetcher::new_twitter_client();
///
/// // Using custom configuration
/// let custom_fetcher = Fetcher::new_with_config(FetcherConfig {
///     user_agent: "my-custom-agent/1.0".to_string(),
///     timeout: Duration::from_secs(20),
///     headers: Some(my_custom_headers),
///     redirect_policy: Some(my_redirect_policy),
/// });
/// ```
pub struct FetcherConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub headers: Option<HeaderMap>,
    pub redirect_policy: Option<reqwest::redirect::Policy>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: "roundup_embed/0.1.0".to_string(),
            timeout: Duration::from_secs(10),
            headers: None,
            redirect_policy: None,
        }
    }
}
