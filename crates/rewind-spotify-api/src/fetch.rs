use crate::bearer_token::BearerToken;
use crate::error::FetchError;
use tracing::debug;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// HTTP client bound to a Web API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        ApiClient {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&url).map_err(|source| FetchError::Url { url, source })
    }

    /// Authorized `GET` of a JSON resource relative to the base URL.
    pub async fn fetch<T>(&self, path: &str, bearer: &BearerToken) -> Result<T, FetchError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        fetch(&self.client, url, bearer).await
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        ApiClient::new(DEFAULT_API_URL)
    }
}

pub async fn fetch<T>(client: &reqwest::Client, url: Url, bearer: &BearerToken) -> Result<T, FetchError>
where
    T: serde::de::DeserializeOwned,
{
    let url_str = url.to_string();
    debug!("GET {}", url_str);
    let res = client
        .get(url)
        .bearer_auth(bearer.as_str())
        .send()
        .await
        .map_err(|source| FetchError::Transport {
            url: url_str.clone(),
            source,
        })?;

    let status = res.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url_str,
            status,
        });
    }

    let body = res.text().await.map_err(|source| FetchError::Transport {
        url: url_str.clone(),
        source,
    })?;
    debug!("{} returned {} bytes", url_str, body.len());

    serde_json::from_str(&body).map_err(|source| FetchError::Decode {
        url: url_str,
        source,
    })
}
