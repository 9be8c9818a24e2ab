use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

use crate::core::{parse_content_type, SiteSaverError};
use crate::locator::classify::classify_url;

use super::{FetchError, Fetched, Fetcher};

pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; ",
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Ambient settings every request made through a session shares
#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    pub user_agent: Option<String>,
    /// Accept invalid TLS certificates
    pub insecure: bool,
    /// Client-wide request timeout, on top of the per-item pipeline timeout
    pub timeout: Option<Duration>,
}

/// HTTP session relying on the ambient client configuration only
pub struct Session {
    client: Client,
}

impl Session {
    pub fn new(options: SessionOptions) -> Result<Session, SiteSaverError> {
        let user_agent = options
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let mut builder = Client::builder()
            .user_agent(user_agent)
            .danger_accept_invalid_certs(options.insecure);

        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Session {
            client: builder.build()?,
        })
    }

    /// Retrieves a single resource in one attempt
    pub async fn retrieve_asset(&self, url: &Url) -> Result<Fetched, FetchError> {
        match url.scheme() {
            "http" | "https" => self.retrieve_remote(url).await,
            "file" => retrieve_file(url).await,
            scheme => Err(FetchError::UnsupportedScheme(scheme.to_string())),
        }
    }

    async fn retrieve_remote(&self, url: &Url) -> Result<Fetched, FetchError> {
        tracing::debug!("requesting {}", url);

        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let final_url: Url = response.url().clone();
        let content_type: String = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let (media_type, charset, _is_base64) = parse_content_type(&content_type);
        let data = response.bytes().await?.to_vec();

        Ok(Fetched {
            data,
            final_url,
            media_type,
            charset,
            status: Some(status.as_u16()),
        })
    }
}

async fn retrieve_file(url: &Url) -> Result<Fetched, FetchError> {
    let path = url
        .to_file_path()
        .map_err(|_| FetchError::UnsupportedScheme(url.scheme().to_string()))?;

    tracing::debug!("reading {}", path.display());

    let data = tokio::fs::read(&path).await?;

    Ok(Fetched {
        data,
        final_url: url.clone(),
        media_type: classify_url(url).media_type().to_string(),
        charset: String::new(),
        status: None,
    })
}

impl Fetcher for Session {
    async fn fetch(&self, url: &Url) -> Result<Fetched, FetchError> {
        self.retrieve_asset(url).await
    }
}
