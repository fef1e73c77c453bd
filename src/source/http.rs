//! Blocking client for the YGOPRODeck card-info endpoint.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use url::Url;

use super::{FetchError, LanguageLabel, SourceEnvelope, SourceFetcher, SourcePage};
use crate::language::Language;

/// Public card-info endpoint.
pub const DEFAULT_API_URL: &str = "https://db.ygoprodeck.com/api/v7/cardinfo.php";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Fetches card listings page by page over HTTP.
///
/// There is no retry: any transport failure or non-success status is returned
/// to the caller as a [`FetchError`].
#[derive(Clone)]
pub struct HttpSource {
    client: Client,
    endpoint: Url,
}

impl HttpSource {
    /// Builds a client for `endpoint` with a per-request `timeout`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint.trim())
            .with_context(|| format!("invalid card-info endpoint `{endpoint}`"))?;
        anyhow::ensure!(
            matches!(endpoint.scheme(), "http" | "https"),
            "card-info endpoint must be an http(s) URL"
        );
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .context("failed to build card-info HTTP client")?;
        Ok(Self { client, endpoint })
    }

    /// Endpoint this client queries.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn page_url(&self, language: Option<Language>, offset: usize, page_size: usize) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("misc", "yes")
                .append_pair("num", &page_size.to_string())
                .append_pair("offset", &offset.to_string());
            if let Some(lang) = language.filter(|lang| !lang.is_base()) {
                query.append_pair("language", lang.query_tag());
            }
        }
        url
    }
}

impl SourceFetcher for HttpSource {
    fn fetch_page(
        &self,
        language: Option<Language>,
        offset: usize,
        page_size: usize,
    ) -> Result<SourcePage, FetchError> {
        let label = LanguageLabel(language);
        let url = self.page_url(language, offset, page_size);
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|source| FetchError::Http {
                language: label,
                offset,
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(FetchError::Status {
                language: label,
                offset,
                status: status.as_u16(),
                body,
            });
        }

        let envelope: SourceEnvelope = resp.json().map_err(|source| FetchError::Decode {
            language: label,
            offset,
            source,
        })?;
        Ok(envelope.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_page_queries() {
        let source = HttpSource::new(DEFAULT_API_URL, Duration::from_secs(5)).unwrap();
        let base = source.page_url(None, 0, 500);
        assert_eq!(
            base.as_str(),
            "https://db.ygoprodeck.com/api/v7/cardinfo.php?misc=yes&num=500&offset=0"
        );
        let italian = source.page_url(Some(Language::It), 1000, 500);
        assert_eq!(italian.query(), Some("misc=yes&num=500&offset=1000&language=it"));
        let english = source.page_url(Some(Language::En), 0, 10);
        assert_eq!(english.query(), Some("misc=yes&num=10&offset=0"));
    }

    #[test]
    fn rejects_non_http_endpoints() {
        assert!(HttpSource::new("ftp://example.com/cards", Duration::from_secs(1)).is_err());
        assert!(HttpSource::new("not a url", Duration::from_secs(1)).is_err());
    }
}
