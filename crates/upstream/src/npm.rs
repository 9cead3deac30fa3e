//! npm downloads API client.
//!
//! `GET {base}/downloads/range/{start}:{end}[/{package}]` answers with
//! `{"start", "end", "package", "downloads": [{"day", "downloads"}]}` or with
//! `{"error": "..."}` (usually alongside a 4xx status).

use crate::error::{UpstreamError, UpstreamResult};
use crate::traits::StatsSource;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tally_core::day::serde_day;
use tally_core::{FetchRange, RangeResponse};
use time::Date;

#[derive(Debug, Deserialize)]
struct RangeBody {
    #[serde(default)]
    downloads: Vec<DayBody>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DayBody {
    #[serde(with = "serde_day")]
    day: Date,
    downloads: i64,
}

impl From<RangeBody> for RangeResponse {
    fn from(body: RangeBody) -> Self {
        Self {
            downloads: body
                .downloads
                .into_iter()
                .map(|entry| (entry.day, entry.downloads))
                .collect(),
            error: body.error,
        }
    }
}

/// Client for the npm downloads API.
#[derive(Clone, Debug)]
pub struct NpmRegistryClient {
    http: reqwest::Client,
    base_url: Url,
}

impl NpmRegistryClient {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> UpstreamResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| UpstreamError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::InvalidUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { http, base_url })
    }

    /// URL of the range endpoint for a package (or the aggregate, for `""`).
    pub fn range_url(&self, package: &str, range: FetchRange) -> UpstreamResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| UpstreamError::InvalidUrl(self.base_url.to_string()))?;
            segments
                .pop_if_empty()
                .push("downloads")
                .push("range")
                .push(&range.to_string());
            // Scoped names ("@scope/name") keep their slash as a path separator.
            if !package.is_empty() {
                segments.extend(package.split('/'));
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl StatsSource for NpmRegistryClient {
    async fn fetch_range(
        &self,
        package: &str,
        range: FetchRange,
    ) -> UpstreamResult<RangeResponse> {
        let url = self.range_url(package, range)?;
        tracing::debug!(%url, "Requesting upstream range");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<RangeBody>(&body) {
            Ok(parsed) if status.is_success() || parsed.error.is_some() => Ok(parsed.into()),
            Err(e) if status.is_success() => Err(UpstreamError::Decode(e)),
            _ => Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            }),
        }
    }
}
