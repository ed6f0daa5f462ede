use crate::config::Settings;
use crate::error::SnapshotError;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use slog::{Logger, debug, error, info, o};
use std::fmt;
use std::time::Duration;
use tokio::time::sleep;

const AUTH_TIMEOUT: Duration = Duration::from_secs(10);
const STREAMS_TIMEOUT: Duration = Duration::from_secs(15);

/// App access token returned by the client-credentials grant.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn prefix(&self) -> String {
        self.0.chars().take(10).collect()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken({}...)", self.prefix())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
struct Pagination {
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct HelixPage<T> {
    #[serde(default)]
    data: Vec<T>,
    #[serde(default)]
    pagination: Pagination,
}

/// A live stream as listed by `GET /streams`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Stream {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    #[serde(default)]
    pub game_id: String,
    #[serde(default)]
    pub title: String,
    pub viewer_count: u32,
    pub started_at: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub thumbnail_url: String,
}

/// Bounds on stream pagination.
#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    pub page_size: u32,
    /// Pages that returned a cursor; collection stops once this many were seen.
    pub max_pages: u32,
    pub pause_every: u32,
    pub pause: Duration,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_pages: 20,
            pause_every: 10,
            pause: Duration::from_secs(1),
        }
    }
}

/// Streams gathered for one category. `halted` is set when a page request
/// failed; the streams fetched before it are kept.
#[derive(Debug)]
pub struct StreamCollection {
    pub streams: Vec<Stream>,
    pub pages: u32,
    pub halted: Option<SnapshotError>,
}

#[derive(Clone)]
pub struct TwitchClient {
    client: Client,
    auth_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
    limits: PageLimits,
    logger: Logger,
}

impl TwitchClient {
    pub fn new(settings: &Settings, logger: Logger) -> Result<Self, SnapshotError> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            auth_url: settings.twitch_auth_url.trim_end_matches('/').to_string(),
            api_url: settings.twitch_api_url.trim_end_matches('/').to_string(),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            limits: PageLimits::default(),
            logger,
        })
    }

    pub fn with_limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }

    fn helix_get(&self, path: &str, token: &AccessToken) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.api_url, path))
            .header("Client-ID", &self.client_id)
            .bearer_auth(token.as_str())
    }

    /// Exchanges the client credentials for an app access token.
    pub async fn access_token(&self) -> Result<AccessToken, SnapshotError> {
        let logger = self.logger.new(o!("stage" => "auth"));
        debug!(logger, "Requesting access token from Twitch");

        let response = self
            .client
            .post(format!("{}/token", self.auth_url))
            .query(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .timeout(AUTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| SnapshotError::Auth(format!("Request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| SnapshotError::Auth(format!("Token endpoint rejected request: {}", e)))?;

        let body = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| SnapshotError::Auth(format!("Failed to parse response: {}", e)))?;

        let token = body
            .access_token
            .filter(|t| !t.is_empty())
            .map(AccessToken)
            .ok_or_else(|| SnapshotError::Auth("Response has no access_token".to_string()))?;

        debug!(logger, "Access token received: {}...", token.prefix());
        Ok(token)
    }

    /// Searches the category index and returns the id of the first entry whose
    /// name equals `name`, ignoring case.
    pub async fn find_category(
        &self,
        token: &AccessToken,
        name: &str,
    ) -> Result<String, SnapshotError> {
        let logger = self.logger.new(o!("stage" => "category"));
        debug!(logger, "Getting category id for {}", name);

        let response = self
            .helix_get("/search/categories", token)
            .query(&[("query", name)])
            .timeout(AUTH_TIMEOUT)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SnapshotError::NotFound(format!("Category search failed: {}", e)))?;

        let page = response
            .json::<HelixPage<Category>>()
            .await
            .map_err(|e| SnapshotError::NotFound(format!("Failed to parse response: {}", e)))?;

        debug!(logger, "Received {} categories in search results", page.data.len());

        let wanted = name.to_lowercase();
        match page.data.into_iter().find(|c| c.name.to_lowercase() == wanted) {
            Some(category) => {
                info!(logger, "Found {} category id: {}", name, category.id);
                Ok(category.id)
            }
            None => Err(SnapshotError::NotFound(format!(
                "{} not found in search results",
                name
            ))),
        }
    }

    async fn fetch_stream_page(
        &self,
        token: &AccessToken,
        game_id: &str,
        cursor: Option<&str>,
    ) -> Result<HelixPage<Stream>, reqwest::Error> {
        let mut request = self
            .helix_get("/streams", token)
            .query(&[("game_id", game_id)])
            .query(&[("first", self.limits.page_size)]);

        if let Some(after) = cursor {
            request = request.query(&[("after", after)]);
        }

        request
            .timeout(STREAMS_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json::<HelixPage<Stream>>()
            .await
    }

    /// Follows the stream cursor until the listing ends, the page cap is hit, or
    /// a request fails.
    pub async fn collect_streams(&self, token: &AccessToken, game_id: &str) -> StreamCollection {
        let logger = self.logger.new(o!("stage" => "streams", "game_id" => game_id.to_string()));

        let mut streams = Vec::new();
        let mut cursor: Option<String> = None;
        let mut counted = 0;
        let mut fetched = 0;
        let mut halted = None;

        while counted < self.limits.max_pages {
            let page_no = fetched + 1;

            let page = match self.fetch_stream_page(token, game_id, cursor.as_deref()).await {
                Ok(page) => page,
                Err(e) => {
                    error!(logger, "Error getting streams page {}: {}", page_no, e);
                    halted = Some(SnapshotError::Collection {
                        page: page_no,
                        message: e.to_string(),
                    });
                    break;
                }
            };
            fetched = page_no;

            let got = page.data.len();
            streams.extend(page.data);
            info!(
                logger,
                "Page {}: got {} streams. Total: {}",
                page_no,
                got,
                streams.len()
            );

            match page.pagination.cursor.filter(|c| !c.is_empty()) {
                Some(next) => cursor = Some(next),
                None => break,
            }

            counted += 1;

            // Static throttle for the Helix rate limit
            if self.limits.pause_every > 0
                && counted % self.limits.pause_every == 0
                && counted < self.limits.max_pages
                && !self.limits.pause.is_zero()
            {
                debug!(logger, "Pausing {:?} after {} pages", self.limits.pause, counted);
                sleep(self.limits.pause).await;
            }
        }

        if counted >= self.limits.max_pages {
            info!(logger, "Page cap of {} reached", self.limits.max_pages);
        }

        StreamCollection {
            streams,
            pages: fetched,
            halted,
        }
    }
}
