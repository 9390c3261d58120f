use reqwest::{header, Client};
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, timeout};

use crate::calendar::GraphQlResponse;
use crate::config::GithubSettings;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

const CALENDAR_QUERY: &str = "query($login: String!) {
  user(login: $login) {
    contributionsCollection {
      contributionCalendar {
        weeks {
          contributionDays {
            color
            contributionCount
            date
          }
        }
      }
    }
  }
}";

/// Pause between failed attempts
const RETRY_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("no GitHub token configured (set github.token or GITHUB_TOKEN)")]
    MissingToken,

    #[error("GitHub token is not a valid header value")]
    InvalidToken,
}

/// One request/response exchange producing the raw calendar
pub trait CalendarSource: Send {
    fn fetch(&mut self) -> impl Future<Output = Result<GraphQlResponse, SourceError>> + Send;
}

/// GraphQL client for a user's contribution calendar
#[derive(Debug)]
pub struct GithubClient {
    client: Client,
    endpoint: String,
    login: String,
    timeout: Duration,
    max_attempts: u8,
}

impl GithubClient {
    pub fn new(settings: &GithubSettings) -> Result<Self, SourceError> {
        let token = settings.token.as_deref().ok_or(SourceError::MissingToken)?;

        let mut auth = header::HeaderValue::from_str(&format!("bearer {}", token))
            .map_err(|_| SourceError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            login: settings.username.clone(),
            timeout: settings.timeout,
            max_attempts: settings.retries.max(1),
        })
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    /// Fetch and decode the calendar; GraphQL `errors` fail the fetch
    pub async fn fetch_calendar(&mut self) -> Result<GraphQlResponse, SourceError> {
        log::debug!("fetching contribution calendar for {}", self.login);
        let body = query_body(&self.login);
        let text = self.send_with_retries(&body).await?;

        let response: GraphQlResponse = serde_json::from_str(&text)?;
        if !response.errors.is_empty() {
            let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(SourceError::GraphQl(messages.join("; ")));
        }
        Ok(response)
    }

    async fn send_with_retries(&self, body: &Value) -> Result<String, SourceError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send_once(body).await {
                Ok(text) => return Ok(text),
                Err(e) if attempt >= self.max_attempts => return Err(e),
                Err(e) => {
                    log::warn!("fetch attempt {}/{} failed: {}", attempt, self.max_attempts, e);
                    sleep(RETRY_PAUSE).await;
                }
            }
        }
    }

    async fn send_once(&self, body: &Value) -> Result<String, SourceError> {
        let request = self.client.post(&self.endpoint).json(body).send();
        let response = timeout(self.timeout, request)
            .await
            .map_err(|_| SourceError::Timeout(self.timeout))??;
        Ok(response.error_for_status()?.text().await?)
    }
}

impl CalendarSource for GithubClient {
    fn fetch(&mut self) -> impl Future<Output = Result<GraphQlResponse, SourceError>> + Send {
        self.fetch_calendar()
    }
}

/// The POST body for one calendar query
pub fn query_body(login: &str) -> Value {
    json!({
        "query": CALENDAR_QUERY,
        "variables": { "login": login },
    })
}
