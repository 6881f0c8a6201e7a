//! Score submission and weekly ranking client
//!
//! Requests are described by plain data (`HttpRequest`) built by pure
//! functions, and responses are parsed from `(status, body)` pairs, so the
//! whole contract is testable natively. Only `send` touches the network:
//! `fetch` in the browser, `ApiError::Unsupported` elsewhere.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[cfg(target_arch = "wasm32")]
mod fetch;

/// Body of `POST /games/scores`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveScoreRequest {
    pub score: u64,
    pub pet_id: String,
}

/// Server reply to a score submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveScoreResponse {
    /// False when the server kept an earlier, higher score
    pub saved: bool,
    /// The pet's best score after this submission
    #[serde(default)]
    pub new_score: Option<u64>,
}

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub rank: u32,
    pub pet_id: String,
    #[serde(default)]
    pub pet_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub score: u64,
}

/// Rankings arrive either bare or wrapped in an object
#[derive(Deserialize)]
#[serde(untagged)]
enum RankingPayload {
    List(Vec<RankingEntry>),
    Wrapped { rankings: Vec<RankingEntry> },
}

/// Which weekly leaderboard to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Week {
    #[default]
    Current,
    Previous,
}

impl Week {
    pub fn as_str(self) -> &'static str {
        match self {
            Week::Current => "current",
            Week::Previous => "previous",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A fully described HTTP request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Client for the game score endpoints
#[derive(Debug, Clone)]
pub struct ScoreClient {
    base_url: String,
    token: Option<String>,
}

impl ScoreClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, token: None }
    }

    /// Attach a bearer token to every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.is_empty()).then_some(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self, json_body: bool) -> Vec<(&'static str, String)> {
        let mut headers = vec![("Accept", "application/json".to_string())];
        if json_body {
            headers.push(("Content-Type", "application/json".to_string()));
        }
        if let Some(token) = &self.token {
            headers.push(("Authorization", format!("Bearer {token}")));
        }
        headers
    }

    pub fn save_score_request(&self, score: u64, pet_id: &str) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(&SaveScoreRequest {
            score,
            pet_id: pet_id.to_string(),
        })?;
        Ok(HttpRequest {
            method: Method::Post,
            url: format!("{}/games/scores", self.base_url),
            headers: self.headers(true),
            body: Some(body),
        })
    }

    pub fn rankings_request(&self, week: Week) -> HttpRequest {
        HttpRequest {
            method: Method::Get,
            url: format!("{}/games/rankings?week={}", self.base_url, week.as_str()),
            headers: self.headers(false),
            body: None,
        }
    }

    /// Submit a final score
    pub async fn save_score(&self, score: u64, pet_id: &str) -> Result<SaveScoreResponse, ApiError> {
        let request = self.save_score_request(score, pet_id)?;
        let (status, body) = send(&request).await?;
        let response = parse_save_response(status, &body);
        match &response {
            Ok(r) => log::info!("Score {} for pet {} submitted (saved: {})", score, pet_id, r.saved),
            Err(e) => log::warn!("Score submission failed: {}", e),
        }
        response
    }

    /// Fetch a weekly leaderboard
    pub async fn rankings(&self, week: Week) -> Result<Vec<RankingEntry>, ApiError> {
        let (status, body) = send(&self.rankings_request(week)).await?;
        parse_rankings(status, &body)
    }
}

fn check_status(status: u16) -> Result<(), ApiError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(ApiError::Status { status })
    }
}

pub fn parse_save_response(status: u16, body: &str) -> Result<SaveScoreResponse, ApiError> {
    check_status(status)?;
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Parse a leaderboard, sorted by rank
pub fn parse_rankings(status: u16, body: &str) -> Result<Vec<RankingEntry>, ApiError> {
    check_status(status)?;
    let payload: RankingPayload =
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    let mut entries = match payload {
        RankingPayload::List(entries) | RankingPayload::Wrapped { rankings: entries } => entries,
    };
    entries.sort_by_key(|e| e.rank);
    Ok(entries)
}

/// Perform a request, returning status and body text
#[cfg(target_arch = "wasm32")]
async fn send(request: &HttpRequest) -> Result<(u16, String), ApiError> {
    fetch::send(request).await
}

#[cfg(not(target_arch = "wasm32"))]
async fn send(request: &HttpRequest) -> Result<(u16, String), ApiError> {
    log::debug!("No HTTP transport for {} {}", request.method.as_str(), request.url);
    Err(ApiError::Unsupported)
}
