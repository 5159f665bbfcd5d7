//! Study client implementation for the rote hosted scheduling API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use rote_core::error::{RoteError, RoteResult};
use rote_core::traits::SchedulingService;
use rote_core::types::{
    AlgorithmId, Card, CardSchedule, CreatedSession, QualityRating, SessionSummary,
};

/// Client for the rote hosted scheduling API.
pub struct StudyClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct DueCardsResponse {
    cards: Vec<CardResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CardResponse {
    id: String,
    deck_id: String,
    front: String,
    back: String,
    #[serde(default)]
    schedule: Option<ScheduleResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ScheduleResponse {
    interval_days: u32,
    ease_factor: f32,
    repetitions: u32,
    next_review: DateTime<Utc>,
    #[serde(default)]
    last_reviewed: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CreateSessionResponse {
    session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnswerResponse {
    schedule: ScheduleResponse,
}

impl From<ScheduleResponse> for CardSchedule {
    fn from(r: ScheduleResponse) -> Self {
        CardSchedule {
            interval_days: r.interval_days,
            ease_factor: r.ease_factor,
            repetitions: r.repetitions,
            next_review: r.next_review,
            last_reviewed: r.last_reviewed,
        }
    }
}

impl CardResponse {
    fn into_card(self) -> Card {
        let schedule = match self.schedule {
            Some(s) => s.into(),
            None => CardSchedule::new(Utc::now()),
        };
        Card {
            id: self.id,
            deck_id: self.deck_id,
            front: self.front,
            back: self.back,
            schedule,
        }
    }
}

impl StudyClient {
    /// Create a new study client.
    pub fn new(api_key: &str) -> RoteResult<Self> {
        Self::with_options(api_key, None)
    }

    /// Create a new study client with options.
    pub fn with_options(api_key: &str, base_url: Option<&str>) -> RoteResult<Self> {
        let client = Client::new();
        let base_url = base_url
            .map(|s| s.to_string())
            .unwrap_or_else(|| "https://api.rote.dev/v1".to_string());

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url,
        })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> RoteResult<Self> {
        let api_key = std::env::var("ROTE_API_KEY")
            .map_err(|_| RoteError::Configuration("ROTE_API_KEY not set".to_string()))?;

        let base_url = std::env::var("ROTE_BASE_URL").ok();

        Self::with_options(&api_key, base_url.as_deref())
    }

    fn headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Authorization",
            format!("Token {}", self.api_key).parse().unwrap(),
        );
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            "application/json".parse().unwrap(),
        );
        headers
    }
}

#[async_trait]
impl SchedulingService for StudyClient {
    async fn fetch_due_cards(&self, deck_id: &str, limit: usize) -> RoteResult<Vec<Card>> {
        debug!(deck_id, limit, "Fetching due cards");

        let response = self
            .client
            .get(format!(
                "{}/decks/{}/due?limit={}",
                self.base_url, deck_id, limit
            ))
            .headers(self.headers())
            .send()
            .await
            .map_err(|e| {
                RoteError::remote_unavailable(format!("Failed to fetch due cards: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(RoteError::from_http_status(status.as_u16(), &error));
        }

        let result: DueCardsResponse = response.json().await.map_err(|e| {
            RoteError::remote_unavailable(format!("Failed to parse response: {}", e))
        })?;

        Ok(result.cards.into_iter().map(|c| c.into_card()).collect())
    }

    async fn create_session(
        &self,
        deck_id: &str,
        algorithm: AlgorithmId,
    ) -> RoteResult<CreatedSession> {
        let body = json!({
            "deck_id": deck_id,
            "algorithm": algorithm,
        });

        let response = self
            .client
            .post(format!("{}/sessions/", self.base_url))
            .headers(self.headers())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                RoteError::remote_unavailable(format!("Failed to create session: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(RoteError::from_http_status(status.as_u16(), &error));
        }

        let result: CreateSessionResponse = response.json().await.map_err(|e| {
            RoteError::remote_unavailable(format!("Failed to parse response: {}", e))
        })?;

        debug!(session_id = %result.session_id, deck_id, "Remote session created");
        Ok(CreatedSession {
            session_id: result.session_id,
        })
    }

    async fn submit_card_answer(
        &self,
        session_id: &str,
        card_id: &str,
        rating: QualityRating,
        response_time_ms: Option<u64>,
    ) -> RoteResult<CardSchedule> {
        let mut body = json!({
            "card_id": card_id,
            "rating": rating.to_rating(),
        });
        if let Some(ms) = response_time_ms {
            body["response_time_ms"] = json!(ms);
        }

        let response = self
            .client
            .post(format!("{}/sessions/{}/answers/", self.base_url, session_id))
            .headers(self.headers())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                RoteError::remote_unavailable(format!("Failed to submit answer: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(RoteError::from_http_status(status.as_u16(), &error));
        }

        let result: AnswerResponse = response.json().await.map_err(|e| {
            RoteError::remote_unavailable(format!("Failed to parse response: {}", e))
        })?;

        Ok(result.schedule.into())
    }

    async fn end_session(&self, session_id: &str, summary: &SessionSummary) -> RoteResult<()> {
        let body = json!({ "summary": summary });

        let response = self
            .client
            .post(format!("{}/sessions/{}/end/", self.base_url, session_id))
            .headers(self.headers())
            .json(&body)
            .send()
            .await
            .map_err(|e| RoteError::remote_unavailable(format!("Failed to end session: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(RoteError::from_http_status(status.as_u16(), &error));
        }

        debug!(session_id, "Remote session ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let client = StudyClient::new("test-key").unwrap();
        assert_eq!(client.base_url, "https://api.rote.dev/v1");
    }

    #[test]
    fn test_with_options_overrides_base_url() {
        let client = StudyClient::with_options("test-key", Some("http://localhost:8080")).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_card_response_without_schedule_gets_fresh_one() {
        let json = r#"{"id":"c1","deck_id":"d1","front":"f","back":"b"}"#;
        let response: CardResponse = serde_json::from_str(json).unwrap();
        let card = response.into_card();

        assert_eq!(card.id, "c1");
        assert_eq!(card.schedule.interval_days, 1);
        assert_eq!(card.schedule.repetitions, 0);
        assert!(card.schedule.last_reviewed.is_none());
    }

    #[test]
    fn test_schedule_response_maps_to_card_schedule() {
        let json = r#"{
            "interval_days": 6,
            "ease_factor": 2.6,
            "repetitions": 2,
            "next_review": "2026-03-01T09:00:00Z",
            "last_reviewed": "2026-02-23T09:00:00Z"
        }"#;
        let response: ScheduleResponse = serde_json::from_str(json).unwrap();
        let schedule: CardSchedule = response.into();

        assert_eq!(schedule.interval_days, 6);
        assert_eq!(schedule.repetitions, 2);
        assert!(schedule.last_reviewed.is_some());
    }
}
