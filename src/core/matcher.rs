use crate::core::prompt::build_match_prompt;
use crate::models::domain::string_or_number;
use crate::models::{Donation, FoodMatch, FoodRequest};
use crate::services::completion::{CompletionError, TextCompletion};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while matching a donation
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Text completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("Invalid response: no candidate text received from the model")]
    EmptyResponse,

    #[error("Model output is not a valid match list: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One entry of the model's answer
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    #[serde(deserialize_with = "string_or_number")]
    pub request_id: String,
    pub score: f64,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Donation-to-request matcher backed by a text-generation model
///
/// The model does the scoring. This type only frames the question, parses
/// the answer and stamps out pending matches; it performs no ranking,
/// de-duplication or persistence of its own.
#[derive(Clone)]
pub struct FoodMatcher {
    completion: Arc<dyn TextCompletion>,
}

impl FoodMatcher {
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }

    /// Match one donation against the given pending requests
    ///
    /// # Arguments
    /// * `donation` - The donation, already loaded by id
    /// * `requests` - Every request currently pending
    ///
    /// # Returns
    /// One pending match per entry the model returned, in the model's order
    pub async fn match_food(
        &self,
        donation: &Donation,
        requests: &[FoodRequest],
    ) -> Result<Vec<FoodMatch>, MatchError> {
        let prompt = build_match_prompt(donation, requests);

        tracing::debug!(
            "Matching donation {} against {} pending requests",
            donation.id,
            requests.len()
        );

        let text = self
            .completion
            .complete(&prompt)
            .await?
            .filter(|text| !text.trim().is_empty())
            .ok_or(MatchError::EmptyResponse)?;

        let candidates = parse_candidates(&text)?;
        let created_at = Utc::now();

        tracing::debug!(
            "Model proposed {} matches for donation {}",
            candidates.len(),
            donation.id
        );

        Ok(candidates
            .into_iter()
            .map(|candidate| {
                FoodMatch::suggested(
                    donation.id.clone(),
                    candidate.request_id,
                    candidate.score,
                    created_at,
                )
            })
            .collect())
    }
}

/// Parse the model's reply as a JSON array of candidates
///
/// A reply wrapped in a single markdown code fence is unwrapped first.
/// Anything else that is not a JSON array of candidates is an error.
pub fn parse_candidates(text: &str) -> Result<Vec<MatchCandidate>, serde_json::Error> {
    serde_json::from_str(strip_code_fence(text))
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchSource, MatchStatus, Urgency};
    use async_trait::async_trait;

    struct FixedReply(Option<&'static str>);

    #[async_trait]
    impl TextCompletion for FixedReply {
        async fn complete(&self, _prompt: &str) -> Result<Option<String>, CompletionError> {
            Ok(self.0.map(str::to_string))
        }
    }

    struct Unavailable;

    #[async_trait]
    impl TextCompletion for Unavailable {
        async fn complete(&self, _prompt: &str) -> Result<Option<String>, CompletionError> {
            Err(CompletionError::ApiError {
                status: 503,
                message: "model overloaded".into(),
            })
        }
    }

    fn create_donation() -> Donation {
        Donation {
            id: "d1".into(),
            item_name: "Rice".into(),
            quantity: "10kg".into(),
            description: "Fresh basmati rice".into(),
            image_url: None,
            expiry_days: "30".into(),
            created_at: None,
            status: "pending".into(),
            user_id: "donor".into(),
            user_name: "Donor".into(),
            user_email: String::new(),
            location: None,
        }
    }

    fn create_request(id: &str) -> FoodRequest {
        FoodRequest {
            id: id.into(),
            item_name: "Rice".into(),
            quantity: "5kg".into(),
            description: "Need rice".into(),
            urgency: Urgency::High,
            created_at: None,
            status: "pending".into(),
            user_id: "recipient".into(),
            user_name: "Recipient".into(),
            user_email: String::new(),
            location: None,
        }
    }

    fn matcher(reply: Option<&'static str>) -> FoodMatcher {
        FoodMatcher::new(Arc::new(FixedReply(reply)))
    }

    #[tokio::test]
    async fn test_single_match_projection() {
        let matcher = matcher(Some(r#"[{"requestId":"r1","score":0.9}]"#));
        let requests = vec![create_request("r1"), create_request("r2")];

        let matches = matcher.match_food(&create_donation(), &requests).await.unwrap();

        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.donation_id, "d1");
        assert_eq!(m.request_id, "r1");
        assert_eq!(m.score, 0.9);
        assert_eq!(m.status, MatchStatus::Pending);
        assert_eq!(m.matched_by, MatchSource::Ai);
        assert_eq!(m.distance, 0.0);
        assert!(m.ngo_id.is_none());
        assert!(m.id.is_none());
    }

    #[tokio::test]
    async fn test_model_order_is_kept() {
        let matcher = matcher(Some(
            r#"[{"requestId":"r2","score":0.4,"reason":"partial"},{"requestId":"r1","score":0.8}]"#,
        ));
        let requests = vec![create_request("r1"), create_request("r2")];

        let matches = matcher.match_food(&create_donation(), &requests).await.unwrap();
        let ids: Vec<&str> = matches.iter().map(|m| m.request_id.as_str()).collect();
        assert_eq!(ids, vec!["r2", "r1"]);
    }

    #[tokio::test]
    async fn test_missing_text_is_an_error() {
        let err = matcher(None).match_food(&create_donation(), &[]).await.unwrap_err();
        assert!(matches!(err, MatchError::EmptyResponse));

        let err = matcher(Some("  \n")).match_food(&create_donation(), &[]).await.unwrap_err();
        assert!(matches!(err, MatchError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_prose_reply_fails_instead_of_returning_empty() {
        let err = matcher(Some("Sure! The best match is request r1."))
            .match_food(&create_donation(), &[create_request("r1")])
            .await
            .unwrap_err();
        assert!(matches!(err, MatchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_completion_failure_propagates() {
        let matcher = FoodMatcher::new(Arc::new(Unavailable));
        let err = matcher.match_food(&create_donation(), &[]).await.unwrap_err();
        assert!(matches!(err, MatchError::Completion(_)));
    }

    #[test]
    fn test_parse_fenced_reply() {
        let parsed = parse_candidates("```json\n[{\"requestId\": 7, \"score\": 0.5}]\n```").unwrap();
        assert_eq!(
            parsed,
            vec![MatchCandidate { request_id: "7".into(), score: 0.5, reason: None }]
        );
    }

    #[test]
    fn test_parse_rejects_entry_without_request_id() {
        assert!(parse_candidates(r#"[{"score":0.5}]"#).is_err());
        assert!(parse_candidates(r#"{"requestId":"r1","score":0.5}"#).is_err());
    }
}
