use moka::future::Cache;
use std::time::Duration;

/// Sessions that have already talked to the chatbot
///
/// Keyed by session id. Entries expire after the configured TTL, after
/// which the session is greeted again.
#[derive(Clone)]
pub struct ConversationStore {
    sessions: Cache<String, ()>,
}

impl ConversationStore {
    pub fn new(max_sessions: u64, ttl_secs: u64) -> Self {
        let sessions = moka::future::CacheBuilder::new(max_sessions)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { sessions }
    }

    /// Record a message for the session; `true` if it is the first one
    pub async fn register_message(&self, session_id: &str) -> bool {
        let entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert(())
            .await;

        let first = entry.is_fresh();
        if first {
            tracing::trace!("New chat session: {}", session_id);
        }
        first
    }
}
