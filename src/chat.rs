use std::sync::Arc;
use crate::cache::{ReplyCache, make_cache_key};
use crate::error::AiError;
use crate::models::{ChatTurn, CompletionRequest, WireMessage};
use crate::provider::AiProvider;

pub const SYSTEM_PROMPT: &str = "You are a friendly travel planning assistant. \
Help users choose destinations, plan itineraries, and estimate budgets and trip durations. \
Keep answers concise and practical, and say so when you are unsure about prices or opening times.";

// Only the most recent turns are sent upstream
pub const MAX_HISTORY_TURNS: usize = 10;

const MAX_TOKENS: u32 = 800;

// Travel assistant chat on top of the shared provider
pub struct ChatClient {
    provider: Arc<AiProvider>,
    model: String,
    cache: ReplyCache,
}

impl ChatClient {
    pub fn new(provider: Arc<AiProvider>, model: impl Into<String>, cache: ReplyCache) -> Self {
        Self {
            provider,
            model: model.into(),
            cache,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.provider.is_ready()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider(&self) -> &Arc<AiProvider> {
        &self.provider
    }

    /// Answers `message` given the earlier conversation.
    ///
    /// Identical conversations within the cache TTL are answered from the
    /// cache without taking a slot from the rate limiter.
    pub async fn reply(&self, message: &str, history: &[ChatTurn]) -> Result<String, AiError> {
        if !self.is_ready() {
            return Err(AiError::NotConfigured);
        }

        let messages = build_messages(message, history);
        let cache_key = make_cache_key(&self.model, &messages);
        if let Some(reply) = self.cache.get(&cache_key) {
            return Ok(reply);
        }

        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(MAX_TOKENS),
            temperature: Some(0.7),
        };
        let reply = self.provider.complete(&request).await?;
        self.cache.insert(cache_key, reply.clone());
        Ok(reply)
    }
}

pub fn build_messages(message: &str, history: &[ChatTurn]) -> Vec<WireMessage> {
    let skip = history.len().saturating_sub(MAX_HISTORY_TURNS);

    let mut messages = Vec::with_capacity(MAX_HISTORY_TURNS + 2);
    messages.push(WireMessage::text("system", SYSTEM_PROMPT));
    messages.extend(
        history[skip..]
            .iter()
            .map(|turn| WireMessage::text(turn.role.clone(), turn.content.clone())),
    );
    messages.push(WireMessage::text("user", message.trim()));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::test_support::{completion, provider, spawn};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn turn(role: &str, content: &str) -> ChatTurn {
        ChatTurn { role: role.into(), content: content.into() }
    }

    #[test]
    fn history_is_trimmed_to_recent_turns() {
        let history: Vec<ChatTurn> = (0..15).map(|i| turn("user", &format!("q{i}"))).collect();
        let messages = build_messages("next?", &history);

        assert_eq!(messages.len(), MAX_HISTORY_TURNS + 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].content.cache_text(), "q5");
        assert_eq!(messages.last().unwrap().content.cache_text(), "next?");
    }

    #[tokio::test]
    async fn repeated_question_is_served_from_cache() {
        let fake = spawn(vec![(200, completion("Visit Hanoi in March."))]).await;
        let client = ChatClient::new(
            Arc::new(provider(&fake.url, Some("sk-test"))),
            "chat-model",
            ReplyCache::new(Duration::from_secs(60)),
        );

        let first = client.reply("When to visit Hanoi?", &[]).await.unwrap();
        let second = client.reply("When to visit Hanoi?", &[]).await.unwrap();

        assert_eq!(first, "Visit Hanoi in March.");
        assert_eq!(second, first);
        assert_eq!(fake.hits.load(Ordering::SeqCst), 1);
        assert_eq!(client.provider().limiter().recent_calls().await, 1);
        assert_eq!(fake.bodies.lock().unwrap()[0]["model"], "chat-model");
    }

    #[tokio::test]
    async fn not_ready_without_api_key() {
        let fake = spawn(vec![(200, completion("unused"))]).await;
        let client = ChatClient::new(
            Arc::new(provider(&fake.url, None)),
            "chat-model",
            ReplyCache::new(Duration::from_secs(60)),
        );

        assert!(!client.is_ready());
        assert!(matches!(client.reply("hi", &[]).await, Err(AiError::NotConfigured)));
    }
}
