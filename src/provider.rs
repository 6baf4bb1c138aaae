use std::sync::Arc;
use std::time::Duration;
use crate::error::AiError;
use crate::models::{CompletionRequest, CompletionResponse};
use crate::rate_limit::RateLimiter;
use crate::retry::RetryPolicy;

// Where and how to reach the AI provider
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// HTTP client for an OpenAI-compatible chat completions endpoint.
///
/// Every call goes through the shared [`RateLimiter`] and the [`RetryPolicy`],
/// so the chat and vision wrappers built on top of it draw from one budget.
pub struct AiProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl AiProvider {
    pub fn new(
        settings: ProviderSettings,
        limiter: Arc<RateLimiter>,
        retry: RetryPolicy,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(settings.timeout).build()?;
        let api_key = settings.api_key.filter(|key| !key.trim().is_empty());

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
            limiter,
            retry,
        })
    }

    // true once an API key is configured
    pub fn is_ready(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    // Rate-limited, retried completion; returns the first choice's text
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AiError::NotConfigured);
        };

        self.retry
            .run(&self.limiter, move || self.send_once(api_key, request))
            .await
    }

    async fn send_once(&self, api_key: &str, request: &CompletionRequest) -> Result<String, AiError> {
        let res = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AiError::from_status(status, body));
        }

        let body: CompletionResponse = res
            .json()
            .await
            .map_err(|e| AiError::MalformedResponse(format!("Parse Error: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AiError::MalformedResponse("completion has no text".to_string()))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{completion, provider, spawn};
    use super::*;
    use crate::models::WireMessage;
    use std::sync::atomic::Ordering;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "test-model".into(),
            messages: vec![WireMessage::text("user", "Best time to visit Kyoto?")],
            max_tokens: None,
            temperature: None,
        }
    }

    #[tokio::test]
    async fn returns_first_choice_text() {
        let fake = spawn(vec![(200, completion("  Late autumn.  "))]).await;
        let provider = provider(&fake.url, Some("sk-test"));

        let text = provider.complete(&request()).await.unwrap();
        assert_eq!(text, "Late autumn.");
        assert_eq!(fake.auth.lock().unwrap().as_slice(), ["Bearer sk-test"]);
        assert_eq!(fake.bodies.lock().unwrap()[0]["model"], "test-model");
    }

    #[tokio::test]
    async fn missing_key_fails_without_calling_out() {
        let fake = spawn(vec![(200, completion("unused"))]).await;
        let provider = provider(&fake.url, Some("   "));

        assert!(!provider.is_ready());
        assert!(matches!(provider.complete(&request()).await, Err(AiError::NotConfigured)));
        assert_eq!(fake.hits.load(Ordering::SeqCst), 0);
        assert_eq!(provider.limiter().recent_calls().await, 0);
    }

    #[tokio::test]
    async fn retries_server_errors() {
        let fake = spawn(vec![
            (500, serde_json::json!({ "error": "boom" })),
            (503, serde_json::json!({ "error": "busy" })),
            (200, completion("Try Porto.")),
        ])
        .await;
        let provider = provider(&fake.url, Some("sk-test"));

        assert_eq!(provider.complete(&request()).await.unwrap(), "Try Porto.");
        assert_eq!(fake.hits.load(Ordering::SeqCst), 3);
        assert_eq!(provider.limiter().recent_calls().await, 3);
    }

    #[tokio::test]
    async fn provider_429_is_not_retried() {
        let fake = spawn(vec![(429, serde_json::json!({ "error": "slow down" }))]).await;
        let provider = provider(&fake.url, Some("sk-test"));

        assert!(matches!(provider.complete(&request()).await, Err(AiError::RateLimited)));
        assert_eq!(fake.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_choices_are_malformed() {
        let fake = spawn(vec![(200, serde_json::json!({ "choices": [] }))]).await;
        let provider = provider(&fake.url, Some("sk-test"));

        assert!(matches!(
            provider.complete(&request()).await,
            Err(AiError::MalformedResponse(_))
        ));
        assert_eq!(fake.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_transient_failure() {
        // nothing listens on port 9 locally
        let provider = provider("http://127.0.0.1:9/v1", Some("sk-test"));
        let err = provider.complete(&request()).await.unwrap_err();
        assert!(err.is_transient(), "unexpected {err:?}");
        assert_eq!(provider.limiter().recent_calls().await, 3);
    }
}
