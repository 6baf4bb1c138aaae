use clap::Parser;
use std::time::Duration;
use crate::error::ConfigError;
use crate::provider::ProviderSettings;
use crate::rate_limit::RateLimiter;
use crate::retry::RetryPolicy;

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "travel-ai-gateway")]
#[command(about = "AI chat and destination recognition service for the travel planner")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // AI provider API key; without it the AI endpoints answer 503
    #[arg(long, env = "AI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    // OpenAI-compatible base URL
    #[arg(long, env = "AI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub base_url: String,

    #[arg(long, env = "AI_CHAT_MODEL", default_value = "gpt-4o-mini")]
    pub chat_model: String,

    #[arg(long, env = "AI_VISION_MODEL", default_value = "gpt-4o-mini")]
    pub vision_model: String,

    // Max AI calls per window, shared by chat and vision
    #[arg(long, env = "AI_RATE_LIMIT_CALLS", default_value_t = 3)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "AI_RATE_LIMIT_WINDOW", default_value_t = 60.0)]
    pub rate_window: f64,

    // Attempts per AI call, first try included
    #[arg(long, env = "AI_MAX_ATTEMPTS", default_value_t = 3)]
    pub max_attempts: u32,

    // Base retry delay in seconds, multiplied by the attempt number
    #[arg(long, env = "AI_RETRY_DELAY", default_value_t = 2.0)]
    pub retry_delay: f64,

    // Per-call HTTP timeout in seconds
    #[arg(long, env = "AI_REQUEST_TIMEOUT", default_value_t = 30)]
    pub request_timeout: u64,

    // Chat cache TTL in seconds (0 = off)
    #[arg(short, long, env = "AI_CACHE_TTL", default_value_t = 300)]
    pub cache_ttl: u64,

    // Largest accepted photo upload, decoded
    #[arg(long, env = "MAX_IMAGE_BYTES", default_value_t = 5 * 1024 * 1024)]
    pub max_image_bytes: usize,
}

impl Args {
    pub fn rate_limiter(&self) -> Result<RateLimiter, ConfigError> {
        RateLimiter::new(self.rate_limit, self.rate_window)
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy, ConfigError> {
        let delay = Duration::try_from_secs_f64(self.retry_delay)
            .map_err(|_| ConfigError::InvalidRetryDelay(self.retry_delay))?;
        RetryPolicy::new(self.max_attempts, delay)
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.request_timeout),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}
