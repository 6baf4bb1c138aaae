use std::sync::Arc;
use crate::cache::ReplyCache;
use crate::chat::ChatClient;
use crate::config::Args;
use crate::provider::AiProvider;
use crate::rate_limit::RateLimiter;
use crate::vision::VisionClient;

// app's shared state
pub struct AppState {
    pub chat: ChatClient,
    pub vision: VisionClient,
    pub limiter: Arc<RateLimiter>, // one window for every AI call in the process
    pub max_image_bytes: usize,
}

impl AppState {
    // Builds the single limiter and hands it to both AI wrappers
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let limiter = Arc::new(args.rate_limiter()?);
        let provider = Arc::new(AiProvider::new(
            args.provider_settings(),
            Arc::clone(&limiter),
            args.retry_policy()?,
        )?);

        Ok(Self {
            chat: ChatClient::new(
                Arc::clone(&provider),
                args.chat_model.clone(),
                ReplyCache::new(args.cache_ttl()),
            ),
            vision: VisionClient::new(provider, args.vision_model.clone()),
            limiter,
            max_image_bytes: args.max_image_bytes,
        })
    }

    pub fn ai_ready(&self) -> bool {
        self.chat.is_ready() && self.vision.is_ready()
    }
}
