use anyhow::Context;
use clap::Parser; // for cli
use std::sync::Arc;
use travel_ai_gateway::{config::Args, logging, router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    // parse cli arguments (env vars fill anything not passed)
    let args = Args::parse();
    let state = Arc::new(AppState::from_args(&args).context("invalid AI settings")?);

    if !state.ai_ready() {
        tracing::warn!("AI_API_KEY is not set, chat and recognition will answer 503");
    }
    tracing::info!(
        base_url = %args.base_url,
        chat_model = %args.chat_model,
        vision_model = %args.vision_model,
        "AI provider configured"
    );
    tracing::info!(
        "Rate limit: {} AI calls per {} seconds, {} attempts per call",
        args.rate_limit, args.rate_window, args.max_attempts
    );
    tracing::info!("Chat cache TTL: {} seconds", args.cache_ttl);

    let app = router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Gateway running on http://localhost:{}", args.port);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
