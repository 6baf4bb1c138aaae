mod chat;
mod health;
mod metrics;
mod recognize;

pub use chat::chat_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use recognize::recognize_handler;
