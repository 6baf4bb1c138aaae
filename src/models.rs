use serde::{Deserialize, Serialize};

// ---- client-facing API ----

// One earlier turn of the conversation
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ChatResponse {
    pub reply: String,
    pub model: String,
}

// Photo upload, `image` is base64 or a base64 data URL
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct RecognizeRequest {
    pub image: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

// Destination the vision model thinks the photo shows
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Recognition {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub confidence: f64,
}

// ---- AI provider wire format (OpenAI-compatible chat completions) ----

#[derive(Serialize, Clone, Debug)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Serialize, Clone, Debug)]
pub struct WireMessage {
    pub role: String,
    pub content: MessageContent,
}

impl WireMessage {
    pub fn text(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: MessageContent::Text(text.into()),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    // Text used for cache keys, image parts contribute their URL
    pub fn cache_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text { text } => text.as_str(),
                    ContentPart::ImageUrl { image_url } => image_url.url.as_str(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize, Clone, Debug)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}
