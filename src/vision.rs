use base64::{Engine, engine::general_purpose::STANDARD};
use std::sync::Arc;
use crate::error::AiError;
use crate::models::{CompletionRequest, ContentPart, ImageUrl, MessageContent, Recognition, WireMessage};
use crate::provider::AiProvider;

const RECOGNITION_PROMPT: &str = "Identify the travel destination, landmark or city shown in this photo. \
Answer with a single JSON object and nothing else, using the keys \
\"name\" (string), \"country\" (string or null), \"description\" (one or two sentences) \
and \"confidence\" (number between 0 and 1). \
If you cannot tell, use \"Unknown\" as the name and 0 as the confidence.";

// Destination recognition from photos
pub struct VisionClient {
    provider: Arc<AiProvider>,
    model: String,
}

impl VisionClient {
    pub fn new(provider: Arc<AiProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
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

    pub async fn recognize(&self, image: &[u8], mime_type: &str) -> Result<Recognition, AiError> {
        if !self.is_ready() {
            return Err(AiError::NotConfigured);
        }

        let data_url = format!("data:{};base64,{}", mime_type, STANDARD.encode(image));
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![WireMessage {
                role: "user".to_string(),
                content: MessageContent::Parts(vec![
                    ContentPart::Text { text: RECOGNITION_PROMPT.to_string() },
                    ContentPart::ImageUrl { image_url: ImageUrl { url: data_url } },
                ]),
            }],
            max_tokens: Some(300),
            temperature: Some(0.2),
        };

        let answer = self.provider.complete(&request).await?;
        parse_recognition(&answer)
    }
}

/// Pulls the JSON object out of the model's answer.
///
/// Models sometimes wrap the object in a markdown code fence or add a
/// sentence around it, so only the outermost `{ ... }` is parsed.
pub fn parse_recognition(answer: &str) -> Result<Recognition, AiError> {
    let start = answer.find('{');
    let end = answer.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &answer[start..=end],
        _ => {
            return Err(AiError::MalformedResponse(
                "recognition answer has no JSON object".to_string(),
            ));
        }
    };

    let mut recognition: Recognition = serde_json::from_str(json)
        .map_err(|e| AiError::MalformedResponse(format!("recognition JSON: {}", e)))?;

    recognition.name = recognition.name.trim().to_string();
    if recognition.name.is_empty() {
        return Err(AiError::MalformedResponse("recognition has no name".to_string()));
    }
    recognition.country = recognition
        .country
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    recognition.confidence = if recognition.confidence.is_finite() {
        recognition.confidence.clamp(0.0, 1.0)
    } else {
        0.0
    };
    Ok(recognition)
}
