use crate::errors::DrillError;
use crate::openai::requests::Exchange;
use log::debug;
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use serde_json::json;

static BASE_URL: &str = "https://api.openai.com/v1";

/// Model used when no override is configured.
pub static DEFAULT_MODEL: &str = "gpt-4o-mini";

/// How much of an error body is quoted back to the user.
const ERROR_BODY_LIMIT: usize = 300;

#[derive(Debug, Clone)]
pub struct Client {
    client: ReqwestClient,
    api_key: String,
    model: String,
}

impl Client {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Client {
            client: ReqwestClient::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Perform one exchange: post the request with its declared response
    /// shape, deserialize the answer into `R::Response`, and run the
    /// request's own validation over it.
    pub async fn send<R: Exchange>(&self, request: R) -> Result<R::Response, DrillError> {
        let url = format!("{}/chat/completions", BASE_URL);
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.instructions() },
                { "role": "user", "content": request.payload() },
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": R::SHAPE,
                    "strict": true,
                    "schema": request.schema(),
                },
            },
        });

        debug!("sending {} exchange to {}", R::SHAPE, self.model);

        let response = self
            .client
            .post(&url)
            .headers(request.headers())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(DrillError::exchange(format!(
                "service returned {}: {}",
                status,
                summarize(&text)
            )));
        }

        let parsed = decode_envelope::<R::Response>(&text)?;

        request.validate(&parsed).map_err(|cause| {
            DrillError::exchange(format!(
                "response does not conform to the {} shape: {}",
                R::SHAPE,
                cause
            ))
        })?;

        Ok(parsed)
    }
}

#[derive(Deserialize)]
struct Envelope {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    refusal: Option<String>,
}

/// Unwrap the completion envelope and deserialize the structured content
/// inside it.
fn decode_envelope<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T, DrillError> {
    let envelope: Envelope = serde_json::from_str(body).map_err(|e| {
        DrillError::exchange(format!("malformed completion envelope: {}", e)).with_source(e)
    })?;

    let Some(choice) = envelope.choices.into_iter().next() else {
        return Err(DrillError::exchange("completion contained no choices"));
    };

    if let Some(refusal) = choice.message.refusal {
        return Err(DrillError::exchange(format!(
            "service refused the request: {}",
            refusal
        )));
    }

    let Some(content) = choice.message.content else {
        return Err(DrillError::exchange("completion contained no content"));
    };

    serde_json::from_str(&content).map_err(|e| {
        DrillError::exchange(format!(
            "response does not match the declared shape: {}",
            e
        ))
        .with_source(e)
    })
}

fn summarize(body: &str) -> String {
    let trimmed = body.trim();

    match trimmed.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((index, _)) => format!("{}...", &trimmed[..index]),
        None => trimmed.to_string(),
    }
}
