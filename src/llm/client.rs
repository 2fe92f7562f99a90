// HTTP client for OpenAI-compatible chat completion endpoints

use super::{ChatTurn, CompletionError, CompletionRequest, CompletionService, LlmConfig};
use serde_json::json;
use std::time::Duration;

/// Blocking HTTP client for the completion service. The interview turn is a
/// single synchronous step; async callers run it inside `spawn_blocking`.
pub struct HttpCompletionClient {
    config: LlmConfig,
    client: reqwest::blocking::Client,
}

impl HttpCompletionClient {
    pub fn new(config: LlmConfig) -> Result<Self, CompletionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CompletionError::Request(format!("failed to build client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

impl CompletionService for HttpCompletionClient {
    fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let mut messages = vec![ChatTurn {
            role: "system".to_string(),
            content: request.system,
        }];
        messages.extend(request.messages);

        let body = json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": request.temperature,
        });

        let response = self
            .client
            .post(self.completions_url())
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .json(&body)
            .send()
            .map_err(|e| CompletionError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: serde_json::Value = response
            .json()
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                CompletionError::Malformed("response carried no message content".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url_tolerates_trailing_slash() {
        let mut config = LlmConfig::new("key");
        config.base_url = "https://api.together.xyz/v1/".to_string();
        let client = HttpCompletionClient::new(config).unwrap();
        assert_eq!(
            client.completions_url(),
            "https://api.together.xyz/v1/chat/completions"
        );
    }
}
