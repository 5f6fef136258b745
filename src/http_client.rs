use anyhow::{Context, Result};
use reqwest::{Client, Proxy, Request, Response};
use std::time::Duration;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::openai::{ChatCompletionRequest, ChatCompletionResponse};

/// HTTP client for the OpenAI chat completion API with retry logic
pub struct OpenAiClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// API key, absent when the server runs without OpenAI
    api_key: Option<String>,

    /// Base URL, e.g. https://api.openai.com/v1
    base_url: String,

    /// Maximum number of retries
    max_retries: u32,

    /// Base delay for exponential backoff (milliseconds)
    base_delay_ms: u64,
}

impl OpenAiClient {
    /// Create a new client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(config.http_connect_timeout))
            .timeout(Duration::from_secs(config.http_request_timeout));

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url)
                .with_context(|| format!("Invalid proxy URL: {}", proxy_url))?;
            builder = builder.proxy(proxy);
            tracing::info!("Using proxy: {}", proxy_url);
        } else {
            tracing::info!("No proxy configured.");
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.clone(),
            max_retries: config.http_max_retries,
            base_delay_ms: 500,
        })
    }

    /// Override the backoff base delay (tests use a tiny delay)
    pub fn with_base_delay_ms(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// POST /chat/completions and decode the response
    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ApiError> {
        let api_key = self.api_key.as_ref().ok_or(ApiError::OpenAiNotConfigured)?;
        let url = format!("{}/chat/completions", self.base_url);

        let req = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .build()
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to build request: {}", e)))?;

        let response = self.request_with_retry(req).await?;

        response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| ApiError::OpenAi {
                status: 502,
                message: format!("Malformed completion response: {}", e),
            })
    }

    /// Execute a request with retry logic
    /// Automatically handles:
    /// - 429: exponential backoff
    /// - 5xx: exponential backoff
    /// - network errors: exponential backoff
    async fn request_with_retry(&self, request: Request) -> Result<Response, ApiError> {
        let mut attempt = 0;
        let url = request.url().clone();

        tracing::debug!(method = %request.method(), url = %url, "Sending HTTP request");

        loop {
            let req = request.try_clone().ok_or_else(|| {
                ApiError::Internal(anyhow::anyhow!("Request body is not cloneable"))
            })?;

            match self.client.execute(req).await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        tracing::debug!(status = %status, "Request successful");
                        return Ok(response);
                    }

                    let retryable = status.as_u16() == 429 || status.is_server_error();
                    if retryable && attempt < self.max_retries {
                        let delay = self.calculate_backoff_delay(attempt);
                        tracing::warn!(
                            "Received {}, retrying after {}ms (attempt {}/{})",
                            status,
                            delay,
                            attempt + 1,
                            self.max_retries
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        attempt += 1;
                        continue;
                    }

                    let error_text = response.text().await.unwrap_or_default();
                    tracing::error!(
                        status = status.as_u16(),
                        url = %url,
                        response_body = %error_text,
                        attempt = attempt + 1,
                        "HTTP request failed with error response"
                    );
                    return Err(ApiError::OpenAi {
                        status: status.as_u16(),
                        message: extract_error_message(&error_text),
                    });
                }

                Err(e) => {
                    let error_kind = if e.is_timeout() {
                        "timeout"
                    } else if e.is_connect() {
                        "connection_failed"
                    } else if e.is_request() {
                        "request_error"
                    } else {
                        "unknown"
                    };

                    if attempt < self.max_retries {
                        let delay = self.calculate_backoff_delay(attempt);
                        tracing::warn!(
                            error_kind = error_kind,
                            error = %e,
                            "Request failed, retrying after {}ms (attempt {}/{})",
                            delay,
                            attempt + 1,
                            self.max_retries
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        attempt += 1;
                        continue;
                    }

                    tracing::error!(
                        error_kind = error_kind,
                        error = %e,
                        url = %url,
                        total_attempts = attempt + 1,
                        "HTTP request failed after all retries"
                    );
                    return Err(ApiError::OpenAi {
                        status: 503,
                        message: format!("{} (kind: {})", e, error_kind),
                    });
                }
            }
        }
    }

    /// Calculate exponential backoff delay
    fn calculate_backoff_delay(&self, attempt: u32) -> u64 {
        // base_delay * 2^attempt plus up to 10% jitter
        let delay = self
            .base_delay_ms
            .saturating_mul(2_u64.saturating_pow(attempt));
        let jitter = (delay as f64 * 0.1 * rand::random::<f64>()) as u64;
        delay.saturating_add(jitter)
    }
}

/// Pull `error.message` out of an OpenAI error body, falling back to the raw text
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliArgs;
    use crate::models::openai::ChatMessage;
    use clap::Parser;

    fn test_config(base_url: &str, key: Option<&str>) -> Config {
        let mut config = Config::from_args(CliArgs::parse_from(["wellness-sentinel"]));
        config.openai_base_url = base_url.to_string();
        config.openai_api_key = key.map(|k| k.to_string());
        config.proxy_url = None;
        config.http_max_retries = 2;
        config
    }

    fn sample_request() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![ChatMessage::user("hello")],
            temperature: Some(0.5),
            max_tokens: Some(100),
        }
    }

    #[test]
    fn test_backoff_calculation() {
        let client = OpenAiClient::new(&test_config("http://localhost", Some("sk-test")))
            .unwrap()
            .with_base_delay_ms(1000);

        let delay0 = client.calculate_backoff_delay(0);
        let delay1 = client.calculate_backoff_delay(1);
        let delay2 = client.calculate_backoff_delay(2);

        assert!((1000..=1100).contains(&delay0));
        assert!((2000..=2200).contains(&delay1));
        assert!((4000..=4400).contains(&delay2));
    }

    #[test]
    fn test_backoff_saturates_for_large_attempts() {
        let client = OpenAiClient::new(&test_config("http://localhost", Some("sk-test")))
            .unwrap()
            .with_base_delay_ms(500);

        assert_eq!(client.calculate_backoff_delay(64), u64::MAX);
        assert_eq!(client.calculate_backoff_delay(200), u64::MAX);
    }

    #[test]
    fn test_extract_error_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(extract_error_message(body), "Incorrect API key provided");
        assert_eq!(extract_error_message("plain failure"), "plain failure");
    }

    #[tokio::test]
    async fn test_missing_key_is_reported() {
        let client = OpenAiClient::new(&test_config("http://localhost", None)).unwrap();
        assert!(!client.is_configured());

        let result = client.chat_completion(&sample_request()).await;
        assert!(matches!(result, Err(ApiError::OpenAiNotConfigured)));
    }

    #[tokio::test]
    async fn test_chat_completion_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":"c1","model":"gpt-3.5-turbo","choices":[{"index":0,"message":{"role":"assistant","content":"hi there"},"finish_reason":"stop"}]}"#,
            )
            .create_async()
            .await;

        let client = OpenAiClient::new(&test_config(&server.url(), Some("sk-test"))).unwrap();
        let response = client.chat_completion(&sample_request()).await.unwrap();

        assert_eq!(response.first_content(), Some("hi there"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_chat_completion_retries_server_errors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("upstream broke")
            .expect(3)
            .create_async()
            .await;

        let client = OpenAiClient::new(&test_config(&server.url(), Some("sk-test")))
            .unwrap()
            .with_base_delay_ms(1);
        let result = client.chat_completion(&sample_request()).await;

        match result {
            Err(ApiError::OpenAi { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream broke");
            }
            other => panic!("Expected OpenAi error, got {:?}", other),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_chat_completion_does_not_retry_client_errors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Invalid key"}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = OpenAiClient::new(&test_config(&server.url(), Some("sk-test")))
            .unwrap()
            .with_base_delay_ms(1);
        let result = client.chat_completion(&sample_request()).await;

        assert!(matches!(result, Err(ApiError::OpenAi { status: 401, .. })));
        mock.assert_async().await;
    }
}
