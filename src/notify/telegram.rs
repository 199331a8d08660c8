//! Telegram Bot API delivery.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{TelegramConfig, TelegramCredentials};
use crate::notify::{Notifier, NotifyError};
use crate::utils::HttpClient;

/// `sendMessage` request body
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Posts digest chunks to a Telegram chat through the Bot API
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Arc<HttpClient>,
    api_base: String,
    credentials: TelegramCredentials,
    max_chunk_chars: usize,
    disable_web_page_preview: bool,
}

impl TelegramNotifier {
    pub fn new(
        config: &TelegramConfig,
        credentials: TelegramCredentials,
        client: Arc<HttpClient>,
    ) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            credentials,
            max_chunk_chars: config.max_chunk_chars,
            disable_web_page_preview: config.disable_web_page_preview,
        }
    }

    /// `sendMessage` endpoint; contains the bot token, never log it
    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base,
            self.credentials.bot_token()
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "Telegram"
    }

    fn max_chunk_chars(&self) -> usize {
        self.max_chunk_chars
    }

    async fn send_chunk(&self, chunk: &str) -> Result<(), NotifyError> {
        let request = SendMessageRequest {
            chat_id: self.credentials.chat_id(),
            text: chunk,
            disable_web_page_preview: self.disable_web_page_preview,
        };

        let response = self
            .client
            .post(&self.send_message_url())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed = serde_json::from_str::<BotApiResponse>(&body).ok();

        if !status.is_success() {
            let description = parsed
                .and_then(|r| r.description)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(NotifyError::Api {
                status: status.as_u16(),
                description,
            });
        }

        match parsed {
            Some(BotApiResponse { ok: false, description }) => Err(NotifyError::Rejected(
                description.unwrap_or_else(|| "no description".to_string()),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use mockito::Matcher;
    use serde_json::json;

    const TOKEN: &str = "123456:test-token";

    fn notifier(api_base: &str, max_chunk_chars: usize) -> TelegramNotifier {
        let config = TelegramConfig {
            api_base: api_base.to_string(),
            max_chunk_chars,
            disable_web_page_preview: true,
        };
        let client = HttpClient::from_config(&HttpConfig::default()).unwrap();
        TelegramNotifier::new(
            &config,
            TelegramCredentials::new(TOKEN, "-100200300"),
            Arc::new(client),
        )
    }

    #[test]
    fn test_send_message_url() {
        let n = notifier("https://api.telegram.org/", 3500);
        assert_eq!(
            n.send_message_url(),
            "https://api.telegram.org/bot123456:test-token/sendMessage"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let request = SendMessageRequest {
            chat_id: "-100200300",
            text: "hello",
            disable_web_page_preview: true,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"chat_id": "-100200300", "text": "hello", "disable_web_page_preview": true})
        );
    }

    #[tokio::test]
    async fn test_send_posts_each_chunk_in_order() {
        let mut server = mockito::Server::new_async().await;
        let path = format!("/bot{}/sendMessage", TOKEN);
        let first = server
            .mock("POST", path.as_str())
            .match_body(Matcher::Json(json!({
                "chat_id": "-100200300",
                "text": "alpha beta",
                "disable_web_page_preview": true
            })))
            .with_status(200)
            .with_body(r#"{"ok":true,"result":{"message_id":1}}"#)
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("POST", path.as_str())
            .match_body(Matcher::PartialJson(json!({"text": "gamma delta"})))
            .with_status(200)
            .with_body(r#"{"ok":true,"result":{"message_id":2}}"#)
            .expect(1)
            .create_async()
            .await;

        let sent = notifier(&server.url(), 11)
            .send("alpha beta gamma delta")
            .await
            .unwrap();

        assert_eq!(sent, 2);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_carries_description() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Any)
            .with_status(400)
            .with_body(r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#)
            .create_async()
            .await;

        let err = notifier(&server.url(), 3500)
            .send_chunk("hello")
            .await
            .unwrap_err();

        match err {
            NotifyError::Api { status, description } => {
                assert_eq!(status, 400);
                assert_eq!(description, "Bad Request: chat not found");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ok_false_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"ok":false,"description":"Forbidden: bot was blocked by the user"}"#)
            .create_async()
            .await;

        let err = notifier(&server.url(), 3500)
            .send_chunk("hello")
            .await
            .unwrap_err();

        assert!(matches!(err, NotifyError::Rejected(d) if d.contains("blocked")));
    }

    #[tokio::test]
    async fn test_network_error_hides_token() {
        // Nothing listens on the discard port
        let err = notifier("http://127.0.0.1:9", 3500)
            .send_chunk("hello")
            .await
            .unwrap_err();

        assert!(matches!(err, NotifyError::Network(_)));
        assert!(!err.to_string().contains("test-token"));
    }
}
