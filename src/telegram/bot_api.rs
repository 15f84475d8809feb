//! Minimal Bot API client: sendPhoto, getFile, sendMessage.
//!
//! Talks to `<api_url>/bot<token>/<method>` directly with reqwest and decodes
//! the standard `{ok, result | description}` envelope. Every call is a single
//! attempt with no timeout; callers decide what a failure means.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use teloxide::types::{ChatId, ParseMode};
use thiserror::Error;

use crate::core::config::AppConfig;
use crate::core::error::AppResult;

/// Transport failures.
///
/// `Display` is the text shown to the user: the platform `description` for a
/// rejected request, the reqwest message for a network failure.
#[derive(Debug, Error)]
pub enum BotApiError {
    /// Request never completed or the body was not JSON
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// Platform answered `ok: false`
    #[error("{description}")]
    Api { description: String },

    /// Platform answered `ok: true` without the expected payload
    #[error("Unexpected Bot API response: {0}")]
    MalformedResponse(String),
}

/// Bot API response envelope
#[derive(Debug, Deserialize)]
struct BotApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> BotApiResponse<T> {
    fn into_result(self, method: &str) -> Result<T, BotApiError> {
        if !self.ok {
            return Err(BotApiError::Api {
                description: self
                    .description
                    .unwrap_or_else(|| format!("{} failed without description", method)),
            });
        }
        self.result
            .ok_or_else(|| BotApiError::MalformedResponse(format!("{} returned no result", method)))
    }
}

#[derive(Debug, Deserialize)]
struct ApiChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct ApiPhotoSize {
    file_id: String,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message_id: i64,
    chat: ApiChat,
    #[serde(default)]
    photo: Vec<ApiPhotoSize>,
}

#[derive(Debug, Deserialize)]
struct ApiFile {
    file_path: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessageBody<'a> {
    chat_id: ChatId,
    text: &'a str,
    parse_mode: ParseMode,
}

/// Photo bytes plus the metadata multipart needs.
#[derive(Debug, Clone)]
pub struct InputPhoto {
    pub file_name: String,
    pub mime_type: String,
    pub data: Bytes,
}

/// Successful `sendPhoto`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    /// `file_id` of the largest stored size
    pub file_id: String,
    pub message_id: i64,
    pub chat_id: i64,
}

/// Successful `getFile`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLink {
    pub url: String,
    pub file_path: String,
}

/// Successful `sendMessage`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: i64,
    pub chat_id: i64,
}

/// The three bot operations the app depends on.
#[async_trait]
pub trait BotTransport: Send + Sync {
    async fn send_photo(&self, chat_id: ChatId, photo: InputPhoto, caption: &str) -> Result<PhotoUpload, BotApiError>;

    async fn get_file(&self, file_id: &str) -> Result<FileLink, BotApiError>;

    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<SentMessage, BotApiError>;
}

/// reqwest-backed [`BotTransport`]
pub struct TelegramBotApi {
    client: Client,
    api_url: String,
    token: SecretString,
}

impl TelegramBotApi {
    pub fn new(api_url: impl Into<String>, token: SecretString) -> AppResult<Self> {
        let client = Client::builder().user_agent("dvtrusted/0.3").build()?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Self::new(config.bot_api_url.clone(), config.bot_token.clone())
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token.expose_secret(), method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_url, self.token.expose_secret(), file_path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response, method: &str) -> Result<T, BotApiError> {
        // Bot API puts the reason in the envelope for 4xx answers too, so the
        // status code alone is not checked.
        let envelope: BotApiResponse<T> = response.json().await?;
        envelope.into_result(method)
    }
}

#[async_trait]
impl BotTransport for TelegramBotApi {
    async fn send_photo(&self, chat_id: ChatId, photo: InputPhoto, caption: &str) -> Result<PhotoUpload, BotApiError> {
        log::info!(
            "📸 Uploading {} ({} bytes) to chat {}",
            photo.file_name,
            photo.data.len(),
            chat_id
        );

        let part = Part::bytes(photo.data.to_vec())
            .file_name(photo.file_name)
            .mime_str(&photo.mime_type)?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("photo", part)
            .text("caption", caption.to_string());

        let response = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await
            .inspect_err(|e| log::error!("❌ sendPhoto request failed: {}", e))?;

        let message: ApiMessage = Self::decode(response, "sendPhoto")
            .await
            .inspect_err(|e| log::error!("❌ Telegram upload failed: {}", e))?;

        let file_id = message
            .photo
            .last()
            .map(|size| size.file_id.clone())
            .ok_or_else(|| BotApiError::MalformedResponse("sendPhoto returned no photo sizes".to_string()))?;

        log::info!("✅ Photo uploaded as message {}", message.message_id);
        Ok(PhotoUpload {
            file_id,
            message_id: message.message_id,
            chat_id: message.chat.id,
        })
    }

    async fn get_file(&self, file_id: &str) -> Result<FileLink, BotApiError> {
        let response = self
            .client
            .get(self.method_url("getFile"))
            .query(&[("file_id", file_id)])
            .send()
            .await?;

        let file: ApiFile = Self::decode(response, "getFile").await?;
        let file_path = file
            .file_path
            .ok_or_else(|| BotApiError::MalformedResponse("getFile returned no file_path".to_string()))?;

        Ok(FileLink {
            url: self.file_url(&file_path),
            file_path,
        })
    }

    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<SentMessage, BotApiError> {
        let body = SendMessageBody {
            chat_id,
            text,
            parse_mode: ParseMode::Html,
        };

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?;

        let message: ApiMessage = Self::decode(response, "sendMessage").await?;
        Ok(SentMessage {
            message_id: message.message_id,
            chat_id: message.chat.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "123:TEST";

    fn api(server: &MockServer) -> TelegramBotApi {
        TelegramBotApi::new(server.uri(), SecretString::from(TOKEN.to_string())).unwrap()
    }

    fn jpeg() -> InputPhoto {
        InputPhoto {
            file_name: "proof.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            // Multipart bodies are matched as UTF-8, so the payload stays ASCII.
            data: Bytes::from_static(b"fake-jpeg-bytes"),
        }
    }

    #[tokio::test]
    async fn test_send_photo_success_returns_largest_size() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{}/sendPhoto", TOKEN)))
            .and(body_string_contains("name=\"chat_id\""))
            .and(body_string_contains("Task: t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {
                    "message_id": 77,
                    "date": 1700000000,
                    "chat": {"id": -1001, "type": "supergroup"},
                    "photo": [
                        {"file_id": "small", "file_unique_id": "s", "width": 90, "height": 90},
                        {"file_id": "large", "file_unique_id": "l", "width": 1280, "height": 1280}
                    ]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let upload = api(&server)
            .send_photo(ChatId(-1001), jpeg(), "Task: t1\nUser: 5")
            .await
            .unwrap();

        assert_eq!(
            upload,
            PhotoUpload {
                file_id: "large".to_string(),
                message_id: 77,
                chat_id: -1001,
            }
        );
    }

    #[tokio::test]
    async fn test_send_photo_platform_rejection_surfaces_description() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{}/sendPhoto", TOKEN)))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&server)
            .await;

        let err = api(&server).send_photo(ChatId(1), jpeg(), "c").await.unwrap_err();
        assert!(matches!(err, BotApiError::Api { .. }));
        assert_eq!(err.to_string(), "Bad Request: chat not found");
    }

    #[tokio::test]
    async fn test_send_photo_network_failure() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let api = TelegramBotApi::new(uri, SecretString::from(TOKEN.to_string())).unwrap();
        let err = api.send_photo(ChatId(1), jpeg(), "c").await.unwrap_err();
        assert!(matches!(err, BotApiError::Network(_)));
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn test_get_file_builds_download_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/bot{}/getFile", TOKEN)))
            .and(query_param("file_id", "large"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {"file_id": "large", "file_unique_id": "l", "file_path": "photos/file_3.jpg"}
            })))
            .mount(&server)
            .await;

        let link = api(&server).get_file("large").await.unwrap();
        assert_eq!(link.file_path, "photos/file_3.jpg");
        assert_eq!(link.url, format!("{}/file/bot{}/photos/file_3.jpg", server.uri(), TOKEN));
    }

    #[tokio::test]
    async fn test_get_file_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/bot{}/getFile", TOKEN)))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "description": "Bad Request: invalid file_id"
            })))
            .mount(&server)
            .await;

        let err = api(&server).get_file("nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Bad Request: invalid file_id");
    }

    #[tokio::test]
    async fn test_send_message_posts_html_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{}/sendMessage", TOKEN)))
            .and(body_string_contains("\"parse_mode\":\"HTML\""))
            .and(body_string_contains("\"chat_id\":42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {"message_id": 5, "date": 1700000000, "chat": {"id": 42, "type": "private"}, "text": "hi"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sent = api(&server).send_message(ChatId(42), "hi").await.unwrap();
        assert_eq!(sent, SentMessage { message_id: 5, chat_id: 42 });
    }

    #[test]
    fn test_envelope_without_result_is_malformed() {
        let envelope: BotApiResponse<ApiFile> = serde_json::from_value(json!({"ok": true})).unwrap();
        let err = envelope.into_result("getFile").unwrap_err();
        assert!(matches!(err, BotApiError::MalformedResponse(_)));
    }
}
