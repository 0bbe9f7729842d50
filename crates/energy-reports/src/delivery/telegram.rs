//! Telegram Bot API delivery
//!
//! Messages go to the energy chat, or to the test chat in preview mode.
//! Long texts are split below Telegram's 4096-character limit.

use crate::error::{ReportError, Result};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Maximum characters per message
pub const MESSAGE_LIMIT: usize = 4096;

/// Telegram bot configuration
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    /// Forum topic to post into
    pub message_thread_id: Option<i64>,
    pub base_url: String,
}

impl TelegramConfig {
    /// Read the bot configuration from the environment
    ///
    /// Returns `None` when the token or the target chat is missing.
    pub fn from_env(preview: bool) -> Option<Self> {
        Self::from_lookup(preview, |var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(preview: bool, lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bot_token = get("TELEGRAM_BOT_TOKEN")?;
        let main_chat = get("TELEGRAM_CHAT_ID_ENERGY").or_else(|| get("TELEGRAM_CHAT_ID"));
        let chat_id = if preview {
            get("TELEGRAM_CHAT_ID_TEST").or(main_chat)
        } else {
            main_chat
        }?;

        let message_thread_id = get("TELEGRAM_MESSAGE_THREAD_ID").and_then(|v| v.parse().ok());

        Some(Self {
            bot_token,
            chat_id,
            message_thread_id,
            base_url: TELEGRAM_API_URL.to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.bot_token, method)
    }
}

/// Text formatting requested from Telegram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Html,
    Markdown,
    Plain,
}

impl ParseMode {
    fn as_api(self) -> Option<&'static str> {
        match self {
            ParseMode::Html => Some("HTML"),
            ParseMode::Markdown => Some("Markdown"),
            ParseMode::Plain => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    disable_web_page_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_thread_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

enum Outcome {
    Sent,
    /// Rejected because the markup did not parse
    BadMarkup(String),
}

fn cut_point(window: &str) -> usize {
    for sep in ["\n\n", "\n", ". ", " "] {
        if let Some(pos) = window.rfind(sep) {
            if pos > 0 {
                return pos + sep.len();
            }
        }
    }
    window.len()
}

/// Split `text` into chunks of at most `limit` characters
///
/// Prefers paragraph, then line, then sentence, then word boundaries.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > limit {
        let end = rest.char_indices().nth(limit).map_or(rest.len(), |(i, _)| i);
        let cut = cut_point(&rest[..end]);
        let chunk = rest[..cut].trim_end();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        rest = rest[cut..].trim_start();
    }

    if !rest.trim().is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}

/// Telegram Bot API client
#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: Client,
    config: TelegramConfig,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client, config })
    }

    pub fn chat_id(&self) -> &str {
        &self.config.chat_id
    }

    async fn post_message(&self, text: &str, mode: ParseMode) -> Result<Outcome> {
        let payload = SendMessage {
            chat_id: &self.config.chat_id,
            text,
            parse_mode: mode.as_api(),
            disable_web_page_preview: true,
            message_thread_id: self.config.message_thread_id,
        };

        let response = self
            .client
            .post(self.config.method_url("sendMessage"))
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        let body: ApiResponse = response.json().await.unwrap_or(ApiResponse {
            ok: false,
            description: None,
        });

        if status.is_success() && body.ok {
            return Ok(Outcome::Sent);
        }

        let description = body.description.unwrap_or_else(|| status.to_string());
        if status.as_u16() == 400 && description.contains("can't parse entities") {
            return Ok(Outcome::BadMarkup(description));
        }
        Err(ReportError::DeliveryError(format!(
            "sendMessage failed ({status}): {description}"
        )))
    }

    /// Send `text`, split as needed; returns the number of messages sent
    ///
    /// A chunk whose markup Telegram rejects is resent as plain text.
    #[instrument(skip(self, text), fields(chat = %self.config.chat_id, len = text.len()))]
    pub async fn send_message(&self, text: &str, mode: ParseMode) -> Result<usize> {
        let chunks = split_message(text, MESSAGE_LIMIT);
        if chunks.is_empty() {
            return Err(ReportError::DeliveryError("refusing to send an empty message".to_string()));
        }

        for (i, chunk) in chunks.iter().enumerate() {
            match self.post_message(chunk, mode).await? {
                Outcome::Sent => debug!("Sent chunk {}/{}", i + 1, chunks.len()),
                Outcome::BadMarkup(reason) => {
                    warn!("Telegram rejected markup ({}), resending as plain text", reason);
                    if let Outcome::BadMarkup(reason) = self.post_message(chunk, ParseMode::Plain).await? {
                        return Err(ReportError::DeliveryError(reason));
                    }
                }
            }
        }

        info!("Telegram: {} message(s) sent", chunks.len());
        Ok(chunks.len())
    }

    /// Upload `bytes` as a document named `file_name`
    #[instrument(skip(self, bytes, caption), fields(chat = %self.config.chat_id, size = bytes.len()))]
    pub async fn send_document(&self, file_name: &str, bytes: Vec<u8>, caption: Option<&str>) -> Result<()> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/json")?;

        let mut form = Form::new()
            .text("chat_id", self.config.chat_id.clone())
            .part("document", part);
        if let Some(caption) = caption {
            form = form.text("caption", caption.to_string());
        }
        if let Some(thread) = self.config.message_thread_id {
            form = form.text("message_thread_id", thread.to_string());
        }

        let response = self
            .client
            .post(self.config.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::DeliveryError(format!(
                "sendDocument failed ({status}): {body}"
            )));
        }

        info!("Telegram: document {} sent", file_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    fn client_for(server: &MockServer) -> TelegramClient {
        let config = TelegramConfig::from_lookup(
            false,
            lookup(&[("TELEGRAM_BOT_TOKEN", "tok"), ("TELEGRAM_CHAT_ID_ENERGY", "-100")]),
        )
        .unwrap()
        .with_base_url(server.uri());
        TelegramClient::new(config).unwrap()
    }

    #[test]
    fn test_config_chat_selection() {
        let vars = [
            ("TELEGRAM_BOT_TOKEN", "tok"),
            ("TELEGRAM_CHAT_ID", "-1"),
            ("TELEGRAM_CHAT_ID_TEST", "-9"),
            ("TELEGRAM_MESSAGE_THREAD_ID", "12"),
        ];
        let main = TelegramConfig::from_lookup(false, lookup(&vars)).unwrap();
        assert_eq!(main.chat_id, "-1");
        assert_eq!(main.message_thread_id, Some(12));

        let preview = TelegramConfig::from_lookup(true, lookup(&vars)).unwrap();
        assert_eq!(preview.chat_id, "-9");

        let energy = TelegramConfig::from_lookup(
            true,
            lookup(&[("TELEGRAM_BOT_TOKEN", "tok"), ("TELEGRAM_CHAT_ID_ENERGY", "-5")]),
        )
        .unwrap();
        assert_eq!(energy.chat_id, "-5");
    }

    #[test]
    fn test_config_missing_values() {
        assert!(TelegramConfig::from_lookup(false, lookup(&[("TELEGRAM_CHAT_ID", "-1")])).is_none());
        assert!(TelegramConfig::from_lookup(false, lookup(&[("TELEGRAM_BOT_TOKEN", "tok")])).is_none());
        assert!(
            TelegramConfig::from_lookup(
                false,
                lookup(&[("TELEGRAM_BOT_TOKEN", " "), ("TELEGRAM_CHAT_ID", "-1")])
            )
            .is_none()
        );
    }

    #[test]
    fn test_split_message_boundaries() {
        assert_eq!(split_message("curto", 4096), vec!["curto"]);
        assert!(split_message("  ", 10).is_empty());

        let text = "primeiro parágrafo\n\nsegundo parágrafo";
        assert_eq!(split_message(text, 25), vec!["primeiro parágrafo", "segundo parágrafo"]);

        let text = "uma frase. outra frase longa";
        assert_eq!(split_message(text, 15), vec!["uma frase.", "outra frase", "longa"]);

        // no boundary at all: hard cut on a char boundary
        let chunks = split_message(&"é".repeat(10), 4);
        assert_eq!(chunks, vec!["éééé", "éééé", "éé"]);
    }

    #[test]
    fn test_split_message_respects_limit() {
        let text = "linha de relatório com números 1,234.5\n".repeat(300);
        let chunks = split_message(&text, MESSAGE_LIMIT);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= MESSAGE_LIMIT));
    }

    #[tokio::test]
    async fn test_send_message_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bottok/sendMessage"))
            .and(body_partial_json(json!({
                "chat_id": "-100",
                "text": "<b>oi</b>",
                "parse_mode": "HTML",
                "disable_web_page_preview": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let sent = client_for(&server).send_message("<b>oi</b>", ParseMode::Html).await.unwrap();
        assert_eq!(sent, 1);
    }

    #[tokio::test]
    async fn test_bad_markup_is_resent_plain() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bottok/sendMessage"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "description": "Bad Request: can't parse entities: unclosed tag"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/bottok/sendMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        client_for(&server).send_message("<b>oi", ParseMode::Html).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        let retry: Value = serde_json::from_slice(&requests[1].body).unwrap();
        assert!(retry.get("parse_mode").is_none());
        assert_eq!(retry["text"], "<b>oi");
    }

    #[tokio::test]
    async fn test_other_errors_fail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "ok": false,
                "description": "Forbidden: bot was kicked"
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).send_message("texto", ParseMode::Markdown).await;
        assert!(matches!(result, Err(ReportError::DeliveryError(msg)) if msg.contains("bot was kicked")));
    }

    #[tokio::test]
    async fn test_long_message_is_split() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bottok/sendMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(2)
            .mount(&server)
            .await;

        let text = format!("{}\n\n{}", "a".repeat(3000), "b".repeat(3000));
        let sent = client_for(&server).send_message(&text, ParseMode::Html).await.unwrap();
        assert_eq!(sent, 2);
    }

    #[tokio::test]
    async fn test_send_document() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bottok/sendDocument"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .send_document("oil_2025-03-04.json", b"{}".to_vec(), Some("artefato"))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("filename=\"oil_2025-03-04.json\""));
        assert!(body.contains("artefato"));
    }
}
