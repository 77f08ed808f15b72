// # HTTP Notification Sinks
//
// This crate provides the HTTP-based notification sinks for stockwatch:
//
// - [`DiscordWebhookSink`]: Discord-style webhook, JSON body `{"content": "..."}`
// - [`PushSink`]: ntfy-style push endpoint, message as raw `text/plain` body
//
// ## Contract
//
// - ✅ One POST per delivery, bounded by a client timeout
// - ✅ Non-success statuses are reported as `Error::Notify`
// - ❌ NO retry logic (notifications are best effort)
//
// ## Security
//
// Webhook URLs embed their credentials. They never appear in logs, errors
// or `Debug` output; only the host is shown.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use stockwatch_core::traits::NotificationSink;
use stockwatch_core::{Error, Result};

/// Default HTTP timeout for notification requests (10 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Discord caps message content at 2000 characters
const DISCORD_CONTENT_LIMIT: usize = 2000;

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))
}

fn validate_url(kind: &str, url: &str) -> Result<reqwest::Url> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| Error::config(format!("Invalid {} URL: {}", kind, e)))?;

    match parsed.scheme() {
        "https" => {}
        "http" => tracing::warn!(
            "{} URL uses HTTP (not HTTPS). This is less secure. Consider using HTTPS.",
            kind
        ),
        other => {
            return Err(Error::config(format!(
                "{} URL must use HTTP or HTTPS scheme, got {}",
                kind, other
            )));
        }
    }

    Ok(parsed)
}

/// Host part of a URL, safe to log
fn redacted(url: &reqwest::Url) -> String {
    format!("{}://{}/<REDACTED>", url.scheme(), url.host_str().unwrap_or("?"))
}

/// Map a failed send to a notification error without leaking the URL
fn send_error(sink: &str, e: reqwest::Error) -> Error {
    let e = e.without_url();
    if e.is_timeout() {
        Error::notify(sink, format!("Request timed out: {}", e))
    } else {
        Error::notify(sink, format!("Request failed: {}", e))
    }
}

async fn check_status(sink: &str, response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    let detail = match status.as_u16() {
        401 | 403 => "Authentication failed",
        404 => "Endpoint not found (deleted webhook or wrong topic?)",
        429 => "Rate limited",
        500..=599 => "Server error",
        _ => "Unexpected status",
    };

    Err(Error::notify(
        sink,
        format!("{} (HTTP {}): {}", detail, status.as_u16(), body.trim()),
    ))
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// Discord-style chat webhook sink
pub struct DiscordWebhookSink {
    /// Webhook URL (contains the webhook token)
    /// ⚠️ NEVER log this value
    url: reqwest::Url,

    /// HTTP client
    client: reqwest::Client,
}

// Custom Debug implementation that hides the webhook token
impl std::fmt::Debug for DiscordWebhookSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordWebhookSink")
            .field("url", &redacted(&self.url))
            .finish()
    }
}

impl DiscordWebhookSink {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            url: validate_url("webhook", url)?,
            client: build_client(timeout)?,
        })
    }

    /// Trim content to the webhook's length limit on a char boundary
    fn clamp(message: &str) -> &str {
        match message.char_indices().nth(DISCORD_CONTENT_LIMIT) {
            Some((idx, _)) => &message[..idx],
            None => message,
        }
    }
}

#[async_trait]
impl NotificationSink for DiscordWebhookSink {
    async fn deliver(&self, message: &str) -> Result<()> {
        tracing::debug!("Posting to webhook {}", redacted(&self.url));

        let payload = WebhookPayload {
            content: Self::clamp(message),
        };

        let response = self
            .client
            .post(self.url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| send_error(self.sink_name(), e))?;

        check_status(self.sink_name(), response).await
    }

    fn sink_name(&self) -> &str {
        "webhook"
    }
}

/// Push notification sink posting the raw message
pub struct PushSink {
    /// Push endpoint (e.g. an ntfy topic URL)
    /// ⚠️ NEVER log this value
    url: reqwest::Url,

    /// HTTP client
    client: reqwest::Client,
}

impl std::fmt::Debug for PushSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushSink")
            .field("url", &redacted(&self.url))
            .finish()
    }
}

impl PushSink {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            url: validate_url("push", url)?,
            client: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl NotificationSink for PushSink {
    async fn deliver(&self, message: &str) -> Result<()> {
        tracing::debug!("Posting to push endpoint {}", redacted(&self.url));

        let response = self
            .client
            .post(self.url.clone())
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(message.to_string())
            .send()
            .await
            .map_err(|e| send_error(self.sink_name(), e))?;

        check_status(self.sink_name(), response).await
    }

    fn sink_name(&self) -> &str {
        "push"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_invalid_urls_rejected() {
        assert!(DiscordWebhookSink::new("not a url", DEFAULT_HTTP_TIMEOUT).is_err());
        assert!(PushSink::new("ftp://example.com/topic", DEFAULT_HTTP_TIMEOUT).is_err());
        assert!(PushSink::new("https://ntfy.sh/decks", DEFAULT_HTTP_TIMEOUT).is_ok());
    }

    #[test]
    fn test_webhook_token_not_exposed_in_debug() {
        let sink = DiscordWebhookSink::new(
            "https://discord.com/api/webhooks/123/super-secret-token",
            DEFAULT_HTTP_TIMEOUT,
        )
        .unwrap();

        let debug = format!("{:?}", sink);
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("discord.com"));
        assert!(debug.contains("<REDACTED>"));
    }

    #[test]
    fn test_clamp_long_content() {
        let long = "é".repeat(DISCORD_CONTENT_LIMIT + 10);
        assert_eq!(
            DiscordWebhookSink::clamp(&long).chars().count(),
            DISCORD_CONTENT_LIMIT
        );
        assert_eq!(DiscordWebhookSink::clamp("short"), "short");
    }

    #[tokio::test]
    async fn test_webhook_posts_content_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/webhooks/1/token"))
            .and(body_json(serde_json::json!({
                "content": "refurbished 512GB OLED steam deck available"
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let sink = DiscordWebhookSink::new(
            &format!("{}/api/webhooks/1/token", server.uri()),
            DEFAULT_HTTP_TIMEOUT,
        )
        .unwrap();

        sink.deliver("refurbished 512GB OLED steam deck available")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_push_posts_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/decks"))
            .and(header("content-type", "text/plain; charset=utf-8"))
            .and(body_string("refurbished 64GB LCD steam deck not available"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sink = PushSink::new(&format!("{}/decks", server.uri()), DEFAULT_HTTP_TIMEOUT).unwrap();

        sink.deliver("refurbished 64GB LCD steam deck not available")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_error_status_reported_without_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Unknown Webhook"))
            .mount(&server)
            .await;

        let sink = DiscordWebhookSink::new(
            &format!("{}/api/webhooks/1/secret", server.uri()),
            DEFAULT_HTTP_TIMEOUT,
        )
        .unwrap();

        let err = sink.deliver("hello").await.unwrap_err();
        let text = err.to_string();

        assert!(matches!(err, Error::Notify { .. }));
        assert!(text.contains("HTTP 404"));
        assert!(text.contains("Unknown Webhook"));
        assert!(!text.contains("secret"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_notify_error() {
        let sink = PushSink::new("http://127.0.0.1:1/topic", DEFAULT_HTTP_TIMEOUT).unwrap();

        let err = sink.deliver("hello").await.unwrap_err();
        assert!(matches!(err, Error::Notify { .. }));
    }
}
