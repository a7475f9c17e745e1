//! Outbound email through a relay.
//!
//! Messages are atomic: the relay either accepts them or the send fails.
//! There is no retry and no queue.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::EmailError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

/// Posts messages as JSON to an HTTP relay.
pub struct HttpEmailSender {
    client: Client,
    endpoint: Url,
    from: String,
    api_token: Option<String>,
}

impl HttpEmailSender {
    pub fn new(endpoint: &str, from: impl Into<String>) -> Result<Self, EmailError> {
        let endpoint =
            Url::parse(endpoint).map_err(|e| EmailError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        Ok(Self {
            client: Client::new(),
            endpoint,
            from: from.into(),
            api_token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let body = serde_json::json!({
            "from": self.from,
            "to": message.to,
            "subject": message.subject,
            "html": message.html_body,
        });

        let mut request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }
        let resp = request.send().await?;

        let status = resp.status();
        if status.is_success() {
            tracing::info!(to = %message.to, "email sent");
            return Ok(());
        }
        let text = resp.text().await.unwrap_or_default();
        Err(EmailError::Rejected {
            status: status.as_u16(),
            message: text,
        })
    }
}

/// Used when no relay is configured: logs the message and reports success.
#[derive(Debug, Default, Clone, Copy)]
pub struct DemoSender;

#[async_trait]
impl EmailSender for DemoSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "no email relay configured, message not sent (demo mode)"
        );
        Ok(())
    }
}

pub fn thank_you_message(to: &str, name: Option<&str>) -> EmailMessage {
    let name = name.filter(|n| !n.trim().is_empty()).unwrap_or("there");
    EmailMessage {
        to: to.to_string(),
        subject: "Thank you!".to_string(),
        html_body: format!("<p>Hi {name},</p><p>Thank you for studying with Focus Hub.</p>"),
    }
}

pub fn welcome_message(to: &str, name: Option<&str>) -> EmailMessage {
    let name = name.filter(|n| !n.trim().is_empty()).unwrap_or("there");
    EmailMessage {
        to: to.to_string(),
        subject: "Welcome to Focus Hub!".to_string(),
        html_body: format!("<p>Welcome, {name}!</p><p>Your Focus Hub is ready.</p>"),
    }
}

/// Foreground thank-you send. Unlike background sends, failures reach the caller.
pub async fn send_thank_you(
    sender: &dyn EmailSender,
    email: &str,
    name: Option<&str>,
) -> Result<(), EmailError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(EmailError::MissingRecipient);
    }
    sender.send(&thank_you_message(email, name)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn thank_you_requires_recipient() {
        let err = send_thank_you(&DemoSender, "   ", None).await.unwrap_err();
        assert!(matches!(err, EmailError::MissingRecipient));
        assert_eq!(err.to_string(), "Email is required");
    }

    #[tokio::test]
    async fn demo_sender_succeeds() {
        assert!(send_thank_you(&DemoSender, "a@b.c", Some("Lina")).await.is_ok());
    }

    #[test]
    fn blank_name_gets_generic_greeting() {
        let msg = welcome_message("a@b.c", Some(" "));
        assert!(msg.html_body.contains("Welcome, there!"));
        let msg = thank_you_message("a@b.c", Some("Omar"));
        assert!(msg.html_body.contains("Hi Omar"));
    }

    #[test]
    fn rejects_malformed_endpoint() {
        assert!(matches!(
            HttpEmailSender::new("not a url", "hub@example.com"),
            Err(EmailError::InvalidEndpoint(_))
        ));
    }
}
