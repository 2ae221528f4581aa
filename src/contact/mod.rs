//! Contact form submission
//!
//! A submission is validated, handed to a [`MessageSender`] once, and the
//! outcome is reported back as JSON. Nothing is stored and nothing is retried;
//! a visitor whose message failed can simply submit again.

use async_trait::async_trait;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ContactConfig;
use crate::error::ContactError;

/// Body of `POST /api/contact` as received. Fields are optional on the wire
/// so a missing one produces a readable error instead of a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

/// A validated submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// JSON body returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContactResponse {
    Sent { message: String },
    Failed { error: String },
}

impl ContactForm {
    pub fn validate(self) -> Result<ContactMessage, ContactError> {
        let name = required(self.name, "Name")?;
        let email = required(self.email, "Email")?;
        let message = required(self.message, "Message")?;

        if !looks_like_email(&email) {
            return Err(ContactError::Invalid(format!(
                "Email address {:?} is not valid",
                email
            )));
        }

        Ok(ContactMessage {
            name,
            email,
            message,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, ContactError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ContactError::Invalid(format!("{} is required", field))),
    }
}

/// `local@domain` with no whitespace and a non-empty local part and domain
fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

impl ContactError {
    /// HTTP status reported to the caller
    pub fn status_code(&self) -> StatusCode {
        match self {
            ContactError::Invalid(_) => StatusCode::BAD_REQUEST,
            ContactError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            ContactError::Delivery(_) | ContactError::Rejected { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message shown to the visitor
    pub fn public_message(&self) -> String {
        match self {
            ContactError::Invalid(reason) => reason.clone(),
            ContactError::NotConfigured => {
                "The contact form is not available right now".to_string()
            }
            ContactError::Delivery(_) | ContactError::Rejected { .. } => {
                "Failed to send message, please try again later".to_string()
            }
        }
    }
}

/// Delivers a contact message to wherever the site owner reads them
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, message: &ContactMessage) -> Result<(), ContactError>;
}

/// Posts the message as JSON to a webhook
pub struct WebhookSender {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl WebhookSender {
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            token,
        }
    }
}

#[async_trait]
impl MessageSender for WebhookSender {
    async fn send(&self, message: &ContactMessage) -> Result<(), ContactError> {
        let mut request = self.client.post(&self.endpoint).json(message);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ContactError::Rejected { status, body });
        }

        Ok(())
    }
}

/// Used when no endpoint is configured; every submission fails loudly
pub struct UnconfiguredSender;

#[async_trait]
impl MessageSender for UnconfiguredSender {
    async fn send(&self, _message: &ContactMessage) -> Result<(), ContactError> {
        Err(ContactError::NotConfigured)
    }
}

/// Build the sender described by the configuration
pub fn sender_from_config(config: &ContactConfig) -> Arc<dyn MessageSender> {
    match &config.endpoint {
        Some(endpoint) => Arc::new(WebhookSender::new(endpoint.clone(), config.token.clone())),
        None => {
            tracing::warn!("No contact endpoint configured; submissions will be rejected");
            Arc::new(UnconfiguredSender)
        }
    }
}

/// Validate and deliver one submission
pub async fn submit(sender: &dyn MessageSender, form: ContactForm) -> (StatusCode, ContactResponse) {
    let result = match form.validate() {
        Ok(message) => sender.send(&message).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            tracing::info!("Contact message delivered");
            (
                StatusCode::OK,
                ContactResponse::Sent {
                    message: "Message sent successfully".to_string(),
                },
            )
        }
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                tracing::error!("Contact delivery failed: {}", e);
            } else {
                tracing::debug!("Rejected contact submission: {}", e);
            }
            (
                status,
                ContactResponse::Failed {
                    error: e.public_message(),
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, routing::post, Json, Router};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<ContactMessage>>,
    }

    #[async_trait]
    impl MessageSender for RecordingSender {
        async fn send(&self, message: &ContactMessage) -> Result<(), ContactError> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    struct FailingSender;

    #[async_trait]
    impl MessageSender for FailingSender {
        async fn send(&self, _message: &ContactMessage) -> Result<(), ContactError> {
            Err(ContactError::Rejected {
                status: 500,
                body: "boom".to_string(),
            })
        }
    }

    fn form(name: Option<&str>, email: Option<&str>, message: Option<&str>) -> ContactForm {
        ContactForm {
            name: name.map(str::to_string),
            email: email.map(str::to_string),
            message: message.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_valid_submission_is_delivered() {
        let sender = RecordingSender::default();
        let (status, body) = submit(&sender, form(Some("Ada"), Some("ada@example.com"), Some("Hi!"))).await;

        assert_eq!(status, StatusCode::OK);
        assert!(matches!(body, ContactResponse::Sent { .. }));
        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_missing_email_is_rejected_without_delivery() {
        let sender = RecordingSender::default();
        let (status, body) = submit(&sender, form(Some("Ada"), None, Some("Hi!"))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            ContactResponse::Failed {
                error: "Email is required".to_string()
            }
        );
        assert!(sender.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported() {
        let (status, body) = submit(&FailingSender, form(Some("Ada"), Some("ada@example.com"), Some("Hi"))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(matches!(body, ContactResponse::Failed { .. }));
    }

    #[tokio::test]
    async fn test_unconfigured_sender() {
        let (status, _) = submit(&UnconfiguredSender, form(Some("A"), Some("a@b.c"), Some("m"))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_validation() {
        assert!(form(Some("  "), Some("a@b.c"), Some("m")).validate().is_err());
        assert!(form(Some("A"), Some("not-an-email"), Some("m")).validate().is_err());
        assert!(form(Some("A"), Some("a b@c.d"), Some("m")).validate().is_err());
        assert!(form(Some("A"), Some("a@b.c"), None).validate().is_err());

        let message = form(Some(" Ada "), Some("ada@example.com"), Some("Hello")).validate().unwrap();
        assert_eq!(message.name, "Ada");
    }

    #[test]
    fn test_response_json_shape() {
        let ok = serde_json::to_value(ContactResponse::Sent {
            message: "done".to_string(),
        })
        .unwrap();
        assert_eq!(ok, serde_json::json!({"message": "done"}));

        let err = serde_json::to_value(ContactResponse::Failed {
            error: "bad".to_string(),
        })
        .unwrap();
        assert_eq!(err, serde_json::json!({"error": "bad"}));
    }

    async fn spawn_webhook(status: StatusCode) -> (String, Arc<Mutex<Vec<serde_json::Value>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route(
                "/hook",
                post(
                    move |State(received): State<Arc<Mutex<Vec<serde_json::Value>>>>,
                          Json(body): Json<serde_json::Value>| async move {
                        received.lock().unwrap().push(body);
                        status
                    },
                ),
            )
            .with_state(received.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/hook", addr), received)
    }

    #[tokio::test]
    async fn test_webhook_sender_posts_json() {
        let (endpoint, received) = spawn_webhook(StatusCode::OK).await;
        let sender = WebhookSender::new(endpoint, Some("secret".to_string()));
        let message = ContactMessage {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: "Hello".to_string(),
        };

        sender.send(&message).await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(
            received[0],
            serde_json::json!({"name": "Ada", "email": "ada@example.com", "message": "Hello"})
        );
    }

    #[tokio::test]
    async fn test_webhook_sender_surfaces_upstream_errors() {
        let (endpoint, _) = spawn_webhook(StatusCode::INTERNAL_SERVER_ERROR).await;
        let sender = WebhookSender::new(endpoint, None);
        let message = ContactMessage {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: "Hello".to_string(),
        };

        let err = sender.send(&message).await.unwrap_err();
        assert!(matches!(err, ContactError::Rejected { status: 500, .. }));
    }
}
