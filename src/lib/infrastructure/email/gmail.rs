//! Gmail API email sender

use anyhow::anyhow;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use clap::Parser;
use reqwest::{header::USER_AGENT, Client, Url};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::communication::{
    email_addresses::EmailAddress,
    mailer::{log_outcome, EmailSender, EmailSenderError, OutgoingEmail},
    message::EmailMessage,
    renderer::HtmlRenderer,
};

use super::{default_sender, mime, parse_secret};

const PROVIDER: &str = "gmail";

/// Gmail API configuration.
///
/// The OAuth consent flow happens elsewhere, this only takes the resulting access token.
#[derive(Clone, Debug, Parser)]
pub struct GmailConfig {
    /// OAuth 2.0 access token with the `gmail.send` scope
    #[clap(long = "gmail-access-token", env = "GMAIL_ACCESS_TOKEN", value_parser = parse_secret)]
    pub access_token: Secret<String>,

    /// The mailbox to send from
    #[clap(long = "gmail-user-id", env = "GMAIL_USER_ID", default_value = "me")]
    pub user_id: String,

    /// Sent as the `User-Agent` header
    #[clap(long = "gmail-application-name", env = "GMAIL_APPLICATION_NAME", default_value = "Email Dispatch")]
    pub application_name: String,

    /// The default sender email address
    #[clap(long = "gmail-from-email", env = "GMAIL_FROM_EMAIL")]
    pub default_from_email: Option<String>,

    /// The default sender display name
    #[clap(long = "gmail-from-name", env = "GMAIL_FROM_NAME")]
    pub default_from_name: Option<String>,

    /// API base URL
    #[clap(long = "gmail-base-url", env = "GMAIL_BASE_URL", default_value = "https://gmail.googleapis.com")]
    pub base_url: String,
}

impl GmailConfig {
    /// The sender used when a message has none
    pub fn default_sender(&self) -> Option<EmailAddress> {
        default_sender(
            self.default_from_email.as_deref(),
            self.default_from_name.as_deref(),
        )
    }
}

/// Email sender that submits raw RFC 5322 messages to the Gmail API
#[derive(Debug, Clone)]
pub struct GmailEmailSender {
    http_client: Client,
    endpoint: Url,
    config: GmailConfig,
    default_sender: Option<EmailAddress>,
}

#[derive(Debug, Serialize)]
struct SendRequest {
    raw: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: String,
}

impl GmailEmailSender {
    /// Create a new Gmail email sender.
    ///
    /// Fails with [`EmailSenderError::Configuration`] when the access token or user id is
    /// blank, or the base URL is invalid.
    pub fn new(config: GmailConfig, http_client: Client) -> Result<Self, EmailSenderError> {
        if config.access_token.expose_secret().trim().is_empty() {
            return Err(EmailSenderError::Configuration(
                "Gmail access token is required".to_string(),
            ));
        }

        if config.user_id.trim().is_empty() {
            return Err(EmailSenderError::Configuration(
                "Gmail user id is required".to_string(),
            ));
        }

        let endpoint = Url::parse(&config.base_url)
            .and_then(|base| {
                base.join(&format!("/gmail/v1/users/{}/messages/send", config.user_id))
            })
            .map_err(|err| {
                EmailSenderError::Configuration(format!(
                    "invalid Gmail base URL \"{}\": {err}",
                    config.base_url
                ))
            })?;

        Ok(Self {
            http_client,
            endpoint,
            default_sender: config.default_sender(),
            config,
        })
    }

    async fn deliver(
        &self,
        message: EmailMessage,
        renderer: Option<&dyn HtmlRenderer>,
    ) -> Result<(), EmailSenderError> {
        let email =
            OutgoingEmail::prepare(message, self.default_sender.as_ref(), renderer).await?;

        let raw = URL_SAFE_NO_PAD.encode(mime::compose(&email, true)?.formatted());

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .bearer_auth(self.config.access_token.expose_secret())
            .header(USER_AGENT, &self.config.application_name)
            .json(&SendRequest { raw })
            .send()
            .await
            .map_err(|err| EmailSenderError::transmission(PROVIDER, err))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            return Err(EmailSenderError::transmission(
                PROVIDER,
                anyhow!("Gmail responded with {status}: {body}"),
            ));
        }

        // The message is sent once the status is 2xx, the id is only logged
        let message_id = response
            .json::<SendResponse>()
            .await
            .map(|sent| sent.id)
            .unwrap_or_default();

        info!(provider = PROVIDER, message_id = %message_id, "Gmail accepted email");

        Ok(())
    }
}

#[async_trait]
impl EmailSender for GmailEmailSender {
    async fn send_email(
        &self,
        message: EmailMessage,
        renderer: Option<&dyn HtmlRenderer>,
    ) -> Result<(), EmailSenderError> {
        let recipients = message.recipient_list();
        let subject = message.subject.clone();

        info!(provider = PROVIDER, recipients = %recipients, subject = %subject, "sending email");

        log_outcome(
            PROVIDER,
            &recipients,
            &subject,
            self.deliver(message, renderer).await,
        )
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
