//! SendGrid v3 mail API email sender

use anyhow::anyhow;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::Parser;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use tracing::info;

use crate::domain::communication::{
    email_addresses::EmailAddress,
    mailer::{log_outcome, EmailSender, EmailSenderError, OutgoingEmail, ResolvedBody},
    message::EmailMessage,
    renderer::HtmlRenderer,
};

use super::{default_sender, parse_secret};

const PROVIDER: &str = "sendgrid";
const SEND_PATH: &str = "/v3/mail/send";
const MESSAGE_ID_HEADER: &str = "X-Message-Id";

/// SendGrid configuration
#[derive(Clone, Debug, Parser)]
pub struct SendGridConfig {
    /// SendGrid API key
    #[clap(long = "sendgrid-api-key", env = "SENDGRID_API_KEY", value_parser = parse_secret)]
    pub api_key: Secret<String>,

    /// The default sender email address
    #[clap(long = "sendgrid-from-email", env = "SENDGRID_FROM_EMAIL")]
    pub default_from_email: Option<String>,

    /// The default sender display name
    #[clap(long = "sendgrid-from-name", env = "SENDGRID_FROM_NAME")]
    pub default_from_name: Option<String>,

    /// Validate requests without delivering anything
    #[clap(long = "sendgrid-sandbox", env = "SENDGRID_SANDBOX_MODE", default_value = "false", action = clap::ArgAction::Set)]
    pub sandbox_mode: bool,

    /// Rewrite links for click tracking
    #[clap(long = "sendgrid-click-tracking", env = "SENDGRID_CLICK_TRACKING", default_value = "true", action = clap::ArgAction::Set)]
    pub enable_click_tracking: bool,

    /// Add an open-tracking pixel
    #[clap(long = "sendgrid-open-tracking", env = "SENDGRID_OPEN_TRACKING", default_value = "true", action = clap::ArgAction::Set)]
    pub enable_open_tracking: bool,

    /// Append an unsubscribe footer
    #[clap(long = "sendgrid-subscription-tracking", env = "SENDGRID_SUBSCRIPTION_TRACKING", default_value = "false", action = clap::ArgAction::Set)]
    pub enable_subscription_tracking: bool,

    /// API base URL
    #[clap(long = "sendgrid-base-url", env = "SENDGRID_BASE_URL", default_value = "https://api.sendgrid.com")]
    pub base_url: String,
}

impl SendGridConfig {
    /// The sender used when a message has none
    pub fn default_sender(&self) -> Option<EmailAddress> {
        default_sender(
            self.default_from_email.as_deref(),
            self.default_from_name.as_deref(),
        )
    }
}

/// Email sender backed by the SendGrid HTTP API
#[derive(Debug, Clone)]
pub struct SendGridEmailSender {
    http_client: Client,
    endpoint: Url,
    config: SendGridConfig,
    default_sender: Option<EmailAddress>,
}

impl SendGridEmailSender {
    /// Create a new SendGrid email sender.
    ///
    /// Fails with [`EmailSenderError::Configuration`] when the API key is blank or the base
    /// URL is invalid.
    pub fn new(config: SendGridConfig, http_client: Client) -> Result<Self, EmailSenderError> {
        if config.api_key.expose_secret().trim().is_empty() {
            return Err(EmailSenderError::Configuration(
                "SendGrid API key is required".to_string(),
            ));
        }

        let endpoint = Url::parse(&config.base_url)
            .and_then(|base| base.join(SEND_PATH))
            .map_err(|err| {
                EmailSenderError::Configuration(format!(
                    "invalid SendGrid base URL \"{}\": {err}",
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

        let (ResolvedBody::Html(content) | ResolvedBody::PlainText(content)) = &email.body;

        if content.trim().is_empty() {
            return Err(EmailSenderError::Validation(
                "SendGrid requires a non-empty body".to_string(),
            ));
        }

        let request_body = SendMailRequest::new(&email, &self.config);

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request_body)
            .send()
            .await
            .map_err(|err| EmailSenderError::transmission(PROVIDER, err))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            return Err(EmailSenderError::transmission(
                PROVIDER,
                anyhow!("SendGrid responded with {status}: {body}"),
            ));
        }

        let message_id = response
            .headers()
            .get(MESSAGE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        info!(provider = PROVIDER, message_id, "SendGrid accepted email");

        Ok(())
    }
}

#[async_trait]
impl EmailSender for SendGridEmailSender {
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

#[derive(Debug, Serialize)]
struct SendMailRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Participant<'a>,
    subject: &'a str,
    content: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<AttachmentPayload<'a>>,
    tracking_settings: TrackingSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    mail_settings: Option<MailSettings>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Participant<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cc: Vec<Participant<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    bcc: Vec<Participant<'a>>,
}

#[derive(Debug, Serialize)]
struct Participant<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(rename = "type")]
    mime_type: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
struct AttachmentPayload<'a> {
    content: String,
    #[serde(rename = "type")]
    mime_type: &'a str,
    filename: &'a str,
    disposition: &'static str,
}

#[derive(Debug, Serialize)]
struct TrackingSettings {
    click_tracking: ClickTracking,
    open_tracking: Toggle,
    subscription_tracking: Toggle,
}

#[derive(Debug, Serialize)]
struct ClickTracking {
    enable: bool,
    enable_text: bool,
}

#[derive(Debug, Serialize)]
struct Toggle {
    enable: bool,
}

#[derive(Debug, Serialize)]
struct MailSettings {
    sandbox_mode: Toggle,
}

impl<'a> SendMailRequest<'a> {
    fn new(email: &'a OutgoingEmail, config: &SendGridConfig) -> Self {
        // text/plain has to come before text/html
        let mut content = vec![Content {
            mime_type: "text/plain",
            value: email.body.plain_text(),
        }];

        if let Some(html) = email.body.html() {
            content.push(Content {
                mime_type: "text/html",
                value: html.to_string(),
            });
        }

        Self {
            personalizations: [Personalization {
                to: participants(&email.to),
                cc: participants(&email.cc),
                bcc: participants(&email.bcc),
            }],
            from: Participant::from(&email.from),
            subject: &email.subject,
            content,
            attachments: email
                .attachments
                .iter()
                .map(|attachment| AttachmentPayload {
                    content: STANDARD.encode(attachment.content()),
                    mime_type: attachment.content_type(),
                    filename: attachment.file_name(),
                    disposition: "attachment",
                })
                .collect(),
            tracking_settings: TrackingSettings {
                click_tracking: ClickTracking {
                    enable: config.enable_click_tracking,
                    enable_text: config.enable_click_tracking,
                },
                open_tracking: Toggle {
                    enable: config.enable_open_tracking,
                },
                subscription_tracking: Toggle {
                    enable: config.enable_subscription_tracking,
                },
            },
            mail_settings: config.sandbox_mode.then_some(MailSettings {
                sandbox_mode: Toggle { enable: true },
            }),
        }
    }
}

impl<'a> From<&'a EmailAddress> for Participant<'a> {
    fn from(address: &'a EmailAddress) -> Self {
        Self {
            email: address.email(),
            name: address.name().filter(|name| !name.is_empty()),
        }
    }
}

fn participants(addresses: &[EmailAddress]) -> Vec<Participant<'_>> {
    addresses.iter().map(Participant::from).collect()
}
