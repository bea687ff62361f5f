//! SMTP relay email sender

use std::{error::Error as StdError, fmt::Debug, time::Duration};

use async_trait::async_trait;
use clap::Parser;
use lettre::{
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use secrecy::{ExposeSecret, Secret};
use tracing::info;

use crate::domain::communication::{
    email_addresses::EmailAddress,
    mailer::{log_outcome, EmailSender, EmailSenderError, OutgoingEmail},
    message::EmailMessage,
    renderer::HtmlRenderer,
};

use super::{default_sender, mime, parse_secret};

const PROVIDER: &str = "smtp";

/// SMTP configuration
#[derive(Clone, Debug, Parser)]
pub struct SmtpConfig {
    /// The SMTP host
    #[clap(long = "smtp-host", env = "SMTP_HOST")]
    pub host: String,

    /// The SMTP port
    #[clap(long = "smtp-port", env = "SMTP_PORT", default_value = "587")]
    pub port: u16,

    /// The SMTP username. Authentication is skipped when empty.
    #[clap(long = "smtp-user", env = "SMTP_USER", default_value = "")]
    pub username: String,

    /// The SMTP password
    #[clap(long = "smtp-password", env = "SMTP_PASSWORD", default_value = "", value_parser = parse_secret)]
    pub password: Secret<String>,

    /// The default sender email address
    #[clap(long = "smtp-from-email", env = "SMTP_FROM_EMAIL")]
    pub default_from_email: Option<String>,

    /// The default sender display name
    #[clap(long = "smtp-from-name", env = "SMTP_FROM_NAME")]
    pub default_from_name: Option<String>,

    /// Verify the TLS certificate
    #[clap(long = "smtp-verify-tls", env = "SMTP_VERIFY_TLS", default_value = "true", action = clap::ArgAction::Set)]
    pub verify_tls: bool,

    /// Enable STARTTLS (TLS upgrade on connection). Implicit TLS is used otherwise.
    #[clap(long = "smtp-starttls", env = "SMTP_STARTTLS", default_value = "true", action = clap::ArgAction::Set)]
    pub starttls: bool,

    /// Connection timeout in seconds
    #[clap(long = "smtp-timeout", env = "SMTP_TIMEOUT_SECS", default_value = "30")]
    pub timeout_secs: u64,
}

impl SmtpConfig {
    /// The sender used when a message has none
    pub fn default_sender(&self) -> Option<EmailAddress> {
        default_sender(
            self.default_from_email.as_deref(),
            self.default_from_name.as_deref(),
        )
    }
}

/// Email sender that relays through an SMTP server, or any other lettre transport
#[derive(Debug, Clone)]
pub struct SmtpEmailSender<T> {
    transport: T,
    default_sender: Option<EmailAddress>,
}

impl SmtpEmailSender<AsyncSmtpTransport<Tokio1Executor>> {
    /// Create a new SMTP email sender. No connection is opened until the first send.
    pub fn new(config: &SmtpConfig) -> Result<Self, EmailSenderError> {
        if config.host.trim().is_empty() {
            return Err(EmailSenderError::Configuration(
                "SMTP host is required".to_string(),
            ));
        }

        let tls_parameters = TlsParameters::builder(config.host.clone())
            .dangerous_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|err| EmailSenderError::Configuration(format!("invalid TLS setup: {err}")))?;

        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        }
        .map_err(|err| EmailSenderError::Configuration(format!("invalid SMTP relay: {err}")))?
        .port(config.port)
        .timeout(Some(Duration::from_secs(config.timeout_secs)))
        .tls(if config.starttls {
            Tls::Required(tls_parameters)
        } else {
            Tls::Wrapper(tls_parameters)
        });

        let builder = if config.username.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.expose_secret().clone(),
            ))
        };

        Ok(Self::with_transport(builder.build(), config.default_sender()))
    }
}

impl<T> SmtpEmailSender<T>
where
    T: AsyncTransport + Send + Sync,
    T::Ok: Debug,
    T::Error: StdError + Send + Sync + 'static,
{
    /// Create a sender on top of an existing transport
    pub fn with_transport(transport: T, default_sender: Option<EmailAddress>) -> Self {
        Self {
            transport,
            default_sender,
        }
    }

    async fn deliver(
        &self,
        message: EmailMessage,
        renderer: Option<&dyn HtmlRenderer>,
    ) -> Result<(), EmailSenderError> {
        let email =
            OutgoingEmail::prepare(message, self.default_sender.as_ref(), renderer).await?;

        let mime_message = mime::compose(&email, false)?;

        let response = self
            .transport
            .send(mime_message)
            .await
            .map_err(|err| EmailSenderError::transmission(PROVIDER, err))?;

        info!(provider = PROVIDER, response = ?response, "relay accepted email");

        Ok(())
    }
}

#[async_trait]
impl<T> EmailSender for SmtpEmailSender<T>
where
    T: AsyncTransport + Send + Sync,
    T::Ok: Debug,
    T::Error: StdError + Send + Sync + 'static,
{
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
