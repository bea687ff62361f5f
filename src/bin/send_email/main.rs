#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Command-line email sender

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use email_dispatch::{
    domain::communication::{
        email_addresses::EmailAddress,
        mailer::EmailSender,
        message::{EmailMessage, RenderOptions, TemplateModel},
        renderer::{HtmlRenderer, ThemedHtmlRenderer},
    },
    infrastructure::{
        email::{
            gmail::{GmailConfig, GmailEmailSender},
            sendgrid::{SendGridConfig, SendGridEmailSender},
            smtp::{SmtpConfig, SmtpEmailSender},
        },
        templates::AskamaViews,
    },
};
use tracing::info;

const DEFAULT_ATTACHMENT_TYPE: &str = "application/octet-stream";

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
#[clap(name = "send-email", about = "Compose an email and deliver it through a provider")]
pub struct Args {
    /// Sender email address. Falls back to the provider's default sender.
    #[clap(long)]
    pub from: Option<String>,

    /// Sender display name
    #[clap(long)]
    pub from_name: Option<String>,

    /// Recipient, repeatable
    #[clap(long, required = true)]
    pub to: Vec<String>,

    /// Carbon-copy recipient, repeatable
    #[clap(long)]
    pub cc: Vec<String>,

    /// Blind carbon-copy recipient, repeatable
    #[clap(long)]
    pub bcc: Vec<String>,

    /// Subject line
    #[clap(long, default_value = "")]
    pub subject: String,

    /// Raw body, plain text or HTML
    #[clap(long, default_value = "")]
    pub body: String,

    /// View name or inline markup with `{{Field}}` placeholders
    #[clap(long)]
    pub template: Option<String>,

    /// Template model field as `KEY=VALUE`, repeatable
    #[clap(long = "var", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// Theme for rendered emails. Implies `--render`.
    #[clap(long)]
    pub theme: Option<String>,

    /// Render the body with the built-in themes
    #[clap(long)]
    pub render: bool,

    /// File to attach as `PATH[;MIME]`, repeatable
    #[clap(long = "attach", value_parser = parse_attachment)]
    pub attachments: Vec<AttachmentArg>,

    /// Delivery provider
    #[clap(subcommand)]
    pub provider: Provider,
}

/// Delivery providers and their configuration
#[derive(Debug, Subcommand)]
pub enum Provider {
    /// Relay through an SMTP server
    Smtp(SmtpConfig),

    /// Use the SendGrid v3 API
    Sendgrid(SendGridConfig),

    /// Use the Gmail API
    Gmail(GmailConfig),
}

/// A file to attach
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachmentArg {
    /// Path to the file
    pub path: PathBuf,

    /// MIME type
    pub content_type: String,
}

fn parse_var(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got \"{raw}\""))?;

    if key.trim().is_empty() {
        return Err(anyhow!("empty key in \"{raw}\""));
    }

    Ok((key.trim().to_string(), value.to_string()))
}

fn parse_attachment(raw: &str) -> Result<AttachmentArg> {
    let (path, content_type) = match raw.rsplit_once(';') {
        Some((path, content_type)) if !content_type.trim().is_empty() => {
            (path, content_type.trim())
        }
        Some((path, _)) => (path, DEFAULT_ATTACHMENT_TYPE),
        None => (raw, DEFAULT_ATTACHMENT_TYPE),
    };

    if path.is_empty() {
        return Err(anyhow!("missing attachment path in \"{raw}\""));
    }

    Ok(AttachmentArg {
        path: PathBuf::from(path),
        content_type: content_type.to_string(),
    })
}

impl Args {
    fn renders(&self) -> bool {
        self.render || self.theme.is_some()
    }

    async fn message(&self) -> Result<EmailMessage> {
        let mut builder = EmailMessage::builder()
            .to_many(self.to.iter().cloned())
            .subject(self.subject.as_str())
            .body(self.body.as_str());

        if let Some(from) = &self.from {
            builder = builder.from(match &self.from_name {
                Some(name) => EmailAddress::with_name(from.as_str(), name.as_str()),
                None => EmailAddress::new(from.as_str()),
            });
        }

        for cc in &self.cc {
            builder = builder.cc(cc.as_str());
        }

        for bcc in &self.bcc {
            builder = builder.bcc(bcc.as_str());
        }

        if let Some(template) = &self.template {
            builder = builder.body_template(template.as_str());
        }

        if !self.vars.is_empty() {
            builder = builder.model(self.vars.iter().cloned().collect::<TemplateModel>());
        }

        if let Some(theme) = &self.theme {
            builder = builder.render_options(RenderOptions::with_theme(theme.as_str()));
        }

        for attachment in &self.attachments {
            let content = tokio::fs::read(&attachment.path)
                .await
                .with_context(|| format!("could not read {}", attachment.path.display()))?;

            builder = builder.attach(
                file_name(&attachment.path),
                content,
                attachment.content_type.as_str(),
            );
        }

        Ok(builder.build())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn sender(provider: Provider) -> Result<Box<dyn EmailSender>> {
    let sender: Box<dyn EmailSender> = match provider {
        Provider::Smtp(config) => Box::new(SmtpEmailSender::new(&config)?),
        Provider::Sendgrid(config) => {
            Box::new(SendGridEmailSender::new(config, reqwest::Client::new())?)
        }
        Provider::Gmail(config) => Box::new(GmailEmailSender::new(config, reqwest::Client::new())?),
    };

    Ok(sender)
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load environment: {}", e);

            return Err(e.into());
        }
    }

    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let message = args.message().await?;
    let renderer = args.renders().then(|| ThemedHtmlRenderer::new(AskamaViews));
    let sender = sender(args.provider)?;

    info!(provider = sender.provider_name(), "sending");

    sender
        .send_email(
            message,
            renderer.as_ref().map(|renderer| renderer as &dyn HtmlRenderer),
        )
        .await?;

    Ok(())
}
