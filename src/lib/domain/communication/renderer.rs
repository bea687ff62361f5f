//! HTML rendering capability

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

use crate::domain::communication::message::EmailMessage;

mod errors;
mod views;

pub use errors::RenderError;
pub use views::{
    is_inline_markup, resolve_view_name, ThemedHtmlRenderer, ViewEngine, DEFAULT_VIEW,
};

/// Turns an [`EmailMessage`] into the final HTML body.
#[async_trait]
pub trait HtmlRenderer: Send + Sync {
    /// Renders the HTML body for an email.
    ///
    /// # Arguments
    /// * `message` - The [`EmailMessage`] to render. It is never modified.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] containing the HTML, or an [`Err`] containing a
    /// [`RenderError`] if neither the requested view nor the fallback could be rendered.
    async fn render_email(&self, message: &EmailMessage) -> Result<String, RenderError>;
}

#[cfg(test)]
mock! {
    pub HtmlRenderer {}

    #[async_trait]
    impl HtmlRenderer for HtmlRenderer {
        async fn render_email(&self, message: &EmailMessage) -> Result<String, RenderError>;
    }
}
