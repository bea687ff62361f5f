//! View resolution for template-backed renderers

use async_trait::async_trait;
use tracing::{debug, warn};

#[cfg(test)]
use mockall::mock;

use crate::domain::communication::message::EmailMessage;

use super::{HtmlRenderer, RenderError};

/// The view every renderer falls back to
pub const DEFAULT_VIEW: &str = "Default";

/// A store of named views, such as a set of compiled templates.
pub trait ViewEngine: Send + Sync {
    /// Renders the view called `view` with `message` as its model.
    ///
    /// Must return [`RenderError::ViewNotFound`] when no such view exists, so that callers
    /// can tell a missing view apart from a broken one.
    fn render_view(&self, view: &str, message: &EmailMessage) -> Result<String, RenderError>;
}

#[cfg(test)]
mock! {
    pub ViewEngine {}

    impl ViewEngine for ViewEngine {
        fn render_view(&self, view: &str, message: &EmailMessage) -> Result<String, RenderError>;
    }
}

/// Whether a body template is inline markup rather than a view name
pub fn is_inline_markup(template: &str) -> bool {
    template.contains('<') || template.contains('>')
}

/// Picks the view for a message.
///
/// A non-empty `body_template` without angle brackets is a view name and is used as is.
/// Otherwise the theme from the render options is capitalized (`minimal` becomes
/// `Minimal`), or [`DEFAULT_VIEW`] is used when there is no theme.
pub fn resolve_view_name(message: &EmailMessage) -> String {
    if let Some(template) = message.body_template.as_deref() {
        if !template.is_empty() && !is_inline_markup(template) {
            return template.to_string();
        }
    }

    let theme = message
        .render_options
        .as_ref()
        .map(|options| options.theme.as_str())
        .unwrap_or(DEFAULT_VIEW);

    let mut chars = theme.chars();

    match chars.next() {
        Some(first) => {
            let rest = chars.as_str().to_lowercase();
            first.to_uppercase().chain(rest.chars()).collect()
        }
        None => DEFAULT_VIEW.to_string(),
    }
}

/// [`HtmlRenderer`] that renders the resolved view from a [`ViewEngine`], retrying once
/// with [`DEFAULT_VIEW`] when that view does not exist.
#[derive(Debug, Clone)]
pub struct ThemedHtmlRenderer<V>
where
    V: ViewEngine,
{
    views: V,
}

impl<V> ThemedHtmlRenderer<V>
where
    V: ViewEngine,
{
    /// Creates a renderer backed by `views`
    pub fn new(views: V) -> Self {
        Self { views }
    }

    fn render(&self, message: &EmailMessage) -> Result<String, RenderError> {
        let view = resolve_view_name(message);

        debug!(view = %view, "rendering email view");

        match self.views.render_view(&view, message) {
            Err(RenderError::ViewNotFound(missing)) if view != DEFAULT_VIEW => {
                warn!(
                    view = %view,
                    missing = %missing,
                    fallback = DEFAULT_VIEW,
                    "view not found, using fallback"
                );

                self.views.render_view(DEFAULT_VIEW, message)
            }
            result => result,
        }
    }
}

#[async_trait]
impl<V> HtmlRenderer for ThemedHtmlRenderer<V>
where
    V: ViewEngine,
{
    async fn render_email(&self, message: &EmailMessage) -> Result<String, RenderError> {
        self.render(message)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use mockall::{predicate::eq, Sequence};
    use testresult::TestResult;

    use crate::domain::communication::message::{EmailMessageBuilder, RenderOptions};

    use super::*;

    fn themed(theme: &str) -> EmailMessage {
        EmailMessageBuilder::new()
            .render_options(RenderOptions::with_theme(theme))
            .build()
    }

    #[test]
    fn test_theme_is_capitalized() {
        assert_eq!(resolve_view_name(&themed("minimal")), "Minimal");
        assert_eq!(resolve_view_name(&themed("CLASSIC")), "Classic");
        assert_eq!(resolve_view_name(&themed("mOdErN")), "Modern");
    }

    #[test]
    fn test_no_render_options_resolves_default() {
        assert_eq!(resolve_view_name(&EmailMessage::default()), "Default");
    }

    #[test]
    fn test_empty_theme_resolves_default() {
        assert_eq!(resolve_view_name(&themed("")), "Default");
    }

    #[test]
    fn test_view_name_template_wins_over_theme() {
        let message = EmailMessageBuilder::new()
            .body_template("Welcome")
            .render_options(RenderOptions::with_theme("minimal"))
            .build();

        assert_eq!(resolve_view_name(&message), "Welcome");
    }

    #[test]
    fn test_inline_markup_template_falls_back_to_theme() {
        let message = EmailMessageBuilder::new()
            .body_template("<p>Hi {{Name}}</p>")
            .render_options(RenderOptions::with_theme("classic"))
            .build();

        assert_eq!(resolve_view_name(&message), "Classic");
    }

    #[test]
    fn test_single_angle_bracket_counts_as_markup() {
        assert!(is_inline_markup("a > b"));
        assert!(is_inline_markup("<"));
        assert!(!is_inline_markup("Welcome"));
    }

    #[tokio::test]
    async fn test_renders_resolved_view() -> TestResult {
        let mut views = MockViewEngine::new();

        views
            .expect_render_view()
            .with(eq("Minimal"), mockall::predicate::always())
            .times(1)
            .returning(|_, _| Ok("<p>minimal</p>".to_string()));

        let renderer = ThemedHtmlRenderer::new(views);

        let html = renderer.render_email(&themed("minimal")).await?;

        assert_eq!(html, "<p>minimal</p>");

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_view_retries_default() -> TestResult {
        let mut views = MockViewEngine::new();
        let mut seq = Sequence::new();

        views
            .expect_render_view()
            .with(eq("Minimal"), mockall::predicate::always())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|view, _| Err(RenderError::ViewNotFound(view.to_string())));

        views
            .expect_render_view()
            .with(eq("Default"), mockall::predicate::always())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok("<p>default</p>".to_string()));

        let renderer = ThemedHtmlRenderer::new(views);

        let html = renderer.render_email(&themed("minimal")).await?;

        assert_eq!(html, "<p>default</p>");

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_view_and_missing_default_fails() {
        let mut views = MockViewEngine::new();

        views
            .expect_render_view()
            .times(2)
            .returning(|view, _| Err(RenderError::ViewNotFound(view.to_string())));

        let renderer = ThemedHtmlRenderer::new(views);

        let result = renderer.render_email(&themed("minimal")).await;

        assert!(matches!(result, Err(RenderError::ViewNotFound(view)) if view == "Default"));
    }

    #[tokio::test]
    async fn test_missing_default_fails_without_retry() {
        let mut views = MockViewEngine::new();

        views
            .expect_render_view()
            .with(eq("Default"), mockall::predicate::always())
            .times(1)
            .returning(|view, _| Err(RenderError::ViewNotFound(view.to_string())));

        let renderer = ThemedHtmlRenderer::new(views);

        let result = renderer.render_email(&EmailMessage::default()).await;

        assert!(matches!(result, Err(RenderError::ViewNotFound(_))));
    }

    #[tokio::test]
    async fn test_default_view_missing_a_partial_is_not_retried() {
        let mut views = MockViewEngine::new();

        views
            .expect_render_view()
            .with(eq("Default"), mockall::predicate::always())
            .times(1)
            .returning(|_, _| Err(RenderError::ViewNotFound("Header".to_string())));

        let renderer = ThemedHtmlRenderer::new(views);

        let result = renderer.render_email(&EmailMessage::default()).await;

        assert!(matches!(result, Err(RenderError::ViewNotFound(view)) if view == "Header"));
    }

    #[tokio::test]
    async fn test_missing_view_reported_under_another_name_retries_default() -> TestResult {
        let mut views = MockViewEngine::new();
        let mut seq = Sequence::new();

        views
            .expect_render_view()
            .with(eq("Minimal"), mockall::predicate::always())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(RenderError::ViewNotFound("minimal".to_string())));

        views
            .expect_render_view()
            .with(eq("Default"), mockall::predicate::always())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok("<p>default</p>".to_string()));

        let renderer = ThemedHtmlRenderer::new(views);

        assert_eq!(
            renderer.render_email(&themed("minimal")).await?,
            "<p>default</p>"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_broken_view_is_not_retried() {
        let mut views = MockViewEngine::new();

        views
            .expect_render_view()
            .times(1)
            .returning(|_, _| Err(RenderError::RenderFailed(anyhow!("template blew up"))));

        let renderer = ThemedHtmlRenderer::new(views);

        let result = renderer.render_email(&themed("modern")).await;

        assert!(matches!(result, Err(RenderError::RenderFailed(_))));
    }
}
