//! Askama-backed email themes

use askama::Template;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::domain::communication::{
    mailer::{looks_like_html, substitute_placeholders},
    message::{EmailMessage, RenderOptions},
    renderer::{is_inline_markup, RenderError, ViewEngine},
};

lazy_static! {
    static ref PARAGRAPH_BREAK_REGEX: Regex = Regex::new(r"\r?\n[ \t]*\r?\n").unwrap();
}

/// The compiled theme views: `Default`, `Modern`, `Classic` and `Minimal`.
///
/// Use with [`ThemedHtmlRenderer`](crate::domain::communication::renderer::ThemedHtmlRenderer)
/// to get theme resolution and the fallback to `Default`. Stylesheets are inlined into the
/// markup since most mail clients drop `<style>` blocks.
#[derive(Clone, Copy, Debug, Default)]
pub struct AskamaViews;

impl ViewEngine for AskamaViews {
    fn render_view(&self, view: &str, message: &EmailMessage) -> Result<String, RenderError> {
        let view_model = ThemeView::new(message);

        let html = match view {
            "Default" => DefaultTheme { view: view_model }.render()?,
            "Modern" => ModernTheme { view: view_model }.render()?,
            "Classic" => ClassicTheme { view: view_model }.render()?,
            "Minimal" => MinimalTheme { view: view_model }.render()?,
            other => return Err(RenderError::ViewNotFound(other.to_string())),
        };

        debug!(view, "inlining email stylesheet");

        Ok(css_inline::inline(&html)?)
    }
}

/// Values shared by every theme template
#[derive(Debug)]
struct ThemeView<'a> {
    subject: &'a str,
    html_content: Option<String>,
    paragraphs: Vec<&'a str>,
    options: RenderOptions,
}

impl<'a> ThemeView<'a> {
    fn new(message: &'a EmailMessage) -> Self {
        let inline_template = message
            .body_template
            .as_deref()
            .filter(|template| is_inline_markup(template));

        // Markup is trusted and goes in unescaped, plain text is split into escaped paragraphs
        let (html_content, paragraphs) = match (inline_template, message.model.as_ref()) {
            (Some(template), Some(model)) => (Some(substitute_placeholders(template, model)), vec![]),
            (Some(template), None) => (Some(template.to_string()), vec![]),
            (None, _) if looks_like_html(&message.body) => (Some(message.body.clone()), vec![]),
            (None, _) => (None, split_paragraphs(&message.body)),
        };

        Self {
            subject: &message.subject,
            html_content,
            paragraphs,
            options: message.render_options.clone().unwrap_or_default(),
        }
    }

    fn social_links(&self) -> Vec<(&str, &str)> {
        if !self.options.include_social_links {
            return vec![];
        }

        self.options
            .social_links
            .iter()
            .map(|(name, url)| (name.as_str(), url.as_str()))
            .collect()
    }
}

fn split_paragraphs(body: &str) -> Vec<&str> {
    PARAGRAPH_BREAK_REGEX
        .split(body)
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .collect()
}

#[derive(Template)]
#[template(path = "emails/themes/default.html")]
struct DefaultTheme<'a> {
    view: ThemeView<'a>,
}

#[derive(Template)]
#[template(path = "emails/themes/modern.html")]
struct ModernTheme<'a> {
    view: ThemeView<'a>,
}

#[derive(Template)]
#[template(path = "emails/themes/classic.html")]
struct ClassicTheme<'a> {
    view: ThemeView<'a>,
}

#[derive(Template)]
#[template(path = "emails/themes/minimal.html")]
struct MinimalTheme<'a> {
    view: ThemeView<'a>,
}
