//! Render options

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Visual theme for rendered emails.
///
/// Nothing here is validated; renderers decide what they accept.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Theme name, e.g. `modern`, `classic` or `minimal`
    pub theme: String,

    /// Primary color
    pub primary_color: String,

    /// Secondary color
    pub secondary_color: String,

    /// Background color
    pub background_color: String,

    /// Text color
    pub text_color: String,

    /// CSS font family
    pub font_family: String,

    /// Company logo URL
    pub logo_url: Option<String>,

    /// Company name
    pub company_name: Option<String>,

    /// Footer text
    pub footer_text: Option<String>,

    /// Whether to render [`RenderOptions::social_links`]
    pub include_social_links: bool,

    /// Social network name to URL
    pub social_links: BTreeMap<String, String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            theme: "modern".to_string(),
            primary_color: "#007bff".to_string(),
            secondary_color: "#6c757d".to_string(),
            background_color: "#ffffff".to_string(),
            text_color: "#333333".to_string(),
            font_family: "Arial, sans-serif".to_string(),
            logo_url: None,
            company_name: None,
            footer_text: None,
            include_social_links: false,
            social_links: BTreeMap::new(),
        }
    }
}

impl RenderOptions {
    /// Default options with the given theme
    pub fn with_theme(theme: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            ..Default::default()
        }
    }
}
