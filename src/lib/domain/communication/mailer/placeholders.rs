//! Minimal `{{Field}}` substitution for senders without a renderer

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::domain::communication::message::TemplateModel;

lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex = Regex::new(r"\{\{([^{}\s]+)\}\}").unwrap();
}

/// Replaces every `{{Field}}` token in `template` with the text of the same-named model
/// field. A field name is any run of characters without braces or whitespace, so keys
/// such as `first-name` work too. Missing and `null` fields become the empty string.
/// Anything that is not a well-formed token, such as `{{ Name }}` or `{{}}`, is left as is.
pub fn substitute_placeholders(template: &str, model: &TemplateModel) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures<'_>| {
            model.field_text(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn model() -> TemplateModel {
        TemplateModel::new().with("Name", "Ann").with("Code", "42")
    }

    #[test]
    fn test_substitutes_all_fields() {
        assert_eq!(
            substitute_placeholders("Hi {{Name}}, code {{Code}}", &model()),
            "Hi Ann, code 42"
        );
    }

    #[test]
    fn test_missing_field_substitutes_empty() {
        let model = TemplateModel::new().with("Name", "Ann");

        assert_eq!(
            substitute_placeholders("Hi {{Name}}, code {{Code}}", &model),
            "Hi Ann, code "
        );
    }

    #[test]
    fn test_null_field_substitutes_empty() {
        let model = TemplateModel::new().with("Name", Value::Null);

        assert_eq!(substitute_placeholders("[{{Name}}]", &model), "[]");
    }

    #[test]
    fn test_field_names_are_case_sensitive() {
        assert_eq!(substitute_placeholders("{{name}}|{{Name}}", &model()), "|Ann");
    }

    #[test]
    fn test_malformed_tokens_are_untouched() {
        assert_eq!(
            substitute_placeholders("{{ Name }} {{}} {Name} {{Name", &model()),
            "{{ Name }} {{}} {Name} {{Name"
        );
    }

    #[test]
    fn test_non_identifier_field_names() {
        let model = TemplateModel::new()
            .with("first-name", "Ann")
            .with("order.id", 42);

        assert_eq!(
            substitute_placeholders("Hi {{first-name}}, order {{order.id}}", &model),
            "Hi Ann, order 42"
        );
    }

    #[test]
    fn test_repeated_tokens_and_numbers() {
        let model = TemplateModel::new().with("N", 7);

        assert_eq!(substitute_placeholders("{{N}}+{{N}}", &model), "7+7");
    }
}
