#[cfg(test)]
#[path = "template_test.rs"]
mod tests;

use crate::domain::models::TemplateVariables;

pub const DEFAULT_PROMPT_TEMPLATE: &str = r#"Summarize the following content from "{{TITLE}}" ({{URL}}) in {{SELECTED_LANGUAGE}}. If the content continues in a later message, wait for the remaining parts before answering.

{{CONTENT}}"#;

/// Replaces every `{{NAME}}` placeholder with its variable. Unknown names
/// and unterminated braces are kept verbatim, and substituted values are
/// never scanned again.
pub fn render(template: &str, variables: &TemplateVariables) -> String {
    let mut res = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        res.push_str(&rest[..start]);
        rest = &rest[start..];

        let end = match rest[2..].find("}}") {
            Some(end) => end,
            None => break,
        };

        if let Some(value) = variables.get(&rest[2..2 + end]) {
            res.push_str(value);
            rest = &rest[end + 4..];
        } else {
            res.push_str("{{");
            rest = &rest[2..];
        }
    }

    res.push_str(rest);

    return res;
}
