#[cfg(test)]
#[path = "language_test.rs"]
mod tests;

use std::env;

const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("bn", "Bangla"),
    ("cs", "Czech"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fa", "Persian"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hu", "Hungarian"),
    ("id", "Indonesian"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("ms", "Malay"),
    ("nb", "Norwegian Bokmål"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sk", "Slovak"),
    ("sv", "Swedish"),
    ("th", "Thai"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("vi", "Vietnamese"),
    ("zh", "Chinese"),
];

/// Picks the language code out of POSIX locale values, in `LC_ALL`,
/// `LC_MESSAGES`, `LANG` priority order. `ja_JP.UTF-8` yields `ja`.
pub fn locale_code(values: &[Option<String>]) -> Option<String> {
    for value in values.iter().flatten() {
        let code = value
            .split(['.', '@'])
            .next()
            .unwrap_or_default()
            .split(['_', '-'])
            .next()
            .unwrap_or_default()
            .to_lowercase();

        if code.is_empty() || code == "c" || code == "posix" {
            continue;
        }

        return Some(code);
    }

    return None;
}

/// English display name for a language code. Unknown codes come back as
/// given.
pub fn display_name(code: &str) -> String {
    let lowered = code.to_lowercase();
    if let Some((_, name)) = DISPLAY_NAMES.iter().find(|(c, _)| return *c == lowered) {
        return name.to_string();
    }

    return code.to_string();
}

/// Display name of the user's UI language, or an empty string when the
/// locale is unset or unusable.
pub fn system_ui_language() -> String {
    let values = ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .map(|key| return env::var(key).ok())
        .collect::<Vec<Option<String>>>();

    if let Some(code) = locale_code(&values) {
        return display_name(&code);
    }

    return "".to_string();
}

/// An explicit override wins, otherwise the system UI language is used.
pub fn resolve(override_lang: &str) -> String {
    if !override_lang.trim().is_empty() {
        return override_lang.trim().to_string();
    }

    return system_ui_language();
}
