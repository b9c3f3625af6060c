pub(crate) fn normalize_code(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.trim().to_ascii_uppercase()
}

/// Whitespace separated code list, e.g. `"BA  AA"`.
pub(crate) fn split_codes(value: Option<&str>) -> Vec<String> {
    value
        .map(|raw| {
            raw.split_whitespace()
                .map(normalize_code)
                .filter(|code| !code.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// `|` separated free text, whitespace collapsed, blanks dropped.
pub(crate) fn split_messages(value: Option<&str>) -> Vec<String> {
    value
        .map(|raw| {
            raw.split('|')
                .map(|message| message.split_whitespace().collect::<Vec<_>>().join(" "))
                .filter(|message| !message.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
