//! Text sanitization for values entering the store from callers.

/// Maximum length of a player name, in characters, after escaping
pub const MAX_NAME_LEN: usize = 100;

/// Escape markup-significant characters so a stored name renders as text.
///
/// Disallowed markup is escaped rather than stripped, so `<b>Ann</b>` is
/// kept readable as `&lt;b&gt;Ann&lt;/b&gt;`. Control characters are dropped.
pub fn escape_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Sanitize a player name for registration.
///
/// Trims surrounding whitespace, escapes markup and enforces
/// `1..=MAX_NAME_LEN` characters.
///
/// # Errors
///
/// Returns a human-readable reason when the name is empty or too long.
pub fn sanitize_name(raw: &str) -> Result<String, String> {
    let cleaned = escape_markup(raw.trim());

    if cleaned.is_empty() {
        return Err("Name must not be empty".to_string());
    }

    let len = cleaned.chars().count();
    if len > MAX_NAME_LEN {
        return Err(format!(
            "Name must be at most {MAX_NAME_LEN} characters (got {len})"
        ));
    }

    Ok(cleaned)
}
