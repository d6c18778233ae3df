//! HTML escaping for free-text fields.
//!
//! The five HTML-significant characters are replaced by entities, `&` included
//! wherever it appears. Text typed as `&lt;` therefore survives as `&amp;lt;`.
//! [`unescape`] undoes exactly one level, so the relay sees what the visitor
//! typed.

use crate::guard::form::SubmissionPayload;

/// `(raw, entity)` pairs; `&` first.
const ENTITIES: [(char, &str); 5] = [
    ('&', "&amp;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('"', "&quot;"),
    ('\'', "&#039;"),
];

fn entity_at(text: &str) -> Option<(char, &'static str)> {
    ENTITIES
        .iter()
        .copied()
        .find(|(_, entity)| text.starts_with(entity))
}

/// Escape `& < > " '`.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ENTITIES.iter().find(|(raw, _)| *raw == ch) {
            Some((_, entity)) => out.push_str(entity),
            None => out.push(ch),
        }
    }
    out
}

/// Inverse of [`sanitize`]: decodes one level of its five entities.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match entity_at(rest) {
            Some((raw, entity)) => {
                out.push(raw);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Copy of `payload` with every free-text field escaped.
pub fn sanitize_payload(payload: &SubmissionPayload) -> SubmissionPayload {
    SubmissionPayload {
        name: sanitize(&payload.name),
        email: sanitize(&payload.email),
        phone: payload.phone.as_deref().map(sanitize),
        service: payload.service,
        message: sanitize(&payload.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_all_five() {
        assert_eq!(
            sanitize(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#039;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(sanitize("Hello, world. Привет!"), "Hello, world. Привет!");
    }

    #[test]
    fn test_every_ampersand_escaped() {
        assert_eq!(sanitize("R&D"), "R&amp;D");
        assert_eq!(sanitize("&amplifier"), "&amp;amplifier");
        assert_eq!(sanitize("&amp;"), "&amp;amp;");
        assert_eq!(
            sanitize("5 &lt; 6 &amp; R&D"),
            "5 &amp;lt; 6 &amp;amp; R&amp;D"
        );
    }

    #[test]
    fn test_text_without_specials_is_fixed_point() {
        let once = sanitize("plain words, 42!");
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn test_unescape_reverses_sanitize() {
        let raw = r#"if a < b && c > "d" then 'e'"#;
        assert_eq!(unescape(&sanitize(raw)), raw);
        assert_eq!(unescape("& &unknown; &lt"), "& &unknown; &lt");

        for typed in ["&lt;script&gt;", "&amp;amp;", "Tom &amp; Jerry", "&#039;&"] {
            assert_eq!(unescape(&sanitize(typed)), typed, "{typed}");
        }
    }
}
