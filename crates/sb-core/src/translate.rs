//! Filter expression to regex translation
//!
//! Rule bodies and request URLs go through the same translation so that
//! the 8-byte signatures taken from either side line up.

/// Character class emitted for the ABP `^` separator placeholder.
pub const SEPARATOR_CLASS: &str = r"([^a-zA-Z\d]|[_\-\.%])";

/// Translate a filter body into regex source, with `prefix` prepended verbatim.
pub fn translate(prefix: &str, body: &str) -> String {
    let mut out = String::with_capacity(prefix.len() + body.len() * 2);
    out.push_str(prefix);

    let body = body.strip_prefix('*').unwrap_or(body);
    let last = body.len().saturating_sub(1);

    for (i, ch) in body.char_indices() {
        match ch {
            '*' => out.push_str(".*"),
            '?' | '[' | ']' | '{' | '}' | '(' | ')' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            '^' => out.push_str(SEPARATOR_CLASS),
            '|' if i == last => out.push('$'),
            '|' => out.push_str(r"\|"),
            _ => out.push(ch),
        }
    }

    // Nothing anchors the end, so a trailing wildcard is noise.
    if body.ends_with('*') && out.ends_with(".*") {
        out.truncate(out.len() - 2);
    }

    out
}

/// Normalize a request URL the same way rule bodies are normalized.
#[inline]
pub fn normalize_url(url: &str) -> String {
    translate("", url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcards() {
        assert_eq!(translate("", "ads*.gif"), "ads.*.gif");
        assert_eq!(translate("", "*banner"), "banner");
        assert_eq!(translate("", "banner*"), "banner");
        assert_eq!(translate("", "a**"), "a.*");
        assert_eq!(translate("", "*"), "");
    }

    #[test]
    fn test_end_anchor() {
        assert!(translate("", "foo|").ends_with("foo$"));
        assert_eq!(translate("", "a|b|"), r"a\|b$");
    }

    #[test]
    fn test_separator() {
        let out = translate("", "a^b");
        assert_eq!(out, format!("a{}b", SEPARATOR_CLASS));
    }

    #[test]
    fn test_escapes() {
        assert_eq!(translate("", "a?b[c]"), r"a\?b\[c\]");
        assert_eq!(translate("", "f(x){1}\\"), r"f\(x\)\{1\}\\");
    }

    #[test]
    fn test_prefix_is_verbatim() {
        assert_eq!(translate("^", "http://ads"), "^http://ads");
        assert_eq!(translate("^", "*"), "^");
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("http://example.com/a?b=1"),
            r"http://example.com/a\?b=1"
        );
    }
}
