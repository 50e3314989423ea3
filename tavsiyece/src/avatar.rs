use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Placeholder avatar generator.
pub const PLACEHOLDER_AVATAR_BASE: &str = "https://ui-avatars.com/api/";

/// Characters left unescaped in a URI component.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Display name used when neither a name nor a username is known.
const PLACEHOLDER_NAME: &str = "?";

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Deterministic placeholder avatar keyed by name, then username.
pub fn placeholder_avatar(name: Option<&str>, username: Option<&str>) -> String {
    let display = present(name).or(present(username)).unwrap_or(PLACEHOLDER_NAME);
    let name = utf8_percent_encode(display, URI_COMPONENT);
    format!("{PLACEHOLDER_AVATAR_BASE}?name={name}&background=random")
}

/// Avatar URL to display: the stored photo when set, otherwise a placeholder.
pub fn resolve_avatar(photo_url: Option<&str>, name: Option<&str>, username: Option<&str>) -> String {
    match present(photo_url) {
        Some(url) => url.to_string(),
        None => placeholder_avatar(name, username),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_photo_wins() {
        assert_eq!(
            resolve_avatar(Some("https://cdn.example/p.jpg"), Some("Ali"), None),
            "https://cdn.example/p.jpg"
        );
    }

    #[test]
    fn falls_back_through_name_username_placeholder() {
        assert_eq!(
            resolve_avatar(None, Some("Ayşe Yılmaz"), Some("ayse")),
            "https://ui-avatars.com/api/?name=Ay%C5%9Fe%20Y%C4%B1lmaz&background=random"
        );
        assert_eq!(
            resolve_avatar(Some(""), Some(""), Some("mehmet")),
            "https://ui-avatars.com/api/?name=mehmet&background=random"
        );
        assert_eq!(
            resolve_avatar(None, None, None),
            "https://ui-avatars.com/api/?name=%3F&background=random"
        );
    }

    #[test]
    fn encodes_like_a_uri_component() {
        assert_eq!(
            placeholder_avatar(Some("Ali & Veli (O'Neil)"), None),
            "https://ui-avatars.com/api/?name=Ali%20%26%20Veli%20(O'Neil)&background=random"
        );
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(placeholder_avatar(Some("Can"), None), placeholder_avatar(Some("Can"), None));
    }
}
