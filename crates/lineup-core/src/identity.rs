//! Identity normalizer: turns raw display names into comparable forms.
//!
//! All three functions are pure and total: any string input produces a
//! string output, including the empty string.

/// Lowercase a name and strip everything outside `[a-z0-9]` and
/// whitespace, collapsing runs of whitespace to a single space.
///
/// This is the comparable form used by the match scorer; two names that
/// normalize identically are considered an exact match.
#[must_use]
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;
    for ch in name.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else if ch.is_whitespace() {
            pending_space = true;
        }
        // Everything else (punctuation, diacritics, symbols) is dropped.
    }
    out
}

/// Derive a URL slug: lowercase, keep `[a-z0-9]`, turn whitespace runs
/// into single hyphens, collapse repeated hyphens, trim hyphens at
/// either end.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else if ch.is_whitespace() || ch == '-' {
            if !out.ends_with('-') && !out.is_empty() {
                out.push('-');
            }
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Derive a sortable display key: `"<last token>, <remaining tokens>"`
/// for multi-token names, the name unchanged otherwise.
#[must_use]
pub fn sort_key(name: &str) -> String {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    match tokens.split_last() {
        Some((last, rest)) if !rest.is_empty() => {
            format!("{}, {}", last, rest.join(" "))
        }
        _ => name.to_string(),
    }
}
