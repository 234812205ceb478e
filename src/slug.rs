//! Slugs: lowercase, hyphenated, filesystem- and identifier-safe names

use lazy_regex::regex_is_match;

/// Longest slug [`slugify`] will produce
pub const MAX_SLUG_LEN: usize = 64;

/// Check a slug against `^[a-z0-9]+(-[a-z0-9]+)*$`
pub fn is_valid_slug(slug: &str) -> bool {
    regex_is_match!(r"^[a-z0-9]+(-[a-z0-9]+)*$", slug)
}

/// Derive a slug from a display name
///
/// Lowercases, turns every run of non-alphanumeric characters into a single
/// hyphen and trims hyphens from both ends. The result is either empty or
/// valid, and `slugify(slugify(x)) == slugify(x)`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    slug
}

/// Python identifier form of a slug (`tell-jokes` -> `tell_jokes`)
pub fn to_snake(slug: &str) -> String {
    let snake = slug.replace('-', "_");
    if snake.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", snake)
    } else {
        snake
    }
}

/// Make a file name safe to use as a single path segment
///
/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `-`.
/// Leading dots are stripped so nothing turns into a hidden file or `..`.
pub fn safe_filename(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}
