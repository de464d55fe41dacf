/// Pure string processing utilities (Discord-agnostic)

/// Extract the first N characters of a string
pub fn take_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

/// Check if a string is empty after trimming
pub fn is_empty_or_whitespace(text: &str) -> bool {
    text.trim().is_empty()
}

/// Convert a word into a lowercase, dash separated identifier
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Truncate a long message with ellipsis
pub fn truncate_message(message: &str, max_length: usize) -> String {
    if message.chars().count() <= max_length {
        message.to_string()
    } else if max_length < 3 {
        take_chars(message, max_length)
    } else {
        format!("{}...", take_chars(message, max_length - 3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_chars() {
        assert_eq!(take_chars("Hello World", 5), "Hello");
        assert_eq!(take_chars("Short", 10), "Short");
        assert_eq!(take_chars("Test", 0), "");
    }

    #[test]
    fn test_is_empty_or_whitespace() {
        assert!(is_empty_or_whitespace(""));
        assert!(is_empty_or_whitespace("   "));
        assert!(is_empty_or_whitespace("\t\n"));

        assert!(!is_empty_or_whitespace("text"));
        assert!(!is_empty_or_whitespace("  text  "));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Dragon Scimitar"), "dragon-scimitar");
        assert_eq!(slugify("  Abyssal   whip!! "), "abyssal-whip");
        assert_eq!(slugify("Karil's crossbow"), "karil-s-crossbow");
        assert_eq!(slugify("ZULRAH"), "zulrah");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_truncate_message() {
        assert_eq!(truncate_message("Hello", 10), "Hello");
        assert_eq!(truncate_message("This is a very long message", 10), "This is...");
        assert_eq!(truncate_message("Hello", 2), "He");
    }
}
