//! Small text helpers shared by the display modules

/// Center a title within `width` columns
pub fn format_header(title: &str, width: usize) -> String {
    let len = title.chars().count();
    let padding = width.saturating_sub(len) / 2;
    format!("{}{}", " ".repeat(padding), title)
}

/// A horizontal rule
pub fn separator(width: usize) -> String {
    "─".repeat(width)
}

/// Shorten to `max_chars` characters, ending in "..."
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        ".".repeat(max_chars)
    } else {
        let kept: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_header() {
        assert_eq!(format_header("Hi", 6), "  Hi");
        assert_eq!(format_header("Too long", 4), "Too long");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Café de Paris Deluxe", 8), "Café ...");
        assert_eq!(truncate("abcdef", 2), "..");
    }
}
