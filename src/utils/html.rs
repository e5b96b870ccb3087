/// Clean user-authored text (session notes, course descriptions) using the
/// ammonia library.
///
/// Whitelist-based sanitization: safe tags are preserved, dangerous tags
/// (like <script>) and malicious attributes (like onclick) are stripped
/// before the text is stored. Serves as a fail-safe against stored XSS in
/// whatever client renders the tracker.
pub fn clean_text(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_tags() {
        let cleaned = clean_text("reviewed chapter 3 <script>alert(1)</script>");
        assert!(!cleaned.contains("script"));
        assert!(cleaned.contains("reviewed chapter 3"));
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(clean_text("45 minutes of flashcards"), "45 minutes of flashcards");
    }
}
