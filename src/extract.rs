//! Tagged-content extraction from free-form model output.
//!
//! Each phase asks the model to wrap its payload in a named delimiter pair
//! (`<OUTLINE>…</OUTLINE>`, `<CHAPTER_3>…</CHAPTER_3>`). Only the first pair is
//! considered; nested or repeated tags of the same name are not handled.

/// Extract the trimmed content between `<tag>` and `</tag>`.
///
/// Both delimiters are located independently (first occurrence of each).
/// Returns `None` when either is missing, when the closing tag does not
/// follow the opening tag, or when the enclosed content is blank.
pub fn extract_tagged(text: &str, tag: &str) -> Option<String> {
    let start_tag = format!("<{}>", tag);
    let end_tag = format!("</{}>", tag);

    let start_idx = text.find(&start_tag)?;
    let end_idx = text.find(&end_tag)?;
    let content_start = start_idx + start_tag.len();

    if end_idx < content_start {
        return None;
    }

    let content = text[content_start..end_idx].trim();
    if content.is_empty() {
        return None;
    }
    Some(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_basic() {
        let text = "Here you go <OUTLINE>abc</OUTLINE> let me know.";
        assert_eq!(extract_tagged(text, "OUTLINE"), Some("abc".to_string()));
    }

    #[test]
    fn test_extract_multiline_trims_whitespace() {
        let text = r#"Sure.
<CHAPTER_2>

## 2. Literature Review

Prior work (Smith, 2020) shows...

</CHAPTER_2>
Shall I continue?"#;
        let result = extract_tagged(text, "CHAPTER_2").unwrap();
        assert!(result.starts_with("## 2. Literature Review"));
        assert!(result.ends_with("shows..."));
    }

    #[test]
    fn test_extract_missing_open_tag() {
        assert_eq!(extract_tagged("abc</ABSTRACT>", "ABSTRACT"), None);
    }

    #[test]
    fn test_extract_missing_close_tag() {
        assert_eq!(extract_tagged("<ABSTRACT>abc", "ABSTRACT"), None);
    }

    #[test]
    fn test_extract_no_tags() {
        assert_eq!(extract_tagged("plain response", "REFERENCES"), None);
    }

    #[test]
    fn test_extract_reversed_tags_is_not_found() {
        let text = "</OUTLINE> stray text <OUTLINE>";
        assert_eq!(extract_tagged(text, "OUTLINE"), None);
    }

    #[test]
    fn test_extract_reversed_then_valid_pair_uses_first_occurrences() {
        // First close precedes first open, so the pair is rejected even though a
        // well-formed pair follows.
        let text = "</OUTLINE> <OUTLINE>abc</OUTLINE>";
        assert_eq!(extract_tagged(text, "OUTLINE"), None);
    }

    #[test]
    fn test_extract_first_pair_only() {
        let text = "<ABSTRACT>one</ABSTRACT> and <ABSTRACT>two</ABSTRACT>";
        assert_eq!(extract_tagged(text, "ABSTRACT"), Some("one".to_string()));
    }

    #[test]
    fn test_extract_blank_payload_is_not_found() {
        assert_eq!(extract_tagged("<OUTLINE>   \n </OUTLINE>", "OUTLINE"), None);
    }

    #[test]
    fn test_extract_does_not_match_other_chapter() {
        let text = "<CHAPTER_1>first</CHAPTER_1>";
        assert_eq!(extract_tagged(text, "CHAPTER_10"), None);
        assert_eq!(extract_tagged(text, "CHAPTER_1"), Some("first".to_string()));
    }

    #[test]
    fn test_extract_handles_multibyte_surroundings() {
        let text = "Gliederung – „Entwurf“ <OUTLINE>Kapitel Ü</OUTLINE> ✓";
        assert_eq!(
            extract_tagged(text, "OUTLINE"),
            Some("Kapitel Ü".to_string())
        );
    }
}
