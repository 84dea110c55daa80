//! crates/docsmith_core/src/fallback.rs
//!
//! Deterministic, offline substitute content for when the remote generation
//! call fails. Total over its inputs, no side effects: the user-facing flow
//! never hard-fails on a generation error.

use regex::Regex;

/// Placeholder text for one page of a document, used when the remote call
/// for that page fails during document generation.
pub fn fallback_page(page_index: usize, total_pages: usize, user_prompt: &str) -> String {
    let idx = page_index + 1;
    format!(
        "This is placeholder content for page {idx} of {total_pages} based on the user prompt: \
         '{user_prompt}'.\n\n\
         The generation service could not be reached right now, so this text was written \
         locally. You can refine or regenerate this page later once the model is available."
    )
}

/// Applies a refinement instruction to `base_text` without calling out.
///
/// The instruction is inspected case-insensitively for keywords:
/// "shorten" truncates to an explicit word count (or half the words),
/// "bullet"/"bullets" renders one dash-prefixed line per sentence,
/// "formal" prepends a fixed marker, anything else appends a note that the
/// instruction was applied locally. Empty input always yields the
/// `[no content]` sentinel.
pub fn fallback_refine(base_text: &str, instruction: &str) -> String {
    if base_text.is_empty() {
        return "[no content]".to_string();
    }
    let p = instruction.to_lowercase();

    if p.contains("shorten") {
        let words: Vec<&str> = base_text.split_whitespace().collect();
        let n = match Regex::new(r"\d+").unwrap().find(&p) {
            Some(m) => m.as_str().parse::<usize>().unwrap_or(1),
            None => (words.len() / 2).max(1),
        };
        let mut out = words[..n.min(words.len())].join(" ");
        if words.len() > n {
            out.push('…');
        }
        return out;
    }

    if p.contains("bullet") {
        return split_sentences(base_text)
            .iter()
            .map(|s| format!("- {s}"))
            .collect::<Vec<_>>()
            .join("\n");
    }

    if p.contains("formal") {
        return format!("In a more formal tone: {base_text}");
    }

    format!("{base_text}\n\n[Refined locally with prompt: {instruction}]")
}

/// Splits text into sentences on `.`/`!`/`?` boundaries followed by
/// whitespace, keeping the terminal punctuation. Shared by the bulletizer
/// above and the slide exporter.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.trim().chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().map_or(true, |next| next.is_whitespace());
        if at_boundary {
            while chars.peek().map_or(false, |next| next.is_whitespace()) {
                chars.next();
            }
            if !current.trim().is_empty() {
                sentences.push(current.trim().to_string());
            }
            current.clear();
        }
    }
    if !current.trim().is_empty() {
        sentences.push(current.trim().to_string());
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_always_yields_sentinel() {
        assert_eq!(fallback_refine("", "shorten to 3 words"), "[no content]");
        assert_eq!(fallback_refine("", "anything at all"), "[no content]");
    }

    #[test]
    fn shorten_with_explicit_count() {
        let text = "one two three four five six seven eight nine ten";
        assert_eq!(
            fallback_refine(text, "shorten to 5 words"),
            "one two three four five…"
        );
    }

    #[test]
    fn shorten_without_count_halves() {
        let text = "alpha beta gamma delta";
        assert_eq!(fallback_refine(text, "please SHORTEN this"), "alpha beta…");
    }

    #[test]
    fn shorten_longer_than_text_keeps_everything() {
        assert_eq!(fallback_refine("just two", "shorten to 10"), "just two");
    }

    #[test]
    fn bullets_split_on_sentence_boundaries() {
        assert_eq!(fallback_refine("A. B! C?", "turn into bullets"), "- A.\n- B!\n- C?");
    }

    #[test]
    fn formal_prepends_marker() {
        assert_eq!(
            fallback_refine("hello there", "make it formal"),
            "In a more formal tone: hello there"
        );
    }

    #[test]
    fn unknown_instruction_appends_local_note() {
        assert_eq!(
            fallback_refine("body", "translate to pirate"),
            "body\n\n[Refined locally with prompt: translate to pirate]"
        );
    }

    #[test]
    fn page_placeholder_names_page_and_prompt() {
        let text = fallback_page(2, 7, "a business plan");
        assert!(text.contains("page 3 of 7"));
        assert!(text.contains("'a business plan'"));
    }

    #[test]
    fn sentence_split_ignores_inline_periods() {
        let sentences = split_sentences("Version 3.5 shipped. It works!");
        assert_eq!(sentences, vec!["Version 3.5 shipped.", "It works!"]);
    }

    #[test]
    fn sentence_split_keeps_trailing_fragment() {
        let sentences = split_sentences("First sentence. trailing fragment");
        assert_eq!(sentences, vec!["First sentence.", "trailing fragment"]);
    }
}
