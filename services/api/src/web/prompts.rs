//! services/api/src/web/prompts.rs
//!
//! Prompt templates for the generation, refinement and regeneration calls.
//! One natural-language prompt string per remote call.

const PAGE_PROMPT_TEMPLATE: &str = "You are a document author. Generate the content for page {page} of {pages} for the user prompt.\n\nUSER_PROMPT:\n{user_prompt}\n\nPAGE_INSTRUCTIONS: Generate one page of text suitable for a slide or document page. Keep it concise (about 120-200 words) unless the user requested otherwise.";

const REFINE_PROMPT_TEMPLATE: &str = "You are an expert document editor. Apply the user's refinement instruction ONLY to the provided section text.\n\nSECTION_TEXT:\n{section_text}\n\nREFINEMENT_INSTRUCTION:\n{instruction}\n\nReturn the revised section text only (no extra commentary).";

const REGENERATE_PROMPT_TEMPLATE: &str = "You are a document author. Regenerate this section as a fresh page while keeping the topic and intent similar.\n\nDOCUMENT_TITLE: {title}\n\nCURRENT_SECTION_HEADING: {heading}\n\nCURRENT_SECTION_TEXT:\n{text}\n\nReturn a single improved page of text (about 120-200 words) and no extra notes.";

/// The fixed prompt recorded for a whole-page regeneration event.
pub const REGENERATE_MARKER: &str = "[Regenerate page]";

/// Builds the prompt for one page of a document generation run.
/// `page_index` is zero-based; the template speaks in one-based pages.
pub fn page_prompt(
    page_index: usize,
    total_pages: usize,
    user_prompt: &str,
    theme: Option<&str>,
) -> String {
    let mut prompt = PAGE_PROMPT_TEMPLATE
        .replace("{page}", &(page_index + 1).to_string())
        .replace("{pages}", &total_pages.to_string())
        .replace("{user_prompt}", user_prompt);
    if let Some(theme) = theme {
        prompt.push_str(&format!("\nTheme or tone: {theme}."));
    }
    prompt
}

pub fn refine_prompt(section_text: &str, instruction: &str) -> String {
    REFINE_PROMPT_TEMPLATE
        .replace("{section_text}", section_text)
        .replace("{instruction}", instruction)
}

pub fn regenerate_prompt(document_title: &str, heading: &str, text: &str) -> String {
    REGENERATE_PROMPT_TEMPLATE
        .replace("{title}", document_title)
        .replace("{heading}", heading)
        .replace("{text}", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_prompt_is_one_based_and_carries_theme() {
        let prompt = page_prompt(0, 3, "a gardening guide", Some("cheerful"));
        assert!(prompt.contains("page 1 of 3"));
        assert!(prompt.contains("a gardening guide"));
        assert!(prompt.ends_with("Theme or tone: cheerful."));

        let no_theme = page_prompt(2, 3, "a gardening guide", None);
        assert!(!no_theme.contains("Theme or tone"));
    }
}
