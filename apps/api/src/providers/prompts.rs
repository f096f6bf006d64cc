// Prompt constants and prompt-building utilities for the reasoning adapter.

/// Default reasoning instruction used when the caller supplies none.
pub const DEFAULT_REASONING_PROMPT: &str = "List skills which candidate might lack for this job \
    (if any). And list matching skills. Be concise.";

/// Maximum characters of resume or job text included in a reasoning prompt.
/// Keeps the assembled prompt inside provider input limits.
pub const REASONING_INPUT_CAP: usize = 3000;

/// Builds the final reasoning prompt from an instruction template and the
/// two text blocks, truncating each block to [`REASONING_INPUT_CAP`] chars.
pub fn build_reasoning_prompt(
    resume_text: &str,
    job_text: &str,
    template: Option<&str>,
) -> String {
    let instruction = template.unwrap_or(DEFAULT_REASONING_PROMPT);
    format!(
        "{instruction}\nResume:\n{}\n\nJob Description:\n{}\n",
        truncate_chars(resume_text, REASONING_INPUT_CAP),
        truncate_chars(job_text, REASONING_INPUT_CAP),
    )
}

/// Truncates to at most `max` characters, respecting char boundaries.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_passes_through() {
        assert_eq!(truncate_chars("hello", 3000), "hello");
    }

    #[test]
    fn test_long_text_is_capped() {
        let long = "x".repeat(5000);
        assert_eq!(truncate_chars(&long, REASONING_INPUT_CAP).len(), 3000);
    }

    #[test]
    fn test_truncation_respects_multibyte_chars() {
        let text = "é".repeat(4000);
        let truncated = truncate_chars(&text, REASONING_INPUT_CAP);
        assert_eq!(truncated.chars().count(), 3000);
    }

    #[test]
    fn test_default_template_applied_when_none() {
        let prompt = build_reasoning_prompt("resume body", "job body", None);
        assert!(prompt.starts_with(DEFAULT_REASONING_PROMPT));
        assert!(prompt.contains("Resume:\nresume body"));
        assert!(prompt.contains("Job Description:\njob body"));
    }

    #[test]
    fn test_custom_template_replaces_default() {
        let prompt = build_reasoning_prompt("r", "j", Some("Rate this match 1-10."));
        assert!(prompt.starts_with("Rate this match 1-10."));
        assert!(!prompt.contains(DEFAULT_REASONING_PROMPT));
    }

    #[test]
    fn test_both_blocks_truncated_independently() {
        let resume = "a".repeat(4000);
        let job = "b".repeat(4000);
        let prompt = build_reasoning_prompt(&resume, &job, None);
        assert!(prompt.contains(&"a".repeat(3000)));
        assert!(!prompt.contains(&"a".repeat(3001)));
        assert!(prompt.contains(&"b".repeat(3000)));
        assert!(!prompt.contains(&"b".repeat(3001)));
    }
}
