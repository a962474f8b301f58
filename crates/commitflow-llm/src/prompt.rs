//! Shared prompt text and response parsing for all providers.

use serde::Deserialize;

use commitflow_core::error::{FlowError, Result};

/// Hard cap on the commit subject line.
pub const MAX_SUBJECT_CHARS: usize = 72;

/// Build the review prompt for a staged diff. Providers are asked for a
/// structured reply so an unusable response is detectable rather than
/// silently committed.
pub fn build_prompt(diff: &str) -> String {
    format!(
        "You are an experienced code reviewer.\n\
         Review the provided file diff and give a concise commit message.\n\n\
         Rules:\n\
         - Use imperative mood\n\
         - Max {MAX_SUBJECT_CHARS} characters\n\
         - No explanations\n\n\
         Reply with a JSON object of the form {{\"commit_message\": \"...\"}} and nothing else.\n\n\
         Diff:\n{diff}"
    )
}

#[derive(Deserialize)]
struct CommitMessageReply {
    commit_message: String,
}

/// Parse and validate a provider reply. Empty, unparsable, multi-line, or
/// over-length messages are provider failures — never substituted with a
/// default.
pub fn parse_message(provider: &'static str, raw: &str) -> Result<String> {
    let json = extract_json_object(raw).ok_or_else(|| malformed(provider, raw))?;
    let reply: CommitMessageReply =
        serde_json::from_str(json).map_err(|_| malformed(provider, raw))?;

    let message = reply.commit_message.trim().to_string();
    if message.is_empty() {
        return Err(FlowError::Provider {
            provider: provider.to_string(),
            message: "empty commit message in response".to_string(),
        });
    }
    if message.contains('\n') {
        return Err(FlowError::Provider {
            provider: provider.to_string(),
            message: "commit message contains an explanatory body".to_string(),
        });
    }
    if message.chars().count() > MAX_SUBJECT_CHARS {
        return Err(FlowError::Provider {
            provider: provider.to_string(),
            message: format!(
                "commit message exceeds {MAX_SUBJECT_CHARS} characters: {message:?}"
            ),
        });
    }
    Ok(message)
}

/// Models occasionally wrap the JSON in prose or code fences; take the
/// outermost object.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn malformed(provider: &'static str, raw: &str) -> FlowError {
    FlowError::Provider {
        provider: provider.to_string(),
        message: format!("unparsable response: {raw:.120}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_plain_json_reply() {
        let message =
            parse_message("openai", r#"{"commit_message": "Fix off-by-one in parser"}"#).unwrap();
        assert_eq!(message, "Fix off-by-one in parser");
    }

    #[test]
    fn parses_a_fenced_reply() {
        let raw = "```json\n{\"commit_message\": \"Add retry to fetch\"}\n```";
        assert_eq!(parse_message("openai", raw).unwrap(), "Add retry to fetch");
    }

    #[test]
    fn rejects_prose_without_json() {
        let err = parse_message("openai", "Sure! Here is a commit message.").unwrap_err();
        assert!(matches!(err, FlowError::Provider { .. }));
    }

    #[test]
    fn rejects_empty_message() {
        let err = parse_message("openai", r#"{"commit_message": "  "}"#).unwrap_err();
        assert!(matches!(err, FlowError::Provider { .. }));
    }

    #[test]
    fn rejects_multiline_message() {
        let err =
            parse_message("openai", "{\"commit_message\": \"Fix bug\\n\\nLong body here\"}")
                .unwrap_err();
        assert!(matches!(err, FlowError::Provider { .. }));
    }

    #[test]
    fn rejects_over_length_message() {
        let long = "x".repeat(MAX_SUBJECT_CHARS + 1);
        let raw = format!("{{\"commit_message\": \"{long}\"}}");
        let err = parse_message("openai", &raw).unwrap_err();
        assert!(matches!(err, FlowError::Provider { .. }));
    }

    #[test]
    fn prompt_embeds_the_diff() {
        let prompt = build_prompt("--- a\n+++ b\n");
        assert!(prompt.contains("--- a\n+++ b\n"));
        assert!(prompt.contains("imperative mood"));
    }
}
