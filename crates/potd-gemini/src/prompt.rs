//! Prompt text for the summarizer.

pub const SYSTEM_MESSAGE: &str = "You are a helpful assistant that summarizes text.";

const USER_TEMPLATE: &str =
    "Shorten the following paragraph into a short 12 word or so sentence summary: {text}";

/// User message for `text`.
pub fn user_message(text: &str) -> String {
    USER_TEMPLATE.replace("{text}", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_embeds_text() {
        assert_eq!(
            user_message("A lake."),
            "Shorten the following paragraph into a short 12 word or so sentence summary: A lake."
        );
    }
}
