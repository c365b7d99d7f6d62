//! Slash-command classification
//!
//! Incoming user messages are classified into a command by matching a
//! case-insensitive prefix. The first matching prefix wins; anything else
//! is plain conversation.

/// A classified user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    /// `/solve <problem>` - step-by-step problem solving
    Solve(String),
    /// `/summarize <text>` - text summarization
    Summarize(String),
    /// `/search <query>` - grounded web search
    Search(String),
    /// Anything else - plain conversation
    Conversation,
}

/// Dispatch table in priority order: first matching prefix wins.
/// Prefix length is also the slice offset for the argument, so the
/// prefixes must stay literal (trailing space included).
const COMMANDS: &[(&str, fn(String) -> SlashCommand)] = &[
    ("/solve ", SlashCommand::Solve),
    ("/summarize ", SlashCommand::Summarize),
    ("/search ", SlashCommand::Search),
];

impl SlashCommand {
    /// Classify a raw user message
    ///
    /// Matching is case-insensitive on the prefix, but the argument is
    /// sliced from the original message so its casing is preserved. The
    /// argument is trimmed of surrounding whitespace and may be empty
    /// (e.g. "/summarize   ").
    ///
    /// # Examples
    ///
    /// ```
    /// use codeex::router::SlashCommand;
    ///
    /// let cmd = SlashCommand::classify("/Search rust releases");
    /// assert_eq!(cmd, SlashCommand::Search("rust releases".to_string()));
    ///
    /// let cmd = SlashCommand::classify("tell me about /search syntax");
    /// assert_eq!(cmd, SlashCommand::Conversation);
    /// ```
    pub fn classify(message: &str) -> Self {
        let lowered = message.to_lowercase();

        for (prefix, build) in COMMANDS {
            if lowered.starts_with(prefix) {
                return build(Self::argument(message, prefix.len()));
            }
        }

        Self::Conversation
    }

    /// Slice the argument after a matched prefix
    ///
    /// Lowercasing can shrink multi-byte characters to ASCII, so the offset
    /// is not guaranteed to sit on a boundary of the original message.
    fn argument(message: &str, offset: usize) -> String {
        message.get(offset..).unwrap_or("").trim().to_string()
    }

    /// Whether this message was recognized as a slash-command
    pub fn is_command(&self) -> bool {
        !matches!(self, Self::Conversation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_solve() {
        assert_eq!(
            SlashCommand::classify("/solve 2x + 4 = 10"),
            SlashCommand::Solve("2x + 4 = 10".to_string())
        );
    }

    #[test]
    fn test_classify_summarize() {
        assert_eq!(
            SlashCommand::classify("/summarize a long article"),
            SlashCommand::Summarize("a long article".to_string())
        );
    }

    #[test]
    fn test_classify_search() {
        assert_eq!(
            SlashCommand::classify("/search rust 1.80 release date"),
            SlashCommand::Search("rust 1.80 release date".to_string())
        );
    }

    #[test]
    fn test_classify_case_insensitive_prefix() {
        assert_eq!(
            SlashCommand::classify("/SEARCH Rust NEWS"),
            SlashCommand::Search("Rust NEWS".to_string())
        );
        assert_eq!(
            SlashCommand::classify("/Solve X = 1"),
            SlashCommand::Solve("X = 1".to_string())
        );
    }

    #[test]
    fn test_classify_preserves_argument_casing() {
        assert_eq!(
            SlashCommand::classify("/summarize The Quick BROWN Fox"),
            SlashCommand::Summarize("The Quick BROWN Fox".to_string())
        );
    }

    #[test]
    fn test_classify_empty_argument() {
        assert_eq!(
            SlashCommand::classify("/summarize    "),
            SlashCommand::Summarize(String::new())
        );
        assert_eq!(
            SlashCommand::classify("/search  "),
            SlashCommand::Search(String::new())
        );
    }

    #[test]
    fn test_classify_no_trailing_space_is_conversation() {
        // Without the trailing space the prefix does not match
        assert_eq!(
            SlashCommand::classify("/solve"),
            SlashCommand::Conversation
        );
        assert_eq!(
            SlashCommand::classify("/summarize"),
            SlashCommand::Conversation
        );
        assert_eq!(
            SlashCommand::classify("/search"),
            SlashCommand::Conversation
        );
    }

    #[test]
    fn test_classify_mid_message_prefix_is_conversation() {
        assert_eq!(
            SlashCommand::classify("how does /search work?"),
            SlashCommand::Conversation
        );
    }

    #[test]
    fn test_classify_plain_message() {
        assert_eq!(
            SlashCommand::classify("hello there"),
            SlashCommand::Conversation
        );
        assert_eq!(SlashCommand::classify(""), SlashCommand::Conversation);
    }

    #[test]
    fn test_classify_unknown_command_is_conversation() {
        assert_eq!(
            SlashCommand::classify("/translate hello"),
            SlashCommand::Conversation
        );
    }

    #[test]
    fn test_is_command() {
        assert!(SlashCommand::classify("/solve x").is_command());
        assert!(!SlashCommand::classify("hello").is_command());
    }
}
