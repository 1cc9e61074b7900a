//! # Localization Tests
//!
//! Check the embedded message catalog and lookups of missing keys.

use global_trade_bot::localization::Messages;
use global_trade_bot::menu::MenuSelection;

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_messages() -> Messages {
        Messages::new().expect("Failed to load message catalog")
    }

    #[test]
    fn test_every_flow_message_exists() {
        let messages = setup_messages();

        for key in [
            "greeting",
            "track-prompt",
            "request-received",
            "invalid-code",
            "lookup-failed",
            "coming-soon",
        ] {
            let message = messages.get(key);
            assert!(!message.is_empty(), "empty message for {key}");
            assert!(
                !message.starts_with("Missing"),
                "missing message for {key}"
            );
        }
    }

    #[test]
    fn test_every_menu_label_exists() {
        let messages = setup_messages();

        for selection in MenuSelection::ALL {
            assert!(!messages.get(selection.label_key()).starts_with("Missing"));
        }
    }

    #[test]
    fn test_multiline_messages_keep_line_breaks() {
        let messages = setup_messages();

        let greeting = messages.get("greeting");
        assert!(greeting.contains("Global Trade Bot"));
        assert_eq!(greeting.lines().count(), 2);

        let invalid = messages.get("invalid-code");
        assert!(invalid.contains("\n1 - "));
        assert!(invalid.contains("\n2 - "));
    }

    #[test]
    fn test_no_unicode_isolation_marks() {
        let messages = Messages::from_source("hello = Привет, мир").unwrap();
        let message = messages.get("hello");
        assert_eq!(message, "Привет, мир");
    }

    #[test]
    fn test_get_message_nonexistent_key() {
        let messages = setup_messages();

        let message = messages.get("nonexistent-key");
        assert_eq!(message, "Missing translation: nonexistent-key");
    }

    #[test]
    fn test_invalid_source_is_rejected() {
        assert!(Messages::from_source("= no id").is_err());
    }
}
