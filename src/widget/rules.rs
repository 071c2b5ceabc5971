//! Canned response table and keyword matching.
//!
//! The table is fixed at compile time. Matching lower-cases and trims the
//! user's text, then checks substring containment of each trigger in
//! priority order; the first hit wins and [`DEFAULT_RULE`] catches the rest.

use serde::Serialize;

/// Identifies an entry in the rule table.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RuleKey {
    Help,
    Features,
    Reset,
    Default,
}

/// A canned bot response.
///
/// `title` is carried with the rule but the widget only renders `body`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ResponseRule {
    pub key: RuleKey,
    /// Lower-case substring that selects this rule. `None` for the fallback.
    pub trigger: Option<&'static str>,
    pub title: &'static str,
    pub body: &'static str,
}

pub const HELP_RULE: ResponseRule = ResponseRule {
    key: RuleKey::Help,
    trigger: Some("help"),
    title: "Help Information",
    body: "I'm here to assist you with various tasks. You can ask me about:\n\n\
           • General information and questions\n\
           • Feature demonstrations\n\
           • Navigation assistance\n\n\
           Try asking about 'features' to see what I can do, or just ask me anything!",
};

pub const FEATURES_RULE: ResponseRule = ResponseRule {
    key: RuleKey::Features,
    trigger: Some("feature"),
    title: "Available Features",
    body: "Here are the features I can help you with:\n\n\
           ✓ Real-time chat interface\n\
           ✓ Quick reply suggestions\n\
           ✓ Typing indicators\n\
           ✓ Message history\n\
           ✓ Responsive design\n\
           ✓ Enterprise-grade UI\n\n\
           This is Stage 1 of the chatbot - a fully functional UI with simulated responses.",
};

pub const RESET_RULE: ResponseRule = ResponseRule {
    key: RuleKey::Reset,
    trigger: Some("reset"),
    title: "Chat Reset",
    body: "The chat has been reset. How can I help you today?",
};

pub const DEFAULT_RULE: ResponseRule = ResponseRule {
    key: RuleKey::Default,
    trigger: None,
    title: "Response",
    body: "Thank you for your message. I understand you're looking for assistance. \
           In Stage 1, I'm simulating responses. For more specific help, try asking about 'help' or 'features'.",
};

/// Keyword rules in match priority order.
pub const RULES: [ResponseRule; 3] = [HELP_RULE, FEATURES_RULE, RESET_RULE];

/// Greeting the host page shows on load and the widget mirrors into history.
pub const WELCOME_TEXT: &str = "Welcome! I'm your enterprise assistant. How can I help you today?";

/// Pick the response for a user message.
#[must_use]
pub fn select_response(message: &str) -> &'static ResponseRule {
    let normalized = message.trim().to_lowercase();

    RULES
        .iter()
        .find(|rule| rule.trigger.is_some_and(|t| normalized.contains(t)))
        .unwrap_or(&DEFAULT_RULE)
}

/// Look up a rule by key.
#[must_use]
pub fn rule(key: RuleKey) -> &'static ResponseRule {
    match key {
        RuleKey::Help => &HELP_RULE,
        RuleKey::Features => &FEATURES_RULE,
        RuleKey::Reset => &RESET_RULE,
        RuleKey::Default => &DEFAULT_RULE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_substring_matches() {
        let rule = select_response("Can you show me the features?");
        assert_eq!(rule.key, RuleKey::Features);
        assert_eq!(rule.body, FEATURES_RULE.body);
    }

    #[test]
    fn test_help_has_priority() {
        assert_eq!(select_response("I need help").key, RuleKey::Help);
        assert_eq!(select_response("help me reset").key, RuleKey::Help);
        assert_eq!(
            select_response("features? reset? HELP!").key,
            RuleKey::Help
        );
    }

    #[test]
    fn test_feature_beats_reset() {
        assert_eq!(
            select_response("reset the feature flags").key,
            RuleKey::Features
        );
    }

    #[test]
    fn test_reset_when_alone() {
        assert_eq!(select_response("please reset everything").key, RuleKey::Reset);
    }

    #[test]
    fn test_case_insensitive_and_trimmed() {
        assert_eq!(select_response("   HeLp   ").key, RuleKey::Help);
        assert_eq!(select_response("\tRESET\n").key, RuleKey::Reset);
    }

    #[test]
    fn test_fallback() {
        let rule = select_response("hello there");
        assert_eq!(rule.key, RuleKey::Default);
        assert_eq!(rule.title, "Response");
    }

    #[test]
    fn test_substring_inside_words() {
        // "helpful" contains "help"
        assert_eq!(select_response("that was helpful").key, RuleKey::Help);
    }

    #[test]
    fn test_rule_lookup() {
        assert_eq!(rule(RuleKey::Reset).body, RESET_RULE.body);
        assert_eq!(rule(RuleKey::Default).trigger, None);
    }
}
