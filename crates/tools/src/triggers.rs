//! Trigger-based tool activation.
//!
//! Sending tool schemas costs tokens and latency on every turn, so the
//! optional tools are only offered when the user's message contains a
//! trigger phrase. This is a heuristic, not a classifier: a false
//! negative is recoverable (the user rephrases), a false positive is
//! cheap (the model just doesn't call the tool).

/// Phrases implying a visual / interactive output request.
pub const ARTIFACT_TRIGGERS: &[&str] = &[
    "create",
    "build",
    "generate",
    "make",
    "draw",
    "diagram",
    "dashboard",
    "chart",
    "svg",
    "react",
    "vue",
    "html",
    "interactive",
    "calculator",
    "form",
    "widget",
    "component",
    "page",
    "animation",
    "visualization",
    "game",
    "mockup",
    "prototype",
];

/// Phrases implying a data-model / schema generation request.
pub const SCAFFOLD_TRIGGERS: &[&str] = &[
    "model",
    "migration",
    "eloquent",
    "factory",
    "seeder",
    "database table",
    "schema",
    "relationship",
    "pivot table",
    "foreign key",
];

/// Case-insensitive substring check: does any trigger phrase occur in
/// the message?
pub fn matches(message: &str, triggers: &[&str]) -> bool {
    let message = message.to_lowercase();
    triggers
        .iter()
        .any(|trigger| message.contains(&trigger.to_lowercase()))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_is_case_insensitive() {
        assert!(matches("CREATE A DASHBOARD", &["create"]));
        assert!(matches("please Build me something", &["build"]));
    }

    #[test]
    fn no_trigger_no_match() {
        assert!(!matches("no relevant words", &["create"]));
        assert!(!matches("", ARTIFACT_TRIGGERS));
    }

    #[test]
    fn substring_matches_count() {
        // "created" contains "create": substring semantics, by contract.
        assert!(matches("I already created it", &["create"]));
        assert!(matches("add a database table for users", SCAFFOLD_TRIGGERS));
    }

    #[test]
    fn vocabularies_cover_their_domains() {
        assert!(matches("draw an svg of a circle", ARTIFACT_TRIGGERS));
        assert!(matches("I need an eloquent model with a migration", SCAFFOLD_TRIGGERS));
        assert!(!matches("what is the capital of France?", ARTIFACT_TRIGGERS));
        assert!(!matches("what is the capital of France?", SCAFFOLD_TRIGGERS));
    }
}
