//! Suggested starter prompts offered on an empty thread.

/// A canned prompt the user can drop into the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestedPrompt {
    pub id: &'static str,
    /// Short heading
    pub head: &'static str,
    /// The prompt text inserted into the composer
    pub text: &'static str,
}

pub const SUGGESTED_PROMPTS: &[SuggestedPrompt] = &[
    SuggestedPrompt {
        id: "delivery",
        head: "Delivery",
        text: "Find suppliers with the fastest delivery times.",
    },
    SuggestedPrompt {
        id: "suppliers",
        head: "Suppliers",
        text: "Compare pricing across verified suppliers in seconds.",
    },
];

/// Look up a suggestion by its 1-based position, as listed to the user.
pub fn suggested_prompt(number: usize) -> Option<&'static SuggestedPrompt> {
    number.checked_sub(1).and_then(|i| SUGGESTED_PROMPTS.get(i))
}
