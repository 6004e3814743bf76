//! Text cost estimation.
//!
//! The kitchen never tokenizes text itself; callers plug in any
//! [`TokenCounter`]. The default is a character heuristic: ~4 characters
//! per token, rounded up.

/// An externally supplied text-cost oracle.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

impl<F> TokenCounter for F
where
    F: Fn(&str) -> usize + Send + Sync,
{
    fn count(&self, text: &str) -> usize {
        self(text)
    }
}

/// Character-based heuristic: `ceil(chars / chars_per_token)`.
#[derive(Debug, Clone, Copy)]
pub struct CharHeuristic {
    chars_per_token: usize,
}

impl CharHeuristic {
    /// A divisor of zero is treated as one.
    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }

    pub fn chars_per_token(&self) -> usize {
        self.chars_per_token
    }
}

impl Default for CharHeuristic {
    fn default() -> Self {
        Self::new(4)
    }
}

impl TokenCounter for CharHeuristic {
    fn count(&self, text: &str) -> usize {
        text.chars().count().div_ceil(self.chars_per_token)
    }
}

/// Estimate the token count for a string with the default heuristic.
pub fn estimate_tokens(text: &str) -> usize {
    CharHeuristic::default().count(text)
}
