//! Error types for the SousChef domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Resolution failures
//! are fatal to the cook call that triggered them; the only locally
//! recovered failure (a missing compressed fallback) never reaches here.

use thiserror::Error;

/// The top-level error type for all SousChef operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Resolution errors ---
    #[error("Unresolved token: '{token}' is neither in the pantry nor the cookbook")]
    UnresolvedToken { token: String },

    #[error(
        "Contract violation: recipe '{recipe}' declared ingredient '{ingredient}' at path '{path}', which extracted nothing"
    )]
    ContractViolation {
        recipe: String,
        ingredient: String,
        path: String,
    },

    #[error("Cyclic dependency: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("Recipe '{recipe}' failed: {reason}")]
    RecipeFailed { recipe: String, reason: String },

    #[error("Pantry supplier for '{token}' failed: {reason}")]
    PantrySupplier { token: String, reason: String },

    #[error("Resolution of '{token}' was cancelled")]
    Cancelled { token: String },

    // --- Descriptor errors ---
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error came from cooperative cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// The error a recipe's `prepare` (or a pantry supplier) reports.
///
/// The kitchen wraps it with the recipe or token that failed.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RecipeError {
    message: String,
}

impl RecipeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for RecipeError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for RecipeError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<serde_json::Error> for RecipeError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_displays_full_path() {
        let err = Error::CyclicDependency {
            cycle: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(err.to_string(), "Cyclic dependency: A -> B -> A");
    }

    #[test]
    fn contract_violation_names_recipe_and_path() {
        let err = Error::ContractViolation {
            recipe: "Bio".into(),
            ingredient: "Character".into(),
            path: ".name".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Bio"));
        assert!(msg.contains("Character"));
        assert!(msg.contains(".name"));
    }

    #[test]
    fn recipe_error_from_str() {
        let err: RecipeError = "boom".into();
        assert_eq!(err.message(), "boom");
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn cancelled_is_detectable() {
        assert!(Error::Cancelled { token: "X".into() }.is_cancelled());
        assert!(!Error::UnresolvedToken { token: "X".into() }.is_cancelled());
    }
}
