//! # SousChef Core
//!
//! Domain types, traits, and error definitions for the SousChef context
//! kitchen. This crate has **no async runtime dependency**; it defines the
//! model that the kitchen engine, configuration, and CLI build against.
//!
//! ## Vocabulary
//!
//! - A **token** names one unit of context.
//! - A **recipe** computes a token's value from declared ingredient tokens.
//! - The **cookbook** maps tokens to recipes; the **pantry** holds raw
//!   values supplied by the caller and shadows same-named recipes.
//! - A **plate** records what happened to one ordered token: served,
//!   compressed, or dropped, and why.

pub mod cookbook;
pub mod cost;
pub mod error;
pub mod order;
pub mod pantry;
pub mod path;
pub mod plate;
pub mod priority;
pub mod recipe;

// Re-export key types at crate root for ergonomics
pub use cookbook::Cookbook;
pub use cost::{CharHeuristic, TokenCounter, estimate_tokens};
pub use error::{Error, RecipeError, Result};
pub use order::{DEFAULT_DETAIL, OrderItem};
pub use pantry::{Pantry, PantryEntry};
pub use path::{Segment, SubPath};
pub use plate::{CookReport, Decision, DependencyRef, LineageEdge, Plate};
pub use priority::{DefaultRanker, PriorityInfo, PriorityRanker, score_tag};
pub use recipe::{Ingredient, PriorityTag, Recipe, RecipeId, SimpleRecipe, SimpleRecipeBuilder};

/// Re-exported so recipe authors don't need a direct `serde_json` dependency.
pub use serde_json::Value;
