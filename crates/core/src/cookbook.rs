//! The cookbook: a registry of recipes keyed by token.
//!
//! Built once at startup and shared across kitchens behind an `Arc`.
//! Registration performs no dependency validation: missing ingredients and
//! cycles surface only when a kitchen resolves them.

use crate::error::{Error, Result};
use crate::recipe::Recipe;
use std::collections::HashMap;
use std::sync::Arc;

/// A registry of available recipes.
///
/// The kitchen uses this to:
/// 1. Look up the recipe behind a requested or ingredient token
/// 2. Enumerate every token (in registration order) when no order is given
#[derive(Default)]
pub struct Cookbook {
    recipes: HashMap<String, Arc<dyn Recipe>>,
    order: Vec<String>,
}

impl Cookbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recipe under `token`. Replaces any existing recipe with
    /// the same token; the token keeps its original registration position.
    pub fn register(&mut self, token: impl Into<String>, recipe: Arc<dyn Recipe>) {
        let token = token.into();
        if self.recipes.insert(token.clone(), recipe).is_some() {
            tracing::debug!(token = %token, "Recipe re-registered, last write wins");
        } else {
            self.order.push(token);
        }
    }

    /// Register a recipe under its own name and hand back the shared handle,
    /// which can be registered again under aliases.
    pub fn add<R: Recipe + 'static>(&mut self, recipe: R) -> Arc<dyn Recipe> {
        let recipe: Arc<dyn Recipe> = Arc::new(recipe);
        self.register(recipe.name().to_string(), Arc::clone(&recipe));
        recipe
    }

    /// Make `alias` resolve to the same recipe (and cached value) as
    /// `existing`.
    pub fn alias(&mut self, alias: impl Into<String>, existing: &str) -> Result<()> {
        let recipe = self
            .recipes
            .get(existing)
            .cloned()
            .ok_or_else(|| Error::UnresolvedToken {
                token: existing.to_string(),
            })?;
        self.register(alias, recipe);
        Ok(())
    }

    /// Get a recipe by token.
    pub fn get(&self, token: &str) -> Option<&Arc<dyn Recipe>> {
        self.recipes.get(token)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.recipes.contains_key(token)
    }

    /// All registered tokens, in registration order.
    pub fn tokens(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl std::fmt::Debug for Cookbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cookbook").field("tokens", &self.order).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::{RecipeId, SimpleRecipe};

    fn constant(name: &str, value: i64) -> SimpleRecipe {
        SimpleRecipe::builder(name).constant(value).unwrap()
    }

    #[test]
    fn register_and_lookup() {
        let mut book = Cookbook::new();
        book.add(constant("Directive", 1));
        assert!(book.get("Directive").is_some());
        assert!(book.get("nonexistent").is_none());
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn tokens_keep_registration_order() {
        let mut book = Cookbook::new();
        book.add(constant("B", 1));
        book.add(constant("A", 2));
        book.add(constant("C", 3));
        assert_eq!(book.tokens(), vec!["B", "A", "C"]);
    }

    #[test]
    fn last_write_wins_without_reordering() {
        let mut book = Cookbook::new();
        book.add(constant("A", 1));
        book.add(constant("B", 2));
        let replacement = book.add(constant("A", 3));
        assert_eq!(book.tokens(), vec!["A", "B"]);
        assert_eq!(
            RecipeId::of(book.get("A").unwrap()),
            RecipeId::of(&replacement)
        );
    }

    #[test]
    fn alias_shares_identity() {
        let mut book = Cookbook::new();
        book.add(constant("Character", 1));
        book.alias("Hero", "Character").unwrap();
        assert_eq!(
            RecipeId::of(book.get("Hero").unwrap()),
            RecipeId::of(book.get("Character").unwrap())
        );
        assert!(matches!(
            book.alias("Villain", "Missing"),
            Err(Error::UnresolvedToken { .. })
        ));
    }
}
