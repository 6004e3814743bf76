//! Recursive, memoizing token resolution.
//!
//! Lookup order for a token:
//!
//! 1. **Pantry**: immediate value or supplier (never memoized here)
//! 2. **Cookbook**: recipe output, cached per recipe identity
//!
//! Ingredients are resolved depth-first in declared order. A recipe already
//! on the current resolution chain is a cycle and fails fast. Each recipe's
//! cache slot is a `OnceCell`, which doubles as the in-flight lock: two
//! tasks racing on the same recipe await one `prepare` call.

use futures::FutureExt;
use futures::future::BoxFuture;
use souschef_core::{Cookbook, Error, Pantry, Recipe, RecipeId, Result, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Where a token's value comes from.
pub enum Source<'a> {
    Pantry,
    Recipe(&'a Arc<dyn Recipe>),
}

type Slot = Arc<OnceCell<Arc<Value>>>;

/// One link of the active resolution chain.
struct Link {
    token: String,
    recipe: RecipeId,
}

/// Resolves tokens against one pantry and a shared cookbook.
pub struct Resolver {
    cookbook: Arc<Cookbook>,
    pantry: Pantry,
    cache: Mutex<HashMap<RecipeId, Slot>>,
}

impl Resolver {
    pub fn new(cookbook: Arc<Cookbook>, pantry: Pantry) -> Self {
        Self {
            cookbook,
            pantry,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn cookbook(&self) -> &Cookbook {
        &self.cookbook
    }

    pub fn pantry(&self) -> &Pantry {
        &self.pantry
    }

    /// Which store answers for `token`. The pantry shadows the cookbook.
    pub fn source(&self, token: &str) -> Option<Source<'_>> {
        if self.pantry.contains(token) {
            Some(Source::Pantry)
        } else {
            self.cookbook.get(token).map(Source::Recipe)
        }
    }

    /// Number of recipe outputs cached so far.
    pub fn cached(&self) -> usize {
        self.slots()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    /// Resolve `token` to its value.
    pub async fn resolve(&self, token: &str, cancel: &CancellationToken) -> Result<Arc<Value>> {
        let mut chain = Vec::new();
        self.resolve_in(token, &mut chain, cancel).await
    }

    fn resolve_in<'a>(
        &'a self,
        token: &'a str,
        chain: &'a mut Vec<Link>,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Arc<Value>>> {
        async move {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled {
                    token: token.to_string(),
                });
            }

            if let Some(entry) = self.pantry.get(token) {
                trace!(token, "Resolving from pantry");
                return tokio::select! {
                    _ = cancel.cancelled() => Err(Error::Cancelled { token: token.to_string() }),
                    value = entry.fetch(token) => value,
                };
            }

            let recipe = self
                .cookbook
                .get(token)
                .ok_or_else(|| Error::UnresolvedToken {
                    token: token.to_string(),
                })?;
            let id = RecipeId::of(recipe);

            if let Some(start) = chain.iter().position(|link| link.recipe == id) {
                let mut cycle: Vec<String> =
                    chain[start..].iter().map(|link| link.token.clone()).collect();
                cycle.push(token.to_string());
                return Err(Error::CyclicDependency { cycle });
            }

            let slot = self.slot(id);
            if let Some(value) = slot.get() {
                trace!(token, "Recipe output served from cache");
                return Ok(Arc::clone(value));
            }

            // Another task may own the slot's initializer; waiting on it must
            // still honor this caller's token.
            let init = slot.get_or_try_init(move || {
                let chain = chain;
                self.cook_recipe(token, recipe, id, chain, cancel)
            });
            let value = tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(Error::Cancelled { token: token.to_string() });
                }
                value = init => value?,
            };
            Ok(Arc::clone(value))
        }
        .boxed()
    }

    async fn cook_recipe(
        &self,
        token: &str,
        recipe: &Arc<dyn Recipe>,
        id: RecipeId,
        chain: &mut Vec<Link>,
        cancel: &CancellationToken,
    ) -> Result<Arc<Value>> {
        chain.push(Link {
            token: token.to_string(),
            recipe: id,
        });
        let gathered = self.gather(recipe, chain, cancel).await;
        chain.pop();
        let ingredients = gathered?;

        debug!(token, recipe = recipe.name(), "Preparing recipe");
        let output = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(Error::Cancelled { token: token.to_string() });
            }
            output = recipe.prepare(ingredients) => output,
        };
        output
            .map(Arc::new)
            .map_err(|e| Error::RecipeFailed {
                recipe: recipe.name().to_string(),
                reason: e.to_string(),
            })
    }

    async fn gather(
        &self,
        recipe: &Arc<dyn Recipe>,
        chain: &mut Vec<Link>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Arc<Value>>> {
        let mut values = Vec::with_capacity(recipe.ingredients().len());
        for ingredient in recipe.ingredients() {
            let root = self.resolve_in(&ingredient.root, chain, cancel).await?;
            let value = match &ingredient.path {
                None => root,
                Some(path) => match path.extract(&root) {
                    Some(found) => Arc::new(found.clone()),
                    None => {
                        return Err(Error::ContractViolation {
                            recipe: recipe.name().to_string(),
                            ingredient: ingredient.root.clone(),
                            path: path.to_string(),
                        });
                    }
                },
            };
            values.push(value);
        }
        Ok(values)
    }

    fn slot(&self, id: RecipeId) -> Slot {
        Arc::clone(self.slots().entry(id).or_default())
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<RecipeId, Slot>> {
        // The map is only touched for O(1) lookups; a poisoned lock still
        // holds consistent data.
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}
