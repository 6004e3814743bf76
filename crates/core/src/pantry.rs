//! The pantry: raw values supplied by the caller for one kitchen.
//!
//! Entries are either immediate values or zero-argument async suppliers.
//! Suppliers run on access, never eagerly, and the kitchen does not memoize
//! what they return.

use crate::error::{Error, RecipeError, Result};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

pub type SupplierFn =
    Arc<dyn Fn() -> BoxFuture<'static, std::result::Result<Value, RecipeError>> + Send + Sync>;

/// A single pantry slot.
#[derive(Clone)]
pub enum PantryEntry {
    Value(Arc<Value>),
    Supplier(SupplierFn),
}

impl PantryEntry {
    /// Produce the entry's value for `token`, invoking the supplier if any.
    pub async fn fetch(&self, token: &str) -> Result<Arc<Value>> {
        match self {
            Self::Value(value) => Ok(Arc::clone(value)),
            Self::Supplier(supply) => supply().await.map(Arc::new).map_err(|e| {
                Error::PantrySupplier {
                    token: token.to_string(),
                    reason: e.to_string(),
                }
            }),
        }
    }
}

impl std::fmt::Debug for PantryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Supplier(_) => f.write_str("Supplier(..)"),
        }
    }
}

/// Per-kitchen store of caller-supplied values. Shadows the cookbook.
#[derive(Debug, Clone, Default)]
pub struct Pantry {
    entries: HashMap<String, PantryEntry>,
}

impl Pantry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, token: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert_value(token, value);
        self
    }

    pub fn with_supplier<F, Fut>(mut self, token: impl Into<String>, supplier: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Value, RecipeError>> + Send + 'static,
    {
        self.insert_supplier(token, supplier);
        self
    }

    pub fn insert_value(&mut self, token: impl Into<String>, value: impl Into<Value>) {
        self.entries
            .insert(token.into(), PantryEntry::Value(Arc::new(value.into())));
    }

    pub fn insert_supplier<F, Fut>(&mut self, token: impl Into<String>, supplier: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Value, RecipeError>> + Send + 'static,
    {
        let supplier: SupplierFn = Arc::new(move || supplier().boxed());
        self.entries
            .insert(token.into(), PantryEntry::Supplier(supplier));
    }

    pub fn get(&self, token: &str) -> Option<&PantryEntry> {
        self.entries.get(token)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    pub fn tokens(&self) -> Vec<&str> {
        self.entries.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Pantry {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut pantry = Self::new();
        for (token, value) in iter {
            pantry.insert_value(token, value);
        }
        pantry
    }
}
