//! Recipe trait: the abstraction over context providers.
//!
//! A recipe turns the resolved values of its declared ingredients into one
//! output value. Recipes are registered in the [`Cookbook`](crate::Cookbook)
//! and invoked at most once per kitchen; the kitchen caches their output.

use crate::error::{Error, RecipeError, Result};
use crate::path::SubPath;
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

/// One declared input of a recipe: a root token plus an optional sub-path
/// into that token's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub root: String,
    pub path: Option<SubPath>,
}

impl Ingredient {
    /// An ingredient that consumes the whole value of `root`.
    pub fn token(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            path: None,
        }
    }

    /// An ingredient that consumes `path` within the value of `root`.
    pub fn with_path(root: impl Into<String>, path: &str) -> Result<Self> {
        Ok(Self {
            root: root.into(),
            path: Some(SubPath::parse(path)?),
        })
    }

    /// Parse a descriptor such as `Character`, `Character.name` or
    /// `History.turns[0]`. The root runs up to the first `.` or `[`.
    pub fn parse(descriptor: &str) -> Result<Self> {
        let descriptor = descriptor.trim();
        let split = descriptor.find(['.', '[']).unwrap_or(descriptor.len());
        let (root, rest) = descriptor.split_at(split);
        if root.is_empty() {
            return Err(Error::InvalidPath {
                path: descriptor.to_string(),
                reason: "missing root token".into(),
            });
        }
        if rest.is_empty() {
            Ok(Self::token(root))
        } else {
            Self::with_path(root, rest)
        }
    }

    /// The sub-path this ingredient is consumed through, if any.
    pub fn via(&self) -> Option<&str> {
        self.path.as_ref().map(SubPath::as_str)
    }
}

impl FromStr for Ingredient {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}{}", self.root, path),
            None => f.write_str(&self.root),
        }
    }
}

/// A static priority hint: either a label (`"high"`, `"optional"`) or a
/// number that is used as the score directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriorityTag {
    Score(f64),
    Label(String),
}

impl From<&str> for PriorityTag {
    fn from(label: &str) -> Self {
        Self::Label(label.to_string())
    }
}

impl From<String> for PriorityTag {
    fn from(label: String) -> Self {
        Self::Label(label)
    }
}

impl From<f64> for PriorityTag {
    fn from(score: f64) -> Self {
        Self::Score(score)
    }
}

impl From<i32> for PriorityTag {
    fn from(score: i32) -> Self {
        Self::Score(f64::from(score))
    }
}

impl fmt::Display for PriorityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Score(s) => write!(f, "{s}"),
            Self::Label(l) => f.write_str(l),
        }
    }
}

/// The core Recipe trait.
///
/// Only `name`, `ingredients` and `prepare` are required; the remaining
/// methods are static hints consumed by the materializer and planner.
#[async_trait]
pub trait Recipe: Send + Sync {
    /// Provider name reported in lineage and plates.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str {
        ""
    }

    /// Declared inputs, resolved in this order.
    fn ingredients(&self) -> &[Ingredient];

    /// Produce this recipe's value from its resolved ingredients,
    /// positionally matching [`Recipe::ingredients`].
    async fn prepare(&self, ingredients: Vec<Arc<Value>>) -> std::result::Result<Value, RecipeError>;

    fn priority(&self) -> Option<PriorityTag> {
        None
    }

    /// Whether the summary recipe may stand in for this one under budget
    /// pressure.
    fn compressible(&self) -> bool {
        false
    }

    /// Token of the recipe whose output is a smaller substitute.
    fn summary_recipe(&self) -> Option<&str> {
        None
    }

    /// Alternate view of `value` for the detail label, or `None` when the
    /// label is unknown.
    fn detail(&self, _label: &str, _value: &Value) -> Option<Value> {
        None
    }

    /// Detail labels this recipe understands.
    fn detail_labels(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Identity of a registered recipe allocation.
///
/// Two tokens registered with clones of the same `Arc` share an id, and so
/// share a cached value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecipeId(usize);

impl RecipeId {
    pub fn of(recipe: &Arc<dyn Recipe>) -> Self {
        Self(Arc::as_ptr(recipe) as *const () as usize)
    }
}

// ── Closure-backed recipes ────────────────────────────────────────────────

pub type PrepareFn = Arc<
    dyn Fn(Vec<Arc<Value>>) -> BoxFuture<'static, std::result::Result<Value, RecipeError>>
        + Send
        + Sync,
>;

pub type DetailFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// A recipe assembled from closures. Built with [`SimpleRecipe::builder`].
#[derive(Clone)]
pub struct SimpleRecipe {
    name: String,
    description: String,
    ingredients: Vec<Ingredient>,
    prepare: PrepareFn,
    priority: Option<PriorityTag>,
    compressible: bool,
    summary: Option<String>,
    details: BTreeMap<String, DetailFn>,
}

impl SimpleRecipe {
    pub fn builder(name: impl Into<String>) -> SimpleRecipeBuilder {
        SimpleRecipeBuilder {
            name: name.into(),
            description: String::new(),
            ingredients: Vec::new(),
            priority: None,
            compressible: false,
            summary: None,
            details: BTreeMap::new(),
        }
    }
}

impl fmt::Debug for SimpleRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleRecipe")
            .field("name", &self.name)
            .field("ingredients", &self.ingredients)
            .field("priority", &self.priority)
            .field("compressible", &self.compressible)
            .field("summary", &self.summary)
            .field("details", &self.details.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl Recipe for SimpleRecipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    async fn prepare(&self, ingredients: Vec<Arc<Value>>) -> std::result::Result<Value, RecipeError> {
        (self.prepare)(ingredients).await
    }

    fn priority(&self) -> Option<PriorityTag> {
        self.priority.clone()
    }

    fn compressible(&self) -> bool {
        self.compressible
    }

    fn summary_recipe(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    fn detail(&self, label: &str, value: &Value) -> Option<Value> {
        self.details.get(label).map(|f| f(value))
    }

    fn detail_labels(&self) -> Vec<String> {
        self.details.keys().cloned().collect()
    }
}

/// Builder for [`SimpleRecipe`]. Finish with one of the `prepare*` methods
/// or [`SimpleRecipeBuilder::constant`].
pub struct SimpleRecipeBuilder {
    name: String,
    description: String,
    ingredients: Vec<String>,
    priority: Option<PriorityTag>,
    compressible: bool,
    summary: Option<String>,
    details: BTreeMap<String, DetailFn>,
}

impl SimpleRecipeBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Declare an ingredient descriptor, e.g. `"Character.name"`.
    pub fn ingredient(mut self, descriptor: impl Into<String>) -> Self {
        self.ingredients.push(descriptor.into());
        self
    }

    pub fn priority(mut self, tag: impl Into<PriorityTag>) -> Self {
        self.priority = Some(tag.into());
        self
    }

    /// Mark the recipe compressible via the given summary token.
    pub fn summarized_by(mut self, summary: impl Into<String>) -> Self {
        self.compressible = true;
        self.summary = Some(summary.into());
        self
    }

    /// Name a summary token without enabling compression.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn compressible(mut self, compressible: bool) -> Self {
        self.compressible = compressible;
        self
    }

    pub fn detail<F>(mut self, label: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.details.insert(label.into(), Arc::new(transform));
        self
    }

    /// Finish with an async prepare function.
    pub fn prepare<F, Fut>(self, f: F) -> Result<SimpleRecipe>
    where
        F: Fn(Vec<Arc<Value>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Value, RecipeError>> + Send + 'static,
    {
        let prepare: PrepareFn = Arc::new(move |args| f(args).boxed());
        self.finish(prepare)
    }

    /// Finish with a synchronous prepare function.
    pub fn prepare_sync<F>(self, f: F) -> Result<SimpleRecipe>
    where
        F: Fn(&[Arc<Value>]) -> std::result::Result<Value, RecipeError> + Send + Sync + 'static,
    {
        let prepare: PrepareFn = Arc::new(move |args| futures::future::ready(f(&args)).boxed());
        self.finish(prepare)
    }

    /// Finish with a recipe that always yields `value`.
    pub fn constant(self, value: impl Into<Value>) -> Result<SimpleRecipe> {
        let value = value.into();
        self.prepare_sync(move |_| Ok(value.clone()))
    }

    fn finish(self, prepare: PrepareFn) -> Result<SimpleRecipe> {
        let ingredients = self
            .ingredients
            .iter()
            .map(|d| Ingredient::parse(d))
            .collect::<Result<Vec<_>>>()?;
        Ok(SimpleRecipe {
            name: self.name,
            description: self.description,
            ingredients,
            prepare,
            priority: self.priority,
            compressible: self.compressible,
            summary: self.summary,
            details: self.details,
        })
    }
}
