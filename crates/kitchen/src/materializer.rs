//! Materialization: from an order item to a costed, ranked candidate.
//!
//! Per item: resolve the baseline value, apply the requested detail
//! profile (unknown labels fall back to the raw value), render to text,
//! measure it, then opportunistically prepare the compressed fallback and
//! rank the item.

use crate::lineage::PANTRY_PROVIDER;
use crate::resolver::{Resolver, Source};
use souschef_core::{
    Error, PriorityInfo, PriorityRanker, PriorityTag, Recipe, Result, TokenCounter, Value,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A rendered, costed substitute for an item.
#[derive(Debug, Clone)]
pub struct Compressed {
    /// Summary token the substitute came from.
    pub token: String,
    pub text: String,
    pub cost: usize,
}

/// One order item after materialization.
#[derive(Debug, Clone)]
pub struct Dish {
    pub index: usize,
    pub token: String,
    pub detail: String,
    pub provider_name: String,
    pub text: String,
    pub cost: usize,
    pub compressed: Option<Compressed>,
    pub priority_tag: Option<PriorityTag>,
    pub priority_score: f64,
}

/// Render a value as context text: strings verbatim, anything else as
/// pretty-printed JSON.
pub fn render(value: &Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        other => Ok(serde_json::to_string_pretty(other)?),
    }
}

pub struct Materializer<'a> {
    resolver: &'a Resolver,
    counter: &'a dyn TokenCounter,
    ranker: &'a dyn PriorityRanker,
    cancel: &'a CancellationToken,
}

impl<'a> Materializer<'a> {
    pub fn new(
        resolver: &'a Resolver,
        counter: &'a dyn TokenCounter,
        ranker: &'a dyn PriorityRanker,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            resolver,
            counter,
            ranker,
            cancel,
        }
    }

    pub async fn materialize(&self, index: usize, token: &str, detail: &str) -> Result<Dish> {
        let value = self.resolver.resolve(token, self.cancel).await?;

        let recipe = match self.resolver.source(token) {
            Some(Source::Recipe(recipe)) => Some(Arc::clone(recipe)),
            _ => None,
        };

        let profiled = recipe.as_ref().and_then(|r| r.detail(detail, &value));
        if profiled.is_none() && recipe.is_some() {
            debug!(token, detail, "No detail profile, serving raw value");
        }
        let text = render(profiled.as_ref().unwrap_or(&value))?;
        let cost = self.counter.count(&text);

        let compressed = match &recipe {
            Some(r) => self.compress(token, r.as_ref()).await?,
            None => None,
        };

        let provider_name = recipe
            .as_ref()
            .map(|r| r.name().to_string())
            .unwrap_or_else(|| PANTRY_PROVIDER.to_string());
        let priority_tag = recipe.as_ref().and_then(|r| r.priority());
        let priority_score = self.ranker.rank(&PriorityInfo {
            token,
            provider_name: &provider_name,
            priority_tag: priority_tag.as_ref(),
            index,
        });

        Ok(Dish {
            index,
            token: token.to_string(),
            detail: detail.to_string(),
            provider_name,
            text,
            cost,
            compressed,
            priority_tag,
            priority_score,
        })
    }

    /// The compressed fallback, if the recipe offers one and it can be
    /// prepared. Failures are swallowed; only cancellation propagates.
    async fn compress(&self, token: &str, recipe: &dyn Recipe) -> Result<Option<Compressed>> {
        let summary = match recipe.summary_recipe() {
            Some(summary) if recipe.compressible() => summary,
            _ => return Ok(None),
        };

        match self.try_compress(summary).await {
            Ok(compressed) => Ok(Some(compressed)),
            Err(err @ Error::Cancelled { .. }) => Err(err),
            Err(err) => {
                debug!(token, summary, error = %err, "Compressed fallback unavailable");
                Ok(None)
            }
        }
    }

    async fn try_compress(&self, summary: &str) -> Result<Compressed> {
        let value = self.resolver.resolve(summary, self.cancel).await?;
        let text = render(&value)?;
        Ok(Compressed {
            token: summary.to_string(),
            cost: self.counter.count(&text),
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use souschef_core::{CharHeuristic, Cookbook, DefaultRanker, Pantry, RecipeError, SimpleRecipe};

    fn resolver(book: Cookbook, pantry: Pantry) -> Resolver {
        Resolver::new(Arc::new(book), pantry)
    }

    async fn dish(resolver: &Resolver, token: &str, detail: &str) -> Result<Dish> {
        let cancel = CancellationToken::new();
        Materializer::new(resolver, &CharHeuristic::default(), &DefaultRanker, &cancel)
            .materialize(0, token, detail)
            .await
    }

    #[test]
    fn strings_render_verbatim_and_structures_as_json() {
        assert_eq!(render(&json!("plain \"text\"")).unwrap(), "plain \"text\"");
        assert_eq!(render(&json!({"a": 1})).unwrap(), "{\n  \"a\": 1\n}");
        assert_eq!(render(&json!(42)).unwrap(), "42");
    }

    #[tokio::test]
    async fn costs_baseline_rendering() {
        let mut book = Cookbook::new();
        book.add(SimpleRecipe::builder("Directive").constant("a".repeat(10)).unwrap());
        let r = resolver(book, Pantry::new());

        let d = dish(&r, "Directive", "full").await.unwrap();
        assert_eq!(d.text, "a".repeat(10));
        assert_eq!(d.cost, 3);
        assert_eq!(d.provider_name, "Directive");
        assert_eq!(d.priority_score, 50.0);
        assert!(d.compressed.is_none());
    }

    #[tokio::test]
    async fn detail_profile_applies_and_unknown_label_falls_back() {
        let mut book = Cookbook::new();
        book.add(
            SimpleRecipe::builder("Character")
                .detail("brief", |v| v["name"].clone())
                .constant(json!({"name": "Ada", "bio": "Mathematician"}))
                .unwrap(),
        );
        let r = resolver(book, Pantry::new());

        let brief = dish(&r, "Character", "brief").await.unwrap();
        assert_eq!(brief.text, "Ada");
        assert_eq!(brief.detail, "brief");

        let unknown = dish(&r, "Character", "no-such-label").await.unwrap();
        let full = dish(&r, "Character", "full").await.unwrap();
        assert_eq!(unknown.text, full.text);
        assert!(unknown.text.contains("Mathematician"));
    }

    #[tokio::test]
    async fn compressed_fallback_is_costed() {
        let mut book = Cookbook::new();
        book.add(
            SimpleRecipe::builder("History")
                .priority(20)
                .summarized_by("HistorySummary")
                .constant("x".repeat(400))
                .unwrap(),
        );
        book.add(SimpleRecipe::builder("HistorySummary").constant("y".repeat(40)).unwrap());
        let r = resolver(book, Pantry::new());

        let d = dish(&r, "History", "full").await.unwrap();
        assert_eq!(d.cost, 100);
        let compressed = d.compressed.unwrap();
        assert_eq!(compressed.token, "HistorySummary");
        assert_eq!(compressed.cost, 10);
        assert_eq!(d.priority_score, 20.0);
    }

    #[tokio::test]
    async fn summary_without_compressible_flag_is_ignored() {
        let mut book = Cookbook::new();
        book.add(
            SimpleRecipe::builder("History")
                .summary("HistorySummary")
                .constant("long")
                .unwrap(),
        );
        book.add(SimpleRecipe::builder("HistorySummary").constant("s").unwrap());
        let r = resolver(book, Pantry::new());

        assert!(dish(&r, "History", "full").await.unwrap().compressed.is_none());
        assert_eq!(r.cached(), 1, "summary recipe must not run");
    }

    #[tokio::test]
    async fn compression_failures_are_swallowed() {
        let mut book = Cookbook::new();
        book.add(
            SimpleRecipe::builder("History")
                .summarized_by("BrokenSummary")
                .constant("long")
                .unwrap(),
        );
        book.add(
            SimpleRecipe::builder("BrokenSummary")
                .prepare_sync(|_| Err(RecipeError::new("summarizer offline")))
                .unwrap(),
        );
        book.add(
            SimpleRecipe::builder("Orphan")
                .summarized_by("MissingSummary")
                .constant("long")
                .unwrap(),
        );
        let r = resolver(book, Pantry::new());

        assert!(dish(&r, "History", "full").await.unwrap().compressed.is_none());
        assert!(dish(&r, "Orphan", "full").await.unwrap().compressed.is_none());
    }

    #[tokio::test]
    async fn pantry_items_report_pantry_provider() {
        let r = resolver(Cookbook::new(), Pantry::new().with_value("Seed", json!([1, 2])));
        let d = dish(&r, "Seed", "brief").await.unwrap();
        assert_eq!(d.provider_name, PANTRY_PROVIDER);
        assert!(d.priority_tag.is_none());
        assert_eq!(d.text, "[\n  1,\n  2\n]");
    }

    #[tokio::test]
    async fn custom_counter_and_ranker_are_used() {
        let mut book = Cookbook::new();
        book.add(SimpleRecipe::builder("Words").constant("one two three").unwrap());
        let r = resolver(book, Pantry::new());
        let cancel = CancellationToken::new();
        let words = |text: &str| text.split_whitespace().count();
        let by_index = |info: &PriorityInfo<'_>| 1000.0 - info.index as f64;

        let d = Materializer::new(&r, &words, &by_index, &cancel)
            .materialize(7, "Words", "full")
            .await
            .unwrap();
        assert_eq!(d.cost, 3);
        assert_eq!(d.priority_score, 993.0);
        assert_eq!(d.index, 7);
    }
}
