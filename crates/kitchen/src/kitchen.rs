//! The kitchen: cook orchestration.
//!
//! A cook call:
//!
//! 1. Normalizes the order (bare tokens get the default detail; an empty
//!    order means every registered token, in registration order)
//! 2. Materializes each item in request order
//! 3. Plans the whole set against the budget
//! 4. Re-walks items in original order to join the context and, when
//!    asked, record a plate per item with running totals in that order
//!
//! Any resolution error aborts the call; there is no partial context.

use crate::lineage;
use crate::materializer::{Dish, Materializer};
use crate::planner::{self, Candidate, Selection};
use crate::resolver::Resolver;
use souschef_core::{
    CharHeuristic, Cookbook, CookReport, DEFAULT_DETAIL, DefaultRanker, LineageEdge, OrderItem,
    Pantry, Plate, PriorityRanker, Result, TokenCounter, Value,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Parameters for one cook call.
#[derive(Clone, Default)]
pub struct CookRequest {
    pub order: Vec<OrderItem>,
    pub budget: Option<usize>,
    /// Overrides the kitchen's token counter for this call.
    pub counter: Option<Arc<dyn TokenCounter>>,
    /// Overrides the kitchen's priority ranker for this call.
    pub ranker: Option<Arc<dyn PriorityRanker>>,
    pub explain: bool,
    pub cancel: CancellationToken,
}

impl CookRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order<I, T>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OrderItem>,
    {
        self.order = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn item(mut self, item: impl Into<OrderItem>) -> Self {
        self.order.push(item.into());
        self
    }

    pub fn budget(mut self, budget: usize) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn counter(mut self, counter: impl TokenCounter + 'static) -> Self {
        self.counter = Some(Arc::new(counter));
        self
    }

    pub fn ranker(mut self, ranker: impl PriorityRanker + 'static) -> Self {
        self.ranker = Some(Arc::new(ranker));
        self
    }

    pub fn explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    pub fn cancel_with(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl std::fmt::Debug for CookRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookRequest")
            .field("order", &self.order)
            .field("budget", &self.budget)
            .field("custom_counter", &self.counter.is_some())
            .field("custom_ranker", &self.ranker.is_some())
            .field("explain", &self.explain)
            .finish()
    }
}

/// A context-assembling engine bound to one pantry.
///
/// Recipe outputs are cached for the kitchen's lifetime, across cook
/// calls. Build a new kitchen for fresh memoization.
pub struct Kitchen {
    resolver: Resolver,
    default_detail: String,
    counter: Arc<dyn TokenCounter>,
    ranker: Arc<dyn PriorityRanker>,
}

impl Kitchen {
    pub fn new(cookbook: Arc<Cookbook>, pantry: Pantry) -> Self {
        Self {
            resolver: Resolver::new(cookbook, pantry),
            default_detail: DEFAULT_DETAIL.to_string(),
            counter: Arc::new(CharHeuristic::default()),
            ranker: Arc::new(DefaultRanker),
        }
    }

    /// Detail label given to order items that name none.
    pub fn with_default_detail(mut self, detail: impl Into<String>) -> Self {
        self.default_detail = detail.into();
        self
    }

    pub fn with_counter(mut self, counter: impl TokenCounter + 'static) -> Self {
        self.counter = Arc::new(counter);
        self
    }

    pub fn with_ranker(mut self, ranker: impl PriorityRanker + 'static) -> Self {
        self.ranker = Arc::new(ranker);
        self
    }

    pub fn cookbook(&self) -> &Cookbook {
        self.resolver.cookbook()
    }

    pub fn pantry(&self) -> &Pantry {
        self.resolver.pantry()
    }

    /// Number of recipe outputs memoized so far.
    pub fn cached(&self) -> usize {
        self.resolver.cached()
    }

    /// Resolve a single token.
    pub async fn resolve(&self, token: &str) -> Result<Arc<Value>> {
        self.resolver.resolve(token, &CancellationToken::new()).await
    }

    /// Explain how `token` is produced, without invoking any recipe.
    pub fn trace(&self, token: &str) -> Result<Vec<LineageEdge>> {
        lineage::trace(self.resolver.cookbook(), self.resolver.pantry(), token)
    }

    /// Cook and return only the joined context.
    pub async fn cook_text<I, T>(&self, order: I) -> Result<String>
    where
        I: IntoIterator<Item = T>,
        T: Into<OrderItem>,
    {
        let report = self.cook(CookRequest::new().order(order)).await?;
        Ok(report.context)
    }

    /// Run a full cook call.
    pub async fn cook(&self, request: CookRequest) -> Result<CookReport> {
        let tickets = self.normalize(&request.order);
        let counter = request.counter.as_deref().unwrap_or(self.counter.as_ref());
        let ranker = request.ranker.as_deref().unwrap_or(self.ranker.as_ref());
        let materializer = Materializer::new(&self.resolver, counter, ranker, &request.cancel);

        let mut dishes = Vec::with_capacity(tickets.len());
        for (index, (token, detail)) in tickets.iter().enumerate() {
            dishes.push(materializer.materialize(index, token, detail).await?);
        }

        let candidates: Vec<Candidate> = dishes
            .iter()
            .map(|d| Candidate {
                index: d.index,
                baseline: d.cost,
                compressed: d.compressed.as_ref().map(|c| c.cost),
                score: d.priority_score,
            })
            .collect();
        let selections = planner::plan(&candidates, request.budget);

        let mut context = String::new();
        let mut plates = request.explain.then(|| Vec::with_capacity(dishes.len()));
        let mut total: usize = 0;

        for (dish, selection) in dishes.iter().zip(&selections) {
            let before = total;
            if let Some(text) = served_text(dish, selection) {
                context.push_str(text);
                context.push('\n');
                total = total.saturating_add(selection.cost);
            } else {
                warn!(token = %dish.token, cost = dish.cost, "Dropped from context");
            }

            if let Some(plates) = plates.as_mut() {
                plates.push(self.plate(dish, selection, before, total)?);
            }
        }

        info!(
            items = dishes.len(),
            served = selections.iter().filter(|s| s.decision.is_served()).count(),
            total_tokens = total,
            budget = ?request.budget,
            "Cooked context"
        );

        Ok(CookReport {
            context,
            total_tokens: total,
            budget: request.budget,
            plates,
        })
    }

    fn normalize(&self, order: &[OrderItem]) -> Vec<(String, String)> {
        if order.is_empty() {
            let tokens = self.resolver.cookbook().tokens();
            debug!(count = tokens.len(), "No order given, serving the whole cookbook");
            return tokens
                .into_iter()
                .map(|t| (t.to_string(), self.default_detail.clone()))
                .collect();
        }
        order
            .iter()
            .map(|item| {
                let detail = item.detail().unwrap_or(self.default_detail.as_str());
                (item.token().to_string(), detail.to_string())
            })
            .collect()
    }

    fn plate(
        &self,
        dish: &Dish,
        selection: &Selection,
        before: usize,
        after: usize,
    ) -> Result<Plate> {
        let served_compressed = selection.compressed && selection.decision.is_served();
        let compression_note = match (&dish.compressed, served_compressed) {
            (Some(c), true) => Some(format!(
                "served summary from {} ({} -> {})",
                c.token, dish.cost, c.cost
            )),
            _ => None,
        };

        Ok(Plate {
            token: dish.token.clone(),
            decision: selection.decision,
            reason: selection.reason.to_string(),
            served_detail: if served_compressed {
                SUMMARY_DETAIL.to_string()
            } else {
                dish.detail.clone()
            },
            priority_tag: dish.priority_tag.clone(),
            priority_score: dish.priority_score,
            was_compressed: served_compressed,
            compression_note,
            original_cost: dish.cost,
            compressed_cost: dish.compressed.as_ref().map(|c| c.cost),
            cost: selection.cost,
            running_total_before: before,
            running_total_after: after,
            lineage: self.trace(&dish.token)?,
        })
    }
}

/// Detail label reported when the compressed fallback was served.
pub const SUMMARY_DETAIL: &str = "summary";

fn served_text<'d>(dish: &'d Dish, selection: &Selection) -> Option<&'d str> {
    if !selection.decision.is_served() {
        return None;
    }
    match (&dish.compressed, selection.compressed) {
        (Some(c), true) => Some(&c.text),
        _ => Some(&dish.text),
    }
}
