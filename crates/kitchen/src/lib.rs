//! The SousChef kitchen: turns an order of tokens into budgeted context.
//!
//! A cook call runs in four stages:
//!
//! 1. **Resolve** each token through the pantry or cookbook, memoizing
//!    recipe outputs and recursing into ingredients
//! 2. **Materialize** the value at the requested detail, render and cost it,
//!    and prepare a compressed fallback when the recipe offers one
//! 3. **Plan** against the token budget: first item forced, the rest
//!    admitted greedily by priority
//! 4. **Plate** the result: joined context, running totals, and optionally
//!    a per-item explanation with lineage

pub mod kitchen;
pub mod lineage;
pub mod materializer;
pub mod planner;
pub mod resolver;

pub use kitchen::{CookRequest, Kitchen, SUMMARY_DETAIL};
pub use lineage::{PANTRY_PROVIDER, trace};
pub use materializer::{Compressed, Dish, Materializer, render};
pub use planner::{Candidate, Selection, plan};
pub use resolver::{Resolver, Source};

/// Re-exported so callers can cancel a cook without depending on `tokio-util`.
pub use tokio_util::sync::CancellationToken;
