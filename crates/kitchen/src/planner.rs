//! Budget planning: which candidates are served, compressed, or dropped.
//!
//! # Algorithm
//!
//! Without a budget every candidate is served at baseline cost.
//!
//! With a budget:
//!
//! 1. The first candidate (index 0) is always served. Its compressed form
//!    is used only when strictly cheaper. Its cost counts even if it alone
//!    exceeds the budget.
//! 2. The rest are ordered by priority score (descending), then by their
//!    cheapest available cost (ascending), then by index.
//! 3. Each is admitted greedily: baseline if it fits, else compressed if
//!    it fits, else dropped. The running total updates after every
//!    admission.
//!
//! Planning is deterministic: identical inputs always produce identical
//! selections.

use souschef_core::Decision;
use std::cmp::Ordering;

/// The planner's view of one materialized item.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub baseline: usize,
    pub compressed: Option<usize>,
    pub score: f64,
}

impl Candidate {
    /// The cheapest way to serve this candidate.
    pub fn min_cost(&self) -> usize {
        self.compressed
            .map_or(self.baseline, |c| c.min(self.baseline))
    }
}

/// The planner's verdict for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub decision: Decision,
    pub compressed: bool,
    /// Cost charged against the budget; 0 when dropped.
    pub cost: usize,
    pub reason: &'static str,
}

pub const REASON_UNBUDGETED: &str = "no budget; served at full cost";
pub const REASON_FORCED: &str = "first order item is always served";
pub const REASON_FORCED_COMPRESSED: &str =
    "first order item is always served; compressed form is cheaper";
pub const REASON_FITS: &str = "fits within budget";
pub const REASON_COMPRESSED: &str = "compressed to fit budget";
pub const REASON_DROPPED: &str = "exceeds remaining budget";

/// Plan `candidates` (given in original order) against `budget`.
///
/// Returns one selection per candidate, in original order.
pub fn plan(candidates: &[Candidate], budget: Option<usize>) -> Vec<Selection> {
    let Some(budget) = budget else {
        return candidates
            .iter()
            .map(|c| Selection {
                index: c.index,
                decision: Decision::Included,
                compressed: false,
                cost: c.baseline,
                reason: REASON_UNBUDGETED,
            })
            .collect();
    };

    let mut selections: Vec<Option<Selection>> = vec![None; candidates.len()];
    let Some((first, rest)) = candidates.split_first() else {
        return Vec::new();
    };

    let forced = match first.compressed {
        Some(c) if c < first.baseline => Selection {
            index: first.index,
            decision: Decision::ForcedInclude,
            compressed: true,
            cost: c,
            reason: REASON_FORCED_COMPRESSED,
        },
        _ => Selection {
            index: first.index,
            decision: Decision::ForcedInclude,
            compressed: false,
            cost: first.baseline,
            reason: REASON_FORCED,
        },
    };
    let mut total = forced.cost;
    selections[0] = Some(forced);

    let mut queue: Vec<(usize, &Candidate)> = rest
        .iter()
        .enumerate()
        .map(|(offset, c)| (offset + 1, c))
        .collect();
    queue.sort_by(|(_, a), (_, b)| by_admission_order(a, b));

    for (slot, candidate) in queue {
        let selection = if total.saturating_add(candidate.baseline) <= budget {
            Selection {
                index: candidate.index,
                decision: Decision::Included,
                compressed: false,
                cost: candidate.baseline,
                reason: REASON_FITS,
            }
        } else {
            match candidate.compressed {
                Some(c) if total.saturating_add(c) <= budget => Selection {
                    index: candidate.index,
                    decision: Decision::Included,
                    compressed: true,
                    cost: c,
                    reason: REASON_COMPRESSED,
                },
                _ => Selection {
                    index: candidate.index,
                    decision: Decision::Dropped,
                    compressed: false,
                    cost: 0,
                    reason: REASON_DROPPED,
                },
            }
        };
        total = total.saturating_add(selection.cost);
        selections[slot] = Some(selection);
    }

    selections.into_iter().flatten().collect()
}

/// Score descending, then cheapest cost ascending, then index ascending.
fn by_admission_order(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.min_cost().cmp(&b.min_cost()))
        .then_with(|| a.index.cmp(&b.index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(index: usize, baseline: usize, compressed: Option<usize>, score: f64) -> Candidate {
        Candidate {
            index,
            baseline,
            compressed,
            score,
        }
    }

    fn decisions(selections: &[Selection]) -> Vec<Decision> {
        selections.iter().map(|s| s.decision).collect()
    }

    #[test]
    fn no_budget_serves_everything_at_baseline() {
        let plan = plan(
            &[
                candidate(0, 10, Some(1), 50.0),
                candidate(1, 1000, Some(5), 10.0),
            ],
            None,
        );
        assert_eq!(decisions(&plan), vec![Decision::Included, Decision::Included]);
        assert!(plan.iter().all(|s| !s.compressed));
        assert_eq!(plan.iter().map(|s| s.cost).sum::<usize>(), 1010);
    }

    #[test]
    fn empty_input_yields_empty_plan() {
        assert!(plan(&[], Some(100)).is_empty());
        assert!(plan(&[], None).is_empty());
    }

    #[test]
    fn first_item_forced_even_over_budget() {
        let plan = plan(
            &[candidate(0, 500, None, 0.0), candidate(1, 1, None, 100.0)],
            Some(100),
        );
        assert_eq!(plan[0].decision, Decision::ForcedInclude);
        assert_eq!(plan[0].cost, 500);
        assert_eq!(plan[1].decision, Decision::Dropped);
    }

    #[test]
    fn first_item_uses_compressed_only_when_strictly_cheaper() {
        let cheaper = plan(&[candidate(0, 100, Some(40), 50.0)], Some(1000));
        assert!(cheaper[0].compressed);
        assert_eq!(cheaper[0].cost, 40);
        assert_eq!(cheaper[0].reason, REASON_FORCED_COMPRESSED);

        let equal = plan(&[candidate(0, 100, Some(100), 50.0)], Some(1000));
        assert!(!equal[0].compressed);
        assert_eq!(equal[0].cost, 100);
    }

    #[test]
    fn compresses_when_baseline_does_not_fit() {
        // Directive 180 + History 900 > 1000, so History falls back to 200.
        let plan = plan(
            &[
                candidate(0, 180, None, 50.0),
                candidate(1, 900, Some(200), 20.0),
            ],
            Some(1000),
        );
        assert_eq!(plan[1].decision, Decision::Included);
        assert!(plan[1].compressed);
        assert_eq!(plan[1].cost, 200);
        assert_eq!(plan[1].reason, REASON_COMPRESSED);
        assert_eq!(plan.iter().map(|s| s.cost).sum::<usize>(), 380);
    }

    #[test]
    fn higher_priority_claims_budget_first() {
        // Both fit alone, not together. The later, higher-priority one wins.
        let plan = plan(
            &[
                candidate(0, 10, None, 50.0),
                candidate(1, 60, None, 25.0),
                candidate(2, 60, None, 75.0),
            ],
            Some(100),
        );
        assert_eq!(
            decisions(&plan),
            vec![Decision::ForcedInclude, Decision::Dropped, Decision::Included]
        );
    }

    #[test]
    fn equal_priority_prefers_cheaper_then_earlier() {
        let plan = plan(
            &[
                candidate(0, 0, None, 50.0),
                candidate(1, 70, None, 50.0),
                candidate(2, 40, None, 50.0),
                candidate(3, 40, None, 50.0),
                candidate(4, 30, Some(20), 50.0),
            ],
            Some(100),
        );
        // Admission order: 4 (min 20), 2, 3, 1.
        assert_eq!(plan[4].decision, Decision::Included);
        assert!(!plan[4].compressed);
        assert_eq!(plan[2].decision, Decision::Included);
        assert_eq!(plan[3].decision, Decision::Dropped);
        assert_eq!(plan[1].decision, Decision::Dropped);
    }

    #[test]
    fn dropped_only_when_nothing_fits() {
        let candidates = [
            candidate(0, 50, None, 50.0),
            candidate(1, 30, Some(10), 90.0),
            candidate(2, 30, Some(15), 80.0),
            candidate(3, 6, None, 10.0),
        ];
        let budget = 100;
        let selections = plan(&candidates, Some(budget));

        // Re-walk in admission order and check every drop was justified.
        let mut order: Vec<&Candidate> = candidates[1..].iter().collect();
        order.sort_by(|a, b| by_admission_order(a, b));
        let mut total = selections[0].cost;
        for c in order {
            let s = &selections[c.index];
            if s.decision == Decision::Dropped {
                assert!(total + c.baseline > budget);
                assert!(c.compressed.is_none_or(|cc| total + cc > budget));
            }
            total += s.cost;
        }
        assert_eq!(
            decisions(&selections),
            vec![
                Decision::ForcedInclude,
                Decision::Included,
                Decision::Included,
                Decision::Dropped
            ]
        );
        assert!(selections[2].compressed);
    }

    #[test]
    fn exact_fit_is_admitted() {
        let plan = plan(
            &[candidate(0, 40, None, 50.0), candidate(1, 60, None, 50.0)],
            Some(100),
        );
        assert_eq!(plan[1].decision, Decision::Included);
    }

    #[test]
    fn oversized_costs_are_dropped_not_wrapped() {
        let plan = plan(
            &[
                candidate(0, 10, None, 50.0),
                candidate(1, usize::MAX, None, 50.0),
                candidate(2, 5, Some(1), 50.0),
            ],
            Some(100),
        );
        assert_eq!(
            decisions(&plan),
            vec![Decision::ForcedInclude, Decision::Dropped, Decision::Included]
        );
        assert_eq!(plan[2].cost, 5);
    }

    #[test]
    fn oversized_forced_item_leaves_no_room() {
        let plan = plan(
            &[
                candidate(0, usize::MAX, None, 50.0),
                candidate(1, 1, None, 90.0),
                candidate(2, 0, None, 10.0),
            ],
            Some(100),
        );
        assert_eq!(plan[0].cost, usize::MAX);
        assert_eq!(
            decisions(&plan),
            vec![Decision::ForcedInclude, Decision::Dropped, Decision::Dropped]
        );
    }
}
