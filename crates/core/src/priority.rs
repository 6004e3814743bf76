//! Priority ranking.
//!
//! Converts a recipe's static priority tag into the numeric score the
//! planner sorts by. Callers may supply their own [`PriorityRanker`].

use crate::recipe::PriorityTag;

/// Everything a ranker may look at for one order item.
#[derive(Debug, Clone, Copy)]
pub struct PriorityInfo<'a> {
    pub token: &'a str,
    pub provider_name: &'a str,
    pub priority_tag: Option<&'a PriorityTag>,
    /// Position of the item in the order list.
    pub index: usize,
}

pub trait PriorityRanker: Send + Sync {
    fn rank(&self, info: &PriorityInfo<'_>) -> f64;
}

impl<F> PriorityRanker for F
where
    F: Fn(&PriorityInfo<'_>) -> f64 + Send + Sync,
{
    fn rank(&self, info: &PriorityInfo<'_>) -> f64 {
        self(info)
    }
}

/// Score assigned when no tag is present or a label is unknown.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Ranks by tag alone via [`score_tag`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRanker;

impl PriorityRanker for DefaultRanker {
    fn rank(&self, info: &PriorityInfo<'_>) -> f64 {
        score_tag(info.priority_tag)
    }
}

/// Numbers pass through; labels map case-insensitively.
pub fn score_tag(tag: Option<&PriorityTag>) -> f64 {
    match tag {
        Some(PriorityTag::Score(score)) => *score,
        Some(PriorityTag::Label(label)) => match label.trim().to_ascii_lowercase().as_str() {
            "critical" => 100.0,
            "must" => 90.0,
            "high" => 75.0,
            "normal" | "medium" => 50.0,
            "low" => 25.0,
            "optional" => 10.0,
            _ => NEUTRAL_SCORE,
        },
        None => NEUTRAL_SCORE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(tag: Option<&PriorityTag>) -> PriorityInfo<'_> {
        PriorityInfo {
            token: "T",
            provider_name: "T",
            priority_tag: tag,
            index: 1,
        }
    }

    #[test]
    fn labels_map_case_insensitively() {
        let cases = [
            ("critical", 100.0),
            ("MUST", 90.0),
            ("High", 75.0),
            ("normal", 50.0),
            ("medium", 50.0),
            ("low", 25.0),
            ("Optional", 10.0),
        ];
        for (label, expected) in cases {
            assert_eq!(score_tag(Some(&PriorityTag::from(label))), expected, "{label}");
        }
    }

    #[test]
    fn numbers_pass_through() {
        assert_eq!(score_tag(Some(&PriorityTag::Score(20.0))), 20.0);
        assert_eq!(score_tag(Some(&PriorityTag::Score(-3.5))), -3.5);
    }

    #[test]
    fn unknown_or_absent_is_neutral() {
        assert_eq!(score_tag(Some(&PriorityTag::from("urgent-ish"))), NEUTRAL_SCORE);
        assert_eq!(score_tag(None), NEUTRAL_SCORE);
    }

    #[test]
    fn default_ranker_uses_tag() {
        let tag = PriorityTag::from("low");
        assert_eq!(DefaultRanker.rank(&info(Some(&tag))), 25.0);
    }

    #[test]
    fn closure_ranker_sees_index() {
        let by_position = |i: &PriorityInfo<'_>| 100.0 - i.index as f64;
        assert_eq!(by_position.rank(&info(None)), 99.0);
    }
}
