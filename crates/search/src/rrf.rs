//! Reciprocal Rank Fusion
//!
//! Grounded on the teacher's `apply_rrf_fusion` (keyed merge of two ranked
//! lists by `1/(k + rank)`), matching the teacher's own 1-based rank
//! (`examples/loganmoon-codesearch/crates/server/src/api/unified_search.rs`
//! adds `+ 1` when converting its 0-based enumerate to `rank`).

use gocontext_core::search::RankedTuple;
use std::collections::HashMap;

/// Fuse two ranked lists into one, scored by `1/(k + rank)` summed per id.
///
/// Lists are 1-based ranked (the first element has rank 1). A chunk id
/// present in both lists sums both contributions. The result is sorted by
/// descending fused score; ties keep the vector list's relative order.
/// Output ranks are reassigned 1..N over the fused, sorted order.
pub fn fuse(vector: &[RankedTuple], text: &[RankedTuple], k: usize) -> Vec<RankedTuple> {
    let mut scores: HashMap<&str, f32> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for item in vector {
        let score = 1.0 / (k + item.rank) as f32;
        if scores.insert(item.chunk_id.as_str(), score).is_none() {
            order.push(item.chunk_id.as_str());
        }
    }
    for item in text {
        let score = 1.0 / (k + item.rank) as f32;
        scores
            .entry(item.chunk_id.as_str())
            .and_modify(|s| *s += score)
            .or_insert_with(|| {
                order.push(item.chunk_id.as_str());
                score
            });
    }

    let mut fused: Vec<(String, f32)> = order
        .into_iter()
        .map(|id| (id.to_string(), scores[id]))
        .collect();
    fused.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    fused
        .into_iter()
        .enumerate()
        .map(|(rank, (chunk_id, score))| RankedTuple { chunk_id, score, rank: rank + 1 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple(id: &str, rank: usize) -> RankedTuple {
        RankedTuple { chunk_id: id.to_string(), score: 0.0, rank }
    }

    #[test]
    fn combines_scores_for_shared_ids() {
        let vector = vec![tuple("a", 1), tuple("b", 2), tuple("c", 3)];
        let text = vec![tuple("b", 1), tuple("c", 2), tuple("d", 3)];
        let fused = fuse(&vector, &text, 60);

        let b_score = 1.0 / 62.0 + 1.0 / 61.0;
        let b = fused.iter().find(|t| t.chunk_id == "b").unwrap();
        assert!((b.score - b_score).abs() < 1e-6);
        assert_eq!(fused[0].chunk_id, "b");
        assert_eq!(fused[0].rank, 1);
    }

    #[test]
    fn empty_lists_produce_empty_result() {
        let fused = fuse(&[], &[], 60);
        assert!(fused.is_empty());
    }

    #[test]
    fn one_empty_list_returns_the_other_unchanged_in_order() {
        let vector = vec![tuple("a", 1), tuple("b", 2)];
        let fused = fuse(&vector, &[], 60);
        assert_eq!(fused.iter().map(|t| t.chunk_id.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(fused.iter().map(|t| t.rank).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn score_calculation_matches_formula() {
        let vector = vec![tuple("a", 1)];
        let fused = fuse(&vector, &[], 60);
        assert!((fused[0].score - 1.0 / 61.0).abs() < 1e-6);
    }

    #[test]
    fn different_k_changes_relative_weighting() {
        let vector = vec![tuple("a", 1)];
        let text = vec![tuple("b", 1)];
        let fused_small_k = fuse(&vector, &text, 1);
        let fused_large_k = fuse(&vector, &text, 1000);
        // With small k, rank differences dominate less dramatically than
        // with large k only in relative terms; here ranks tie so scores tie
        // for both k, but the magnitude must differ.
        assert!(fused_small_k[0].score > fused_large_k[0].score);
    }

    #[test]
    fn worked_example_matches_spec() {
        // spec.md §8: vector list [1, 2, 3], text list [2, 3, 4] (1-based
        // rank_in_list per list), k=60 -> output order [2, 3, 1, 4].
        let vector = vec![tuple("1", 1), tuple("2", 2), tuple("3", 3)];
        let text = vec![tuple("2", 1), tuple("3", 2), tuple("4", 3)];
        let fused = fuse(&vector, &text, 60);
        assert_eq!(fused.iter().map(|t| t.chunk_id.as_str()).collect::<Vec<_>>(), vec!["2", "3", "1", "4"]);
        assert_eq!(fused.iter().map(|t| t.rank).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }
}
