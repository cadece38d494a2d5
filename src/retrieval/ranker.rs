//! Structural re-ranking of semantic retrieval results.
//!
//! Raw similarity over-favors deeply nested, heavily parameterized endpoints
//! whose text happens to embed close to the query. The ranker blends in a
//! mild prior toward shallow, few-parameter paths, except for a top match
//! that is already confident enough to stand on its own.

use crate::index::VectorMatch;
use crate::ingestion::ToolCard;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static PATH_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]+\}").unwrap());

/// Ranking knobs. The weights and threshold carry no documented derivation;
/// they are kept configurable but their defaults are deliberately unchanged.
#[derive(Debug, Clone)]
pub struct RankerConfig {
    /// Neighbors fetched from the index per query.
    pub top_k: usize,
    /// Raw similarity at or above which the rank-0 candidate is protected
    /// from structural adjustment.
    pub confidence_threshold: f64,
    pub similarity_weight: f64,
    pub structural_weight: f64,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            confidence_threshold: 0.66,
            similarity_weight: 0.85,
            structural_weight: 0.15,
        }
    }
}

/// One ranked result: the card plus every score that produced its position.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    pub card: ToolCard,
    /// Raw similarity as reported by the vector store.
    pub similarity: f64,
    /// Path-shape prior in `[0, 0.5]`.
    pub structural: f64,
    /// Final ordering score.
    pub adjusted: f64,
}

/// Heuristic preference for simpler endpoints, computed purely from the
/// path's shape and bounded to `[0, 0.5]`.
pub fn structural_score(path: &str) -> f64 {
    let path_depth = path.split('/').filter(|segment| !segment.is_empty()).count();
    let num_path_params = PATH_PARAM.find_iter(path).count();

    let param_penalty = if num_path_params <= 1 { 1.0 } else { 0.5 };
    // An empty path is invalid input upstream; the clamp just keeps the
    // division finite if one slips through.
    let depth_penalty = 1.0 / path_depth.max(1) as f64;

    param_penalty * depth_penalty * 0.5
}

/// Re-rank retrieval results with the structural prior and confidence gate.
///
/// The rank-0 candidate keeps its raw similarity untouched iff it clears
/// `confidence_threshold`; every other candidate gets the weighted blend.
/// The final sort is stable, so equal adjusted scores keep retrieval order.
pub fn rerank(matches: Vec<VectorMatch>, config: &RankerConfig) -> Vec<ScoredCandidate> {
    let mut candidates: Vec<ScoredCandidate> = matches
        .into_iter()
        .enumerate()
        .map(|(rank, m)| {
            let structural = structural_score(&m.card.path);
            let protect_top = rank == 0 && m.score >= config.confidence_threshold;

            let adjusted = if protect_top {
                m.score
            } else {
                config.similarity_weight * m.score + config.structural_weight * structural
            };

            ScoredCandidate {
                card: m.card,
                similarity: m.score,
                structural,
                adjusted,
            }
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.adjusted
            .partial_cmp(&a.adjusted)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::ParamMap;

    const TOLERANCE: f64 = 1e-9;

    fn vector_match(id: &str, path: &str, score: f64) -> VectorMatch {
        VectorMatch {
            id: id.to_string(),
            score,
            card: ToolCard {
                name: id.to_string(),
                description: String::new(),
                method: "GET".to_string(),
                path: path.to_string(),
                params: ParamMap::new(),
            },
        }
    }

    #[test]
    fn test_structural_score_shallow_path() {
        // depth 2, no placeholders
        assert!((structural_score("/v1/charges") - 0.25).abs() < TOLERANCE);
    }

    #[test]
    fn test_structural_score_nested_parameterized_path() {
        // depth 4, two placeholders
        let score = structural_score("/v1/customers/{id}/sources/{source}");
        assert!((score - 0.0625).abs() < TOLERANCE);
    }

    #[test]
    fn test_structural_score_single_placeholder_keeps_full_penalty() {
        // depth 3, one placeholder: param_penalty stays 1
        let score = structural_score("/v1/charges/{charge}");
        assert!((score - 0.5 / 3.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_structural_score_bounds() {
        let paths = [
            "/",
            "/v1",
            "/v1/charges",
            "/v1/customers/{id}",
            "/v1/customers/{id}/sources/{source}/verify",
            "/a/b/c/d/e/f/g/{h}/{i}/{j}",
        ];
        for path in paths {
            let score = structural_score(path);
            assert!((0.0..=0.5).contains(&score), "{path} scored {score}");
        }
    }

    #[test]
    fn test_confident_top_match_is_protected() {
        let config = RankerConfig::default();
        let ranked = rerank(
            vec![
                vector_match("top", "/v1/customers/{id}/sources/{source}", 0.9),
                vector_match("runner_up", "/v1/charges", 0.7),
            ],
            &config,
        );

        // Structural score of the top path is poor, but 0.9 >= 0.66 so the
        // raw similarity stands.
        assert_eq!(ranked[0].card.name, "top");
        assert_eq!(ranked[0].adjusted, 0.9);
    }

    #[test]
    fn test_unconfident_top_match_gets_blended() {
        let config = RankerConfig::default();
        let ranked = rerank(
            vec![
                vector_match("deep", "/v1/customers/{id}/sources/{source}", 0.65),
                vector_match("shallow", "/v1/charges", 0.64),
            ],
            &config,
        );

        // 0.65 < 0.66: both blend, and the shallow path overtakes.
        // deep:    0.85 * 0.65 + 0.15 * 0.0625 = 0.561875
        // shallow: 0.85 * 0.64 + 0.15 * 0.25   = 0.5815
        assert_eq!(ranked[0].card.name, "shallow");
        assert!((ranked[0].adjusted - 0.5815).abs() < TOLERANCE);
        assert!((ranked[1].adjusted - 0.561875).abs() < TOLERANCE);
    }

    #[test]
    fn test_threshold_boundary_protects_exact_match() {
        let config = RankerConfig::default();
        let ranked = rerank(
            vec![vector_match("edge", "/v1/customers/{id}/sources/{source}", 0.66)],
            &config,
        );

        assert_eq!(ranked[0].adjusted, 0.66);
    }

    #[test]
    fn test_blend_formula_holds_for_non_protected_candidates() {
        let config = RankerConfig::default();
        let ranked = rerank(
            vec![
                vector_match("a", "/v1/charges", 0.9),
                vector_match("b", "/v1/refunds/{id}", 0.8),
                vector_match("c", "/v1/invoices/upcoming/lines", 0.72),
            ],
            &config,
        );

        for candidate in ranked.iter().filter(|c| c.card.name != "a") {
            let expected = 0.85 * candidate.similarity + 0.15 * candidate.structural;
            assert!((candidate.adjusted - expected).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_equal_adjusted_scores_keep_retrieval_order() {
        let config = RankerConfig::default();
        // Identical similarity and identical path shape produce identical
        // adjusted scores.
        let ranked = rerank(
            vec![
                vector_match("first", "/v1/payouts", 0.5),
                vector_match("second", "/v1/refunds", 0.5),
                vector_match("third", "/v1/charges", 0.5),
            ],
            &config,
        );

        let names: Vec<&str> = ranked.iter().map(|c| c.card.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_empty_matches_produce_empty_ranking() {
        assert!(rerank(Vec::new(), &RankerConfig::default()).is_empty());
    }

    #[test]
    fn test_custom_weights_are_respected() {
        let config = RankerConfig {
            top_k: 10,
            confidence_threshold: 1.1,
            similarity_weight: 0.5,
            structural_weight: 0.5,
        };
        let ranked = rerank(vec![vector_match("a", "/v1/charges", 0.8)], &config);

        // Threshold above any possible similarity: even rank 0 blends.
        assert!((ranked[0].adjusted - (0.5 * 0.8 + 0.5 * 0.25)).abs() < TOLERANCE);
    }
}
