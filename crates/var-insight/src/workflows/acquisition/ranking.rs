use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::criteria::{AcquisitionCriteria, CriteriaError, DimensionWeights};
use super::domain::{OwnershipType, ScoredVar, UnifiedVar, VarScores};
use super::scoring::{normalize_state, DimensionScorer, ScoringError, MAX_SCORE};

/// Weighted sum of the eight sub-scores, folded over the ordered weight pairs.
///
/// Weights within `WEIGHT_SUM_TOLERANCE` of one can push the raw sum just past the scale, so
/// the result is clamped to `[0, 10]`.
pub fn aggregate(scores: &VarScores, weights: &DimensionWeights) -> Result<f64, ScoringError> {
    let composite = weights
        .pairs()
        .iter()
        .fold(0.0, |total, (dimension, weight)| {
            total + weight * scores.get(*dimension)
        });

    if composite.is_finite() {
        Ok(composite.clamp(0.0, MAX_SCORE))
    } else {
        Err(ScoringError::NonFiniteComposite)
    }
}

/// Scores and orders candidate sets under one set of criteria.
#[derive(Debug, Clone)]
pub struct Ranker {
    scorer: DimensionScorer,
}

impl Ranker {
    pub fn new(criteria: AcquisitionCriteria) -> Result<Self, CriteriaError> {
        Ok(Self {
            scorer: DimensionScorer::new(criteria)?,
        })
    }

    pub fn criteria(&self) -> &AcquisitionCriteria {
        self.scorer.criteria()
    }

    pub fn score(&self, var: &UnifiedVar) -> Result<ScoredVar, ScoringError> {
        let card = self.scorer.score_card(var)?;
        let composite_score = aggregate(&card.scores, &self.criteria().weights)?;

        Ok(ScoredVar {
            var: var.clone(),
            scores: card.scores,
            composite_score,
            rank: 0,
            imputed: card.imputed,
        })
    }

    /// Score every candidate and return them ordered with contiguous 1-based ranks.
    pub fn rank(&self, candidates: &[UnifiedVar]) -> Result<Vec<ScoredVar>, ScoringError> {
        let scored = candidates
            .iter()
            .map(|var| self.score(var))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rerank(scored))
    }
}

/// Score and rank candidates in one call, validating the criteria first.
pub fn rank(
    candidates: &[UnifiedVar],
    criteria: &AcquisitionCriteria,
) -> Result<Vec<ScoredVar>, ScoringError> {
    Ranker::new(criteria.clone())?.rank(candidates)
}

/// Sort by composite (descending) with a deterministic name/id tie-break and renumber from 1.
pub fn rerank(mut scored: Vec<ScoredVar>) -> Vec<ScoredVar> {
    scored.sort_by(compare_ranked);
    for (index, entry) in scored.iter_mut().enumerate() {
        entry.rank = index + 1;
    }
    scored
}

fn compare_ranked(left: &ScoredVar, right: &ScoredVar) -> Ordering {
    right
        .composite_score
        .total_cmp(&left.composite_score)
        .then_with(|| {
            left.var
                .name
                .to_lowercase()
                .cmp(&right.var.name.to_lowercase())
        })
        .then_with(|| left.var.name.cmp(&right.var.name))
        .then_with(|| left.var.id.cmp(&right.var.id))
}

/// Optional narrowing applied to a computed ranking before it is renumbered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingFilter {
    #[serde(default)]
    pub min_composite: Option<f64>,
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub ownership: Vec<OwnershipType>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl RankingFilter {
    pub fn is_empty(&self) -> bool {
        self.min_composite.is_none()
            && self.states.is_empty()
            && self.ownership.is_empty()
            && self.limit.is_none()
    }

    fn admits(&self, entry: &ScoredVar) -> bool {
        if let Some(threshold) = self.min_composite {
            if entry.composite_score < threshold {
                return false;
            }
        }

        if !self.states.is_empty() {
            let state = entry.var.hq_state.as_deref().and_then(normalize_state);
            let allowed = self
                .states
                .iter()
                .filter_map(|raw| normalize_state(raw))
                .any(|code| Some(code) == state);
            if !allowed {
                return false;
            }
        }

        if !self.ownership.is_empty()
            && !entry
                .var
                .ownership
                .is_some_and(|ownership| self.ownership.contains(&ownership))
        {
            return false;
        }

        true
    }

    /// Keep admitted entries in their existing order, truncate, and renumber from 1.
    pub fn apply(&self, ranked: Vec<ScoredVar>) -> Vec<ScoredVar> {
        let admitted = ranked.into_iter().filter(|entry| self.admits(entry));
        let subset: Vec<ScoredVar> = match self.limit {
            Some(limit) => admitted.take(limit).collect(),
            None => admitted.collect(),
        };
        rerank(subset)
    }
}
