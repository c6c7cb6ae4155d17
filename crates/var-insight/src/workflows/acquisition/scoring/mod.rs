mod geography;
mod rules;

pub use rules::NEUTRAL_SCORE;

pub(crate) use geography::normalize_state;
pub(crate) use rules::{labels_match, MAX_SCORE};

use serde::{Deserialize, Serialize};

use super::criteria::{AcquisitionCriteria, CriteriaError};
use super::domain::{Dimension, UnifiedVar, VarId, VarScores};
use rules::Signal;

/// Scores for one candidate plus the dimensions that fell back to the neutral default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCard {
    pub scores: VarScores,
    pub imputed: Vec<Dimension>,
}

/// Stateless scorer bound to a validated set of acquisition criteria.
#[derive(Debug, Clone)]
pub struct DimensionScorer {
    criteria: AcquisitionCriteria,
}

impl DimensionScorer {
    pub fn new(criteria: AcquisitionCriteria) -> Result<Self, CriteriaError> {
        criteria.validate()?;
        Ok(Self { criteria })
    }

    pub fn criteria(&self) -> &AcquisitionCriteria {
        &self.criteria
    }

    pub fn score(&self, var: &UnifiedVar) -> Result<VarScores, ScoringError> {
        self.score_card(var).map(|card| card.scores)
    }

    pub fn score_card(&self, var: &UnifiedVar) -> Result<ScoreCard, ScoringError> {
        evaluate(var, &self.criteria)
    }
}

/// Score a single candidate against criteria, validating the criteria first.
pub fn score(var: &UnifiedVar, criteria: &AcquisitionCriteria) -> Result<VarScores, ScoringError> {
    criteria.validate()?;
    evaluate(var, criteria).map(|card| card.scores)
}

fn evaluate(var: &UnifiedVar, criteria: &AcquisitionCriteria) -> Result<ScoreCard, ScoringError> {
    check_inputs(var)?;

    let mut scores = VarScores::uniform(NEUTRAL_SCORE);
    let mut imputed = Vec::new();

    for dimension in Dimension::ALL {
        match rules::evaluate(dimension, var, criteria) {
            Signal::Measured(raw) if raw.is_finite() => {
                scores.set(dimension, raw.clamp(0.0, rules::MAX_SCORE));
            }
            Signal::Measured(_) => {
                return Err(ScoringError::NonFiniteScore {
                    var_id: var.id,
                    dimension,
                });
            }
            Signal::Missing => imputed.push(dimension),
        }
    }

    Ok(ScoreCard { scores, imputed })
}

fn check_inputs(var: &UnifiedVar) -> Result<(), ScoringError> {
    let fields = [
        ("annualRevenue", var.annual_revenue),
        ("ebitdaMargin", var.ebitda_margin),
        ("growthRate", var.growth_rate),
        ("employerRating", var.employer_rating),
    ];

    for (field, value) in fields {
        if value.is_some_and(|value| !value.is_finite()) {
            return Err(ScoringError::NonFiniteInput {
                var_id: var.id,
                field,
            });
        }
    }

    Ok(())
}

/// Fatal scoring failures; corrupted numbers are never propagated into a ranking.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error(transparent)]
    Criteria(#[from] CriteriaError),
    #[error("candidate {var_id} has a non-finite {field}")]
    NonFiniteInput { var_id: VarId, field: &'static str },
    #[error("{} for candidate {var_id} evaluated to a non-finite value", .dimension.key())]
    NonFiniteScore { var_id: VarId, dimension: Dimension },
    #[error("composite score evaluated to a non-finite value")]
    NonFiniteComposite,
}
