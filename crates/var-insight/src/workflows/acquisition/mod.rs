//! Acquisition-target scoring, ranking, explanation and scenario simulation for VARs.
//!
//! The engines (`scoring`, `ranking`, `explanation`, `scenario`) are pure and synchronous apart
//! from the optional narrative collaborator. `service` and `router` are the thin adapters that
//! put them behind a repository and an HTTP surface.

pub mod criteria;
pub mod domain;
pub mod explanation;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod scenario;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use criteria::{
    AcquisitionCriteria, CriteriaError, DimensionWeights, EmployeeBand, RevenueRange,
    WEIGHT_SUM_TOLERANCE,
};
pub use domain::{Dimension, OwnershipType, ScoredVar, UnifiedVar, VarId, VarScores};
pub use explanation::{
    BreakdownEntry, ExplanationPayload, ExplanationSynthesizer, HttpNarrator, Narrated,
    Narrative, NarrativeError, NarrativeGenerator, NarrativeRequest, ScoreTier, SummarySource,
    TemplateNarrator, STRONG_THRESHOLD, WEAK_THRESHOLD,
};
pub use ranking::{aggregate, rank, rerank, Ranker, RankingFilter};
pub use repository::{CandidateRepository, RepositoryError};
pub use router::acquisition_router;
pub use scenario::{
    simulate, AcquirerBaseline, DealAssumptions, PriceRange, ScenarioError, ScenarioRequest,
    ScenarioResult, ScenarioSimulator, TargetContribution,
};
pub use scoring::{score, DimensionScorer, ScoreCard, ScoringError, NEUTRAL_SCORE};
pub use service::{
    AcquisitionService, AcquisitionServiceError, RankingRequest, RankingSnapshot,
    DEFAULT_NARRATIVE_TIMEOUT,
};
