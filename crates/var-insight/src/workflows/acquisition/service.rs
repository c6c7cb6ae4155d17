use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::criteria::AcquisitionCriteria;
use super::domain::{ScoredVar, VarId};
use super::explanation::{ExplanationPayload, ExplanationSynthesizer, NarrativeGenerator};
use super::ranking::{Ranker, RankingFilter};
use super::repository::{CandidateRepository, RepositoryError};
use super::scenario::{ScenarioError, ScenarioRequest, ScenarioResult, ScenarioSimulator};
use super::scoring::ScoringError;

pub const DEFAULT_NARRATIVE_TIMEOUT: Duration = Duration::from_secs(4);

/// Body of a ranking request; both parts fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRequest {
    #[serde(default)]
    pub criteria: Option<AcquisitionCriteria>,
    #[serde(default)]
    pub filter: Option<RankingFilter>,
}

/// A computed ranking and the criteria it was computed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingSnapshot {
    pub computed_at: DateTime<Utc>,
    pub criteria: AcquisitionCriteria,
    pub total_candidates: usize,
    pub rankings: Vec<ScoredVar>,
}

/// Facade wiring the candidate repository to the scoring, explanation and scenario engines.
pub struct AcquisitionService<R> {
    repository: Arc<R>,
    narrator: Option<Arc<dyn NarrativeGenerator>>,
    narrative_timeout: Duration,
    latest: Mutex<Option<RankingSnapshot>>,
}

impl<R> AcquisitionService<R>
where
    R: CandidateRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            narrator: None,
            narrative_timeout: DEFAULT_NARRATIVE_TIMEOUT,
            latest: Mutex::new(None),
        }
    }

    /// Route explanation text through `narrator`, bounded by `timeout`.
    pub fn with_narrator(
        mut self,
        narrator: Arc<dyn NarrativeGenerator>,
        timeout: Duration,
    ) -> Self {
        self.narrator = Some(narrator);
        self.narrative_timeout = timeout;
        self
    }

    pub fn default_criteria(&self) -> AcquisitionCriteria {
        AcquisitionCriteria::default()
    }

    /// Rank every candidate, remember the full ranking, and return the filtered view.
    pub fn compute_rankings(
        &self,
        request: RankingRequest,
    ) -> Result<RankingSnapshot, AcquisitionServiceError> {
        let snapshot = self.rank_under(request.criteria.unwrap_or_default())?;
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());

        let snapshot = match request.filter {
            Some(filter) if !filter.is_empty() => RankingSnapshot {
                rankings: filter.apply(snapshot.rankings),
                ..snapshot
            },
            _ => snapshot,
        };

        info!(
            candidates = snapshot.total_candidates,
            returned = snapshot.rankings.len(),
            "computed VAR rankings"
        );
        Ok(snapshot)
    }

    /// Most recent full ranking, if one has been computed.
    pub fn latest_rankings(&self) -> Option<RankingSnapshot> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Explain one candidate from the latest ranking.
    ///
    /// Candidates missing from it are ranked on the fly under the latest criteria (defaults when
    /// nothing has been ranked yet); the cached ranking is left untouched.
    pub async fn explain(
        &self,
        var_id: VarId,
    ) -> Result<ExplanationPayload, AcquisitionServiceError> {
        let (scored, criteria) = match self.lookup_latest(var_id) {
            Ok(found) => found,
            Err(criteria) => {
                self.repository
                    .fetch(var_id)?
                    .ok_or(AcquisitionServiceError::NotFound { var_id })?;
                debug!(%var_id, "no cached ranking entry; ranking on demand");
                let snapshot = self.rank_under(criteria)?;
                let scored = snapshot
                    .rankings
                    .into_iter()
                    .find(|entry| entry.id() == var_id)
                    .ok_or(AcquisitionServiceError::NotFound { var_id })?;
                (scored, snapshot.criteria)
            }
        };

        let synthesizer = ExplanationSynthesizer::new(criteria);
        let Some(narrator) = &self.narrator else {
            return Ok(synthesizer.explain(&scored));
        };

        let narrated = synthesizer
            .explain_with(&scored, narrator.as_ref(), self.narrative_timeout)
            .await;
        if let Some(error) = &narrated.failure {
            warn!(%var_id, %error, "narrative generator failed; returning templated explanation");
        }
        Ok(narrated.payload)
    }

    /// Project combined financials for the selected candidates.
    pub fn simulate(
        &self,
        request: ScenarioRequest,
    ) -> Result<ScenarioResult, AcquisitionServiceError> {
        let simulator =
            ScenarioSimulator::new(request.assumptions(), request.baseline.unwrap_or_default())?;
        let candidates = self.repository.list()?;
        let result = simulator.simulate(&request.target_var_ids, &candidates)?;

        info!(
            targets = result.target_var_ids.len(),
            valuation = result.estimated_valuation,
            roi = result.projected_roi,
            "simulated acquisition scenario"
        );
        Ok(result)
    }

    fn rank_under(
        &self,
        criteria: AcquisitionCriteria,
    ) -> Result<RankingSnapshot, AcquisitionServiceError> {
        let candidates = self.repository.list()?;
        let rankings = Ranker::new(criteria.clone())
            .map_err(ScoringError::from)?
            .rank(&candidates)?;

        Ok(RankingSnapshot {
            computed_at: Utc::now(),
            criteria,
            total_candidates: candidates.len(),
            rankings,
        })
    }

    /// The cached entry and its criteria, or on a miss the criteria to rank under instead.
    fn lookup_latest(
        &self,
        var_id: VarId,
    ) -> Result<(ScoredVar, AcquisitionCriteria), AcquisitionCriteria> {
        let guard = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(snapshot) = guard.as_ref() else {
            return Err(AcquisitionCriteria::default());
        };
        match snapshot.rankings.iter().find(|entry| entry.id() == var_id) {
            Some(entry) => Ok((entry.clone(), snapshot.criteria.clone())),
            None => Err(snapshot.criteria.clone()),
        }
    }
}

/// Error raised by the acquisition service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AcquisitionServiceError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("candidate {var_id} not found")]
    NotFound { var_id: VarId },
}

impl AcquisitionServiceError {
    /// Caller-supplied input was rejected.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AcquisitionServiceError::Scoring(ScoringError::Criteria(_))
                | AcquisitionServiceError::Scenario(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AcquisitionServiceError::NotFound { .. }
                | AcquisitionServiceError::Repository(RepositoryError::NotFound)
        )
    }
}
