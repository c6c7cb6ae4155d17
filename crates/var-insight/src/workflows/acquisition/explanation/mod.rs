mod narrative;
mod reasoning;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use narrative::{
    HttpNarrator, Narrative, NarrativeError, NarrativeGenerator, NarrativeRequest,
    TemplateNarrator,
};

use super::criteria::AcquisitionCriteria;
use super::domain::{Dimension, ScoredVar, VarId};
use reasoning::dimension_reasoning;

/// Scores at or above this value are reported as strengths.
pub const STRONG_THRESHOLD: f64 = 8.0;
/// Scores at or below this value are reported as concerns.
pub const WEAK_THRESHOLD: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreTier {
    Strong,
    Moderate,
    Weak,
}

impl ScoreTier {
    pub fn classify(score: f64) -> Self {
        if score >= STRONG_THRESHOLD {
            ScoreTier::Strong
        } else if score <= WEAK_THRESHOLD {
            ScoreTier::Weak
        } else {
            ScoreTier::Moderate
        }
    }
}

/// Where the summary text of a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SummarySource {
    Template,
    Narrator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownEntry {
    pub dimension: Dimension,
    pub label: String,
    pub score: f64,
    pub weight: f64,
    /// `weight * score`; entries sum to the composite.
    pub contribution: f64,
    pub tier: ScoreTier,
    pub reasoning: String,
    pub imputed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationPayload {
    pub var_id: VarId,
    pub var_name: String,
    pub composite_score: f64,
    pub rank: usize,
    pub summary: String,
    pub summary_source: SummarySource,
    pub breakdown: Vec<BreakdownEntry>,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
}

impl ExplanationPayload {
    pub fn entry(&self, dimension: Dimension) -> Option<&BreakdownEntry> {
        self.breakdown
            .iter()
            .find(|entry| entry.dimension == dimension)
    }

    pub fn narrative_request(&self) -> NarrativeRequest {
        NarrativeRequest {
            var_name: self.var_name.clone(),
            rank: self.rank,
            composite_score: self.composite_score,
            breakdown: self.breakdown.clone(),
            strengths: self.strengths.clone(),
            concerns: self.concerns.clone(),
        }
    }

    fn apply_narrative(&mut self, narrative: Narrative) {
        self.summary = narrative.summary;
        self.summary_source = SummarySource::Narrator;
        for entry in self.breakdown.iter_mut().filter(|entry| !entry.imputed) {
            if let Some(text) = narrative.reasoning.get(&entry.dimension) {
                entry.reasoning = text.clone();
            }
        }
    }
}

/// Payload plus the collaborator failure that forced the templated fallback, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Narrated {
    pub payload: ExplanationPayload,
    pub failure: Option<NarrativeError>,
}

/// Turns a scored candidate into a dimension-by-dimension justification.
#[derive(Debug, Clone)]
pub struct ExplanationSynthesizer {
    criteria: AcquisitionCriteria,
}

impl ExplanationSynthesizer {
    pub fn new(criteria: AcquisitionCriteria) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &AcquisitionCriteria {
        &self.criteria
    }

    /// Deterministic explanation using templated summary and reasoning.
    pub fn explain(&self, scored: &ScoredVar) -> ExplanationPayload {
        let breakdown: Vec<BreakdownEntry> = self
            .criteria
            .weights
            .pairs()
            .into_iter()
            .map(|(dimension, weight)| {
                let score = scored.scores.get(dimension);
                let imputed = scored.is_imputed(dimension);
                BreakdownEntry {
                    dimension,
                    label: dimension.label().to_string(),
                    score,
                    weight,
                    contribution: weight * score,
                    tier: ScoreTier::classify(score),
                    reasoning: dimension_reasoning(dimension, &scored.var, &self.criteria, imputed),
                    imputed,
                }
            })
            .collect();

        let strengths = highlights(&breakdown, ScoreTier::Strong);
        let concerns = highlights(&breakdown, ScoreTier::Weak);

        let mut payload = ExplanationPayload {
            var_id: scored.id(),
            var_name: scored.var.name.clone(),
            composite_score: scored.composite_score,
            rank: scored.rank,
            summary: String::new(),
            summary_source: SummarySource::Template,
            breakdown,
            strengths,
            concerns,
        };
        payload.summary = template_summary(&payload.narrative_request());
        payload
    }

    /// Explain, then let `narrator` rewrite the text within `timeout`.
    ///
    /// Any narrator failure leaves the templated payload in place and is reported in
    /// [`Narrated::failure`] for the caller to log.
    pub async fn explain_with(
        &self,
        scored: &ScoredVar,
        narrator: &dyn NarrativeGenerator,
        timeout: Duration,
    ) -> Narrated {
        let mut payload = self.explain(scored);
        let request = payload.narrative_request();

        let failure = match tokio::time::timeout(timeout, narrator.narrate(&request)).await {
            Ok(Ok(narrative)) if !narrative.summary.trim().is_empty() => {
                payload.apply_narrative(narrative);
                None
            }
            Ok(Ok(_)) => Some(NarrativeError::Empty),
            Ok(Err(err)) => Some(err),
            Err(_) => Some(NarrativeError::Timeout {
                millis: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        };

        Narrated { payload, failure }
    }
}

/// Measured dimensions in `tier`, strongest first for strengths and weakest first for concerns.
fn highlights(breakdown: &[BreakdownEntry], tier: ScoreTier) -> Vec<String> {
    let mut picked: Vec<&BreakdownEntry> = breakdown
        .iter()
        .filter(|entry| !entry.imputed && entry.tier == tier)
        .collect();

    match tier {
        ScoreTier::Strong => picked.sort_by(|a, b| b.score.total_cmp(&a.score)),
        _ => picked.sort_by(|a, b| a.score.total_cmp(&b.score)),
    }

    picked
        .into_iter()
        .map(|entry| format!("{} ({:.1}/10)", entry.label, entry.score))
        .collect()
}

pub(crate) fn template_summary(request: &NarrativeRequest) -> String {
    let mut summary = format!(
        "{} ranks #{} with a composite score of {:.1}/10.",
        request.var_name, request.rank, request.composite_score
    );

    if !request.strengths.is_empty() {
        summary.push_str(&format!(
            " Strongest fit: {}.",
            request.strengths.join(", ")
        ));
    }
    if !request.concerns.is_empty() {
        summary.push_str(&format!(" Main concerns: {}.", request.concerns.join(", ")));
    }
    if request.strengths.is_empty() && request.concerns.is_empty() {
        summary.push_str(" No dimension stands out as a clear strength or concern.");
    }

    let imputed = request.breakdown.iter().filter(|entry| entry.imputed).count();
    match imputed {
        0 => {}
        1 => summary.push_str(" 1 dimension is scored at the neutral default for lack of data."),
        n => summary.push_str(&format!(
            " {n} dimensions are scored at the neutral default for lack of data."
        )),
    }

    summary
}
