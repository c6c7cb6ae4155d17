use super::common::*;
use crate::workflows::acquisition::domain::{Dimension, VarId};
use crate::workflows::acquisition::explanation::{
    ExplanationSynthesizer, NarrativeError, SummarySource,
};
use crate::workflows::acquisition::ranking::Ranker;
use crate::workflows::acquisition::service::{AcquisitionService, RankingRequest};
use crate::workflows::acquisition::AcquisitionCriteria;
use std::sync::Arc;
use std::time::Duration;

fn ranked_lone_star() -> crate::workflows::acquisition::ScoredVar {
    let ranker = Ranker::new(AcquisitionCriteria::default()).expect("valid criteria");
    ranker
        .rank(&candidates())
        .expect("ranked")
        .into_iter()
        .find(|entry| entry.id() == VarId(1))
        .expect("present")
}

#[tokio::test]
async fn narrator_text_replaces_template_for_measured_dimensions() {
    let synthesizer = ExplanationSynthesizer::new(AcquisitionCriteria::default());
    let scored = ranked_lone_star();

    let narrated = synthesizer
        .explain_with(&scored, &ScriptedNarrator, Duration::from_secs(1))
        .await;

    assert!(narrated.failure.is_none());
    let payload = narrated.payload;
    assert_eq!(payload.summary_source, SummarySource::Narrator);
    assert_eq!(
        payload.summary,
        "Lone Star Networks is a compelling regional platform."
    );
    assert_eq!(
        payload
            .entry(Dimension::VendorSynergy)
            .map(|entry| entry.reasoning.as_str()),
        Some("Vendor stack mirrors the acquirer's partner program.")
    );
    assert_eq!(payload.strengths, synthesizer.explain(&scored).strengths);
}

#[tokio::test]
async fn failing_narrator_falls_back_to_template() {
    let synthesizer = ExplanationSynthesizer::new(AcquisitionCriteria::default());
    let scored = ranked_lone_star();

    let narrated = synthesizer
        .explain_with(&scored, &FailingNarrator, Duration::from_secs(1))
        .await;

    assert!(matches!(
        narrated.failure,
        Some(NarrativeError::Unavailable(_))
    ));
    assert_eq!(narrated.payload, synthesizer.explain(&scored));
    assert!(!narrated.payload.summary.is_empty());
}

#[tokio::test]
async fn slow_narrator_times_out_to_template() {
    let synthesizer = ExplanationSynthesizer::new(AcquisitionCriteria::default());
    let scored = ranked_lone_star();

    let narrated = synthesizer
        .explain_with(&scored, &SlowNarrator, Duration::from_millis(20))
        .await;

    assert_eq!(narrated.failure, Some(NarrativeError::Timeout { millis: 20 }));
    assert_eq!(narrated.payload.summary_source, SummarySource::Template);
}

#[tokio::test]
async fn service_returns_template_payload_when_narrator_fails() {
    let repository = Arc::new(MemoryRepository::default());
    let service = AcquisitionService::new(repository)
        .with_narrator(Arc::new(FailingNarrator), Duration::from_millis(50));
    service
        .compute_rankings(RankingRequest::default())
        .expect("rankings computed");

    let payload = service.explain(VarId(3)).await.expect("explained");

    assert_eq!(payload.summary_source, SummarySource::Template);
    assert!(payload.summary.starts_with("Pacific Edge Systems ranks #4"));
    assert!(!payload.concerns.is_empty());
}

#[tokio::test]
async fn service_uses_narrator_when_available() {
    let repository = Arc::new(MemoryRepository::default());
    let service = AcquisitionService::new(repository)
        .with_narrator(Arc::new(ScriptedNarrator), Duration::from_secs(1));

    let payload = service.explain(VarId(2)).await.expect("explained");

    assert_eq!(payload.summary_source, SummarySource::Narrator);
    assert!(payload.summary.starts_with("Red River Technology"));
}
