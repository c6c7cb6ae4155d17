use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::acquisition::domain::{OwnershipType, UnifiedVar, VarId};
use crate::workflows::acquisition::explanation::{
    Narrative, NarrativeError, NarrativeGenerator, NarrativeRequest,
};
use crate::workflows::acquisition::repository::{CandidateRepository, RepositoryError};
use crate::workflows::acquisition::{acquisition_router, AcquisitionService, Dimension};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub(super) fn lone_star() -> UnifiedVar {
    UnifiedVar {
        hq_city: Some("Dallas".to_string()),
        hq_state: Some("TX".to_string()),
        annual_revenue: Some(45.0),
        ebitda_margin: Some(12.0),
        growth_rate: Some(18.0),
        employee_count: Some(180),
        ownership: Some(OwnershipType::Private),
        specialties: strings(&["Managed Services", "Networking", "Cybersecurity"]),
        top_vendors: strings(&["Cisco", "Fortinet", "Microsoft"]),
        customer_segment: Some("Mid-Market".to_string()),
        certifications: strings(&["Cisco Gold Partner"]),
        branch_locations: strings(&["Houston, TX", "Tulsa, OK"]),
        employer_rating: Some(4.3),
        confidence_score: 0.9,
        ..UnifiedVar::new(1, "Lone Star Networks")
    }
}

pub(super) fn red_river() -> UnifiedVar {
    UnifiedVar {
        hq_city: Some("Oklahoma City".to_string()),
        hq_state: Some("OK".to_string()),
        annual_revenue: Some(28.0),
        ebitda_margin: Some(9.0),
        growth_rate: Some(11.0),
        employee_count: Some(95),
        ownership: Some(OwnershipType::FamilyOwned),
        specialties: strings(&["Cloud", "Managed Services"]),
        top_vendors: strings(&["Microsoft", "Dell"]),
        customer_segment: Some("SMB".to_string()),
        employer_rating: Some(4.0),
        confidence_score: 0.8,
        ..UnifiedVar::new(2, "Red River Technology")
    }
}

pub(super) fn pacific_edge() -> UnifiedVar {
    UnifiedVar {
        hq_city: Some("San Diego".to_string()),
        hq_state: Some("CA".to_string()),
        annual_revenue: Some(140.0),
        ebitda_margin: Some(4.5),
        growth_rate: Some(3.0),
        employee_count: Some(620),
        ownership: Some(OwnershipType::Public),
        specialties: strings(&["Unified Communications", "Data Center"]),
        top_vendors: strings(&["Avaya", "Lenovo"]),
        customer_segment: Some("Enterprise".to_string()),
        confidence_score: 0.7,
        ..UnifiedVar::new(3, "Pacific Edge Systems")
    }
}

pub(super) fn sparse() -> UnifiedVar {
    UnifiedVar {
        confidence_score: 0.3,
        ..UnifiedVar::new(4, "Sparse Data Partners")
    }
}

pub(super) fn candidates() -> Vec<UnifiedVar> {
    vec![pacific_edge(), sparse(), red_river(), lone_star()]
}

#[derive(Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<Vec<UnifiedVar>>>,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::with(candidates())
    }
}

impl MemoryRepository {
    pub(super) fn with(records: Vec<UnifiedVar>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    pub(super) fn replace(&self, records: Vec<UnifiedVar>) {
        *self.records.lock().expect("repository mutex poisoned") = records;
    }
}

impl CandidateRepository for MemoryRepository {
    fn list(&self) -> Result<Vec<UnifiedVar>, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").clone())
    }

    fn fetch(&self, id: VarId) -> Result<Option<UnifiedVar>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("repository mutex poisoned")
            .iter()
            .find(|record| record.id == id)
            .cloned())
    }
}

pub(super) struct UnavailableRepository;

impl CandidateRepository for UnavailableRepository {
    fn list(&self) -> Result<Vec<UnifiedVar>, RepositoryError> {
        Err(RepositoryError::Unavailable("warehouse offline".to_string()))
    }

    fn fetch(&self, _id: VarId) -> Result<Option<UnifiedVar>, RepositoryError> {
        Err(RepositoryError::Unavailable("warehouse offline".to_string()))
    }
}

/// Narrator returning a fixed reply.
pub(super) struct ScriptedNarrator;

#[async_trait]
impl NarrativeGenerator for ScriptedNarrator {
    async fn narrate(&self, request: &NarrativeRequest) -> Result<Narrative, NarrativeError> {
        let mut narrative = Narrative {
            summary: format!("{} is a compelling regional platform.", request.var_name),
            ..Narrative::default()
        };
        narrative.reasoning.insert(
            Dimension::VendorSynergy,
            "Vendor stack mirrors the acquirer's partner program.".to_string(),
        );
        Ok(narrative)
    }
}

pub(super) struct FailingNarrator;

#[async_trait]
impl NarrativeGenerator for FailingNarrator {
    async fn narrate(&self, _request: &NarrativeRequest) -> Result<Narrative, NarrativeError> {
        Err(NarrativeError::Unavailable("quota exhausted".to_string()))
    }
}

pub(super) struct SlowNarrator;

#[async_trait]
impl NarrativeGenerator for SlowNarrator {
    async fn narrate(&self, request: &NarrativeRequest) -> Result<Narrative, NarrativeError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Narrative {
            summary: format!("{} arrived too late.", request.var_name),
            ..Narrative::default()
        })
    }
}

pub(super) fn build_service() -> (AcquisitionService<MemoryRepository>, MemoryRepository) {
    let repository = MemoryRepository::default();
    let service = AcquisitionService::new(Arc::new(repository.clone()));
    (service, repository)
}

pub(super) fn router_with_service<R>(service: AcquisitionService<R>) -> axum::Router
where
    R: CandidateRepository + 'static,
{
    acquisition_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
