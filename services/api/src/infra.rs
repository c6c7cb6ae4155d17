use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use var_insight::workflows::acquisition::{
    CandidateRepository, RepositoryError, UnifiedVar, VarId,
};
use var_insight::workflows::roster::{RosterImportError, RosterImporter};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Candidate store backed by a map keyed on id, so listings come back in id order.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCandidateRepository {
    records: Arc<Mutex<BTreeMap<VarId, UnifiedVar>>>,
}

impl InMemoryCandidateRepository {
    pub(crate) fn with_candidates(candidates: impl IntoIterator<Item = UnifiedVar>) -> Self {
        let records = candidates
            .into_iter()
            .map(|candidate| (candidate.id, candidate))
            .collect();
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl CandidateRepository for InMemoryCandidateRepository {
    fn list(&self) -> Result<Vec<UnifiedVar>, RepositoryError> {
        let guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.values().cloned().collect())
    }

    fn fetch(&self, id: VarId) -> Result<Option<UnifiedVar>, RepositoryError> {
        let guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(&id).cloned())
    }
}

/// Roster from `path`, or the bundled sample roster when no path is given.
pub(crate) fn load_roster(path: Option<&Path>) -> Result<Vec<UnifiedVar>, RosterImportError> {
    match path {
        Some(path) => RosterImporter::from_path(path),
        None => RosterImporter::sample(),
    }
}
