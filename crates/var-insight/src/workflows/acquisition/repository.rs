use super::domain::{UnifiedVar, VarId};

/// Read-only access to the candidate records the engine scores.
pub trait CandidateRepository: Send + Sync {
    /// Every candidate currently known, in a stable order.
    fn list(&self) -> Result<Vec<UnifiedVar>, RepositoryError>;
    fn fetch(&self, id: VarId) -> Result<Option<UnifiedVar>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
