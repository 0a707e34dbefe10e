use super::domain::{
    CandidateDocument, ParameterSet, ParameterSetId, ResumeId, ResumeSubmission, UserId,
};

/// Storage abstraction for recruiter parameter sets.
pub trait ParameterSetRepository: Send + Sync {
    fn insert(&self, parameters: ParameterSet) -> Result<ParameterSet, RepositoryError>;
    fn update(&self, parameters: ParameterSet) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ParameterSetId) -> Result<Option<ParameterSet>, RepositoryError>;
    fn list_by_owner(&self, owner: &UserId) -> Result<Vec<ParameterSet>, RepositoryError>;
}

/// Storage abstraction for resumes.
///
/// Every successful write bumps `version`. `replace` swaps resume content in
/// place and never touches `ats_score`; only `store_score` writes it, and only
/// when the stored version still equals `expected_version`.
pub trait CandidateRepository: Send + Sync {
    fn insert(&self, candidate: CandidateDocument) -> Result<CandidateDocument, RepositoryError>;
    fn replace(
        &self,
        id: &ResumeId,
        submission: ResumeSubmission,
    ) -> Result<CandidateDocument, RepositoryError>;
    fn fetch(&self, id: &ResumeId) -> Result<Option<CandidateDocument>, RepositoryError>;
    fn store_score(
        &self,
        id: &ResumeId,
        expected_version: u64,
        score: u8,
    ) -> Result<CandidateDocument, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record changed concurrently (expected version {expected}, found {found})")]
    VersionMismatch { expected: u64, found: u64 },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
