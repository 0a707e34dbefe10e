use internmatch::ats::{
    CandidateDocument, CandidateRepository, ParameterSet, ParameterSetId, ParameterSetRepository,
    RepositoryError, ResumeId, ResumeSubmission, UserId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryParameterSets {
    records: Arc<Mutex<HashMap<ParameterSetId, ParameterSet>>>,
}

impl ParameterSetRepository for InMemoryParameterSets {
    fn insert(&self, parameters: ParameterSet) -> Result<ParameterSet, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&parameters.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(parameters.id.clone(), parameters.clone());
        Ok(parameters)
    }

    fn update(&self, parameters: ParameterSet) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&parameters.id) {
            guard.insert(parameters.id.clone(), parameters);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ParameterSetId) -> Result<Option<ParameterSet>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list_by_owner(&self, owner: &UserId) -> Result<Vec<ParameterSet>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|parameters| &parameters.owner_id == owner)
            .cloned()
            .collect())
    }
}

/// Resume store. Each write bumps `version` under the lock, so the score
/// compare-and-swap cannot interleave with a concurrent replace, and a
/// replace edits content in place without rewriting the stored score.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCandidates {
    records: Arc<Mutex<HashMap<ResumeId, CandidateDocument>>>,
}

impl CandidateRepository for InMemoryCandidates {
    fn insert(&self, candidate: CandidateDocument) -> Result<CandidateDocument, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&candidate.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(candidate.id.clone(), candidate.clone());
        Ok(candidate)
    }

    fn replace(
        &self,
        id: &ResumeId,
        submission: ResumeSubmission,
    ) -> Result<CandidateDocument, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let current = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        current.apply_submission(submission);
        current.version += 1;
        Ok(current.clone())
    }

    fn fetch(&self, id: &ResumeId) -> Result<Option<CandidateDocument>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn store_score(
        &self,
        id: &ResumeId,
        expected_version: u64,
        score: u8,
    ) -> Result<CandidateDocument, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let current = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if current.version != expected_version {
            return Err(RepositoryError::VersionMismatch {
                expected: expected_version,
                found: current.version,
            });
        }
        current.ats_score = Some(score);
        current.version += 1;
        Ok(current.clone())
    }
}
