use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::access::{AccessDenied, AccessPolicy, Action, Principal, Resource};
use super::domain::{
    CandidateDocument, ParameterSet, ParameterSetId, ResumeId, ResumeSubmission,
};
use super::parameters::{ParameterSetDraft, ParameterSetPatch, ParameterValidationError};
use super::repository::{CandidateRepository, ParameterSetRepository, RepositoryError};
use super::scoring::{AtsScorer, ScoreOutcome, ScoringError};
use crate::config::ScoringConfig;

/// Service composing the access policy, repositories, and the scorer.
pub struct AtsService<P, C> {
    parameters: Arc<P>,
    candidates: Arc<C>,
    policy: AccessPolicy,
    scorer: AtsScorer,
    write_attempts: u8,
}

static PARAMETER_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static RESUME_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_parameter_set_id() -> ParameterSetId {
    let id = PARAMETER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ParameterSetId(format!("params-{id:06}"))
}

fn next_resume_id() -> ResumeId {
    let id = RESUME_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ResumeId(format!("resume-{id:06}"))
}

impl<P, C> AtsService<P, C>
where
    P: ParameterSetRepository + 'static,
    C: CandidateRepository + 'static,
{
    pub fn new(parameters: Arc<P>, candidates: Arc<C>, config: ScoringConfig) -> Self {
        Self {
            parameters,
            candidates,
            policy: AccessPolicy::new(config.enforce_parameter_ownership),
            scorer: AtsScorer::new(),
            write_attempts: config.write_attempts.max(1),
        }
    }

    /// Store a new parameter set owned by the calling recruiter.
    pub fn create_parameter_set(
        &self,
        principal: &Principal,
        draft: ParameterSetDraft,
    ) -> Result<ParameterSet, AtsServiceError> {
        self.policy
            .authorize(principal, Action::Modify, Resource::NewParameterSet)?;
        draft.validate()?;

        let parameters =
            draft.into_parameter_set(next_parameter_set_id(), principal.user_id.clone(), Utc::now());
        let stored = self.parameters.insert(parameters)?;

        info!(
            parameter_id = %stored.id,
            owner = %stored.owner_id,
            skills = stored.required_skills.len(),
            keywords = stored.keywords.len(),
            "parameter set created"
        );
        Ok(stored)
    }

    /// The caller's own parameter sets, optionally filtered by `active`.
    pub fn list_parameter_sets(
        &self,
        principal: &Principal,
        active: Option<bool>,
    ) -> Result<Vec<ParameterSet>, AtsServiceError> {
        self.policy.authorize(
            principal,
            Action::Read,
            Resource::ParameterSet {
                owner: &principal.user_id,
            },
        )?;

        let mut sets = self.parameters.list_by_owner(&principal.user_id)?;
        if let Some(active) = active {
            sets.retain(|set| set.active == active);
        }
        sets.sort_by(|left, right| left.created_at.cmp(&right.created_at));
        Ok(sets)
    }

    pub fn get_parameter_set(
        &self,
        principal: &Principal,
        id: &ParameterSetId,
    ) -> Result<ParameterSet, AtsServiceError> {
        let parameters = self.load_parameters(id)?;
        self.policy.authorize(
            principal,
            Action::Read,
            Resource::ParameterSet {
                owner: &parameters.owner_id,
            },
        )?;
        Ok(parameters)
    }

    /// Apply a partial update. Deactivation is `active: false`; sets are never deleted.
    pub fn update_parameter_set(
        &self,
        principal: &Principal,
        id: &ParameterSetId,
        patch: ParameterSetPatch,
    ) -> Result<ParameterSet, AtsServiceError> {
        let mut parameters = self.load_parameters(id)?;
        self.policy.authorize(
            principal,
            Action::Modify,
            Resource::ParameterSet {
                owner: &parameters.owner_id,
            },
        )?;
        patch.validate()?;

        let deactivating = patch.active == Some(false) && parameters.active;
        patch.apply(&mut parameters, Utc::now());
        self.parameters.update(parameters.clone())?;

        if deactivating {
            info!(parameter_id = %parameters.id, "parameter set deactivated");
        } else {
            debug!(parameter_id = %parameters.id, "parameter set updated");
        }
        Ok(parameters)
    }

    /// Store a new resume owned by the calling student.
    pub fn submit_resume(
        &self,
        principal: &Principal,
        submission: ResumeSubmission,
    ) -> Result<CandidateDocument, AtsServiceError> {
        self.policy
            .authorize(principal, Action::Modify, Resource::NewResume)?;

        let candidate =
            CandidateDocument::from_submission(next_resume_id(), principal.user_id.clone(), submission);
        let stored = self.candidates.insert(candidate)?;
        debug!(resume_id = %stored.id, owner = %stored.owner_id, "resume submitted");
        Ok(stored)
    }

    /// Replace resume content. The cached score is left as is until the next scoring run.
    pub fn replace_resume(
        &self,
        principal: &Principal,
        id: &ResumeId,
        submission: ResumeSubmission,
    ) -> Result<CandidateDocument, AtsServiceError> {
        let candidate = self.load_resume(id)?;
        self.policy.authorize(
            principal,
            Action::Modify,
            Resource::Resume {
                owner: &candidate.owner_id,
            },
        )?;

        let stored = match self.candidates.replace(id, submission) {
            Ok(stored) => stored,
            Err(RepositoryError::NotFound) => {
                return Err(AtsServiceError::not_found(ResourceKind::Resume, &id.0));
            }
            Err(other) => return Err(other.into()),
        };
        debug!(resume_id = %stored.id, version = stored.version, "resume content replaced");
        Ok(stored)
    }

    pub fn get_resume(
        &self,
        principal: &Principal,
        id: &ResumeId,
    ) -> Result<CandidateDocument, AtsServiceError> {
        let candidate = self.load_resume(id)?;
        self.policy.authorize(
            principal,
            Action::Read,
            Resource::Resume {
                owner: &candidate.owner_id,
            },
        )?;
        Ok(candidate)
    }

    /// Score a resume against a parameter set and persist the result on the resume.
    ///
    /// The write-back is a version compare-and-swap. When another write lands
    /// between read and write the resume is re-read and rescored, up to the
    /// configured number of attempts. Nothing is written on any failure path.
    pub fn calculate_score(
        &self,
        principal: &Principal,
        resume_id: &ResumeId,
        parameter_id: &ParameterSetId,
    ) -> Result<ScoreOutcome, AtsServiceError> {
        let mut candidate = self.load_resume(resume_id)?;
        let parameters = self.load_parameters(parameter_id)?;

        self.policy.authorize(
            principal,
            Action::Score,
            Resource::Resume {
                owner: &candidate.owner_id,
            },
        )?;
        self.policy.authorize(
            principal,
            Action::Score,
            Resource::ParameterSet {
                owner: &parameters.owner_id,
            },
        )?;

        let mut attempt: u8 = 1;
        loop {
            let outcome = self.scorer.compute(&parameters, &candidate)?;

            match self
                .candidates
                .store_score(&candidate.id, candidate.version, outcome.score)
            {
                Ok(_) => {
                    info!(
                        resume_id = %candidate.id,
                        parameter_id = %parameters.id,
                        score = outcome.score,
                        matched = outcome.matched,
                        total = outcome.total,
                        "ats score computed"
                    );
                    return Ok(outcome);
                }
                Err(RepositoryError::VersionMismatch { expected, found })
                    if attempt < self.write_attempts =>
                {
                    warn!(
                        resume_id = %candidate.id,
                        expected,
                        found,
                        attempt,
                        "resume changed while scoring; rescoring"
                    );
                    attempt += 1;
                    candidate = self.load_resume(resume_id)?;
                }
                Err(RepositoryError::VersionMismatch { .. }) => {
                    return Err(AtsServiceError::WriteContention { attempts: attempt });
                }
                Err(RepositoryError::NotFound) => {
                    return Err(AtsServiceError::not_found(
                        ResourceKind::Resume,
                        &resume_id.0,
                    ));
                }
                Err(other) => return Err(other.into()),
            }
        }
    }

    fn load_parameters(&self, id: &ParameterSetId) -> Result<ParameterSet, AtsServiceError> {
        self.parameters
            .fetch(id)?
            .ok_or_else(|| AtsServiceError::not_found(ResourceKind::ParameterSet, &id.0))
    }

    fn load_resume(&self, id: &ResumeId) -> Result<CandidateDocument, AtsServiceError> {
        self.candidates
            .fetch(id)?
            .ok_or_else(|| AtsServiceError::not_found(ResourceKind::Resume, &id.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Resume,
    ParameterSet,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Resume => f.write_str("resume"),
            ResourceKind::ParameterSet => f.write_str("parameter set"),
        }
    }
}

/// Error raised by the ATS service.
#[derive(Debug, thiserror::Error)]
pub enum AtsServiceError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: ResourceKind, id: String },
    #[error(transparent)]
    Unauthorized(#[from] AccessDenied),
    #[error(transparent)]
    Validation(#[from] ParameterValidationError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("score write-back lost to concurrent resume updates after {attempts} attempt(s)")]
    WriteContention { attempts: u8 },
}

impl AtsServiceError {
    fn not_found(kind: ResourceKind, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}
