use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::ats::access::{Principal, Role};
use crate::ats::domain::{
    CandidateDocument, EducationEntry, FormatRequirements, ParameterSet, ParameterSetId,
    PersonalInfo, ResumeId, ResumeSubmission, UserId, WeightedKeyword, WeightedSkill,
};
use crate::ats::parameters::ParameterSetDraft;
use crate::ats::repository::{CandidateRepository, ParameterSetRepository, RepositoryError};
use crate::ats::{ats_router, AtsService};
use crate::config::ScoringConfig;

pub(super) const RECRUITER: &str = "rec-100";
pub(super) const OTHER_RECRUITER: &str = "rec-200";
pub(super) const STUDENT: &str = "stu-100";
pub(super) const OTHER_STUDENT: &str = "stu-200";

pub(super) fn recruiter() -> Principal {
    Principal::new(RECRUITER, Role::Recruiter)
}

pub(super) fn other_recruiter() -> Principal {
    Principal::new(OTHER_RECRUITER, Role::Recruiter)
}

pub(super) fn student() -> Principal {
    Principal::new(STUDENT, Role::Student)
}

pub(super) fn other_student() -> Principal {
    Principal::new(OTHER_STUDENT, Role::Student)
}

pub(super) fn scoring_config() -> ScoringConfig {
    ScoringConfig {
        enforce_parameter_ownership: true,
        write_attempts: 3,
    }
}

/// React (5) plus the "graduate" keyword (5), no format checks: total 10.
pub(super) fn draft() -> ParameterSetDraft {
    ParameterSetDraft {
        name: "Frontend internship".to_string(),
        required_skills: vec![WeightedSkill {
            skill: "React".to_string(),
            weight: 5,
        }],
        required_experience: 0,
        required_education: Some("Undergraduate".to_string()),
        keywords: vec![WeightedKeyword {
            keyword: "graduate".to_string(),
            weight: 5,
        }],
        format_requirements: FormatRequirements {
            preferred_length: None,
            requires_contact_info: false,
            requires_education: false,
        },
        active: true,
    }
}

/// Node-only resume that mentions "Graduate" in the personal summary.
pub(super) fn submission() -> ResumeSubmission {
    ResumeSubmission {
        skills: vec!["Node".to_string()],
        personal_info: PersonalInfo {
            name: "Meera Iyer".to_string(),
            email: Some("meera@example.edu".to_string()),
            phone: None,
            location: Some("Pune".to_string()),
            summary: Some("Graduate student focused on web platforms".to_string()),
            links: Vec::new(),
        },
        education: vec![EducationEntry {
            institution: "College of Engineering Pune".to_string(),
            degree: Some("B.Tech".to_string()),
            field_of_study: Some("Computer Engineering".to_string()),
            start_year: Some(2022),
            end_year: Some(2026),
            grade: None,
        }],
        experience: Vec::new(),
        projects: Vec::new(),
        certifications: Vec::new(),
    }
}

pub(super) fn react_submission() -> ResumeSubmission {
    let mut submission = submission();
    submission.skills.push("React".to_string());
    submission
}

#[derive(Default, Clone)]
pub(super) struct MemoryParameters {
    records: Arc<Mutex<HashMap<ParameterSetId, ParameterSet>>>,
}

impl ParameterSetRepository for MemoryParameters {
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
        match guard.get_mut(&parameters.id) {
            Some(slot) => {
                *slot = parameters;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
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
            .filter(|set| &set.owner_id == owner)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryCandidates {
    records: Arc<Mutex<HashMap<ResumeId, CandidateDocument>>>,
    score_writes: Arc<AtomicU32>,
}

impl MemoryCandidates {
    pub(super) fn score_writes(&self) -> u32 {
        self.score_writes.load(Ordering::SeqCst)
    }

    /// Simulate an edit racing with a scoring request.
    pub(super) fn touch(&self, id: &ResumeId) {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if let Some(candidate) = guard.get_mut(id) {
            candidate.version += 1;
        }
    }
}

impl CandidateRepository for MemoryCandidates {
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
        let slot = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        slot.apply_submission(submission);
        slot.version += 1;
        Ok(slot.clone())
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
        let slot = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if slot.version != expected_version {
            return Err(RepositoryError::VersionMismatch {
                expected: expected_version,
                found: slot.version,
            });
        }
        slot.ats_score = Some(score);
        slot.version += 1;
        self.score_writes.fetch_add(1, Ordering::SeqCst);
        Ok(slot.clone())
    }
}

/// Wraps [`MemoryCandidates`] and bumps the version just before the first
/// `races` score writes, as if another request edited the resume meanwhile.
#[derive(Clone)]
pub(super) struct RacingCandidates {
    inner: MemoryCandidates,
    races: Arc<AtomicU32>,
}

impl RacingCandidates {
    pub(super) fn new(inner: MemoryCandidates, races: u32) -> Self {
        Self {
            inner,
            races: Arc::new(AtomicU32::new(races)),
        }
    }
}

impl CandidateRepository for RacingCandidates {
    fn insert(&self, candidate: CandidateDocument) -> Result<CandidateDocument, RepositoryError> {
        self.inner.insert(candidate)
    }

    fn replace(
        &self,
        id: &ResumeId,
        submission: ResumeSubmission,
    ) -> Result<CandidateDocument, RepositoryError> {
        self.inner.replace(id, submission)
    }

    fn fetch(&self, id: &ResumeId) -> Result<Option<CandidateDocument>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn store_score(
        &self,
        id: &ResumeId,
        expected_version: u64,
        score: u8,
    ) -> Result<CandidateDocument, RepositoryError> {
        let remaining = self.races.load(Ordering::SeqCst);
        if remaining > 0 {
            self.races.store(remaining - 1, Ordering::SeqCst);
            self.inner.touch(id);
        }
        self.inner.store_score(id, expected_version, score)
    }
}

/// Lands a score write inside `replace`, after the service has already read
/// the resume it is about to edit.
#[derive(Clone)]
pub(super) struct ScoredMidReplace {
    pub(super) inner: MemoryCandidates,
    pub(super) score: u8,
}

impl CandidateRepository for ScoredMidReplace {
    fn insert(&self, candidate: CandidateDocument) -> Result<CandidateDocument, RepositoryError> {
        self.inner.insert(candidate)
    }

    fn replace(
        &self,
        id: &ResumeId,
        submission: ResumeSubmission,
    ) -> Result<CandidateDocument, RepositoryError> {
        let current = self.inner.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        self.inner.store_score(id, current.version, self.score)?;
        self.inner.replace(id, submission)
    }

    fn fetch(&self, id: &ResumeId) -> Result<Option<CandidateDocument>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn store_score(
        &self,
        id: &ResumeId,
        expected_version: u64,
        score: u8,
    ) -> Result<CandidateDocument, RepositoryError> {
        self.inner.store_score(id, expected_version, score)
    }
}

pub(super) struct UnavailableCandidates;

impl CandidateRepository for UnavailableCandidates {
    fn insert(&self, _candidate: CandidateDocument) -> Result<CandidateDocument, RepositoryError> {
        Err(RepositoryError::Unavailable("document store offline".to_string()))
    }

    fn replace(
        &self,
        _id: &ResumeId,
        _submission: ResumeSubmission,
    ) -> Result<CandidateDocument, RepositoryError> {
        Err(RepositoryError::Unavailable("document store offline".to_string()))
    }

    fn fetch(&self, _id: &ResumeId) -> Result<Option<CandidateDocument>, RepositoryError> {
        Err(RepositoryError::Unavailable("document store offline".to_string()))
    }

    fn store_score(
        &self,
        _id: &ResumeId,
        _expected_version: u64,
        _score: u8,
    ) -> Result<CandidateDocument, RepositoryError> {
        Err(RepositoryError::Unavailable("document store offline".to_string()))
    }
}

pub(super) type MemoryService = AtsService<MemoryParameters, MemoryCandidates>;

pub(super) fn build_service() -> (MemoryService, MemoryParameters, MemoryCandidates) {
    let parameters = MemoryParameters::default();
    let candidates = MemoryCandidates::default();
    let service = AtsService::new(
        Arc::new(parameters.clone()),
        Arc::new(candidates.clone()),
        scoring_config(),
    );
    (service, parameters, candidates)
}

/// Service seeded with one recruiter parameter set and one student resume.
pub(super) fn seeded_service() -> (MemoryService, ParameterSet, CandidateDocument, MemoryCandidates)
{
    let (service, _, candidates) = build_service();
    let parameters = service
        .create_parameter_set(&recruiter(), draft())
        .expect("parameter set stored");
    let resume = service
        .submit_resume(&student(), submission())
        .expect("resume stored");
    (service, parameters, resume, candidates)
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    ats_router(Arc::new(service))
}

pub(super) fn json_request(
    method: &str,
    uri: &str,
    principal: Option<&Principal>,
    body: &Value,
) -> axum::http::Request<axum::body::Body> {
    let raw = serde_json::to_string(body).expect("serializable body");
    raw_json_request(method, uri, principal, &raw)
}

/// JSON content type with an arbitrary, possibly malformed, body.
pub(super) fn raw_json_request(
    method: &str,
    uri: &str,
    principal: Option<&Principal>,
    body: &str,
) -> axum::http::Request<axum::body::Body> {
    let mut builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json");
    if let Some(principal) = principal {
        builder = builder
            .header("x-user-id", principal.user_id.0.as_str())
            .header("x-user-role", principal.role.label());
    }
    builder
        .body(axum::body::Body::from(body.to_string()))
        .expect("request builds")
}

pub(super) fn empty_request(
    method: &str,
    uri: &str,
    principal: &Principal,
) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", principal.user_id.0.as_str())
        .header("x-user-role", principal.role.label())
        .body(axum::body::Body::empty())
        .expect("request builds")
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
