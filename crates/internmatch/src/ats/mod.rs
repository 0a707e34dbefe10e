//! Applicant-tracking scoring: recruiter parameter sets, student resumes, the
//! weighted matcher, and the HTTP surface that ties them together.

pub mod access;
pub mod domain;
pub mod parameters;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use access::{AccessDenied, AccessPolicy, Action, Principal, Resource, Role};
pub use domain::{
    CandidateDocument, CertificationEntry, EducationEntry, ExperienceEntry, FormatRequirements,
    ParameterSet, ParameterSetId, PersonalInfo, ProjectEntry, ResumeId, ResumeSubmission, UserId,
    WeightedKeyword, WeightedSkill,
};
pub use parameters::{
    FormatRequirementsPatch, ParameterSetDraft, ParameterSetPatch, ParameterValidationError,
};
pub use repository::{CandidateRepository, ParameterSetRepository, RepositoryError};
pub use router::{
    ats_router, principal_from_headers, CalculateScoreRequest, ScoreDetails, ScoreView,
};
pub use scoring::{AtsScorer, CriterionKind, CriterionScore, ScoreOutcome, ScoringError};
pub use service::{AtsService, AtsServiceError, ResourceKind};
