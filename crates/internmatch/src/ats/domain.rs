use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a marketplace account (student, recruiter, or admin).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier wrapper for recruiter-owned scoring parameter sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParameterSetId(pub String);

/// Identifier wrapper for student resumes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResumeId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for ParameterSetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for ResumeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Skill the recruiter expects, matched exactly against the resume skill list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedSkill {
    pub skill: String,
    pub weight: u8,
}

/// Free-text term searched case-insensitively across the whole resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedKeyword {
    pub keyword: String,
    pub weight: u8,
}

/// Structural checks applied on top of skill and keyword matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatRequirements {
    #[serde(default)]
    pub preferred_length: Option<u32>,
    #[serde(default = "default_true")]
    pub requires_contact_info: bool,
    #[serde(default = "default_true")]
    pub requires_education: bool,
}

impl Default for FormatRequirements {
    fn default() -> Self {
        Self {
            preferred_length: None,
            requires_contact_info: true,
            requires_education: true,
        }
    }
}

pub(crate) fn default_true() -> bool {
    true
}

/// Recruiter-defined weighted criteria used to score a resume.
///
/// `required_experience` and `required_education` are carried for display and
/// filtering by clients; the scorer does not read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSet {
    pub id: ParameterSetId,
    pub owner_id: UserId,
    pub name: String,
    #[serde(default)]
    pub required_skills: Vec<WeightedSkill>,
    #[serde(default)]
    pub required_experience: u32,
    #[serde(default)]
    pub required_education: Option<String>,
    #[serde(default)]
    pub keywords: Vec<WeightedKeyword>,
    #[serde(default)]
    pub format_requirements: FormatRequirements,
    #[serde(default = "default_true")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contact block at the top of a resume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

impl PersonalInfo {
    /// Both an e-mail address and a phone number are present and non-blank.
    pub fn has_contact_details(&self) -> bool {
        let filled = |value: &Option<String>| {
            value
                .as_deref()
                .map(|raw| !raw.trim().is_empty())
                .unwrap_or(false)
        };
        filled(&self.email) && filled(&self.phone)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    pub institution: String,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub start_year: Option<u16>,
    #[serde(default)]
    pub end_year: Option<u16>,
    #[serde(default)]
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub title: String,
    pub organization: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationEntry {
    pub name: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub issued_on: Option<String>,
}

/// Student-authored resume content, as submitted before any scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSubmission {
    #[serde(default)]
    pub skills: Vec<String>,
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(default)]
    pub certifications: Vec<CertificationEntry>,
}

/// Stored resume, the scoring target.
///
/// `ats_score` is a cache of the last computation and may lag behind edits to
/// either the resume or the parameter set it was scored against. `version`
/// increases on every write and guards the score write-back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDocument {
    pub id: ResumeId,
    pub owner_id: UserId,
    #[serde(default)]
    pub skills: Vec<String>,
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(default)]
    pub certifications: Vec<CertificationEntry>,
    #[serde(default)]
    pub ats_score: Option<u8>,
    #[serde(default)]
    pub version: u64,
}

impl CandidateDocument {
    pub fn from_submission(id: ResumeId, owner_id: UserId, submission: ResumeSubmission) -> Self {
        Self {
            id,
            owner_id,
            skills: submission.skills,
            personal_info: submission.personal_info,
            education: submission.education,
            experience: submission.experience,
            projects: submission.projects,
            certifications: submission.certifications,
            ats_score: None,
            version: 0,
        }
    }

    /// Swap in new content; the cached score is kept and becomes stale.
    pub fn apply_submission(&mut self, submission: ResumeSubmission) {
        self.skills = submission.skills;
        self.personal_info = submission.personal_info;
        self.education = submission.education;
        self.experience = submission.experience;
        self.projects = submission.projects;
        self.certifications = submission.certifications;
    }

    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|candidate| candidate == skill)
    }
}
